//! Finding where two traces start running the same committed instructions.
//!
//! This is a greedy search, not a longest common subsequence. For each
//! candidate start in `other` (stepping one commit group at a time) the two
//! traces are walked forward in lockstep, committed instruction by committed
//! instruction, and the first candidate whose chain of equal pcs reaches the
//! very end of `other` wins. A single mismatch throws the candidate away.
//!
//! Usually one trace starts inside the other's instruction stream, so this is
//! close to linear in practice. Worst case is quadratic.

use tracing::{debug, trace as trace_log};

use super::{groups::next_committed, AlignmentError};
use crate::trace::{Instruction, Trace};

/// Result of a successful [`probe`]. Ends are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Probe {
    pub length: usize,
    pub anchor_start: usize,
    pub other_start: usize,
    pub anchor_end: usize,
    pub other_end: usize,
}

/// Overlapping region of trace a and trace b. Ends are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub start_a: usize,
    pub start_b: usize,
    pub end_a: usize,
    pub end_b: usize,
    /// number of matched committed instructions
    pub length: usize,
}

impl Window {
    fn from_probe(p: Probe, anchored_on_a: bool) -> Self {
        if anchored_on_a {
            Self {
                start_a: p.anchor_start,
                start_b: p.other_start,
                end_a: p.anchor_end,
                end_b: p.other_end,
                length: p.length,
            }
        } else {
            Self {
                start_a: p.other_start,
                start_b: p.anchor_start,
                end_a: p.other_end,
                end_b: p.anchor_end,
                length: p.length,
            }
        }
    }
}

/// Position just past the committed instruction at `index`, moved onto the
/// next committed instruction (or the end).
fn step(insts: &[Instruction], index: usize) -> usize {
    next_committed(insts, index + 1).or_end(insts.len())
}

/// Find where to start `other` such that its committed instructions match
/// those of `anchor` from the first one in `anchor` all the way to the end of
/// `other`.
pub fn probe(anchor: &[Instruction], other: &[Instruction]) -> Option<Probe> {
    let anchor_start = next_committed(anchor, 0).or_end(anchor.len());
    let mut other_start = next_committed(other, 0).or_end(other.len());

    while other_start < other.len() {
        let mut length = 0;
        let mut i0 = anchor_start;
        let mut i1 = other_start;

        while i0 < anchor.len() && i1 < other.len() {
            if anchor[i0].pc_text != other[i1].pc_text {
                break;
            }
            length += 1;

            i0 = step(anchor, i0);
            i1 = step(other, i1);
        }

        if i1 >= other.len() {
            return Some(Probe {
                length,
                anchor_start,
                other_start,
                anchor_end: i0,
                other_end: i1,
            });
        }

        trace_log!(other_start, length, "candidate rejected");
        other_start = step(other, other_start);
    }

    None
}

/// Probe in both directions and keep the longer match. Ties go to the probe
/// anchored on `b`.
pub fn locate(a: &Trace, b: &Trace) -> Result<Window, AlignmentError> {
    let from_a = probe(&a.insts, &b.insts);
    let from_b = probe(&b.insts, &a.insts);

    debug!(
        anchored_on_a = ?from_a.map(|p| p.length),
        anchored_on_b = ?from_b.map(|p| p.length),
        "probed"
    );

    let window = match (from_a, from_b) {
        (Some(pa), Some(pb)) if pa.length > pb.length => Window::from_probe(pa, true),
        (Some(pa), None) => Window::from_probe(pa, true),
        (_, Some(pb)) => Window::from_probe(pb, false),
        (None, None) => return Err(AlignmentError::NoCommonRegion),
    };

    Ok(window)
}
