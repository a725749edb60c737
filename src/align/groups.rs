//! Commit group scanning.
//!
//! A commit group is a run of squashed instructions terminated by exactly one
//! committed instruction. Walking a trace group by group is just hopping from
//! one committed instruction to the next.

use crate::trace::Instruction;

/// Outcome of a scan for a committed instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seek {
    /// None when the scan ran off the end (or start) of the trace
    pub index: Option<usize>,
    /// positions advanced before stopping
    pub skipped: usize,
}

impl Seek {
    /// Where a forward scan stopped, with `len` standing for "ran off the end".
    pub fn or_end(&self, len: usize) -> usize {
        self.index.unwrap_or(len)
    }
}

pub fn next_committed(insts: &[Instruction], index: usize) -> Seek {
    let found = insts
        .iter()
        .enumerate()
        .skip(index)
        .find(|(_, i)| i.committed)
        .map(|(i, _)| i);

    let skipped = found.unwrap_or_else(|| insts.len().max(index)) - index;

    Seek {
        index: found,
        skipped,
    }
}

/// Backward version of [`next_committed`]. `index` may be anywhere; scanning
/// starts at the last instruction if it points past the end.
pub fn prev_committed(insts: &[Instruction], index: usize) -> Seek {
    let Some(start) = insts.len().checked_sub(1).map(|last| last.min(index)) else {
        return Seek {
            index: None,
            skipped: 0,
        };
    };

    let found = insts[..=start].iter().rposition(|i| i.committed);

    let skipped = match found {
        Some(i) => start - i,
        None => start + 1,
    };

    Seek {
        index: found,
        skipped,
    }
}
