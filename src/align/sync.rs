//! Per commit group padding.
//!
//! Corresponding commit groups of the two traces are widened to the same
//! length by putting dummies in front of the shorter one, which makes every
//! pair of committed instructions share an index.
//!
//! The vectors grow in place. Sizing walks forward, placement walks backward
//! from the end of the grown vector, so the write position never drops below
//! the next instruction still to be read.

use std::cmp::max;

use tracing::{debug, trace as trace_log, warn};

use super::{
    groups::{next_committed, prev_committed},
    AlignmentError,
};
use crate::trace::{Instruction, Trace};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// commit group pairs that were lined up
    pub groups: usize,
    /// length of the lined up region
    pub synced_len: usize,
    /// instructions after the last paired group, per trace
    pub leftover_a: usize,
    pub leftover_b: usize,
}

/// Length of the commit group whose committed instruction is at `last`.
fn group_len(insts: &[Instruction], last: usize) -> usize {
    match last.checked_sub(1) {
        Some(before) => prev_committed(insts, before).skipped + 1,
        None => 1,
    }
}

fn grow(trace: &mut Trace, len: usize) -> Result<(), AlignmentError> {
    trace.insts.try_reserve(len.saturating_sub(trace.len()))?;
    trace.insts.resize_with(len, Instruction::dummy);
    Ok(())
}

/// Move `num_shift` instructions ending (exclusive) at `src_end` so they end
/// at `dest_end`, and put `num_dummy` dummies right below them.
///
/// `dest_end` must not be below `src_end`; going high to low, each swap only
/// ever displaces padding.
fn shift_add_dummy(
    insts: &mut [Instruction],
    dest_end: usize,
    src_end: usize,
    num_dummy: usize,
    num_shift: usize,
) {
    debug_assert!(dest_end >= src_end);

    let mut to = dest_end;
    let mut from = src_end;
    for _ in 0..num_shift {
        to -= 1;
        from -= 1;
        insts.swap(to, from);
    }
    for _ in 0..num_dummy {
        to -= 1;
        insts[to] = Instruction::dummy();
    }
}

fn report_leftovers(trace: &Trace, from: usize) {
    let leftover = &trace.insts[from..];
    if leftover.is_empty() {
        return;
    }

    let committed = leftover.iter().filter(|i| i.committed).count();
    if committed > 0 {
        warn!(
            trace = %trace.name,
            committed,
            total = leftover.len(),
            "unpaired commit groups left over, appended without lining up"
        );
    } else {
        debug!(trace = %trace.name, total = leftover.len(), "trailing squashed instructions");
    }
}

pub fn synchronize(a: &mut Trace, b: &mut Trace) -> Result<SyncReport, AlignmentError> {
    // sizing
    let mut i0 = 0;
    let mut i1 = 0;
    let mut total = 0;
    let mut groups = 0;
    loop {
        let s0 = next_committed(&a.insts, i0);
        let s1 = next_committed(&b.insts, i1);
        let (Some(c0), Some(c1)) = (s0.index, s1.index) else {
            break;
        };

        let m0 = s0.skipped + 1;
        let m1 = s1.skipped + 1;
        trace_log!(group = groups, m0, m1, "sized");

        total += max(m0, m1);
        groups += 1;
        i0 = c0 + 1;
        i1 = c1 + 1;
    }

    report_leftovers(a, i0);
    report_leftovers(b, i1);

    let (len_a, len_b) = (a.len(), b.len());
    let leftover_a = len_a - i0;
    let leftover_b = len_b - i1;
    let len = total + max(leftover_a, leftover_b);

    grow(a, len)?;
    grow(b, len)?;

    // leftovers go right after the lined up region, padded at the very end
    shift_add_dummy(&mut a.insts, total + leftover_a, len_a, 0, leftover_a);
    shift_add_dummy(&mut b.insts, total + leftover_b, len_b, 0, leftover_b);

    // placement
    let mut shift_to = total;
    while let (Some(last0), Some(last1)) = (i0.checked_sub(1), i1.checked_sub(1)) {
        let m0 = group_len(&a.insts, last0);
        let m1 = group_len(&b.insts, last1);
        let m = max(m0, m1);

        shift_add_dummy(&mut a.insts, shift_to, i0, m - m0, m0);
        shift_add_dummy(&mut b.insts, shift_to, i1, m - m1, m1);

        shift_to -= m;
        i0 -= m0;
        i1 -= m1;
    }
    debug_assert_eq!(shift_to, 0);

    debug!(groups, synced_len = total, len, "synchronized commit groups");

    Ok(SyncReport {
        groups,
        synced_len: total,
        leftover_a,
        leftover_b,
    })
}

#[cfg(test)]
mod tests {
    use super::{shift_add_dummy, synchronize, SyncReport};
    use crate::trace::testing::{committed, group_lens, group_pads, groups, real, with_tail};
    use crate::trace::Instruction;

    #[test]
    fn scenario() {
        // group lengths [2, 1, 3] and [1, 4, 3]
        let mut a = groups("a", &[("P0", 1), ("P1", 0), ("P2", 2)]);
        let mut b = groups("b", &[("P0", 0), ("P1", 3), ("P2", 2)]);

        let report = synchronize(&mut a, &mut b).unwrap();
        assert_eq!(
            report,
            SyncReport {
                groups: 3,
                synced_len: 9,
                leftover_a: 0,
                leftover_b: 0,
            }
        );

        assert_eq!(a.len(), 9);
        assert_eq!(b.len(), 9);
        assert_eq!(group_lens(&a), vec![2, 4, 3]);
        assert_eq!(group_lens(&b), vec![2, 4, 3]);
        assert_eq!(group_pads(&a), vec![0, 3, 0]);
        assert_eq!(group_pads(&b), vec![1, 0, 0]);
    }

    #[test]
    fn committed_share_indices() {
        let mut a = groups("a", &[("A", 3), ("B", 0), ("C", 1), ("D", 5)]);
        let mut b = groups("b", &[("A", 0), ("B", 2), ("C", 1), ("D", 0)]);
        let committed_a: Vec<_> = a.insts.iter().filter(|i| i.committed).cloned().collect();

        synchronize(&mut a, &mut b).unwrap();

        assert_eq!(a.len(), b.len());
        for (x, y) in a.insts.iter().zip(&b.insts) {
            assert_eq!(x.committed, y.committed);
            if x.committed {
                assert_eq!(x.pc_text, y.pc_text);
            }
        }

        // committed instructions come through untouched
        let after: Vec<_> = a.insts.iter().filter(|i| i.committed).cloned().collect();
        assert_eq!(after, committed_a);
    }

    #[test]
    fn padding_is_on_the_left() {
        let mut a = groups("a", &[("A", 0)]);
        let mut b = groups("b", &[("A", 2)]);

        synchronize(&mut a, &mut b).unwrap();

        assert!(a.insts[0].is_dummy());
        assert!(a.insts[1].is_dummy());
        assert!(a.insts[2].committed);
        assert!(!b.insts[0].is_dummy());
        assert!(b.insts[2].committed);
    }

    #[test]
    fn real_instructions_keep_order() {
        let mut a = with_tail(groups("a", &[("A", 2), ("B", 1), ("C", 0)]), 2);
        let mut b = groups("b", &[("A", 0), ("B", 3), ("C", 4)]);
        let before_a: Vec<_> = real(&a).into_iter().cloned().collect();
        let before_b: Vec<_> = real(&b).into_iter().cloned().collect();

        synchronize(&mut a, &mut b).unwrap();

        assert_eq!(real(&a).into_iter().cloned().collect::<Vec<_>>(), before_a);
        assert_eq!(real(&b).into_iter().cloned().collect::<Vec<_>>(), before_b);
    }

    #[test]
    fn leftovers_appended_and_padded() {
        // a has an extra group X and a squashed tail, b only a squashed tail
        let mut a = with_tail(groups("a", &[("P0", 1), ("P1", 0), ("X", 2)]), 1);
        let mut b = with_tail(groups("b", &[("P0", 0), ("P1", 2)]), 3);

        let report = synchronize(&mut a, &mut b).unwrap();
        assert_eq!(report.groups, 2);
        assert_eq!(report.synced_len, 5);
        assert_eq!(report.leftover_a, 4);
        assert_eq!(report.leftover_b, 3);

        assert_eq!(a.len(), 9);
        assert_eq!(b.len(), 9);

        // lined up part
        assert_eq!(a.insts[1].pc_text, "P0");
        assert_eq!(b.insts[1].pc_text, "P0");
        assert_eq!(a.insts[4].pc_text, "P1");
        assert_eq!(b.insts[4].pc_text, "P1");

        // leftovers in original order, b padded at the end
        assert_eq!(a.insts[7].pc_text, "X");
        assert!(a.insts[8].valid);
        assert!(b.insts[5].valid && b.insts[7].valid);
        assert!(b.insts[8].is_dummy());
    }

    #[test]
    fn identical_traces_unchanged() {
        let mut a = groups("a", &[("A", 1), ("B", 2)]);
        let mut b = a.clone();
        let original = a.clone();

        synchronize(&mut a, &mut b).unwrap();

        assert_eq!(a, original);
        assert_eq!(b, original);
    }

    #[test]
    fn single_instruction() {
        let mut a = committed("a", &["A"]);
        let mut b = committed("b", &["A"]);

        let report = synchronize(&mut a, &mut b).unwrap();
        assert_eq!(report.groups, 1);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn overlapping_shift() {
        let mut insts = groups("t", &[("A", 1)]).insts;
        insts.resize_with(4, Instruction::dummy);

        // [s A d d] -> [d d s A], source and destination overlap by one
        shift_add_dummy(&mut insts, 4, 2, 1, 2);

        assert!(insts[0].is_dummy());
        assert!(insts[1].is_dummy());
        assert!(!insts[2].committed && insts[2].valid);
        assert_eq!(insts[3].pc_text, "A");
    }
}
