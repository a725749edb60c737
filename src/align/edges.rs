//! Reconciling the traces with the common window, either by cutting off what
//! lies outside it or by padding the edges so both windows line up.

use std::iter;

use tracing::debug;

use super::{region::Window, AlignmentError, EdgePolicy};
use crate::trace::{Instruction, Trace};

/// Insert `count` dummies in front of `pos`.
fn insert_dummies(
    trace: &mut Trace,
    pos: usize,
    count: usize,
) -> Result<(), AlignmentError> {
    if count == 0 {
        return Ok(());
    }
    trace.insts.try_reserve(count)?;
    trace
        .insts
        .splice(pos..pos, iter::repeat_with(Instruction::dummy).take(count));
    Ok(())
}

/// Keep only `[start, end)`.
fn cut(trace: &mut Trace, start: usize, end: usize) {
    trace.insts.truncate(end);
    trace.insts.drain(..start.min(end));
}

pub fn reconcile(
    a: &mut Trace,
    b: &mut Trace,
    window: &Window,
    policy: EdgePolicy,
) -> Result<(), AlignmentError> {
    match policy {
        EdgePolicy::Cutoff => {
            cut(a, window.start_a, window.end_a);
            cut(b, window.start_b, window.end_b);
            debug!(len_a = a.len(), len_b = b.len(), "cut off edges");
        }
        EdgePolicy::Padding => {
            let add_start_a = window.start_b.saturating_sub(window.start_a);
            let add_start_b = window.start_a.saturating_sub(window.start_b);
            insert_dummies(a, 0, add_start_a)?;
            insert_dummies(b, 0, add_start_b)?;

            // leading dummies pushed the ends back
            let end_a = window.end_a + add_start_a;
            let end_b = window.end_b + add_start_b;

            let add_end_a = end_b.saturating_sub(end_a);
            let add_end_b = end_a.saturating_sub(end_b);
            insert_dummies(a, end_a, add_end_a)?;
            insert_dummies(b, end_b, add_end_b)?;

            debug!(add_start_a, add_start_b, add_end_a, add_end_b, "padded edges");
        }
    }

    Ok(())
}
