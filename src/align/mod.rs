//! Dual trace alignment.
//!
//! Two traces of (nominally) the same dynamic instruction stream rarely start
//! and stop at the same instruction, and they squash different numbers of
//! instructions along the way. Aligning them is done in three steps:
//!
//! 1. [`region::locate`] finds the window where the committed pcs agree
//! 2. [`edges::reconcile`] cuts off or pads everything outside that window
//! 3. [`sync::synchronize`] pads each commit group so committed instructions
//!    of both traces end up on the same index
//!
//! Afterwards both traces have the same length and can be drawn side by side.

use std::collections::TryReserveError;

use strum::{Display, IntoStaticStr};
use thiserror::Error;
use tracing::info;

use crate::trace::Trace;

pub mod edges;
pub mod groups;
pub mod region;
pub mod sync;

pub use region::Window;
pub use sync::SyncReport;

#[derive(Error, Debug)]
pub enum AlignmentError {
    #[error("could not find a common stream of instructions, traces do not match")]
    NoCommonRegion,
    #[error("trace {trace} has no committed instructions")]
    NoCommittedInstructions { trace: String },
    #[error("growing trace: {0}")]
    Allocation(#[from] TryReserveError),
}

/// How the edges outside the common window are dealt with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum EdgePolicy {
    /// drop everything outside the window
    Cutoff,
    /// keep everything, pad the edges with dummies
    Padding,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlignConfig {
    /// pad the edges instead of cutting them off
    pub disable_start_end_cutoff: bool,
    /// stop after the edges, don't pad the commit groups
    pub disable_dummy_sync: bool,
}

impl AlignConfig {
    pub fn edge_policy(&self) -> EdgePolicy {
        if self.disable_start_end_cutoff {
            EdgePolicy::Padding
        } else {
            EdgePolicy::Cutoff
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alignment {
    pub window: Window,
    /// None if group synchronization was disabled
    pub sync: Option<SyncReport>,
}

fn ensure_committed(trace: &Trace) -> Result<(), AlignmentError> {
    if trace.insts.iter().any(|i| i.committed) {
        Ok(())
    } else {
        Err(AlignmentError::NoCommittedInstructions {
            trace: trace.name.clone(),
        })
    }
}

/// Aligns `a` and `b` in place.
///
/// On error the traces are left untouched, except for
/// [`AlignmentError::Allocation`] which may leave them half way.
pub fn align(
    a: &mut Trace,
    b: &mut Trace,
    config: &AlignConfig,
) -> Result<Alignment, AlignmentError> {
    ensure_committed(a)?;
    ensure_committed(b)?;

    let window = region::locate(a, b)?;
    let policy = config.edge_policy();
    info!(
        length = window.length,
        start_a = window.start_a,
        start_b = window.start_b,
        end_a = window.end_a,
        end_b = window.end_b,
        %policy,
        "found common region"
    );

    edges::reconcile(a, b, &window, policy)?;

    if config.disable_dummy_sync {
        info!(len_a = a.len(), len_b = b.len(), "aligned edges only");
        return Ok(Alignment { window, sync: None });
    }

    let report = sync::synchronize(a, b)?;
    info!(len = a.len(), groups = report.groups, "aligned");

    Ok(Alignment {
        window,
        sync: Some(report),
    })
}
