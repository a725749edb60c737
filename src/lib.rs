pub mod align;
pub mod load;
pub mod trace;

pub use align::{align, AlignConfig, Alignment, AlignmentError};
pub use trace::{CommitStage, Instruction, Parameter, Stage, Trace};
