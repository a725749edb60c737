//! In-memory pipeline trace model.
//!
//! A [`Trace`] owns its instructions, which own their stages, which own their
//! parameters. The alignment engine only ever moves whole [`Instruction`]s
//! around; stage contents are carried through untouched.

use std::fmt;

pub mod commit;
pub use commit::CommitStage;

#[cfg(test)]
pub(crate) mod testing;

/// Free-form key/value attached to a stage, e.g. cache miss info.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stage {
    /// Absolute clock tick the stage began at
    pub cycle: u64,
    pub identifier: char,
    pub name: String,
    pub color: u32,
    pub params: Vec<Parameter>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// false for alignment padding
    pub valid: bool,
    pub tid: u8,
    pub pc: u64,
    /// identity key when matching across traces, compared as text
    pub pc_text: String,
    pub text: String,
    pub committed: bool,
    pub stages: Vec<Stage>,
}

impl Instruction {
    /// Placeholder used to line up indices between two traces.
    pub fn dummy() -> Self {
        Self {
            valid: false,
            tid: 0,
            pc: 0,
            pc_text: String::new(),
            text: String::new(),
            committed: false,
            stages: Vec::new(),
        }
    }

    pub fn is_dummy(&self) -> bool {
        !self.valid
    }

    /// Does any stage of this instruction mark it as retired?
    pub fn retired_by(&self, commit: &CommitStage) -> bool {
        self.stages.iter().any(|s| commit.matches(s))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trace {
    pub name: String,
    pub insts: Vec<Instruction>,
}

impl Trace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            insts: Vec::new(),
        }
    }

    pub fn with_insts(name: impl Into<String>, insts: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            insts,
        }
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn committed_count(&self) -> usize {
        self.insts.iter().filter(|i| i.committed).count()
    }

    pub fn dummy_count(&self) -> usize {
        self.insts.iter().filter(|i| i.is_dummy()).count()
    }

    /// Recompute the committed flag of every real instruction.
    pub fn mark_committed(&mut self, commit: &CommitStage) {
        for inst in self.insts.iter_mut().filter(|i| i.valid) {
            inst.committed = inst.retired_by(commit);
        }
    }

    pub fn trim_text(&mut self) {
        for inst in &mut self.insts {
            let trimmed = inst.text.trim_start_matches(' ');
            if trimmed.len() != inst.text.len() {
                inst.text = trimmed.to_string();
            }
        }
    }

    /// Drops every squashed (valid but never retired) instruction, returning
    /// how many were removed.
    pub fn remove_squashed(&mut self) -> usize {
        let before = self.insts.len();
        self.insts.retain(|i| !i.valid || i.committed);
        before - self.insts.len()
    }

    /// First real instruction with stages at or after `pos`.
    pub fn valid_at_or_after(&self, pos: usize) -> Option<(usize, &Instruction)> {
        self.insts
            .iter()
            .enumerate()
            .skip(pos)
            .find(|(_, i)| i.valid && !i.stages.is_empty())
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------------trace {}--------------", self.name)?;
        for inst in &self.insts {
            if inst.is_dummy() {
                writeln!(f, "I]- <dummy>")?;
                continue;
            }

            // broadcasts carry no meaningful pc
            if inst.text.contains("BCAST") {
                writeln!(f, "I]{} {}", inst.tid, inst.text)?;
            } else {
                writeln!(f, "I]{} 0x{:09x} {}", inst.tid, inst.pc, inst.text)?;
            }

            for stage in &inst.stages {
                writeln!(
                    f,
                    "S]{} {} {} {}",
                    stage.cycle, stage.identifier, stage.color, stage.name
                )?;
                for param in &stage.params {
                    writeln!(f, "P]{}", param.name)?;
                    writeln!(f, "V]{}", param.value)?;
                }
            }
        }
        Ok(())
    }
}
