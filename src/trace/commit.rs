use std::{fmt, str::FromStr};

use super::Stage;

/// Which stage marks an instruction as retired.
///
/// gem5 derived traces name the stage (`retire`), dptv traces tag it with a
/// single character identifier (`R`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitStage {
    Name(String),
    Identifier(char),
}

impl CommitStage {
    pub fn matches(&self, stage: &Stage) -> bool {
        match self {
            CommitStage::Name(name) => stage.name == *name,
            CommitStage::Identifier(id) => stage.identifier == *id,
        }
    }
}

impl Default for CommitStage {
    fn default() -> Self {
        Self::Name("retire".to_string())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CommitStageError {
    #[error("empty commit stage")]
    Empty,
}

impl FromStr for CommitStage {
    type Err = CommitStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Err(CommitStageError::Empty),
            (Some(c), None) => Ok(Self::Identifier(c)),
            _ => Ok(Self::Name(s.to_string())),
        }
    }
}

impl fmt::Display for CommitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitStage::Name(n) => write!(f, "{}", n),
            CommitStage::Identifier(c) => write!(f, "{}", c),
        }
    }
}
