//! JSON interchange for traces.
//!
//! Mirrors the dptv trace schema (`name`, `insts`, `stages`, `params`) so a
//! converter can hand traces over without linking against this crate.

use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

use crate::trace::{CommitStage, Instruction, Parameter, Stage, Trace};

#[derive(Debug, Deserialize)]
struct RawTrace {
    name: Option<String>,
    insts: Vec<RawInstruction>,
}

#[derive(Debug, Deserialize)]
struct RawInstruction {
    #[serde(default)]
    tid: u8,
    pc: String,
    text: String,
    #[serde(default)]
    stages: Vec<RawStage>,
}

#[derive(Debug, Deserialize)]
struct RawStage {
    cycle: u64,
    id: String,
    name: String,
    #[serde(default)]
    color: u32,
    #[serde(default)]
    params: Vec<RawParameter>,
}

#[derive(Debug, Deserialize)]
struct RawParameter {
    name: String,
    value: String,
}

fn parse_pc(text: &str) -> u64 {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u64::from_str_radix(digits, 16).unwrap_or(0)
}

impl From<RawStage> for Stage {
    fn from(raw: RawStage) -> Self {
        Stage {
            cycle: raw.cycle,
            identifier: raw.id.chars().next().unwrap_or(' '),
            name: raw.name,
            color: raw.color,
            params: raw
                .params
                .into_iter()
                .map(|p| Parameter {
                    name: p.name,
                    value: p.value,
                })
                .collect(),
        }
    }
}

impl RawInstruction {
    fn build(self, commit: &CommitStage) -> Instruction {
        let mut inst = Instruction {
            valid: true,
            tid: self.tid,
            pc: parse_pc(&self.pc),
            pc_text: self.pc,
            text: self.text,
            committed: false,
            stages: self.stages.into_iter().map(Stage::from).collect(),
        };
        inst.committed = inst.retired_by(commit);
        inst
    }
}

fn build(raw: RawTrace, fallback_name: &str, commit: &CommitStage) -> Trace {
    let insts = raw
        .insts
        .into_iter()
        .map(|i| i.build(commit))
        .collect();

    Trace {
        name: raw.name.unwrap_or_else(|| fallback_name.to_string()),
        insts,
    }
}

pub fn from_str(data: &str, commit: &CommitStage) -> anyhow::Result<Trace> {
    let raw: RawTrace = serde_json::from_str(data).context("parsing trace")?;
    Ok(build(raw, "trace", commit))
}

pub fn from_path(path: &Path, commit: &CommitStage) -> anyhow::Result<Trace> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let raw: RawTrace = serde_json::from_str(&data)
        .with_context(|| format!("parsing trace {}", path.display()))?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trace".to_string());

    let trace = build(raw, &stem, commit);
    debug!(
        name = %trace.name,
        insts = trace.len(),
        committed = trace.committed_count(),
        "loaded"
    );
    Ok(trace)
}
