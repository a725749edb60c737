//! Fixture builders shared by the unit tests.

use super::{Instruction, Stage, Trace};

pub fn stage(cycle: u64, identifier: char, name: &str) -> Stage {
    Stage {
        cycle,
        identifier,
        name: name.to_string(),
        color: 0,
        params: Vec::new(),
    }
}

pub fn inst(pc_text: &str, stages: &[Stage]) -> Instruction {
    Instruction {
        valid: true,
        tid: 0,
        pc: 0,
        pc_text: pc_text.to_string(),
        text: String::new(),
        committed: false,
        stages: stages.to_vec(),
    }
}

fn speculative(pc: &str, n: usize) -> Instruction {
    let mut i = inst(&format!("{pc}~s{n}"), &[stage(n as u64, 'F', "fetch")]);
    i.text = format!("squashed before {pc}");
    i
}

fn retired(pc: &str) -> Instruction {
    let mut i = inst(pc, &[stage(0, 'F', "fetch"), stage(1, 'R', "retire")]);
    i.text = format!("insn {pc}");
    i.committed = true;
    i
}

/// One commit group per entry: `n` squashed instructions followed by the
/// retired instruction at `pc`.
pub fn groups(name: &str, groups: &[(&str, usize)]) -> Trace {
    let mut insts = Vec::new();
    for (pc, n) in groups {
        insts.extend((0..*n).map(|k| speculative(pc, k)));
        insts.push(retired(pc));
    }
    Trace::with_insts(name, insts)
}

/// Every instruction retires, one group per pc.
pub fn committed(name: &str, pcs: &[&str]) -> Trace {
    let g: Vec<_> = pcs.iter().map(|pc| (*pc, 0)).collect();
    groups(name, &g)
}

/// Appends `n` squashed instructions that never reach a retirement.
pub fn with_tail(mut trace: Trace, n: usize) -> Trace {
    trace
        .insts
        .extend((0..n).map(|k| speculative("tail", k)));
    trace
}

/// Lengths of the complete commit groups, committed instruction included.
pub fn group_lens(trace: &Trace) -> Vec<usize> {
    let mut lens = Vec::new();
    let mut run = 0;
    for i in &trace.insts {
        run += 1;
        if i.committed {
            lens.push(run);
            run = 0;
        }
    }
    lens
}

/// Dummies at the start of every complete commit group.
pub fn group_pads(trace: &Trace) -> Vec<usize> {
    let mut pads = Vec::new();
    let mut run = 0;
    for i in &trace.insts {
        if i.is_dummy() {
            run += 1;
        }
        if i.committed {
            pads.push(run);
            run = 0;
        }
    }
    pads
}

pub fn committed_pcs(trace: &Trace) -> Vec<&str> {
    trace
        .insts
        .iter()
        .filter(|i| i.committed)
        .map(|i| i.pc_text.as_str())
        .collect()
}

pub fn real(trace: &Trace) -> Vec<&Instruction> {
    trace.insts.iter().filter(|i| i.valid).collect()
}
