use std::path::PathBuf;

use anyhow::{bail, Context};
use dptalign::{align, load, AlignConfig, CommitStage, Trace};
use itertools::Itertools;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(argh::FromArgs)]
/// line up two pipeline traces
struct Arguments {
    #[argh(positional)]
    /// one or two trace files (json)
    traces: Vec<PathBuf>,

    #[argh(option, short = 'c', default = "CommitStage::default()")]
    /// commit stage, a stage name or a single character stage id
    commit: CommitStage,

    #[argh(switch)]
    /// remove squashed instructions before aligning
    rsquash: bool,

    #[argh(switch)]
    /// don't pad commit groups with dummy instructions
    ddummy: bool,

    #[argh(switch)]
    /// pad the start and end instead of cutting them off
    dcutoff: bool,

    #[argh(switch, short = 'd')]
    /// print every instruction of the resulting traces
    dump: bool,
}

fn summary(trace: &Trace) -> String {
    format!(
        "{}: {} instructions, {} committed, {} dummies",
        trace.name,
        trace.len(),
        trace.committed_count(),
        trace.dummy_count()
    )
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dptalign=info")),
        )
        .with_target(false)
        .init();

    let Arguments {
        traces,
        commit,
        rsquash,
        ddummy,
        dcutoff,
        dump,
    } = argh::from_env();

    match traces.len() {
        0 => bail!("no trace files given"),
        1 | 2 => {}
        n => bail!("at most two traces can be compared, got {}", n),
    }

    let mut traces = traces
        .iter()
        .map(|path| load::from_path(path, &commit))
        .collect::<anyhow::Result<Vec<_>>>()?;

    for trace in &mut traces {
        trace.trim_text();
        if rsquash {
            let removed = trace.remove_squashed();
            info!(trace = %trace.name, removed, "removed squashed instructions");
        }
    }

    if let [a, b] = traces.as_mut_slice() {
        let config = AlignConfig {
            disable_start_end_cutoff: dcutoff,
            disable_dummy_sync: ddummy,
        };
        let policy: &'static str = config.edge_policy().into();

        let alignment = align(a, b, &config).context("aligning traces")?;
        println!(
            "common region: {} committed instructions ({})",
            alignment.window.length, policy
        );
    }

    if dump {
        for trace in &traces {
            print!("{}", trace);
        }
    } else {
        println!("{}", traces.iter().map(summary).join("\n"));
    }

    Ok(())
}
