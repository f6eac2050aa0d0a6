use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use arena::init_logging;
use arena::prelude::*;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Policy {
    FirstTo,
    PlayOut,
}

impl From<Policy> for StopPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::FirstTo => StopPolicy::FirstTo,
            Policy::PlayOut => StopPolicy::PlayOut,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a competition between registered controllers.
    Run {
        /// Controller names, one per competitor (see `list`).
        #[arg(num_args = 2.., default_values_t = ["random".to_string(), "sweep".to_string()])]
        players: Vec<String>,
        #[arg(long, default_value_t = 10)]
        width: i32,
        #[arg(long, default_value_t = 10)]
        height: i32,
        /// Ship lengths, comma separated.
        #[arg(long, value_delimiter = ',', default_values_t = [5, 4, 3, 3, 2])]
        ships: Vec<usize>,
        /// Per-call time limit in milliseconds.
        #[arg(long, default_value_t = 200)]
        time_limit_ms: u64,
        #[arg(long, default_value_t = 3)]
        target: u32,
        #[arg(long, value_enum, default_value_t = Policy::FirstTo)]
        policy: Policy,
        #[arg(long, help = "Fix RNG seed for reproducible turn order (e.g., --seed 12345)")]
        seed: Option<u64>,
        /// Stop after this many rounds whatever the policy says.
        #[arg(long, default_value_t = 100)]
        max_rounds: u32,
        /// Attach board snapshots to events.
        #[arg(long)]
        snapshots: bool,
        /// Write the event log to this file.
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// List registered controllers.
    List,
    /// Print a saved event log.
    Replay {
        path: PathBuf,
        /// Replay at recorded pace divided by this factor. Omit to print at once.
        #[arg(long)]
        speed: Option<f64>,
    },
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .context("failed to start the runtime")?;
    let result = runtime.block_on(run(cli));
    // Controllers abandoned after a timeout may still be running.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let registry = ControllerRegistry::builtin();
    match cli.command {
        Commands::List => {
            for info in registry.iter() {
                println!("{:<10} {:<8} {:?}", info.name, info.version, info.modes);
            }
        }
        Commands::Run {
            players,
            width,
            height,
            ships,
            time_limit_ms,
            target,
            policy,
            seed,
            max_rounds,
            snapshots,
            save,
        } => {
            let config = MatchConfig {
                field: FieldSize::new(width, height),
                ship_lengths: ships,
                time_limit: Duration::from_millis(time_limit_ms),
                target_wins: target,
                policy: policy.into(),
                seed,
                max_rounds: Some(max_rounds),
                record_snapshots: snapshots,
            };
            let names: Vec<&str> = players.iter().map(String::as_str).collect();
            let mut competition = Competition::from_registry(config, &registry, &names)?;
            if let Some(s) = seed {
                println!("Using fixed seed: {} (turn order will be reproducible)", s);
            }
            let result = competition.run().await;

            println!("{} rounds played{}", result.rounds, if result.stopped { " (stopped)" } else { "" });
            for standing in &result.standings {
                println!("{:>3}  {}", standing.score, standing.name);
            }
            match result.leader() {
                Some(leader) => println!("Winner: {}", leader.name),
                None => println!("No outright winner"),
            }

            if let Some(path) = save {
                let file = File::create(&path)
                    .with_context(|| format!("cannot create {}", path.display()))?;
                competition.log().write_to(BufWriter::new(file))?;
                println!("Event log written to {}", path.display());
            }
        }
        Commands::Replay { path, speed } => {
            let file = File::open(&path).with_context(|| format!("cannot open {}", path.display()))?;
            let log = EventLog::read_from(BufReader::new(file))?;
            let pacing = match speed {
                Some(speed) => Pacing::Recorded { speed },
                None => Pacing::Immediate,
            };
            let mut replay = log.replay();
            while let Some(event) = replay.play(pacing).await {
                println!("{}", event);
            }
        }
    }
    Ok(())
}
