use std::time::Duration;

use arena::{Competition, ControllerRegistry, MatchConfig, StopPolicy};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <seed> [seed...]", args[0]);
        std::process::exit(1);
    }
    let seeds = args[1..]
        .iter()
        .map(|s| s.parse::<u64>())
        .collect::<Result<Vec<_>, _>>()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()?;
    let registry = ControllerRegistry::builtin();

    let mut matches = Vec::new();
    for seed in seeds {
        let config = MatchConfig {
            seed: Some(seed),
            policy: StopPolicy::PlayOut,
            max_rounds: Some(25),
            ..MatchConfig::default()
        };
        let mut competition = Competition::from_registry(config, &registry, &["random", "sweep"])?;
        let result = runtime.block_on(competition.run());
        let accolades: usize = competition.log().iter().map(|e| e.accolades.len()).sum();
        matches.push(json!({
            "seed": seed,
            "rounds": result.rounds,
            "standings": result.standings,
            "winner": result.leader().map(|s| s.name.clone()),
            "events": competition.log().len(),
            "accolades": accolades,
        }));
    }
    runtime.shutdown_timeout(Duration::from_millis(100));

    println!("{}", serde_json::to_string(&json!({ "matches": matches }))?);
    Ok(())
}
