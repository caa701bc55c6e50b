//! Skyflap entry point
//!
//! The web build is driven from JavaScript through `platform::web`. Natively
//! this plays a few autopilot runs, records them to a local score file and
//! prints the resulting leaderboard.
//!
//! Usage: `skyflap [scores.json] [runs]`

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_SCORES_PATH: &str = "skyflap-scores.json";

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_RUNS: u32 = 5;

/// Longest demo run before it is cut off
#[cfg(not(target_arch = "wasm32"))]
const MAX_RUN_SECONDS: f32 = 120.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Skyflap (native) starting...");

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| DEFAULT_SCORES_PATH.to_string());
    let runs = match args.next().map(|s| s.parse::<u32>()) {
        Some(Ok(runs)) => runs,
        Some(Err(e)) => {
            eprintln!("invalid run count: {e}");
            std::process::exit(2);
        }
        None => DEFAULT_RUNS,
    };

    if let Err(e) = run_demo(&path, runs) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run_demo(path: &str, runs: u32) -> Result<(), Box<dyn std::error::Error>> {
    use skyflap::leaderboard::{LocalStore, Reconciler};
    use skyflap::sim::{Engine, GameEvent, autopilot};
    use skyflap::{Settings, platform};

    let settings = Settings::load();
    let reconciler = Reconciler::new(LocalStore::open(path)?);
    let base_seed = settings.practice_seed.unwrap_or_else(platform::now_ms);
    log::info!(
        "Playing {} runs on {} (seed {})",
        runs,
        settings.preset.as_str(),
        base_seed
    );

    for i in 0..runs {
        let seed = base_seed.wrapping_add(u64::from(i));
        let mut engine = Engine::new(settings.engine_config(), seed)?;
        let (snapshot, events) = autopilot::play_run(&mut engine, MAX_RUN_SECONDS);

        let crash = events.iter().find_map(|event| match event {
            GameEvent::Crashed { cause, .. } => Some(*cause),
            _ => None,
        });
        match crash {
            Some(cause) => log::info!("Run {} crashed ({:?}) at {}", i + 1, cause, snapshot.score),
            None => log::info!("Run {} timed out at {}", i + 1, snapshot.score),
        }

        let user_id = format!("autopilot-{}", i % 3 + 1);
        let name = format!("Autopilot {}", i % 3 + 1);
        reconciler.ensure_profile(&user_id, Some(&name))?;
        let best = reconciler.record_score(&user_id, snapshot.score, None)?;
        println!("run {:>2}: {:>12} scored {:>3} (best {})", i + 1, user_id, snapshot.score, best);
    }

    println!("\nLeaderboard ({}):", reconciler.store().location());
    for entry in reconciler.fetch_leaderboard(settings.leaderboard_limit())? {
        println!("{:>3}. {:<14} {:>4}", entry.rank, entry.username, entry.best_score);
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
