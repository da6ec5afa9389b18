//! Arena runner
//! Headless competitive run: AI rivals vs a scripted player policy

use clap::Parser;
use magnate::core::config::EngineConfig;
use magnate::engine::clock::SimulationClock;
use magnate::session::notify::NullSink;
use magnate::session::persist::MemoryStore;
use magnate::session::room::RoomSetup;
use std::sync::Arc;

/// Arena runner - let the engine fight itself to a conclusion
#[derive(Parser, Debug)]
#[command(name = "arena_runner")]
#[command(about = "Run a headless business-war simulation to completion")]
struct Args {
    /// Random seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Maximum ticks before calling it a stalemate
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,

    /// Number of AI rivals
    #[arg(long, default_value_t = 3)]
    ai_count: u32,

    /// Print standings every n ticks (0 = quiet)
    #[arg(long, default_value_t = 1_000)]
    report_every: u64,

    /// Optional TOML scenario file overriding the default config
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match EngineConfig::from_toml_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Could not load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };
    config.seed = args.seed;
    config.ai_count = args.ai_count;

    let room = RoomSetup::single_player("Meridian Holdings", config);
    let mut clock = SimulationClock::with_collaborators(
        room,
        None,
        Arc::new(NullSink),
        Some(Arc::new(MemoryStore::new())),
    );

    println!(
        "Arena: {} rivals, seed {}, up to {} ticks",
        args.ai_count, args.seed, args.max_ticks
    );

    let cooldown = clock.config().decision_cooldown_ticks;
    for tick in 1..=args.max_ticks {
        clock.step();

        // The scripted player mirrors the AI heuristic: buy the cheapest
        // open building while rich, otherwise hire
        if tick % cooldown == 0 {
            run_player_policy(&mut clock);
        }

        if args.report_every > 0 && tick % args.report_every == 0 {
            print_standings(&clock);
        }

        if clock.world().status.is_over() {
            break;
        }
    }

    println!();
    println!("=== Final (tick {}) ===", clock.world().tick);
    print_standings(&clock);
    match &clock.world().status {
        status if status.is_over() => {
            let winner = status
                .winner()
                .and_then(|id| clock.world().company(id))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "nobody".into());
            println!(
                "Outcome: {} wins - {}",
                winner,
                status.reason().unwrap_or_default()
            );
        }
        _ => println!("Outcome: stalemate at the tick limit"),
    }
}

fn run_player_policy(clock: &mut SimulationClock) {
    let world = clock.world();
    let Some(player) = world.player() else {
        return;
    };
    if !player.is_active() {
        return;
    }

    if player.capital > 200_000 {
        if let Some(building) = world.available_buildings().first() {
            let id = building.id;
            let _ = clock.command_purchase(id);
            return;
        }
    }
    if player.capital > 50_000 {
        let _ = clock.command_recruit();
    }
}

fn print_standings(clock: &SimulationClock) {
    for company in clock.world().standings() {
        println!(
            "  t{:6} {}{} capital {:9} buildings {}",
            clock.world().tick,
            company.name,
            if company.is_player { "*" } else { " " },
            company.capital,
            company.buildings.len()
        );
    }
}
