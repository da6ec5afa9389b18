//! Magnate - Entry Point
//!
//! Interactive driver for the competition engine: sets up the async
//! runtime, builds a single-player room, and steps the simulation from
//! a small command loop. AI rivals think through the inference
//! collaborator when LLM_API_KEY is set and fall back to the built-in
//! heuristic when it is not.

use magnate::core::config::EngineConfig;
use magnate::core::error::Result;
use magnate::engine::clock::SimulationClock;
use magnate::llm::client::LlmClient;
use magnate::market::manipulation::ManipulationKind;
use magnate::session::notify::LogSink;
use magnate::session::persist::MemoryStore;
use magnate::session::room::RoomSetup;

use std::io::{self, Write};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("magnate=info")
        .init();

    tracing::info!("Magnate starting...");

    // Async runtime for inference calls; the guard keeps the handle
    // current so the clock can spawn decision requests
    let rt = Runtime::new()?;
    let _guard = rt.enter();

    // Try to create the LLM client (optional - works without it)
    let llm_client = LlmClient::from_env().ok().map(Arc::new);
    if llm_client.is_none() {
        tracing::warn!("LLM_API_KEY not set - AI rivals use the heuristic policy");
    }

    let room = RoomSetup::single_player("Meridian Holdings", EngineConfig::default());
    let mut clock = SimulationClock::with_collaborators(
        room,
        llm_client,
        Arc::new(LogSink),
        Some(Arc::new(MemoryStore::new())),
    );

    println!("\n=== MAGNATE ===");
    println!("A business-war simulation: outgrow, outbid, and outmaneuver your rivals");
    println!();
    println!("Commands:");
    println!("  tick / t          - Advance simulation by one tick");
    println!("  run <n>           - Run n simulation ticks");
    println!("  status / s        - Company standings");
    println!("  buildings / b     - Building list with owners");
    println!("  market / m        - Instrument prices");
    println!("  events / e        - Recent competition events");
    println!("  buy <n>           - Send an agent to buy building n");
    println!("  recruit           - Hire an employee (50,000)");
    println!("  attack <n>        - Send an agent to seize building n");
    println!("  spy <company>     - Espionage run against a rival");
    println!("  takeover <company>- Hostile takeover bid");
    println!("  book <sym>        - Order-book depth for an instrument");
    println!("  manip <sym> <kind>- Market manipulation (e.g. manip KST rumor)");
    println!("  quit / q          - Exit");
    println!();

    loop {
        display_status(&clock);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }

        if input == "tick" || input == "t" {
            clock.step();
            println!("Tick {} complete.", clock.world().tick);
            continue;
        }

        if let Some(rest) = input.strip_prefix("run ") {
            if let Ok(n) = rest.trim().parse::<u64>() {
                println!("Running {} ticks...", n);
                clock.run_n(n);
                println!("Now at tick {}.", clock.world().tick);
            } else {
                println!("Usage: run <number>");
            }
            continue;
        }

        if input == "status" || input == "s" {
            display_standings(&clock);
            continue;
        }
        if input == "buildings" || input == "b" {
            display_buildings(&clock);
            continue;
        }
        if input == "market" || input == "m" {
            display_market(&clock);
            continue;
        }
        if input == "events" || input == "e" {
            display_events(&clock);
            continue;
        }

        if input == "recruit" {
            report(clock.command_recruit());
            continue;
        }

        if let Some(rest) = input.strip_prefix("buy ") {
            match building_by_index(&clock, rest) {
                Some(id) => report(clock.command_purchase(id)),
                None => println!("Usage: buy <building number> (see 'buildings')"),
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("attack ") {
            match building_by_index(&clock, rest) {
                Some(id) => report(clock.command_attack(id)),
                None => println!("Usage: attack <building number> (see 'buildings')"),
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("spy ") {
            match clock.world().company_by_name(rest).map(|c| c.id) {
                Some(id) => report(clock.command_spy(id)),
                None => println!("No company matching '{}'", rest),
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("takeover ") {
            match clock.world().company_by_name(rest).map(|c| c.id) {
                Some(id) => match clock.command_takeover(id) {
                    Ok(outcome) => println!("{:?}", outcome),
                    Err(e) => println!("Takeover failed: {}", e),
                },
                None => println!("No company matching '{}'", rest),
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("book ") {
            match clock.world().market.order_book(rest.trim()) {
                Some(book) => {
                    println!();
                    println!("=== {} depth ===", book.symbol);
                    for (bid, ask) in book.bids.iter().zip(book.asks.iter()) {
                        println!(
                            "  bid {:>10.2} x {:<8} | ask {:>10.2} x {}",
                            bid.price, bid.quantity, ask.price, ask.quantity
                        );
                    }
                    println!();
                }
                None => println!("No instrument '{}'", rest.trim()),
            }
            continue;
        }

        if let Some(rest) = input.strip_prefix("manip ") {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next().and_then(ManipulationKind::parse)) {
                (Some(symbol), Some(kind)) => report(clock.command_manipulate(symbol, kind)),
                _ => println!("Usage: manip <symbol> <rumor|wash|leak|short|pump|raid|corner>"),
            }
            continue;
        }

        println!("Unknown command. Try: tick, run <n>, status, buildings, market, events, quit");
    }

    println!(
        "\nGoodbye! Final state: tick {}, {} companies still active.",
        clock.world().tick,
        clock.world().active_companies().count()
    );
    Ok(())
}

fn report(result: Result<()>) {
    match result {
        Ok(()) => println!("Done."),
        Err(e) => println!("Rejected: {}", e),
    }
}

/// Resolve a 1-based index from the 'buildings' listing
fn building_by_index(clock: &SimulationClock, raw: &str) -> Option<magnate::core::types::BuildingId> {
    let index: usize = raw.trim().parse().ok()?;
    clock
        .world()
        .buildings
        .get(index.checked_sub(1)?)
        .map(|b| b.id)
}

/// Brief status banner shown before each prompt
fn display_status(clock: &SimulationClock) {
    let world = clock.world();
    println!();
    println!(
        "--- Tick {} | {} active companies | status: {:?} ---",
        world.tick,
        world.active_companies().count(),
        world.status
    );
    if let Some(player) = world.player() {
        println!(
            "  {} - capital {}, {} employees, {} buildings",
            player.name,
            player.capital,
            player.employees,
            player.buildings.len()
        );
    }
    println!();
}

fn display_standings(clock: &SimulationClock) {
    let world = clock.world();
    println!();
    println!("=== Standings (tick {}) ===", world.tick);
    for company in world.standings() {
        let share = world
            .analytics
            .market_share
            .get(&company.id)
            .copied()
            .unwrap_or(0.0);
        println!(
            "  {}{} - capital {}, {} buildings, {} employees, {:.1}% share",
            company.name,
            if company.is_player { " (you)" } else { "" },
            company.capital,
            company.buildings.len(),
            company.employees,
            share
        );
    }
    println!(
        "  intensity {:.0} | risk {:.0}",
        world.analytics.intensity, world.analytics.risk_level
    );
    println!();
}

fn display_buildings(clock: &SimulationClock) {
    let world = clock.world();
    println!();
    println!("=== Buildings ===");
    for (i, building) in world.buildings.iter().enumerate() {
        let owner = building
            .owner
            .and_then(|id| world.company(id))
            .map(|c| c.name.as_str())
            .unwrap_or("for sale");
        println!(
            "  {:2}. {} (level {}, income {}/tick, cost {}) - {}",
            i + 1,
            building.name,
            building.level,
            building.income,
            building.purchase_cost(),
            owner
        );
    }
    println!();
}

fn display_market(clock: &SimulationClock) {
    let world = clock.world();
    println!();
    println!("=== Market ===");
    for stock in &world.market.stocks {
        println!(
            "  {} {} - {:.2} ({:+.2}%), vol {}, day {:.2}/{:.2}",
            stock.symbol,
            stock.name,
            stock.price,
            stock.change_percent(),
            stock.volume,
            stock.day_low,
            stock.day_high
        );
    }
    for item in world.market.news.latest(3) {
        println!("  news[{}]: {}", item.symbol, item.headline);
    }
    println!();
}

fn display_events(clock: &SimulationClock) {
    println!();
    println!("=== Recent events ===");
    for event in clock.events().latest(10) {
        println!("  t{} {:?}: {}", event.tick, event.kind, event.description);
    }
    println!();
}
