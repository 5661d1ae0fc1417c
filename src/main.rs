//! Process entry point: startup wiring only (spec.md §2 "Glue" component).
//! Telnet/terminal I/O, persistence, and content authoring are external
//! collaborators (spec.md §1) this binary does not implement; it wires the
//! core runtime together and drives the game clock.

use std::time::{Duration, Instant};

use mud_core::attributes::archetype::StaticRegistry;
use mud_core::clock::GameClock;
use mud_core::command::CommandRegistry;
use mud_core::config::EngineConfig;
use mud_core::logging;
use mud_core::registry::StaticTemplateRegistry;
use mud_core::world::World;

fn main() {
    if let Err(err) = logging::setup_logging(logging::Info) {
        eprintln!("failed to initialize logging: {err}");
        return;
    }

    let config = EngineConfig::default();
    let mut world = World::new(config.clone());
    let archetypes = StaticRegistry::default();
    let templates = StaticTemplateRegistry::default();
    // Verb implementations (look, move, attack, ...) are content, wired in by
    // whatever embeds this runtime (spec.md §1); the core only drives the
    // queue those commands were enqueued onto.
    let commands = CommandRegistry::new();
    let mut clock = GameClock::new(config.combat_round_period_secs, config.regen_period_secs, config.reset_period_secs);

    log::info!("mud-core runtime starting");

    let tick_period = Duration::from_secs(1);
    loop {
        let started = Instant::now();
        commands.tick_queues(&mut world, 1);
        clock.advance(&mut world, &archetypes, &templates, 1);

        let elapsed = started.elapsed();
        if elapsed < tick_period {
            std::thread::sleep(tick_period - elapsed);
        }
    }
}
