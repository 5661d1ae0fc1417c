//! The game clock (spec.md §4.9): three independent cadences driven by a
//! single external tick source, run cooperatively to completion in a fixed
//! order rather than as separate OS threads (spec.md §5: "single-threaded
//! cooperative... there is no lock discipline because there is no shared
//! data race").

use crate::attributes::archetype::ArchetypeRegistry;
use crate::registry::TemplateRegistry;
use crate::world::World;

/// Accumulated elapsed time per cadence, in whole seconds; each cadence
/// fires its callback to completion before its next due tick is scheduled.
pub struct GameClock {
    combat_round_period_secs: u64,
    regen_period_secs: u64,
    reset_period_secs: u64,
    combat_elapsed: u64,
    regen_elapsed: u64,
    reset_elapsed: u64,
    /// Set by `shut_down`; once true, `advance` becomes a no-op.
    shutting_down: bool,
}

impl GameClock {
    pub fn new(combat_round_period_secs: u64, regen_period_secs: u64, reset_period_secs: u64) -> Self {
        GameClock {
            combat_round_period_secs,
            regen_period_secs,
            reset_period_secs,
            combat_elapsed: 0,
            regen_elapsed: 0,
            reset_elapsed: 0,
            shutting_down: false,
        }
    }

    /// Advances the clock by `elapsed_secs` of wall time, running any
    /// cadence whose period has elapsed. Each cadence can fire at most once
    /// per call even if multiple periods have accumulated, so a long host
    /// stall does not cause a burst of catch-up rounds.
    pub fn advance(&mut self, world: &mut World, archetypes: &dyn ArchetypeRegistry, templates: &dyn TemplateRegistry, elapsed_secs: u64) {
        if self.shutting_down {
            return;
        }
        world.tick += elapsed_secs;

        self.combat_elapsed += elapsed_secs;
        if self.combat_elapsed >= self.combat_round_period_secs {
            self.combat_elapsed = 0;
            world.combat_round();
        }

        // Effect instances run their own per-instance timers (next_tick,
        // keyed off world.tick in whole seconds), independent of the three
        // named cadences, so this runs every advance() rather than being
        // gated behind the regen cadence.
        world.process_effect_ticks(archetypes);

        self.regen_elapsed += elapsed_secs;
        if self.regen_elapsed >= self.regen_period_secs {
            self.regen_elapsed = 0;
            world.process_regen_tick();
        }

        self.reset_elapsed += elapsed_secs;
        if self.reset_elapsed >= self.reset_period_secs {
            self.reset_elapsed = 0;
            run_all_resets(world, templates);
        }
    }

    /// Graceful shutdown (spec.md §4.9): cancels all timers, flushes
    /// character action queues, and quiesces the combat set.
    pub fn shut_down(&mut self, world: &mut World) {
        self.shutting_down = true;
        for queue in world.characters.values_mut().map(|c| &mut c.action_queue) {
            queue.cancel();
        }
        world.combat_set.clear();
        for mob in world.combat_order().to_vec() {
            world.set_combat_target(mob, None);
        }
    }
}

/// A global "execute all resets" pass (spec.md §4.7).
fn run_all_resets(world: &mut World, templates: &dyn TemplateRegistry) {
    let dungeon_ids: Vec<crate::spatial::dungeon::DungeonId> = world.resets.keys().cloned().collect();
    for dungeon_id in dungeon_ids {
        let mut resets = match world.resets.remove(&dungeon_id) {
            Some(r) => r,
            None => continue,
        };
        for reset in resets.iter_mut() {
            if let Err(err) = reset.execute(&mut world.graph, &world.dungeons, templates) {
                log::error!("reset {:?} failed: {err}", reset.id);
            }
        }
        world.resets.insert(dungeon_id, resets);
    }
}
