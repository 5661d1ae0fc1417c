//! The command registry (spec.md §4.4): ordered command list, two-pass
//! argument resolution against the entity graph, and dispatch either
//! synchronous or through the actor's action queue.

use std::collections::HashMap;

use crate::attributes::archetype::AbilityRegistry;
use crate::command::arg::{ArgKind, ObjectSource, ParsedValue};
use crate::command::pattern::CompiledPattern;
use crate::command::queue::QueuedCommand;
use crate::entity::graph::Graph;
use crate::entity::object::ObjectKind;
use crate::error::ParseError;
use crate::ids::ObjectId;
use crate::messaging::CombatBusyMode;
use crate::world::World;

#[derive(Clone, Debug)]
pub enum ResolvedValue {
    Text(String),
    Word(String),
    Number(i64),
    Direction(crate::spatial::direction::Direction),
    Object(ObjectId),
}

pub type ResolvedArgs = HashMap<String, ResolvedValue>;

pub type HandlerFn = dyn Fn(ObjectId, &ResolvedArgs, &mut World);

pub struct Command {
    pub name: String,
    pattern: CompiledPattern,
    aliases: Vec<CompiledPattern>,
    pub priority: i32,
    pub required_ability: Option<String>,
    pub cooldown_secs: u64,
    handler: Box<HandlerFn>,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        pattern_text: &str,
        handler: impl Fn(ObjectId, &ResolvedArgs, &mut World) + 'static,
    ) -> Self {
        Command {
            name: name.into(),
            pattern: crate::command::pattern::compile(pattern_text),
            aliases: Vec::new(),
            priority: 0,
            required_ability: None,
            cooldown_secs: 0,
            handler: Box::new(handler),
        }
    }

    pub fn with_alias(mut self, pattern_text: &str) -> Self {
        self.aliases.push(crate::command::pattern::compile(pattern_text));
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_ability_gate(mut self, ability: impl Into<String>) -> Self {
        self.required_ability = Some(ability.into());
        self
    }

    pub fn with_cooldown(mut self, cooldown_secs: u64) -> Self {
        self.cooldown_secs = cooldown_secs;
        self
    }

    fn patterns(&self) -> impl Iterator<Item = &CompiledPattern> {
        std::iter::once(&self.pattern).chain(self.aliases.iter())
    }

    fn pattern_len(&self) -> usize {
        self.pattern.arg_names.len()
    }
}

fn candidate_pool(graph: &Graph, actor: ObjectId, source: &ObjectSource) -> Vec<ObjectId> {
    match source {
        ObjectSource::Room => graph
            .room_ancestor(actor)
            .and_then(|room| graph.get(room))
            .map(|r| r.base.contents.clone())
            .unwrap_or_default(),
        ObjectSource::Inventory => graph.get(actor).map(|o| o.base.contents.clone()).unwrap_or_default(),
        ObjectSource::Equipment => graph
            .get(actor)
            .and_then(|o| o.as_mob())
            .map(|m| m.equipped.values().copied().collect())
            .unwrap_or_default(),
        ObjectSource::All => {
            let mut pool = candidate_pool(graph, actor, &ObjectSource::Room);
            pool.extend(candidate_pool(graph, actor, &ObjectSource::Inventory));
            pool
        }
        ObjectSource::Other(_) => Vec::new(),
    }
}

fn kind_matches(graph: &Graph, id: ObjectId, kind: &ArgKind) -> bool {
    let Some(obj) = graph.get(id) else { return false };
    match kind {
        ArgKind::Object(_) => true,
        ArgKind::Item(_) => matches!(obj.kind, ObjectKind::Item(_)),
        ArgKind::Equipment(_) => matches!(obj.kind, ObjectKind::Equipment(_)),
        ArgKind::Mob(_) => obj.as_mob().is_some(),
        ArgKind::Character(_) => obj.as_mob().map(|m| m.is_character()).unwrap_or(false),
        _ => false,
    }
}

/// Resolves one object-like placeholder's candidate pool (spec.md §4.4
/// resolution policy). `resolved` holds already-resolved sibling args for
/// `@<other_arg>` sourcing.
fn resolve_pool(
    graph: &Graph,
    actor: ObjectId,
    source: &ObjectSource,
    resolved: &ResolvedArgs,
) -> Vec<ObjectId> {
    match source {
        ObjectSource::Other(name) => match resolved.get(name) {
            Some(ResolvedValue::Object(container)) => {
                graph.get(*container).map(|o| o.base.contents.clone()).unwrap_or_default()
            }
            _ => Vec::new(),
        },
        other => candidate_pool(graph, actor, other),
    }
}

fn resolve_object_arg(
    graph: &Graph,
    actor: ObjectId,
    name: &str,
    kind: &ArgKind,
    query: &crate::command::arg::ObjectQuery,
    resolved: &ResolvedArgs,
) -> Result<ObjectId, ParseError> {
    let source = kind.source().expect("object-like kind");
    let pool = resolve_pool(graph, actor, source, resolved);
    let matches: Vec<ObjectId> =
        pool.into_iter().filter(|id| kind_matches(graph, *id, kind) && graph.matches(*id, &query.keywords)).collect();
    if query.index == 0 {
        return Err(ParseError::UnparseableArg { arg: name.to_string() });
    }
    matches
        .get(query.index as usize - 1)
        .copied()
        .ok_or_else(|| ParseError::UnparseableArg { arg: name.to_string() })
}

/// One command's introspectable shape, for an external helpfile layer
/// (spec.md §4.4 ambient addition: the core exposes the data, not the
/// rendering).
pub struct CommandDescription {
    pub name: String,
    pub patterns: Vec<String>,
    pub required_ability: Option<String>,
    pub cooldown_secs: u64,
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        CommandRegistry::default()
    }

    /// Inserts and re-sorts by (priority desc, pattern length desc,
    /// insertion order) (spec.md §4.4).
    pub fn register(&mut self, command: Command) {
        self.commands.push(command);
        self.commands.sort_by(|a, b| b.priority.cmp(&a.priority).then(b.pattern_len().cmp(&a.pattern_len())));
    }

    /// Lists every registered command in dispatch order with its pattern
    /// texts, for an external helpfile/autocomplete layer to render
    /// (spec.md §4.4 ambient addition; the core does not render help text).
    pub fn describe(&self) -> Vec<CommandDescription> {
        self.commands
            .iter()
            .map(|c| CommandDescription {
                name: c.name.clone(),
                patterns: c.patterns().map(|p| p.source().to_string()).collect(),
                required_ability: c.required_ability.clone(),
                cooldown_secs: c.cooldown_secs,
            })
            .collect()
    }

    /// `execute(input, ctx)` (spec.md §4.4). Returns `false` only if no
    /// command pattern matched at all.
    pub fn execute(&self, actor: ObjectId, input: &str, world: &mut World) -> bool {
        match self.resolve_match(actor, input, world) {
            Some(Ok((command, resolved))) => {
                self.run(command, actor, input, resolved, world);
                true
            }
            Some(Err(err)) => {
                world.report_parse_error(actor, err);
                true
            }
            None => false,
        }
    }

    /// Finds the first command+pattern that matches `input` and resolves
    /// its object arguments. `None` means no pattern matched at all;
    /// `Some(Err(_))` means a pattern matched but argument resolution
    /// failed (spec.md §4.4: missing/unparseable args still "claim" the
    /// input so no later, looser command is tried instead).
    fn resolve_match<'a>(&'a self, actor: ObjectId, input: &str, world: &World) -> Option<Result<(&'a Command, ResolvedArgs), ParseError>> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        for command in &self.commands {
            if let Some(ability) = &command.required_ability {
                let knows = world.graph.get(actor).and_then(|o| o.as_mob()).map(|m| m.knows(ability)).unwrap_or(false);
                if !knows {
                    continue;
                }
            }

            for pattern in command.patterns() {
                let parsed = match pattern.parse(trimmed) {
                    Ok(values) => values,
                    Err(ParseError::PatternMismatch) => continue,
                    Err(err) => return Some(Err(err)),
                };

                return Some(resolve_all(&world.graph, actor, pattern, parsed).map(|resolved| (command, resolved)));
            }
        }

        None
    }

    fn run(&self, command: &Command, actor: ObjectId, raw_input: &str, resolved: ResolvedArgs, world: &mut World) {
        if command.cooldown_secs == 0 {
            (command.handler)(actor, &resolved, world);
            return;
        }

        if world.character_queue_mut(actor).is_none() {
            (command.handler)(actor, &resolved, world);
            return;
        }

        // CombatBusyMode::Interrupt drops the running command's remaining
        // cooldown instead of queuing behind it (spec.md §4.4.1).
        let interrupt = world.characters.get(&actor).map(|c| c.settings.combat_busy_mode == CombatBusyMode::Interrupt).unwrap_or(false)
            && world.character_queue_mut(actor).map(|q| q.is_busy()).unwrap_or(false);

        if interrupt {
            world.character_queue_mut(actor).expect("checked above").interrupt();
            (command.handler)(actor, &resolved, world);
            if let Some(queue) = world.character_queue_mut(actor) {
                queue.finish_with_cooldown(command.cooldown_secs);
            }
            return;
        }

        let run_now = world.character_queue_mut(actor).expect("checked above").enqueue(QueuedCommand { raw_input: raw_input.to_string() });
        if run_now {
            world.character_queue_mut(actor).expect("just enqueued").start_next();
            (command.handler)(actor, &resolved, world);
            if let Some(queue) = world.character_queue_mut(actor) {
                queue.finish_with_cooldown(command.cooldown_secs);
            }
        } else {
            world.notify_queued(actor);
        }
    }

    /// Advances every character's action-queue cooldown by `elapsed_secs`
    /// and, for any whose cooldown just expired with a command still
    /// pending, re-resolves and runs it (spec.md §4.4.1). Resolution
    /// happens against current world state, not a snapshot taken at
    /// enqueue time, since the actor/room/inventory may have changed while
    /// queued.
    pub fn tick_queues(&self, world: &mut World, elapsed_secs: u64) {
        let mobs: Vec<ObjectId> = world.characters.keys().copied().collect();
        for mob in mobs {
            let just_expired = world.character_queue_mut(mob).map(|q| q.tick_cooldown(elapsed_secs)).unwrap_or(false);
            if !just_expired {
                continue;
            }
            let has_pending = world.character_queue_mut(mob).map(|q| q.has_pending()).unwrap_or(false);
            if !has_pending {
                continue;
            }
            let Some(cmd) = world.character_queue_mut(mob).and_then(|q| q.start_next()) else { continue };

            match self.resolve_match(mob, &cmd.raw_input, world) {
                Some(Ok((command, resolved))) => {
                    (command.handler)(mob, &resolved, world);
                    if let Some(queue) = world.character_queue_mut(mob) {
                        queue.finish_with_cooldown(command.cooldown_secs);
                    }
                }
                Some(Err(err)) => {
                    world.report_parse_error(mob, err);
                    if let Some(queue) = world.character_queue_mut(mob) {
                        queue.finish_with_cooldown(0);
                    }
                }
                None => {
                    if let Some(queue) = world.character_queue_mut(mob) {
                        queue.finish_with_cooldown(0);
                    }
                }
            }
        }
    }
}

/// Both resolution passes (spec.md §4.4): simple args and non-`@<other>`
/// object args first, then `@<other_arg>`-sourced args against the
/// now-resolved siblings.
fn resolve_all(
    graph: &Graph,
    actor: ObjectId,
    pattern: &CompiledPattern,
    parsed: HashMap<String, ParsedValue>,
) -> Result<ResolvedArgs, ParseError> {
    let mut resolved = ResolvedArgs::new();
    let mut deferred = Vec::new();

    for (name, value) in parsed {
        match value {
            ParsedValue::Text(t) => {
                resolved.insert(name, ResolvedValue::Text(t));
            }
            ParsedValue::Word(w) => {
                resolved.insert(name, ResolvedValue::Word(w));
            }
            ParsedValue::Number(n) => {
                resolved.insert(name, ResolvedValue::Number(n));
            }
            ParsedValue::Direction(d) => {
                resolved.insert(name, ResolvedValue::Direction(d));
            }
            ParsedValue::Object(query) => {
                let kind = pattern.arg_kind(&name).expect("placeholder kind present").clone();
                if matches!(kind.source(), Some(ObjectSource::Other(_))) {
                    deferred.push((name, kind, query));
                } else {
                    let id = resolve_object_arg(graph, actor, &name, &kind, &query, &resolved)?;
                    resolved.insert(name, ResolvedValue::Object(id));
                }
            }
        }
    }

    for (name, kind, query) in deferred {
        let id = resolve_object_arg(graph, actor, &name, &kind, &query, &resolved)?;
        resolved.insert(name, ResolvedValue::Object(id));
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{PrimaryAttributes, ResourceCaps, Resources, SecondaryAttributes};
    use crate::config::EngineConfig;
    use crate::entity::object::{BehaviorFlags, DungeonObject, Mob, ObjectBase};
    use crate::messaging::Character;
    use crate::world::World;
    use std::collections::HashMap as Map;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn mob_object(id: ObjectId) -> DungeonObject {
        DungeonObject {
            base: ObjectBase::new(id, vec!["hero".to_string()], "a hero"),
            kind: ObjectKind::Mob(Mob {
                level: 1,
                experience: 0,
                race: "human".to_string(),
                job: "warrior".to_string(),
                primary: PrimaryAttributes::default(),
                caps: ResourceCaps { max_health: 10, max_mana: 10 },
                current: Resources { health: 10, mana: 10, exhaustion: 0 },
                secondary: SecondaryAttributes::default(),
                equipped: Map::new(),
                learned_abilities: Map::new(),
                flags: BehaviorFlags::empty(),
                character: None,
                threat: None,
                active_effects: Vec::new(),
                combat_target: None,
                gold: 0,
                type_relationships: Map::new(),
            }),
        }
    }

    #[test]
    fn describe_lists_commands_in_dispatch_order() {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("look", "look", |_, _, _| {}));
        registry.register(Command::new("rest", "rest", |_, _, _| {}).with_cooldown(5));

        let described = registry.describe();
        assert_eq!(described.len(), 2);
        assert!(described.iter().any(|d| d.name == "look" && d.patterns == vec!["look".to_string()]));
        assert!(described.iter().any(|d| d.name == "rest" && d.cooldown_secs == 5));
    }

    #[test]
    fn cooldown_gated_command_queues_then_drains_on_tick() {
        let mut world = World::new(EngineConfig::default());
        let mob_id = world.graph.insert(mob_object(ObjectId(1)));
        world.characters.insert(mob_id, Character::new(mob_id, "player-1"));

        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("attack", "attack", move |_, _, _| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }).with_cooldown(3));

        assert!(registry.execute(mob_id, "attack", &mut world));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(registry.execute(mob_id, "attack", &mut world));
        assert_eq!(count.load(Ordering::SeqCst), 1, "second call queues instead of running immediately");

        registry.tick_queues(&mut world, 2);
        assert_eq!(count.load(Ordering::SeqCst), 1, "cooldown hasn't expired yet");

        registry.tick_queues(&mut world, 1);
        assert_eq!(count.load(Ordering::SeqCst), 2, "queued command runs once the cooldown clears");
    }

    #[test]
    fn interrupt_mode_runs_immediately_instead_of_queuing() {
        let mut world = World::new(EngineConfig::default());
        let mob_id = world.graph.insert(mob_object(ObjectId(1)));
        let mut character = Character::new(mob_id, "player-1");
        character.settings.combat_busy_mode = crate::messaging::CombatBusyMode::Interrupt;
        world.characters.insert(mob_id, character);

        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("attack", "attack", move |_, _, _| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }).with_cooldown(3));

        assert!(registry.execute(mob_id, "attack", &mut world));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(registry.execute(mob_id, "attack", &mut world));
        assert_eq!(count.load(Ordering::SeqCst), 2, "interrupt mode runs immediately instead of queuing");
        assert!(!world.character_queue_mut(mob_id).unwrap().has_pending());
    }
}
