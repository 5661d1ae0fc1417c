//! AI event sink (spec.md §3.1, §4.5): the core only fires events into a
//! registered sink; deciding how an NPC reacts is external content, out of
//! scope for this crate (spec.md §1).

use crate::ids::ObjectId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiEvent {
    GotHit { attacker: ObjectId },
    Attacked { attacker: ObjectId },
    TargetDeath { target: ObjectId },
    Death,
    CombatRound,
    AfterCombatRound,
}

pub trait AiEventSink {
    fn on_event(&mut self, mob: ObjectId, event: AiEvent);
}

/// No-op sink for mobs that haven't been wired to an AI/scripting layer.
#[derive(Default)]
pub struct NullAiSink;

impl AiEventSink for NullAiSink {
    fn on_event(&mut self, _mob: ObjectId, _event: AiEvent) {}
}
