//! Character sessions and outbound messaging (spec.md §3.1, §6). A
//! character is a player session bound to a mob; observable effects on
//! characters are line-oriented messages grouped by audience.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::command::queue::ActionQueue;
use crate::ids::ObjectId;

/// Message groups (spec.md §6): delivery order within a group preserves
/// emission order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum MessageGroup {
    Info,
    Combat,
    Action,
    System,
    CommandResponse,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub group: MessageGroup,
    pub text: String,
}

/// How a character's action queue behaves when a new command arrives while
/// one is already mid-cooldown (spec.md §4.4.1 names the setting but leaves
/// the taxonomy to content; this engine supports the two obvious modes).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CombatBusyMode {
    /// Queue the new command behind the running one (default).
    Queue,
    /// Drop the running command's remaining cooldown and execute immediately.
    Interrupt,
}

impl Default for CombatBusyMode {
    fn default() -> Self {
        CombatBusyMode::Queue
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CharacterSettings {
    pub autoloot: bool,
    pub autosacrifice: bool,
    pub combat_busy_mode: CombatBusyMode,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Character {
    pub mob: ObjectId,
    pub credential_id: String,
    pub settings: CharacterSettings,
    #[serde(skip)]
    pub queue: VecDeque<Message>,
    pub action_queue: ActionQueue,
}

impl Character {
    pub fn new(mob: ObjectId, credential_id: impl Into<String>) -> Self {
        Character {
            mob,
            credential_id: credential_id.into(),
            settings: CharacterSettings::default(),
            queue: VecDeque::new(),
            action_queue: ActionQueue::new(),
        }
    }

    pub fn push_message(&mut self, group: MessageGroup, text: impl Into<String>) {
        self.queue.push_back(Message { group, text: text.into() });
    }

    pub fn drain_messages(&mut self) -> Vec<Message> {
        self.queue.drain(..).collect()
    }
}
