//! Threat tables (spec.md §4.5.2): owned by non-character mobs, mapping
//! attacker mob -> accumulated threat.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::ids::ObjectId;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ThreatEntry {
    pub value: f64,
    pub should_expire: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ThreatTable {
    entries: HashMap<ObjectId, ThreatEntry>,
    /// Whether the expiration ticker is currently running (spec.md §4.5.2:
    /// "if this is the first entry, start an expiration ticker").
    ticking: bool,
}

impl ThreatTable {
    pub fn new() -> Self {
        ThreatTable::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// No rate cap on accumulation: open question in spec.md §9, preserved
    /// as-is and surfaced via `EngineConfig` rather than hardcoded.
    pub fn add_threat(&mut self, attacker: ObjectId, amount: f64) {
        let was_empty = self.entries.is_empty();
        let entry = self.entries.entry(attacker).or_insert_with(ThreatEntry::default);
        entry.value += amount;
        entry.should_expire = false;
        if was_empty {
            self.ticking = true;
        }
    }

    pub fn get_threat(&self, attacker: ObjectId) -> f64 {
        self.entries.get(&attacker).map(|e| e.value).unwrap_or(0.0)
    }

    pub fn highest_threat_in_room(&self, in_room: impl Fn(ObjectId) -> bool) -> Option<ObjectId> {
        self.entries
            .iter()
            .filter(|(mob, _)| in_room(**mob))
            .max_by(|(_, a), (_, b)| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(mob, _)| *mob)
    }

    pub fn remove_threat(&mut self, mob: ObjectId) {
        self.entries.remove(&mob);
        if self.entries.is_empty() {
            self.ticking = false;
        }
    }

    pub fn clear_threat_table(&mut self) {
        self.entries.clear();
        self.ticking = false;
    }

    /// One expiration cycle (spec.md §4.5.2). `is_alive`, `is_co_located`,
    /// and `is_current_target` are callbacks against the owning NPC's
    /// current world state so the table itself stays pure data.
    pub fn tick_expiration(
        &mut self,
        config: &EngineConfig,
        is_alive: impl Fn(ObjectId) -> bool,
        is_co_located: impl Fn(ObjectId) -> bool,
        is_current_target: impl Fn(ObjectId) -> bool,
    ) {
        if !self.ticking {
            return;
        }
        let mut to_remove = Vec::new();
        for (mob, entry) in self.entries.iter_mut() {
            if !is_alive(*mob) {
                to_remove.push(*mob);
                continue;
            }
            if is_co_located(*mob) || is_current_target(*mob) {
                continue;
            }
            if !entry.should_expire {
                entry.should_expire = true;
            } else {
                entry.value = (entry.value * config.threat_decay_factor).floor();
                if entry.value < config.threat_floor {
                    to_remove.push(*mob);
                }
            }
        }
        for mob in to_remove {
            self.entries.remove(&mob);
        }
        if self.entries.is_empty() {
            self.ticking = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_threat_resets_expire_flag() {
        let mut t = ThreatTable::new();
        t.add_threat(ObjectId(1), 100.0);
        assert_eq!(t.get_threat(ObjectId(1)), 100.0);
        assert!(t.is_ticking());
    }

    #[test]
    fn expiration_decays_then_removes_below_floor() {
        let cfg = EngineConfig::default();
        let mut t = ThreatTable::new();
        t.add_threat(ObjectId(1), 1000.0);

        // Cycle 1: not co-located, not current target -> flag set, no change.
        t.tick_expiration(&cfg, |_| true, |_| false, |_| false);
        assert_eq!(t.get_threat(ObjectId(1)), 1000.0);

        // Cycle 2: decay by 0.67.
        t.tick_expiration(&cfg, |_| true, |_| false, |_| false);
        assert_eq!(t.get_threat(ObjectId(1)), (1000.0_f64 * 0.67).floor());
    }

    #[test]
    fn co_located_or_current_target_is_skipped() {
        let cfg = EngineConfig::default();
        let mut t = ThreatTable::new();
        t.add_threat(ObjectId(1), 50.0);
        t.tick_expiration(&cfg, |_| true, |_| true, |_| false);
        assert_eq!(t.get_threat(ObjectId(1)), 50.0);
        assert!(!t.entries.get(&ObjectId(1)).unwrap().should_expire);
    }

    #[test]
    fn dead_attacker_is_removed_immediately() {
        let cfg = EngineConfig::default();
        let mut t = ThreatTable::new();
        t.add_threat(ObjectId(1), 50.0);
        t.tick_expiration(&cfg, |_| false, |_| false, |_| false);
        assert_eq!(t.get_threat(ObjectId(1)), 0.0);
        assert!(t.is_empty());
    }
}
