//! Engine-wide tunables, ingested as a normalized config document (spec.md
//! §1 lists persistence/config as an external collaborator; the core only
//! consumes the parsed result).

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Combat round cadence, in seconds (spec.md §4.9).
    pub combat_round_period_secs: u64,
    /// Regeneration cadence, in seconds (spec.md §4.8, §4.9).
    pub regen_period_secs: u64,
    /// Reset cadence, in seconds (spec.md §4.9: "resets every configured
    /// interval per dungeon" — modeled here as one global default interval
    /// rather than per-dungeon overrides, since no per-dungeon override
    /// mechanism is named elsewhere in the spec).
    pub reset_period_secs: u64,
    /// Out-of-combat regeneration fraction of each max, per tick.
    pub regen_rest_fraction: f64,
    /// In-combat regeneration fraction of each max, per tick.
    pub regen_combat_fraction: f64,
    /// One-shot "rest" action regeneration fraction.
    pub regen_action_fraction: f64,
    /// Exhaustion recovered per regen tick while resting.
    pub exhaustion_rest_recovery: i64,
    /// Exhaustion recovered per regen tick while in combat.
    pub exhaustion_combat_recovery: i64,
    /// Exhaustion recovered by the one-shot "rest" action — higher than
    /// `exhaustion_rest_recovery`, matching the elevated health/mana
    /// fraction the same action applies (spec.md §4.8).
    pub exhaustion_action_recovery: i64,
    /// Default symmetric damage variation range, as a percentage (spec.md §4.5.1).
    pub default_damage_variation_pct: f64,
    /// Threat required to displace the current target, as a multiplier (spec.md §4.5.3).
    pub threat_grace_multiplier: f64,
    /// Threat an NPC's threat table gains from being attacked, outside of damage dealt (spec.md §4.5.5).
    pub initial_aggro_threat: f64,
    /// Per-cycle threat decay multiplier once an entry has started expiring (spec.md §4.5.2).
    pub threat_decay_factor: f64,
    /// Threat value below which a decaying entry is removed.
    pub threat_floor: f64,
    /// Accuracy roll is clamped to [accuracy_floor, accuracy_ceiling] (spec.md §4.5).
    pub accuracy_floor: f64,
    pub accuracy_ceiling: f64,
    /// Defense/resilience mitigation coefficient applied to raw damage (spec.md §4.5 step 5).
    pub mitigation_coefficient: f64,
    /// Passive `pure_power` multiplier coefficient (spec.md §4.5 step 2).
    pub pure_power_coefficient: f64,
}

impl EngineConfig {
    /// Parses a config document (spec.md §1: persistence/config is an
    /// external collaborator; the core only consumes the parsed result).
    /// Any field absent from `text` keeps its `Default` value via
    /// `#[serde(default)]`.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            combat_round_period_secs: 3,
            regen_period_secs: 30,
            reset_period_secs: 300,
            regen_rest_fraction: 0.10,
            regen_combat_fraction: 0.01,
            regen_action_fraction: 0.33,
            exhaustion_rest_recovery: 10,
            exhaustion_combat_recovery: 1,
            exhaustion_action_recovery: 33,
            default_damage_variation_pct: 20.0,
            threat_grace_multiplier: 1.10,
            initial_aggro_threat: 1.0,
            threat_decay_factor: 0.67,
            threat_floor: 100.0,
            accuracy_floor: 5.0,
            accuracy_ceiling: 95.0,
            mitigation_coefficient: 0.05,
            pure_power_coefficient: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.combat_round_period_secs, 3);
        assert_eq!(cfg.regen_period_secs, 30);
        assert_eq!(cfg.threat_grace_multiplier, 1.10);
    }

    #[test]
    fn partial_json_document_keeps_remaining_defaults() {
        let cfg = EngineConfig::from_json(r#"{"combat_round_period_secs": 6}"#).unwrap();
        assert_eq!(cfg.combat_round_period_secs, 6);
        assert_eq!(cfg.regen_period_secs, 30);
    }
}
