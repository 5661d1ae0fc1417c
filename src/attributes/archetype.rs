//! Race/job archetypes are external content, looked up read-only
//! (spec.md §1, §4.3). The core only needs a base+growth table per
//! attribute and resource cap.

use super::{PrimaryAttributes, ResourceCaps};

#[derive(Clone, Copy, Default, Debug)]
pub struct ArchetypeTable {
    pub base_primary: PrimaryAttributes,
    pub growth_primary: PrimaryAttributes,
    pub base_resources: ResourceCaps,
    pub growth_resources: ResourceCaps,
}

/// Read-only lookup into externally-authored race/job content (spec.md §1:
/// "archetype/ability content registries... consumed through a read-only
/// lookup interface").
pub trait ArchetypeRegistry {
    fn race(&self, id: &str) -> Option<&ArchetypeTable>;
    fn job(&self, id: &str) -> Option<&ArchetypeTable>;
}

/// Read-only lookup for whether a mob has learned an ability, used by
/// ability-gated commands (spec.md §4.4) and by passive lookups such as
/// `pure_power` (spec.md §4.5).
pub trait AbilityRegistry {
    fn exists(&self, id: &str) -> bool;
}

/// In-memory test double / minimal content source for embedding callers
/// that have not wired a real content pipeline yet.
#[derive(Default)]
pub struct StaticRegistry {
    pub races: std::collections::HashMap<String, ArchetypeTable>,
    pub jobs: std::collections::HashMap<String, ArchetypeTable>,
    pub abilities: std::collections::HashSet<String>,
}

impl ArchetypeRegistry for StaticRegistry {
    fn race(&self, id: &str) -> Option<&ArchetypeTable> {
        self.races.get(id)
    }

    fn job(&self, id: &str) -> Option<&ArchetypeTable> {
        self.jobs.get(id)
    }
}

impl AbilityRegistry for StaticRegistry {
    fn exists(&self, id: &str) -> bool {
        self.abilities.contains(id)
    }
}
