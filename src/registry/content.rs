//! Read-only lookup into externally-authored dungeon/object templates
//! (spec.md §1: "archetype/ability content registries... consumed through
//! a read-only lookup interface"; §4.7 names a "template registry" the
//! reset system resolves ids against). Race/job/ability lookups for the
//! attribute model live in `attributes::archetype` alongside the tables
//! they return; this module covers the object-template side used by
//! resets and content authoring.

use std::collections::HashMap;

use crate::templates::ObjectTemplate;

pub trait TemplateRegistry {
    fn template(&self, id: &str) -> Option<&ObjectTemplate>;
}

#[derive(Default)]
pub struct StaticTemplateRegistry {
    pub templates: HashMap<String, ObjectTemplate>,
}

impl TemplateRegistry for StaticTemplateRegistry {
    fn template(&self, id: &str) -> Option<&ObjectTemplate> {
        self.templates.get(id)
    }
}
