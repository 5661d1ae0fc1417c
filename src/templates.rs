//! Templates: sparse differential object descriptions (spec.md §3.5). A
//! template names only the fields that differ from its type's zero-value
//! instance; undefined fields retain type defaults when applied.
//!
//! Template-visible fields exclude contents, runtime resource state, and
//! identity, so the round-trip law `apply(template_of(x)) == x` is scoped
//! to authoring-relevant state only.

use serde::{Deserialize, Serialize};

use crate::entity::object::*;
use crate::ids::ObjectId;
use crate::spatial::direction::ExitFlags;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub z: Option<i32>,
    pub allowed_exits: Option<ExitFlags>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub currency_amount: Option<u64>,
    pub is_container: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EquipmentTemplate {
    pub slot: Option<EquipmentSlot>,
    pub bonuses: Option<AttributeBonuses>,
    pub kind: Option<EquipmentKind>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MobTemplate {
    pub level: Option<u32>,
    pub race: Option<String>,
    pub job: Option<String>,
    pub flags: Option<BehaviorFlags>,
    pub gold: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ObjectTemplateKind {
    Room(RoomTemplate),
    Item(ItemTemplate),
    Prop,
    Equipment(EquipmentTemplate),
    Mob(MobTemplate),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectTemplate {
    pub id: String,
    pub keywords: Option<Vec<String>>,
    pub display_name: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub base_weight: Option<f64>,
    pub kind: ObjectTemplateKind,
}

/// Constructs a fresh, zero-valued instance for the template's kind. Mirrors
/// the notion of `new_instance()` in spec.md §3.5: every field takes its
/// type default until a template is applied on top.
pub fn new_instance(id: ObjectId, kind: &ObjectTemplateKind) -> DungeonObject {
    let base = ObjectBase::new(id, Vec::new(), "");
    let kind = match kind {
        ObjectTemplateKind::Room(_) => ObjectKind::Room(Room { x: 0, y: 0, z: 0, allowed_exits: ExitFlags::empty() }),
        ObjectTemplateKind::Item(_) => ObjectKind::Item(Item { currency_amount: None, is_container: false }),
        ObjectTemplateKind::Prop => ObjectKind::Prop(Prop),
        ObjectTemplateKind::Equipment(_) => ObjectKind::Equipment(Equipment {
            slot: EquipmentSlot::Trinket,
            bonuses: AttributeBonuses::default(),
            kind: EquipmentKind::Generic,
        }),
        ObjectTemplateKind::Mob(_) => ObjectKind::Mob(Mob {
            level: 1,
            experience: 0,
            race: String::new(),
            job: String::new(),
            primary: Default::default(),
            caps: Default::default(),
            current: Default::default(),
            secondary: Default::default(),
            equipped: Default::default(),
            learned_abilities: Default::default(),
            flags: BehaviorFlags::empty(),
            character: None,
            threat: None,
            active_effects: Vec::new(),
            combat_target: None,
            gold: 0,
            type_relationships: Default::default(),
        }),
    };
    DungeonObject { base, kind }
}

/// Applies only the defined fields of `template` onto `object`
/// (spec.md §3.5).
pub fn apply_template(object: &mut DungeonObject, template: &ObjectTemplate) -> Result<(), String> {
    object.base.template_id = Some(template.id.clone());
    if let Some(keywords) = &template.keywords {
        object.base.keywords = keywords.clone();
    }
    if let Some(name) = &template.display_name {
        object.base.display_name = name.clone();
    }
    if let Some(desc) = &template.short_description {
        object.base.short_description = desc.clone();
    }
    if let Some(desc) = &template.long_description {
        object.base.long_description = desc.clone();
    }
    if let Some(weight) = template.base_weight {
        object.base.base_weight = weight;
        object.base.current_weight = weight;
    }

    match (&mut object.kind, &template.kind) {
        (ObjectKind::Room(room), ObjectTemplateKind::Room(t)) => {
            if let Some(x) = t.x {
                room.x = x;
            }
            if let Some(y) = t.y {
                room.y = y;
            }
            if let Some(z) = t.z {
                room.z = z;
            }
            if let Some(exits) = t.allowed_exits {
                room.allowed_exits = exits;
            }
        }
        (ObjectKind::Item(item), ObjectTemplateKind::Item(t)) => {
            if let Some(amount) = t.currency_amount {
                item.currency_amount = Some(amount);
            }
            if let Some(is_container) = t.is_container {
                item.is_container = is_container;
            }
        }
        (ObjectKind::Prop(_), ObjectTemplateKind::Prop) => {}
        (ObjectKind::Equipment(equipment), ObjectTemplateKind::Equipment(t)) => {
            if let Some(slot) = t.slot {
                equipment.slot = slot;
            }
            if let Some(bonuses) = &t.bonuses {
                equipment.bonuses = bonuses.clone();
            }
            if let Some(kind) = &t.kind {
                equipment.kind = kind.clone();
            }
        }
        (ObjectKind::Mob(mob), ObjectTemplateKind::Mob(t)) => {
            if let Some(level) = t.level {
                mob.level = level;
            }
            if let Some(race) = &t.race {
                mob.race = race.clone();
            }
            if let Some(job) = &t.job {
                mob.job = job.clone();
            }
            if let Some(flags) = t.flags {
                mob.flags = flags;
            }
            if let Some(gold) = t.gold {
                mob.gold = gold;
            }
        }
        _ => return Err("template kind does not match object kind".to_string()),
    }
    Ok(())
}

/// Extracts the template-visible fields of `object` as a sparse template
/// (spec.md §3.5). Every visible field is captured explicitly so that
/// `apply_template(new_instance(kind), template_of(x)) == x` holds
/// restricted to those fields; an authoring layer is free to omit fields
/// equal to the type default before persisting.
pub fn template_of(object: &DungeonObject) -> ObjectTemplate {
    let kind = match &object.kind {
        ObjectKind::Room(room) => ObjectTemplateKind::Room(RoomTemplate {
            x: Some(room.x),
            y: Some(room.y),
            z: Some(room.z),
            allowed_exits: Some(room.allowed_exits),
        }),
        ObjectKind::Item(item) => ObjectTemplateKind::Item(ItemTemplate {
            currency_amount: item.currency_amount,
            is_container: Some(item.is_container),
        }),
        ObjectKind::Prop(_) => ObjectTemplateKind::Prop,
        ObjectKind::Equipment(equipment) => ObjectTemplateKind::Equipment(EquipmentTemplate {
            slot: Some(equipment.slot),
            bonuses: Some(equipment.bonuses.clone()),
            kind: Some(equipment.kind.clone()),
        }),
        ObjectKind::Mob(mob) => ObjectTemplateKind::Mob(MobTemplate {
            level: Some(mob.level),
            race: Some(mob.race.clone()),
            job: Some(mob.job.clone()),
            flags: Some(mob.flags),
            gold: Some(mob.gold),
        }),
    };

    ObjectTemplate {
        id: object.base.template_id.clone().unwrap_or_default(),
        keywords: Some(object.base.keywords.clone()),
        display_name: Some(object.base.display_name.clone()),
        short_description: Some(object.base.short_description.clone()),
        long_description: Some(object.base.long_description.clone()),
        base_weight: Some(object.base.base_weight),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ObjectId;

    #[test]
    fn round_trips_visible_fields() {
        let mut mob = new_instance(ObjectId(1), &ObjectTemplateKind::Mob(MobTemplate::default()));
        let template = ObjectTemplate {
            id: "goblin".to_string(),
            keywords: Some(vec!["goblin".to_string()]),
            display_name: Some("a goblin".to_string()),
            short_description: None,
            long_description: None,
            base_weight: Some(60.0),
            kind: ObjectTemplateKind::Mob(MobTemplate {
                level: Some(5),
                race: Some("goblinoid".to_string()),
                job: Some("warrior".to_string()),
                flags: Some(BehaviorFlags::AGGRESSIVE),
                gold: Some(10),
            }),
        };
        apply_template(&mut mob, &template).unwrap();

        assert_eq!(mob.as_mob().unwrap().level, 5);
        assert_eq!(mob.base.display_name, "a goblin");

        let round_tripped = template_of(&mob);
        let mut mob2 = new_instance(ObjectId(2), &round_tripped.kind);
        apply_template(&mut mob2, &round_tripped).unwrap();

        assert_eq!(mob2.as_mob().unwrap().level, mob.as_mob().unwrap().level);
        assert_eq!(mob2.base.display_name, mob.base.display_name);
        assert_eq!(mob2.base.base_weight, mob.base.base_weight);
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut item = new_instance(ObjectId(1), &ObjectTemplateKind::Item(ItemTemplate::default()));
        let template = ObjectTemplate {
            id: "x".into(),
            keywords: None,
            display_name: None,
            short_description: None,
            long_description: None,
            base_weight: None,
            kind: ObjectTemplateKind::Mob(MobTemplate::default()),
        };
        assert!(apply_template(&mut item, &template).is_err());
    }
}
