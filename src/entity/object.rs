//! The dungeon object sum type (spec.md §3.1), represented the way the
//! teacher represents variant-carrying components: a closed enum whose
//! variants each hold their ancestor's state, with a shared base record
//! and dispatch methods on the enum itself rather than a trait object.

use std::collections::HashMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::attributes::{PrimaryAttributes, Resources, ResourceCaps, SecondaryAttributes};
use crate::combat::threat::ThreatTable;
use crate::effects::EffectInstance;
use crate::ids::ObjectId;
use crate::spatial::direction::{Direction, ExitFlags};
use crate::spatial::dungeon::DungeonId;

/// Fields shared by every dungeon object (spec.md §3.1 base record).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectBase {
    pub id: ObjectId,
    pub keywords: Vec<String>,
    pub display_name: String,
    pub short_description: String,
    pub long_description: String,
    pub base_weight: f64,
    pub current_weight: f64,
    pub contents: Vec<ObjectId>,
    /// Either a container object or a room; rooms have no parent.
    pub parent: Option<ObjectId>,
    pub dungeon: Option<DungeonId>,
    pub template_id: Option<String>,
    /// A reset back-reference. For items, moving to a different room clears
    /// it; for mobs it is preserved (spec.md §3.3).
    pub reset_ref: Option<crate::reset::ResetId>,
}

impl ObjectBase {
    pub fn new(id: ObjectId, keywords: Vec<String>, display_name: impl Into<String>) -> Self {
        ObjectBase {
            id,
            keywords,
            display_name: display_name.into(),
            short_description: String::new(),
            long_description: String::new(),
            base_weight: 0.0,
            current_weight: 0.0,
            contents: Vec::new(),
            parent: None,
            dungeon: None,
            template_id: None,
            reset_ref: None,
        }
    }

    /// Whitespace-tokenized keyword match: every token of `phrase` must be a
    /// prefix of some whitespace-tokenized keyword (spec.md §4.1).
    pub fn matches(&self, phrase: &str) -> bool {
        let tokens: Vec<&str> = phrase.split_whitespace().collect();
        if tokens.is_empty() {
            return false;
        }
        let keyword_tokens: Vec<String> = self
            .keywords
            .iter()
            .flat_map(|k| k.split_whitespace())
            .map(|t| t.to_ascii_lowercase())
            .collect();
        tokens.iter().all(|token| {
            let token = token.to_ascii_lowercase();
            keyword_tokens.iter().any(|kw| kw.starts_with(&token))
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub allowed_exits: ExitFlags,
}

impl Room {
    /// Can `mover` leave this room in `dir`. No generic precondition beyond
    /// the exit existing; content (doors, combat-busy holds) hooks in here.
    pub fn can_exit(&self, _mover: ObjectId, _dir: Direction) -> bool {
        true
    }

    pub fn can_enter(&self, _mover: ObjectId, _dir: Direction) -> bool {
        true
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    /// `Some(amount)` marks this item as a currency stack (spec.md §4.5.4:
    /// "move dead.value (gold) into corpse as a currency item").
    pub currency_amount: Option<u64>,
    /// Container items (chests, corpses) hold contents directly in
    /// `ObjectBase.contents`; this flag only distinguishes display/UX, not
    /// containment legality.
    pub is_container: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Prop;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Head,
    Chest,
    Legs,
    Feet,
    Hands,
    MainHand,
    OffHand,
    Ring,
    Neck,
    Trinket,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum WeaponCategory {
    Sword,
    Blunt,
    Axe,
    Polearm,
    Ranged,
    Unarmed,
}

/// An authored (verb, third-person form, damage type, color) bundle
/// attached to weapons or abilities (GLOSSARY: "hit type").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HitType {
    pub verb: String,
    pub third_person_verb: String,
    pub damage_type: DamageType,
    pub color: String,
}

/// An elemental/type tag used for immune/resist/vulnerable relationship
/// lookups (spec.md §4.5 step 7). Open-ended so content can define its own
/// categories (fire, holy, poison, ...).
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DamageType(pub String);

impl DamageType {
    pub fn physical() -> Self {
        DamageType("physical".to_string())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum TypeRelationship {
    Immune,
    Resist,
    Normal,
    Vulnerable,
}

impl TypeRelationship {
    /// spec.md §4.5 step 7.
    pub fn multiplier(self) -> f64 {
        match self {
            TypeRelationship::Immune => 0.0,
            TypeRelationship::Resist => 0.5,
            TypeRelationship::Normal => 1.0,
            TypeRelationship::Vulnerable => 2.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArmorStats {
    pub defense_bonus: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeaponStats {
    pub attack_power: i64,
    pub hit_type: HitType,
    pub category: WeaponCategory,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EquipmentKind {
    Generic,
    Armor(ArmorStats),
    Weapon(WeaponStats),
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AttributeBonuses {
    pub primary: PrimaryAttributes,
    pub resources: ResourceCaps,
    pub secondary: SecondaryAttributes,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Equipment {
    pub slot: EquipmentSlot,
    pub bonuses: AttributeBonuses,
    pub kind: EquipmentKind,
}

impl Equipment {
    pub fn as_armor(&self) -> Option<&ArmorStats> {
        match &self.kind {
            EquipmentKind::Armor(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_weapon(&self) -> Option<&WeaponStats> {
        match &self.kind {
            EquipmentKind::Weapon(w) => Some(w),
            _ => None,
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct BehaviorFlags: u32 {
        const AGGRESSIVE = 1 << 0;
        const WANDER      = 1 << 1;
        const SHOPKEEPER  = 1 << 2;
        const DUAL_WIELD  = 1 << 3;
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mob {
    pub level: u32,
    pub experience: u64,
    pub race: String,
    pub job: String,
    pub primary: PrimaryAttributes,
    pub caps: ResourceCaps,
    pub current: Resources,
    pub secondary: SecondaryAttributes,
    pub equipped: HashMap<EquipmentSlot, ObjectId>,
    pub learned_abilities: HashMap<String, u32>,
    pub flags: BehaviorFlags,
    pub character: Option<ObjectId>,
    pub threat: Option<ThreatTable>,
    pub active_effects: Vec<EffectInstance>,
    pub combat_target: Option<ObjectId>,
    pub gold: u64,
    pub type_relationships: HashMap<DamageType, TypeRelationship>,
}

impl Mob {
    pub fn is_shopkeeper(&self) -> bool {
        self.flags.contains(BehaviorFlags::SHOPKEEPER)
    }

    pub fn is_character(&self) -> bool {
        self.character.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.current.health <= 0
    }

    pub fn knows(&self, ability: &str) -> bool {
        self.learned_abilities.contains_key(ability)
    }

    pub fn proficiency(&self, ability: &str) -> i64 {
        self.learned_abilities.get(ability).copied().unwrap_or(0).min(100) as i64
    }

    pub fn relationship(&self, damage_type: &DamageType) -> TypeRelationship {
        self.type_relationships.get(damage_type).copied().unwrap_or(TypeRelationship::Normal)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ObjectKind {
    Room(Room),
    Item(Item),
    Prop(Prop),
    Equipment(Equipment),
    Mob(Mob),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DungeonObject {
    pub base: ObjectBase,
    pub kind: ObjectKind,
}

impl DungeonObject {
    pub fn id(&self) -> ObjectId {
        self.base.id
    }

    pub fn is_room(&self) -> bool {
        matches!(self.kind, ObjectKind::Room(_))
    }

    pub fn is_mob(&self) -> bool {
        matches!(self.kind, ObjectKind::Mob(_))
    }

    pub fn as_room(&self) -> Option<&Room> {
        match &self.kind {
            ObjectKind::Room(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_room_mut(&mut self) -> Option<&mut Room> {
        match &mut self.kind {
            ObjectKind::Room(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_mob(&self) -> Option<&Mob> {
        match &self.kind {
            ObjectKind::Mob(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mob_mut(&mut self) -> Option<&mut Mob> {
        match &mut self.kind {
            ObjectKind::Mob(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_equipment(&self) -> Option<&Equipment> {
        match &self.kind {
            ObjectKind::Equipment(e) => Some(e),
            _ => None,
        }
    }

    /// Rooms aren't added to a parent's contents and props are explicitly
    /// not pickable (spec.md §3.1); everything else is.
    pub fn is_pickable(&self) -> bool {
        !matches!(self.kind, ObjectKind::Room(_) | ObjectKind::Prop(_))
    }

    /// Used by container-scoped argument resolution (spec.md §4.4): any
    /// object can logically hold contents (a mob's inventory, a chest item,
    /// a corpse) except a bare prop.
    pub fn is_container(&self) -> bool {
        !matches!(self.kind, ObjectKind::Prop(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(id: u64, keywords: &[&str]) -> ObjectBase {
        ObjectBase::new(ObjectId(id), keywords.iter().map(|s| s.to_string()).collect(), "thing")
    }

    #[test]
    fn keyword_match_is_prefix_based_and_case_insensitive() {
        let b = base(1, &["steel sword"]);
        assert!(b.matches("sword"));
        assert!(b.matches("SWORD"));
        assert!(b.matches("ste swo"));
        assert!(!b.matches("dagger"));
    }

    #[test]
    fn keyword_match_requires_every_token() {
        let b = base(1, &["steel sword"]);
        assert!(!b.matches("steel dagger"));
    }
}
