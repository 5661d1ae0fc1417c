//! Argument types and source modifiers for command placeholders
//! (spec.md §4.4).

use serde::{Deserialize, Serialize};

/// Where an object-like placeholder resolves its candidates from.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ObjectSource {
    Room,
    Inventory,
    Equipment,
    /// Room union inventory; the default when no `@source` is given.
    All,
    /// `@<other_arg_name>`: resolved in a second pass against that arg's
    /// contents once it has itself been resolved.
    Other(String),
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ArgKind {
    Text,
    Word,
    Number,
    Direction,
    Object(ObjectSource),
    Item(ObjectSource),
    Equipment(ObjectSource),
    Mob(ObjectSource),
    Character(ObjectSource),
}

impl ArgKind {
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            ArgKind::Object(_) | ArgKind::Item(_) | ArgKind::Equipment(_) | ArgKind::Mob(_) | ArgKind::Character(_)
        )
    }

    pub fn source(&self) -> Option<&ObjectSource> {
        match self {
            ArgKind::Object(s) | ArgKind::Item(s) | ArgKind::Equipment(s) | ArgKind::Mob(s) | ArgKind::Character(s) => {
                Some(s)
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ArgSpec {
    pub name: String,
    pub kind: ArgKind,
    pub optional: bool,
}

/// An object-like placeholder's raw capture, pending resolution against the
/// world (spec.md §4.4: "Strip an optional `N.` index prefix... Filter
/// candidates by type and `match`... Return the Nth match").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectQuery {
    pub index: u32,
    pub keywords: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParsedValue {
    Text(String),
    Word(String),
    Number(i64),
    Direction(crate::spatial::direction::Direction),
    Object(ObjectQuery),
}

/// Parses a leading `N.` index prefix off a keyword phrase; default index 1
/// (spec.md §4.4).
pub fn parse_object_query(token: &str) -> ObjectQuery {
    if let Some(dot) = token.find('.') {
        let (prefix, rest) = token.split_at(dot);
        if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(index) = prefix.parse() {
                return ObjectQuery { index, keywords: rest[1..].to_string() };
            }
        }
    }
    ObjectQuery { index: 1, keywords: token.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_prefix_defaults_to_one() {
        assert_eq!(parse_object_query("sword"), ObjectQuery { index: 1, keywords: "sword".to_string() });
        assert_eq!(parse_object_query("2.sword"), ObjectQuery { index: 2, keywords: "sword".to_string() });
    }
}
