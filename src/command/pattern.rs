//! Pattern compilation and matching (spec.md §4.4, §9): a linear automaton
//! over literal tokens and typed placeholders, built once per command
//! rather than a backtracking regex, so the argument that failed is always
//! known directly instead of inferred from a match failure.

use std::collections::HashMap;

use crate::command::arg::{parse_object_query, ArgKind, ArgSpec, ObjectSource, ParsedValue};
use crate::error::ParseError;
use crate::spatial::direction::Direction;

#[derive(Clone, Debug)]
enum Element {
    Literal { text: String, autocomplete: bool },
    Placeholder(ArgSpec),
}

#[derive(Clone, Debug)]
pub struct CompiledPattern {
    elements: Vec<Element>,
    pub arg_names: Vec<String>,
    source: String,
}

fn parse_source(token: &str) -> ObjectSource {
    match token {
        "room" => ObjectSource::Room,
        "inventory" => ObjectSource::Inventory,
        "equipment" => ObjectSource::Equipment,
        "all" => ObjectSource::All,
        other => ObjectSource::Other(other.to_string()),
    }
}

fn parse_kind(type_spec: &str) -> ArgKind {
    let (type_name, source) = match type_spec.split_once('@') {
        Some((name, src)) => (name, Some(parse_source(src))),
        None => (type_spec, None),
    };
    let source_or_all = || source.clone().unwrap_or(ObjectSource::All);
    match type_name {
        "text" => ArgKind::Text,
        "word" => ArgKind::Word,
        "number" => ArgKind::Number,
        "direction" => ArgKind::Direction,
        "item" => ArgKind::Item(source_or_all()),
        "equipment" => ArgKind::Equipment(source_or_all()),
        "mob" => ArgKind::Mob(source_or_all()),
        "character" => ArgKind::Character(source_or_all()),
        _ => ArgKind::Object(source_or_all()),
    }
}

fn parse_placeholder(inner: &str) -> ArgSpec {
    let optional = inner.ends_with('?');
    let inner = inner.strip_suffix('?').unwrap_or(inner);
    let (name, type_spec) = inner.split_once(':').unwrap_or((inner, "word"));
    ArgSpec { name: name.to_string(), kind: parse_kind(type_spec), optional }
}

/// Splits a pattern definition into literal and placeholder elements.
/// Placeholders glued directly to a literal with no surrounding
/// whitespace (e.g. `n.<item:object>`) are parsed from within the same
/// whitespace-delimited chunk.
pub fn compile(pattern: &str) -> CompiledPattern {
    let mut elements = Vec::new();
    let mut arg_names = Vec::new();
    for chunk in pattern.split_whitespace() {
        let mut rest = chunk;
        while !rest.is_empty() {
            if let Some(start) = rest.find('<') {
                if start > 0 {
                    push_literal(&mut elements, &rest[..start]);
                    rest = &rest[start..];
                    continue;
                }
                let end = match rest.find('>') {
                    Some(e) => e,
                    None => {
                        push_literal(&mut elements, rest);
                        break;
                    }
                };
                let spec = parse_placeholder(&rest[1..end]);
                arg_names.push(spec.name.clone());
                elements.push(Element::Placeholder(spec));
                rest = &rest[end + 1..];
            } else {
                push_literal(&mut elements, rest);
                rest = "";
            }
        }
    }
    CompiledPattern { elements, arg_names, source: pattern.to_string() }
}

fn push_literal(elements: &mut Vec<Element>, text: &str) {
    if text.is_empty() {
        return;
    }
    let autocomplete = text.ends_with('~');
    let text = text.strip_suffix('~').unwrap_or(text).to_string();
    elements.push(Element::Literal { text, autocomplete });
}

fn take_token(input: &str) -> Option<(String, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    if let Some(quote) = input.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let rest = &input[1..];
        if let Some(end) = rest.find(quote) {
            return Some((rest[..end].to_string(), &rest[end + 1..]));
        }
    }
    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    Some((input[..end].to_string(), &input[end..]))
}

impl CompiledPattern {
    /// The pattern text as originally registered, for help-text generation
    /// (spec.md §4.4 ambient `describe()` addition).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The declared type of a named placeholder, if this pattern has one by
    /// that name.
    pub fn arg_kind(&self, name: &str) -> Option<&ArgKind> {
        self.elements.iter().find_map(|e| match e {
            Element::Placeholder(spec) if spec.name == name => Some(&spec.kind),
            _ => None,
        })
    }

    /// Attempts to match and resolve `input` against this pattern.
    /// Object-like placeholders are left as unresolved `ObjectQuery`s; a
    /// second pass against the world resolves them (spec.md §4.4: "The
    /// `@<other>` form is evaluated in a second pass").
    pub fn parse(&self, input: &str) -> Result<HashMap<String, ParsedValue>, ParseError> {
        let mut remaining = input.trim();
        let mut values = HashMap::new();

        for element in &self.elements {
            match element {
                Element::Literal { text, autocomplete } => {
                    let Some((token, rest)) = take_token(remaining) else {
                        return Err(ParseError::PatternMismatch);
                    };
                    let matched = if *autocomplete {
                        !token.is_empty() && text.to_ascii_lowercase().starts_with(&token.to_ascii_lowercase())
                    } else {
                        token.eq_ignore_ascii_case(text)
                    };
                    if !matched {
                        return Err(ParseError::PatternMismatch);
                    }
                    remaining = rest;
                }
                Element::Placeholder(spec) => {
                    if spec.kind == ArgKind::Text {
                        let text = remaining.trim();
                        if text.is_empty() {
                            if spec.optional {
                                continue;
                            }
                            return Err(ParseError::MissingRequired { arg: spec.name.clone() });
                        }
                        values.insert(spec.name.clone(), ParsedValue::Text(text.to_string()));
                        remaining = "";
                        continue;
                    }

                    let taken = take_token(remaining);
                    let Some((token, rest)) = taken else {
                        if spec.optional {
                            continue;
                        }
                        return Err(ParseError::MissingRequired { arg: spec.name.clone() });
                    };
                    remaining = rest;

                    let value = match &spec.kind {
                        ArgKind::Word => ParsedValue::Word(token),
                        ArgKind::Number => token
                            .parse::<i64>()
                            .map(ParsedValue::Number)
                            .map_err(|_| ParseError::UnparseableArg { arg: spec.name.clone() })?,
                        ArgKind::Direction => Direction::parse(&token)
                            .map(ParsedValue::Direction)
                            .ok_or_else(|| ParseError::UnparseableArg { arg: spec.name.clone() })?,
                        _ if spec.kind.is_object_like() => ParsedValue::Object(parse_object_query(&token)),
                        ArgKind::Text => unreachable!("handled above"),
                    };
                    values.insert(spec.name.clone(), value);
                }
            }
        }

        if !remaining.trim().is_empty() {
            return Err(ParseError::PatternMismatch);
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_and_object_placeholder() {
        let pattern = compile("get <item:object@room>");
        let values = pattern.parse("get sword").unwrap();
        match values.get("item").unwrap() {
            ParsedValue::Object(q) => assert_eq!(q.keywords, "sword"),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn container_scoped_pattern() {
        let pattern = compile("get <item:object@container> from <container:object>");
        let values = pattern.parse("get coin from chest").unwrap();
        assert!(matches!(values.get("item"), Some(ParsedValue::Object(_))));
        assert!(matches!(values.get("container"), Some(ParsedValue::Object(_))));
    }

    #[test]
    fn autocomplete_literal_prefix() {
        let pattern = compile("look~");
        assert!(pattern.parse("l").is_ok());
        assert!(pattern.parse("look").is_ok());
        assert!(pattern.parse("lox").is_err());
    }

    #[test]
    fn missing_required_vs_mismatch() {
        let pattern = compile("wear <item:object>");
        assert_eq!(pattern.parse("wear"), Err(ParseError::MissingRequired { arg: "item".to_string() }));
        assert_eq!(pattern.parse("eat pie"), Err(ParseError::PatternMismatch));
    }

    #[test]
    fn direction_placeholder_rejects_garbage() {
        let pattern = compile("go <dir:direction>");
        assert!(pattern.parse("go north").is_ok());
        assert_eq!(pattern.parse("go sideways"), Err(ParseError::UnparseableArg { arg: "dir".to_string() }));
    }
}
