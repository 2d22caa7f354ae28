//! Bundled payload parser.
//!
//! Structured formats are flattened to dotted keys (`server.port`) with
//! sequence indices in brackets (`hosts[0]`). Multi-document YAML yields one
//! property group per non-empty document.

use errors::ParseError;
use rc_core::{ConfigParser, PropertyGroup};
use serde::Deserialize;

/// Default `ConfigParser` covering properties, YAML, JSON and TOML payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatParser;

impl FormatParser {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigParser for FormatParser {
    fn parse(
        &self,
        name: &str,
        content: &str,
        format: &str,
    ) -> Result<Vec<PropertyGroup>, ParseError> {
        let groups = match format.to_ascii_lowercase().as_str() {
            "properties" => vec![parse_properties(name, content)?],
            "yaml" | "yml" => parse_yaml(name, content)?,
            "json" => vec![parse_json(name, content)?],
            "toml" => vec![parse_toml(name, content)?],
            other => {
                return Err(ParseError::UnsupportedFormat {
                    format: other.to_string(),
                });
            }
        };

        Ok(groups.into_iter().filter(|g| !g.is_empty()).collect())
    }

    fn supports(&self, format: &str) -> bool {
        matches!(
            format.to_ascii_lowercase().as_str(),
            "properties" | "yaml" | "yml" | "json" | "toml"
        )
    }
}

fn syntax(format: &str, reason: impl ToString) -> ParseError {
    ParseError::Syntax {
        format: format.to_string(),
        reason: reason.to_string(),
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn parse_properties(name: &str, content: &str) -> Result<PropertyGroup, ParseError> {
    let mut group = PropertyGroup::new(name);
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        group.insert(unescape(key)?, unescape(value)?);
    }

    Ok(group)
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let separators: &[char] = &['=', ':'];
    let mut escaped = false;

    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..idx], line[idx + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[idx..].trim_start();
                let rest = rest.strip_prefix(separators).unwrap_or(rest).trim_start();
                return (&line[..idx], rest);
            }
            _ => {}
        }
    }

    (line, "")
}

fn unescape(raw: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        syntax("properties", format!("malformed \\u escape: \\u{hex}"))
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn parse_yaml(name: &str, content: &str) -> Result<Vec<PropertyGroup>, ParseError> {
    let mut groups = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = serde_yaml::Value::deserialize(document).map_err(|e| syntax("yaml", e))?;
        let group_name = if index == 0 {
            name.to_string()
        } else {
            format!("{name} (document #{index})")
        };

        let mut group = PropertyGroup::new(group_name);
        match value {
            serde_yaml::Value::Null => {}
            serde_yaml::Value::Mapping(_) => flatten_yaml(&mut group, "", &value)?,
            _ => return Err(syntax("yaml", "document root must be a mapping")),
        }
        groups.push(group);
    }

    Ok(groups)
}

fn yaml_key(key: &serde_yaml::Value) -> Result<String, ParseError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(syntax("yaml", format!("unsupported mapping key: {other:?}"))),
    }
}

fn flatten_yaml(
    group: &mut PropertyGroup,
    prefix: &str,
    value: &serde_yaml::Value,
) -> Result<(), ParseError> {
    match value {
        serde_yaml::Value::Mapping(mapping) => {
            for (key, nested) in mapping {
                flatten_yaml(group, &join_key(prefix, &yaml_key(key)?), nested)?;
            }
        }
        serde_yaml::Value::Sequence(items) if items.is_empty() => group.insert(prefix, ""),
        serde_yaml::Value::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_yaml(group, &format!("{prefix}[{index}]"), item)?;
            }
        }
        serde_yaml::Value::Null => group.insert(prefix, ""),
        serde_yaml::Value::Bool(b) => group.insert(prefix, b.to_string()),
        serde_yaml::Value::Number(n) => group.insert(prefix, n.to_string()),
        serde_yaml::Value::String(s) => group.insert(prefix, s.as_str()),
        serde_yaml::Value::Tagged(tagged) => flatten_yaml(group, prefix, &tagged.value)?,
    }
    Ok(())
}

fn parse_json(name: &str, content: &str) -> Result<PropertyGroup, ParseError> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| syntax("json", e))?;
    let mut group = PropertyGroup::new(name);

    match value {
        serde_json::Value::Null => {}
        serde_json::Value::Object(_) => flatten_json(&mut group, "", &value),
        _ => return Err(syntax("json", "document root must be an object")),
    }
    Ok(group)
}

fn flatten_json(group: &mut PropertyGroup, prefix: &str, value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, nested) in map {
                flatten_json(group, &join_key(prefix, key), nested);
            }
        }
        serde_json::Value::Array(items) if items.is_empty() => group.insert(prefix, ""),
        serde_json::Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_json(group, &format!("{prefix}[{index}]"), item);
            }
        }
        serde_json::Value::Null => group.insert(prefix, ""),
        serde_json::Value::Bool(b) => group.insert(prefix, b.to_string()),
        serde_json::Value::Number(n) => group.insert(prefix, n.to_string()),
        serde_json::Value::String(s) => group.insert(prefix, s.as_str()),
    }
}

fn parse_toml(name: &str, content: &str) -> Result<PropertyGroup, ParseError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| syntax("toml", e))?;
    let mut group = PropertyGroup::new(name);
    for (key, value) in &table {
        flatten_toml(&mut group, key, value);
    }
    Ok(group)
}

fn flatten_toml(group: &mut PropertyGroup, prefix: &str, value: &toml::Value) {
    match value {
        toml::Value::Table(table) => {
            for (key, nested) in table {
                flatten_toml(group, &join_key(prefix, key), nested);
            }
        }
        toml::Value::Array(items) if items.is_empty() => group.insert(prefix, ""),
        toml::Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_toml(group, &format!("{prefix}[{index}]"), item);
            }
        }
        toml::Value::String(s) => group.insert(prefix, s.as_str()),
        toml::Value::Integer(i) => group.insert(prefix, i.to_string()),
        toml::Value::Float(f) => group.insert(prefix, f.to_string()),
        toml::Value::Boolean(b) => group.insert(prefix, b.to_string()),
        toml::Value::Datetime(dt) => group.insert(prefix, dt.to_string()),
    }
}
