//! Parsing of Doxygen-generated index scripts.
//!
//! Every index file has the shape `var NAME = <payload>;`, possibly several
//! declarations per file, where each payload is a JSON-compatible array or
//! string literal. Stripping the declaration prelude (and the license
//! banner that precedes it in `navtreedata.js`) leaves plain JSON, which is
//! handed to `serde_json`. Declaration order is preserved.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::errors::{IndexError, IndexResult};
use crate::models::NavEntry;

// ---------------------------------------------------------------------------
// ScriptFile
// ---------------------------------------------------------------------------

/// One parsed index script: its `var` declarations in source order.
#[derive(Debug)]
pub struct ScriptFile {
    vars: IndexMap<String, Value>,
}

impl ScriptFile {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Like [`get`](Self::get) but a missing variable is a parse error.
    pub fn require(&self, name: &str) -> IndexResult<&Value> {
        self.vars
            .get(name)
            .ok_or_else(|| IndexError::Parse(format!("script is missing var {name:?}")))
    }

    pub fn var_names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Remove `/* … */` block comments (the Doxygen license banner).
fn strip_block_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("/*") {
        out.push_str(&rest[..open]);
        match rest[open + 2..].find("*/") {
            Some(close) => rest = &rest[open + 2 + close + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Parse an index script into its ordered `var` declarations.
///
/// A declaration's payload runs to the start of the next declaration (or to
/// the end of input), minus the trailing `;`. Redeclaring a variable inside
/// one file is a hard error; the loader never silently overwrites.
pub fn parse_script(text: &str) -> IndexResult<ScriptFile> {
    static DECL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^var\s+([A-Za-z_][A-Za-z0-9_]*)\s*=").unwrap());

    let stripped = strip_block_comments(text);
    let matches: Vec<(String, usize, usize)> = DECL_RE
        .captures_iter(&stripped)
        .map(|c| {
            let whole = c.get(0).unwrap();
            (c[1].to_string(), whole.start(), whole.end())
        })
        .collect();

    if matches.is_empty() {
        return Err(IndexError::Parse("no var declarations in script".into()));
    }

    let mut vars = IndexMap::new();
    for (i, (name, _, payload_start)) in matches.iter().enumerate() {
        let payload_end = matches
            .get(i + 1)
            .map(|(_, next_start, _)| *next_start)
            .unwrap_or(stripped.len());
        let payload = stripped[*payload_start..payload_end]
            .trim()
            .trim_end_matches(';')
            .trim_end();
        let value: Value = serde_json::from_str(&normalize_quotes(payload))?;
        if vars.insert(name.clone(), value).is_some() {
            return Err(IndexError::Parse(format!("var {name:?} declared twice")));
        }
    }

    Ok(ScriptFile { vars })
}

/// The sync-message variables use single-quoted string literals; rewrite a
/// bare `'…'` literal to its JSON form. Array payloads are left untouched.
fn normalize_quotes(payload: &str) -> String {
    if payload.len() >= 2 && payload.starts_with('\'') && payload.ends_with('\'') {
        let inner = &payload[1..payload.len() - 1];
        return format!("\"{}\"", inner.replace('\\', "\\\\").replace('"', "\\\""));
    }
    payload.to_string()
}

// ---------------------------------------------------------------------------
// Typed decoders
// ---------------------------------------------------------------------------

/// Decode a nested listing of `[label, link, third]` rows.
pub fn decode_entries(value: &Value) -> IndexResult<Vec<NavEntry>> {
    let rows = value
        .as_array()
        .ok_or_else(|| IndexError::Parse("listing payload is not an array".into()))?;
    rows.iter().map(decode_entry).collect()
}

fn decode_entry(row: &Value) -> IndexResult<NavEntry> {
    let slots = row
        .as_array()
        .ok_or_else(|| IndexError::Parse(format!("listing row is not an array: {row}")))?;
    if slots.len() < 2 || slots.len() > 3 {
        return Err(IndexError::Parse(format!(
            "listing row has {} slots, expected 2 or 3: {row}",
            slots.len()
        )));
    }

    let label = slots[0]
        .as_str()
        .ok_or_else(|| IndexError::Parse(format!("row label is not a string: {row}")))?
        .to_string();

    let link = match &slots[1] {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => {
            return Err(IndexError::Parse(format!(
                "row link is neither string nor null: {other}"
            )))
        }
    };

    let (deferred, children) = match slots.get(2) {
        None | Some(Value::Null) => (None, Vec::new()),
        Some(Value::String(script)) => (Some(script.clone()), Vec::new()),
        Some(array @ Value::Array(_)) => (None, decode_entries(array)?),
        Some(other) => {
            return Err(IndexError::Parse(format!(
                "row children slot is invalid: {other}"
            )))
        }
    };

    Ok(NavEntry {
        label,
        link,
        deferred,
        children,
    })
}

/// Re-serialize a listing to the positional shape it was decoded from.
/// Child order is reproduced exactly.
pub fn entries_to_value(entries: &[NavEntry]) -> Value {
    Value::Array(entries.iter().map(entry_to_value).collect())
}

fn entry_to_value(entry: &NavEntry) -> Value {
    let third = if let Some(script) = &entry.deferred {
        Value::String(script.clone())
    } else if entry.children.is_empty() {
        Value::Null
    } else {
        entries_to_value(&entry.children)
    };
    Value::Array(vec![
        Value::String(entry.label.clone()),
        entry
            .link
            .as_ref()
            .map(|l| Value::String(l.clone()))
            .unwrap_or(Value::Null),
        third,
    ])
}

/// Decode a flat array of string keys (`NAVTREEINDEX`).
pub fn decode_keys(value: &Value) -> IndexResult<Vec<String>> {
    let rows = value
        .as_array()
        .ok_or_else(|| IndexError::Parse("key table payload is not an array".into()))?;
    rows.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| IndexError::Parse(format!("shard key is not a string: {v}")))
        })
        .collect()
}

/// Decode a bare string variable (`SYNCONMSG` / `SYNCOFFMSG`).
pub fn decode_message(value: &Value) -> IndexResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| IndexError::Parse(format!("message payload is not a string: {value}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ANNOTATED: &str = r#"var annotated_dup =
[
    [ "SRL", "namespaceSRL.html", [
      [ "Bitmap", "namespaceSRL_1_1Bitmap.html", [
        [ "TGA", "structSRL_1_1Bitmap_1_1TGA.html", "structSRL_1_1Bitmap_1_1TGA" ]
      ] ]
    ] ]
];
"#;

    #[test]
    fn test_parse_single_var() {
        let script = parse_script(ANNOTATED).unwrap();
        assert_eq!(script.len(), 1);
        assert!(script.get("annotated_dup").is_some());
    }

    #[test]
    fn test_decode_nested_entries() {
        let script = parse_script(ANNOTATED).unwrap();
        let entries = decode_entries(script.require("annotated_dup").unwrap()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label, "SRL");
        assert_eq!(entries[0].link.as_deref(), Some("namespaceSRL.html"));
        let bitmap = &entries[0].children[0];
        assert_eq!(bitmap.label, "Bitmap");
        let tga = &bitmap.children[0];
        assert_eq!(tga.deferred.as_deref(), Some("structSRL_1_1Bitmap_1_1TGA"));
        assert!(tga.children.is_empty());
    }

    #[test]
    fn test_parse_multiple_vars_with_banner() {
        let text = "/*\n license banner; var fake = 1\n*/\nvar NAVTREE =\n[\n  [ \"Lib\", \"index.html\", null ]\n];\n\nvar NAVTREEINDEX =\n[\n\"annotated.html\",\n\"classes.html\"\n];\n\nvar SYNCONMSG = 'click to disable panel synchronization';\nvar SYNCOFFMSG = 'click to enable panel synchronization';";
        let script = parse_script(text).unwrap();
        let names: Vec<&str> = script.var_names().collect();
        assert_eq!(
            names,
            ["NAVTREE", "NAVTREEINDEX", "SYNCONMSG", "SYNCOFFMSG"]
        );
        let keys = decode_keys(script.require("NAVTREEINDEX").unwrap()).unwrap();
        assert_eq!(keys, ["annotated.html", "classes.html"]);
        let on = decode_message(script.require("SYNCONMSG").unwrap()).unwrap();
        assert_eq!(on, "click to disable panel synchronization");
    }

    #[test]
    fn test_redeclared_var_is_an_error() {
        let text = "var a = [];\nvar a = [];";
        assert!(parse_script(text).is_err());
    }

    #[test]
    fn test_malformed_row_is_an_error() {
        let value: Value = serde_json::from_str(r#"[[ "label" ]]"#).unwrap();
        assert!(decode_entries(&value).is_err());
        let value: Value = serde_json::from_str(r#"[[ 42, null, null ]]"#).unwrap();
        assert!(decode_entries(&value).is_err());
    }

    #[test]
    fn test_round_trip_preserves_child_order() {
        let script = parse_script(ANNOTATED).unwrap();
        let original = script.require("annotated_dup").unwrap();
        let entries = decode_entries(original).unwrap();
        assert_eq!(&entries_to_value(&entries), original);
    }

    #[test]
    fn test_empty_link_becomes_none() {
        let value: Value = serde_json::from_str(r#"[[ "group", "", null ]]"#).unwrap();
        let entries = decode_entries(&value).unwrap();
        assert_eq!(entries[0].link, None);
    }
}
