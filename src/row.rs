//! Access to nested search result rows.
//!
//! A result row mirrors the selected field paths: selecting `campaign.id`
//! yields `{"campaign": {"id": "1"}}`. The API spells multi-word segments in
//! lowerCamelCase (`ad_group.cpc_bid_micros` comes back as
//! `{"adGroup": {"cpcBidMicros": ...}}`), so lookups accept either spelling.

use std::collections::BTreeMap;

use serde_json::Value;

/// One result row as returned by the search endpoint.
pub type Row = Value;

/// Resolve a dotted path inside a row.
pub fn value_at<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(row, |node, segment| {
        let object = node.as_object()?;
        object
            .get(segment)
            .or_else(|| object.get(&lower_camel(segment)))
    })
}

/// Render the scalar at `path` as text.
///
/// Strings are returned verbatim, numbers and booleans via their JSON form.
/// Missing values, nulls, objects and arrays yield `None`.
pub fn text_at(row: &Value, path: &str) -> Option<String> {
    value_at(row, path).and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Flatten a nested row into `dotted.path -> text` pairs.
///
/// Arrays of scalars are joined with `,`; nulls are skipped.
pub fn flatten(row: &Value) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    flatten_into(row, String::new(), &mut out);
    out
}

fn flatten_into(value: &Value, prefix: String, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(child, path, out);
            }
        }
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            out.insert(prefix, parts.join(","));
        }
        Value::Null => {}
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                out.insert(prefix, text);
            }
        }
    }
}

/// `cpc_bid_micros` -> `cpcBidMicros`.
fn lower_camel(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper = false;
    for ch in segment.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
