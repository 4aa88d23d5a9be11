//! Query definitions and the search-query compiler.
//!
//! A [`QueryDefinition`] is the static part of a report query: the selected
//! dotted field paths, the source resource and any predicates that always
//! apply. Compiling one together with caller-supplied predicates yields the
//! text the search endpoint accepts:
//!
//! ```text
//! SELECT campaign.id, campaign.name FROM campaign WHERE campaign.status = 'ENABLED' AND ...
//! ```
//!
//! Predicates are opaque strings and are not validated.

use std::fmt;

// =============================================================================
// Query Definition
// =============================================================================

/// Selected fields, source resource and fixed predicates of a report query.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct QueryDefinition {
    pub fields: Vec<String>,
    pub from: String,
    pub wheres: Vec<String>,
}

impl QueryDefinition {
    pub fn new(from: &str) -> Self {
        Self {
            fields: Vec::new(),
            from: from.into(),
            wheres: Vec::new(),
        }
    }

    /// Append selected fields, keeping declaration order.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Add a predicate that is part of every compiled query.
    pub fn filter(mut self, predicate: &str) -> Self {
        self.wheres.push(predicate.into());
        self
    }

    /// Whether `path` is one of the selected fields.
    pub fn selects(&self, path: &str) -> bool {
        self.fields.iter().any(|f| f == path)
    }

    /// Render the query text with additional predicates.
    ///
    /// Definition predicates come first, then `extra_wheres`, all joined with
    /// `AND`. No `WHERE` clause is emitted when both lists are empty.
    pub fn compile<S: AsRef<str>>(&self, extra_wheres: &[S]) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.fields.join(", "), self.from);

        let predicates: Vec<&str> = self
            .wheres
            .iter()
            .map(String::as_str)
            .chain(extra_wheres.iter().map(AsRef::as_ref))
            .collect();

        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }
        sql
    }
}

impl fmt::Display for QueryDefinition {
    /// Formats the query with its own predicates only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compile::<&str>(&[]))
    }
}

// =============================================================================
// Predicate helpers
// =============================================================================

/// Build `<source>.id IN (...)` for a set of keys.
///
/// Keys are deduplicated and sorted so the text is stable across runs.
/// Digit-only keys are emitted bare; anything else is single-quoted.
pub fn id_in_predicate<I, S>(source: &str, keys: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
    keys.sort();
    keys.dedup();

    let list: Vec<String> = keys.iter().map(|k| literal(k)).collect();
    format!("{source}.id IN ({})", list.join(","))
}

fn literal(value: &str) -> String {
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', "\\'"))
    }
}

// =============================================================================
// Tests
// =============================================================================
