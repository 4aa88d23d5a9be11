//! Tenant (customer) identifiers.
//!
//! Identifiers arrive from configuration and command lines as loosely
//! formatted strings such as `"123-456-7890, 111 222 3333"`. Dashes and
//! spaces are separators inside a single identifier; commas separate
//! identifiers. After stripping, every identifier must be digits only.
//!
//! ```ignore
//! use launchmon::tenant::{parse_customer_ids, TenantScope};
//!
//! let ids = parse_customer_ids("123-456-7890,1112223333")?;
//! let scope = TenantScope::new(ids, Some("999".parse()?))?;
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Errors raised while parsing tenant identifiers or building a scope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TenantError {
    /// One or more tokens contain non-digit characters after stripping separators.
    #[error("invalid customer id(s): {}", .0.join(", "))]
    Invalid(Vec<String>),

    /// The identifier list was empty.
    #[error("no customer ids supplied")]
    Empty,

    /// More than one customer without a login customer id.
    #[error("a login customer id is required when querying {0} customers")]
    MissingLoginCustomer(usize),
}

pub type TenantResult<T> = Result<T, TenantError>;

/// A validated, digits-only customer identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomerId(String);

impl CustomerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CustomerId {
    type Err = TenantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = strip_separators(s);
        if DIGITS.is_match(&stripped) {
            Ok(CustomerId(stripped))
        } else {
            Err(TenantError::Invalid(vec![s.trim().to_string()]))
        }
    }
}

impl TryFrom<String> for CustomerId {
    type Error = TenantError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CustomerId> for String {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn strip_separators(s: &str) -> String {
    s.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect()
}

/// Parse a comma-separated list of identifiers, preserving order.
///
/// Empty tokens (from `"1,,2"` or a trailing comma) are skipped. Every
/// offending token is reported as the caller wrote it, not just the first.
pub fn parse_customer_ids(input: &str) -> TenantResult<Vec<CustomerId>> {
    let mut ids = Vec::new();
    let mut invalid = Vec::new();
    for raw in input.split(',') {
        let token = strip_separators(raw);
        if token.is_empty() {
            continue;
        }
        if DIGITS.is_match(&token) {
            ids.push(CustomerId(token));
        } else {
            invalid.push(raw.trim().to_string());
        }
    }

    if !invalid.is_empty() {
        return Err(TenantError::Invalid(invalid));
    }
    if ids.is_empty() {
        return Err(TenantError::Empty);
    }
    Ok(ids)
}

/// Normalize a batch of identifier strings, each of which may itself be compound.
pub fn normalize_all<S: AsRef<str>>(inputs: &[S]) -> TenantResult<Vec<CustomerId>> {
    let mut ids = Vec::new();
    let mut invalid = Vec::new();
    for input in inputs {
        match parse_customer_ids(input.as_ref()) {
            Ok(parsed) => ids.extend(parsed),
            Err(TenantError::Invalid(tokens)) => invalid.extend(tokens),
            Err(TenantError::Empty) => {}
            Err(other) => return Err(other),
        }
    }
    if !invalid.is_empty() {
        return Err(TenantError::Invalid(invalid));
    }
    if ids.is_empty() {
        return Err(TenantError::Empty);
    }
    Ok(ids)
}

/// The customers a report runs against, plus the login customer used for
/// authorization when acting on behalf of others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    customer_ids: Vec<CustomerId>,
    login_customer_id: Option<CustomerId>,
}

impl TenantScope {
    /// Build a scope. Duplicate ids are removed, first occurrence wins.
    pub fn new(
        customer_ids: Vec<CustomerId>,
        login_customer_id: Option<CustomerId>,
    ) -> TenantResult<Self> {
        let mut seen = BTreeSet::new();
        let customer_ids: Vec<CustomerId> = customer_ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        if customer_ids.is_empty() {
            return Err(TenantError::Empty);
        }
        if customer_ids.len() > 1 && login_customer_id.is_none() {
            return Err(TenantError::MissingLoginCustomer(customer_ids.len()));
        }

        Ok(Self {
            customer_ids,
            login_customer_id,
        })
    }

    /// Parse both parts of a scope from raw strings.
    pub fn parse(customer_ids: &str, login_customer_id: Option<&str>) -> TenantResult<Self> {
        let ids = parse_customer_ids(customer_ids)?;
        let login = match login_customer_id.map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(raw.parse()?),
            _ => None,
        };
        Self::new(ids, login)
    }

    pub fn customer_ids(&self) -> &[CustomerId] {
        &self.customer_ids
    }

    pub fn login_customer_id(&self) -> Option<&CustomerId> {
        self.login_customer_id.as_ref()
    }

    /// A scope over different customers that keeps this scope's login customer.
    pub fn with_customers(&self, customer_ids: Vec<CustomerId>) -> TenantResult<Self> {
        Self::new(customer_ids, self.login_customer_id.clone())
    }
}
