//! Search endpoint wire types.
//!
//! Request body:
//! ```json
//! {"pageSize": 10000, "query": "SELECT ...", "customerId": "123", "pageToken": "..."}
//! ```
//!
//! Response body:
//! ```json
//! {"results": [{...}, ...], "nextPageToken": "..."}
//! ```

use serde::{Deserialize, Serialize};

use crate::row::Row;
use crate::tenant::CustomerId;

/// Header carrying the product developer token.
pub const DEVELOPER_TOKEN_HEADER: &str = "developer-token";

/// Header carrying the login customer id.
pub const LOGIN_CUSTOMER_HEADER: &str = "login-customer-id";

/// JSON body of a search call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    pub page_size: u32,
    pub query: String,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// A fully prepared POST for one customer and one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub customer_id: CustomerId,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: SearchBody,
}

impl SearchRequest {
    /// Look up a header value by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Decoded search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl SearchResponse {
    /// The continuation token, treating an empty string as absent.
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}
