//! Conditional-request validators from the last successful fetch.

use http::header::{HeaderMap, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use tracing::warn;

/// `ETag` / `Last-Modified` pair as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    pub entity_tag: Option<String>,
    pub last_modified: Option<String>,
}

#[derive(Debug, Default)]
pub struct ValidatorCache {
    current: Validators,
}

impl ValidatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &Validators {
        &self.current
    }

    /// Headers for the next request. The entity tag wins; the two are never
    /// sent together.
    pub fn request_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let (name, value) = match (&self.current.entity_tag, &self.current.last_modified) {
            (Some(tag), _) => (IF_NONE_MATCH, tag),
            (None, Some(date)) => (IF_MODIFIED_SINCE, date),
            (None, None) => return headers,
        };
        match HeaderValue::from_str(value) {
            Ok(v) => {
                headers.insert(name, v);
            }
            Err(_) => warn!(header = %name, "Stored validator is not a valid header value — sending unconditional request"),
        }
        headers
    }

    /// Replace both validators at once. A response carrying neither clears
    /// the cache so a stale tag is never replayed.
    pub fn update(&mut self, entity_tag: Option<String>, last_modified: Option<String>) {
        self.current = Validators { entity_tag, last_modified };
    }

    pub fn replace(&mut self, validators: Validators) {
        self.current = validators;
    }
}
