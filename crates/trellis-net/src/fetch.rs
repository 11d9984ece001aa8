//! The network collaborator contract used by paginated list views.
//!
//! A list view never talks to a transport directly. It hands a URL and a set
//! of query parameters to a [`NetworkClient`], keeps the returned
//! [`Cancelable`] handle while the request is in flight, and receives the
//! outcome as a [`FetchResult`] through a one-shot completion callback.
//!
//! [`crate::http::HttpNetworkClient`] is the reqwest-backed implementation;
//! tests substitute their own fakes.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::NetworkError;

/// Query parameters for a fetch, ordered by key.
pub type QueryParams = BTreeMap<String, String>;

/// One-shot callback receiving the outcome of a fetch.
pub type FetchCompletion = Box<dyn FnOnce(FetchResult) + Send + 'static>;

/// A handle to an in-flight request.
pub trait Cancelable: Send + Sync {
    /// Request cancellation.
    ///
    /// Cancellation is best-effort: returns `true` if the request was still
    /// pending and the cancellation was delivered, `false` if it had already
    /// completed or been cancelled.
    fn cancel(&self) -> bool;

    /// Returns `true` while the request has neither completed nor been cancelled.
    fn is_pending(&self) -> bool;
}

/// A transport able to issue GET requests on behalf of a list view.
///
/// Implementations must invoke `completion` at most once. A request that is
/// cancelled before it resolves may drop its completion without calling it.
pub trait NetworkClient: Send + Sync {
    /// Issue a GET request for `url` with the given query parameters.
    fn get(&self, url: &str, params: QueryParams, completion: FetchCompletion)
        -> Box<dyn Cancelable>;
}

/// The outcome of a fetch: either a loosely-typed JSON payload or an error.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    status_code: Option<u16>,
    outcome: std::result::Result<Value, NetworkError>,
}

impl FetchResult {
    /// A successful result carrying `payload`.
    pub fn success(payload: Value) -> Self {
        Self {
            status_code: None,
            outcome: Ok(payload),
        }
    }

    /// A failed result.
    pub fn failure(error: NetworkError) -> Self {
        Self {
            status_code: None,
            outcome: Err(error),
        }
    }

    /// Attach the HTTP status code the result was produced from.
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// Returns `true` if the fetch succeeded.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The HTTP status code, if the result came from an HTTP response.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// The payload of a successful fetch.
    pub fn payload(&self) -> Option<&Value> {
        self.outcome.as_ref().ok()
    }

    /// The error of a failed fetch.
    pub fn error(&self) -> Option<&NetworkError> {
        self.outcome.as_ref().err()
    }

    /// Look up a top-level field of the payload.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload().and_then(|payload| payload.get(key))
    }

    /// Extract a pagination cursor from the payload.
    ///
    /// Returns `None` when the field is absent, not a string, or empty.
    pub fn cursor(&self, field: &str) -> Option<&str> {
        self.field(field)
            .and_then(Value::as_str)
            .filter(|cursor| !cursor.is_empty())
    }

    /// Consume the result, returning the payload or the error.
    pub fn into_result(self) -> std::result::Result<Value, NetworkError> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_accessors() {
        let result = FetchResult::success(json!({"items": [1, 2], "cursor": "abc"})).with_status(200);

        assert!(result.is_success());
        assert_eq!(result.status_code(), Some(200));
        assert_eq!(result.cursor("cursor"), Some("abc"));
        assert!(result.error().is_none());
        assert_eq!(result.field("items"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_cursor_absent_empty_or_not_a_string() {
        assert_eq!(FetchResult::success(json!({})).cursor("cursor"), None);
        assert_eq!(FetchResult::success(json!({"cursor": ""})).cursor("cursor"), None);
        assert_eq!(FetchResult::success(json!({"cursor": 7})).cursor("cursor"), None);
        assert_eq!(FetchResult::success(json!([1, 2])).cursor("cursor"), None);
    }

    #[test]
    fn test_failure_has_no_payload() {
        let result = FetchResult::failure(NetworkError::Timeout);

        assert!(!result.is_success());
        assert!(result.payload().is_none());
        assert_eq!(result.cursor("cursor"), None);
        assert_eq!(result.error(), Some(&NetworkError::Timeout));
    }
}
