//! A single page request and the decoding of its response.

use serde_json::Value;
use trellis_core::logging::targets;
use url::Url;

use crate::error::{NetworkError, Result};
use crate::fetch::{FetchResult, QueryParams};

const TARGET: &str = targets::HTTP;

/// A GET request for one page, with the list view's parameters appended to
/// whatever query the base URL already carries.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PageRequest {
    url: Url,
}

impl PageRequest {
    pub(crate) fn new(base: &str, params: &QueryParams) -> Result<Self> {
        let mut url = Url::parse(base)?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(Self { url })
    }

    pub(crate) fn url(&self) -> &Url {
        &self.url
    }

    /// Send the request and turn the response into a [`FetchResult`].
    ///
    /// A non-2xx status fails with [`NetworkError::HttpStatus`] carrying the
    /// body, and a 2xx body that is not JSON fails with
    /// [`NetworkError::Json`]. Both keep the status code.
    pub(crate) async fn send(self, client: &reqwest::Client, bearer: Option<&str>) -> FetchResult {
        tracing::debug!(target: TARGET, url = %self.url(), "fetching page");

        let mut request = client.get(self.url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(target: TARGET, error = %err, "request failed");
                return FetchResult::failure(err.into());
            }
        };

        let status = response.status();
        let code = status.as_u16();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(target: TARGET, status = code, error = %err, "reading body failed");
                return FetchResult::failure(err.into()).with_status(code);
            }
        };

        if !status.is_success() {
            let message = String::from_utf8_lossy(&body).trim().to_string();
            let error = NetworkError::HttpStatus {
                status: code,
                message: (!message.is_empty()).then_some(message),
            };
            tracing::warn!(target: TARGET, status = code, %error, "request returned error status");
            return FetchResult::failure(error).with_status(code);
        }

        match serde_json::from_slice::<Value>(&body) {
            Ok(payload) => FetchResult::success(payload).with_status(code),
            Err(err) => {
                tracing::warn!(target: TARGET, status = code, error = %err, "response body is not JSON");
                FetchResult::failure(err.into()).with_status(code)
            }
        }
    }
}
