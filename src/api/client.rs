//! Purpose: Provide the typed HTTP client for the ordered store protocol.
//! Exports: `StoreClient`, `OrderedReadOptions`.
//! Role: Translate typed record operations into single-round-trip store queries.
//! Invariants: Every request carries the configured bearer token; no retries, no caching.
//! Invariants: Malformed calls are rejected before dispatch; no round trip is spent on them.
//! Invariants: Prefix reads scan the closed range from the prefix to prefix + sentinel.

use crate::core::error::{Error, ErrorKind};
use crate::core::keys::{prefix_range, validate_key, validate_prefix};
use crate::core::path::StorePath;
use crate::core::query::{Cap, Query};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use url::Url;

type ApiResult<T> = Result<T, Error>;

/// Stateless client for a remote ordered hierarchical key-value store.
///
/// Cloning is cheap; clones share the endpoint, token, and transport agent.
/// Each operation is one request and one response with no shared mutable
/// state, so a client may be used from any number of threads at once. The
/// store is the sole arbiter of ordering between concurrent writes.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    base_url: Url,
    token: Option<String>,
    agent: ureq::Agent,
}

/// Options for field-ordered reads.
#[derive(Clone, Debug)]
pub struct OrderedReadOptions {
    pub limit: u32,
    pub descending: bool,
}

impl OrderedReadOptions {
    pub fn new() -> Self {
        Self {
            limit: 100,
            descending: false,
        }
    }
}

impl Default for OrderedReadOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct RecordEnvelope {
    key: String,
    value: Value,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let agent = ureq::AgentBuilder::new().build();
        Ok(Self {
            inner: Arc::new(StoreClientInner {
                base_url,
                token: None,
                agent,
            }),
        })
    }

    /// Attaches the pre-issued secret token sent with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.token = Some(token.into());
        } else {
            self.inner = Arc::new(StoreClientInner {
                base_url: self.inner.base_url.clone(),
                token: Some(token.into()),
                agent: self.inner.agent.clone(),
            });
        }
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Upserts `value` at `path/key`, replacing any prior record in full.
    pub fn write<T: Serialize>(&self, path: &StorePath, key: &str, value: &T) -> ApiResult<()> {
        validate_key(key).map_err(|err| err.with_path(path.to_string()))?;
        let payload = serde_json::to_string(value).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode record json")
                .with_source(err)
        })?;
        let url = self.record_url(path, key)?;
        self.dispatch("PUT", &url, Some(&payload))
            .map_err(|err| err.with_path(path.to_string()).with_key(key))?;
        Ok(())
    }

    /// Removes the record at `path/key`. Deleting an absent key is success.
    pub fn delete(&self, path: &StorePath, key: &str) -> ApiResult<()> {
        validate_key(key).map_err(|err| err.with_path(path.to_string()))?;
        let url = self.record_url(path, key)?;
        match self.dispatch("DELETE", &url, None) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.with_path(path.to_string()).with_key(key)),
        }
    }

    /// Exact lookup. Absence is `Ok(None)`, never an error; a stored value
    /// that does not match `T` is a `Decode` error.
    pub fn read_one<T: DeserializeOwned>(
        &self,
        path: &StorePath,
        key: &str,
    ) -> ApiResult<Option<T>> {
        validate_key(key).map_err(|err| err.with_path(path.to_string()))?;
        let url = self.record_url(path, key)?;
        let body = match self.dispatch("GET", &url, None) {
            Ok(response) => read_json_body(response)?,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.with_path(path.to_string()).with_key(key)),
        };
        if body.is_null() {
            return Ok(None);
        }
        let record = serde_json::from_value(body).map_err(|err| {
            decode_error(err)
                .with_path(path.to_string())
                .with_key(key)
        })?;
        Ok(Some(record))
    }

    /// Every record under `path`, ascending by key.
    pub fn read_all<T: DeserializeOwned>(&self, path: &StorePath) -> ApiResult<Vec<T>> {
        self.read_records(path, Query::by_key())
    }

    /// Records ordered by the named field.
    ///
    /// Ascending reads return the first `limit` records in ascending field
    /// order. Descending reads return the *tail* of ascending order (the
    /// `limit` largest values) without reversing it; a caller that wants
    /// largest-first display order reverses the result itself.
    pub fn read_ordered<T: DeserializeOwned>(
        &self,
        path: &StorePath,
        field: &str,
        options: OrderedReadOptions,
    ) -> ApiResult<Vec<T>> {
        let cap = if options.descending {
            Cap::Last(options.limit)
        } else {
            Cap::First(options.limit)
        };
        self.read_records(path, Query::by_field(field).with_cap(cap))
    }

    /// Records whose named field exactly equals `value`, in ascending order
    /// of that field. The store's native equality applies; there is no
    /// partial or case-insensitive matching on fields.
    pub fn read_equal_to<T: DeserializeOwned>(
        &self,
        path: &StorePath,
        field: &str,
        value: &str,
    ) -> ApiResult<Vec<T>> {
        self.read_records(path, Query::by_field(field).with_equal_to(value))
    }

    /// Records whose key starts with `prefix`, ascending by key.
    ///
    /// The store has no prefix predicate, so the read is emulated as a closed
    /// key-range scan whose upper bound appends the sentinel character. The
    /// empty prefix degenerates to the full keyspace.
    pub fn read_key_prefix<T: DeserializeOwned>(
        &self,
        path: &StorePath,
        prefix: &str,
    ) -> ApiResult<Vec<T>> {
        validate_prefix(prefix).map_err(|err| err.with_path(path.to_string()))?;
        let (start_at, end_at) = prefix_range(prefix);
        self.read_records(path, Query::by_key().with_range(start_at, end_at))
    }

    fn read_records<T: DeserializeOwned>(&self, path: &StorePath, query: Query) -> ApiResult<Vec<T>> {
        query
            .validate()
            .map_err(|err| err.with_path(path.to_string()))?;
        let url = self.collection_url(path, &query)?;
        let body = match self.dispatch("GET", &url, None) {
            Ok(response) => read_json_body(response)?,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.with_path(path.to_string())),
        };
        if body.is_null() {
            return Ok(Vec::new());
        }
        let envelopes: Vec<RecordEnvelope> = serde_json::from_value(body).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("malformed record listing")
                .with_path(path.to_string())
                .with_source(err)
        })?;
        let mut records = Vec::with_capacity(envelopes.len());
        for envelope in envelopes {
            let record = serde_json::from_value(envelope.value).map_err(|err| {
                decode_error(err)
                    .with_path(path.to_string())
                    .with_key(envelope.key)
            })?;
            records.push(record);
        }
        Ok(records)
    }

    fn record_url(&self, path: &StorePath, key: &str) -> ApiResult<Url> {
        let mut url = self.inner.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::new(ErrorKind::Usage).with_message("store base url cannot be a base")
            })?;
            segments.clear();
            for segment in path.segments() {
                segments.push(segment);
            }
            segments.push(key);
        }
        Ok(url)
    }

    fn collection_url(&self, path: &StorePath, query: &Query) -> ApiResult<Url> {
        let mut url = self.inner.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::new(ErrorKind::Usage).with_message("store base url cannot be a base")
            })?;
            segments.clear();
            for segment in path.segments() {
                segments.push(segment);
            }
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query.query_pairs() {
                pairs.append_pair(name, &value);
            }
        }
        Ok(url)
    }

    fn dispatch(&self, method: &str, url: &Url, body: Option<&str>) -> ApiResult<ureq::Response> {
        debug!(method, url = %url, "dispatching store request");
        let mut request = self
            .inner
            .agent
            .request(method, url.as_str())
            .set("Accept", "application/json");
        if let Some(token) = &self.inner.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        let response = match body {
            Some(payload) => request
                .set("Content-Type", "application/json")
                .send_string(payload),
            None => request.call(),
        };
        match response {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, response)) => {
                Err(parse_error_response(status, response))
            }
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Io)
                .with_message("request failed")
                .with_source(err)),
        }
    }
}

fn normalize_base_url(raw: String) -> ApiResult<Url> {
    let mut url = Url::parse(&raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid store base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(
            Error::new(ErrorKind::Usage).with_message("store base url must use http or https")
        );
    }
    if url.path() != "/" && !url.path().is_empty() {
        return Err(
            Error::new(ErrorKind::Usage).with_message("store base url must not include a path")
        );
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn read_json_body(response: ureq::Response) -> ApiResult<Value> {
    let body = response.into_string().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read response body")
            .with_source(err)
    })?;
    serde_json::from_str(&body).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("invalid response json")
            .with_source(err)
    })
}

fn parse_error_response(status: u16, response: ureq::Response) -> Error {
    let kind = error_kind_from_status(status);
    let body = response.into_string().unwrap_or_default();
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
        return Error::new(kind).with_message(envelope.error);
    }
    Error::new(kind).with_message(format!("store error status {status}"))
}

fn error_kind_from_status(status: u16) -> ErrorKind {
    match status {
        400 | 413 => ErrorKind::Usage,
        401 | 403 => ErrorKind::Permission,
        404 => ErrorKind::NotFound,
        500..=599 => ErrorKind::Internal,
        _ => ErrorKind::Io,
    }
}

fn decode_error(err: serde_json::Error) -> Error {
    Error::new(ErrorKind::Decode)
        .with_message("stored value does not match the requested type")
        .with_source(err)
}
