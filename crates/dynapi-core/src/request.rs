use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{HeaderName, HeaderValue};

use crate::binder::BoundArguments;
use crate::catalog::{HttpMethod, Operation};
use crate::error::ClientError;

/// Headers every request starts with.
pub const DEFAULT_HEADERS: [(&str, &str); 3] = [
    ("Content-Type", "application/json"),
    ("Accept", "application/json"),
    ("User-Agent", "openapi-client/1.0"),
];

/// Unreserved characters and `/` pass through in path values.
pub const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Only unreserved characters pass through in query keys and values.
pub const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A fully materialised HTTP request, ready for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Header fields in send order; names are unique ignoring case.
    pub headers: Vec<(String, String)>,
    /// UTF-8 JSON payload.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// JSON description of the request, for dry runs and diagnostics.
    pub fn describe(&self) -> serde_json::Value {
        let body = self
            .body
            .as_deref()
            .and_then(|b| serde_json::from_slice::<serde_json::Value>(b).ok());
        serde_json::json!({
            "method": self.method.as_str(),
            "url": self.url,
            "headers": self.headers.iter().cloned().collect::<IndexMap<String, String>>(),
            "body": body,
        })
    }
}

/// Build the request for `op` from already-bound arguments.
///
/// Pure: the same inputs always give an identical request.
pub fn materialise(
    base_url: &str,
    op: &Operation,
    bound: &BoundArguments,
    default_headers: &IndexMap<String, String>,
) -> Result<HttpRequest, ClientError> {
    let mut url = expand_path(base_url, &op.path, &bound.path)?;
    append_query(&mut url, &bound.query);

    let mut headers: Vec<(String, String)> = DEFAULT_HEADERS
        .iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect();
    let params = bound.headers.iter().map(|(n, v)| (n, v));
    for (name, value) in default_headers.iter().chain(params) {
        validate_header(name, value)?;
        merge_header(&mut headers, name, value);
    }

    let body = match &bound.body {
        Some(value) if op.method.is_entity_enclosing() => Some(
            serde_json::to_vec(value)
                .map_err(|e| ClientError::encoding("request body", e.to_string()))?,
        ),
        Some(_) => {
            log::debug!(
                "{}: dropping request body for {} request",
                op.operation_id,
                op.method.as_str()
            );
            None
        }
        None => None,
    };

    Ok(HttpRequest {
        method: op.method,
        url,
        headers,
        body,
    })
}

/// `base_url + template` with each bound `{name}` replaced by its encoded value.
///
/// `.` and `..` segments are rejected: URL normalisation (which also decodes
/// `%2E`) would remove them and send the request to a different resource.
pub fn expand_path(
    base_url: &str,
    template: &str,
    path: &IndexMap<String, String>,
) -> Result<String, ClientError> {
    let mut url = format!("{}{}", base_url.trim_end_matches('/'), template);
    for (name, value) in path {
        if value.split('/').any(|segment| segment == "." || segment == "..") {
            return Err(ClientError::encoding(
                format!("path parameter '{name}'"),
                format!("'{value}' contains a dot segment"),
            ));
        }
        let encoded = utf8_percent_encode(value, PATH_ENCODE_SET).to_string();
        url = url.replace(&format!("{{{name}}}"), &encoded);
    }
    Ok(url)
}

/// Append `key=value` pairs, starting with `?` or `&` as the URL requires.
pub fn append_query(url: &mut String, pairs: &[(String, String)]) {
    let mut separator = if url.contains('?') { '&' } else { '?' };
    for (key, value) in pairs {
        url.push(separator);
        url.push_str(&utf8_percent_encode(key, QUERY_ENCODE_SET).to_string());
        url.push('=');
        url.push_str(&utf8_percent_encode(value, QUERY_ENCODE_SET).to_string());
        separator = '&';
    }
}

/// Set a header, replacing any existing field whose name matches ignoring case.
fn merge_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        Some(existing) => *existing = (name.to_string(), value.to_string()),
        None => headers.push((name.to_string(), value.to_string())),
    }
}

fn validate_header(name: &str, value: &str) -> Result<(), ClientError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| ClientError::encoding(format!("header name '{name}'"), e.to_string()))?;
    HeaderValue::from_str(value)
        .map_err(|e| ClientError::encoding(format!("header '{name}'"), e.to_string()))?;
    Ok(())
}
