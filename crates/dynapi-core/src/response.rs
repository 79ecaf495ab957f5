use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Uniform result of a call, whatever the status code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub status_code: u16,
    /// Reason phrase, `""` if the status has none.
    pub status_text: String,
    /// Header name to every value received for it, in arrival order.
    pub headers: IndexMap<String, Vec<String>>,
    /// Decoded JSON when the body looks structural, else the raw text.
    pub data: Value,
    /// `HTTP <code>: <statusText>`, present iff `status_code >= 400`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseRecord {
    pub fn new(
        status_code: u16,
        status_text: impl Into<String>,
        headers: IndexMap<String, Vec<String>>,
        body: &str,
    ) -> Self {
        let status_text = status_text.into();
        let error = (status_code >= 400).then(|| format!("HTTP {status_code}: {status_text}"));
        Self {
            status_code,
            status_text,
            headers,
            data: decode_body(body),
            error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// First value of a header, matched ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// Decode a response body.
///
/// The trimmed body is parsed as JSON when it starts with `{` or `[`; if that
/// fails, or the body is not structural, the raw text is returned. Empty and
/// `null` bodies become `""`.
pub fn decode_body(body: &str) -> Value {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Value::String(String::new());
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str(trimmed) {
            return value;
        }
    }
    Value::String(body.to_string())
}
