use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::ClientOptions;
use crate::error::ClientError;
use crate::request::HttpRequest;
use crate::response::ResponseRecord;

/// Executes materialised requests. Cloning is cheap and clones share one
/// connection pool; safe for concurrent use.
#[derive(Debug, Clone)]
pub struct HttpEngine {
    http: reqwest::Client,
}

impl HttpEngine {
    pub fn new(options: &ClientOptions) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout())
            .read_timeout(options.read_timeout())
            .build()
            .map_err(ClientError::Transport)?;
        Ok(Self { http })
    }

    /// The underlying client, shared with the spec loader.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send `request` and decode the response.
    ///
    /// Any status code yields a record; only failures before a complete
    /// response is read are errors.
    pub async fn execute(&self, request: &HttpRequest) -> Result<ResponseRecord, ClientError> {
        let mut builder = self
            .http
            .request(request.method.into(), &request.url)
            .headers(header_map(&request.headers)?);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        log::debug!("{} {}", request.method.as_str(), request.url);
        let response = builder.send().await.map_err(ClientError::Transport)?;

        let status = response.status();
        let headers = collect_headers(response.headers());
        let body = response.text().await.map_err(ClientError::Transport)?;
        log::debug!(
            "{} {} -> {}",
            request.method.as_str(),
            request.url,
            status.as_u16()
        );

        Ok(ResponseRecord::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            headers,
            &body,
        ))
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, ClientError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::Invariant(format!("unvalidated header name: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::Invariant(format!("unvalidated header value: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Group header values by name, keeping repeated fields in order.
fn collect_headers(headers: &HeaderMap) -> IndexMap<String, Vec<String>> {
    let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();
    for (name, value) in headers {
        grouped
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_headers_groups_duplicates() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("content-type", HeaderValue::from_static("application/json"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));

        let grouped = collect_headers(&headers);
        assert_eq!(grouped["set-cookie"], vec!["a=1", "b=2"]);
        assert_eq!(grouped["content-type"], vec!["application/json"]);
    }

    #[test]
    fn test_header_map_round_trip() {
        let map = header_map(&[("X-Id".to_string(), "7".to_string())]).unwrap();
        assert_eq!(map.get("x-id").unwrap(), "7");
    }
}
