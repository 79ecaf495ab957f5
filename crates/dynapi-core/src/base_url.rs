use url::Url;

use crate::parse::spec::OpenApiSpec;

/// Used when neither the spec nor its location yields a usable origin.
pub const FALLBACK_BASE_URL: &str = "http://localhost";

/// Derive the base URL for requests.
///
/// The first declared server wins (with server variables set to their
/// defaults). Otherwise the scheme, host and port of `spec_url` are used, and
/// if that does not parse as an absolute URL, [`FALLBACK_BASE_URL`]. A server
/// URL relative to the document (`/v2`) is joined onto that same origin. The
/// result never ends with `/`.
pub fn resolve_base_url(spec: &OpenApiSpec, spec_url: &str) -> String {
    let origin = || origin_of(spec_url).unwrap_or_else(|| FALLBACK_BASE_URL.to_string());
    match spec.servers.first() {
        Some(server) => {
            let url = server.expanded_url();
            if url.starts_with('/') {
                trim_trailing_slash(&format!("{}{}", origin(), url))
            } else {
                trim_trailing_slash(&url)
            }
        }
        None => origin(),
    }
}

/// `<scheme>://<host>[:<port>]` of an absolute URL. Default ports are omitted.
pub fn origin_of(spec_url: &str) -> Option<String> {
    let url = Url::parse(spec_url).ok()?;
    let host = url.host_str().filter(|h| !h.is_empty())?;
    let mut origin = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        origin.push_str(&format!(":{port}"));
    }
    Some(origin)
}

pub fn trim_trailing_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn spec_with_servers(servers: &str) -> OpenApiSpec {
        let yaml = format!(
            "openapi: \"3.0.0\"\ninfo:\n  title: T\n  version: \"1\"\n{servers}paths: {{}}\n"
        );
        parse::from_yaml(&yaml).unwrap()
    }

    #[test]
    fn test_first_server_wins() {
        let spec = spec_with_servers(
            "servers:\n  - url: https://api.example.com/v1/\n  - url: https://backup.example.com\n",
        );
        assert_eq!(
            resolve_base_url(&spec, "https://docs.example.com/openapi.yaml"),
            "https://api.example.com/v1"
        );
    }

    #[test]
    fn test_relative_server_joins_spec_origin() {
        let spec = spec_with_servers("servers:\n  - url: /api/v2\n");
        assert_eq!(
            resolve_base_url(&spec, "https://api.example.com:8443/openapi.yaml"),
            "https://api.example.com:8443/api/v2"
        );
        assert_eq!(resolve_base_url(&spec, "openapi.yaml"), "http://localhost/api/v2");
    }

    #[test]
    fn test_origin_from_spec_url() {
        let spec = spec_with_servers("");
        assert_eq!(
            resolve_base_url(&spec, "http://127.0.0.1:8080/specs/openapi.json"),
            "http://127.0.0.1:8080"
        );
        assert_eq!(
            resolve_base_url(&spec, "https://api.example.com/openapi.json"),
            "https://api.example.com"
        );
    }

    #[test]
    fn test_unparseable_spec_url_falls_back() {
        let spec = spec_with_servers("");
        assert_eq!(resolve_base_url(&spec, "specs/openapi.yaml"), "http://localhost");
        assert_eq!(resolve_base_url(&spec, "not a url"), FALLBACK_BASE_URL);
    }

    #[test]
    fn test_file_url_has_no_host() {
        assert_eq!(origin_of("file:///tmp/openapi.yaml"), None);
    }
}
