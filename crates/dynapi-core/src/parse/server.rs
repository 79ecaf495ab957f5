use indexmap::IndexMap;
use serde::Deserialize;

/// A substitution for one `{name}` in a server URL template.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerVariable {
    pub default: String,
}

/// One entry of the document's `servers` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default)]
    pub variables: IndexMap<String, ServerVariable>,
}

impl Server {
    /// The server URL with every `{variable}` replaced by its declared default.
    pub fn expanded_url(&self) -> String {
        let mut url = self.url.clone();
        for (name, var) in &self.variables {
            url = url.replace(&format!("{{{name}}}"), &var.default);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expanded_url_uses_defaults() {
        let server: Server = serde_json::from_value(serde_json::json!({
            "url": "https://{region}.example.com/{version}",
            "variables": {
                "region": {"default": "eu"},
                "version": {"default": "v2"}
            }
        }))
        .unwrap();
        assert_eq!(server.expanded_url(), "https://eu.example.com/v2");
    }
}
