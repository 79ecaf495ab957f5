use indexmap::IndexMap;
use serde::Deserialize;

/// Request body declaration. Only the media type names are kept.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestBody {
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub required: bool,
}

impl RequestBody {
    /// `application/json` if declared, otherwise the first declared media type.
    pub fn preferred_content_type(&self) -> Option<&str> {
        if self.content.contains_key("application/json") {
            return Some("application/json");
        }
        self.content.keys().next().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RequestBodyOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    RequestBody(RequestBody),
}
