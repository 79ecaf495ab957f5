use serde::Serialize;

use crate::parse::parameter::ParameterLocation;

/// HTTP method of a catalogued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Registration order within one path item.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// POST, PUT and PATCH carry a request body; other methods drop it.
    pub fn is_entity_enclosing(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// A declared parameter, after `$ref` resolution and path-level merging.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub description: Option<String>,
}

impl Parameter {
    /// Path parameters are required whether or not the document says so.
    pub fn is_required(&self) -> bool {
        self.required || self.location == ParameterLocation::Path
    }
}

/// Request body descriptor. Only its presence drives binding.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodyInfo {
    pub required: bool,
    pub content_type: Option<String>,
    pub description: Option<String>,
}

/// One callable (path, method) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Declared or synthesised id, original case.
    pub operation_id: String,
    /// Whether `operation_id` was synthesised from method and path.
    pub synthesized_id: bool,
    pub method: HttpMethod,
    /// Path template with `{name}` placeholders; always starts with `/`.
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBodyInfo>,
}

impl Operation {
    /// Catalog key.
    pub fn key(&self) -> String {
        self.operation_id.to_lowercase()
    }

    pub fn has_request_body(&self) -> bool {
        self.request_body.is_some()
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }

    pub fn info(&self) -> OperationInfo {
        OperationInfo {
            operation_id: self.operation_id.clone(),
            method: self.method.as_str(),
            path: self.path.clone(),
            summary: self.summary.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            parameters: self
                .parameters
                .iter()
                .map(|p| ParameterInfo {
                    name: p.name.clone(),
                    location: p.location.as_str(),
                    required: p.required,
                    description: p.description.clone().unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Introspection record for one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationInfo {
    pub operation_id: String,
    pub method: &'static str,
    pub path: String,
    pub summary: String,
    pub description: String,
    pub parameters: Vec<ParameterInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "in")]
    pub location: &'static str,
    pub required: bool,
    pub description: String,
}
