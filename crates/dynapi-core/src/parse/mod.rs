pub mod components;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod request_body;
pub mod server;
pub mod spec;

use crate::error::ParseError;
use spec::OpenApiSpec;

/// Parse an OpenAPI spec from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI spec from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse a document whose format is not known up front. Content starting with
/// `{` is treated as JSON, anything else as YAML.
pub fn from_str(input: &str) -> Result<OpenApiSpec, ParseError> {
    if input.trim_start().starts_with('{') {
        from_json(input)
    } else {
        from_yaml(input)
    }
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(spec.openapi.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_detects_json() {
        let json = r#"{"openapi":"3.0.3","info":{"title":"J","version":"1"},"paths":{}}"#;
        let spec = from_str(json).unwrap();
        assert_eq!(spec.info.title, "J");
    }

    #[test]
    fn test_from_str_falls_back_to_yaml() {
        let yaml = "openapi: 3.1.0\ninfo:\n  title: Y\n  version: '1'\n";
        let spec = from_str(yaml).unwrap();
        assert_eq!(spec.info.title, "Y");
        assert!(spec.paths.is_empty());
    }

    #[test]
    fn test_swagger_two_rejected() {
        let json = r#"{"openapi":"2.0","info":{"title":"J","version":"1"}}"#;
        assert!(matches!(
            from_str(json),
            Err(ParseError::UnsupportedVersion(v)) if v == "2.0"
        ));
    }
}
