use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unresolved reference: {0}")]
    UnresolvedRef(String),

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),
}

/// Failure to obtain a usable spec document from a location.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
}

/// Errors surfaced by the client facade.
///
/// HTTP responses with a status of 400 or above are not errors; they come back
/// as a [`ResponseRecord`](crate::response::ResponseRecord) with `error` set.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to load OpenAPI specification: {0}")]
    SpecParse(#[from] SpecError),

    #[error("method '{0}' not found in OpenAPI specification")]
    UnknownOperation(String),

    #[error("missing required parameter: {0}")]
    MissingRequiredParameter(String),

    #[error("cannot encode {context}: {reason}")]
    Encoding { context: String, reason: String },

    #[error("HTTP transport failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("invalid client options: {0}")]
    InvalidOptions(String),

    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

/// Stable names for each error kind, for hosts that map errors onto their own
/// exception vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SpecParse,
    UnknownOperation,
    MissingRequiredParameter,
    Encoding,
    Transport,
    InvalidOptions,
    Invariant,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SpecParse => "SpecParseError",
            ErrorKind::UnknownOperation => "UnknownOperation",
            ErrorKind::MissingRequiredParameter => "MissingRequiredParameter",
            ErrorKind::Encoding => "EncodingError",
            ErrorKind::Transport => "TransportError",
            ErrorKind::InvalidOptions => "InvalidOptions",
            ErrorKind::Invariant => "InvariantError",
        }
    }
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::SpecParse(_) => ErrorKind::SpecParse,
            ClientError::UnknownOperation(_) => ErrorKind::UnknownOperation,
            ClientError::MissingRequiredParameter(_) => ErrorKind::MissingRequiredParameter,
            ClientError::Encoding { .. } => ErrorKind::Encoding,
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::InvalidOptions(_) => ErrorKind::InvalidOptions,
            ClientError::Invariant(_) => ErrorKind::Invariant,
        }
    }

    /// True when the underlying transport failure was a connect or read timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport(e) if e.is_timeout())
    }

    pub(crate) fn encoding(context: impl Into<String>, reason: impl Into<String>) -> Self {
        ClientError::Encoding {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        let err = ClientError::UnknownOperation("doesNotExist".into());
        assert_eq!(err.kind().as_str(), "UnknownOperation");
        assert_eq!(
            err.to_string(),
            "method 'doesNotExist' not found in OpenAPI specification"
        );

        let err = ClientError::encoding("header 'X-Id'", "value is a map");
        assert_eq!(err.kind(), ErrorKind::Encoding);
        assert_eq!(err.to_string(), "cannot encode header 'X-Id': value is a map");
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_spec_error_converts() {
        let err: ClientError = SpecError::from(ParseError::UnsupportedVersion("2.0".into())).into();
        assert_eq!(err.kind(), ErrorKind::SpecParse);
        assert!(err.to_string().contains("unsupported OpenAPI version: 2.0"));
    }
}
