use std::io;
use std::path::PathBuf;

use url::Url;

use crate::error::SpecError;
use crate::parse::{self, ref_resolve::RefResolver, spec::OpenApiSpec};

/// Where a spec document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecLocation {
    Remote(Url),
    Local(PathBuf),
}

impl SpecLocation {
    /// `http`/`https` URLs are fetched and `file` URLs are decoded to a path.
    /// Anything that does not parse as a URL (or uses another scheme, such as
    /// a Windows drive letter) is taken as a filesystem path.
    pub fn classify(location: &str) -> Result<Self, SpecError> {
        let Ok(url) = Url::parse(location) else {
            return Ok(SpecLocation::Local(PathBuf::from(location)));
        };
        match url.scheme() {
            "http" | "https" => Ok(SpecLocation::Remote(url)),
            "file" => url
                .to_file_path()
                .map(SpecLocation::Local)
                .map_err(|()| SpecError::Read {
                    path: location.to_string(),
                    source: io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "file URL does not name a local path",
                    ),
                }),
            _ => Ok(SpecLocation::Local(PathBuf::from(location))),
        }
    }
}

/// Load, parse and dereference the spec document at `location`, which may be
/// an HTTP(S) URL, a `file://` URL or a filesystem path.
pub async fn load(http: &reqwest::Client, location: &str) -> Result<OpenApiSpec, SpecError> {
    let content = match SpecLocation::classify(location)? {
        SpecLocation::Remote(url) => fetch(http, url).await?,
        SpecLocation::Local(path) => tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| SpecError::Read {
                path: path.display().to_string(),
                source,
            })?,
    };

    let spec = load_str(&content)?;
    log::debug!(
        "loaded OpenAPI {} spec '{}' from {} ({} paths, {} operations)",
        spec.openapi,
        spec.info.title,
        location,
        spec.paths.len(),
        spec.operation_count()
    );
    Ok(spec)
}

/// Parse and dereference an in-memory document.
pub fn load_str(content: &str) -> Result<OpenApiSpec, SpecError> {
    let parsed = parse::from_str(content)?;
    let resolved = RefResolver::new(&parsed).resolve_spec(&parsed)?;
    Ok(resolved)
}

async fn fetch(http: &reqwest::Client, url: Url) -> Result<String, SpecError> {
    let fetch_err = |source: reqwest::Error| SpecError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = http
        .get(url.clone())
        .header(reqwest::header::ACCEPT, "application/json, application/yaml, */*")
        .send()
        .await
        .map_err(fetch_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(SpecError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(fetch_err)
}
