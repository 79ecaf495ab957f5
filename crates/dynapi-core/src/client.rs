use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::base_url::{resolve_base_url, trim_trailing_slash};
use crate::binder::{self, Arguments};
use crate::catalog::{Catalog, Operation, OperationInfo};
use crate::config::{ClientOptions, OptionsMode};
use crate::engine::HttpEngine;
use crate::error::ClientError;
use crate::loader;
use crate::parse::spec::OpenApiSpec;
use crate::request::{self, HttpRequest};
use crate::response::ResponseRecord;

/// A client for one OpenAPI document: every operation in it can be called by
/// name with positional or named arguments.
///
/// ```no_run
/// # async fn run() -> Result<(), dynapi_core::ClientError> {
/// use dynapi_core::{ClientOptions, OpenApiClient};
/// use serde_json::json;
///
/// let spec = "https://petstore3.swagger.io/api/v3/openapi.json";
/// let client = OpenApiClient::connect(spec, ClientOptions::default()).await?;
/// let pet = client.call("getPetById", &[json!(10)]).await?;
/// println!("{} {}", pet.status_code, pet.data);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OpenApiClient {
    spec: OpenApiSpec,
    spec_url: String,
    base_url: String,
    options: ClientOptions,
    catalog: Catalog,
    engine: Option<HttpEngine>,
}

impl OpenApiClient {
    /// Load the document at `spec_url` (URL or path) and build the catalog.
    pub async fn connect(spec_url: &str, options: ClientOptions) -> Result<Self, ClientError> {
        let engine = HttpEngine::new(&options)?;
        let spec = loader::load(engine.http(), spec_url).await?;
        Ok(Self::assemble(spec, spec_url, options, engine))
    }

    /// Build a client from an in-memory document. `spec_url` is only used for
    /// base URL resolution and introspection.
    pub fn from_spec_str(
        content: &str,
        spec_url: &str,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let engine = HttpEngine::new(&options)?;
        let spec = loader::load_str(content)?;
        Ok(Self::assemble(spec, spec_url, options, engine))
    }

    fn assemble(
        spec: OpenApiSpec,
        spec_url: &str,
        options: ClientOptions,
        engine: HttpEngine,
    ) -> Self {
        let base_url = match options.base_url_override.as_deref() {
            Some(url) => trim_trailing_slash(url),
            None => resolve_base_url(&spec, spec_url),
        };
        let catalog = Catalog::build(&spec);
        log::debug!(
            "client for {spec_url}: {} operations, base URL {base_url}",
            catalog.len()
        );
        Self {
            spec,
            spec_url: spec_url.to_string(),
            base_url,
            options,
            catalog,
            engine: Some(engine),
        }
    }

    /// Call an operation with positional arguments, paired with its
    /// parameters in declaration order.
    pub async fn call(&self, name: &str, args: &[Value]) -> Result<ResponseRecord, ClientError> {
        let op = self.operation(name)?;
        let named = binder::name_positional(op, args);
        self.dispatch(op, &named).await
    }

    /// Call an operation with named arguments.
    pub async fn call_named(
        &self,
        name: &str,
        args: &Arguments,
    ) -> Result<ResponseRecord, ClientError> {
        let op = self.operation(name)?;
        self.dispatch(op, args).await
    }

    /// Call an operation with any value that serialises to a map of named
    /// arguments.
    pub async fn call_with<T: Serialize>(
        &self,
        name: &str,
        args: &T,
    ) -> Result<ResponseRecord, ClientError> {
        let args = binder::arguments_from(args)?;
        self.call_named(name, &args).await
    }

    /// Materialise the request a named call would send, without sending it.
    pub fn prepare(&self, name: &str, args: &Arguments) -> Result<HttpRequest, ClientError> {
        let op = self.operation(name)?;
        self.materialise(op, args)
    }

    /// [`OpenApiClient::prepare`] for positional arguments.
    pub fn prepare_positional(
        &self,
        name: &str,
        args: &[Value],
    ) -> Result<HttpRequest, ClientError> {
        let op = self.operation(name)?;
        self.materialise(op, &binder::name_positional(op, args))
    }

    fn operation(&self, name: &str) -> Result<&Operation, ClientError> {
        self.catalog
            .lookup(name)
            .ok_or_else(|| ClientError::UnknownOperation(name.to_string()))
    }

    fn materialise(&self, op: &Operation, args: &Arguments) -> Result<HttpRequest, ClientError> {
        let bound = binder::bind(op, args)?;
        request::materialise(&self.base_url, op, &bound, &self.options.default_headers)
    }

    async fn dispatch(
        &self,
        op: &Operation,
        args: &Arguments,
    ) -> Result<ResponseRecord, ClientError> {
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| ClientError::Invariant("client has been closed".to_string()))?;
        let request = self.materialise(op, args)?;
        engine.execute(&request).await
    }

    /// Release the HTTP engine. Later calls fail; closing twice is a no-op.
    pub fn close(&mut self) {
        if self.engine.take().is_some() {
            log::debug!("closed client for {}", self.spec_url);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.engine.is_none()
    }

    /// Lower-cased operation keys.
    pub fn names(&self) -> Vec<String> {
        self.catalog.names()
    }

    pub fn has(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }

    pub fn info(&self, name: &str) -> Result<OperationInfo, ClientError> {
        self.operation(name).map(Operation::info)
    }

    /// Info for every operation, keyed by lower-cased key.
    pub fn methods(&self) -> IndexMap<String, OperationInfo> {
        self.catalog.infos()
    }

    pub fn spec_url(&self) -> &str {
        &self.spec_url
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn spec(&self) -> &OpenApiSpec {
        &self.spec
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Introspection pseudo-properties `_methods`, `_spec` and `_baseurl`,
    /// matched ignoring case.
    pub fn property(&self, name: &str) -> Option<Value> {
        match name.to_lowercase().as_str() {
            "_methods" => serde_json::to_value(self.methods()).ok(),
            "_spec" => Some(Value::String(self.spec_url.clone())),
            "_baseurl" => Some(Value::String(self.base_url.clone())),
            _ => None,
        }
    }
}

/// Build a client from a loosely-typed options bag. Unknown keys are ignored.
pub async fn create_client(spec_url: &str, options: &Value) -> Result<OpenApiClient, ClientError> {
    let options = ClientOptions::from_value(options, OptionsMode::Lax)?;
    OpenApiClient::connect(spec_url, options).await
}
