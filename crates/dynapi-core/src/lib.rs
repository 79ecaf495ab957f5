pub mod base_url;
pub mod binder;
pub mod catalog;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod parse;
pub mod request;
pub mod response;

pub use binder::Arguments;
pub use catalog::{Catalog, HttpMethod, Operation, OperationInfo, ParameterInfo};
pub use client::{OpenApiClient, create_client};
pub use config::{ClientOptions, OptionsMode};
pub use error::{ClientError, ErrorKind, SpecError};
pub use request::HttpRequest;
pub use response::ResponseRecord;
