//! The query execution core: takes a parsed query document, resolves it
//! against the active generated schema, batches relation lookups through a
//! per-request loader, and serializes the result tree. Also owns the
//! schema generation lifecycle.
#![deny(rust_2018_idioms, unsafe_code)]

mod arguments;
mod error;
mod executor;
mod lifecycle;
mod loader;
mod query_document;
mod response_ir;
mod settings;

pub use error::*;
pub use executor::execute;
pub use lifecycle::*;
pub use loader::LoaderContext;
pub use query_document::*;
pub use response_ir::*;
pub use settings::EngineSettings;

pub type CoreResult<T> = std::result::Result<T, CoreError>;
