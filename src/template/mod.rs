//! Email template catalog.
//!
//! This module provides:
//! - Template definitions with their declared injections (`text`, `radio`)
//! - A [`TemplateSource`] abstraction resolving a template id to its markup
//! - File-backed and in-memory storage backends
//!
//! # Example
//!
//! ```ignore
//! let store = FileTemplateStore::open("templates").await?;
//!
//! let template = store.definition("announcement").await?;
//! let markup = store.load("announcement").await?;
//! ```

mod store;
mod types;

pub use store::{
    create_template_store, FileTemplateStore, MemoryTemplateStore, TemplateSource, CATALOG_FILE,
};
pub use types::{
    validate_id, InjectionKind, InjectionSpec, InjectionValue, Template, TemplateCatalog,
    TemplateError, TemplateListResponse, TemplateResult,
};
