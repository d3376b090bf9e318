//! Rendering of stored templates into final HTML.
//!
//! A [`RenderRequest`] names a template and carries the composer's form state.
//! [`RenderPipeline`] loads the markup, compiles it, checks the injection values
//! against the template definition, merges every input into one
//! [`RenderContext`] and resolves the placeholders. Preview and send use the
//! same pipeline.

mod context;
mod pipeline;
mod validate;

pub use context::{
    CurrentUser, FieldValues, Recipient, RenderContext, RenderRequest, RECIPIENTS_KEY,
};
pub use pipeline::{RenderError, RenderPipeline, RenderResult};
pub use validate::validate_injections;
