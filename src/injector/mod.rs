//! Placeholder substitution for compiled HTML.
//!
//! HTML produced by the markup compiler still carries `{{...}}` expressions.
//! The injector compiles that HTML once into a [`CompiledTemplate`] and renders
//! it against a JSON data context using the Handlebars dialect in non-strict
//! mode, so a missing key renders as an empty string.

use std::sync::Arc;

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;

const TEMPLATE_NAME: &str = "document";

/// Errors raised while compiling or rendering placeholders, or while
/// checking injection values against a template definition
#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("Template syntax error: {0}")]
    Syntax(String),

    #[error("Template render error: {0}")]
    Render(String),

    #[error("Missing value for injection `{0}`")]
    MissingValue(String),

    #[error("Injection `{0}` is not declared by the template")]
    UndeclaredInjection(String),

    #[error("Injection `{0}` was supplied more than once")]
    DuplicateValue(String),

    #[error("Injection `{name}` is declared as {expected}, got {found}")]
    KindMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("Value `{value}` is not an option of injection `{name}` (allowed: {})", options.join(", "))]
    OptionNotAllowed {
        name: String,
        value: String,
        options: Vec<String>,
    },
}

/// An HTML document with its placeholders parsed, ready to render
#[derive(Clone)]
pub struct CompiledTemplate {
    registry: Arc<Handlebars<'static>>,
}

impl CompiledTemplate {
    /// Render against a data context
    pub fn render<T: Serialize>(&self, data: &T) -> Result<String, InjectionError> {
        self.registry
            .render(TEMPLATE_NAME, data)
            .map_err(|e| InjectionError::Render(e.to_string()))
    }
}

impl std::fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledTemplate").finish_non_exhaustive()
    }
}

/// Compiles HTML strings into renderable templates
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableInjector;

impl VariableInjector {
    pub fn new() -> Self {
        Self
    }

    pub fn compile_template(&self, html: &str) -> Result<CompiledTemplate, InjectionError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);

        // Register helpers
        handlebars.register_helper("uppercase", Box::new(uppercase_helper));
        handlebars.register_helper("lowercase", Box::new(lowercase_helper));

        handlebars
            .register_template_string(TEMPLATE_NAME, html)
            .map_err(|e| InjectionError::Syntax(e.to_string()))?;

        Ok(CompiledTemplate {
            registry: Arc::new(handlebars),
        })
    }

    /// Compile and render in one step
    pub fn inject<T: Serialize>(&self, html: &str, data: &T) -> Result<String, InjectionError> {
        self.compile_template(html)?.render(data)
    }
}

// Handlebars helpers

fn uppercase_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&handlebars::html_escape(&param.to_uppercase()))?;
    Ok(())
}

fn lowercase_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&handlebars::html_escape(&param.to_lowercase()))?;
    Ok(())
}
