//! Template store -> markup compiler -> variable injector

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;

use super::context::{RenderContext, RenderRequest};
use super::validate::validate_injections;
use crate::injector::{CompiledTemplate, InjectionError, VariableInjector};
use crate::markup::{CompileError, CompileOptions, MarkupCompiler};
use crate::metrics::{CacheMetrics, RenderMetrics};
use crate::template::{Template, TemplateError, TemplateSource};

/// Render failure; the first error of a render is returned as-is
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Failed to read template {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Markup error at {0}")]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Injection(#[from] InjectionError),
}

impl RenderError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::NotFound(_) => "not_found",
            RenderError::Io { .. } => "io",
            RenderError::Compile(_) => "compile",
            RenderError::Injection(_) => "injection",
        }
    }

    fn from_store(id: &str, err: TemplateError) -> Self {
        match err {
            TemplateError::NotFound(_) | TemplateError::InvalidId(_) => {
                RenderError::NotFound(id.to_string())
            }
            TemplateError::Io { id, source } => RenderError::Io { id, source },
            other => RenderError::Io {
                id: id.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, other.to_string()),
            },
        }
    }
}

/// Output of a successful render
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    pub template_id: String,
    pub html: String,
    /// The data context placeholders were resolved against
    pub context: RenderContext,
}

/// Definition plus compiled HTML, immutable once built
struct PreparedTemplate {
    definition: Template,
    compiled: CompiledTemplate,
}

/// Renders templates for both preview and send.
///
/// When caching is enabled the compiled form of each template is kept for the
/// lifetime of the pipeline; the first compilation inserted for an id wins.
pub struct RenderPipeline {
    store: Arc<dyn TemplateSource>,
    compiler: MarkupCompiler,
    injector: VariableInjector,
    cache: Option<DashMap<String, Arc<PreparedTemplate>>>,
}

impl RenderPipeline {
    pub fn new(store: Arc<dyn TemplateSource>, cache_compiled: bool) -> Self {
        Self {
            store,
            compiler: MarkupCompiler::new(),
            injector: VariableInjector::new(),
            cache: cache_compiled.then(DashMap::new),
        }
    }

    pub fn store(&self) -> &Arc<dyn TemplateSource> {
        &self.store
    }

    /// Number of compiled templates held in the cache
    pub fn cached_templates(&self) -> usize {
        self.cache.as_ref().map_or(0, DashMap::len)
    }

    /// Render a template against the request's form state
    #[tracing::instrument(
        skip(self, request),
        fields(
            template_id = %request.template_id,
            recipient_count = request.recipients.len()
        )
    )]
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderResult, RenderError> {
        let start = Instant::now();
        let result = self.execute(request).await;

        match &result {
            Ok(rendered) => {
                RenderMetrics::record_success(start.elapsed());
                tracing::debug!(bytes = rendered.html.len(), "Template rendered");
            }
            Err(e) => {
                RenderMetrics::record_failure(e.kind(), start.elapsed());
                tracing::warn!(error = %e, kind = e.kind(), "Render failed");
            }
        }

        result
    }

    async fn execute(&self, request: &RenderRequest) -> Result<RenderResult, RenderError> {
        let prepared = self.prepare(&request.template_id).await?;

        validate_injections(&prepared.definition, &request.injections)?;

        let context = RenderContext::merge(
            &request.injections,
            &request.current_user,
            &request.fields,
            &request.recipients,
        );
        let html = prepared.compiled.render(&context)?;

        Ok(RenderResult {
            template_id: request.template_id.clone(),
            html,
            context,
        })
    }

    async fn prepare(&self, id: &str) -> Result<Arc<PreparedTemplate>, RenderError> {
        if let Some(cache) = &self.cache {
            let cached = cache.get(id).map(|entry| entry.value().clone());
            if let Some(prepared) = cached {
                CacheMetrics::record_hit();
                return Ok(prepared);
            }
            CacheMetrics::record_miss();
        }

        let definition = self
            .store
            .definition(id)
            .await
            .map_err(|e| RenderError::from_store(id, e))?;
        let markup = self
            .store
            .load(id)
            .await
            .map_err(|e| RenderError::from_store(id, e))?;

        let html = self.compiler.compile(&markup, &CompileOptions::minified())?;
        let compiled = self.injector.compile_template(&html)?;
        let prepared = Arc::new(PreparedTemplate {
            definition,
            compiled,
        });

        match &self.cache {
            Some(cache) => Ok(cache
                .entry(id.to_string())
                .or_insert(prepared)
                .value()
                .clone()),
            None => Ok(prepared),
        }
    }
}
