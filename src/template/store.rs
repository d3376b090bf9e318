//! Template storage backends

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::config::TemplatesConfig;

use super::types::{validate_id, Template, TemplateCatalog, TemplateError, TemplateResult};

/// File name of the catalog inside a file-backed template root
pub const CATALOG_FILE: &str = "catalog.json";

/// Read-only access to template definitions and their markup source.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Get a template definition by ID
    async fn definition(&self, id: &str) -> TemplateResult<Template>;

    /// Load the raw markup source of a template
    async fn load(&self, id: &str) -> TemplateResult<String>;

    /// List all templates, sorted by ID
    async fn list(&self) -> TemplateResult<Vec<Template>>;

    /// Backend name for diagnostics
    fn backend_name(&self) -> &'static str;
}

/// In-memory template storage
pub struct MemoryTemplateStore {
    templates: DashMap<String, (Template, String)>,
}

impl Default for MemoryTemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTemplateStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
        }
    }

    /// Add a template with its markup source
    pub fn insert(&self, template: Template, markup: impl Into<String>) -> TemplateResult<()> {
        template.validate()?;

        match self.templates.entry(template.id.clone()) {
            Entry::Occupied(_) => Err(TemplateError::InvalidTemplate(format!(
                "{}: template already exists",
                template.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert((template, markup.into()));
                Ok(())
            }
        }
    }

    /// Get the number of templates
    pub fn count(&self) -> usize {
        self.templates.len()
    }
}

#[async_trait]
impl TemplateSource for MemoryTemplateStore {
    async fn definition(&self, id: &str) -> TemplateResult<Template> {
        self.templates
            .get(id)
            .map(|entry| entry.value().0.clone())
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    async fn load(&self, id: &str) -> TemplateResult<String> {
        self.templates
            .get(id)
            .map(|entry| entry.value().1.clone())
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    async fn list(&self) -> TemplateResult<Vec<Template>> {
        let mut templates: Vec<Template> = self
            .templates
            .iter()
            .map(|entry| entry.value().0.clone())
            .collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(templates)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Directory-backed template storage.
///
/// The root directory holds a `catalog.json` describing every template; the
/// catalog is read and validated once when the store is opened, markup files
/// are read on every `load`.
pub struct FileTemplateStore {
    root: PathBuf,
    templates: Vec<Template>,
}

impl FileTemplateStore {
    /// Open a template root and validate its catalog
    pub async fn open(root: impl AsRef<Path>) -> TemplateResult<Self> {
        let root = root.as_ref().to_path_buf();
        let catalog_path = root.join(CATALOG_FILE);

        let raw = tokio::fs::read_to_string(&catalog_path)
            .await
            .map_err(|source| TemplateError::Io {
                id: CATALOG_FILE.to_string(),
                source,
            })?;

        let catalog: TemplateCatalog = serde_json::from_str(&raw)
            .map_err(|e| TemplateError::Catalog(format!("{}: {}", catalog_path.display(), e)))?;

        let mut templates = catalog.templates;
        for (index, template) in templates.iter().enumerate() {
            template.validate()?;
            if templates[..index].iter().any(|other| other.id == template.id) {
                return Err(TemplateError::Catalog(format!(
                    "duplicate template id `{}`",
                    template.id
                )));
            }
        }
        templates.sort_by(|a, b| a.id.cmp(&b.id));

        tracing::info!(
            root = %root.display(),
            templates = templates.len(),
            "Template catalog loaded"
        );

        Ok(Self { root, templates })
    }

    fn find(&self, id: &str) -> TemplateResult<&Template> {
        // Invalid IDs can never name a template
        validate_id(id).map_err(|_| TemplateError::NotFound(id.to_string()))?;

        self.templates
            .iter()
            .find(|template| template.id == id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    /// Root directory of this store
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl TemplateSource for FileTemplateStore {
    async fn definition(&self, id: &str) -> TemplateResult<Template> {
        self.find(id).cloned()
    }

    async fn load(&self, id: &str) -> TemplateResult<String> {
        let template = self.find(id)?;
        let path = self.root.join(&template.source);

        match tokio::fs::read_to_string(&path).await {
            Ok(markup) => Ok(markup),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    template_id = %id,
                    path = %path.display(),
                    "Template source missing"
                );
                Err(TemplateError::NotFound(id.to_string()))
            }
            Err(source) => Err(TemplateError::Io {
                id: id.to_string(),
                source,
            }),
        }
    }

    async fn list(&self) -> TemplateResult<Vec<Template>> {
        Ok(self.templates.clone())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

/// Create a template store based on configuration.
///
/// - `"file"` (default): opens `root` as a [`FileTemplateStore`]
/// - `"memory"`: an empty [`MemoryTemplateStore`]
pub async fn create_template_store(
    settings: &TemplatesConfig,
) -> TemplateResult<Arc<dyn TemplateSource>> {
    match settings.backend.as_str() {
        "memory" => {
            tracing::info!(backend = "memory", "Creating in-memory template store");
            Ok(Arc::new(MemoryTemplateStore::new()))
        }
        "file" => {
            tracing::info!(backend = "file", root = %settings.root, "Creating file template store");
            Ok(Arc::new(FileTemplateStore::open(&settings.root).await?))
        }
        other => {
            tracing::warn!(
                backend = %other,
                "Unknown template backend, falling back to file store"
            );
            Ok(Arc::new(FileTemplateStore::open(&settings.root).await?))
        }
    }
}
