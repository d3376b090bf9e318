//! Template catalog types and error definitions

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid template ID: {0}")]
    InvalidId(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Failed to read template {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid template catalog: {0}")]
    Catalog(String),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Kind of a dynamic field a template accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum InjectionKind {
    /// Free-form text
    Text,
    /// One choice out of the declared options
    Radio,
}

impl InjectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InjectionKind::Text => "text",
            InjectionKind::Radio => "radio",
        }
    }
}

impl std::fmt::Display for InjectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamic field declared by a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionSpec {
    /// Key under which the value is exposed to placeholders
    pub name: String,

    /// Label shown next to the input
    pub display_name: String,

    #[serde(rename = "type")]
    pub kind: InjectionKind,

    /// Selectable options (radio only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// A submitted value for one injection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionValue {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(rename = "type")]
    pub kind: InjectionKind,

    #[serde(default)]
    pub options: Vec<String>,

    #[serde(default)]
    pub data: String,
}

impl InjectionValue {
    pub fn text(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            kind: InjectionKind::Text,
            options: Vec::new(),
            data: data.into(),
        }
    }

    pub fn radio(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            kind: InjectionKind::Radio,
            options: Vec::new(),
            data: data.into(),
        }
    }
}

/// An email template definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Unique template identifier (alphanumeric, dash, underscore)
    pub id: String,

    /// Human-readable template name
    pub name: String,

    /// Markup source location, relative to the store root
    pub source: String,

    /// Template description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Dynamic fields, in display order
    #[serde(default)]
    pub injections: Vec<InjectionSpec>,
}

/// Check that a template ID is 1-64 characters of alphanumeric, dash or underscore
pub fn validate_id(id: &str) -> TemplateResult<()> {
    if id.is_empty() || id.len() > 64 {
        return Err(TemplateError::InvalidId(
            "ID must be 1-64 characters".to_string(),
        ));
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(TemplateError::InvalidId(
            "ID must contain only alphanumeric, dash, or underscore".to_string(),
        ));
    }

    Ok(())
}

impl Template {
    /// Validate the template
    pub fn validate(&self) -> TemplateResult<()> {
        validate_id(&self.id)?;

        // Validate name
        if self.name.is_empty() || self.name.len() > 256 {
            return Err(TemplateError::InvalidTemplate(format!(
                "{}: name must be 1-256 characters",
                self.id
            )));
        }

        // Validate source location
        let source = Path::new(&self.source);
        if self.source.is_empty()
            || !source
                .components()
                .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(TemplateError::InvalidTemplate(format!(
                "{}: source must be a relative path inside the template root",
                self.id
            )));
        }

        // Validate injections
        for (index, injection) in self.injections.iter().enumerate() {
            if injection.name.is_empty() {
                return Err(TemplateError::InvalidTemplate(format!(
                    "{}: injection #{} has an empty name",
                    self.id, index
                )));
            }

            if self.injections[..index]
                .iter()
                .any(|other| other.name == injection.name)
            {
                return Err(TemplateError::InvalidTemplate(format!(
                    "{}: duplicate injection name `{}`",
                    self.id, injection.name
                )));
            }

            match injection.kind {
                InjectionKind::Radio if injection.options.is_empty() => {
                    return Err(TemplateError::InvalidTemplate(format!(
                        "{}: radio injection `{}` declares no options",
                        self.id, injection.name
                    )));
                }
                InjectionKind::Text if !injection.options.is_empty() => {
                    return Err(TemplateError::InvalidTemplate(format!(
                        "{}: text injection `{}` cannot declare options",
                        self.id, injection.name
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Look up an injection declaration by name
    pub fn injection(&self, name: &str) -> Option<&InjectionSpec> {
        self.injections.iter().find(|spec| spec.name == name)
    }
}

/// On-disk catalog listing every template of a file-backed store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateCatalog {
    #[serde(default)]
    pub templates: Vec<Template>,
}

/// Response for listing templates
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    /// List of templates
    pub templates: Vec<Template>,

    /// Total count
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Template {
        Template {
            id: "welcome".to_string(),
            name: "Welcome".to_string(),
            source: "welcome.mjml".to_string(),
            description: None,
            injections: vec![
                InjectionSpec {
                    name: "intro".to_string(),
                    display_name: "Intro".to_string(),
                    kind: InjectionKind::Text,
                    options: vec![],
                },
                InjectionSpec {
                    name: "tone".to_string(),
                    display_name: "Tone".to_string(),
                    kind: InjectionKind::Radio,
                    options: vec!["formal".to_string(), "casual".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_valid_template() {
        assert!(template().validate().is_ok());
    }

    #[test]
    fn test_invalid_id() {
        let mut t = template();
        t.id = "../etc".to_string();
        assert!(matches!(t.validate(), Err(TemplateError::InvalidId(_))));

        t.id = String::new();
        assert!(matches!(t.validate(), Err(TemplateError::InvalidId(_))));
    }

    #[test]
    fn test_source_must_stay_inside_root() {
        let mut t = template();
        t.source = "../secret.mjml".to_string();
        assert!(matches!(t.validate(), Err(TemplateError::InvalidTemplate(_))));

        t.source = "/etc/passwd".to_string();
        assert!(matches!(t.validate(), Err(TemplateError::InvalidTemplate(_))));

        t.source = "nested/welcome.mjml".to_string();
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_duplicate_injection_names() {
        let mut t = template();
        t.injections[1].name = "intro".to_string();
        assert!(matches!(t.validate(), Err(TemplateError::InvalidTemplate(_))));
    }

    #[test]
    fn test_radio_requires_options() {
        let mut t = template();
        t.injections[1].options.clear();
        assert!(matches!(t.validate(), Err(TemplateError::InvalidTemplate(_))));
    }

    #[test]
    fn test_injection_wire_format() {
        let value: InjectionValue = serde_json::from_value(serde_json::json!({
            "name": "tone",
            "displayName": "Tone",
            "type": "radio",
            "options": ["formal", "casual"],
            "data": "casual"
        }))
        .unwrap();

        assert_eq!(value.kind, InjectionKind::Radio);
        assert_eq!(value.display_name.as_deref(), Some("Tone"));
        assert_eq!(value.data, "casual");
    }
}
