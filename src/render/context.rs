//! Render request inputs and the merged data context

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::template::InjectionValue;

/// Free-form form fields, e.g. `subjectLine`
pub type FieldValues = BTreeMap<String, String>;

/// Context key holding the recipient list
pub const RECIPIENTS_KEY: &str = "recipients";

/// Attributes of the user composing the email
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrentUser(pub Map<String, Value>);

impl CurrentUser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    fn string_attr(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.string_attr("name")
    }

    pub fn email(&self) -> Option<&str> {
        self.string_attr("email")
    }
}

/// An email recipient.
///
/// Accepts either a bare address (`"ada@example.com"`) or an object
/// (`{"email": "...", "name": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecipientRepr")]
pub struct Recipient {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecipientRepr {
    Address(String),
    Mailbox {
        email: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl From<RecipientRepr> for Recipient {
    fn from(repr: RecipientRepr) -> Self {
        match repr {
            RecipientRepr::Address(email) => Recipient { email, name: None },
            RecipientRepr::Mailbox { email, name } => Recipient { email, name },
        }
    }
}

impl Recipient {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn named(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("email".to_string(), Value::String(self.email.clone()));
        if let Some(name) = &self.name {
            map.insert("name".to_string(), Value::String(name.clone()));
        }
        Value::Object(map)
    }
}

/// Everything needed to render one template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub template_id: String,
    #[serde(default)]
    pub injections: Vec<InjectionValue>,
    #[serde(default)]
    pub fields: FieldValues,
    #[serde(default)]
    pub current_user: CurrentUser,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
}

impl RenderRequest {
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            ..Self::default()
        }
    }
}

/// The single namespace placeholders are resolved against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderContext(Map<String, Value>);

impl RenderContext {
    /// Merge all sources into one namespace.
    ///
    /// Later sources win on key collisions:
    /// `recipients` < injection values < current-user attributes < form fields.
    pub fn merge(
        injections: &[InjectionValue],
        current_user: &CurrentUser,
        fields: &FieldValues,
        recipients: &[Recipient],
    ) -> Self {
        let mut context = Self::default();

        context.insert(
            "recipients",
            RECIPIENTS_KEY,
            Value::Array(recipients.iter().map(Recipient::to_value).collect()),
        );
        for injection in injections {
            context.insert(
                "injection",
                &injection.name,
                Value::String(injection.data.clone()),
            );
        }
        for (key, value) in &current_user.0 {
            context.insert("current_user", key, value.clone());
        }
        for (key, value) in fields {
            context.insert("field", key, Value::String(value.clone()));
        }

        context
    }

    fn insert(&mut self, source: &'static str, key: &str, value: Value) {
        if self.0.insert(key.to_string(), value).is_some() {
            tracing::debug!(key = %key, source = source, "Context key overridden");
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recipient_forms() {
        let recipients: Vec<Recipient> = serde_json::from_value(json!([
            "ada@example.com",
            { "email": "grace@example.com", "name": "Grace" }
        ]))
        .unwrap();

        assert_eq!(recipients[0], Recipient::new("ada@example.com"));
        assert_eq!(recipients[1], Recipient::named("grace@example.com", "Grace"));
    }

    #[test]
    fn test_merge_precedence() {
        let injections = vec![
            InjectionValue::text("name", "from injection"),
            InjectionValue::text("team", "Ops"),
        ];
        let user = CurrentUser::new()
            .with("name", "from user")
            .with("email", "me@example.com");
        let mut fields = FieldValues::new();
        fields.insert("name".to_string(), "from field".to_string());

        let context = RenderContext::merge(&injections, &user, &fields, &[]);

        assert_eq!(context.get("name"), Some(&json!("from field")));
        assert_eq!(context.get("team"), Some(&json!("Ops")));
        assert_eq!(context.get("email"), Some(&json!("me@example.com")));
        assert_eq!(context.get("recipients"), Some(&json!([])));
    }

    #[test]
    fn test_user_overrides_injection() {
        let injections = vec![InjectionValue::text("email", "injected")];
        let user = CurrentUser::new().with("email", "me@example.com");

        let context = RenderContext::merge(&injections, &user, &FieldValues::new(), &[]);

        assert_eq!(context.get("email"), Some(&json!("me@example.com")));
    }

    #[test]
    fn test_injection_overrides_recipients_key() {
        let injections = vec![InjectionValue::text("recipients", "everyone")];
        let recipients = vec![Recipient::new("ada@example.com")];

        let context =
            RenderContext::merge(&injections, &CurrentUser::new(), &FieldValues::new(), &recipients);

        assert_eq!(context.get("recipients"), Some(&json!("everyone")));
    }

    #[test]
    fn test_recipients_exposed_to_templates() {
        let recipients = vec![
            Recipient::new("ada@example.com"),
            Recipient::named("grace@example.com", "Grace"),
        ];
        let context =
            RenderContext::merge(&[], &CurrentUser::new(), &FieldValues::new(), &recipients);

        assert_eq!(
            context.get("recipients"),
            Some(&json!([
                { "email": "ada@example.com" },
                { "email": "grace@example.com", "name": "Grace" }
            ]))
        );
    }

    #[test]
    fn test_current_user_helpers() {
        let user = CurrentUser::new().with("name", "  ").with("email", "me@example.com");
        assert_eq!(user.name(), None);
        assert_eq!(user.email(), Some("me@example.com"));
    }
}
