//! Injection value checks against a template definition

use std::collections::HashSet;

use crate::injector::InjectionError;
use crate::template::{InjectionKind, InjectionValue, Template};

/// Check submitted injection values against the template's declarations.
///
/// Every declared injection needs exactly one value of the declared kind;
/// radio values must be one of the declared options. Values are matched by
/// name, so their order does not matter.
pub fn validate_injections(
    template: &Template,
    values: &[InjectionValue],
) -> Result<(), InjectionError> {
    let mut seen = HashSet::new();

    for value in values {
        let spec = template
            .injection(&value.name)
            .ok_or_else(|| InjectionError::UndeclaredInjection(value.name.clone()))?;

        if !seen.insert(value.name.as_str()) {
            return Err(InjectionError::DuplicateValue(value.name.clone()));
        }

        if spec.kind != value.kind {
            return Err(InjectionError::KindMismatch {
                name: value.name.clone(),
                expected: spec.kind.to_string(),
                found: value.kind.to_string(),
            });
        }

        if spec.kind == InjectionKind::Radio && !spec.options.contains(&value.data) {
            return Err(InjectionError::OptionNotAllowed {
                name: value.name.clone(),
                value: value.data.clone(),
                options: spec.options.clone(),
            });
        }
    }

    if let Some(missing) = template
        .injections
        .iter()
        .find(|spec| !seen.contains(spec.name.as_str()))
    {
        return Err(InjectionError::MissingValue(missing.name.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::InjectionSpec;

    fn template() -> Template {
        Template {
            id: "welcome".to_string(),
            name: "Welcome".to_string(),
            source: "welcome.mjml".to_string(),
            description: None,
            injections: vec![
                InjectionSpec {
                    name: "team".to_string(),
                    display_name: "Team".to_string(),
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
    fn test_all_values_in_any_order() {
        let values = vec![
            InjectionValue::radio("tone", "casual"),
            InjectionValue::text("team", "Ops"),
        ];
        assert!(validate_injections(&template(), &values).is_ok());
    }

    #[test]
    fn test_missing_value() {
        let values = vec![InjectionValue::text("team", "Ops")];
        let err = validate_injections(&template(), &values).unwrap_err();
        assert!(matches!(err, InjectionError::MissingValue(name) if name == "tone"));
    }

    #[test]
    fn test_option_not_allowed() {
        let values = vec![
            InjectionValue::text("team", "Ops"),
            InjectionValue::radio("tone", "sarcastic"),
        ];
        let err = validate_injections(&template(), &values).unwrap_err();
        assert!(matches!(err, InjectionError::OptionNotAllowed { ref value, .. } if value == "sarcastic"));
    }

    #[test]
    fn test_undeclared_value() {
        let values = vec![InjectionValue::text("mood", "happy")];
        let err = validate_injections(&template(), &values).unwrap_err();
        assert!(matches!(err, InjectionError::UndeclaredInjection(name) if name == "mood"));
    }

    #[test]
    fn test_duplicate_value() {
        let values = vec![
            InjectionValue::text("team", "Ops"),
            InjectionValue::text("team", "Dev"),
        ];
        let err = validate_injections(&template(), &values).unwrap_err();
        assert!(matches!(err, InjectionError::DuplicateValue(name) if name == "team"));
    }

    #[test]
    fn test_kind_mismatch() {
        let values = vec![InjectionValue::radio("team", "Ops")];
        let err = validate_injections(&template(), &values).unwrap_err();
        assert!(matches!(err, InjectionError::KindMismatch { ref expected, .. } if expected == "text"));
    }

    #[test]
    fn test_template_without_injections() {
        let mut template = template();
        template.injections.clear();
        assert!(validate_injections(&template, &[]).is_ok());
    }
}
