//! CSS value helpers used by the HTML generator

use super::attributes::Resolved;

/// A length given in pixels or percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Width {
    Px(f64),
    Percent(f64),
}

impl Width {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(percent) = value.strip_suffix('%') {
            return percent
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Width::Percent);
        }
        parse_px(value).map(Width::Px)
    }

    /// Resolve against the width of the containing box
    pub fn to_px(self, container: f64) -> f64 {
        match self {
            Width::Px(px) => px,
            Width::Percent(percent) => container * percent / 100.0,
        }
    }
}

/// Parse `"12px"` or `"12"`; other units yield `None`
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value);
    number.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a pixel count without a trailing `.0`
pub fn px(value: f64) -> String {
    format!("{}px", number(value))
}

pub fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Expand a CSS shorthand into `[top, right, bottom, left]` pixel values
pub fn shorthand(value: &str) -> [f64; 4] {
    let parts: Vec<f64> = value
        .split_whitespace()
        .map(|part| parse_px(part).unwrap_or(0.0))
        .collect();

    match parts.as_slice() {
        [all] => [*all; 4],
        [vertical, horizontal] => [*vertical, *horizontal, *vertical, *horizontal],
        [top, horizontal, bottom] => [*top, *horizontal, *bottom, *horizontal],
        [top, right, bottom, left, ..] => [*top, *right, *bottom, *left],
        [] => [0.0; 4],
    }
}

/// Left plus right padding of an element, honouring `padding-left`/`padding-right`
pub fn horizontal_padding(attrs: &Resolved<'_>) -> f64 {
    let [_, right, _, left] = attrs.get("padding").map(shorthand).unwrap_or([0.0; 4]);
    let left = attrs
        .non_empty("padding-left")
        .and_then(parse_px)
        .unwrap_or(left);
    let right = attrs
        .non_empty("padding-right")
        .and_then(parse_px)
        .unwrap_or(right);
    left + right
}

/// Escape a value for use inside a double-quoted HTML attribute.
///
/// Values come from markup attributes and are already entity-encoded, so
/// only the delimiter needs escaping. `{{...}}` expressions are left for the
/// injector and copied as is.
pub fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open..].find("}}").map(|i| open + i + 2) else {
            break;
        };
        escaped.push_str(&rest[..open].replace('"', "&quot;"));
        escaped.push_str(&rest[open..close]);
        rest = &rest[close..];
    }

    escaped.push_str(&rest.replace('"', "&quot;"));
    escaped
}

/// Inline style declaration builder; empty values are skipped
#[derive(Debug, Default)]
pub struct Style {
    declarations: String,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, property: &str, value: impl AsRef<str>) -> Self {
        let value = value.as_ref().trim();
        if !value.is_empty() {
            self.declarations.push_str(property);
            self.declarations.push(':');
            self.declarations.push_str(value);
            self.declarations.push(';');
        }
        self
    }

    pub fn opt(self, property: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.add(property, value),
            None => self,
        }
    }

    /// The `style="..."` attribute, or an empty string when nothing was added
    pub fn attr(&self) -> String {
        if self.declarations.is_empty() {
            String::new()
        } else {
            format!(" style=\"{}\"", escape_attr(&self.declarations))
        }
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&escape_attr(&self.declarations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand() {
        assert_eq!(shorthand("10px"), [10.0; 4]);
        assert_eq!(shorthand("10px 25px"), [10.0, 25.0, 10.0, 25.0]);
        assert_eq!(shorthand("1px 2px 3px"), [1.0, 2.0, 3.0, 2.0]);
        assert_eq!(shorthand("1px 2px 3px 4px"), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(shorthand("20px 0"), [20.0, 0.0, 20.0, 0.0]);
        assert_eq!(shorthand("1em"), [0.0; 4]);
    }

    #[test]
    fn test_width() {
        assert_eq!(Width::parse("50%"), Some(Width::Percent(50.0)));
        assert_eq!(Width::parse("120px"), Some(Width::Px(120.0)));
        assert_eq!(Width::parse("auto"), None);
        assert_eq!(Width::parse("NaN%"), None);
        assert_eq!(Width::parse("inf%"), None);
        assert_eq!(Width::parse("NaNpx"), None);
        assert_eq!(Width::Percent(50.0).to_px(600.0), 300.0);
    }

    #[test]
    fn test_escape_attr_keeps_expressions() {
        assert_eq!(escape_attr(r#"say "hi""#), "say &quot;hi&quot;");
        assert_eq!(
            escape_attr(r#"{{#if (eq tone "formal")}}"a"{{/if}}"#),
            r#"{{#if (eq tone "formal")}}&quot;a&quot;{{/if}}"#
        );
        assert_eq!(escape_attr(r#"{{{raw "x"}}}"#), r#"{{{raw "x"}}}"#);
        assert_eq!(escape_attr(r#"open {{ "x""#), "open {{ &quot;x&quot;");
    }

    #[test]
    fn test_px_formatting() {
        assert_eq!(px(550.0), "550px");
        assert_eq!(px(183.5), "183.5px");
    }

    #[test]
    fn test_style_skips_empty_values() {
        let style = Style::new()
            .add("color", "#000")
            .add("background", "")
            .opt("width", None);
        assert_eq!(style.to_string(), "color:#000;");
        assert_eq!(style.attr(), " style=\"color:#000;\"");
    }
}
