//! Attribute resolution across defaults, `mj-attributes` and `mj-class`

use std::collections::HashMap;

use super::components::Tag;
use super::parser::Element;

type Pairs = Vec<(String, String)>;

/// Attribute defaults declared in `<mj-attributes>`
#[derive(Debug, Default)]
pub struct AttributeDefaults {
    all: Pairs,
    by_tag: HashMap<Tag, Pairs>,
    classes: HashMap<String, Pairs>,
}

impl AttributeDefaults {
    /// Collect defaults from every `<mj-attributes>` block of the head
    pub fn from_head(head: Option<&Element>) -> Self {
        let mut defaults = Self::default();

        let blocks = head
            .into_iter()
            .flat_map(|head| head.children.iter())
            .filter(|child| child.tag == Tag::Attributes);

        for block in blocks {
            for entry in &block.children {
                match entry.tag {
                    Tag::All => defaults.all.extend(entry.attributes.iter().cloned()),
                    Tag::Class => {
                        let Some(name) = entry.attribute("name") else {
                            continue;
                        };
                        defaults.classes.entry(name.to_string()).or_default().extend(
                            entry
                                .attributes
                                .iter()
                                .filter(|(key, _)| key != "name")
                                .cloned(),
                        );
                    }
                    tag => defaults
                        .by_tag
                        .entry(tag)
                        .or_default()
                        .extend(entry.attributes.iter().cloned()),
                }
            }
        }

        defaults
    }

    /// Resolve attributes of one element
    pub fn resolve<'a>(&'a self, element: &'a Element) -> Resolved<'a> {
        Resolved {
            element,
            defaults: self,
        }
    }
}

fn last<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Attribute view of an element with every default layer applied
#[derive(Clone, Copy)]
pub struct Resolved<'a> {
    element: &'a Element,
    defaults: &'a AttributeDefaults,
}

impl<'a> Resolved<'a> {
    /// Inline > mj-class > per-tag default > mj-all > built-in default
    pub fn get(&self, name: &str) -> Option<&'a str> {
        let tag = self.element.tag;

        if let Some(value) = self.element.attribute(name) {
            return Some(value);
        }

        if let Some(classes) = self.element.attribute("mj-class") {
            let from_class = classes
                .split_whitespace()
                .rev()
                .filter_map(|class| self.defaults.classes.get(class))
                .find_map(|pairs| last(pairs, name));
            if from_class.is_some() {
                return from_class;
            }
        }

        if let Some(value) = self
            .defaults
            .by_tag
            .get(&tag)
            .and_then(|pairs| last(pairs, name))
        {
            return Some(value);
        }

        if tag.accepts(name) {
            if let Some(value) = last(&self.defaults.all, name) {
                return Some(value);
            }
        }

        tag.defaults()
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    /// Like [`get`](Self::get), treating empty values as absent
    pub fn non_empty(&self, name: &str) -> Option<&'a str> {
        self.get(name).filter(|value| !value.trim().is_empty())
    }

    pub fn get_or(&self, name: &str, fallback: &'a str) -> &'a str {
        self.non_empty(name).unwrap_or(fallback)
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parser::parse;

    fn text_of(source: &str) -> (Element, Element) {
        let root = parse(source).unwrap();
        let head = root.child(Tag::Head).cloned().unwrap();
        let text = root.child(Tag::Body).unwrap().children[0].children[0].children[0].clone();
        (head, text)
    }

    #[test]
    fn test_precedence() {
        let source = r##"<mjml>
  <mj-head>
    <mj-attributes>
      <mj-all font-family="Arial" color="#111111" />
      <mj-text color="#222222" font-size="15px" />
      <mj-class name="loud" font-size="20px" />
    </mj-attributes>
  </mj-head>
  <mj-body>
    <mj-section><mj-column>
      <mj-text mj-class="loud" align="right">Hi</mj-text>
    </mj-column></mj-section>
  </mj-body>
</mjml>"##;
        let (head, text) = text_of(source);
        let defaults = AttributeDefaults::from_head(Some(&head));
        let attrs = defaults.resolve(&text);

        assert_eq!(attrs.get("align"), Some("right"));
        assert_eq!(attrs.get("font-size"), Some("20px"));
        assert_eq!(attrs.get("color"), Some("#222222"));
        assert_eq!(attrs.get("font-family"), Some("Arial"));
        assert_eq!(attrs.get("line-height"), Some("1"));
        assert_eq!(attrs.get("href"), None);
    }

    #[test]
    fn test_mj_all_only_applies_to_accepted_attributes() {
        let source = r##"<mjml>
  <mj-head><mj-attributes><mj-all font-family="Arial" /></mj-attributes></mj-head>
  <mj-body><mj-section><mj-column><mj-text>x</mj-text></mj-column></mj-section></mj-body>
</mjml>"##;
        let root = parse(source).unwrap();
        let defaults = AttributeDefaults::from_head(root.child(Tag::Head));
        let section = &root.child(Tag::Body).unwrap().children[0];

        assert_eq!(defaults.resolve(section).get("font-family"), None);
    }
}
