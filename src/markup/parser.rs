//! Markup parser producing a validated element tree

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::components::Tag;
use super::css::Width;
use super::CompileError;

/// A parsed markup element
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    /// Attributes in source order, values kept as written
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Verbatim inner content of ending tags
    pub content: String,
    /// Byte offset of the opening `<`
    pub offset: usize,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, tag: Tag) -> Option<&Element> {
        self.children.iter().find(|child| child.tag == tag)
    }
}

/// Parse a markup document into its `mjml` root element.
pub fn parse(source: &str) -> Result<Element, CompileError> {
    let mut reader = Reader::from_str(source);
    {
        let config = reader.config_mut();
        config.trim_text_start = false;
        config.trim_text_end = false;
        // Nesting is checked against the open-element stack below
        config.check_end_names = false;
        config.expand_empty_elements = false;
    }

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let mut offset = reader.buffer_position() as usize;
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(CompileError::at(
                    source,
                    reader.error_position() as usize,
                    format!("malformed markup: {}", e),
                ))
            }
        };

        if matches!(event, Event::Start(_) | Event::Empty(_) | Event::End(_)) {
            offset = tag_start(source, offset);
        }

        match event {
            Event::Start(start) => {
                let mut element = open_element(source, offset, &start, stack.last(), &root)?;
                if element.tag.is_ending() {
                    let end = start.to_end().into_owned();
                    let content = reader.read_text(end.name()).map_err(|e| {
                        CompileError::at(
                            source,
                            offset,
                            format!("unclosed tag <{}>: {}", element.tag.name(), e),
                        )
                    })?;
                    element.content = content.trim().to_string();
                    attach(&mut stack, &mut root, element);
                } else {
                    stack.push(element);
                }
            }
            Event::Empty(start) => {
                let element = open_element(source, offset, &start, stack.last(), &root)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                match stack.pop() {
                    Some(open) if open.tag.name() == name => attach(&mut stack, &mut root, open),
                    Some(open) => {
                        return Err(CompileError::at(
                            source,
                            offset,
                            format!(
                                "unexpected closing tag </{}>, expected </{}>",
                                name,
                                open.tag.name()
                            ),
                        ))
                    }
                    None => {
                        return Err(CompileError::at(
                            source,
                            offset,
                            format!("unexpected closing tag </{}>", name),
                        ))
                    }
                }
            }
            Event::Text(text) => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    let context = match stack.last() {
                        Some(parent) => format!("inside <{}>", parent.tag.name()),
                        None => "outside of <mjml>".to_string(),
                    };
                    let leading = text.iter().take_while(|b| b.is_ascii_whitespace()).count();
                    return Err(CompileError::at(
                        source,
                        offset + leading,
                        format!("unexpected text {}", context),
                    ));
                }
            }
            Event::CData(_) => {
                return Err(CompileError::at(
                    source,
                    offset,
                    "unexpected CDATA section outside of an ending tag",
                ))
            }
            Event::Eof => break,
            // Comments, declarations and processing instructions carry no content
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(CompileError::at(
            source,
            open.offset,
            format!("unclosed tag <{}>", open.tag.name()),
        ));
    }

    root.ok_or_else(|| CompileError::at(source, 0, "document has no <mjml> root element"))
}

fn open_element(
    source: &str,
    offset: usize,
    start: &BytesStart<'_>,
    parent: Option<&Element>,
    root: &Option<Element>,
) -> Result<Element, CompileError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let tag = Tag::from_name(&name)
        .ok_or_else(|| CompileError::at(source, offset, format!("unknown tag <{}>", name)))?;

    match parent {
        Some(parent) if !parent.tag.children().contains(&tag) => {
            return Err(CompileError::at(
                source,
                offset,
                format!("<{}> is not allowed inside <{}>", name, parent.tag.name()),
            ));
        }
        None if root.is_some() => {
            return Err(CompileError::at(
                source,
                offset,
                format!("unexpected <{}> after the <mjml> root element", name),
            ));
        }
        None if tag != Tag::Mjml => {
            return Err(CompileError::at(
                source,
                offset,
                format!("expected <mjml> root element, found <{}>", name),
            ));
        }
        _ => {}
    }

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| {
            CompileError::at(
                source,
                offset,
                format!("malformed attribute on <{}>: {}", name, e),
            )
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if !tag.accepts(&key) {
            return Err(CompileError::at(
                source,
                offset,
                format!("unknown attribute `{}` on <{}>", key, name),
            ));
        }
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        attributes.push((key, value));
    }

    if tag == Tag::Column {
        if let Some((_, width)) = attributes.iter().find(|(key, _)| key == "width") {
            if !width.trim().is_empty() && Width::parse(width).is_none() {
                return Err(CompileError::at(
                    source,
                    offset,
                    format!("malformed attribute `width` on <{}>: {:?}", name, width),
                ));
            }
        }
    }

    let declares_defaults = parent.is_some_and(|p| p.tag == Tag::Attributes);
    if !declares_defaults {
        for required in tag.required() {
            if !attributes.iter().any(|(key, _)| key == required) {
                return Err(CompileError::at(
                    source,
                    offset,
                    format!("<{}> requires a `{}` attribute", name, required),
                ));
            }
        }
    }

    Ok(Element {
        tag,
        attributes,
        children: Vec::new(),
        content: String::new(),
        offset,
    })
}

/// The reader may report a tag position just past its `<`
fn tag_start(source: &str, offset: usize) -> usize {
    let bytes = source.as_bytes();
    match (bytes.get(offset), offset.checked_sub(1).and_then(|i| bytes.get(i))) {
        (Some(b'<'), _) => offset,
        (_, Some(b'<')) => offset - 1,
        _ => offset,
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}
