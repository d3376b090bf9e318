//! Component table of the supported mail-markup dialect

/// Default font stack shared by text-bearing components
pub const DEFAULT_FONT_FAMILY: &str = "Ubuntu, Helvetica, Arial, sans-serif";

const PADDING: [&str; 5] = [
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
];

/// A markup element known to the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Mjml,
    Head,
    Title,
    Preview,
    Attributes,
    All,
    Class,
    Style,
    Font,
    Breakpoint,
    Body,
    Wrapper,
    Section,
    Column,
    Text,
    Button,
    Image,
    Divider,
    Spacer,
    Table,
    Raw,
}

impl Tag {
    pub fn from_name(name: &str) -> Option<Self> {
        let tag = match name {
            "mjml" => Tag::Mjml,
            "mj-head" => Tag::Head,
            "mj-title" => Tag::Title,
            "mj-preview" => Tag::Preview,
            "mj-attributes" => Tag::Attributes,
            "mj-all" => Tag::All,
            "mj-class" => Tag::Class,
            "mj-style" => Tag::Style,
            "mj-font" => Tag::Font,
            "mj-breakpoint" => Tag::Breakpoint,
            "mj-body" => Tag::Body,
            "mj-wrapper" => Tag::Wrapper,
            "mj-section" => Tag::Section,
            "mj-column" => Tag::Column,
            "mj-text" => Tag::Text,
            "mj-button" => Tag::Button,
            "mj-image" => Tag::Image,
            "mj-divider" => Tag::Divider,
            "mj-spacer" => Tag::Spacer,
            "mj-table" => Tag::Table,
            "mj-raw" => Tag::Raw,
            _ => return None,
        };
        Some(tag)
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::Mjml => "mjml",
            Tag::Head => "mj-head",
            Tag::Title => "mj-title",
            Tag::Preview => "mj-preview",
            Tag::Attributes => "mj-attributes",
            Tag::All => "mj-all",
            Tag::Class => "mj-class",
            Tag::Style => "mj-style",
            Tag::Font => "mj-font",
            Tag::Breakpoint => "mj-breakpoint",
            Tag::Body => "mj-body",
            Tag::Wrapper => "mj-wrapper",
            Tag::Section => "mj-section",
            Tag::Column => "mj-column",
            Tag::Text => "mj-text",
            Tag::Button => "mj-button",
            Tag::Image => "mj-image",
            Tag::Divider => "mj-divider",
            Tag::Spacer => "mj-spacer",
            Tag::Table => "mj-table",
            Tag::Raw => "mj-raw",
        }
    }

    /// Ending tags keep their inner content verbatim instead of parsing it.
    pub fn is_ending(self) -> bool {
        matches!(
            self,
            Tag::Title | Tag::Preview | Tag::Style | Tag::Text | Tag::Button | Tag::Table | Tag::Raw
        )
    }

    /// Elements allowed as direct children
    pub fn children(self) -> &'static [Tag] {
        match self {
            Tag::Mjml => &[Tag::Head, Tag::Body],
            Tag::Head => &[
                Tag::Title,
                Tag::Preview,
                Tag::Attributes,
                Tag::Style,
                Tag::Font,
                Tag::Breakpoint,
                Tag::Raw,
            ],
            Tag::Attributes => &[
                Tag::All,
                Tag::Class,
                Tag::Body,
                Tag::Wrapper,
                Tag::Section,
                Tag::Column,
                Tag::Text,
                Tag::Button,
                Tag::Image,
                Tag::Divider,
                Tag::Spacer,
                Tag::Table,
            ],
            Tag::Body => &[Tag::Wrapper, Tag::Section, Tag::Raw],
            Tag::Wrapper => &[Tag::Section, Tag::Raw],
            Tag::Section => &[Tag::Column, Tag::Raw],
            Tag::Column => &[
                Tag::Text,
                Tag::Button,
                Tag::Image,
                Tag::Divider,
                Tag::Spacer,
                Tag::Table,
                Tag::Raw,
            ],
            _ => &[],
        }
    }

    /// Whether the element is rendered into the body (and accepts `mj-class`)
    pub fn is_body_component(self) -> bool {
        matches!(
            self,
            Tag::Body
                | Tag::Wrapper
                | Tag::Section
                | Tag::Column
                | Tag::Text
                | Tag::Button
                | Tag::Image
                | Tag::Divider
                | Tag::Spacer
                | Tag::Table
        )
    }

    /// Whether `name` is a valid attribute for this element
    pub fn accepts(self, name: &str) -> bool {
        match self {
            // Attribute groups may carry anything; they are filtered on use
            Tag::All | Tag::Class => true,
            _ if name == "mj-class" => self.is_body_component(),
            _ if name == "css-class" && self.is_body_component() => true,
            _ if PADDING.contains(&name) && self.is_padded() => true,
            _ => self.own_attributes().contains(&name),
        }
    }

    fn is_padded(self) -> bool {
        matches!(
            self,
            Tag::Wrapper
                | Tag::Section
                | Tag::Column
                | Tag::Text
                | Tag::Button
                | Tag::Image
                | Tag::Divider
                | Tag::Spacer
                | Tag::Table
        )
    }

    fn own_attributes(self) -> &'static [&'static str] {
        match self {
            Tag::Mjml => &["lang", "dir", "owa"],
            Tag::Style => &["inline"],
            Tag::Font => &["name", "href"],
            Tag::Breakpoint => &["width"],
            Tag::Body => &["width", "background-color"],
            Tag::Wrapper | Tag::Section => &[
                "background-color",
                "background-url",
                "background-repeat",
                "background-size",
                "border",
                "border-radius",
                "direction",
                "full-width",
                "text-align",
            ],
            Tag::Column => &[
                "background-color",
                "border",
                "border-radius",
                "direction",
                "vertical-align",
                "width",
            ],
            Tag::Text => &[
                "align",
                "color",
                "container-background-color",
                "font-family",
                "font-size",
                "font-style",
                "font-weight",
                "height",
                "letter-spacing",
                "line-height",
                "text-decoration",
                "text-transform",
            ],
            Tag::Button => &[
                "align",
                "background-color",
                "border",
                "border-radius",
                "color",
                "container-background-color",
                "font-family",
                "font-size",
                "font-style",
                "font-weight",
                "height",
                "href",
                "inner-padding",
                "letter-spacing",
                "line-height",
                "rel",
                "target",
                "text-align",
                "text-decoration",
                "text-transform",
                "title",
                "vertical-align",
                "width",
            ],
            Tag::Image => &[
                "align",
                "alt",
                "border",
                "border-radius",
                "container-background-color",
                "height",
                "href",
                "rel",
                "src",
                "target",
                "title",
                "width",
            ],
            Tag::Divider => &[
                "align",
                "border-color",
                "border-style",
                "border-width",
                "container-background-color",
                "width",
            ],
            Tag::Spacer => &["container-background-color", "height"],
            Tag::Table => &[
                "align",
                "border",
                "cellpadding",
                "cellspacing",
                "color",
                "container-background-color",
                "font-family",
                "font-size",
                "line-height",
                "role",
                "table-layout",
                "width",
            ],
            _ => &[],
        }
    }

    /// Attributes that must be present (outside of `mj-attributes`)
    pub fn required(self) -> &'static [&'static str] {
        match self {
            Tag::Image => &["src"],
            Tag::Font => &["name", "href"],
            Tag::Class => &["name"],
            _ => &[],
        }
    }

    /// Built-in attribute defaults
    pub fn defaults(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Tag::Mjml => &[("lang", "und"), ("dir", "auto")],
            Tag::Breakpoint => &[("width", "480px")],
            Tag::Body => &[("width", "600px")],
            Tag::Wrapper | Tag::Section => &[
                ("background-repeat", "repeat"),
                ("background-size", "auto"),
                ("direction", "ltr"),
                ("padding", "20px 0"),
                ("text-align", "center"),
            ],
            Tag::Column => &[("direction", "ltr"), ("vertical-align", "top")],
            Tag::Text => &[
                ("align", "left"),
                ("color", "#000000"),
                ("font-family", DEFAULT_FONT_FAMILY),
                ("font-size", "13px"),
                ("line-height", "1"),
                ("padding", "10px 25px"),
            ],
            Tag::Button => &[
                ("align", "center"),
                ("background-color", "#414141"),
                ("border", "none"),
                ("border-radius", "3px"),
                ("color", "#ffffff"),
                ("font-family", DEFAULT_FONT_FAMILY),
                ("font-size", "13px"),
                ("font-weight", "normal"),
                ("inner-padding", "10px 25px"),
                ("line-height", "120%"),
                ("padding", "10px 25px"),
                ("target", "_blank"),
                ("text-decoration", "none"),
                ("text-transform", "none"),
                ("vertical-align", "middle"),
            ],
            Tag::Image => &[
                ("align", "center"),
                ("border", "0"),
                ("height", "auto"),
                ("padding", "10px 25px"),
                ("target", "_blank"),
            ],
            Tag::Divider => &[
                ("align", "center"),
                ("border-color", "#000000"),
                ("border-style", "solid"),
                ("border-width", "4px"),
                ("padding", "10px 25px"),
                ("width", "100%"),
            ],
            Tag::Spacer => &[("height", "20px")],
            Tag::Table => &[
                ("align", "left"),
                ("border", "none"),
                ("cellpadding", "0"),
                ("cellspacing", "0"),
                ("color", "#000000"),
                ("font-family", DEFAULT_FONT_FAMILY),
                ("font-size", "13px"),
                ("line-height", "22px"),
                ("padding", "10px 25px"),
                ("table-layout", "auto"),
                ("width", "100%"),
            ],
            _ => &[],
        }
    }
}
