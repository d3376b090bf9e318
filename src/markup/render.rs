//! HTML generation for a parsed markup tree

use std::collections::BTreeMap;

use super::attributes::{AttributeDefaults, Resolved};
use super::components::Tag;
use super::css::{escape_attr, horizontal_padding, number, parse_px, px, Style, Width};
use super::parser::Element;
use super::writer::HtmlWriter;
use super::CompileOptions;

const DEFAULT_BODY_WIDTH: f64 = 600.0;

const RESET_CSS: &str = "#outlook a { padding:0; } \
body { margin:0;padding:0;-webkit-text-size-adjust:100%;-ms-text-size-adjust:100%; } \
table, td { border-collapse:collapse;mso-table-lspace:0pt;mso-table-rspace:0pt; } \
img { border:0;height:auto;line-height:100%; outline:none;text-decoration:none;-ms-interpolation-mode:bicubic; } \
p { display:block;margin:13px 0; }";

const MSO_SETTINGS: &str = "<!--[if mso]><noscript><xml><o:OfficeDocumentSettings><o:AllowPNG/><o:PixelsPerInch>96</o:PixelsPerInch></o:OfficeDocumentSettings></xml></noscript><![endif]-->";

const OUTLOOK_GROUP_FIX: &str = "<!--[if lte mso 11]><style type=\"text/css\">.mj-outlook-group-fix { width:100% !important; }</style><![endif]-->";

const PADDING_SIDES: [&str; 4] = ["padding-top", "padding-right", "padding-bottom", "padding-left"];

/// Render a parsed document to HTML
pub fn render(root: &Element, options: &CompileOptions) -> String {
    let defaults = AttributeDefaults::from_head(root.child(Tag::Head));
    let mut renderer = Renderer {
        defaults: &defaults,
        minify: options.minify,
        column_classes: BTreeMap::new(),
    };
    renderer.document(root)
}

/// Content collected from `<mj-head>`
struct HeadData<'a> {
    title: &'a str,
    preview: &'a str,
    breakpoint: &'a str,
    fonts: Vec<(&'a str, &'a str)>,
    styles: Vec<&'a str>,
    raw: Vec<&'a str>,
}

impl<'a> HeadData<'a> {
    fn collect(head: Option<&'a Element>) -> Self {
        let mut data = HeadData {
            title: "",
            preview: "",
            breakpoint: "480px",
            fonts: Vec::new(),
            styles: Vec::new(),
            raw: Vec::new(),
        };

        for child in head.into_iter().flat_map(|head| head.children.iter()) {
            match child.tag {
                Tag::Title => data.title = &child.content,
                Tag::Preview => data.preview = &child.content,
                Tag::Breakpoint => {
                    if let Some(width) = child.attribute("width") {
                        data.breakpoint = width;
                    }
                }
                Tag::Font => {
                    if let (Some(name), Some(href)) = (child.attribute("name"), child.attribute("href")) {
                        data.fonts.push((name, href));
                    }
                }
                Tag::Style => data.styles.push(&child.content),
                Tag::Raw => data.raw.push(&child.content),
                _ => {}
            }
        }

        data
    }
}

struct Renderer<'d> {
    defaults: &'d AttributeDefaults,
    minify: bool,
    /// Responsive column class -> CSS width
    column_classes: BTreeMap<String, String>,
}

fn class_attr(class: Option<&str>) -> String {
    match class {
        Some(class) => format!(" class=\"{}\"", escape_attr(class)),
        None => String::new(),
    }
}

fn with_padding(style: Style, attrs: &Resolved<'_>) -> Style {
    PADDING_SIDES.iter().fold(
        style.opt("padding", attrs.non_empty("padding")),
        |style, side| style.opt(side, attrs.non_empty(side)),
    )
}

fn has_padding(attrs: &Resolved<'_>) -> bool {
    attrs.non_empty("padding").is_some()
        || PADDING_SIDES
            .iter()
            .any(|side| attrs.non_empty(side).is_some())
}

/// `background` shorthand for sections and wrappers
fn background(attrs: &Resolved<'_>) -> Option<String> {
    let color = attrs.non_empty("background-color");
    match attrs.non_empty("background-url") {
        Some(url) => {
            let value = format!(
                "{} url('{}') center top / {} {}",
                color.unwrap_or(""),
                url,
                attrs.get_or("background-size", "auto"),
                attrs.get_or("background-repeat", "repeat"),
            );
            Some(value.trim().to_string())
        }
        None => color.map(str::to_string),
    }
}

impl<'d> Renderer<'d> {
    fn document(&mut self, root: &Element) -> String {
        let head = HeadData::collect(root.child(Tag::Head));
        let root_attrs = self.defaults.resolve(root);
        let lang = root_attrs.get_or("lang", "und");
        let dir = root_attrs.get_or("dir", "auto");

        // Body first: the head needs the column classes it produced
        let body = self.body(root.child(Tag::Body), head.preview, lang, dir);

        let mut w = HtmlWriter::new(self.minify, 0);
        w.line("<!doctype html>");
        w.open(&format!(
            "<html lang=\"{}\" dir=\"{}\" xmlns=\"http://www.w3.org/1999/xhtml\" xmlns:v=\"urn:schemas-microsoft-com:vml\" xmlns:o=\"urn:schemas-microsoft-com:office:office\">",
            escape_attr(lang),
            escape_attr(dir)
        ));
        w.open("<head>");
        w.line(&format!("<title>{}</title>", head.title));
        w.line("<!--[if !mso]><!--><meta http-equiv=\"X-UA-Compatible\" content=\"IE=edge\"><!--<![endif]-->");
        w.line("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\">");
        w.line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">");
        w.line(&format!("<style type=\"text/css\">{}</style>", RESET_CSS));
        w.line(MSO_SETTINGS);
        w.line(OUTLOOK_GROUP_FIX);

        for (_, href) in &head.fonts {
            let href = escape_attr(href);
            w.line("<!--[if !mso]><!-->");
            w.line(&format!(
                "<link href=\"{}\" rel=\"stylesheet\" type=\"text/css\">",
                href
            ));
            w.line(&format!(
                "<style type=\"text/css\">@import url({});</style>",
                href
            ));
            w.line("<!--<![endif]-->");
        }

        if !self.column_classes.is_empty() {
            let rules = self
                .column_classes
                .iter()
                .map(|(class, width)| {
                    format!(
                        ".{} {{ width:{} !important; max-width:{}; }}",
                        class, width, width
                    )
                })
                .collect::<Vec<_>>()
                .join(" ");
            w.line(&format!(
                "<style type=\"text/css\">@media only screen and (min-width:{}) {{ {} }}</style>",
                head.breakpoint, rules
            ));
        }

        for css in &head.styles {
            w.line(&format!("<style type=\"text/css\">{}</style>", css));
        }
        for raw in &head.raw {
            w.content(raw);
        }
        w.close("</head>");
        w.embed(&body);
        w.close("</html>");
        w.finish()
    }

    fn body(&mut self, body: Option<&Element>, preview: &str, lang: &str, dir: &str) -> String {
        let mut w = HtmlWriter::new(self.minify, 1);
        let Some(body) = body else {
            w.line("<body style=\"word-spacing:normal;\"></body>");
            return w.finish();
        };

        let attrs = self.defaults.resolve(body);
        let width = attrs
            .non_empty("width")
            .and_then(parse_px)
            .unwrap_or(DEFAULT_BODY_WIDTH);
        let background_color = attrs.non_empty("background-color");

        w.open(&format!(
            "<body{}>",
            Style::new()
                .add("word-spacing", "normal")
                .opt("background-color", background_color)
                .attr()
        ));
        if !preview.is_empty() {
            w.line(&format!(
                "<div style=\"display:none;font-size:1px;color:#ffffff;line-height:1px;max-height:0px;max-width:0px;opacity:0;overflow:hidden;\">{}</div>",
                preview
            ));
        }
        w.open(&format!(
            "<div{}{} lang=\"{}\" dir=\"{}\">",
            class_attr(attrs.non_empty("css-class")),
            Style::new()
                .opt("background-color", background_color)
                .attr(),
            escape_attr(lang),
            escape_attr(dir)
        ));

        for child in &body.children {
            match child.tag {
                Tag::Section | Tag::Wrapper => self.section(&mut w, child, width),
                Tag::Raw => w.content(&child.content),
                _ => {}
            }
        }

        w.close("</div>");
        w.close("</body>");
        w.finish()
    }

    /// Render an `mj-section` or `mj-wrapper` centred in a box of `container` pixels
    fn section(&mut self, w: &mut HtmlWriter, section: &Element, container: f64) {
        let attrs = self.defaults.resolve(section);
        let full_width = attrs.non_empty("full-width") == Some("full-width");
        let background = background(&attrs);
        let background_url = attrs
            .non_empty("background-url")
            .map(|url| format!(" background=\"{}\"", escape_attr(url)))
            .unwrap_or_default();
        let radius = attrs.non_empty("border-radius");
        let inner_width = container - horizontal_padding(&attrs);

        if full_width {
            w.open(&format!(
                "<table align=\"center\"{} border=\"0\" cellpadding=\"0\" cellspacing=\"0\" role=\"presentation\"{}>",
                background_url,
                Style::new()
                    .opt("background", background.as_deref())
                    .add("width", "100%")
                    .attr()
            ));
            w.open("<tbody>");
            w.open("<tr>");
            w.open("<td>");
        }

        w.line(&format!(
            "<!--[if mso | IE]><table align=\"center\" border=\"0\" cellpadding=\"0\" cellspacing=\"0\" role=\"presentation\" style=\"width:{};\" width=\"{}\"><tr><td style=\"line-height:0px;font-size:0px;mso-line-height-rule:exactly;\"><![endif]-->",
            px(container),
            number(container)
        ));

        let boxed_background = if full_width { None } else { background.as_deref() };
        let div_style = Style::new()
            .opt("background", boxed_background)
            .add("margin", "0px auto")
            .opt("border-radius", radius)
            .add("max-width", px(container));
        w.open(&format!(
            "<div{}{}>",
            class_attr(attrs.non_empty("css-class")),
            div_style.attr()
        ));

        let table_style = Style::new()
            .opt("background", boxed_background)
            .add("width", "100%")
            .opt("border-radius", radius);
        w.open(&format!(
            "<table align=\"center\"{} border=\"0\" cellpadding=\"0\" cellspacing=\"0\" role=\"presentation\"{}>",
            if full_width { "" } else { background_url.as_str() },
            table_style.attr()
        ));
        w.open("<tbody>");
        w.open("<tr>");

        let td_style = with_padding(
            Style::new()
                .opt("border", attrs.non_empty("border"))
                .add("direction", attrs.get_or("direction", "ltr"))
                .add("font-size", "0px"),
            &attrs,
        )
        .add("text-align", attrs.get_or("text-align", "center"));
        w.open(&format!("<td{}>", td_style.attr()));

        if section.tag == Tag::Wrapper {
            for child in &section.children {
                match child.tag {
                    Tag::Section => self.section(w, child, inner_width),
                    Tag::Raw => w.content(&child.content),
                    _ => {}
                }
            }
        } else {
            self.columns(w, section, inner_width);
        }

        w.close("</td>");
        w.close("</tr>");
        w.close("</tbody>");
        w.close("</table>");
        w.close("</div>");
        w.line("<!--[if mso | IE]></td></tr></table><![endif]-->");

        if full_width {
            w.close("</td>");
            w.close("</tr>");
            w.close("</tbody>");
            w.close("</table>");
        }
    }

    fn columns(&mut self, w: &mut HtmlWriter, section: &Element, container: f64) {
        let count = section
            .children
            .iter()
            .filter(|child| child.tag == Tag::Column)
            .count()
            .max(1);

        w.line("<!--[if mso | IE]><table role=\"presentation\" border=\"0\" cellpadding=\"0\" cellspacing=\"0\"><tr><![endif]-->");
        for child in &section.children {
            match child.tag {
                Tag::Column => self.column(w, child, container, count),
                Tag::Raw => w.content(&child.content),
                _ => {}
            }
        }
        w.line("<!--[if mso | IE]></tr></table><![endif]-->");
    }

    fn column(&mut self, w: &mut HtmlWriter, column: &Element, container: f64, siblings: usize) {
        let attrs = self.defaults.resolve(column);
        let width = attrs
            .non_empty("width")
            .and_then(Width::parse)
            .unwrap_or(Width::Percent(100.0 / siblings as f64));

        let (class, css_width) = match width {
            Width::Percent(percent) => (
                format!("mj-column-per-{}", number(percent).replace('.', "-")),
                format!("{}%", number(percent)),
            ),
            Width::Px(pixels) => (
                format!("mj-column-px-{}", number(pixels).replace('.', "-")),
                px(pixels),
            ),
        };
        self.column_classes.insert(class.clone(), css_width);

        let column_width = width.to_px(container);
        let vertical_align = attrs.get_or("vertical-align", "top");

        w.line(&format!(
            "<!--[if mso | IE]><td style=\"vertical-align:{};width:{};\"><![endif]-->",
            escape_attr(vertical_align),
            px(column_width)
        ));

        let classes = match attrs.non_empty("css-class") {
            Some(extra) => format!("{} mj-outlook-group-fix {}", class, extra),
            None => format!("{} mj-outlook-group-fix", class),
        };
        let div_style = Style::new()
            .add("font-size", "0px")
            .add("text-align", "left")
            .add("direction", attrs.get_or("direction", "ltr"))
            .add("display", "inline-block")
            .add("vertical-align", vertical_align)
            .add("width", "100%");
        w.open(&format!(
            "<div class=\"{}\"{}>",
            escape_attr(&classes),
            div_style.attr()
        ));

        let box_style = Style::new()
            .opt("background-color", attrs.non_empty("background-color"))
            .opt("border", attrs.non_empty("border"))
            .opt("border-radius", attrs.non_empty("border-radius"))
            .add("vertical-align", vertical_align);
        let padded = has_padding(&attrs);

        if padded {
            w.open("<table border=\"0\" cellpadding=\"0\" cellspacing=\"0\" role=\"presentation\" width=\"100%\">");
            w.open("<tbody>");
            w.open("<tr>");
            w.open(&format!("<td{}>", with_padding(box_style, &attrs).attr()));
            w.open("<table border=\"0\" cellpadding=\"0\" cellspacing=\"0\" role=\"presentation\" width=\"100%\">");
        } else {
            w.open(&format!(
                "<table border=\"0\" cellpadding=\"0\" cellspacing=\"0\" role=\"presentation\"{} width=\"100%\">",
                box_style.attr()
            ));
        }
        w.open("<tbody>");

        let content_width = column_width - horizontal_padding(&attrs);
        for child in &column.children {
            self.content(w, child, content_width);
        }

        w.close("</tbody>");
        w.close("</table>");
        if padded {
            w.close("</td>");
            w.close("</tr>");
            w.close("</tbody>");
            w.close("</table>");
        }
        w.close("</div>");
        w.line("<!--[if mso | IE]></td><![endif]-->");
    }

    fn content(&mut self, w: &mut HtmlWriter, element: &Element, container: f64) {
        if element.tag == Tag::Raw {
            w.content(&element.content);
            return;
        }

        let attrs = self.defaults.resolve(element);
        let box_width = (container - horizontal_padding(&attrs)).max(0.0);
        let align = match element.tag {
            Tag::Spacer => String::new(),
            _ => format!(" align=\"{}\"", escape_attr(attrs.get_or("align", "left"))),
        };
        let td_style = with_padding(
            Style::new()
                .opt("background", attrs.non_empty("container-background-color"))
                .add("font-size", "0px"),
            &attrs,
        )
        .add("word-break", "break-word");

        w.open("<tr>");
        w.open(&format!(
            "<td{}{}{}>",
            align,
            class_attr(attrs.non_empty("css-class")),
            td_style.attr()
        ));
        match element.tag {
            Tag::Text => text(w, &attrs),
            Tag::Button => button(w, &attrs),
            Tag::Image => image(w, &attrs, box_width),
            Tag::Divider => divider(w, &attrs, box_width),
            Tag::Spacer => spacer(w, &attrs),
            Tag::Table => table(w, &attrs),
            _ => {}
        }
        w.close("</td>");
        w.close("</tr>");
    }
}

fn text(w: &mut HtmlWriter, attrs: &Resolved<'_>) {
    let style = Style::new()
        .add("font-family", attrs.get_or("font-family", ""))
        .add("font-size", attrs.get_or("font-size", ""))
        .opt("font-style", attrs.non_empty("font-style"))
        .opt("font-weight", attrs.non_empty("font-weight"))
        .opt("letter-spacing", attrs.non_empty("letter-spacing"))
        .add("line-height", attrs.get_or("line-height", ""))
        .add("text-align", attrs.get_or("align", "left"))
        .opt("text-decoration", attrs.non_empty("text-decoration"))
        .opt("text-transform", attrs.non_empty("text-transform"))
        .add("color", attrs.get_or("color", ""))
        .opt("height", attrs.non_empty("height"));

    w.open(&format!("<div{}>", style.attr()));
    w.content(&attrs.element().content);
    w.close("</div>");
}

fn button(w: &mut HtmlWriter, attrs: &Resolved<'_>) {
    let background = attrs.get_or("background-color", "#414141");
    let radius = attrs.get_or("border-radius", "");
    let inner_padding = attrs.get_or("inner-padding", "");
    let width = attrs.non_empty("width");

    let table_style = Style::new()
        .add("border-collapse", "separate")
        .opt("width", width)
        .add("line-height", "100%");
    w.open(&format!(
        "<table border=\"0\" cellpadding=\"0\" cellspacing=\"0\" role=\"presentation\"{}>",
        table_style.attr()
    ));
    w.open("<tbody>");
    w.open("<tr>");

    let cell_style = Style::new()
        .add("border", attrs.get_or("border", "none"))
        .add("border-radius", radius)
        .add("cursor", "auto")
        .opt("height", attrs.non_empty("height"))
        .add("mso-padding-alt", inner_padding)
        .add("background", background);
    w.open(&format!(
        "<td align=\"center\" bgcolor=\"{}\" role=\"presentation\"{} valign=\"{}\">",
        escape_attr(background),
        cell_style.attr(),
        escape_attr(attrs.get_or("vertical-align", "middle"))
    ));

    let link_style = Style::new()
        .add("display", "inline-block")
        .opt("width", width)
        .add("background", background)
        .add("color", attrs.get_or("color", ""))
        .add("font-family", attrs.get_or("font-family", ""))
        .add("font-size", attrs.get_or("font-size", ""))
        .opt("font-style", attrs.non_empty("font-style"))
        .add("font-weight", attrs.get_or("font-weight", ""))
        .opt("letter-spacing", attrs.non_empty("letter-spacing"))
        .add("line-height", attrs.get_or("line-height", ""))
        .add("margin", "0")
        .add("text-align", attrs.get_or("text-align", "center"))
        .add("text-decoration", attrs.get_or("text-decoration", ""))
        .add("text-transform", attrs.get_or("text-transform", ""))
        .add("padding", inner_padding)
        .add("mso-padding-alt", "0px")
        .add("border-radius", radius);

    let closing = match attrs.non_empty("href") {
        Some(href) => {
            let rel = attrs
                .non_empty("rel")
                .map(|rel| format!(" rel=\"{}\"", escape_attr(rel)))
                .unwrap_or_default();
            let title = attrs
                .non_empty("title")
                .map(|title| format!(" title=\"{}\"", escape_attr(title)))
                .unwrap_or_default();
            w.open(&format!(
                "<a href=\"{}\"{}{}{} target=\"{}\">",
                escape_attr(href),
                rel,
                title,
                link_style.attr(),
                escape_attr(attrs.get_or("target", "_blank"))
            ));
            "</a>"
        }
        None => {
            w.open(&format!("<p{}>", link_style.attr()));
            "</p>"
        }
    };
    w.content(&attrs.element().content);
    w.close(closing);

    w.close("</td>");
    w.close("</tr>");
    w.close("</tbody>");
    w.close("</table>");
}

fn image(w: &mut HtmlWriter, attrs: &Resolved<'_>, box_width: f64) {
    let width = attrs
        .non_empty("width")
        .and_then(parse_px)
        .map(|width| width.min(box_width))
        .unwrap_or(box_width);
    let height = attrs.get_or("height", "auto");
    let height_attr = if height == "auto" {
        height.to_string()
    } else {
        parse_px(height)
            .map(number)
            .unwrap_or_else(|| height.to_string())
    };

    let img_style = Style::new()
        .add("border", attrs.get_or("border", "0"))
        .opt("border-radius", attrs.non_empty("border-radius"))
        .add("display", "block")
        .add("outline", "none")
        .add("text-decoration", "none")
        .add("height", height)
        .add("width", "100%")
        .add("font-size", "13px");
    let title = attrs
        .non_empty("title")
        .map(|title| format!(" title=\"{}\"", escape_attr(title)))
        .unwrap_or_default();
    let img = format!(
        "<img alt=\"{}\" height=\"{}\" src=\"{}\"{}{} width=\"{}\" />",
        escape_attr(attrs.get_or("alt", "")),
        escape_attr(&height_attr),
        escape_attr(attrs.get_or("src", "")),
        title,
        img_style.attr(),
        number(width)
    );

    w.open("<table border=\"0\" cellpadding=\"0\" cellspacing=\"0\" role=\"presentation\" style=\"border-collapse:collapse;border-spacing:0px;\">");
    w.open("<tbody>");
    w.open("<tr>");
    w.open(&format!("<td style=\"width:{};\">", px(width)));
    match attrs.non_empty("href") {
        Some(href) => {
            let rel = attrs
                .non_empty("rel")
                .map(|rel| format!(" rel=\"{}\"", escape_attr(rel)))
                .unwrap_or_default();
            w.open(&format!(
                "<a href=\"{}\"{} target=\"{}\">",
                escape_attr(href),
                rel,
                escape_attr(attrs.get_or("target", "_blank"))
            ));
            w.line(&img);
            w.close("</a>");
        }
        None => w.line(&img),
    }
    w.close("</td>");
    w.close("</tr>");
    w.close("</tbody>");
    w.close("</table>");
}

fn divider(w: &mut HtmlWriter, attrs: &Resolved<'_>, box_width: f64) {
    let border = format!(
        "{} {} {}",
        attrs.get_or("border-style", "solid"),
        attrs.get_or("border-width", "4px"),
        attrs.get_or("border-color", "#000000")
    );
    let align = attrs.get_or("align", "center");
    let margin = match align {
        "left" => "0px",
        "right" => "0px 0px 0px auto",
        _ => "0px auto",
    };
    let width = attrs.get_or("width", "100%");

    let rule_style = Style::new()
        .add("border-top", &border)
        .add("font-size", "1px")
        .add("margin", margin)
        .add("width", width);
    w.line(&format!("<p{}></p>", rule_style.attr()));

    let outlook_width = Width::parse(width)
        .map(|width| width.to_px(box_width))
        .unwrap_or(box_width);
    let outlook_style = Style::new()
        .add("border-top", &border)
        .add("font-size", "1px")
        .add("margin", margin)
        .add("width", px(outlook_width));
    w.line(&format!(
        "<!--[if mso | IE]><table align=\"{}\" border=\"0\" cellpadding=\"0\" cellspacing=\"0\"{} role=\"presentation\" width=\"{}\"><tr><td style=\"height:0;line-height:0;\">&nbsp;</td></tr></table><![endif]-->",
        escape_attr(align),
        outlook_style.attr(),
        px(outlook_width)
    ));
}

fn spacer(w: &mut HtmlWriter, attrs: &Resolved<'_>) {
    let height = attrs.get_or("height", "20px");
    let style = Style::new().add("height", height).add("line-height", height);
    w.line(&format!("<div{}>&#8202;</div>", style.attr()));
}

fn table(w: &mut HtmlWriter, attrs: &Resolved<'_>) {
    let width = attrs.get_or("width", "100%");
    let width_attr = parse_px(width)
        .map(number)
        .unwrap_or_else(|| width.to_string());
    let role = attrs
        .non_empty("role")
        .map(|role| format!(" role=\"{}\"", escape_attr(role)))
        .unwrap_or_default();
    let style = Style::new()
        .add("color", attrs.get_or("color", ""))
        .add("font-family", attrs.get_or("font-family", ""))
        .add("font-size", attrs.get_or("font-size", ""))
        .add("line-height", attrs.get_or("line-height", ""))
        .add("table-layout", attrs.get_or("table-layout", "auto"))
        .add("width", width)
        .add("border", attrs.get_or("border", "none"));

    w.open(&format!(
        "<table cellpadding=\"{}\" cellspacing=\"{}\"{} width=\"{}\" border=\"0\"{}>",
        escape_attr(attrs.get_or("cellpadding", "0")),
        escape_attr(attrs.get_or("cellspacing", "0")),
        role,
        escape_attr(&width_attr),
        style.attr()
    ));
    w.content(&attrs.element().content);
    w.close("</table>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parser::parse;

    fn compile(source: &str, minify: bool) -> String {
        render(&parse(source).unwrap(), &CompileOptions { minify })
    }

    const TWO_COLUMNS: &str = r#"<mjml>
  <mj-body>
    <mj-section>
      <mj-column><mj-text>Left</mj-text></mj-column>
      <mj-column><mj-text>Right</mj-text></mj-column>
    </mj-section>
  </mj-body>
</mjml>"#;

    #[test]
    fn test_document_shell() {
        let html = compile(TWO_COLUMNS, true);
        assert!(html.starts_with("<!doctype html><html lang=\"und\" dir=\"auto\""));
        assert!(html.ends_with("</body></html>"));
        assert!(html.contains("<meta name=\"viewport\""));
    }

    #[test]
    fn test_columns_share_width() {
        let html = compile(TWO_COLUMNS, true);
        assert!(html.contains("class=\"mj-column-per-50 mj-outlook-group-fix\""));
        assert!(html.contains(".mj-column-per-50 { width:50% !important; max-width:50%; }"));
        assert!(html.contains("@media only screen and (min-width:480px)"));
        // 600px body minus the section's 0px horizontal padding, split in two
        assert!(html.contains("<!--[if mso | IE]><td style=\"vertical-align:top;width:300px;\"><![endif]-->"));
    }

    #[test]
    fn test_text_defaults() {
        let html = compile(TWO_COLUMNS, true);
        assert!(html.contains(
            "<div style=\"font-family:Ubuntu, Helvetica, Arial, sans-serif;font-size:13px;line-height:1;text-align:left;color:#000000;\">Left</div>"
        ));
        assert!(html.contains(
            "<td align=\"left\" style=\"font-size:0px;padding:10px 25px;word-break:break-word;\">"
        ));
    }

    #[test]
    fn test_minify_is_never_larger() {
        let pretty = compile(TWO_COLUMNS, false);
        let minified = compile(TWO_COLUMNS, true);
        assert!(minified.len() <= pretty.len());
        assert!(pretty.contains('\n'));
        assert!(!minified.contains('\n'));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(compile(TWO_COLUMNS, true), compile(TWO_COLUMNS, true));
        assert_eq!(compile(TWO_COLUMNS, false), compile(TWO_COLUMNS, false));
    }

    #[test]
    fn test_image_fills_content_box() {
        let source = r#"<mjml><mj-body><mj-section><mj-column>
            <mj-image src="https://example.com/logo.png" alt="Logo" href="https://example.com" />
        </mj-column></mj-section></mj-body></mjml>"#;
        let html = compile(source, true);
        // 600px column minus 25px padding on each side
        assert!(html.contains("<td style=\"width:550px;\">"));
        assert!(html.contains("width=\"550\" />"));
        assert!(html.contains("<a href=\"https://example.com\" target=\"_blank\">"));
    }

    #[test]
    fn test_button_without_href_uses_paragraph() {
        let source = r##"<mjml><mj-body><mj-section><mj-column>
            <mj-button background-color="#ff0000">Click</mj-button>
        </mj-column></mj-section></mj-body></mjml>"##;
        let html = compile(source, true);
        assert!(html.contains("bgcolor=\"#ff0000\""));
        assert!(html.contains("<p style=\"display:inline-block;background:#ff0000;"));
        assert!(html.contains(">Click</p>"));
    }

    #[test]
    fn test_attribute_expressions_survive_escaping() {
        let source = r#"<mjml><mj-body><mj-section><mj-column>
            <mj-button href='{{#if (eq tone "formal")}}https://a{{else}}https://b{{/if}}' title='a "b"'>Go</mj-button>
        </mj-column></mj-section></mj-body></mjml>"#;
        let html = compile(source, true);
        assert!(html.contains(
            r#"href="{{#if (eq tone "formal")}}https://a{{else}}https://b{{/if}}""#
        ));
        assert!(html.contains(r#"title="a &quot;b&quot;""#));
    }

    #[test]
    fn test_head_content() {
        let source = r#"<mjml>
  <mj-head>
    <mj-title>Weekly {{edition}}</mj-title>
    <mj-preview>Fresh news</mj-preview>
    <mj-font name="Lato" href="https://fonts.example.com/lato.css" />
    <mj-style>.custom { color: red; }</mj-style>
    <mj-breakpoint width="320px" />
  </mj-head>
  <mj-body><mj-section><mj-column><mj-spacer /></mj-column></mj-section></mj-body>
</mjml>"#;
        let html = compile(source, true);
        assert!(html.contains("<title>Weekly {{edition}}</title>"));
        assert!(html.contains(">Fresh news</div>"));
        assert!(html.contains("@import url(https://fonts.example.com/lato.css);"));
        assert!(html.contains("<style type=\"text/css\">.custom { color: red; }</style>"));
        assert!(html.contains("(min-width:320px)"));
        assert!(html.contains("<div style=\"height:20px;line-height:20px;\">&#8202;</div>"));
    }

    #[test]
    fn test_column_padding_shrinks_content() {
        let source = r#"<mjml><mj-body><mj-section padding="0 50px"><mj-column padding="0 10px" width="100%">
            <mj-image src="a.png" />
        </mj-column></mj-section></mj-body></mjml>"#;
        let html = compile(source, true);
        // 600 - 100 (section) - 20 (column) - 50 (image)
        assert!(html.contains("width=\"430\" />"));
        assert!(html.contains("class=\"mj-column-per-100 mj-outlook-group-fix\""));
    }

    #[test]
    fn test_no_double_braces_from_generator() {
        let html = compile(TWO_COLUMNS, true);
        assert!(!html.contains("{{"));
        assert!(!html.contains("}}"));
    }
}
