//! Line-oriented HTML output with optional minification

/// Accumulates generated HTML.
///
/// In pretty mode every line is indented by its nesting depth; in minified
/// mode lines are concatenated and whitespace runs inside verbatim content are
/// collapsed to a single space, except inside `<pre>` blocks.
#[derive(Debug)]
pub struct HtmlWriter {
    out: String,
    minify: bool,
    depth: usize,
}

impl HtmlWriter {
    pub fn new(minify: bool, depth: usize) -> Self {
        Self {
            out: String::new(),
            minify,
            depth,
        }
    }

    fn break_line(&mut self) {
        if self.minify {
            return;
        }
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    /// Write one line of markup
    pub fn line(&mut self, html: &str) {
        self.break_line();
        self.out.push_str(html);
    }

    /// Write an opening line and indent what follows
    pub fn open(&mut self, html: &str) {
        self.line(html);
        self.depth += 1;
    }

    /// Dedent and write a closing line
    pub fn close(&mut self, html: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(html);
    }

    /// Write verbatim author content
    pub fn content(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        if self.minify {
            let collapsed = collapse_whitespace(raw.trim());
            self.out.push_str(&collapsed);
        } else {
            self.line(raw);
        }
    }

    /// Append a fragment produced by another writer
    pub fn embed(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        if !self.minify && !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out.push_str(fragment);
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Collapse whitespace runs to one space, leaving `<pre>` blocks untouched
fn collapse_whitespace(raw: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `raw`
    let lower = raw.to_ascii_lowercase();
    let mut out = String::with_capacity(raw.len());
    let mut rest = 0;
    let mut search = 0;

    while let Some(start) = lower[search..].find("<pre").map(|i| search + i) {
        let after = lower.as_bytes().get(start + 4).copied();
        if !matches!(after, Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r')) {
            search = start + 4;
            continue;
        }
        let end = lower[start..]
            .find("</pre>")
            .map(|i| start + i + "</pre>".len())
            .unwrap_or(raw.len());

        push_collapsed(&mut out, &raw[rest..start]);
        out.push_str(&raw[start..end]);
        rest = end;
        search = end;
    }

    push_collapsed(&mut out, &raw[rest..]);
    out
}

fn push_collapsed(out: &mut String, text: &str) {
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_indentation() {
        let mut w = HtmlWriter::new(false, 0);
        w.open("<div>");
        w.line("<p></p>");
        w.close("</div>");
        assert_eq!(w.finish(), "<div>\n  <p></p>\n</div>");
    }

    #[test]
    fn test_minified_output() {
        let mut w = HtmlWriter::new(true, 3);
        w.open("<div>");
        w.content("Hello   \n   {{name}}");
        w.close("</div>");
        assert_eq!(w.finish(), "<div>Hello {{name}}</div>");
    }

    #[test]
    fn test_minify_keeps_preformatted_blocks() {
        let mut w = HtmlWriter::new(true, 0);
        w.content("<p>a   b</p>\n<PRE class=\"code\">a\n    b</PRE>\n<p>c\n  d</p>");
        assert_eq!(
            w.finish(),
            "<p>a b</p> <PRE class=\"code\">a\n    b</PRE> <p>c d</p>"
        );

        let mut w = HtmlWriter::new(true, 0);
        w.content("<preview>x   y</preview>");
        assert_eq!(w.finish(), "<preview>x y</preview>");
    }
}
