//! Decorates generated directory-tree text with structural spans.
//!
//! Every line is split into three optional segments and each non-empty one
//! is wrapped in a `<span>` whose class names its role:
//!
//! ```text
//! ├── /src — source folder
//! └─┘└───┘└──────────────┘
//!  │   │          └ annotation
//!  │   └ name (alignment space included)
//!  └ connector
//! ```
//!
//! Concatenating the segments always gives back the original line, so the
//! markup is purely additive.

/// Separates an entry name from its trailing commentary.
pub const ANNOTATION_DELIMITER: &str = " \u{2014} ";

pub const CONNECTOR_CLASS: &str = "dirtree-connector";
pub const DIR_CLASS: &str = "dirtree-dir";
pub const FILE_CLASS: &str = "dirtree-file";
pub const ANNOTATION_CLASS: &str = "dirtree-annotation";

/// Escape `&`, `<` and `>` for insertion into element content.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    /// Names starting with `/` (ignoring leading whitespace) are directories.
    /// Everything else, including an empty name, is a file.
    pub fn classify(name: &str) -> Self {
        if name.trim_start_matches(is_name_padding).starts_with('/') {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            EntryKind::Directory => DIR_CLASS,
            EntryKind::File => FILE_CLASS,
        }
    }
}

/// One line of generator output, borrowed and split into its segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLine<'a> {
    pub connector: &'a str,
    pub name: &'a str,
    pub annotation: &'a str,
}

impl<'a> TreeLine<'a> {
    /// Split a line into connector, name and annotation.
    ///
    /// Returns `None` when the remainder after the connector holds a line
    /// terminator (`\r`, U+2028, U+2029); such lines are rendered as plain
    /// escaped text.
    pub fn parse(line: &'a str) -> Option<Self> {
        let connector_len = scan_connector(line);
        let (connector, rest) = line.split_at(connector_len);

        if rest.contains(|c: char| matches!(c, '\r' | '\u{2028}' | '\u{2029}')) {
            return None;
        }

        let (name, annotation) = match rest.find(ANNOTATION_DELIMITER) {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };

        Some(Self {
            connector,
            name,
            annotation,
        })
    }

    pub fn kind(&self) -> EntryKind {
        EntryKind::classify(self.name)
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        if !self.connector.is_empty() {
            push_span(&mut out, CONNECTOR_CLASS, self.connector);
        }
        if !self.name.is_empty() {
            push_span(&mut out, self.kind().class_name(), self.name);
        }
        if !self.annotation.is_empty() {
            push_span(&mut out, ANNOTATION_CLASS, self.annotation);
        }
        out
    }
}

fn push_span(out: &mut String, class: &str, text: &str) {
    out.push_str("<span class=\"");
    out.push_str(class);
    out.push_str("\">");
    out.push_str(&escape_html(text));
    out.push_str("</span>");
}

/// Whitespace in the ECMAScript sense: U+FEFF counts, U+0085 does not.
fn is_name_padding(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{000B}'
            | '\u{000C}'
            | '\r'
            | ' '
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn is_indent(c: char) -> bool {
    matches!(c, '\u{2502}' | '\u{2503}' | '|' | '\u{3000}' | ' ')
}

fn is_branch(c: char) -> bool {
    matches!(c, '\u{251C}' | '\u{2514}' | '\u{2523}' | '\u{2517}' | '+')
}

fn is_fill(c: char) -> bool {
    matches!(c, '\u{2500}' | '\u{2501}' | '-')
}

/// Byte length of the connector prefix: a run of indent glyphs, then branch
/// glyphs, then horizontal fill.
fn scan_connector(line: &str) -> usize {
    let mut end = 0;
    for class in [is_indent as fn(char) -> bool, is_branch, is_fill] {
        end += line[end..]
            .char_indices()
            .find(|&(_, c)| !class(c))
            .map_or(line.len() - end, |(idx, _)| idx);
    }
    end
}

/// Render a single line. Never fails; unparseable lines come back escaped.
pub fn render_line(line: &str) -> String {
    match TreeLine::parse(line) {
        Some(parsed) => parsed.to_markup(),
        None => escape_html(line),
    }
}

/// Render every line of a (possibly multi-tree) block, keeping the line
/// structure, blank separators included, exactly as it came in.
pub fn render_block(text: &str) -> String {
    text.split('\n')
        .map(render_line)
        .collect::<Vec<_>>()
        .join("\n")
}
