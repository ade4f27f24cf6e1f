//! Tolerant HTML scanner producing a flat [`Document`].
//!
//! This is not a tree builder. Tags only toggle style state (heading,
//! bold, italic), end lines, or introduce images; everything between tags
//! becomes a text run. Malformed markup never fails, it just produces
//! less structure.

use crate::document::{Document, Element, ImageElement, MAX_TEXT_LEN, Style, TextRun};
use crate::loader::Url;

/// Tags whose end finishes a line.
const LINE_ENDING_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "br", "pre",
];

/// Elements whose content is never rendered.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

// -------------------------------------------------------------------
// Tags
// -------------------------------------------------------------------

/// A scanned start or end tag.
#[derive(Debug, Clone, PartialEq)]
struct Tag {
    name: String,
    attributes: Vec<(String, String)>,
    is_end: bool,
    self_closing: bool,
}

impl Tag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

// -------------------------------------------------------------------
// Parser
// -------------------------------------------------------------------

/// Style and section state while scanning.
#[derive(Default)]
struct State {
    heading: u32,
    bold: u32,
    italic: u32,
    in_head: bool,
    in_title: bool,
    title: String,
}

impl State {
    fn style(&self) -> Style {
        Style {
            heading: self.heading > 0,
            bold: self.bold > 0,
            italic: self.italic > 0,
            ..Style::default()
        }
    }

    fn apply(&mut self, tag: &Tag) {
        let counter = match tag.name.as_str() {
            n if is_heading(n) => &mut self.heading,
            "b" | "strong" => &mut self.bold,
            "i" | "em" => &mut self.italic,
            "head" => {
                self.in_head = !tag.is_end;
                return;
            },
            "body" => {
                self.in_head = false;
                return;
            },
            "title" => {
                self.in_title = !tag.is_end && !tag.self_closing;
                return;
            },
            _ => return,
        };
        if tag.self_closing {
            return;
        }
        if tag.is_end {
            *counter = counter.saturating_sub(1);
        } else {
            *counter += 1;
        }
    }
}

/// Parse `markup` into a document. Image sources are resolved against
/// `base` when given. Output stops silently at the document capacity.
pub fn parse(markup: &[u8], base: Option<&Url>) -> Document {
    let html = String::from_utf8_lossy(markup);
    let mut doc = Document::new();
    let mut state = State::default();
    let mut rest: &str = &html;

    while !rest.is_empty() && !doc.is_full() {
        let Some(lt) = rest.find('<') else {
            emit_text(&mut doc, &mut state, rest);
            break;
        };
        emit_text(&mut doc, &mut state, &rest[..lt]);
        rest = &rest[lt..];

        // Comments, doctype and processing instructions.
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |i| &after[i + 3..]);
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            rest = rest.find('>').map_or("", |i| &rest[i + 1..]);
            continue;
        }

        let Some((tag, consumed)) = scan_tag(rest) else {
            // A lone '<' is text.
            emit_text(&mut doc, &mut state, "<");
            rest = &rest[1..];
            continue;
        };
        rest = &rest[consumed..];

        if !tag.is_end && RAW_TEXT_TAGS.contains(&tag.name.as_str()) {
            rest = skip_raw_text(rest, &tag.name);
            continue;
        }

        if tag.name == "img" && !tag.is_end {
            if let Some(src) = tag.attr("src").filter(|s| !s.trim().is_empty()) {
                let src = decode_entities(src);
                let resolved = base
                    .and_then(|b| b.resolve(&src))
                    .map_or(src, |u| u.to_string());
                let _ = doc.push(Element::Image(ImageElement::new(resolved)));
            }
            continue;
        }

        if LINE_ENDING_TAGS.contains(&tag.name.as_str()) && (tag.is_end || tag.name == "br") {
            end_line(&mut doc);
        }
        state.apply(&tag);
    }

    let title = collapse_whitespace(&state.title);
    if !title.is_empty() {
        doc.title = Some(title);
    }
    doc
}

/// Append a text run for `raw`, or route it to the title.
fn emit_text(doc: &mut Document, state: &mut State, raw: &str) {
    if raw.is_empty() {
        return;
    }
    if state.in_title {
        state.title.push_str(&decode_entities(raw));
        return;
    }
    if state.in_head {
        return;
    }
    let text = collapse_whitespace(&decode_entities(raw));
    if text.is_empty() {
        return;
    }
    let _ = doc.push(Element::Text(TextRun::new(text, state.style())));
}

/// Terminate the previous text run's line.
fn end_line(doc: &mut Document) {
    if let Some(run) = doc.last_text_mut()
        && !run.text.ends_with('\n')
        && run.text.len() < MAX_TEXT_LEN
    {
        run.text.push('\n');
    }
}

/// Scan a tag at the start of `s` (which begins with `<`). Returns the tag
/// and the number of bytes consumed, or `None` if this is not a tag.
fn scan_tag(s: &str) -> Option<(Tag, usize)> {
    let bytes = s.as_bytes();
    let mut i = 1;
    let is_end = bytes.get(i) == Some(&b'/');
    if is_end {
        i += 1;
    }

    let name_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    if i == name_start || !bytes[name_start].is_ascii_alphabetic() {
        return None;
    }
    let name = s[name_start..i].to_ascii_lowercase();

    let mut attributes = Vec::new();
    let mut self_closing = false;
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i) {
            None => break,
            Some(b'>') => {
                i += 1;
                break;
            },
            Some(b'/') => {
                self_closing = true;
                i += 1;
                continue;
            },
            Some(_) => {},
        }

        let attr_start = i;
        while i < bytes.len() && !matches!(bytes[i], b'=' | b'>' | b'/') && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let attr_name = s[attr_start..i].to_ascii_lowercase();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let mut value = String::new();
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i) {
                Some(&(q @ (b'"' | b'\''))) => {
                    let start = i + 1;
                    let end = s[start..].find(q as char).map_or(s.len(), |e| start + e);
                    value = s[start..end].to_string();
                    i = (end + 1).min(s.len());
                },
                _ => {
                    let start = i;
                    while i < bytes.len() && bytes[i] != b'>' && !bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    value = s[start..i].to_string();
                },
            }
        }
        if !attr_name.is_empty() {
            self_closing = false;
            attributes.push((attr_name, value));
        } else if i == attr_start {
            // Stray byte we cannot interpret.
            i += 1;
        }
    }

    Some((
        Tag {
            name,
            attributes,
            is_end,
            self_closing,
        },
        i,
    ))
}

/// Skip past the matching end tag of a raw-text element.
fn skip_raw_text<'a>(s: &'a str, name: &str) -> &'a str {
    let close = format!("</{name}");
    let lower = s.to_ascii_lowercase();
    match lower.find(&close) {
        Some(i) => s[i..].find('>').map_or("", |j| &s[i + j + 1..]),
        None => "",
    }
}

// -------------------------------------------------------------------
// Text helpers
// -------------------------------------------------------------------

/// Collapse whitespace runs to one space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }
    result
}

/// Decode the common named entities and numeric references. Unknown or
/// malformed references are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| lookup_reference(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            },
            None => {
                out.push('&');
                rest = &rest[1..];
            },
        }
    }
    out.push_str(rest);
    out
}

fn lookup_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "hellip" => '\u{2026}',
        _ => return None,
    })
}
