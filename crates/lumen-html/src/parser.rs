//! Fragment Parser
//!
//! Forgiving, stack-based HTML fragment parser. Never fails: malformed
//! input degrades to text or is skipped. Handles implicit end tags for
//! the common cases (`li`, `p`, table rows and cells, `option`), void
//! elements, raw-text elements and self-closing syntax.

use lumen_dom::{DomTree, NodeData, NodeId};

use crate::entities::decode_entities;

/// Elements that never have children or an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content runs verbatim up to the matching end tag
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes",
];

/// Raw-text elements whose content still has character references decoded
const ESCAPABLE_RAW_TEXT: &[&str] = &["textarea", "title"];

/// Block-level openers that close an open `p`
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre", "section",
    "table", "ul",
];

/// Open elements that shield their contents from implicit closing
const SCOPE_BOUNDARIES: &[&str] = &[
    "html", "body", "table", "ul", "ol", "dl", "menu", "select", "datalist", "div", "section",
    "article", "aside", "nav", "main", "header", "footer", "blockquote", "form", "fieldset",
    "template", "button", "caption",
];

/// Open elements implicitly closed when `tag` starts
fn implicitly_closes(tag: &str) -> &'static [&'static str] {
    match tag {
        "li" => &["li"],
        "dt" | "dd" => &["dt", "dd"],
        "tr" => &["tr", "td", "th"],
        "td" | "th" => &["td", "th"],
        "thead" | "tbody" | "tfoot" => &["thead", "tbody", "tfoot", "tr", "td", "th"],
        "option" => &["option"],
        "optgroup" => &["optgroup", "option"],
        "rt" | "rp" => &["rt", "rp"],
        _ if CLOSES_P.contains(&tag) => &["p"],
        _ => &[],
    }
}

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// A start tag as read from the input
#[derive(Debug, Default)]
struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
}

/// HTML fragment parser
#[derive(Debug, Default)]
pub struct FragmentParser;

impl FragmentParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse `markup` into detached nodes owned by `tree`. Returns the
    /// top-level nodes in document order.
    pub fn parse_into(&self, tree: &mut DomTree, markup: &str) -> Vec<NodeId> {
        let mut builder = TreeBuilder {
            tree,
            stack: Vec::new(),
            roots: Vec::new(),
            created: 0,
        };
        let mut reader = Reader::new(markup);

        while !reader.at_end() {
            let text = reader.take_text();
            if !text.is_empty() {
                builder.append_text(&decode_entities(text));
            }
            if reader.at_end() {
                break;
            }

            let rest = reader.rest();
            if rest.starts_with("<!--") {
                reader.skip_comment();
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                reader.skip_past('>');
            } else if rest.starts_with("</") {
                match reader.end_tag() {
                    Some(name) => builder.close(&name),
                    None => reader.skip_past('>'),
                }
            } else if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                let tag = reader.start_tag();
                let raw = RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) && !tag.self_closing;
                let element = builder.open(tag);
                if raw {
                    let name = builder.tree.tag_name(element).unwrap_or_default().to_string();
                    let content = reader.raw_text(&name);
                    builder.append_raw(element, &name, content);
                }
            } else {
                // Stray '<' is plain text
                reader.bump(1);
                builder.append_text("<");
            }
        }

        tracing::debug!(
            bytes = markup.len(),
            nodes = builder.created,
            roots = builder.roots.len(),
            "Parsed fragment"
        );
        builder.roots
    }
}

/// Byte cursor over the markup
struct Reader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn bump(&mut self, bytes: usize) {
        self.pos = (self.pos + bytes).min(self.input.len());
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
        self.pos += rest.len() - trimmed.len();
    }

    /// Text up to the next '<'
    fn take_text(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest.find('<').unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Consume through the next `ch`, or to end of input
    fn skip_past(&mut self, ch: char) {
        match self.rest().find(ch) {
            Some(idx) => self.bump(idx + ch.len_utf8()),
            None => self.pos = self.input.len(),
        }
    }

    fn skip_comment(&mut self) {
        self.bump(4);
        match self.rest().find("-->") {
            Some(idx) => self.bump(idx + 3),
            None => self.pos = self.input.len(),
        }
    }

    /// Consume a run of chars not matching `stop`
    fn take_until(&mut self, stop: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest.find(stop).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// `</name ...>`; None for a bogus end tag
    fn end_tag(&mut self) -> Option<String> {
        let start = self.pos;
        self.bump(2);
        if !self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos = start;
            return None;
        }
        let name = self
            .take_until(|c| c.is_ascii_whitespace() || c == '/' || c == '>')
            .to_ascii_lowercase();
        self.skip_past('>');
        Some(name)
    }

    /// `<name attr=value ...>`, positioned at '<'
    fn start_tag(&mut self) -> StartTag {
        self.bump(1);
        let mut tag = StartTag {
            name: self
                .take_until(|c| c.is_ascii_whitespace() || c == '/' || c == '>')
                .to_ascii_lowercase(),
            ..StartTag::default()
        };

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.bump(1);
                    break;
                }
                Some('/') => {
                    self.bump(1);
                    if self.peek() == Some('>') {
                        tag.self_closing = true;
                        self.bump(1);
                        break;
                    }
                }
                Some(_) => {
                    let (name, value) = self.attribute();
                    if name.is_empty() {
                        self.bump(1);
                        continue;
                    }
                    // First occurrence wins
                    if !tag.attrs.iter().any(|(existing, _)| *existing == name) {
                        tag.attrs.push((name, value));
                    }
                }
            }
        }
        tag
    }

    fn attribute(&mut self) -> (String, String) {
        let name = self
            .take_until(|c| c.is_ascii_whitespace() || matches!(c, '=' | '>' | '/'))
            .to_ascii_lowercase();
        if name.is_empty() {
            return (name, String::new());
        }

        let before = self.pos;
        self.skip_whitespace();
        if self.peek() != Some('=') {
            self.pos = before;
            return (name, String::new());
        }
        self.bump(1);
        self.skip_whitespace();

        let raw = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump(1);
                let value = self.take_until(|c| c == quote);
                self.bump(1);
                value
            }
            _ => self.take_until(|c| c.is_ascii_whitespace() || c == '>'),
        };
        (name, decode_entities(raw).into_owned())
    }

    /// Content up to `</name`, consuming the end tag
    fn raw_text(&mut self, name: &str) -> &'a str {
        let rest = self.rest();
        let mut search = 0;
        while let Some(found) = rest[search..].find("</") {
            let start = search + found;
            let after = start + 2 + name.len();
            let closes = rest
                .get(start + 2..after)
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
                && rest[after..]
                    .chars()
                    .next()
                    .is_none_or(|c| c.is_ascii_whitespace() || c == '>' || c == '/');
            if closes {
                self.bump(start);
                self.skip_past('>');
                return &rest[..start];
            }
            search = start + 2;
        }
        self.pos = self.input.len();
        rest
    }
}

/// Open element stack plus the fragment's top-level nodes
struct TreeBuilder<'t> {
    tree: &'t mut DomTree,
    stack: Vec<NodeId>,
    roots: Vec<NodeId>,
    created: usize,
}

impl TreeBuilder<'_> {
    fn current_tag(&self, index: usize) -> &str {
        self.tree.tag_name(self.stack[index]).unwrap_or_default()
    }

    fn attach(&mut self, node: NodeId) {
        match self.stack.last() {
            Some(&parent) if self.tree.append_child(parent, node).is_ok() => {}
            _ => self.roots.push(node),
        }
    }

    fn open(&mut self, tag: StartTag) -> NodeId {
        self.close_implied(&tag.name);

        let element = self.tree.create_element(&tag.name);
        self.created += 1;
        if let Some(data) = self.tree.element_mut(element) {
            for (name, value) in &tag.attrs {
                data.set_attr(name, value);
            }
        }
        self.attach(element);
        if !tag.self_closing && !is_void(&tag.name) {
            self.stack.push(element);
        }
        element
    }

    /// Pop elements the new start tag ends implicitly. The outermost
    /// closable element below the nearest scope boundary wins.
    fn close_implied(&mut self, tag: &str) {
        let closes = implicitly_closes(tag);
        if closes.is_empty() {
            return;
        }
        let mut target = None;
        for index in (0..self.stack.len()).rev() {
            let open = self.current_tag(index);
            if closes.contains(&open) {
                target = Some(index);
            } else if SCOPE_BOUNDARIES.contains(&open) {
                break;
            }
        }
        if let Some(index) = target {
            self.stack.truncate(index);
        }
    }

    /// Pop down to and including the nearest open `name`
    fn close(&mut self, name: &str) {
        if let Some(index) = (0..self.stack.len()).rev().find(|&i| self.current_tag(i) == name) {
            self.stack.truncate(index);
        }
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let last = match self.stack.last() {
            Some(&parent) => self.tree.children(parent).last().copied(),
            None => self.roots.last().copied(),
        };
        if let Some(node) = last.and_then(|id| self.tree.get_mut(id)) {
            if let NodeData::Text(data) = &mut node.data {
                data.content.push_str(text);
                return;
            }
        }
        let node = self.tree.create_text(text);
        self.created += 1;
        self.attach(node);
    }

    /// Verbatim content of a raw-text element, which is then closed
    fn append_raw(&mut self, element: NodeId, name: &str, content: &str) {
        if !content.is_empty() {
            let text = if ESCAPABLE_RAW_TEXT.contains(&name) {
                decode_entities(content)
            } else {
                content.into()
            };
            let node = self.tree.create_text(&text);
            self.created += 1;
            if self.tree.append_child(element, node).is_err() {
                self.roots.push(node);
            }
        }
        if self.stack.last() == Some(&element) {
            self.stack.pop();
        }
    }
}
