//! CSS Selectors
//!
//! Parsing of selector groups into comma branches of compound selectors
//! joined by combinators.

use crate::SelectorError;

/// Comma-separated selector group. A node matches if any branch does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector group. Any malformed branch fails the whole list.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let selectors = split_top_level(input)
            .into_iter()
            .map(ComplexSelector::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }

    /// Parse a selector group, dropping malformed branches. A dropped
    /// branch matches nothing.
    pub fn parse_lenient(input: &str) -> Self {
        let selectors = split_top_level(input)
            .into_iter()
            .filter_map(|branch| match ComplexSelector::parse(branch) {
                Ok(selector) => Some(selector),
                Err(err) => {
                    tracing::debug!(branch = branch.trim(), %err, "ignoring selector branch");
                    None
                }
            })
            .collect();
        Self { selectors }
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

/// Relationship between two compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

impl Combinator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Self::Child),
            '+' => Some(Self::NextSibling),
            '~' => Some(Self::SubsequentSibling),
            _ => None,
        }
    }
}

/// One comma branch: compounds left to right, `combinators[i]` joining
/// `compounds[i]` and `compounds[i + 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub(crate) compounds: Vec<CompoundSelector>,
    pub(crate) combinators: Vec<Combinator>,
}

impl ComplexSelector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut cursor = Cursor::new(input);
        let mut compounds = Vec::new();
        let mut combinators = Vec::new();
        let mut pending: Option<Combinator> = None;

        loop {
            let had_space = cursor.skip_whitespace();
            let Some(c) = cursor.peek() else {
                break;
            };

            if let Some(combinator) = Combinator::from_char(c) {
                if compounds.is_empty() || pending.is_some_and(|p| p != Combinator::Descendant) {
                    return Err(SelectorError::UnexpectedChar {
                        ch: c,
                        offset: cursor.pos,
                    });
                }
                cursor.bump();
                pending = Some(combinator);
                continue;
            }

            if had_space && !compounds.is_empty() && pending.is_none() {
                pending = Some(Combinator::Descendant);
            }
            let compound = CompoundSelector::parse(&mut cursor)?;
            if !compounds.is_empty() {
                combinators.push(pending.take().unwrap_or(Combinator::Descendant));
            }
            compounds.push(compound);
        }

        if compounds.is_empty() {
            return Err(SelectorError::Empty);
        }
        if pending.is_some() {
            return Err(SelectorError::DanglingCombinator);
        }
        Ok(Self {
            compounds,
            combinators,
        })
    }

    pub fn compounds(&self) -> &[CompoundSelector] {
        &self.compounds
    }

    pub fn combinators(&self) -> &[Combinator] {
        &self.combinators
    }
}

/// Simple selectors applied to one element with AND semantics
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    fn parse(cursor: &mut Cursor<'_>) -> Result<Self, SelectorError> {
        let mut components = Vec::new();

        while let Some(c) = cursor.peek() {
            if c.is_whitespace() || Combinator::from_char(c).is_some() {
                break;
            }
            let offset = cursor.pos;
            let unexpected = SelectorError::UnexpectedChar { ch: c, offset };

            let component = match c {
                '*' if components.is_empty() => {
                    cursor.bump();
                    SelectorComponent::Universal
                }
                '#' | '.' => {
                    cursor.bump();
                    let name = cursor.ident();
                    if name.is_empty() {
                        return Err(unexpected);
                    }
                    if c == '#' {
                        SelectorComponent::Id(name)
                    } else {
                        SelectorComponent::Class(name)
                    }
                }
                '[' => {
                    cursor.bump();
                    let inner = cursor.block('[', ']')?;
                    SelectorComponent::Attribute(AttributeSelector::parse(inner)?)
                }
                ':' => {
                    cursor.bump();
                    let pseudo_element = cursor.eat(':');
                    let name = cursor.ident();
                    if name.is_empty() {
                        return Err(unexpected);
                    }
                    let arg = if cursor.eat('(') {
                        Some(cursor.block('(', ')')?)
                    } else {
                        None
                    };
                    if pseudo_element {
                        tracing::debug!(pseudo = %name, "pseudo-element treated as always matching");
                        SelectorComponent::PseudoClass(PseudoClass::Unknown(format!("::{name}")))
                    } else {
                        SelectorComponent::PseudoClass(PseudoClass::parse(&name, arg)?)
                    }
                }
                c if is_ident_char(c) && components.is_empty() => {
                    SelectorComponent::Type(cursor.ident().to_ascii_lowercase())
                }
                _ => return Err(unexpected),
            };
            components.push(component);
        }

        if components.is_empty() {
            return Err(match cursor.peek() {
                Some(ch) => SelectorError::UnexpectedChar {
                    ch,
                    offset: cursor.pos,
                },
                None => SelectorError::Empty,
            });
        }
        Ok(Self { components })
    }
}

/// A component of a compound selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector `*`
    Universal,
    /// Type selector (lowercased tag name)
    Type(String),
    /// ID selector `#id`
    Id(String),
    /// Class selector `.class`
    Class(String),
    /// Attribute selector `[attr]`, `[attr=value]`, etc.
    Attribute(AttributeSelector),
    /// Pseudo-class `:first-child`, `:not(...)`, etc.
    PseudoClass(PseudoClass),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Lowercased attribute name
    pub name: String,
    /// `None` tests presence only
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeMatcher {
    /// `[attr=value]` exact match
    Exact(String),
    /// `[attr~=value]` whitespace-separated list contains
    Includes(String),
    /// `[attr|=value]` exact or prefix followed by a hyphen
    DashMatch(String),
    /// `[attr^=value]` starts with
    Prefix(String),
    /// `[attr$=value]` ends with
    Suffix(String),
    /// `[attr*=value]` contains substring
    Substring(String),
}

impl AttributeMatcher {
    pub fn expected(&self) -> &str {
        match self {
            Self::Exact(v)
            | Self::Includes(v)
            | Self::DashMatch(v)
            | Self::Prefix(v)
            | Self::Suffix(v)
            | Self::Substring(v) => v,
        }
    }

    fn test(&self, value: &str, expected: &str) -> bool {
        match self {
            Self::Exact(_) => value == expected,
            Self::Includes(_) => {
                !expected.is_empty()
                    && !expected.contains(char::is_whitespace)
                    && value.split_ascii_whitespace().any(|token| token == expected)
            }
            Self::DashMatch(_) => {
                value == expected
                    || value
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Self::Prefix(_) => !expected.is_empty() && value.starts_with(expected),
            Self::Suffix(_) => !expected.is_empty() && value.ends_with(expected),
            Self::Substring(_) => !expected.is_empty() && value.contains(expected),
        }
    }
}

impl AttributeSelector {
    /// Parse the content between `[` and `]`
    pub fn parse(content: &str) -> Result<Self, SelectorError> {
        let invalid = || SelectorError::InvalidAttribute(content.to_string());
        let mut cursor = Cursor::new(content);

        cursor.skip_whitespace();
        let name = cursor.ident().to_ascii_lowercase();
        if name.is_empty() {
            return Err(invalid());
        }
        cursor.skip_whitespace();
        if cursor.at_end() {
            return Ok(Self {
                name,
                matcher: None,
                case_insensitive: false,
            });
        }

        let kind: fn(String) -> AttributeMatcher = match cursor.bump() {
            Some('=') => AttributeMatcher::Exact,
            Some(op @ ('~' | '|' | '^' | '$' | '*')) if cursor.eat('=') => match op {
                '~' => AttributeMatcher::Includes,
                '|' => AttributeMatcher::DashMatch,
                '^' => AttributeMatcher::Prefix,
                '$' => AttributeMatcher::Suffix,
                _ => AttributeMatcher::Substring,
            },
            _ => return Err(invalid()),
        };

        cursor.skip_whitespace();
        let value = match cursor.peek() {
            Some(quote @ ('"' | '\'')) => {
                cursor.bump();
                cursor.quoted(quote).ok_or_else(invalid)?
            }
            // `[a=]` has no value token; `[a=""]` is fine
            Some(_) => cursor.take_until_whitespace(),
            None => return Err(invalid()),
        };

        cursor.skip_whitespace();
        let case_insensitive = match cursor.bump() {
            None => false,
            Some('i' | 'I') => true,
            Some('s' | 'S') => false,
            Some(_) => return Err(invalid()),
        };
        cursor.skip_whitespace();
        if !cursor.at_end() {
            return Err(invalid());
        }

        Ok(Self {
            name,
            matcher: Some(kind(value)),
            case_insensitive,
        })
    }

    /// Check an attribute value (`None` when the attribute is absent)
    pub fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        let Some(matcher) = &self.matcher else {
            return true;
        };
        if self.case_insensitive {
            matcher.test(
                &value.to_ascii_lowercase(),
                &matcher.expected().to_ascii_lowercase(),
            )
        } else {
            matcher.test(value, matcher.expected())
        }
    }
}

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpression {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpression {
    /// Create "odd" expression (2n+1)
    pub fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    /// Create "even" expression (2n)
    pub fn even() -> Self {
        Self { a: 2, b: 0 }
    }

    /// Create a simple index (0n+b)
    pub fn index(n: i32) -> Self {
        Self { a: 0, b: n }
    }

    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse from string like "2n+1", "odd", "even", "3", "-n+3"
    pub fn parse(s: &str) -> Option<Self> {
        let s: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match s.as_str() {
            "odd" => return Some(Self::odd()),
            "even" => return Some(Self::even()),
            "" => return None,
            _ => {}
        }

        let Some(n_pos) = s.find('n') else {
            return s.parse().ok().map(Self::index);
        };

        let a = match &s[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            coefficient => coefficient.parse().ok()?,
        };
        let rest = &s[n_pos + 1..];
        let b = if rest.is_empty() {
            0
        } else if rest.starts_with(['+', '-']) {
            rest.parse().ok()?
        } else {
            return None;
        };
        Some(Self::new(a, b))
    }

    /// Check if position n (1-based) matches this expression
    pub fn matches(&self, n: i32) -> bool {
        if self.a == 0 {
            return n == self.b;
        }
        let a = i64::from(self.a);
        let diff = i64::from(n) - i64::from(self.b);
        diff % a == 0 && diff / a >= 0
    }
}

/// Pseudo-classes
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),
    Checked,
    Disabled,
    Enabled,
    /// `:link` / `:any-link`
    Link,
    Required,
    Optional,
    Not(SelectorList),
    /// `:is`, `:where`, `:matches`, `:any`
    Is(SelectorList),
    Has(SelectorList),
    /// Unsupported pseudo-class or pseudo-element; always satisfied
    Unknown(String),
}

impl PseudoClass {
    /// Parse a pseudo-class from its name and optional parenthesized argument
    pub fn parse(name: &str, arg: Option<&str>) -> Result<Self, SelectorError> {
        let lower = name.to_ascii_lowercase();
        let nth = |arg: Option<&str>| {
            let arg = arg.unwrap_or("");
            NthExpression::parse(arg).ok_or_else(|| SelectorError::InvalidNth(arg.to_string()))
        };

        let pseudo = match (lower.as_str(), arg) {
            ("root", None) => Self::Root,
            ("empty", None) => Self::Empty,
            ("first-child", None) => Self::FirstChild,
            ("last-child", None) => Self::LastChild,
            ("only-child", None) => Self::OnlyChild,
            ("first-of-type", None) => Self::FirstOfType,
            ("last-of-type", None) => Self::LastOfType,
            ("only-of-type", None) => Self::OnlyOfType,
            ("nth-child", _) => Self::NthChild(nth(arg)?),
            ("nth-last-child", _) => Self::NthLastChild(nth(arg)?),
            ("nth-of-type", _) => Self::NthOfType(nth(arg)?),
            ("nth-last-of-type", _) => Self::NthLastOfType(nth(arg)?),
            ("checked", None) => Self::Checked,
            ("disabled", None) => Self::Disabled,
            ("enabled", None) => Self::Enabled,
            ("link" | "any-link", None) => Self::Link,
            ("required", None) => Self::Required,
            ("optional", None) => Self::Optional,
            ("not", Some(inner)) => Self::Not(SelectorList::parse(inner)?),
            ("is" | "where" | "matches" | "any", Some(inner)) => {
                Self::Is(SelectorList::parse_lenient(inner))
            }
            ("has", Some(inner)) => Self::Has(SelectorList::parse(inner)?),
            _ => {
                tracing::debug!(pseudo = %name, "unknown pseudo-class treated as always matching");
                Self::Unknown(lower)
            }
        };
        Ok(pseudo)
    }
}

/// Split on commas outside brackets, parentheses and quotes
fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut chars = input.char_indices();

    while let Some((i, c)) = chars.next() {
        match quote {
            Some(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '\\' => {
                    chars.next();
                }
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    parts.push(&input[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    parts.push(&input[start..]);
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '\\' || !c.is_ascii()
}

/// Character cursor over selector text
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns whether any whitespace was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    /// Identifier with backslash escapes resolved
    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                if let Some(escaped) = self.bump() {
                    out.push(escaped);
                }
            } else if is_ident_char(c) {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
        out
    }

    fn take_until_whitespace(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| !c.is_whitespace()) {
            self.bump();
        }
        self.input[start..self.pos].to_string()
    }

    /// Body of a quoted string whose opening quote was consumed
    fn quoted(&mut self, quote: char) -> Option<String> {
        let mut out = String::new();
        loop {
            match self.bump()? {
                '\\' => out.push(self.bump()?),
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
    }

    /// Content up to the matching `close`; the opener was consumed
    fn block(&mut self, open: char, close: char) -> Result<&'a str, SelectorError> {
        let start = self.pos;
        let mut depth = 1usize;
        let mut quote: Option<char> = None;

        while let Some(c) = self.bump() {
            match quote {
                Some(q) => {
                    if c == '\\' {
                        self.bump();
                    } else if c == q {
                        quote = None;
                    }
                }
                None => match c {
                    '"' | '\'' => quote = Some(c),
                    '\\' => {
                        self.bump();
                    }
                    c if c == open => depth += 1,
                    c if c == close => {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(&self.input[start..self.pos - close.len_utf8()]);
                        }
                    }
                    _ => {}
                },
            }
        }
        Err(SelectorError::Unclosed(open))
    }
}
