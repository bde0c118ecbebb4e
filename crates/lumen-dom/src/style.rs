//! Inline Style Store
//!
//! Per-element style declarations keyed by normalized property name.
//! Vendor-prefixed properties fill their unprefixed counterpart when it was
//! not set explicitly; an explicit canonical value always wins.

const VENDOR_PREFIXES: &[&str] = &["-webkit-", "-moz-", "-ms-", "-o-"];

/// Translate a script-facing property name to its CSS form.
///
/// `backgroundColor` → `background-color`, `webkitTransform` /
/// `WebkitTransform` → `-webkit-transform`, `cssFloat` → `float`.
/// Custom properties (`--x`) are returned unchanged.
pub fn normalize_property_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        return name.to_string();
    }
    if name == "cssFloat" {
        return "float".to_string();
    }
    if name.contains('-') || !name.bytes().any(|b| b.is_ascii_uppercase()) {
        return name.to_ascii_lowercase();
    }

    let mut result = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            result.push('-');
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    if result.starts_with('-') {
        // `Color` is not vendor-prefixed, `WebkitTransform` is
        if !VENDOR_PREFIXES.iter().any(|prefix| result.starts_with(prefix)) {
            result.remove(0);
        }
    } else if VENDOR_PREFIXES
        .iter()
        .any(|prefix| result.starts_with(&prefix[1..]))
    {
        result.insert(0, '-');
    }
    result
}

/// Split `-webkit-transform` into its canonical `transform`
fn unprefixed(name: &str) -> Option<&str> {
    VENDOR_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration {
    name: String,
    value: String,
    /// Filled from a vendor-prefixed alias rather than set directly
    alias_fill: bool,
}

/// Inline style declaration block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclaration {
    declarations: Vec<Declaration>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a declaration block such as `color: red; margin: 0`
    pub fn parse(text: &str) -> Self {
        let mut style = Self::new();
        style.set_css_text(text);
        style
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.declarations.iter().position(|d| d.name == name)
    }

    /// Get a property value, falling back from a prefixed name to its
    /// canonical property
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = normalize_property_name(name);
        if let Some(i) = self.position(&name) {
            return Some(self.declarations[i].value.as_str());
        }
        let canonical = unprefixed(&name)?;
        self.position(canonical)
            .map(|i| self.declarations[i].value.as_str())
    }

    /// Set a property. An empty value removes it.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = normalize_property_name(name);
        let value = value.trim();
        if value.is_empty() {
            self.remove(&name);
            return;
        }
        if name.is_empty() {
            return;
        }

        self.put(&name, value, false);
        if let Some(canonical) = unprefixed(&name) {
            let explicit = self
                .position(canonical)
                .is_some_and(|i| !self.declarations[i].alias_fill);
            if !explicit {
                let canonical = canonical.to_string();
                self.put(&canonical, value, true);
            }
        }
    }

    fn put(&mut self, name: &str, value: &str, alias_fill: bool) {
        match self.position(name) {
            Some(i) => {
                let decl = &mut self.declarations[i];
                decl.value = value.to_string();
                decl.alias_fill = alias_fill;
            }
            None => self.declarations.push(Declaration {
                name: name.to_string(),
                value: value.to_string(),
                alias_fill,
            }),
        }
    }

    /// Remove a property, returning its previous value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let name = normalize_property_name(name);
        let removed = self
            .position(&name)
            .map(|i| self.declarations.remove(i).value);

        if let Some(canonical) = unprefixed(&name) {
            if let Some(i) = self.position(canonical) {
                if self.declarations[i].alias_fill {
                    self.declarations.remove(i);
                }
            }
        }
        removed
    }

    /// Serialize as `name: value; name: value`. Alias fills are left out
    /// while their prefixed source is present, so reparsing restores them
    /// as fills.
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .filter(|d| !d.alias_fill || !self.has_prefixed_source(&d.name))
            .map(|d| format!("{}: {};", d.name, d.value))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn has_prefixed_source(&self, canonical: &str) -> bool {
        self.declarations
            .iter()
            .any(|d| unprefixed(&d.name) == Some(canonical))
    }

    /// Replace all declarations from a declaration block
    pub fn set_css_text(&mut self, text: &str) {
        self.declarations.clear();
        for decl in text.split(';') {
            let Some((name, value)) = decl.split_once(':') else {
                continue;
            };
            self.set(name, value);
        }
    }

    /// Iterate `(name, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|d| (d.name.as_str(), d.value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_names() {
        assert_eq!(normalize_property_name("backgroundColor"), "background-color");
        assert_eq!(normalize_property_name("webkitTransform"), "-webkit-transform");
        assert_eq!(normalize_property_name("WebkitTransform"), "-webkit-transform");
        assert_eq!(normalize_property_name("msFlex"), "-ms-flex");
        assert_eq!(normalize_property_name("cssFloat"), "float");
        assert_eq!(normalize_property_name("opacity"), "opacity");
        assert_eq!(normalize_property_name("Color"), "color");
        assert_eq!(normalize_property_name("--Main-Color"), "--Main-Color");
    }

    #[test]
    fn test_prefixed_fills_canonical() {
        let mut style = StyleDeclaration::new();
        style.set("webkitTransform", "rotate(45deg)");

        assert_eq!(style.get("-webkit-transform"), Some("rotate(45deg)"));
        assert_eq!(style.get("transform"), Some("rotate(45deg)"));
    }

    #[test]
    fn test_explicit_canonical_not_overwritten() {
        let mut style = StyleDeclaration::new();
        style.set("transform", "scale(2)");
        style.set("-webkit-transform", "rotate(45deg)");

        assert_eq!(style.get("transform"), Some("scale(2)"));
        assert_eq!(style.get("-webkit-transform"), Some("rotate(45deg)"));

        style.remove("-webkit-transform");
        assert_eq!(style.get("transform"), Some("scale(2)"));
    }

    #[test]
    fn test_remove_prefixed_drops_fill() {
        let mut style = StyleDeclaration::new();
        style.set("-moz-user-select", "none");
        assert_eq!(style.get("user-select"), Some("none"));

        style.remove("MozUserSelect");
        assert_eq!(style.get("user-select"), None);
        assert!(style.is_empty());
    }

    #[test]
    fn test_prefixed_read_falls_back() {
        let style = StyleDeclaration::parse("transition: opacity 1s");
        assert_eq!(style.get("webkitTransition"), Some("opacity 1s"));
    }

    #[test]
    fn test_css_text_round_trip() {
        let style = StyleDeclaration::parse(" color : red ; margin:0;; bogus ");
        assert_eq!(style.css_text(), "color: red; margin: 0;");
        assert_eq!(StyleDeclaration::parse(&style.css_text()), style);
    }

    #[test]
    fn test_css_text_keeps_alias_fills_implicit() {
        let mut style = StyleDeclaration::new();
        style.set("-webkit-transform", "rotate(1deg)");
        assert_eq!(style.css_text(), "-webkit-transform: rotate(1deg);");

        let mut reparsed = StyleDeclaration::parse(&style.css_text());
        assert_eq!(reparsed, style);
        reparsed.set("-webkit-transform", "rotate(2deg)");
        assert_eq!(reparsed.get("transform"), Some("rotate(2deg)"));

        // An explicit canonical value is still written out
        style.set("transform", "none");
        assert_eq!(style.css_text(), "-webkit-transform: rotate(1deg); transform: none;");
    }

    #[test]
    fn test_empty_value_removes() {
        let mut style = StyleDeclaration::parse("color: red");
        style.set("color", "");
        assert!(style.is_empty());
    }
}
