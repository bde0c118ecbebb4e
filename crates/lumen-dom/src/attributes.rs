//! Element Attributes
//!
//! Case-insensitive attribute map: get, set, remove, has.
//! Insertion order is kept for serialization only.

use std::collections::HashMap;

/// Single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Normalized (ASCII lowercase) name
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            value: value.into(),
        }
    }
}

/// Attribute collection with unique, case-insensitive keys
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    attributes: Vec<Attr>,
    by_name: HashMap<String, usize>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        match self.by_name.get(name) {
            Some(&i) => Some(i),
            None if name.bytes().any(|b| b.is_ascii_uppercase()) => {
                self.by_name.get(&name.to_ascii_lowercase()).copied()
            }
            None => None,
        }
    }

    /// Get attribute value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index_of(name)
            .and_then(|i| self.attributes.get(i))
            .map(|a| a.value.as_str())
    }

    /// Check if attribute exists
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Set attribute, returning the previous value
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        if let Some(index) = self.index_of(name) {
            let old = std::mem::replace(&mut self.attributes[index].value, value);
            return Some(old);
        }
        let attr = Attr::new(name, value);
        self.by_name.insert(attr.name.clone(), self.attributes.len());
        self.attributes.push(attr);
        None
    }

    /// Remove attribute, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.index_of(name)?;
        let removed = self.attributes.remove(index);
        self.by_name.remove(&removed.name);
        // Shift indices of later attributes
        for idx in self.by_name.values_mut() {
            if *idx > index {
                *idx -= 1;
            }
        }
        Some(removed.value)
    }

    /// Attribute names in insertion order
    pub fn names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Iterate over attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.attributes.iter()
    }

    /// Whitespace-separated tokens of an attribute (e.g. `class`)
    pub fn tokens(&self, name: &str) -> impl Iterator<Item = &str> {
        self.get(name).unwrap_or("").split_ascii_whitespace()
    }

    /// Check token membership in a whitespace-separated attribute
    pub fn has_token(&self, name: &str, token: &str) -> bool {
        self.tokens(name).any(|t| t == token)
    }
}
