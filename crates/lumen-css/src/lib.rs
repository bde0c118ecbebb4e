//! Lumen CSS Selectors
//!
//! Selector parsing and first-match testing against a DOM tree:
//! `matches`, `closest`, `query_all`.

mod matching;
mod selectors;

pub use matching::{ElementQuery, closest, matches, query_all, query_first};
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList,
};

/// Selector syntax error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("combinator without a following compound selector")]
    DanglingCombinator,
    #[error("unclosed {0:?}")]
    Unclosed(char),
    #[error("invalid attribute selector [{0}]")]
    InvalidAttribute(String),
    #[error("invalid An+B expression {0:?}")]
    InvalidNth(String),
}
