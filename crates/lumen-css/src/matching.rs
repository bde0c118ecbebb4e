//! Selector Matching
//!
//! First-match testing of parsed selectors against a `DomTree`. Nothing is
//! cached: sibling positions are recomputed from the parent's children on
//! every call.

use lumen_dom::{Document, DomTree, ElementData, Node, NodeId, NodeType};

use crate::selectors::{
    Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorComponent, SelectorList,
};

/// Element query trait
pub trait ElementQuery {
    /// First descendant of `root` matching the selector
    fn query_selector(&self, root: NodeId, selector: &str) -> Option<NodeId>;

    /// All descendants of `root` matching the selector, in document order
    fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId>;

    /// Find the closest inclusive ancestor matching the selector
    fn closest(&self, element: NodeId, selector: &str) -> Option<NodeId>;

    /// Check if element matches selector
    fn matches(&self, element: NodeId, selector: &str) -> bool;
}

impl ElementQuery for DomTree {
    fn query_selector(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        query_first(self, root, selector)
    }

    fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        query_all(self, root, selector)
    }

    fn closest(&self, element: NodeId, selector: &str) -> Option<NodeId> {
        closest(self, element, selector)
    }

    fn matches(&self, element: NodeId, selector: &str) -> bool {
        matches(self, element, selector)
    }
}

impl ElementQuery for Document {
    fn query_selector(&self, root: NodeId, selector: &str) -> Option<NodeId> {
        query_first(self.tree(), root, selector)
    }

    fn query_selector_all(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        query_all(self.tree(), root, selector)
    }

    fn closest(&self, element: NodeId, selector: &str) -> Option<NodeId> {
        closest(self.tree(), element, selector)
    }

    fn matches(&self, element: NodeId, selector: &str) -> bool {
        matches(self.tree(), element, selector)
    }
}

/// Does `node` match `selector`? Malformed selectors match nothing.
pub fn matches(tree: &DomTree, node: NodeId, selector: &str) -> bool {
    SelectorList::parse_lenient(selector).matches(tree, node)
}

/// Descendants of `root` (excluding `root`) matching `selector`, in document
/// order with each node at most once
pub fn query_all(tree: &DomTree, root: NodeId, selector: &str) -> Vec<NodeId> {
    SelectorList::parse_lenient(selector).query_all(tree, root)
}

pub fn query_first(tree: &DomTree, root: NodeId, selector: &str) -> Option<NodeId> {
    SelectorList::parse_lenient(selector).query_first(tree, root)
}

/// `node` or its nearest ancestor matching `selector`
pub fn closest(tree: &DomTree, node: NodeId, selector: &str) -> Option<NodeId> {
    let list = SelectorList::parse_lenient(selector);
    std::iter::once(node)
        .chain(tree.ancestors(node))
        .find(|&n| list.matches(tree, n))
}

impl SelectorList {
    /// Does `node` match any branch?
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.is_element(node) && self.selectors.iter().any(|s| s.matches(tree, node))
    }

    pub fn query_all(&self, tree: &DomTree, root: NodeId) -> Vec<NodeId> {
        if self.is_empty() {
            return Vec::new();
        }
        tree.descendants(root)
            .into_iter()
            .filter(|&n| self.matches(tree, n))
            .collect()
    }

    pub fn query_first(&self, tree: &DomTree, root: NodeId) -> Option<NodeId> {
        if self.is_empty() {
            return None;
        }
        tree.descendants(root)
            .into_iter()
            .find(|&n| self.matches(tree, n))
    }
}

impl ComplexSelector {
    /// Match the rightmost compound against `node`, then walk leftward
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            len => self.matches_from(tree, len - 1, node),
        }
    }

    fn matches_from(&self, tree: &DomTree, index: usize, node: NodeId) -> bool {
        if !self.compounds[index].matches(tree, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        let next = index - 1;

        match self.combinators[next] {
            Combinator::Child => {
                parent_element(tree, node).is_some_and(|p| self.matches_from(tree, next, p))
            }
            Combinator::Descendant => tree
                .ancestors(node)
                .take_while(|&a| tree.is_element(a))
                .any(|a| self.matches_from(tree, next, a)),
            Combinator::NextSibling => tree
                .previous_element_sibling(node)
                .is_some_and(|s| self.matches_from(tree, next, s)),
            Combinator::SubsequentSibling => {
                let mut sibling = tree.previous_element_sibling(node);
                while let Some(s) = sibling {
                    if self.matches_from(tree, next, s) {
                        return true;
                    }
                    sibling = tree.previous_element_sibling(s);
                }
                false
            }
        }
    }
}

fn parent_element(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.parent(node).filter(|&p| tree.is_element(p))
}

impl CompoundSelector {
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(elem) = tree.element(node) else {
            return false;
        };
        self.components
            .iter()
            .all(|component| component.matches(tree, node, elem))
    }
}

impl SelectorComponent {
    fn matches(&self, tree: &DomTree, node: NodeId, elem: &ElementData) -> bool {
        match self {
            Self::Universal => true,
            Self::Type(tag) => elem.tag_name().eq_ignore_ascii_case(tag),
            Self::Id(id) => elem.id() == Some(id.as_str()),
            Self::Class(class) => elem.has_class(class),
            Self::Attribute(attr) => attr.matches(elem.get_attr(&attr.name)),
            Self::PseudoClass(pseudo) => pseudo.matches(tree, node, elem),
        }
    }
}

const FORM_CONTROLS: &[&str] = &[
    "button", "input", "select", "textarea", "optgroup", "option", "fieldset",
];

impl PseudoClass {
    fn matches(&self, tree: &DomTree, node: NodeId, elem: &ElementData) -> bool {
        let tag = elem.tag_name();
        match self {
            Self::Root => {
                tree.parent(node).and_then(|p| tree.node_type(p)) == Some(NodeType::Document)
            }
            Self::Empty => tree.children(node).iter().all(|&c| {
                tree.get(c)
                    .and_then(Node::as_text)
                    .is_some_and(str::is_empty)
            }),
            Self::FirstChild => sibling_position(tree, node, false, false) == 1,
            Self::LastChild => sibling_position(tree, node, false, true) == 1,
            Self::OnlyChild => {
                sibling_position(tree, node, false, false) == 1
                    && sibling_position(tree, node, false, true) == 1
            }
            Self::FirstOfType => sibling_position(tree, node, true, false) == 1,
            Self::LastOfType => sibling_position(tree, node, true, true) == 1,
            Self::OnlyOfType => {
                sibling_position(tree, node, true, false) == 1
                    && sibling_position(tree, node, true, true) == 1
            }
            Self::NthChild(nth) => nth.matches(sibling_position(tree, node, false, false)),
            Self::NthLastChild(nth) => nth.matches(sibling_position(tree, node, false, true)),
            Self::NthOfType(nth) => nth.matches(sibling_position(tree, node, true, false)),
            Self::NthLastOfType(nth) => nth.matches(sibling_position(tree, node, true, true)),
            Self::Checked => match tag {
                "input" => elem.attrs().contains("checked"),
                "option" => elem.attrs().contains("selected"),
                _ => false,
            },
            Self::Disabled => FORM_CONTROLS.contains(&tag) && elem.attrs().contains("disabled"),
            Self::Enabled => FORM_CONTROLS.contains(&tag) && !elem.attrs().contains("disabled"),
            Self::Link => matches!(tag, "a" | "area" | "link") && elem.attrs().contains("href"),
            Self::Required => is_required_capable(tag) && elem.attrs().contains("required"),
            Self::Optional => is_required_capable(tag) && !elem.attrs().contains("required"),
            Self::Not(list) => !list.matches(tree, node),
            Self::Is(list) => list.matches(tree, node),
            Self::Has(list) => tree
                .descendants(node)
                .into_iter()
                .any(|d| list.matches(tree, d)),
            Self::Unknown(_) => true,
        }
    }
}

fn is_required_capable(tag: &str) -> bool {
    matches!(tag, "input" | "select" | "textarea")
}

/// 1-based position among element siblings (or same-tag siblings), counted
/// from the end when `from_end`. A parentless element is its own only
/// sibling.
fn sibling_position(tree: &DomTree, node: NodeId, of_type: bool, from_end: bool) -> i32 {
    let Some(parent) = tree.parent(node) else {
        return 1;
    };
    let tag = tree.tag_name(node);
    let siblings: Vec<NodeId> = tree
        .element_children(parent)
        .into_iter()
        .filter(|&s| !of_type || tree.tag_name(s) == tag)
        .collect();
    let index = siblings.iter().position(|&s| s == node).unwrap_or(0);
    let position = if from_end {
        siblings.len() - index
    } else {
        index + 1
    };
    position as i32
}
