//! CSS Selectors
//!
//! The subset components are discovered with: type, universal, id,
//! class and attribute selectors, compounded and joined by descendant
//! or child combinators, in comma-separated lists.

use crate::{DomError, DomTree, NodeId};

/// Parsed selector list
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    alternatives: Vec<ComplexSelector>,
}

/// Compounds joined by combinators, e.g. `nav > ul li`
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    compounds: Vec<CompoundSelector>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

/// Combinator between two compounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace
    Descendant,
    /// `>`
    Child,
}

/// Components that must all match one element
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSelector {
    components: Vec<SelectorComponent>,
}

/// A component of a selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(value)) = (&self.matcher, value) else {
            // [attr] only checks existence
            return self.matcher.is_none() && value.is_some();
        };

        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let val = fold(value);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                val.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{expected}-"))
            }
            AttributeMatcher::Prefix(expected) => {
                !expected.is_empty() && val.starts_with(&fold(expected))
            }
            AttributeMatcher::Suffix(expected) => {
                !expected.is_empty() && val.ends_with(&fold(expected))
            }
            AttributeMatcher::Substring(expected) => {
                !expected.is_empty() && val.contains(&fold(expected))
            }
        }
    }
}

impl Selector {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let alternatives = SelectorParser { input, pos: 0 }.parse_list()?;
        Ok(Self {
            source: input.trim().to_string(),
            alternatives,
        })
    }

    /// The selector text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check whether an element matches any alternative
    pub fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        tree.element(element).is_some()
            && self.alternatives.iter().any(|c| c.matches(tree, element))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl ComplexSelector {
    fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        self.matches_from(tree, element, self.compounds.len() - 1)
    }

    // Right-to-left: compound `index` must match `element`, then the
    // combinator to its left decides which ancestors to try next.
    fn matches_from(&self, tree: &DomTree, element: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(tree, element) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => tree
                .parent_element(element)
                .is_some_and(|parent| self.matches_from(tree, parent, index - 1)),
            Combinator::Descendant => {
                let mut current = tree.parent_element(element);
                while let Some(ancestor) = current {
                    if self.matches_from(tree, ancestor, index - 1) {
                        return true;
                    }
                    current = tree.parent_element(ancestor);
                }
                false
            }
        }
    }
}

impl CompoundSelector {
    fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        let Some(elem) = tree.element(element) else {
            return false;
        };

        self.components.iter().all(|component| match component {
            SelectorComponent::Universal => true,
            SelectorComponent::Type(tag) => elem.tag.eq_ignore_ascii_case(tag),
            SelectorComponent::Id(id) => elem.id() == Some(id.as_str()),
            SelectorComponent::Class(class) => elem.classes().any(|c| c == class),
            SelectorComponent::Attribute(attr) => attr.matches(elem.get_attr(&attr.name)),
        })
    }
}

struct SelectorParser<'a> {
    input: &'a str,
    pos: usize,
}

impl SelectorParser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos > start
    }

    fn error(&self, reason: impl Into<String>) -> DomError {
        DomError::InvalidSelector {
            selector: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn parse_list(&mut self) -> Result<Vec<ComplexSelector>, DomError> {
        let mut list = Vec::new();
        loop {
            self.skip_whitespace();
            list.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.bump() {
                None => return Ok(list),
                Some(',') => continue,
                Some(c) => return Err(self.error(format!("unexpected '{c}'"))),
            }
        }
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, DomError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_whitespace => combinators.push(Combinator::Descendant),
                Some(c) => return Err(self.error(format!("unexpected '{c}'"))),
            }
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, DomError> {
        let mut components = Vec::new();

        match self.peek() {
            Some('*') => {
                self.bump();
                components.push(SelectorComponent::Universal);
            }
            Some(c) if c.is_alphabetic() || c == '_' => {
                let tag = self.parse_ident()?;
                components.push(SelectorComponent::Type(tag.to_ascii_lowercase()));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    components.push(SelectorComponent::Id(self.parse_ident()?));
                }
                Some('.') => {
                    self.bump();
                    components.push(SelectorComponent::Class(self.parse_ident()?));
                }
                Some('[') => {
                    self.bump();
                    components.push(SelectorComponent::Attribute(self.parse_attribute()?));
                }
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(self.error("expected a selector"));
        }
        Ok(CompoundSelector { components })
    }

    fn parse_ident(&mut self) -> Result<String, DomError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.bump();
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, DomError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => match self.bump() {
                    Some(c) => value.push(c),
                    None => return Err(self.error("unterminated string")),
                },
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
            }
        }
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, DomError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.bump() {
            Some(']') => {
                return Ok(AttributeSelector {
                    name,
                    matcher: None,
                    case_insensitive: false,
                });
            }
            Some('=') => '=',
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                if self.bump() != Some('=') {
                    return Err(self.error(format!("expected '=' after '{c}'")));
                }
                c
            }
            _ => return Err(self.error("malformed attribute selector")),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                self.parse_quoted(q)?
            }
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();

        let case_insensitive = matches!(self.peek(), Some('i' | 'I'));
        if case_insensitive {
            self.bump();
            self.skip_whitespace();
        }
        if self.bump() != Some(']') {
            return Err(self.error("expected ']'"));
        }

        let matcher = match op {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Contains(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };

        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(tag: &str, attrs: &[(&str, &str)]) -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let el = tree.create_element(tag);
        for (name, value) in attrs {
            tree.set_attribute(el, name, value);
        }
        tree.append_child(tree.root(), el).unwrap();
        (tree, el)
    }

    #[test]
    fn test_attribute_presence_and_value() {
        let (tree, el) = tree_with("div", &[("data-rvt-modal", "modalExample")]);

        assert!(Selector::parse("[data-rvt-modal]").unwrap().matches(&tree, el));
        assert!(Selector::parse("[data-rvt-modal=\"modalExample\"]").unwrap().matches(&tree, el));
        assert!(Selector::parse("[data-rvt-modal='modalExample']").unwrap().matches(&tree, el));
        assert!(Selector::parse("[data-rvt-modal=modalExample]").unwrap().matches(&tree, el));
        assert!(!Selector::parse("[data-rvt-modal=\"other\"]").unwrap().matches(&tree, el));
        assert!(!Selector::parse("[data-rvt-alert]").unwrap().matches(&tree, el));
    }

    #[test]
    fn test_attribute_operators() {
        let attr = |matcher, ci| AttributeSelector {
            name: "x".into(),
            matcher: Some(matcher),
            case_insensitive: ci,
        };

        assert!(attr(AttributeMatcher::Contains("b".into()), false).matches(Some("a b c")));
        assert!(attr(AttributeMatcher::DashMatch("en".into()), false).matches(Some("en-US")));
        assert!(attr(AttributeMatcher::Prefix("rvt".into()), false).matches(Some("rvt-tabs")));
        assert!(attr(AttributeMatcher::Suffix("tabs".into()), false).matches(Some("rvt-tabs")));
        assert!(attr(AttributeMatcher::Substring("t-t".into()), false).matches(Some("rvt-tabs")));
        assert!(!attr(AttributeMatcher::Prefix("".into()), false).matches(Some("rvt")));
        assert!(attr(AttributeMatcher::Exact("TAB".into()), true).matches(Some("tab")));
        assert!(!attr(AttributeMatcher::Exact("TAB".into()), false).matches(Some("tab")));
    }

    #[test]
    fn test_compound_and_list() {
        let (tree, el) = tree_with("button", &[("class", "rvt-modal__close"), ("id", "x")]);

        assert!(Selector::parse("button.rvt-modal__close#x").unwrap().matches(&tree, el));
        assert!(Selector::parse("a, button").unwrap().matches(&tree, el));
        assert!(Selector::parse("*").unwrap().matches(&tree, el));
        assert!(!Selector::parse("button.other").unwrap().matches(&tree, el));
    }

    #[test]
    fn test_combinators() {
        let mut tree = DomTree::new();
        let nav = tree.create_element("nav");
        let ul = tree.create_element("ul");
        let li = tree.create_element("li");
        tree.set_attribute(nav, "data-rvt-sidenav", "");
        tree.append_child(tree.root(), nav).unwrap();
        tree.append_child(nav, ul).unwrap();
        tree.append_child(ul, li).unwrap();

        assert!(Selector::parse("[data-rvt-sidenav] li").unwrap().matches(&tree, li));
        assert!(Selector::parse("ul > li").unwrap().matches(&tree, li));
        assert!(Selector::parse("nav>ul>li").unwrap().matches(&tree, li));
        assert!(!Selector::parse("nav > li").unwrap().matches(&tree, li));
    }

    #[test]
    fn test_invalid_selectors() {
        for input in ["", "[data-x", "[=x]", "div >", "a,,b", "[x~y]", "[x=\"y]", "div!"] {
            assert!(
                matches!(Selector::parse(input), Err(DomError::InvalidSelector { .. })),
                "{input} should not parse"
            );
        }
    }
}
