//! The CSS subset used by the lookup tables.
//!
//! The browser backend hands [`Selector::css`] straight to `querySelector`;
//! the parsed steps only exist so the headless document can match the same
//! strings.

use std::fmt;

use crate::utils::errors::{OverlayError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeTest {
    Present,
    Equals(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub test: AttributeTest,
}

/// Tag, id, classes and attribute tests that must all hold for one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    css: String,
    /// Left-to-right compounds; `steps[i].0` links step `i` to step `i - 1`.
    steps: Vec<(Combinator, Compound)>,
}

impl Selector {
    pub fn parse(css: &str) -> Result<Self> {
        let mut parser = Parser {
            source: css,
            chars: css.char_indices().peekable(),
        };
        let steps = parser.parse()?;
        Ok(Self {
            css: css.trim().to_string(),
            steps,
        })
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn steps(&self) -> &[(Combinator, Compound)] {
        &self.steps
    }

    /// Match against an element described through `view`, walking ancestors
    /// for the combinators.
    pub fn matches_with<N: Copy>(&self, node: N, view: &impl ElementView<N>) -> bool {
        match_from(&self.steps, self.steps.len() - 1, node, view)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css)
    }
}

/// Read access a matcher needs into a tree.
pub trait ElementView<N: Copy> {
    fn tag(&self, node: N) -> Option<String>;
    fn attr(&self, node: N, name: &str) -> Option<String>;
    fn parent(&self, node: N) -> Option<N>;
}

impl Compound {
    pub fn matches<N: Copy>(&self, node: N, view: &impl ElementView<N>) -> bool {
        if let Some(tag) = &self.tag {
            match view.tag(node) {
                Some(actual) if actual.eq_ignore_ascii_case(tag) => {}
                _ => return false,
            }
        }

        if let Some(id) = &self.id
            && view.attr(node, "id").as_deref() != Some(id.as_str())
        {
            return false;
        }

        if !self.classes.is_empty() {
            let class_attr = view.attr(node, "class").unwrap_or_default();
            let tokens: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| tokens.contains(&c.as_str())) {
                return false;
            }
        }

        self.attributes.iter().all(|a| {
            let Some(value) = view.attr(node, &a.name) else {
                return false;
            };
            match &a.test {
                AttributeTest::Present => true,
                AttributeTest::Equals(expected) => &value == expected,
                AttributeTest::Contains(needle) => value.contains(needle.as_str()),
            }
        })
    }
}

fn match_from<N: Copy>(
    steps: &[(Combinator, Compound)],
    index: usize,
    node: N,
    view: &impl ElementView<N>,
) -> bool {
    let (combinator, compound) = &steps[index];
    if !compound.matches(node, view) {
        return false;
    }
    if index == 0 {
        return true;
    }

    match combinator {
        Combinator::Child => view
            .parent(node)
            .is_some_and(|parent| match_from(steps, index - 1, parent, view)),
        Combinator::Descendant => {
            let mut current = view.parent(node);
            while let Some(ancestor) = current {
                if match_from(steps, index - 1, ancestor, view) {
                    return true;
                }
                current = view.parent(ancestor);
            }
            false
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> OverlayError {
        OverlayError::InvalidSelector {
            selector: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn parse(&mut self) -> Result<Vec<(Combinator, Compound)>> {
        let mut steps = Vec::new();
        let mut combinator = Combinator::Descendant;

        loop {
            let saw_space = self.skip_whitespace();
            match self.chars.peek().map(|(_, c)| *c) {
                None => break,
                Some('>') => {
                    if steps.is_empty() {
                        return Err(self.error("leading combinator"));
                    }
                    self.chars.next();
                    self.skip_whitespace();
                    combinator = Combinator::Child;
                    continue;
                }
                Some(_) => {
                    if !steps.is_empty() && !saw_space && combinator == Combinator::Descendant {
                        return Err(self.error("unexpected character"));
                    }
                }
            }

            let compound = self.compound()?;
            steps.push((combinator, compound));
            combinator = Combinator::Descendant;
        }

        if steps.is_empty() {
            return Err(self.error("empty selector"));
        }
        if combinator == Combinator::Child {
            return Err(self.error("trailing combinator"));
        }
        Ok(steps)
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some((_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || *c == '-' || *c == '_' {
                ident.push(*c);
                self.chars.next();
            } else {
                break;
            }
        }
        ident
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let mut empty = true;

        if self.chars.peek().is_some_and(|(_, c)| c.is_alphabetic() || *c == '*') {
            if self.chars.peek().is_some_and(|(_, c)| *c == '*') {
                self.chars.next();
            } else {
                compound.tag = Some(self.ident().to_ascii_lowercase());
            }
            empty = false;
        }

        while let Some((_, c)) = self.chars.peek().copied() {
            match c {
                '#' => {
                    self.chars.next();
                    let id = self.ident();
                    if id.is_empty() {
                        return Err(self.error("empty id"));
                    }
                    compound.id = Some(id);
                }
                '.' => {
                    self.chars.next();
                    let class = self.ident();
                    if class.is_empty() {
                        return Err(self.error("empty class"));
                    }
                    compound.classes.push(class);
                }
                '[' => {
                    self.chars.next();
                    compound.attributes.push(self.attribute()?);
                }
                _ => break,
            }
            empty = false;
        }

        if empty {
            return Err(self.error("expected a compound selector"));
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<AttributeSelector> {
        self.skip_whitespace();
        let name = self.ident();
        if name.is_empty() {
            return Err(self.error("empty attribute name"));
        }
        self.skip_whitespace();

        let test = match self.chars.next().map(|(_, c)| c) {
            Some(']') => return Ok(AttributeSelector {
                name,
                test: AttributeTest::Present,
            }),
            Some('=') => AttributeTest::Equals(self.attribute_value()?),
            Some('*') => {
                if self.chars.next().map(|(_, c)| c) != Some('=') {
                    return Err(self.error("expected `*=`"));
                }
                AttributeTest::Contains(self.attribute_value()?)
            }
            _ => return Err(self.error("unsupported attribute operator")),
        };

        self.skip_whitespace();
        if self.chars.next().map(|(_, c)| c) != Some(']') {
            return Err(self.error("unterminated attribute selector"));
        }
        Ok(AttributeSelector { name, test })
    }

    fn attribute_value(&mut self) -> Result<String> {
        self.skip_whitespace();
        match self.chars.peek().map(|(_, c)| *c) {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                let mut value = String::new();
                for (_, c) in self.chars.by_ref() {
                    if c == quote {
                        return Ok(value);
                    }
                    value.push(c);
                }
                Err(self.error("unterminated string"))
            }
            _ => {
                let value = self.ident();
                if value.is_empty() {
                    return Err(self.error("empty attribute value"));
                }
                Ok(value)
            }
        }
    }
}
