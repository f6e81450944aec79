//! The subset of CSS selectors the storefront markup needs: comma lists of
//! compound selectors made of a tag, `#id`, `.class`, `[attr]`,
//! `[attr="v"]` and `[attr^="v"]`. Combinators are rejected.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported selector syntax at '{0}'")]
    Unsupported(String),
    #[error("unterminated attribute selector in '{0}'")]
    Unterminated(String),
}

pub trait Subject {
    fn tag_name(&self) -> &str;
    fn attr(&self, name: &str) -> Option<&str>;

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<Compound>);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Id(String),
    Class(String),
    Attr { name: String, op: AttrOp },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let compounds = input
            .split(',')
            .map(|piece| parse_compound(piece.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(compounds))
    }

    pub fn matches(&self, subject: &dyn Subject) -> bool {
        self.0.iter().any(|compound| compound.matches(subject))
    }
}

impl Compound {
    fn matches(&self, subject: &dyn Subject) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(subject.tag_name()) {
                return false;
            }
        }
        self.parts.iter().all(|part| match part {
            Part::Id(id) => subject.attr("id") == Some(id.as_str()),
            Part::Class(class) => subject.has_class(class),
            Part::Attr { name, op } => match (op, subject.attr(name)) {
                (_, None) => false,
                (AttrOp::Exists, Some(_)) => true,
                (AttrOp::Equals(expected), Some(actual)) => actual == expected,
                (AttrOp::Prefix(prefix), Some(actual)) => {
                    !prefix.is_empty() && actual.starts_with(prefix.as_str())
                }
            },
        })
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

fn take_ident(input: &str) -> (&str, &str) {
    let end = input
        .find(|ch: char| !is_ident_char(ch))
        .unwrap_or(input.len());
    input.split_at(end)
}

fn parse_compound(input: &str) -> Result<Compound, SelectorError> {
    if input.is_empty() {
        return Err(SelectorError::Empty);
    }

    let (tag, mut rest) = if let Some(stripped) = input.strip_prefix('*') {
        (None, stripped)
    } else {
        let (ident, rest) = take_ident(input);
        ((!ident.is_empty()).then(|| ident.to_ascii_lowercase()), rest)
    };

    let mut parts = Vec::new();
    while let Some(first) = rest.chars().next() {
        match first {
            '.' | '#' => {
                let (ident, tail) = take_ident(&rest[1..]);
                if ident.is_empty() {
                    return Err(SelectorError::Unsupported(rest.to_string()));
                }
                parts.push(if first == '.' {
                    Part::Class(ident.to_string())
                } else {
                    Part::Id(ident.to_string())
                });
                rest = tail;
            }
            '[' => {
                let close = rest
                    .find(']')
                    .ok_or_else(|| SelectorError::Unterminated(input.to_string()))?;
                parts.push(parse_attribute(&rest[1..close], input)?);
                rest = &rest[close + 1..];
            }
            _ => return Err(SelectorError::Unsupported(rest.to_string())),
        }
    }

    Ok(Compound { tag, parts })
}

fn parse_attribute(inner: &str, whole: &str) -> Result<Part, SelectorError> {
    let inner = inner.trim();
    let (name, tail) = take_ident(inner);
    if name.is_empty() {
        return Err(SelectorError::Unsupported(whole.to_string()));
    }
    let name = name.to_ascii_lowercase();
    let tail = tail.trim_start();

    let op = if tail.is_empty() {
        AttrOp::Exists
    } else if let Some(value) = tail.strip_prefix("^=") {
        AttrOp::Prefix(unquote(value.trim(), whole)?)
    } else if let Some(value) = tail.strip_prefix('=') {
        AttrOp::Equals(unquote(value.trim(), whole)?)
    } else {
        return Err(SelectorError::Unsupported(whole.to_string()));
    };

    Ok(Part::Attr { name, op })
}

fn unquote(value: &str, whole: &str) -> Result<String, SelectorError> {
    for quote in ['"', '\''] {
        if let Some(stripped) = value.strip_prefix(quote) {
            return stripped
                .strip_suffix(quote)
                .map(str::to_string)
                .ok_or_else(|| SelectorError::Unterminated(whole.to_string()));
        }
    }
    if !value.is_empty() && value.chars().all(is_ident_char) {
        Ok(value.to_string())
    } else {
        Err(SelectorError::Unsupported(whole.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/selector_tests.rs"]
mod tests;
