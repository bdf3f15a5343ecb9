//! XML-safe owned text
//!
//! Every textual leaf, operation field and notification field is carried as
//! an [`XmlString`]. Construction validates that the text only contains
//! characters permitted by XML 1.0, so the agent can always encode it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when text cannot be represented in XML
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum XmlStringError {
    #[error("character U+{codepoint:04X} at byte {offset} is not allowed in XML")]
    IllegalCharacter { codepoint: u32, offset: usize },
}

/// Owned, XML-safe string
///
/// `Clone` duplicates the underlying buffer: two owners never share a
/// value. An empty `XmlString` is a real value and is distinct from an
/// absent leaf (`None`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct XmlString(String);

impl XmlString {
    /// Validates and takes ownership of `text`
    pub fn new(text: impl Into<String>) -> Result<Self, XmlStringError> {
        let text = text.into();
        validate(&text)?;
        Ok(Self(text))
    }

    /// Creates an empty string
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Returns the text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the string is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the text with XML markup characters replaced by entities
    pub fn escaped(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        for c in self.0.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&apos;"),
                other => out.push(other),
            }
        }
        out
    }

    /// Consumes the string, returning the inner buffer
    pub fn into_string(self) -> String {
        self.0
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn validate(text: &str) -> Result<(), XmlStringError> {
    match text.char_indices().find(|(_, c)| !is_xml_char(*c)) {
        Some((offset, c)) => Err(XmlStringError::IllegalCharacter {
            codepoint: c as u32,
            offset,
        }),
        None => Ok(()),
    }
}

impl TryFrom<String> for XmlString {
    type Error = XmlStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for XmlString {
    type Error = XmlStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<XmlString> for String {
    fn from(value: XmlString) -> Self {
        value.0
    }
}

impl AsRef<str> for XmlString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for XmlString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for XmlString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for XmlString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
