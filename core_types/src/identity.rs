//! Compiled identity of a schema module

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Revision parse failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RevisionError {
    #[error("revision '{0}' is not of the form YYYY-MM-DD")]
    Malformed(String),
}

/// Schema revision date (`YYYY-MM-DD`)
///
/// Revisions order chronologically; since the format is fixed-width the
/// lexical order of the text is the date order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Revision(String);

impl Revision {
    /// Parses a revision date
    pub fn parse(text: &str) -> Result<Self, RevisionError> {
        let bytes = text.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !well_formed {
            return Err(RevisionError::Malformed(text.to_string()));
        }

        let month: u32 = text[5..7].parse().unwrap_or(0);
        let day: u32 = text[8..10].parse().unwrap_or(0);
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(RevisionError::Malformed(text.to_string()));
        }

        Ok(Self(text.to_string()))
    }

    /// Returns the revision text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Revision {
    type Error = RevisionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Revision> for String {
    fn from(value: Revision) -> Self {
        value.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name and revision a binding was compiled from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleIdentity {
    pub name: String,
    pub revision: Revision,
}

impl ModuleIdentity {
    /// Creates an identity from a module name and revision
    pub fn new(name: impl Into<String>, revision: Revision) -> Self {
        Self {
            name: name.into(),
            revision,
        }
    }

    /// Checks a load request against this identity
    ///
    /// A request without a revision accepts any revision of the module.
    pub fn matches(&self, name: &str, revision: Option<&str>) -> bool {
        self.name == name && revision.map_or(true, |r| self.revision.as_str() == r)
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starter() -> ModuleIdentity {
        ModuleIdentity::new("starter", Revision::parse("2013-03-13").unwrap())
    }

    #[test]
    fn test_revision_parse() {
        assert!(Revision::parse("2013-03-13").is_ok());
        assert!(Revision::parse("2013-3-13").is_err());
        assert!(Revision::parse("2013-13-01").is_err());
        assert!(Revision::parse("2013-00-10").is_err());
        assert!(Revision::parse("abcd-ef-gh").is_err());
        assert!(Revision::parse("").is_err());
    }

    #[test]
    fn test_revision_ordering() {
        let old = Revision::parse("2012-12-31").unwrap();
        let new = Revision::parse("2013-03-13").unwrap();
        assert!(old < new);
    }

    #[test]
    fn test_identity_matches() {
        let id = starter();
        assert!(id.matches("starter", Some("2013-03-13")));
        assert!(id.matches("starter", None));
        assert!(!id.matches("starter", Some("2014-01-01")));
        assert!(!id.matches("vnf_starter", None));
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(starter().to_string(), "starter@2013-03-13");
    }

    #[test]
    fn test_identity_serde() {
        let json = serde_json::to_string(&starter()).unwrap();
        assert_eq!(json, r#"{"name":"starter","revision":"2013-03-13"}"#);
        let bad: Result<ModuleIdentity, _> =
            serde_json::from_str(r#"{"name":"starter","revision":"today"}"#);
        assert!(bad.is_err());
    }
}
