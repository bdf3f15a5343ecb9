//! Identifier tables
//!
//! Each compiled module carries a table mapping the symbolic name of every
//! schema node (`starter_get_load`) to the canonical string used on the
//! wire (`starter_get-load`). Tables are `'static` and never change.

use tracing::error;

/// Returned by [`IdentifierTable::lookup`] in release builds when a symbol is unknown
pub const UNKNOWN_IDENTIFIER: &str = "<unknown-identifier>";

/// Read-only symbol to node-name table of one module
#[derive(Debug, Clone, Copy)]
pub struct IdentifierTable {
    module: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

impl IdentifierTable {
    /// Creates a table; `entries` must be sorted by symbol
    pub const fn new(
        module: &'static str,
        entries: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self { module, entries }
    }

    /// Returns the module the table belongs to
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Looks a symbol up, `None` if it does not exist
    pub fn get(&self, symbol: &str) -> Option<&'static str> {
        self.entries
            .binary_search_by(|(s, _)| (*s).cmp(symbol))
            .ok()
            .map(|index| self.entries[index].1)
    }

    /// Looks a symbol up
    ///
    /// An unknown symbol is a programming error: debug builds panic,
    /// release builds log and return [`UNKNOWN_IDENTIFIER`].
    pub fn lookup(&self, symbol: &str) -> &'static str {
        match self.get(symbol) {
            Some(name) => name,
            None => {
                debug_assert!(
                    false,
                    "unknown identifier '{}' in module {}",
                    symbol, self.module
                );
                error!(module = self.module, symbol, "Unknown identifier");
                UNKNOWN_IDENTIFIER
            }
        }
    }

    /// Checks whether a symbol exists
    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    /// Checks whether a canonical node name exists
    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.iter().any(|(_, n)| *n == name)
    }

    /// Returns the number of identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(symbol, name)` pairs in symbol order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    /// Checks that symbols are strictly ascending (lookup relies on it)
    pub fn is_well_formed(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].0 < w[1].0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: IdentifierTable = IdentifierTable::new(
        "demo",
        &[
            ("app_name", "appName"),
            ("demo_get_load", "demo_get-load"),
            ("vnf_id", "vnfID"),
        ],
    );

    #[test]
    fn test_lookup_known() {
        assert!(TABLE.is_well_formed());
        assert_eq!(TABLE.lookup("demo_get_load"), "demo_get-load");
        assert_eq!(TABLE.get("vnf_id"), Some("vnfID"));
        assert!(TABLE.contains("app_name"));
        assert!(TABLE.contains_name("vnfID"));
        assert_eq!(TABLE.len(), 3);
    }

    #[test]
    fn test_get_unknown() {
        assert_eq!(TABLE.get("nope"), None);
        assert!(!TABLE.contains("nope"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unknown identifier 'nope' in module demo")]
    fn test_lookup_unknown_panics_in_debug() {
        TABLE.lookup("nope");
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_lookup_unknown_returns_sentinel_in_release() {
        assert_eq!(TABLE.lookup("nope"), UNKNOWN_IDENTIFIER);
    }

    #[test]
    fn test_unsorted_table_detected() {
        let table = IdentifierTable::new("bad", &[("b", "b"), ("a", "a")]);
        assert!(!table.is_well_formed());
    }
}
