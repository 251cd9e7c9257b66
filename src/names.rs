//! Symbol table mapping identifier text to interned [`Name`] handles.
//!
//! Every identifier seen by the scanner is interned once; afterwards the
//! parser, network and monitors compare and index by handle only.

use std::collections::HashMap;
use std::fmt;

/// An interned identifier.
///
/// Two names are equal exactly when they were interned from the same text
/// in the same [`Names`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

impl Name {
    /// Raw handle value.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Append-only symbol table.
#[derive(Debug, Clone, Default)]
pub struct Names {
    ids: HashMap<String, Name>,
    strings: Vec<String>,
}

impl Names {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for `text` if it has been interned.
    pub fn query(&self, text: &str) -> Option<Name> {
        self.ids.get(text).copied()
    }

    /// Return the handle for `text`, interning it if absent.
    pub fn lookup(&mut self, text: &str) -> Name {
        if let Some(name) = self.query(text) {
            return name;
        }
        let name = Name(self.strings.len() as u32);
        self.strings.push(text.to_string());
        self.ids.insert(text.to_string(), name);
        name
    }

    /// Intern several strings at once, preserving order.
    pub fn lookup_all<'s>(&mut self, texts: impl IntoIterator<Item = &'s str>) -> Vec<Name> {
        texts.into_iter().map(|text| self.lookup(text)).collect()
    }

    /// Resolve a handle back to its text.
    pub fn get_name_string(&self, name: Name) -> Option<&str> {
        self.strings.get(name.index()).map(String::as_str)
    }

    /// Resolve a handle, falling back to its numeric form for foreign handles.
    pub fn display(&self, name: Name) -> String {
        self.get_name_string(name)
            .map(str::to_string)
            .unwrap_or_else(|| name.to_string())
    }

    /// Number of interned names.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_stable() {
        let mut names = Names::new();
        let a = names.lookup("S1");
        let b = names.lookup("N1");
        assert_ne!(a, b);
        assert_eq!(names.lookup("S1"), a);
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_query_does_not_insert() {
        let mut names = Names::new();
        assert_eq!(names.query("X1"), None);
        assert!(names.is_empty());
        let x1 = names.lookup("X1");
        assert_eq!(names.query("X1"), Some(x1));
    }

    #[test]
    fn test_round_trip_text() {
        let mut names = Names::new();
        let ids = names.lookup_all(["A1", "A2", "A1"]);
        assert_eq!(ids[0], ids[2]);
        assert_eq!(names.get_name_string(ids[1]), Some("A2"));
    }

    #[test]
    fn test_foreign_handle() {
        let mut other = Names::new();
        other.lookup("a");
        other.lookup("b");
        let foreign = other.lookup("c");
        let names = Names::new();
        assert_eq!(names.get_name_string(foreign), None);
        assert_eq!(names.display(foreign), "#2");
    }
}
