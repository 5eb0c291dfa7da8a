//! Index-chain locations into a language section.

use std::fmt;

/// A language-independent position of a leaf inside a section.
///
/// Expressed purely as structural indices: the dropdown position, the
/// chain of group indices leading to the leaf, and the leaf's position
/// among its immediate siblings. Labels never appear, so the same location
/// can be reproduced in a target-language tree whose labels are all
/// translated.
///
/// A location is only valid against the tree it was extracted from; it
/// must not be replayed literally against a tree of different shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Index of the dropdown within the section.
    pub dropdown: usize,
    /// Chain of group indices, outermost first. Each index points into the
    /// `pages` array of the level above.
    pub groups: Vec<usize>,
    /// Position within the immediate parent's `pages` array.
    pub index: usize,
}

impl Location {
    /// Location of a leaf directly under a dropdown.
    #[must_use]
    pub fn top_level(dropdown: usize, index: usize) -> Self {
        Self {
            dropdown,
            groups: Vec::new(),
            index,
        }
    }

    /// Nesting depth of the leaf's group chain.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.groups.len()
    }

    /// Whether two locations share the same structural parent (dropdown
    /// and group chain), ignoring sibling position.
    #[must_use]
    pub fn same_parent(&self, other: &Self) -> bool {
        self.dropdown == other.dropdown && self.groups == other.groups
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dropdown[{}]", self.dropdown)?;
        for g in &self.groups {
            write!(f, ".pages[{g}]")?;
        }
        write!(f, ".pages[{}]", self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_parent_ignores_index() {
        let a = Location {
            dropdown: 0,
            groups: vec![1, 2],
            index: 0,
        };
        let b = Location {
            dropdown: 0,
            groups: vec![1, 2],
            index: 5,
        };
        assert!(a.same_parent(&b));
    }

    #[test]
    fn test_same_parent_detects_moved_chain() {
        let a = Location::top_level(0, 3);
        let b = Location {
            dropdown: 0,
            groups: vec![0],
            index: 3,
        };
        assert!(!a.same_parent(&b));
    }

    #[test]
    fn test_display() {
        let loc = Location {
            dropdown: 1,
            groups: vec![0, 2],
            index: 4,
        };
        assert_eq!(loc.to_string(), "dropdown[1].pages[0].pages[2].pages[4]");
    }
}
