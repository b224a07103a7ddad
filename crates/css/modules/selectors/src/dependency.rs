//! The class and id tokens a selector depends on.

use std::collections::BTreeSet;

/// Class and id names a selector textually references.
///
/// Empty sets mean "no class/id hook found". That is not the same as
/// "always matches": callers decide how to treat an empty dependency.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorDependency {
    /// Class names, without the leading `.`.
    classes: BTreeSet<String>,
    /// Id names, without the leading `#`.
    ids: BTreeSet<String>,
}

impl SelectorDependency {
    /// An empty dependency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a class name.
    pub fn add_class(&mut self, name: impl Into<String>) {
        self.classes.insert(name.into());
    }

    /// Record an id name.
    pub fn add_id(&mut self, name: impl Into<String>) {
        self.ids.insert(name.into());
    }

    /// Union `other` into `self`.
    pub fn merge(&mut self, other: Self) {
        self.classes.extend(other.classes);
        self.ids.extend(other.ids);
    }

    /// Class names in sorted order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Id names in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    #[inline]
    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    #[inline]
    pub fn has_id(&self, name: &str) -> bool {
        self.ids.contains(name)
    }

    /// True when neither a class nor an id was found.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.ids.is_empty()
    }
}

impl<Name: Into<String>> FromIterator<(char, Name)> for SelectorDependency {
    /// Collect `('.', name)` and `('#', name)` pairs. Other markers are ignored.
    fn from_iter<Iter: IntoIterator<Item = (char, Name)>>(iter: Iter) -> Self {
        let mut dependency = Self::new();
        for (marker, name) in iter {
            match marker {
                '.' => dependency.add_class(name),
                '#' => dependency.add_id(name),
                _ => {}
            }
        }
        dependency
    }
}
