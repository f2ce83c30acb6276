//! Element Attributes
//!
//! Ordered attribute storage: get, set, remove, has, boolean flags.

/// Single attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

/// Attribute list of one element, kept in insertion order.
///
/// Names are ASCII-lowercased on the way in, matching HTML attribute
/// semantics. Elements rarely carry more than a handful of attributes so a
/// linear scan beats a map here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<Attr>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get attribute value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Set attribute, returning the previous value if there was one
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        if let Some(attr) = self.entries.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
            return Some(std::mem::replace(&mut attr.value, value));
        }
        self.entries.push(Attr {
            name: name.to_ascii_lowercase(),
            value,
        });
        None
    }

    /// Remove attribute by name
    pub fn remove(&mut self, name: &str) -> Option<Attr> {
        let index = self.entries.iter().position(|a| a.name.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(index))
    }

    /// Check if attribute exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Set or clear a boolean attribute (`controls`, `muted`, ...)
    pub fn set_flag(&mut self, name: &str, on: bool) {
        if on {
            if !self.contains(name) {
                self.set(name, "");
            }
        } else {
            self.remove(name);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.entries.iter()
    }
}
