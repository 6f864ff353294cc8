//! Hierarchical datastore keys
//!
//! A [`Key`] is a path-like identifier such as `/user/1/profile`. The
//! backend receives only its flat string form; no structure survives the
//! trip, so round-tripping relies on the normalization here being stable.

use std::fmt;

/// An opaque hierarchical key with a stable string serialization.
///
/// Normalization rules: a leading `/` is guaranteed, trailing slashes are
/// stripped, empty input becomes the root key `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(String);

impl Key {
    /// Create a key, normalizing the string form
    pub fn new(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();
        let trimmed = s.trim_end_matches('/');
        if trimmed.is_empty() {
            return Key("/".to_string());
        }
        if trimmed.starts_with('/') {
            Key(trimmed.to_string())
        } else {
            Key(format!("/{trimmed}"))
        }
    }

    /// The literal string sent to the backend
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a path component, e.g. `/user` + `1` -> `/user/1`
    pub fn child(&self, component: impl AsRef<str>) -> Self {
        let component = component.as_ref().trim_matches('/');
        if self.0 == "/" {
            Key::new(format!("/{component}"))
        } else {
            Key::new(format!("{}/{component}", self.0))
        }
    }

    /// True if `other` sits strictly below this key in the hierarchy
    pub fn is_ancestor_of(&self, other: &Key) -> bool {
        if self.0 == "/" {
            return other.0 != "/";
        }
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::new(s)
    }
}
