use std::fmt;

/// A hierarchical store key such as `/ledgerRoot/b/photos`.
///
/// Keys always start with `/` and never end with one (except the root key
/// `/` itself). Empty segments are dropped.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Build a key from a path, normalising slashes.
    pub fn new(path: &str) -> Self {
        let mut out = String::with_capacity(path.len() + 1);
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            out.push('/');
            out.push_str(segment);
        }
        if out.is_empty() {
            out.push('/');
        }
        Self(out)
    }

    /// The root key `/`.
    pub fn root() -> Self {
        Self("/".into())
    }

    /// Append a single child segment. The segment is taken verbatim, so it
    /// must be non-empty and free of `/` for [`Key::name`] to return it.
    pub fn child(&self, name: &str) -> Self {
        if self.is_root() {
            Self(format!("/{name}"))
        } else {
            Self(format!("{}/{name}", self.0))
        }
    }

    /// Append all segments of `other` below this key.
    pub fn join(&self, other: &Key) -> Self {
        if other.is_root() {
            return self.clone();
        }
        if self.is_root() {
            return other.clone();
        }
        Self(format!("{}{}", self.0, other.0))
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Returns `true` if `self` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &Key) -> bool {
        if ancestor.is_root() {
            return !self.is_root();
        }
        self.0
            .strip_prefix(ancestor.as_str())
            .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1)
    }

    /// The last path segment.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0)
    }
}

impl From<&str> for Key {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}
