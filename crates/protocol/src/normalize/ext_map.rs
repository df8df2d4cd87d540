//! Extension field name mapping
//!
//! Maps record-level extension fields (`extOs`, `extNet`, ...) to the short
//! names they take under the canonical `ext` object.

/// Built-in mapping; collapse follows the record's own field order, not this list
pub const DEFAULT_EXTENSIONS: [(&str, &str); 21] = [
    ("extIngest", "ingest"),
    ("extProtocol", "protocol"),
    ("extUser", "user"),
    ("extDevice", "device"),
    ("extOs", "os"),
    ("extApp", "app"),
    ("extUtc", "utc"),
    ("extXbl", "xbl"),
    ("extJavascript", "js"),
    ("extReceipts", "receipts"),
    ("extNet", "net"),
    ("extSdk", "sdk"),
    ("extLoc", "loc"),
    ("extCloud", "cloud"),
    ("extService", "service"),
    ("extCs", "cs"),
    ("extM365a", "M365a"),
    ("extMscv", "mscv"),
    ("extIntWeb", "intWeb"),
    ("extIntService", "intService"),
    ("extWeb", "web"),
];

/// Immutable-once-built table of extension field → canonical name
///
/// Field names match ASCII case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMap {
    entries: Vec<(String, String)>,
}

impl Default for ExtensionMap {
    fn default() -> Self {
        DEFAULT_EXTENSIONS.into_iter().collect()
    }
}

impl ExtensionMap {
    /// Create an empty map
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a mapping, replacing any existing one for the same field
    pub fn insert(&mut self, field: impl Into<String>, canonical: impl Into<String>) {
        let field = field.into();
        let canonical = canonical.into();
        match self
            .entries
            .iter_mut()
            .find(|(f, _)| f.eq_ignore_ascii_case(&field))
        {
            Some(entry) => entry.1 = canonical,
            None => self.entries.push((field, canonical)),
        }
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, field: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.insert(field, canonical);
        self
    }

    /// Canonical name for a record field, if it is a mapped extension
    pub fn canonical(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f.eq_ignore_ascii_case(field))
            .map(|(_, c)| c.as_str())
    }

    /// Mappings in collapse order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, c)| (f.as_str(), c.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: Into<String>, C: Into<String>> FromIterator<(F, C)> for ExtensionMap {
    fn from_iter<I: IntoIterator<Item = (F, C)>>(iter: I) -> Self {
        let mut map = Self::empty();
        for (field, canonical) in iter {
            map.insert(field, canonical);
        }
        map
    }
}

impl<F: Into<String>, C: Into<String>> Extend<(F, C)> for ExtensionMap {
    fn extend<I: IntoIterator<Item = (F, C)>>(&mut self, iter: I) {
        for (field, canonical) in iter {
            self.insert(field, canonical);
        }
    }
}
