use serde::{Deserialize, Serialize};

/// An optional string that distinguishes absent, blank, and meaningful values.
///
/// "Blank" means empty or all-whitespace. The raw text is kept for blank
/// values so that, for example, a whitespace-only inline file is still
/// uploaded byte-for-byte.
///
/// Serialized as `Option<String>`; pair with `#[serde(default)]` so that a
/// missing key becomes [`TextField::Unset`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum TextField {
    #[default]
    Unset,
    Blank(String),
    Value(String),
}

impl TextField {
    /// Classify an optional string.
    pub fn new(raw: Option<String>) -> Self {
        match raw {
            None => Self::Unset,
            Some(s) if s.trim().is_empty() => Self::Blank(s),
            Some(s) => Self::Value(s),
        }
    }

    /// Returns `true` if no value was supplied at all.
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns `true` if a value was supplied, even a blank one.
    pub fn is_set(&self) -> bool {
        !self.is_unset()
    }

    /// Returns `true` if the field is absent or all-whitespace.
    pub fn is_blank(&self) -> bool {
        !matches!(self, Self::Value(_))
    }

    /// The value, only when it is non-blank.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(s) => Some(s),
            _ => None,
        }
    }

    /// The raw supplied text, blank or not.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Unset => None,
            Self::Blank(s) | Self::Value(s) => Some(s),
        }
    }
}

impl From<Option<String>> for TextField {
    fn from(raw: Option<String>) -> Self {
        Self::new(raw)
    }
}

impl From<TextField> for Option<String> {
    fn from(field: TextField) -> Self {
        match field {
            TextField::Unset => None,
            TextField::Blank(s) | TextField::Value(s) => Some(s),
        }
    }
}

impl From<String> for TextField {
    fn from(s: String) -> Self {
        Self::new(Some(s))
    }
}

impl From<&str> for TextField {
    fn from(s: &str) -> Self {
        Self::new(Some(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(TextField::new(None), TextField::Unset);
        assert_eq!(TextField::new(Some(String::new())), TextField::Blank(String::new()));
        assert_eq!(TextField::from(" \t\n"), TextField::Blank(" \t\n".into()));
        assert_eq!(TextField::from("a.txt"), TextField::Value("a.txt".into()));
    }

    #[test]
    fn blank_keeps_raw_text() {
        let field = TextField::from("  ");
        assert!(field.is_set());
        assert!(field.is_blank());
        assert_eq!(field.value(), None);
        assert_eq!(field.raw(), Some("  "));
    }

    #[test]
    fn unset_is_blank_but_not_set() {
        let field = TextField::Unset;
        assert!(field.is_blank());
        assert!(!field.is_set());
        assert_eq!(field.raw(), None);
    }

    #[test]
    fn serde_as_optional_string() {
        let json = serde_json::to_string(&TextField::from("x")).unwrap();
        assert_eq!(json, "\"x\"");
        let unset = serde_json::to_string(&TextField::Unset).unwrap();
        assert_eq!(unset, "null");
        let parsed: TextField = serde_json::from_str("\"  \"").unwrap();
        assert_eq!(parsed, TextField::Blank("  ".into()));
    }
}
