use serde::{Deserialize, Serialize};

/// A label field that openFDA usually sends as an array of strings but
/// occasionally as a bare string or `null`.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StringOrVec {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl StringOrVec {
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Single(value) => Some(value.as_str()),
            Self::Multiple(values) => values.first().map(|value| value.as_str()),
        }
    }

    /// First element, treating an empty string as missing.
    pub fn first_text(&self) -> Option<&str> {
        self.first().filter(|value| !value.is_empty())
    }
}
