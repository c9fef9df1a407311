//! Locales for localized node names.

use std::fmt;

/// A locale tag such as `en` or `nl_NL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The language part of the tag (`nl` for `nl_NL`).
    pub fn language(&self) -> &str {
        self.0.split(['_', '-']).next().unwrap_or(&self.0)
    }

    /// The locale of the running process.
    ///
    /// Consults `LC_ALL`, `LC_MESSAGES` and `LANG` in that order, taking the
    /// first one that is set and non-empty. Falls back to `en`.
    pub fn system_default() -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.is_empty())
            .and_then(|value| Self::from_posix(&value))
            .unwrap_or_else(|| Self::new("en"))
    }

    /// Parses a POSIX locale value (`nl_NL.UTF-8@euro`), dropping the
    /// encoding and modifier. The `C` and `POSIX` locales carry no language
    /// and yield `None`.
    pub fn from_posix(value: &str) -> Option<Self> {
        let tag = value.split(['.', '@']).next().unwrap_or_default().trim();
        match tag {
            "" | "C" | "POSIX" => None,
            tag => Some(Self::new(tag)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of a localized name: either "no particular locale" or a specific one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Localized {
    locale: Option<Locale>,
}

impl Localized {
    pub fn unspecified() -> Self {
        Self { locale: None }
    }

    pub fn of(locale: Locale) -> Self {
        Self { locale: Some(locale) }
    }

    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }
}

impl From<Option<Locale>> for Localized {
    fn from(locale: Option<Locale>) -> Self {
        Self { locale }
    }
}
