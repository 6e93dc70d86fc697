//! Language tags and language ranges (RFC 4646 / RFC 4647).

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A language tag such as `en-GB`.
///
/// Comparison, ordering and hashing are case-insensitive; the original
/// spelling is kept for output.
#[derive(Debug, Clone)]
pub struct LanguageTag {
    text: String,
    match_str: String,
}

impl LanguageTag {
    /// Parses a language tag.
    ///
    /// # Errors
    /// Returns [`Error::MalformedLanguage`] for empty input or empty subtags.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() || text.split('-').any(str::is_empty) || text.contains(char::is_whitespace)
        {
            return Err(Error::MalformedLanguage {
                value: text.to_string(),
            });
        }
        Ok(Self {
            text: text.to_string(),
            match_str: text.to_ascii_lowercase(),
        })
    }

    /// The tag as originally spelled.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The lowercased form used for matching.
    #[must_use]
    pub fn match_str(&self) -> &str {
        &self.match_str
    }
}

impl PartialEq for LanguageTag {
    fn eq(&self, other: &Self) -> bool {
        self.match_str == other.match_str
    }
}

impl Eq for LanguageTag {}

impl PartialOrd for LanguageTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LanguageTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.match_str.cmp(&other.match_str)
    }
}

impl Hash for LanguageTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.match_str.hash(state);
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A basic language range such as `en`, `de-CH` or the wildcard `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageRange {
    match_str: String,
}

impl LanguageRange {
    /// The wildcard range, matching every tag.
    #[must_use]
    pub fn wildcard() -> Self {
        Self {
            match_str: "*".to_string(),
        }
    }

    /// Parses a basic language range.
    ///
    /// # Errors
    /// Returns [`Error::MalformedLanguage`] for empty input or empty subtags.
    pub fn parse(text: &str) -> Result<Self> {
        if text == "*" {
            return Ok(Self::wildcard());
        }
        LanguageTag::parse(text).map(|tag| Self {
            match_str: tag.match_str,
        })
    }

    /// Returns true for the wildcard range.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.match_str == "*"
    }

    /// Removes the rightmost subtag, as lookup does on a miss.
    ///
    /// Returns `None` if there is only one subtag left (or for the wildcard).
    #[must_use]
    pub fn strip_rightmost(&self) -> Option<Self> {
        if self.is_wildcard() {
            return None;
        }
        let mut parts: Vec<&str> = self.match_str.split('-').collect();
        parts.pop();
        // a single-character subtag cannot stand at the end of a range
        while parts.last().is_some_and(|p| p.len() == 1) {
            parts.pop();
        }
        if parts.is_empty() {
            None
        } else {
            Some(Self {
                match_str: parts.join("-"),
            })
        }
    }

    /// RFC 4647 basic filtering: the tag equals the range or starts with the
    /// range followed by `-`.
    #[must_use]
    pub fn matches(&self, tag: &LanguageTag) -> bool {
        if self.is_wildcard() {
            return true;
        }
        let tag = tag.match_str();
        tag == self.match_str
            || (tag.len() > self.match_str.len()
                && tag.starts_with(&self.match_str)
                && tag.as_bytes()[self.match_str.len()] == b'-')
    }
}

impl fmt::Display for LanguageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.match_str)
    }
}

/// Selects one language from `available` for the given priority list.
///
/// Ranges are tried in order. Each range is first matched exactly, then by
/// basic filtering (first match in `available` order), and on a miss it is
/// truncated by one subtag and tried again.
#[must_use]
pub fn lookup_language<'a>(
    available: &[&'a LanguageTag],
    ranges: &[LanguageRange],
) -> Option<&'a LanguageTag> {
    for range in ranges {
        if range.is_wildcard() {
            if let Some(first) = available.first() {
                return Some(first);
            }
            continue;
        }
        let mut current = Some(range.clone());
        while let Some(range) = current {
            if let Some(exact) = available
                .iter()
                .find(|tag| tag.match_str() == range.match_str)
            {
                return Some(exact);
            }
            if let Some(prefixed) = available.iter().find(|tag| range.matches(tag)) {
                return Some(prefixed);
            }
            current = range.strip_rightmost();
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(s: &str) -> LanguageTag {
        LanguageTag::parse(s).unwrap()
    }

    fn range(s: &str) -> LanguageRange {
        LanguageRange::parse(s).unwrap()
    }

    #[test]
    fn test_tag_is_case_insensitive() {
        assert_eq!(tag("en-GB"), tag("en-gb"));
        assert_eq!(tag("en-GB").to_string(), "en-GB");
    }

    #[test]
    fn test_malformed_tags() {
        assert!(LanguageTag::parse("").is_err());
        assert!(LanguageTag::parse("en-").is_err());
        assert!(LanguageTag::parse("en GB").is_err());
    }

    #[test]
    fn test_basic_filter() {
        assert!(range("en").matches(&tag("en-GB")));
        assert!(range("en").matches(&tag("en")));
        assert!(!range("en-GB").matches(&tag("en")));
        assert!(!range("en").matches(&tag("eng")));
        assert!(LanguageRange::wildcard().matches(&tag("fr")));
    }

    #[test]
    fn test_strip_rightmost() {
        assert_eq!(range("de-ch").strip_rightmost(), Some(range("de")));
        assert_eq!(range("zh-hant-x-foo").strip_rightmost(), Some(range("zh-hant")));
        assert_eq!(range("de").strip_rightmost(), None);
    }

    #[test]
    fn test_lookup_prefers_exact_match() {
        let en_gb = tag("en-GB");
        let en = tag("en");
        let available = [&en_gb, &en];
        assert_eq!(lookup_language(&available, &[range("en")]), Some(&en));
        assert_eq!(lookup_language(&available, &[range("en-us")]), Some(&en));
        assert_eq!(lookup_language(&available, &[range("en-gb")]), Some(&en_gb));
    }

    #[test]
    fn test_lookup_falls_back_through_ranges() {
        let de = tag("de-DE");
        let fr = tag("fr");
        let available = [&fr, &de];
        assert_eq!(
            lookup_language(&available, &[range("in"), range("de-ch")]),
            Some(&de)
        );
        assert_eq!(lookup_language(&available, &[range("it")]), None);
    }
}
