//! Content filtering by expansion range and feature flags
//!
//! Rows carry their own filter metadata; whether a row is visible is decided
//! each time it is read, so a policy change needs no reload.

use std::collections::BTreeSet;

/// Filter metadata borrowed from a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentFlags<'a> {
    pub min_expansion: i8,
    pub max_expansion: i8,
    /// Comma-separated flags that must all be enabled
    pub content_flags: Option<&'a str>,
    /// Comma-separated flags that must all be disabled
    pub content_flags_disabled: Option<&'a str>,
}

impl Default for ContentFlags<'_> {
    fn default() -> Self {
        Self {
            min_expansion: -1,
            max_expansion: -1,
            content_flags: None,
            content_flags_disabled: None,
        }
    }
}

/// Rows that carry content filter metadata
pub trait ContentFiltered {
    fn content_flags(&self) -> ContentFlags<'_>;
}

/// Visibility policy consulted at read time
pub trait ContentFilter {
    fn passes(&self, flags: &ContentFlags<'_>) -> bool;
}

/// Expansion and flag based content policy
#[derive(Debug, Clone, PartialEq)]
pub struct ContentService {
    /// `-1` disables expansion range checks
    current_expansion: i8,
    enabled_flags: BTreeSet<String>,
}

impl ContentService {
    pub fn new(current_expansion: i8) -> Self {
        Self {
            current_expansion,
            enabled_flags: BTreeSet::new(),
        }
    }

    pub fn with_flags<I, S>(current_expansion: i8, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut service = Self::new(current_expansion);
        for flag in flags {
            service.enable_flag(flag);
        }
        service
    }

    pub fn current_expansion(&self) -> i8 {
        self.current_expansion
    }

    pub fn set_current_expansion(&mut self, expansion: i8) {
        self.current_expansion = expansion;
    }

    pub fn enable_flag(&mut self, flag: impl Into<String>) {
        let flag = flag.into();
        let flag = flag.trim();
        if !flag.is_empty() {
            self.enabled_flags.insert(flag.to_string());
        }
    }

    pub fn disable_flag(&mut self, flag: &str) {
        self.enabled_flags.remove(flag.trim());
    }

    pub fn is_flag_enabled(&self, flag: &str) -> bool {
        self.enabled_flags.contains(flag)
    }

    pub fn enabled_flags(&self) -> impl Iterator<Item = &str> {
        self.enabled_flags.iter().map(String::as_str)
    }
}

impl Default for ContentService {
    fn default() -> Self {
        Self::new(-1)
    }
}

impl ContentFilter for ContentService {
    fn passes(&self, flags: &ContentFlags<'_>) -> bool {
        if self.current_expansion >= 0 {
            if flags.min_expansion >= 0 && flags.min_expansion > self.current_expansion {
                return false;
            }
            if flags.max_expansion >= 0 && flags.max_expansion < self.current_expansion {
                return false;
            }
        }

        if split_flags(flags.content_flags).any(|f| !self.is_flag_enabled(f)) {
            return false;
        }

        !split_flags(flags.content_flags_disabled).any(|f| self.is_flag_enabled(f))
    }
}

fn split_flags(list: Option<&str>) -> impl Iterator<Item = &str> {
    list.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expansion(min: i8, max: i8) -> ContentFlags<'static> {
        ContentFlags {
            min_expansion: min,
            max_expansion: max,
            ..Default::default()
        }
    }

    #[test]
    fn test_unbounded_passes_everything() {
        let service = ContentService::new(5);
        assert!(service.passes(&ContentFlags::default()));
    }

    #[test]
    fn test_expansion_range() {
        let service = ContentService::new(5);
        assert!(service.passes(&expansion(0, 5)));
        assert!(service.passes(&expansion(5, -1)));
        assert!(!service.passes(&expansion(6, -1)));
        assert!(!service.passes(&expansion(-1, 4)));
    }

    #[test]
    fn test_expansion_checks_skipped_when_unset() {
        let service = ContentService::default();
        assert!(service.passes(&expansion(9, 9)));
    }

    #[test]
    fn test_required_flags_must_all_be_enabled() {
        let mut service = ContentService::with_flags(0, ["peq_halloween"]);
        let flags = ContentFlags {
            content_flags: Some("peq_halloween, peq_winter"),
            ..Default::default()
        };
        assert!(!service.passes(&flags));

        service.enable_flag("peq_winter");
        assert!(service.passes(&flags));
    }

    #[test]
    fn test_disabled_flags_block_when_enabled() {
        let mut service = ContentService::with_flags(0, ["legacy_loot"]);
        let flags = ContentFlags {
            content_flags_disabled: Some("legacy_loot"),
            ..Default::default()
        };
        assert!(!service.passes(&flags));

        service.disable_flag("legacy_loot");
        assert!(service.passes(&flags));
    }

    #[test]
    fn test_blank_flag_items_ignored() {
        let service = ContentService::new(0);
        let flags = ContentFlags {
            content_flags: Some(" , ,"),
            ..Default::default()
        };
        assert!(service.passes(&flags));
    }
}
