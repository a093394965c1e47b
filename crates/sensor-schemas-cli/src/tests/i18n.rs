// crates/sensor-schemas-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for catalog parity and locale parsing.
// Purpose: Ensure CLI localization remains consistent across supported locales.
// Dependencies: sensor-schemas-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies the message catalogs stay in sync, locale parsing is tolerant, and
//! translated templates keep the English placeholders.

use std::collections::BTreeSet;

use crate::i18n::Locale;
use crate::i18n::SUPPORTED_LOCALES;
use crate::i18n::catalog_for;

fn placeholders(template: &str) -> BTreeSet<&str> {
    template
        .split('{')
        .skip(1)
        .filter_map(|rest| rest.split_once('}').map(|(name, _)| name))
        .collect()
}

#[test]
fn catalogs_have_matching_keys() {
    let en_keys: BTreeSet<&'static str> = catalog_for(Locale::En).keys().copied().collect();
    for locale in SUPPORTED_LOCALES {
        let keys: BTreeSet<&'static str> = catalog_for(*locale).keys().copied().collect();
        assert_eq!(en_keys, keys, "locale catalogs must stay in parity ({locale:?})");
    }
}

#[test]
fn translations_keep_placeholders() {
    let en = catalog_for(Locale::En);
    for (key, template) in catalog_for(Locale::Ca) {
        let english = en.get(key).copied().expect("key in English catalog");
        assert_eq!(placeholders(english), placeholders(template), "placeholder mismatch for {key}");
    }
}

#[test]
fn locale_parse_accepts_region_tags_and_case() {
    assert_eq!(Locale::parse("EN"), Some(Locale::En));
    assert_eq!(Locale::parse("en_US"), Some(Locale::En));
    assert_eq!(Locale::parse("ca-ES"), Some(Locale::Ca));
    assert_eq!(Locale::parse(""), None);
    assert_eq!(Locale::parse("de"), None);
    assert_eq!(Locale::Ca.as_str(), "ca");
}
