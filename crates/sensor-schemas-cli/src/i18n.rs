// crates/sensor-schemas-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for consistent output and locales.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! Every line the `sensor-schemas` binary prints is looked up in a message
//! catalog through the [`t!`](crate::t) macro. Missing keys fall back to
//! English and then to the key itself. Placeholders use `{name}` syntax.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Parses a locale value, ignoring case and region tags.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.split(['-', '_']).next() {
            Some("en") => Some(Self::En),
            Some("ca") => Some(Self::Ca),
            _ => None,
        }
    }
}

/// Supported locales in presentation order.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Ca];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces.
    pub key: &'static str,
    /// Value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`].
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "sensor-schemas {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
    ("repository.not_found", "Repository root {path} is not a directory."),
    ("config.load_failed", "Failed to load tool configuration: {error}"),
    ("exclude.load_failed", "Failed to load exclusion configuration {path}: {error}"),
    ("schemas.load_failed", "Failed to load schemas: {error}"),
    ("catalogue.load_failed", "Failed to load source catalogue: {error}"),
    ("validate.topics.header", "Validated topics:"),
    ("validate.topics.line", "- {topic} [{key}: {value}]"),
    ("validate.topics.failed", "Failed to load all topics: {error}"),
    ("validate.rules_failed", "Failed to initialize validation rules: {error}"),
    ("validate.unresolved", "{count} schema files could not be resolved; run with --full to list them."),
    ("validate.schemas.header", "Validated schemas:"),
    ("validate.schemas.line", " - {schema}"),
    ("validate.summary.failed", "{count} validation violations found."),
    ("list.source", "{scope} - {name}"),
    ("list.topic", "  {topic}"),
    ("list.detail", "    {name}: {value}"),
    ("list.topics.failed", "Failed to list topics of {source}: {error}"),
    ("list.match.none", "No source matches {pattern}."),
    ("topics.plan.failed", "Failed to plan topics: {error}"),
    ("topics.plan.line", "{topic} partitions={partitions} replication_factor={replication}"),
    ("topics.subjects.failed", "Failed to register schemas: {error}"),
    ("topics.subjects.line", "{subject} {schema} id={id}"),
];

/// Catalan catalog.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "sensor-schemas {version}"),
    ("output.stream.stdout", "sortida estàndard"),
    ("output.stream.stderr", "sortida d'error"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
    ("repository.not_found", "L'arrel del repositori {path} no és un directori."),
    ("config.load_failed", "No s'ha pogut carregar la configuració de l'eina: {error}"),
    (
        "exclude.load_failed",
        "No s'ha pogut carregar la configuració d'exclusions {path}: {error}",
    ),
    ("schemas.load_failed", "No s'han pogut carregar els esquemes: {error}"),
    ("catalogue.load_failed", "No s'ha pogut carregar el catàleg de fonts: {error}"),
    ("validate.topics.header", "Temes validats:"),
    ("validate.topics.line", "- {topic} [{key}: {value}]"),
    ("validate.topics.failed", "No s'han pogut carregar tots els temes: {error}"),
    ("validate.rules_failed", "No s'han pogut inicialitzar les regles de validació: {error}"),
    (
        "validate.unresolved",
        "No s'han pogut resoldre {count} fitxers d'esquema; executeu amb --full per llistar-los.",
    ),
    ("validate.schemas.header", "Esquemes validats:"),
    ("validate.schemas.line", " - {schema}"),
    ("validate.summary.failed", "S'han trobat {count} infraccions de validació."),
    ("list.source", "{scope} - {name}"),
    ("list.topic", "  {topic}"),
    ("list.detail", "    {name}: {value}"),
    ("list.topics.failed", "No s'han pogut llistar els temes de {source}: {error}"),
    ("list.match.none", "Cap font coincideix amb {pattern}."),
    ("topics.plan.failed", "No s'han pogut planificar els temes: {error}"),
    ("topics.plan.line", "{topic} particions={partitions} factor_de_replicació={replication}"),
    ("topics.subjects.failed", "No s'han pogut registrar els esquemes: {error}"),
    ("topics.subjects.line", "{subject} {schema} id={id}"),
];

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Ca => CATALOG_CA_MAP.get_or_init(|| CATALOG_CA.iter().copied().collect()),
    }
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog_for(current_locale())
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    let mut result = template.to_string();
    for arg in args {
        result = result.replace(&format!("{{{}}}", arg.key), &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
