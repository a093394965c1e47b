// crates/sensor-schemas-core/src/runtime/catalogue.rs
// ============================================================================
// Module: Source Catalogue
// Description: Source specifications bound to the resolved schema catalog.
// Purpose: Expose merged producer, topic-name and topic-schema views.
// Dependencies: crate::{core, interfaces, runtime::resolver}, thiserror, tracing
// ============================================================================

//! ## Overview
//! The source catalogue loads every producer specification under
//! `specifications/<scope>` and pairs it with a [`SchemaCatalogue`]. Files
//! that fail to load are logged and skipped so one broken specification does
//! not hide the rest; the catalogue itself performs no schema validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::error;
use tracing::info;

use crate::core::metadata::SchemaMetadata;
use crate::core::scope::SPECIFICATIONS_PATH;
use crate::core::scope::Scope;
use crate::core::specification::Source;
use crate::core::specification::SpecificationError;
use crate::interfaces::AcceptAll;
use crate::interfaces::PathFilter;
use crate::runtime::resolver::ResolveError;
use crate::runtime::resolver::SchemaCatalogue;
use crate::runtime::resolver::collect_files;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Extensions of specification files.
pub const SPECIFICATION_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Role of a schema within a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaRole {
    /// Message key.
    Key,
    /// Message value.
    Value,
}

impl fmt::Display for SchemaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key => f.write_str("Key"),
            Self::Value => f.write_str("Value"),
        }
    }
}

/// Source catalogue errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    /// A topic references a schema that did not resolve.
    #[error("{role} schema {schema} for topic {topic} not found.")]
    SchemaNotFound {
        /// Key or value.
        role: SchemaRole,
        /// Full name of the missing schema.
        schema: String,
        /// Topic referencing the schema.
        topic: String,
    },
    /// A specification directory could not be listed.
    #[error("source catalogue io error: {0}")]
    Io(String),
    /// Schema resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// A source specification is incomplete.
    #[error(transparent)]
    Specification(#[from] SpecificationError),
}

// ============================================================================
// SECTION: Topic Bindings
// ============================================================================

/// Topic bound to its key and value schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundTopic {
    /// Topic name.
    pub name: String,
    /// Scope of the declaring source.
    pub scope: Scope,
    /// Name of the declaring source.
    pub source: String,
    /// Key schema.
    pub key: SchemaMetadata,
    /// Value schema.
    pub value: SchemaMetadata,
    /// Whether schemas are registered during initialization.
    pub register_schema: bool,
}

// ============================================================================
// SECTION: Source Catalogue
// ============================================================================

/// Producers of every source scope together with the resolved schemas.
#[derive(Debug, Clone, Default)]
pub struct SourceCatalogue {
    /// Resolved schemas.
    schemas: SchemaCatalogue,
    /// Producers keyed by scope.
    sources: BTreeMap<Scope, Vec<Source>>,
}

impl SourceCatalogue {
    /// Creates a catalogue from already loaded parts.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Specification`] when a source is incomplete.
    pub fn new(schemas: SchemaCatalogue, sources: Vec<Source>) -> Result<Self, CatalogueError> {
        let mut grouped: BTreeMap<Scope, Vec<Source>> = BTreeMap::new();
        for source in sources {
            source.validate()?;
            grouped.entry(source.scope).or_default().push(source);
        }
        Ok(Self {
            schemas,
            sources: grouped,
        })
    }

    /// Loads all source specifications below `<root>/specifications`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Io`] when a scope directory cannot be listed.
    pub fn load(root: &Path, schemas: SchemaCatalogue) -> Result<Self, CatalogueError> {
        Self::load_filtered(root, schemas, &AcceptAll)
    }

    /// Loads source specifications accepted by `filter` (paths relative to
    /// the specifications directory).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Io`] when a scope directory cannot be listed.
    pub fn load_filtered(
        root: &Path,
        schemas: SchemaCatalogue,
        filter: &dyn PathFilter,
    ) -> Result<Self, CatalogueError> {
        let specification_root = root.join(SPECIFICATIONS_PATH);
        let mut sources: BTreeMap<Scope, Vec<Source>> = BTreeMap::new();
        for scope in Scope::SOURCES {
            let loaded = load_scope(&specification_root, scope, filter)?;
            sources.insert(scope, loaded);
        }
        info!(
            sources = sources.values().map(Vec::len).sum::<usize>(),
            schemas = schemas.len(),
            "source catalogue loaded"
        );
        Ok(Self {
            schemas,
            sources,
        })
    }

    /// Returns the resolved schema catalog.
    #[must_use]
    pub const fn schema_catalogue(&self) -> &SchemaCatalogue {
        &self.schemas
    }

    /// Returns the producers of one scope.
    #[must_use]
    pub fn sources_in(&self, scope: Scope) -> &[Source] {
        self.sources.get(&scope).map_or(&[], Vec::as_slice)
    }

    /// Iterates over the producers of every scope.
    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.sources.values().flatten()
    }

    /// Active sources.
    #[must_use]
    pub fn active_sources(&self) -> &[Source] {
        self.sources_in(Scope::Active)
    }

    /// Monitor sources.
    #[must_use]
    pub fn monitor_sources(&self) -> &[Source] {
        self.sources_in(Scope::Monitor)
    }

    /// Passive sources.
    #[must_use]
    pub fn passive_sources(&self) -> &[Source] {
        self.sources_in(Scope::Passive)
    }

    /// Connector sources.
    #[must_use]
    pub fn connector_sources(&self) -> &[Source] {
        self.sources_in(Scope::Connector)
    }

    /// Push sources.
    #[must_use]
    pub fn push_sources(&self) -> &[Source] {
        self.sources_in(Scope::Push)
    }

    /// Stream groups.
    #[must_use]
    pub fn stream_groups(&self) -> &[Source] {
        self.sources_in(Scope::Stream)
    }

    /// Returns every expanded topic name, sorted and deduplicated.
    #[must_use]
    pub fn topic_names(&self) -> BTreeSet<String> {
        self.sources().flat_map(|source| source.topic_names().into_iter().flatten()).collect()
    }

    /// Returns the input topics of non-stream producers.
    #[must_use]
    pub fn raw_topic_names(&self) -> BTreeSet<String> {
        self.sources()
            .filter(|source| source.scope != Scope::Stream)
            .flat_map(|source| source.topic_models().into_iter().flatten())
            .map(|model| model.input_topic)
            .collect()
    }

    /// Returns the output topics of stream groups.
    #[must_use]
    pub fn stream_topic_names(&self) -> BTreeSet<String> {
        self.stream_groups()
            .iter()
            .flat_map(|source| source.topic_models().into_iter().flatten())
            .flat_map(|model| model.expand())
            .map(|metadata| metadata.output_topic)
            .collect()
    }

    /// Binds the topics of producers in `scope` (or of all producers) to
    /// their schemas, keeping lookup failures per topic.
    ///
    /// Stream groups declare the schemas of their outputs, so each output
    /// topic is bound; other producers bind their input topic.
    #[must_use]
    pub fn topic_bindings(&self, scope: Option<Scope>) -> Vec<Result<BoundTopic, CatalogueError>> {
        let mut bindings = Vec::new();
        let sources =
            self.sources().filter(|source| scope.is_none_or(|scope| source.scope == scope));
        for source in sources {
            let name = source.name();
            let register_schema = source.register_schema();
            for model in source.topic_models().into_iter().flatten() {
                let topics: Vec<String> = if source.scope == Scope::Stream {
                    model.expand().into_iter().map(|metadata| metadata.output_topic).collect()
                } else {
                    vec![model.input_topic.clone()]
                };
                for topic in topics {
                    let bound = self
                        .schemas
                        .topic_schemas(&model.key_type, &model.value_type, &topic)
                        .map(|(key, value)| BoundTopic {
                            name: topic.clone(),
                            scope: source.scope,
                            source: name.clone(),
                            key: key.clone(),
                            value: value.clone(),
                            register_schema,
                        });
                    bindings.push(bound);
                }
            }
        }
        bindings
    }

    /// Binds every topic to its key and value schemas.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::SchemaNotFound`] for the first topic whose
    /// key or value schema did not resolve.
    pub fn topics(&self) -> Result<Vec<BoundTopic>, CatalogueError> {
        self.topic_bindings(None).into_iter().collect()
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads the specifications of one scope; broken files are logged and skipped.
fn load_scope(
    specification_root: &Path,
    scope: Scope,
    filter: &dyn PathFilter,
) -> Result<Vec<Source>, CatalogueError> {
    let directory = scope.path(specification_root);
    if !directory.is_dir() {
        info!(scope = %scope, path = %directory.display(), "specification directory not found");
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    collect_files(&directory, &mut files)
        .map_err(|err| CatalogueError::Io(format!("{}: {err}", directory.display())))?;
    files.sort();
    let mut sources = Vec::new();
    for path in files {
        if !has_specification_extension(&path) {
            continue;
        }
        let relative = path.strip_prefix(specification_root).unwrap_or(&path);
        if !filter.accepts(relative) {
            continue;
        }
        let loaded = fs::read_to_string(&path)
            .map_err(|err| SpecificationError::Io(err.to_string()))
            .and_then(|text| Source::from_yaml(&text, scope));
        match loaded {
            Ok(source) => sources.push(source),
            Err(err) => error!(path = %path.display(), error = %err, "failed to load source specification"),
        }
    }
    Ok(sources)
}

/// Returns true when the file is a YAML specification.
pub(crate) fn has_specification_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            SPECIFICATION_EXTENSIONS.iter().any(|known| extension.eq_ignore_ascii_case(known))
        })
}
