// crates/sensor-schemas-cli/src/main.rs
// ============================================================================
// Module: Sensor Schemas CLI Entry Point
// Description: Command dispatcher for schema validation and topic listing.
// Purpose: Provide a localized CLI over a schema repository checkout.
// Dependencies: clap, sensor-schemas-config, sensor-schemas-core, thiserror,
// tracing-subscriber.
// ============================================================================

//! ## Overview
//! The `sensor-schemas` binary loads a repository (schemas under `commons/`,
//! specifications under `specifications/`) together with the tool
//! configuration, then validates it, lists its topics or plans topic and
//! subject registration. All user-facing strings are routed through the i18n
//! catalog; diagnostics go to stderr through `tracing`.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use sensor_schemas_cli::i18n::Locale;
use sensor_schemas_cli::i18n::set_locale;
use sensor_schemas_cli::t;
use sensor_schemas_config::ExcludeConfig;
use sensor_schemas_config::ToolConfig;
use sensor_schemas_core::DataTopic;
use sensor_schemas_core::InMemorySchemaRegistry;
use sensor_schemas_core::SchemaRegistrar;
use sensor_schemas_core::SchemaResolver;
use sensor_schemas_core::SchemaValidator;
use sensor_schemas_core::Scope;
use sensor_schemas_core::SourceCatalogue;
use sensor_schemas_core::SpecificationsValidator;
use sensor_schemas_core::TopicDefaults;
use sensor_schemas_core::TopicRegistrar;
use sensor_schemas_core::ValidationExemptions;
use sensor_schemas_core::Violation;
use sensor_schemas_core::format_violations;
use thiserror::Error;
use tracing::debug;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "SENSOR_SCHEMAS_LANG";
/// Environment variable holding the log filter.
const LOG_ENV: &str = "SENSOR_SCHEMAS_LOG";
/// Log filter used when `SENSOR_SCHEMAS_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "sensor-schemas", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `SENSOR_SCHEMAS_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate schemas and specifications of a repository.
    Validate(ValidateCommand),
    /// List topics and schemas of a repository.
    List(ListCommand),
    /// Plan topic creation and schema subjects.
    Topics(TopicsCommand),
}

/// Output language argument.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

/// Repository location and configuration files.
#[derive(Args, Debug, Clone)]
struct RepositoryArgs {
    /// Root directory of the schema repository.
    #[arg(value_name = "ROOT", default_value = ".")]
    root: PathBuf,
    /// Tool configuration file (overrides `SENSOR_SCHEMAS_CONFIG`).
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Repository location.
    #[command(flatten)]
    repository: RepositoryArgs,
    /// Scope to validate.
    #[arg(long, short = 's', value_parser = parse_scope)]
    scope: Option<Scope>,
    /// Print every validated schema.
    #[arg(long, short = 'v', action = ArgAction::SetTrue)]
    verbose: bool,
    /// Only set the exit code.
    #[arg(long, short = 'q', action = ArgAction::SetTrue, conflicts_with = "verbose")]
    quiet: bool,
    /// Validate every schema referenced by a specification with scope rules.
    #[arg(long, short = 'S', action = ArgAction::SetTrue)]
    from_specification: bool,
    /// Validate every schema file.
    #[arg(long, short = 'f', action = ArgAction::SetTrue)]
    full: bool,
    /// Validate specification files and topic names.
    #[arg(long, short = 'p', action = ArgAction::SetTrue)]
    specifications: bool,
    /// Additional validation exclusion file merged into the configured one.
    #[arg(long, value_name = "PATH")]
    exclude_config: Option<PathBuf>,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
struct ListCommand {
    /// Repository location.
    #[command(flatten)]
    repository: RepositoryArgs,
    /// List raw input topics.
    #[arg(long, short = 'r', action = ArgAction::SetTrue)]
    raw: bool,
    /// List the output topics of stream groups.
    #[arg(long, short = 'S', action = ArgAction::SetTrue, conflicts_with = "raw")]
    stream: bool,
    /// Only print the topics to create.
    #[arg(long, short = 'q', action = ArgAction::SetTrue)]
    quiet: bool,
    /// Only print the source named `<SCOPE> - <name>`.
    #[arg(long, short = 'm', value_name = "SOURCE")]
    r#match: Option<String>,
}

/// Arguments for `topics`.
#[derive(Args, Debug)]
struct TopicsCommand {
    /// Repository location.
    #[command(flatten)]
    repository: RepositoryArgs,
    /// Exact topic name or regular expression selecting topics.
    #[arg(long, short = 'f', value_name = "FILTER")]
    filter: Option<String>,
    /// Default partition count.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1 ..))]
    partitions: u32,
    /// Default replication factor.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u16).range(1 ..))]
    replication_factor: u16,
    /// Also print the key and value subjects that would be registered.
    #[arg(long, action = ArgAction::SetTrue)]
    subjects: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Validate(command) => {
            init_tracing(log_filter(command.verbose, command.quiet));
            command_validate(&command)
        }
        Commands::List(command) => {
            init_tracing(log_filter(false, command.quiet));
            command_list(&command)
        }
        Commands::Topics(command) => {
            init_tracing(log_filter(false, false));
            command_topics(&command)
        }
    }
}

/// Resolves the output locale from the flag, then the environment.
fn resolve_locale(flag: Option<LangArg>, env_value: Option<&str>) -> CliResult<Locale> {
    if let Some(flag) = flag {
        return Ok(flag.into());
    }
    match env_value {
        None => Ok(Locale::En),
        Some(value) if value.trim().is_empty() => Ok(Locale::En),
        Some(value) => Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        }),
    }
}

/// Prints the top-level help text.
fn show_help() -> CliResult<()> {
    let help = Cli::command().render_help().to_string();
    write_stdout_text(&help)
}

/// Parses a scope argument.
fn parse_scope(value: &str) -> Result<Scope, String> {
    value.parse()
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Selects the log filter: `SENSOR_SCHEMAS_LOG`, overridden by verbosity flags.
fn log_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}

/// Installs the stderr log subscriber; a second installation is ignored.
fn init_tracing(filter: EnvFilter) {
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

// ============================================================================
// SECTION: Repository Loading
// ============================================================================

/// Loaded repository state shared by the commands.
struct Repository {
    /// Repository root.
    root: PathBuf,
    /// Tool configuration.
    config: ToolConfig,
    /// Source catalogue with the resolved schemas.
    catalogue: SourceCatalogue,
}

/// Loads the tool configuration, resolves schemas and loads specifications.
fn load_repository(args: &RepositoryArgs) -> CliResult<Repository> {
    if !args.root.is_dir() {
        return Err(CliError::new(t!("repository.not_found", path = args.root.display())));
    }
    let config = ToolConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    debug!(root = %args.root.display(), topics = config.topics.len(), "tool configuration loaded");

    let resolver = config
        .schemas
        .apply(SchemaResolver::for_repository(&args.root))
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let schemas =
        resolver.resolve().map_err(|err| CliError::new(t!("schemas.load_failed", error = err)))?;
    let source_filter = config
        .sources
        .path_filter()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let catalogue = SourceCatalogue::load_filtered(&args.root, schemas, &source_filter)
        .map_err(|err| CliError::new(t!("catalogue.load_failed", error = err)))?;
    Ok(Repository {
        root: args.root.clone(),
        config,
        catalogue,
    })
}

/// Builds the exemption table from the configured and extra exclusions.
fn load_exemptions(
    config: &ToolConfig,
    extra: Option<&Path>,
) -> CliResult<Arc<dyn ValidationExemptions + Send + Sync>> {
    let mut exclude = config.exclude.clone();
    if let Some(path) = extra {
        let loaded = ExcludeConfig::load(path).map_err(|err| {
            CliError::new(t!("exclude.load_failed", path = path.display(), error = err))
        })?;
        exclude.merge(loaded);
    }
    let table = exclude
        .exemptions()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    Ok(Arc::new(table))
}

// ============================================================================
// SECTION: Validate Command
// ============================================================================

/// Executes the `validate` command.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let repository = load_repository(&command.repository)?;
    let topics = repository
        .catalogue
        .topics()
        .map_err(|err| CliError::new(t!("validate.topics.failed", error = err)))?;
    if !command.quiet {
        let mut output = String::new();
        output.push('\n');
        output.push_str(&t!("validate.topics.header"));
        output.push('\n');
        let mut seen = BTreeSet::new();
        for topic in &topics {
            if seen.insert(topic.name.as_str()) {
                output.push_str(&t!(
                    "validate.topics.line",
                    topic = topic.name,
                    key = topic.key.schema.full_name(),
                    value = topic.value.schema.full_name()
                ));
                output.push('\n');
            }
        }
        output.push('\n');
        write_stdout_text(&output)?;
    }

    let exemptions = load_exemptions(&repository.config, command.exclude_config.as_deref())?;
    let schema_catalogue = repository.catalogue.schema_catalogue();
    let validator = SchemaValidator::new(schema_catalogue.schema_root(), exemptions)
        .map_err(|err| CliError::new(t!("validate.rules_failed", error = err)))?;

    let mut violations: Vec<Violation> = Vec::new();
    if command.full {
        violations.extend(validator.analyse_files(schema_catalogue, command.scope));
    } else if !schema_catalogue.unresolved().is_empty() {
        warn!(count = schema_catalogue.unresolved().len(), "unresolved schema files");
        if !command.quiet {
            write_stderr_line(&t!("validate.unresolved", count = schema_catalogue.unresolved().len()))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        }
    }
    if command.from_specification {
        violations.extend(validator.analyse_source_catalogue(command.scope, &repository.catalogue));
    }
    if command.specifications {
        let filter = repository
            .config
            .sources
            .path_filter()
            .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
        let specifications = SpecificationsValidator::new(&repository.root)
            .map_err(|err| CliError::new(t!("validate.rules_failed", error = err)))?
            .with_filter(Box::new(filter));
        violations.extend(specifications.validate(command.scope));
    }

    if command.quiet {
        return Ok(exit_code(&violations));
    }
    let mut output = format_violations(&violations);
    if !violations.is_empty() {
        output.push_str(&t!("validate.summary.failed", count = violations.len()));
        output.push('\n');
    }
    if command.verbose {
        output.push_str(&t!("validate.schemas.header"));
        output.push('\n');
        for schema in validator.validated_schemas().keys() {
            output.push_str(&t!("validate.schemas.line", schema = schema));
            output.push('\n');
        }
        output.push('\n');
    }
    write_stdout_text(&output)?;
    Ok(exit_code(&violations))
}

/// Maps the violation list to the process exit code.
fn exit_code(violations: &[Violation]) -> ExitCode {
    if violations.is_empty() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

// ============================================================================
// SECTION: List Command
// ============================================================================

/// Executes the `list` command.
fn command_list(command: &ListCommand) -> CliResult<ExitCode> {
    let repository = load_repository(&command.repository)?;
    let catalogue = &repository.catalogue;
    let lines: Vec<String> = if command.raw {
        catalogue.raw_topic_names().into_iter().collect()
    } else if command.stream {
        catalogue.stream_topic_names().into_iter().collect()
    } else if command.quiet {
        let mut names = catalogue.topic_names();
        names.extend(repository.config.topics.keys().cloned());
        names.into_iter().collect()
    } else {
        verbose_sources(catalogue, command.r#match.as_deref())?
    };
    let mut output = lines.join("\n");
    output.push('\n');
    write_stdout_text(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Describes every source, or the one named by `filter`, with its data topics.
fn verbose_sources(catalogue: &SourceCatalogue, filter: Option<&str>) -> CliResult<Vec<String>> {
    let mut blocks = Vec::new();
    for source in catalogue.sources() {
        let name = t!("list.source", scope = source.scope, name = source.name());
        if filter.is_some_and(|filter| !filter.eq_ignore_ascii_case(&name)) {
            continue;
        }
        let mut block = name;
        let mut data: Vec<&DataTopic> = source.producer.data.iter().collect();
        data.sort_by(|a, b| a.input_topic().cmp(&b.input_topic()));
        for topic in data {
            block.push('\n');
            block.push_str(&t!("list.topic", topic = topic.input_topic().unwrap_or_default()));
            for (label, value) in topic_details(topic) {
                block.push('\n');
                block.push_str(&t!("list.detail", name = label, value = value));
            }
        }
        blocks.push(block);
    }
    if let Some(filter) = filter
        && blocks.is_empty()
    {
        return Err(CliError::new(t!("list.match.none", pattern = filter)));
    }
    Ok(blocks)
}

/// Returns the populated descriptive fields of a data topic.
fn topic_details(topic: &DataTopic) -> Vec<(&'static str, String)> {
    let mut details = Vec::new();
    if let Some(kind) = &topic.kind {
        details.push(("type", kind.clone()));
    }
    if let Some(doc) = &topic.doc {
        details.push(("doc", doc.trim().to_string()));
    }
    details.push(("key_schema", topic.key_schema()));
    if let Some(value) = topic.value_schema() {
        details.push(("value_schema", value));
    }
    if let Some(unit) = &topic.unit {
        details.push(("unit", unit.clone()));
    }
    if let Some(aggregator) = &topic.aggregator {
        details.push(("aggregator", aggregator.clone()));
    }
    details
}

// ============================================================================
// SECTION: Topics Command
// ============================================================================

/// Executes the `topics` command.
fn command_topics(command: &TopicsCommand) -> CliResult<ExitCode> {
    let repository = load_repository(&command.repository)?;
    let defaults = TopicDefaults {
        partitions: command.partitions,
        replication_factor: command.replication_factor,
    };
    let plan = TopicRegistrar::plan(
        &repository.catalogue,
        &repository.config.topics,
        defaults,
        command.filter.as_deref(),
    )
    .map_err(|err| CliError::new(t!("topics.plan.failed", error = err)))?;
    let mut output = String::new();
    for topic in &plan {
        output.push_str(&t!(
            "topics.plan.line",
            topic = topic.name,
            partitions = topic.partitions,
            replication = topic.replication_factor
        ));
        output.push('\n');
    }

    if command.subjects {
        let registry = InMemorySchemaRegistry::new();
        let report = SchemaRegistrar::register_catalogue(
            &registry,
            &repository.catalogue,
            &repository.config.topics,
        )
        .map_err(|err| CliError::new(t!("topics.subjects.failed", error = err)))?;
        for (subject, id) in &report.registered {
            let schema = registry
                .latest(subject)
                .map_err(|err| CliError::new(t!("topics.subjects.failed", error = err)))?
                .map(|schema| schema.full_name())
                .unwrap_or_default();
            output.push_str(&t!("topics.subjects.line", subject = subject, schema = schema, id = id));
            output.push('\n');
        }
    }
    write_stdout_text(&output)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes text to stdout without adding a newline.
fn write_stdout_text(text: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes()).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
