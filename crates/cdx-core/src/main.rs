//! cdx-bridge core CLI
//!
//! The main entry point for cdx-core, handling:
//! - PPV and bridging estimates from command-line flags
//! - Batch evaluation of bridging scenarios from a JSON file
//! - The function-tool surface used by agent front-ends
//! - Settings validation

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use cdx_common::{Error, OutputFormat};
use cdx_config::{load_settings, ConfigSnapshot, ConfigSource, LoadedSettings, ValidationError};
use cdx_core::batch::{parse_batch, run_batch};
use cdx_core::estimate::{estimate_bridging, estimate_ppv, BridgingInput, DiagnosticAccuracy};
use cdx_core::exit_codes::ExitCode;
use cdx_core::log_event;
use cdx_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogLevel, Stage,
};
use cdx_core::normalize::{normalize_percentages, parse_probability};
use cdx_core::output::{CheckReport, OutputContext, ToolCallOutput, ToolCatalog, VersionInfo};
use cdx_core::tools::{call_tool, canonical_tool_name, tool_definitions, NormalizedQuery};
use std::io::{IsTerminal, Read};
use std::path::PathBuf;

/// cdx-bridge - Efficacy bridging for companion diagnostics
#[derive(Parser)]
#[command(name = "cdx-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Path to settings.json (overrides environment and XDG lookup)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Positive predictive value of a local diagnostic
    Ppv(AccuracyArgs),

    /// Efficacy in the diagnostic-positive population with a confidence interval
    Bridging(BridgingArgs),

    /// Evaluate a JSON array of bridging scenarios
    Batch(BatchArgs),

    /// Function tools for agent front-ends
    Tools(ToolsArgs),

    /// Rewrite percentages in a question as decimal fractions
    Normalize(NormalizeArgs),

    /// Resolve and validate settings
    Check,

    /// Print version information
    Version,
}

/// Diagnostic accuracy flags. Probabilities accept `0.9` or `90%`.
#[derive(Args, Debug)]
struct AccuracyArgs {
    /// Positive percent agreement with the reference assay
    #[arg(long, allow_negative_numbers = true)]
    ppa: String,

    /// Negative percent agreement with the reference assay
    #[arg(long, allow_negative_numbers = true)]
    npa: String,

    /// Prevalence of the condition
    #[arg(long, alias = "prev", allow_negative_numbers = true)]
    prevalence: String,

    /// Condition-positive reference sample size
    #[arg(long)]
    n1: u64,

    /// Condition-negative reference sample size
    #[arg(long)]
    n0: u64,
}

#[derive(Args, Debug)]
struct BridgingArgs {
    #[command(flatten)]
    accuracy: AccuracyArgs,

    /// Relative efficacy in discordant subjects, in [0, 1]
    #[arg(long, allow_negative_numbers = true)]
    c: f64,

    /// Observed clinical effect in the trial population
    #[arg(long, allow_hyphen_values = true)]
    delta1: f64,

    /// Variance of delta1
    #[arg(long, allow_negative_numbers = true)]
    var_delta1: f64,

    /// Confidence level (defaults to the settings value)
    #[arg(long, allow_negative_numbers = true)]
    conf_level: Option<String>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// JSON file with an array of scenarios, or `-` for stdin
    input: String,
}

#[derive(Args, Debug)]
struct ToolsArgs {
    #[command(subcommand)]
    command: ToolsCommands,
}

#[derive(Subcommand, Debug)]
enum ToolsCommands {
    /// List tool definitions with their input schemas
    List,

    /// Invoke a tool with JSON arguments
    Call {
        /// Tool name
        name: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[derive(Args, Debug)]
struct NormalizeArgs {
    /// Text to normalize
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,
}

/// Why a command did not produce a result.
enum Failure {
    /// Flag value clap accepted but we cannot use.
    Usage(String),
    Failed(Error),
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Failure::Failed(err)
    }
}

type CommandResult = std::result::Result<ExitCode, Failure>;

/// State shared by every command of one invocation.
struct Run<'a> {
    ctx: LogContext,
    loaded: &'a LoadedSettings,
    out: OutputContext<'a>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        LogLevel::from_verbosity(cli.global.verbose)
    };
    init_logging(&LogConfig::from_env(cli_level, None));

    let run_id = generate_run_id();
    let ctx = LogContext::new(run_id.clone());
    let command = command_name(&cli.command);
    let use_color = !cli.global.no_color && std::io::stderr().is_terminal();

    log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "starting command",
        command = command);

    let loaded = match load_settings(cli.global.settings.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            let err = settings_error(e);
            log_event!(ctx, ERROR, event_names::CONFIG_ERROR, Stage::Init, "settings rejected",
                code = err.code());
            let snapshot = ConfigSnapshot::defaults_only();
            let out = OutputContext {
                format: cli.global.format,
                run_id: &run_id,
                command,
                snapshot: &snapshot,
                precision: cdx_config::settings::DEFAULT_PRECISION,
                use_color,
            };
            out.emit_error(&err);
            std::process::exit(ExitCode::from(&err).as_i32());
        }
    };

    if loaded.path.source == ConfigSource::BuiltinDefault {
        log_event!(ctx, DEBUG, event_names::CONFIG_DEFAULT_USED, Stage::Init,
            "no settings file found, using defaults");
    } else {
        let source = loaded.path.source.to_string();
        log_event!(ctx, INFO, event_names::CONFIG_LOADED, Stage::Init, "settings loaded",
            source = source.as_str(), snapshot = loaded.snapshot.short_id());
    }

    let run = Run {
        ctx,
        loaded: &loaded,
        out: OutputContext {
            format: cli.global.format,
            run_id: &run_id,
            command,
            snapshot: &loaded.snapshot,
            precision: loaded.settings.output.precision,
            use_color,
        },
    };

    let outcome = match &cli.command {
        Commands::Ppv(args) => run_ppv(&run, args),
        Commands::Bridging(args) => run_bridging(&run, args),
        Commands::Batch(args) => run_batch_command(&run, args),
        Commands::Tools(args) => run_tools(&run, args),
        Commands::Normalize(args) => run_normalize(&run, args),
        Commands::Check => run_check(&run),
        Commands::Version => {
            run.out.emit(&VersionInfo::current());
            Ok(ExitCode::Clean)
        }
    };

    let exit_code = match outcome {
        Ok(code) => code,
        Err(Failure::Usage(message)) => {
            let _ = Cli::command().error(ErrorKind::ValueValidation, message).print();
            ExitCode::ArgsError
        }
        Err(Failure::Failed(err)) => {
            log_event!(run.ctx, INFO, event_names::ESTIMATE_REJECTED, Stage::Validate,
                "command failed", code = err.code(), recoverable = err.is_recoverable());
            run.out.emit_error(&err);
            ExitCode::from(&err)
        }
    };

    log_event!(run.ctx, INFO, event_names::RUN_FINISHED, Stage::Render, "command finished",
        exit_code = exit_code.as_i32());
    std::process::exit(exit_code.as_i32());
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Ppv(_) => "ppv",
        Commands::Bridging(_) => "bridging",
        Commands::Batch(_) => "batch",
        Commands::Tools(ToolsArgs {
            command: ToolsCommands::List,
        }) => "tools list",
        Commands::Tools(ToolsArgs {
            command: ToolsCommands::Call { .. },
        }) => "tools call",
        Commands::Normalize(_) => "normalize",
        Commands::Check => "check",
        Commands::Version => "version",
    }
}

/// A missing file is an environment problem; anything else is a bad file.
fn settings_error(err: ValidationError) -> Error {
    match err {
        ValidationError::IoError(msg) => Error::Config(msg),
        other => Error::InvalidSettings(other.to_string()),
    }
}

fn probability_arg(flag: &str, raw: &str, accept_percentages: bool) -> Result<f64, Failure> {
    if raw.trim_end().ends_with('%') && !accept_percentages {
        return Err(Failure::Usage(format!(
            "--{flag} {raw:?}: percentages are disabled by input.accept_percentages; pass a fraction"
        )));
    }
    parse_probability(raw)
        .ok_or_else(|| Failure::Usage(format!("--{flag} {raw:?} is not a number or percentage")))
}

impl AccuracyArgs {
    fn to_accuracy(&self, accept_percentages: bool) -> Result<DiagnosticAccuracy, Failure> {
        Ok(DiagnosticAccuracy {
            ppa: probability_arg("ppa", &self.ppa, accept_percentages)?,
            npa: probability_arg("npa", &self.npa, accept_percentages)?,
            prevalence: probability_arg("prevalence", &self.prevalence, accept_percentages)?,
            n1: self.n1,
            n0: self.n0,
        })
    }
}

fn run_ppv(run: &Run<'_>, args: &AccuracyArgs) -> CommandResult {
    let accuracy = args.to_accuracy(run.loaded.settings.input.accept_percentages)?;
    let estimate = estimate_ppv(&accuracy)?;

    log_event!(run.ctx, INFO, event_names::ESTIMATE_PPV, Stage::Estimate, "ppv estimated",
        ppv = estimate.ppv_estimate);
    run.out.emit(&estimate);
    Ok(ExitCode::Clean)
}

fn run_bridging(run: &Run<'_>, args: &BridgingArgs) -> CommandResult {
    let accept = run.loaded.settings.input.accept_percentages;
    let conf_level = args
        .conf_level
        .as_deref()
        .map(|raw| probability_arg("conf-level", raw, accept))
        .transpose()?;

    let input = BridgingInput {
        accuracy: args.accuracy.to_accuracy(accept)?,
        c: args.c,
        delta1: args.delta1,
        var_delta1: args.var_delta1,
        conf_level,
    }
    .with_default_conf_level(run.loaded.settings.estimation.conf_level);

    let estimate = estimate_bridging(&input)?;

    log_event!(run.ctx, INFO, event_names::ESTIMATE_BRIDGING, Stage::Estimate,
        "bridging estimated", efficacy = estimate.efficacy_estimate,
        conf_level = estimate.conf_level);
    run.out.emit(&estimate);
    Ok(ExitCode::Clean)
}

fn read_input(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
    }
}

fn run_batch_command(run: &Run<'_>, args: &BatchArgs) -> CommandResult {
    let content = read_input(&args.input).map_err(Error::from)?;
    let items = parse_batch(&content)?;
    let result = run_batch(&items, run.loaded.settings.estimation.conf_level, &run.ctx);

    run.out.emit(&result);

    let summary = &result.summary;
    Ok(if summary.all_succeeded {
        ExitCode::Clean
    } else if summary.any_succeeded {
        ExitCode::PartialFail
    } else {
        result
            .failed
            .first()
            .map(|f| ExitCode::from_error_code(f.error.code))
            .unwrap_or(ExitCode::InternalError)
    })
}

fn run_tools(run: &Run<'_>, args: &ToolsArgs) -> CommandResult {
    match &args.command {
        ToolsCommands::List => {
            run.out.emit(&ToolCatalog {
                tools: tool_definitions(),
            });
        }
        ToolsCommands::Call { name, args } => {
            let params: serde_json::Value = serde_json::from_str(args).map_err(|e| {
                Error::InvalidToolArguments(format!("--args is not valid JSON: {}", e))
            })?;
            let content = call_tool(name, &params)?;

            log_event!(run.ctx, INFO, event_names::TOOL_CALL, Stage::Estimate, "tool called",
                tool = canonical_tool_name(name));
            run.out.emit(&ToolCallOutput {
                tool: canonical_tool_name(name).to_string(),
                content,
            });
        }
    }
    Ok(ExitCode::Clean)
}

fn run_normalize(run: &Run<'_>, args: &NormalizeArgs) -> CommandResult {
    let text = args.text.join(" ");
    run.out.emit(&NormalizedQuery {
        query: normalize_percentages(&text),
    });
    Ok(ExitCode::Clean)
}

fn run_check(run: &Run<'_>) -> CommandResult {
    run.out.emit(&CheckReport {
        valid: true,
        settings: run.loaded.settings.clone(),
        snapshot: run.loaded.snapshot.clone(),
    });
    Ok(ExitCode::Clean)
}
