use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use abetopo_core::{DecodeOptions, DumpError, TopologyReport, decode_topology_file};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::glob;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("ABETOPO_BUILD_COMMIT"),
    " ",
    env!("ABETOPO_BUILD_DATE"),
    ")\ncommit: ",
    env!("ABETOPO_BUILD_COMMIT_FULL"),
);

const EXAMPLES: &str = "Examples:\n  abetopo dump omap4_abe -o report.json\n  abetopo decode omap4_abe --stdout --pretty\n  abetopo dump 'firmware/*_abe' --stdout --keep-empty-enum-slots";

#[derive(Parser, Debug)]
#[command(name = "abetopo")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for ASoC/ABE topology firmware containers.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a topology container and write a versioned JSON report.
    #[command(alias = "decode")]
    #[command(after_help = EXAMPLES)]
    Dump {
        /// Path (or glob matching one file) to a topology container
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Export enum tables as raw 16-slot texts/values instead of a label map
        #[arg(long)]
        keep_empty_enum_slots: bool,

        /// Expected block signature (4 ASCII characters)
        #[arg(long, value_parser = parse_magic, default_value = "CoSA")]
        magic: [u8; 4],

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any diagnostic was emitted
        #[arg(long)]
        strict: bool,

        /// List decode diagnostics after decoding
        #[arg(long)]
        list_diagnostics: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Dump {
            input,
            report,
            stdout,
            pretty,
            compact,
            keep_empty_enum_slots,
            magic,
            quiet,
            strict,
            list_diagnostics,
        } => {
            init_tracing(cli.verbose, quiet);
            cmd_dump(DumpArgs {
                input,
                report,
                stdout,
                pretty,
                compact,
                options: DecodeOptions {
                    keep_empty_enum_slots,
                    magic,
                },
                quiet,
                strict,
                list_diagnostics,
            })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, 0) => "error",
        (_, 0) => "warn",
        (_, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

impl From<DumpError> for CliError {
    fn from(err: DumpError) -> Self {
        match err {
            DumpError::Source(source) => CliError::new(
                format!("failed to read input: {source}"),
                Some("check the path and file permissions".to_string()),
            ),
            DumpError::Topology(decode) => {
                let offset = decode.offset();
                CliError::new(
                    format!("decode failed: {decode}"),
                    Some(format!(
                        "the container is malformed near byte {offset:#x}; rerun with -v for block progress"
                    )),
                )
            }
        }
    }
}

struct DumpArgs {
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    options: DecodeOptions,
    quiet: bool,
    strict: bool,
    list_diagnostics: bool,
}

fn cmd_dump(args: DumpArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    debug!(input = %resolved_input.display(), "resolved input");

    let report_path = match (args.stdout, args.report) {
        (true, _) => None,
        (false, Some(path)) => {
            ensure_distinct_paths(&resolved_input, &path)?;
            Some(path)
        }
        (false, None) => {
            return Err(CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            ));
        }
    };

    let rep = decode_topology_file(&resolved_input, &args.options)?;
    let json = serialize_report(&rep, args.pretty, args.compact)?;

    match report_path {
        None => print!("{}", json),
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&path, json)
                .with_context(|| format!("Failed to write report: {}", path.display()))?;
            if !args.quiet {
                eprintln!("OK: report written -> {}", path.display());
            }
        }
    }

    if args.list_diagnostics && !args.quiet {
        print_diagnostics(&rep);
    }
    if args.strict && !rep.diagnostics.is_empty() {
        return Err(CliError::new(
            format!("{} decode diagnostic(s) emitted", rep.diagnostics.len()),
            Some("use --list-diagnostics to inspect".to_string()),
        ));
    }
    Ok(())
}

fn ensure_distinct_paths(input: &Path, report: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let report_dir = match report.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A report directory that does not exist yet cannot contain the input.
    let Ok(report_dir) = fs::canonicalize(report_dir) else {
        return Ok(());
    };
    let file_name = report
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("report path must differ from input: {}", report.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn serialize_report(rep: &TopologyReport, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    let json = if pretty {
        serde_json::to_string_pretty(rep)
    } else {
        serde_json::to_string(rep)
    };
    Ok(json.context("JSON serialization failed")?)
}

fn print_diagnostics(rep: &TopologyReport) {
    eprintln!("Diagnostics:");
    if rep.diagnostics.is_empty() {
        eprintln!("  (none)");
    }
    for diagnostic in &rep.diagnostics {
        eprintln!("  {}", diagnostic);
    }
}

fn parse_magic(value: &str) -> Result<[u8; 4], String> {
    if !value.is_ascii() {
        return Err("signature must be ASCII".to_string());
    }
    value
        .as_bytes()
        .try_into()
        .map_err(|_| format!("signature must be exactly 4 characters, got {}", value.len()))
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass the path to a topology firmware file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass the path to a topology firmware file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        n => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if n > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!("multiple files match pattern '{pattern}' ({n} matches); matches: {listed}"),
                Some("pass a single container file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
