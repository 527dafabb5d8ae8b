mod output;

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use command_grammar_core::Command as Grammar;
use command_grammar_def::GrammarDefinition;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use output::{
    CheckReport, OutputFormat, ParseReport, SuggestReport, check_to_table, parse_to_table,
    parses_to_table, render, suggest_to_table,
};

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "COMMAND_GRAMMAR_LOG";

#[derive(Debug, Parser)]
#[command(name = "command-grammar")]
#[command(about = "Parse and complete command lines against a grammar definition")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: Settings,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct Settings {
    /// Grammar definition file (.yaml, .yml or .json).
    #[arg(long, short, global = true)]
    grammar: Option<PathBuf>,
    /// Output format.
    #[arg(long, global = true, default_value = "table")]
    format: OutputFormat,
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate a grammar definition.
    Check,
    /// Parse a command line and report diagnostics.
    Parse(ParseArgs),
    /// Print completion candidates for a command line.
    Suggest(SuggestArgs),
    /// Parse many command lines in parallel, one per input line.
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// The command line to parse.
    #[arg(allow_hyphen_values = true)]
    line: String,
    /// Exit with status 1 when the line has parse errors.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Args)]
struct SuggestArgs {
    /// The command line to complete.
    #[arg(allow_hyphen_values = true)]
    line: String,
    /// Cursor position in characters (default: end of line).
    #[arg(long)]
    position: Option<usize>,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// File with one command line per line (default: stdin).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Number of parallel parse jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.settings.verbose);

    let result = match cli.command {
        Command::Check => run_check(&cli.settings),
        Command::Parse(args) => run_parse(&cli.settings, args),
        Command::Suggest(args) => run_suggest(&cli.settings, args),
        Command::Batch(args) => run_batch(&cli.settings, args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_grammar(settings: &Settings) -> Result<Grammar, String> {
    let path = settings
        .grammar
        .as_ref()
        .ok_or_else(|| "no grammar given: pass --grammar <FILE>".to_string())?;

    let grammar = GrammarDefinition::load(path)
        .and_then(|definition| definition.build())
        .map_err(|e| format!("Failed to load grammar '{}': {e}", path.display()))?;

    info!(root = grammar.name(), "loaded grammar from {}", path.display());
    Ok(grammar)
}

fn run_check(settings: &Settings) -> Result<(), String> {
    let grammar = load_grammar(settings)?;
    let report = CheckReport::new(&grammar);
    print!("{}", with_newline(render(&report, settings.format, check_to_table)?));
    Ok(())
}

fn run_parse(settings: &Settings, args: ParseArgs) -> Result<(), String> {
    let grammar = load_grammar(settings)?;
    let result = grammar.parse(&args.line);
    let report = ParseReport::new(&result);

    print!("{}", with_newline(render(&report, settings.format, parse_to_table)?));

    if args.strict && !report.valid {
        return Err(format!("{} parse error(s)", report.errors.len()));
    }
    Ok(())
}

fn run_suggest(settings: &Settings, args: SuggestArgs) -> Result<(), String> {
    let grammar = load_grammar(settings)?;
    let result = grammar.parse(&args.line);
    let report = SuggestReport::new(&result, args.position);

    debug!(
        count = report.suggestions.len(),
        text_to_match = %report.text_to_match,
        "suggest"
    );
    print!("{}", with_newline(render(&report, settings.format, suggest_to_table)?));
    Ok(())
}

fn run_batch(settings: &Settings, args: BatchArgs) -> Result<(), String> {
    use rayon::prelude::*;

    let grammar = load_grammar(settings)?;

    let raw = match &args.input {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            raw
        }
    };
    let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        pool = pool.num_threads(jobs);
    }
    let pool = pool
        .build()
        .map_err(|e| format!("Failed to create thread pool: {e}"))?;

    let reports: Vec<ParseReport> = pool.install(|| {
        lines
            .par_iter()
            .map(|line| ParseReport::new(&grammar.parse(line)))
            .collect()
    });

    let invalid = reports.iter().filter(|r| !r.valid).count();
    info!(lines = reports.len(), invalid, "batch parsed");

    print!(
        "{}",
        with_newline(render(reports.as_slice(), settings.format, parses_to_table)?)
    );
    Ok(())
}

fn with_newline(mut out: String) -> String {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
