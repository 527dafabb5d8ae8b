//! Reports printed by the CLI and their output formats.

use command_grammar_core::{Command, ParseError, ParseResult, Symbol};
use serde::Serialize;

/// CLI output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

/// Summary of a loaded grammar.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub root: String,
    pub commands: usize,
    pub options: usize,
    pub hidden: usize,
}

impl CheckReport {
    pub fn new(grammar: &Command) -> Self {
        let mut report = Self {
            root: grammar.name().to_string(),
            commands: 0,
            options: 0,
            hidden: 0,
        };
        report.walk(grammar);
        report
    }

    fn walk(&mut self, command: &Command) {
        self.commands += 1;
        self.options += command.options().len();
        self.hidden += usize::from(command.is_hidden())
            + command.options().iter().filter(|o| o.is_hidden()).count();
        for sub in command.subcommands() {
            self.walk(sub);
        }
    }
}

/// One matched symbol and the values it consumed.
#[derive(Debug, Serialize)]
pub struct PathEntry {
    pub kind: &'static str,
    pub name: String,
    pub values: Vec<String>,
}

/// Diagnostics and matched path for one input line.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    pub line: String,
    pub valid: bool,
    pub command: String,
    pub path: Vec<PathEntry>,
    pub unmatched: Vec<String>,
    pub errors: Vec<ParseError>,
}

impl ParseReport {
    pub fn new(result: &ParseResult<'_>) -> Self {
        let path: Vec<PathEntry> = result
            .path()
            .iter()
            .map(|entry| {
                let symbol = entry.symbol();
                PathEntry {
                    kind: match symbol {
                        Symbol::Command(_) => "command",
                        Symbol::Option(_) => "option",
                    },
                    name: symbol.name().to_string(),
                    values: entry.values().to_vec(),
                }
            })
            .collect();

        let command = path
            .iter()
            .filter(|entry| entry.kind == "command")
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            line: result.line().unwrap_or_default().to_string(),
            valid: result.is_valid(),
            command,
            unmatched: result
                .unmatched_tokens()
                .into_iter()
                .map(str::to_string)
                .collect(),
            errors: result.errors().to_vec(),
            path,
        }
    }
}

/// Candidates at a cursor position.
#[derive(Debug, Serialize)]
pub struct SuggestReport {
    pub line: String,
    pub position: Option<usize>,
    pub text_to_match: String,
    pub suggestions: Vec<String>,
}

impl SuggestReport {
    pub fn new(result: &ParseResult<'_>, position: Option<usize>) -> Self {
        Self {
            line: result.line().unwrap_or_default().to_string(),
            position,
            text_to_match: result.text_to_match(position).to_string(),
            suggestions: result.suggestions(position).into_iter().collect(),
        }
    }
}

/// Serializes `report` as JSON or YAML, or renders it with `table`.
pub fn render<T, F>(report: &T, format: OutputFormat, table: F) -> Result<String, String>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Table => Ok(table(report)),
    }
}

pub fn check_to_table(report: &CheckReport) -> String {
    format!(
        "{:<20} commands={} options={} hidden={}\n",
        report.root, report.commands, report.options, report.hidden
    )
}

pub fn parse_to_table(report: &ParseReport) -> String {
    let mut out = String::new();
    let status = if report.valid { "OK" } else { "INVALID" };
    out.push_str(&format!("{:<8} {}\n", status, report.line));

    for entry in &report.path {
        if entry.values.is_empty() {
            out.push_str(&format!("  {:<8} {}\n", entry.kind, entry.name));
        } else {
            out.push_str(&format!(
                "  {:<8} {} = {}\n",
                entry.kind,
                entry.name,
                entry.values.join(" ")
            ));
        }
    }
    for error in &report.errors {
        out.push_str(&format!("  error    {error}\n"));
    }
    out
}

pub fn parses_to_table(reports: &[ParseReport]) -> String {
    reports.iter().map(parse_to_table).collect()
}

pub fn suggest_to_table(report: &SuggestReport) -> String {
    let mut out = String::new();
    for suggestion in &report.suggestions {
        out.push_str(suggestion);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_grammar_core::{ArgumentRule, CommandOption};

    fn grammar() -> Command {
        Command::builder("tool")
            .help("Tool")
            .option(
                CommandOption::new(["--level", "-l"], "Level").with_argument(
                    ArgumentRule::builder()
                        .from_among(["low", "high"])
                        .build()
                        .unwrap(),
                ),
            )
            .option(CommandOption::new(["--debug"], ""))
            .subcommand(Command::builder("run").help("Run").build().unwrap())
            .subcommand(Command::builder("internal").build().unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_check_report_counts() {
        let report = CheckReport::new(&grammar());
        assert_eq!(report.root, "tool");
        assert_eq!(report.commands, 3);
        assert_eq!(report.options, 2);
        assert_eq!(report.hidden, 2);
    }

    #[test]
    fn test_parse_report_path() {
        let grammar = grammar();
        let report = ParseReport::new(&grammar.parse("tool -l high run"));

        assert!(report.valid);
        assert_eq!(report.command, "tool run");
        assert_eq!(report.path[1].kind, "option");
        assert_eq!(report.path[1].name, "--level");
        assert_eq!(report.path[1].values, vec!["high"]);
    }

    #[test]
    fn test_parse_report_json() {
        let grammar = grammar();
        let report = ParseReport::new(&grammar.parse("tool -l medium"));
        let json = render(&report, OutputFormat::Json, parse_to_table).unwrap();

        assert!(json.contains("\"valid\": false"));
        assert!(json.contains("\"kind\": \"value_not_in_allowed_set\""));
    }

    #[test]
    fn test_parse_report_table() {
        let grammar = grammar();
        let report = ParseReport::new(&grammar.parse("tool stray"));
        let table = render(&report, OutputFormat::Table, parse_to_table).unwrap();

        assert!(table.starts_with("INVALID"));
        assert!(table.contains("error"));
    }

    #[test]
    fn test_suggest_report_yaml() {
        let grammar = grammar();
        let report = SuggestReport::new(&grammar.parse("tool -l "), None);
        let yaml = render(&report, OutputFormat::Yaml, suggest_to_table).unwrap();

        assert!(yaml.contains("- high"));
        assert!(yaml.contains("- low"));
    }
}
