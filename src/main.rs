#![forbid(unsafe_code)]

use clap::{ArgAction, Parser};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SPARK_REPORT_LOG";

#[derive(Debug, Parser)]
#[command(name = "spark-report", version, about)]
struct Cli {
    /// Markdown report to convert; reads standard input when omitted or `-`.
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn write_output(path: Option<PathBuf>, contents: &str) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, contents),
        None => {
            print!("{contents}");
            Ok(())
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let input = spark_report::read_input(cli.input.as_deref())?;
    let output = spark_report::convert_markdown_to_html(&input, &spark_report::ReportOptions::default());
    info!(bytes = output.len(), "rendered report");
    write_output(cli.output, &output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbosity_maps_to_directives() {
        assert_eq!(verbosity_to_directive(0), "warn");
        assert_eq!(verbosity_to_directive(1), "info");
        assert_eq!(verbosity_to_directive(2), "debug");
        assert_eq!(verbosity_to_directive(9), "trace");
    }

    #[test]
    fn input_path_is_optional() {
        let cli = Cli::try_parse_from(["spark-report"]).expect("parse");
        assert!(cli.input.is_none());
        let cli = Cli::try_parse_from(["spark-report", "notes.md", "-o", "out.html", "-vv"])
            .expect("parse");
        assert_eq!(cli.input, Some(PathBuf::from("notes.md")));
        assert_eq!(cli.output, Some(PathBuf::from("out.html")));
        assert_eq!(cli.verbose, 2);
    }
}
