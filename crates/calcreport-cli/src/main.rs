use anyhow::{Context, Result};
use calcreport_config::{Config, PreferredFormatter};
use calcreport_engine::{FormatOptions, Mode, NumericFormatter, Results, render_report};
use std::{env, path::PathBuf, process};

struct Args {
    source_path: PathBuf,
    results_path: PathBuf,
    mode: Mode,
    precision: Option<usize>,
    scientific: Option<bool>,
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {program} <source-file> --results <json-file> \
         [--mode standard|report|input] [--precision N] [--scientific]"
    );
    process::exit(1);
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("calcreport");

    let mut source_path = None;
    let mut results_path = None;
    let mut mode = Mode::Report;
    let mut precision = None;
    let mut scientific = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--results" => match iter.next() {
                Some(path) => results_path = Some(PathBuf::from(path)),
                None => usage(program),
            },
            "--mode" => match iter.next().and_then(|m| Mode::parse(m)) {
                Some(m) => mode = m,
                None => usage(program),
            },
            "--precision" => match iter.next().and_then(|p| p.parse().ok()) {
                Some(p) => precision = Some(p),
                None => usage(program),
            },
            "--scientific" => scientific = Some(true),
            flag if flag.starts_with("--") => usage(program),
            path => {
                if source_path.is_some() {
                    usage(program);
                }
                source_path = Some(PathBuf::from(path));
            }
        }
    }

    let (Some(source_path), Some(results_path)) = (source_path, results_path) else {
        usage(program)
    };
    Args {
        source_path,
        results_path,
        mode,
        precision,
        scientific,
    }
}

fn format_options(config: &Config) -> FormatOptions {
    FormatOptions {
        display_precision: config.display_precision,
        use_scientific_notation: config.use_scientific_notation,
        decimal_separator: config.decimal_separator.clone(),
        line_break: config.line_break.clone(),
        formatter: match config.preferred_formatter {
            PreferredFormatter::Latex => NumericFormatter::Latex,
            PreferredFormatter::Plain => NumericFormatter::Plain,
        },
        ..FormatOptions::default()
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let source = std::fs::read_to_string(&args.source_path)
        .with_context(|| format!("reading source file {}", args.source_path.display()))?;
    let results_json = std::fs::read_to_string(&args.results_path)
        .with_context(|| format!("reading results file {}", args.results_path.display()))?;
    let results: Results = serde_json::from_str(&results_json)
        .with_context(|| format!("parsing results file {}", args.results_path.display()))?;

    let document = render_report(
        &source,
        results,
        args.mode,
        args.precision,
        args.scientific,
        &format_options(&config),
    )
    .with_context(|| format!("rendering {}", args.source_path.display()))?;

    println!("{document}");
    Ok(())
}
