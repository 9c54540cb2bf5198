use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use wikirelink_core::config::load_config;
use wikirelink_core::input::{Document, READ_FAILURE_MESSAGE};
use wikirelink_core::rewrite::{RewriteReport, RewriteRules};
use wikirelink_core::runtime::{ResolvedRuntime, RuntimeOverrides, resolve_runtime};

#[derive(Debug, Parser)]
#[command(
    name = "wikirelink",
    version,
    about = "Rewrite /wiki/ links in an exported wiki page into relative .html links"
)]
struct Cli {
    #[arg(value_name = "FILE", help = "Exported page to rewrite (empty input when omitted)")]
    input: Option<PathBuf>,
    #[arg(long, value_name = "PATH", help = "Rewrite rules TOML (built-in rules when omitted)")]
    config: Option<PathBuf>,
    #[arg(long, help = "Print resolved runtime diagnostics to stderr")]
    diagnostics: bool,
    #[arg(long, help = "Print rewrite counts as JSON to stderr")]
    report: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let runtime = resolve_runtime_options(&cli)?;
    let rules = load_rules(&runtime)?;

    let document = Document::load(cli.input.as_deref());
    if document.read_failed() {
        println!("{READ_FAILURE_MESSAGE}");
    }

    let report = rules.apply(&document.text);
    println!("{}", report.output);

    if cli.diagnostics {
        eprintln!("[diagnostics]");
        eprintln!("{}", runtime.diagnostics());
        eprintln!("input: {}", document.describe_origin());
        print_rules(&rules);
    }
    if cli.report {
        print_report(&report)?;
    }

    Ok(())
}

fn resolve_runtime_options(cli: &Cli) -> Result<ResolvedRuntime> {
    let overrides = RuntimeOverrides {
        config: cli.config.clone(),
    };
    let runtime = resolve_runtime(&overrides);
    runtime.ensure_config_present()?;
    Ok(runtime)
}

fn load_rules(runtime: &ResolvedRuntime) -> Result<RewriteRules> {
    let Some(config_path) = runtime.config_path.as_deref() else {
        return Ok(RewriteRules::default());
    };
    let rules = load_config(config_path)?.rules()?;
    log::debug!(
        "loaded {} substitution(s) from {}",
        rules.substitutions.len(),
        config_path.display()
    );
    Ok(rules)
}

fn print_rules(rules: &RewriteRules) {
    eprintln!("rules.marker: {:?}", rules.marker);
    eprintln!("rules.terminator: {:?}", rules.terminator);
    eprintln!("rules.suffix: {:?}", rules.suffix);
    if rules.substitutions.is_empty() {
        eprintln!("rules.substitutions: <none>");
    } else {
        for rule in &rules.substitutions {
            eprintln!("rules.substitution: {:?} -> {:?}", rule.from, rule.to);
        }
    }
}

fn print_report(report: &RewriteReport) -> Result<()> {
    eprintln!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
