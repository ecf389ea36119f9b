use clap::{Parser, Subcommand};
use mergebench_core::config::{Settings, ToolPair};
use mergebench_core::logging::init_logging;
use mergebench_core::report::{Report, ReportOptions};
use mergebench_core::scenario::ScenarioTable;
use mergebench_core::{compare, ConfusionMatrix};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mergebench",
    about = "Confusion matrices and pairwise statistics for three-way merge tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the settings file (defaults are used if it does not exist)
    #[arg(long, default_value = "mergebench.json")]
    config: PathBuf,

    /// Scenario results file, overriding the configured one
    #[arg(long)]
    scenarios: Option<PathBuf>,

    /// Log every pairwise routing decision and include them in the output
    #[arg(long)]
    debug: bool,

    /// Also write logs to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Confusion matrices for every tool plus every configured pair
    Report,
    /// Confusion matrices only
    Matrix {
        /// Restrict to one tool
        #[arg(long)]
        tool: Option<String>,
    },
    /// Compare two tools head to head
    Compare {
        tool_a: String,
        tool_b: String,
    },
    /// Print the effective settings
    Config {
        /// Write the built-in defaults to the settings path instead
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load_or_default(&cli.config)?;
    if let Some(path) = &cli.scenarios {
        settings.input.scenarios = path.clone();
    }
    if let Some(dir) = &cli.log_dir {
        settings.logging.log_dir = Some(dir.clone());
    }

    let _guard = init_logging(settings.logging.log_dir.as_deref(), cli.debug)?;

    match &cli.command {
        Commands::Report => cmd_report(&cli, &settings).await,
        Commands::Matrix { tool } => cmd_matrix(&settings, tool.as_deref()).await,
        Commands::Compare { tool_a, tool_b } => cmd_compare(&cli, &settings, tool_a, tool_b).await,
        Commands::Config { write } => cmd_config(&cli, &settings, *write),
    }
}

async fn load_table(settings: &Settings) -> anyhow::Result<ScenarioTable> {
    let table = ScenarioTable::load(&settings.input.scenarios).await?;
    if table.is_empty() {
        tracing::warn!("Scenario file contains no scenarios");
    }
    for tool in table.tools_seen() {
        if !settings.tools.iter().any(|t| t == tool) {
            tracing::warn!(tool, "Tool present in scenarios but not configured; ignoring");
        }
    }
    Ok(table)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_report(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    settings.validate()?;
    let table = load_table(settings).await?;
    let options = ReportOptions {
        include_decisions: cli.debug,
    };
    let report = Report::build_parallel(&table, &settings.tools, &settings.pairs, options).await?;
    print_json(&report)
}

async fn cmd_matrix(settings: &Settings, tool: Option<&str>) -> anyhow::Result<()> {
    let table = load_table(settings).await?;
    let tools: Vec<&str> = match tool {
        Some(t) => vec![t],
        None => settings.tools.iter().map(String::as_str).collect(),
    };
    let matrices: Vec<ConfusionMatrix> = tools
        .iter()
        .map(|t| ConfusionMatrix::compute(&table.tool_results(t)))
        .collect();
    print_json(&matrices)
}

async fn cmd_compare(
    cli: &Cli,
    settings: &Settings,
    tool_a: &str,
    tool_b: &str,
) -> anyhow::Result<()> {
    let pair = ToolPair::new(tool_a, tool_b);
    let adhoc = Settings {
        tools: vec![pair.tool_a.clone(), pair.tool_b.clone()],
        pairs: vec![pair],
        ..settings.clone()
    };
    adhoc.validate()?;

    let table = load_table(settings).await?;
    let data = table.tool_table(&adhoc.tools);
    let mut result = compare(tool_a, tool_b, &data, &table.universe());
    if !cli.debug {
        result.decisions.clear();
    }
    print_json(&result)
}

fn cmd_config(cli: &Cli, settings: &Settings, write: bool) -> anyhow::Result<()> {
    if write {
        let defaults = Settings::write_default(&cli.config)?;
        eprintln!("Default settings written to {}", cli.config.display());
        return print_json(&defaults);
    }
    settings.validate()?;
    print_json(settings)
}
