use clap::{Args, Parser, Subcommand};
use log::error;
use std::{fmt::Write, path::PathBuf, process::ExitCode};

use crate::client::{ChartClient, ChartSource};
use crate::config;
use crate::domain::{category::ChartCategory, normalize::normalize_table};
use crate::present::{
    error::ViewError,
    table::{self, SortKey, TableOptions},
};
use crate::visualize::{ChartVisualizationKind, compute_visualization, text::render_text};

#[derive(Parser)]
#[command(name = "chartdeck")]
#[command(version = "0.1")]
#[command(about = "Top charts browser: tables per category, charts for tracks")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base url of the chart backend, overrides the config file
    #[arg(long)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the chart of one category
    Show(ShowArgs),
    /// Run http server hosting the dashboard
    Serve,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[arg(value_enum)]
    pub category: ChartCategory,

    /// Chart to draw below the table (tracks only)
    #[arg(long, value_enum)]
    pub chart: Option<ChartVisualizationKind>,

    /// Column to sort the table by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Print normalized records as JSON instead of a table
    #[arg(long, conflicts_with_all = ["chart", "sort"])]
    pub json: bool,
}

/// Entrypoint for CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // user-facing messages come from ViewError's Display
            match err.downcast_ref::<ViewError>() {
                Some(view_error) => eprintln!("{view_error}"),
                None => {
                    error!("{err:#}");
                    eprintln!("Error: {err:#}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> anyhow::Result<()> {
    let mut cfg = config::Config::load_or_default(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        cfg.upstream.base_url = base_url;
    }

    match cli.command {
        Commands::Show(args) => {
            let client = ChartClient::new(&cfg.upstream);
            print!("{}", render_show(&client, &args)?);
        }

        Commands::Serve => {
            println!("Starting HTTP server...");
            let http_server =
                crate::http::server::HttpServer::new(ChartClient::new(&cfg.upstream), cfg.http);

            println!(
                "HTTP server running at http://{}:{}, charts from {}",
                http_server.config.bind_addr, http_server.config.port, cfg.upstream.base_url
            );
            http_server.run()?;
        }
    }
    Ok(())
}

/// Output of `show`: the table, then the requested chart.
///
/// A chart that cannot be drawn only replaces the chart area with a warning.
pub fn render_show(source: &impl ChartSource, args: &ShowArgs) -> anyhow::Result<String> {
    let items = source.fetch(args.category).map_err(ViewError::from)?;
    let table = normalize_table(args.category, &items);
    if table.is_empty() {
        return Err(ViewError::EmptyResult {
            category: args.category,
        }
        .into());
    }

    if args.json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&table.records)?));
    }

    let options = TableOptions {
        sort: args.sort.clone().map(|column| SortKey {
            column,
            descending: args.desc,
        }),
        ..Default::default()
    };
    let rendered = table::render_text(&table, &options)?;

    let mut out = format!("Top {}\n\n{rendered}", args.category.label());
    if let Some(kind) = args.chart {
        let _ = writeln!(out, "\n{}\n", kind.title());
        match compute_visualization(kind, &table) {
            Ok(spec) => out.push_str(&render_text(&spec)),
            Err(err) => {
                let _ = writeln!(out, "{}", ViewError::from(err));
            }
        }
    }
    Ok(out)
}
