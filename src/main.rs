use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use momentum_screener::api::YahooClient;
use momentum_screener::models::{
    Config, FilterSelection, Region, ScreenOutcome, ScreenReport, Window,
};
use momentum_screener::screener::ScreenerEngine;
use momentum_screener::ui;
use momentum_screener::universe::default_universe;

/// Momentum screener over a hand-curated set of global tickers
#[derive(Parser, Debug)]
#[command(name = "momentum-screener")]
struct Args {
    /// Regions to include (US, UK, EU, Asia); defaults to all
    #[arg(long = "region", value_name = "REGION")]
    regions: Vec<String>,

    /// Sectors to include; no flag means no sector restriction
    #[arg(long = "sector", value_name = "SECTOR")]
    sectors: Vec<String>,

    /// Lookback window: 1w or 1m
    #[arg(long, default_value = "1w")]
    window: String,

    /// Run a single screening pass and print the table instead of the dashboard
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Keep logs quiet while the TUI owns the terminal
    let level = if args.headless { Level::INFO } else { Level::ERROR };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let selection = build_selection(&args)?;
    let universe = default_universe();
    let provider = YahooClient::new(&config)?;
    let engine = ScreenerEngine::new(provider);

    let runtime = tokio::runtime::Runtime::new()?;

    if args.headless {
        let today = chrono::Utc::now().date_naive();
        let report = runtime.block_on(engine.screen(&universe, &selection, today));
        print_report(&report);
        Ok(())
    } else {
        ui::run_app(&runtime, engine, universe, selection)
    }
}

fn build_selection(args: &Args) -> Result<FilterSelection> {
    let window: Window = args.window.parse().map_err(|e: String| anyhow!(e))?;

    let mut selection = if args.regions.is_empty() {
        FilterSelection::all_regions(window)
    } else {
        let mut selection = FilterSelection {
            regions: Default::default(),
            sectors: Default::default(),
            window,
        };
        for raw in &args.regions {
            let region: Region = raw.parse().map_err(|e: String| anyhow!(e))?;
            selection.regions.insert(region);
        }
        selection
    };

    selection.sectors = args.sectors.iter().cloned().collect();
    Ok(selection)
}

fn print_report(report: &ScreenReport) {
    println!(
        "Showing data from {} to {}",
        report.start_date, report.end_date
    );
    println!();

    match report.outcome() {
        ScreenOutcome::NoCriteriaMatched => {
            println!("No data available for the selected criteria.");
        }
        ScreenOutcome::NoUsableData => {
            println!("No valid data available after filtering.");
        }
        ScreenOutcome::Ranked => {
            println!(
                "{:<8} {:<10} {:<6} {:<12} {:>10} {:>10} {:>18}",
                "Ticker",
                "Name",
                "Region",
                "Sector",
                "Start",
                "End",
                report.change_column_label()
            );
            for row in &report.rows {
                println!(
                    "{:<8} {:<10} {:<6} {:<12} {:>10.2} {:>10.2} {:>+17.2}%",
                    row.symbol,
                    row.name,
                    row.region,
                    row.sector,
                    row.start_price,
                    row.end_price,
                    row.percent_change
                );
            }

            if let Some(summary) = report.summary() {
                println!();
                println!(
                    "🏆 Top Performer: {} ({}) with {:+.2}%",
                    summary.top.name, summary.top.symbol, summary.top.percent_change
                );
                println!(
                    "Avg {:+.2}% • {}/{} positive ({:.0}%)",
                    summary.mean_change,
                    summary.positive,
                    report.rows.len(),
                    summary.positive_share * 100.0
                );
            }
        }
    }

    if !report.failures.is_empty() {
        println!();
        println!("⚠ Data Fetch Issues:");
        for failure in &report.failures {
            println!("  {}", failure);
        }
    }
}
