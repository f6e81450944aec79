use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use storefront_core::{load_settings, memory::fixture::PageFixture, MemoryPage, Simulator};
use tracing::info;

mod script;

use script::{run_step, transcript, Step};

/// Replays scripted user actions against a server-rendered page and prints
/// what the storefront behaviors did.
#[derive(Parser, Debug)]
struct Cli {
    /// Page fixture (JSON).
    #[arg(long)]
    page: PathBuf,
    /// Steps to replay (JSON array).
    #[arg(long)]
    script: PathBuf,
    /// Settings file (TOML). Missing files fall back to defaults.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Selectors whose matches are snapshotted after the run.
    #[arg(long)]
    inspect: Vec<String>,
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref()).context("loading settings")?;

    let raw_page = fs::read_to_string(&cli.page)
        .with_context(|| format!("reading {}", cli.page.display()))?;
    let fixture: PageFixture = serde_json::from_str(&raw_page)
        .with_context(|| format!("parsing page fixture {}", cli.page.display()))?;
    let raw_script = fs::read_to_string(&cli.script)
        .with_context(|| format!("reading {}", cli.script.display()))?;
    let steps: Vec<Step> = serde_json::from_str(&raw_script)
        .with_context(|| format!("parsing script {}", cli.script.display()))?;

    let page = MemoryPage::from_fixture(&fixture)?;
    let mut sim = Simulator::boot(page, &settings)?;
    info!(url = %fixture.url, steps = steps.len(), "replaying script");

    let mut reports = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let report = run_step(&mut sim, index, step).with_context(|| format!("step {index}"))?;
        reports.push(report);
    }

    let transcript = transcript(&sim, reports, &cli.inspect);
    sim.teardown();

    let output = if cli.pretty {
        serde_json::to_string_pretty(&transcript)?
    } else {
        serde_json::to_string(&transcript)?
    };
    println!("{output}");
    Ok(())
}
