use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Local, Timelike};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use costlay::config::{Command, Config, MergeCli};
use costlay::demo::{self, DemoHost, USAGE_URL};
use costlay_core::config::Settings;
use costlay_core::monitor::{CycleReport, LoopMessage, OverlayController};
use costlay_core::page::{SharedPage, UsageRow};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug);

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();

    match cli.command {
        Command::Demo {
            no_chart,
            dark,
            seconds,
            output,
        } => run_demo(settings, !no_chart, dark, seconds, output.as_deref()).await,
        Command::Render {
            rows,
            no_chart,
            dark,
            output,
        } => run_render(settings, &rows, !no_chart, dark, output.as_deref()),
    }
}

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("costlay=debug,costlay_core=debug")
    } else {
        EnvFilter::new("costlay=info,costlay_core=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Play the demo scenario against a simulated dashboard
async fn run_demo(
    settings: Settings,
    charting: bool,
    dark: bool,
    seconds: u64,
    output: Option<&Path>,
) -> Result<()> {
    let scenario = demo::default_scenario(Duration::from_secs(seconds.max(1)));
    let step = ChronoDuration::minutes(scenario.step_minutes);
    // Start a few hours back so the session ends around now
    let start = Local::now()
        .naive_local()
        .with_second(0)
        .unwrap_or_else(|| Local::now().naive_local())
        - step * scenario.initial_rows as i32;
    let rows = demo::usage_rows(start, scenario.initial_rows, step);
    let next_at = start + step * scenario.initial_rows as i32;

    let (page, usage) = demo::host_page(USAGE_URL, &rows, &settings, charting, dark)
        .context("Failed to build demo page")?;
    info!(
        "Demo: {} rows, charting={}, dark={}, {}s",
        rows.len(),
        charting,
        dark,
        seconds
    );

    let mut overlay = OverlayController::new(page.clone(), settings).start();
    let host = DemoHost::new(page.clone(), usage.tbody, rows, next_at, scenario).start();

    let mut snapshot = None;
    while let Some(message) = overlay.messages.recv().await {
        match message {
            LoopMessage::CycleCompleted(report) => {
                log_report(&report);
                if report.view_active {
                    snapshot = Some(page_html(&page));
                }
            }
            LoopMessage::CycleFailed(e) => warn!("Cycle failed: {}", e),
            LoopMessage::Disposed(report) => {
                info!(
                    "Overlay disposed: chart={:?}, fallback={:?}, summary={:?}",
                    report.chart, report.fallback, report.summary
                );
                break;
            }
        }
    }
    host.await.context("Demo host task failed")?;

    let html = snapshot.unwrap_or_else(|| page_html(&page));
    write_output(output, &html)
}

/// Run one cycle over a rows fixture and emit the resulting page
fn run_render(
    settings: Settings,
    rows_path: &Path,
    charting: bool,
    dark: bool,
    output: Option<&Path>,
) -> Result<()> {
    let content = std::fs::read_to_string(rows_path)
        .with_context(|| format!("Failed to read rows file: {:?}", rows_path))?;
    let rows: Vec<UsageRow> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse rows file: {:?}", rows_path))?;

    let (page, _) = demo::host_page(USAGE_URL, &rows, &settings, charting, dark)
        .context("Failed to build page")?;

    let mut controller = OverlayController::new(page.clone(), settings);
    controller.attach();
    let report = controller.run_cycle()?;
    log_report(&report);

    write_output(output, &page_html(&page))
}

fn log_report(report: &CycleReport) {
    info!(
        "Cycle: view={}, records={}, chart={:?}, fallback={:?}, summary={:?}",
        report.view_active,
        report.records,
        report.visualization.chart,
        report.visualization.fallback,
        report.summary
    );
    if let Ok(json) = serde_json::to_string(report) {
        debug!("Cycle report: {}", json);
    }
}

fn page_html(page: &SharedPage) -> String {
    let page = page.lock();
    page.document.outer_html(page.document.root())
}

fn write_output(output: Option<&Path>, html: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, html)
                .with_context(|| format!("Failed to write output file: {:?}", path))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", html),
    }
    Ok(())
}
