//! Simulated usage dashboard for trying the overlay without a browser.

mod content;
mod host;
mod scenario;

pub use content::{usage_row, usage_rows, TOOLTIP_FORMAT};
pub use host::DemoHost;
pub use scenario::{default_scenario, DemoScenario, HostAction, TimelineEvent, SETTINGS_URL, USAGE_URL};

use costlay_core::config::Settings;
use costlay_core::dom::DomError;
use costlay_core::page::{build_usage_page, Page, SharedPage, UsagePage, UsageRow};
use costlay_core::render::SnapshotChartEngine;

/// Build a loaded dashboard page at `url` showing `rows`
pub fn host_page(
    url: &str,
    rows: &[UsageRow],
    settings: &Settings,
    charting: bool,
    dark: bool,
) -> Result<(SharedPage, UsagePage), DomError> {
    let mut page = Page::new(url);
    if charting {
        page.set_charting(Some(Box::new(SnapshotChartEngine::new())));
    }
    if dark {
        let root = page.document.root();
        page.document.add_class(root, &settings.theme.dark_class)?;
    }
    let usage = build_usage_page(&mut page.document, &settings.view.heading, rows)?;
    Ok((page.shared(), usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, NaiveDate};
    use costlay_core::config::HourBasis;
    use costlay_core::monitor::{LoopMessage, OverlayController};
    use costlay_core::render::RenderOutcome;
    use std::time::Duration;

    fn settings() -> Settings {
        Settings {
            hour_basis: HourBasis::Utc,
            ..Settings::default()
        }
    }

    #[test]
    fn test_host_page_theme_and_charting() {
        let settings = settings();
        let (page, _) = host_page(USAGE_URL, &[], &settings, false, true).unwrap();
        let page = page.lock();
        assert!(page.is_dark("dark"));
        assert!(!page.has_charting());
    }

    #[test]
    fn test_host_actions() {
        let settings = settings();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let rows = usage_rows(start, 2, ChronoDuration::minutes(10));
        let (page, usage) = host_page(USAGE_URL, &rows, &settings, true, false).unwrap();
        let mut host = DemoHost::new(
            page.clone(),
            usage.tbody,
            rows,
            start + ChronoDuration::minutes(20),
            default_scenario(Duration::from_secs(10)),
        );

        host.apply(&HostAction::AppendRows(2)).unwrap();
        assert_eq!(host.rows().len(), 4);
        assert_eq!(page.lock().document.children(usage.tbody).len(), 4);

        host.apply(&HostAction::SetCharting(false)).unwrap();
        assert!(!page.lock().has_charting());

        host.apply(&HostAction::Navigate(SETTINGS_URL)).unwrap();
        assert_eq!(page.lock().search(), "tab=settings");
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_drives_overlay() {
        let settings = settings();
        let scenario = default_scenario(Duration::from_secs(10));
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let step = ChronoDuration::minutes(scenario.step_minutes);
        let rows = usage_rows(start, scenario.initial_rows, step);
        let next_at = start + step * scenario.initial_rows as i32;
        let (page, usage) = host_page(USAGE_URL, &rows, &settings, true, false).unwrap();

        let mut overlay = OverlayController::new(page.clone(), settings).start();
        let host = DemoHost::new(page, usage.tbody, rows, next_at, scenario).start();

        let mut reports = Vec::new();
        let mut disposed = false;
        while let Some(message) = overlay.messages.recv().await {
            match message {
                LoopMessage::CycleCompleted(report) => reports.push(report),
                LoopMessage::CycleFailed(e) => panic!("cycle failed: {}", e),
                LoopMessage::Disposed(_) => {
                    disposed = true;
                    break;
                }
            }
        }
        host.await.unwrap();

        assert!(disposed);
        assert_eq!(reports[0].visualization.chart, RenderOutcome::Created);
        // The burst of three appends is handled by a single cycle
        assert!(reports.iter().any(|r| r.records == 12 + 3 + 3));
        assert!(!reports.iter().any(|r| r.records == 12 + 3 + 1));
        // Identical re-render: rows patched again, chart untouched
        assert!(reports
            .iter()
            .any(|r| r.visualization.chart == RenderOutcome::Unchanged));
        assert!(reports
            .iter()
            .any(|r| r.visualization.fallback == RenderOutcome::Created));
        assert!(reports.iter().any(|r| !r.view_active));
    }
}
