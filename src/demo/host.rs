use chrono::{Duration as ChronoDuration, NaiveDateTime};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

use costlay_core::dom::{DomError, NodeId};
use costlay_core::page::{render_usage_rows, SharedPage, UsageRow};
use costlay_core::render::SnapshotChartEngine;

use super::content::usage_row;
use super::scenario::{DemoScenario, HostAction};

/// Plays a [`DemoScenario`] against a shared page, the way the real
/// dashboard mutates its own document
pub struct DemoHost {
    page: SharedPage,
    tbody: NodeId,
    rows: Vec<UsageRow>,
    /// Timestamp of the next generated event
    next_at: NaiveDateTime,
    step: ChronoDuration,
    scenario: DemoScenario,
}

impl DemoHost {
    /// `rows` are the rows already rendered into `tbody`, newest first
    pub fn new(
        page: SharedPage,
        tbody: NodeId,
        rows: Vec<UsageRow>,
        next_at: NaiveDateTime,
        scenario: DemoScenario,
    ) -> Self {
        Self {
            page,
            tbody,
            rows,
            next_at,
            step: ChronoDuration::minutes(scenario.step_minutes),
            scenario,
        }
    }

    /// Start playing the timeline in a background task
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(mut self) {
        let start = Instant::now();
        let timeline = std::mem::take(&mut self.scenario.timeline);

        for event in timeline {
            tokio::time::sleep_until(start + event.at).await;
            info!("Host: {}", event.label);
            if let Err(e) = self.apply(&event.action) {
                warn!("Host action {:?} failed: {}", event.action, e);
            }
        }
    }

    /// Apply one action to the page
    pub fn apply(&mut self, action: &HostAction) -> Result<(), DomError> {
        let mut page = self.page.lock();
        match action {
            HostAction::AppendRows(count) => {
                for _ in 0..*count {
                    let row = usage_row(self.next_at, self.rows.len());
                    self.rows.insert(0, row);
                    self.next_at += self.step;
                }
                render_usage_rows(&mut page.document, self.tbody, &self.rows)
            }
            HostAction::Rerender => render_usage_rows(&mut page.document, self.tbody, &self.rows),
            HostAction::Navigate(url) => {
                page.navigate(url);
                render_usage_rows(&mut page.document, self.tbody, &self.rows)
            }
            HostAction::SetCharting(available) => {
                if *available {
                    page.set_charting(Some(Box::new(SnapshotChartEngine::new())));
                } else {
                    page.set_charting(None);
                }
                Ok(())
            }
            HostAction::Unload => {
                page.unload();
                Ok(())
            }
        }
    }

    pub fn rows(&self) -> &[UsageRow] {
        &self.rows
    }
}
