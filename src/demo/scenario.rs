use std::time::Duration;

/// Location of the simulated usage view
pub const USAGE_URL: &str = "https://cursor.com/dashboard?tab=usage";

/// Location of an unrelated dashboard view
pub const SETTINGS_URL: &str = "https://cursor.com/dashboard?tab=settings";

/// Something the simulated host page does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    /// New usage events arrive; the host re-renders the whole table body
    AppendRows(usize),
    /// The host re-renders the same rows (fresh nodes, identical content)
    Rerender,
    /// Client-side navigation, followed by a re-render
    Navigate(&'static str),
    /// The charting library finishes loading (`true`) or goes away
    SetCharting(bool),
    /// The page is torn down
    Unload,
}

/// A single event in the demo timeline
#[derive(Debug, Clone)]
pub struct TimelineEvent {
    /// Time offset from scenario start
    pub at: Duration,
    pub action: HostAction,
    /// Shown in the log when the event fires
    pub label: &'static str,
}

/// Complete demo scenario
#[derive(Debug, Clone)]
pub struct DemoScenario {
    /// Rows present when the page loads
    pub initial_rows: usize,
    /// Minutes between consecutive usage events
    pub step_minutes: i64,
    pub timeline: Vec<TimelineEvent>,
}

/// Build the default demo scenario, stretched over `length`
pub fn default_scenario(length: Duration) -> DemoScenario {
    let at = |tenths: u32| length * tenths / 10;
    let burst = |tenths: u32, n: u32| at(tenths) + Duration::from_millis(40) * n;

    let event = |offset: Duration, action: HostAction, label: &'static str| TimelineEvent {
        at: offset,
        action,
        label,
    };

    let timeline = vec![
        event(at(1), HostAction::AppendRows(3), "new usage events arrive"),
        event(at(2), HostAction::Rerender, "host re-renders identical rows"),
        // A burst of updates inside one debounce window
        event(burst(3, 0), HostAction::AppendRows(1), "burst: event 1/3"),
        event(burst(3, 1), HostAction::AppendRows(1), "burst: event 2/3"),
        event(burst(3, 2), HostAction::AppendRows(1), "burst: event 3/3"),
        event(at(5), HostAction::SetCharting(false), "charting library unloaded"),
        event(burst(5, 1), HostAction::Rerender, "host re-renders without charts"),
        event(at(6), HostAction::SetCharting(true), "charting library loaded"),
        event(burst(6, 1), HostAction::Rerender, "host re-renders with charts"),
        event(at(7), HostAction::Navigate(SETTINGS_URL), "navigate to settings"),
        event(at(8), HostAction::Navigate(USAGE_URL), "navigate back to usage"),
        event(at(10), HostAction::Unload, "page unload"),
    ];

    DemoScenario {
        initial_rows: 12,
        step_minutes: 17,
        timeline,
    }
}
