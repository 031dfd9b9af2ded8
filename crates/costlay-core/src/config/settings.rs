use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Time zone used to cut records into hourly buckets and to read naive dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HourBasis {
    /// The machine's local zone (matches what the dashboard displays)
    #[default]
    Local,
    /// UTC
    Utc,
}

/// Overlay settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Quiet period after the last host mutation before a cycle runs (milliseconds)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Inject the derived "Cost ($)" column into the host table
    #[serde(default = "default_inject_cost_column")]
    pub inject_cost_column: bool,

    /// Split costs into Included / Overage series instead of one total series
    #[serde(default = "default_categorized")]
    pub categorized: bool,

    /// Zone for hour buckets and naive timestamps
    #[serde(default)]
    pub hour_basis: HourBasis,

    /// Which page view the overlay applies to
    #[serde(default)]
    pub view: ViewSettings,

    /// Ids and marker attribute of the overlay's own nodes
    #[serde(default)]
    pub targets: TargetSettings,

    /// Category cell and label fragments
    #[serde(default)]
    pub categories: CategorySettings,

    /// Theme detection
    #[serde(default)]
    pub theme: ThemeSettings,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_inject_cost_column() -> bool {
    true
}

fn default_categorized() -> bool {
    true
}

/// Page view detection and mount anchor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Fragment the location's query string must contain
    #[serde(default = "default_view_query")]
    pub query: String,

    /// Trimmed text of the `<p>` heading render targets are mounted after
    #[serde(default = "default_view_heading")]
    pub heading: String,
}

fn default_view_query() -> String {
    "tab=usage".to_string()
}

fn default_view_heading() -> String {
    "Filtered Usage Events".to_string()
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            query: default_view_query(),
            heading: default_view_heading(),
        }
    }
}

/// Render target ids and the idempotency marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSettings {
    #[serde(default = "default_chart_id")]
    pub chart_id: String,

    #[serde(default = "default_fallback_id")]
    pub fallback_id: String,

    #[serde(default = "default_summary_id")]
    pub summary_id: String,

    /// Attribute set on patched header, rows and injected cells
    #[serde(default = "default_marker_attribute")]
    pub marker_attribute: String,
}

fn default_chart_id() -> String {
    "cursor-usage-chart-container".to_string()
}

fn default_fallback_id() -> String {
    "cursor-usage-fallback-chart".to_string()
}

fn default_summary_id() -> String {
    "cursor-usage-summary-line".to_string()
}

fn default_marker_attribute() -> String {
    "data-cursor-usage-cost-script".to_string()
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            chart_id: default_chart_id(),
            fallback_id: default_fallback_id(),
            summary_id: default_summary_id(),
            marker_attribute: default_marker_attribute(),
        }
    }
}

/// Category extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySettings {
    /// Zero-based index of the cell whose `title` holds the category label
    #[serde(default = "default_category_cell")]
    pub cell_index: usize,

    /// Label fragments classifying a row as Included
    #[serde(default = "default_included_labels")]
    pub included: Vec<String>,

    /// Label fragments classifying a row as Overage
    #[serde(default = "default_overage_labels")]
    pub overage: Vec<String>,
}

fn default_category_cell() -> usize {
    2
}

fn default_included_labels() -> Vec<String> {
    vec!["Included".to_string()]
}

fn default_overage_labels() -> Vec<String> {
    vec!["Usage-based".to_string()]
}

impl Default for CategorySettings {
    fn default() -> Self {
        Self {
            cell_index: default_category_cell(),
            included: default_included_labels(),
            overage: default_overage_labels(),
        }
    }
}

/// Theme detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeSettings {
    /// Class on the document root that marks dark mode
    #[serde(default = "default_dark_class")]
    pub dark_class: String,
}

fn default_dark_class() -> String {
    "dark".to_string()
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            dark_class: default_dark_class(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            inject_cost_column: default_inject_cost_column(),
            categorized: default_categorized(),
            hour_basis: HourBasis::default(),
            view: ViewSettings::default(),
            targets: TargetSettings::default(),
            categories: CategorySettings::default(),
            theme: ThemeSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                return Self::read(p);
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("costlay/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/costlay/config.toml")),
            dirs::home_dir().map(|p| p.join(".costlay.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::read(path);
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    fn read(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Validate and normalize settings values
    ///
    /// Keeps the debounce window at least 10ms so a chatty host cannot turn
    /// every single mutation into its own cycle.
    pub fn validate(&mut self) {
        const MIN_DEBOUNCE_MS: u64 = 10;

        if self.debounce_ms < MIN_DEBOUNCE_MS {
            self.debounce_ms = MIN_DEBOUNCE_MS;
        }
        if self.view.query.trim().is_empty() {
            self.view.query = default_view_query();
        }
        if self.targets.marker_attribute.trim().is_empty() {
            self.targets.marker_attribute = default_marker_attribute();
        }
    }
}
