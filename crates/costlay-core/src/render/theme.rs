/// Colors for light and dark dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub dark: bool,
    /// Titles and headings
    pub title: &'static str,
    /// Axis labels, legend and fallback body text
    pub muted: &'static str,
    pub axis_line: &'static str,
    pub grid_line: &'static str,
    pub tooltip_background: &'static str,
    pub panel_background: &'static str,
    pub panel_border: &'static str,
    pub summary_text: &'static str,
}

impl Palette {
    pub fn for_theme(dark: bool) -> Self {
        if dark {
            Self {
                dark,
                title: "white",
                muted: "#a0a0a0",
                axis_line: "#404040",
                grid_line: "#2a2a2a",
                tooltip_background: "rgba(30, 30, 30, 0.85)",
                panel_background: "#1e1e1e",
                panel_border: "#404040",
                summary_text: "#a0a0a0",
            }
        } else {
            Self {
                dark,
                title: "black",
                muted: "#333",
                axis_line: "#ccd6eb",
                grid_line: "#e6e6e6",
                tooltip_background: "rgba(255, 255, 255, 0.85)",
                panel_background: "#f8f9fa",
                panel_border: "#e9ecef",
                summary_text: "#6c757d",
            }
        }
    }
}

/// Render `(property, value)` pairs as an inline `style` attribute
pub(crate) fn inline_style(rules: &[(&str, &str)]) -> String {
    rules
        .iter()
        .map(|(property, value)| format!("{}: {};", property, value))
        .collect::<Vec<_>>()
        .join(" ")
}
