//! TOML schema for `config.toml`.
//!
//! ```toml
//! output = "human"      # or "json"
//!
//! [layout]
//! lane_width = 280.0
//! settle_damping = 0.25
//!
//! [view]
//! max_frames = 2000
//!
//! [plan]
//! tag_prefix = "[Receptionist]"
//! ```
//!
//! Every table is optional and every missing key keeps its default.

use crate::gui::shared::layout::LayoutConfig;
use crate::models::receptionist::DEFAULT_TAG_PREFIX;
use serde::{Deserialize, Serialize};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Headless render loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Upper bound on frames run by `rp run arrange` and `rp run layout`
    pub max_frames: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { max_frames: 2000 }
    }
}

/// Receptionist plan push settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Prefix added to the title of every pushed task
    pub tag_prefix: String,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            tag_prefix: DEFAULT_TAG_PREFIX.to_string(),
        }
    }
}

/// User preferences stored in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicatorConfig {
    /// Default output format for CLI commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputFormat>,
    pub layout: LayoutConfig,
    pub view: ViewConfig,
    pub plan: PlanConfig,
}

impl ReplicatorConfig {
    /// Check value ranges the layout engine relies on.
    pub fn validate(&self) -> Result<(), String> {
        let layout = &self.layout;
        if !(layout.glide_factor > 0.0 && layout.glide_factor <= 1.0) {
            return Err(format!(
                "layout.glide_factor must be in (0, 1], got {}",
                layout.glide_factor
            ));
        }
        if !(0.0..=1.0).contains(&layout.settle_damping) {
            return Err(format!(
                "layout.settle_damping must be in [0, 1], got {}",
                layout.settle_damping
            ));
        }
        if layout.agents_per_row == 0 {
            return Err("layout.agents_per_row must be at least 1".to_string());
        }
        let positive = [
            ("layout.canvas_width", layout.canvas_width),
            ("layout.canvas_height", layout.canvas_height),
            ("layout.lane_width", layout.lane_width),
            ("layout.row_height", layout.row_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{} must be positive, got {}", name, value));
            }
        }
        if self.view.max_frames == 0 {
            return Err("view.max_frames must be at least 1".to_string());
        }
        Ok(())
    }
}
