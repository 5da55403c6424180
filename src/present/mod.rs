//! Presentation collaborators: display formatting, tier messages and chart rendering.

pub mod chart;
pub mod format;
pub mod message;

pub use chart::{
    ChartError, ChartSnapshot, DistributionChart, GrowthChart, Palette, Snapshot, Theme, label_step,
};
pub use format::{
    RATE_PRESETS, active_preset, format_axis_currency, format_currency, format_percent,
};
pub use message::tier_message;
