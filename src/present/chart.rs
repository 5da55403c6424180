use std::fmt::Write as _;

use serde::Serialize;
use thiserror::Error;

use super::format::{format_axis_currency, format_share};
use crate::core::ProjectionResult;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Anything other than "dark" falls back to the light theme.
    pub fn parse(text: &str) -> Self {
        if text.trim().eq_ignore_ascii_case("dark") {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub invested: &'static str,
    pub interest: &'static str,
    pub total: &'static str,
    pub grid: &'static str,
    pub text: &'static str,
    pub background: &'static str,
    pub gradient_start: &'static str,
    pub gradient_end: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        let dark = theme == Theme::Dark;
        Self {
            invested: "#3b82f6",
            interest: "#10b981",
            total: "#6366f1",
            grid: if dark {
                "rgba(255,255,255,0.08)"
            } else {
                "rgba(0,0,0,0.06)"
            },
            text: if dark { "#94a3b8" } else { "#64748b" },
            background: if dark { "#0f172a" } else { "#ffffff" },
            gradient_start: if dark {
                "rgba(99,102,241,0.4)"
            } else {
                "rgba(99,102,241,0.25)"
            },
            gradient_end: "rgba(99,102,241,0)",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("chart has no data points")]
    EmptySeries,
    #[error("chart value for {label} is not finite: {value}")]
    NonFinite { label: String, value: f64 },
}

/// A standalone SVG document together with its intrinsic size in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub svg: String,
    pub width: f64,
    pub height: f64,
}

pub trait ChartSnapshot {
    fn snapshot(&self, palette: &Palette) -> Result<Snapshot, ChartError>;
}

fn ensure_finite(label: impl Into<String>, value: f64) -> Result<(), ChartError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ChartError::NonFinite {
            label: label.into(),
            value,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice {
    pub label: &'static str,
    pub value: f64,
    /// One-decimal share of the whole, as shown in the tooltip.
    pub share: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionChart {
    pub invested: Slice,
    pub interest: Slice,
}

impl DistributionChart {
    /// Negative amounts are drawn as empty slices.
    pub fn from_result(result: &ProjectionResult) -> Self {
        let invested = result.total_invested.max(0.0);
        let interest = result.total_interest.max(0.0);
        let whole = invested + interest;
        Self {
            invested: Slice {
                label: "Contributed capital",
                value: invested,
                share: format_share(invested, whole),
            },
            interest: Slice {
                label: "Interest earned",
                value: interest,
                share: format_share(interest, whole),
            },
        }
    }
}

impl ChartSnapshot for DistributionChart {
    fn snapshot(&self, palette: &Palette) -> Result<Snapshot, ChartError> {
        ensure_finite(self.invested.label, self.invested.value)?;
        ensure_finite(self.interest.label, self.interest.value)?;

        const SIZE: f64 = 240.0;
        const RADIUS: f64 = 70.0;
        // 65% cutout.
        const STROKE: f64 = RADIUS * 0.42;
        let center = SIZE / 2.0 - 20.0;
        let circumference = 2.0 * std::f64::consts::PI * RADIUS;
        let whole = self.invested.value + self.interest.value;

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{SIZE}" height="{SIZE}" viewBox="0 0 {SIZE} {SIZE}" font-family="Inter, sans-serif">"#
        );
        let _ = write!(
            svg,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            palette.background
        );
        let _ = write!(
            svg,
            r#"<circle cx="{x}" cy="{center}" r="{RADIUS}" fill="none" stroke="{}" stroke-width="{STROKE}"/>"#,
            palette.grid,
            x = SIZE / 2.0,
        );

        if whole > 0.0 {
            let mut offset = 0.0;
            for (slice, color) in [
                (&self.invested, palette.invested),
                (&self.interest, palette.interest),
            ] {
                let length = slice.value / whole * circumference;
                let _ = write!(
                    svg,
                    r#"<circle cx="{x}" cy="{center}" r="{RADIUS}" fill="none" stroke="{color}" stroke-width="{STROKE}" stroke-dasharray="{length:.3} {gap:.3}" stroke-dashoffset="{dash:.3}" transform="rotate(-90 {x} {center})"/>"#,
                    x = SIZE / 2.0,
                    gap = circumference - length,
                    dash = -offset,
                );
                offset += length;
            }
        }

        let legend_y = SIZE - 14.0;
        for (idx, (slice, color)) in [
            (&self.invested, palette.invested),
            (&self.interest, palette.interest),
        ]
        .into_iter()
        .enumerate()
        {
            let x = 16.0 + idx as f64 * 116.0;
            let _ = write!(
                svg,
                r#"<circle cx="{x}" cy="{cy}" r="5" fill="{color}"/><text x="{tx}" y="{legend_y}" font-size="11" font-weight="600" fill="{}">{}</text>"#,
                palette.text,
                slice.label,
                cy = legend_y - 4.0,
                tx = x + 9.0,
            );
        }
        svg.push_str("</svg>");
        Ok(Snapshot {
            svg,
            width: SIZE,
            height: SIZE,
        })
    }
}

/// Every 2nd label above 15 points, every 5th above 30.
pub fn label_step(points: usize) -> usize {
    if points > 30 {
        5
    } else if points > 15 {
        2
    } else {
        1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthChart {
    pub ages: Vec<i64>,
    /// Axis labels after thinning; hidden ones are empty.
    pub labels: Vec<String>,
    pub total: Vec<f64>,
    pub invested: Vec<f64>,
}

impl GrowthChart {
    pub fn from_result(result: &ProjectionResult) -> Self {
        let series = &result.yearly_series;
        let step = label_step(series.len());
        let last = series.len().saturating_sub(1);
        Self {
            ages: series.iter().map(|p| p.age).collect(),
            labels: series
                .iter()
                .enumerate()
                .map(|(idx, p)| {
                    if idx % step == 0 || idx == last {
                        p.age.to_string()
                    } else {
                        String::new()
                    }
                })
                .collect(),
            total: series.iter().map(|p| p.total).collect(),
            invested: series.iter().map(|p| p.invested).collect(),
        }
    }
}

impl ChartSnapshot for GrowthChart {
    fn snapshot(&self, palette: &Palette) -> Result<Snapshot, ChartError> {
        if self.total.is_empty() {
            return Err(ChartError::EmptySeries);
        }
        for ((age, total), invested) in self.ages.iter().zip(&self.total).zip(&self.invested) {
            ensure_finite(format!("total at age {age}"), *total)?;
            ensure_finite(format!("invested at age {age}"), *invested)?;
        }

        const WIDTH: f64 = 600.0;
        const HEIGHT: f64 = 360.0;
        const LEFT: f64 = 64.0;
        const RIGHT: f64 = 16.0;
        const TOP: f64 = 36.0;
        const BOTTOM: f64 = 44.0;
        const TICKS: usize = 5;
        let plot_w = WIDTH - LEFT - RIGHT;
        let plot_h = HEIGHT - TOP - BOTTOM;

        let values = self.total.iter().chain(&self.invested).copied();
        let (min, max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let span = if max > min { max - min } else { 1.0 };
        let count = self.total.len();
        let x_at = |idx: usize| {
            if count > 1 {
                LEFT + plot_w * idx as f64 / (count - 1) as f64
            } else {
                LEFT + plot_w / 2.0
            }
        };
        let y_at = |value: f64| TOP + plot_h * (1.0 - (value - min) / span);
        let path = |values: &[f64]| {
            values
                .iter()
                .enumerate()
                .map(|(idx, v)| format!("{:.2},{:.2}", x_at(idx), y_at(*v)))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="Inter, sans-serif">"#
        );
        let _ = write!(
            svg,
            r#"<defs><linearGradient id="totalFill" x1="0" y1="0" x2="0" y2="1"><stop offset="0" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient></defs>"#,
            palette.gradient_start, palette.gradient_end
        );
        let _ = write!(
            svg,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            palette.background
        );

        for tick in 0..=TICKS {
            let value = min + span * tick as f64 / TICKS as f64;
            let y = y_at(value);
            let _ = write!(
                svg,
                r#"<line x1="{LEFT}" y1="{y:.2}" x2="{x2}" y2="{y:.2}" stroke="{}"/><text x="{tx}" y="{ty:.2}" font-size="11" text-anchor="end" fill="{}">{}</text>"#,
                palette.grid,
                palette.text,
                format_axis_currency(value),
                x2 = WIDTH - RIGHT,
                tx = LEFT - 6.0,
                ty = y + 4.0,
            );
        }
        for (idx, label) in self.labels.iter().enumerate() {
            if label.is_empty() {
                continue;
            }
            let _ = write!(
                svg,
                r#"<text x="{x:.2}" y="{y}" font-size="11" text-anchor="middle" fill="{}">{label}</text>"#,
                palette.text,
                x = x_at(idx),
                y = HEIGHT - BOTTOM + 16.0,
            );
        }
        let _ = write!(
            svg,
            r#"<text x="{x}" y="{y}" font-size="12" font-weight="600" text-anchor="middle" fill="{}">Age</text>"#,
            palette.text,
            x = LEFT + plot_w / 2.0,
            y = HEIGHT - 8.0,
        );

        let baseline = y_at(min.max(0.0).min(max));
        let _ = write!(
            svg,
            r#"<polygon points="{x0:.2},{baseline:.2} {} {x1:.2},{baseline:.2}" fill="url(#totalFill)"/>"#,
            path(&self.total),
            x0 = x_at(0),
            x1 = x_at(count - 1),
        );
        let _ = write!(
            svg,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2.5"/>"#,
            path(&self.total),
            palette.total
        );
        let _ = write!(
            svg,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2" stroke-dasharray="6 4"/>"#,
            path(&self.invested),
            palette.invested
        );

        let legend_x = WIDTH - RIGHT - 250.0;
        for (idx, (label, color)) in [
            ("Accumulated value", palette.total),
            ("Invested capital", palette.invested),
        ]
        .into_iter()
        .enumerate()
        {
            let x = legend_x + idx as f64 * 130.0;
            let _ = write!(
                svg,
                r#"<circle cx="{x}" cy="16" r="5" fill="{color}"/><text x="{tx}" y="20" font-size="11" font-weight="600" fill="{}">{label}</text>"#,
                palette.text,
                tx = x + 9.0,
            );
        }
        svg.push_str("</svg>");
        Ok(Snapshot {
            svg,
            width: WIDTH,
            height: HEIGHT,
        })
    }
}
