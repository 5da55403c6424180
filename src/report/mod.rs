//! Printable savings report.
//!
//! The report is laid out on A4 pages with coordinates in millimetres, then
//! rendered as an HTML document holding one inline SVG sheet per page. Chart
//! snapshots that fail to render are logged and left out; the rest of the
//! report is still produced.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{info, warn};
use thiserror::Error;

use crate::core::{ProjectionInput, ProjectionResult};
use crate::present::{
    ChartSnapshot, DistributionChart, GrowthChart, Palette, Snapshot, Theme, format_currency,
    format_percent,
};

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 20.0;
const PT_TO_MM: f64 = 0.3528;

const INDIGO: Rgb = Rgb(99, 102, 241);
const BLUE: Rgb = Rgb(59, 130, 246);
const GREEN: Rgb = Rgb(16, 185, 129);
const INK: Rgb = Rgb(30, 30, 30);
const BODY: Rgb = Rgb(60, 60, 60);
const MUTED: Rgb = Rgb(100, 100, 100);
const FAINT: Rgb = Rgb(150, 150, 150);

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn css(self) -> String {
        format!("rgb({},{},{})", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text {
        x: f64,
        y: f64,
        size_pt: f64,
        bold: bool,
        color: Rgb,
        content: String,
    },
    Rule {
        x1: f64,
        x2: f64,
        y: f64,
        width: f64,
        color: Rgb,
    },
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        snapshot: Snapshot,
    },
}

impl Element {
    fn text(x: f64, y: f64, size_pt: f64, bold: bool, color: Rgb, content: impl Into<String>) -> Self {
        Element::Text {
            x,
            y,
            size_pt,
            bold,
            color,
            content: content.into(),
        }
    }

    fn top(&self) -> f64 {
        match self {
            Element::Text { y, size_pt, .. } => y - size_pt * PT_TO_MM,
            Element::Rule { y, .. } | Element::Image { y, .. } => *y,
        }
    }

    fn bottom(&self) -> f64 {
        match self {
            Element::Text { y, .. } | Element::Rule { y, .. } => *y,
            Element::Image { y, height, .. } => y + height,
        }
    }

    fn shifted(mut self, dy: f64) -> Self {
        match &mut self {
            Element::Text { y, .. } | Element::Rule { y, .. } | Element::Image { y, .. } => {
                *y += dy
            }
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

/// Pages filled top to bottom. An element that would cross the bottom margin
/// moves to a fresh page, and so does everything placed after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pages: Vec<Page>,
    /// Vertical offset applied to elements placed on the current page.
    offset: f64,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            pages: vec![Page::default()],
            offset: 0.0,
        }
    }
}

impl Document {
    pub fn place(&mut self, element: Element) {
        let mut element = element.shifted(self.offset);
        let on_fresh_page = self
            .pages
            .last()
            .is_some_and(|page| page.elements.is_empty());
        if element.bottom() > PAGE_HEIGHT_MM - MARGIN_MM / 2.0 && !on_fresh_page {
            let dy = MARGIN_MM - element.top();
            self.offset += dy;
            element = element.shifted(dy);
            self.pages.push(Page::default());
        }
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub document: Document,
    pub theme: Theme,
}

impl Report {
    pub const TITLE: &'static str = "SmartSave - Savings Report";
    pub const FOOTER: &'static str = "SmartSave - Smart Savings Calculator";

    pub fn build(
        input: &ProjectionInput,
        result: &ProjectionResult,
        generated_on: NaiveDate,
        theme: Theme,
    ) -> Self {
        let palette = Palette::for_theme(theme);
        let mut doc = Document::default();

        doc.place(Element::text(20.0, 25.0, 22.0, true, INDIGO, Self::TITLE));
        doc.place(Element::text(
            20.0,
            33.0,
            10.0,
            false,
            MUTED,
            format!("Generated on {}", generated_on.format("%B %d, %Y")),
        ));
        doc.place(Element::Rule {
            x1: 20.0,
            x2: 190.0,
            y: 37.0,
            width: 0.5,
            color: INDIGO,
        });

        doc.place(Element::text(20.0, 47.0, 13.0, true, INK, "Investment inputs"));
        let input_lines = [
            format!("Initial capital: {}", format_currency(input.initial_capital)),
            format!("Current age: {} years", input.current_age),
            format!("Target age: {} years", input.target_age),
            format!("Annual interest rate: {}%", input.annual_rate),
            format!(
                "Monthly contribution: {}",
                format_currency(input.monthly_contribution)
            ),
            format!("Investment period: {} years", result.years),
        ];
        for (idx, line) in input_lines.into_iter().enumerate() {
            doc.place(Element::text(24.0, 56.0 + idx as f64 * 7.0, 11.0, false, BODY, line));
        }

        doc.place(Element::text(20.0, 103.0, 13.0, true, INK, "Results"));
        let result_lines = [
            ("Final accumulated value:", format_currency(result.final_value), INDIGO),
            ("Total invested:", format_currency(result.total_invested), BLUE),
            ("Interest earned:", format_currency(result.total_interest), GREEN),
            ("Return on investment:", format_percent(result.yield_ratio), BODY),
        ];
        for (idx, (label, value, color)) in result_lines.into_iter().enumerate() {
            let y = 112.0 + idx as f64 * 9.0;
            doc.place(Element::text(24.0, y, 11.0, false, BODY, label));
            doc.place(Element::text(100.0, y, 11.0, true, color, value));
        }

        let charts: [(&str, Box<dyn ChartSnapshot>, f64, f64, f64, f64); 2] = [
            (
                "Capital distribution",
                Box::new(DistributionChart::from_result(result)),
                20.0,
                30.0,
                70.0,
                70.0,
            ),
            (
                "Growth by year",
                Box::new(GrowthChart::from_result(result)),
                110.0,
                105.0,
                85.0,
                55.0,
            ),
        ];
        for (heading, chart, heading_x, x, width, height) in charts {
            match chart.snapshot(&palette) {
                Ok(snapshot) => {
                    doc.place(Element::text(heading_x, 155.0, 12.0, true, INK, heading));
                    doc.place(Element::Image {
                        x,
                        y: 158.0,
                        width,
                        height,
                        snapshot,
                    });
                }
                Err(err) => warn!("Could not capture chart '{heading}': {err}"),
            }
        }

        doc.place(Element::text(20.0, 285.0, 9.0, false, FAINT, Self::FOOTER));

        Self {
            document: doc,
            theme,
        }
    }

    pub fn file_name() -> &'static str {
        "SmartSave-Savings-Report.html"
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape_xml(Self::TITLE));
        html.push_str(
            "<style>\n\
             @page { size: A4; margin: 0; }\n\
             body { margin: 0; background: #e5e7eb; }\n\
             .page { width: 210mm; height: 297mm; margin: 0 auto 8mm; background: #fff; }\n\
             @media print { body { background: none; } .page { margin: 0; page-break-after: always; } }\n\
             </style>\n</head>\n<body>\n",
        );
        for page in self.document.pages() {
            html.push_str(&render_page(page));
            html.push('\n');
        }
        html.push_str("</body>\n</html>\n");
        html
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_html()).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "Wrote report with {} page(s) to {}",
            self.document.pages().len(),
            path.display()
        );
        Ok(())
    }
}

fn render_page(page: &Page) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="page" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {PAGE_WIDTH_MM} {PAGE_HEIGHT_MM}" font-family="Helvetica, Arial, sans-serif">"#
    );
    for element in &page.elements {
        match element {
            Element::Text {
                x,
                y,
                size_pt,
                bold,
                color,
                content,
            } => {
                let _ = write!(
                    svg,
                    r#"<text x="{x}" y="{y}" font-size="{size:.3}" font-weight="{weight}" fill="{fill}">{text}</text>"#,
                    size = size_pt * PT_TO_MM,
                    weight = if *bold { "bold" } else { "normal" },
                    fill = color.css(),
                    text = escape_xml(content),
                );
            }
            Element::Rule {
                x1,
                x2,
                y,
                width,
                color,
            } => {
                let _ = write!(
                    svg,
                    r#"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="{}" stroke-width="{width}"/>"#,
                    color.css()
                );
            }
            Element::Image {
                x,
                y,
                width,
                height,
                snapshot,
            } => {
                let _ = write!(
                    svg,
                    r#"<g transform="translate({x} {y}) scale({sx:.5} {sy:.5})">{}</g>"#,
                    snapshot.svg,
                    sx = width / snapshot.width,
                    sy = height / snapshot.height,
                );
            }
        }
    }
    svg.push_str("</svg>");
    svg
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
