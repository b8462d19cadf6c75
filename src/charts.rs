use crate::error::{ReportError, Result};
use log::debug;
use resvg::{tiny_skia, usvg};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use svg::node::element::{Line, Rectangle, Text};
use svg::node::Text as TextNode;
use svg::Document;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub color: String,
}

impl Bar {
    pub fn new(label: impl Into<String>, value: f64, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value,
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub subtitle: Option<String>,
    pub x_label: Option<String>,
    pub y_label: String,
    pub bars: Vec<Bar>,
    /// Slant category labels by 45 degrees.
    pub rotate_labels: bool,
}

/// Persists a chart to `path`. Implementations create missing parent directories.
pub trait ChartRenderer {
    fn render(&self, chart: &BarChart, path: &Path) -> Result<()>;
}

/// Writes bar charts as SVG documents.
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    pub width: f64,
    pub height: f64,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
        }
    }
}

const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 140.0;

fn text(x: f64, y: f64, content: &str) -> Text {
    Text::new()
        .set("x", x)
        .set("y", y)
        .set("font-family", "sans-serif")
        .add(TextNode::new(content))
}

impl SvgChartRenderer {
    pub fn document(&self, chart: &BarChart) -> Document {
        let plot_width = self.width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_height = self.height - MARGIN_TOP - MARGIN_BOTTOM;
        let baseline = MARGIN_TOP + plot_height;

        let max_value = chart
            .bars
            .iter()
            .map(|b| b.value.abs())
            .fold(0.0_f64, f64::max);
        let scale = if max_value > 0.0 {
            plot_height / max_value
        } else {
            0.0
        };

        let mut document = Document::new()
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("viewBox", (0.0, 0.0, self.width, self.height))
            .set("width", self.width)
            .set("height", self.height)
            .add(
                text(self.width / 2.0, 30.0, &chart.title)
                    .set("text-anchor", "middle")
                    .set("font-size", 20),
            );

        if let Some(subtitle) = &chart.subtitle {
            document = document.add(
                text(self.width / 2.0, 52.0, subtitle)
                    .set("text-anchor", "middle")
                    .set("font-size", 14),
            );
        }

        let slot = if chart.bars.is_empty() {
            plot_width
        } else {
            plot_width / chart.bars.len() as f64
        };
        let bar_width = slot * 0.8;

        for (i, bar) in chart.bars.iter().enumerate() {
            let height = bar.value.abs() * scale;
            let x = MARGIN_LEFT + i as f64 * slot + (slot - bar_width) / 2.0;
            let center = x + bar_width / 2.0;

            document = document.add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", baseline - height)
                    .set("width", bar_width)
                    .set("height", height)
                    .set("fill", bar.color.as_str()),
            );

            let label_y = baseline + 18.0;
            let label = if chart.rotate_labels {
                text(center, label_y, &bar.label)
                    .set("text-anchor", "end")
                    .set("font-size", 11)
                    .set("transform", format!("rotate(-45 {} {})", center, label_y))
            } else {
                text(center, label_y, &bar.label)
                    .set("text-anchor", "middle")
                    .set("font-size", 12)
            };
            document = document.add(label);
        }

        let x_axis = Line::new()
            .set("x1", MARGIN_LEFT)
            .set("x2", MARGIN_LEFT + plot_width)
            .set("y1", baseline)
            .set("y2", baseline)
            .set("stroke", "black")
            .set("stroke-width", 1.5);
        let y_axis = Line::new()
            .set("x1", MARGIN_LEFT)
            .set("x2", MARGIN_LEFT)
            .set("y1", MARGIN_TOP)
            .set("y2", baseline)
            .set("stroke", "black")
            .set("stroke-width", 1.5);

        let y_mid = MARGIN_TOP + plot_height / 2.0;
        document = document
            .add(x_axis)
            .add(y_axis)
            .add(
                text(MARGIN_LEFT - 10.0, MARGIN_TOP, &format!("{:.2}", max_value))
                    .set("text-anchor", "end")
                    .set("font-size", 11),
            )
            .add(
                text(25.0, y_mid, &chart.y_label)
                    .set("text-anchor", "middle")
                    .set("font-size", 13)
                    .set("transform", format!("rotate(-90 25 {})", y_mid)),
            );

        if let Some(x_label) = &chart.x_label {
            document = document.add(
                text(MARGIN_LEFT + plot_width / 2.0, self.height - 10.0, x_label)
                    .set("text-anchor", "middle")
                    .set("font-size", 13),
            );
        }

        document
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, chart: &BarChart, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        let document = self.document(chart);
        svg::save(path, &document)
            .map_err(|e| ReportError::Chart(format!("{}: {}", path.display(), e)))?;
        debug!("Wrote chart '{}' to {}", chart.title, path.display());
        Ok(())
    }
}

/// Rasterises the SVG chart into a PNG on a white background.
///
/// Labels are drawn with the system fonts found at construction time; with no
/// fonts installed the bars and axes are still drawn.
#[derive(Clone)]
pub struct PngChartRenderer {
    svg: SvgChartRenderer,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Default for PngChartRenderer {
    fn default() -> Self {
        Self::new(SvgChartRenderer::default())
    }
}

impl PngChartRenderer {
    pub fn new(svg: SvgChartRenderer) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        debug!("Loaded {} font faces for chart labels", fontdb.len());
        Self {
            svg,
            fontdb: Arc::new(fontdb),
        }
    }

    /// Encoded PNG bytes, without touching the filesystem.
    pub fn encode(&self, chart: &BarChart) -> Result<Vec<u8>> {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fontdb);

        let source = self.svg.document(chart).to_string();
        let tree = usvg::Tree::from_str(&source, &options)
            .map_err(|e| ReportError::Chart(format!("Invalid chart SVG: {}", e)))?;
        let size = tree.size().to_int_size();
        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            ReportError::Chart(format!(
                "Cannot allocate a {}x{} canvas",
                size.width(),
                size.height()
            ))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| ReportError::Chart(format!("PNG encoding failed: {}", e)))
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, chart: &BarChart, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        let bytes = self.encode(chart)?;
        fs::write(path, bytes)?;
        debug!("Wrote chart '{}' to {}", chart.title, path.display());
        Ok(())
    }
}
