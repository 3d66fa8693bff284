//! Static Chart Renderer
//! Draws the five analysis charts into in-memory RGB buffers with plotters.
//!
//! Charts:
//! 1. Yearly totals: line with markers, years in chronological order
//! 2. Top categories: horizontal bars, rank 1 at the top
//! 3. Value distribution by year: box plot with 1.5 IQR whiskers
//! 4. Sampling error: 30-bin histogram with a KDE overlay
//! 5. Missing data: missingness heatmap of the uncleaned table

use crate::charts::theme::{
    set3, viridis, ChartTheme, FigureSize, CORAL, EDGE, TEAL, YLGNBU_HIGH, YLGNBU_LOW,
};
use crate::data::{
    numeric_column, numeric_values, text_values, CleanedTable, BREAKDOWN_CATEGORY, RD_VALUE,
    RELATIVE_SAMPLING_ERROR, YEAR,
};
use crate::stats::{kde_counts, sum_by, top_n, GroupTotal, Histogram, StatsCalculator};
use image::RgbImage;
use plotters::coord::Shift;
use plotters::prelude::*;
use polars::prelude::{
    col, BooleanChunked, DataFrame, DataType, IntoLazy, PolarsError, PolarsResult,
    SortMultipleOptions,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Data(#[from] PolarsError),
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Chart buffer does not match its dimensions")]
    Buffer,
    #[error("Failed to save {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

fn drawing<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// The five charts, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    YearlyTotals,
    TopCategories,
    YearlyDistribution,
    SamplingError,
    MissingData,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::YearlyTotals,
        ChartKind::TopCategories,
        ChartKind::YearlyDistribution,
        ChartKind::SamplingError,
        ChartKind::MissingData,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::YearlyTotals => "rd_by_year.png",
            ChartKind::TopCategories => "top_sectors.png",
            ChartKind::YearlyDistribution => "rd_distribution_by_year.png",
            ChartKind::SamplingError => "sampling_error_distribution.png",
            ChartKind::MissingData => "missing_data_heatmap.png",
        }
    }

    /// Size override; `None` uses the theme default.
    pub fn figure_size(&self) -> Option<FigureSize> {
        match self {
            ChartKind::YearlyTotals => Some(FigureSize::new(10.0, 5.0)),
            ChartKind::SamplingError => None,
            _ => Some(FigureSize::new(12.0, 6.0)),
        }
    }
}

/// Box plot statistics for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Quartiles with whiskers at the furthest values within 1.5 IQR.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q1 = StatsCalculator::percentile(&sorted, 25.0);
        let median = StatsCalculator::percentile(&sorted, 50.0);
        let q3 = StatsCalculator::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let whisker_low = sorted.iter().copied().find(|&v| v >= lo_fence).unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= hi_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < lo_fence || v > hi_fence)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

/// Values per year, ascending by year.
pub fn values_by_year(cleaned: &CleanedTable) -> PolarsResult<Vec<(String, Vec<f64>)>> {
    let df = cleaned.frame();
    df.column(YEAR)?;
    numeric_column(df, RD_VALUE)?;

    let grouped = df
        .clone()
        .lazy()
        .group_by([col(YEAR)])
        .agg([col(RD_VALUE).cast(DataType::Float64)])
        .sort([YEAR], SortMultipleOptions::default())
        .collect()?;

    let years = text_values(grouped.column(YEAR)?)?;
    let lists = grouped.column(RD_VALUE)?.list()?;
    let mut groups = Vec::with_capacity(years.len());
    for (year, values) in years.into_iter().zip(lists.into_iter()) {
        let (Some(year), Some(values)) = (year, values) else {
            continue;
        };
        groups.push((year, values.f64()?.into_iter().flatten().collect()));
    }
    Ok(groups)
}

/// Contiguous runs of missing cells, as `[start, end)` row ranges.
pub fn missing_runs(mask: &BooleanChunked) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (row, missing) in mask.into_iter().enumerate() {
        match (missing.unwrap_or(false), start) {
            (true, None) => start = Some(row),
            (false, Some(s)) => {
                runs.push((s, row));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, mask.len()));
    }
    runs
}

/// Group keys as x positions, when every key is a finite number.
fn numeric_keys(groups: &[GroupTotal]) -> Option<Vec<f64>> {
    groups
        .iter()
        .map(|g| g.key.trim().parse::<f64>().ok().filter(|x| x.is_finite()))
        .collect()
}

/// Label for an integer tick on a categorical axis; blank between categories.
fn category_label<S: AsRef<str>>(labels: &[S], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels
        .get(i as usize)
        .map(|s| s.as_ref().to_string())
        .unwrap_or_default()
}

/// Padded (min, max) over `values`, optionally forced to include zero.
fn padded_range<I: IntoIterator<Item = f64>>(values: I, include_zero: bool) -> (f64, f64) {
    let (mut lo, mut hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return (0.0, 1.0);
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if lo == hi {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    let lo = if include_zero && lo == 0.0 { 0.0 } else { lo - pad };
    (lo, hi + pad)
}

/// Renders the analysis charts with a shared theme.
pub struct ChartRenderer {
    theme: ChartTheme,
}

impl ChartRenderer {
    pub fn new(theme: ChartTheme) -> Self {
        Self { theme }
    }

    /// Allocate a canvas, run `draw` on it and hand back the pixels.
    fn render_with<F>(&self, kind: ChartKind, draw: F) -> Result<RgbImage, RenderError>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<(), RenderError>,
    {
        let size = kind.figure_size().unwrap_or(self.theme.default_size);
        let (width, height) = size.pixels(self.theme.dpi);
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&self.theme.background).map_err(drawing)?;
            draw(&root)?;
            root.present().map_err(drawing)?;
        }
        RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer)
    }

    fn caption_style(&self) -> (&'static str, u32) {
        (self.theme.font_family, self.theme.title_size)
    }

    fn label_style(&self) -> (&'static str, u32) {
        (self.theme.font_family, self.theme.label_size)
    }

    /// Title plus a centred "No data" note.
    fn draw_empty(
        &self,
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
        title: &str,
    ) -> Result<(), RenderError> {
        let area = root.titled(title, self.caption_style()).map_err(drawing)?;
        let (w, h) = area.dim_in_pixel();
        area.draw(&Text::new(
            "No data",
            (w as i32 / 2 - 30, h as i32 / 2),
            self.label_style(),
        ))
        .map_err(drawing)?;
        Ok(())
    }

    /// Line chart of total value per year.
    ///
    /// Numeric years sit on a numeric axis; any other keys are spaced evenly.
    pub fn render_yearly_totals(&self, yearly: &[GroupTotal]) -> Result<RgbImage, RenderError> {
        let title = "Total R&D Expenditure Over the Years";
        let n = yearly.len();
        let positions = numeric_keys(yearly);
        let labels: Vec<&str> = yearly.iter().map(|g| g.key.as_str()).collect();
        let points: Vec<(f64, f64)> = match &positions {
            Some(xs) => xs.iter().zip(yearly).map(|(&x, g)| (x, g.total)).collect(),
            None => yearly
                .iter()
                .enumerate()
                .map(|(i, g)| (i as f64, g.total))
                .collect(),
        };

        self.render_with(ChartKind::YearlyTotals, |root| {
            if points.is_empty() {
                return self.draw_empty(root, title);
            }
            let (x_lo, x_hi) = match &positions {
                Some(xs) => padded_range(xs.iter().copied(), false),
                None => (-0.5, n as f64 - 0.5),
            };
            let (y_lo, y_hi) = padded_range(points.iter().map(|p| p.1), false);

            let mut chart = ChartBuilder::on(root)
                .caption(title, self.caption_style())
                .margin(20)
                .x_label_area_size(45)
                .y_label_area_size(90)
                .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
                .map_err(drawing)?;

            let x_fmt = |x: &f64| match &positions {
                Some(_) => format!("{}", x),
                None => category_label(&labels, *x),
            };
            chart
                .configure_mesh()
                .x_labels(n.clamp(2, 12))
                .x_label_formatter(&x_fmt)
                .x_desc("Year")
                .y_desc("RD Value (NZ$ Millions)")
                .label_style(self.label_style())
                .axis_desc_style(self.label_style())
                .bold_line_style(&self.theme.grid)
                .light_line_style(&self.theme.background)
                .draw()
                .map_err(drawing)?;

            chart
                .draw_series(LineSeries::new(points.clone(), TEAL.stroke_width(2)))
                .map_err(drawing)?;
            chart
                .draw_series(points.iter().map(|&p| Circle::new(p, 5, TEAL.filled())))
                .map_err(drawing)?;
            Ok(())
        })
    }

    /// Horizontal bars in ranking order, first-ranked at the top.
    pub fn render_top_categories(
        &self,
        top: &[GroupTotal],
        requested: usize,
    ) -> Result<RgbImage, RenderError> {
        let title = format!("Top {} Sectors by Total R&D Expenditure", requested);
        let n = top.len();
        // Plot rows run bottom-up, so rank r sits at row n - 1 - r
        let labels: Vec<&str> = top.iter().rev().map(|g| g.key.as_str()).collect();
        let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let label_area = (longest as u32 * 8 + 30).clamp(80, 420);

        self.render_with(ChartKind::TopCategories, |root| {
            if top.is_empty() {
                return self.draw_empty(root, &title);
            }
            let (x_lo, x_hi) = padded_range(top.iter().map(|g| g.total), true);

            let mut chart = ChartBuilder::on(root)
                .caption(&title, self.caption_style())
                .margin(20)
                .x_label_area_size(45)
                .y_label_area_size(label_area)
                .build_cartesian_2d(x_lo..x_hi, -0.5f64..(n as f64 - 0.5))
                .map_err(drawing)?;

            let y_fmt = |y: &f64| category_label(&labels, *y);
            chart
                .configure_mesh()
                .y_labels(n)
                .y_label_formatter(&y_fmt)
                .x_desc("Total RD Value (NZ$ Millions)")
                .y_desc("Sector")
                .label_style(self.label_style())
                .axis_desc_style(self.label_style())
                .bold_line_style(&self.theme.grid)
                .light_line_style(&self.theme.background)
                .draw()
                .map_err(drawing)?;

            chart
                .draw_series(top.iter().enumerate().map(|(rank, g)| {
                    let y = (n - 1 - rank) as f64;
                    Rectangle::new([(0.0, y - 0.4), (g.total, y + 0.4)], viridis(rank, n).filled())
                }))
                .map_err(drawing)?;
            Ok(())
        })
    }

    /// One box per year over the cleaned values.
    pub fn render_yearly_distribution(
        &self,
        cleaned: &CleanedTable,
    ) -> Result<RgbImage, RenderError> {
        let title = "Distribution of R&D Value by Year";
        let groups = values_by_year(cleaned)?;
        let boxes: Vec<(String, BoxStats)> = groups
            .into_iter()
            .filter_map(|(year, values)| BoxStats::from_values(&values).map(|b| (year, b)))
            .collect();
        let labels: Vec<&str> = boxes.iter().map(|(year, _)| year.as_str()).collect();

        self.render_with(ChartKind::YearlyDistribution, |root| {
            if boxes.is_empty() {
                return self.draw_empty(root, title);
            }
            let n = boxes.len();
            let (y_lo, y_hi) = padded_range(
                boxes.iter().flat_map(|(_, b)| {
                    b.outliers
                        .iter()
                        .copied()
                        .chain([b.whisker_low, b.whisker_high])
                }),
                false,
            );

            let mut chart = ChartBuilder::on(root)
                .caption(title, self.caption_style())
                .margin(20)
                .x_label_area_size(45)
                .y_label_area_size(90)
                .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_lo..y_hi)
                .map_err(drawing)?;

            let x_fmt = |x: &f64| category_label(&labels, *x);
            chart
                .configure_mesh()
                .x_labels(n)
                .x_label_formatter(&x_fmt)
                .x_desc("Year")
                .y_desc("RD Value (NZ$ Millions)")
                .label_style(self.label_style())
                .axis_desc_style(self.label_style())
                .bold_line_style(&self.theme.grid)
                .light_line_style(&self.theme.background)
                .draw()
                .map_err(drawing)?;

            let half = 0.35;
            let cap = 0.15;

            chart
                .draw_series(boxes.iter().enumerate().map(|(i, (_, b))| {
                    let x = i as f64;
                    Rectangle::new([(x - half, b.q1), (x + half, b.q3)], set3(i).filled())
                }))
                .map_err(drawing)?;
            chart
                .draw_series(boxes.iter().enumerate().map(|(i, (_, b))| {
                    let x = i as f64;
                    Rectangle::new([(x - half, b.q1), (x + half, b.q3)], EDGE.stroke_width(1))
                }))
                .map_err(drawing)?;

            // Median, whiskers and caps
            let mut lines: Vec<Vec<(f64, f64)>> = Vec::with_capacity(n * 5);
            for (i, (_, b)) in boxes.iter().enumerate() {
                let x = i as f64;
                lines.push(vec![(x - half, b.median), (x + half, b.median)]);
                lines.push(vec![(x, b.q1), (x, b.whisker_low)]);
                lines.push(vec![(x, b.q3), (x, b.whisker_high)]);
                lines.push(vec![(x - cap, b.whisker_low), (x + cap, b.whisker_low)]);
                lines.push(vec![(x - cap, b.whisker_high), (x + cap, b.whisker_high)]);
            }
            chart
                .draw_series(
                    lines
                        .into_iter()
                        .map(|path| PathElement::new(path, EDGE.stroke_width(2))),
                )
                .map_err(drawing)?;

            chart
                .draw_series(boxes.iter().enumerate().flat_map(|(i, (_, b))| {
                    b.outliers
                        .iter()
                        .map(move |&v| Circle::new((i as f64, v), 3, EDGE.stroke_width(1)))
                }))
                .map_err(drawing)?;
            Ok(())
        })
    }

    /// Histogram of the sampling error with a count-scaled density curve.
    pub fn render_sampling_error(
        &self,
        cleaned: &CleanedTable,
        bins: usize,
    ) -> Result<RgbImage, RenderError> {
        let title = "Distribution of Relative Sampling Error";
        let values = numeric_values(numeric_column(cleaned.frame(), RELATIVE_SAMPLING_ERROR)?)?;
        let histogram = Histogram::new(&values, bins);
        let curve = histogram
            .as_ref()
            .and_then(|h| kde_counts(&values, h))
            .unwrap_or_default();
        debug!(
            "Sampling error histogram: {} of {} values binned, {} KDE points",
            histogram.as_ref().map_or(0, Histogram::total),
            values.len(),
            curve.len()
        );

        self.render_with(ChartKind::SamplingError, |root| {
            let Some(hist) = histogram.as_ref() else {
                return self.draw_empty(root, title);
            };
            let (x_lo, x_hi) = hist.range();
            let peak = curve
                .iter()
                .map(|p| p.1)
                .fold(hist.max_count() as f64, f64::max);

            let mut chart = ChartBuilder::on(root)
                .caption(title, self.caption_style())
                .margin(20)
                .x_label_area_size(45)
                .y_label_area_size(70)
                .build_cartesian_2d(x_lo..x_hi, 0f64..(peak * 1.1).max(1.0))
                .map_err(drawing)?;

            chart
                .configure_mesh()
                .x_desc("Relative Sampling Error (%)")
                .y_desc("Count")
                .label_style(self.label_style())
                .axis_desc_style(self.label_style())
                .bold_line_style(&self.theme.grid)
                .light_line_style(&self.theme.background)
                .draw()
                .map_err(drawing)?;

            let bars = || {
                hist.counts.iter().enumerate().map(|(i, &count)| {
                    [(hist.edges[i], 0.0), (hist.edges[i + 1], count as f64)]
                })
            };
            chart
                .draw_series(bars().map(|corners| Rectangle::new(corners, CORAL.mix(0.6).filled())))
                .map_err(drawing)?;
            chart
                .draw_series(bars().map(|corners| Rectangle::new(corners, EDGE.stroke_width(1))))
                .map_err(drawing)?;

            if !curve.is_empty() {
                chart
                    .draw_series(LineSeries::new(curve.iter().copied(), CORAL.stroke_width(3)))
                    .map_err(drawing)?;
            }
            Ok(())
        })
    }

    /// Missing cells of the uncleaned table. Row 0 is at the top.
    pub fn render_missing_heatmap(&self, df: &DataFrame) -> Result<RgbImage, RenderError> {
        let title = "Heatmap of Missing Data";
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        let masks: Vec<BooleanChunked> = df.get_columns().iter().map(|c| c.is_null()).collect();
        let rows = df.height();
        let cols = df.width();

        self.render_with(ChartKind::MissingData, |root| {
            if rows == 0 || cols == 0 {
                return self.draw_empty(root, title);
            }
            let top = rows as f64;

            let mut chart = ChartBuilder::on(root)
                .caption(title, self.caption_style())
                .margin(20)
                .x_label_area_size(45)
                .y_label_area_size(70)
                .build_cartesian_2d(-0.5f64..(cols as f64 - 0.5), 0f64..top)
                .map_err(drawing)?;

            let x_fmt = |x: &f64| category_label(&names, *x);
            let y_fmt = |y: &f64| format!("{}", (top - y).round() as i64);
            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(cols)
                .x_label_formatter(&x_fmt)
                .y_label_formatter(&y_fmt)
                .label_style(self.label_style())
                .draw()
                .map_err(drawing)?;

            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(-0.5, 0.0), (cols as f64 - 0.5, top)],
                    YLGNBU_LOW.filled(),
                )))
                .map_err(drawing)?;

            // One rectangle per run keeps large tables cheap to draw
            let cells = masks.iter().enumerate().flat_map(|(c, mask)| {
                missing_runs(mask).into_iter().map(move |(start, end)| {
                    let x = c as f64;
                    Rectangle::new(
                        [(x - 0.5, top - end as f64), (x + 0.5, top - start as f64)],
                        YLGNBU_HIGH.filled(),
                    )
                })
            });
            chart.draw_series(cells).map_err(drawing)?;
            Ok(())
        })
    }

    /// Save a rendered chart as PNG under `dir`.
    pub fn save(image: &RgbImage, dir: &Path, kind: ChartKind) -> Result<PathBuf, RenderError> {
        let path = dir.join(kind.file_name());
        image.save(&path).map_err(|source| RenderError::Save {
            path: path.clone(),
            source,
        })?;
        info!("Saved {}", path.display());
        Ok(path)
    }
}

/// Pipeline outputs the charts draw from.
pub struct ChartInputs<'a> {
    pub raw: &'a DataFrame,
    pub cleaned: &'a CleanedTable,
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl ChartRenderer {
    /// Render one chart. The line and bar charts aggregate the cleaned frame here.
    pub fn render(&self, kind: ChartKind, inputs: &ChartInputs<'_>) -> Result<RgbImage, RenderError> {
        let cleaned = inputs.cleaned.frame();
        match kind {
            ChartKind::YearlyTotals => {
                let yearly = sum_by(cleaned, YEAR, RD_VALUE)?;
                debug!("{} yearly totals", yearly.len());
                self.render_yearly_totals(&yearly)
            }
            ChartKind::TopCategories => {
                let top = top_n(cleaned, BREAKDOWN_CATEGORY, RD_VALUE, inputs.top_n)?;
                debug!("{} ranked categories", top.len());
                self.render_top_categories(&top, inputs.top_n)
            }
            ChartKind::YearlyDistribution => self.render_yearly_distribution(inputs.cleaned),
            ChartKind::SamplingError => {
                self.render_sampling_error(inputs.cleaned, inputs.histogram_bins)
            }
            ChartKind::MissingData => self.render_missing_heatmap(inputs.raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataProcessor;
    use polars::prelude::*;

    fn raw_frame() -> DataFrame {
        df!(
            YEAR => [Some(2020i64), Some(2021), Some(2021), None],
            BREAKDOWN_CATEGORY => [Some("A"), Some("B"), None, Some("A")],
            RD_VALUE => [Some("1.5"), Some("2"), Some("x"), Some("4")],
            RELATIVE_SAMPLING_ERROR => [Some(1.0), Some(2.5), None, Some(3.0)]
        )
        .unwrap()
    }

    fn header_only_frame() -> DataFrame {
        df!(
            YEAR => Vec::<String>::new(),
            BREAKDOWN_CATEGORY => Vec::<String>::new(),
            RD_VALUE => Vec::<String>::new(),
            RELATIVE_SAMPLING_ERROR => Vec::<String>::new()
        )
        .unwrap()
    }

    fn cleaned_without(column: &str) -> CleanedTable {
        let mut df = df!(
            YEAR => [2020i64, 2021],
            BREAKDOWN_CATEGORY => ["A", "B"],
            RD_VALUE => [1.0, 2.0]
        )
        .unwrap();
        if df.column(column).is_ok() {
            df = df.drop(column).unwrap();
        }
        DataProcessor::clean(df).1
    }

    fn render_all(raw: DataFrame) -> Vec<(ChartKind, Result<RgbImage, RenderError>)> {
        let (coerced, cleaned) = DataProcessor::clean(raw);
        let renderer = ChartRenderer::new(ChartTheme::default());
        let inputs = ChartInputs {
            raw: &coerced,
            cleaned: &cleaned,
            top_n: 10,
            histogram_bins: 30,
        };
        ChartKind::ALL
            .iter()
            .map(|&kind| (kind, renderer.render(kind, &inputs)))
            .collect()
    }

    #[test]
    fn test_box_stats_whiskers_and_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let stats = BoxStats::from_values(&values).unwrap();
        assert!((stats.q1 - 2.25).abs() < 1e-9);
        assert!((stats.median - 3.5).abs() < 1e-9);
        assert!((stats.q3 - 4.75).abs() < 1e-9);
        assert_eq!(stats.whisker_low, 1.0);
        assert_eq!(stats.whisker_high, 5.0);
        assert_eq!(stats.outliers, vec![100.0]);
        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_values_by_year_sorted() {
        let df = df!(
            YEAR => [2021i64, 2019, 2021],
            BREAKDOWN_CATEGORY => ["A", "A", "B"],
            RD_VALUE => [1.0, 2.0, 3.0]
        )
        .unwrap();
        let (_, cleaned) = DataProcessor::clean(df);
        let groups = values_by_year(&cleaned).unwrap();
        assert_eq!(groups[0], ("2019".to_string(), vec![2.0]));
        assert_eq!(groups[1], ("2021".to_string(), vec![1.0, 3.0]));
    }

    #[test]
    fn test_missing_runs() {
        let first = BooleanChunked::from_slice("first".into(), &[true, true, false, true]);
        let second = BooleanChunked::from_slice("second".into(), &[false, false, true, true]);
        assert_eq!(missing_runs(&first), vec![(0, 2), (3, 4)]);
        assert_eq!(missing_runs(&second), vec![(2, 4)]);
    }

    #[test]
    fn test_numeric_keys_only_when_all_parse() {
        let years = [GroupTotal::new("2019", 1.0), GroupTotal::new("2021", 2.0)];
        assert_eq!(numeric_keys(&years), Some(vec![2019.0, 2021.0]));
        let mixed = [GroupTotal::new("2019", 1.0), GroupTotal::new("FY21", 2.0)];
        assert_eq!(numeric_keys(&mixed), None);
    }

    #[test]
    fn test_category_label_only_on_integer_ticks() {
        let labels = ["2019", "2020"];
        assert_eq!(category_label(&labels, 0.0), "2019");
        assert_eq!(category_label(&labels, 1.0), "2020");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 5.0), "");
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(Vec::<f64>::new(), false), (0.0, 1.0));
        assert_eq!(padded_range(vec![3.0], false), (2.0, 4.0));
        let (lo, hi) = padded_range(vec![10.0, 20.0], true);
        assert_eq!(lo, 0.0);
        assert!(hi > 20.0);
    }

    #[test]
    fn test_absent_sampling_error_column_is_lookup_error() {
        let renderer = ChartRenderer::new(ChartTheme::default());
        let err = renderer
            .render_sampling_error(&cleaned_without("none"), 30)
            .unwrap_err();
        assert!(matches!(err, RenderError::Data(PolarsError::ColumnNotFound(_))));
    }

    #[test]
    fn test_absent_year_column_is_lookup_error() {
        let renderer = ChartRenderer::new(ChartTheme::default());
        let err = renderer
            .render_yearly_distribution(&cleaned_without(YEAR))
            .unwrap_err();
        assert!(matches!(err, RenderError::Data(PolarsError::ColumnNotFound(_))));
    }

    #[test]
    fn test_every_chart_renders_with_data() {
        for (kind, result) in render_all(raw_frame()) {
            assert!(result.is_ok(), "{:?} failed: {:?}", kind, result.err());
        }
    }

    #[test]
    fn test_every_chart_renders_header_only_input() {
        for (kind, result) in render_all(header_only_frame()) {
            assert!(result.is_ok(), "{:?} failed: {:?}", kind, result.err());
        }
    }

    #[test]
    fn test_failed_aggregation_only_fails_aggregate_charts() {
        let raw = raw_frame().drop(RD_VALUE).unwrap();
        let results = render_all(raw);
        for (kind, result) in results {
            match kind {
                ChartKind::YearlyTotals | ChartKind::TopCategories => {
                    assert!(matches!(result, Err(RenderError::Data(_))), "{:?}", kind)
                }
                ChartKind::MissingData => assert!(result.is_ok()),
                _ => {}
            }
        }
    }

    #[test]
    fn test_chart_file_names_unique() {
        let mut names: Vec<&str> = ChartKind::ALL.iter().map(|k| k.file_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 5);
    }
}
