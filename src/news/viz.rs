use super::stats::{LanguageMean, SentimentStats, ValueCount, WordCountStats, quantile};
use super::types::OptionalColumns;
use crate::error::{Error, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

type Root<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

const BAR_BLUE: RGBColor = RGBColor(31, 119, 180);
const LIGHT_BLUE: RGBColor = RGBColor(173, 216, 230);
const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
const CORAL: RGBColor = RGBColor(255, 127, 80);
const SEA_GREEN: RGBColor = RGBColor(60, 179, 113);
const MEDIAN_GREEN: RGBColor = RGBColor(0, 128, 0);

/// Rendering parameters handed to every chart. Pixel sizes correspond to
/// 12x6 in (10x6 in for the box plot) at 300 dpi.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub enabled: bool,
    pub image_size: (u32, u32),
    pub boxplot_size: (u32, u32),
    pub histogram_bins: usize,
    pub caption_font_size: f64,
    pub axis_font_size: f64,
    pub tick_font_size: f64,
    pub line_thickness: u32,
    pub margin: u32,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            image_size: (3600, 1800),
            boxplot_size: (3000, 1800),
            histogram_bins: 50,
            caption_font_size: 58.0,
            axis_font_size: 50.0,
            tick_font_size: 40.0,
            line_thickness: 8,
            margin: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    WordCountHistogram,
    WordCountBoxPlot,
    TopSources,
    SentimentHistogram,
    WordCountByLanguage,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::WordCountHistogram,
        ChartKind::WordCountBoxPlot,
        ChartKind::TopSources,
        ChartKind::SentimentHistogram,
        ChartKind::WordCountByLanguage,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::WordCountHistogram => "word_count_distribution.png",
            ChartKind::WordCountBoxPlot => "word_count_boxplot.png",
            ChartKind::TopSources => "top_sources.png",
            ChartKind::SentimentHistogram => "sentiment_distribution.png",
            ChartKind::WordCountByLanguage => "word_count_by_language.png",
        }
    }

    /// Short name used in progress logs.
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::WordCountHistogram => "word count distribution",
            ChartKind::WordCountBoxPlot => "word count box plot",
            ChartKind::TopSources => "top sources",
            ChartKind::SentimentHistogram => "sentiment distribution",
            ChartKind::WordCountByLanguage => "word count by language",
        }
    }
}

pub fn top_sources_title(limit: usize) -> String {
    format!("Top {limit} News Sources by Article Count")
}

pub fn language_means_title(min_articles: usize) -> String {
    format!("Average Word Count by Language (Languages with {min_articles}+ articles)")
}

/// Charts a dataset with the given optional columns gets, in drawing order.
pub fn planned_charts(columns: OptionalColumns) -> Vec<ChartKind> {
    ChartKind::ALL
        .into_iter()
        .filter(|kind| match kind {
            ChartKind::WordCountHistogram | ChartKind::WordCountBoxPlot => true,
            ChartKind::TopSources => columns.source,
            ChartKind::SentimentHistogram => columns.sentiment,
            ChartKind::WordCountByLanguage => columns.language,
        })
        .collect()
}

/// Equal-width bins over `[lower, upper]`, the last bin closed on the right.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBins {
    pub lower: f64,
    pub upper: f64,
    pub counts: Vec<usize>,
}

impl HistogramBins {
    /// Non-finite values are not binned.
    pub fn new(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let finite = || values.iter().copied().filter(|v| v.is_finite());
        let (mut lower, mut upper) = finite()
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or((0.0, 1.0));
        if lower == upper {
            let pad = (lower.abs() * 1e-3).max(0.5);
            lower = (lower - pad).max(f64::MIN);
            upper = (upper + pad).min(f64::MAX);
        }

        let mut hist = Self {
            lower,
            upper,
            counts: vec![0; bins],
        };
        for v in finite() {
            if let Some(pos) = hist.position(v) {
                hist.counts[(pos as usize).min(bins - 1)] += 1;
            }
        }
        hist
    }

    pub fn bin_width(&self) -> f64 {
        let bins = self.counts.len() as f64;
        // `upper - lower` overflows for ranges wider than f64::MAX
        self.upper / bins - self.lower / bins
    }

    /// Bin-index coordinate of `value`, from 0 at `lower` to the bin count at
    /// `upper`, clamped to that axis. None for a non-finite value.
    pub fn position(&self, value: f64) -> Option<f64> {
        let width = self.bin_width();
        let pos = value / width - self.lower / width;
        pos.is_finite().then(|| pos.clamp(0.0, self.counts.len() as f64))
    }

    /// Value at a bin-index coordinate; the inverse of [`Self::position`].
    pub fn value_at(&self, pos: f64) -> f64 {
        let t = pos / self.counts.len() as f64;
        self.lower * (1.0 - t) + self.upper * t
    }

    /// `(left edge, right edge, count)` per bin
    pub fn bars(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.counts.iter().enumerate().map(move |(i, &c)| {
            (self.value_at(i as f64), self.value_at((i + 1) as f64), c)
        })
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Box-and-whisker geometry. Whiskers end at the most extreme data points
/// within 1.5 IQR of the box; anything further out is an outlier.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlotStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxPlotStats {
    pub fn new(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25)?;
        let median = quantile(&sorted, 0.5)?;
        let q3 = quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let inside = || sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
        let whisker_low = inside().next().unwrap_or(q1).min(q1);
        let whisker_high = inside().last().unwrap_or(q3).max(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
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

fn render_png<F>(path: &Path, (width, height): (u32, u32), draw: F) -> Result<()>
where
    F: FnOnce(&Root<'_>) -> DrawResult,
{
    let mut buffer = vec![255u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw(&root).map_err(|e| Error::Render(format!("{}: {}", path.display(), e)))?;
        root.present()
            .map_err(|e| Error::Render(format!("{}: {}", path.display(), e)))?;
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image::save_buffer(path, &buffer, width, height, image::ColorType::Rgb8)?;
    debug!("wrote {} ({}x{})", path.display(), width, height);
    Ok(())
}

fn caption_font(options: &VizConfig) -> FontDesc<'static> {
    ("sans-serif", options.caption_font_size)
        .into_font()
        .style(FontStyle::Bold)
}

fn y_upper(max: f64) -> f64 {
    if max > 0.0 { max * 1.05 } else { 1.0 }
}

fn tick_label(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e6 {
        format!("{value:.1e}")
    } else if magnitude >= 100.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Histogram bars plus dashed reference lines, shared by both distributions.
/// The x axis runs in bin-index coordinates and is labelled with the values
/// they map to, so arbitrarily wide ranges stay drawable.
fn draw_distribution(
    root: &Root<'_>,
    title: &str,
    x_desc: &str,
    hist: &HistogramBins,
    color: RGBColor,
    references: &[(f64, RGBColor, String)],
    options: &VizConfig,
) -> DrawResult {
    let bins = hist.counts.len() as f64;
    let y_max = y_upper(hist.max_count() as f64);
    let mut chart = ChartBuilder::on(root)
        .caption(title, caption_font(options))
        .margin(options.margin)
        .x_label_area_size(options.axis_font_size as u32 * 3)
        .y_label_area_size(options.axis_font_size as u32 * 4)
        .build_cartesian_2d(0.0..bins, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_label_formatter(&|pos| tick_label(hist.value_at(*pos)))
        .x_desc(x_desc)
        .y_desc("Number of Articles")
        .axis_desc_style(("sans-serif", options.axis_font_size))
        .label_style(("sans-serif", options.tick_font_size))
        .draw()?;

    let bar = |i: usize, c: usize| [(i as f64, 0.0), ((i + 1) as f64, c as f64)];
    chart.draw_series(
        hist.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| Rectangle::new(bar(i, c), color.mix(0.7).filled())),
    )?;
    chart.draw_series(
        hist.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| Rectangle::new(bar(i, c), BLACK.stroke_width(1))),
    )?;

    let lines: Vec<_> = references
        .iter()
        .filter_map(|(x, line_color, label)| {
            hist.position(*x).map(|pos| (pos, *line_color, label))
        })
        .collect();
    if lines.is_empty() {
        return Ok(());
    }

    let thickness = options.line_thickness;
    for (pos, line_color, label) in lines {
        chart
            .draw_series(DashedLineSeries::new(
                vec![(pos, 0.0), (pos, y_max)],
                thickness as i32 * 4,
                thickness as i32 * 2,
                line_color.stroke_width(thickness),
            ))?
            .label(label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 60, y)], line_color.stroke_width(thickness))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", options.tick_font_size))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

pub fn render_word_count_histogram(
    path: &Path,
    word_counts: &[u64],
    stats: &WordCountStats,
    options: &VizConfig,
) -> Result<()> {
    let values: Vec<f64> = word_counts.iter().map(|&c| c as f64).collect();
    let hist = HistogramBins::new(&values, options.histogram_bins);

    let mut references = Vec::new();
    if let Some(mean) = stats.mean {
        references.push((mean, RED, format!("Mean: {:.0}", mean)));
    }
    if let Some(median) = stats.median {
        references.push((median, MEDIAN_GREEN, format!("Median: {:.0}", median)));
    }

    render_png(path, options.image_size, |root| {
        draw_distribution(
            root,
            "Distribution of Word Counts Across Articles",
            "Word Count",
            &hist,
            BAR_BLUE,
            &references,
            options,
        )
    })
}

pub fn render_sentiment_histogram(
    path: &Path,
    scores: &[f64],
    stats: &SentimentStats,
    options: &VizConfig,
) -> Result<()> {
    let hist = HistogramBins::new(scores, options.histogram_bins);

    let references: Vec<_> = stats
        .mean
        .map(|mean| (mean, RED, format!("Mean: {:.3}", mean)))
        .into_iter()
        .collect();

    render_png(path, options.image_size, |root| {
        draw_distribution(
            root,
            "Distribution of Sentiment Scores",
            "Sentiment Score",
            &hist,
            CORAL,
            &references,
            options,
        )
    })
}

pub fn render_word_count_boxplot(
    path: &Path,
    word_counts: &[u64],
    options: &VizConfig,
) -> Result<()> {
    let values: Vec<f64> = word_counts.iter().map(|&c| c as f64).collect();
    let box_stats = BoxPlotStats::new(&values);

    render_png(path, options.boxplot_size, |root| {
        let (y_min, y_max) = match &box_stats {
            Some(b) => {
                let lo = b.outliers.first().copied().unwrap_or(b.whisker_low).min(b.whisker_low);
                let hi = b.outliers.last().copied().unwrap_or(b.whisker_high).max(b.whisker_high);
                let pad = ((hi - lo) * 0.05).max(1.0);
                (lo - pad, hi + pad)
            }
            None => (0.0, 1.0),
        };

        let mut chart = ChartBuilder::on(root)
            .caption("Box Plot of Word Counts", caption_font(options))
            .margin(options.margin)
            .x_label_area_size(options.axis_font_size as u32 * 2)
            .y_label_area_size(options.axis_font_size as u32 * 4)
            .build_cartesian_2d(0.0..1.0, y_min..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_| String::new())
            .y_desc("Word Count")
            .axis_desc_style(("sans-serif", options.axis_font_size))
            .label_style(("sans-serif", options.tick_font_size))
            .light_line_style(BLACK.mix(0.05))
            .bold_line_style(BLACK.mix(0.3))
            .draw()?;

        let Some(b) = &box_stats else {
            return Ok(());
        };

        let stroke = options.line_thickness / 2;
        let whiskers = [
            vec![(0.5, b.q1), (0.5, b.whisker_low)],
            vec![(0.5, b.q3), (0.5, b.whisker_high)],
            vec![(0.42, b.whisker_low), (0.58, b.whisker_low)],
            vec![(0.42, b.whisker_high), (0.58, b.whisker_high)],
        ];
        for segment in whiskers {
            chart.draw_series(LineSeries::new(segment, BLACK.stroke_width(stroke)))?;
        }

        chart.draw_series(std::iter::once(Rectangle::new(
            [(0.35, b.q1), (0.65, b.q3)],
            LIGHT_BLUE.mix(0.7).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(0.35, b.q1), (0.65, b.q3)],
            BLACK.stroke_width(stroke),
        )))?;
        chart.draw_series(LineSeries::new(
            vec![(0.35, b.median), (0.65, b.median)],
            RED.stroke_width(options.line_thickness),
        ))?;
        let radius = options.line_thickness * 2;
        chart.draw_series(
            b.outliers
                .iter()
                .map(|&v| Circle::new((0.5, v), radius, BLACK.stroke_width(stroke))),
        )?;

        Ok(())
    })
}

/// Horizontal bars, most frequent source at the top. `limit` is the top-N
/// cut the counts were taken with and only feeds the title.
pub fn render_top_sources(
    path: &Path,
    top: &[ValueCount],
    limit: usize,
    options: &VizConfig,
) -> Result<()> {
    let title = top_sources_title(limit);
    let n = top.len() as i32;
    let x_max = y_upper(top.first().map_or(0.0, |c| c.count as f64));
    // segment 0 is drawn at the bottom, so rank i goes to segment n - 1 - i
    let name_at = |segment: i32| -> String {
        top.get((n - 1 - segment) as usize)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    };

    render_png(path, options.image_size, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title.as_str(), caption_font(options))
            .margin(options.margin)
            .x_label_area_size(options.axis_font_size as u32 * 3)
            .y_label_area_size(options.axis_font_size as u32 * 10)
            .build_cartesian_2d(0.0..x_max, (0..n.max(1)).into_segmented())?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(n.max(1) as usize)
            .y_label_formatter(&|v| match v {
                SegmentValue::CenterOf(segment) => name_at(*segment),
                _ => String::new(),
            })
            .x_desc("Number of Articles")
            .y_desc("Source")
            .axis_desc_style(("sans-serif", options.axis_font_size))
            .label_style(("sans-serif", options.tick_font_size))
            .draw()?;

        chart.draw_series(
            Histogram::horizontal(&chart)
                .style(STEEL_BLUE.filled())
                .margin(options.margin)
                .data(
                    top.iter()
                        .enumerate()
                        .map(|(rank, c)| (n - 1 - rank as i32, c.count as f64)),
                ),
        )?;

        Ok(())
    })
}

/// Vertical bars of mean word count per language, in the given order.
pub fn render_language_means(
    path: &Path,
    means: &[LanguageMean],
    min_articles: usize,
    options: &VizConfig,
) -> Result<()> {
    let title = language_means_title(min_articles);
    let n = means.len() as i32;
    let y_max = y_upper(means.first().map_or(0.0, |m| m.mean_word_count));

    render_png(path, options.image_size, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title.as_str(), caption_font(options))
            .margin(options.margin)
            .x_label_area_size(options.axis_font_size as u32 * 5)
            .y_label_area_size(options.axis_font_size as u32 * 4)
            .build_cartesian_2d((0..n.max(1)).into_segmented(), 0.0..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n.max(1) as usize)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => means
                    .get(*i as usize)
                    .map(|m| m.language.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .x_label_style(
                ("sans-serif", options.tick_font_size)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .x_desc("Language")
            .y_desc("Average Word Count")
            .axis_desc_style(("sans-serif", options.axis_font_size))
            .label_style(("sans-serif", options.tick_font_size))
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(SEA_GREEN.mix(0.7).filled())
                .margin(options.margin / 2)
                .data(
                    means
                        .iter()
                        .enumerate()
                        .map(|(i, m)| (i as i32, m.mean_word_count)),
                ),
        )?;

        Ok(())
    })
}
