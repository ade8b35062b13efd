use super::data::{derive_word_counts, load_dataset, output_csv_path, save_with_word_counts};
use super::report::{ReportContext, write_report};
use super::stats::{
    LanguageMean, SentimentStats, ValueCount, WordCountStats, language_word_means,
    parse_sentiment, top_n, value_counts,
};
use super::types::{Dataset, LANGUAGE_COLUMN, OptionalColumns, SENTIMENT_COLUMN, SOURCE_COLUMN};
use super::utils::{format_count, format_fixed};
use super::viz::{
    ChartKind, VizConfig, planned_charts, render_language_means, render_sentiment_histogram,
    render_top_sources, render_word_count_boxplot, render_word_count_histogram,
};
use crate::config::AnalysisConfig;
use crate::error::Result;
use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sentiment scores that parsed, with their summary.
#[derive(Debug, Clone)]
pub struct SentimentAnalysis {
    pub scores: Vec<f64>,
    pub stats: SentimentStats,
}

/// All statistics and derived views computed from one dataset.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub columns: OptionalColumns,
    /// Top-N cut applied to `top_sources`.
    pub source_limit: usize,
    /// Minimum group size applied to `language_means`.
    pub min_language_articles: usize,
    pub word_counts: Vec<u64>,
    pub word_count_stats: WordCountStats,
    pub top_sources: Option<Vec<ValueCount>>,
    pub sentiment: Option<SentimentAnalysis>,
    pub top_languages: Option<Vec<ValueCount>>,
    pub language_means: Option<Vec<LanguageMean>>,
}

impl Analysis {
    pub fn compute(dataset: &Dataset, config: &AnalysisConfig) -> Result<Self> {
        let word_counts = derive_word_counts(dataset)?;
        let word_count_stats = WordCountStats::from_counts(&word_counts);

        let top_sources = dataset
            .column(SOURCE_COLUMN)
            .map(|sources| top_n(value_counts(sources), config.top_sources));

        let sentiment = dataset.column(SENTIMENT_COLUMN).map(|raw| {
            let (scores, missing) = parse_sentiment(&raw);
            let stats = SentimentStats::from_values(&scores, missing);
            SentimentAnalysis { scores, stats }
        });

        let (top_languages, language_means) = match dataset.column(LANGUAGE_COLUMN) {
            Some(languages) => {
                let means =
                    language_word_means(&languages, &word_counts, config.min_language_articles);
                let top = top_n(value_counts(languages), config.top_languages);
                (Some(top), Some(means))
            }
            None => (None, None),
        };

        Ok(Self {
            columns: dataset.optional_columns(),
            source_limit: config.top_sources,
            min_language_articles: config.min_language_articles,
            word_counts,
            word_count_stats,
            top_sources,
            sentiment,
            top_languages,
            language_means,
        })
    }

    pub fn render_chart(&self, kind: ChartKind, path: &Path, options: &VizConfig) -> Result<bool> {
        match kind {
            ChartKind::WordCountHistogram => render_word_count_histogram(
                path,
                &self.word_counts,
                &self.word_count_stats,
                options,
            )?,
            ChartKind::WordCountBoxPlot => {
                render_word_count_boxplot(path, &self.word_counts, options)?
            }
            ChartKind::TopSources => match &self.top_sources {
                Some(top) => render_top_sources(path, top, self.source_limit, options)?,
                None => return Ok(false),
            },
            ChartKind::SentimentHistogram => match &self.sentiment {
                Some(s) => render_sentiment_histogram(path, &s.scores, &s.stats, options)?,
                None => return Ok(false),
            },
            ChartKind::WordCountByLanguage => match &self.language_means {
                Some(means) => {
                    render_language_means(path, means, self.min_language_articles, options)?
                }
                None => return Ok(false),
            },
        }
        Ok(true)
    }

    /// Render every chart the dataset qualifies for into `output_dir`.
    /// Returns the charts written, in drawing order.
    pub fn render_charts(&self, output_dir: &Path, options: &VizConfig) -> Result<Vec<ChartKind>> {
        let mut produced = Vec::new();
        if !options.enabled {
            info!("   Visualization disabled, skipping charts");
            return Ok(produced);
        }

        for kind in planned_charts(self.columns) {
            info!("   - Creating {}...", kind.name());
            let path = output_dir.join(kind.file_name());
            if self.render_chart(kind, &path, options)? {
                debug!("   saved {}", path.display());
                produced.push(kind);
            }
        }
        Ok(produced)
    }
}

/// Paths and figures of a finished run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub article_count: usize,
    pub csv_path: PathBuf,
    pub report_path: PathBuf,
    pub charts: Vec<ChartKind>,
    pub analysis: Analysis,
}

pub fn run(config: &AnalysisConfig) -> Result<AnalysisOutcome> {
    run_at(config, Local::now().naive_local())
}

/// Full pipeline with a fixed report timestamp.
pub fn run_at(config: &AnalysisConfig, generated_at: NaiveDateTime) -> Result<AnalysisOutcome> {
    let output_dir = config.output_dir.as_path();
    std::fs::create_dir_all(output_dir)?;

    info!("1. Loading data from {}...", config.input_path.display());
    let dataset = load_dataset(&config.input_path)?;
    info!("   Total number of articles: {}", dataset.len());

    info!("2. Calculating word counts for each article...");
    let analysis = Analysis::compute(&dataset, config)?;
    let csv_path = output_csv_path(&config.input_path, output_dir);
    info!("   Saving CSV with word count to: {}", csv_path.display());
    save_with_word_counts(&dataset, &analysis.word_counts, &csv_path)?;

    info!("3. Generating statistics...");
    log_word_count_stats(&analysis.word_count_stats);

    info!("4. Generating visualizations...");
    let charts = analysis.render_charts(output_dir, &config.viz)?;

    info!("5. Generating report...");
    let source_file = config
        .input_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ctx = ReportContext {
        article_count: dataset.len(),
        generated_at,
        source_file: &source_file,
        word_counts: &analysis.word_count_stats,
        charts: &charts,
        has_sources: analysis.columns.source,
        sentiment: analysis.sentiment.as_ref().map(|s| &s.stats),
        languages: analysis.top_languages.as_deref(),
    };
    let report_path = write_report(&ctx, output_dir, &config.report_file_name)?;
    info!("   Report saved to: {}", report_path.display());

    info!("Analysis complete, output files in {}", output_dir.display());
    info!("  - {}", csv_path.display());
    for kind in &charts {
        info!("  - {}", kind.file_name());
    }
    info!("  - {}", config.report_file_name);

    Ok(AnalysisOutcome {
        article_count: dataset.len(),
        csv_path,
        report_path,
        charts,
        analysis,
    })
}

fn log_word_count_stats(stats: &WordCountStats) {
    info!("   Average word count: {}", format_fixed(stats.mean, 2));
    info!("   Median word count: {}", format_fixed(stats.median, 2));
    info!("   Min word count: {}", format_count(stats.min));
    info!("   Max word count: {}", format_count(stats.max));
    info!("   Standard deviation: {}", format_fixed(stats.std_dev, 2));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::data::read_dataset;

    #[test]
    fn test_compute_without_optional_columns() {
        let ds = read_dataset("body\n\"a b c\"\n\"\"\nNaN\n".as_bytes()).unwrap();
        let analysis = Analysis::compute(&ds, &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.word_counts, vec![3, 0, 0]);
        assert_eq!(analysis.columns, OptionalColumns::default());
        assert!(analysis.top_sources.is_none());
        assert!(analysis.sentiment.is_none());
        assert!(analysis.top_languages.is_none());
        assert!(analysis.language_means.is_none());
    }

    #[test]
    fn test_compute_with_optional_columns() {
        let mut csv = String::from("body,source,sentiment,language\n");
        for i in 0..6 {
            csv.push_str(&format!("one two three,Reuters,0.{i},en\n"));
        }
        csv.push_str("one,AP,,fr\n");
        let ds = read_dataset(csv.as_bytes()).unwrap();

        let analysis = Analysis::compute(&ds, &AnalysisConfig::default()).unwrap();
        let sources = analysis.top_sources.unwrap();
        assert_eq!(sources[0].value, "Reuters");
        assert_eq!(sources[0].count, 6);
        assert_eq!(sources[1].value, "AP");

        let sentiment = analysis.sentiment.unwrap();
        assert_eq!(sentiment.scores.len(), 6);
        assert_eq!(sentiment.stats.missing, 1);

        let means = analysis.language_means.unwrap();
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].language, "en");
        assert_eq!(means[0].mean_word_count, 3.0);

        let languages = analysis.top_languages.unwrap();
        assert_eq!(languages.len(), 2);
        assert_eq!(languages[1].value, "fr");
    }

    #[test]
    fn test_configured_limits_reach_the_charts() {
        let ds = read_dataset("body,source\nx,AP\ny,AP\nz,BBC\n".as_bytes()).unwrap();
        let config = AnalysisConfig {
            top_sources: 1,
            min_language_articles: 2,
            ..Default::default()
        };
        let analysis = Analysis::compute(&ds, &config).unwrap();
        assert_eq!(analysis.source_limit, 1);
        assert_eq!(analysis.min_language_articles, 2);
        assert_eq!(analysis.top_sources.unwrap().len(), 1);
    }

    #[test]
    fn test_disabled_viz_renders_nothing() {
        let ds = read_dataset("body,source\nx,AP\n".as_bytes()).unwrap();
        let analysis = Analysis::compute(&ds, &AnalysisConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let options = VizConfig {
            enabled: false,
            ..Default::default()
        };
        let charts = analysis.render_charts(dir.path(), &options).unwrap();
        assert!(charts.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
