use super::stats::{SentimentStats, ValueCount, WordCountStats};
use super::utils::{format_count, format_fixed, group_thousands};
use super::viz::ChartKind;
use chrono::NaiveDateTime;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything the Markdown report shows. Optional sections are `Some` only
/// when the input carried the corresponding column.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub article_count: usize,
    pub generated_at: NaiveDateTime,
    pub source_file: &'a str,
    pub word_counts: &'a WordCountStats,
    /// Charts that were actually written
    pub charts: &'a [ChartKind],
    pub has_sources: bool,
    pub sentiment: Option<&'a SentimentStats>,
    /// Most frequent languages, `None` without a language column
    pub languages: Option<&'a [ValueCount]>,
}

impl ReportContext<'_> {
    fn has_chart(&self, kind: ChartKind) -> bool {
        self.charts.contains(&kind)
    }

    fn image(&self, f: &mut fmt::Formatter<'_>, kind: ChartKind, alt: &str) -> fmt::Result {
        if self.has_chart(kind) {
            writeln!(f, "![{}]({})\n", alt, kind.file_name())?;
        }
        Ok(())
    }
}

impl fmt::Display for ReportContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.word_counts;

        writeln!(f, "# News Articles Analysis Report\n")?;
        writeln!(f, "## Overview\n")?;
        writeln!(
            f,
            "- **Total Articles**: {}",
            group_thousands(self.article_count as u64)
        )?;
        writeln!(
            f,
            "- **Analysis Date**: {}",
            self.generated_at.format(TIMESTAMP_FORMAT)
        )?;
        writeln!(f, "- **Source File**: {}\n", self.source_file)?;

        writeln!(f, "## Word Count Statistics\n")?;
        writeln!(f, "- **Average Word Count**: {}", format_fixed(stats.mean, 2))?;
        writeln!(f, "- **Median Word Count**: {}", format_fixed(stats.median, 2))?;
        writeln!(f, "- **Minimum Word Count**: {}", format_count(stats.min))?;
        writeln!(f, "- **Maximum Word Count**: {}", format_count(stats.max))?;
        writeln!(f, "- **Standard Deviation**: {}\n", format_fixed(stats.std_dev, 2))?;

        writeln!(f, "## Visualizations\n")?;
        if self.has_chart(ChartKind::WordCountHistogram) {
            writeln!(f, "### Word Count Distribution")?;
            self.image(f, ChartKind::WordCountHistogram, "Word Count Distribution")?;
        }
        if self.has_chart(ChartKind::WordCountBoxPlot) {
            writeln!(f, "### Box Plot")?;
            self.image(f, ChartKind::WordCountBoxPlot, "Box Plot")?;
        }

        if self.has_sources && self.has_chart(ChartKind::TopSources) {
            writeln!(f, "### Top News Sources")?;
            self.image(f, ChartKind::TopSources, "Top Sources")?;
        }

        if let Some(sentiment) = self.sentiment {
            writeln!(f, "### Sentiment Distribution")?;
            self.image(f, ChartKind::SentimentHistogram, "Sentiment Distribution")?;
            writeln!(f, "- **Average Sentiment**: {}", format_fixed(sentiment.mean, 4))?;
            writeln!(f, "- **Median Sentiment**: {}\n", format_fixed(sentiment.median, 4))?;
        }

        if let Some(languages) = self.languages {
            writeln!(f, "### Word Count by Language")?;
            self.image(f, ChartKind::WordCountByLanguage, "Word Count by Language")?;
            writeln!(f, "#### Language Distribution")?;
            for lang in languages {
                writeln!(
                    f,
                    "- **{}**: {} articles",
                    lang.value,
                    group_thousands(lang.count as u64)
                )?;
            }
        }

        Ok(())
    }
}

pub fn render_report(ctx: &ReportContext<'_>) -> String {
    ctx.to_string()
}

pub fn write_report<P: AsRef<Path>>(
    ctx: &ReportContext<'_>,
    output_dir: P,
    file_name: &str,
) -> std::io::Result<PathBuf> {
    let report_path = output_dir.as_ref().join(file_name);
    let mut report_file = File::create(&report_path)?;
    write!(report_file, "{ctx}")?;
    Ok(report_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 30)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    fn base_stats() -> WordCountStats {
        WordCountStats::from_counts(&[3, 0, 0])
    }

    #[test]
    fn test_minimal_report() {
        let stats = base_stats();
        let charts = [ChartKind::WordCountHistogram, ChartKind::WordCountBoxPlot];
        let ctx = ReportContext {
            article_count: 3,
            generated_at: timestamp(),
            source_file: "articles.csv",
            word_counts: &stats,
            charts: &charts,
            has_sources: false,
            sentiment: None,
            languages: None,
        };

        let expected = "\
# News Articles Analysis Report

## Overview

- **Total Articles**: 3
- **Analysis Date**: 2025-10-30 09:05:00
- **Source File**: articles.csv

## Word Count Statistics

- **Average Word Count**: 1.00
- **Median Word Count**: 0.00
- **Minimum Word Count**: 0
- **Maximum Word Count**: 3
- **Standard Deviation**: 1.73

## Visualizations

### Word Count Distribution
![Word Count Distribution](word_count_distribution.png)

### Box Plot
![Box Plot](word_count_boxplot.png)

";
        assert_eq!(render_report(&ctx), expected);
    }

    #[test]
    fn test_optional_sections() {
        let stats = base_stats();
        let sentiment = SentimentStats::from_values(&[0.25, -0.5, 0.125], 0);
        let languages = vec![
            ValueCount {
                value: "en".to_string(),
                count: 1234,
            },
            ValueCount {
                value: "zh".to_string(),
                count: 56,
            },
        ];
        let charts = ChartKind::ALL;
        let ctx = ReportContext {
            article_count: 1290,
            generated_at: timestamp(),
            source_file: "articles.csv",
            word_counts: &stats,
            charts: &charts,
            has_sources: true,
            sentiment: Some(&sentiment),
            languages: Some(&languages),
        };

        let report = render_report(&ctx);
        assert!(report.contains("- **Total Articles**: 1,290\n"));
        assert!(report.contains("### Top News Sources\n![Top Sources](top_sources.png)\n"));
        assert!(report.contains("![Sentiment Distribution](sentiment_distribution.png)"));
        assert!(report.contains("- **Average Sentiment**: -0.0417\n"));
        assert!(report.contains("- **Median Sentiment**: 0.1250\n"));
        assert!(report.contains("![Word Count by Language](word_count_by_language.png)"));
        assert!(report.ends_with(
            "#### Language Distribution\n- **en**: 1,234 articles\n- **zh**: 56 articles\n"
        ));
    }

    #[test]
    fn test_written_report_matches_rendered() {
        let stats = base_stats();
        let charts = [ChartKind::WordCountHistogram];
        let ctx = ReportContext {
            article_count: 3,
            generated_at: timestamp(),
            source_file: "articles.csv",
            word_counts: &stats,
            charts: &charts,
            has_sources: false,
            sentiment: None,
            languages: None,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&ctx, dir.path(), "report.md").unwrap();
        assert_eq!(path, dir.path().join("report.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), render_report(&ctx));
    }

    #[test]
    fn test_unrendered_charts_are_not_referenced() {
        let stats = base_stats();
        let sentiment = SentimentStats::from_values(&[], 2);
        let ctx = ReportContext {
            article_count: 3,
            generated_at: timestamp(),
            source_file: "articles.csv",
            word_counts: &stats,
            charts: &[],
            has_sources: true,
            sentiment: Some(&sentiment),
            languages: None,
        };

        let report = render_report(&ctx);
        assert!(!report.contains(".png"));
        assert!(!report.contains("Top News Sources"));
        assert!(report.contains("### Sentiment Distribution\n- **Average Sentiment**: n/a\n"));
    }

    #[test]
    fn test_empty_dataset_report() {
        let stats = WordCountStats::from_counts(&[]);
        let ctx = ReportContext {
            article_count: 0,
            generated_at: timestamp(),
            source_file: "empty.csv",
            word_counts: &stats,
            charts: &[],
            has_sources: false,
            sentiment: None,
            languages: None,
        };

        let report = render_report(&ctx);
        assert!(report.contains("- **Average Word Count**: n/a\n"));
        assert!(report.contains("- **Minimum Word Count**: n/a\n"));
        assert!(report.contains("- **Standard Deviation**: n/a\n"));
    }
}
