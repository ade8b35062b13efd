use statrs::statistics::{Data, Median, Statistics};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Descriptive statistics over the per-article word counts.
///
/// Every aggregate is `None` when it is undefined for the input size (all of
/// them for an empty dataset, the standard deviation for a single article) or
/// does not fit in an `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordCountStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<u64>,
    pub max: Option<u64>,
    pub std_dev: Option<f64>,
}

impl WordCountStats {
    pub fn from_counts(counts: &[u64]) -> Self {
        let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
        Self {
            count: counts.len(),
            mean: mean(&values),
            median: median(&values),
            min: counts.iter().copied().min(),
            max: counts.iter().copied().max(),
            std_dev: sample_std_dev(&values),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentStats {
    /// Number of parseable scores
    pub count: usize,
    /// Missing or unparseable scores
    pub missing: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

impl SentimentStats {
    pub fn from_values(values: &[f64], missing: usize) -> Self {
        Self {
            count: values.len(),
            missing,
            mean: mean(values),
            median: median(values),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageMean {
    pub language: String,
    pub articles: usize,
    pub mean_word_count: f64,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    finite(values.iter().mean())
}

pub fn median(values: &[f64]) -> Option<f64> {
    finite(Data::new(values.to_vec()).median())
}

/// Standard deviation with the n-1 denominator.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    finite(values.iter().std_dev())
}

/// Quantile of already sorted data, interpolating linearly between the two
/// nearest order statistics.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Frequency of each non-missing value, most frequent first. Equal counts keep
/// the order in which the values were first seen.
pub fn value_counts<'a, I>(values: I) -> Vec<ValueCount>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();

    for value in values.into_iter().flatten() {
        match index.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(ValueCount {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn top_n(mut counts: Vec<ValueCount>, n: usize) -> Vec<ValueCount> {
    counts.truncate(n);
    counts
}

/// Mean word count per language, keeping languages with at least `min_articles`
/// articles, highest mean first. Ties are ordered by language code.
pub fn language_word_means(
    languages: &[Option<&str>],
    word_counts: &[u64],
    min_articles: usize,
) -> Vec<LanguageMean> {
    let mut groups: BTreeMap<&str, (u64, usize)> = BTreeMap::new();
    for (language, &count) in languages.iter().zip(word_counts) {
        if let Some(language) = language {
            let entry = groups.entry(*language).or_insert((0, 0));
            entry.0 += count;
            entry.1 += 1;
        }
    }

    let mut means: Vec<LanguageMean> = groups
        .into_iter()
        .filter(|(_, (_, articles))| *articles >= min_articles)
        .map(|(language, (total, articles))| LanguageMean {
            language: language.to_string(),
            articles,
            mean_word_count: total as f64 / articles as f64,
        })
        .collect();

    means.sort_by(|a, b| b.mean_word_count.total_cmp(&a.mean_word_count));
    means
}

/// Parse sentiment scores. Missing, unparseable and non-finite values are
/// dropped; the second element counts them.
pub fn parse_sentiment(values: &[Option<&str>]) -> (Vec<f64>, usize) {
    let mut scores = Vec::with_capacity(values.len());
    let mut unparseable = 0;

    for value in values.iter().flatten() {
        match value.trim().parse::<f64>() {
            Ok(score) if score.is_finite() => scores.push(score),
            _ => unparseable += 1,
        }
    }

    if unparseable > 0 {
        warn!(
            "{} sentiment values could not be parsed and were treated as missing",
            unparseable
        );
    }

    let missing = values.len() - scores.len();
    (scores, missing)
}
