use crate::news::viz::VizConfig;
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::error;

pub const DEFAULT_INPUT_PATH: &str = "data/trump_xi_meeting_fulltext_dedup-1657.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "practice/output";
pub const DEFAULT_REPORT_FILE: &str = "analysis_report.md";

/// Everything a run needs. Omitted fields fall back to the compiled-in defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub report_file_name: String,
    /// Number of sources shown in the top-sources chart
    pub top_sources: usize,
    /// Number of rows in the report's language frequency table
    pub top_languages: usize,
    /// Languages with fewer articles are left out of the per-language means
    pub min_language_articles: usize,
    pub viz: VizConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            report_file_name: DEFAULT_REPORT_FILE.to_string(),
            top_sources: 10,
            top_languages: 10,
            min_language_articles: 5,
            viz: VizConfig::default(),
        }
    }
}

/// Load a config file, choosing the format from its extension.
pub fn load_config<T: DeserializeOwned>(config_path: impl AsRef<Path>) -> Result<T> {
    let config_path = config_path.as_ref();
    match config_path.extension().and_then(|ext| ext.to_str()) {
        Some("pkl") => load_pkl(config_path),
        Some("json") => load_json(config_path),
        other => Err(anyhow!(
            "unsupported config format {:?} for {}",
            other.unwrap_or(""),
            config_path.display()
        )),
    }
}

pub fn load_json<T: DeserializeOwned>(config_path: impl AsRef<Path>) -> Result<T> {
    let config_path = config_path.as_ref();
    let json_str = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config {}", config_path.display()))?;
    let config: T = serde_json::from_str(&json_str).context("Failed to parse config json")?;
    Ok(config)
}

pub fn load_pkl<T: DeserializeOwned>(config_path: impl AsRef<Path>) -> Result<T> {
    let config_path = config_path.as_ref();
    let output = Command::new("pkl")
        .arg("eval")
        .arg("-f")
        .arg("json")
        .arg(config_path)
        .output()
        .context("Failed to execute pkl command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("pkl failed: {}", stderr);
        return Err(anyhow!("pkl failed: {}", stderr));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);

    let config: T = serde_json::from_str(&json_str).context("Failed to parse config json")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_compiled_in_paths() {
        let config = AnalysisConfig::default();
        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT_PATH));
        assert_eq!(config.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(config.top_sources, 10);
        assert_eq!(config.min_language_articles, 5);
        assert!(config.viz.enabled);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "input_path": "in.csv", "viz": { "enabled": false, "histogram_bins": 20 } }"#,
        )
        .unwrap();

        let config: AnalysisConfig = load_config(&path).unwrap();
        assert_eq!(config.input_path, PathBuf::from("in.csv"));
        assert_eq!(config.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert!(!config.viz.enabled);
        assert_eq!(config.viz.histogram_bins, 20);
        assert_eq!(config.viz.image_size, VizConfig::default().image_size);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result: Result<AnalysisConfig> = load_config("config.yaml");
        assert!(result.is_err());
    }
}
