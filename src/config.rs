use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// シーン名 ("basketball" / "classroom")
    #[serde(default = "default_scene")]
    pub scene: String,
    /// 出力メトリクスの絞り込み ("dribbling" / "defense" / "shooting" / "all")
    #[serde(default = "default_training_type")]
    pub training_type: String,
    /// 外部パラメータJSONのパス
    #[serde(default = "default_extrinsics_path")]
    pub extrinsics_path: String,
    /// 入力にフレームレートがない場合の既定値
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
}

fn default_scene() -> String { "basketball".to_string() }
fn default_training_type() -> String { "all".to_string() }
fn default_extrinsics_path() -> String { "data/extrinsics.json".to_string() }
fn default_frame_rate() -> f32 { 30.0 }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scene: default_scene(),
            training_type: default_training_type(),
            extrinsics_path: default_extrinsics_path(),
            frame_rate: default_frame_rate(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalysisConfig {
    /// 2Dキーポイントを出力に含める最低信頼度
    #[serde(default = "default_keypoint_confidence_threshold")]
    pub keypoint_confidence_threshold: f32,
    /// シーン検出を採用する最低信頼度
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// 机に伏せていると判定する体幹角度（度）
    #[serde(default = "default_lean_threshold")]
    pub lean_threshold: f32,
    /// オーバーレイに表示する検出の最大数
    #[serde(default = "default_max_summary_lines")]
    pub max_summary_lines: usize,
}

fn default_keypoint_confidence_threshold() -> f32 { 0.2 }
fn default_min_confidence() -> f32 { 0.6 }
fn default_lean_threshold() -> f32 { 60.0 }
fn default_max_summary_lines() -> usize { 5 }

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            keypoint_confidence_threshold: default_keypoint_confidence_threshold(),
            min_confidence: default_min_confidence(),
            lean_threshold: default_lean_threshold(),
            max_summary_lines: default_max_summary_lines(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// "error" / "warn" / "info" / "debug" / "trace" / "off"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// 読めなければ既定値で続行する
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.session.scene, "basketball");
        assert_eq!(config.session.training_type, "all");
        assert_eq!(config.session.extrinsics_path, "data/extrinsics.json");
        assert!((config.session.frame_rate - 30.0).abs() < 1e-6);
        assert!((config.analysis.min_confidence - 0.6).abs() < 1e-6);
        assert!((config.analysis.keypoint_confidence_threshold - 0.2).abs() < 1e-6);
        assert!((config.analysis.lean_threshold - 60.0).abs() < 1e-6);
        assert_eq!(config.analysis.max_summary_lines, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [session]
            scene = "classroom"

            [analysis]
            lean_threshold = 45.0
            "#,
        )
        .unwrap();
        assert_eq!(config.session.scene, "classroom");
        assert_eq!(config.session.training_type, "all");
        assert!((config.analysis.lean_threshold - 45.0).abs() < 1e-6);
        assert!((config.analysis.min_confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/scene-monitor.toml");
        assert_eq!(config.session.scene, "basketball");
    }

    #[test]
    fn test_load_reports_parse_error() {
        let path = std::env::temp_dir().join("scene_monitor_bad_config.toml");
        fs::write(&path, "[session\nscene = ").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
        let _ = fs::remove_file(&path);
    }
}
