//! 入力ポーズ列と解析結果のJSON入出力

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::pipeline::FrameReport;
use crate::pose::{RawPose2d, RawPose3d};

/// 1フレーム分の推定結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    #[serde(default)]
    pub poses_3d: Vec<RawPose3d>,
    #[serde(default)]
    pub poses_2d: Vec<RawPose2d>,
}

/// 推定器が書き出したポーズ列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseSequence {
    #[serde(default)]
    pub video_source: String,
    /// 無ければ設定値を使う
    #[serde(default)]
    pub frame_rate: Option<f32>,
    #[serde(default)]
    pub frames: Vec<InputFrame>,
}

/// 解析結果の書き出し形式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceExport {
    pub video_source: String,
    pub frame_rate: f32,
    pub total_frames: usize,
    pub frames: Vec<FrameReport>,
}

pub fn load_sequence<P: AsRef<Path>>(path: P) -> Result<PoseSequence> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pose sequence: {}", path.display()))?;
    let sequence: PoseSequence = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse pose sequence: {}", path.display()))?;
    Ok(sequence)
}

pub fn save_export<P: AsRef<Path>>(path: P, export: &SequenceExport) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(export)?;
    fs::write(path, json).with_context(|| format!("Failed to write export: {}", path.display()))?;
    Ok(())
}
