//! シーンごとの高レベル動作検出

mod basketball;
mod classroom;
mod registry;
mod summary;

use serde::{Deserialize, Serialize};

use crate::pose::{CanonicalPose, RawPose2d, RawPose3d};

pub use basketball::BasketballAnalyzer;
pub use classroom::ClassroomAnalyzer;
pub use registry::{available_scenes, resolve_analyzer, resolve_analyzer_with};
pub use summary::summarize_detections;

/// ある人物について検出された動作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub person_index: usize,
    pub label: String,
    /// 0〜1。負値は「信頼度なし」
    pub confidence: f32,
    #[serde(default)]
    pub description: String,
}

impl Detection {
    pub fn new(person_index: usize, label: &str, confidence: f32, description: String) -> Self {
        Self {
            person_index,
            label: label.to_string(),
            confidence,
            description,
        }
    }
}

/// シーン固有の解析器
///
/// 3つの入力はフレーム内で同じ人物順に並んでいる。
pub trait ScenarioAnalyzer: Send {
    fn name(&self) -> &'static str;

    fn analyze(
        &self,
        canonical_poses: &[CanonicalPose],
        raw_poses: &[RawPose3d],
        poses_2d: &[RawPose2d],
    ) -> Vec<Detection>;
}
