//! 教室: 机に伏せている姿勢の検出

use super::{Detection, ScenarioAnalyzer};
use crate::config::AnalysisConfig;
use crate::geometry::angle_between;
use crate::pose::{BodyBasis, CanonicalPose, JointIndex, RawPose2d, RawPose3d};

/// 頭の高さが肩の高さのこの割合未満なら頭が下がっている
const HEAD_DROP_RATIO: f32 = 0.75;
const FORWARD_SHIFT: f32 = 0.20;
/// 手首が肩の高さのこの割合未満なら机上にあるとみなす
const WRIST_REST_RATIO: f32 = 0.6;

const W_TORSO: f32 = 0.4;
const W_HEAD: f32 = 0.25;
const W_FORWARD: f32 = 0.2;
const W_WRIST: f32 = 0.1;

pub struct ClassroomAnalyzer {
    lean_threshold: f32,
    min_confidence: f32,
}

impl ClassroomAnalyzer {
    pub fn new(lean_threshold: f32, min_confidence: f32) -> Self {
        Self {
            lean_threshold,
            min_confidence,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.lean_threshold, config.min_confidence)
    }

    fn detect_leaning(&self, pose: &CanonicalPose, person: usize) -> Option<Detection> {
        use JointIndex::*;

        let basis = BodyBasis::from_pose(pose);
        if !basis.is_defined() {
            return None;
        }

        let hip_center = pose.hip_center();
        let head = pose.get(Nose) - hip_center;

        let torso_angle = angle_between(&head, &basis.up);
        let head_height = head.dot(&basis.up);
        let shoulder_height = (pose.shoulder_center() - hip_center).dot(&basis.up);
        let forward_shift = head.dot(&basis.front);
        let min_wrist_height = [LeftWrist, RightWrist]
            .iter()
            .map(|w| (pose.get(*w) - hip_center).dot(&basis.up))
            .fold(f32::INFINITY, f32::min);

        let mut score: f32 = 0.0;
        if torso_angle >= self.lean_threshold {
            score += W_TORSO;
        }
        if head_height < shoulder_height * HEAD_DROP_RATIO {
            score += W_HEAD;
        }
        if forward_shift > FORWARD_SHIFT {
            score += W_FORWARD;
        }
        if min_wrist_height < shoulder_height * WRIST_REST_RATIO {
            score += W_WRIST;
        }

        let confidence = score.min(1.0);
        if confidence < self.min_confidence {
            return None;
        }
        Some(Detection::new(
            person,
            "leaning on desk",
            confidence,
            format!(
                "Torso angle {:.0}°, head height {:.2}, forward shift {:.2}",
                torso_angle, head_height, forward_shift
            ),
        ))
    }
}

impl Default for ClassroomAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl ScenarioAnalyzer for ClassroomAnalyzer {
    fn name(&self) -> &'static str {
        "classroom"
    }

    fn analyze(
        &self,
        canonical_poses: &[CanonicalPose],
        _raw_poses: &[RawPose3d],
        _poses_2d: &[RawPose2d],
    ) -> Vec<Detection> {
        canonical_poses
            .iter()
            .enumerate()
            .filter_map(|(person, pose)| self.detect_leaning(pose, person))
            .collect()
    }
}
