//! バスケットボール: シュート・ドリブル・ディフェンス姿勢の検出
//!
//! いずれも姿勢の証拠ごとに重みを足し、合計（上限1.0）を信頼度とする。

use super::{Detection, ScenarioAnalyzer};
use crate::config::AnalysisConfig;
use crate::geometry::{distance, floor_denominator};
use crate::pose::{BodyBasis, CanonicalPose, JointIndex, RawPose2d, RawPose3d};

const SHOOT_WRIST_RAISED: f32 = 0.15;
const SHOOT_WRIST_HIGH: f32 = 0.30;
const SHOOT_ELBOW_RANGE: (f32, f32) = (45.0, 140.0);
const SHOOT_HAND_PROXIMITY: f32 = 0.4;
/// 手の距離をこの倍率×肩幅で正規化
const SHOOT_PROXIMITY_SPAN: f32 = 1.5;
const SHOOT_RELEASE_FORWARD: f32 = 0.05;

const SHOOT_W_RAISED: f32 = 0.35;
const SHOOT_W_ELBOW: f32 = 0.30;
const SHOOT_W_PROXIMITY: f32 = 0.20;
const SHOOT_W_RELEASE: f32 = 0.10;
const SHOOT_W_HIGH: f32 = 0.10;

const DRIBBLE_WRIST_BELOW_HIP: f32 = -0.1;
const DRIBBLE_FORWARD_LEAN: f32 = 0.05;
const DRIBBLE_WRIST_LEVEL: f32 = 0.2;

const DEFENSE_KNEE_ANGLE: f32 = 120.0;
const DEFENSE_ARM_EXTENSION: f32 = 1.2;
const DEFENSE_TORSO_HEIGHT: f32 = 0.4;

/// 片手ぶんの関節
struct Hand {
    side: &'static str,
    shoulder: JointIndex,
    elbow: JointIndex,
    wrist: JointIndex,
    opposite_wrist: JointIndex,
}

const RIGHT_HAND: Hand = Hand {
    side: "Right",
    shoulder: JointIndex::RightShoulder,
    elbow: JointIndex::RightElbow,
    wrist: JointIndex::RightWrist,
    opposite_wrist: JointIndex::LeftWrist,
};

const LEFT_HAND: Hand = Hand {
    side: "Left",
    shoulder: JointIndex::LeftShoulder,
    elbow: JointIndex::LeftElbow,
    wrist: JointIndex::LeftWrist,
    opposite_wrist: JointIndex::RightWrist,
};

/// 片手のシュート証拠
#[derive(Debug, Clone, Copy)]
struct HandEvidence {
    confidence: f32,
    wrist_height: f32,
    elbow_angle: f32,
    hand_proximity: f32,
}

fn evaluate_hand(pose: &CanonicalPose, basis: &BodyBasis, hand: &Hand) -> HandEvidence {
    let shoulder = pose.get(hand.shoulder);
    let wrist = pose.get(hand.wrist);

    let wrist_height = (wrist - shoulder).dot(&basis.up);
    let elbow_angle = pose.angle_at(hand.elbow, hand.shoulder, hand.wrist);

    let shoulder_span = floor_denominator(distance(
        pose.get(JointIndex::RightShoulder),
        pose.get(JointIndex::LeftShoulder),
    ));
    let hand_distance = distance(wrist, pose.get(hand.opposite_wrist));
    let hand_proximity = 1.0 - (hand_distance / (shoulder_span * SHOOT_PROXIMITY_SPAN)).min(1.0);

    let release_forward = (wrist - pose.hip_center()).dot(&basis.front);

    let mut score = 0.0;
    if wrist_height > SHOOT_WRIST_RAISED {
        score += SHOOT_W_RAISED;
    }
    if (SHOOT_ELBOW_RANGE.0..=SHOOT_ELBOW_RANGE.1).contains(&elbow_angle) {
        score += SHOOT_W_ELBOW;
    }
    if hand_proximity > SHOOT_HAND_PROXIMITY {
        score += SHOOT_W_PROXIMITY;
    }
    if release_forward > SHOOT_RELEASE_FORWARD {
        score += SHOOT_W_RELEASE;
    }
    if wrist_height > SHOOT_WRIST_HIGH {
        score += SHOOT_W_HIGH;
    }

    HandEvidence {
        confidence: f32::min(score, 1.0),
        wrist_height,
        elbow_angle,
        hand_proximity,
    }
}

pub struct BasketballAnalyzer {
    min_confidence: f32,
}

impl BasketballAnalyzer {
    pub fn new(min_confidence: f32) -> Self {
        Self { min_confidence }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.min_confidence)
    }

    fn detect_shooting(&self, pose: &CanonicalPose, basis: &BodyBasis, person: usize) -> Option<Detection> {
        let right = evaluate_hand(pose, basis, &RIGHT_HAND);
        let left = evaluate_hand(pose, basis, &LEFT_HAND);
        // 同点なら先に評価した右手
        let (hand, best) = if left.confidence > right.confidence {
            (&LEFT_HAND, left)
        } else {
            (&RIGHT_HAND, right)
        };
        if best.confidence <= 0.0 || best.confidence < self.min_confidence {
            return None;
        }
        Some(Detection::new(
            person,
            "shooting posture",
            best.confidence,
            format!(
                "{} hand elevated ({:.2}), elbow {:.0}°, hands proximity {:.2}",
                hand.side, best.wrist_height, best.elbow_angle, best.hand_proximity
            ),
        ))
    }

    fn detect_dribbling(&self, pose: &CanonicalPose, basis: &BodyBasis, person: usize) -> Option<Detection> {
        let hip_center = pose.hip_center();
        let left = (pose.get(JointIndex::LeftWrist) - hip_center).dot(&basis.up);
        let right = (pose.get(JointIndex::RightWrist) - hip_center).dot(&basis.up);
        let min_wrist_height = left.min(right);
        let forward_lean = (pose.shoulder_center() - hip_center).dot(&basis.front);

        let mut score: f32 = 0.0;
        if min_wrist_height < DRIBBLE_WRIST_BELOW_HIP {
            score += 0.4;
        }
        if forward_lean > DRIBBLE_FORWARD_LEAN {
            score += 0.3;
        }
        if (left - right).abs() < DRIBBLE_WRIST_LEVEL {
            score += 0.3;
        }

        let confidence = score.min(1.0);
        if confidence < self.min_confidence {
            return None;
        }
        Some(Detection::new(
            person,
            "dribbling posture",
            confidence,
            format!("wrist height {:.2}, forward lean {:.2}", min_wrist_height, forward_lean),
        ))
    }

    fn detect_defense(&self, pose: &CanonicalPose, person: usize) -> Option<Detection> {
        use JointIndex::*;

        let knee_angle = (pose.angle_at(LeftKnee, LeftHip, LeftAnkle)
            + pose.angle_at(RightKnee, RightHip, RightAnkle))
            / 2.0;
        let shoulder_span = floor_denominator(distance(pose.get(LeftShoulder), pose.get(RightShoulder)));
        let arm_extension = distance(pose.get(LeftWrist), pose.get(RightWrist)) / shoulder_span;
        let torso_height = distance(&pose.shoulder_center(), &pose.hip_center());

        let mut score: f32 = 0.0;
        if knee_angle < DEFENSE_KNEE_ANGLE {
            score += 0.4;
        }
        if arm_extension > DEFENSE_ARM_EXTENSION {
            score += 0.3;
        }
        if torso_height < DEFENSE_TORSO_HEIGHT {
            score += 0.3;
        }

        let confidence = score.min(1.0);
        if confidence < self.min_confidence {
            return None;
        }
        Some(Detection::new(
            person,
            "defense posture",
            confidence,
            format!("knee angle {:.0}°, arm extension {:.2}", knee_angle, arm_extension),
        ))
    }
}

impl Default for BasketballAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl ScenarioAnalyzer for BasketballAnalyzer {
    fn name(&self) -> &'static str {
        "basketball"
    }

    fn analyze(
        &self,
        canonical_poses: &[CanonicalPose],
        _raw_poses: &[RawPose3d],
        _poses_2d: &[RawPose2d],
    ) -> Vec<Detection> {
        let mut detections = Vec::new();
        for (person, pose) in canonical_poses.iter().enumerate() {
            let basis = BodyBasis::from_pose(pose);
            if !basis.is_defined() {
                continue;
            }
            detections.extend(self.detect_shooting(pose, &basis, person));
            detections.extend(self.detect_dribbling(pose, &basis, person));
            detections.extend(self.detect_defense(pose, person));
        }
        detections
    }
}
