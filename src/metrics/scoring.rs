//! シュート精度スコア（0〜100）
//!
//! 5要素をそれぞれ段階的な閾値で 20 / 12 / 4 / 0 点に割り当てて合計する。
//! 連続関数ではなく帯ごとの加点で、帯の境界はそのまま再現する。

use crate::pose::{BodyBasis, CanonicalPose, JointIndex};

const FULL: f32 = 20.0;
const PARTIAL: f32 = 12.0;
const MINIMAL: f32 = 4.0;

const WRIST_HEIGHT_BANDS: [f32; 3] = [0.3, 0.2, 0.1];
const ELBOW_ANGLE_BANDS: [(f32, f32); 3] = [(80.0, 120.0), (60.0, 140.0), (40.0, 160.0)];
const SHOULDER_TILT_BANDS: [f32; 3] = [0.05, 0.1, 0.15];
const RELEASE_FORWARD_BANDS: [f32; 3] = [0.1, 0.05, 0.0];
const KNEE_ANGLE_BANDS: [(f32, f32); 2] = [(100.0, 130.0), (80.0, 150.0)];

const MAX_SCORE: f32 = 100.0;

const POINTS: [f32; 3] = [FULL, PARTIAL, MINIMAL];

/// 値が閾値を上回る最初の帯の点数
fn above_bands(value: f32, bands: &[f32; 3]) -> f32 {
    bands
        .iter()
        .zip(POINTS)
        .find(|(threshold, _)| value > **threshold)
        .map_or(0.0, |(_, points)| points)
}

/// 値が閾値を下回る最初の帯の点数
fn below_bands(value: f32, bands: &[f32; 3]) -> f32 {
    bands
        .iter()
        .zip(POINTS)
        .find(|(threshold, _)| value < **threshold)
        .map_or(0.0, |(_, points)| points)
}

/// 値が含まれる最初の閉区間の点数
fn within_bands(value: f32, bands: &[(f32, f32)], points: &[f32]) -> Option<f32> {
    bands
        .iter()
        .zip(points)
        .find(|((lo, hi), _)| (*lo..=*hi).contains(&value))
        .map(|(_, points)| *points)
}

pub fn wrist_height_points(max_wrist_height: f32) -> f32 {
    above_bands(max_wrist_height, &WRIST_HEIGHT_BANDS)
}

pub fn elbow_angle_points(avg_elbow_angle: f32) -> f32 {
    within_bands(avg_elbow_angle, &ELBOW_ANGLE_BANDS, &POINTS).unwrap_or(0.0)
}

pub fn shoulder_tilt_points(shoulder_tilt: f32) -> f32 {
    below_bands(shoulder_tilt, &SHOULDER_TILT_BANDS)
}

pub fn release_forward_points(release_forward: f32) -> f32 {
    above_bands(release_forward, &RELEASE_FORWARD_BANDS)
}

/// 膝はどの帯にも入らなくても最低点が付く
pub fn knee_angle_points(avg_knee_angle: f32) -> f32 {
    within_bands(avg_knee_angle, &KNEE_ANGLE_BANDS, &POINTS[..2]).unwrap_or(MINIMAL)
}

/// シュート精度を評価する。基底が定義済みであることが前提
pub fn shooting_accuracy(pose: &CanonicalPose, basis: &BodyBasis) -> f32 {
    use JointIndex::*;

    let shoulder_center = pose.shoulder_center();
    let hip_center = pose.hip_center();

    let left_wrist_height = (pose.get(LeftWrist) - shoulder_center).dot(&basis.up);
    let right_wrist_height = (pose.get(RightWrist) - shoulder_center).dot(&basis.up);
    let max_wrist_height = left_wrist_height.max(right_wrist_height);

    let avg_elbow_angle =
        (pose.angle_at(LeftElbow, LeftShoulder, LeftWrist) + pose.angle_at(RightElbow, RightShoulder, RightWrist)) / 2.0;

    let shoulder_tilt = (pose.get(RightShoulder) - pose.get(LeftShoulder))
        .dot(&basis.left_to_right)
        .abs();

    let release_forward = (pose.get(RightWrist) - hip_center).dot(&basis.front);

    let avg_knee_angle =
        (pose.angle_at(LeftKnee, LeftHip, LeftAnkle) + pose.angle_at(RightKnee, RightHip, RightAnkle)) / 2.0;

    let score = wrist_height_points(max_wrist_height)
        + elbow_angle_points(avg_elbow_angle)
        + shoulder_tilt_points(shoulder_tilt)
        + release_forward_points(release_forward)
        + knee_angle_points(avg_knee_angle);

    score.min(MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrist_height_bands() {
        assert_eq!(wrist_height_points(0.31), 20.0);
        assert_eq!(wrist_height_points(0.3), 12.0);
        assert_eq!(wrist_height_points(0.21), 12.0);
        assert_eq!(wrist_height_points(0.2), 4.0);
        assert_eq!(wrist_height_points(0.11), 4.0);
        assert_eq!(wrist_height_points(0.1), 0.0);
        assert_eq!(wrist_height_points(-0.5), 0.0);
    }

    #[test]
    fn test_elbow_angle_bands_are_inclusive() {
        assert_eq!(elbow_angle_points(80.0), 20.0);
        assert_eq!(elbow_angle_points(120.0), 20.0);
        assert_eq!(elbow_angle_points(60.0), 12.0);
        assert_eq!(elbow_angle_points(140.0), 12.0);
        assert_eq!(elbow_angle_points(40.0), 4.0);
        assert_eq!(elbow_angle_points(160.0), 4.0);
        assert_eq!(elbow_angle_points(39.9), 0.0);
        assert_eq!(elbow_angle_points(170.0), 0.0);
    }

    #[test]
    fn test_shoulder_tilt_bands() {
        assert_eq!(shoulder_tilt_points(0.0), 20.0);
        assert_eq!(shoulder_tilt_points(0.05), 12.0);
        assert_eq!(shoulder_tilt_points(0.1), 4.0);
        assert_eq!(shoulder_tilt_points(0.15), 0.0);
    }

    #[test]
    fn test_release_forward_bands() {
        assert_eq!(release_forward_points(0.2), 20.0);
        assert_eq!(release_forward_points(0.1), 12.0);
        assert_eq!(release_forward_points(0.05), 4.0);
        assert_eq!(release_forward_points(0.01), 4.0);
        assert_eq!(release_forward_points(0.0), 0.0);
    }

    #[test]
    fn test_knee_angle_bands_have_floor() {
        assert_eq!(knee_angle_points(115.0), 20.0);
        assert_eq!(knee_angle_points(90.0), 12.0);
        assert_eq!(knee_angle_points(150.0), 12.0);
        assert_eq!(knee_angle_points(179.0), 4.0);
        assert_eq!(knee_angle_points(10.0), 4.0);
    }
}
