//! 関節ごとの負傷リスク判定
//!
//! 肩・肘・腰・膝・足首について角度の閾値で危険フラグを立てる。
//! リスク判定用の基底は再直交化しない（[`BodyBasis::from_pose`] とは別物）。

use log::warn;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::geometry::{angle_between, normalize, EPSILON};
use crate::pose::{CanonicalPose, JointIndex};

/// 肩の外転角の上限（度）
pub const SHOULDER_ABDUCTION_MAX: f32 = 85.0;
pub const ELBOW_ANGLE_MIN: f32 = 25.0;
pub const ELBOW_ANGLE_MAX: f32 = 160.0;
pub const HIP_ANGLE_MIN: f32 = 45.0;
/// 前方ベクトルと大腿のなす角の上限
pub const HIP_FRONT_MAX: f32 = 95.0;
pub const KNEE_ANGLE_MIN: f32 = 45.0;
pub const KNEE_LATERAL_MAX: f32 = 30.0;
pub const ANKLE_ANGLE_MAX: f32 = 30.0;

/// 1人分の関節フラグ（`JointIndex` で引く）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskFlags(pub [bool; JointIndex::COUNT]);

impl RiskFlags {
    pub fn is_flagged(&self, joint: JointIndex) -> bool {
        self.0[joint as usize]
    }

    pub fn set(&mut self, joint: JointIndex) {
        self.0[joint as usize] = true;
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|f| *f)
    }

    /// フラグの立った関節（インデックス順）
    pub fn flagged(&self) -> impl Iterator<Item = JointIndex> + '_ {
        JointIndex::ALL
            .into_iter()
            .filter(move |joint| self.is_flagged(*joint))
    }
}

/// オーバーレイ表示用の関節ラベル。ラベルのない関節は表示しない
pub fn warning_label(joint: JointIndex) -> Option<&'static str> {
    use JointIndex::*;
    match joint {
        LeftShoulder => Some("left shoulder"),
        LeftElbow => Some("left elbow"),
        LeftWrist => Some("left wrist"),
        LeftKnee => Some("left knee"),
        RightShoulder => Some("right shoulder"),
        RightElbow => Some("right elbow"),
        RightWrist => Some("right wrist"),
        RightKnee => Some("right knee"),
        _ => None,
    }
}

struct RiskBasis {
    left_to_right: Vector3<f32>,
    front: Vector3<f32>,
}

impl RiskBasis {
    fn from_pose(pose: &CanonicalPose) -> Self {
        let (up, _) = normalize(&(pose.get(JointIndex::Neck) - pose.hip_center()));
        let (left_to_right, _) =
            normalize(&(pose.get(JointIndex::RightShoulder) - pose.get(JointIndex::LeftShoulder)));
        let (front, _) = normalize(&up.cross(&left_to_right));
        Self { left_to_right, front }
    }
}

/// 全員分のリスクフラグを返す。出力長は入力長と同じ
pub fn detect_injury_risk(poses: &[CanonicalPose]) -> Vec<RiskFlags> {
    poses
        .iter()
        .enumerate()
        .map(|(person, pose)| detect_pose_risk(person, pose))
        .collect()
}

/// 2ベクトルのなす角。どちらかが退化していれば判定しない
fn checked_angle(v1: &Vector3<f32>, v2: &Vector3<f32>) -> Option<f32> {
    if v1.norm() * v2.norm() < EPSILON {
        return None;
    }
    Some(angle_between(v1, v2))
}

fn checked_angle_at(pose: &CanonicalPose, vertex: JointIndex, a: JointIndex, b: JointIndex) -> Option<f32> {
    let v = pose.get(vertex);
    checked_angle(&(pose.get(a) - v), &(pose.get(b) - v))
}

fn detect_pose_risk(person: usize, pose: &CanonicalPose) -> RiskFlags {
    use JointIndex::*;

    let basis = RiskBasis::from_pose(pose);
    let mut flags = RiskFlags::default();

    // 肩: 上腕と斜め前方のなす角
    let front_right = basis.front + basis.left_to_right;
    let front_left = basis.front - basis.left_to_right;
    for (shoulder, elbow, reference, side) in [
        (RightShoulder, RightElbow, front_right, "right"),
        (LeftShoulder, LeftElbow, front_left, "left"),
    ] {
        let Some(angle) = checked_angle(&(pose.get(elbow) - pose.get(shoulder)), &reference) else {
            continue;
        };
        if angle > SHOULDER_ABDUCTION_MAX {
            warn!("person {} {} shoulder may be at risk (shooting): {:.1}°", person, side, angle);
            flags.set(shoulder);
        }
    }

    for (elbow, shoulder, wrist, side) in [
        (RightElbow, RightShoulder, RightWrist, "right"),
        (LeftElbow, LeftShoulder, LeftWrist, "left"),
    ] {
        let Some(angle) = checked_angle_at(pose, elbow, shoulder, wrist) else {
            continue;
        };
        if !(ELBOW_ANGLE_MIN..=ELBOW_ANGLE_MAX).contains(&angle) {
            warn!("person {} {} elbow may be at risk (shooting): {:.1}°", person, side, angle);
            flags.set(elbow);
        }
    }

    for (hip, knee, side) in [(RightHip, RightKnee, "right"), (LeftHip, LeftKnee, "left")] {
        let angle = checked_angle_at(pose, hip, Neck, knee);
        let front_angle = checked_angle(&basis.front, &(pose.get(knee) - pose.get(hip)));
        let too_closed = angle.is_some_and(|a| a < HIP_ANGLE_MIN);
        let too_far_back = front_angle.is_some_and(|a| a > HIP_FRONT_MAX);
        if too_closed || too_far_back {
            warn!(
                "person {} {} hip may be at risk (jumping): {:.1}° / front {:.1}°",
                person,
                side,
                angle.unwrap_or(f32::NAN),
                front_angle.unwrap_or(f32::NAN)
            );
            flags.set(hip);
        }
    }

    // 膝: 側方角は膝角度そのものと同じ式
    for (knee, hip, ankle, side) in [
        (RightKnee, RightHip, RightAnkle, "right"),
        (LeftKnee, LeftHip, LeftAnkle, "left"),
    ] {
        let Some(angle) = checked_angle_at(pose, knee, hip, ankle) else {
            continue;
        };
        let lateral = angle_between(&(pose.get(ankle) - pose.get(knee)), &(pose.get(hip) - pose.get(knee)));
        if angle < KNEE_ANGLE_MIN || lateral > KNEE_LATERAL_MAX {
            warn!("person {} {} knee may be at risk (landing): {:.1}°", person, side, angle);
            flags.set(knee);
        }
    }

    let lateral_axis = Vector3::new(0.0, 1.0, 0.0);
    for (ankle, knee, side) in [(RightAnkle, RightKnee, "right"), (LeftAnkle, LeftKnee, "left")] {
        let Some(angle) = checked_angle(&(pose.get(knee) - pose.get(ankle)), &lateral_axis) else {
            continue;
        };
        if angle > ANKLE_ANGLE_MAX {
            warn!("person {} {} ankle may be at risk (landing): {:.1}°", person, side, angle);
            flags.set(ankle);
        }
    }

    flags
}
