use nalgebra::Vector3;

use super::keypoint::JointIndex;
use super::skeleton::CanonicalPose;
use crate::geometry::{normalize, EPSILON};

/// 体に固定した正規直交基底 (上, 左→右, 前)
///
/// 首または腰が欠けて `up` が求まらない場合、3軸すべてゼロベクトルになる。
/// 基底に依存するメトリクスは [`BodyBasis::is_defined`] を確認してから使うこと。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyBasis {
    pub up: Vector3<f32>,
    pub left_to_right: Vector3<f32>,
    pub front: Vector3<f32>,
}

impl BodyBasis {
    /// 未定義を表すゼロ基底
    pub fn undefined() -> Self {
        Self {
            up: Vector3::zeros(),
            left_to_right: Vector3::zeros(),
            front: Vector3::zeros(),
        }
    }

    pub fn from_pose(pose: &CanonicalPose) -> Self {
        let (up, _) = normalize(&(pose.get(JointIndex::Neck) - pose.hip_center()));
        if up.norm() < EPSILON {
            return Self::undefined();
        }

        let (mut left_to_right, _) =
            normalize(&(pose.get(JointIndex::RightShoulder) - pose.get(JointIndex::LeftShoulder)));
        if left_to_right.norm() < EPSILON {
            // 肩が重なって見える場合は腰の左右で代用
            left_to_right =
                normalize(&(pose.get(JointIndex::RightHip) - pose.get(JointIndex::LeftHip))).0;
        }

        let (front, _) = normalize(&up.cross(&left_to_right));
        // 代用ベクトルによるずれを直交化で補正
        let (left_to_right, _) = normalize(&front.cross(&up));

        Self {
            up,
            left_to_right,
            front,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.up.norm() >= EPSILON
    }
}
