//! 推定器が出力する生のポーズ配列

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::keypoint::{JointIndex, Keypoint};

/// 3D 1関節あたりの値数 (x, y, z, visibility)
pub const RAW_3D_STRIDE: usize = 4;
/// 2D 1関節あたりの値数 (x, y, confidence)
pub const RAW_2D_STRIDE: usize = 3;

/// カメラ座標系の 3D ポーズ（19関節 × 4値のフラット配列）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct RawPose3d(Vec<f32>);

impl RawPose3d {
    pub const LEN: usize = JointIndex::COUNT * RAW_3D_STRIDE;

    /// 長さが 19×4 でない配列は上流の契約違反として panic する
    pub fn new(values: Vec<f32>) -> Self {
        assert_eq!(
            values.len(),
            Self::LEN,
            "raw 3D pose must hold {} values, got {}",
            Self::LEN,
            values.len()
        );
        Self(values)
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    /// 関節のカメラ座標
    pub fn position(&self, joint: usize) -> Vector3<f32> {
        let base = joint * RAW_3D_STRIDE;
        Vector3::new(self.0[base], self.0[base + 1], self.0[base + 2])
    }

    /// 関節の可視度 (-1 は欠損)
    pub fn visibility(&self, joint: usize) -> f32 {
        self.0[joint * RAW_3D_STRIDE + 3]
    }
}

/// 画像空間の 2D ポーズ（19関節 × 3値、末尾にポーズスコアが付くことがある）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct RawPose2d(Vec<f32>);

impl RawPose2d {
    pub const MIN_LEN: usize = JointIndex::COUNT * RAW_2D_STRIDE;

    pub fn new(values: Vec<f32>) -> Self {
        assert!(
            values.len() >= Self::MIN_LEN,
            "raw 2D pose must hold at least {} values, got {}",
            Self::MIN_LEN,
            values.len()
        );
        Self(values)
    }

    pub fn keypoint(&self, joint: JointIndex) -> Keypoint {
        let base = joint as usize * RAW_2D_STRIDE;
        Keypoint::new(self.0[base], self.0[base + 1], self.0[base + 2])
    }

    /// 19関節ぶんを超える末尾の値（ポーズ全体のスコア）
    pub fn pose_score(&self) -> Option<f32> {
        self.0.get(Self::MIN_LEN).copied()
    }

    pub fn keypoints(&self) -> impl Iterator<Item = (JointIndex, Keypoint)> + '_ {
        JointIndex::ALL.iter().map(move |&j| (j, self.keypoint(j)))
    }
}

impl TryFrom<Vec<f32>> for RawPose3d {
    type Error = String;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        if values.len() != Self::LEN {
            return Err(format!("raw 3D pose must hold {} values, got {}", Self::LEN, values.len()));
        }
        Ok(Self(values))
    }
}

impl From<RawPose3d> for Vec<f32> {
    fn from(pose: RawPose3d) -> Self {
        pose.0
    }
}

impl TryFrom<Vec<f32>> for RawPose2d {
    type Error = String;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        if values.len() < Self::MIN_LEN {
            return Err(format!(
                "raw 2D pose must hold at least {} values, got {}",
                Self::MIN_LEN,
                values.len()
            ));
        }
        Ok(Self(values))
    }
}

impl From<RawPose2d> for Vec<f32> {
    fn from(pose: RawPose2d) -> Self {
        pose.0
    }
}
