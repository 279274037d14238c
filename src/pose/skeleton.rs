use nalgebra::Vector3;

use super::keypoint::JointIndex;
use crate::geometry::{angle_between, midpoint};

/// ワールド座標系の 19 関節骨格（x=前方, y=横, z=上）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalPose {
    pub joints: [Vector3<f32>; JointIndex::COUNT],
}

impl CanonicalPose {
    pub fn new(joints: [Vector3<f32>; JointIndex::COUNT]) -> Self {
        Self { joints }
    }

    /// インデックスで関節を取得
    pub fn get(&self, joint: JointIndex) -> &Vector3<f32> {
        &self.joints[joint as usize]
    }

    pub fn set(&mut self, joint: JointIndex, position: Vector3<f32>) {
        self.joints[joint as usize] = position;
    }

    /// `vertex` を頂点とする角度（度）: ∠(a − vertex, b − vertex)
    pub fn angle_at(&self, vertex: JointIndex, a: JointIndex, b: JointIndex) -> f32 {
        let v = self.get(vertex);
        angle_between(&(self.get(a) - v), &(self.get(b) - v))
    }

    /// 左右の腰の中点
    pub fn hip_center(&self) -> Vector3<f32> {
        midpoint(self.get(JointIndex::LeftHip), self.get(JointIndex::RightHip))
    }

    /// 左右の肩の中点
    pub fn shoulder_center(&self) -> Vector3<f32> {
        midpoint(self.get(JointIndex::LeftShoulder), self.get(JointIndex::RightShoulder))
    }
}

impl Default for CanonicalPose {
    fn default() -> Self {
        Self {
            joints: [Vector3::zeros(); JointIndex::COUNT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centers() {
        let mut pose = CanonicalPose::default();
        pose.set(JointIndex::LeftHip, Vector3::new(0.0, -0.1, 1.0));
        pose.set(JointIndex::RightHip, Vector3::new(0.0, 0.1, 1.0));
        pose.set(JointIndex::LeftShoulder, Vector3::new(0.0, -0.2, 1.5));
        pose.set(JointIndex::RightShoulder, Vector3::new(0.0, 0.2, 1.5));

        assert_eq!(pose.hip_center(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(pose.shoulder_center(), Vector3::new(0.0, 0.0, 1.5));
    }

    #[test]
    fn test_angle_at_right_angle() {
        let mut pose = CanonicalPose::default();
        pose.set(JointIndex::LeftShoulder, Vector3::new(0.0, 0.0, 1.0));
        pose.set(JointIndex::LeftElbow, Vector3::new(0.0, 0.0, 0.7));
        pose.set(JointIndex::LeftWrist, Vector3::new(0.3, 0.0, 0.7));
        let angle = pose.angle_at(JointIndex::LeftElbow, JointIndex::LeftShoulder, JointIndex::LeftWrist);
        assert!((angle - 90.0).abs() < 1e-3, "got {}", angle);
    }
}
