//! 生の 3D ポーズを外部パラメータで基準座標系へ変換し、正準骨格を作る

use nalgebra::Vector3;

use crate::calibration::Extrinsics;
use crate::pose::{CanonicalPose, JointIndex, RawPose3d};

/// 基準座標系 → 正準座標系の軸入れ替え
///
/// new_x = -old_z, new_y = old_x, new_z = -old_y
fn remap_axes(p: &Vector3<f32>) -> Vector3<f32> {
    Vector3::new(-p.z, p.x, -p.y)
}

/// 単一ポーズの正準化
pub fn canonicalize_pose(raw: &RawPose3d, extrinsics: &Extrinsics) -> CanonicalPose {
    let mut pose = CanonicalPose::default();
    for joint in 0..JointIndex::COUNT {
        let reference = extrinsics.to_reference(&raw.position(joint));
        pose.joints[joint] = remap_axes(&reference);
    }
    pose
}

/// 1フレーム分のポーズ列を正準化する。可視度チャンネルは捨てる
pub fn canonicalize(raw_poses: &[RawPose3d], extrinsics: &Extrinsics) -> Vec<CanonicalPose> {
    raw_poses
        .iter()
        .map(|raw| canonicalize_pose(raw, extrinsics))
        .collect()
}
