pub mod basis;
pub mod keypoint;
pub mod raw;
pub mod skeleton;

pub use basis::BodyBasis;
pub use keypoint::{JointIndex, Keypoint, SKELETON_EDGES};
pub use raw::{RawPose2d, RawPose3d};
pub use skeleton::CanonicalPose;
