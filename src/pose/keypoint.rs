/// Panoptic 形式の 19 関節インデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum JointIndex {
    Neck = 0,
    Nose = 1,
    BodyCenter = 2,
    LeftShoulder = 3,
    LeftElbow = 4,
    LeftWrist = 5,
    LeftHip = 6,
    LeftKnee = 7,
    LeftAnkle = 8,
    RightShoulder = 9,
    RightElbow = 10,
    RightWrist = 11,
    RightHip = 12,
    RightKnee = 13,
    RightAnkle = 14,
    LeftEye = 15,
    LeftEar = 16,
    RightEye = 17,
    RightEar = 18,
}

impl JointIndex {
    pub const COUNT: usize = 19;

    pub const ALL: [JointIndex; JointIndex::COUNT] = [
        Self::Neck,
        Self::Nose,
        Self::BodyCenter,
        Self::LeftShoulder,
        Self::LeftElbow,
        Self::LeftWrist,
        Self::LeftHip,
        Self::LeftKnee,
        Self::LeftAnkle,
        Self::RightShoulder,
        Self::RightElbow,
        Self::RightWrist,
        Self::RightHip,
        Self::RightKnee,
        Self::RightAnkle,
        Self::LeftEye,
        Self::LeftEar,
        Self::RightEye,
        Self::RightEar,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// シリアライズ用の関節名
    pub fn name(self) -> &'static str {
        match self {
            Self::Neck => "neck",
            Self::Nose => "nose",
            Self::BodyCenter => "body_center",
            Self::LeftShoulder => "left_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::LeftWrist => "left_wrist",
            Self::LeftHip => "left_hip",
            Self::LeftKnee => "left_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightShoulder => "right_shoulder",
            Self::RightElbow => "right_elbow",
            Self::RightWrist => "right_wrist",
            Self::RightHip => "right_hip",
            Self::RightKnee => "right_knee",
            Self::RightAnkle => "right_ankle",
            Self::LeftEye => "left_eye",
            Self::LeftEar => "left_ear",
            Self::RightEye => "right_eye",
            Self::RightEar => "right_ear",
        }
    }
}

/// 描画用の骨格エッジ
pub const SKELETON_EDGES: [(JointIndex, JointIndex); 17] = {
    use JointIndex::*;
    [
        (RightWrist, RightElbow),
        (RightElbow, RightShoulder),
        (RightShoulder, Neck),
        (Neck, LeftShoulder),
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (Neck, LeftHip),
        (LeftHip, LeftKnee),
        (LeftKnee, LeftAnkle),
        (Neck, RightHip),
        (RightHip, RightKnee),
        (RightKnee, RightAnkle),
        (Neck, Nose),
        (Nose, LeftEye),
        (LeftEye, LeftEar),
        (Nose, RightEye),
        (RightEye, RightEar),
    ]
};

/// 画像空間の 2D キーポイント
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// X座標（ピクセル）
    pub x: f32,
    /// Y座標（ピクセル）
    pub y: f32,
    /// 信頼度スコア。-1 は欠損
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// 欠損マーカー（負の信頼度）か
    pub fn is_missing(&self) -> bool {
        self.confidence < 0.0
    }

    /// 欠損でなく、信頼度が閾値以上か
    pub fn is_valid(&self, threshold: f32) -> bool {
        !self.is_missing() && self.confidence >= threshold
    }
}

impl Default for Keypoint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            confidence: -1.0,
        }
    }
}
