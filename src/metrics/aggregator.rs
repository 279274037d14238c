use nalgebra::Vector3;

use super::history::{HistoryBuffer, HISTORY_CAPACITY};
use super::scoring::shooting_accuracy;
use super::{put, Metrics};
use crate::geometry::{angle_between, distance, floor_denominator};
use crate::pose::{BodyBasis, CanonicalPose, JointIndex};

/// 平均化フレーム数に達したとみなす履歴長
const DRIBBLE_WINDOW: usize = 5;
const DRIBBLE_AVERAGE_SCALE: f32 = 15.0;
const DRIBBLE_AVERAGE_MAX: f32 = 8.0;
const DRIBBLE_COARSE_SCALE: f32 = 10.0;
const DRIBBLE_COARSE_MAX: f32 = 5.0;

/// 垂直速度の換算に使う想定フレームレート
const ASSUMED_FPS: f32 = 30.0;
/// 肩幅の想定値（cm）。比率を距離に換算する
const SHOULDER_WIDTH_CM: f32 = 40.0;
/// 傾き量をバランス指標 0〜1 に正規化する幅
const TILT_NORMALIZER: f32 = 0.2;

/// 運球頻度の推定
///
/// - 履歴なし: 0
/// - 履歴 5 件以上: 直近 5 遷移の差分平均 × 15（上限 8.0）
/// - それ未満: 最新値との単一差分 × 10（上限 5.0）
pub fn dribble_frequency(history: &HistoryBuffer, current_wrist_height: f32) -> f32 {
    let Some(last) = history.last() else {
        return 0.0;
    };
    if history.len() >= DRIBBLE_WINDOW {
        let avg = history.mean_abs_delta(DRIBBLE_WINDOW).unwrap_or(0.0);
        (avg * DRIBBLE_AVERAGE_SCALE).min(DRIBBLE_AVERAGE_MAX)
    } else {
        ((current_wrist_height - last).abs() * DRIBBLE_COARSE_SCALE).min(DRIBBLE_COARSE_MAX)
    }
}

/// 1被写体ぶんのメトリクス計算器
///
/// 運球頻度・垂直速度のために直近の手首高さと体高を保持する。
/// 履歴はフレーム順序に依存するため、セッション間で共有しないこと。
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    wrist_heights: HistoryBuffer,
    body_heights: HistoryBuffer,
    frame_count: u64,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            wrist_heights: HistoryBuffer::new(capacity),
            body_heights: HistoryBuffer::new(capacity),
            frame_count: 0,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn wrist_heights(&self) -> &HistoryBuffer {
        &self.wrist_heights
    }

    pub fn body_heights(&self) -> &HistoryBuffer {
        &self.body_heights
    }

    /// 全メトリクスを計算し、最後に履歴を一度だけ更新する
    pub fn calculate_all_metrics(&mut self, pose: &CanonicalPose) -> Metrics {
        let mut metrics = Metrics::new();
        let basis = BodyBasis::from_pose(pose);

        joint_angles(pose, &mut metrics);
        if basis.is_defined() {
            self.basketball_metrics(pose, &basis, &mut metrics);
            defense_metrics(pose, &basis, &mut metrics);
            shooting_metrics(pose, &basis, &mut metrics);
        }

        self.update_history(pose, &basis);
        self.frame_count += 1;
        metrics
    }

    fn basketball_metrics(&self, pose: &CanonicalPose, basis: &BodyBasis, metrics: &mut Metrics) {
        use JointIndex::*;

        let hip_center = pose.hip_center();
        let wrist_height = max_wrist_height(pose, basis);
        put(metrics, "wrist_height", wrist_height);
        put(metrics, "dribble_frequency", dribble_frequency(&self.wrist_heights, wrist_height));

        let body_height = (pose.shoulder_center() - hip_center).dot(&basis.up);
        put(metrics, "center_of_mass", body_height);

        let vertical_velocity = self
            .body_heights
            .last()
            .map_or(0.0, |prev| (body_height - prev) * ASSUMED_FPS);
        put(metrics, "vertical_velocity", vertical_velocity);

        let torso_center: Vector3<f32> = (pose.get(LeftShoulder)
            + pose.get(RightShoulder)
            + pose.get(LeftHip)
            + pose.get(RightHip))
            / 4.0;
        put(metrics, "body_lean", (torso_center - hip_center).dot(&basis.front));

        put(metrics, "knee_flexion", average_knee_angle(pose));

        let shoulder_span = floor_denominator(shoulder_span(pose));
        let arm_span = distance(pose.get(LeftWrist), pose.get(RightWrist));
        put(metrics, "arm_extension", arm_span / shoulder_span);

        put(metrics, "shooting_accuracy", shooting_accuracy(pose, basis));
    }

    /// フレームごとに1回だけ呼ぶ。基底が未定義なら何も記録しない
    fn update_history(&mut self, pose: &CanonicalPose, basis: &BodyBasis) {
        if !basis.is_defined() {
            return;
        }
        self.wrist_heights.push(max_wrist_height(pose, basis));
        self.body_heights
            .push(distance(&pose.shoulder_center(), &pose.hip_center()));
    }

    pub fn reset(&mut self) {
        self.wrist_heights.clear();
        self.body_heights.clear();
        self.frame_count = 0;
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn max_wrist_height(pose: &CanonicalPose, basis: &BodyBasis) -> f32 {
    let shoulder_center = pose.shoulder_center();
    let left = (pose.get(JointIndex::LeftWrist) - shoulder_center).dot(&basis.up);
    let right = (pose.get(JointIndex::RightWrist) - shoulder_center).dot(&basis.up);
    left.max(right)
}

fn shoulder_span(pose: &CanonicalPose) -> f32 {
    distance(pose.get(JointIndex::LeftShoulder), pose.get(JointIndex::RightShoulder))
}

fn average_knee_angle(pose: &CanonicalPose) -> f32 {
    use JointIndex::*;
    (pose.angle_at(LeftKnee, LeftHip, LeftAnkle) + pose.angle_at(RightKnee, RightHip, RightAnkle)) / 2.0
}

/// 8つの関節角度（度）
fn joint_angles(pose: &CanonicalPose, metrics: &mut Metrics) {
    use JointIndex::*;

    put(metrics, "left_shoulder_angle", pose.angle_at(LeftShoulder, Neck, LeftElbow));
    put(metrics, "right_shoulder_angle", pose.angle_at(RightShoulder, Neck, RightElbow));
    put(metrics, "left_elbow_angle", pose.angle_at(LeftElbow, LeftShoulder, LeftWrist));
    put(metrics, "right_elbow_angle", pose.angle_at(RightElbow, RightShoulder, RightWrist));
    put(metrics, "left_hip_angle", pose.angle_at(LeftHip, Neck, LeftKnee));
    put(metrics, "right_hip_angle", pose.angle_at(RightHip, Neck, RightKnee));
    put(metrics, "left_knee_angle", pose.angle_at(LeftKnee, LeftHip, LeftAnkle));
    put(metrics, "right_knee_angle", pose.angle_at(RightKnee, RightHip, RightAnkle));
}

/// 守備姿勢の指標
fn defense_metrics(pose: &CanonicalPose, basis: &BodyBasis, metrics: &mut Metrics) {
    use JointIndex::*;

    let body_height = (pose.shoulder_center() - pose.hip_center()).dot(&basis.up);
    put(metrics, "defense_center_fluctuation", body_height);

    let shoulder_span = floor_denominator(shoulder_span(pose));
    let arm_span = distance(pose.get(LeftWrist), pose.get(RightWrist));
    put(metrics, "arm_spread_ratio", arm_span / shoulder_span);
    put(metrics, "arm_spread_distance", arm_span * SHOULDER_WIDTH_CM / shoulder_span);

    let leg_span = distance(pose.get(LeftAnkle), pose.get(RightAnkle));
    put(metrics, "leg_spread_ratio", leg_span / shoulder_span);
    put(metrics, "leg_spread_distance", leg_span * SHOULDER_WIDTH_CM / shoulder_span);

    put(metrics, "defense_knee_angle", average_knee_angle(pose));

    let shoulder_level = (pose.get(RightShoulder) - pose.get(LeftShoulder))
        .dot(&basis.up)
        .abs();
    put(metrics, "body_balance", 1.0 - (shoulder_level / TILT_NORMALIZER).min(1.0));
}

/// シュート動作の指標（右手を主動作手とする）
fn shooting_metrics(pose: &CanonicalPose, basis: &BodyBasis, metrics: &mut Metrics) {
    use JointIndex::*;

    let shoulder_center = pose.shoulder_center();
    let hip_center = pose.hip_center();

    put(metrics, "shooting_elbow_angle", pose.angle_at(RightElbow, RightShoulder, RightWrist));
    put(metrics, "shooting_support_elbow_angle", pose.angle_at(LeftElbow, LeftShoulder, LeftWrist));

    let forearm = pose.get(RightWrist) - pose.get(RightElbow);
    let upper_arm = pose.get(RightElbow) - pose.get(RightShoulder);
    put(metrics, "wrist_extension_angle", angle_between(&upper_arm, &forearm));

    let torso = shoulder_center - hip_center;
    put(metrics, "upper_arm_body_angle", angle_between(&torso, &upper_arm));

    put(
        metrics,
        "shooting_release_height",
        (pose.get(RightWrist) - shoulder_center).dot(&basis.up),
    );

    let body_tilt = torso.dot(&basis.front).abs();
    put(metrics, "shooting_body_alignment", 1.0 - (body_tilt / TILT_NORMALIZER).min(1.0));

    let hand_distance = distance(pose.get(LeftWrist), pose.get(RightWrist));
    put(metrics, "hand_coordination", hand_distance / floor_denominator(shoulder_span(pose)));
}
