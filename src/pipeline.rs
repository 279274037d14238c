//! 1セッション分のフレーム処理
//!
//! 正準化 → 負傷リスク判定 → シーン検出 → メトリクス集計 → オーバーレイ文字列
//! の順に1フレームずつ処理する。

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::calibration::Extrinsics;
use crate::canonical::canonicalize;
use crate::config::{AnalysisConfig, Config};
use crate::metrics::{round_metrics, Metrics, MetricsAggregator, TrainingType};
use crate::pose::{JointIndex, Keypoint, RawPose2d, RawPose3d};
use crate::risk::{detect_injury_risk, warning_label, RiskFlags};
use crate::scene::{resolve_analyzer_with, summarize_detections, Detection, ScenarioAnalyzer};
use crate::sequence::{PoseSequence, SequenceExport};

/// 警告が一つもないときのオーバーレイ
pub const NO_WARNINGS: &str = "No warnings detected";
const SEPARATOR_WIDTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointRecord {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

/// 両腰から合成するキーポイント名
pub const PELVIS: &str = "pelvis";
/// 首と骨盤から合成するキーポイント名
pub const SPINE: &str = "spine";

impl KeypointRecord {
    /// 座標は小数2桁、信頼度は3桁に丸める
    fn new(name: &str, kp: &Keypoint) -> Self {
        Self {
            name: name.to_string(),
            x: round_to(kp.x, 100.0),
            y: round_to(kp.y, 100.0),
            confidence: round_to(kp.confidence, 1000.0),
        }
    }
}

fn round_to(value: f32, scale: f32) -> f32 {
    (value * scale).round() / scale
}

fn mean_keypoint(a: &Keypoint, b: &Keypoint) -> Keypoint {
    Keypoint::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0, (a.confidence + b.confidence) / 2.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonReport {
    pub person_id: usize,
    pub metrics: Metrics,
    pub keypoints: Vec<KeypointRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame_index: u64,
    /// 秒
    pub timestamp: f64,
    pub people: Vec<PersonReport>,
}

/// 1フレームの処理結果
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    pub report: FrameReport,
    pub risk_flags: Vec<RiskFlags>,
    pub detections: Vec<Detection>,
    pub overlay_lines: Vec<String>,
}

/// リスク行・区切り線・検出サマリーをまとめる
pub fn overlay_lines(risk_flags: &[RiskFlags], detections: &[Detection], max_items: usize) -> Vec<String> {
    let mut lines: Vec<String> = risk_flags
        .iter()
        .enumerate()
        .flat_map(|(person, flags)| {
            flags
                .flagged()
                .filter_map(warning_label)
                .map(move |label| format!("[#{}] Potential strain at {}", person, label))
                .collect::<Vec<_>>()
        })
        .collect();

    let summary = summarize_detections(detections, max_items);
    if !summary.is_empty() {
        if !lines.is_empty() {
            lines.push("-".repeat(SEPARATOR_WIDTH));
        }
        lines.extend(summary);
    }

    if lines.is_empty() {
        lines.push(NO_WARNINGS.to_string());
    }
    lines
}

/// 1セッション（1映像・1シーン）の処理器
///
/// メトリクス履歴を人物スロットごとに持つため、複数スレッドで共有しないこと。
pub struct Pipeline {
    extrinsics: Extrinsics,
    analyzer: Option<Box<dyn ScenarioAnalyzer>>,
    aggregators: Vec<MetricsAggregator>,
    training_type: TrainingType,
    analysis: AnalysisConfig,
    frame_rate: f32,
}

impl Pipeline {
    /// 未知のシーン名ではシーン検出なしで続行する
    pub fn new(extrinsics: Extrinsics, scene: &str, config: &Config) -> Self {
        let analyzer = resolve_analyzer_with(scene, &config.analysis);
        if analyzer.is_none() {
            warn!("No scene analyzer for '{}', continuing with metrics and risk checks only", scene);
        }
        let training_type: TrainingType = config.session.training_type.parse().unwrap_or_default();
        Self {
            extrinsics,
            analyzer,
            aggregators: Vec::new(),
            training_type,
            analysis: config.analysis.clone(),
            frame_rate: config.session.frame_rate,
        }
    }

    pub fn scene(&self) -> Option<&'static str> {
        self.analyzer.as_ref().map(|a| a.name())
    }

    pub fn training_type(&self) -> TrainingType {
        self.training_type
    }

    pub fn set_training_type(&mut self, training_type: TrainingType) {
        self.training_type = training_type;
    }

    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    pub fn set_frame_rate(&mut self, frame_rate: f32) {
        self.frame_rate = frame_rate;
    }

    fn timestamp(&self, frame_index: u64) -> f64 {
        if self.frame_rate > 0.0 {
            frame_index as f64 / self.frame_rate as f64
        } else {
            0.0
        }
    }

    fn keypoint_records(&self, pose_2d: Option<&RawPose2d>) -> Vec<KeypointRecord> {
        let Some(pose_2d) = pose_2d else {
            return Vec::new();
        };
        let threshold = self.analysis.keypoint_confidence_threshold;
        let valid = |joint: JointIndex| Some(pose_2d.keypoint(joint)).filter(|kp| kp.is_valid(threshold));

        let mut records: Vec<KeypointRecord> = pose_2d
            .keypoints()
            .filter(|(_, kp)| kp.is_valid(threshold))
            .map(|(joint, kp)| KeypointRecord::new(joint.name(), &kp))
            .collect();

        // 骨盤は両腰、脊柱は首と骨盤の中点
        let pelvis = match (valid(JointIndex::LeftHip), valid(JointIndex::RightHip)) {
            (Some(l), Some(r)) => Some(mean_keypoint(&l, &r)),
            _ => None,
        };
        if let Some(pelvis) = pelvis {
            records.push(KeypointRecord::new(PELVIS, &pelvis));
            if let Some(neck) = valid(JointIndex::Neck) {
                records.push(KeypointRecord::new(SPINE, &mean_keypoint(&neck, &pelvis)));
            }
        }
        records
    }

    pub fn process_frame(&mut self, frame_index: u64, raw_3d: &[RawPose3d], raw_2d: &[RawPose2d]) -> FrameAnalysis {
        let canonical = canonicalize(raw_3d, &self.extrinsics);
        let risk_flags = detect_injury_risk(&canonical);

        let detections = match &self.analyzer {
            Some(analyzer) if !canonical.is_empty() => analyzer.analyze(&canonical, raw_3d, raw_2d),
            _ => Vec::new(),
        };

        if self.aggregators.len() < canonical.len() {
            self.aggregators.resize_with(canonical.len(), MetricsAggregator::new);
        }

        let mut people = Vec::with_capacity(canonical.len());
        for (person_id, pose) in canonical.iter().enumerate() {
            let metrics = self.aggregators[person_id].calculate_all_metrics(pose);
            let metrics = round_metrics(&self.training_type.filter(&metrics));
            people.push(PersonReport {
                person_id,
                metrics,
                keypoints: self.keypoint_records(raw_2d.get(person_id)),
            });
        }

        let overlay_lines = overlay_lines(&risk_flags, &detections, self.analysis.max_summary_lines);
        debug!(
            "frame {}: {} people, {} detections",
            frame_index,
            people.len(),
            detections.len()
        );

        FrameAnalysis {
            report: FrameReport {
                frame_index,
                timestamp: self.timestamp(frame_index),
                people,
            },
            risk_flags,
            detections,
            overlay_lines,
        }
    }

    /// 入力シーケンス全体を処理する。入力にフレームレートがあればそれを使う
    pub fn run_sequence(&mut self, sequence: &PoseSequence) -> SequenceExport {
        if let Some(rate) = sequence.frame_rate {
            self.frame_rate = rate;
        }

        let mut frames = Vec::with_capacity(sequence.frames.len());
        for (index, frame) in sequence.frames.iter().enumerate() {
            let analysis = self.process_frame(index as u64, &frame.poses_3d, &frame.poses_2d);
            if analysis.overlay_lines.first().map(String::as_str) != Some(NO_WARNINGS) {
                for line in &analysis.overlay_lines {
                    info!("frame {}: {}", index, line);
                }
            }
            frames.push(analysis.report);
        }

        SequenceExport {
            video_source: sequence.video_source.clone(),
            frame_rate: self.frame_rate,
            total_frames: frames.len(),
            frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::raw::{RAW_2D_STRIDE, RAW_3D_STRIDE};
    use crate::sequence::InputFrame;

    /// カメラ座標（y下向き）で立っている人
    fn standing_raw() -> RawPose3d {
        use JointIndex::*;
        let points = [
            (Neck, [0.0, -1.5, 3.0]),
            (Nose, [0.0, -1.65, 3.0]),
            (LeftShoulder, [-0.2, -1.45, 3.0]),
            (RightShoulder, [0.2, -1.45, 3.0]),
            (LeftElbow, [-0.22, -1.15, 3.0]),
            (RightElbow, [0.22, -1.15, 3.0]),
            (LeftWrist, [-0.22, -0.95, 3.0]),
            (RightWrist, [0.22, -0.95, 3.0]),
            (LeftHip, [-0.1, -1.0, 3.0]),
            (RightHip, [0.1, -1.0, 3.0]),
            (LeftKnee, [-0.1, -0.55, 3.0]),
            (RightKnee, [0.1, -0.55, 3.0]),
            (LeftAnkle, [-0.1, -0.1, 3.0]),
            (RightAnkle, [0.1, -0.1, 3.0]),
        ];
        let mut values = vec![0.0; RawPose3d::LEN];
        for (joint, p) in points {
            let base = joint as usize * RAW_3D_STRIDE;
            values[base..base + 3].copy_from_slice(&p);
            values[base + 3] = 0.9;
        }
        RawPose3d::new(values)
    }

    fn raw_2d(confidence: f32) -> RawPose2d {
        let mut values = vec![0.0; RawPose2d::MIN_LEN + 1];
        for joint in JointIndex::ALL {
            let base = joint as usize * RAW_2D_STRIDE;
            values[base] = 100.0 + joint as usize as f32;
            values[base + 1] = 200.0;
            values[base + 2] = confidence;
        }
        // 首だけ欠損、鼻は閾値未満
        values[JointIndex::Neck as usize * RAW_2D_STRIDE + 2] = -1.0;
        values[JointIndex::Nose as usize * RAW_2D_STRIDE + 2] = 0.1;
        values[RawPose2d::MIN_LEN] = 12.5;
        RawPose2d::new(values)
    }

    fn config_with(scene: &str, training_type: &str) -> Config {
        let mut config = Config::default();
        config.session.scene = scene.to_string();
        config.session.training_type = training_type.to_string();
        config
    }

    #[test]
    fn test_unknown_scene_still_reports_metrics_and_risk() {
        let mut pipeline = Pipeline::new(Extrinsics::identity(), "soccer", &config_with("soccer", "all"));
        assert!(pipeline.scene().is_none());

        let analysis = pipeline.process_frame(0, &[standing_raw()], &[raw_2d(0.8)]);
        assert!(analysis.detections.is_empty());
        assert_eq!(analysis.risk_flags.len(), 1);
        assert_eq!(analysis.report.people.len(), 1);
        assert!(analysis.report.people[0].metrics.contains_key("left_knee_angle"));
        assert!(analysis.report.people[0].metrics.contains_key("wrist_height"));
    }

    #[test]
    fn test_empty_frame() {
        let mut pipeline = Pipeline::new(Extrinsics::identity(), "basketball", &Config::default());
        let analysis = pipeline.process_frame(3, &[], &[]);
        assert!(analysis.report.people.is_empty());
        assert!(analysis.risk_flags.is_empty());
        assert_eq!(analysis.overlay_lines, vec![NO_WARNINGS.to_string()]);
        assert!((analysis.report.timestamp - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_keypoints_drop_missing_and_low_confidence() {
        let mut pipeline = Pipeline::new(Extrinsics::identity(), "basketball", &Config::default());
        let analysis = pipeline.process_frame(0, &[standing_raw()], &[raw_2d(0.8)]);
        let keypoints = &analysis.report.people[0].keypoints;
        // 17関節 + 骨盤（首が欠損なので脊柱はなし）
        assert_eq!(keypoints.len(), JointIndex::COUNT - 2 + 1);
        assert!(keypoints.iter().all(|k| k.name != "neck" && k.name != "nose"));
        assert!(keypoints.iter().all(|k| k.name != SPINE));
        assert_eq!(keypoints[0].name, "body_center");
    }

    #[test]
    fn test_derived_pelvis_and_spine() {
        let mut values = vec![0.0; RawPose2d::MIN_LEN];
        let mut put = |joint: JointIndex, x: f32, y: f32, confidence: f32| {
            let base = joint as usize * RAW_2D_STRIDE;
            values[base..base + 3].copy_from_slice(&[x, y, confidence]);
        };
        put(JointIndex::Neck, 100.0, 50.0, 0.9);
        put(JointIndex::LeftHip, 90.123, 150.0, 0.8);
        put(JointIndex::RightHip, 110.0, 160.0, 0.7);
        let pose_2d = RawPose2d::new(values);

        let mut pipeline = Pipeline::new(Extrinsics::identity(), "basketball", &Config::default());
        let analysis = pipeline.process_frame(0, &[standing_raw()], &[pose_2d]);
        let keypoints = &analysis.report.people[0].keypoints;
        assert_eq!(keypoints.len(), 5);

        let left_hip = keypoints.iter().find(|k| k.name == "left_hip").unwrap();
        assert!((left_hip.x - 90.12).abs() < 1e-4, "x = {}", left_hip.x);

        let pelvis = keypoints.iter().find(|k| k.name == PELVIS).unwrap();
        assert!((pelvis.x - 100.06).abs() < 1e-3, "x = {}", pelvis.x);
        assert!((pelvis.y - 155.0).abs() < 1e-4);
        assert!((pelvis.confidence - 0.75).abs() < 1e-6);

        let spine = keypoints.iter().find(|k| k.name == SPINE).unwrap();
        assert!((spine.x - 100.03).abs() < 1e-3, "x = {}", spine.x);
        assert!((spine.y - 102.5).abs() < 1e-4);
        assert!((spine.confidence - 0.825).abs() < 1e-6);
    }

    #[test]
    fn test_derived_points_need_both_hips() {
        let mut values = vec![0.0; RawPose2d::MIN_LEN];
        let neck = JointIndex::Neck as usize * RAW_2D_STRIDE;
        values[neck..neck + 3].copy_from_slice(&[100.0, 50.0, 0.9]);
        let left_hip = JointIndex::LeftHip as usize * RAW_2D_STRIDE;
        values[left_hip..left_hip + 3].copy_from_slice(&[90.0, 150.0, 0.8]);
        let right_hip = JointIndex::RightHip as usize * RAW_2D_STRIDE;
        values[right_hip..right_hip + 3].copy_from_slice(&[110.0, 160.0, 0.1]);

        let mut pipeline = Pipeline::new(Extrinsics::identity(), "basketball", &Config::default());
        let analysis = pipeline.process_frame(0, &[standing_raw()], &[RawPose2d::new(values)]);
        let names: Vec<&str> = analysis.report.people[0].keypoints.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["neck", "left_hip"]);
    }

    #[test]
    fn test_session_settings_can_change_between_frames() {
        let mut pipeline = Pipeline::new(Extrinsics::identity(), "basketball", &Config::default());
        assert_eq!(pipeline.training_type(), TrainingType::All);
        assert!((pipeline.frame_rate() - 30.0).abs() < 1e-6);

        pipeline.set_training_type(TrainingType::Shooting);
        pipeline.set_frame_rate(20.0);
        let analysis = pipeline.process_frame(4, &[standing_raw()], &[]);
        assert_eq!(analysis.report.people[0].metrics.len(), 7);
        assert!(analysis.report.people[0].metrics.contains_key("shooting_elbow_angle"));
        assert!((analysis.report.timestamp - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_training_type_filters_and_rounds() {
        let mut pipeline = Pipeline::new(Extrinsics::identity(), "basketball", &config_with("basketball", "defense"));
        let analysis = pipeline.process_frame(0, &[standing_raw()], &[]);
        let metrics = &analysis.report.people[0].metrics;
        assert_eq!(metrics.len(), 7);
        for value in metrics.values() {
            assert!(((value * 1000.0).round() - value * 1000.0).abs() < 1e-3, "{}", value);
        }
        assert!(analysis.report.people[0].keypoints.is_empty());
    }

    #[test]
    fn test_aggregators_are_per_person() {
        let mut pipeline = Pipeline::new(Extrinsics::identity(), "basketball", &Config::default());
        pipeline.process_frame(0, &[standing_raw()], &[]);
        pipeline.process_frame(1, &[standing_raw(), standing_raw()], &[]);
        assert_eq!(pipeline.aggregators.len(), 2);
        assert_eq!(pipeline.aggregators[0].frame_count(), 2);
        assert_eq!(pipeline.aggregators[1].frame_count(), 1);
    }

    #[test]
    fn test_overlay_lines_layout() {
        let mut flags = RiskFlags::default();
        flags.set(JointIndex::RightKnee);
        flags.set(JointIndex::RightHip); // ラベルなし
        let detections = vec![Detection::new(0, "dribbling posture", 1.0, String::new())];

        let lines = overlay_lines(&[RiskFlags::default(), flags], &detections, 5);
        assert_eq!(
            lines,
            vec![
                "[#1] Potential strain at right knee".to_string(),
                "-".repeat(30),
                "[#0] dribbling posture (1.00)".to_string(),
            ]
        );

        let only_summary = overlay_lines(&[], &detections, 5);
        assert_eq!(only_summary, vec!["[#0] dribbling posture (1.00)".to_string()]);
        assert_eq!(overlay_lines(&[RiskFlags::default()], &[], 5), vec![NO_WARNINGS.to_string()]);
    }

    #[test]
    fn test_run_sequence_uses_input_frame_rate() {
        let sequence = PoseSequence {
            video_source: "clip.mp4".to_string(),
            frame_rate: Some(10.0),
            frames: vec![
                InputFrame {
                    poses_3d: vec![standing_raw()],
                    poses_2d: vec![raw_2d(0.9)],
                },
                InputFrame::default(),
            ],
        };
        let mut pipeline = Pipeline::new(Extrinsics::identity(), "basketball", &Config::default());
        let export = pipeline.run_sequence(&sequence);
        assert_eq!(export.total_frames, 2);
        assert_eq!(export.video_source, "clip.mp4");
        assert!((export.frames[1].timestamp - 0.1).abs() < 1e-6);
        assert!(export.frames[1].people.is_empty());
    }
}
