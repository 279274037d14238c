use std::str::FromStr;

use super::Metrics;

/// 出力するメトリクスを絞り込む練習種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrainingType {
    Dribbling,
    Defense,
    Shooting,
    #[default]
    All,
}

/// (出力キー, 参照元キー)
const DRIBBLING_KEYS: [(&str, &str); 10] = [
    ("dribble_frequency", "dribble_frequency"),
    ("center_of_mass", "center_of_mass"),
    ("left_wrist_angle", "left_elbow_angle"),
    ("right_wrist_angle", "right_elbow_angle"),
    ("left_elbow_angle", "left_elbow_angle"),
    ("right_elbow_angle", "right_elbow_angle"),
    ("left_shoulder_angle", "left_shoulder_angle"),
    ("right_shoulder_angle", "right_shoulder_angle"),
    ("left_knee_angle", "left_knee_angle"),
    ("right_knee_angle", "right_knee_angle"),
];

const DEFENSE_KEYS: [(&str, &str); 7] = [
    ("defense_center_fluctuation", "defense_center_fluctuation"),
    ("arm_spread_ratio", "arm_spread_ratio"),
    ("arm_spread_distance", "arm_spread_distance"),
    ("leg_spread_ratio", "leg_spread_ratio"),
    ("leg_spread_distance", "leg_spread_distance"),
    ("defense_knee_angle", "defense_knee_angle"),
    ("body_balance", "body_balance"),
];

const SHOOTING_KEYS: [(&str, &str); 7] = [
    ("shooting_elbow_angle", "shooting_elbow_angle"),
    ("shooting_support_elbow_angle", "shooting_support_elbow_angle"),
    ("wrist_extension_angle", "wrist_extension_angle"),
    ("upper_arm_body_angle", "upper_arm_body_angle"),
    ("shooting_release_height", "shooting_release_height"),
    ("shooting_body_alignment", "shooting_body_alignment"),
    ("hand_coordination", "hand_coordination"),
];

impl TrainingType {
    pub fn as_str(self) -> &'static str {
        match self {
            TrainingType::Dribbling => "dribbling",
            TrainingType::Defense => "defense",
            TrainingType::Shooting => "shooting",
            TrainingType::All => "all",
        }
    }

    /// 種別ごとのキーに射影する。欠けているキーは 0
    pub fn filter(self, metrics: &Metrics) -> Metrics {
        let keys: &[(&str, &str)] = match self {
            TrainingType::Dribbling => &DRIBBLING_KEYS,
            TrainingType::Defense => &DEFENSE_KEYS,
            TrainingType::Shooting => &SHOOTING_KEYS,
            TrainingType::All => return metrics.clone(),
        };
        keys.iter()
            .map(|(out, src)| (out.to_string(), metrics.get(*src).copied().unwrap_or(0.0)))
            .collect()
    }
}

impl FromStr for TrainingType {
    type Err = std::convert::Infallible;

    /// 未知の文字列は All として扱う
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "dribbling" => TrainingType::Dribbling,
            "defense" => TrainingType::Defense,
            "shooting" => TrainingType::Shooting,
            _ => TrainingType::All,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Metrics {
        let mut m = Metrics::new();
        m.insert("left_elbow_angle".into(), 95.0);
        m.insert("right_elbow_angle".into(), 100.0);
        m.insert("body_balance".into(), 0.8);
        m.insert("wrist_height".into(), 0.1);
        m
    }

    #[test]
    fn test_dribbling_aliases_wrist_angles() {
        let filtered = TrainingType::Dribbling.filter(&sample());
        assert_eq!(filtered.len(), 10);
        assert_eq!(filtered["left_wrist_angle"], 95.0);
        assert_eq!(filtered["right_wrist_angle"], 100.0);
        assert_eq!(filtered["dribble_frequency"], 0.0);
        assert!(!filtered.contains_key("wrist_height"));
    }

    #[test]
    fn test_defense_and_shooting_keys() {
        let defense = TrainingType::Defense.filter(&sample());
        assert_eq!(defense.len(), 7);
        assert_eq!(defense["body_balance"], 0.8);

        let shooting = TrainingType::Shooting.filter(&sample());
        assert_eq!(shooting.len(), 7);
        assert!(shooting.values().all(|v| *v == 0.0));
    }

    #[test]
    fn test_all_passes_everything_through() {
        assert_eq!(TrainingType::All.filter(&sample()), sample());
    }

    #[test]
    fn test_parse() {
        assert_eq!(" Defense ".parse::<TrainingType>().unwrap(), TrainingType::Defense);
        assert_eq!("shooting".parse::<TrainingType>().unwrap(), TrainingType::Shooting);
        assert_eq!("juggling".parse::<TrainingType>().unwrap(), TrainingType::All);
        assert_eq!("".parse::<TrainingType>().unwrap(), TrainingType::All);
    }
}
