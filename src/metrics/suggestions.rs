use super::Metrics;

const MIN_WRIST_HEIGHT: f32 = 0.2;
const ELBOW_RANGE: (f32, f32) = (60.0, 140.0);
const DRIBBLE_RANGE: (f32, f32) = (1.0, 4.0);
const LEAN_RANGE: (f32, f32) = (0.05, 0.2);
const KNEE_RANGE: (f32, f32) = (90.0, 150.0);
const MIN_ARM_EXTENSION: f32 = 0.8;
const MAX_CENTER_OF_MASS: f32 = 0.5;
const MIN_VERTICAL_VELOCITY: f32 = 0.1;

fn get(metrics: &Metrics, key: &str, default: f32) -> f32 {
    metrics.get(key).copied().unwrap_or(default)
}

/// メトリクスから練習のヒントを返す
pub fn suggestions(metrics: &Metrics) -> Vec<&'static str> {
    let mut out = Vec::new();

    if get(metrics, "wrist_height", 0.0) < MIN_WRIST_HEIGHT {
        out.push("Raise the wrist higher for a higher release point");
    }

    let elbow = get(metrics, "right_elbow_angle", 90.0);
    if elbow < ELBOW_RANGE.0 || elbow > ELBOW_RANGE.1 {
        out.push("Adjust the elbow angle to stay within 80-120 degrees");
    }

    let dribble = get(metrics, "dribble_frequency", 0.0);
    if dribble < DRIBBLE_RANGE.0 {
        out.push("Increase dribble frequency for steadier ball control");
    } else if dribble > DRIBBLE_RANGE.1 {
        out.push("Dribble frequency is too high, control the rhythm");
    }

    let lean = get(metrics, "body_lean", 0.0);
    if lean < LEAN_RANGE.0 {
        out.push("Lean forward slightly while dribbling to keep balance");
    } else if lean > LEAN_RANGE.1 {
        out.push("Leaning too far forward, stay more upright");
    }

    let knee = get(metrics, "knee_flexion", 120.0);
    if knee > KNEE_RANGE.1 {
        out.push("Knees are too straight, bend them for stability");
    } else if knee < KNEE_RANGE.0 {
        out.push("Knees are bent too deep, straighten slightly");
    }

    if get(metrics, "arm_extension", 1.0) < MIN_ARM_EXTENSION {
        out.push("Extend the arms more to protect the ball");
    }

    if get(metrics, "center_of_mass", 0.0) > MAX_CENTER_OF_MASS {
        out.push("Lower the center of mass for better stability");
    }

    if get(metrics, "vertical_velocity", 0.0) < MIN_VERTICAL_VELOCITY {
        out.push("Work on leg strength to improve jump height");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics_use_defaults() {
        // 既定値: 手首0, 肘90, 運球0, 前傾0, 膝120, 腕1.0, 重心0, 速度0
        let hints = suggestions(&Metrics::new());
        assert_eq!(hints.len(), 4, "{:?}", hints);
        assert!(hints.iter().any(|h| h.contains("wrist")));
        assert!(hints.iter().any(|h| h.contains("jump")));
    }

    #[test]
    fn test_good_form_has_no_hints() {
        let mut m = Metrics::new();
        for (k, v) in [
            ("wrist_height", 0.3),
            ("right_elbow_angle", 100.0),
            ("dribble_frequency", 2.0),
            ("body_lean", 0.1),
            ("knee_flexion", 120.0),
            ("arm_extension", 1.2),
            ("center_of_mass", 0.4),
            ("vertical_velocity", 0.5),
        ] {
            m.insert(k.to_string(), v);
        }
        assert!(suggestions(&m).is_empty());
    }

    #[test]
    fn test_out_of_range_values() {
        let mut m = Metrics::new();
        m.insert("dribble_frequency".into(), 5.0);
        m.insert("knee_flexion".into(), 170.0);
        m.insert("right_elbow_angle".into(), 30.0);
        let hints = suggestions(&m);
        assert!(hints.contains(&"Dribble frequency is too high, control the rhythm"));
        assert!(hints.contains(&"Knees are too straight, bend them for stability"));
        assert!(hints.contains(&"Adjust the elbow angle to stay within 80-120 degrees"));
    }
}
