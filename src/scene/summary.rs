use super::Detection;

/// 検出結果を表示用の1行テキストにする。先頭 `max_items` 件のみ
pub fn summarize_detections(detections: &[Detection], max_items: usize) -> Vec<String> {
    detections
        .iter()
        .take(max_items)
        .map(|detection| {
            let prefix = if detection.label.is_empty() {
                format!("[#{}]", detection.person_index)
            } else {
                format!("[#{}] {}", detection.person_index, detection.label)
            };
            let confidence = if detection.confidence >= 0.0 {
                format!("{:.2}", detection.confidence)
            } else {
                "--".to_string()
            };
            if detection.description.is_empty() {
                format!("{} ({})", prefix, confidence)
            } else {
                format!("{} ({}) {}", prefix, confidence, detection.description)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_line() {
        let d = Detection::new(1, "shooting posture", 0.75, "Right hand elevated".into());
        assert_eq!(
            summarize_detections(&[d], 5),
            vec!["[#1] shooting posture (0.75) Right hand elevated".to_string()]
        );
    }

    #[test]
    fn test_empty_label_and_description() {
        let d = Detection::new(0, "", 1.0, String::new());
        assert_eq!(summarize_detections(&[d], 5), vec!["[#0] (1.00)".to_string()]);
    }

    #[test]
    fn test_negative_confidence() {
        let d = Detection::new(2, "leaning on desk", -1.0, String::new());
        assert_eq!(
            summarize_detections(&[d], 5),
            vec!["[#2] leaning on desk (--)".to_string()]
        );
    }

    #[test]
    fn test_truncates_to_max_items() {
        let detections: Vec<_> = (0..8)
            .map(|i| Detection::new(i, "defense posture", 0.7, String::new()))
            .collect();
        let lines = summarize_detections(&detections, 5);
        assert_eq!(lines.len(), 5);
        assert!(lines[4].starts_with("[#4]"));
        assert!(summarize_detections(&detections, 0).is_empty());
    }
}
