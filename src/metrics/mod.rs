//! 正準骨格から算出する運動メトリクス

mod aggregator;
mod history;
mod scoring;
mod suggestions;
mod training;

use std::collections::BTreeMap;

pub use aggregator::{dribble_frequency, MetricsAggregator};
pub use history::{HistoryBuffer, HISTORY_CAPACITY};
pub use scoring::shooting_accuracy;
pub use suggestions::suggestions;
pub use training::TrainingType;

/// メトリクス名 → 値。キー順で安定して出力される
pub type Metrics = BTreeMap<String, f32>;

fn put(metrics: &mut Metrics, key: &str, value: f32) {
    metrics.insert(key.to_string(), value);
}

/// 小数点以下3桁に丸める
pub fn round_metrics(metrics: &Metrics) -> Metrics {
    metrics
        .iter()
        .map(|(k, v)| (k.clone(), (v * 1000.0).round() / 1000.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_metrics() {
        let mut m = Metrics::new();
        put(&mut m, "a", 1.23456);
        put(&mut m, "b", -0.0004);
        let r = round_metrics(&m);
        assert!((r["a"] - 1.235).abs() < 1e-6, "got {}", r["a"]);
        assert!(r["b"].abs() < 1e-6);
    }
}
