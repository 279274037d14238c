use log::warn;

use super::{BasketballAnalyzer, ClassroomAnalyzer, ScenarioAnalyzer};
use crate::config::AnalysisConfig;

type Constructor = fn(&AnalysisConfig) -> Box<dyn ScenarioAnalyzer>;

fn basketball(config: &AnalysisConfig) -> Box<dyn ScenarioAnalyzer> {
    Box::new(BasketballAnalyzer::from_config(config))
}

fn classroom(config: &AnalysisConfig) -> Box<dyn ScenarioAnalyzer> {
    Box::new(ClassroomAnalyzer::from_config(config))
}

const SCENES: [(&str, Constructor); 2] = [("basketball", basketball), ("classroom", classroom)];

/// 登録済みのシーン名
pub fn available_scenes() -> Vec<&'static str> {
    SCENES.iter().map(|(name, _)| *name).collect()
}

/// 既定の閾値でシーン解析器を生成する
pub fn resolve_analyzer(name: &str) -> Option<Box<dyn ScenarioAnalyzer>> {
    resolve_analyzer_with(name, &AnalysisConfig::default())
}

/// 名前は前後の空白を除き小文字化して照合する。空・未知の名前は None
pub fn resolve_analyzer_with(name: &str, config: &AnalysisConfig) -> Option<Box<dyn ScenarioAnalyzer>> {
    let key = name.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }
    match SCENES.iter().find(|(scene, _)| *scene == key) {
        Some((_, construct)) => Some(construct(config)),
        None => {
            warn!("Unknown scene '{}', available: {:?}", key, available_scenes());
            None
        }
    }
}
