//! 標準出力ロガー
//!
//! 出力形式: `2026-01-01T12:00:00.000 [WARN] src/risk.rs:98 - message`

use log::{LevelFilter, Log, Metadata, Record};
use std::io::Write;
use std::str::FromStr;

pub struct StdoutLogger;

impl Log for StdoutLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        println!(
            "{} [{}] {}:{} - {}",
            format_timestamp(),
            record.level(),
            record.file().unwrap_or("unknown"),
            record.line().unwrap_or(0),
            record.args()
        );
    }

    fn flush(&self) {
        std::io::stdout().flush().ok();
    }
}

/// ログレベル文字列を解釈する。不正な値は Info
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

/// グローバルロガーを設定する。2回目以降の呼び出しはレベルのみ更新
pub fn init(level: &str) {
    static LOGGER: StdoutLogger = StdoutLogger;

    let filter = parse_level(level);
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(filter);
}

/// ローカル時刻 YYYY-MM-DDTHH:MM:SS.mmm
pub fn format_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}
