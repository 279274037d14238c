use std::collections::VecDeque;

/// 履歴バッファの既定容量
pub const HISTORY_CAPACITY: usize = 10;

/// 直近のスカラー観測値を保持する固定長 FIFO
///
/// 容量を超えると最古の値から捨てる。1セッション（1被写体）専用。
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    values: VecDeque<f32>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: f32) {
        if self.capacity == 0 {
            return;
        }
        while self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 最新の値
    pub fn last(&self) -> Option<f32> {
        self.values.back().copied()
    }

    /// 古い順
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    /// 直近 `transitions` 回の隣接差分の絶対値の平均
    ///
    /// 値が2つ未満なら None。
    pub fn mean_abs_delta(&self, transitions: usize) -> Option<f32> {
        let len = self.values.len();
        if len < 2 || transitions == 0 {
            return None;
        }
        let window = (transitions + 1).min(len);
        let start = len - window;
        let sum: f32 = (start + 1..len)
            .map(|i| (self.values[i] - self.values[i - 1]).abs())
            .sum();
        Some(sum / (window - 1) as f32)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
