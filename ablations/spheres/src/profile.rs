//! 评估运行统计.

use std::time::{Duration, Instant};

/// 单个场景反复评估的耗时统计.
#[derive(Clone, Debug, Default)]
pub struct Profile {
    runs: u32,
    total: Duration,
    fastest: Option<Duration>,
    slowest: Option<Duration>,
}

impl Profile {
    /// 计时执行一次 `op`, 并返回其结果.
    pub fn measure<T, F: FnOnce() -> T>(&mut self, op: F) -> T {
        let since = Instant::now();
        let out = op();
        self.record(since.elapsed());
        out
    }

    fn record(&mut self, d: Duration) {
        self.runs += 1;
        self.total += d;
        self.fastest = Some(self.fastest.map_or(d, |f| f.min(d)));
        self.slowest = Some(self.slowest.map_or(d, |s| s.max(d)));
    }

    /// 运行次数.
    #[inline]
    pub fn get_runs(&self) -> u32 {
        self.runs
    }

    /// 总耗时 (以微秒为单位).
    #[inline]
    pub fn get_total_us(&self) -> u64 {
        self.total.as_micros() as u64
    }

    /// 平均耗时 (以微秒为单位). 没有运行记录时返回 `None`.
    pub fn get_avg_us(&self) -> Option<f64> {
        (self.runs > 0).then(|| self.total.as_micros() as f64 / self.runs as f64)
    }

    /// 最快一次耗时.
    #[inline]
    pub fn get_fastest(&self) -> Option<Duration> {
        self.fastest
    }

    /// 最慢一次耗时.
    #[inline]
    pub fn get_slowest(&self) -> Option<Duration> {
        self.slowest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record() {
        let mut p = Profile::default();
        assert_eq!(p.get_avg_us(), None);
        p.record(Duration::from_micros(30));
        p.record(Duration::from_micros(10));
        assert_eq!(p.measure(|| 7), 7);
        assert_eq!(p.get_runs(), 3);
        assert!(p.get_total_us() >= 40);
        assert!(p.get_fastest().unwrap() <= Duration::from_micros(10));
        assert!(p.get_slowest().unwrap() >= Duration::from_micros(30));
    }
}
