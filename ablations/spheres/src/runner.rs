//! 程序运行函数.

use crate::profile::Profile;
use crate::result::AblationResult;
use log::info;
use seg_metrics::prelude::*;
use std::thread;
use utils::scenario::{self, Scenario};

/// 每个场景重复评估的次数.
const REPEATS: u32 = 3;

/// 反复评估同一场景, 返回最后一次的结果和耗时统计.
fn profile(s: &Scenario) -> (EvalResult<MetricsResult>, Profile) {
    let mut profile = Profile::default();
    // 预热, 不计时
    let mut last = s.evaluate();
    for _ in 1..REPEATS {
        last = profile.measure(|| s.evaluate());
    }
    (last, profile)
}

/// 实际运行.
pub fn run() -> AblationResult {
    info!("Building phantoms...");
    let scenarios = scenario::catalogue().expect("Building scenarios error");
    let workers = utils::cpus().min(scenarios.len()).max(1);

    info!("Running {} scenarios on {workers} threads...", scenarios.len());
    let mut out = Vec::with_capacity(scenarios.len());
    for batch in scenarios.chunks(workers) {
        thread::scope(|s| {
            let handles: Vec<_> = batch.iter().map(|sc| s.spawn(move || profile(sc))).collect();
            out.extend(
                batch.iter().map(|sc| sc.name).zip(
                    handles
                        .into_iter()
                        .map(|th| th.join().expect("Thread joining error")),
                ),
            );
        });
    }
    AblationResult::from_iter(out)
}
