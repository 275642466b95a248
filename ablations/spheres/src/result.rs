//! 实验结果.

use crate::profile::Profile;
use seg_metrics::prelude::*;
use std::io::{self, Write};

/// 将场景 `name` 的评估结果与耗时写进 `w` 中.
fn describe_into<W: Write>(
    name: &str,
    r: &EvalResult<MetricsResult>,
    p: &Profile,
    w: &mut W,
) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.3}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Scenario `{name}`:")?;
    match r {
        Ok(r) => {
            for line in r.to_string().lines() {
                writeln!(w, "{S4}{line}")?;
            }
        }
        Err(e) => writeln!(w, "{S4}Failed ({:?}): {e}", e.kind())?,
    }
    writeln!(w, "{S4}Timed runs: {}", p.get_runs())?;
    writeln!(w, "{S4}Total time: {} us", p.get_total_us())?;
    writeln!(w, "{S4}Average time: {} us", f64_to_display(p.get_avg_us()))?;
    let fastest = p.get_fastest().map(|d| d.as_micros() as f64);
    let slowest = p.get_slowest().map(|d| d.as_micros() as f64);
    write!(
        w,
        "{S4}Fastest / slowest: {} / {} us",
        f64_to_display(fastest),
        f64_to_display(slowest)
    )?;
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(&'static str, (EvalResult<MetricsResult>, Profile))>,
}

impl AblationResult {
    pub fn from_iter<I>(it: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, (EvalResult<MetricsResult>, Profile))>,
    {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 输出运行结果.
    pub fn analyze(&self) {
        let stdout = io::stdout();
        let mut w = stdout.lock();
        if let Err(e) = self.write_all(&mut w) {
            log::error!("Writing results failed: {e}");
        }
    }

    fn write_all<W: Write>(&self, w: &mut W) -> io::Result<()> {
        utils::sep_to(&mut *w)?;
        for (name, (r, profile)) in self.data.iter() {
            describe_into(name, r, profile, w)?;
            writeln!(w)?;
            utils::sep_to(&mut *w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_failed() {
        let mut buf = Vec::new();
        let r = Err(MetricError::PercentileOutOfRange(120.0));
        describe_into("bad", &r, &Profile::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Scenario `bad`:"));
        assert!(text.contains("Failed (InvalidArgument)"));
        assert!(text.contains("Average time: / us"));
    }

    #[test]
    fn test_describe_empty_prediction() {
        let ball = place_ball((4, 4, 4), (2, 2, 2), 1);
        let empty = BinaryMask::from_bools(ball.mapv(|_| false)).unwrap();
        let truth = BinaryMask::from_bools(ball).unwrap();
        let r = evaluate(&empty, &truth, &Spacing::isotropic(3).unwrap(), &MetricsOptions::default());
        let mut buf = Vec::new();
        describe_into("empty", &r, &Profile::default(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Hausdorff Distance"));
        assert!(text.contains("| undefined"));
        assert!(text.contains("| 0.0000"));
    }
}
