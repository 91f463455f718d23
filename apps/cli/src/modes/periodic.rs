//! 周期执行
//!
//! 以固定间隔驱动仿真，每步输出一行遥测。

use anyhow::Result;
use simple_pid::simulation::{Simulation, SimulationOutcome};
use std::io::Write;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::telemetry;

/// 周期定时器
///
/// 第一次 tick 在一个完整周期之后；间隔为 0 时不等待，只让出执行权。
pub struct Pacer {
    interval: Option<Interval>,
}

impl Pacer {
    pub fn new(period: Duration) -> Self {
        let interval = (!period.is_zero()).then(|| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        Self { interval }
    }

    /// 等待下一个周期
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            },
            None => tokio::task::yield_now().await,
        }
    }

    /// 重新开始计时（下一次 tick 在一个完整周期之后）
    pub fn restart(&mut self) {
        if let Some(interval) = self.interval.as_mut() {
            interval.reset();
        }
    }
}

/// 运行仿真直到进入容差或达到 `max_steps`
pub async fn run_periodic<W: Write>(
    sim: &mut Simulation,
    period: Duration,
    max_steps: usize,
    out: &mut W,
) -> Result<SimulationOutcome> {
    let mut pacer = Pacer::new(period);
    let mut executed = 0;

    while executed < max_steps {
        pacer.tick().await;

        let Some(sample) = sim.tick()? else {
            break;
        };
        executed += 1;
        writeln!(out, "{}", telemetry::format_sample(&sample)?)?;

        if sim.finished_after_step() {
            break;
        }
    }

    let outcome = sim.outcome(executed);
    writeln!(out, "{}", telemetry::summary(&outcome, max_steps))?;
    out.flush()?;

    tracing::info!(
        steps = outcome.steps,
        converged = outcome.converged,
        final_pv = outcome.final_pv,
        "Simulation stopped"
    );
    Ok(outcome)
}
