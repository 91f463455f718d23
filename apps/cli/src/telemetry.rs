//! 遥测输出
//!
//! 每个控制周期输出一行 JSON：`sv` 原样输出，`pv` / `p` / `i` / `d`
//! 保留两位小数（字符串形式，便于下游直接显示）。

use anyhow::Result;
use serde::Serialize;
use simple_pid::simulation::{Sample, SimulationOutcome};

/// 单行遥测
#[derive(Debug, Serialize, PartialEq)]
pub struct TelemetryLine {
    pub sv: f64,
    pub pv: String,
    pub p: String,
    pub i: String,
    pub d: String,
}

impl From<&Sample> for TelemetryLine {
    fn from(sample: &Sample) -> Self {
        Self {
            sv: sample.sv,
            pv: format!("{:.2}", sample.pv),
            p: format!("{:.2}", sample.p),
            i: format!("{:.2}", sample.i),
            d: format!("{:.2}", sample.d),
        }
    }
}

/// 格式化为一行 JSON
pub fn format_sample(sample: &Sample) -> Result<String> {
    Ok(serde_json::to_string(&TelemetryLine::from(sample))?)
}

/// 进入容差时的提示
pub const WITHIN_TOLERANCE_MESSAGE: &str =
    "Process variable is within tolerance of set value. Stopping...";

/// 仿真结束的摘要
pub fn summary(outcome: &SimulationOutcome, max_steps: usize) -> String {
    if outcome.converged {
        WITHIN_TOLERANCE_MESSAGE.to_string()
    } else {
        format!(
            "Stopped after {} of {} steps without reaching tolerance (pv = {:.2})",
            outcome.steps, max_steps, outcome.final_pv
        )
    }
}
