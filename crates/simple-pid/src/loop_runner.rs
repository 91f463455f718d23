//! Loop Runner - 控制循环包装器
//!
//! 把控制器接到真实的传感器和执行器上：周期性读取过程变量、
//! 计算控制量、下发给执行器。
//!
//! # 核心功能
//!
//! - **定时**: `std::thread::sleep` 或 `spin_sleep`（低抖动）
//! - **停止条件**: 最大迭代次数、进入容差带、传感器/执行器错误
//! - **错误传播**: 透明传播控制器、传感器、执行器错误
//!
//! 循环不测量实际经过的时间，也不会把调度抖动反馈给控制器；
//! 控制器始终按构造时的 `dt` 计算。
//!
//! # 示例
//!
//! ```rust
//! use simple_pid::PidController;
//! use simple_pid::loop_runner::{Actuator, LoopConfig, ProcessSensor, run_loop};
//! use std::convert::Infallible;
//! use std::time::Duration;
//!
//! struct Thermometer(f64);
//! impl ProcessSensor for Thermometer {
//!     type Error = Infallible;
//!     fn read(&mut self) -> Result<f64, Self::Error> {
//!         Ok(self.0)
//!     }
//! }
//!
//! struct Heater(Vec<f64>);
//! impl Actuator for Heater {
//!     type Error = Infallible;
//!     fn apply(&mut self, output: f64) -> Result<(), Self::Error> {
//!         self.0.push(output);
//!         Ok(())
//!     }
//! }
//!
//! let mut pid = PidController::new(1.0, 0.0, 0.0, 1.0)?;
//! pid.set_target(100.0)?;
//!
//! let config = LoopConfig {
//!     period: Duration::from_millis(1),
//!     max_iterations: Some(3),
//!     ..LoopConfig::default()
//! };
//! let mut heater = Heater(Vec::new());
//! let report = run_loop(&mut pid, &mut Thermometer(20.0), &mut heater, &config)?;
//! assert_eq!(report.iterations, 3);
//! assert_eq!(heater.0, vec![80.0; 3]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::controller::PidController;
use crate::error::LoopError;
use std::fmt::Display;
use std::time::Duration;

/// 过程变量来源（传感器）
pub trait ProcessSensor {
    /// 传感器错误类型
    type Error: Display;

    /// 读取当前过程变量
    fn read(&mut self) -> Result<f64, Self::Error>;
}

/// 控制量去向（执行器）
pub trait Actuator {
    /// 执行器错误类型
    type Error: Display;

    /// 下发控制输出
    fn apply(&mut self, output: f64) -> Result<(), Self::Error>;
}

/// 控制循环配置
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// 循环周期
    ///
    /// 通常等于控制器的 `dt`，见 [`LoopConfig::from_controller`]。
    pub period: Duration,

    /// 最大迭代次数（None 表示无限循环）
    pub max_iterations: Option<usize>,

    /// 读数满足 `|pv - target| <= tolerance` 时停止（None 表示不检查）
    pub tolerance: Option<f64>,

    /// 使用 `spin_sleep` 代替 `std::thread::sleep`
    ///
    /// ⚠️ 会占用更多 CPU，适合对抖动敏感的场景。
    pub use_spin_sleep: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            period: Duration::from_secs(1), // 默认 dt = 1s
            max_iterations: None,
            tolerance: None,
            use_spin_sleep: false,
        }
    }
}

impl LoopConfig {
    /// 以控制器的 `dt`（秒）为周期
    ///
    /// `dt` 非正时回退到默认周期。
    pub fn from_controller(controller: &PidController) -> Self {
        let period = Duration::try_from_secs_f64(controller.dt())
            .ok()
            .filter(|p| !p.is_zero())
            .unwrap_or(LoopConfig::default().period);

        LoopConfig {
            period,
            ..LoopConfig::default()
        }
    }

    fn validate(&self) -> Result<(), LoopError> {
        if self.period.is_zero() {
            return Err(LoopError::Config("period must be > 0".to_string()));
        }
        if let Some(tolerance) = self.tolerance
            && !(tolerance.is_finite() && tolerance >= 0.0)
        {
            return Err(LoopError::Config(format!(
                "tolerance must be a finite number >= 0, got {tolerance}"
            )));
        }
        Ok(())
    }
}

/// 循环结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// 达到 `max_iterations`
    MaxIterations,
    /// 读数进入容差带
    WithinTolerance,
}

/// 循环运行报告
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopReport {
    /// 调用 `update` 的次数
    pub iterations: usize,
    /// 最后一次读数
    pub last_value: Option<f64>,
    /// 最后一次控制输出
    pub last_output: Option<f64>,
    /// 结束原因
    pub reason: StopReason,
}

/// 运行控制循环
///
/// 阻塞直到：
/// - 传感器、控制器或执行器返回错误
/// - 达到 `max_iterations`（如果设置）
/// - 读数进入容差带（如果设置）
///
/// 容差检查发生在读数之后、`update` 之前，已在容差内时不再下发控制量。
pub fn run_loop<S, A>(
    controller: &mut PidController,
    sensor: &mut S,
    actuator: &mut A,
    config: &LoopConfig,
) -> Result<LoopReport, LoopError>
where
    S: ProcessSensor,
    A: Actuator,
{
    config.validate()?;

    let sleeper = spin_sleep::SpinSleeper::default();
    let mut report = LoopReport {
        iterations: 0,
        last_value: None,
        last_output: None,
        reason: StopReason::MaxIterations,
    };

    loop {
        if let Some(max_iter) = config.max_iterations
            && report.iterations >= max_iter
        {
            report.reason = StopReason::MaxIterations;
            break;
        }

        // 1. 读取过程变量
        let value = sensor.read().map_err(|e| LoopError::Sensor(e.to_string()))?;
        report.last_value = Some(value);

        // 2. 容差检查
        if let Some(tolerance) = config.tolerance
            && (value - controller.target()).abs() <= tolerance
        {
            report.reason = StopReason::WithinTolerance;
            break;
        }

        // 3. 计算控制量
        let output = controller.update(value)?;

        // 4. 下发
        actuator.apply(output).map_err(|e| LoopError::Actuator(e.to_string()))?;

        report.iterations += 1;
        report.last_output = Some(output);
        tracing::debug!(
            iteration = report.iterations,
            current_value = value,
            output,
            "Control loop tick"
        );

        // 最后一次迭代之后不再休眠
        if config.max_iterations.is_some_and(|max_iter| report.iterations >= max_iter) {
            report.reason = StopReason::MaxIterations;
            break;
        }

        // 5. 休眠到下一个周期
        if config.use_spin_sleep {
            sleeper.sleep(config.period);
        } else {
            std::thread::sleep(config.period);
        }
    }

    tracing::info!(
        iterations = report.iterations,
        reason = ?report.reason,
        "Control loop stopped"
    );
    Ok(report)
}
