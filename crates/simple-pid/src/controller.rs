//! PID Controller - 比例-积分-微分控制器
//!
//! 离散时间 PID 控制器：调用方以固定周期 `dt` 传入最新测量值，
//! 控制器返回校正输出。
//!
//! # 算法
//!
//! ```text
//! error      = target - current_value
//! sum_error += error * dt
//! output     = P + I + D
//!
//! P = k_p * (target - current_value)
//! I = k_i * sum_error
//! D = k_d * (target - last_error) / dt
//! ```
//!
//! `D` 使用的是**本次更新之前**的 `last_error`，计算完三项之后才写入本次误差。
//! 这是与既有部署保持一致的行为；教科书形式的微分项 `(error - last_error) / dt`
//! 可以通过 [`DerivativeMode::ErrorRate`] 显式启用。
//!
//! # 特性
//!
//! - **无缓存的派生量**: `p()` / `i()` / `d()` 每次读取都从当前状态计算
//! - **无内部钳位**: 输出饱和、抗积分饱和由调用方负责
//! - **无全局状态**: 每个实例独立，跨线程共享时由调用方加锁
//!
//! # 示例
//!
//! ```rust
//! use simple_pid::PidController;
//!
//! let mut pid = PidController::new(1.2, 1.0, 0.01, 1.0)?;
//! pid.set_target(10.0)?;
//!
//! let output = pid.update(0.0)?;
//! assert_eq!(output, pid.p() + pid.i() + pid.d());
//! # Ok::<(), simple_pid::PidError>(())
//! ```

use crate::error::{PidError, ensure_finite};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 微分项计算方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DerivativeMode {
    /// `k_d * (target - last_error) / dt`
    ///
    /// 默认模式，与既有控制器的输出逐位一致。
    #[default]
    TargetMinusLastError,

    /// `k_d * (error - last_error) / dt`
    ///
    /// 标准的误差变化率形式。
    ErrorRate,
}

/// 单次读取的 P / I / D 分量快照
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PidTerms {
    /// 比例项
    pub p: f64,
    /// 积分项
    pub i: f64,
    /// 微分项
    pub d: f64,
}

impl PidTerms {
    /// 三项之和，即控制输出
    pub fn output(&self) -> f64 {
        self.p + self.i + self.d
    }
}

/// PID 控制器
///
/// 增益和 `dt` 在构造后不可变；重新整定需要构造新实例。
#[derive(Debug, Clone)]
pub struct PidController {
    /// 比例增益 (Kp)
    k_p: f64,

    /// 积分增益 (Ki)
    k_i: f64,

    /// 微分增益 (Kd)
    k_d: f64,

    /// 标称更新周期（秒），控制器不自行测量时间
    dt: f64,

    /// 微分项计算方式
    derivative_mode: DerivativeMode,

    /// 设定值
    target: f64,

    /// 最近一次传入的过程变量
    current_value: f64,

    /// 积分项累积值（error * dt 之和）
    sum_error: f64,

    /// 上一次 `update` 计算出的误差，下一次 `update` 的微分项以它为参考
    last_error: f64,

    /// 最近一次 `update` 的微分项所参考的误差（即那次更新之前的 `last_error`）
    prior_error: f64,
}

impl PidController {
    /// 创建新的 PID 控制器
    ///
    /// # 参数
    ///
    /// - `k_p`: 比例增益
    /// - `k_i`: 积分增益
    /// - `k_d`: 微分增益
    /// - `dt`: 两次 `update` 之间的标称时间间隔
    ///
    /// # 错误
    ///
    /// 任一参数为 NaN 或 ±∞ 时返回 [`PidError::InvalidArgument`]。
    ///
    /// `dt == 0` 不会被拒绝，但之后微分项会除以零并把 `±inf`/`NaN`
    /// 传播到输出和积分累积中。
    pub fn new(k_p: f64, k_i: f64, k_d: f64, dt: f64) -> Result<Self, PidError> {
        let k_p = ensure_finite("k_p", k_p)?;
        let k_i = ensure_finite("k_i", k_i)?;
        let k_d = ensure_finite("k_d", k_d)?;
        let dt = ensure_finite("dt", dt)?;

        if dt == 0.0 {
            tracing::warn!(
                "PID controller constructed with dt = 0; the derivative term will divide by zero"
            );
        }

        Ok(PidController {
            k_p,
            k_i,
            k_d,
            dt,
            derivative_mode: DerivativeMode::default(),
            target: 0.0,
            current_value: 0.0,
            sum_error: 0.0,
            last_error: 0.0,
            prior_error: 0.0,
        })
    }

    /// 仅比例控制：`k_i = 0`, `k_d = 0`, `dt = 1`
    pub fn with_defaults(k_p: f64) -> Result<Self, PidError> {
        Self::new(k_p, 0.0, 0.0, 1.0)
    }

    /// 选择微分项计算方式
    ///
    /// ```rust
    /// use simple_pid::{DerivativeMode, PidController};
    ///
    /// let pid = PidController::new(1.0, 0.0, 0.5, 0.1)?
    ///     .with_derivative_mode(DerivativeMode::ErrorRate);
    /// assert_eq!(pid.derivative_mode(), DerivativeMode::ErrorRate);
    /// # Ok::<(), simple_pid::PidError>(())
    /// ```
    pub fn with_derivative_mode(mut self, mode: DerivativeMode) -> Self {
        self.derivative_mode = mode;
        self
    }

    /// 更新设定值
    ///
    /// 不清除积分累积和上一次误差：设定值阶跃会在下一次 `update`
    /// 中同时体现在 I 项和 D 项上。
    pub fn set_target(&mut self, target: f64) -> Result<(), PidError> {
        self.target = ensure_finite("target", target)?;
        Ok(())
    }

    /// 执行一步控制计算
    ///
    /// # 参数
    ///
    /// - `current_value`: 新观测到的过程变量
    ///
    /// # 返回
    ///
    /// `P + I + D`，不做任何钳位。输入合法但状态病态时（例如 `dt == 0`）
    /// 输出可能为 `±inf` 或 `NaN`。
    ///
    /// # 错误
    ///
    /// `current_value` 非有限时返回 [`PidError::InvalidArgument`]，状态保持不变。
    pub fn update(&mut self, current_value: f64) -> Result<f64, PidError> {
        let current_value = ensure_finite("current_value", current_value)?;

        // 1. 记录测量值并计算误差
        self.current_value = current_value;
        let error = self.target - self.current_value;

        // 2. 积分累积（左矩形近似）
        self.sum_error += error * self.dt;

        // 3. 三项都基于此刻的状态计算：D 仍然看到上一次的误差
        let p = self.p();
        let i = self.i();
        let d = self.derivative(error, self.last_error);

        // 4. 计算完成后才覆盖上一次误差
        self.prior_error = self.last_error;
        self.last_error = error;

        tracing::trace!(current_value, error, p, i, d, "PID update");

        Ok(p + i + d)
    }

    /// 比例项 `k_p * (target - current_value)`
    pub fn p(&self) -> f64 {
        self.k_p * (self.target - self.current_value)
    }

    /// 积分项 `k_i * sum_error`
    pub fn i(&self) -> f64 {
        self.k_i * self.sum_error
    }

    /// 微分项
    ///
    /// 默认模式下为 `k_d * (target - e) / dt`，`e` 是最近一次 `update`
    /// 计算微分项时参考的误差；`ErrorRate` 模式下为最近一次更新的误差变化率乘以 `k_d`。
    /// 因此紧接在 `update` 之后读取，得到的正是那次输出中的 D 分量。
    pub fn d(&self) -> f64 {
        self.derivative(self.last_error, self.prior_error)
    }

    fn derivative(&self, error: f64, reference: f64) -> f64 {
        match self.derivative_mode {
            DerivativeMode::TargetMinusLastError => self.k_d * (self.target - reference) / self.dt,
            DerivativeMode::ErrorRate => self.k_d * (error - reference) / self.dt,
        }
    }

    /// 当前的 P / I / D 分量
    ///
    /// 紧接在 `update` 之后读取时，`terms().output()` 等于 `update` 的返回值。
    pub fn terms(&self) -> PidTerms {
        PidTerms {
            p: self.p(),
            i: self.i(),
            d: self.d(),
        }
    }

    /// 比例增益
    pub fn k_p(&self) -> f64 {
        self.k_p
    }

    /// 积分增益
    pub fn k_i(&self) -> f64 {
        self.k_i
    }

    /// 微分增益
    pub fn k_d(&self) -> f64 {
        self.k_d
    }

    /// 标称更新周期
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// 微分项计算方式
    pub fn derivative_mode(&self) -> DerivativeMode {
        self.derivative_mode
    }

    /// 当前设定值
    pub fn target(&self) -> f64 {
        self.target
    }

    /// 最近一次传入的过程变量
    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    /// 积分累积值
    ///
    /// 用于调试和监控。
    pub fn sum_error(&self) -> f64 {
        self.sum_error
    }

    /// 上一次 `update` 的误差
    pub fn last_error(&self) -> f64 {
        self.last_error
    }
}

impl Default for PidController {
    /// `k_p = 1`, `k_i = 0`, `k_d = 0`, `dt = 1`
    fn default() -> Self {
        PidController {
            k_p: 1.0,
            k_i: 0.0,
            k_d: 0.0,
            dt: 1.0,
            derivative_mode: DerivativeMode::default(),
            target: 0.0,
            current_value: 0.0,
            sum_error: 0.0,
            last_error: 0.0,
            prior_error: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_new() {
        let pid = PidController::new(1.2, 1.0, 0.01, 0.5).unwrap();

        assert_eq!(pid.k_p(), 1.2);
        assert_eq!(pid.k_i(), 1.0);
        assert_eq!(pid.k_d(), 0.01);
        assert_eq!(pid.dt(), 0.5);
        assert_eq!(pid.target(), 0.0);
        assert_eq!(pid.current_value(), 0.0);
        assert_eq!(pid.sum_error(), 0.0);
        assert_eq!(pid.last_error(), 0.0);
        assert_eq!(pid.derivative_mode(), DerivativeMode::TargetMinusLastError);
    }

    #[test]
    fn test_pid_defaults() {
        let pid = PidController::default();
        assert_eq!((pid.k_p(), pid.k_i(), pid.k_d(), pid.dt()), (1.0, 0.0, 0.0, 1.0));

        let pid = PidController::with_defaults(2.5).unwrap();
        assert_eq!((pid.k_p(), pid.k_i(), pid.k_d(), pid.dt()), (2.5, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_pid_new_rejects_non_finite() {
        let cases = [
            (f64::NAN, 0.0, 0.0, 1.0, "k_p"),
            (1.0, f64::INFINITY, 0.0, 1.0, "k_i"),
            (1.0, 0.0, f64::NEG_INFINITY, 1.0, "k_d"),
            (1.0, 0.0, 0.0, f64::NAN, "dt"),
        ];

        for (kp, ki, kd, dt, expected) in cases {
            match PidController::new(kp, ki, kd, dt) {
                Err(PidError::InvalidArgument { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected InvalidArgument for {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_pid_zero_dt_is_accepted() {
        let mut pid = PidController::new(1.0, 1.0, 1.0, 0.0).unwrap();
        pid.set_target(1.0).unwrap();

        // D 项除以零：k_d * (1 - 0) / 0 = +inf
        let output = pid.update(0.0).unwrap();
        assert!(output.is_infinite());
    }

    #[test]
    fn test_pid_proportional_only() {
        let mut pid = PidController::with_defaults(10.0).unwrap();
        pid.set_target(1.0).unwrap();

        // 误差 = 1.0 - 0.5 = 0.5，输出 = 10.0 * 0.5 = 5.0
        let output = pid.update(0.5).unwrap();
        assert!((output - 5.0).abs() < 1e-10);
        assert!((pid.p() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_pid_integral_accumulation() {
        let mut pid = PidController::new(0.0, 1.0, 0.0, 0.1).unwrap();
        pid.set_target(1.0).unwrap();

        // 误差 = 0.5，积分 = 0.5 * 0.1 = 0.05
        let output1 = pid.update(0.5).unwrap();
        assert!((output1 - 0.05).abs() < 1e-10);

        // 积分 = 0.05 + 0.5 * 0.1 = 0.1
        let output2 = pid.update(0.5).unwrap();
        assert!((output2 - 0.1).abs() < 1e-10);
        assert!((pid.sum_error() - 0.1).abs() < 1e-10);
    }

    #[test]
    fn test_pid_derivative_uses_previous_error() {
        let mut pid = PidController::new(0.0, 0.0, 1.0, 1.0).unwrap();
        pid.set_target(5.0).unwrap();

        // 第一次：last_error = 0，D = (5 - 0) / 1 = 5
        assert_eq!(pid.update(0.0).unwrap(), 5.0);
        assert_eq!(pid.last_error(), 5.0);
        assert_eq!(pid.d(), 5.0);

        // 第二次：last_error = 5，D = (5 - 5) / 1 = 0
        assert_eq!(pid.update(0.0).unwrap(), 0.0);
        assert_eq!(pid.d(), 0.0);
    }

    #[test]
    fn test_pid_derivative_error_rate() {
        let mut pid = PidController::new(0.0, 0.0, 1.0, 0.1)
            .unwrap()
            .with_derivative_mode(DerivativeMode::ErrorRate);
        pid.set_target(1.0).unwrap();

        // 误差 = 0.5，上次误差 = 0，变化率 = 0.5 / 0.1 = 5.0
        let output1 = pid.update(0.5).unwrap();
        assert!((output1 - 5.0).abs() < 1e-10);
        assert!((pid.d() - 5.0).abs() < 1e-10);

        // 误差不变，输出 = 0
        let output2 = pid.update(0.5).unwrap();
        assert!(output2.abs() < 1e-10);
        assert!(pid.d().abs() < 1e-10);
    }

    #[test]
    fn test_pid_set_target_keeps_memory() {
        let mut pid = PidController::new(1.0, 1.0, 1.0, 1.0).unwrap();
        pid.set_target(2.0).unwrap();
        pid.update(1.0).unwrap();

        let sum_before = pid.sum_error();
        let last_before = pid.last_error();

        pid.set_target(7.0).unwrap();
        assert_eq!(pid.target(), 7.0);
        assert_eq!(pid.sum_error(), sum_before);
        assert_eq!(pid.last_error(), last_before);
    }

    #[test]
    fn test_pid_rejected_input_does_not_mutate() {
        let mut pid = PidController::new(1.0, 1.0, 1.0, 1.0).unwrap();
        pid.set_target(3.0).unwrap();
        pid.update(1.0).unwrap();
        let before = pid.clone();

        assert!(pid.update(f64::NAN).is_err());
        assert!(pid.update(f64::INFINITY).is_err());
        assert!(pid.set_target(f64::NEG_INFINITY).is_err());

        assert_eq!(pid.target(), before.target());
        assert_eq!(pid.current_value(), before.current_value());
        assert_eq!(pid.sum_error(), before.sum_error());
        assert_eq!(pid.last_error(), before.last_error());
    }

    #[test]
    fn test_pid_terms_match_output() {
        let mut pid = PidController::new(1.2, 1.0, 0.01, 1.0).unwrap();
        pid.set_target(10.0).unwrap();

        for pv in [0.0, 0.1, 0.2, 0.35] {
            let output = pid.update(pv).unwrap();
            assert_eq!(pid.terms().output(), output);
        }
    }

    #[test]
    fn test_pid_no_output_clamping() {
        let mut pid = PidController::with_defaults(100.0).unwrap();
        pid.set_target(100.0).unwrap();

        assert_eq!(pid.update(0.0).unwrap(), 10_000.0);
    }
}
