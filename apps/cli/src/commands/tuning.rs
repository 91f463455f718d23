//! 整定参数覆盖
//!
//! 命令行参数优先于配置文件，配置文件优先于默认值。

use anyhow::Result;
use clap::Args;
use simple_pid::{AppConfig, DerivativeMode};
use std::path::PathBuf;

use super::config::load_config;
use crate::validation::finite_arg;

/// 控制器与仿真参数（覆盖配置文件）
#[derive(Args, Debug, Default, Clone)]
pub struct TuningArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 比例增益
    #[arg(long, value_parser = finite_arg, allow_negative_numbers = true)]
    pub kp: Option<f64>,

    /// 积分增益
    #[arg(long, value_parser = finite_arg, allow_negative_numbers = true)]
    pub ki: Option<f64>,

    /// 微分增益
    #[arg(long, value_parser = finite_arg, allow_negative_numbers = true)]
    pub kd: Option<f64>,

    /// 更新周期（秒）
    #[arg(long, value_parser = finite_arg, allow_negative_numbers = true)]
    pub dt: Option<f64>,

    /// 使用误差变化率计算微分项
    #[arg(long)]
    pub error_rate: bool,

    /// 收敛容差
    #[arg(long, value_parser = finite_arg)]
    pub tolerance: Option<f64>,

    /// 每步对过程变量的最大影响
    #[arg(long, value_parser = finite_arg)]
    pub max_step: Option<f64>,

    /// 最大步数
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// 步间隔（毫秒），0 表示不等待
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

impl TuningArgs {
    /// 合并配置文件与命令行参数，并校验
    pub fn resolve(&self) -> Result<AppConfig> {
        let config = load_config(self.config.as_deref())?;
        self.apply(config)
    }

    fn apply(&self, mut config: AppConfig) -> Result<AppConfig> {
        if let Some(kp) = self.kp {
            config.pid.k_p = kp;
        }
        if let Some(ki) = self.ki {
            config.pid.k_i = ki;
        }
        if let Some(kd) = self.kd {
            config.pid.k_d = kd;
        }
        if let Some(dt) = self.dt {
            config.pid.dt = dt;
        }
        if self.error_rate {
            config.pid.derivative_mode = DerivativeMode::ErrorRate;
        }
        if let Some(tolerance) = self.tolerance {
            config.simulation.tolerance = tolerance;
        }
        if let Some(max_step) = self.max_step {
            config.simulation.max_step = max_step;
        }
        if let Some(max_steps) = self.max_steps {
            config.simulation.max_steps = max_steps;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.simulation.interval_ms = interval_ms;
        }

        config.validate()?;
        Ok(config)
    }
}
