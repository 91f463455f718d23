//! # 配置
//!
//! 控制器整定参数与仿真参数的 TOML 配置。
//!
//! ```toml
//! [pid]
//! k_p = 1.2
//! k_i = 1.0
//! k_d = 0.01
//! dt = 1.0
//! derivative_mode = "target-minus-last-error"
//!
//! [simulation]
//! tolerance = 0.05
//! max_step = 0.1
//! max_steps = 500
//! interval_ms = 1000
//! ```
//!
//! 缺失的段落或字段使用默认值。

use crate::controller::{DerivativeMode, PidController};
use crate::error::{ConfigError, PidError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 控制器参数
    pub pid: PidConfig,

    /// 仿真参数
    pub simulation: SimulationConfig,
}

impl AppConfig {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// 序列化为 TOML 字符串
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 从文件加载配置
    ///
    /// 加载后立即校验，非法取值返回 [`ConfigError::Validation`]。
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 校验全部取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pid.validate()?;
        self.simulation.validate()
    }
}

/// 控制器参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    /// 比例增益
    pub k_p: f64,

    /// 积分增益
    pub k_i: f64,

    /// 微分增益
    pub k_d: f64,

    /// 更新周期（秒）
    pub dt: f64,

    /// 微分项计算方式
    pub derivative_mode: DerivativeMode,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            k_p: 1.2,
            k_i: 1.0,
            k_d: 0.01,
            dt: 1.0,
            derivative_mode: DerivativeMode::default(),
        }
    }
}

impl PidConfig {
    /// 构造控制器
    pub fn build(&self) -> Result<PidController, PidError> {
        Ok(PidController::new(self.k_p, self.k_i, self.k_d, self.dt)?
            .with_derivative_mode(self.derivative_mode))
    }

    /// 校验参数
    ///
    /// 比控制器构造更严格：配置文件里的 `dt = 0` 直接拒绝。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dt == 0.0 {
            return Err(ConfigError::Validation("pid.dt must be non-zero".to_string()));
        }
        self.build()?;
        Ok(())
    }
}

/// 仿真参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 判定收敛的容差 `|pv - sv| <= tolerance`
    pub tolerance: f64,

    /// 每步施加到过程变量上的最大变化量
    pub max_step: f64,

    /// 最大步数
    pub max_steps: usize,

    /// 两步之间的间隔（毫秒），0 表示不等待
    pub interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.05,
            max_step: 0.1,
            max_steps: 500,
            interval_ms: 1000,
        }
    }
}

impl SimulationConfig {
    /// 步间隔
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// 校验参数
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::Validation(format!(
                "simulation.tolerance must be a finite number >= 0, got {}",
                self.tolerance
            )));
        }
        if !self.max_step.is_finite() || self.max_step <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "simulation.max_step must be a finite number > 0, got {}",
                self.max_step
            )));
        }
        if self.max_steps == 0 {
            return Err(ConfigError::Validation(
                "simulation.max_steps must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
