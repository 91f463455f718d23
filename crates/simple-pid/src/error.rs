//! 错误类型体系
//!
//! - [`PidError`]：控制器核心唯一的错误类型（非有限数值输入）
//! - [`LoopError`]：控制循环（传感器 / 执行器 / 配置）错误
//! - [`ConfigError`]：配置文件读写与校验错误（需要 `serde` feature）
//!
//! # 示例
//!
//! ```rust
//! use simple_pid::{PidController, PidError};
//!
//! let err = PidController::new(f64::NAN, 0.0, 0.0, 1.0).unwrap_err();
//! assert!(err.is_invalid_argument());
//! assert!(matches!(err, PidError::InvalidArgument { name: "k_p", .. }));
//! ```

use thiserror::Error;

/// 控制器错误
///
/// 所有数值输入（增益、`dt`、目标值、测量值）都必须是有限实数。
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PidError {
    /// 参数不是有限实数（NaN 或 ±∞）
    #[error("invalid argument `{name}`: expected a finite number, got {value}")]
    InvalidArgument {
        /// 参数名
        name: &'static str,
        /// 实际传入的值
        value: f64,
    },
}

impl PidError {
    /// 是否为参数错误
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, PidError::InvalidArgument { .. })
    }
}

/// 校验数值参数为有限实数
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<f64, PidError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PidError::InvalidArgument { name, value })
    }
}

/// 控制循环错误
#[derive(Debug, Error)]
pub enum LoopError {
    /// 控制器拒绝了输入
    #[error("Controller error: {0}")]
    Controller(#[from] PidError),

    /// 读取过程变量失败
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// 下发控制量失败
    #[error("Actuator error: {0}")]
    Actuator(String),

    /// 循环配置无效
    #[error("Invalid loop configuration: {0}")]
    Config(String),
}

/// 配置错误
#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读写配置文件失败
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML 解析失败
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 参数无法构造控制器
    #[error("Invalid controller parameters: {0}")]
    Invalid(#[from] PidError),

    /// 取值超出允许范围
    #[error("Config validation failed: {0}")]
    Validation(String),
}
