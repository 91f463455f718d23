//! Simple PID - 离散时间 PID 控制器
//!
//! 调用方以固定周期传入最新的过程变量测量值，控制器返回校正输出，
//! 驱动 `设定值 - 过程变量` 的误差趋向零。
//!
//! # 模块结构
//!
//! - **控制器** (`controller`): `PidController` 状态机与单步更新算法（核心）
//! - **错误** (`error`): `PidError` / `LoopError` / `ConfigError`
//! - **配置** (`config`): TOML 配置（需要 `serde` feature，默认启用）
//! - **仿真** (`simulation`): 输出受限的一阶模拟过程，用于演示和测试
//! - **控制循环** (`loop_runner`): 把控制器接到传感器与执行器上的定时循环
//!
//! # 快速开始
//!
//! ```rust
//! use simple_pid::PidController;
//!
//! let mut pid = PidController::new(1.2, 1.0, 0.01, 1.0)?;
//! pid.set_target(10.0)?;
//!
//! let mut pv = 0.0;
//! for _ in 0..500 {
//!     let effort = pid.update(pv)?;
//!     // 外部策略：限制每步对过程的影响
//!     pv += effort.clamp(-0.1, 0.1);
//!     if (pv - 10.0_f64).abs() <= 0.05 {
//!         break;
//!     }
//! }
//! assert!((pv - 10.0_f64).abs() <= 0.05);
//! # Ok::<(), simple_pid::PidError>(())
//! ```
//!
//! # 线程安全
//!
//! `PidController` 不带任何内部同步。多个线程共享同一实例时，
//! 请用 `Mutex` 包装或把实例限定在单个线程内。

pub mod controller;
pub mod error;
pub mod loop_runner;
pub mod simulation;

#[cfg(feature = "serde")]
pub mod config;

// Prelude 模块
pub mod prelude;

// 重新导出常用类型
pub use controller::{DerivativeMode, PidController, PidTerms};
pub use error::{LoopError, PidError};

#[cfg(feature = "serde")]
pub use config::{AppConfig, PidConfig, SimulationConfig};
#[cfg(feature = "serde")]
pub use error::ConfigError;
