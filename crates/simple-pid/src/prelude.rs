//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use simple_pid::prelude::*;
//! ```

// 控制器
pub use crate::controller::{DerivativeMode, PidController, PidTerms};

// 仿真与控制循环
pub use crate::loop_runner::{Actuator, LoopConfig, LoopReport, ProcessSensor, run_loop};
pub use crate::simulation::{SimulatedProcess, Simulation, SimulationOutcome, StopPolicy};

// 错误类型
pub use crate::error::{LoopError, PidError};
