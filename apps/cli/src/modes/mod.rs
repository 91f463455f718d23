//! 运行模式
//!
//! - 周期模式：按固定间隔驱动仿真直到收敛
//! - Shell 模式：消息驱动的交互式控制循环

pub mod periodic;
pub mod repl;
