//! 命令定义和实现

pub mod config;
pub mod simulate;
pub mod tolerance;
pub mod tuning;

pub use config::ConfigCommand;
pub use simulate::SimulateCommand;
pub use tolerance::ToleranceCommand;
