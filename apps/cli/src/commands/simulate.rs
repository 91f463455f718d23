//! 仿真命令
//!
//! 从给定的 SV / PV 出发运行容差演示，直到进入容差或达到最大步数。

use anyhow::Result;
use clap::Args;
use simple_pid::AppConfig;
use simple_pid::simulation::{SimulatedProcess, Simulation, SimulationOutcome};
use std::io::Write;

use super::tuning::TuningArgs;
use crate::modes::periodic::run_periodic;
use crate::validation::finite_arg;

/// 仿真命令参数
#[derive(Args, Debug)]
pub struct SimulateCommand {
    /// 设定值（SV）
    #[arg(long, value_parser = finite_arg, allow_negative_numbers = true)]
    pub sv: f64,

    /// 过程变量初始值（PV）
    #[arg(long, value_parser = finite_arg, allow_negative_numbers = true)]
    pub pv: f64,

    #[command(flatten)]
    pub tuning: TuningArgs,
}

impl SimulateCommand {
    pub async fn execute(&self) -> Result<()> {
        let config = self.tuning.resolve()?;
        let mut stdout = std::io::stdout();
        run_simulation(&config, self.sv, self.pv, &mut stdout).await?;
        Ok(())
    }
}

/// 按配置构建仿真并周期运行
pub async fn run_simulation<W: Write>(
    config: &AppConfig,
    sv: f64,
    pv: f64,
    out: &mut W,
) -> Result<SimulationOutcome> {
    let mut controller = config.pid.build()?;
    controller.set_target(sv)?;

    let process = SimulatedProcess::new(pv, config.simulation.max_step)?;
    let mut sim = Simulation::new(controller, process, config.simulation.tolerance);

    tracing::debug!(sv, pv, ?config, "Starting simulation");

    run_periodic(
        &mut sim,
        config.simulation.interval(),
        config.simulation.max_steps,
        out,
    )
    .await
}
