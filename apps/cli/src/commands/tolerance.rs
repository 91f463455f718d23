//! 交互式容差演示
//!
//! 提示输入 SV 和 PV，然后按配置的周期运行仿真。

use anyhow::Result;
use clap::Args;
use rustyline::DefaultEditor;

use super::simulate::run_simulation;
use super::tuning::TuningArgs;
use crate::validation::parse_finite;

const INVALID_INPUT_MESSAGE: &str = "Invalid input. Please enter numbers only.";

/// 容差演示参数
#[derive(Args, Debug)]
pub struct ToleranceCommand {
    #[command(flatten)]
    pub tuning: TuningArgs,
}

impl ToleranceCommand {
    pub async fn execute(&self) -> Result<()> {
        let config = self.tuning.resolve()?;

        // rustyline 是阻塞的，放到阻塞线程池
        let (sv, pv) = tokio::task::spawn_blocking(prompt_values).await??;
        let (sv, pv) = parse_values(&sv, &pv)?;

        let mut stdout = std::io::stdout();
        run_simulation(&config, sv, pv, &mut stdout).await?;
        Ok(())
    }
}

fn prompt_values() -> Result<(String, String)> {
    let mut rl = DefaultEditor::new()?;
    let sv = rl.readline("Enter set value (SV): ")?;
    let pv = rl.readline("Enter process variable (PV): ")?;
    Ok((sv, pv))
}

/// 两个值都必须是有限实数
fn parse_values(sv: &str, pv: &str) -> Result<(f64, f64)> {
    match (parse_finite(sv, "SV"), parse_finite(pv, "PV")) {
        (Ok(sv), Ok(pv)) => Ok((sv, pv)),
        (Err(err), _) | (_, Err(err)) => {
            tracing::debug!("Rejected interactive input: {err}");
            anyhow::bail!(INVALID_INPUT_MESSAGE)
        },
    }
}
