//! # simple-pid CLI
//!
//! 离散 PID 控制器的命令行仿真工具。
//!
//! ## 一次性仿真
//!
//! ```bash
//! # 从 PV = 0 驱动到 SV = 10，每秒一步
//! simple-pid simulate --sv 10 --pv 0
//!
//! # 不等待，并覆盖增益
//! simple-pid simulate --sv 10 --pv 0 --kp 2 --interval-ms 0
//! ```
//!
//! ## Shell 模式
//!
//! ```bash
//! $ simple-pid shell
//! pid> sv 10
//! pid> pv 0
//! {"sv":10.0,"pv":"0.10","p":"12.00","i":"10.00","d":"0.10"}
//! ...
//! pid> exit
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod modes;
mod telemetry;
mod validation;

use commands::config::load_config;
use commands::{ConfigCommand, SimulateCommand, ToleranceCommand};
use modes::repl::run_shell;

/// simple-pid - PID 控制器命令行工具
#[derive(Parser, Debug)]
#[command(name = "simple-pid")]
#[command(about = "Discrete PID controller simulator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 从给定 SV / PV 运行容差仿真
    Simulate {
        #[command(flatten)]
        args: SimulateCommand,
    },

    /// 交互输入 SV / PV 后运行容差仿真
    Tolerance {
        #[command(flatten)]
        args: ToleranceCommand,
    },

    /// 启动交互式 Shell（消息驱动的控制循环）
    Shell {
        /// 配置文件路径
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 日志输出到 stderr，stdout 只输出遥测
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("simple_pid=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config(cmd) => cmd.execute().await,

        Commands::Simulate { args } => args.execute().await,

        Commands::Tolerance { args } => args.execute().await,

        Commands::Shell { config } => {
            let config = load_config(config.as_deref())?;
            run_shell(config).await
        },
    }
}
