//! Shell 模式（消息驱动的控制循环）
//!
//! 设定值和过程变量以文本消息的形式到达（`sv <value>` / `pv <value>`）。
//! 两者都已知后启动周期控制循环；每条新消息都会重启计时，
//! 过程变量进入容差带后循环自行停止。
//!
//! 使用专用输入线程 + 通道：保留历史记录，不阻塞 tokio。

use anyhow::Result;
use rustyline::Editor;
use simple_pid::AppConfig;
use simple_pid::simulation::{Sample, SimulatedProcess, Simulation, StopPolicy};
use std::thread;
use tokio::sync::mpsc;

use super::periodic::Pacer;
use crate::telemetry;
use crate::validation::parse_finite;

/// 处理一行输入后的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellAction {
    /// 无需调整循环
    Continue,
    /// （重新）启动控制循环
    StartLoop,
    /// 停止控制循环
    StopLoop,
    /// 退出 Shell
    Exit,
}

/// Shell 会话状态
pub struct ShellSession {
    sim: Simulation,
    sv: Option<f64>,
    pv: Option<f64>,
    running: bool,
}

impl ShellSession {
    /// 按配置创建会话（整个会话共用一个控制器）
    pub fn new(config: &AppConfig) -> Result<Self> {
        let controller = config.pid.build()?;
        let process = SimulatedProcess::new(0.0, config.simulation.max_step)?;
        let sim = Simulation::new(controller, process, config.simulation.tolerance)
            .with_stop_policy(StopPolicy::BeforeStep);

        Ok(Self {
            sim,
            sv: None,
            pv: None,
            running: false,
        })
    }

    /// 控制循环是否在运行
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// 停止控制循环
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// 处理一行输入
    pub fn handle_line(&mut self, line: &str) -> Result<ShellAction> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        let Some(&command) = parts.first() else {
            return Ok(ShellAction::Continue);
        };

        match command {
            "sv" => {
                let value = parse_finite(argument(&parts)?, "SV")?;
                self.sim.set_setpoint(value)?;
                self.sv = Some(value);
                println!("🎯 SV = {value}");
                Ok(self.try_start())
            },

            "pv" => {
                let value = parse_finite(argument(&parts)?, "PV")?;
                self.sim.set_process_value(value)?;
                self.pv = Some(value);
                println!("📍 PV = {value}");
                Ok(self.try_start())
            },

            "stop" => {
                if self.running {
                    self.running = false;
                    println!("⏹️  控制循环已停止");
                } else {
                    println!("⚠️  控制循环未运行");
                }
                Ok(ShellAction::StopLoop)
            },

            "status" => {
                println!("📊 {}", self.status());
                Ok(ShellAction::Continue)
            },

            "help" => {
                print_help();
                Ok(ShellAction::Continue)
            },

            "exit" | "quit" => Ok(ShellAction::Exit),

            _ => anyhow::bail!("未知命令: {}", command),
        }
    }

    /// Ctrl+C：停止运行中的循环；循环空闲时退出 Shell
    pub fn on_interrupt(&mut self) -> ShellAction {
        if self.running {
            self.running = false;
            ShellAction::StopLoop
        } else {
            ShellAction::Exit
        }
    }

    fn try_start(&mut self) -> ShellAction {
        if self.sv.is_none() || self.pv.is_none() {
            tracing::debug!("Waiting for both SV and PV before starting the loop");
            return ShellAction::Continue;
        }
        self.running = true;
        ShellAction::StartLoop
    }

    /// 执行一个控制周期
    ///
    /// 返回 `None` 表示已进入容差、循环停止。
    pub fn on_tick(&mut self) -> Result<Option<Sample>> {
        let sample = self.sim.tick()?;
        if sample.is_none() {
            self.running = false;
        }
        Ok(sample)
    }

    /// 状态描述
    pub fn status(&self) -> String {
        let terms = self.sim.controller().terms();
        format!(
            "sv: {}, pv: {:.2}, loop: {}, steps: {}, p: {:.2}, i: {:.2}, d: {:.2}",
            self.sv.map_or_else(|| "-".to_string(), |sv| sv.to_string()),
            self.sim.process().value(),
            if self.running { "running" } else { "stopped" },
            self.sim.steps(),
            terms.p,
            terms.i,
            terms.d
        )
    }
}

fn argument<'a>(parts: &[&'a str]) -> Result<&'a str> {
    parts
        .get(1)
        .copied()
        .ok_or_else(|| anyhow::anyhow!("缺少数值参数，例如 '{} 10'", parts[0]))
}

/// Ctrl+C 在输入线程中被捕获后转发的标记
const INTERRUPT: &str = "SIGINT";

/// Shell 输入（专用输入线程）
pub struct ReplInput {
    command_rx: mpsc::Receiver<String>,
    _input_thread: thread::JoinHandle<Result<()>>,
}

impl ReplInput {
    /// 创建专用输入线程（保留历史记录）
    pub fn new() -> Self {
        let (command_tx, command_rx) = mpsc::channel::<String>(10);

        // 在专用线程内创建 Editor（生命周期 = Shell 会话）
        let input_thread = thread::spawn(move || {
            use rustyline::history::DefaultHistory;

            let mut rl = Editor::<(), DefaultHistory>::new()
                .map_err(|e| anyhow::anyhow!("Failed to initialize readline: {}", e))?;

            let history_path = ".simple_pid_history";
            rl.load_history(history_path).ok(); // 首次运行没有历史文件

            println!("simple-pid v{} - 交互式 Shell", env!("CARGO_PKG_VERSION"));
            println!("输入 'help' 查看帮助，'exit' 退出");
            println!();

            loop {
                match rl.readline("pid> ") {
                    Ok(line) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }

                        let _ = rl.add_history_entry(line.clone());
                        let exiting = line == "exit" || line == "quit";

                        if command_tx.blocking_send(line).is_err() || exiting {
                            break;
                        }
                    },

                    Err(rustyline::error::ReadlineError::Interrupted) => {
                        println!("^C");
                        if command_tx.blocking_send(INTERRUPT.to_string()).is_err() {
                            break;
                        }
                    },

                    Err(rustyline::error::ReadlineError::Eof) => break,

                    Err(err) => {
                        eprintln!("Error: {:?}", err);
                        break;
                    },
                }
            }

            rl.save_history(history_path).ok();
            Ok(())
        });

        Self {
            command_rx,
            _input_thread: input_thread,
        }
    }

    /// 等待用户输入；输入线程结束后返回 `None`
    pub async fn recv_command(&mut self) -> Option<String> {
        self.command_rx.recv().await
    }
}

/// 运行 Shell 模式
pub async fn run_shell(config: AppConfig) -> Result<()> {
    let mut session = ShellSession::new(&config)?;
    let mut input = ReplInput::new();
    let mut pacer = Pacer::new(config.simulation.interval());

    println!("💡 提示: 输入 'sv 10' 和 'pv 0' 启动控制循环");
    println!();

    loop {
        tokio::select! {
            // 优先级1：用户输入
            line = input.recv_command() => {
                let Some(line) = line else {
                    break;
                };

                if line == INTERRUPT {
                    match session.on_interrupt() {
                        ShellAction::Exit => break,
                        _ => {
                            eprintln!("⏹️  控制循环已停止");
                            continue;
                        },
                    }
                }

                match session.handle_line(&line) {
                    Ok(ShellAction::Exit) => break,
                    Ok(ShellAction::StartLoop) => pacer.restart(),
                    Ok(ShellAction::Continue | ShellAction::StopLoop) => {},
                    Err(err) => {
                        eprintln!("❌ Error: {}", err);
                        print_help_hint(&line);
                    },
                }
            }

            // 优先级2：控制周期
            _ = pacer.tick(), if session.is_running() => {
                match session.on_tick() {
                    Ok(Some(sample)) => println!("{}", telemetry::format_sample(&sample)?),
                    Ok(None) => println!("{}", telemetry::WITHIN_TOLERANCE_MESSAGE),
                    Err(err) => {
                        session.stop();
                        eprintln!("❌ Error: {}", err);
                    },
                }
            }

            _ = tokio::signal::ctrl_c() => {
                eprintln!("\n🛑 收到 Ctrl+C，退出");
                break;
            }
        }
    }

    println!("👋 再见！");
    Ok(())
}

/// 打印帮助信息
fn print_help() {
    println!("可用命令:");
    println!("  sv <value>                    设置设定值（SV）");
    println!("  pv <value>                    设置过程变量（PV）");
    println!("  stop                          停止控制循环");
    println!("  status                        显示当前状态");
    println!("  help                          显示帮助");
    println!("  exit / quit                   退出");
    println!();
    println!("快捷键:");
    println!("  Ctrl+C                        停止控制循环 / 退出");
    println!("  Ctrl+D                        退出");
    println!();
}

/// 提供基于错误的帮助提示
fn print_help_hint(command: &str) {
    if command.starts_with("sv") {
        eprintln!("💡 提示: 使用 'sv 10' 设置设定值");
    } else if command.starts_with("pv") {
        eprintln!("💡 提示: 使用 'pv 0' 设置过程变量");
    } else {
        eprintln!("💡 提示: 输入 'help' 查看所有命令");
    }
}
