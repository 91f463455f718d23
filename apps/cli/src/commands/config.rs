//! 配置管理命令
//!
//! 管理控制器整定参数与仿真参数（TOML）。

use anyhow::{Context, Result};
use clap::Subcommand;
use simple_pid::AppConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
///
/// - Linux: `~/.config/simple-pid/config.toml`
/// - macOS: `~/Library/Application Support/simple-pid/config.toml`
/// - Windows: `%APPDATA%\simple-pid\config.toml`
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;

    path.push("simple-pid");
    path.push("config.toml");
    Ok(path)
}

/// 加载配置
///
/// 显式指定的路径必须存在；未指定时读取默认路径，不存在则使用默认配置。
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        return AppConfig::load_from_file(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()));
    }

    let path = default_config_file()?;
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    AppConfig::load_from_file(&path)
        .with_context(|| format!("读取配置文件失败: {}", path.display()))
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 写入默认配置文件
    Init {
        /// 配置文件路径（默认为用户配置目录）
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },

    /// 显示生效的配置
    Show {
        /// 配置文件路径（默认为用户配置目录）
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// 显示默认配置文件路径
    Path,
}

impl ConfigCommand {
    pub async fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Init { path, force } => Self::init_(path, force),

            ConfigCommand::Show { path } => Self::show_(path),

            ConfigCommand::Path => {
                println!("{}", default_config_file()?.display());
                Ok(())
            },
        }
    }

    fn init_(path: Option<PathBuf>, force: bool) -> Result<()> {
        let path = match path {
            Some(path) => path,
            None => default_config_file()?,
        };

        if path.exists() && !force {
            anyhow::bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("创建配置目录失败")?;
        }

        AppConfig::default().save_to_file(&path).context("写入配置文件失败")?;

        println!("✅ 已写入默认配置: {}", path.display());
        Ok(())
    }

    fn show_(path: Option<PathBuf>) -> Result<()> {
        let config = load_config(path.as_deref())?;
        print!("{}", config.to_toml_string()?);
        Ok(())
    }
}
