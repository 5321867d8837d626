//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `ads`: 交互式吸附能计算器
//! - `convert`: pw.x 输出 → CIF / XYZ
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: adsorption, convert

pub mod adsorption;
pub mod convert;

use clap::{ArgAction, Parser, Subcommand};

/// qekit - 吸附能计算与 Quantum ESPRESSO 结构转换工具
#[derive(Parser)]
#[command(name = "qekit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Adsorption energy calculator and Quantum ESPRESSO structure converter",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Interactive adsorption energy calculator (energies in Ry)
    #[command(visible_alias = "adsorption")]
    Ads(adsorption::AdsorptionArgs),

    /// Convert a Quantum ESPRESSO pw.x output file to CIF and XYZ
    Convert(convert::ConvertArgs),
}
