//! # convert 子命令 CLI 定义
//!
//! 将 Quantum ESPRESSO pw.x 输出转换为 CIF 和 XYZ
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::Args;
use std::path::PathBuf;

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input QE output file
    #[arg(short, long, default_value = "output.out")]
    pub input: PathBuf,

    /// Output CIF file
    #[arg(short, long, default_value = "structure.cif")]
    pub cif: PathBuf,

    /// Output XYZ file
    #[arg(short, long, default_value = "structure.xyz")]
    pub xyz: PathBuf,
}
