//! # ads 子命令 CLI 定义
//!
//! 交互式吸附能计算器，没有必需参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/adsorption.rs`

use clap::Args;

/// ads 子命令参数
#[derive(Args, Debug, Default)]
pub struct AdsorptionArgs {
    /// Skip the summary table printed when several sites are entered
    #[arg(long, default_value_t = false)]
    pub no_summary: bool,
}
