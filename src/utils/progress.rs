//! # 进度提示工具
//!
//! 封装 `indicatif`，读取较大的输出文件时显示 spinner。
//! 非终端环境下 indicatif 自动隐藏，不影响管道输出。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `indicatif` crate

use indicatif::{ProgressBar, ProgressStyle};

/// 创建 spinner（用于不确定进度的任务）
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {elapsed_precise} {msg}") {
        pb.set_style(style.tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
