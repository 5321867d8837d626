//! # 统一错误处理模块
//!
//! 定义 qekit 的所有错误类型，使用 `thiserror` 派生。
//! 每个错误变体都归属于一个 [`ErrorKind`]，调用方（和测试）按类别判断，
//! 不依赖错误文本匹配。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 交互输入格式错误（非数值、非整数、站点数越界）
    InputFormat,
    /// 结构文件读写错误（文件缺失、内容无法解析、写入失败）
    StructureIo,
    /// 终端读写失败
    Console,
}

/// qekit 统一错误类型
#[derive(Error, Debug)]
pub enum QekitError {
    // ─────────────────────────────────────────────────────────────
    // 输入错误
    // ─────────────────────────────────────────────────────────────
    #[error("Please enter a valid numerical value for {field} (got '{value}')")]
    InvalidNumber { field: String, value: String },

    #[error("Number of sites must be a positive integer (got {value})")]
    InvalidSiteCount { value: i64 },

    #[error("At least one adsorption site energy is required")]
    EmptySiteSet,

    #[error("Input ended while waiting for {field}")]
    UnexpectedEof { field: String },

    #[error("Input for {field} is not valid UTF-8 text")]
    InvalidEncoding { field: String },

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path} ({source})")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path} ({source})")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Console I/O failed: {0}")]
    ConsoleError(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl QekitError {
    /// 错误所属类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            QekitError::InvalidNumber { .. }
            | QekitError::InvalidSiteCount { .. }
            | QekitError::EmptySiteSet
            | QekitError::UnexpectedEof { .. }
            | QekitError::InvalidEncoding { .. } => ErrorKind::InputFormat,
            QekitError::FileReadError { .. }
            | QekitError::FileWriteError { .. }
            | QekitError::FileNotFound { .. }
            | QekitError::ParseError { .. }
            | QekitError::UnsupportedFormat(_) => ErrorKind::StructureIo,
            QekitError::ConsoleError(_) => ErrorKind::Console,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, QekitError>;
