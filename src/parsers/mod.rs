//! # 解析器模块
//!
//! 结构文件读写的唯一入口：
//! - [`read_structure`]: 读取 pw.x 输出
//! - [`write_structure`]: 写出 CIF / XYZ
//!
//! 其他模块不直接接触任何文件格式。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: espresso_out, cif, xyz

pub mod cif;
pub mod espresso_out;
pub mod xyz;

use crate::error::{QekitError, Result};
use crate::models::Crystal;
use log::debug;
use std::fs;
use std::path::Path;

/// 支持的结构格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureFormat {
    /// Quantum ESPRESSO pw.x 输出（只读）
    EspressoOut,
    /// Crystallographic Information File
    Cif,
    /// XYZ format
    Xyz,
}

impl std::fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureFormat::EspressoOut => write!(f, "espresso-out"),
            StructureFormat::Cif => write!(f, "cif"),
            StructureFormat::Xyz => write!(f, "xyz"),
        }
    }
}

impl StructureFormat {
    /// 渲染为目标格式字符串
    pub fn render(self, crystal: &Crystal) -> Result<String> {
        match self {
            StructureFormat::Cif => Ok(cif::to_cif_string(crystal)),
            StructureFormat::Xyz => Ok(xyz::to_xyz_string(crystal)),
            StructureFormat::EspressoOut => Err(QekitError::UnsupportedFormat(format!(
                "{} cannot be written",
                self
            ))),
        }
    }
}

/// 读取 pw.x 输出中的最终结构
pub fn read_structure(path: &Path) -> Result<Crystal> {
    if !path.exists() {
        return Err(QekitError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    debug!("Reading {} as {}", path.display(), StructureFormat::EspressoOut);
    espresso_out::parse_espresso_out_file(path)
}

/// 以指定格式写出结构（创建或覆盖）
pub fn write_structure(crystal: &Crystal, path: &Path, format: StructureFormat) -> Result<()> {
    let content = format.render(crystal)?;
    fs::write(path, content).map_err(|e| QekitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    debug!("Wrote {} ({})", path.display(), format);
    Ok(())
}
