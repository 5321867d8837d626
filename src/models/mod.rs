//! # 数据模型模块
//!
//! 定义吸附能计算结果和晶体结构数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `commands/` 使用
//! - 子模块: adsorption, structure, units

pub mod adsorption;
pub mod structure;
pub mod units;

pub use adsorption::{AdsorptionInputs, SiteEnergySet, SiteResult};
pub use structure::{Atom, Crystal, Lattice};
