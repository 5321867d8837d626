//! # 物理单位换算常数
//!
//! QE 输出能量单位为 Ry，长度单位为 bohr；本工具对外使用 eV、kJ/mol 和 Å。
//!
//! ## 依赖关系
//! - 被 `models/adsorption.rs` 和 `parsers/espresso_out.rs` 使用

/// 1 Ry = 13.605693122994 eV
pub const RY_TO_EV: f64 = 13.605693122994;

/// 1 eV = 96.485332 kJ/mol
pub const EV_TO_KJ_PER_MOL: f64 = 96.485332;

/// 1 bohr = 0.529177210903 Å
pub const BOHR_TO_ANGSTROM: f64 = 0.529177210903;
