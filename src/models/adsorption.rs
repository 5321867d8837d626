//! # 吸附能数据模型
//!
//! E_ads = E_(slab+adsorbate) - (E_slab + E_adsorbate)
//!
//! 输入能量单位为 Ry，结果同时给出 Ry、eV、kJ/mol 三种单位。
//! 计算不做任何舍入，只在显示时保留 4 位小数。
//!
//! ## 依赖关系
//! - 被 `commands/adsorption.rs` 使用
//! - 使用 `models/units.rs`

use super::units::{EV_TO_KJ_PER_MOL, RY_TO_EV};
use crate::error::{QekitError, Result};

/// 单个吸附位点的吸附能
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsorptionEnergy {
    /// Ry
    pub ry: f64,
    /// eV
    pub ev: f64,
    /// kJ/mol
    pub kj_per_mol: f64,
}

impl AdsorptionEnergy {
    /// 由位点体系能量、洁净表面能量和吸附质能量计算吸附能（均为 Ry）
    pub fn compute(e_site: f64, e_slab: f64, e_adsorbate: f64) -> Self {
        let ry = e_site - (e_slab + e_adsorbate);
        let ev = ry * RY_TO_EV;
        let kj_per_mol = ev * EV_TO_KJ_PER_MOL;
        AdsorptionEnergy { ry, ev, kj_per_mol }
    }

    /// 吸附能为负表示吸附有利
    pub fn is_favorable(&self) -> bool {
        self.ry < 0.0
    }
}

/// 各吸附位点的体系能量 (Ry)，至少包含一个位点
#[derive(Debug, Clone, PartialEq)]
pub struct SiteEnergySet {
    energies: Vec<f64>,
}

impl SiteEnergySet {
    pub fn new(energies: Vec<f64>) -> Result<Self> {
        if energies.is_empty() {
            return Err(QekitError::EmptySiteSet);
        }
        Ok(SiteEnergySet { energies })
    }

    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }
}

/// 单个位点的计算结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteResult {
    /// 位点编号，从 1 开始
    pub index: usize,
    /// E_(slab+adsorbate) (Ry)
    pub site_energy: f64,
    pub energy: AdsorptionEnergy,
}

/// 一次 `run` 收集到的全部输入
#[derive(Debug, Clone, PartialEq)]
pub struct AdsorptionInputs {
    /// E_adsorbate (Ry)
    pub adsorbate: f64,
    /// E_slab (Ry)
    pub slab: f64,
    pub sites: SiteEnergySet,
}

impl AdsorptionInputs {
    /// 按输入顺序计算每个位点的吸附能
    pub fn results(&self) -> Vec<SiteResult> {
        self.sites
            .energies()
            .iter()
            .enumerate()
            .map(|(i, &e_site)| SiteResult {
                index: i + 1,
                site_energy: e_site,
                energy: AdsorptionEnergy::compute(e_site, self.slab, self.adsorbate),
            })
            .collect()
    }
}

/// 吸附能最低（最有利）的位点
pub fn most_favorable(results: &[SiteResult]) -> Option<&SiteResult> {
    results.iter().min_by(|a, b| {
        a.energy
            .ry
            .partial_cmp(&b.energy.ry)
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}
