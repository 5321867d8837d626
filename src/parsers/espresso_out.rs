//! # Quantum ESPRESSO pw.x 输出解析器
//!
//! 解析 pw.x 计算输出文件（scf / relax / vc-relax），提取最终结构和总能量。
//!
//! ## pw.x 输出格式说明
//! ```text
//!      lattice parameter (alat)  =      10.2000  a.u.
//!      number of atoms/cell      =            2
//!      crystal axes: (cart. coord. in units of alat)
//!                a(1) = (  -0.500000   0.000000   0.500000 )
//!                a(2) = (   0.000000   0.500000   0.500000 )
//!                a(3) = (  -0.500000   0.500000   0.000000 )
//!      site n.     atom                  positions (alat units)
//!          1           Si  tau(   1) = (   0.0000000   0.0000000   0.0000000  )
//!          2           Si  tau(   2) = (   0.2500000   0.2500000   0.2500000  )
//! !    total energy              =     -15.79441848 Ry
//! CELL_PARAMETERS (alat= 10.20000000)
//! ATOMIC_POSITIONS (angstrom)
//! Si       0.000000000   0.000000000   0.000000000    0   0   0
//!      JOB DONE.
//! ```
//!
//! 每个 `!    total energy` 行记录一次当前结构的快照；最终结构取最后一个快照。
//! 没有任何能量行时使用输出头部的初始结构。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`, `models/units.rs`

use crate::error::{QekitError, Result};
use crate::models::units::{BOHR_TO_ANGSTROM, RY_TO_EV};
use crate::models::{Atom, Crystal, Lattice};
use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use std::fs;
use std::path::Path;

const FORMAT: &str = "espresso-out";

lazy_static! {
    static ref FLOAT_RE: String = r"[-+]?(?:\d+\.\d*|\.\d+|\d+)(?:[eEdD][-+]?\d+)?".to_string();

    // "     lattice parameter (alat)  =      10.2000  a.u."
    static ref ALAT_RE: Regex = Regex::new(&format!(
        r"lattice parameter \(alat\)\s*=\s*({0})",
        *FLOAT_RE
    )).unwrap();

    // "     number of atoms/cell      =            2"
    static ref NAT_RE: Regex = Regex::new(r"number of atoms/cell\s*=\s*(\d+)").unwrap();

    // "               a(1) = (  -0.500000   0.000000   0.500000 )"
    static ref AXIS_RE: Regex = Regex::new(&format!(
        r"a\(\s*\d+\)\s*=\s*\(\s*({0})\s+({0})\s+({0})\s*\)",
        *FLOAT_RE
    )).unwrap();

    // "         1           Si  tau(   1) = (   0.0000000   0.0000000   0.0000000  )"
    static ref TAU_RE: Regex = Regex::new(&format!(
        r"^\s*\d+\s+(\S+)\s+tau\(\s*\d+\)\s*=\s*\(\s*({0})\s+({0})\s+({0})\s*\)",
        *FLOAT_RE
    )).unwrap();

    // "!    total energy              =     -15.79441848 Ry"
    static ref ENERGY_RE: Regex = Regex::new(&format!(
        r"^!\s+total energy\s*=\s*({0})\s*Ry",
        *FLOAT_RE
    )).unwrap();

    // "CELL_PARAMETERS (alat= 10.20000000)"
    static ref CELL_ALAT_RE: Regex = Regex::new(&format!(
        r"alat\s*=\s*({0})",
        *FLOAT_RE
    )).unwrap();
}

/// 坐标或晶格向量的单位
#[derive(Debug, Clone, Copy, PartialEq)]
enum Units {
    /// 以 alat 为单位，附带 alat (bohr)
    Alat(f64),
    Bohr,
    Angstrom,
    /// 分数坐标（仅用于原子坐标）
    Crystal,
}

impl Units {
    /// 转换为 Å 的比例因子；分数坐标不适用
    fn scale(self) -> Option<f64> {
        match self {
            Units::Alat(alat) => Some(alat * BOHR_TO_ANGSTROM),
            Units::Bohr => Some(BOHR_TO_ANGSTROM),
            Units::Angstrom => Some(1.0),
            Units::Crystal => None,
        }
    }
}

/// 解析过程中的当前结构（笛卡尔坐标，Å）
#[derive(Debug, Clone)]
struct Snapshot {
    lattice: Lattice,
    labels: Vec<String>,
    positions: Vec<[f64; 3]>,
}

/// 解析 pw.x 输出文件
pub fn parse_espresso_out_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| QekitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_espresso_out_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
}

/// 从字符串内容解析 pw.x 输出
pub fn parse_espresso_out_content(content: &str, default_name: &str) -> Result<Crystal> {
    let lines: Vec<&str> = content.lines().collect();
    let err = |reason: String| QekitError::ParseError {
        format: FORMAT.to_string(),
        path: default_name.to_string(),
        reason,
    };

    let mut alat: Option<f64> = None;
    let mut nat: Option<usize> = None;
    let mut current: Option<Snapshot> = None;
    let mut header_axes: Option<[[f64; 3]; 3]> = None;
    let mut last_snapshot: Option<(Snapshot, f64)> = None;
    let mut ionic_steps = 0usize;
    let mut is_finished = false;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if alat.is_none() {
            if let Some(cap) = ALAT_RE.captures(line) {
                alat = Some(parse_float(&cap[1]).ok_or_else(|| {
                    err(format!("Invalid lattice parameter at line {}", i + 1))
                })?);
            }
        }

        if nat.is_none() {
            if let Some(cap) = NAT_RE.captures(line) {
                nat = cap[1].parse().ok();
            }
        }

        if line.contains("crystal axes: (cart. coord. in units of alat)") && header_axes.is_none() {
            let mut axes = [[0.0; 3]; 3];
            for (k, axis) in axes.iter_mut().enumerate() {
                let row = lines.get(i + 1 + k).copied().unwrap_or("");
                *axis = AXIS_RE
                    .captures(row)
                    .and_then(|cap| parse_triple(&cap[1], &cap[2], &cap[3]))
                    .ok_or_else(|| err(format!("Invalid crystal axis at line {}", i + 2 + k)))?;
            }
            header_axes = Some(axes);
            i += 4;
            continue;
        }

        if line.contains("positions (alat units)") && current.is_none() {
            let n = nat.ok_or_else(|| err("Atomic positions before number of atoms".to_string()))?;
            let a = alat.ok_or_else(|| err("Atomic positions before lattice parameter".to_string()))?;
            let axes = header_axes
                .ok_or_else(|| err("Atomic positions before crystal axes".to_string()))?;
            if n > lines.len().saturating_sub(i + 1) {
                return Err(err(format!(
                    "Expected {} atomic positions after line {}, file has {} more line(s)",
                    n,
                    i + 1,
                    lines.len().saturating_sub(i + 1)
                )));
            }

            let scale = a * BOHR_TO_ANGSTROM;
            let lattice = Lattice::from_vectors(scale_matrix(axes, scale));
            let mut labels = Vec::new();
            let mut positions = Vec::new();

            for k in 0..n {
                let row = lines.get(i + 1 + k).copied().unwrap_or("");
                let cap = TAU_RE
                    .captures(row)
                    .ok_or_else(|| err(format!("Invalid atomic position at line {}", i + 2 + k)))?;
                let tau = parse_triple(&cap[2], &cap[3], &cap[4])
                    .ok_or_else(|| err(format!("Invalid atomic position at line {}", i + 2 + k)))?;
                labels.push(cap[1].to_string());
                positions.push(scale_vector(tau, scale));
            }

            debug!("Initial structure: {} atoms, alat = {} bohr", n, a);
            current = Some(Snapshot {
                lattice,
                labels,
                positions,
            });
            i = i.saturating_add(n + 1);
            continue;
        }

        if line.trim_start().starts_with("CELL_PARAMETERS") {
            let snapshot = current
                .as_mut()
                .ok_or_else(|| err(format!("CELL_PARAMETERS before header at line {}", i + 1)))?;
            let units = cell_units(line, alat)
                .ok_or_else(|| err(format!("Unknown CELL_PARAMETERS units at line {}", i + 1)))?;
            let scale = units
                .scale()
                .ok_or_else(|| err(format!("Unknown CELL_PARAMETERS units at line {}", i + 1)))?;

            let mut matrix = [[0.0; 3]; 3];
            for (k, row) in matrix.iter_mut().enumerate() {
                let text = lines.get(i + 1 + k).copied().unwrap_or("");
                let v = leading_triple(text)
                    .ok_or_else(|| err(format!("Invalid lattice vector at line {}", i + 2 + k)))?;
                *row = scale_vector(v, scale);
            }

            trace!("Cell update at line {}", i + 1);
            snapshot.lattice = Lattice::from_vectors(matrix);
            i += 4;
            continue;
        }

        if line.trim_start().starts_with("ATOMIC_POSITIONS") {
            let snapshot = current
                .as_mut()
                .ok_or_else(|| err(format!("ATOMIC_POSITIONS before header at line {}", i + 1)))?;
            let units = position_units(line, alat)
                .ok_or_else(|| err(format!("Unknown ATOMIC_POSITIONS units at line {}", i + 1)))?;
            let n = snapshot.positions.len();

            let mut labels = Vec::with_capacity(n);
            let mut positions = Vec::with_capacity(n);
            for k in 0..n {
                let text = lines.get(i + 1 + k).copied().unwrap_or("");
                let mut parts = text.split_whitespace();
                let label = parts
                    .next()
                    .ok_or_else(|| err(format!("Missing atomic position at line {}", i + 2 + k)))?;
                let rest: Vec<&str> = parts.take(3).collect();
                let v = match rest.as_slice() {
                    [x, y, z] => parse_triple(x, y, z),
                    _ => None,
                }
                .ok_or_else(|| err(format!("Invalid atomic position at line {}", i + 2 + k)))?;

                let cart = match units.scale() {
                    Some(scale) => scale_vector(v, scale),
                    None => snapshot.lattice.to_cartesian(v),
                };
                labels.push(label.to_string());
                positions.push(cart);
            }

            trace!("Position update at line {}", i + 1);
            snapshot.labels = labels;
            snapshot.positions = positions;
            i = i.saturating_add(n + 1);
            continue;
        }

        if let Some(cap) = ENERGY_RE.captures(line) {
            let energy_ry = parse_float(&cap[1])
                .ok_or_else(|| err(format!("Invalid total energy at line {}", i + 1)))?;
            if let Some(snapshot) = &current {
                ionic_steps += 1;
                last_snapshot = Some((snapshot.clone(), energy_ry * RY_TO_EV));
            }
        }

        if line.contains("JOB DONE.") {
            is_finished = true;
        }

        i += 1;
    }

    let initial = current.ok_or_else(|| {
        err("No atomic structure found (is this a pw.x output file?)".to_string())
    })?;

    let (snapshot, energy) = match last_snapshot {
        Some((snapshot, energy)) => (snapshot, Some(energy)),
        None => (initial, None),
    };

    let mut atoms = Vec::with_capacity(snapshot.positions.len());
    for (label, cart) in snapshot.labels.iter().zip(snapshot.positions.iter()) {
        let frac = snapshot
            .lattice
            .to_fractional(*cart)
            .ok_or_else(|| err("Degenerate lattice vectors".to_string()))?;
        let element = label_to_symbol(label)
            .ok_or_else(|| err(format!("Unknown species label '{}'", label)))?;
        atoms.push(Atom::new(element, frac));
    }

    debug!(
        "Parsed {} ionic step(s), {} atoms, finished = {}",
        ionic_steps,
        atoms.len(),
        is_finished
    );

    let mut crystal = Crystal::new(default_name, snapshot.lattice, atoms);
    crystal.energy = energy;
    crystal.ionic_steps = ionic_steps;
    crystal.is_finished = is_finished;
    crystal.source_format = Some(FORMAT.to_string());

    Ok(crystal)
}

/// 解析浮点数，兼容 Fortran 的 `1.0D-03` 写法
fn parse_float(s: &str) -> Option<f64> {
    s.replace(['d', 'D'], "e").parse().ok()
}

fn parse_triple(x: &str, y: &str, z: &str) -> Option<[f64; 3]> {
    Some([parse_float(x)?, parse_float(y)?, parse_float(z)?])
}

/// 行首的三个数值
fn leading_triple(line: &str) -> Option<[f64; 3]> {
    let parts: Vec<&str> = line.split_whitespace().take(3).collect();
    match parts.as_slice() {
        [x, y, z] => parse_triple(x, y, z),
        _ => None,
    }
}

fn scale_vector(v: [f64; 3], s: f64) -> [f64; 3] {
    [v[0] * s, v[1] * s, v[2] * s]
}

fn scale_matrix(m: [[f64; 3]; 3], s: f64) -> [[f64; 3]; 3] {
    [
        scale_vector(m[0], s),
        scale_vector(m[1], s),
        scale_vector(m[2], s),
    ]
}

/// 块标题中括号内的单位关键字
fn block_option(line: &str) -> Option<String> {
    let start = line.find(['(', '{'])?;
    let end = line[start..].find([')', '}'])? + start;
    Some(line[start + 1..end].trim().to_lowercase())
}

/// CELL_PARAMETERS 的单位；老版本输出不带单位，视为 alat
fn cell_units(line: &str, alat: Option<f64>) -> Option<Units> {
    match block_option(line) {
        None => alat.map(Units::Alat),
        Some(opt) if opt.starts_with("alat") => match CELL_ALAT_RE.captures(&opt) {
            Some(cap) => parse_float(&cap[1]).map(Units::Alat),
            None => alat.map(Units::Alat),
        },
        Some(opt) if opt == "bohr" => Some(Units::Bohr),
        Some(opt) if opt == "angstrom" => Some(Units::Angstrom),
        Some(_) => None,
    }
}

/// ATOMIC_POSITIONS 的单位；不带单位时按 QE 约定视为 alat
fn position_units(line: &str, alat: Option<f64>) -> Option<Units> {
    match block_option(line).as_deref() {
        None | Some("alat") => alat.map(Units::Alat),
        Some("bohr") => Some(Units::Bohr),
        Some("angstrom") => Some(Units::Angstrom),
        Some("crystal") => Some(Units::Crystal),
        Some(_) => None,
    }
}

/// 元素周期表符号
const ELEMENTS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// 将 QE 物种名（如 `Fe1`, `O_h`, `MG`）映射到元素符号
///
/// 先尝试前两个字母，再尝试第一个字母。
pub fn label_to_symbol(label: &str) -> Option<&'static str> {
    let letters: Vec<char> = label.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let first = letters.first()?.to_ascii_uppercase();

    if let Some(second) = letters.get(1) {
        let two = format!("{}{}", first, second.to_ascii_lowercase());
        if let Some(sym) = ELEMENTS.iter().find(|&&e| e == two) {
            return Some(sym);
        }
    }

    let one = first.to_string();
    ELEMENTS.iter().find(|&&e| e == one).copied()
}
