//! # 晶体结构数据模型
//!
//! 统一的晶体结构表示：从 QE 输出解析得到，再写出为 CIF / XYZ。
//! 原子坐标一律以分数坐标保存。
//!
//! ## 依赖关系
//! - 被 `parsers/` 使用
//! - 无外部模块依赖

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3, Å)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a_vec, b_vec, c_vec] = self.matrix;

        let a = norm(a_vec);
        let b = norm(b_vec);
        let c = norm(c_vec);

        let alpha = (dot(b_vec, c_vec) / (b * c)).acos().to_degrees();
        let beta = (dot(a_vec, c_vec) / (a * c)).acos().to_degrees();
        let gamma = (dot(a_vec, b_vec) / (a * b)).acos().to_degrees();

        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.matrix;

        // 行列式计算
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 分数坐标转笛卡尔坐标
    pub fn to_cartesian(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }

    /// 笛卡尔坐标转分数坐标
    ///
    /// 晶格退化（行列式接近 0）时返回 `None`。
    pub fn to_fractional(&self, cart: [f64; 3]) -> Option<[f64; 3]> {
        let m = self.matrix;
        let det = self.volume();

        if det.abs() < 1e-10 {
            return None;
        }

        let inv = [
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
            ],
        ];

        // 行向量约定下 frac = cart · M⁻¹
        Some([
            cart[0] * inv[0][0] + cart[1] * inv[1][0] + cart[2] * inv[2][0],
            cart[0] * inv[0][1] + cart[1] * inv[1][1] + cart[2] * inv[2][1],
            cart[0] * inv[0][2] + cart[1] * inv[1][2] + cart[2] * inv[2][2],
        ])
    }
}

fn dot(u: [f64; 3], v: [f64; 3]) -> f64 {
    u.iter().zip(v.iter()).map(|(x, y)| x * y).sum()
}

fn norm(u: [f64; 3]) -> f64 {
    dot(u, u).sqrt()
}

/// 原子信息
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }
}

/// 晶体结构
#[derive(Debug, Clone)]
pub struct Crystal {
    /// 结构名称
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表
    pub atoms: Vec<Atom>,

    /// 总能量 (eV)
    pub energy: Option<f64>,

    /// 输出文件中出现的离子步（总能量）数目
    pub ionic_steps: usize,

    /// 计算是否正常结束
    pub is_finished: bool,

    /// 来源文件格式
    pub source_format: Option<String>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
            energy: None,
            ionic_steps: 0,
            is_finished: false,
            source_format: None,
        }
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for atom in &self.atoms {
            *counts.entry(atom.element.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// 原子的笛卡尔坐标 (Å)
    pub fn cartesian_positions(&self) -> Vec<[f64; 3]> {
        self.atoms
            .iter()
            .map(|a| self.lattice.to_cartesian(a.position))
            .collect()
    }
}
