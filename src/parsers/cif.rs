//! # CIF 格式写出
//!
//! 以 P1 空间群写出晶体结构，原子使用分数坐标。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`

use crate::models::Crystal;

/// 将 Crystal 转换为 CIF 格式字符串
pub fn to_cif_string(crystal: &Crystal) -> String {
    let (a, b, c, alpha, beta, gamma) = crystal.lattice.parameters();

    let mut result = String::new();
    result.push_str(&format!("data_{}\n", block_name(&crystal.name)));
    result.push_str(&format!(
        "_chemical_formula_sum             '{}'\n",
        crystal.formula()
    ));
    result.push_str("_symmetry_space_group_name_H-M    'P 1'\n");
    result.push_str("_symmetry_Int_Tables_number       1\n\n");

    result.push_str(&format!("_cell_length_a    {:.6}\n", a));
    result.push_str(&format!("_cell_length_b    {:.6}\n", b));
    result.push_str(&format!("_cell_length_c    {:.6}\n", c));
    result.push_str(&format!("_cell_angle_alpha {:.4}\n", alpha));
    result.push_str(&format!("_cell_angle_beta  {:.4}\n", beta));
    result.push_str(&format!("_cell_angle_gamma {:.4}\n", gamma));
    result.push_str(&format!(
        "_cell_volume      {:.6}\n\n",
        crystal.lattice.volume().abs()
    ));

    result.push_str("loop_\n");
    result.push_str("_symmetry_equiv_pos_as_xyz\n");
    result.push_str("'x, y, z'\n\n");

    result.push_str("loop_\n");
    result.push_str("_atom_site_label\n");
    result.push_str("_atom_site_type_symbol\n");
    result.push_str("_atom_site_fract_x\n");
    result.push_str("_atom_site_fract_y\n");
    result.push_str("_atom_site_fract_z\n");
    result.push_str("_atom_site_occupancy\n");

    for (i, atom) in crystal.atoms.iter().enumerate() {
        // CIF 标签需唯一，统一使用 元素+序号
        let label = format!("{}{}", atom.element, i + 1);
        result.push_str(&format!(
            "{} {} {:.10} {:.10} {:.10} 1.0\n",
            label, atom.element, atom.position[0], atom.position[1], atom.position[2]
        ));
    }

    result
}

/// data_ 块名不能包含空白
fn block_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        "structure".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};

    fn rocksalt() -> Crystal {
        let lattice = Lattice::from_vectors([[4.2, 0.0, 0.0], [0.0, 4.2, 0.0], [0.0, 0.0, 4.2]]);
        let atoms = vec![
            Atom::new("Mg", [0.0, 0.0, 0.0]),
            Atom::new("O", [0.5, 0.5, 0.5]),
        ];
        Crystal::new("MgO slab", lattice, atoms)
    }

    #[test]
    fn test_cif_header_and_cell() {
        let cif = to_cif_string(&rocksalt());

        assert!(cif.starts_with("data_MgO_slab\n"));
        assert!(cif.contains("_chemical_formula_sum             'MgO'"));
        assert!(cif.contains("_cell_length_a    4.200000"));
        assert!(cif.contains("_cell_angle_gamma 90.0000"));
        assert!(cif.contains("_cell_volume      74.088000"));
    }

    #[test]
    fn test_cif_atom_sites() {
        let cif = to_cif_string(&rocksalt());
        let sites: Vec<&str> = cif
            .lines()
            .skip_while(|l| *l != "_atom_site_occupancy")
            .skip(1)
            .collect();

        assert_eq!(sites.len(), 2);
        assert_eq!(
            sites[1],
            "O2 O 0.5000000000 0.5000000000 0.5000000000 1.0"
        );
    }

    #[test]
    fn test_block_name_fallback() {
        assert_eq!(block_name(""), "structure");
        assert_eq!(block_name("a b\tc"), "a_b_c");
    }
}
