//! # XYZ 格式写出
//!
//! 第二行写入 extended XYZ 注释（晶格、能量、周期性），
//! 普通 XYZ 读取器会把它当作普通注释忽略。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`

use crate::models::Crystal;

/// 将 Crystal 转换为 XYZ 格式字符串（笛卡尔坐标，Å）
pub fn to_xyz_string(crystal: &Crystal) -> String {
    let mut result = String::new();
    result.push_str(&format!("{}\n", crystal.atoms.len()));
    result.push_str(&format!("{}\n", comment_line(crystal)));

    for (atom, pos) in crystal.atoms.iter().zip(crystal.cartesian_positions()) {
        result.push_str(&format!(
            "{:<2} {:16.10} {:16.10} {:16.10}\n",
            atom.element, pos[0], pos[1], pos[2]
        ));
    }

    result
}

fn comment_line(crystal: &Crystal) -> String {
    let lattice = crystal
        .lattice
        .matrix
        .iter()
        .flatten()
        .map(|v| format!("{:.8}", v))
        .collect::<Vec<_>>()
        .join(" ");

    let mut comment = format!(
        "Lattice=\"{}\" Properties=species:S:1:pos:R:3",
        lattice
    );
    if let Some(energy) = crystal.energy {
        comment.push_str(&format!(" energy={:.8}", energy));
    }
    comment.push_str(" pbc=\"T T T\"");
    comment
}
