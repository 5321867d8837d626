//! # convert 命令实现
//!
//! 读取 Quantum ESPRESSO pw.x 输出中的最终结构，写出 CIF 和 XYZ。
//!
//! ## 功能
//! - 读取一次结构，写出两次
//! - 先完整读取输入再写出；读取失败时不会生成任何输出文件
//! - 计算未正常结束时给出警告，仍然转换最后一个结构
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `parsers/`, `models/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::cli::convert::ConvertArgs;
use crate::error::Result;
use crate::models::Crystal;
use crate::parsers::{self, StructureFormat};
use crate::utils::{output, progress};

use log::info;
use std::path::Path;

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    output::print_header("Converting Quantum ESPRESSO output");

    let crystal = convert(&args.input, &args.cif, &args.xyz)?;

    output::print_info(&format!(
        "{} ({} atoms)",
        crystal.formula(),
        crystal.atoms.len()
    ));
    match crystal.energy {
        Some(e) => output::print_info(&format!(
            "Final total energy: {:.6} eV after {} ionic step(s)",
            e, crystal.ionic_steps
        )),
        None => output::print_warning("No total energy found; using the initial structure"),
    }
    if !crystal.is_finished {
        output::print_warning(
            "Calculation did not finish (no 'JOB DONE.'); using the last complete step",
        );
    }

    output::print_success(&success_message(&args.input, &args.cif, &args.xyz));

    Ok(())
}

/// 转换成功后的确认信息，包含两个输出文件和输入文件
pub fn success_message(input: &Path, cif_path: &Path, xyz_path: &Path) -> String {
    format!(
        "Generated {} and {} from {}",
        cif_path.display(),
        xyz_path.display(),
        input.display()
    )
}

/// 读取 `input`，写出 CIF 到 `cif_path`、XYZ 到 `xyz_path`
pub fn convert(input: &Path, cif_path: &Path, xyz_path: &Path) -> Result<Crystal> {
    let spinner = progress::create_spinner(&format!("Reading {}", input.display()));
    let crystal = parsers::read_structure(input);
    spinner.finish_and_clear();
    let crystal = crystal?;

    parsers::write_structure(&crystal, cif_path, StructureFormat::Cif)?;
    parsers::write_structure(&crystal, xyz_path, StructureFormat::Xyz)?;

    info!(
        "Converted {} -> {}, {}",
        input.display(),
        cif_path.display(),
        xyz_path.display()
    );

    Ok(crystal)
}
