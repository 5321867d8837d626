//! # ads 命令实现
//!
//! 交互式吸附能计算器。
//!
//! ## 功能
//! - 命令循环：`-h/--help`, `-r/--run`, `-q/--quit`
//! - `run` 依次读取吸附质能量、洁净表面能量、位点数和各位点能量
//! - 输出每个位点的 Ry / eV / kJ/mol 吸附能，多个位点时附加汇总表
//!
//! 会话只有两个状态：等待命令 和 已结束。`run` 中的任何输入错误只会
//! 中止本次 `run`，不会结束会话。
//!
//! ## 依赖关系
//! - 使用 `cli/adsorption.rs` 定义的参数
//! - 使用 `models/adsorption.rs`

use crate::cli::adsorption::AdsorptionArgs;
use crate::error::{QekitError, Result};
use crate::models::adsorption::most_favorable;
use crate::models::units::{EV_TO_KJ_PER_MOL, RY_TO_EV};
use crate::models::{AdsorptionInputs, SiteEnergySet, SiteResult};

use colored::Colorize;
use log::debug;
use std::io::{self, BufRead, Write};
use tabled::{Table, Tabled};

/// 执行 ads 命令
pub fn execute(args: AdsorptionArgs) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(stdin.lock(), stdout.lock());
    session.show_summary = !args.no_summary;
    session.run()?;
    debug!("Session ended in state {:?}", session.state());
    Ok(())
}

/// 命令循环中可识别的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Run,
    Quit,
    Invalid(String),
}

impl Command {
    /// 解析一行输入（去除首尾空白，不区分大小写）
    pub fn parse(input: &str) -> Command {
        let token = input.trim().to_lowercase();
        match token.as_str() {
            "-h" | "--help" | "help" => Command::Help,
            "-r" | "--run" | "run" => Command::Run,
            "-q" | "--quit" | "quit" => Command::Quit,
            _ => Command::Invalid(token),
        }
    }
}

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingCommand,
    Terminated,
}

/// 交互会话，读写端可替换（测试中使用内存缓冲）
pub struct Session<R, W> {
    input: R,
    out: W,
    state: SessionState,
    /// 多个位点时是否打印汇总表
    pub show_summary: bool,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Session {
            input,
            out,
            state: SessionState::AwaitingCommand,
            show_summary: true,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 运行命令循环直到 quit 或输入结束
    pub fn run(&mut self) -> Result<()> {
        while self.state == SessionState::AwaitingCommand {
            self.step()?;
        }
        Ok(())
    }

    /// 读取并执行一条命令
    pub fn step(&mut self) -> Result<()> {
        writeln!(self.out, "\n{}", "Adsorption Energy Calculator".bold())?;
        writeln!(
            self.out,
            "Enter '-h' or '--help' for help, '-r' or '--run' to calculate, '-q' or '--quit' to exit."
        )?;

        let command = match self.prompt("Command: ") {
            Ok(Some(line)) => Command::parse(&line),
            Ok(None) => {
                // stdin 已关闭，等同于 quit
                writeln!(self.out)?;
                self.quit()?;
                return Ok(());
            }
            // 非 UTF-8 的一行已被读走，按无效命令处理
            Err(e) if is_invalid_encoding(&e) => Command::Invalid(String::new()),
            Err(e) => return Err(e),
        };

        debug!("Command: {:?}", command);

        match command {
            Command::Help => self.print_help()?,
            Command::Run => match self.collect_inputs() {
                Ok(inputs) => self.print_results(&inputs)?,
                Err(QekitError::ConsoleError(e)) => return Err(QekitError::ConsoleError(e)),
                Err(e) => writeln!(self.out, "{} {}", "[ERR]".red().bold(), e)?,
            },
            Command::Quit => self.quit()?,
            Command::Invalid(_) => writeln!(
                self.out,
                "{} Invalid command. Use '-h' or '--help' for assistance.",
                "[WARN]".yellow().bold()
            )?,
        }

        Ok(())
    }

    fn quit(&mut self) -> Result<()> {
        writeln!(self.out, "Exiting program.")?;
        self.state = SessionState::Terminated;
        Ok(())
    }

    /// 打印提示并读取一行；输入结束时返回 `None`
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    /// 提示并读取一个必需字段
    fn prompt_field(&mut self, text: &str, field: &str) -> Result<String> {
        match self.prompt(text) {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(QekitError::UnexpectedEof {
                field: field.to_string(),
            }),
            Err(e) if is_invalid_encoding(&e) => Err(QekitError::InvalidEncoding {
                field: field.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    /// 依次读取一次计算所需的全部输入，任一字段无效即中止
    pub fn collect_inputs(&mut self) -> Result<AdsorptionInputs> {
        let field = "adsorbate energy";
        let text = self.prompt_field(
            "Enter the energy of the adsorbate (e.g., E_H₂O) in Ry: ",
            field,
        )?;
        let adsorbate = parse_energy(&text, field)?;

        let field = "slab energy";
        let text = self.prompt_field(
            "Enter the energy of the clean slab (e.g., E_MgO) in Ry: ",
            field,
        )?;
        let slab = parse_energy(&text, field)?;

        let field = "number of sites";
        let text = self.prompt_field("Enter the number of adsorption sites: ", field)?;
        let count = parse_site_count(&text)?;

        // count 来自用户输入，不按它预分配
        let mut energies = Vec::new();
        for i in 1..=count {
            let field = format!("site {} energy", i);
            let text = self.prompt_field(
                &format!(
                    "Enter the energy for adsorption site {} (e.g., E_(MgO+H₂O)) in Ry: ",
                    i
                ),
                &field,
            )?;
            energies.push(parse_energy(&text, &field)?);
        }

        Ok(AdsorptionInputs {
            adsorbate,
            slab,
            sites: SiteEnergySet::new(energies)?,
        })
    }

    fn print_results(&mut self, inputs: &AdsorptionInputs) -> Result<()> {
        let results = inputs.results();
        debug!("Computing {} site(s)", inputs.sites.len());

        writeln!(self.out, "\n{}", "Adsorption Energies:".bold())?;
        for r in &results {
            writeln!(self.out, "Site {}:", r.index)?;
            writeln!(self.out, "  E_ads = {:.4} Ry", r.energy.ry)?;
            writeln!(self.out, "        = {:.4} eV", r.energy.ev)?;
            writeln!(self.out, "        = {:.4} kJ/mol", r.energy.kj_per_mol)?;
            writeln!(
                self.out,
                "  (E_(slab+adsorbate) = {:.4} Ry, E_slab = {:.4} Ry, E_adsorbate = {:.4} Ry)",
                r.site_energy, inputs.slab, inputs.adsorbate
            )?;
        }

        if self.show_summary && results.len() > 1 {
            self.print_summary(&results)?;
        }

        Ok(())
    }

    fn print_summary(&mut self, results: &[SiteResult]) -> Result<()> {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Site")]
            site: usize,
            #[tabled(rename = "E_ads (Ry)")]
            ry: String,
            #[tabled(rename = "E_ads (eV)")]
            ev: String,
            #[tabled(rename = "E_ads (kJ/mol)")]
            kj_per_mol: String,
            #[tabled(rename = "Favorable")]
            favorable: &'static str,
        }

        let rows: Vec<SummaryRow> = results
            .iter()
            .map(|r| SummaryRow {
                site: r.index,
                ry: format!("{:.4}", r.energy.ry),
                ev: format!("{:.4}", r.energy.ev),
                kj_per_mol: format!("{:.4}", r.energy.kj_per_mol),
                favorable: if r.energy.is_favorable() { "yes" } else { "no" },
            })
            .collect();

        writeln!(self.out)?;
        writeln!(self.out, "{}", Table::new(&rows))?;

        if let Some(best) = most_favorable(results) {
            writeln!(
                self.out,
                "{} Most favorable: Site {} ({:.4} eV)",
                "[*]".blue().bold(),
                best.index,
                best.energy.ev
            )?;
        }

        Ok(())
    }

    fn print_help(&mut self) -> Result<()> {
        writeln!(
            self.out,
            r#"
Adsorption Energy Calculator
---------------------------
Calculates the adsorption energy (E_ads) as:
E_ads = E_(slab+adsorbate) - (E_slab + E_adsorbate)

Example: a water molecule (H₂O) adsorbed on a magnesium oxide (MgO) slab:
E_ads = E_(MgO+H₂O) - (E_MgO + E_H₂O)

Commands:
  -h, --help : Display this help message
  -r, --run  : Run the adsorption energy calculation
  -q, --quit : Exit the program

Instructions:
1. Enter the energy of the adsorbate (e.g., E_H₂O for water).
2. Enter the energy of the clean slab (e.g., E_MgO for MgO).
3. Enter the number of adsorption sites.
4. Enter the energy of each adsorption site (e.g., E_(MgO+H₂O)).
5. The adsorption energy of every site is printed in Rydberg (Ry),
   electron volts (eV) and kilojoules per mole (kJ/mol).

All input energies are in Rydberg (Ry), as printed by Quantum ESPRESSO.
Conversion factors: 1 Ry = {} eV, 1 eV = {} kJ/mol.
---------------------------"#,
            RY_TO_EV, EV_TO_KJ_PER_MOL
        )?;
        Ok(())
    }
}

/// 读取到的一行不是合法 UTF-8
fn is_invalid_encoding(err: &QekitError) -> bool {
    matches!(err, QekitError::ConsoleError(e) if e.kind() == io::ErrorKind::InvalidData)
}

/// 解析能量字段 (Ry)
pub fn parse_energy(text: &str, field: &str) -> Result<f64> {
    let trimmed = text.trim();
    trimmed.parse().map_err(|_| QekitError::InvalidNumber {
        field: field.to_string(),
        value: trimmed.to_string(),
    })
}

/// 解析位点数，必须为正整数
pub fn parse_site_count(text: &str) -> Result<usize> {
    let trimmed = text.trim();
    let count: i64 = trimmed.parse().map_err(|_| QekitError::InvalidNumber {
        field: "number of sites".to_string(),
        value: trimmed.to_string(),
    })?;

    if count <= 0 {
        return Err(QekitError::InvalidSiteCount { value: count });
    }
    usize::try_from(count).map_err(|_| QekitError::InvalidSiteCount { value: count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;

    /// 用给定输入驱动完整会话，返回输出文本和最终状态
    fn drive(input: &str) -> (String, SessionState) {
        let mut out = Vec::new();
        let state = {
            let mut session = Session::new(Cursor::new(input.as_bytes().to_vec()), &mut out);
            session.run().unwrap();
            session.state()
        };
        (String::from_utf8(out).unwrap(), state)
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("-h"), Command::Help);
        assert_eq!(Command::parse("  --HELP \n"), Command::Help);
        assert_eq!(Command::parse("-R"), Command::Run);
        assert_eq!(Command::parse("--run"), Command::Run);
        assert_eq!(Command::parse("-q"), Command::Quit);
        assert_eq!(Command::parse("--Quit"), Command::Quit);
        assert_eq!(Command::parse("calc"), Command::Invalid("calc".to_string()));
        assert_eq!(Command::parse(""), Command::Invalid(String::new()));
    }

    #[test]
    fn test_parse_energy() {
        assert_eq!(parse_energy(" -17.2\n", "adsorbate energy").unwrap(), -17.2);
        assert_eq!(parse_energy("1e-3", "slab energy").unwrap(), 0.001);

        let err = parse_energy("abc", "slab energy").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputFormat);
        assert!(err.to_string().contains("slab energy"));
    }

    #[test]
    fn test_parse_site_count() {
        assert_eq!(parse_site_count("1").unwrap(), 1);
        assert_eq!(parse_site_count(" 3 \n").unwrap(), 3);
        assert!(matches!(
            parse_site_count("0"),
            Err(QekitError::InvalidSiteCount { value: 0 })
        ));
        assert!(matches!(
            parse_site_count("-2"),
            Err(QekitError::InvalidSiteCount { value: -2 })
        ));
        assert!(matches!(
            parse_site_count("2.5"),
            Err(QekitError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_run_single_site() {
        let (out, state) = drive("-r\n-17.2\n-150.0\n1\n-168.5\n-q\n");

        assert_eq!(state, SessionState::Terminated);
        assert!(out.contains("Site 1:"));
        assert!(out.contains("E_ads = -1.3000 Ry"));
        assert!(out.contains("= -17.6874 eV"));
        assert!(out.contains("= -1706.5748 kJ/mol"));
        assert!(out.contains(
            "(E_(slab+adsorbate) = -168.5000 Ry, E_slab = -150.0000 Ry, E_adsorbate = -17.2000 Ry)"
        ));
        // 单个位点不打印汇总表
        assert!(!out.contains("Most favorable"));
        assert!(out.ends_with("Exiting program.\n"));
    }

    #[test]
    fn test_run_multiple_sites_in_order() {
        let (out, _) = drive("--run\n-17.2\n-150.0\n2\n-168.5\n-167.0\nquit\n");

        let first = out.find("Site 1:").unwrap();
        let second = out.find("Site 2:").unwrap();
        assert!(first < second);
        assert!(out.contains("E_ads = 0.2000 Ry"));
        assert!(out.contains("Most favorable: Site 1"));
    }

    #[test]
    fn test_summary_can_be_disabled() {
        let mut out = Vec::new();
        {
            let input = Cursor::new(b"-r\n-1\n-1\n2\n-3\n-4\n-q\n".to_vec());
            let mut session = Session::new(input, &mut out);
            session.show_summary = false;
            session.run().unwrap();
        }
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Site 2:"));
        assert!(!out.contains("Most favorable"));
    }

    #[test]
    fn test_invalid_energy_aborts_run() {
        let (out, state) = drive("-r\n-17.2\nabc\n-q\n");

        assert_eq!(state, SessionState::Terminated);
        assert!(out.contains("Please enter a valid numerical value for slab energy"));
        assert!(!out.contains("Enter the number of adsorption sites"));
        assert!(!out.contains("Adsorption Energies:"));
        // 错误之后回到命令循环
        assert!(out.matches("Command: ").count() >= 2);
    }

    #[test]
    fn test_invalid_site_energy_shows_no_results() {
        let (out, _) = drive("-r\n-17.2\n-150.0\n2\n-168.5\nnope\n-q\n");

        assert!(out.contains("site 2 energy"));
        assert!(!out.contains("Adsorption Energies:"));
        assert!(!out.contains("Site 1:"));
    }

    #[test]
    fn test_non_positive_site_count_skips_site_prompts() {
        for count in ["0", "-3"] {
            let (out, state) = drive(&format!("-r\n-17.2\n-150.0\n{}\n-q\n", count));

            assert_eq!(state, SessionState::Terminated);
            assert!(out.contains("Number of sites must be a positive integer"));
            assert!(!out.contains("Enter the energy for adsorption site"));
        }
    }

    #[test]
    fn test_non_integer_site_count_skips_site_prompts() {
        let (out, _) = drive("-r\n-17.2\n-150.0\ntwo\n-q\n");

        assert!(out.contains("number of sites"));
        assert!(!out.contains("Enter the energy for adsorption site"));
    }

    #[test]
    fn test_invalid_command_keeps_loop_active() {
        let (out, state) = drive("calculate\n-x\n-q\n");

        assert_eq!(state, SessionState::Terminated);
        assert_eq!(out.matches("Invalid command.").count(), 2);
        assert_eq!(out.matches("Command: ").count(), 3);
    }

    #[test]
    fn test_help_is_static() {
        let (out, state) = drive("-h\n--help\n-q\n");

        assert_eq!(state, SessionState::Terminated);
        assert_eq!(out.matches("E_ads = E_(slab+adsorbate) - (E_slab + E_adsorbate)").count(), 2);
        assert!(out.contains("1 Ry = 13.605693122994 eV"));
        assert!(out.contains("1 eV = 96.485332 kJ/mol"));
    }

    #[test]
    fn test_eof_terminates_session() {
        let (out, state) = drive("");
        assert_eq!(state, SessionState::Terminated);
        assert!(out.contains("Exiting program."));
    }

    #[test]
    fn test_eof_inside_run_is_reported() {
        let (out, state) = drive("-r\n-17.2\n");

        assert_eq!(state, SessionState::Terminated);
        assert!(out.contains("Input ended while waiting for slab energy"));
    }

    /// 以原始字节驱动会话
    fn drive_bytes(input: &[u8]) -> (String, SessionState) {
        let mut out = Vec::new();
        let state = {
            let mut session = Session::new(Cursor::new(input.to_vec()), &mut out);
            session.run().unwrap();
            session.state()
        };
        (String::from_utf8(out).unwrap(), state)
    }

    #[test]
    fn test_huge_site_count_does_not_preallocate() {
        let (out, state) = drive("-r\n-1\n-1\n9223372036854775807\nnope\n-q\n");

        assert_eq!(state, SessionState::Terminated);
        assert!(out.contains("Enter the energy for adsorption site 1"));
        assert!(out.contains("site 1 energy"));
        assert!(!out.contains("Adsorption Energies:"));
        assert!(out.ends_with("Exiting program.\n"));
    }

    #[test]
    fn test_non_utf8_energy_aborts_run_only() {
        let (out, state) = drive_bytes(b"-r\n\xff\xfe\n-q\n");

        assert_eq!(state, SessionState::Terminated);
        assert!(out.contains("Input for adsorbate energy is not valid UTF-8 text"));
        assert!(!out.contains("Enter the energy of the clean slab"));
        assert!(out.ends_with("Exiting program.\n"));
    }

    #[test]
    fn test_non_utf8_command_is_invalid() {
        let (out, state) = drive_bytes(b"\xff\n-q\n");

        assert_eq!(state, SessionState::Terminated);
        assert_eq!(out.matches("Invalid command.").count(), 1);
        assert!(out.ends_with("Exiting program.\n"));
    }

    #[test]
    fn test_write_failure_ends_session() {
        struct ClosedPipe;
        impl Write for ClosedPipe {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut session = Session::new(Cursor::new(b"-q\n".to_vec()), ClosedPipe);
        let err = session.run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Console);
    }

    #[test]
    fn test_step_leaves_session_awaiting_after_error() {
        let mut out = Vec::new();
        let mut session = Session::new(Cursor::new(b"-r\nxyz\n".to_vec()), &mut out);

        session.step().unwrap();
        assert_eq!(session.state(), SessionState::AwaitingCommand);
    }
}
