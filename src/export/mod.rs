pub mod excel;

use crate::error::Result;
use crate::spreadsheet::InputSheet;
use boq_match_common::MatchResult;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Excel,
    #[default]
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use json, excel, or both", s)),
        }
    }
}

/// 既定の出力ファイル名（例: Output_03-45-PM_10-18-26.xlsx）
pub fn default_output_name() -> String {
    chrono::Local::now().format("Output_%I-%M-%p_%m-%d-%y.xlsx").to_string()
}

fn output_path_for_format(output: &Path, extension: &str) -> PathBuf {
    if output.is_dir() {
        output.join(default_output_name()).with_extension(extension)
    } else {
        output.with_extension(extension)
    }
}

/// JSONを整形して書き出す
pub fn write_json<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(output_path, json)?;
    Ok(())
}

/// 照合結果を指定形式で書き出し、書き出したパスを返す
pub fn export_results(
    results: &[MatchResult],
    input: &InputSheet,
    format: ExportFormat,
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if matches!(format, ExportFormat::Json | ExportFormat::Both) {
        let path = output_path_for_format(output, "json");
        println!("- JSONを生成中...");
        write_json(results, &path)?;
        println!("✔ JSON出力: {}", path.display());
        written.push(path);
    }

    if matches!(format, ExportFormat::Excel | ExportFormat::Both) {
        let path = output_path_for_format(output, "xlsx");
        println!("- Excelを生成中...");
        excel::generate_excel(input, results, &path)?;
        println!("✔ Excel出力: {}", path.display());
        written.push(path);
    }

    Ok(written)
}
