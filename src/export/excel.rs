//! 照合結果付きExcel生成
//!
//! 入力シートのセルをそのまま写し、見出し行の右側に照合列を追加する。
//! 元の単価セルが空なら照合した単価で埋める。

use crate::error::Result;
use crate::spreadsheet::InputSheet;
use boq_match_common::{Cell, MatchResult};
use rust_xlsxwriter::*;
use std::path::Path;

/// 追加する列の見出し
pub const APPENDED_HEADERS: [&str; 4] = ["Matched Code", "Matched Description", "Unit Rate", "Similarity Score"];

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Empty => {}
        Cell::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        Cell::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Cell::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
    }
    Ok(())
}

/// 照合結果付きのブックを作る
///
/// `results` は `input.rows` と同じ順序・件数であること。
pub fn build_workbook(input: &InputSheet, results: &[MatchResult]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold().set_background_color(Color::RGB(0xDDEBF7));

    let worksheet = workbook.add_worksheet();
    if !input.sheet.name.is_empty() {
        worksheet.set_name(&input.sheet.name)?;
    }

    // 元のセル
    for (r, cells) in input.sheet.rows.iter().enumerate() {
        for (c, cell) in cells.iter().enumerate() {
            write_cell(worksheet, r as u32, c as u16, cell)?;
        }
    }

    // 追加列は全行の右端の次から
    let first_col = input.sheet.rows.iter().map(Vec::len).max().unwrap_or(0) as u16;
    let header_row = input.header.header_row_index as u32;
    for (i, title) in APPENDED_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(header_row, first_col + i as u16, *title, &header_format)?;
    }

    let rate_col = input.header.column_map.rate;

    for (row, result) in input.rows.iter().zip(results) {
        let Some(best) = result.best() else {
            continue;
        };
        let r = row.row_index as u32;

        worksheet.write_string(r, first_col, &best.code)?;
        worksheet.write_string(r, first_col + 1, &best.description)?;
        if let Some(rate) = best.unit_rate {
            worksheet.write_number(r, first_col + 2, rate)?;

            // 元の単価セルが空なら埋める
            if let Some(c) = rate_col {
                let original_blank = input
                    .sheet
                    .rows
                    .get(row.row_index)
                    .and_then(|cells| cells.get(c))
                    .map_or(true, Cell::is_blank);
                if original_blank {
                    worksheet.write_number(r, c as u16, rate)?;
                }
            }
        }
        worksheet.write_number(r, first_col + 3, best.confidence)?;
    }

    worksheet.set_column_width(first_col + 1, 40)?;

    Ok(workbook)
}

/// バッファに生成
pub fn generate_excel_buffer(input: &InputSheet, results: &[MatchResult]) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(input, results)?;
    Ok(workbook.save_to_buffer()?)
}

/// ファイルに生成
pub fn generate_excel(input: &InputSheet, results: &[MatchResult], output_path: &Path) -> Result<()> {
    let mut workbook = build_workbook(input, results)?;
    workbook.save(output_path)?;
    Ok(())
}
