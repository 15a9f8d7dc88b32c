//! 表計算ファイル読み込みモジュール
//!
//! - 単価表: 全シートを走査し、見出し行のあるシートの行を連結
//! - 入力BoQ: 先頭シートのみ。見出し行がなければ ParseError
//!
//! 読み込んだセルは `boq_match_common::Cell` に変換し、
//! 見出し検出・行抽出は共通ライブラリに任せる。

mod cell;

pub use cell::{range_to_rows, to_cell};

use crate::error::{BoqMatchError, Result};
use boq_match_common::{
    detect_header, extract_rows, header::extract_sheet, matcher, Cell, ExtractedRow, HeaderLocation,
    MatchOptions, MatchResult, NormalizeOptions, PriceListEntry, RateTable,
};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Reader, Sheets};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info, warn};

/// 1シート分のセル
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

/// 入力BoQシート
///
/// 抽出した行に加え、元のセルと見出し位置を保持する（追記エクスポート用）。
#[derive(Debug, Clone)]
pub struct InputSheet {
    pub sheet: SheetData,
    pub header: HeaderLocation,
    pub rows: Vec<ExtractedRow>,
}

fn read_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Vec<SheetData>> {
    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());

    for name in names {
        let range = workbook.worksheet_range(&name)?;
        let rows = range_to_rows(&range);
        debug!(sheet = %name, rows = rows.len(), "シート読み込み");
        sheets.push(SheetData { name, rows });
    }

    Ok(sheets)
}

/// ファイルから全シートを読み込む（xlsx/xls/ods）
pub fn read_workbook(path: &Path) -> Result<Vec<SheetData>> {
    if !path.exists() {
        return Err(BoqMatchError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)?;
    read_sheets(&mut workbook)
}

/// メモリ上のバイト列から全シートを読み込む（アップロードされたファイル向け）
pub fn read_workbook_bytes(bytes: &[u8]) -> Result<Vec<SheetData>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    read_sheets(&mut workbook)
}

/// 単価表のシート群から行を抽出する
///
/// 見出し行のないシートは警告を出してスキップする（エラーにしない）。
pub fn price_rows_from_sheets(sheets: &[SheetData]) -> Vec<ExtractedRow> {
    let mut rows = Vec::new();

    for sheet in sheets {
        match detect_header(&sheet.rows) {
            Ok(header) => {
                let extracted = extract_rows(&sheet.rows, header.header_row_index, &header.column_map);
                debug!(
                    sheet = %sheet.name,
                    header_row = header.header_row_index,
                    items = extracted.len(),
                    "単価表シート解析"
                );
                rows.extend(extracted);
            }
            Err(e) => {
                warn!(sheet = %sheet.name, error = %e, "見出し行がないためシートをスキップ");
            }
        }
    }

    rows
}

/// 単価表ファイルから行を読み込む
pub fn load_price_rows(path: &Path) -> Result<Vec<ExtractedRow>> {
    let sheets = read_workbook(path)?;
    Ok(price_rows_from_sheets(&sheets))
}

/// 単価表ファイルを読み込み、正規化済みの単価表を返す
pub fn load_price_list(path: &Path, options: &NormalizeOptions) -> Result<Vec<PriceListEntry>> {
    let rows = load_price_rows(path)?;
    let entries = matcher::build_price_list(&rows, options);
    info!(path = %path.display(), items = entries.len(), "単価表読み込み完了");
    Ok(entries)
}

/// 先頭シートを入力BoQとして解析する
pub fn input_from_sheets(sheets: Vec<SheetData>) -> Result<InputSheet> {
    let sheet = sheets
        .into_iter()
        .next()
        .ok_or_else(|| BoqMatchError::Parse("ブックにシートがありません".into()))?;

    let (header, rows) = extract_sheet(&sheet.rows)
        .map_err(|e| BoqMatchError::Parse(format!("シート「{}」: {}", sheet.name, e)))?;

    debug!(
        sheet = %sheet.name,
        header_row = header.header_row_index,
        items = rows.len(),
        "入力シート解析"
    );

    Ok(InputSheet { sheet, header, rows })
}

/// アップロードされたバイト列から入力BoQを解析する
pub fn parse_input(bytes: &[u8]) -> Result<InputSheet> {
    input_from_sheets(read_workbook_bytes(bytes)?)
}

/// ファイルから入力BoQを解析する
pub fn parse_input_file(path: &Path) -> Result<InputSheet> {
    input_from_sheets(read_workbook(path)?)
}

/// 単価表ファイルとアップロードされた入力BoQを照合する
pub fn match_files(
    price_path: &Path,
    input_bytes: &[u8],
    top_k: usize,
    options: &MatchOptions,
) -> Result<Vec<MatchResult>> {
    let price_rows = load_price_rows(price_path)?;
    info!(items = price_rows.len(), "単価表の項目数");

    let input = parse_input(input_bytes)?;
    info!(items = input.rows.len(), "入力BoQの項目数");

    Ok(matcher::match_rows(&input.rows, &price_rows, top_k, options))
}

/// シートごとの見出し検出結果
pub fn describe_headers(path: &Path) -> Result<Vec<(String, Option<HeaderLocation>)>> {
    let sheets = read_workbook(path)?;
    Ok(sheets
        .into_iter()
        .map(|sheet| {
            let header = detect_header(&sheet.rows).ok();
            (sheet.name, header)
        })
        .collect())
}

/// 単価ファイル（先頭シート、A列=コード、B列=単価）を読み込む
pub fn read_rate_table(path: &Path) -> Result<RateTable> {
    let sheets = read_workbook(path)?;
    let sheet = sheets
        .first()
        .ok_or_else(|| BoqMatchError::Parse("ブックにシートがありません".into()))?;
    Ok(RateTable::from_rows(&sheet.rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, rows: Vec<Vec<&str>>) -> SheetData {
        SheetData {
            name: name.to_string(),
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(Cell::from).collect())
                .collect(),
        }
    }

    #[test]
    fn test_price_rows_skip_sheets_without_header() {
        let sheets = vec![
            sheet("Cover", vec![vec!["Tender price list"], vec!["Rev 2"]]),
            sheet(
                "Civil",
                vec![
                    vec!["Code", "Description", "Unit", "Rate"],
                    vec!["C1", "Excavation", "m3", "12"],
                ],
            ),
            sheet(
                "Steel",
                vec![
                    vec!["Steel works"],
                    vec!["Ref", "Details", "UOM", "Price"],
                    vec!["S1", "Steel beam 200mm", "m", "50"],
                    vec!["S2", "", "m", "60"],
                ],
            ),
        ];

        let rows = price_rows_from_sheets(&sheets);
        let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["C1", "S1"]);
        assert_eq!(rows[1].unit, "m");
        assert_eq!(rows[1].rate, Some(50.0));
    }

    #[test]
    fn test_input_from_sheets_uses_first_sheet() {
        let sheets = vec![
            sheet("BoQ", vec![vec!["Description", "Qty", "Rate"], vec!["Concrete", "3", ""]]),
            sheet("Other", vec![vec!["Description", "Rate"], vec!["Ignored", "1"]]),
        ];

        let input = input_from_sheets(sheets).unwrap();
        assert_eq!(input.sheet.name, "BoQ");
        assert_eq!(input.rows.len(), 1);
        assert_eq!(input.rows[0].quantity, 3.0);
    }

    #[test]
    fn test_input_from_sheets_without_header_is_parse_error() {
        let sheets = vec![sheet("BoQ", vec![vec!["Item", "Qty"], vec!["Concrete", "3"]])];
        let err = input_from_sheets(sheets).unwrap_err();
        assert!(matches!(err, BoqMatchError::Parse(_)));
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_input_from_no_sheets() {
        assert!(matches!(input_from_sheets(vec![]), Err(BoqMatchError::Parse(_))));
    }

    #[test]
    fn test_read_workbook_missing_file() {
        let err = read_workbook(Path::new("/nonexistent/price-list.xlsx")).unwrap_err();
        assert!(matches!(err, BoqMatchError::FileNotFound(_)));
    }

    #[test]
    fn test_read_workbook_bytes_garbage() {
        let err = read_workbook_bytes(b"not a spreadsheet").unwrap_err();
        assert!(err.is_parse_error());
    }
}
