//! ヘッダー行検出と行抽出
//!
//! 表データ（セルの2次元配列）から見出し行を探し、
//! 列の役割（コード・説明・数量・単価・単位）を決めて型付きの行に変換する。
//!
//! 見出し行の上にタイトル行が何行あってもよい。上から走査し、
//! 説明列と単価列の両方を含む最初の行を見出しとみなす。

use crate::error::{Error, Result};
use crate::types::{Cell, ExtractedRow};
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static::lazy_static! {
    static ref CODE_RE: Regex = Regex::new(r"(?i)(code|item|ref|id)").unwrap();
    static ref DESCRIPTION_RE: Regex = Regex::new(r"(?i)(description|desc|details)").unwrap();
    static ref QUANTITY_RE: Regex = Regex::new(r"(?i)(qty|quantity|amount)").unwrap();
    static ref RATE_RE: Regex = Regex::new(r"(?i)(rate|price|unit\s*price|unit\s*rate)").unwrap();
    static ref UNIT_RE: Regex = Regex::new(r"(?i)(unit|uom)").unwrap();
}

/// 列の役割ごとの列番号（該当なしは None）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMap {
    pub code: Option<usize>,
    pub description: Option<usize>,
    pub quantity: Option<usize>,
    pub rate: Option<usize>,
    pub unit: Option<usize>,
}

impl ColumnMap {
    /// 見出しセルから列の役割を決める
    ///
    /// 役割ごとに独立して判定し、最初に一致した列を採用する。
    pub fn resolve(header: &[Cell]) -> Self {
        let texts: Vec<String> = header.iter().map(Cell::as_text).collect();
        let find = |re: &Regex| texts.iter().position(|t| re.is_match(t));

        Self {
            code: find(&*CODE_RE),
            description: find(&*DESCRIPTION_RE),
            quantity: find(&*QUANTITY_RE),
            rate: find(&*RATE_RE),
            unit: find(&*UNIT_RE),
        }
    }
}

/// 見出し行の位置と列構成
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderLocation {
    pub header_row_index: usize,
    pub column_map: ColumnMap,
}

/// 見出し行らしいか判定（説明列と単価列の両方を含む）
pub fn is_header_row(row: &[Cell]) -> bool {
    let texts: Vec<String> = row.iter().map(Cell::as_text).collect();
    texts.iter().any(|t| DESCRIPTION_RE.is_match(t)) && texts.iter().any(|t| RATE_RE.is_match(t))
}

/// 見出し行を検出する
///
/// # Returns
/// * `Ok(HeaderLocation)` - 最初に条件を満たした行
/// * `Err(Error::Parse)` - シート全体に見出し行がない
pub fn detect_header(rows: &[Vec<Cell>]) -> Result<HeaderLocation> {
    rows.iter()
        .position(|row| is_header_row(row))
        .map(|index| HeaderLocation {
            header_row_index: index,
            column_map: ColumnMap::resolve(&rows[index]),
        })
        .ok_or_else(|| {
            Error::Parse(format!(
                "no header row with description and rate columns in {} rows",
                rows.len()
            ))
        })
}

fn cell_at(row: &[Cell], index: Option<usize>) -> Option<&Cell> {
    index.and_then(|i| row.get(i))
}

/// 見出し行より下の行を型付きの行に変換する
///
/// - 全セルが空の行はスキップ
/// - 説明が空の行はスキップ
/// - 数量は数値化できなければ0、単価は数値化できなければ None
pub fn extract_rows(rows: &[Vec<Cell>], header_index: usize, columns: &ColumnMap) -> Vec<ExtractedRow> {
    rows.iter()
        .enumerate()
        .skip(header_index + 1)
        .filter(|(_, row)| !row.iter().all(Cell::is_blank))
        .filter_map(|(row_index, row)| {
            let description = cell_at(row, columns.description)
                .map(Cell::as_text)
                .unwrap_or_default();
            if description.is_empty() {
                return None;
            }

            Some(ExtractedRow {
                row_index,
                code: cell_at(row, columns.code).map(Cell::as_text).unwrap_or_default(),
                description,
                quantity: cell_at(row, columns.quantity)
                    .and_then(Cell::as_number)
                    .unwrap_or(0.0),
                unit: cell_at(row, columns.unit).map(Cell::as_text).unwrap_or_default(),
                rate: cell_at(row, columns.rate).and_then(Cell::as_number),
            })
        })
        .collect()
}

/// 見出し検出と行抽出をまとめて行う
pub fn extract_sheet(rows: &[Vec<Cell>]) -> Result<(HeaderLocation, Vec<ExtractedRow>)> {
    let header = detect_header(rows)?;
    let extracted = extract_rows(rows, header.header_row_index, &header.column_map);
    Ok((header, extracted))
}
