//! calamineのセル値から共通の `Cell` への変換

use boq_match_common::Cell;
use calamine::{Data, Range};

/// セル値を変換する（エラー値は空セル扱い）
pub fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        other => Cell::Text(other.to_string()),
    }
}

/// シート範囲をA1起点の2次元配列に変換する
///
/// calamineの範囲は最初の非空セルから始まるため、
/// 行番号・列番号がシート上の位置と一致するよう先頭を空セルで埋める。
pub fn range_to_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let (start_row, start_col) = match range.start() {
        Some(start) => start,
        None => return Vec::new(),
    };

    let mut rows: Vec<Vec<Cell>> = (0..start_row).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(to_cell));
        rows.push(cells);
    }
    rows
}
