//! テスト用の表計算ファイル生成

#![allow(dead_code)]

use boq_match_common::Cell;
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// テスト用セル（文字列はテキスト、数値っぽくても文字列のまま）
pub fn text_rows(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|r| r.iter().map(|s| Cell::from(*s)).collect())
        .collect()
}

pub fn build_workbook(sheets: &[(&str, Vec<Vec<Cell>>)]) -> Workbook {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("シート名設定失敗");
        for (r, cells) in rows.iter().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Cell::Empty => {}
                    Cell::Number(n) => {
                        worksheet.write_number(r, c, *n).expect("書き込み失敗");
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(r, c, *b).expect("書き込み失敗");
                    }
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, s).expect("書き込み失敗");
                    }
                }
            }
        }
    }
    workbook
}

pub fn write_xlsx(path: &Path, sheets: &[(&str, Vec<Vec<Cell>>)]) {
    build_workbook(sheets).save(path).expect("xlsx保存失敗");
}

pub fn xlsx_bytes(sheets: &[(&str, Vec<Vec<Cell>>)]) -> Vec<u8> {
    build_workbook(sheets).save_to_buffer().expect("xlsx生成失敗")
}

/// 単価表（表紙シート + 2シート）
pub fn price_list_sheets() -> Vec<(&'static str, Vec<Vec<Cell>>)> {
    vec![
        ("Cover", text_rows(&[&["Schedule of rates"], &["Revision 3"]])),
        (
            "Steel",
            vec![
                vec![Cell::from("Code"), Cell::from("Description"), Cell::from("Unit"), Cell::from("Rate")],
                vec![Cell::from("A1"), Cell::from("Steel beam 200mm"), Cell::from("m"), Cell::Number(50.0)],
                vec![Cell::from("A2"), Cell::from("Steel column 300mm"), Cell::from("m"), Cell::Number(65.0)],
            ],
        ),
        (
            "Concrete",
            vec![
                vec![Cell::from("Concrete works")],
                vec![Cell::from("Ref"), Cell::from("Details"), Cell::from("UOM"), Cell::from("Price")],
                vec![Cell::from("C1"), Cell::from("R.C.C. slab 150mm thick"), Cell::from("m2"), Cell::Number(80.0)],
                vec![Cell::from("C2"), Cell::from("Plain concrete blinding"), Cell::from("m3"), Cell::Empty],
            ],
        ),
    ]
}

/// 入力BoQ（タイトル行つき、単価列は一部空）
pub fn input_sheets() -> Vec<(&'static str, Vec<Vec<Cell>>)> {
    vec![(
        "BoQ",
        vec![
            vec![Cell::from("Bill No. 1")],
            vec![Cell::from("Item"), Cell::from("Description"), Cell::from("Qty"), Cell::from("Rate")],
            vec![Cell::from("1"), Cell::from("steel beam"), Cell::Number(4.0), Cell::Empty],
            vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty],
            vec![Cell::from("2"), Cell::from("rcc slab"), Cell::from("12"), Cell::Number(75.0)],
        ],
    )]
}
