//! BoQ単価付け
//!
//! - 単価表（コード→単価）による単価・金額の設定
//! - 顧客BoQと社内BoQのマージ
//! - 照合結果からの単価付きBoQ生成

use crate::types::{Cell, MatchResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// BoQの1項目
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoqItem {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "qty")]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default, alias = "unit_rate")]
    pub unit_rate: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    /// 社内BoQにも同じコードがあった
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

/// コード→単価の表
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// 表データから作成
    ///
    /// 1行目は見出しとしてスキップ。A列=コード、B列=単価（空・不正は0）。
    pub fn from_rows(rows: &[Vec<Cell>]) -> Self {
        let mut rates = HashMap::new();
        for row in rows.iter().skip(1) {
            let code = row.first().map(Cell::as_text).unwrap_or_default();
            if code.is_empty() {
                continue;
            }
            let rate = row.get(1).and_then(Cell::as_number).unwrap_or(0.0);
            rates.insert(code, rate);
        }
        Self { rates }
    }

    pub fn insert(&mut self, code: impl Into<String>, rate: f64) {
        self.rates.insert(code.into(), rate);
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

fn line_total(unit_rate: Option<f64>, quantity: Option<f64>) -> Option<f64> {
    match (unit_rate, quantity) {
        (Some(rate), Some(qty)) => Some(rate * qty),
        _ => None,
    }
}

/// 単価と金額を設定する
///
/// 項目に単価があればそれを優先し、なければ単価表から引く。
pub fn apply_rates(items: &[BoqItem], table: &RateTable) -> Vec<BoqItem> {
    items
        .iter()
        .map(|item| {
            let unit_rate = item.unit_rate.or_else(|| table.get(&item.code));
            BoqItem {
                unit_rate,
                total: line_total(unit_rate, item.quantity),
                ..item.clone()
            }
        })
        .collect()
}

/// 顧客BoQと社内BoQをマージする
///
/// 顧客側の順序を保ち、社内側に同じコードがあれば `duplicate` を立てて社内側を消費する。
/// 消費されなかった社内側の項目を末尾に追加する。
pub fn merge_boq(client: &[BoqItem], system: &[BoqItem]) -> Vec<BoqItem> {
    // 社内側はコードで重複排除（後勝ち、位置は最初の出現）
    let mut remaining: Vec<Option<BoqItem>> = Vec::with_capacity(system.len());
    let mut index_by_code: HashMap<&str, usize> = HashMap::new();
    for item in system {
        match index_by_code.get(item.code.as_str()) {
            Some(&i) => remaining[i] = Some(item.clone()),
            None => {
                index_by_code.insert(item.code.as_str(), remaining.len());
                remaining.push(Some(item.clone()));
            }
        }
    }

    let mut merged = Vec::with_capacity(client.len() + remaining.len());
    for item in client {
        let consumed = index_by_code
            .get(item.code.as_str())
            .and_then(|&i| remaining[i].take())
            .is_some();
        merged.push(BoqItem {
            duplicate: consumed,
            ..item.clone()
        });
    }

    merged.extend(remaining.into_iter().flatten());
    merged
}

/// 照合結果から単価付きBoQを作る（各行の最上位候補を採用）
pub fn boq_from_matches(results: &[MatchResult]) -> Vec<BoqItem> {
    results
        .iter()
        .map(|result| {
            let best = result.best();
            let unit_rate = best.and_then(|m| m.unit_rate);
            let quantity = Some(result.quantity);
            BoqItem {
                code: best.map(|m| m.code.clone()).unwrap_or_default(),
                description: result.input_description.clone(),
                quantity,
                unit: best.map(|m| m.unit.clone()).unwrap_or_default(),
                unit_rate,
                total: line_total(unit_rate, quantity),
                duplicate: false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchRecord;

    fn item(code: &str, quantity: Option<f64>, unit_rate: Option<f64>) -> BoqItem {
        BoqItem {
            code: code.to_string(),
            description: format!("item {}", code),
            quantity,
            unit_rate,
            ..Default::default()
        }
    }

    #[test]
    fn test_rate_table_from_rows() {
        let rows = vec![
            vec![Cell::from("Code"), Cell::from("Rate")],
            vec![Cell::from("A1"), Cell::Number(12.5)],
            vec![Cell::from(" B2 "), Cell::Empty],
            vec![Cell::Empty, Cell::Number(99.0)],
        ];
        let table = RateTable::from_rows(&rows);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("A1"), Some(12.5));
        assert_eq!(table.get("B2"), Some(0.0));
        assert_eq!(table.get("C3"), None);
    }

    #[test]
    fn test_apply_rates() {
        let mut table = RateTable::default();
        table.insert("A1", 10.0);
        table.insert("B2", 4.0);

        let items = vec![
            item("A1", Some(3.0), None),
            item("B2", Some(2.0), Some(5.0)),
            item("C3", Some(1.0), None),
            item("A1", None, None),
        ];
        let priced = apply_rates(&items, &table);

        assert_eq!(priced[0].unit_rate, Some(10.0));
        assert_eq!(priced[0].total, Some(30.0));
        // 項目側の単価を優先
        assert_eq!(priced[1].unit_rate, Some(5.0));
        assert_eq!(priced[1].total, Some(10.0));
        assert_eq!(priced[2].unit_rate, None);
        assert_eq!(priced[2].total, None);
        assert_eq!(priced[3].unit_rate, Some(10.0));
        assert_eq!(priced[3].total, None);
    }

    #[test]
    fn test_merge_boq() {
        let client = vec![item("A", None, None), item("B", None, None)];
        let system = vec![item("B", None, Some(1.0)), item("C", None, None)];

        let merged = merge_boq(&client, &system);
        let codes: Vec<&str> = merged.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
        assert!(!merged[0].duplicate);
        assert!(merged[1].duplicate);
        // 顧客側の項目がそのまま残る
        assert_eq!(merged[1].unit_rate, None);
        assert!(!merged[2].duplicate);
    }

    #[test]
    fn test_merge_boq_duplicate_client_codes() {
        let client = vec![item("A", None, None), item("A", None, None)];
        let system = vec![item("A", None, None)];

        let merged = merge_boq(&client, &system);
        assert_eq!(merged.len(), 2);
        assert!(merged[0].duplicate);
        assert!(!merged[1].duplicate);
    }

    #[test]
    fn test_boq_item_accepts_snake_case_aliases() {
        let json = r#"{"code":"A1","description":"Beam","qty":2,"unit_rate":3.5}"#;
        let parsed: BoqItem = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.quantity, Some(2.0));
        assert_eq!(parsed.unit_rate, Some(3.5));
    }

    #[test]
    fn test_boq_from_matches() {
        let results = vec![
            MatchResult {
                input_description: "steel beam".into(),
                quantity: 4.0,
                matches: vec![MatchRecord {
                    code: "A1".into(),
                    description: "Steel beam 200mm".into(),
                    unit: "m".into(),
                    unit_rate: Some(50.0),
                    confidence: 0.9,
                }],
            },
            MatchResult {
                input_description: "unknown".into(),
                quantity: 1.0,
                matches: vec![],
            },
        ];

        let boq = boq_from_matches(&results);
        assert_eq!(boq[0].code, "A1");
        assert_eq!(boq[0].total, Some(200.0));
        assert_eq!(boq[1].code, "");
        assert_eq!(boq[1].unit_rate, None);
        assert_eq!(boq[1].total, None);
    }
}
