//! 照合処理の型定義
//!
//! CLIとライブラリ利用側で共有される型:
//! - Cell / ExtractedRow: 表データとヘッダー解析後の行
//! - PriceListEntry / InputLineItem: 照合の入力（正規化済み説明文を保持）
//! - MatchCandidate: ランキング途中の候補
//! - MatchResult / MatchRecord: 最終出力（JSON化される）

use crate::normalizer::{normalize, NormalizeOptions};
use serde::{Deserialize, Serialize};

/// 表計算セルの値
///
/// 読み込み元（xlsx等）に依存しない最小限の表現。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// 前後空白を除いた文字列表現
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Number(n) => format_number(*n),
        }
    }

    /// 数値として解釈する（桁区切りのカンマは無視）
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => {
                let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
                if cleaned.is_empty() {
                    return None;
                }
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }

    /// 空セル、または空白のみの文字列
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Number(n as f64)
    }
}

/// 整数値の浮動小数は ".0" なしで表示（コード列が数値で入っている場合向け）
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// ヘッダー解析後の1行
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRow {
    /// シート内の行番号（0始まり、エクスポート時に元の行へ書き戻すため）
    pub row_index: usize,
    pub code: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub rate: Option<f64>,
}

/// 単価表の1項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceListEntry {
    pub code: String,
    pub description: String,
    pub unit: String,
    pub rate: Option<f64>,
    pub normalized_description: String,
}

impl PriceListEntry {
    /// 説明文が空の場合は None（単価表に載せない）
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
        rate: Option<f64>,
        options: &NormalizeOptions,
    ) -> Option<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return None;
        }
        let normalized_description = normalize(&description, options);
        Some(Self {
            code: code.into(),
            description,
            unit: unit.into(),
            rate,
            normalized_description,
        })
    }

    pub fn from_row(row: &ExtractedRow, options: &NormalizeOptions) -> Option<Self> {
        Self::new(
            row.code.clone(),
            row.description.clone(),
            row.unit.clone(),
            row.rate,
            options,
        )
    }
}

/// 入力BoQの1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputLineItem {
    pub description: String,
    pub quantity: f64,
    pub normalized_description: String,
}

impl InputLineItem {
    pub fn new(description: impl Into<String>, quantity: f64, options: &NormalizeOptions) -> Self {
        let description = description.into();
        let normalized_description = normalize(&description, options);
        Self {
            description,
            quantity,
            normalized_description,
        }
    }

    pub fn from_row(row: &ExtractedRow, options: &NormalizeOptions) -> Self {
        Self::new(row.description.clone(), row.quantity, options)
    }
}

/// ランキング途中の候補
#[derive(Debug, Clone, Copy)]
pub struct MatchCandidate<'a> {
    pub source_entry: &'a PriceListEntry,
    /// 0.0〜1.0（丸め前）
    pub score: f64,
}

/// 照合結果の1候補
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub code: String,
    pub description: String,
    pub unit: String,
    pub unit_rate: Option<f64>,
    pub confidence: f64,
}

impl MatchRecord {
    pub fn from_entry(entry: &PriceListEntry, score: f64) -> Self {
        Self {
            code: entry.code.clone(),
            description: entry.description.clone(),
            unit: entry.unit.clone(),
            unit_rate: entry.rate,
            confidence: round_confidence(score),
        }
    }
}

/// 入力1行に対する照合結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub input_description: String,
    pub quantity: f64,
    pub matches: Vec<MatchRecord>,
}

impl MatchResult {
    /// 最上位の候補
    pub fn best(&self) -> Option<&MatchRecord> {
        self.matches.first()
    }
}

/// 外部出力用に小数第3位で丸める
pub fn round_confidence(score: f64) -> f64 {
    // -0.0 は 0.0 にそろえる
    (score * 1000.0).round() / 1000.0 + 0.0
}
