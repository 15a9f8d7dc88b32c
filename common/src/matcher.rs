//! 単価表照合エンジン
//!
//! 入力BoQの各行について、単価表の全項目との総合スコアを計算し、
//! 上位K件を返す。
//!
//! 計算量は O(入力行数 × 単価表行数 × 説明文長²)。編集距離が支配的。
//! BoQは数百行程度が前提のため、これ以上の最適化はしていない。

use crate::normalizer::NormalizeOptions;
use crate::similarity::combined_score;
use crate::types::{ExtractedRow, InputLineItem, MatchCandidate, MatchRecord, MatchResult, PriceListEntry};
use serde::{Deserialize, Serialize};

/// 1行あたりの候補数（デフォルト）
pub const DEFAULT_TOP_K: usize = 4;

/// 照合オプション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOptions {
    pub normalize: NormalizeOptions,
    /// トークン集合比を総合スコアに含める
    pub use_token_set_ratio: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            use_token_set_ratio: true,
        }
    }
}

/// 1行分の候補をスコア降順に並べる
///
/// 同点は単価表の元の順序を保つ（安定ソート）。
pub fn rank_candidates<'a>(
    input: &InputLineItem,
    prices: &'a [PriceListEntry],
    use_token_set_ratio: bool,
) -> Vec<MatchCandidate<'a>> {
    let mut candidates: Vec<MatchCandidate<'a>> = prices
        .iter()
        .map(|entry| MatchCandidate {
            source_entry: entry,
            score: combined_score(
                &input.normalized_description,
                &entry.normalized_description,
                use_token_set_ratio,
            ),
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    candidates
}

/// 入力行ごとに上位 `top_k` 件の候補を返す
///
/// 結果は入力と同じ順序。単価表が空なら全行の `matches` が空になる。
pub fn match_items(
    inputs: &[InputLineItem],
    prices: &[PriceListEntry],
    top_k: usize,
    options: &MatchOptions,
) -> Vec<MatchResult> {
    inputs
        .iter()
        .map(|input| {
            let matches = rank_candidates(input, prices, options.use_token_set_ratio)
                .into_iter()
                .take(top_k)
                .map(|c| MatchRecord::from_entry(c.source_entry, c.score))
                .collect();

            MatchResult {
                input_description: input.description.clone(),
                quantity: input.quantity,
                matches,
            }
        })
        .collect()
}

/// 抽出済みの行から単価表を作る（説明文の正規化は1回だけ）
pub fn build_price_list(rows: &[ExtractedRow], options: &NormalizeOptions) -> Vec<PriceListEntry> {
    rows.iter()
        .filter_map(|row| PriceListEntry::from_row(row, options))
        .collect()
}

/// 抽出済みの行から入力行を作る
pub fn build_inputs(rows: &[ExtractedRow], options: &NormalizeOptions) -> Vec<InputLineItem> {
    rows.iter()
        .map(|row| InputLineItem::from_row(row, options))
        .collect()
}

/// 抽出済みの行同士を照合する
pub fn match_rows(
    input_rows: &[ExtractedRow],
    price_rows: &[ExtractedRow],
    top_k: usize,
    options: &MatchOptions,
) -> Vec<MatchResult> {
    let prices = build_price_list(price_rows, &options.normalize);
    let inputs = build_inputs(input_rows, &options.normalize);
    match_items(&inputs, &prices, top_k, options)
}
