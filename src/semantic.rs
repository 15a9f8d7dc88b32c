//! 埋め込みベースの照合
//!
//! 説明文を軽く正規化してベクトル化し、コサイン類似度が最大の単価表項目を
//! 1件だけ返す。1バッチでも失敗した場合は結果を一切返さない。

use crate::embedding::{check_dimensions, embed_in_batches, EmbedPurpose, EmbeddingProvider};
use crate::error::{BoqMatchError, Result};
use boq_match_common::{normalize_light, ExtractedRow, MatchRecord, MatchResult, NormalizeOptions, PriceListEntry};
use std::time::Duration;
use tracing::info;

/// L2正規化（ゼロベクトルはそのまま）
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    let divisor = if norm > 0.0 { norm } else { 1.0 };
    for v in vector.iter_mut() {
        *v /= divisor;
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// 最も類似度の高い添字とその値（同点は先勝ち）
fn arg_max(query: &[f32], documents: &[Vec<f32>]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, doc) in documents.iter().enumerate() {
        let score = dot(query, doc);
        match best {
            Some((_, s)) if score <= s => {}
            _ => best = Some((i, score)),
        }
    }
    best
}

/// 埋め込みで入力行と単価表を照合する
///
/// 各入力行に最上位の1件のみを付ける（confidence は -1.0〜1.0）。
/// 単価表が空なら API を呼ばずに全行 `matches: []` を返す。
/// 文書側とクエリ側のベクトル次元が一致しなければエラー。
pub async fn match_semantic(
    inputs: &[ExtractedRow],
    prices: &[ExtractedRow],
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
    timeout: Duration,
) -> Result<Vec<MatchResult>> {
    let options = NormalizeOptions::keep_all();
    let entries: Vec<PriceListEntry> = prices
        .iter()
        .filter_map(|row| PriceListEntry::from_row(row, &options))
        .collect();

    if inputs.is_empty() || entries.is_empty() {
        return Ok(inputs
            .iter()
            .map(|row| MatchResult {
                input_description: row.description.clone(),
                quantity: row.quantity,
                matches: Vec::new(),
            })
            .collect());
    }

    let doc_texts: Vec<String> = entries.iter().map(|e| normalize_light(&e.description)).collect();
    let query_texts: Vec<String> = inputs.iter().map(|r| normalize_light(&r.description)).collect();

    info!(documents = doc_texts.len(), queries = query_texts.len(), "埋め込み照合開始");

    let mut documents =
        embed_in_batches(provider, &doc_texts, EmbedPurpose::Document, batch_size, timeout).await?;
    let mut queries =
        embed_in_batches(provider, &query_texts, EmbedPurpose::Query, batch_size, timeout).await?;

    let doc_dim = check_dimensions(&documents)?;
    let query_dim = check_dimensions(&queries)?;
    if doc_dim != query_dim {
        return Err(BoqMatchError::EmbeddingProvider(format!(
            "単価表と入力で埋め込みの次元が異なります: {}次元と{}次元",
            doc_dim, query_dim
        )));
    }

    documents.iter_mut().for_each(|v| l2_normalize(v));
    queries.iter_mut().for_each(|v| l2_normalize(v));

    let results = inputs
        .iter()
        .zip(&queries)
        .map(|(row, query)| {
            let matches = arg_max(query, &documents)
                .map(|(i, score)| {
                    let score = (score as f64).clamp(-1.0, 1.0);
                    vec![MatchRecord::from_entry(&entries[i], score)]
                })
                .unwrap_or_default();
            MatchResult {
                input_description: row.description.clone(),
                quantity: row.quantity,
                matches,
            }
        })
        .collect();

    Ok(results)
}
