//! 埋め込みプロバイダモジュール
//!
//! 説明文をベクトル化する外部サービスの境界。
//! 照合側は `EmbeddingProvider` トレイトだけを知っていればよい。
//!
//! - `cohere`: Cohere互換のHTTP埋め込みAPI（リトライ付き）

pub mod cohere;

pub use cohere::CohereProvider;

use crate::error::{BoqMatchError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// 埋め込みの用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedPurpose {
    /// 単価表側（検索される文書）
    Document,
    /// 入力BoQ側（検索クエリ）
    Query,
}

impl EmbedPurpose {
    pub fn as_input_type(&self) -> &'static str {
        match self {
            EmbedPurpose::Document => "search_document",
            EmbedPurpose::Query => "search_query",
        }
    }
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// テキスト列を同じ順序のベクトル列に変換する
    async fn embed(&self, texts: &[String], purpose: EmbedPurpose) -> Result<Vec<Vec<f32>>>;
}

/// ベクトルの次元を確認して返す
///
/// 空のベクトルや次元の揃わないベクトルが混じっていればエラー。
/// 空の列は次元0として扱う。
pub fn check_dimensions(vectors: &[Vec<f32>]) -> Result<usize> {
    let Some(first) = vectors.first() else {
        return Ok(0);
    };
    let dim = first.len();

    for (i, v) in vectors.iter().enumerate() {
        if v.is_empty() {
            return Err(BoqMatchError::EmbeddingProvider(format!("{}番目の埋め込みが空です", i + 1)));
        }
        if v.len() != dim {
            return Err(BoqMatchError::EmbeddingProvider(format!(
                "埋め込みの次元が揃っていません: {}次元と{}次元",
                dim,
                v.len()
            )));
        }
    }

    Ok(dim)
}

/// 固定サイズのバッチに分けて順番に埋め込む
///
/// バッチごとにタイムアウトを掛け、1バッチでも失敗すれば全体を中断する。
/// 返却件数が送信件数と一致しない場合や、次元が揃わない場合もエラー。
/// `timeout` はプロバイダ側のリトライを含めたバッチ全体の上限。
pub async fn embed_in_batches(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    purpose: EmbedPurpose,
    batch_size: usize,
    timeout: Duration,
) -> Result<Vec<Vec<f32>>> {
    if batch_size == 0 {
        return Err(BoqMatchError::Config("バッチサイズは1以上で指定してください".into()));
    }

    let mut vectors = Vec::with_capacity(texts.len());

    for (i, chunk) in texts.chunks(batch_size).enumerate() {
        debug!(batch = i + 1, size = chunk.len(), purpose = purpose.as_input_type(), "埋め込みバッチ送信");

        let batch = tokio::time::timeout(timeout, provider.embed(chunk, purpose))
            .await
            .map_err(|_| {
                BoqMatchError::EmbeddingProvider(format!(
                    "バッチ{}がタイムアウトしました（{:.1}秒）",
                    i + 1,
                    timeout.as_secs_f64()
                ))
            })??;

        if batch.len() != chunk.len() {
            return Err(BoqMatchError::EmbeddingProvider(format!(
                "埋め込み件数が一致しません: 送信{}件, 受信{}件",
                chunk.len(),
                batch.len()
            )));
        }

        vectors.extend(batch);
    }

    check_dimensions(&vectors)?;
    Ok(vectors)
}
