//! 埋め込み照合の統合テスト
//!
//! 外部APIの代わりにプロセス内のモックプロバイダを使う

use async_trait::async_trait;
use boq_match::embedding::{EmbedPurpose, EmbeddingProvider};
use boq_match::error::{BoqMatchError, Result};
use boq_match::semantic::match_semantic;
use boq_match_common::ExtractedRow;
use std::sync::Mutex;
use std::time::Duration;

const VOCABULARY: &[&str] = &["steel", "beam", "column", "rcc", "slab", "concrete", "paint"];

/// 語彙の出現回数をベクトルにするモック
#[derive(Default)]
struct BagOfWordsProvider {
    calls: Mutex<Vec<(EmbedPurpose, Vec<String>)>>,
}

#[async_trait]
impl EmbeddingProvider for BagOfWordsProvider {
    async fn embed(&self, texts: &[String], purpose: EmbedPurpose) -> Result<Vec<Vec<f32>>> {
        self.calls.lock().unwrap().push((purpose, texts.to_vec()));
        Ok(texts
            .iter()
            .map(|t| {
                VOCABULARY
                    .iter()
                    .map(|w| t.split_whitespace().filter(|tok| tok == w).count() as f32)
                    .collect()
            })
            .collect())
    }
}

/// 常に失敗するモック
struct FailingProvider;

#[async_trait]
impl EmbeddingProvider for FailingProvider {
    async fn embed(&self, _texts: &[String], _purpose: EmbedPurpose) -> Result<Vec<Vec<f32>>> {
        Err(BoqMatchError::EmbeddingProvider("ステータス 500: internal".into()))
    }
}

/// クエリ側だけ失敗するモック
struct QueryFailingProvider;

#[async_trait]
impl EmbeddingProvider for QueryFailingProvider {
    async fn embed(&self, texts: &[String], purpose: EmbedPurpose) -> Result<Vec<Vec<f32>>> {
        match purpose {
            EmbedPurpose::Document => Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect()),
            EmbedPurpose::Query => Err(BoqMatchError::EmbeddingProvider("ステータス 429".into())),
        }
    }
}

/// 用途ごとに決まったベクトルを返すモック
struct FixedProvider {
    document: Vec<f32>,
    query: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for FixedProvider {
    async fn embed(&self, texts: &[String], purpose: EmbedPurpose) -> Result<Vec<Vec<f32>>> {
        let vector = match purpose {
            EmbedPurpose::Document => &self.document,
            EmbedPurpose::Query => &self.query,
        };
        Ok(texts.iter().map(|_| vector.clone()).collect())
    }
}

fn row(code: &str, description: &str, quantity: f64, rate: Option<f64>) -> ExtractedRow {
    ExtractedRow {
        code: code.to_string(),
        description: description.to_string(),
        quantity,
        rate,
        unit: "m".to_string(),
        ..Default::default()
    }
}

fn price_rows() -> Vec<ExtractedRow> {
    vec![
        row("A1", "Steel Beam 200mm", 0.0, Some(50.0)),
        row("A2", "Steel column", 0.0, Some(65.0)),
        row("C1", "Reinforced cement concrete slab", 0.0, Some(80.0)),
    ]
}

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_semantic_picks_best_single_match() {
    let provider = BagOfWordsProvider::default();
    let inputs = vec![row("", "steel beam", 4.0, None), row("", "R.C.C. slab", 2.0, None)];

    let results = match_semantic(&inputs, &price_rows(), &provider, 96, TIMEOUT).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].input_description, "steel beam");
    assert_eq!(results[0].quantity, 4.0);
    assert_eq!(results[0].matches.len(), 1);
    assert_eq!(results[0].matches[0].code, "A1");
    assert_eq!(results[0].matches[0].unit_rate, Some(50.0));
    assert!((results[0].matches[0].confidence - 1.0).abs() < 1e-9);

    // 略記の正規化で rcc にそろう
    assert_eq!(results[1].matches[0].code, "C1");
    assert!(results[1].matches[0].confidence <= 1.0);
    assert!(results[1].matches[0].confidence >= -1.0);
}

#[tokio::test]
async fn test_semantic_sends_light_normalized_texts_with_purpose() {
    let provider = BagOfWordsProvider::default();
    let inputs = vec![row("", "  R.C.C.   Slab ", 1.0, None)];

    match_semantic(&inputs, &price_rows(), &provider, 96, TIMEOUT).await.unwrap();

    let calls = provider.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, EmbedPurpose::Document);
    assert_eq!(calls[0].1[2], "rcc slab");
    assert_eq!(calls[1].0, EmbedPurpose::Query);
    assert_eq!(calls[1].1, vec!["rcc slab".to_string()]);
}

#[tokio::test]
async fn test_semantic_batches_at_most_96() {
    let provider = BagOfWordsProvider::default();
    let prices: Vec<ExtractedRow> = (0..150)
        .map(|i| row(&format!("P{}", i), &format!("steel item {}", i), 0.0, Some(1.0)))
        .collect();
    let inputs = vec![row("", "steel", 1.0, None)];

    let results = match_semantic(&inputs, &prices, &provider, 96, TIMEOUT).await.unwrap();
    assert_eq!(results[0].matches.len(), 1);

    let calls = provider.calls.lock().unwrap();
    let sizes: Vec<usize> = calls.iter().map(|(_, t)| t.len()).collect();
    assert_eq!(sizes, vec![96, 54, 1]);
    assert!(sizes.iter().all(|&n| n <= 96));
}

#[tokio::test]
async fn test_semantic_provider_failure_aborts() {
    let inputs = vec![row("", "steel beam", 1.0, None)];
    let err = match_semantic(&inputs, &price_rows(), &FailingProvider, 96, TIMEOUT)
        .await
        .unwrap_err();
    assert!(matches!(err, BoqMatchError::EmbeddingProvider(_)));
}

#[tokio::test]
async fn test_semantic_query_failure_returns_no_partial_results() {
    let inputs = vec![row("", "steel beam", 1.0, None)];
    let result = match_semantic(&inputs, &price_rows(), &QueryFailingProvider, 96, TIMEOUT).await;
    assert!(matches!(result, Err(BoqMatchError::EmbeddingProvider(_))));
}

#[tokio::test]
async fn test_semantic_empty_price_list_makes_no_calls() {
    let provider = BagOfWordsProvider::default();
    let inputs = vec![row("", "steel beam", 1.0, None), row("", "rcc slab", 2.0, None)];

    let results = match_semantic(&inputs, &[], &provider, 96, TIMEOUT).await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.matches.is_empty()));
    assert!(provider.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_semantic_empty_input() {
    let provider = BagOfWordsProvider::default();
    let results = match_semantic(&[], &price_rows(), &provider, 96, TIMEOUT).await.unwrap();
    assert!(results.is_empty());
    assert!(provider.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_semantic_empty_query_vectors_are_rejected() {
    let provider = FixedProvider { document: vec![1.0, 0.0, 0.0], query: vec![] };
    let inputs = vec![row("", "steel beam", 1.0, None)];

    let result = match_semantic(&inputs, &price_rows(), &provider, 96, TIMEOUT).await;
    assert!(matches!(result, Err(BoqMatchError::EmbeddingProvider(_))));
}

#[tokio::test]
async fn test_semantic_dimension_mismatch_is_rejected() {
    let provider = FixedProvider { document: vec![1.0, 0.0, 0.0], query: vec![1.0, 0.0] };
    let inputs = vec![row("", "steel beam", 1.0, None)];

    let result = match_semantic(&inputs, &price_rows(), &provider, 96, TIMEOUT).await;
    assert!(matches!(result, Err(BoqMatchError::EmbeddingProvider(ref msg)) if msg.contains("次元")));
}

#[tokio::test]
async fn test_semantic_confidence_near_zero_is_not_negative_zero() {
    let provider = FixedProvider { document: vec![1.0, 0.0], query: vec![-0.0001, 1.0] };
    let inputs = vec![row("", "steel beam", 1.0, None)];

    let results = match_semantic(&inputs, &price_rows(), &provider, 96, TIMEOUT).await.unwrap();
    let confidence = results[0].matches[0].confidence;
    assert_eq!(confidence, 0.0);
    assert!(confidence.is_sign_positive());
}
