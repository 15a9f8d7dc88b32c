//! Cohere互換の埋め込みAPIクライアント
//!
//! `POST {endpoint}` に `{texts, model, input_type}` を送り、
//! `{embeddings: [[f32]]}` を受け取る。
//!
//! リトライ方針:
//! - 429 / 5xx → 指数バックオフで再試行（1秒, 2秒, 4秒 ... 最大32秒）
//! - その他の4xx → 即エラー
//! - 通信エラー（タイムアウト含む）→ 再試行
//!
//! 1回のリクエストには `request_timeout` を掛ける。バッチ全体の上限は
//! `batch_budget()` で、全試行とバックオフ待ちを合計した長さになる。

use super::{EmbedPurpose, EmbeddingProvider};
use crate::config::Config;
use crate::error::{BoqMatchError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct CohereProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    request_timeout: Duration,
    max_retries: u32,
    backoff_unit: Duration,
}

impl CohereProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        request_timeout: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BoqMatchError::EmbeddingProvider(format!("HTTPクライアント生成失敗: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into(),
            request_timeout,
            max_retries,
            backoff_unit: Duration::from_secs(1),
        })
    }

    /// バックオフの基本単位を変える（既定1秒）
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// 設定からクライアントを作る（APIキー未設定ならエラー）
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.get_api_key()?,
            config.embedding_model.clone(),
            config.embedding_endpoint.clone(),
            config.request_timeout(),
            config.max_retries,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 1バッチに掛けるタイムアウト（全リトライが収まる長さ）
    pub fn batch_budget(&self) -> Duration {
        retry_budget(self.request_timeout, self.max_retries, self.backoff_unit)
    }
}

/// リトライ前の待ち時間（1回目の再試行で1単位、以降倍々で最大32単位）
pub fn backoff_delay(attempt: u32, unit: Duration) -> Duration {
    unit * (1u32 << attempt.saturating_sub(1).min(5))
}

/// 全試行のタイムアウトとバックオフ待ちの合計
pub fn retry_budget(request_timeout: Duration, max_retries: u32, unit: Duration) -> Duration {
    let waits: Duration = (1..=max_retries).map(|attempt| backoff_delay(attempt, unit)).sum();
    request_timeout * (max_retries + 1) + waits
}

/// レスポンス本文を解析する
pub fn parse_embed_response(body: &str) -> Result<Vec<Vec<f32>>> {
    let response: EmbedResponse = serde_json::from_str(body)
        .map_err(|e| BoqMatchError::EmbeddingProvider(format!("レスポンス形式が不正です: {}", e)))?;
    Ok(response.embeddings)
}

#[async_trait]
impl EmbeddingProvider for CohereProvider {
    async fn embed(&self, texts: &[String], purpose: EmbedPurpose) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbedRequest {
            texts,
            model: &self.model,
            input_type: purpose.as_input_type(),
        };

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(attempt, self.backoff_unit);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "埋め込みAPIを再試行");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();

                    if status.is_success() {
                        return parse_embed_response(&text);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!(%status, attempt, "埋め込みAPIが一時的に失敗");
                        last_err = Some(BoqMatchError::EmbeddingProvider(format!(
                            "ステータス {}: {}",
                            status, text
                        )));
                        continue;
                    }

                    return Err(BoqMatchError::EmbeddingProvider(format!(
                        "ステータス {}: {}",
                        status, text
                    )));
                }
                Err(e) => {
                    warn!(error = %e, attempt, "埋め込みAPIへの通信に失敗");
                    last_err = Some(BoqMatchError::EmbeddingProvider(format!("通信エラー: {}", e)));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            BoqMatchError::EmbeddingProvider("リトライ上限に達しました".into())
        }))
    }
}
