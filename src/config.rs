use crate::error::{BoqMatchError, Result};
use boq_match_common::{MatchOptions, NormalizeOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Cohereの1回の埋め込み呼び出しで送れる最大件数
pub const MAX_EMBEDDING_BATCH_SIZE: usize = 96;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_endpoint: String,
    pub embedding_batch_size: usize,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub top_k: usize,
    pub strip_numbers: bool,
    pub strip_units: bool,
    pub use_token_set_ratio: bool,
    /// 既定の単価表ファイル
    pub price_list: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            embedding_model: "embed-english-v3.0".into(),
            embedding_endpoint: "https://api.cohere.ai/v1/embed".into(),
            embedding_batch_size: MAX_EMBEDDING_BATCH_SIZE,
            timeout_seconds: 60,
            max_retries: 3,
            top_k: boq_match_common::DEFAULT_TOP_K,
            strip_numbers: true,
            strip_units: true,
            use_token_set_ratio: true,
            price_list: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str::<Config>(&content)?
        } else {
            Self::default()
        };

        // 環境変数を優先
        if let Ok(model) = std::env::var("COHERE_EMBEDDING_MODEL") {
            if !model.trim().is_empty() {
                config.embedding_model = model;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| BoqMatchError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("boq-match").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding_batch_size == 0 || self.embedding_batch_size > MAX_EMBEDDING_BATCH_SIZE {
            return Err(BoqMatchError::Config(format!(
                "embedding_batch_size は 1〜{} で指定してください: {}",
                MAX_EMBEDDING_BATCH_SIZE, self.embedding_batch_size
            )));
        }
        if self.top_k == 0 {
            return Err(BoqMatchError::Config("top_k は1以上で指定してください".into()));
        }
        Ok(())
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var("COHERE_API_KEY") {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.api_key.clone().ok_or(BoqMatchError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            normalize: NormalizeOptions {
                strip_numbers: self.strip_numbers,
                strip_units: self.strip_units,
            },
            use_token_set_ratio: self.use_token_set_ratio,
        }
    }

    /// HTTPリクエスト1回あたりのタイムアウト
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.embedding_batch_size, 96);
        assert_eq!(config.top_k, 4);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"top_k": 2, "strip_units": false}"#).unwrap();
        assert_eq!(config.top_k, 2);
        assert!(!config.strip_units);
        assert!(config.strip_numbers);
        assert_eq!(config.embedding_model, "embed-english-v3.0");
    }

    #[test]
    fn test_validate_rejects_oversized_batch() {
        let config = Config {
            embedding_batch_size: 200,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(BoqMatchError::Config(_))));
    }

    #[test]
    fn test_match_options_from_config() {
        let config = Config {
            strip_numbers: false,
            use_token_set_ratio: false,
            ..Default::default()
        };
        let options = config.match_options();
        assert!(!options.normalize.strip_numbers);
        assert!(options.normalize.strip_units);
        assert!(!options.use_token_set_ratio);
    }
}
