//! BoQ Match Common Library
//!
//! 単価表照合の型と純粋なアルゴリズム（I/Oなし）
//!
//! 依存順:
//! 1. normalizer - 説明文の正規化
//! 2. similarity - 類似度スコア
//! 3. header - 見出し行検出と行抽出
//! 4. matcher - 上位K件のランキング
//! 5. pricing - 単価付け・BoQマージ

pub mod error;
pub mod types;
pub mod normalizer;
pub mod similarity;
pub mod header;
pub mod matcher;
pub mod pricing;

pub use error::{Error, Result};
pub use types::{Cell, ExtractedRow, InputLineItem, MatchCandidate, MatchRecord, MatchResult, PriceListEntry};
pub use normalizer::{normalize, normalize_light, NormalizeOptions};
pub use similarity::{combined_score, edit_ratio, jaccard, token_set_ratio};
pub use header::{detect_header, extract_rows, extract_sheet, ColumnMap, HeaderLocation};
pub use matcher::{match_items, match_rows, MatchOptions, DEFAULT_TOP_K};
pub use pricing::{apply_rates, boq_from_matches, merge_boq, BoqItem, RateTable};
