//! 説明文の正規化
//!
//! 照合前に説明文を比較可能な形へ揃える。
//!
//! ## 処理フロー
//! 1. 小文字化
//! 2. `[a-z0-9]` と空白以外を空白に置換
//! 3. （任意）単独の数値トークン・単位トークンを除去
//! 4. 連続空白を1つにまとめ、前後を除去

use regex::Regex;
use serde::{Deserialize, Serialize};

/// 除去対象の単位
pub const UNIT_TOKENS: &[&str] = &["mm", "cm", "m", "inch", "in", "ft"];

/// 正規化オプション
///
/// デフォルトは数値・単位とも除去。
///
/// `strip_units` は単独の単位トークンに加えて、数値と単位が連結した寸法
/// （`200mm`, `12in` 等）もまとめて除去する。寸法違いの品目を同じ品目として
/// 照合するための意図的な挙動で、寸法を区別したい場合は `strip_units` を外す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeOptions {
    /// 単独の数値トークンを除去する
    pub strip_numbers: bool,
    /// 単位トークン（"mm" 等、および "200mm" のような寸法）を除去する
    pub strip_units: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            strip_numbers: true,
            strip_units: true,
        }
    }
}

impl NormalizeOptions {
    /// 数値・単位を残す緩い設定
    pub fn keep_all() -> Self {
        Self {
            strip_numbers: false,
            strip_units: false,
        }
    }
}

/// 説明文を正規化する
///
/// 失敗しない。空文字列は空文字列を返す。
///
/// # Examples
/// ```
/// use boq_match_common::normalizer::{normalize, NormalizeOptions};
///
/// let opts = NormalizeOptions::keep_all();
/// assert_eq!(normalize("  Steel-Beam (200mm) ", &opts), "steel beam 200mm");
/// assert_eq!(normalize("Steel Beam 200 mm", &NormalizeOptions::default()), "steel beam");
/// ```
pub fn normalize(text: &str, options: &NormalizeOptions) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| !should_strip(token, options))
        .collect::<Vec<_>>()
        .join(" ")
}

fn should_strip(token: &str, options: &NormalizeOptions) -> bool {
    lazy_static::lazy_static! {
        // 数値に単位が連結した寸法トークン（200mm, 12in 等）。strip_numbers では落とさない
        static ref DIMENSION_RE: Regex = Regex::new(r"^\d+(mm|cm|m|inch|in|ft)$").unwrap();
    }

    if options.strip_numbers && token.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if options.strip_units && (UNIT_TOKENS.contains(&token) || DIMENSION_RE.is_match(token)) {
        return true;
    }
    false
}

/// 埋め込み用の軽い正規化
///
/// トークンは除去しない（埋め込みは表記揺れに強いため）。
/// よく使われる略記だけ揃える。
pub fn normalize_light(text: &str) -> String {
    let collapsed = text
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    collapsed
        .replace("mm.", "mm")
        .replace("cm.", "cm")
        .replace("r.c.c.", "rcc")
        .replace("reinforced cement concrete", "rcc")
}
