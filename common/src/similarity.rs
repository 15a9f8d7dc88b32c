//! 文字列類似度
//!
//! すべて正規化済み文字列2つを受け取り 0.0〜1.0 を返す純関数。1.0 は一致。

use std::collections::BTreeSet;

/// 線形結合の編集距離側の重み
pub const EDIT_WEIGHT: f64 = 0.6;
/// 線形結合のJaccard側の重み
pub const JACCARD_WEIGHT: f64 = 0.4;

/// レーベンシュタイン距離を計算
///
/// 挿入・削除・置換のコストはすべて1。
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // DP表を2行ずつ保持
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// 編集距離ベースの類似度
///
/// `1 - distance / max(len(a), len(b), 1)`。同一文字列（空同士を含む）は1.0。
pub fn edit_ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    let max_len = a.chars().count().max(b.chars().count()).max(1);

    1.0 - (distance as f64 / max_len as f64)
}

fn token_set(s: &str) -> BTreeSet<&str> {
    s.split_whitespace().collect()
}

/// トークン集合のJaccard係数
///
/// どちらかのトークン集合が空なら0.0。
pub fn jaccard(a: &str, b: &str) -> f64 {
    let set_a = token_set(a);
    let set_b = token_set(b);

    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.len() + set_b.len() - intersection;

    intersection as f64 / union as f64
}

/// トークン集合比
///
/// 共通トークン I と残り A', B' から
/// `max(edit(I+A', I+B'), edit(I, I+A'+B'))` を返す。
/// 一方が他方のトークンを包含する（寸法などの修飾語が追加されている）場合に高くなる。
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let set_a = token_set(a);
    let set_b = token_set(b);

    // BTreeSetなので各集合は昇順に並ぶ
    let intersection: Vec<&str> = set_a.intersection(&set_b).copied().collect();
    let left_a: Vec<&str> = set_a.difference(&set_b).copied().collect();
    let left_b: Vec<&str> = set_b.difference(&set_a).copied().collect();

    let inter = intersection.join(" ");
    let with_a = join_parts(&[&inter, &left_a.join(" ")]);
    let with_b = join_parts(&[&inter, &left_b.join(" ")]);
    let with_all = join_parts(&[&inter, &left_a.join(" "), &left_b.join(" ")]);

    let ratio1 = edit_ratio(&with_a, &with_b);
    let ratio2 = edit_ratio(&inter, &with_all);

    ratio1.max(ratio2)
}

fn join_parts(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// ランキング用の総合スコア
///
/// `max(0.6 * edit_ratio + 0.4 * jaccard, token_set_ratio)`。
/// `use_token_set_ratio` が false の場合は線形結合のみ。
pub fn combined_score(a: &str, b: &str, use_token_set_ratio: bool) -> f64 {
    let blend = EDIT_WEIGHT * edit_ratio(a, b) + JACCARD_WEIGHT * jaccard(a, b);
    let score = if use_token_set_ratio {
        blend.max(token_set_ratio(a, b))
    } else {
        blend
    };
    score.clamp(0.0, 1.0)
}
