//! 単価表ストア
//!
//! 単価表の項目を保存・更新する。照合処理はストアを直接触らず、
//! `find_all` で取り出した行を受け取る。
//!
//! - `MemoryStore`: メモリ上のみ（永続化なし）
//! - `JsonFileStore`: JSONファイル（変更のたびに書き込み）

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::{BoqMatchError, Result};
use boq_match_common::ExtractedRow;
use serde::{Deserialize, Serialize};

/// 単価表の1項目
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceItem {
    pub id: u64,
    #[serde(default)]
    pub code: String,
    /// 仕様書などの参照番号
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub description: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub rate: Option<f64>,
}

impl PriceItem {
    /// 抽出行から作る（id はストアが採番する）
    pub fn from_row(row: &ExtractedRow) -> Self {
        Self {
            id: 0,
            code: row.code.clone(),
            reference: None,
            description: row.description.clone(),
            unit: row.unit.clone(),
            rate: row.rate,
        }
    }

    /// 照合用の行に変換
    pub fn to_row(&self) -> ExtractedRow {
        ExtractedRow {
            row_index: 0,
            code: self.code.clone(),
            description: self.description.clone(),
            quantity: 0.0,
            unit: self.unit.clone(),
            rate: self.rate,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(BoqMatchError::Store(format!(
                "説明文が空の項目は登録できません（コード: {}）",
                self.code
            )));
        }
        Ok(())
    }
}

pub trait PriceStore {
    fn find_all(&self) -> Result<Vec<PriceItem>>;

    fn find_by_id(&self, id: u64) -> Result<Option<PriceItem>>;

    /// 追加して採番済みの項目を返す
    fn insert(&mut self, item: PriceItem) -> Result<PriceItem>;

    /// 同じ id の項目を置き換える（存在しなければエラー）
    fn update(&mut self, item: PriceItem) -> Result<PriceItem>;

    /// 全項目を入れ替える（id は振り直す）
    fn replace_all(&mut self, items: Vec<PriceItem>) -> Result<usize>;
}

/// ストアの全項目を照合用の行として取り出す
pub fn price_rows<S: PriceStore + ?Sized>(store: &S) -> Result<Vec<ExtractedRow>> {
    Ok(store.find_all()?.iter().map(PriceItem::to_row).collect())
}
