//! JSONファイルの単価表ストア
//!
//! 変更のたびにファイル全体を書き直す。書き込みに失敗した変更は反映しない。

use super::{MemoryStore, PriceItem, PriceStore};
use crate::error::{BoqMatchError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::debug;

/// ストアファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    /// バージョン（互換性チェック用）
    version: u32,
    #[serde(flatten)]
    data: MemoryStore,
}

impl StoreFile {
    const CURRENT_VERSION: u32 = 1;
}

pub struct JsonFileStore {
    path: PathBuf,
    data: MemoryStore,
}

impl JsonFileStore {
    /// ストアファイルを開く（なければ空のストア）
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            debug!(path = %path.display(), "ストアファイルなし、空で開始");
            return Ok(Self {
                path,
                data: MemoryStore::default(),
            });
        }

        let reader = BufReader::new(File::open(&path)?);
        let file: StoreFile = serde_json::from_reader(reader)?;
        if file.version != StoreFile::CURRENT_VERSION {
            return Err(BoqMatchError::Store(format!(
                "ストアのバージョンが対応していません: {} (対応: {})",
                file.version,
                StoreFile::CURRENT_VERSION
            )));
        }

        Ok(Self { path, data: file.data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, data: &MemoryStore) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = StoreFile {
            version: StoreFile::CURRENT_VERSION,
            data: data.clone(),
        };
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, &file)?;
        debug!(path = %self.path.display(), items = data.len(), "ストア保存");
        Ok(())
    }

    /// 作業用コピーに変更を適用し、保存できたら反映する
    fn mutate<T>(&mut self, f: impl FnOnce(&mut MemoryStore) -> Result<T>) -> Result<T> {
        let mut next = self.data.clone();
        let value = f(&mut next)?;
        self.save(&next)?;
        self.data = next;
        Ok(value)
    }
}

impl PriceStore for JsonFileStore {
    fn find_all(&self) -> Result<Vec<PriceItem>> {
        self.data.find_all()
    }

    fn find_by_id(&self, id: u64) -> Result<Option<PriceItem>> {
        self.data.find_by_id(id)
    }

    fn insert(&mut self, item: PriceItem) -> Result<PriceItem> {
        self.mutate(|data| data.insert(item))
    }

    fn update(&mut self, item: PriceItem) -> Result<PriceItem> {
        self.mutate(|data| data.update(item))
    }

    fn replace_all(&mut self, items: Vec<PriceItem>) -> Result<usize> {
        self.mutate(|data| data.replace_all(items))
    }
}
