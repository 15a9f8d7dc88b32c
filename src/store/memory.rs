use super::{PriceItem, PriceStore};
use crate::error::{BoqMatchError, Result};
use serde::{Deserialize, Serialize};

/// メモリ上の単価表ストア
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStore {
    next_id: u64,
    items: Vec<PriceItem>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            next_id: 1,
            items: Vec::new(),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PriceStore for MemoryStore {
    fn find_all(&self) -> Result<Vec<PriceItem>> {
        Ok(self.items.clone())
    }

    fn find_by_id(&self, id: u64) -> Result<Option<PriceItem>> {
        Ok(self.items.iter().find(|i| i.id == id).cloned())
    }

    fn insert(&mut self, item: PriceItem) -> Result<PriceItem> {
        item.validate()?;
        let item = PriceItem {
            id: self.next_id,
            ..item
        };
        self.next_id += 1;
        self.items.push(item.clone());
        Ok(item)
    }

    fn update(&mut self, item: PriceItem) -> Result<PriceItem> {
        item.validate()?;
        let slot = self
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or_else(|| BoqMatchError::Store(format!("項目が見つかりません: id={}", item.id)))?;
        *slot = item.clone();
        Ok(item)
    }

    fn replace_all(&mut self, items: Vec<PriceItem>) -> Result<usize> {
        for item in &items {
            item.validate()?;
        }

        self.items = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| PriceItem {
                id: i as u64 + 1,
                ..item
            })
            .collect();
        self.next_id = self.items.len() as u64 + 1;
        Ok(self.items.len())
    }
}
