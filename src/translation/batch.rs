/*!
 * Batch partitioning.
 *
 * Work items are split in catalog order into groups of at most `batch_size`
 * items. Batches are numbered from 1 and consumed once by the controller.
 */

use anyhow::{Result, anyhow};
use log::debug;

use super::selection::WorkItem;

/// A group of work items sent in one request
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationBatch {
    /// 1-based batch number
    pub id: usize,
    /// Items in catalog order
    pub items: Vec<WorkItem>,
}

impl TranslationBatch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Splits work items into fixed-size batches
#[derive(Debug, Clone, Copy)]
pub struct Batcher {
    batch_size: usize,
}

impl Batcher {
    /// Create a batcher; a zero size is rejected
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(anyhow!("Batch size must be at least 1"));
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches `item_count` items will produce
    pub fn batch_count(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.batch_size)
    }

    /// Partition items in order
    pub fn partition(&self, items: Vec<WorkItem>) -> Vec<TranslationBatch> {
        let total = items.len();
        let mut batches = Vec::with_capacity(self.batch_count(total));
        let mut current = Vec::with_capacity(self.batch_size.min(total));

        for item in items {
            current.push(item);
            if current.len() == self.batch_size {
                batches.push(TranslationBatch {
                    id: batches.len() + 1,
                    items: std::mem::take(&mut current),
                });
            }
        }
        if !current.is_empty() {
            batches.push(TranslationBatch {
                id: batches.len() + 1,
                items: current,
            });
        }

        debug!(
            "Partitioned {} items into {} batches of at most {}",
            total,
            batches.len(),
            self.batch_size
        );
        batches
    }
}
