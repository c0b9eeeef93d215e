use serde::{Deserialize, Serialize};

use crate::policy::Category;

/// Bytes removed by one strip operation, bucketed by [`Category`].
///
/// Every figure is the full on-wire chunk size (`12 + length`), so
/// `output.len() + total == input.len()` holds for every successful call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalStats {
    pub text:       u64,
    pub time:       u64,
    pub background: u64,
    pub exif:       u64,
    pub other:      u64,
    pub total:      u64,
}

impl RemovalStats {
    pub fn record(&mut self, category: Category, size: u64) {
        *self.bucket_mut(category) += size;
        self.total += size;
    }

    pub fn bucket(&self, category: Category) -> u64 {
        match category {
            Category::Text       => self.text,
            Category::Time       => self.time,
            Category::Background => self.background,
            Category::Exif       => self.exif,
            Category::Other      => self.other,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut u64 {
        match category {
            Category::Text       => &mut self.text,
            Category::Time       => &mut self.time,
            Category::Background => &mut self.background,
            Category::Exif       => &mut self.exif,
            Category::Other      => &mut self.other,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Fold another operation's figures into this one (batch totals).
    pub fn merge(&mut self, other: &RemovalStats) {
        for c in Category::ALL {
            *self.bucket_mut(c) += other.bucket(c);
        }
        self.total += other.total;
    }

    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "nothing removed".to_string();
        }
        let parts: Vec<String> = Category::ALL
            .iter()
            .filter(|&&c| self.bucket(c) > 0)
            .map(|&c| format!("{} {} B", c.name(), self.bucket(c)))
            .collect();
        format!("removed {} B ({})", self.total, parts.join(", "))
    }
}
