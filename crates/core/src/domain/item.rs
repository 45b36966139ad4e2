// Item Domain Model

use std::fmt;

/// One unit of work (a file path in the classifier)
///
/// No identity beyond its value; duplicates are processed independently.
pub type Item = String;

/// A per-item failure destined for the error channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub item: Item,
    pub reason: String,
}

impl ItemFailure {
    pub fn new(item: impl Into<Item>, reason: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not process {}: {}", self.item, self.reason)
    }
}
