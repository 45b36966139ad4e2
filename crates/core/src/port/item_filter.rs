// Item Filter Port
// Applied by the streaming producer before a line is queued

/// Filter predicate for candidate lines
pub trait ItemFilter: Send + Sync {
    /// Return true if the line should become an item
    fn accepts(&self, candidate: &str) -> bool;
}

/// Filter used when checking is disabled: every line is queued
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl ItemFilter for AcceptAll {
    fn accepts(&self, _candidate: &str) -> bool {
        true
    }
}

impl<F> ItemFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accepts(&self, candidate: &str) -> bool {
        self(candidate)
    }
}
