// Domain Layer - Pure data and coordination primitives

pub mod item;
pub mod queue;

// Re-exports
pub use item::{Item, ItemFailure};
pub use queue::ClosableQueue;
