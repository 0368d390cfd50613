//! In-memory quote collection and its derived category index.
//!
//! # Responsibility
//! - Own the ordered quote collection and mirror it to durable storage.
//! - Keep the category index in step with every mutation.
//!
//! # Invariants
//! - Every mutation either fully applies (memory + storage) or is rolled back.
//! - The category index always reflects the current collection.

pub mod category_index;
pub mod quote_store;
