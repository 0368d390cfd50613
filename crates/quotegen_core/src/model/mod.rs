//! Domain model for quotes and category filters.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the persisted/wire shape (`QuoteRecord`) separate from the
//!   in-memory record that carries a generated id (`Quote`).
//!
//! # Invariants
//! - A `Quote` never has empty text.
//! - A `Quote` never has an empty category; blanks become `Uncategorized`.

pub mod quote;
