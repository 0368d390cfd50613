//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store mutations, category preference and quote selection.
//! - Keep CLI/UI layers decoupled from storage details.

pub mod quote_service;
