//! Shared foundational types used across the Loom hardware IR crates.
//!
//! Currently this is the identifier interner: every name in the IR (units,
//! blocks, values, modules) is an [`Ident`] resolved through an [`Interner`].

#![warn(missing_docs)]

pub mod ident;

pub use ident::{Ident, Interner};
