//! Structured diagnostics for the Loom tools.
//!
//! A [`Diagnostic`] carries a severity, a stable [`DiagnosticCode`], a message,
//! an optional IR location, and any notes or help. Tools collect diagnostics in
//! a [`DiagnosticSink`] and print them with a [`DiagnosticRenderer`].

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Diagnostic, Severity};
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use sink::DiagnosticSink;
