//! Stable diagnostic codes.
//!
//! Codes are a category letter and a three-digit number. Error codes in the
//! 3xx range report IR invariant violations; warning codes in the 1xx range
//! report lint findings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The family a diagnostic code belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// `E`: the IR is malformed or an operation was refused.
    Error,
    /// `W`: the IR is well-formed but suspicious.
    Warning,
}

impl Category {
    /// The letter printed in front of the number.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
        }
    }
}

/// A category plus a number, printed as e.g. `E304` or `W101`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The family.
    pub category: Category,
    /// The number within the family.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }

    /// Shorthand for an `E` code.
    pub const fn error(number: u16) -> Self {
        Self::new(Category::Error, number)
    }

    /// Shorthand for a `W` code.
    pub const fn warning(number: u16) -> Self {
        Self::new(Category::Warning, number)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
