//! Integer constant literals.

use crate::error::{IrError, IrResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer constant: a literal bit pattern of a fixed width.
///
/// Literals are unsigned. Widths above 64 bits are allowed; the upper bits of
/// such constants are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstInt {
    /// Width in bits, always positive.
    pub width: u32,
    /// The literal value.
    pub value: u64,
}

impl ConstInt {
    /// Creates a constant, checking that the width is positive and the literal fits.
    pub fn new(width: u32, value: u64) -> IrResult<Self> {
        if width == 0 {
            return Err(IrError::InvalidWidth { width });
        }
        if width < 64 && value >> width != 0 {
            return Err(IrError::LiteralOutOfRange { value, width });
        }
        Ok(Self { width, value })
    }

    /// Returns `true` if the literal is zero.
    pub fn is_zero(self) -> bool {
        self.value == 0
    }
}

impl fmt::Display for ConstInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{} {}", self.width, self.value)
    }
}
