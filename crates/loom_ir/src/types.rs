//! Type system for the IR, including interned types and a central type database.
//!
//! All types are interned into a [`TypeDb`], which assigns each unique type a
//! [`TypeId`]. Interning makes structural equality an ID comparison: two
//! integer types of the same width, or two signatures with element-wise equal
//! inputs and outputs, always receive the same ID.

use crate::error::{IrError, IrResult};
use crate::ids::TypeId;
use serde::{Deserialize, Serialize};

/// A type in the IR.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// The type of things that carry no data, such as blocks.
    Void,
    /// A two-state integer (bit vector) of the given positive width.
    Int(u32),
    /// A signal carrying values of the wrapped type.
    Signal(TypeId),
    /// The signature of a unit: ordered input and output types.
    Unit {
        /// Input types in port order.
        inputs: Vec<TypeId>,
        /// Output types in port order.
        outputs: Vec<TypeId>,
    },
}

/// Central type database.
///
/// Each unique [`Type`] is stored once and referenced by [`TypeId`]. Types are
/// immutable once interned and live as long as the database; a `TypeId` is a
/// plain copyable handle, so releasing one is simply dropping it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDb {
    types: Vec<Type>,
}

impl TypeDb {
    /// Creates a new, empty type database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a type, returning its [`TypeId`].
    ///
    /// If an identical type already exists, returns the existing ID.
    /// No validation is performed; prefer the typed constructors.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(i) = self.types.iter().position(|existing| existing == &ty) {
            return TypeId::from_raw(i as u32);
        }
        let id = TypeId::from_raw(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Returns the void type.
    pub fn void(&mut self) -> TypeId {
        self.intern(Type::Void)
    }

    /// Returns the integer type of the given width.
    ///
    /// Fails with [`IrError::InvalidWidth`] if `width` is zero.
    pub fn int(&mut self, width: u32) -> IrResult<TypeId> {
        if width == 0 {
            return Err(IrError::InvalidWidth { width });
        }
        Ok(self.intern(Type::Int(width)))
    }

    /// Returns the signal type carrying values of `inner`.
    ///
    /// Only integer types can be carried by a signal.
    pub fn signal(&mut self, inner: TypeId) -> IrResult<TypeId> {
        self.check_known(inner)?;
        if !matches!(self.get(inner), Type::Int(_)) {
            return Err(IrError::TypeMismatch(format!(
                "signals carry integer types, not {}",
                self.display(inner)
            )));
        }
        Ok(self.intern(Type::Signal(inner)))
    }

    /// Returns the unit signature type with the given inputs and outputs.
    ///
    /// The component IDs are only borrowed for validation; the signature keeps
    /// its own copies. Every component must be an integer or signal type.
    pub fn unit_sig(&mut self, inputs: &[TypeId], outputs: &[TypeId]) -> IrResult<TypeId> {
        for &ty in inputs.iter().chain(outputs) {
            self.check_known(ty)?;
            if !self.is_port_type(ty) {
                return Err(IrError::TypeMismatch(format!(
                    "unit ports must have integer or signal type, not {}",
                    self.display(ty)
                )));
            }
        }
        Ok(self.intern(Type::Unit {
            inputs: inputs.to_vec(),
            outputs: outputs.to_vec(),
        }))
    }

    fn check_known(&self, id: TypeId) -> IrResult<()> {
        if (id.as_raw() as usize) < self.types.len() {
            Ok(())
        } else {
            Err(IrError::TypeMismatch(format!(
                "unknown type id {}",
                id.as_raw()
            )))
        }
    }

    fn is_port_type(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Int(_) | Type::Signal(_))
    }

    /// Returns a reference to the type with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID is out of bounds.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.as_raw() as usize]
    }

    /// Returns `true` if both IDs denote structurally equal types.
    pub fn same(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    /// Returns the width of an integer type.
    pub fn int_width(&self, id: TypeId) -> Option<u32> {
        match self.get(id) {
            Type::Int(width) => Some(*width),
            _ => None,
        }
    }

    /// Returns the carried type of a signal type.
    pub fn signal_inner(&self, id: TypeId) -> Option<TypeId> {
        match self.get(id) {
            Type::Signal(inner) => Some(*inner),
            _ => None,
        }
    }

    /// Returns the input and output types of a unit signature.
    pub fn unit_ports(&self, id: TypeId) -> Option<(&[TypeId], &[TypeId])> {
        match self.get(id) {
            Type::Unit { inputs, outputs } => Some((inputs, outputs)),
            _ => None,
        }
    }

    /// Returns the bit width of a type, if it has one.
    ///
    /// Signals report the width of the value they carry.
    pub fn bit_width(&self, id: TypeId) -> Option<u32> {
        match self.get(id) {
            Type::Int(width) => Some(*width),
            Type::Signal(inner) => self.bit_width(*inner),
            Type::Void | Type::Unit { .. } => None,
        }
    }

    /// Renders a type in assembly syntax: `void`, `i8`, `i8$`, `(i1, i1) -> (i1)`.
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            Type::Void => "void".to_string(),
            Type::Int(width) => format!("i{width}"),
            Type::Signal(inner) => format!("{}$", self.display(*inner)),
            Type::Unit { inputs, outputs } => format!(
                "({}) -> ({})",
                self.display_list(inputs),
                self.display_list(outputs)
            ),
        }
    }

    fn display_list(&self, ids: &[TypeId]) -> String {
        ids.iter()
            .map(|&id| self.display(id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns the number of interned types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types have been interned.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
