//! Error types for IR construction, mutation, and validation.

/// An error reported by an IR operation.
///
/// Every variant is local and recoverable: the operation that returned it left
/// the graph unchanged, and the caller may fix the cause and retry.
/// Names in messages are already resolved to strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IrError {
    /// An integer type was requested with a zero width.
    #[error("invalid integer width {width}: widths must be positive")]
    InvalidWidth {
        /// The rejected width.
        width: u32,
    },

    /// A constant literal does not fit into its integer width.
    #[error("literal {value} does not fit into {width} bits")]
    LiteralOutOfRange {
        /// The literal.
        value: u64,
        /// The width of the requested type.
        width: u32,
    },

    /// A name collides with an existing name in the same scope.
    #[error("duplicate name '{name}' in {scope}")]
    DuplicateName {
        /// The colliding name.
        name: String,
        /// A description of the scope, e.g. `inputs of @top`.
        scope: String,
    },

    /// An operand does not satisfy the type constraint of its slot.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// An instance binding list does not match the callee's signature.
    #[error("signature mismatch: {0}")]
    SignatureMismatch(String),

    /// An instruction was added to a block that already ends in a terminator.
    #[error("block %{block} already ends in a terminator")]
    BlockAlreadyTerminated {
        /// The block name.
        block: String,
    },

    /// A block has no terminator (reported by validation).
    #[error("block %{block} does not end in a terminator")]
    MissingTerminator {
        /// The block name.
        block: String,
    },

    /// Destruction was attempted while references remain.
    #[error("cannot destroy {what}: still referenced {count} time(s)")]
    DanglingReference {
        /// A description of the object.
        what: String,
        /// The number of outstanding references.
        count: usize,
    },

    /// A block is not reachable from the process entry.
    #[error("block %{block} in @{unit} is not reachable from the entry block")]
    OrphanBlock {
        /// The process name.
        unit: String,
        /// The block name.
        block: String,
    },

    /// A process has no entry block.
    #[error("process @{unit} has no entry block")]
    MissingEntry {
        /// The process name.
        unit: String,
    },

    /// The entry block of a process was set twice.
    #[error("process @{unit} already has entry block %{block}")]
    EntryAlreadySet {
        /// The process name.
        unit: String,
        /// The current entry block.
        block: String,
    },

    /// An operation is not allowed at this place in the graph.
    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    /// An operand belongs to a different unit than its user.
    #[error("value {value} belongs to @{owner} and cannot be used in @{user}")]
    ForeignValue {
        /// The value, as printed.
        value: String,
        /// The unit owning the value.
        owner: String,
        /// The unit of the using instruction.
        user: String,
    },

    /// An object already has an owner.
    #[error("{0} is already attached")]
    AlreadyAttached(String),

    /// An object must be attached before this operation.
    #[error("{0} is not attached")]
    NotAttached(String),

    /// An entity's dataflow graph contains a cycle.
    #[error("dataflow cycle through {value} in entity @{unit}")]
    DataflowCycle {
        /// The entity name.
        unit: String,
        /// A value on the cycle.
        value: String,
    },

    /// A value's use-list disagrees with the operands referencing it.
    #[error("use-list of {value} is inconsistent with its operand references")]
    CorruptUseList {
        /// The value, as printed.
        value: String,
    },

    /// A unit argument cannot be destroyed apart from its unit.
    #[error("{value} is an argument of @{unit} and lives as long as the unit")]
    OwnedByUnit {
        /// The value, as printed.
        value: String,
        /// The owning unit.
        unit: String,
    },

    /// A reduction pass declined to transform a process.
    #[error("process @{unit} is not reducible: {reason}")]
    NotReducible {
        /// The process name.
        unit: String,
        /// Why the pass declined.
        reason: String,
    },

    /// A reduction pass broke its contract.
    #[error("pass '{pass}' violated its contract: {reason}")]
    ContractViolation {
        /// The pass name.
        pass: String,
        /// What went wrong.
        reason: String,
    },
}

/// Result alias for IR operations.
pub type IrResult<T> = Result<T, IrError>;
