use thiserror::Error;

use crate::ir::{Mode, NodeId};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The don't-care analysis itself cannot fail: every transfer rule that cannot track bits
/// precisely falls back to a conservative answer. Errors only come from the collaborators
/// around it, namely graph construction and the reference evaluator.
///
/// # Error Categories
///
/// ## Graph Construction Errors
/// - [`Error::NodeNotFound`] - An operand refers to a node that does not exist
/// - [`Error::OperandOutOfRange`] - An operand index is past the node's arity
/// - [`Error::InvalidMode`] - An integer mode with an unsupported width was requested
/// - [`Error::ModeMismatch`] - An operand or input does not have the required mode
/// - [`Error::Malformed`] - Structural violation (arity, phi/block mismatch, missing block)
///
/// ## Evaluation Errors
/// - [`Error::NotSupported`] - The evaluator does not model the opcode
/// - [`Error::MissingParameter`] - No input was provided for a parameter
/// - [`Error::StepLimit`] - The evaluation step budget was exhausted
/// - [`Error::DivisionByZero`] - A `Div` or `Mod` node divided by zero
///
/// # Examples
///
/// ```rust
/// use carebits::{Error, ir::{Graph, Mode, NodeId}};
///
/// let mut graph = Graph::new();
/// let block = graph.start_block();
/// match graph.new_add(block, NodeId::new(999), NodeId::new(998), Mode::I32) {
///     Err(Error::NodeNotFound(node)) => println!("no such node: {node}"),
///     Err(e) => println!("other error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The graph is structurally invalid.
    ///
    /// The error includes the source location where the violation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A node id does not refer to a node of this graph.
    #[error("Node {0} does not exist in this graph")]
    NodeNotFound(NodeId),

    /// An operand index is beyond the number of operands of a node.
    #[error("Operand {index} is out of range for {node} with {arity} operands")]
    OperandOutOfRange {
        /// The node whose operand was accessed
        node: NodeId,
        /// The requested operand position
        index: usize,
        /// The number of operands the node has
        arity: usize,
    },

    /// An integer mode with a width outside `1..=64` was requested.
    #[error("Integer width {0} is not supported, expected 1..=64")]
    InvalidMode(u32),

    /// A value was combined with a value of a different mode.
    #[error("Mode mismatch - expected {expected}, found {found}")]
    ModeMismatch {
        /// The mode the operation required
        expected: Mode,
        /// The mode that was supplied
        found: Mode,
    },

    /// The evaluator does not model this operation.
    #[error("Evaluation of {0} is not supported")]
    NotSupported(&'static str),

    /// No input value was bound for a graph parameter.
    #[error("No input value for parameter {0}")]
    MissingParameter(u32),

    /// The evaluator ran out of its step budget, usually because of a non-terminating loop.
    #[error("Evaluation exceeded the step limit of {0}")]
    StepLimit(usize),

    /// A `Div` or `Mod` node was evaluated with a zero divisor.
    #[error("Division by zero at {0}")]
    DivisionByZero(NodeId),
}
