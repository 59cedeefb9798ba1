//! Graph container and construction API.
//!
//! A [`Graph`] owns an arena of [`Node`]s addressed by [`NodeId`]. Data and
//! control dependencies are both plain operand edges, and every non-block node
//! records the block it belongs to.
//!
//! A freshly created graph already contains the fixed skeleton every function
//! has:
//!
//! ```text
//!   start block ── Start ── Proj(0): initial memory
//!
//!   end block   ── End        (predecessors: one Return per exit)
//! ```
//!
//! Constructors validate operand ids, operand modes and arity, so analyses can
//! rely on a well-formed graph. Cycles are built in two steps: create the
//! block or phi with the operands known so far, then append the back-edge
//! operands with [`Graph::add_operand`] once the loop body exists.
//!
//! # Example
//!
//! ```rust
//! use carebits::ir::{BitValue, Graph, Mode};
//!
//! let mut graph = Graph::new();
//! let block = graph.start_block();
//! let a = graph.new_param(0, Mode::U8)?;
//! let b = graph.new_const(BitValue::new(Mode::U8, 3));
//! let sum = graph.new_add(block, a, b, Mode::U8)?;
//! let mem = graph.initial_mem();
//! graph.new_return(block, mem, &[sum])?;
//! graph.verify()?;
//! # Ok::<(), carebits::Error>(())
//! ```

use std::fmt;

use crate::{
    ir::{BitValue, Mode, Node, NodeId, Opcode, Relation},
    Error, Result,
};

/// A function body in graph form.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    start_block: NodeId,
    start: NodeId,
    initial_mem: NodeId,
    end_block: NodeId,
    end: NodeId,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates a graph holding only the start and end skeleton.
    #[must_use]
    pub fn new() -> Self {
        let mut graph = Graph {
            nodes: Vec::new(),
            start_block: NodeId(0),
            start: NodeId(1),
            initial_mem: NodeId(2),
            end_block: NodeId(3),
            end: NodeId(4),
        };
        graph.push_raw(Opcode::Block, Mode::BB, None, Vec::new());
        graph.push_raw(Opcode::Start, Mode::T, Some(graph.start_block), Vec::new());
        graph.push_raw(Opcode::Proj(0), Mode::M, Some(graph.start_block), vec![graph.start]);
        graph.push_raw(Opcode::Block, Mode::BB, None, Vec::new());
        graph.push_raw(Opcode::End, Mode::X, Some(graph.end_block), Vec::new());
        graph
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the node with the given id, if it exists.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Returns the node with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the id is not part of this graph.
    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.index()).ok_or(Error::NodeNotFound(id))
    }

    /// Returns the block containing `Start` and all constants and parameters.
    #[must_use]
    pub const fn start_block(&self) -> NodeId {
        self.start_block
    }

    /// Returns the `Start` node.
    #[must_use]
    pub const fn start(&self) -> NodeId {
        self.start
    }

    /// Returns the initial memory state.
    #[must_use]
    pub const fn initial_mem(&self) -> NodeId {
        self.initial_mem
    }

    /// Returns the block whose predecessors are the function exits.
    #[must_use]
    pub const fn end_block(&self) -> NodeId {
        self.end_block
    }

    /// Returns the graph terminal.
    #[must_use]
    pub const fn end(&self) -> NodeId {
        self.end
    }

    /// Iterates over all nodes with their ids, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Visits every node exactly once.
    ///
    /// Visitors must not depend on the order; it is creation order today.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(NodeId, &Node),
    {
        for (id, node) in self.nodes() {
            visit(id, node);
        }
    }

    /// Returns the constant value of a node, if it is a `Const`.
    #[must_use]
    pub fn const_value(&self, id: NodeId) -> Option<&BitValue> {
        self.node(id).and_then(|n| n.opcode().as_const())
    }

    /// Returns the mode of a node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the id is not part of this graph.
    pub fn mode_of(&self, id: NodeId) -> Result<Mode> {
        self.get(id).map(Node::mode)
    }

    // ========================================================================
    // Control flow construction
    // ========================================================================

    /// Creates a block with the given control predecessors.
    ///
    /// # Errors
    ///
    /// Fails if a predecessor does not exist or is not control flow.
    pub fn new_block(&mut self, preds: &[NodeId]) -> Result<NodeId> {
        for &pred in preds {
            self.expect_mode(pred, Mode::X)?;
        }
        Ok(self.push_raw(Opcode::Block, Mode::BB, None, preds.to_vec()))
    }

    /// Creates an unconditional jump out of `block`.
    ///
    /// # Errors
    ///
    /// Fails if `block` is not a block.
    pub fn new_jmp(&mut self, block: NodeId) -> Result<NodeId> {
        self.push(Opcode::Jmp, Mode::X, block, Vec::new())
    }

    /// Creates a two-way branch on a boolean selector.
    ///
    /// Take the exits apart with [`Graph::new_proj`]: `0` is the false exit and
    /// `1` the true exit, both in mode [`Mode::X`].
    ///
    /// # Errors
    ///
    /// Fails if the selector is not boolean.
    pub fn new_cond(&mut self, block: NodeId, selector: NodeId) -> Result<NodeId> {
        self.expect_mode(selector, Mode::B)?;
        self.push(Opcode::Cond, Mode::T, block, vec![selector])
    }

    /// Creates a projection of component `num` out of a tuple.
    ///
    /// # Errors
    ///
    /// Fails if `tuple` is not tuple moded.
    pub fn new_proj(&mut self, block: NodeId, tuple: NodeId, num: u32, mode: Mode) -> Result<NodeId> {
        self.expect_mode(tuple, Mode::T)?;
        self.push(Opcode::Proj(num), mode, block, vec![tuple])
    }

    /// Creates a function exit and registers it as a predecessor of the end block.
    ///
    /// # Errors
    ///
    /// Fails if `mem` is not a memory state or a result does not exist.
    pub fn new_return(&mut self, block: NodeId, mem: NodeId, results: &[NodeId]) -> Result<NodeId> {
        self.expect_mode(mem, Mode::M)?;
        let mut operands = Vec::with_capacity(results.len() + 1);
        operands.push(mem);
        for &result in results {
            self.get(result)?;
            operands.push(result);
        }
        let ret = self.push(Opcode::Return, Mode::X, block, operands)?;
        let end_block = self.end_block;
        self.nodes[end_block.index()].operands.push(ret);
        Ok(ret)
    }

    /// Keeps a node alive by making it an operand of `End`.
    ///
    /// This is how endless loops stay reachable from the terminal.
    ///
    /// # Errors
    ///
    /// Fails if the node does not exist.
    pub fn keep_alive(&mut self, node: NodeId) -> Result<()> {
        self.get(node)?;
        let end = self.end;
        self.nodes[end.index()].operands.push(node);
        Ok(())
    }

    // ========================================================================
    // Value construction
    // ========================================================================

    /// Creates parameter `index` of the function.
    ///
    /// # Errors
    ///
    /// Fails for modes a parameter cannot have (control, block, tuple, memory).
    pub fn new_param(&mut self, index: u32, mode: Mode) -> Result<NodeId> {
        if mode.is_control() || mode.is_block() || mode.is_tuple() || mode.is_memory() {
            return Err(malformed_error!("parameter {} cannot have mode {}", index, mode));
        }
        let block = self.start_block;
        self.push(Opcode::Param(index), mode, block, Vec::new())
    }

    /// Creates a constant in the start block.
    pub fn new_const(&mut self, value: BitValue) -> NodeId {
        let block = self.start_block;
        self.push_raw(Opcode::Const(value), value.mode(), Some(block), Vec::new())
    }

    /// Creates the address of global entity `entity`.
    pub fn new_address(&mut self, entity: u32) -> NodeId {
        let block = self.start_block;
        self.push_raw(Opcode::Address(entity), Mode::P, Some(block), Vec::new())
    }

    /// Creates an undefined value.
    pub fn new_unknown(&mut self, mode: Mode) -> NodeId {
        let block = self.start_block;
        self.push_raw(Opcode::Unknown, mode, Some(block), Vec::new())
    }

    /// Creates a phi merging one value per predecessor of `block`.
    ///
    /// Loop-carried operands can be appended later with [`Graph::add_operand`].
    ///
    /// # Errors
    ///
    /// Fails if an operand's mode differs from `mode`.
    pub fn new_phi(&mut self, block: NodeId, operands: &[NodeId], mode: Mode) -> Result<NodeId> {
        for &operand in operands {
            self.expect_mode(operand, mode)?;
        }
        self.push(Opcode::Phi, mode, block, operands.to_vec())
    }

    /// Creates a conversion of `operand` into `mode`.
    ///
    /// # Errors
    ///
    /// Fails if the operand does not exist.
    pub fn new_conv(&mut self, block: NodeId, operand: NodeId, mode: Mode) -> Result<NodeId> {
        self.get(operand)?;
        self.push(Opcode::Conv, mode, block, vec![operand])
    }

    /// Creates a binary operation.
    ///
    /// Both operands must be in `mode`, except for shifts, whose amount may be
    /// any integer mode.
    ///
    /// # Errors
    ///
    /// Fails if `opcode` is not a binary operation or the operand modes do not fit.
    pub fn new_binop(
        &mut self,
        block: NodeId,
        opcode: Opcode,
        left: NodeId,
        right: NodeId,
        mode: Mode,
    ) -> Result<NodeId> {
        if !opcode.is_binop() {
            return Err(malformed_error!("{} is not a binary operation", opcode.name()));
        }
        self.expect_mode(left, mode)?;
        if matches!(opcode, Opcode::Shl | Opcode::Shr | Opcode::Shrs) {
            let amount = self.mode_of(right)?;
            if !amount.is_int() {
                return Err(malformed_error!("shift amount {} has mode {}", right, amount));
            }
        } else {
            self.expect_mode(right, mode)?;
        }
        self.push(opcode, mode, block, vec![left, right])
    }

    /// Creates `left + right`.
    ///
    /// # Errors
    ///
    /// See [`Graph::new_binop`].
    pub fn new_add(&mut self, block: NodeId, left: NodeId, right: NodeId, mode: Mode) -> Result<NodeId> {
        self.new_binop(block, Opcode::Add, left, right, mode)
    }

    /// Creates `left - right`.
    ///
    /// # Errors
    ///
    /// See [`Graph::new_binop`].
    pub fn new_sub(&mut self, block: NodeId, left: NodeId, right: NodeId, mode: Mode) -> Result<NodeId> {
        self.new_binop(block, Opcode::Sub, left, right, mode)
    }

    /// Creates `left * right`.
    ///
    /// # Errors
    ///
    /// See [`Graph::new_binop`].
    pub fn new_mul(&mut self, block: NodeId, left: NodeId, right: NodeId, mode: Mode) -> Result<NodeId> {
        self.new_binop(block, Opcode::Mul, left, right, mode)
    }

    /// Creates `left & right`.
    ///
    /// # Errors
    ///
    /// See [`Graph::new_binop`].
    pub fn new_and(&mut self, block: NodeId, left: NodeId, right: NodeId, mode: Mode) -> Result<NodeId> {
        self.new_binop(block, Opcode::And, left, right, mode)
    }

    /// Creates `left | right`.
    ///
    /// # Errors
    ///
    /// See [`Graph::new_binop`].
    pub fn new_or(&mut self, block: NodeId, left: NodeId, right: NodeId, mode: Mode) -> Result<NodeId> {
        self.new_binop(block, Opcode::Or, left, right, mode)
    }

    /// Creates `left ^ right`.
    ///
    /// # Errors
    ///
    /// See [`Graph::new_binop`].
    pub fn new_eor(&mut self, block: NodeId, left: NodeId, right: NodeId, mode: Mode) -> Result<NodeId> {
        self.new_binop(block, Opcode::Eor, left, right, mode)
    }

    /// Creates `value << amount`.
    ///
    /// # Errors
    ///
    /// See [`Graph::new_binop`].
    pub fn new_shl(&mut self, block: NodeId, value: NodeId, amount: NodeId, mode: Mode) -> Result<NodeId> {
        self.new_binop(block, Opcode::Shl, value, amount, mode)
    }

    /// Creates the logical shift `value >> amount`.
    ///
    /// # Errors
    ///
    /// See [`Graph::new_binop`].
    pub fn new_shr(&mut self, block: NodeId, value: NodeId, amount: NodeId, mode: Mode) -> Result<NodeId> {
        self.new_binop(block, Opcode::Shr, value, amount, mode)
    }

    /// Creates the arithmetic shift `value >> amount`.
    ///
    /// # Errors
    ///
    /// See [`Graph::new_binop`].
    pub fn new_shrs(&mut self, block: NodeId, value: NodeId, amount: NodeId, mode: Mode) -> Result<NodeId> {
        self.new_binop(block, Opcode::Shrs, value, amount, mode)
    }

    /// Creates `!operand`.
    ///
    /// # Errors
    ///
    /// Fails if the operand is not in `mode`.
    pub fn new_not(&mut self, block: NodeId, operand: NodeId, mode: Mode) -> Result<NodeId> {
        self.expect_mode(operand, mode)?;
        self.push(Opcode::Not, mode, block, vec![operand])
    }

    /// Creates `-operand`.
    ///
    /// # Errors
    ///
    /// Fails if the operand is not in `mode`.
    pub fn new_minus(&mut self, block: NodeId, operand: NodeId, mode: Mode) -> Result<NodeId> {
        self.expect_mode(operand, mode)?;
        self.push(Opcode::Minus, mode, block, vec![operand])
    }

    /// Creates a comparison producing a boolean.
    ///
    /// # Errors
    ///
    /// Fails if the operands have different modes.
    pub fn new_cmp(
        &mut self,
        block: NodeId,
        relation: Relation,
        left: NodeId,
        right: NodeId,
    ) -> Result<NodeId> {
        let mode = self.mode_of(left)?;
        self.expect_mode(right, mode)?;
        self.push(Opcode::Cmp(relation), Mode::B, block, vec![left, right])
    }

    /// Creates `selector ? if_true : if_false`.
    ///
    /// # Errors
    ///
    /// Fails if the selector is not boolean or a value is not in `mode`.
    pub fn new_mux(
        &mut self,
        block: NodeId,
        selector: NodeId,
        if_false: NodeId,
        if_true: NodeId,
        mode: Mode,
    ) -> Result<NodeId> {
        self.expect_mode(selector, Mode::B)?;
        self.expect_mode(if_false, mode)?;
        self.expect_mode(if_true, mode)?;
        self.push(Opcode::Mux, mode, block, vec![selector, if_false, if_true])
    }

    /// Creates a confirmation that `value relation bound` holds.
    ///
    /// # Errors
    ///
    /// Fails if the operands have different modes.
    pub fn new_confirm(
        &mut self,
        block: NodeId,
        value: NodeId,
        bound: NodeId,
        relation: Relation,
    ) -> Result<NodeId> {
        let mode = self.mode_of(value)?;
        self.expect_mode(bound, mode)?;
        self.push(Opcode::Confirm(relation), mode, block, vec![value, bound])
    }

    // ========================================================================
    // Memory construction
    // ========================================================================

    /// Creates a load; project `0` for the memory and `1` for the value.
    ///
    /// # Errors
    ///
    /// Fails if `mem` is not a memory state or `address` is not a reference.
    pub fn new_load(&mut self, block: NodeId, mem: NodeId, address: NodeId) -> Result<NodeId> {
        self.expect_mode(mem, Mode::M)?;
        self.expect_mode(address, Mode::P)?;
        self.push(Opcode::Load, Mode::T, block, vec![mem, address])
    }

    /// Creates a store producing the new memory state.
    ///
    /// # Errors
    ///
    /// Fails if `mem` is not a memory state or `address` is not a reference.
    pub fn new_store(
        &mut self,
        block: NodeId,
        mem: NodeId,
        address: NodeId,
        value: NodeId,
    ) -> Result<NodeId> {
        self.expect_mode(mem, Mode::M)?;
        self.expect_mode(address, Mode::P)?;
        self.get(value)?;
        self.push(Opcode::Store, Mode::M, block, vec![mem, address, value])
    }

    /// Creates a call; project `0` for the memory and `1` for the result.
    ///
    /// # Errors
    ///
    /// Fails if `mem` is not a memory state or an argument does not exist.
    pub fn new_call(
        &mut self,
        block: NodeId,
        mem: NodeId,
        callee: NodeId,
        args: &[NodeId],
    ) -> Result<NodeId> {
        self.expect_mode(mem, Mode::M)?;
        self.expect_mode(callee, Mode::P)?;
        let mut operands = vec![mem, callee];
        for &arg in args {
            self.get(arg)?;
            operands.push(arg);
        }
        self.push(Opcode::Call, Mode::T, block, operands)
    }

    /// Creates a merge of several memory states.
    ///
    /// # Errors
    ///
    /// Fails if an operand is not a memory state.
    pub fn new_sync(&mut self, block: NodeId, mems: &[NodeId]) -> Result<NodeId> {
        for &mem in mems {
            self.expect_mode(mem, Mode::M)?;
        }
        self.push(Opcode::Sync, Mode::M, block, mems.to_vec())
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Appends an operand to a variadic node (`Block`, `Phi`, `End`, `Sync`).
    ///
    /// This closes cycles: a loop header block gets its back-edge and each of
    /// its phis its loop-carried value after the loop body has been built.
    ///
    /// # Errors
    ///
    /// Fails if the node is not variadic or the operand's mode does not fit.
    pub fn add_operand(&mut self, node: NodeId, operand: NodeId) -> Result<()> {
        let target = self.get(node)?;
        let (opcode, mode) = (target.opcode().clone(), target.mode());
        match opcode {
            Opcode::Block => self.expect_mode(operand, Mode::X)?,
            Opcode::Phi => self.expect_mode(operand, mode)?,
            Opcode::Sync => self.expect_mode(operand, Mode::M)?,
            Opcode::End => {
                self.get(operand)?;
            }
            _ => {
                return Err(malformed_error!(
                    "cannot append operands to {} {}",
                    opcode.name(),
                    node
                ))
            }
        }
        self.nodes[node.index()].operands.push(operand);
        Ok(())
    }

    /// Replaces operand `index` of a node.
    ///
    /// # Errors
    ///
    /// Fails if the index is out of range or the new operand's mode differs from the old one.
    pub fn set_operand(&mut self, node: NodeId, index: usize, operand: NodeId) -> Result<()> {
        let target = self.get(node)?;
        let arity = target.arity();
        let old = target.operand(index).ok_or(Error::OperandOutOfRange {
            node,
            index,
            arity,
        })?;
        let expected = self.mode_of(old)?;
        self.expect_mode(operand, expected)?;
        self.nodes[node.index()].operands[index] = operand;
        Ok(())
    }

    // ========================================================================
    // Verification
    // ========================================================================

    /// Checks the structural invariants of the whole graph.
    ///
    /// - every operand and block reference points into the graph
    /// - every owning block is a `Block`
    /// - fixed-arity opcodes have the right number of operands
    /// - every phi has one operand per predecessor of its block
    /// - every block predecessor is control flow
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn verify(&self) -> Result<()> {
        for (id, node) in self.nodes() {
            for &operand in node.operands() {
                self.get(operand)?;
            }
            if let Some(expected) = node.opcode().arity() {
                if expected != node.arity() {
                    return Err(malformed_error!(
                        "{} {} has {} operands, expected {}",
                        node.opcode().name(),
                        id,
                        node.arity(),
                        expected
                    ));
                }
            }
            match node.opcode() {
                Opcode::Block => {
                    for &pred in node.operands() {
                        self.expect_mode(pred, Mode::X)?;
                    }
                }
                Opcode::Phi => {
                    let block = self.owning_block(id, node)?;
                    if block.arity() != node.arity() {
                        return Err(malformed_error!(
                            "Phi {} has {} operands but its block has {} predecessors",
                            id,
                            node.arity(),
                            block.arity()
                        ));
                    }
                }
                _ => {
                    self.owning_block(id, node)?;
                }
            }
        }
        Ok(())
    }

    fn owning_block(&self, id: NodeId, node: &Node) -> Result<&Node> {
        let block_id = node
            .block()
            .ok_or_else(|| malformed_error!("{} has no block", id))?;
        let block = self.get(block_id)?;
        if *block.opcode() != Opcode::Block {
            return Err(malformed_error!("block of {} is {}", id, block.opcode().name()));
        }
        Ok(block)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn expect_mode(&self, id: NodeId, expected: Mode) -> Result<()> {
        let found = self.mode_of(id)?;
        if found == expected {
            Ok(())
        } else {
            Err(Error::ModeMismatch { expected, found })
        }
    }

    fn push(&mut self, opcode: Opcode, mode: Mode, block: NodeId, operands: Vec<NodeId>) -> Result<NodeId> {
        if *self.get(block)?.opcode() != Opcode::Block {
            return Err(malformed_error!("{} is not a block", block));
        }
        for &operand in &operands {
            self.get(operand)?;
        }
        Ok(self.push_raw(opcode, mode, Some(block), operands))
    }

    fn push_raw(
        &mut self,
        opcode: Opcode,
        mode: Mode,
        block: Option<NodeId>,
        operands: Vec<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            opcode,
            mode,
            block,
            operands,
        });
        id
    }
}

impl fmt::Display for Graph {
    /// One line per node: `id: Opcode mode [operands] @block`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, node) in self.nodes() {
            write!(f, "{id}: {}", node.opcode().name())?;
            match node.opcode() {
                Opcode::Const(value) => write!(f, " {value}")?,
                Opcode::Proj(num) | Opcode::Param(num) | Opcode::Address(num) => {
                    write!(f, " {num}")?;
                }
                Opcode::Cmp(relation) | Opcode::Confirm(relation) => {
                    write!(f, " {relation:?}")?;
                }
                _ => {}
            }
            write!(f, " {}", node.mode())?;
            if !node.operands().is_empty() {
                let operands: Vec<String> =
                    node.operands().iter().map(ToString::to_string).collect();
                write!(f, " [{}]", operands.join(", "))?;
            }
            if let Some(block) = node.block() {
                write!(f, " @{block}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
