//! Reference interpreter for graphs.
//!
//! The [`Evaluator`] executes a [`Graph`] on concrete parameter values and
//! returns the values of the `Return` it reaches. It is deliberately small:
//! integer and boolean values only, no memory, no calls. Its purpose is to be
//! an independent ground truth for the don't-care analysis.
//!
//! # Execution Model
//!
//! Execution walks blocks starting at the start block. On entering a block
//! through predecessor `k`, every phi of the block takes the value of its
//! operand `k`, all phis at once. The block's single exit (`Jmp`, `Cond` or
//! `Return`) then decides where control goes. Values are computed on demand
//! by following operand edges and are cached until the next block entry.
//!
//! # Bit Flips
//!
//! [`Evaluator::with_flip`] inverts one bit of one node's value every time it
//! is read. If the analysis says the bit is don't-care, the returned values
//! must not change.
//!
//! # Example
//!
//! ```rust
//! use carebits::ir::{BitValue, Evaluator, Graph, Mode};
//!
//! let mut graph = Graph::new();
//! let block = graph.start_block();
//! let a = graph.new_param(0, Mode::U8)?;
//! let b = graph.new_param(1, Mode::U8)?;
//! let sum = graph.new_add(block, a, b, Mode::U8)?;
//! let mem = graph.initial_mem();
//! graph.new_return(block, mem, &[sum])?;
//!
//! let result = Evaluator::new(&graph)
//!     .with_params(vec![BitValue::new(Mode::U8, 200), BitValue::new(Mode::U8, 100)])
//!     .run()?;
//! assert_eq!(result, vec![BitValue::new(Mode::U8, 44)]);
//! # Ok::<(), carebits::Error>(())
//! ```

use std::collections::HashMap;

use crate::{
    ir::{BitValue, Graph, Node, NodeId, Opcode, Overflow},
    Error, Result,
};

/// Default budget of node evaluations and block transitions per run.
pub const DEFAULT_STEP_LIMIT: usize = 100_000;

/// Executes a graph on concrete inputs.
#[derive(Debug, Clone)]
pub struct Evaluator<'g> {
    graph: &'g Graph,
    params: Vec<BitValue>,
    step_limit: usize,
    flip: Option<(NodeId, u32)>,
}

impl<'g> Evaluator<'g> {
    /// Creates an evaluator without parameters and with the default step limit.
    #[must_use]
    pub fn new(graph: &'g Graph) -> Self {
        Evaluator {
            graph,
            params: Vec::new(),
            step_limit: DEFAULT_STEP_LIMIT,
            flip: None,
        }
    }

    /// Binds the parameter values; `params[i]` feeds `Param(i)`.
    #[must_use]
    pub fn with_params(mut self, params: Vec<BitValue>) -> Self {
        self.params = params;
        self
    }

    /// Sets the budget of node evaluations and block transitions.
    #[must_use]
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    /// Inverts bit `bit` of `node`'s value whenever it is read.
    #[must_use]
    pub fn with_flip(mut self, node: NodeId, bit: u32) -> Self {
        self.flip = Some((node, bit));
        self
    }

    /// Runs the graph until a `Return` is reached.
    ///
    /// # Returns
    ///
    /// The result operands of the reached `Return`, memory excluded.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingParameter`] or [`Error::ModeMismatch`] for bad inputs
    /// - [`Error::NotSupported`] for memory, calls and non-integer values
    /// - [`Error::DivisionByZero`] for a zero divisor
    /// - [`Error::StepLimit`] if the budget runs out
    /// - [`Error::Malformed`] if control flow is ambiguous or incomplete
    pub fn run(&self) -> Result<Vec<BitValue>> {
        let cfg = ControlFlow::build(self.graph)?;
        let mut state = Execution {
            memo: HashMap::new(),
            phis: HashMap::new(),
            active: vec![false; self.graph.node_count()],
            steps: 0,
        };

        let mut block = self.graph.start_block();
        if cfg.phis.contains_key(&block) {
            return Err(malformed_error!("start block {} has phis", block));
        }

        loop {
            self.tick(&mut state)?;
            let exit = *cfg
                .exits
                .get(&block)
                .ok_or_else(|| malformed_error!("{} has no exit", block))?;
            let node = self.graph.get(exit)?;

            let taken = match node.opcode() {
                Opcode::Return => {
                    return node
                        .operands()
                        .iter()
                        .skip(1)
                        .map(|&result| self.value(&mut state, result))
                        .collect();
                }
                Opcode::Jmp => exit,
                Opcode::Cond => {
                    let selector = self.operand(&mut state, node, 0)?;
                    let num = u32::from(!selector.is_zero());
                    *cfg.cond_exits
                        .get(&(exit, num))
                        .ok_or_else(|| malformed_error!("{} has no exit {}", exit, num))?
                }
                _ => return Err(malformed_error!("{} is not a block exit", exit)),
            };

            let &(target, pred) = cfg
                .successors
                .get(&taken)
                .ok_or_else(|| malformed_error!("{} leads nowhere", taken))?;
            self.enter(&mut state, &cfg, target, pred)?;
            block = target;
        }
    }

    fn enter(&self, state: &mut Execution, cfg: &ControlFlow, block: NodeId, pred: usize) -> Result<()> {
        let mut incoming = Vec::new();
        if let Some(phis) = cfg.phis.get(&block) {
            for &phi in phis {
                let node = self.graph.get(phi)?;
                let operand = node.operand(pred).ok_or(Error::OperandOutOfRange {
                    node: phi,
                    index: pred,
                    arity: node.arity(),
                })?;
                incoming.push((phi, self.value(state, operand)?));
            }
        }
        state.memo.clear();
        state.phis.extend(incoming);
        Ok(())
    }

    fn tick(&self, state: &mut Execution) -> Result<()> {
        state.steps += 1;
        if state.steps > self.step_limit {
            return Err(Error::StepLimit(self.step_limit));
        }
        Ok(())
    }

    fn value(&self, state: &mut Execution, id: NodeId) -> Result<BitValue> {
        if let Some(&value) = state.memo.get(&id) {
            return Ok(value);
        }
        self.tick(state)?;
        if id.index() >= state.active.len() {
            return Err(Error::NodeNotFound(id));
        }
        if state.active[id.index()] {
            return Err(malformed_error!("{} depends on itself without a phi", id));
        }
        state.active[id.index()] = true;
        let computed = self.compute(state, id);
        state.active[id.index()] = false;

        let mut value = computed?;
        if let Some((node, bit)) = self.flip {
            if node == id {
                value = value.flip_bit(bit);
            }
        }
        state.memo.insert(id, value);
        Ok(value)
    }

    fn compute(&self, state: &mut Execution, id: NodeId) -> Result<BitValue> {
        let node = self.graph.get(id)?;
        let mode = node.mode();
        if !mode.is_int() && !mode.is_bool() {
            return Err(Error::NotSupported(node.opcode().name()));
        }

        let value = match node.opcode() {
            Opcode::Const(value) => *value,
            Opcode::Param(index) => {
                let value = *self
                    .params
                    .get(*index as usize)
                    .ok_or(Error::MissingParameter(*index))?;
                if value.mode() != mode {
                    return Err(Error::ModeMismatch {
                        expected: mode,
                        found: value.mode(),
                    });
                }
                value
            }
            Opcode::Unknown => BitValue::zero(mode),
            Opcode::Phi => *state
                .phis
                .get(&id)
                .ok_or_else(|| malformed_error!("{} read before its block was entered", id))?,
            Opcode::Conv => {
                let source = self.operand(state, node, 0)?;
                if !source.mode().is_int() && !source.mode().is_bool() {
                    return Err(Error::NotSupported("Conv"));
                }
                source.convert(mode)
            }
            Opcode::Confirm(_) => self.operand(state, node, 0)?,
            Opcode::Not => self.operand(state, node, 0)?.not(),
            Opcode::Minus => self.operand(state, node, 0)?.neg(Overflow::Wrap),
            Opcode::Cmp(relation) => {
                let left = self.operand(state, node, 0)?;
                let right = self.operand(state, node, 1)?;
                BitValue::from_bool(relation.holds(left.compare(&right)))
            }
            Opcode::Mux => {
                let selector = self.operand(state, node, 0)?;
                let index = if selector.is_zero() { 1 } else { 2 };
                self.operand(state, node, index)?
            }
            opcode if opcode.is_binop() => {
                let left = self.operand(state, node, 0)?;
                let right = self.operand(state, node, 1)?;
                match opcode {
                    Opcode::And => left.and(&right),
                    Opcode::Or => left.or(&right),
                    Opcode::Eor => left.xor(&right),
                    Opcode::Shl => left.shl_by(&right),
                    Opcode::Shr => left.shr_by(&right),
                    Opcode::Shrs => left.shrs_by(&right),
                    Opcode::Add => left.add(&right, Overflow::Wrap),
                    Opcode::Sub => left.sub(&right, Overflow::Wrap),
                    Opcode::Mul => left.mul(&right, Overflow::Wrap),
                    Opcode::Div => left
                        .div(&right, Overflow::Wrap)
                        .ok_or(Error::DivisionByZero(id))?,
                    Opcode::Mod => left.rem(&right).ok_or(Error::DivisionByZero(id))?,
                    _ => return Err(Error::NotSupported(opcode.name())),
                }
            }
            opcode => return Err(Error::NotSupported(opcode.name())),
        };
        Ok(value)
    }

    fn operand(&self, state: &mut Execution, node: &Node, index: usize) -> Result<BitValue> {
        let operand = node.operand(index).ok_or_else(|| {
            malformed_error!("{} is missing operand {}", node.opcode().name(), index)
        })?;
        self.value(state, operand)
    }
}

/// Mutable state of one run.
struct Execution {
    memo: HashMap<NodeId, BitValue>,
    phis: HashMap<NodeId, BitValue>,
    active: Vec<bool>,
    steps: usize,
}

/// Block-level control flow, derived from the graph once per run.
struct ControlFlow {
    /// The single exit of each block.
    exits: HashMap<NodeId, NodeId>,
    /// Control projections of each `Cond`, by projection number.
    cond_exits: HashMap<(NodeId, u32), NodeId>,
    /// Target block and predecessor index of each control edge.
    successors: HashMap<NodeId, (NodeId, usize)>,
    /// Phis grouped by block.
    phis: HashMap<NodeId, Vec<NodeId>>,
}

impl ControlFlow {
    fn build(graph: &Graph) -> Result<Self> {
        let mut cfg = ControlFlow {
            exits: HashMap::new(),
            cond_exits: HashMap::new(),
            successors: HashMap::new(),
            phis: HashMap::new(),
        };

        for (id, node) in graph.nodes() {
            match node.opcode() {
                Opcode::Block if id != graph.end_block() => {
                    for (index, &pred) in node.operands().iter().enumerate() {
                        cfg.successors.insert(pred, (id, index));
                    }
                }
                Opcode::Jmp | Opcode::Cond | Opcode::Return => {
                    let block = node
                        .block()
                        .ok_or_else(|| malformed_error!("{} has no block", id))?;
                    if let Some(other) = cfg.exits.insert(block, id) {
                        return Err(malformed_error!("{} has two exits, {} and {}", block, other, id));
                    }
                }
                Opcode::Proj(num) if node.mode().is_control() => {
                    if let Some(&tuple) = node.operands().first() {
                        cfg.cond_exits.insert((tuple, *num), id);
                    }
                }
                Opcode::Phi => {
                    if let Some(block) = node.block() {
                        cfg.phis.entry(block).or_default().push(id);
                    }
                }
                _ => {}
            }
        }
        Ok(cfg)
    }
}
