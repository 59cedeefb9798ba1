//! Randomized soundness check of the don't-care analysis.
//!
//! Random functions are built from integer arithmetic, conversions, shifts
//! and selects, in three shapes: straight-line code, a branch whose arms
//! rejoin at phis, and a counted loop carrying values through back-edge phis.
//! For random inputs the reference interpreter runs once normally and once
//! per don't-care bit with that bit flipped; the returned values must never
//! differ.

use carebits::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

const MODES: [Mode; 5] = [Mode::U8, Mode::I8, Mode::U16, Mode::I32, Mode::U64];
const BINOPS: [Opcode; 6] = [
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::And,
    Opcode::Or,
    Opcode::Eor,
];
const SHIFTS: [Opcode; 3] = [Opcode::Shl, Opcode::Shr, Opcode::Shrs];
const RELATIONS: [Relation; 4] = [
    Relation::LESS,
    Relation::EQUAL,
    Relation::GREATER_EQUAL,
    Relation::LESS_GREATER,
];

const GRAPHS: u64 = 64;
const INPUTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Straight,
    Branch,
    Loop,
}

struct RandomFunction {
    graph: Graph,
    params: Vec<Mode>,
}

/// Flips performed by one soundness run, split by where the flipped node lives.
#[derive(Debug, Default)]
struct Coverage {
    flips: usize,
    outside_entry: usize,
    on_phis: usize,
}

struct Builder {
    rng: StdRng,
    graph: Graph,
    block: NodeId,
    /// Values usable in `block`.
    values: Vec<(NodeId, Mode)>,
}

impl Builder {
    fn new(seed: u64) -> Self {
        let graph = Graph::new();
        let block = graph.start_block();
        Builder {
            rng: StdRng::seed_from_u64(seed),
            graph,
            block,
            values: Vec::new(),
        }
    }

    fn mode(&mut self) -> Mode {
        MODES[self.rng.gen_range(0..MODES.len())]
    }

    fn pick(&mut self) -> (NodeId, Mode) {
        self.values[self.rng.gen_range(0..self.values.len())]
    }

    fn constant(&mut self, mode: Mode) -> NodeId {
        let raw = match self.rng.gen_range(0..3) {
            0 => self.rng.gen::<u64>(),
            1 => self.rng.gen_range(0..16),
            _ => mode.width_mask() >> self.rng.gen_range(0..mode.bits()),
        };
        self.graph.new_const(BitValue::new(mode, raw))
    }

    /// A value of `mode`, either an existing one or a fresh constant.
    fn operand(&mut self, mode: Mode) -> NodeId {
        let candidates: Vec<NodeId> = self
            .values
            .iter()
            .filter(|(_, m)| *m == mode)
            .map(|(id, _)| *id)
            .collect();
        if candidates.is_empty() || self.rng.gen_bool(0.25) {
            self.constant(mode)
        } else {
            candidates[self.rng.gen_range(0..candidates.len())]
        }
    }

    /// A value of `mode` taken from the newer half of `pool`, converted in
    /// `block` if its mode differs.
    fn value_in(&mut self, pool: &[(NodeId, Mode)], block: NodeId, mode: Mode) -> Result<NodeId> {
        let (value, found) = pool[self.rng.gen_range(pool.len() / 2..pool.len())];
        if found == mode {
            Ok(value)
        } else {
            self.graph.new_conv(block, value, mode)
        }
    }

    fn selector(&mut self) -> Result<NodeId> {
        let relation = RELATIONS[self.rng.gen_range(0..RELATIONS.len())];
        let (left, mode) = self.pick();
        let right = self.operand(mode);
        self.graph.new_cmp(self.block, relation, left, right)
    }

    fn instruction(&mut self) -> Result<(NodeId, Mode)> {
        let block = self.block;
        let (value, mode) = self.pick();
        let id = match self.rng.gen_range(0..10) {
            0..=3 => {
                let opcode = BINOPS[self.rng.gen_range(0..BINOPS.len())].clone();
                let other = self.operand(mode);
                if self.rng.gen_bool(0.5) {
                    self.graph.new_binop(block, opcode, value, other, mode)?
                } else {
                    self.graph.new_binop(block, opcode, other, value, mode)?
                }
            }
            4 | 5 => {
                let opcode = SHIFTS[self.rng.gen_range(0..SHIFTS.len())].clone();
                let amount = if self.rng.gen_bool(0.7) {
                    let raw = self.rng.gen_range(0..u64::from(mode.bits()) + 4);
                    self.graph.new_const(BitValue::new(Mode::U8, raw))
                } else {
                    self.pick().0
                };
                self.graph.new_binop(block, opcode, value, amount, mode)?
            }
            6 => {
                let target = self.mode();
                let converted = self.graph.new_conv(block, value, target)?;
                return Ok((converted, target));
            }
            7 => {
                if self.rng.gen_bool(0.5) {
                    self.graph.new_not(block, value, mode)?
                } else {
                    self.graph.new_minus(block, value, mode)?
                }
            }
            _ => {
                let selector = self.selector()?;
                let other = self.operand(mode);
                self.graph.new_mux(block, selector, value, other, mode)?
            }
        };
        Ok((id, mode))
    }

    fn straight(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            let value = self.instruction()?;
            self.values.push(value);
        }
        Ok(())
    }

    /// `if cond { .. } else { .. }` with both arms merging into fresh phis.
    fn branch(&mut self) -> Result<()> {
        let entry = self.block;
        let selector = self.selector()?;
        let cond = self.graph.new_cond(entry, selector)?;
        let if_false = self.graph.new_proj(entry, cond, 0, Mode::X)?;
        let if_true = self.graph.new_proj(entry, cond, 1, Mode::X)?;
        let outer = self.values.clone();

        let mut exits = Vec::with_capacity(2);
        let mut arms = Vec::with_capacity(2);
        for proj in [if_false, if_true] {
            self.block = self.graph.new_block(&[proj])?;
            self.values = outer.clone();
            let count = self.rng.gen_range(1..5);
            self.straight(count)?;
            exits.push(self.graph.new_jmp(self.block)?);
            arms.push((self.block, std::mem::take(&mut self.values)));
        }

        let join = self.graph.new_block(&exits)?;
        self.block = join;
        self.values = outer;
        for _ in 0..self.rng.gen_range(1..4) {
            let mode = self.mode();
            let mut incoming = Vec::with_capacity(arms.len());
            for (block, values) in &arms {
                incoming.push(self.value_in(values, *block, mode)?);
            }
            let phi = self.graph.new_phi(join, &incoming, mode)?;
            self.values.push((phi, mode));
        }
        Ok(())
    }

    /// `for _ in 0..trips { .. }` carrying some values around the back edge.
    fn counted_loop(&mut self) -> Result<()> {
        let entry = self.block;
        let zero = self.graph.new_const(BitValue::zero(Mode::U8));
        let one = self.graph.new_const(BitValue::one(Mode::U8));
        let trips = self.rng.gen_range(0..6);
        let trips = self.graph.new_const(BitValue::new(Mode::U8, trips));
        let enter = self.graph.new_jmp(entry)?;

        let header = self.graph.new_block(&[enter])?;
        let counter = self.graph.new_phi(header, &[zero], Mode::U8)?;
        let mut carried = Vec::new();
        for _ in 0..self.rng.gen_range(1..4) {
            let (init, mode) = self.pick();
            carried.push((self.graph.new_phi(header, &[init], mode)?, mode));
        }
        let done = self
            .graph
            .new_cmp(header, Relation::GREATER_EQUAL, counter, trips)?;
        let cond = self.graph.new_cond(header, done)?;
        let stay = self.graph.new_proj(header, cond, 0, Mode::X)?;
        let leave = self.graph.new_proj(header, cond, 1, Mode::X)?;
        self.values.extend(carried.iter().copied());
        let outer = self.values.clone();

        let body = self.graph.new_block(&[stay])?;
        self.block = body;
        let count = self.rng.gen_range(1..6);
        self.straight(count)?;
        let next = self.graph.new_add(body, counter, one, Mode::U8)?;
        let back = self.graph.new_jmp(body)?;
        self.graph.add_operand(header, back)?;
        self.graph.add_operand(counter, next)?;
        let inside = std::mem::take(&mut self.values);
        for &(phi, mode) in &carried {
            let update = self.value_in(&inside, body, mode)?;
            self.graph.add_operand(phi, update)?;
        }

        self.block = self.graph.new_block(&[leave])?;
        self.values = outer;
        Ok(())
    }

    fn build(mut self, shape: Shape) -> Result<RandomFunction> {
        let count = self.rng.gen_range(1..=3);
        let mut params = Vec::with_capacity(count);
        for index in 0..count {
            let mode = self.mode();
            let param = self.graph.new_param(index as u32, mode)?;
            self.values.push((param, mode));
            params.push(mode);
        }

        let head = self.rng.gen_range(2..10);
        self.straight(head)?;
        match shape {
            Shape::Straight => {}
            Shape::Branch => self.branch()?,
            Shape::Loop => self.counted_loop()?,
        }
        let tail = self.rng.gen_range(1..6);
        self.straight(tail)?;

        let mut results = vec![self.values[self.values.len() - 1].0];
        if self.rng.gen_bool(0.3) {
            results.push(self.pick().0);
        }
        let mem = self.graph.initial_mem();
        self.graph.new_return(self.block, mem, &results)?;
        self.graph.verify()?;

        Ok(RandomFunction {
            graph: self.graph,
            params,
        })
    }
}

/// Flips every don't-care bit of every integer node under random inputs and
/// asserts the returned values never change.
fn check_shape(shape: Shape) -> Result<Coverage> {
    let mut inputs = StdRng::seed_from_u64(0xCA4E);
    let mut coverage = Coverage::default();

    for seed in 0..GRAPHS {
        let function = Builder::new(seed).build(shape)?;
        let graph = &function.graph;
        let results = analyze(graph);

        for _ in 0..INPUTS {
            let params: Vec<BitValue> = function
                .params
                .iter()
                .map(|&mode| BitValue::new(mode, inputs.gen()))
                .collect();
            let evaluator = Evaluator::new(graph).with_params(params);
            let expected = evaluator.run()?;

            for (id, node) in graph.nodes() {
                if !node.mode().is_int() {
                    continue;
                }
                for bit in 0..node.mode().bits() {
                    if !results.is_dont_care(id, bit) {
                        continue;
                    }
                    let flipped = evaluator.clone().with_flip(id, bit).run()?;
                    assert_eq!(
                        flipped, expected,
                        "{shape:?} seed {seed}: flipping bit {bit} of {id} changed the result\n{}",
                        results.dump(graph)
                    );
                    coverage.flips += 1;
                    if node.block() != Some(graph.start_block()) {
                        coverage.outside_entry += 1;
                    }
                    if *node.opcode() == Opcode::Phi {
                        coverage.on_phis += 1;
                    }
                }
            }
        }
    }

    Ok(coverage)
}

#[test]
fn test_dont_care_bits_never_matter() -> Result<()> {
    let coverage = check_shape(Shape::Straight)?;
    assert!(coverage.flips > 0);
    Ok(())
}

#[test]
fn test_dont_care_bits_never_matter_across_branches() -> Result<()> {
    let coverage = check_shape(Shape::Branch)?;
    assert!(coverage.flips > 0);
    assert!(coverage.outside_entry > 0, "{coverage:?}");
    assert!(coverage.on_phis > 0, "{coverage:?}");
    Ok(())
}

#[test]
fn test_dont_care_bits_never_matter_around_loops() -> Result<()> {
    let coverage = check_shape(Shape::Loop)?;
    assert!(coverage.flips > 0);
    assert!(coverage.outside_entry > 0, "{coverage:?}");
    assert!(coverage.on_phis > 0, "{coverage:?}");
    Ok(())
}

#[test]
fn test_returned_values_are_fully_demanded() -> Result<()> {
    for shape in [Shape::Straight, Shape::Branch, Shape::Loop] {
        for seed in 0..GRAPHS {
            let function = Builder::new(seed).build(shape)?;
            let graph = &function.graph;
            let results = analyze(graph);

            for (_, node) in graph.nodes() {
                if *node.opcode() != Opcode::Return {
                    continue;
                }
                for &value in &node.operands()[1..] {
                    let mode = graph.mode_of(value)?;
                    assert_eq!(results.mask(value), Some(CareMask::top(mode)));
                }
            }
        }
    }
    Ok(())
}
