//! Graph fixtures shared by the unit tests.

use crate::ir::{BitValue, Graph, Mode, NodeId, Relation};

/// `return a & 0x0f` with `a: u8`.
pub struct MaskedReturn {
    pub graph: Graph,
    pub a: NodeId,
    pub mask: NodeId,
    pub and: NodeId,
}

pub fn masked_return() -> MaskedReturn {
    let mut graph = Graph::new();
    let block = graph.start_block();
    let a = graph.new_param(0, Mode::U8).unwrap();
    let mask = graph.new_const(BitValue::new(Mode::U8, 0x0F));
    let and = graph.new_and(block, a, mask, Mode::U8).unwrap();
    let mem = graph.initial_mem();
    graph.new_return(block, mem, &[and]).unwrap();
    MaskedReturn {
        graph,
        a,
        mask,
        and,
    }
}

/// `return max(a, b)` with `a, b: i8`, as a branch and a phi.
pub struct Diamond {
    pub graph: Graph,
    pub a: NodeId,
    pub b: NodeId,
    pub less: NodeId,
    pub join: NodeId,
    pub max: NodeId,
}

pub fn diamond() -> Diamond {
    let mut graph = Graph::new();
    let entry = graph.start_block();
    let a = graph.new_param(0, Mode::I8).unwrap();
    let b = graph.new_param(1, Mode::I8).unwrap();
    let less = graph.new_cmp(entry, Relation::LESS, a, b).unwrap();
    let cond = graph.new_cond(entry, less).unwrap();
    let if_false = graph.new_proj(entry, cond, 0, Mode::X).unwrap();
    let if_true = graph.new_proj(entry, cond, 1, Mode::X).unwrap();
    let join = graph.new_block(&[if_false, if_true]).unwrap();
    let max = graph.new_phi(join, &[a, b], Mode::I8).unwrap();
    let mem = graph.initial_mem();
    graph.new_return(join, mem, &[max]).unwrap();
    Diamond {
        graph,
        a,
        b,
        less,
        join,
        max,
    }
}

/// Sums `1..=n` in a loop and returns the low byte of the sum.
///
/// ```text
/// i = 0; sum = 0
/// while i < n { i += 1; sum += i }
/// return sum as u8
/// ```
pub struct CountingLoop {
    pub graph: Graph,
    pub n: NodeId,
    pub i: NodeId,
    pub sum: NodeId,
    pub next_i: NodeId,
    pub next_sum: NodeId,
    pub result: NodeId,
}

pub fn counting_loop() -> CountingLoop {
    let mut graph = Graph::new();
    let entry = graph.start_block();
    let n = graph.new_param(0, Mode::U32).unwrap();
    let zero = graph.new_const(BitValue::zero(Mode::U32));
    let one = graph.new_const(BitValue::one(Mode::U32));
    let enter = graph.new_jmp(entry).unwrap();

    let header = graph.new_block(&[enter]).unwrap();
    let i = graph.new_phi(header, &[zero], Mode::U32).unwrap();
    let sum = graph.new_phi(header, &[zero], Mode::U32).unwrap();
    let done = graph.new_cmp(header, Relation::GREATER_EQUAL, i, n).unwrap();
    let cond = graph.new_cond(header, done).unwrap();
    let stay = graph.new_proj(header, cond, 0, Mode::X).unwrap();
    let leave = graph.new_proj(header, cond, 1, Mode::X).unwrap();

    let body = graph.new_block(&[stay]).unwrap();
    let next_i = graph.new_add(body, i, one, Mode::U32).unwrap();
    let next_sum = graph.new_add(body, sum, next_i, Mode::U32).unwrap();
    let back = graph.new_jmp(body).unwrap();
    graph.add_operand(header, back).unwrap();
    graph.add_operand(i, next_i).unwrap();
    graph.add_operand(sum, next_sum).unwrap();

    let exit = graph.new_block(&[leave]).unwrap();
    let result = graph.new_conv(exit, sum, Mode::U8).unwrap();
    let mem = graph.initial_mem();
    graph.new_return(exit, mem, &[result]).unwrap();

    CountingLoop {
        graph,
        n,
        i,
        sum,
        next_i,
        next_sum,
        result,
    }
}
