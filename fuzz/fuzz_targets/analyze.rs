#![no_main]

use carebits::prelude::*;
use libfuzzer_sys::fuzz_target;

const MODES: [Mode; 6] = [Mode::U8, Mode::I8, Mode::U16, Mode::I32, Mode::U64, Mode::B];

/// Decodes the input as a list of 4-byte instructions `[op, a, b, imm]`
/// appended to a single block; malformed instructions are skipped.
fn decode(data: &[u8]) -> Graph {
    let mut graph = Graph::new();
    let block = graph.start_block();
    let mut values: Vec<NodeId> = Vec::new();

    for chunk in data.chunks_exact(4) {
        let [op, a, b, imm] = [chunk[0], chunk[1], chunk[2], chunk[3]];
        let mode = MODES[usize::from(imm) % MODES.len()];
        let operand = |index: u8| values.get(usize::from(index) % values.len().max(1)).copied();

        let node = match (op % 16, operand(a), operand(b)) {
            (0, ..) => graph.new_param(u32::from(a % 4), mode),
            (1, ..) => Ok(graph.new_const(BitValue::new(mode, u64::from(b) << (imm % 57)))),
            (2, Some(l), Some(r)) => graph.new_add(block, l, r, mode),
            (3, Some(l), Some(r)) => graph.new_sub(block, l, r, mode),
            (4, Some(l), Some(r)) => graph.new_mul(block, l, r, mode),
            (5, Some(l), Some(r)) => graph.new_and(block, l, r, mode),
            (6, Some(l), Some(r)) => graph.new_or(block, l, r, mode),
            (7, Some(l), Some(r)) => graph.new_eor(block, l, r, mode),
            (8, Some(l), Some(r)) => graph.new_shl(block, l, r, mode),
            (9, Some(l), Some(r)) => graph.new_shr(block, l, r, mode),
            (10, Some(l), Some(r)) => graph.new_shrs(block, l, r, mode),
            (11, Some(v), _) => graph.new_conv(block, v, mode),
            (12, Some(v), _) => graph.new_not(block, v, mode),
            (13, Some(l), Some(r)) => graph.new_cmp(block, Relation::from_bits_truncate(imm), l, r),
            (14, Some(s), Some(v)) => graph.new_mux(block, s, v, v, mode),
            (15, Some(l), Some(r)) => graph.new_binop(block, Opcode::Div, l, r, mode),
            _ => continue,
        };
        if let Ok(node) = node {
            values.push(node);
        }
    }

    let mem = graph.initial_mem();
    let results: Vec<NodeId> = values.iter().rev().take(2).copied().collect();
    let _ = graph.new_return(block, mem, &results);
    graph
}

fuzz_target!(|data: &[u8]| {
    let graph = decode(data);
    let results = analyze(&graph);
    assert_eq!(results.len(), graph.node_count());
    for (id, node) in graph.nodes() {
        let mask = results.mask(id).unwrap();
        assert!(mask.fits(node.mode()), "{id}: {mask} does not fit {}", node.mode());
    }
});
