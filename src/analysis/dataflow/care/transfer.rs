//! Backward transfer rules of the don't-care analysis.
//!
//! [`transfer`] looks at one node and the bits currently demanded of it, and
//! returns the demand it places on each of its operands (and, for control
//! and merge nodes, on its owning block). It never reads the masks of other
//! nodes, which keeps every rule independently checkable.
//!
//! # Rules
//!
//! | Node | Operand demands |
//! |---|---|
//! | `Block` | own mask to every control predecessor |
//! | `Return` | `Full` to the block, own mask to memory and results |
//! | other control producers | `Full` to every operand and the block |
//! | `Phi` | own mask to every incoming value, `Full` to the block |
//! | `Conv` (int to int) | own mask converted to the source, plus the source sign bit when sign extension reaches a demanded bit |
//! | `And` / `Or` with a constant | `care & c` / `care & !c` to the other operand, `care` to the constant |
//! | `Mux` | `care` to both values, `Full` to the selector |
//! | `Eor`, `Confirm`, `Not` | `care` to every operand |
//! | `Add`, `Sub`, `Minus` | every bit up to the highest demanded bit |
//! | `Shr`, `Shrs`, `Shl` | shifted mask for constant amounts, a widened mask otherwise; `Full` to the amount |
//! | `Mul` | every bit up to the highest demanded bit, shifted down by the trailing zeros of a constant right operand |
//! | memory and tuple nodes | own mask to every operand |
//! | everything else | `Full` to every operand |

use crate::{
    analysis::dataflow::care::{CareMask, Demand},
    ir::{BitValue, Graph, Mode, Node, NodeId, Opcode, Overflow},
};

/// Computes the demands `node` places on other nodes, given its own mask.
///
/// # Arguments
///
/// * `graph` - The graph containing `node`, used to recognise constant operands
/// * `node` - The node being propagated
/// * `care` - The mask currently stored for `node`
/// * `overflow` - Arithmetic policy for the mask computations; must wrap
///
/// # Returns
///
/// One `(target, demand)` pair per edge demand flows along, in operand order.
#[must_use]
pub fn transfer(graph: &Graph, node: &Node, care: CareMask, overflow: Overflow) -> Vec<(NodeId, Demand)> {
    let mode = node.mode();
    let operands = node.operands();
    let own = Demand::Mask(care);

    match node.opcode() {
        Opcode::Block => operands.iter().map(|&pred| (pred, own)).collect(),
        Opcode::Return => {
            let mut demands = full_on_block(node);
            demands.extend(operands.iter().map(|&operand| (operand, own)));
            demands
        }
        _ if mode.is_control() => {
            let mut demands = full_on_all(operands);
            demands.extend(full_on_block(node));
            demands
        }
        Opcode::Phi => {
            let mut demands: Vec<_> = operands.iter().map(|&operand| (operand, own)).collect();
            demands.extend(full_on_block(node));
            demands
        }
        _ if mode.is_int() || mode.is_bool() => {
            value_rule(graph, node, care.to_value(), overflow)
        }
        _ if mode.is_memory() || mode.is_tuple() => {
            operands.iter().map(|&operand| (operand, own)).collect()
        }
        _ => full_on_all(operands),
    }
}

/// Rules for integer and boolean nodes; `care` is in the node's mode.
fn value_rule(graph: &Graph, node: &Node, care: BitValue, overflow: Overflow) -> Vec<(NodeId, Demand)> {
    let operands = node.operands();
    let mode = node.mode();

    let (Some(&first), second) = (operands.first(), operands.get(1).copied()) else {
        return full_on_all(operands);
    };

    match node.opcode() {
        Opcode::Conv => vec![(first, conv_demand(graph, mode, first, care))],
        Opcode::And | Opcode::Or => {
            let Some(second) = second else {
                return full_on_all(operands);
            };
            let keep = |constant: &BitValue| {
                if *node.opcode() == Opcode::And {
                    care.and(constant)
                } else {
                    care.and(&constant.not())
                }
            };
            if let Some(constant) = graph.const_value(second) {
                vec![(first, keep(constant).into()), (second, care.into())]
            } else if let Some(constant) = graph.const_value(first) {
                vec![(first, care.into()), (second, keep(constant).into())]
            } else {
                vec![(first, care.into()), (second, care.into())]
            }
        }
        Opcode::Mux => {
            let mut demands = vec![(first, Demand::Full)];
            demands.extend(operands[1..].iter().map(|&value| (value, care.into())));
            demands
        }
        Opcode::Eor | Opcode::Confirm(_) | Opcode::Not => {
            operands.iter().map(|&operand| (operand, care.into())).collect()
        }
        Opcode::Add | Opcode::Sub | Opcode::Minus => {
            let below = msb_and_below(&care, overflow);
            operands.iter().map(|&operand| (operand, below.into())).collect()
        }
        Opcode::Shr | Opcode::Shrs | Opcode::Shl => {
            let Some(amount) = second else {
                return full_on_all(operands);
            };
            let value = match (node.opcode(), graph.const_value(amount)) {
                (Opcode::Shl, Some(shift)) => care.shr(shift.shift_amount()),
                (Opcode::Shl, None) => msb_and_below(&care, overflow),
                (Opcode::Shrs, Some(shift)) => {
                    let shift = shift.shift_amount();
                    let demand = care.shl(shift);
                    // bits filled in from the sign that are demanded
                    let sign = BitValue::sign_bit_value(mode);
                    if sign.shrs(shift).and(&care).is_zero() {
                        demand
                    } else {
                        demand.or(&sign)
                    }
                }
                (_, Some(shift)) => care.shl(shift.shift_amount()),
                (_, None) => lsb_and_above(&care, overflow),
            };
            vec![(first, value.into()), (amount, Demand::Full)]
        }
        Opcode::Mul => {
            let Some(second) = second else {
                return full_on_all(operands);
            };
            let below = msb_and_below(&care, overflow);
            let left = match graph.const_value(second) {
                // a zero factor takes every bit out of the product
                Some(factor) => below.shr(factor.lowest_bit().unwrap_or(mode.bits())),
                None => below,
            };
            vec![(first, left.into()), (second, below.into())]
        }
        _ => full_on_all(operands),
    }
}

/// Demand of an integer or boolean conversion on its source.
fn conv_demand(graph: &Graph, mode: Mode, source: NodeId, care: BitValue) -> Demand {
    let Some(source_mode) = graph.node(source).map(Node::mode) else {
        return Demand::Full;
    };
    if !mode.is_int() || !source_mode.is_int() {
        return CareMask::from_value(care).into();
    }

    let source_bits = source_mode.bits();
    let sign_extends = source_bits < mode.bits() && source_mode.is_signed();
    let reaches_sign = care.highest_bit().is_some_and(|h| h + 1 >= source_bits);
    let care = if sign_extends && reaches_sign {
        // bits at and above the source sign position all copy the sign bit
        care.or(&BitValue::one(mode).shl(source_bits - 1))
    } else {
        care.convert(mode.as_unsigned())
    };
    care.convert(source_mode).into()
}

/// Every bit at or below the highest set bit; zero for zero.
///
/// Computed as `(1 << (h + 1)) - 1`, which needs wrapping arithmetic when `h`
/// is the top bit of the mode.
#[must_use]
pub fn msb_and_below(mask: &BitValue, overflow: Overflow) -> BitValue {
    match mask.highest_bit() {
        None => BitValue::zero(mask.mode()),
        Some(highest) => {
            let one = BitValue::one(mask.mode());
            one.shl(highest + 1).sub(&one, overflow)
        }
    }
}

/// Every bit at or above the lowest set bit; zero for zero.
///
/// Computed as `-(m & -m)`.
#[must_use]
pub fn lsb_and_above(mask: &BitValue, overflow: Overflow) -> BitValue {
    mask.and(&mask.neg(overflow)).neg(overflow)
}

fn full_on_all(operands: &[NodeId]) -> Vec<(NodeId, Demand)> {
    operands.iter().map(|&operand| (operand, Demand::Full)).collect()
}

fn full_on_block(node: &Node) -> Vec<(NodeId, Demand)> {
    node.block().map(|block| (block, Demand::Full)).into_iter().collect()
}
