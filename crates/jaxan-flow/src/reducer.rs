//! Backward relevance slicing.
//!
//! Keeps only the instructions that can influence what a method returns or throws. The
//! bytecode has no statement terminator, so a return to stack depth zero stands in for
//! one: a "statement" is a maximal run of instructions entered with a non-empty stack,
//! plus the instruction that started it.
//!
//! The slice is control-flow insensitive. Every load and store of a relevant local
//! variable pulls in its enclosing statement, regardless of which branch it sits on.

use jaxan_ir::{Instruction, InstructionKind};
use rustc_hash::FxHashSet;
use tracing::{debug, trace, trace_span};

use crate::depth::StackDepths;
use crate::error::Result;

/// Variable names that never make a statement relevant.
pub const DEFAULT_IGNORED_VARIABLES: [&str; 1] = ["this"];

/// Relevance reducer settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReducerConfig {
    /// Names of local variables whose loads are not followed (the receiver).
    pub ignored_variables: Vec<String>,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            ignored_variables: DEFAULT_IGNORED_VARIABLES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl ReducerConfig {
    fn is_ignored(&self, name: Option<&str>) -> bool {
        name.is_some_and(|name| self.ignored_variables.iter().any(|ignored| ignored == name))
    }
}

/// Reduce a method body to the instructions relevant to its returned or thrown values.
///
/// The result keeps the original program order. A body that never returns a value
/// reduces to nothing.
pub fn reduce(instructions: &[Instruction], config: &ReducerConfig) -> Result<Vec<Instruction>> {
    let depths = {
        let _span = trace_span!("stack_depths").entered();
        StackDepths::compute(instructions)?
    };

    let positions = {
        let _span = trace_span!("slice").entered();
        relevant_positions(instructions, &depths, config)
    };

    debug!(
        instructions = instructions.len(),
        relevant = positions.len(),
        "instructions reduced"
    );

    Ok(positions
        .into_iter()
        .map(|index| instructions[index].clone())
        .collect())
}

/// Positions (ascending) of the instructions relevant to any returned or thrown value.
pub fn relevant_positions(
    instructions: &[Instruction],
    depths: &StackDepths,
    config: &ReducerConfig,
) -> Vec<usize> {
    debug_assert_eq!(instructions.len(), depths.len());

    let mut visited = vec![false; instructions.len()];
    let mut handled_slots: FxHashSet<u16> = FxHashSet::default();

    // Seeds are pushed in ascending order so the last exit is visited first.
    let mut backtrack: Vec<usize> = instructions
        .iter()
        .enumerate()
        .filter(|(index, instruction)| instruction.is_exit() && depths.before(*index) > 0)
        .map(|(index, _)| index)
        .collect();

    let mut iterations = 0usize;
    while let Some(position) = backtrack.pop() {
        if visited[position] {
            continue;
        }
        iterations += 1;

        let start = depths.statement_start(position);
        let mut new_slots = Vec::new();
        for index in start..=position {
            visited[index] = true;
            if let InstructionKind::Load { slot, name, .. } = &instructions[index].kind {
                if !config.is_ignored(name.as_deref()) && handled_slots.insert(*slot) {
                    new_slots.push(*slot);
                }
            }
        }

        for slot in new_slots {
            trace!(slot, statement_end = position, "following local variable");
            for (index, instruction) in instructions.iter().enumerate() {
                if instruction.variable_slot() != Some(slot) {
                    continue;
                }
                if let Some(end) = depths.statement_end(index) {
                    if !visited[end] {
                        backtrack.push(end);
                    }
                }
            }
        }
    }

    trace!(iterations, "slice complete");

    visited
        .iter()
        .enumerate()
        .filter_map(|(index, &relevant)| relevant.then_some(index))
        .collect()
}
