//! Linear operand-stack depth tracking.

use jaxan_ir::{Instruction, InstructionKind};
use tracing::trace;

use crate::error::{FlowError, Result};

/// Subroutine opcodes push return addresses the model has no representation for.
const UNSUPPORTED_OPCODES: [&str; 3] = ["JSR", "JSR_W", "RET"];

/// Operand stack depth around one instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StackDepth {
    pub before: u32,
    pub after: u32,
}

/// Stack depth before and after every instruction of a method body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackDepths {
    depths: Vec<StackDepth>,
}

impl StackDepths {
    /// Walk the instructions in order, accumulating stack deltas.
    ///
    /// `Return` and `Throw` reset the depth to zero. Jumps are not followed: the depth
    /// entering an instruction is whatever the previous instruction left.
    pub fn compute(instructions: &[Instruction]) -> Result<Self> {
        let mut depths = Vec::with_capacity(instructions.len());
        let mut depth: i64 = 0;

        for (index, instruction) in instructions.iter().enumerate() {
            let before = depth;
            let after = match &instruction.kind {
                InstructionKind::Other { opcode_name }
                    if UNSUPPORTED_OPCODES.contains(&opcode_name.as_str()) =>
                {
                    return Err(FlowError::UnsupportedOperation {
                        index,
                        opcode: opcode_name.clone(),
                    });
                }
                // A void return leaves nothing to pop.
                InstructionKind::Return => 0,
                InstructionKind::Throw if before == 0 => {
                    return Err(FlowError::InvalidBytecode {
                        index,
                        reason: "throw on an empty stack".to_string(),
                    });
                }
                InstructionKind::Throw => 0,
                kind => before + i64::from(kind.stack_delta()),
            };

            if after < 0 {
                return Err(FlowError::InvalidBytecode {
                    index,
                    reason: format!(
                        "stack underflow: depth {before}, {} changes it by {}",
                        instruction.kind.opcode_name(),
                        instruction.stack_delta()
                    ),
                });
            }

            depths.push(StackDepth {
                before: to_depth(before),
                after: to_depth(after),
            });
            depth = after;
        }

        trace!(instructions = depths.len(), "stack depths computed");
        Ok(Self { depths })
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<StackDepth> {
        self.depths.get(index).copied()
    }

    pub fn before(&self, index: usize) -> u32 {
        self.depths[index].before
    }

    pub fn after(&self, index: usize) -> u32 {
        self.depths[index].after
    }

    pub fn iter(&self) -> impl Iterator<Item = &StackDepth> {
        self.depths.iter()
    }

    /// First instruction of the statement ending at `end`: walk backwards while the stack
    /// was non-empty on entry.
    pub fn statement_start(&self, end: usize) -> usize {
        let mut current = end;
        while current > 0 && self.depths[current].before > 0 {
            current -= 1;
        }
        current
    }

    /// First position at or after `from` where the stack is empty again.
    pub fn statement_end(&self, from: usize) -> Option<usize> {
        (from..self.depths.len()).find(|&index| self.depths[index].after == 0)
    }
}

fn to_depth(depth: i64) -> u32 {
    u32::try_from(depth).unwrap_or(u32::MAX)
}
