//! Single decoded instruction.

use std::fmt;

use crate::identifier::MethodIdentifier;
use crate::literal::Literal;

/// Control-flow label an instruction originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// What an instruction does, reduced to the operations the analyzer models.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    /// Push a constant.
    Push { value: Literal, static_type: String },
    /// Push a local variable.
    Load {
        slot: u16,
        static_type: String,
        name: Option<String>,
    },
    /// Pop into a local variable.
    Store {
        slot: u16,
        static_type: String,
        name: Option<String>,
    },
    /// Duplicate the top of stack.
    Dup,
    /// Return the top of stack (or nothing, for a void return on an empty stack).
    Return,
    /// Throw the top of stack.
    Throw,
    /// Replace an object reference by one of its fields.
    GetField {
        owner: String,
        name: String,
        field_type: String,
    },
    /// Push a static field, with its value when it is a resolved constant.
    GetStatic {
        owner: String,
        name: String,
        field_type: String,
        constant_value: Option<Literal>,
    },
    /// Push a fresh, uninitialized object.
    New { created_type: String },
    /// Method invocation; stack effect follows from the identifier.
    Invoke { identifier: MethodIdentifier },
    /// Dynamic call site (lambda, method reference, string concatenation).
    ///
    /// `synthetic_identifier` is the call-site signature: captured arguments as parameters,
    /// the functional interface as return type. `handle_identifier` is the implementation
    /// method the handle points to.
    InvokeDynamic {
        handle_identifier: MethodIdentifier,
        synthetic_identifier: MethodIdentifier,
    },
    /// Start of an exception handler; the caught throwable is on the stack.
    ExceptionHandlerEntry,
    /// Any other opcode with a known push/pop count.
    SizeChange {
        pushes: u8,
        pops: u8,
        opcode_name: String,
    },
    /// Opcode that leaves the operand stack untouched (jumps, `iinc`, `nop`, ...).
    Other { opcode_name: String },
}

impl InstructionKind {
    /// Net change to the operand stack depth.
    pub fn stack_delta(&self) -> i32 {
        match self {
            Self::Push { .. }
            | Self::Load { .. }
            | Self::Dup
            | Self::GetStatic { .. }
            | Self::New { .. }
            | Self::ExceptionHandlerEntry => 1,
            Self::Store { .. } | Self::Return | Self::Throw => -1,
            Self::GetField { .. } | Self::Other { .. } => 0,
            Self::Invoke { identifier } => identifier.invoke_stack_delta(),
            Self::InvokeDynamic {
                synthetic_identifier,
                ..
            } => 1 - synthetic_identifier.arity() as i32,
            Self::SizeChange { pushes, pops, .. } => i32::from(*pushes) - i32::from(*pops),
        }
    }

    /// Mnemonic used in listings and error messages.
    pub fn opcode_name(&self) -> &str {
        match self {
            Self::Push { .. } => "PUSH",
            Self::Load { .. } => "LOAD",
            Self::Store { .. } => "STORE",
            Self::Dup => "DUP",
            Self::Return => "RETURN",
            Self::Throw => "ATHROW",
            Self::GetField { .. } => "GETFIELD",
            Self::GetStatic { .. } => "GETSTATIC",
            Self::New { .. } => "NEW",
            Self::Invoke { .. } => "INVOKE",
            Self::InvokeDynamic { .. } => "INVOKEDYNAMIC",
            Self::ExceptionHandlerEntry => "EXCEPTION_HANDLER",
            Self::SizeChange { opcode_name, .. } | Self::Other { opcode_name } => {
                opcode_name.as_str()
            }
        }
    }
}

/// A decoded instruction and the label it was found under.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub kind: InstructionKind,
    pub label: Option<Label>,
}

impl From<InstructionKind> for Instruction {
    fn from(kind: InstructionKind) -> Self {
        Self { kind, label: None }
    }
}

impl Instruction {
    /// `ldc`, `iconst_*`, `aconst_null` and friends.
    pub fn push(value: Literal, static_type: &str) -> Self {
        InstructionKind::Push {
            value,
            static_type: static_type.to_string(),
        }
        .into()
    }

    /// Load from a local without debug name.
    pub fn load(slot: u16, static_type: &str) -> Self {
        InstructionKind::Load {
            slot,
            static_type: static_type.to_string(),
            name: None,
        }
        .into()
    }

    /// Load from a named local.
    pub fn load_named(slot: u16, static_type: &str, name: &str) -> Self {
        InstructionKind::Load {
            slot,
            static_type: static_type.to_string(),
            name: Some(name.to_string()),
        }
        .into()
    }

    /// Store into a local without debug name.
    pub fn store(slot: u16, static_type: &str) -> Self {
        InstructionKind::Store {
            slot,
            static_type: static_type.to_string(),
            name: None,
        }
        .into()
    }

    /// Store into a named local.
    pub fn store_named(slot: u16, static_type: &str, name: &str) -> Self {
        InstructionKind::Store {
            slot,
            static_type: static_type.to_string(),
            name: Some(name.to_string()),
        }
        .into()
    }

    /// `dup`
    pub fn dup() -> Self {
        InstructionKind::Dup.into()
    }

    /// Any `*return`.
    pub fn ret() -> Self {
        InstructionKind::Return.into()
    }

    /// `athrow`
    pub fn throw() -> Self {
        InstructionKind::Throw.into()
    }

    /// `getfield`
    pub fn get_field(owner: &str, name: &str, field_type: &str) -> Self {
        InstructionKind::GetField {
            owner: owner.to_string(),
            name: name.to_string(),
            field_type: field_type.to_string(),
        }
        .into()
    }

    /// `getstatic` of a field without a known constant value.
    pub fn get_static(owner: &str, name: &str, field_type: &str) -> Self {
        InstructionKind::GetStatic {
            owner: owner.to_string(),
            name: name.to_string(),
            field_type: field_type.to_string(),
            constant_value: None,
        }
        .into()
    }

    /// `getstatic` of a resolved compile-time constant.
    pub fn get_static_constant(owner: &str, name: &str, field_type: &str, value: Literal) -> Self {
        InstructionKind::GetStatic {
            owner: owner.to_string(),
            name: name.to_string(),
            field_type: field_type.to_string(),
            constant_value: Some(value),
        }
        .into()
    }

    /// `new`
    pub fn new_object(created_type: &str) -> Self {
        InstructionKind::New {
            created_type: created_type.to_string(),
        }
        .into()
    }

    /// Any `invoke*` except `invokedynamic`.
    pub fn invoke(identifier: MethodIdentifier) -> Self {
        InstructionKind::Invoke { identifier }.into()
    }

    /// `invokedynamic` bound to `handle_identifier`.
    pub fn invoke_dynamic(
        handle_identifier: MethodIdentifier,
        synthetic_identifier: MethodIdentifier,
    ) -> Self {
        InstructionKind::InvokeDynamic {
            handle_identifier,
            synthetic_identifier,
        }
        .into()
    }

    /// Marks the first instruction of a catch block.
    pub fn exception_handler() -> Self {
        InstructionKind::ExceptionHandlerEntry.into()
    }

    /// Opcode modelled only by its push and pop counts.
    pub fn size_change(opcode_name: &str, pushes: u8, pops: u8) -> Self {
        InstructionKind::SizeChange {
            pushes,
            pops,
            opcode_name: opcode_name.to_string(),
        }
        .into()
    }

    /// Opcode with no operand-stack effect.
    pub fn other(opcode_name: &str) -> Self {
        InstructionKind::Other {
            opcode_name: opcode_name.to_string(),
        }
        .into()
    }

    /// Attach the originating label.
    #[must_use]
    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    /// Net change to the operand stack depth.
    pub fn stack_delta(&self) -> i32 {
        self.kind.stack_delta()
    }

    /// Whether the method exits here (the runtime stack is discarded).
    pub const fn is_exit(&self) -> bool {
        matches!(self.kind, InstructionKind::Return | InstructionKind::Throw)
    }

    /// Local-variable slot touched by a load or store.
    pub const fn variable_slot(&self) -> Option<u16> {
        match self.kind {
            InstructionKind::Load { slot, .. } | InstructionKind::Store { slot, .. } => Some(slot),
            _ => None,
        }
    }

    /// Local-variable name of a load or store, when debug info carried one.
    pub fn variable_name(&self) -> Option<&str> {
        match &self.kind {
            InstructionKind::Load { name, .. } | InstructionKind::Store { name, .. } => {
                name.as_deref()
            }
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = self.label {
            write!(f, "{label}: ")?;
        }
        match &self.kind {
            InstructionKind::Push { value, .. } => write!(f, "PUSH {value}"),
            InstructionKind::Load { slot, .. } => write!(f, "LOAD {slot}"),
            InstructionKind::Store { slot, .. } => write!(f, "STORE {slot}"),
            InstructionKind::GetField { owner, name, .. }
            | InstructionKind::GetStatic { owner, name, .. } => {
                write!(f, "{} {owner}.{name}", self.kind.opcode_name())
            }
            InstructionKind::New { created_type } => write!(f, "NEW {created_type}"),
            InstructionKind::Invoke { identifier } => write!(f, "INVOKE {identifier}"),
            InstructionKind::InvokeDynamic {
                handle_identifier, ..
            } => write!(f, "INVOKEDYNAMIC {handle_identifier}"),
            other => f.write_str(other.opcode_name()),
        }
    }
}
