//! Method identity.

use std::fmt;

use crate::types::{self, DescriptorError};

/// Name of instance initializers.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Structural identity of a method: owner, name, signature and staticness.
///
/// Used as the method pool key. Owner is an internal class name (`com/example/Resource`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodIdentifier {
    owner: String,
    name: String,
    return_type: String,
    is_static: bool,
    parameters: Vec<String>,
}

impl MethodIdentifier {
    /// Create an identifier from already-split types.
    pub fn new(
        owner: &str,
        name: &str,
        return_type: &str,
        is_static: bool,
        parameters: Vec<String>,
    ) -> Self {
        Self {
            owner: types::owner_name(owner).to_string(),
            name: name.to_string(),
            return_type: return_type.to_string(),
            is_static,
            parameters,
        }
    }

    /// Create an identifier from a JVM method descriptor such as `(Ljava/lang/String;)V`.
    pub fn from_descriptor(
        owner: &str,
        name: &str,
        descriptor: &str,
        is_static: bool,
    ) -> Result<Self, DescriptorError> {
        let (parameters, return_type) = types::parse_method_descriptor(descriptor)?;
        Ok(Self::new(owner, name, &return_type, is_static, parameters))
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub const fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn returns_value(&self) -> bool {
        !types::is_void(&self.return_type)
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    /// Reassembled JVM method descriptor.
    pub fn descriptor(&self) -> String {
        format!("({}){}", self.parameters.concat(), self.return_type)
    }

    /// Net operand-stack change of invoking this method: pops the arguments (and the receiver
    /// for instance methods), pushes the result if any.
    pub fn invoke_stack_delta(&self) -> i32 {
        let pops = self.arity() + usize::from(!self.is_static);
        let pushes = usize::from(self.returns_value());
        pushes as i32 - pops as i32
    }

    /// Local-variable slot of every parameter, accounting for the receiver and wide types.
    pub fn parameter_slots(&self) -> Vec<u16> {
        let mut slot = u16::from(!self.is_static);
        self.parameters
            .iter()
            .map(|param| {
                let current = slot;
                slot += if types::is_wide(param) { 2 } else { 1 };
                current
            })
            .collect()
    }

    /// Whether this method is declared on the given internal class name.
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner == owner
    }
}

impl fmt::Display for MethodIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            f.write_str("static ")?;
        }
        write!(f, "{}#{}{}", self.owner, self.name, self.descriptor())
    }
}
