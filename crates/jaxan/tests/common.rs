use std::sync::Once;

use jaxan::{Instruction, Literal, MethodBody, MethodIdentifier, types};
use tracing_subscriber::EnvFilter;

pub const RESPONSE: &str = "javax/ws/rs/core/Response";
pub const BUILDER: &str = "javax/ws/rs/core/Response$ResponseBuilder";
pub const RESOURCE: &str = "com/example/UserResource";

/// Route test logs through the test harness; `RUST_LOG` selects what is shown.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn method(owner: &str, name: &str, descriptor: &str, is_static: bool) -> MethodIdentifier {
    MethodIdentifier::from_descriptor(owner, name, descriptor, is_static)
        .expect("valid method descriptor")
}

pub fn resource_method(name: &str, descriptor: &str) -> MethodIdentifier {
    method(RESOURCE, name, descriptor, false)
}

pub fn body(identifier: MethodIdentifier, instructions: Vec<Instruction>) -> MethodBody {
    MethodBody::new(identifier, instructions)
}

pub fn string(value: &str) -> Instruction {
    Instruction::push(Literal::string(value), types::STRING)
}

pub fn int(value: i64) -> Instruction {
    Instruction::push(Literal::Int(value), types::PRIMITIVE_INT)
}

/// `Response.status(int)`
pub fn status_int() -> Instruction {
    Instruction::invoke(method(
        RESPONSE,
        "status",
        "(I)Ljavax/ws/rs/core/Response$ResponseBuilder;",
        true,
    ))
}

/// `Response.ok(Object)`
pub fn ok_entity() -> Instruction {
    Instruction::invoke(method(
        RESPONSE,
        "ok",
        "(Ljava/lang/Object;)Ljavax/ws/rs/core/Response$ResponseBuilder;",
        true,
    ))
}

pub fn build() -> Instruction {
    Instruction::invoke(method(BUILDER, "build", "()Ljavax/ws/rs/core/Response;", false))
}

/// A resolver answering from a fixed set of project methods.
pub fn project(
    methods: Vec<(MethodIdentifier, Vec<Instruction>)>,
) -> impl Fn(&MethodIdentifier) -> Option<Vec<Instruction>> + Send + Sync {
    move |identifier: &MethodIdentifier| {
        methods
            .iter()
            .find(|(candidate, _)| candidate == identifier)
            .map(|(_, instructions)| instructions.clone())
    }
}
