//! Symbolic execution of reduced method bodies.
//!
//! Instructions are executed in order over an operand stack of [`Element`]s. Jumps are
//! not followed; every return or throw reached in the listing contributes one possible
//! outcome and the outcomes are merged at the end.

use jaxan_flow::ReducerConfig;
use jaxan_ir::{Instruction, InstructionKind, MethodIdentifier, types};
use rustc_hash::FxHashMap;
use tracing::{debug, debug_span, trace, warn};

use crate::element::{Element, MethodHandle};
use crate::error::{Result, SimError};
use crate::known;
use crate::pool::{MethodPool, MethodResolver};

/// Default bound on nested project-method simulations per request.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 32;

/// Owner of the bootstrap method javac uses for string concatenation.
const STRING_CONCAT_FACTORY: &str = "java/lang/invoke/StringConcatFactory";

/// Method simulator settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Nested project calls deeper than this yield an unknown result.
    pub max_call_depth: usize,
    /// Reducer settings for callee bodies added to the pool.
    pub reducer: ReducerConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            reducer: ReducerConfig::default(),
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub const fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn with_reducer(mut self, reducer: ReducerConfig) -> Self {
        self.reducer = reducer;
        self
    }
}

/// Local-variable bindings of one simulated invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Locals {
    slots: FxHashMap<u16, Element>,
}

impl Locals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out a receiver and arguments the way the JVM fills a callee frame.
    pub fn for_call(
        identifier: &MethodIdentifier,
        receiver: Option<Element>,
        arguments: Vec<Element>,
    ) -> Self {
        let mut locals = Self::default();
        if !identifier.is_static() {
            let receiver =
                receiver.unwrap_or_else(|| Element::unknown(&types::object_type(identifier.owner())));
            locals.bind(0, receiver);
        }
        for (slot, argument) in identifier.parameter_slots().into_iter().zip(arguments) {
            locals.bind(slot, argument);
        }
        locals
    }

    /// Unknown values of the declared parameter types, for a method analyzed on its own.
    pub fn unknown_arguments(identifier: &MethodIdentifier) -> Self {
        let arguments = identifier
            .parameters()
            .iter()
            .map(|parameter| Element::unknown(parameter))
            .collect();
        Self::for_call(identifier, None, arguments)
    }

    pub fn bind(&mut self, slot: u16, element: Element) {
        self.slots.insert(slot, element);
    }

    pub fn get(&self, slot: u16) -> Option<&Element> {
        self.slots.get(&slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Project methods currently being simulated within one top-level request.
#[derive(Debug)]
struct CallStack {
    active: Vec<MethodIdentifier>,
    max_depth: usize,
}

impl CallStack {
    const fn new(max_depth: usize) -> Self {
        Self {
            active: Vec::new(),
            max_depth,
        }
    }

    fn enter(&mut self, identifier: &MethodIdentifier) -> Result<()> {
        if self.active.len() >= self.max_depth || self.active.contains(identifier) {
            return Err(SimError::RecursionLimitExceeded {
                identifier: identifier.clone(),
                depth: self.active.len(),
            });
        }
        self.active.push(identifier.clone());
        Ok(())
    }

    fn exit(&mut self) {
        self.active.pop();
    }
}

/// Where a stack entry came from, for propagating builder and constructor updates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    /// Loaded from a local variable slot.
    Local(u16),
    /// Created by the `new` at this instruction index (or a `dup` of it).
    New(usize),
}

/// A stack entry and its origin.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Operand {
    element: Element,
    source: Option<Source>,
}

/// Operand stack, locals and recorded outcomes of one invocation.
#[derive(Debug, Default)]
struct Frame {
    stack: Vec<Operand>,
    locals: Locals,
    outcomes: Vec<Element>,
}

impl Frame {
    fn new(locals: Locals) -> Self {
        Self {
            locals,
            ..Self::default()
        }
    }

    fn push(&mut self, element: Element) {
        self.stack.push(Operand {
            element,
            source: None,
        });
    }

    fn pop(&mut self, index: usize) -> Result<Operand> {
        self.stack.pop().ok_or_else(|| underflow(index))
    }

    /// Pop `count` operands, returned in push order.
    fn pop_n(&mut self, count: usize, index: usize) -> Result<Vec<Operand>> {
        let split = self
            .stack
            .len()
            .checked_sub(count)
            .ok_or_else(|| underflow(index))?;
        Ok(self.stack.split_off(split))
    }

    fn peek(&self, index: usize) -> Result<&Operand> {
        self.stack.last().ok_or_else(|| underflow(index))
    }

    /// Record that a call turned `receiver` into `updated`.
    ///
    /// Propagates to the local the receiver was loaded from and to every stack entry with
    /// the same origin. For a constructor the receiver is the `dup`ed copy of a `new`, so
    /// the copy left below it is updated too.
    fn rebind(&mut self, receiver: &Operand, updated: &Element) {
        let Some(source) = receiver.source else {
            return;
        };
        if let Source::Local(slot) = source {
            self.locals.bind(slot, updated.clone());
        }
        for operand in &mut self.stack {
            if operand.source == Some(source) {
                operand.element = updated.clone();
            }
        }
    }

    fn into_result(self) -> Element {
        let mut result = Element::default();
        for outcome in &self.outcomes {
            result.merge_in(outcome);
        }
        result
    }
}

fn underflow(index: usize) -> SimError {
    SimError::InvalidBytecode {
        index,
        reason: "operand stack underflow".to_string(),
    }
}

/// Simulates methods against a shared pool.
///
/// Holds only borrowed context; all per-request state (call stack, frames) lives in
/// the individual `simulate*` calls, so one simulator can serve many threads.
#[derive(Clone, Copy)]
pub struct MethodSimulator<'a> {
    pool: &'a MethodPool,
    resolver: &'a dyn MethodResolver,
    config: &'a SimulationConfig,
}

impl<'a> MethodSimulator<'a> {
    pub const fn new(
        pool: &'a MethodPool,
        resolver: &'a dyn MethodResolver,
        config: &'a SimulationConfig,
    ) -> Self {
        Self {
            pool,
            resolver,
            config,
        }
    }

    pub const fn config(&self) -> &SimulationConfig {
        self.config
    }

    /// Simulate a reduced instruction list with the given initial locals.
    pub fn simulate(&self, instructions: &[Instruction], locals: Locals) -> Result<Element> {
        let mut calls = CallStack::new(self.config.max_call_depth);
        self.run(instructions, locals, &mut calls)
    }

    /// Simulate the reduced body of `identifier` within its own tracing span.
    pub fn simulate_method(
        &self,
        identifier: &MethodIdentifier,
        instructions: &[Instruction],
        locals: Locals,
    ) -> Result<Element> {
        let _span = debug_span!("simulate", method = %identifier).entered();
        let result = self.simulate(instructions, locals)?;
        debug!(result = %result, "method simulated");
        Ok(result)
    }

    fn run(
        &self,
        instructions: &[Instruction],
        locals: Locals,
        calls: &mut CallStack,
    ) -> Result<Element> {
        let mut frame = Frame::new(locals);
        for (index, instruction) in instructions.iter().enumerate() {
            self.step(&mut frame, index, instruction, calls)?;
        }
        Ok(frame.into_result())
    }

    fn step(
        &self,
        frame: &mut Frame,
        index: usize,
        instruction: &Instruction,
        calls: &mut CallStack,
    ) -> Result<()> {
        trace!(index, %instruction, depth = frame.stack.len(), "step");
        match &instruction.kind {
            InstructionKind::Push { value, static_type } => {
                frame.push(Element::literal(static_type, value.clone()));
            }
            InstructionKind::Load {
                slot, static_type, ..
            } => {
                let element = frame
                    .locals
                    .get(*slot)
                    .cloned()
                    .unwrap_or_else(|| Element::unknown(static_type));
                frame.stack.push(Operand {
                    element,
                    source: Some(Source::Local(*slot)),
                });
            }
            InstructionKind::Store { slot, .. } => {
                let operand = frame.pop(index)?;
                frame.locals.bind(*slot, operand.element);
            }
            InstructionKind::Dup => {
                let top = frame.peek(index)?.clone();
                frame.stack.push(top);
            }
            // The runtime stack is discarded on exit.
            InstructionKind::Return => {
                if let Some(operand) = frame.stack.pop() {
                    frame.outcomes.push(operand.element);
                }
                frame.stack.clear();
            }
            InstructionKind::Throw => {
                let operand = frame.pop(index)?;
                frame.outcomes.push(operand.element);
                frame.stack.clear();
            }
            InstructionKind::GetField { field_type, .. } => {
                frame.pop(index)?;
                frame.push(Element::unknown(field_type));
            }
            InstructionKind::GetStatic {
                owner,
                name,
                field_type,
                constant_value,
            } => {
                let element = constant_value
                    .as_ref()
                    .map(|value| Element::literal(field_type, value.clone()))
                    .or_else(|| known::static_field(owner, name, field_type))
                    .unwrap_or_else(|| Element::unknown(field_type));
                frame.push(element);
            }
            InstructionKind::New { created_type } => {
                frame.stack.push(Operand {
                    element: Element::unknown(created_type),
                    source: Some(Source::New(index)),
                });
            }
            InstructionKind::Invoke { identifier } => {
                let arguments = frame.pop_n(identifier.arity(), index)?;
                let receiver = if identifier.is_static() {
                    None
                } else {
                    Some(frame.pop(index)?)
                };
                self.invoke(frame, identifier, receiver, arguments, calls);
            }
            InstructionKind::InvokeDynamic {
                handle_identifier,
                synthetic_identifier,
            } => {
                let captured = frame.pop_n(synthetic_identifier.arity(), index)?;
                frame.push(call_site(handle_identifier, synthetic_identifier, captured));
            }
            InstructionKind::ExceptionHandlerEntry => {
                frame.push(Element::unknown(types::THROWABLE));
            }
            InstructionKind::SizeChange { pushes, pops, .. } => {
                frame.pop_n(usize::from(*pops), index)?;
                for _ in 0..*pushes {
                    frame.push(Element::object());
                }
            }
            InstructionKind::Other { .. } => {}
        }
        Ok(())
    }

    fn invoke(
        &self,
        frame: &mut Frame,
        identifier: &MethodIdentifier,
        receiver: Option<Operand>,
        arguments: Vec<Operand>,
        calls: &mut CallStack,
    ) {
        let arguments: Vec<Element> = arguments.into_iter().map(|operand| operand.element).collect();

        if let Some(call) =
            known::simulate_call(identifier, receiver.as_ref().map(|r| &r.element), &arguments)
        {
            trace!(method = %identifier, "built-in rule applied");
            if call.updates_receiver {
                if let Some(receiver) = &receiver {
                    frame.rebind(receiver, &call.result);
                }
            }
            if identifier.returns_value() {
                frame.push(call.result);
            }
            return;
        }

        if !identifier.returns_value() {
            return;
        }

        let result = match receiver.map(|operand| operand.element) {
            Some(target) if target.handles().next().is_some() => {
                self.invoke_handles(identifier, &target, &arguments, calls)
            }
            receiver => self.invoke_project(identifier, receiver, arguments, calls),
        };
        frame.push(result);
    }

    /// Simulate a project method through the pool; anything else is unknown.
    fn invoke_project(
        &self,
        identifier: &MethodIdentifier,
        receiver: Option<Element>,
        arguments: Vec<Element>,
        calls: &mut CallStack,
    ) -> Element {
        let unknown = || Element::unknown(identifier.return_type());

        let Ok(method) = self
            .pool
            .lookup(identifier, self.resolver, &self.config.reducer)
        else {
            return unknown();
        };

        if let Err(err) = calls.enter(identifier) {
            debug!(error = %err, "call not followed");
            return unknown();
        }
        let locals = Locals::for_call(identifier, receiver, arguments);
        let result = self.run(method.instructions(), locals, calls);
        calls.exit();

        match result {
            Ok(element) if element.is_empty() => unknown(),
            Ok(element) => element,
            Err(err) => {
                warn!(method = %identifier, error = %err, "callee simulation failed");
                unknown()
            }
        }
    }

    /// Invoke the functional method of a lambda or method reference.
    fn invoke_handles(
        &self,
        identifier: &MethodIdentifier,
        target: &Element,
        arguments: &[Element],
        calls: &mut CallStack,
    ) -> Element {
        let mut result = Element::default();
        for handle in target.handles() {
            let mut combined = handle.captured.clone();
            combined.extend(arguments.iter().cloned());
            result.merge_in(&self.invoke_target(&handle.target, combined, calls));
        }
        if result.is_empty() {
            Element::unknown(identifier.return_type())
        } else {
            result
        }
    }

    fn invoke_target(
        &self,
        target: &MethodIdentifier,
        mut arguments: Vec<Element>,
        calls: &mut CallStack,
    ) -> Element {
        // Unbound instance method references take their receiver from the first argument.
        let receiver = if target.is_static() || arguments.is_empty() {
            None
        } else {
            Some(arguments.remove(0))
        };
        if let Some(call) = known::simulate_call(target, receiver.as_ref(), &arguments) {
            return call.result;
        }
        if target.is_constructor() {
            return Element::unknown(&types::object_type(target.owner()));
        }
        self.invoke_project(target, receiver, arguments, calls)
    }
}

/// Value produced by an `invokedynamic` call site.
fn call_site(
    handle: &MethodIdentifier,
    synthetic: &MethodIdentifier,
    captured: Vec<Operand>,
) -> Element {
    if handle.is_owned_by(STRING_CONCAT_FACTORY) || synthetic.name().starts_with("makeConcat") {
        return Element::unknown(synthetic.return_type());
    }
    Element::new(
        synthetic.return_type(),
        MethodHandle {
            target: handle.clone(),
            captured: captured.into_iter().map(|operand| operand.element).collect(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::JsonValue;
    use crate::pool::NoResolver;
    use crate::response::HttpResponse;
    use jaxan_ir::{CONSTRUCTOR_NAME, Literal};
    use std::collections::BTreeSet;

    const RESPONSE: &str = "Ljavax/ws/rs/core/Response;";
    const BUILDER: &str = "Ljavax/ws/rs/core/Response$ResponseBuilder;";

    fn method(owner: &str, name: &str, descriptor: &str, is_static: bool) -> MethodIdentifier {
        MethodIdentifier::from_descriptor(owner, name, descriptor, is_static).unwrap()
    }

    fn string(value: &str) -> Instruction {
        Instruction::push(Literal::string(value), types::STRING)
    }

    fn build() -> Instruction {
        Instruction::invoke(method(
            "javax/ws/rs/core/Response$ResponseBuilder",
            "build",
            "()Ljavax/ws/rs/core/Response;",
            false,
        ))
    }

    fn run(instructions: &[Instruction]) -> Result<Element> {
        run_with(instructions, &NoResolver, &SimulationConfig::default())
    }

    fn run_with(
        instructions: &[Instruction],
        resolver: &dyn MethodResolver,
        config: &SimulationConfig,
    ) -> Result<Element> {
        let pool = MethodPool::new();
        MethodSimulator::new(&pool, resolver, config).simulate(instructions, Locals::new())
    }

    fn single_response(element: &Element) -> HttpResponse {
        let responses: Vec<&HttpResponse> = element.responses().collect();
        assert_eq!(responses.len(), 1, "{element:?}");
        responses[0].clone()
    }

    #[test]
    fn test_status_constant_response() {
        let instructions = vec![
            Instruction::get_static(
                "javax/ws/rs/core/Response$Status",
                "BAD_REQUEST",
                "Ljavax/ws/rs/core/Response$Status;",
            ),
            Instruction::invoke(method(
                "javax/ws/rs/core/Response",
                "status",
                "(Ljavax/ws/rs/core/Response$Status;)Ljavax/ws/rs/core/Response$ResponseBuilder;",
                true,
            )),
            build(),
            Instruction::ret(),
        ];
        let result = run(&instructions).unwrap();
        assert_eq!(result.values().len(), 1);
        let response = single_response(&result);
        assert_eq!(response.statuses, BTreeSet::from([400]));
        assert!(response.entity_types.is_empty());
        assert!(result.has_type(RESPONSE));
    }

    #[test]
    fn test_outcomes_are_merged() {
        let instructions = vec![
            Instruction::load(1, types::PRIMITIVE_BOOLEAN),
            Instruction::other("IFEQ"),
            string("a"),
            Instruction::ret(),
            string("b"),
            Instruction::ret(),
        ];
        let result = run(&instructions).unwrap();
        assert_eq!(result.types(), &BTreeSet::from([types::STRING.to_string()]));
        assert_eq!(result.strings().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_mutual_recursion_is_cut_off() {
        let a = method("com/example/Cycle", "a", "()Ljava/lang/String;", true);
        let b = method("com/example/Cycle", "b", "()Ljava/lang/String;", true);
        let (a_id, b_id) = (a.clone(), b.clone());
        let resolver = move |id: &MethodIdentifier| {
            if *id == a_id {
                Some(vec![Instruction::invoke(b_id.clone()), Instruction::ret()])
            } else if *id == b_id {
                Some(vec![Instruction::invoke(a_id.clone()), Instruction::ret()])
            } else {
                None
            }
        };

        let pool = MethodPool::new();
        let config = SimulationConfig::default();
        let simulator = MethodSimulator::new(&pool, &resolver, &config);
        let body = [Instruction::invoke(b.clone()), Instruction::ret()];
        let result = simulator
            .simulate_method(&a, &body, Locals::unknown_arguments(&a))
            .unwrap();

        assert_eq!(result, Element::unknown(b.return_type()));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_call_depth_is_bounded() {
        // m0 -> m1 -> m2 -> ... each returning its callee's result; m9 returns "deep".
        let chain: Vec<MethodIdentifier> = (0..10)
            .map(|i| method("com/example/Chain", &format!("m{i}"), "()Ljava/lang/String;", true))
            .collect();
        let lookup = chain.clone();
        let resolver = move |id: &MethodIdentifier| {
            let position = lookup.iter().position(|m| m == id)?;
            Some(match lookup.get(position + 1) {
                Some(next) => vec![Instruction::invoke(next.clone()), Instruction::ret()],
                None => vec![
                    Instruction::push(Literal::string("deep"), types::STRING),
                    Instruction::ret(),
                ],
            })
        };
        let call = [Instruction::invoke(chain[0].clone()), Instruction::ret()];

        let unbounded = run_with(&call, &resolver, &SimulationConfig::default()).unwrap();
        assert_eq!(unbounded, Element::string("deep"));

        let shallow = SimulationConfig::default().with_max_call_depth(3);
        let bounded = run_with(&call, &resolver, &shallow).unwrap();
        assert_eq!(bounded, Element::unknown(types::STRING));
    }

    #[test]
    fn test_arguments_are_bound_to_parameters() {
        let echo = method("com/example/Util", "second", "(JLjava/lang/String;)Ljava/lang/String;", true);
        let resolver = |_: &MethodIdentifier| {
            Some(vec![Instruction::load(2, types::STRING), Instruction::ret()])
        };
        let instructions = vec![
            Instruction::push(Literal::Int(7), types::PRIMITIVE_LONG),
            string("value"),
            Instruction::invoke(echo),
            Instruction::ret(),
        ];
        let result = run_with(&instructions, &resolver, &SimulationConfig::default()).unwrap();
        assert_eq!(result, Element::string("value"));
    }

    #[test]
    fn test_foreign_call_is_unknown() {
        let instructions = vec![
            Instruction::load(1, "Ljava/util/Map;"),
            string("key"),
            Instruction::invoke(method(
                "java/util/Map",
                "get",
                "(Ljava/lang/Object;)Ljava/lang/Object;",
                false,
            )),
            Instruction::ret(),
        ];
        assert_eq!(run(&instructions).unwrap(), Element::object());
    }

    #[test]
    fn test_builder_mutation_through_local() {
        let builder_type = BUILDER;
        let instructions = vec![
            Instruction::invoke(method(
                "javax/ws/rs/core/Response",
                "ok",
                "()Ljavax/ws/rs/core/Response$ResponseBuilder;",
                true,
            )),
            Instruction::store(1, builder_type),
            Instruction::load(1, builder_type),
            string("X-Request-Id"),
            string("42"),
            Instruction::invoke(method(
                "javax/ws/rs/core/Response$ResponseBuilder",
                "header",
                "(Ljava/lang/String;Ljava/lang/Object;)Ljavax/ws/rs/core/Response$ResponseBuilder;",
                false,
            )),
            Instruction::size_change("POP", 0, 1),
            Instruction::load(1, builder_type),
            build(),
            Instruction::ret(),
        ];
        let response = single_response(&run(&instructions).unwrap());
        assert_eq!(response.statuses, BTreeSet::from([200]));
        assert!(response.headers.contains("X-Request-Id"));
    }

    #[test]
    fn test_generic_entity_constructor() {
        let entity_type = "Ljavax/ws/rs/core/GenericEntity;";
        let instructions = vec![
            Instruction::new_object(entity_type),
            Instruction::dup(),
            Instruction::load(1, "Ljava/util/List;"),
            Instruction::push(Literal::Class("Ljava/util/List;".to_string()), types::CLASS),
            Instruction::invoke(method(
                "javax/ws/rs/core/GenericEntity",
                CONSTRUCTOR_NAME,
                "(Ljava/lang/Object;Ljava/lang/reflect/Type;)V",
                false,
            )),
            Instruction::store(2, entity_type),
            Instruction::load(2, entity_type),
            Instruction::invoke(method(
                "javax/ws/rs/core/Response",
                "ok",
                "(Ljava/lang/Object;)Ljavax/ws/rs/core/Response$ResponseBuilder;",
                true,
            )),
            build(),
            Instruction::ret(),
        ];
        let response = single_response(&run(&instructions).unwrap());
        assert_eq!(
            response.entity_types,
            BTreeSet::from(["Ljava/util/List;".to_string()])
        );
    }

    #[test]
    fn test_constructor_updates_only_its_own_object() {
        let pick = |name: &str| {
            method(
                "com/example/Util",
                name,
                "(Ljava/lang/String;Ljava/lang/String;)Ljava/lang/String;",
                true,
            )
        };
        let resolver = |id: &MethodIdentifier| {
            let slot = if id.name() == "first" { 0 } else { 1 };
            Some(vec![Instruction::load(slot, types::STRING), Instruction::ret()])
        };
        let body = |picked: MethodIdentifier| {
            vec![
                Instruction::load(1, types::STRING),
                Instruction::new_object(types::STRING),
                Instruction::dup(),
                string("x"),
                Instruction::invoke(method(
                    "java/lang/String",
                    CONSTRUCTOR_NAME,
                    "(Ljava/lang/String;)V",
                    false,
                )),
                Instruction::invoke(picked),
                Instruction::ret(),
            ]
        };
        let config = SimulationConfig::default();

        let parameter = run_with(&body(pick("first")), &resolver, &config).unwrap();
        assert_eq!(parameter, Element::unknown(types::STRING));

        let constructed = run_with(&body(pick("second")), &resolver, &config).unwrap();
        assert_eq!(constructed, Element::string("x"));
    }

    #[test]
    fn test_lambda_with_captured_argument() {
        let supplier = "Ljava/util/function/Supplier;";
        let lambda = method(
            "com/example/Resource",
            "lambda$find$0",
            "(Ljava/lang/String;)Ljava/lang/String;",
            true,
        );
        let call_site = method(
            "java/util/function/Supplier",
            "get",
            "(Ljava/lang/String;)Ljava/util/function/Supplier;",
            true,
        );
        let resolver = |_: &MethodIdentifier| {
            Some(vec![Instruction::load(0, types::STRING), Instruction::ret()])
        };
        let instructions = vec![
            string("captured"),
            Instruction::invoke_dynamic(lambda, call_site),
            Instruction::store(1, supplier),
            Instruction::load(1, supplier),
            Instruction::invoke(method(
                "java/util/function/Supplier",
                "get",
                "()Ljava/lang/Object;",
                false,
            )),
            Instruction::ret(),
        ];
        let result = run_with(&instructions, &resolver, &SimulationConfig::default()).unwrap();
        assert_eq!(result, Element::string("captured"));
    }

    #[test]
    fn test_string_concatenation_is_unknown() {
        let bootstrap = method(
            "java/lang/invoke/StringConcatFactory",
            "makeConcatWithConstants",
            "(Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;Ljava/lang/invoke/MethodType;Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/invoke/CallSite;",
            true,
        );
        let call_site = method(
            "com/example/Resource",
            "makeConcatWithConstants",
            "(Ljava/lang/String;)Ljava/lang/String;",
            true,
        );
        let instructions = vec![
            string("id-"),
            Instruction::invoke_dynamic(bootstrap, call_site),
            Instruction::ret(),
        ];
        assert_eq!(run(&instructions).unwrap(), Element::unknown(types::STRING));
    }

    #[test]
    fn test_json_object_entity() {
        let object_builder = "Ljavax/json/JsonObjectBuilder;";
        let instructions = vec![
            Instruction::invoke(method(
                "javax/json/Json",
                "createObjectBuilder",
                "()Ljavax/json/JsonObjectBuilder;",
                true,
            )),
            string("key"),
            string("value"),
            Instruction::invoke(method(
                "javax/json/JsonObjectBuilder",
                "add",
                "(Ljava/lang/String;Ljava/lang/String;)Ljavax/json/JsonObjectBuilder;",
                false,
            )),
            Instruction::invoke(method(
                "javax/json/JsonObjectBuilder",
                "build",
                "()Ljavax/json/JsonObject;",
                false,
            )),
            Instruction::invoke(method(
                "javax/ws/rs/core/Response",
                "ok",
                "(Ljava/lang/Object;)Ljavax/ws/rs/core/Response$ResponseBuilder;",
                true,
            )),
            build(),
            Instruction::ret(),
        ];
        let response = single_response(&run(&instructions).unwrap());
        let expected = JsonValue::empty_object().with_member("key", Element::string("value"));
        assert_eq!(response.inline_entities, BTreeSet::from([expected]));
        assert!(response.entity_types.contains("Ljavax/json/JsonObject;"));
        assert!(!response.entity_types.contains(object_builder));
    }

    #[test]
    fn test_exception_handler_and_throw() {
        let instructions = vec![
            Instruction::exception_handler(),
            Instruction::store(1, types::THROWABLE),
            Instruction::load(1, types::THROWABLE),
            Instruction::throw(),
        ];
        assert_eq!(run(&instructions).unwrap(), Element::unknown(types::THROWABLE));
    }

    #[test]
    fn test_static_constant_value() {
        let instructions = vec![
            Instruction::get_static_constant(
                "com/example/Defaults",
                "NAME",
                types::STRING,
                Literal::string("duke"),
            ),
            Instruction::ret(),
        ];
        assert_eq!(run(&instructions).unwrap(), Element::string("duke"));
    }

    #[test]
    fn test_void_body_yields_nothing() {
        assert!(run(&[Instruction::ret()]).unwrap().is_empty());
    }

    #[test]
    fn test_underflow_is_invalid_bytecode() {
        let err = run(&[Instruction::dup()]).unwrap_err();
        assert!(matches!(err, SimError::InvalidBytecode { index: 0, .. }));
    }

    #[test]
    fn test_unknown_locals_follow_declared_types() {
        let id = method("com/example/Resource", "find", "(JLjava/lang/String;)V", false);
        let locals = Locals::unknown_arguments(&id);
        assert_eq!(locals.len(), 3);
        assert_eq!(locals.get(0), Some(&Element::unknown("Lcom/example/Resource;")));
        assert_eq!(locals.get(1), Some(&Element::unknown(types::PRIMITIVE_LONG)));
        assert_eq!(locals.get(3), Some(&Element::unknown(types::STRING)));
    }
}
