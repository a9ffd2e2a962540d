//! Single-argument operator calls: `a + b`, `a ** b`, `a[i]` and friends.
//!
//! Number, String and array operands get a direct helper call or instruction;
//! everything else binds to a `getAt` method, an extension method, or `Map.get`.

use crate::ast::Expr;
use crate::config::CodegenOptions;
use crate::diagnostics::CompileError;
use crate::typeck::{capitalize, known, JvmType, MethodInfo, TypeResolver};

use super::context::EmissionContext;
use super::emit::{box_top, coerce, emit_expr, map_get_method, write_call, CallArg};
use super::insn::{Insn, InvokeKind, MemberRef};

const NUMBER_PAIR_DESC: &str = "(Ljava/lang/Number;Ljava/lang/Number;)Ljava/lang/Number;";
const STRING_PLUS_DESC: &str = "(Ljava/lang/String;Ljava/lang/Object;)Ljava/lang/String;";

#[derive(Debug, Clone, PartialEq)]
pub enum OperatorStrategy {
    /// `NumberNumber<Op>.<op>(Number, Number)` helper for `plus`/`minus`/`multiply`/`div`.
    NumberNumber { op: String },
    Power(PowerHelper),
    StringPlus,
    /// Direct array element load.
    ArrayGet { component: JvmType },
    /// A `getAt` declared on the receiver or a superclass.
    GetAtMethod(MethodInfo),
    ExtensionCall(MethodInfo),
    MapGet,
}

impl OperatorStrategy {
    pub fn kind(&self) -> &'static str {
        match self {
            OperatorStrategy::NumberNumber { .. } => "NumberNumber",
            OperatorStrategy::Power(_) => "Power",
            OperatorStrategy::StringPlus => "StringPlus",
            OperatorStrategy::ArrayGet { .. } => "ArrayGet",
            OperatorStrategy::GetAtMethod(_) => "GetAtMethod",
            OperatorStrategy::ExtensionCall(_) => "ExtensionCall",
            OperatorStrategy::MapGet => "MapGet",
        }
    }
}

/// Which `power` overload a pair of operand types binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerHelper {
    BigDecimalInteger,
    BigIntegerInteger,
    LongInteger,
    IntegerInteger,
    NumberNumber,
}

impl PowerHelper {
    pub fn descriptor(self) -> &'static str {
        match self {
            PowerHelper::BigDecimalInteger => "(Ljava/math/BigDecimal;Ljava/lang/Integer;)Ljava/lang/Number;",
            PowerHelper::BigIntegerInteger => "(Ljava/math/BigInteger;Ljava/lang/Integer;)Ljava/lang/Number;",
            PowerHelper::LongInteger => "(Ljava/lang/Long;Ljava/lang/Integer;)Ljava/lang/Number;",
            PowerHelper::IntegerInteger => "(Ljava/lang/Integer;Ljava/lang/Integer;)Ljava/lang/Number;",
            PowerHelper::NumberNumber => NUMBER_PAIR_DESC,
        }
    }

    /// Exact pairing only: BigDecimal and BigInteger receivers match by class,
    /// primitives match through their wrappers.
    pub fn choose(resolver: &dyn TypeResolver, receiver: &JvmType, argument: &JvmType) -> Self {
        if resolver.wrapper(argument).class_id() != Some(known::INTEGER) {
            return PowerHelper::NumberNumber;
        }
        match receiver.class_id() {
            Some(known::BIG_DECIMAL) => PowerHelper::BigDecimalInteger,
            Some(known::BIG_INTEGER) => PowerHelper::BigIntegerInteger,
            _ => match resolver.wrapper(receiver).class_id() {
                Some(known::LONG) => PowerHelper::LongInteger,
                Some(known::INTEGER) => PowerHelper::IntegerInteger,
                _ => PowerHelper::NumberNumber,
            },
        }
    }
}

/// Pick how `receiver.op(argument)` is compiled. `None` means nothing applies,
/// which the type checker should have ruled out.
pub fn select_operator(
    resolver: &dyn TypeResolver,
    options: &CodegenOptions,
    receiver: &JvmType,
    argument: &JvmType,
    op: &str,
) -> Option<OperatorStrategy> {
    let numeric = |ty: &JvmType| {
        resolver
            .wrapper(ty)
            .class_id()
            .is_some_and(|c| resolver.is_derived_from(c, known::NUMBER))
    };

    if numeric(receiver) && numeric(argument) {
        match op {
            "plus" | "minus" | "multiply" | "div" => {
                return Some(OperatorStrategy::NumberNumber { op: op.to_string() });
            }
            "power" => {
                let helper = if options.power_fast_paths {
                    PowerHelper::choose(resolver, receiver, argument)
                } else {
                    PowerHelper::NumberNumber
                };
                return Some(OperatorStrategy::Power(helper));
            }
            _ => {}
        }
    } else if receiver.class_id() == Some(known::STRING) && op == "plus" {
        return Some(OperatorStrategy::StringPlus);
    } else if let (Some(component), "getAt") = (receiver.component(), op) {
        return Some(OperatorStrategy::ArrayGet { component: component.clone() });
    }

    // a declared getAt(T) answers any remaining operator, not only subscripts
    if let Some(method) = declared_get_at(resolver, receiver, argument) {
        return Some(OperatorStrategy::GetAtMethod(method));
    }

    // Map and List getAt overloads all do the same thing, so any best match will do
    let map = resolver.has_capability(receiver, known::MAP);
    let accept_any = map || resolver.has_capability(receiver, known::LIST);
    let args = [argument.clone()];
    let candidates = resolver.find_extension_methods(receiver, op, &args);
    let mut best = resolver.choose_best_overload(receiver, candidates, &args);
    if best.len() == 1 || (best.len() > 1 && accept_any) {
        return Some(OperatorStrategy::ExtensionCall(best.swap_remove(0)));
    }

    map.then_some(OperatorStrategy::MapGet)
}

fn declared_get_at(resolver: &dyn TypeResolver, receiver: &JvmType, argument: &JvmType) -> Option<MethodInfo> {
    let start = receiver.class_id()?;
    std::iter::successors(Some(start), |c| resolver.super_class(*c)).find_map(|class| {
        resolver
            .declared_methods(class)
            .iter()
            .find(|m| m.name == "getAt" && m.params.len() == 1 && resolver.is_assignable(argument, &m.params[0]))
            .cloned()
    })
}

/// Compile `receiver.op(argument)`, leaving the result on the stack.
pub fn write_single_argument_call(
    ctx: &mut EmissionContext<'_>,
    receiver: &Expr,
    op: &str,
    argument: &Expr,
) -> Result<JvmType, CompileError> {
    let resolver = ctx.resolver;
    let r_type = resolver.resolve_type(receiver, ctx.enclosing);
    let a_type = resolver.resolve_type(argument, ctx.enclosing);
    let Some(strategy) = select_operator(resolver, ctx.options, &r_type, &a_type, op) else {
        return Err(CompileError::internal(
            format!(
                "At line {} column {}\nOn receiver: {} with message: {} and arguments: {}\n\
                 This method should not have been called.",
                receiver.span.line, receiver.span.column, receiver.text, op, argument.text
            ),
            receiver.span,
        ));
    };
    tracing::debug!(
        op,
        receiver = %resolver.describe(&r_type),
        argument = %resolver.describe(&a_type),
        ?strategy,
        "selected operator strategy"
    );
    emit_operator(ctx, &strategy, receiver, argument)
}

pub fn emit_operator(
    ctx: &mut EmissionContext<'_>,
    strategy: &OperatorStrategy,
    receiver: &Expr,
    argument: &Expr,
) -> Result<JvmType, CompileError> {
    let number = JvmType::object(known::NUMBER);
    let m1 = ctx.stack.len();
    let result = match strategy {
        OperatorStrategy::NumberNumber { op } => {
            emit_expr(ctx, receiver)?;
            coerce(ctx, &number);
            emit_expr(ctx, argument)?;
            coerce(ctx, &number);
            let owner = format!("{}/NumberNumber{}", ctx.options.number_helper_package, capitalize(op));
            invoke_static(ctx, owner, op, NUMBER_PAIR_DESC);
            number
        }
        OperatorStrategy::Power(helper) => {
            emit_expr(ctx, receiver)?;
            box_top(ctx);
            emit_expr(ctx, argument)?;
            box_top(ctx);
            let owner = ctx.options.extension_owner.clone();
            invoke_static(ctx, owner, "power", helper.descriptor());
            number
        }
        OperatorStrategy::StringPlus => {
            emit_expr(ctx, receiver)?;
            emit_expr(ctx, argument)?;
            box_top(ctx);
            let owner = ctx.options.extension_owner.clone();
            invoke_static(ctx, owner, "plus", STRING_PLUS_DESC);
            JvmType::object(known::STRING)
        }
        OperatorStrategy::ArrayGet { component } => {
            emit_expr(ctx, receiver)?;
            emit_expr(ctx, argument)?;
            coerce(ctx, &JvmType::int());
            let element = match component {
                JvmType::Prim(p) => Some(*p),
                _ => None,
            };
            ctx.visit(Insn::ArrayLoad(element));
            component.clone()
        }
        OperatorStrategy::GetAtMethod(method) | OperatorStrategy::ExtensionCall(method) => {
            return write_call(ctx, receiver, method, &[CallArg::Expr(argument)], false);
        }
        OperatorStrategy::MapGet => {
            return write_call(ctx, receiver, &map_get_method(), &[CallArg::Expr(argument)], false);
        }
    };
    let m2 = ctx.stack.len();
    ctx.stack.replace_n(result.clone(), m2 - m1);
    Ok(result)
}

fn invoke_static(ctx: &mut EmissionContext<'_>, owner: String, name: &str, desc: &str) {
    ctx.visit(Insn::Invoke(InvokeKind::Static, MemberRef::new(owner, name, desc)));
}
