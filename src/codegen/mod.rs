//! Call-site code generation for statically compiled property and operator access.
//!
//! [`CallSiteWriter`] is the entry point used by the method body generator. For
//! every access it resolves the receiver type, picks a strategy in
//! [`select`], emits it through [`emit`], and checks the operand stack grew by
//! exactly the accessed value.

pub mod context;
pub mod descriptor;
pub mod emit;
pub mod insn;
pub mod locals;
pub mod operators;
pub mod select;
pub mod stack;

use crate::ast::{AccessSite, Expr};
use crate::diagnostics::CompileError;
use crate::typeck::JvmType;

pub use context::EmissionContext;
pub use insn::{Insn, InsnBuffer, InsnSink};
pub use select::{AccessStrategy, SelectInput, StrategyKind};

/// Writes property gets and single-argument operator calls for one method body.
pub struct CallSiteWriter<'a> {
    ctx: EmissionContext<'a>,
}

impl<'a> CallSiteWriter<'a> {
    pub fn new(ctx: EmissionContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &EmissionContext<'a> {
        &self.ctx
    }

    /// `receiver.member`, `receiver?.member` or an implicit-this `member`.
    ///
    /// An access nothing applies to is reported once and compiled as `null`
    /// typed `java.lang.Object`; only internal errors are returned.
    pub fn make_get_property_site(&mut self, site: &AccessSite) -> Result<JvmType, CompileError> {
        write_property_site(&mut self.ctx, site)
    }

    /// Property access on a receiver known to implement `GroovyObject`. Falls back to
    /// `GroovyObject.getProperty(name)` when no getter or field is visible.
    pub fn make_groovy_object_get_property_site(&mut self, site: &AccessSite) -> Result<JvmType, CompileError> {
        let ctx = &mut self.ctx;
        let before = ctx.stack.len();
        let input = SelectInput::for_groovy_object(ctx.resolver, site, ctx.enclosing, ctx.in_closure);
        let (_, strategy) = select::select_groovy_object(ctx.resolver, &input);
        let ty = emit::emit_strategy(ctx, &strategy, site, &input.member)?;
        ctx.stack.expect_len(before + 1, "GroovyObject property access", site.span)?;
        Ok(ty)
    }

    /// `receiver.op(argument)` for binary operators and indexing.
    pub fn make_single_argument_call(
        &mut self,
        receiver: &Expr,
        op: &str,
        argument: &Expr,
    ) -> Result<JvmType, CompileError> {
        let before = self.ctx.stack.len();
        let ty = operators::write_single_argument_call(&mut self.ctx, receiver, op, argument)?;
        self.ctx.stack.expect_len(before + 1, "single argument call", receiver.span)?;
        Ok(ty)
    }

    /// Evaluate any expression, dispatching property and operator nodes to the methods above.
    pub fn write_expr(&mut self, expr: &Expr) -> Result<JvmType, CompileError> {
        emit::emit_expr(&mut self.ctx, expr)
    }
}

/// Select and emit one property access. Re-entered for the element access of a list rewrite.
pub(crate) fn write_property_site(ctx: &mut EmissionContext<'_>, site: &AccessSite) -> Result<JvmType, CompileError> {
    let before = ctx.stack.len();
    let input = SelectInput::new(ctx.resolver, site, ctx.enclosing);
    let (_, strategy) = select::select_traced(ctx.resolver, &input);
    if strategy == AccessStrategy::Unresolvable {
        let type_name = ctx.resolver.describe(&input.diagnostic_type().erasure());
        ctx.diagnostics.report(CompileError::access(
            format!("Access to {type_name}#{} is forbidden", input.member),
            site.span,
        ));
    }
    let ty = emit::emit_strategy(ctx, &strategy, site, &input.member)?;
    ctx.stack.expect_len(before + 1, "property access", site.span)?;
    Ok(ty)
}
