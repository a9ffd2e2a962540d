//! Instruction sequences for each access strategy, and the expression walker
//! that evaluates receivers and arguments.

use crate::ast::{AccessSite, Constant, Expr, ExprKind};
use crate::diagnostics::CompileError;
use crate::typeck::env::{unboxed, wrapper_class};
use crate::typeck::{known, FieldInfo, JvmType, MethodInfo, Primitive};

use super::context::EmissionContext;
use super::descriptor::{descriptor, internal_name, method_descriptor};
use super::insn::{Insn, InvokeKind, Label, LdcValue, MemberRef, VarKind};
use super::select::AccessStrategy;

/// Emit `expr`, leaving its value on the stack. Returns the pushed type.
pub fn emit_expr(ctx: &mut EmissionContext<'_>, expr: &Expr) -> Result<JvmType, CompileError> {
    let resolver = ctx.resolver;
    match &expr.kind {
        ExprKind::This => {
            let ty = resolver.resolve_type(expr, ctx.enclosing);
            ctx.visit(Insn::Load(VarKind::Ref, 0));
            ctx.stack.push(ty.clone());
            Ok(ty)
        }
        ExprKind::Local { slot } => {
            let ty = resolver.resolve_type(expr, ctx.enclosing);
            ctx.visit(Insn::Load(VarKind::of(&ty), *slot));
            ctx.stack.push(ty.clone());
            Ok(ty)
        }
        ExprKind::ClassLiteral(ty) => {
            ctx.visit(Insn::Ldc(LdcValue::Type(descriptor(resolver, ty))));
            let class_ty = JvmType::generic(known::CLASS, vec![ty.clone()]);
            ctx.stack.push(class_ty.clone());
            Ok(class_ty)
        }
        ExprKind::Const(value) => Ok(emit_constant(ctx, value)),
        ExprKind::Property(site) => super::write_property_site(ctx, site),
        ExprKind::OperatorCall { receiver, op, argument } => {
            super::operators::write_single_argument_call(ctx, receiver, op, argument)
        }
    }
}

fn emit_constant(ctx: &mut EmissionContext<'_>, value: &Constant) -> JvmType {
    let (insn, ty) = match value {
        Constant::Null => (Insn::AconstNull, JvmType::object(known::OBJECT)),
        Constant::Int(v) => (Insn::Ldc(LdcValue::Int(*v)), JvmType::int()),
        Constant::Long(v) => (Insn::Ldc(LdcValue::Long(*v)), JvmType::Prim(Primitive::Long)),
        Constant::Double(v) => (Insn::Ldc(LdcValue::Double(*v)), JvmType::Prim(Primitive::Double)),
        Constant::Bool(b) => (Insn::Ldc(LdcValue::Int(i32::from(*b))), JvmType::boolean()),
        Constant::Str(s) => (Insn::Ldc(LdcValue::Str(s.clone())), JvmType::object(known::STRING)),
    };
    ctx.visit(insn);
    ctx.stack.push(ty.clone());
    ty
}

/// Emit the instructions for an already selected strategy.
pub fn emit_strategy(
    ctx: &mut EmissionContext<'_>,
    strategy: &AccessStrategy,
    site: &AccessSite,
    member: &str,
) -> Result<JvmType, CompileError> {
    match strategy {
        AccessStrategy::ArrayLength => {
            emit_expr(ctx, &site.receiver)?;
            ctx.visit(Insn::ArrayLength);
            ctx.stack.replace(JvmType::int());
            Ok(JvmType::int())
        }
        AccessStrategy::CollectionSize => write_call(ctx, &site.receiver, &collection_size_method(), &[], site.safe),
        AccessStrategy::GetterCall(method)
        | AccessStrategy::InterfaceDefaultGetter(method)
        | AccessStrategy::ExtensionMethodCall(method) => write_call(ctx, &site.receiver, method, &[], site.safe),
        AccessStrategy::DirectField(field) => write_field(ctx, &site.receiver, field),
        AccessStrategy::BridgeAccessor { method, field_static } => {
            let arg = if *field_static { CallArg::Null } else { CallArg::Expr(&site.receiver) };
            write_call(ctx, &site.receiver, method, &[arg], false)
        }
        AccessStrategy::EnumConstant { owner } => {
            let ty = JvmType::object(*owner);
            let owner_name = ctx.resolver.class(*owner).internal_name();
            let desc = descriptor(ctx.resolver, &ty);
            ctx.visit(Insn::GetStatic(MemberRef::new(owner_name, member, desc)));
            ctx.stack.push(ty.clone());
            Ok(ty)
        }
        AccessStrategy::MapGet => write_call(ctx, &site.receiver, &map_get_method(), &[CallArg::Str(member)], false),
        AccessStrategy::ListPropertyRewrite { component } => write_list_property(ctx, site, member, component),
        AccessStrategy::DynamicFallback { property } => {
            write_call(ctx, &site.receiver, &get_property_method(), &[CallArg::Str(property)], site.safe)
        }
        AccessStrategy::Unresolvable => {
            ctx.visit(Insn::AconstNull);
            let object = JvmType::object(known::OBJECT);
            ctx.stack.push(object.clone());
            Ok(object)
        }
    }
}

fn write_field(ctx: &mut EmissionContext<'_>, receiver: &Expr, field: &FieldInfo) -> Result<JvmType, CompileError> {
    let resolver = ctx.resolver;
    let owner_name = resolver.class(field.owner).internal_name();
    let member = MemberRef::new(owner_name.clone(), field.name.clone(), descriptor(resolver, &field.ty));
    if field.is_static {
        ctx.visit(Insn::GetStatic(member));
        ctx.stack.push(field.ty.clone());
        return Ok(field.ty.clone());
    }
    emit_expr(ctx, receiver)?;
    let owner_ty = JvmType::object(field.owner);
    let narrowed = ctx.stack.top().is_some_and(|top| resolver.is_assignable(top, &owner_ty));
    if !narrowed {
        ctx.visit(Insn::CheckCast(owner_name));
        ctx.stack.replace(owner_ty);
    }
    ctx.visit(Insn::GetField(member));
    ctx.stack.replace(field.ty.clone());
    Ok(field.ty.clone())
}

/// An argument to [`write_call`].
#[derive(Debug, Clone, Copy)]
pub enum CallArg<'e> {
    Expr(&'e Expr),
    Str(&'e str),
    Null,
}

/// Call `method` on `receiver`. Static methods do not evaluate the receiver; extension
/// methods receive it as their first argument. With `safe`, a null receiver yields null
/// and a primitive result is boxed.
pub fn write_call(
    ctx: &mut EmissionContext<'_>,
    receiver: &Expr,
    method: &MethodInfo,
    args: &[CallArg<'_>],
    safe: bool,
) -> Result<JvmType, CompileError> {
    let resolver = ctx.resolver;
    let extension = method.owner == known::EXTENSIONS;
    let params = if extension { method.params.get(1..).unwrap_or_default() } else { &method.params[..] };
    let start = ctx.stack.len();

    let mut null_guard = None;
    if extension || !method.is_static {
        emit_expr(ctx, receiver)?;
        if safe {
            let on_null = ctx.new_label();
            ctx.visit(Insn::Dup);
            ctx.visit(Insn::IfNull(on_null));
            null_guard = Some(on_null);
        }
        let self_type = match method.params.first() {
            Some(first) if extension => first.clone(),
            _ => JvmType::object(method.owner),
        };
        coerce(ctx, &self_type);
    }
    for (i, arg) in args.iter().enumerate() {
        push_arg(ctx, arg)?;
        if let Some(param) = params.get(i) {
            coerce(ctx, param);
        }
    }

    let owner = if extension {
        ctx.options.extension_owner.clone()
    } else {
        resolver.class(method.owner).internal_name()
    };
    let kind = if method.is_static {
        InvokeKind::Static
    } else if resolver.class(method.owner).is_interface() {
        InvokeKind::Interface
    } else {
        InvokeKind::Virtual
    };
    let desc = method_descriptor(resolver, &method.params, &method.ret);
    ctx.visit(Insn::Invoke(kind, MemberRef::new(owner, method.name.clone(), desc)));
    let consumed = ctx.stack.len() - start;
    ctx.stack.remove(consumed);
    if method.ret != JvmType::Void {
        ctx.stack.push(method.ret.clone());
    }

    if let Some(on_null) = null_guard {
        box_top(ctx);
        write_null_branch(ctx, on_null);
    }
    Ok(ctx.stack.top().cloned().unwrap_or(JvmType::Void))
}

fn write_null_branch(ctx: &mut EmissionContext<'_>, on_null: Label) {
    let end = ctx.new_label();
    ctx.visit(Insn::Goto(end));
    ctx.visit(Insn::Label(on_null));
    ctx.visit(Insn::Pop);
    ctx.visit(Insn::AconstNull);
    ctx.visit(Insn::Label(end));
}

fn push_arg(ctx: &mut EmissionContext<'_>, arg: &CallArg<'_>) -> Result<(), CompileError> {
    match arg {
        CallArg::Expr(expr) => {
            emit_expr(ctx, expr)?;
        }
        CallArg::Str(s) => {
            ctx.visit(Insn::Ldc(LdcValue::Str(s.to_string())));
            ctx.stack.push(JvmType::object(known::STRING));
        }
        CallArg::Null => {
            ctx.visit(Insn::AconstNull);
            ctx.stack.push(JvmType::object(known::OBJECT));
        }
    }
    Ok(())
}

// ---- conversions ----

/// Convert the value on top of the stack to `to`: box, unbox, widen/narrow or downcast.
pub fn coerce(ctx: &mut EmissionContext<'_>, to: &JvmType) {
    let Some(from) = ctx.stack.top().cloned() else { return };
    match (&from, to) {
        (JvmType::Prim(a), JvmType::Prim(b)) => convert_primitive(ctx, *a, *b),
        (JvmType::Prim(_), _) if to.is_reference() => {
            box_top(ctx);
            checkcast_if_needed(ctx, to);
        }
        (_, JvmType::Prim(p)) if from.is_reference() => unbox_top(ctx, *p),
        _ if from.is_reference() && to.is_reference() => checkcast_if_needed(ctx, to),
        _ => {}
    }
}

fn checkcast_if_needed(ctx: &mut EmissionContext<'_>, to: &JvmType) {
    let resolver = ctx.resolver;
    let assignable = ctx.stack.top().is_some_and(|top| resolver.is_assignable(top, to));
    if !assignable {
        ctx.visit(Insn::CheckCast(internal_name(resolver, to)));
        ctx.stack.replace(to.clone());
    }
}

fn convert_primitive(ctx: &mut EmissionContext<'_>, from: Primitive, to: Primitive) {
    let (a, b) = (stack_kind(from), stack_kind(to));
    if a != b {
        ctx.visit(Insn::Convert(a, b));
    }
    if from != to {
        ctx.stack.replace(JvmType::Prim(to));
    }
}

/// Sub-int primitives live on the JVM stack as ints.
fn stack_kind(p: Primitive) -> Primitive {
    match p {
        Primitive::Long | Primitive::Float | Primitive::Double => p,
        _ => Primitive::Int,
    }
}

/// Box a primitive on top of the stack with `Wrapper.valueOf`.
pub fn box_top(ctx: &mut EmissionContext<'_>) {
    let Some(JvmType::Prim(p)) = ctx.stack.top().cloned() else { return };
    let wrapper = wrapper_class(p);
    let owner = ctx.resolver.class(wrapper).internal_name();
    let desc = format!("({})L{owner};", p.descriptor());
    ctx.visit(Insn::Invoke(InvokeKind::Static, MemberRef::new(owner, "valueOf", desc)));
    ctx.stack.replace(JvmType::object(wrapper));
}

fn unbox_top(ctx: &mut EmissionContext<'_>, p: Primitive) {
    let (holder, getter) = match p {
        Primitive::Boolean => (known::BOOLEAN, "booleanValue"),
        Primitive::Char => (known::CHARACTER, "charValue"),
        Primitive::Byte => (known::NUMBER, "byteValue"),
        Primitive::Short => (known::NUMBER, "shortValue"),
        Primitive::Int => (known::NUMBER, "intValue"),
        Primitive::Long => (known::NUMBER, "longValue"),
        Primitive::Float => (known::NUMBER, "floatValue"),
        Primitive::Double => (known::NUMBER, "doubleValue"),
    };
    // a wrapper of another primitive still goes through Number
    let exact = ctx.stack.top().and_then(JvmType::class_id).and_then(unboxed) == Some(p);
    let holder = if exact && holder == known::NUMBER { wrapper_class(p) } else { holder };
    checkcast_if_needed(ctx, &JvmType::object(holder));
    let owner = ctx.resolver.class(holder).internal_name();
    let desc = format!("(){}", p.descriptor());
    ctx.visit(Insn::Invoke(InvokeKind::Virtual, MemberRef::new(owner, getter, desc)));
    ctx.stack.replace(JvmType::Prim(p));
}

// ---- well-known methods ----

fn builtin(owner: crate::typeck::ClassId, name: &str, params: Vec<JvmType>, ret: JvmType) -> MethodInfo {
    let mut method = MethodInfo::new(name, params, ret);
    method.owner = owner;
    method
}

pub fn collection_size_method() -> MethodInfo {
    builtin(known::COLLECTION, "size", Vec::new(), JvmType::int())
}

pub fn map_get_method() -> MethodInfo {
    let object = JvmType::object(known::OBJECT);
    builtin(known::MAP, "get", vec![object.clone()], object)
}

pub fn get_property_method() -> MethodInfo {
    builtin(known::GROOVY_OBJECT, "getProperty", vec![JvmType::object(known::STRING)], JvmType::object(known::OBJECT))
}

// ---- list property rewrite ----

/// Phases of the `list.p` loop. Each state emits its part and names the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRewriteState {
    Init,
    AllocResult,
    IterInit,
    LoopTest,
    LoopBody,
    LoopBack,
    Done,
}

struct ListRewrite<'s> {
    site: &'s AccessSite,
    member: &'s str,
    component: &'s JvmType,
    /// Temporaries still held; drained exactly once.
    live: Vec<u16>,
    result: u16,
    iter: u16,
    next: u16,
    list_type: JvmType,
    test: Label,
    exit: Label,
    depth: usize,
}

/// Compile `list.member` as
/// `def r = new ArrayList(list.size()); for (e in list) r.add(e.member); r`.
pub fn write_list_property(
    ctx: &mut EmissionContext<'_>,
    site: &AccessSite,
    member: &str,
    component: &JvmType,
) -> Result<JvmType, CompileError> {
    let mut rewrite = ListRewrite {
        site,
        member,
        component,
        live: Vec::new(),
        result: 0,
        iter: 0,
        next: 0,
        list_type: JvmType::object(known::LIST),
        test: Label(0),
        exit: Label(0),
        depth: 0,
    };
    match rewrite.run(ctx) {
        Ok(ty) => Ok(ty),
        Err(err) => {
            if let Err(release_err) = rewrite.release(ctx) {
                tracing::warn!(%release_err, "failed to release list rewrite temporaries");
            }
            Err(err)
        }
    }
}

impl ListRewrite<'_> {
    fn run(&mut self, ctx: &mut EmissionContext<'_>) -> Result<JvmType, CompileError> {
        let array_list = JvmType::object(known::ARRAY_LIST);
        let mut state = ListRewriteState::Init;
        loop {
            tracing::trace!(?state, member = self.member, "list property rewrite");
            state = match state {
                ListRewriteState::Init => {
                    self.result = self.define(ctx, "tmpList", array_list.clone());
                    self.iter = self.define(ctx, "iterator", JvmType::object(known::ITERATOR));
                    self.next = self.define(ctx, "next", self.component.clone());
                    self.test = ctx.new_label();
                    self.exit = ctx.new_label();
                    ListRewriteState::AllocResult
                }
                ListRewriteState::AllocResult => {
                    // the iterator slot holds the source list until IterInit replaces it
                    self.list_type = emit_expr(ctx, &self.site.receiver)?;
                    ctx.visit(Insn::Store(VarKind::Ref, self.iter));
                    ctx.stack.remove(1);
                    ctx.visit(Insn::New("java/util/ArrayList".to_string()));
                    ctx.visit(Insn::Dup);
                    ctx.stack.push(array_list.clone());
                    ctx.stack.push(array_list.clone());
                    ctx.visit(Insn::Load(VarKind::Ref, self.iter));
                    ctx.stack.push(self.list_type.clone());
                    invoke_interface(ctx, "java/util/List", "size", "()I");
                    ctx.stack.replace(JvmType::int());
                    ctx.visit(Insn::Invoke(
                        InvokeKind::Special,
                        MemberRef::new("java/util/ArrayList", "<init>", "(I)V"),
                    ));
                    ctx.stack.remove(2);
                    ctx.visit(Insn::Store(VarKind::Ref, self.result));
                    ctx.stack.remove(1);
                    ListRewriteState::IterInit
                }
                ListRewriteState::IterInit => {
                    ctx.visit(Insn::Load(VarKind::Ref, self.iter));
                    ctx.stack.push(self.list_type.clone());
                    invoke_interface(ctx, "java/util/List", "iterator", "()Ljava/util/Iterator;");
                    ctx.stack.replace(JvmType::object(known::ITERATOR));
                    ctx.visit(Insn::Store(VarKind::Ref, self.iter));
                    ctx.stack.remove(1);
                    ListRewriteState::LoopTest
                }
                ListRewriteState::LoopTest => {
                    ctx.visit(Insn::Label(self.test));
                    self.depth = ctx.stack.len();
                    ctx.visit(Insn::Load(VarKind::Ref, self.iter));
                    ctx.stack.push(JvmType::object(known::ITERATOR));
                    invoke_interface(ctx, "java/util/Iterator", "hasNext", "()Z");
                    ctx.stack.replace(JvmType::boolean());
                    ctx.visit(Insn::IfEq(self.exit));
                    ctx.stack.remove(1);
                    ListRewriteState::LoopBody
                }
                ListRewriteState::LoopBody => {
                    self.write_body(ctx)?;
                    ListRewriteState::LoopBack
                }
                ListRewriteState::LoopBack => {
                    ctx.visit(Insn::Goto(self.test));
                    ctx.stack.expect_len(self.depth, "list property loop body", self.site.span)?;
                    ListRewriteState::Done
                }
                ListRewriteState::Done => {
                    ctx.visit(Insn::Label(self.exit));
                    ctx.visit(Insn::Load(VarKind::Ref, self.result));
                    ctx.stack.push(array_list.clone());
                    self.release(ctx)?;
                    return Ok(array_list);
                }
            };
        }
    }

    fn write_body(&mut self, ctx: &mut EmissionContext<'_>) -> Result<(), CompileError> {
        ctx.visit(Insn::Load(VarKind::Ref, self.iter));
        ctx.stack.push(JvmType::object(known::ITERATOR));
        invoke_interface(ctx, "java/util/Iterator", "next", "()Ljava/lang/Object;");
        ctx.visit(Insn::CheckCast(internal_name(ctx.resolver, self.component)));
        ctx.stack.replace(self.component.clone());
        ctx.visit(Insn::Store(VarKind::Ref, self.next));
        ctx.stack.remove(1);

        ctx.visit(Insn::Load(VarKind::Ref, self.result));
        ctx.stack.push(JvmType::object(known::ARRAY_LIST));
        let element = Expr::local(self.next, self.component.clone())
            .with_span(self.site.span)
            .with_text(format!("{}[i]", self.site.receiver.text));
        let nested = AccessSite::new(element, self.member).at(self.site.span);
        super::write_property_site(ctx, &nested)?;
        box_top(ctx);
        invoke_interface(ctx, "java/util/List", "add", "(Ljava/lang/Object;)Z");
        ctx.stack.replace_n(JvmType::boolean(), 2);
        ctx.visit(Insn::Pop);
        ctx.stack.remove(1);
        Ok(())
    }

    fn define(&mut self, ctx: &mut EmissionContext<'_>, name: &str, ty: JvmType) -> u16 {
        let slot = ctx.temps.define(name, ty);
        self.live.push(slot);
        slot
    }

    fn release(&mut self, ctx: &mut EmissionContext<'_>) -> Result<(), CompileError> {
        for slot in self.live.drain(..).rev() {
            ctx.temps.release(slot)?;
        }
        Ok(())
    }
}

fn invoke_interface(ctx: &mut EmissionContext<'_>, owner: &str, name: &str, desc: &str) {
    ctx.visit(Insn::Invoke(InvokeKind::Interface, MemberRef::new(owner, name, desc)));
}
