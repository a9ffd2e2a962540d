use crate::span::Span;
use crate::typeck::{known, JvmType};

/// A node of the already type-checked expression tree handed to code generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Declared static type.
    pub ty: JvmType,
    /// Flow-sensitive type from the type checker; preferred over `ty` when present.
    pub inferred: Option<JvmType>,
    /// Element type of a list-typed expression, when the type checker recorded one.
    pub component: Option<JvmType>,
    pub span: Span,
    /// Source text of the node, quoted in internal-error reports.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    This,
    /// A local variable (or parameter) held in a slot.
    Local { slot: u16 },
    /// A type used as a value, e.g. the `Foo` in `Foo.CONST`.
    ClassLiteral(JvmType),
    Const(Constant),
    Property(Box<AccessSite>),
    /// `receiver <op> argument` lowered to a single-argument method such as `plus` or `getAt`.
    OperatorCall { receiver: Box<Expr>, op: String, argument: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Null,
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
    Str(String),
}

/// One property access to resolve: `receiver.member`, `receiver?.member` or an implicit-this `member`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessSite {
    pub receiver: Expr,
    pub member: String,
    pub safe: bool,
    pub implicit_this: bool,
    pub span: Span,
}

impl AccessSite {
    pub fn new(receiver: Expr, member: impl Into<String>) -> Self {
        let span = receiver.span;
        Self { receiver, member: member.into(), safe: false, implicit_this: false, span }
    }

    pub fn safe(mut self) -> Self {
        self.safe = true;
        self
    }

    pub fn implicit_this(mut self) -> Self {
        self.implicit_this = true;
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn is_class_literal(&self) -> bool {
        matches!(self.receiver.kind, ExprKind::ClassLiteral(_))
    }

    /// The literal's own type when the receiver is a class literal.
    pub fn literal_type(&self) -> Option<&JvmType> {
        match &self.receiver.kind {
            ExprKind::ClassLiteral(ty) => Some(ty),
            _ => None,
        }
    }
}

impl Expr {
    pub fn new(kind: ExprKind, ty: JvmType) -> Self {
        Self { kind, ty, inferred: None, component: None, span: Span::dummy(), text: String::new() }
    }

    pub fn this(enclosing: JvmType) -> Self {
        Self::new(ExprKind::This, enclosing).with_text("this")
    }

    pub fn local(slot: u16, ty: JvmType) -> Self {
        Self::new(ExprKind::Local { slot }, ty)
    }

    pub fn class_literal(ty: JvmType) -> Self {
        let class_ty = JvmType::generic(known::CLASS, vec![ty.clone()]);
        Self::new(ExprKind::ClassLiteral(ty), class_ty)
    }

    pub fn constant(value: Constant) -> Self {
        let ty = match &value {
            Constant::Null => JvmType::object(known::OBJECT),
            Constant::Int(_) => JvmType::int(),
            Constant::Long(_) => JvmType::Prim(crate::typeck::Primitive::Long),
            Constant::Double(_) => JvmType::Prim(crate::typeck::Primitive::Double),
            Constant::Bool(_) => JvmType::boolean(),
            Constant::Str(_) => JvmType::object(known::STRING),
        };
        Self::new(ExprKind::Const(value), ty)
    }

    pub fn property(site: AccessSite, ty: JvmType) -> Self {
        let span = site.span;
        let mut expr = Self::new(ExprKind::Property(Box::new(site)), ty);
        expr.span = span;
        expr
    }

    pub fn operator(receiver: Expr, op: impl Into<String>, argument: Expr, ty: JvmType) -> Self {
        let span = receiver.span;
        let mut expr = Self::new(
            ExprKind::OperatorCall { receiver: Box::new(receiver), op: op.into(), argument: Box::new(argument) },
            ty,
        );
        expr.span = span;
        expr
    }

    pub fn with_inferred(mut self, ty: JvmType) -> Self {
        self.inferred = Some(ty);
        self
    }

    pub fn with_component(mut self, ty: JvmType) -> Self {
        self.component = Some(ty);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn is_this(&self) -> bool {
        matches!(self.kind, ExprKind::This)
    }
}
