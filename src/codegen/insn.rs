use std::fmt;

use crate::typeck::{JvmType, Primitive};

/// A branch target. Bound to a position by [`Insn::Label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

/// Local variable slot kind; selects between `iload`/`aload`/... opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Int,
    Long,
    Float,
    Double,
    Ref,
}

impl VarKind {
    pub fn of(ty: &JvmType) -> Self {
        match ty {
            JvmType::Prim(Primitive::Long) => VarKind::Long,
            JvmType::Prim(Primitive::Float) => VarKind::Float,
            JvmType::Prim(Primitive::Double) => VarKind::Double,
            JvmType::Prim(_) => VarKind::Int,
            _ => VarKind::Ref,
        }
    }

    fn prefix(self) -> char {
        match self {
            VarKind::Int => 'i',
            VarKind::Long => 'l',
            VarKind::Float => 'f',
            VarKind::Double => 'd',
            VarKind::Ref => 'a',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeKind {
    Virtual,
    Interface,
    Static,
    Special,
}

impl InvokeKind {
    fn mnemonic(self) -> &'static str {
        match self {
            InvokeKind::Virtual => "invokevirtual",
            InvokeKind::Interface => "invokeinterface",
            InvokeKind::Static => "invokestatic",
            InvokeKind::Special => "invokespecial",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    /// Internal name of the owning class, e.g. `java/util/List`.
    pub owner: String,
    pub name: String,
    pub desc: String,
}

impl MemberRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self { owner: owner.into(), name: name.into(), desc: desc.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LdcValue {
    Int(i32),
    Long(i64),
    Double(f64),
    Str(String),
    /// A class constant, by descriptor.
    Type(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Insn {
    AconstNull,
    Ldc(LdcValue),
    Load(VarKind, u16),
    Store(VarKind, u16),
    New(String),
    Dup,
    Pop,
    CheckCast(String),
    GetField(MemberRef),
    GetStatic(MemberRef),
    Invoke(InvokeKind, MemberRef),
    ArrayLength,
    /// Array element load; `None` loads a reference.
    ArrayLoad(Option<Primitive>),
    Convert(Primitive, Primitive),
    IfEq(Label),
    IfNull(Label),
    Goto(Label),
    Label(Label),
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insn::AconstNull => write!(f, "aconst_null"),
            Insn::Ldc(LdcValue::Int(v)) => write!(f, "ldc {v}"),
            Insn::Ldc(LdcValue::Long(v)) => write!(f, "ldc {v}L"),
            Insn::Ldc(LdcValue::Double(v)) => write!(f, "ldc {v:?}D"),
            Insn::Ldc(LdcValue::Str(s)) => write!(f, "ldc {s:?}"),
            Insn::Ldc(LdcValue::Type(desc)) => write!(f, "ldc {desc}.class"),
            Insn::Load(kind, slot) => write!(f, "{}load {slot}", kind.prefix()),
            Insn::Store(kind, slot) => write!(f, "{}store {slot}", kind.prefix()),
            Insn::New(owner) => write!(f, "new {owner}"),
            Insn::Dup => write!(f, "dup"),
            Insn::Pop => write!(f, "pop"),
            Insn::CheckCast(owner) => write!(f, "checkcast {owner}"),
            Insn::GetField(m) => write!(f, "getfield {}.{} {}", m.owner, m.name, m.desc),
            Insn::GetStatic(m) => write!(f, "getstatic {}.{} {}", m.owner, m.name, m.desc),
            Insn::Invoke(kind, m) => write!(f, "{} {}.{} {}", kind.mnemonic(), m.owner, m.name, m.desc),
            Insn::ArrayLength => write!(f, "arraylength"),
            Insn::ArrayLoad(elem) => {
                let prefix = match elem {
                    None => 'a',
                    Some(Primitive::Boolean | Primitive::Byte) => 'b',
                    Some(Primitive::Char) => 'c',
                    Some(Primitive::Short) => 's',
                    Some(p) => p.opcode_prefix(),
                };
                write!(f, "{prefix}aload")
            }
            Insn::Convert(from, to) => write!(f, "{}2{}", from.opcode_prefix(), to.opcode_prefix()),
            Insn::IfEq(l) => write!(f, "ifeq L{}", l.0),
            Insn::IfNull(l) => write!(f, "ifnull L{}", l.0),
            Insn::Goto(l) => write!(f, "goto L{}", l.0),
            Insn::Label(l) => write!(f, "L{}:", l.0),
        }
    }
}

/// Visit-style instruction consumer; the classfile writer sits behind this.
pub trait InsnSink {
    fn visit(&mut self, insn: Insn);
}

/// Sink that records instructions in order.
#[derive(Debug, Default, Clone)]
pub struct InsnBuffer {
    insns: Vec<Insn>,
}

impl InsnBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insns(&self) -> &[Insn] {
        &self.insns
    }

    pub fn into_insns(self) -> Vec<Insn> {
        self.insns
    }

    pub fn len(&self) -> usize {
        self.insns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insns.is_empty()
    }

    /// One instruction per line.
    pub fn listing(&self) -> String {
        listing(&self.insns)
    }
}

impl InsnSink for InsnBuffer {
    fn visit(&mut self, insn: Insn) {
        tracing::trace!(%insn, "emit");
        self.insns.push(insn);
    }
}

pub fn listing(insns: &[Insn]) -> String {
    insns.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("\n")
}
