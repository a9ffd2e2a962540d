use crate::config::CodegenOptions;
use crate::diagnostics::Diagnostics;
use crate::typeck::{ClassId, JvmType, TypeResolver};

use super::insn::{Insn, InsnSink, Label};
use super::locals::TemporaryScope;
use super::stack::OperandStack;

/// Per-method emission state. The single writer of the operand stack model and
/// the temporary scope while a method body is generated.
pub struct EmissionContext<'a> {
    pub resolver: &'a dyn TypeResolver,
    /// The class whose method is being generated.
    pub enclosing: ClassId,
    pub options: &'a CodegenOptions,
    pub stack: OperandStack,
    pub temps: TemporaryScope,
    pub diagnostics: &'a mut Diagnostics,
    /// Code is generated for a closure body rather than a method of `enclosing`.
    pub in_closure: bool,
    out: &'a mut dyn InsnSink,
    next_label: u32,
}

impl<'a> EmissionContext<'a> {
    pub fn new(
        resolver: &'a dyn TypeResolver,
        enclosing: ClassId,
        options: &'a CodegenOptions,
        out: &'a mut dyn InsnSink,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            resolver,
            enclosing,
            options,
            stack: OperandStack::new(),
            // slot 0 holds `this`
            temps: TemporaryScope::new(1),
            diagnostics,
            in_closure: false,
            out,
            next_label: 0,
        }
    }

    /// First slot free for temporaries; slots below it belong to parameters and locals.
    pub fn with_max_locals(mut self, max_locals: u16) -> Self {
        self.temps = TemporaryScope::new(max_locals);
        self
    }

    pub fn in_closure(mut self, in_closure: bool) -> Self {
        self.in_closure = in_closure;
        self
    }

    pub fn new_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    pub fn visit(&mut self, insn: Insn) {
        self.out.visit(insn);
    }

    pub fn enclosing_type(&self) -> JvmType {
        JvmType::object(self.enclosing)
    }
}
