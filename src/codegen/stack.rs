use crate::diagnostics::CompileError;
use crate::span::Span;
use crate::typeck::JvmType;

/// Static model of the JVM operand stack: one entry per live value, top last.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OperandStack {
    slots: Vec<JvmType>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn top(&self) -> Option<&JvmType> {
        self.slots.last()
    }

    pub fn push(&mut self, ty: JvmType) {
        self.slots.push(ty);
    }

    /// Drop the top `n` entries.
    pub fn remove(&mut self, n: usize) {
        let keep = self.slots.len().saturating_sub(n);
        self.slots.truncate(keep);
    }

    /// Replace the top entry.
    pub fn replace(&mut self, ty: JvmType) {
        self.replace_n(ty, 1);
    }

    /// Pop `n` entries (receiver and arguments of a call) and push the result.
    pub fn replace_n(&mut self, ty: JvmType, n: usize) {
        self.remove(n);
        self.slots.push(ty);
    }

    pub fn slots(&self) -> &[JvmType] {
        &self.slots
    }

    /// Check the depth is `expected`, reporting a compiler bug at `span` otherwise.
    pub fn expect_len(&self, expected: usize, what: &str, span: Span) -> Result<(), CompileError> {
        if self.slots.len() == expected {
            Ok(())
        } else {
            Err(CompileError::internal(
                format!(
                    "operand stack imbalance after {what}: expected depth {expected}, found {}",
                    self.slots.len()
                ),
                span,
            ))
        }
    }
}
