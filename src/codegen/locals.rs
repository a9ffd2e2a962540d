use crate::diagnostics::CompileError;
use crate::span::Span;
use crate::typeck::{JvmType, Primitive};

#[derive(Debug, Clone, PartialEq)]
pub struct Temporary {
    pub name: String,
    pub slot: u16,
    pub ty: JvmType,
}

impl Temporary {
    fn width(&self) -> u16 {
        match self.ty {
            JvmType::Prim(Primitive::Long | Primitive::Double) => 2,
            _ => 1,
        }
    }
}

/// Synthetic local variables allocated above the method's own locals.
#[derive(Debug, Clone)]
pub struct TemporaryScope {
    base: u16,
    active: Vec<Temporary>,
}

impl TemporaryScope {
    /// `base` is the first slot not used by the method's parameters and locals.
    pub fn new(base: u16) -> Self {
        Self { base, active: Vec::new() }
    }

    pub fn define(&mut self, name: &str, ty: JvmType) -> u16 {
        let slot = self
            .active
            .iter()
            .map(|t| t.slot + t.width())
            .max()
            .unwrap_or(self.base);
        tracing::trace!(name, slot, "define temporary");
        self.active.push(Temporary { name: name.to_string(), slot, ty });
        slot
    }

    /// Release a temporary. Releasing a slot that is not live is a compiler bug.
    pub fn release(&mut self, slot: u16) -> Result<(), CompileError> {
        match self.active.iter().position(|t| t.slot == slot) {
            Some(idx) => {
                let temp = self.active.remove(idx);
                tracing::trace!(name = %temp.name, slot, "release temporary");
                Ok(())
            }
            None => Err(CompileError::internal(
                format!("temporary slot {slot} released twice or never defined"),
                Span::dummy(),
            )),
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn get(&self, name: &str) -> Option<&Temporary> {
        self.active.iter().rev().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeck::known;

    #[test]
    fn temporaries_stack_above_base() {
        let mut scope = TemporaryScope::new(2);
        let a = scope.define("tmpList", JvmType::object(known::ARRAY_LIST));
        let b = scope.define("count", JvmType::Prim(Primitive::Long));
        let c = scope.define("next", JvmType::object(known::OBJECT));
        assert_eq!((a, b, c), (2, 3, 5));
        assert_eq!(scope.active_count(), 3);
        assert_eq!(scope.get("count").map(|t| t.slot), Some(3));
    }

    #[test]
    fn released_slots_are_reused() {
        let mut scope = TemporaryScope::new(1);
        let a = scope.define("a", JvmType::int());
        scope.release(a).unwrap();
        assert_eq!(scope.active_count(), 0);
        assert_eq!(scope.define("b", JvmType::int()), a);
    }

    #[test]
    fn double_release_is_an_error() {
        let mut scope = TemporaryScope::new(0);
        let a = scope.define("a", JvmType::int());
        scope.release(a).unwrap();
        assert!(scope.release(a).is_err());
    }
}
