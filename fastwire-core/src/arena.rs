//! Pool ownership for compiled instructions and duplicated strings.
//!
//! Every instruction and every name/namespace string produced while
//! compiling one schema document is recorded in that document's
//! [`Arena`]. Nothing is freed individually; the pool drops as a unit
//! with its owner. Handles are [`Arc`]s, so registry entries and
//! cross-references stay valid even if the originating pool is dropped
//! first.

use crate::instruction::FieldInstruction;
use std::collections::HashSet;
use std::sync::Arc;

/// Pool owning compiled instructions and interned strings.
#[derive(Debug, Default)]
pub struct Arena {
    instructions: Vec<Arc<FieldInstruction>>,
    strings: HashSet<Arc<str>>,
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an instruction in the pool and returns a shared handle.
    pub fn alloc(&mut self, instruction: FieldInstruction) -> Arc<FieldInstruction> {
        let handle = Arc::new(instruction);
        self.instructions.push(Arc::clone(&handle));
        handle
    }

    /// Interns a string, deduplicating repeated names/namespaces.
    pub fn intern(&mut self, s: &str) -> Arc<str> {
        if let Some(existing) = self.strings.get(s) {
            return Arc::clone(existing);
        }
        let interned: Arc<str> = Arc::from(s);
        self.strings.insert(Arc::clone(&interned));
        interned
    }

    /// Returns the number of instructions owned by the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the pool owns no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::InstructionBody;

    #[test]
    fn test_alloc_records_instruction() {
        let mut arena = Arena::new();
        assert!(arena.is_empty());

        let inst = arena.alloc(FieldInstruction::new(
            Arc::from("value"),
            InstructionBody::Int32 { initial: None },
        ));
        assert_eq!(arena.len(), 1);
        assert_eq!(inst.name(), "value");
    }

    #[test]
    fn test_intern_deduplicates() {
        let mut arena = Arena::new();
        let a = arena.intern("Symbol");
        let b = arena.intern("Symbol");
        let c = arena.intern("Price");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_handles_outlive_arena() {
        let inst = {
            let mut arena = Arena::new();
            arena.alloc(FieldInstruction::new(
                Arc::from("value"),
                InstructionBody::UInt64 { initial: Some(7) },
            ))
        };
        assert_eq!(inst.name(), "value");
    }
}
