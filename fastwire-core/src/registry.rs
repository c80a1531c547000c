//! Cross-document template registry.
//!
//! The registry is a namespace-partitioned catalog mapping
//! `(namespace, name)` to a compiled instruction, shared by every
//! schema compiled against it: a type defined while compiling one
//! document stays resolvable while compiling the next. Entries
//! accumulate for the registry's lifetime; there is no removal.
//!
//! Access is internally synchronized, so a registry can be shared
//! across threads by reference. Tests and embedders construct isolated
//! instances with [`TemplateRegistry::new`]; [`TemplateRegistry::global`]
//! serves callers that want one catalog per process.

use crate::arena::Arena;
use crate::instruction::FieldInstruction;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

#[derive(Debug, Default)]
struct RegistryState {
    // Interns namespace/name keys; instructions stay owned by their
    // originating schema's arena through shared handles.
    arena: Arena,
    by_ns: HashMap<Arc<str>, HashMap<Arc<str>, Arc<FieldInstruction>>>,
}

/// Namespace-partitioned catalog of compiled template/type instructions.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    state: RwLock<RegistryState>,
}

impl TemplateRegistry {
    /// Creates an empty, isolated registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry instance.
    #[must_use]
    pub fn global() -> &'static TemplateRegistry {
        static GLOBAL: LazyLock<TemplateRegistry> = LazyLock::new(TemplateRegistry::new);
        &GLOBAL
    }

    /// Registers an instruction under `(ns, instruction.name())`.
    ///
    /// Re-adding a name in the same namespace overwrites the prior
    /// binding (last-write-wins). An empty `ns` is the default bucket.
    pub fn add(&self, ns: &str, instruction: Arc<FieldInstruction>) {
        let mut state = self.state.write();
        let ns_key = state.arena.intern(ns);
        let name_key = state.arena.intern(instruction.name());
        state
            .by_ns
            .entry(ns_key)
            .or_default()
            .insert(name_key, instruction);
    }

    /// Looks up an instruction by namespace and name.
    #[must_use]
    pub fn lookup(&self, ns: &str, name: &str) -> Option<Arc<FieldInstruction>> {
        let state = self.state.read();
        state.by_ns.get(ns).and_then(|names| names.get(name)).cloned()
    }

    /// Returns true if `(ns, name)` is registered.
    #[must_use]
    pub fn contains(&self, ns: &str, name: &str) -> bool {
        self.lookup(ns, name).is_some()
    }

    /// Returns the number of entries registered under `ns`.
    #[must_use]
    pub fn len(&self, ns: &str) -> usize {
        self.state.read().by_ns.get(ns).map_or(0, HashMap::len)
    }

    /// Returns true if the registry holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().by_ns.values().all(HashMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{GroupPayload, InstructionBody};

    fn group(name: &str, ns: &str) -> Arc<FieldInstruction> {
        let mut inst = FieldInstruction::new(
            Arc::from(name),
            InstructionBody::Group(GroupPayload::default()),
        );
        inst.ns = Arc::from(ns);
        Arc::new(inst)
    }

    #[test]
    fn test_add_and_lookup() {
        let registry = TemplateRegistry::new();
        registry.add("Foo", group("seq1", "Foo"));

        assert!(registry.contains("Foo", "seq1"));
        assert!(registry.lookup("Foo", "seq1").is_some());
        assert!(registry.lookup("Bar", "seq1").is_none());
        assert!(registry.lookup("Foo", "other").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let registry = TemplateRegistry::new();
        let first = group("T", "Foo");
        let second = group("T", "Foo");
        registry.add("Foo", Arc::clone(&first));
        registry.add("Foo", Arc::clone(&second));

        let found = registry.lookup("Foo", "T").expect("missing entry");
        assert!(Arc::ptr_eq(&found, &second));
        assert_eq!(registry.len("Foo"), 1);
    }

    #[test]
    fn test_empty_namespace_is_default_bucket() {
        let registry = TemplateRegistry::new();
        registry.add("", group("T", ""));

        assert!(registry.contains("", "T"));
        assert!(!registry.contains("Foo", "T"));
    }

    #[test]
    fn test_isolated_instances() {
        let a = TemplateRegistry::new();
        let b = TemplateRegistry::new();
        a.add("Foo", group("T", "Foo"));

        assert!(a.contains("Foo", "T"));
        assert!(!b.contains("Foo", "T"));
        assert!(b.is_empty());
    }

    #[test]
    fn test_entry_outlives_source_handle() {
        let registry = TemplateRegistry::new();
        {
            let inst = group("T", "Foo");
            registry.add("Foo", inst);
        }
        assert_eq!(registry.lookup("Foo", "T").map(|i| i.ns.to_string()), Some("Foo".into()));
    }
}
