//! Lexical symbol table for schema compilation.
//!
//! A scope maps local names to field-instruction handles. The
//! top-level scope of a document is seeded with the builtin type
//! prototypes; group/sequence/template construction opens nested
//! scopes that can resolve enclosing bindings but whose own bindings
//! vanish when construction completes.

use fastwire_core::arena::Arena;
use fastwire_core::instruction::{
    FieldInstruction, GroupPayload, InstructionBody, SequencePayload, StringPayload,
    TemplatePayload,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Names of the builtin type prototypes seeded into every top-level
/// scope.
pub const BUILTIN_NAMES: [&str; 16] = [
    "int32",
    "uInt32",
    "int64",
    "uInt64",
    "decimal",
    "string",
    "byteVector",
    "int32Vector",
    "uInt32Vector",
    "int64Vector",
    "uInt64Vector",
    "group",
    "sequence",
    "template",
    "boolean",
    "enum",
];

/// Returns true if `name` is one of the builtin type names.
#[must_use]
pub fn is_builtin_name(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// One level of name bindings, chained to an optional parent.
#[derive(Debug, Default)]
pub struct Scope<'p> {
    bindings: HashMap<Arc<str>, Arc<FieldInstruction>>,
    parent: Option<&'p Scope<'p>>,
}

impl<'p> Scope<'p> {
    /// Creates an empty scope with no parent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a top-level scope seeded with the builtin prototypes.
    ///
    /// Prototypes are zero-valued instructions used only as type tags
    /// by the field builder; they are never encoded or decoded. The
    /// `sequence` prototype is pre-wired with the default synthetic
    /// length field.
    #[must_use]
    pub fn with_builtins(arena: &mut Arena) -> Scope<'static> {
        let mut scope = Scope::new();

        bind_prototype(&mut scope, arena, "int32", InstructionBody::Int32 { initial: None });
        bind_prototype(&mut scope, arena, "uInt32", InstructionBody::UInt32 { initial: None });
        bind_prototype(&mut scope, arena, "int64", InstructionBody::Int64 { initial: None });
        bind_prototype(&mut scope, arena, "uInt64", InstructionBody::UInt64 { initial: None });
        bind_prototype(&mut scope, arena, "decimal", InstructionBody::Decimal { initial: None });
        bind_prototype(
            &mut scope,
            arena,
            "string",
            InstructionBody::Ascii(StringPayload::default()),
        );
        bind_prototype(
            &mut scope,
            arena,
            "byteVector",
            InstructionBody::ByteVector(StringPayload::default()),
        );
        bind_prototype(&mut scope, arena, "int32Vector", InstructionBody::Int32Vector);
        bind_prototype(&mut scope, arena, "uInt32Vector", InstructionBody::UInt32Vector);
        bind_prototype(&mut scope, arena, "int64Vector", InstructionBody::Int64Vector);
        bind_prototype(&mut scope, arena, "uInt64Vector", InstructionBody::UInt64Vector);
        bind_prototype(
            &mut scope,
            arena,
            "group",
            InstructionBody::Group(GroupPayload::default()),
        );

        let length = arena.alloc(FieldInstruction::default_sequence_length());
        bind_prototype(
            &mut scope,
            arena,
            "sequence",
            InstructionBody::Sequence(SequencePayload {
                length,
                element: None,
                subinstructions: Vec::new(),
            }),
        );

        bind_prototype(
            &mut scope,
            arena,
            "template",
            InstructionBody::Template(TemplatePayload::default()),
        );
        scope.bind(
            arena.intern("boolean"),
            Arc::clone(FieldInstruction::boolean_prototype()),
        );
        bind_prototype(
            &mut scope,
            arena,
            "enum",
            InstructionBody::Enum {
                members: Vec::new(),
                default: None,
            },
        );

        scope
    }

    /// Opens a nested scope that resolves through this one.
    #[must_use]
    pub fn nested(&self) -> Scope<'_> {
        Scope {
            bindings: HashMap::new(),
            parent: Some(self),
        }
    }

    /// Binds `name` locally; rebinding overwrites (last-write-wins).
    pub fn bind(&mut self, name: Arc<str>, instruction: Arc<FieldInstruction>) {
        self.bindings.insert(name, instruction);
    }

    /// Resolves `name`, walking the parent chain.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Arc<FieldInstruction>> {
        match self.bindings.get(name) {
            Some(found) => Some(found),
            None => self.parent.and_then(|p| p.lookup(name)),
        }
    }

    /// Returns the count of locally bound names (parents excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no name is bound locally.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn bind_prototype(
    scope: &mut Scope<'static>,
    arena: &mut Arena,
    name: &str,
    body: InstructionBody,
) {
    let blank = arena.intern("");
    let proto = arena.alloc(FieldInstruction::new(blank, body));
    scope.bind(arena.intern(name), proto);
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastwire_core::instruction::FieldKind;

    #[test]
    fn test_builtins_seeded() {
        let mut arena = Arena::new();
        let scope = Scope::with_builtins(&mut arena);

        assert_eq!(scope.len(), BUILTIN_NAMES.len());
        for name in BUILTIN_NAMES {
            assert!(scope.lookup(name).is_some(), "missing builtin {name}");
        }
        assert!(scope.lookup("unknown").is_none());
    }

    #[test]
    fn test_sequence_prototype_prewired_length() {
        let mut arena = Arena::new();
        let scope = Scope::with_builtins(&mut arena);

        let proto = scope.lookup("sequence").expect("missing sequence");
        assert_eq!(proto.kind(), FieldKind::Sequence);
        let InstructionBody::Sequence(payload) = &proto.body else {
            panic!("sequence prototype has wrong body");
        };
        assert_eq!(payload.length.name(), "__length__");
        assert_eq!(payload.length.kind(), FieldKind::UInt32);
    }

    #[test]
    fn test_nested_scope_resolves_parent() {
        let mut arena = Arena::new();
        let mut top = Scope::new();
        let outer_name = arena_name(&mut arena, "outer");
        let outer = arena.alloc(FieldInstruction::new(
            outer_name,
            InstructionBody::Int32 { initial: None },
        ));
        top.bind(arena.intern("outer"), outer);

        let nested = top.nested();
        assert!(nested.lookup("outer").is_some());
        assert_eq!(nested.len(), 0);
    }

    #[test]
    fn test_nested_bindings_shadow_and_stay_local() {
        let mut arena = Arena::new();
        let mut top = Scope::new();
        let first_name = arena_name(&mut arena, "x");
        let first = arena.alloc(FieldInstruction::new(
            first_name,
            InstructionBody::Int32 { initial: None },
        ));
        top.bind(arena.intern("x"), first);

        {
            let mut nested = top.nested();
            let shadow = Arc::new(FieldInstruction::new(
                Arc::from("x"),
                InstructionBody::Int64 { initial: None },
            ));
            nested.bind(Arc::from("x"), Arc::clone(&shadow));

            let found = nested.lookup("x").expect("missing binding");
            assert_eq!(found.kind(), FieldKind::Int64);
        }

        let found = top.lookup("x").expect("missing binding");
        assert_eq!(found.kind(), FieldKind::Int32);
    }

    #[test]
    fn test_rebind_overwrites_lookup() {
        let mut scope = Scope::new();
        let first = Arc::new(FieldInstruction::new(
            Arc::from("x"),
            InstructionBody::Int32 { initial: None },
        ));
        let second = Arc::new(FieldInstruction::new(
            Arc::from("x"),
            InstructionBody::UInt64 { initial: None },
        ));
        scope.bind(Arc::from("x"), first);
        scope.bind(Arc::from("x"), second);

        assert_eq!(scope.len(), 1);
        let found = scope.lookup("x").expect("missing binding");
        assert_eq!(found.kind(), FieldKind::UInt64);
    }

    fn arena_name(arena: &mut Arena, name: &str) -> Arc<str> {
        arena.intern(name)
    }
}
