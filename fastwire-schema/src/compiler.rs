//! Schema document traversal and registration.
//!
//! [`TemplatesBuilder`] walks one parsed schema document: it captures
//! the namespace/dictionary attributes from the `templates` root,
//! hands every `define`/`template` subtree to the field builder, and
//! accumulates the ordered template list plus the defined-type list.
//! Results are frozen exactly once, on exit of the root element.

use crate::builder::{FieldContext, build_field};
use crate::description::TemplatesDescription;
use crate::error::{CompileError, ParseError};
use crate::scope::Scope;
use crate::xml::{Element, ElementVisitor, Traversal};
use fastwire_core::arena::Arena;
use fastwire_core::instruction::FieldInstruction;
use fastwire_core::registry::TemplateRegistry;
use std::sync::Arc;

/// Compiles one schema document into a [`TemplatesDescription`].
pub struct TemplatesBuilder<'r> {
    registry: &'r TemplateRegistry,
    arena: Arena,
    scope: Scope<'static>,
    ns: Arc<str>,
    template_ns: Arc<str>,
    dictionary: Arc<str>,
    resolved_ns: Arc<str>,
    templates: Vec<Arc<FieldInstruction>>,
    frozen: Vec<Arc<FieldInstruction>>,
    defined_types: Vec<Arc<FieldInstruction>>,
    seen_root: bool,
}

impl<'r> TemplatesBuilder<'r> {
    /// Creates a builder compiling against `registry`, with a fresh
    /// arena and a scope seeded with the builtin prototypes.
    #[must_use]
    pub fn new(registry: &'r TemplateRegistry) -> Self {
        let mut arena = Arena::new();
        let scope = Scope::with_builtins(&mut arena);
        let blank = arena.intern("");
        Self {
            registry,
            arena,
            scope,
            ns: Arc::clone(&blank),
            template_ns: Arc::clone(&blank),
            dictionary: Arc::clone(&blank),
            resolved_ns: blank,
            templates: Vec::new(),
            frozen: Vec::new(),
            defined_types: Vec::new(),
            seen_root: false,
        }
    }

    /// Count of names bound in the document's top-level scope
    /// (builtins included); sizes the frozen template storage.
    #[must_use]
    pub fn num_instructions(&self) -> usize {
        self.scope.len()
    }

    /// Binds a constructed instruction into the top-level scope.
    ///
    /// Defined composite types (kinds at or above sequence) are also
    /// appended to the defined-type list and registered under their
    /// own namespace, falling back to the document's resolved template
    /// namespace.
    pub fn add_instruction(&mut self, instruction: Arc<FieldInstruction>) {
        self.scope
            .bind(instruction.name_arc(), Arc::clone(&instruction));

        if instruction.is_defined_type() {
            self.defined_types.push(Arc::clone(&instruction));
            let ns = if instruction.ns().is_empty() {
                Arc::clone(&self.resolved_ns)
            } else {
                Arc::clone(&instruction.ns)
            };
            tracing::debug!(name = instruction.name(), ns = &*ns, "registering defined type");
            self.registry.add(&ns, instruction);
        }
    }

    /// Appends a template to the ordered top-level list and registers
    /// it; templates are always registry-visible (an empty namespace
    /// is the registry's default bucket).
    pub fn add_template(&mut self, ns: &str, instruction: Arc<FieldInstruction>) {
        tracing::debug!(name = instruction.name(), ns, "registering template");
        self.templates.push(Arc::clone(&instruction));
        self.registry.add(ns, instruction);
    }

    /// Produces the compiled schema.
    ///
    /// # Errors
    /// Fails when the document never presented a `templates` root.
    pub fn finish(self) -> Result<TemplatesDescription, CompileError> {
        if !self.seen_root {
            return Err(ParseError::invalid_structure("no templates element found").into());
        }
        Ok(TemplatesDescription::from_parts(
            self.ns,
            self.template_ns,
            self.dictionary,
            self.frozen,
            self.defined_types,
            self.arena,
        ))
    }

    fn build_from(
        &mut self,
        element: &Element,
        name_override: Option<&str>,
    ) -> Result<Arc<FieldInstruction>, CompileError> {
        let instruction = {
            let mut ctx = FieldContext {
                arena: &mut self.arena,
                registry: self.registry,
                resolved_ns: Arc::clone(&self.resolved_ns),
            };
            build_field(&mut ctx, &self.scope, element, name_override)?
        };
        Ok(self.arena.alloc(instruction))
    }

    fn freeze(&mut self) {
        let mut frozen = Vec::with_capacity(self.num_instructions());
        frozen.append(&mut self.templates);
        self.frozen = frozen;
    }
}

impl ElementVisitor for TemplatesBuilder<'_> {
    type Error = CompileError;

    fn enter(&mut self, element: &Element) -> Result<Traversal, CompileError> {
        match element.name() {
            "templates" => {
                self.seen_root = true;
                self.ns = self.arena.intern(element.attr_or("ns", ""));
                self.resolved_ns = self.arena.intern(element.attr_or("templateNs", ""));
                self.template_ns = Arc::clone(&self.resolved_ns);
                self.dictionary = self.arena.intern(element.attr_or("dictionary", ""));
                Ok(Traversal::Descend)
            }
            "define" => {
                // Missing name or body skips silently: permissive
                // policy inherited from the reference behavior.
                match (element.attr("name"), element.first_child()) {
                    (Some(name), Some(child)) => {
                        let name = name.to_string();
                        let instruction = self.build_from(child, Some(&name))?;
                        self.add_instruction(instruction);
                    }
                    _ => {
                        tracing::debug!("skipping define without name or body");
                    }
                }
                Ok(Traversal::Skip)
            }
            "template" => {
                let instruction = self.build_from(element, None)?;
                let ns = if instruction.ns().is_empty() {
                    Arc::clone(&self.resolved_ns)
                } else {
                    Arc::clone(&instruction.ns)
                };
                self.add_template(&ns, instruction);
                Ok(Traversal::Skip)
            }
            _ => Ok(Traversal::Descend),
        }
    }

    fn exit(&mut self, element: &Element) -> Result<(), CompileError> {
        if element.name() == "templates" {
            self.freeze();
        }
        Ok(())
    }
}
