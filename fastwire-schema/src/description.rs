//! Compiled schema artifact.
//!
//! A [`TemplatesDescription`] is the immutable result of compiling one
//! schema document: the ordered template list, the defined-type list,
//! the document namespaces, and the arena that keeps every instruction
//! alive. Compile once, then share freely; nothing here mutates after
//! construction.

use crate::compiler::TemplatesBuilder;
use crate::error::CompileError;
use crate::xml::{Element, walk};
use fastwire_core::arena::Arena;
use fastwire_core::instruction::FieldInstruction;
use fastwire_core::registry::TemplateRegistry;
use std::sync::Arc;

/// The compiled form of one schema document.
#[derive(Debug)]
pub struct TemplatesDescription {
    ns: Arc<str>,
    template_ns: Arc<str>,
    dictionary: Arc<str>,
    templates: Vec<Arc<FieldInstruction>>,
    defined_types: Vec<Arc<FieldInstruction>>,
    arena: Arena,
}

impl TemplatesDescription {
    /// Compiles a schema document, registering its templates and
    /// defined composite types into `registry`.
    ///
    /// Compiling several documents against the same registry lets
    /// later documents reference types the earlier ones defined.
    ///
    /// # Errors
    /// Fails on malformed XML, on a document without a `templates`
    /// root, and on any field that cannot be built (unknown type,
    /// missing or invalid attribute).
    pub fn compile(xml: &str, registry: &TemplateRegistry) -> Result<Self, CompileError> {
        let root = Element::parse(xml)?;
        let mut builder = TemplatesBuilder::new(registry);
        walk(&root, &mut builder)?;
        let description = builder.finish()?;
        tracing::info!(
            templates = description.len(),
            defined_types = description.defined_types().len(),
            "compiled schema document"
        );
        Ok(description)
    }

    /// Compiles against the process-wide registry.
    ///
    /// # Errors
    /// Same failure modes as [`TemplatesDescription::compile`].
    pub fn compile_global(xml: &str) -> Result<Self, CompileError> {
        Self::compile(xml, TemplateRegistry::global())
    }

    pub(crate) fn from_parts(
        ns: Arc<str>,
        template_ns: Arc<str>,
        dictionary: Arc<str>,
        templates: Vec<Arc<FieldInstruction>>,
        defined_types: Vec<Arc<FieldInstruction>>,
        arena: Arena,
    ) -> Self {
        Self {
            ns,
            template_ns,
            dictionary,
            templates,
            defined_types,
            arena,
        }
    }

    /// Returns the document namespace (`ns` attribute).
    #[must_use]
    pub fn ns(&self) -> &str {
        &self.ns
    }

    /// Returns the template namespace (`templateNs` attribute).
    #[must_use]
    pub fn template_ns(&self) -> &str {
        &self.template_ns
    }

    /// Returns the dictionary name (`dictionary` attribute).
    #[must_use]
    pub fn dictionary(&self) -> &str {
        &self.dictionary
    }

    /// Returns the top-level templates in document order.
    #[must_use]
    pub fn templates(&self) -> &[Arc<FieldInstruction>] {
        &self.templates
    }

    /// Returns the defined composite types in declaration order,
    /// including superseded bindings of a reused name.
    #[must_use]
    pub fn defined_types(&self) -> &[Arc<FieldInstruction>] {
        &self.defined_types
    }

    /// Returns the number of top-level templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the document declared no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Finds a top-level template by name; the latest declaration of
    /// a reused name wins.
    #[must_use]
    pub fn template_by_name(&self, name: &str) -> Option<&Arc<FieldInstruction>> {
        self.templates.iter().rev().find(|t| t.name() == name)
    }

    /// Returns the arena owning every instruction of this document.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }
}
