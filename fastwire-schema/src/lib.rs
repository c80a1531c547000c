//! # Fastwire Schema
//!
//! XML schema compiler for FAST (FIX Adapted for STreaming) template
//! definitions.
//!
//! A schema document (`<templates>` with `<define>` and `<template>`
//! children) compiles into a [`TemplatesDescription`]: an immutable
//! graph of field instructions ready for the encode/decode engine.
//! Compilation registers every template and defined composite type
//! into a [`TemplateRegistry`](fastwire_core::TemplateRegistry), so
//! documents compiled against the same registry can reference each
//! other's types.
//!
//! ```no_run
//! use fastwire_core::TemplateRegistry;
//! use fastwire_schema::TemplatesDescription;
//!
//! let registry = TemplateRegistry::new();
//! let description = TemplatesDescription::compile(
//!     r#"<templates>
//!          <template name="Quote" id="1">
//!            <uInt32 name="seqno"/>
//!            <decimal name="px"><delta/></decimal>
//!          </template>
//!        </templates>"#,
//!     &registry,
//! )?;
//! assert_eq!(description.len(), 1);
//! # Ok::<(), fastwire_schema::CompileError>(())
//! ```

mod builder;

pub mod compiler;
pub mod description;
pub mod error;
pub mod scope;
pub mod xml;

pub use compiler::TemplatesBuilder;
pub use description::TemplatesDescription;
pub use error::{CompileError, ParseError};
pub use scope::{BUILTIN_NAMES, Scope, is_builtin_name};
pub use xml::{Element, ElementVisitor, Traversal, walk};
