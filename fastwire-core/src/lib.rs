//! # Fastwire Core
//!
//! Compiled artifact model for FAST (FIX Adapted for STreaming)
//! template schemas.
//!
//! This crate provides:
//! - The tagged field-instruction model walked by the codec
//! - Value storage for schema-declared initial values
//! - Arena ownership for everything compiled from one document
//! - The cross-document template registry

pub mod arena;
pub mod instruction;
pub mod registry;
pub mod value;

pub use arena::Arena;
pub use instruction::{
    FieldInstruction, FieldKind, GroupPayload, InstructionBody, Operator, Presence,
    SequencePayload, StringPayload, TemplatePayload, SEQUENCE_LENGTH_NAME,
};
pub use registry::TemplateRegistry;
pub use value::{DecimalParseError, DecimalValue, EnumMember};
