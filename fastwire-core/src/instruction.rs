//! Compiled field-instruction model.
//!
//! A FAST schema compiles into a graph of [`FieldInstruction`] values:
//! one per field, sequence, group and template. Instructions are
//! immutable once built and are shared between the owning schema, the
//! template registry and any referencing instruction through
//! [`Arc`] handles. The encode/decode engine walks this graph by
//! variant tag; nothing here touches the wire format itself.

use crate::value::{DecimalValue, EnumMember};
use std::sync::{Arc, LazyLock};

/// Conventional name of the synthesized sequence length field.
pub const SEQUENCE_LENGTH_NAME: &str = "__length__";

/// Field presence indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Presence {
    /// Field is always present in a message.
    #[default]
    Mandatory,
    /// Field may be absent.
    Optional,
}

impl Presence {
    /// Parses presence from its schema attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mandatory" => Some(Self::Mandatory),
            "optional" => Some(Self::Optional),
            _ => None,
        }
    }
}

/// Presence/encoding operator recorded for a field.
///
/// The operator is opaque to the schema compiler beyond being recorded;
/// its transfer-encoding semantics belong to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operator {
    /// No operator.
    #[default]
    None,
    /// Constant value, never transferred.
    Constant,
    /// Default value when absent.
    Default,
    /// Copy of the previous value.
    Copy,
    /// Increment of the previous value.
    Increment,
    /// Delta against the previous value.
    Delta,
    /// Tail delta (strings).
    Tail,
}

impl Operator {
    /// Parses an operator from its schema element name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "constant" => Some(Self::Constant),
            "default" => Some(Self::Default),
            "copy" => Some(Self::Copy),
            "increment" => Some(Self::Increment),
            "delta" => Some(Self::Delta),
            "tail" => Some(Self::Tail),
            _ => None,
        }
    }
}

/// Variant tag of a field instruction.
///
/// The declaration order is meaningful: every kind at or above
/// [`FieldKind::Sequence`] is a defined composite type, eligible for
/// registration in the template registry. Scalar leaf kinds below
/// `Sequence` never are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKind {
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    UInt64,
    /// Mantissa/exponent decimal.
    Decimal,
    /// ASCII string.
    AsciiString,
    /// Opaque byte vector.
    ByteVector,
    /// Vector of signed 32-bit integers.
    Int32Vector,
    /// Vector of unsigned 32-bit integers.
    UInt32Vector,
    /// Vector of signed 64-bit integers.
    Int64Vector,
    /// Vector of unsigned 64-bit integers.
    UInt64Vector,
    /// Boolean.
    Boolean,
    /// Repeating group of fields.
    Sequence,
    /// Ordered group of fields.
    Group,
    /// Top-level message definition.
    Template,
    /// Named numeric enumeration.
    Enum,
}

impl FieldKind {
    /// Returns true for kinds that become registry-visible defined
    /// types when bound by name.
    #[must_use]
    pub fn is_defined_type(self) -> bool {
        self >= Self::Sequence
    }

    /// Returns true for kinds that carry a presence/encoding operator.
    ///
    /// Typed vectors, containers and boolean are not individually
    /// operator-encoded in this model.
    #[must_use]
    pub const fn has_operator(self) -> bool {
        matches!(
            self,
            Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Decimal
                | Self::AsciiString
                | Self::ByteVector
                | Self::Enum
        )
    }
}

/// String/byte-vector payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringPayload {
    /// Initial/default value from the schema.
    pub initial: Option<String>,
    /// Name of an associated length field, when declared.
    pub length_name: Option<Arc<str>>,
    /// Explicit length, when declared.
    pub length: Option<u32>,
}

/// Group payload: an ordered list of child instructions.
#[derive(Debug, Clone, Default)]
pub struct GroupPayload {
    /// Child field instructions in declaration order.
    pub subinstructions: Vec<Arc<FieldInstruction>>,
}

/// Sequence payload.
#[derive(Debug, Clone)]
pub struct SequencePayload {
    /// Repeat-count instruction; synthesized when the schema omits one.
    pub length: Arc<FieldInstruction>,
    /// Set when the sequence body is a reference to an externally
    /// defined group or template rather than inline fields.
    pub element: Option<Arc<FieldInstruction>>,
    /// Per-entry field instructions in declaration order.
    pub subinstructions: Vec<Arc<FieldInstruction>>,
}

/// Template payload.
#[derive(Debug, Clone, Default)]
pub struct TemplatePayload {
    /// Field instructions in declaration order.
    pub subinstructions: Vec<Arc<FieldInstruction>>,
    /// Set when the template body is a single reference to another
    /// named template.
    pub reference: Option<Arc<FieldInstruction>>,
}

/// Variant-specific payload of a field instruction.
#[derive(Debug, Clone)]
pub enum InstructionBody {
    /// Signed 32-bit integer field.
    Int32 {
        /// Initial/default value.
        initial: Option<i32>,
    },
    /// Unsigned 32-bit integer field.
    UInt32 {
        /// Initial/default value.
        initial: Option<u32>,
    },
    /// Signed 64-bit integer field.
    Int64 {
        /// Initial/default value.
        initial: Option<i64>,
    },
    /// Unsigned 64-bit integer field.
    UInt64 {
        /// Initial/default value.
        initial: Option<u64>,
    },
    /// Decimal field.
    Decimal {
        /// Initial/default value.
        initial: Option<DecimalValue>,
    },
    /// ASCII string field.
    Ascii(StringPayload),
    /// Byte-vector field.
    ByteVector(StringPayload),
    /// Vector of signed 32-bit integers.
    Int32Vector,
    /// Vector of unsigned 32-bit integers.
    UInt32Vector,
    /// Vector of signed 64-bit integers.
    Int64Vector,
    /// Vector of unsigned 64-bit integers.
    UInt64Vector,
    /// Boolean field.
    Boolean,
    /// Enumeration field.
    Enum {
        /// Named numeric members in declaration order.
        members: Vec<EnumMember>,
        /// Index of the default member, when declared.
        default: Option<usize>,
    },
    /// Repeating group.
    Sequence(SequencePayload),
    /// Ordered group.
    Group(GroupPayload),
    /// Top-level message definition.
    Template(TemplatePayload),
}

impl InstructionBody {
    /// Returns the variant tag.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Int32 { .. } => FieldKind::Int32,
            Self::UInt32 { .. } => FieldKind::UInt32,
            Self::Int64 { .. } => FieldKind::Int64,
            Self::UInt64 { .. } => FieldKind::UInt64,
            Self::Decimal { .. } => FieldKind::Decimal,
            Self::Ascii(_) => FieldKind::AsciiString,
            Self::ByteVector(_) => FieldKind::ByteVector,
            Self::Int32Vector => FieldKind::Int32Vector,
            Self::UInt32Vector => FieldKind::UInt32Vector,
            Self::Int64Vector => FieldKind::Int64Vector,
            Self::UInt64Vector => FieldKind::UInt64Vector,
            Self::Boolean => FieldKind::Boolean,
            Self::Enum { .. } => FieldKind::Enum,
            Self::Sequence(_) => FieldKind::Sequence,
            Self::Group(_) => FieldKind::Group,
            Self::Template(_) => FieldKind::Template,
        }
    }
}

/// One compiled schema field.
///
/// Shared metadata plus a variant-specific payload. An `id` of 0 means
/// unset; an empty `ns` means "inherit the enclosing namespace".
#[derive(Debug, Clone)]
pub struct FieldInstruction {
    /// Numeric field id (0 = unset).
    pub id: u32,
    /// Presence/encoding operator.
    pub operator: Operator,
    /// Field presence.
    pub presence: Presence,
    /// Local field name.
    pub name: Arc<str>,
    /// Namespace (empty = inherit).
    pub ns: Arc<str>,
    /// Variant payload.
    pub body: InstructionBody,
}

impl FieldInstruction {
    /// Creates an instruction with default metadata (id 0, no
    /// operator, mandatory presence, empty namespace).
    #[must_use]
    pub fn new(name: Arc<str>, body: InstructionBody) -> Self {
        Self {
            id: 0,
            operator: Operator::None,
            presence: Presence::Mandatory,
            name,
            ns: Arc::from(""),
            body,
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a shared handle to the field name.
    #[must_use]
    pub fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Returns the namespace (empty = inherit).
    #[must_use]
    pub fn ns(&self) -> &str {
        &self.ns
    }

    /// Returns the variant tag.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.body.kind()
    }

    /// Returns true if this instruction is a defined composite type.
    #[must_use]
    pub fn is_defined_type(&self) -> bool {
        self.kind().is_defined_type()
    }

    /// Returns true if the field is optional.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.presence == Presence::Optional
    }

    /// Returns the process-wide boolean prototype.
    ///
    /// Boolean fields carry no per-instance payload, so a single
    /// shared prototype serves every schema.
    #[must_use]
    pub fn boolean_prototype() -> &'static Arc<FieldInstruction> {
        static BOOLEAN: LazyLock<Arc<FieldInstruction>> =
            LazyLock::new(|| Arc::new(FieldInstruction::new(Arc::from(""), InstructionBody::Boolean)));
        &BOOLEAN
    }

    /// Creates the default synthetic sequence length instruction:
    /// `__length__`, unsigned 32-bit, mandatory, no operator.
    #[must_use]
    pub fn default_sequence_length() -> Self {
        Self::new(
            Arc::from(SEQUENCE_LENGTH_NAME),
            InstructionBody::UInt32 { initial: None },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_parse() {
        assert_eq!(Presence::parse("mandatory"), Some(Presence::Mandatory));
        assert_eq!(Presence::parse("optional"), Some(Presence::Optional));
        assert_eq!(Presence::parse("required"), None);
    }

    #[test]
    fn test_operator_parse() {
        assert_eq!(Operator::parse("copy"), Some(Operator::Copy));
        assert_eq!(Operator::parse("delta"), Some(Operator::Delta));
        assert_eq!(Operator::parse("tail"), Some(Operator::Tail));
        assert_eq!(Operator::parse("none"), None);
        assert_eq!(Operator::parse("unknown"), None);
    }

    #[test]
    fn test_defined_type_ordinal_rule() {
        assert!(FieldKind::Sequence.is_defined_type());
        assert!(FieldKind::Group.is_defined_type());
        assert!(FieldKind::Template.is_defined_type());
        assert!(FieldKind::Enum.is_defined_type());

        assert!(!FieldKind::Int32.is_defined_type());
        assert!(!FieldKind::AsciiString.is_defined_type());
        assert!(!FieldKind::UInt64Vector.is_defined_type());
        assert!(!FieldKind::Boolean.is_defined_type());
    }

    #[test]
    fn test_has_operator() {
        assert!(FieldKind::Int32.has_operator());
        assert!(FieldKind::Decimal.has_operator());
        assert!(FieldKind::Enum.has_operator());
        assert!(!FieldKind::Int32Vector.has_operator());
        assert!(!FieldKind::Sequence.has_operator());
        assert!(!FieldKind::Boolean.has_operator());
    }

    #[test]
    fn test_body_kind() {
        assert_eq!(
            InstructionBody::Int32 { initial: None }.kind(),
            FieldKind::Int32
        );
        assert_eq!(
            InstructionBody::Ascii(StringPayload::default()).kind(),
            FieldKind::AsciiString
        );
        assert_eq!(
            InstructionBody::Group(GroupPayload::default()).kind(),
            FieldKind::Group
        );
    }

    #[test]
    fn test_new_defaults() {
        let inst = FieldInstruction::new(Arc::from("price"), InstructionBody::Decimal {
            initial: None,
        });
        assert_eq!(inst.id, 0);
        assert_eq!(inst.operator, Operator::None);
        assert_eq!(inst.presence, Presence::Mandatory);
        assert_eq!(inst.name(), "price");
        assert_eq!(inst.ns(), "");
        assert!(!inst.is_optional());
        assert!(!inst.is_defined_type());
    }

    #[test]
    fn test_boolean_prototype_is_shared() {
        let a = FieldInstruction::boolean_prototype();
        let b = FieldInstruction::boolean_prototype();
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(a.kind(), FieldKind::Boolean);
    }

    #[test]
    fn test_default_sequence_length() {
        let length = FieldInstruction::default_sequence_length();
        assert_eq!(length.name(), SEQUENCE_LENGTH_NAME);
        assert_eq!(length.kind(), FieldKind::UInt32);
        assert_eq!(length.presence, Presence::Mandatory);
        assert_eq!(length.operator, Operator::None);
    }
}
