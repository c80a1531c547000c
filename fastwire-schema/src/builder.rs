//! Per-element field construction.
//!
//! Turns one schema element, together with its enclosing scope, into a
//! concrete [`FieldInstruction`]. The element name resolves to a
//! prototype: a builtin type name yields inline construction of the
//! variant payload, while the name of a previously defined type or
//! registered template yields a clone of that instruction with local
//! metadata (name/id/ns/presence) overridden.

use crate::error::CompileError;
use crate::scope::{Scope, is_builtin_name};
use crate::xml::Element;
use fastwire_core::arena::Arena;
use fastwire_core::instruction::{
    FieldInstruction, FieldKind, GroupPayload, InstructionBody, Operator, Presence,
    SequencePayload, TemplatePayload,
};
use fastwire_core::registry::TemplateRegistry;
use fastwire_core::value::{DecimalValue, EnumMember};
use std::sync::Arc;

/// Shared construction state threaded through builder recursion.
pub(crate) struct FieldContext<'a> {
    /// Arena of the document being compiled.
    pub arena: &'a mut Arena,
    /// Cross-document registry for reference resolution.
    pub registry: &'a TemplateRegistry,
    /// Resolved template namespace of the document.
    pub resolved_ns: Arc<str>,
}

/// Builds one field instruction from `element` within `scope`.
///
/// `name_override` is the binding target of an enclosing `define`; it
/// takes precedence over the element's own `name` attribute.
pub(crate) fn build_field(
    ctx: &mut FieldContext<'_>,
    scope: &Scope<'_>,
    element: &Element,
    name_override: Option<&str>,
) -> Result<FieldInstruction, CompileError> {
    if element.name() == "templateRef" {
        return build_template_ref(ctx, scope, element, name_override);
    }

    let proto = resolve_prototype(ctx.registry, &ctx.resolved_ns, scope, element)?;
    let mut inst = (*proto).clone();
    let require_name = inst.kind() != FieldKind::Group;
    apply_common(ctx, element, name_override, require_name, &mut inst)?;

    if !is_builtin_name(element.name()) {
        // Reference to a defined type: metadata override only.
        return Ok(inst);
    }

    match inst.kind() {
        FieldKind::Int32
        | FieldKind::UInt32
        | FieldKind::Int64
        | FieldKind::UInt64
        | FieldKind::Decimal => apply_operator(element, &mut inst)?,
        FieldKind::AsciiString | FieldKind::ByteVector => {
            apply_operator(element, &mut inst)?;
            apply_string_payload(ctx, element, &mut inst)?;
        }
        FieldKind::Int32Vector
        | FieldKind::UInt32Vector
        | FieldKind::Int64Vector
        | FieldKind::UInt64Vector
        | FieldKind::Boolean => {}
        FieldKind::Enum => build_enum(ctx, element, &mut inst)?,
        FieldKind::Group => {
            let subinstructions = build_children(ctx, scope, element.children())?;
            inst.body = InstructionBody::Group(GroupPayload { subinstructions });
        }
        FieldKind::Sequence => {
            inst.body = InstructionBody::Sequence(build_sequence(ctx, scope, element)?);
        }
        FieldKind::Template => {
            inst.body = InstructionBody::Template(build_template(ctx, scope, element)?);
        }
    }

    Ok(inst)
}

/// Resolves an element name to its prototype: scope chain first, then
/// the registry under the element's `ns` (or the document's resolved
/// namespace).
fn resolve_prototype(
    registry: &TemplateRegistry,
    resolved_ns: &str,
    scope: &Scope<'_>,
    element: &Element,
) -> Result<Arc<FieldInstruction>, CompileError> {
    let type_name = element.name();
    if let Some(found) = scope.lookup(type_name) {
        return Ok(Arc::clone(found));
    }

    let ns = element.attr_or("ns", resolved_ns);
    registry.lookup(ns, type_name).ok_or_else(|| {
        CompileError::unknown_type(type_name, element.attr_or("name", ""))
    })
}

/// Applies the shared metadata attributes (name, id, ns, presence).
fn apply_common(
    ctx: &mut FieldContext<'_>,
    element: &Element,
    name_override: Option<&str>,
    require_name: bool,
    inst: &mut FieldInstruction,
) -> Result<(), CompileError> {
    if let Some(name) = name_override.or_else(|| element.attr("name")) {
        inst.name = ctx.arena.intern(name);
    }
    if require_name && inst.name().is_empty() {
        return Err(CompileError::missing_attr(element.name(), "name"));
    }

    if let Some(id) = element.attr("id") {
        inst.id = id
            .parse()
            .map_err(|_| CompileError::invalid_attr(element.name(), "id", id))?;
    }
    if let Some(ns) = element.attr("ns") {
        inst.ns = ctx.arena.intern(ns);
    }
    if let Some(presence) = element.attr("presence") {
        inst.presence = Presence::parse(presence)
            .ok_or_else(|| CompileError::invalid_attr(element.name(), "presence", presence))?;
    }

    Ok(())
}

/// Records the operator child element and its initial value, if any.
fn apply_operator(element: &Element, inst: &mut FieldInstruction) -> Result<(), CompileError> {
    for child in element.children() {
        let Some(op) = Operator::parse(child.name()) else {
            continue;
        };
        inst.operator = op;

        if let Some(value) = child.attr("value") {
            let invalid = || CompileError::invalid_attr(child.name(), "value", value);
            match &mut inst.body {
                InstructionBody::Int32 { initial } => {
                    *initial = Some(value.parse().map_err(|_| invalid())?);
                }
                InstructionBody::UInt32 { initial } => {
                    *initial = Some(value.parse().map_err(|_| invalid())?);
                }
                InstructionBody::Int64 { initial } => {
                    *initial = Some(value.parse().map_err(|_| invalid())?);
                }
                InstructionBody::UInt64 { initial } => {
                    *initial = Some(value.parse().map_err(|_| invalid())?);
                }
                InstructionBody::Decimal { initial } => {
                    *initial = Some(value.parse::<DecimalValue>().map_err(|_| invalid())?);
                }
                InstructionBody::Ascii(payload) | InstructionBody::ByteVector(payload) => {
                    payload.initial = Some(value.to_string());
                }
                _ => {}
            }
        }
        break;
    }

    Ok(())
}

/// Applies the string/byte-vector length declarations.
fn apply_string_payload(
    ctx: &mut FieldContext<'_>,
    element: &Element,
    inst: &mut FieldInstruction,
) -> Result<(), CompileError> {
    let (InstructionBody::Ascii(payload) | InstructionBody::ByteVector(payload)) = &mut inst.body
    else {
        return Ok(());
    };

    if let Some(length) = element.attr("length") {
        payload.length = Some(
            length
                .parse()
                .map_err(|_| CompileError::invalid_attr(element.name(), "length", length))?,
        );
    }
    if let Some(child) = element.children().iter().find(|c| c.name() == "length")
        && let Some(name) = child.attr("name")
    {
        payload.length_name = Some(ctx.arena.intern(name));
    }

    Ok(())
}

/// Builds the enum member list and resolves the default member from
/// the operator value (by name, else by numeric literal).
fn build_enum(
    ctx: &mut FieldContext<'_>,
    element: &Element,
    inst: &mut FieldInstruction,
) -> Result<(), CompileError> {
    let mut members = Vec::new();
    for child in element.children() {
        if child.name() != "element" {
            continue;
        }
        let name = child
            .attr("name")
            .ok_or_else(|| CompileError::missing_attr("element", "name"))?;
        let value = match child.attr("value") {
            Some(v) => v
                .parse()
                .map_err(|_| CompileError::invalid_attr("element", "value", v))?,
            None => members.len() as u64,
        };
        members.push(EnumMember::new(ctx.arena.intern(name), value));
    }

    let mut default = None;
    for child in element.children() {
        let Some(op) = Operator::parse(child.name()) else {
            continue;
        };
        inst.operator = op;
        if let Some(value) = child.attr("value") {
            let index = members
                .iter()
                .position(|m| &*m.name == value)
                .or_else(|| {
                    value
                        .parse::<u64>()
                        .ok()
                        .and_then(|v| members.iter().position(|m| m.value == v))
                })
                .ok_or_else(|| CompileError::invalid_attr(element.name(), "value", value))?;
            default = Some(index);
        }
        break;
    }

    inst.body = InstructionBody::Enum { members, default };
    Ok(())
}

/// Builds the children of a group/template in a nested scope, binding
/// each built instruction locally so later siblings can resolve
/// earlier ones.
fn build_children(
    ctx: &mut FieldContext<'_>,
    scope: &Scope<'_>,
    children: &[Element],
) -> Result<Vec<Arc<FieldInstruction>>, CompileError> {
    let mut local = scope.nested();
    let mut out = Vec::new();

    for child in children {
        if !is_field_element(child) {
            continue;
        }
        let inst = build_field(ctx, &local, child, None)?;
        let inst = ctx.arena.alloc(inst);
        local.bind(inst.name_arc(), Arc::clone(&inst));
        out.push(inst);
    }

    Ok(out)
}

/// Returns false for metadata children the builder skips: operator
/// elements, `typeRef`, and dynamic `templateRef` (no target name).
fn is_field_element(element: &Element) -> bool {
    if Operator::parse(element.name()).is_some() {
        return false;
    }
    match element.name() {
        "typeRef" => {
            tracing::trace!("skipping typeRef metadata element");
            false
        }
        "templateRef" if element.attr("name").is_none() => {
            tracing::debug!("skipping dynamic templateRef without a target name");
            false
        }
        _ => true,
    }
}

/// Builds a sequence payload: explicit or synthesized length, entry
/// fields, and the element-reference indirection when the single
/// entry is a reference to a defined group/template.
fn build_sequence(
    ctx: &mut FieldContext<'_>,
    scope: &Scope<'_>,
    element: &Element,
) -> Result<SequencePayload, CompileError> {
    let mut length = None;
    let mut subinstructions = Vec::new();
    let mut lone_child: Option<&Element> = None;

    let mut local = scope.nested();
    for child in element.children() {
        if child.name() == "length" {
            let inst = build_length(ctx, child)?;
            length = Some(ctx.arena.alloc(inst));
            continue;
        }
        if !is_field_element(child) {
            continue;
        }
        let inst = build_field(ctx, &local, child, None)?;
        let inst = ctx.arena.alloc(inst);
        local.bind(inst.name_arc(), Arc::clone(&inst));
        lone_child = if subinstructions.is_empty() {
            Some(child)
        } else {
            None
        };
        subinstructions.push(inst);
    }

    let length = match length {
        Some(length) => length,
        None => ctx.arena.alloc(FieldInstruction::default_sequence_length()),
    };

    let mut element_ref = None;
    let mut flattened = None;
    if subinstructions.len() == 1
        && let Some(child) = lone_child
        && !is_builtin_name(child.name())
    {
        let only = &subinstructions[0];
        match &only.body {
            InstructionBody::Group(group) => {
                element_ref = Some(Arc::clone(only));
                flattened = Some(group.subinstructions.clone());
            }
            InstructionBody::Template(template) => {
                element_ref = Some(Arc::clone(only));
                flattened = Some(template.subinstructions.clone());
            }
            _ => {}
        }
    }
    if let Some(flattened) = flattened {
        subinstructions = flattened;
    }

    Ok(SequencePayload {
        length,
        element: element_ref,
        subinstructions,
    })
}

/// Builds an explicit `<length>` declaration of a sequence.
fn build_length(
    ctx: &mut FieldContext<'_>,
    element: &Element,
) -> Result<FieldInstruction, CompileError> {
    let mut inst = FieldInstruction::default_sequence_length();
    if let Some(name) = element.attr("name") {
        inst.name = ctx.arena.intern(name);
    }
    if let Some(id) = element.attr("id") {
        inst.id = id
            .parse()
            .map_err(|_| CompileError::invalid_attr(element.name(), "id", id))?;
    }
    if let Some(ns) = element.attr("ns") {
        inst.ns = ctx.arena.intern(ns);
    }
    apply_operator(element, &mut inst)?;
    Ok(inst)
}

/// Builds a template payload, recording the reference indirection
/// when the whole body is a single named `templateRef`.
fn build_template(
    ctx: &mut FieldContext<'_>,
    scope: &Scope<'_>,
    element: &Element,
) -> Result<TemplatePayload, CompileError> {
    let subinstructions = build_children(ctx, scope, element.children())?;

    let field_children: Vec<&Element> = element
        .children()
        .iter()
        .filter(|c| is_field_element(c))
        .collect();
    let reference = (field_children.len() == 1
        && field_children[0].name() == "templateRef")
        .then(|| Arc::clone(&subinstructions[0]));

    Ok(TemplatePayload {
        subinstructions,
        reference,
    })
}

/// Builds a static template reference: the target is resolved now and
/// embedded as a shared handle.
fn build_template_ref(
    ctx: &mut FieldContext<'_>,
    scope: &Scope<'_>,
    element: &Element,
    name_override: Option<&str>,
) -> Result<FieldInstruction, CompileError> {
    let target = element
        .attr("name")
        .ok_or_else(|| CompileError::missing_attr(element.name(), "name"))?;

    let ns = element.attr_or("ns", &ctx.resolved_ns);
    let found = scope
        .lookup(target)
        .cloned()
        .or_else(|| ctx.registry.lookup(ns, target))
        .ok_or_else(|| CompileError::unknown_type(target, target))?;

    let mut inst = (*found).clone();
    if let Some(name) = name_override {
        inst.name = ctx.arena.intern(name);
    }
    Ok(inst)
}
