//! Declarative extraction rules, one static descriptor per message kind.

use val_api::record::RecordKind;
use val_api::symbol::SymbolTable;

/// Key under which a schema's payload is nested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootKey {
    pub key: &'static str,
    /// Required roots fail extraction when absent; optional roots (list element
    /// wrappers such as `{"alert": {...}}`) are unwrapped only when present.
    pub required: bool,
}

/// List field whose elements are extracted one by one.
#[derive(Debug, Clone, Copy)]
pub struct RepeatedField {
    pub field: &'static str,
    pub element: &'static SchemaDescriptor,
}

/// Singular sub-record extracted recursively.
#[derive(Debug, Clone, Copy)]
pub struct NestedField {
    pub field: &'static str,
    pub descriptor: &'static SchemaDescriptor,
}

/// Re-nesting applied after extraction: the payload becomes `{key: payload}`
/// and the `carry` keys are copied from the top level beside it.
#[derive(Debug, Clone, Copy)]
pub struct Nesting {
    pub key: &'static str,
    pub carry: &'static [&'static str],
}

/// Static extraction rules for one message kind.
#[derive(Debug, Clone, Copy)]
pub struct SchemaDescriptor {
    pub name: &'static str,
    pub kind: RecordKind,
    pub root: Option<RootKey>,
    pub merge_keys: &'static [&'static str],
    pub enum_fields: &'static [(&'static str, &'static SymbolTable)],
    pub repeated_fields: &'static [RepeatedField],
    pub nested_fields: &'static [NestedField],
    pub nest: Option<Nesting>,
}

impl SchemaDescriptor {
    /// Descriptor with no rules: the whole tree populates `kind` directly.
    pub const fn flat(name: &'static str, kind: RecordKind) -> Self {
        Self {
            name,
            kind,
            root: None,
            merge_keys: &[],
            enum_fields: &[],
            repeated_fields: &[],
            nested_fields: &[],
            nest: None,
        }
    }
}
