//! Field description types

use serde::{Deserialize, Serialize};
use std::any::type_name;
use std::fmt;
use uuid::Uuid;

/// Annotation carried by a described field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTag {
    /// The field uniquely identifies the resource
    Identifier,
    /// The field may be used to filter List requests
    Filterable,
}

/// Value of a described field
#[derive(Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Uuid(&'a Uuid),
    /// A value of some other type, recorded by type name only
    Other(&'static str),
    /// An embedded record; `None` for an unset optional embedding
    Embedded(Option<&'a dyn Describe>),
}

impl<'a> FieldValue<'a> {
    /// Placeholder for a field of a type the resolver does not read
    pub fn other<T: ?Sized>() -> Self {
        Self::Other(type_name::<T>())
    }

    /// Name of the value's type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Uuid(_) => "uuid",
            Self::Other(name) => name,
            Self::Embedded(Some(inner)) => inner.type_name(),
            Self::Embedded(None) => "embedded record",
        }
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Uuid(u) => f.debug_tuple("Uuid").field(u).finish(),
            Self::Other(name) => f.debug_tuple("Other").field(name).finish(),
            Self::Embedded(inner) => f
                .debug_tuple("Embedded")
                .field(&inner.map(|i| i.type_name()))
                .finish(),
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a Option<String>> for FieldValue<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Self::Text(value.as_deref().unwrap_or_default())
    }
}

impl<'a> From<&'a Uuid> for FieldValue<'a> {
    fn from(value: &'a Uuid) -> Self {
        Self::Uuid(value)
    }
}

/// One described field
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub name: &'static str,
    pub tag: Option<FieldTag>,
    pub value: FieldValue<'a>,
}

/// The fields of one record, or an opaque marker for values that are not
/// records at all.
#[derive(Debug, Clone, Default)]
pub struct Fields<'a> {
    entries: Option<Vec<Field<'a>>>,
}

impl<'a> Fields<'a> {
    /// An empty record
    pub fn new() -> Self {
        Self {
            entries: Some(Vec::new()),
        }
    }

    /// Marker for values without fields
    pub fn opaque() -> Self {
        Self { entries: None }
    }

    pub fn is_opaque(&self) -> bool {
        self.entries.is_none()
    }

    fn push(mut self, name: &'static str, tag: Option<FieldTag>, value: FieldValue<'a>) -> Self {
        self.entries
            .get_or_insert_with(Vec::new)
            .push(Field { name, tag, value });
        self
    }

    /// Add the identifier field
    #[must_use]
    pub fn identifier(self, name: &'static str, value: impl Into<FieldValue<'a>>) -> Self {
        self.push(name, Some(FieldTag::Identifier), value.into())
    }

    /// Add a field usable as a List filter
    #[must_use]
    pub fn filterable(self, name: &'static str, value: impl Into<FieldValue<'a>>) -> Self {
        self.push(name, Some(FieldTag::Filterable), value.into())
    }

    /// Add an untagged field
    #[must_use]
    pub fn field(self, name: &'static str, value: impl Into<FieldValue<'a>>) -> Self {
        self.push(name, None, value.into())
    }

    /// Add a field with an explicit tag
    #[must_use]
    pub fn tagged(self, name: &'static str, tag: FieldTag, value: FieldValue<'a>) -> Self {
        self.push(name, Some(tag), value)
    }

    /// Embed another record; its fields are searched as if they were ours
    #[must_use]
    pub fn embed<T: Describe>(self, name: &'static str, inner: &'a T) -> Self {
        self.push(name, None, FieldValue::Embedded(Some(inner)))
    }

    /// Embed an optional record, e.g. `self.meta.as_deref()` for a boxed one
    #[must_use]
    pub fn embed_opt<T: Describe>(self, name: &'static str, inner: Option<&'a T>) -> Self {
        let inner = inner.map(|i| i as &dyn Describe);
        self.push(name, None, FieldValue::Embedded(inner))
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field<'a>> {
        self.entries.as_deref().unwrap_or_default().iter()
    }
}

impl<'a> IntoIterator for Fields<'a> {
    type Item = Field<'a>;
    type IntoIter = std::vec::IntoIter<Field<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.unwrap_or_default().into_iter()
    }
}

/// Exposes a value's fields to the identifier resolver.
///
/// The default implementation describes the value as opaque, which the
/// resolver rejects as an unsupported type.
pub trait Describe: Send + Sync {
    fn fields(&self) -> Fields<'_> {
        Fields::opaque()
    }

    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Resolved identifier value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Uuid(Uuid),
    Text(String),
}

impl Identifier {
    /// Empty text or the nil UUID
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Uuid(u) => u.is_nil(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Uuid> for Identifier {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}
