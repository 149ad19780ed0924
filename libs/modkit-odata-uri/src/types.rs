//! Type references used as literal parsing targets and registry keys.
//!
//! A [`TypeRef`] is what the binder hands to a literal parser. Registries never
//! key on a `TypeRef` instance: they key on its [`TypeKey`], which compares the
//! full type name and nullability only.

use std::fmt;
use std::sync::Arc;

/// Primitive types of the `Edm` namespace understood by the built-in conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdmPrimitiveKind {
    Binary,
    Boolean,
    Byte,
    Date,
    DateTimeOffset,
    Decimal,
    Double,
    Duration,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    String,
    TimeOfDay,
}

impl EdmPrimitiveKind {
    pub const ALL: &'static [EdmPrimitiveKind] = &[
        EdmPrimitiveKind::Binary,
        EdmPrimitiveKind::Boolean,
        EdmPrimitiveKind::Byte,
        EdmPrimitiveKind::Date,
        EdmPrimitiveKind::DateTimeOffset,
        EdmPrimitiveKind::Decimal,
        EdmPrimitiveKind::Double,
        EdmPrimitiveKind::Duration,
        EdmPrimitiveKind::Guid,
        EdmPrimitiveKind::Int16,
        EdmPrimitiveKind::Int32,
        EdmPrimitiveKind::Int64,
        EdmPrimitiveKind::SByte,
        EdmPrimitiveKind::Single,
        EdmPrimitiveKind::String,
        EdmPrimitiveKind::TimeOfDay,
    ];

    /// Qualified name, e.g. `Edm.Int32`.
    #[must_use]
    pub fn full_name(self) -> &'static str {
        match self {
            EdmPrimitiveKind::Binary => "Edm.Binary",
            EdmPrimitiveKind::Boolean => "Edm.Boolean",
            EdmPrimitiveKind::Byte => "Edm.Byte",
            EdmPrimitiveKind::Date => "Edm.Date",
            EdmPrimitiveKind::DateTimeOffset => "Edm.DateTimeOffset",
            EdmPrimitiveKind::Decimal => "Edm.Decimal",
            EdmPrimitiveKind::Double => "Edm.Double",
            EdmPrimitiveKind::Duration => "Edm.Duration",
            EdmPrimitiveKind::Guid => "Edm.Guid",
            EdmPrimitiveKind::Int16 => "Edm.Int16",
            EdmPrimitiveKind::Int32 => "Edm.Int32",
            EdmPrimitiveKind::Int64 => "Edm.Int64",
            EdmPrimitiveKind::SByte => "Edm.SByte",
            EdmPrimitiveKind::Single => "Edm.Single",
            EdmPrimitiveKind::String => "Edm.String",
            EdmPrimitiveKind::TimeOfDay => "Edm.TimeOfDay",
        }
    }

    /// Resolve a qualified `Edm.*` name. Matching is exact, like `OData` type names.
    #[must_use]
    pub fn from_full_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.full_name() == name)
    }
}

impl fmt::Display for EdmPrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

/// Reference to a model type together with its nullability.
///
/// Cloning is cheap; the name is shared.
#[derive(Clone, Debug)]
pub struct TypeRef {
    full_name: Arc<str>,
    nullable: bool,
}

impl TypeRef {
    #[must_use]
    pub fn new(full_name: impl Into<Arc<str>>, nullable: bool) -> Self {
        Self {
            full_name: full_name.into(),
            nullable,
        }
    }

    #[must_use]
    pub fn primitive(kind: EdmPrimitiveKind, nullable: bool) -> Self {
        Self::new(kind.full_name(), nullable)
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The primitive kind when this references an `Edm.*` primitive.
    #[must_use]
    pub fn primitive_kind(&self) -> Option<EdmPrimitiveKind> {
        EdmPrimitiveKind::from_full_name(&self.full_name)
    }

    /// Structural key: full name plus nullability.
    #[must_use]
    pub fn key(&self) -> TypeKey {
        TypeKey {
            full_name: Arc::clone(&self.full_name),
            nullable: self.nullable,
        }
    }

    /// Structural equivalence, independent of instance identity.
    #[must_use]
    pub fn is_equivalent(&self, other: &TypeRef) -> bool {
        self.nullable == other.nullable && self.full_name == other.full_name
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{} (nullable)", self.full_name)
        } else {
            f.write_str(&self.full_name)
        }
    }
}

/// Hashable structural identity of a [`TypeRef`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeKey {
    full_name: Arc<str>,
    nullable: bool,
}

impl TypeKey {
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}

impl From<&TypeRef> for TypeKey {
    fn from(ty: &TypeRef) -> Self {
        ty.key()
    }
}
