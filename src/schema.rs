//! Type schemas.
//!
//! A [`Schema`] describes the shape of a value and, together with a
//! [`Config`](crate::Config), fully determines its wire layout. Schemas are
//! immutable once built and hold no layout configuration, so a single schema
//! can be shared by any number of concurrent encode/decode calls.
//!
//! ```rust
//! use schema_codec::{Schema, Variant};
//!
//! let point = Schema::structure([("x", Schema::i32()), ("y", Schema::i32())]).unwrap();
//! let shape = Schema::enumeration([
//!     ("Empty", Variant::unit(0)),
//!     ("Points", Variant::new(5, Schema::tuple([Schema::collection(point)]))),
//! ])
//! .unwrap();
//! assert_eq!(shape.kind_name(), "enum");
//! ```

use crate::error::{ConstructionError, Error, Result};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Width of the length prefix written before strings and collections.
pub(crate) const LEN_PREFIX_SIZE: usize = 8;

/// Width of an enum discriminant on the wire.
pub(crate) const DISCRIMINANT_SIZE: usize = 4;

/// Scalar types with a built-in wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
    F16,
    F32,
    F64,
    F128,
    Bool,
    String,
}

impl Primitive {
    /// Encoded width in bytes, or `None` for the variable-length `String`.
    pub const fn width(self) -> Option<usize> {
        match self {
            Primitive::U8 | Primitive::I8 | Primitive::Bool => Some(1),
            Primitive::U16 | Primitive::I16 | Primitive::F16 => Some(2),
            Primitive::U32 | Primitive::I32 | Primitive::F32 => Some(4),
            Primitive::U64 | Primitive::I64 | Primitive::F64 => Some(8),
            Primitive::U128 | Primitive::I128 | Primitive::F128 => Some(16),
            Primitive::String => None,
        }
    }

    /// Whether the codec can encode and decode this primitive.
    pub const fn is_supported(self) -> bool {
        !matches!(
            self,
            Primitive::U128 | Primitive::I128 | Primitive::F16 | Primitive::F128
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::U128 => "u128",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::I128 => "i128",
            Primitive::F16 => "f16",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::F128 => "f128",
            Primitive::Bool => "bool",
            Primitive::String => "String",
        }
    }

    pub(crate) fn ensure_supported(self) -> Result<()> {
        if self.is_supported() {
            Ok(())
        } else {
            Err(Error::Unsupported(self.name()))
        }
    }
}

/// A schema node. One variant per kind; the codec dispatches on it by
/// exhaustive matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    Unit,
    Primitive(Primitive),
    Struct(StructSchema),
    Tuple(Vec<Schema>),
    Array { element: Box<Schema>, size: usize },
    Collection(Box<Schema>),
    Enum(EnumSchema),
}

macro_rules! primitive_constructors {
    ($($fn_name:ident => $prim:ident),* $(,)?) => {
        $(
            #[doc = concat!("Shorthand for `Schema::primitive(Primitive::", stringify!($prim), ")`.")]
            pub const fn $fn_name() -> Schema {
                Schema::Primitive(Primitive::$prim)
            }
        )*
    };
}

impl Schema {
    pub const fn unit() -> Schema {
        Schema::Unit
    }

    pub const fn primitive(primitive: Primitive) -> Schema {
        Schema::Primitive(primitive)
    }

    primitive_constructors! {
        u8 => U8,
        u16 => U16,
        u32 => U32,
        u64 => U64,
        i8 => I8,
        i16 => I16,
        i32 => I32,
        i64 => I64,
        f32 => F32,
        f64 => F64,
        bool => Bool,
        string => String,
    }

    /// Builds a struct schema. Fields keep the given order, which is also
    /// their wire order.
    pub fn structure<I, S>(fields: I) -> Result<Schema>
    where
        I: IntoIterator<Item = (S, Schema)>,
        S: Into<String>,
    {
        let fields = fields.into_iter().map(|(n, s)| (n.into(), s)).collect();
        Ok(Schema::Struct(StructSchema::new(fields)?))
    }

    pub fn tuple(elements: impl IntoIterator<Item = Schema>) -> Schema {
        Schema::Tuple(elements.into_iter().collect())
    }

    /// Builds a fixed-size array schema. Fails if `size` is negative or does
    /// not fit in `usize`.
    pub fn array<N>(element: Schema, size: N) -> Result<Schema>
    where
        N: TryInto<usize> + fmt::Display,
    {
        let shown = size.to_string();
        let size = size
            .try_into()
            .map_err(|_| ConstructionError::InvalidArraySize(shown))?;
        Ok(Schema::Array {
            element: Box::new(element),
            size,
        })
    }

    pub fn collection(element: Schema) -> Schema {
        Schema::Collection(Box::new(element))
    }

    /// Builds an enum schema from `(name, variant)` pairs.
    pub fn enumeration<I, S>(variants: I) -> Result<Schema>
    where
        I: IntoIterator<Item = (S, Variant)>,
        S: Into<String>,
    {
        let variants = variants.into_iter().map(|(n, v)| (n.into(), v)).collect();
        Ok(Schema::Enum(EnumSchema::new(variants)?))
    }

    /// Short name of this schema's kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Schema::Unit => "unit",
            Schema::Primitive(p) => p.name(),
            Schema::Struct(_) => "struct",
            Schema::Tuple(_) => "tuple",
            Schema::Array { .. } => "array",
            Schema::Collection(_) => "collection",
            Schema::Enum(_) => "enum",
        }
    }

    /// The encoded size shared by every value of this schema, if there is one.
    ///
    /// `None` for strings, collections, unsupported primitives, enums whose
    /// payloads differ in size, and sizes that overflow `usize`.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Schema::Unit => Some(0),
            Schema::Primitive(p) if p.is_supported() => p.width(),
            Schema::Primitive(_) => None,
            Schema::Struct(s) => s
                .fields
                .iter()
                .try_fold(0usize, |acc, (_, f)| acc.checked_add(f.fixed_size()?)),
            Schema::Tuple(elements) => elements
                .iter()
                .try_fold(0usize, |acc, e| acc.checked_add(e.fixed_size()?)),
            Schema::Array { element, size } => element.fixed_size()?.checked_mul(*size),
            Schema::Collection(_) => None,
            Schema::Enum(e) => {
                let mut sizes = e.variants.iter().map(|(_, v)| v.payload.fixed_size());
                let first = sizes.next()??;
                for size in sizes {
                    if size? != first {
                        return None;
                    }
                }
                first.checked_add(DISCRIMINANT_SIZE)
            }
        }
    }

    /// The smallest number of bytes any value of this schema can encode to.
    pub(crate) fn min_size(&self) -> usize {
        match self {
            Schema::Unit => 0,
            Schema::Primitive(p) => p.width().unwrap_or(LEN_PREFIX_SIZE),
            Schema::Struct(s) => s
                .fields
                .iter()
                .fold(0, |acc, (_, f)| acc.saturating_add(f.min_size())),
            Schema::Tuple(elements) => elements
                .iter()
                .fold(0, |acc, e| acc.saturating_add(e.min_size())),
            Schema::Array { element, size } => element.min_size().saturating_mul(*size),
            Schema::Collection(_) => LEN_PREFIX_SIZE,
            Schema::Enum(e) => {
                let payload = e
                    .variants
                    .iter()
                    .map(|(_, v)| v.payload.min_size())
                    .min()
                    .unwrap_or(0);
                payload.saturating_add(DISCRIMINANT_SIZE)
            }
        }
    }

    /// Checks that `value` conforms to this schema, without encoding it.
    ///
    /// Fails with [`Error::Unsupported`] for unimplemented primitives and with
    /// [`Error::ShapeMismatch`] for any structural disagreement.
    pub fn validate(&self, value: &Value) -> Result<()> {
        match (self, value) {
            (Schema::Unit, Value::Unit) => Ok(()),
            (Schema::Primitive(p), v) => {
                p.ensure_supported()?;
                if v.primitive() == Some(*p) {
                    Ok(())
                } else {
                    Err(Error::mismatch(p.name(), v.describe()))
                }
            }
            (Schema::Struct(s), Value::Struct(fields)) => {
                if fields.len() != s.fields.len() {
                    return Err(Error::mismatch(self.to_string(), value.describe()));
                }
                for (name, field) in &s.fields {
                    let v = fields.get(name).ok_or_else(|| {
                        Error::mismatch(format!("field {:?}", name), value.describe())
                    })?;
                    field.validate(v)?;
                }
                Ok(())
            }
            (Schema::Tuple(elements), Value::Seq(items)) => {
                if elements.len() != items.len() {
                    return Err(Error::mismatch(self.to_string(), value.describe()));
                }
                elements
                    .iter()
                    .zip(items)
                    .try_for_each(|(s, v)| s.validate(v))
            }
            (Schema::Array { element, size }, Value::Seq(items)) => {
                if items.len() != *size {
                    return Err(Error::mismatch(self.to_string(), value.describe()));
                }
                items.iter().try_for_each(|v| element.validate(v))
            }
            (Schema::Collection(element), Value::Seq(items)) => {
                items.iter().try_for_each(|v| element.validate(v))
            }
            (Schema::Enum(e), Value::Enum { variant, payload }) => {
                let v = e.variant(variant).ok_or_else(|| {
                    Error::mismatch(format!("a variant of {}", self), format!("{:?}", variant))
                })?;
                v.payload.validate(payload)
            }
            _ => Err(Error::mismatch(self.to_string(), value.describe())),
        }
    }
}

impl From<Primitive> for Schema {
    fn from(p: Primitive) -> Self {
        Schema::Primitive(p)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Unit => write!(f, "()"),
            Schema::Primitive(p) => write!(f, "{}", p.name()),
            Schema::Struct(s) => {
                write!(f, "{{")?;
                for (i, (name, field)) in s.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, field)?;
                }
                write!(f, "}}")
            }
            Schema::Tuple(elements) => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                if elements.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Schema::Array { element, size } => write!(f, "[{}; {}]", element, size),
            Schema::Collection(element) => write!(f, "Vec<{}>", element),
            Schema::Enum(e) => {
                write!(f, "enum {{")?;
                for (i, (name, variant)) in e.variants.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", name, variant.discriminant)?;
                    if variant.payload != Schema::Unit {
                        write!(f, " {}", variant.payload)?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

// ── Struct ──────────────────────────────────────────────────────────────────

/// Ordered, uniquely named fields of a struct schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<(String, Schema)>",
    into = "Vec<(String, Schema)>"
)]
pub struct StructSchema {
    fields: Vec<(String, Schema)>,
}

impl StructSchema {
    pub fn new(fields: Vec<(String, Schema)>) -> std::result::Result<Self, ConstructionError> {
        let mut seen = HashSet::with_capacity(fields.len());
        for (name, _) in &fields {
            if !seen.insert(name.as_str()) {
                return Err(ConstructionError::DuplicateField(name.clone()));
            }
        }
        Ok(StructSchema { fields })
    }

    /// Fields in wire order.
    pub fn fields(&self) -> &[(String, Schema)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Schema> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<(String, Schema)>> for StructSchema {
    type Error = ConstructionError;

    fn try_from(fields: Vec<(String, Schema)>) -> std::result::Result<Self, Self::Error> {
        StructSchema::new(fields)
    }
}

impl From<StructSchema> for Vec<(String, Schema)> {
    fn from(s: StructSchema) -> Self {
        s.fields
    }
}

// ── Enum ────────────────────────────────────────────────────────────────────

/// One arm of an enum schema: its discriminant and payload shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub discriminant: u32,
    pub payload: Schema,
}

impl Variant {
    /// A variant with a payload. The payload must be a unit, tuple or struct
    /// schema; this is checked when the enum is built.
    pub fn new(discriminant: u32, payload: Schema) -> Self {
        Variant {
            discriminant,
            payload,
        }
    }

    /// A variant carrying no data.
    pub fn unit(discriminant: u32) -> Self {
        Variant::new(discriminant, Schema::Unit)
    }
}

/// Named variants of an enum schema, with the discriminant index used by the
/// decoder built once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<(String, Variant)>", into = "Vec<(String, Variant)>")]
pub struct EnumSchema {
    variants: Vec<(String, Variant)>,
    by_discriminant: HashMap<u32, usize>,
}

impl EnumSchema {
    pub fn new(variants: Vec<(String, Variant)>) -> std::result::Result<Self, ConstructionError> {
        let mut names = HashSet::with_capacity(variants.len());
        let mut by_discriminant = HashMap::with_capacity(variants.len());
        for (index, (name, variant)) in variants.iter().enumerate() {
            if !names.insert(name.as_str()) {
                return Err(ConstructionError::DuplicateVariant(name.clone()));
            }
            if !matches!(
                variant.payload,
                Schema::Unit | Schema::Tuple(_) | Schema::Struct(_)
            ) {
                return Err(ConstructionError::InvalidPayload {
                    variant: name.clone(),
                });
            }
            if let Some(&first) = by_discriminant.get(&variant.discriminant) {
                let first: &(String, Variant) = &variants[first];
                return Err(ConstructionError::DuplicateDiscriminant {
                    discriminant: variant.discriminant,
                    first: first.0.clone(),
                    second: name.clone(),
                });
            }
            by_discriminant.insert(variant.discriminant, index);
        }
        Ok(EnumSchema {
            variants,
            by_discriminant,
        })
    }

    /// Variants in declaration order.
    pub fn variants(&self) -> &[(String, Variant)] {
        &self.variants
    }

    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Reverse lookup from a wire discriminant to the variant it selects.
    pub fn by_discriminant(&self, discriminant: u32) -> Option<(&str, &Variant)> {
        self.by_discriminant
            .get(&discriminant)
            .map(|&i| (self.variants[i].0.as_str(), &self.variants[i].1))
    }
}

// The discriminant index is derived from `variants`.
impl PartialEq for EnumSchema {
    fn eq(&self, other: &Self) -> bool {
        self.variants == other.variants
    }
}

impl TryFrom<Vec<(String, Variant)>> for EnumSchema {
    type Error = ConstructionError;

    fn try_from(variants: Vec<(String, Variant)>) -> std::result::Result<Self, Self::Error> {
        EnumSchema::new(variants)
    }
}

impl From<EnumSchema> for Vec<(String, Variant)> {
    fn from(e: EnumSchema) -> Self {
        e.variants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_keeps_declared_order() {
        let schema =
            Schema::structure([("zeta", Schema::u8()), ("alpha", Schema::u16())]).unwrap();
        let Schema::Struct(s) = schema else {
            panic!("expected struct schema");
        };
        let names: Vec<_> = s.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = Schema::structure([("a", Schema::u8()), ("a", Schema::u16())]).unwrap_err();
        assert_eq!(
            err,
            Error::Construction(ConstructionError::DuplicateField("a".into()))
        );
    }

    #[test]
    fn test_duplicate_discriminant_rejected() {
        let err = Schema::enumeration([("A", Variant::unit(1)), ("B", Variant::unit(1))])
            .unwrap_err();
        assert_eq!(
            err,
            Error::Construction(ConstructionError::DuplicateDiscriminant {
                discriminant: 1,
                first: "A".into(),
                second: "B".into(),
            })
        );
    }

    #[test]
    fn test_duplicate_variant_rejected() {
        let err = Schema::enumeration([("A", Variant::unit(0)), ("A", Variant::unit(1))])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Construction(ConstructionError::DuplicateVariant(_))
        ));
    }

    #[test]
    fn test_primitive_payload_rejected() {
        let err = Schema::enumeration([("A", Variant::new(0, Schema::u8()))]).unwrap_err();
        assert!(matches!(
            err,
            Error::Construction(ConstructionError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_negative_array_size_rejected() {
        let err = Schema::array(Schema::u8(), -1).unwrap_err();
        assert_eq!(
            err,
            Error::Construction(ConstructionError::InvalidArraySize("-1".into()))
        );
        assert!(Schema::array(Schema::u8(), 0).is_ok());
    }

    #[test]
    fn test_reverse_index() {
        let Schema::Enum(e) =
            Schema::enumeration([("Zero", Variant::unit(0)), ("Five", Variant::unit(5))]).unwrap()
        else {
            panic!("expected enum schema");
        };
        assert_eq!(e.by_discriminant(5).map(|(n, _)| n), Some("Five"));
        assert_eq!(e.by_discriminant(0).map(|(n, _)| n), Some("Zero"));
        assert!(e.by_discriminant(3).is_none());
    }

    #[test]
    fn test_fixed_size() {
        let point = Schema::structure([("x", Schema::i32()), ("y", Schema::i32())]).unwrap();
        assert_eq!(point.fixed_size(), Some(8));
        assert_eq!(Schema::array(point, 3).unwrap().fixed_size(), Some(24));
        assert_eq!(Schema::string().fixed_size(), None);
        assert_eq!(Schema::primitive(Primitive::U128).fixed_size(), None);

        let same = Schema::enumeration([
            ("A", Variant::new(0, Schema::tuple([Schema::u16()]))),
            ("B", Variant::new(1, Schema::tuple([Schema::u8(), Schema::u8()]))),
        ])
        .unwrap();
        assert_eq!(same.fixed_size(), Some(6));

        let differ = Schema::enumeration([
            ("A", Variant::unit(0)),
            ("B", Variant::new(1, Schema::tuple([Schema::u8()]))),
        ])
        .unwrap();
        assert_eq!(differ.fixed_size(), None);
    }

    #[test]
    fn test_fixed_size_overflow_is_none() {
        let huge = Schema::array(Schema::u8(), usize::MAX).unwrap();
        let pair = Schema::tuple([huge.clone(), huge.clone()]);
        assert_eq!(pair.fixed_size(), None);

        let record = Schema::structure([("a", huge), ("b", Schema::u8())]).unwrap();
        assert_eq!(record.fixed_size(), None);
    }

    #[test]
    fn test_min_size_saturates() {
        let huge = Schema::array(Schema::u8(), usize::MAX).unwrap();
        let record = Schema::structure([("a", huge.clone()), ("b", Schema::u8())]).unwrap();
        assert_eq!(record.min_size(), usize::MAX);
        assert_eq!(Schema::tuple([huge.clone(), huge]).min_size(), usize::MAX);

        let tagged = Schema::enumeration([("Big", Variant::new(0, record))]).unwrap();
        assert_eq!(tagged.min_size(), usize::MAX);
    }

    #[test]
    fn test_display() {
        let schema = Schema::structure([
            ("name", Schema::string()),
            ("tags", Schema::collection(Schema::u8())),
            ("pair", Schema::tuple([Schema::u8()])),
        ])
        .unwrap();
        assert_eq!(schema.to_string(), "{name: String, tags: Vec<u8>, pair: (u8,)}");
    }

    #[test]
    fn test_serde_rebuilds_index() {
        let schema = Schema::enumeration([
            ("Off", Variant::unit(0)),
            (
                "On",
                Variant::new(
                    5,
                    Schema::structure([("level", Schema::u8())]).unwrap(),
                ),
            ),
        ])
        .unwrap();
        let json = serde_json::to_string(&schema).unwrap();
        let back: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(schema, back);
        let Schema::Enum(e) = back else {
            panic!("expected enum schema");
        };
        assert_eq!(e.by_discriminant(5).map(|(n, _)| n), Some("On"));
    }

    #[test]
    fn test_serde_rejects_invalid_enum() {
        let json = r#"{"enum":[["A",{"discriminant":1,"payload":"unit"}],["B",{"discriminant":1,"payload":"unit"}]]}"#;
        assert!(serde_json::from_str::<Schema>(json).is_err());
    }
}
