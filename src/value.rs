use crate::schema::Primitive;
use std::collections::BTreeMap;

/// A dynamically typed value, checked against a [`Schema`](crate::Schema)
/// when it is encoded.
///
/// Tuples, arrays and collections all use [`Value::Seq`]; which one a
/// sequence is depends only on the schema it is encoded with. A one-element
/// tuple is still a one-element `Seq`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No content.
    Unit,

    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    String(String),

    /// Struct fields keyed by name. Wire order comes from the schema.
    Struct(BTreeMap<String, Value>),

    /// Ordered elements of a tuple, array or collection.
    Seq(Vec<Value>),

    /// The matched variant of an enum and its payload.
    Enum {
        variant: String,
        payload: Box<Value>,
    },
}

impl Value {
    /// Builds a struct value from `(name, value)` pairs.
    pub fn structure<I, S>(fields: I) -> Value
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Value::Struct(fields.into_iter().map(|(n, v)| (n.into(), v)).collect())
    }

    pub fn seq(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Seq(items.into_iter().collect())
    }

    /// An enum value with no payload.
    pub fn unit_variant(variant: impl Into<String>) -> Value {
        Value::variant(variant, Value::Unit)
    }

    pub fn variant(variant: impl Into<String>, payload: Value) -> Value {
        Value::Enum {
            variant: variant.into(),
            payload: Box::new(payload),
        }
    }

    /// The primitive this value would encode as, if it is a scalar.
    pub fn primitive(&self) -> Option<Primitive> {
        Some(match self {
            Value::U8(_) => Primitive::U8,
            Value::U16(_) => Primitive::U16,
            Value::U32(_) => Primitive::U32,
            Value::U64(_) => Primitive::U64,
            Value::I8(_) => Primitive::I8,
            Value::I16(_) => Primitive::I16,
            Value::I32(_) => Primitive::I32,
            Value::I64(_) => Primitive::I64,
            Value::F32(_) => Primitive::F32,
            Value::F64(_) => Primitive::F64,
            Value::Bool(_) => Primitive::Bool,
            Value::String(_) => Primitive::String,
            Value::Unit | Value::Struct(_) | Value::Seq(_) | Value::Enum { .. } => return None,
        })
    }

    /// Short description used in shape mismatch errors.
    pub(crate) fn describe(&self) -> String {
        match self {
            Value::Unit => "()".to_string(),
            Value::Struct(fields) => {
                let names: Vec<&str> = fields.keys().map(String::as_str).collect();
                format!("struct with fields {:?}", names)
            }
            Value::Seq(items) => format!("sequence of {} elements", items.len()),
            Value::Enum { variant, .. } => format!("variant {:?}", variant),
            scalar => scalar
                .primitive()
                .map(Primitive::name)
                .unwrap_or("value")
                .to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a struct field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.get(field),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
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
    String => String,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_ignores_insertion_order() {
        let a = Value::structure([("x", Value::U8(1)), ("y", Value::U8(2))]);
        let b = Value::structure([("y", Value::U8(2)), ("x", Value::U8(1))]);
        assert_eq!(a, b);
        assert_eq!(a.get("y"), Some(&Value::U8(2)));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(7u8), Value::U8(7));
        assert_eq!(Value::from("hi"), Value::String("hi".into()));
        assert_eq!(
            Value::from(vec![1u32, 2]),
            Value::Seq(vec![Value::U32(1), Value::U32(2)])
        );
        assert_eq!(Value::from(u64::MAX).primitive(), Some(Primitive::U64));
    }

    #[test]
    fn test_describe() {
        assert_eq!(Value::I16(3).describe(), "i16");
        assert_eq!(Value::seq([Value::Unit]).describe(), "sequence of 1 elements");
        assert_eq!(Value::unit_variant("On").describe(), "variant \"On\"");
    }
}
