//! Schema-directed encoder.
//!
//! The [`Encoder`] writes into a caller-owned, fixed-capacity `&mut [u8]`
//! starting at a given offset and reports the offset just past the bytes it
//! wrote, so calls can be chained without precomputing a total size.
//!
//! ## Wire format summary
//! - Integers and floats: declared width, in the configured byte order
//! - Bool: 1 byte, 0 or 1
//! - String: 8-byte length + UTF-8 bytes, no padding
//! - Struct / Tuple / Array: element encodings back to back, no prefix
//! - Collection: 8-byte element count + elements
//! - Enum: 4-byte discriminant + payload

use crate::config::{Config, Endian};
use crate::error::{Error, Result};
use crate::schema::{DISCRIMINANT_SIZE, LEN_PREFIX_SIZE, Primitive, Schema};
use crate::value::Value;

// ── Public entry points ────────────────────────────────────────────────────

/// Encode `value` as described by `schema` into `buf`, starting at `offset`.
///
/// Returns the offset immediately after the last byte written. The value is
/// checked against the schema in full before anything is written, so shape
/// errors never leave partial output behind.
///
/// ```rust
/// use schema_codec::{Config, Schema, Value, encode};
///
/// let mut buf = [0u8; 8];
/// let end = encode(&Schema::u32(), &Value::U32(0x01020304), &mut buf, 2, Config::standard()).unwrap();
/// assert_eq!(end, 6);
/// assert_eq!(&buf[2..6], [4, 3, 2, 1]);
/// ```
pub fn encode(
    schema: &Schema,
    value: &Value,
    buf: &mut [u8],
    offset: usize,
    config: Config,
) -> Result<usize> {
    tracing::trace!(kind = schema.kind_name(), offset, "encoding value");
    config.check_supported()?;
    schema.validate(value)?;
    let mut encoder = Encoder::new(buf, offset, config)?;
    encoder.encode(schema, value)?;
    Ok(encoder.position())
}

/// Encode `value` into a freshly allocated buffer of exactly the right size.
pub fn to_bytes(schema: &Schema, value: &Value, config: Config) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; encoded_size(schema, value, config)?];
    encode(schema, value, &mut buf, 0, config)?;
    Ok(buf)
}

/// The number of bytes `value` occupies when encoded with `schema`.
pub fn encoded_size(schema: &Schema, value: &Value, config: Config) -> Result<usize> {
    config.check_supported()?;
    schema.validate(value)?;
    Ok(size_of(schema, value))
}

// Assumes `value` has already been validated against `schema`.
fn size_of(schema: &Schema, value: &Value) -> usize {
    match (schema, value) {
        (Schema::Primitive(Primitive::String), Value::String(s)) => LEN_PREFIX_SIZE + s.len(),
        (Schema::Primitive(p), _) => p.width().unwrap_or(0),
        (Schema::Struct(s), Value::Struct(fields)) => s
            .fields()
            .iter()
            .filter_map(|(name, field)| fields.get(name).map(|v| size_of(field, v)))
            .sum(),
        (Schema::Tuple(elements), Value::Seq(items)) => elements
            .iter()
            .zip(items)
            .map(|(s, v)| size_of(s, v))
            .sum(),
        (Schema::Array { element, .. }, Value::Seq(items)) => {
            items.iter().map(|v| size_of(element, v)).sum()
        }
        (Schema::Collection(element), Value::Seq(items)) => {
            LEN_PREFIX_SIZE + items.iter().map(|v| size_of(element, v)).sum::<usize>()
        }
        (Schema::Enum(e), Value::Enum { variant, payload }) => {
            DISCRIMINANT_SIZE
                + e.variant(variant)
                    .map_or(0, |v| size_of(&v.payload, payload))
        }
        _ => 0,
    }
}

// ── Encoder ────────────────────────────────────────────────────────────────

/// A write cursor over a fixed-capacity byte buffer.
///
/// Most callers want [`encode`]; the encoder itself is useful for writing
/// several values back to back under one byte limit:
///
/// ```rust
/// use schema_codec::{Config, Schema, Value};
/// use schema_codec::ser::Encoder;
///
/// let mut buf = [0u8; 3];
/// let mut enc = Encoder::new(&mut buf, 0, Config::standard()).unwrap();
/// enc.encode(&Schema::u8(), &Value::U8(1)).unwrap();
/// enc.encode(&Schema::u16(), &Value::U16(2)).unwrap();
/// assert_eq!(enc.position(), 3);
/// assert_eq!(buf, [1, 2, 0]);
/// ```
pub struct Encoder<'a> {
    buf: &'a mut [u8],
    start: usize,
    pos: usize,
    config: Config,
}

macro_rules! impl_write {
    ($($name:ident: $t:ty),* $(,)?) => {
        $(
            fn $name(&mut self, v: $t) -> Result<()> {
                match self.config.endian {
                    Endian::Little => self.write_all(&v.to_le_bytes()),
                    Endian::Big => self.write_all(&v.to_be_bytes()),
                }
            }
        )*
    };
}

impl<'a> Encoder<'a> {
    /// Create an encoder that writes into `buf` from `offset` onwards.
    pub fn new(buf: &'a mut [u8], offset: usize, config: Config) -> Result<Self> {
        config.check_supported()?;
        if offset > buf.len() {
            return Err(Error::BufferOverflow {
                needed: offset,
                available: buf.len(),
            });
        }
        Ok(Encoder {
            buf,
            start: offset,
            pos: offset,
            config,
        })
    }

    /// Offset of the next byte to be written.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes written since the encoder was created.
    pub fn written(&self) -> usize {
        self.pos - self.start
    }

    // ── Internal helpers ───────────────────────────────────────────────────

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.config.check_limit(self.written().saturating_add(bytes.len()))?;
        let available = self.buf.len() - self.pos;
        if bytes.len() > available {
            return Err(Error::BufferOverflow {
                needed: bytes.len(),
                available,
            });
        }
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    impl_write! {
        write_u8: u8,
        write_u16: u16,
        write_u32: u32,
        write_u64: u64,
        write_i8: i8,
        write_i16: i16,
        write_i32: i32,
        write_i64: i64,
        write_f32: f32,
        write_f64: f64,
    }

    /// Length prefix for strings and collections: always 8 bytes.
    fn write_len(&mut self, len: usize) -> Result<()> {
        self.write_u64(len as u64)
    }

    // ── Dispatch ───────────────────────────────────────────────────────────

    /// Encode one value at the current position.
    ///
    /// Unlike [`encode`], this does not validate the whole value up front: a
    /// mismatch deep inside a nested value is reported when it is reached,
    /// after the bytes before it have been written.
    pub fn encode(&mut self, schema: &Schema, value: &Value) -> Result<()> {
        match (schema, value) {
            (Schema::Unit, Value::Unit) => Ok(()),
            (Schema::Primitive(p), v) => self.encode_primitive(*p, v),
            (Schema::Struct(s), Value::Struct(fields)) => {
                if fields.len() != s.len() {
                    return Err(Error::mismatch(schema.to_string(), value.describe()));
                }
                for (name, field) in s.fields() {
                    let v = fields.get(name).ok_or_else(|| {
                        Error::mismatch(format!("field {:?}", name), value.describe())
                    })?;
                    self.encode(field, v)?;
                }
                Ok(())
            }
            (Schema::Tuple(elements), Value::Seq(items)) => {
                if elements.len() != items.len() {
                    return Err(Error::mismatch(schema.to_string(), value.describe()));
                }
                for (element, item) in elements.iter().zip(items) {
                    self.encode(element, item)?;
                }
                Ok(())
            }
            (Schema::Array { element, size }, Value::Seq(items)) => {
                if items.len() != *size {
                    return Err(Error::mismatch(schema.to_string(), value.describe()));
                }
                for item in items {
                    self.encode(element, item)?;
                }
                Ok(())
            }
            (Schema::Collection(element), Value::Seq(items)) => {
                self.write_len(items.len())?;
                for item in items {
                    self.encode(element, item)?;
                }
                Ok(())
            }
            (Schema::Enum(e), Value::Enum { variant, payload }) => {
                let v = e.variant(variant).ok_or_else(|| {
                    Error::mismatch(format!("a variant of {}", schema), format!("{:?}", variant))
                })?;
                self.write_u32(v.discriminant)?;
                self.encode(&v.payload, payload)
            }
            _ => Err(Error::mismatch(schema.to_string(), value.describe())),
        }
    }

    fn encode_primitive(&mut self, primitive: Primitive, value: &Value) -> Result<()> {
        primitive.ensure_supported()?;
        match (primitive, value) {
            (Primitive::U8, Value::U8(v)) => self.write_u8(*v),
            (Primitive::U16, Value::U16(v)) => self.write_u16(*v),
            (Primitive::U32, Value::U32(v)) => self.write_u32(*v),
            (Primitive::U64, Value::U64(v)) => self.write_u64(*v),
            (Primitive::I8, Value::I8(v)) => self.write_i8(*v),
            (Primitive::I16, Value::I16(v)) => self.write_i16(*v),
            (Primitive::I32, Value::I32(v)) => self.write_i32(*v),
            (Primitive::I64, Value::I64(v)) => self.write_i64(*v),
            (Primitive::F32, Value::F32(v)) => self.write_f32(*v),
            (Primitive::F64, Value::F64(v)) => self.write_f64(*v),
            (Primitive::Bool, Value::Bool(v)) => self.write_u8(u8::from(*v)),
            (Primitive::String, Value::String(s)) => {
                self.write_len(s.len())?;
                self.write_all(s.as_bytes())
            }
            (p, v) => Err(Error::mismatch(p.name(), v.describe())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_past_end() {
        let mut buf = [0u8; 2];
        let err = encode(&Schema::unit(), &Value::Unit, &mut buf, 3, Config::standard());
        assert_eq!(
            err,
            Err(Error::BufferOverflow {
                needed: 3,
                available: 2
            })
        );
    }

    #[test]
    fn test_overflow_leaves_bytes_past_end_untouched() {
        let mut buf = [0xAAu8; 4];
        let err = encode(
            &Schema::u32(),
            &Value::U32(7),
            &mut buf[..3],
            0,
            Config::standard(),
        );
        assert!(matches!(err, Err(Error::BufferOverflow { needed: 4, available: 3 })));
        assert_eq!(buf[3], 0xAA);
    }

    #[test]
    fn test_encoder_reports_nested_mismatch() {
        let schema = Schema::tuple([Schema::u8(), Schema::u8()]);
        let mut buf = [0u8; 4];
        let mut enc = Encoder::new(&mut buf, 0, Config::standard()).unwrap();
        let err = enc.encode(&schema, &Value::seq([Value::U8(1), Value::U16(2)]));
        assert!(matches!(err, Err(Error::ShapeMismatch { .. })));
        assert_eq!(enc.position(), 1);
    }

    #[test]
    fn test_encoded_size_matches_output() {
        let schema = Schema::structure([
            ("name", Schema::string()),
            ("scores", Schema::collection(Schema::u16())),
        ])
        .unwrap();
        let value = Value::structure([
            ("name", Value::from("ada")),
            ("scores", Value::from(vec![1u16, 2, 3])),
        ]);
        let size = encoded_size(&schema, &value, Config::standard()).unwrap();
        assert_eq!(size, 8 + 3 + 8 + 6);
        assert_eq!(to_bytes(&schema, &value, Config::standard()).unwrap().len(), size);
    }
}
