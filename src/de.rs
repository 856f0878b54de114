//! Schema-directed decoder.

use crate::config::{Config, Endian};
use crate::error::{Error, Result};
use crate::schema::{Primitive, Schema};
use crate::value::Value;
use std::collections::BTreeMap;

/// Largest sequence length accepted when elements encode to zero bytes.
pub const MAX_ZERO_SIZED_ELEMENTS: usize = 1 << 20;

/// Decode a value described by `schema` from `buf`, starting at `offset`.
///
/// Returns the value and the offset immediately after the bytes it consumed.
///
/// ```rust
/// use schema_codec::{Config, Schema, Value, decode};
///
/// let buf = [0xFF, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, b'h', b'i'];
/// let (value, end) = decode(&Schema::string(), &buf, 1, Config::standard()).unwrap();
/// assert_eq!(value, Value::from("hi"));
/// assert_eq!(end, buf.len());
/// ```
pub fn decode(
    schema: &Schema,
    buf: &[u8],
    offset: usize,
    config: Config,
) -> Result<(Value, usize)> {
    tracing::trace!(kind = schema.kind_name(), offset, len = buf.len(), "decoding value");
    let mut decoder = Decoder::new(buf, offset, config)?;
    let value = decoder.decode(schema)?;
    Ok((value, decoder.position()))
}

/// Decode a value that must occupy all of `input`.
pub fn from_bytes(schema: &Schema, input: &[u8], config: Config) -> Result<Value> {
    let (value, rest) = from_bytes_partial(schema, input, config)?;
    if !rest.is_empty() {
        return Err(Error::TrailingBytes(rest.len()));
    }
    Ok(value)
}

/// Decode a value from the front of `input`, also returning the unconsumed
/// remainder.
pub fn from_bytes_partial<'de>(
    schema: &Schema,
    input: &'de [u8],
    config: Config,
) -> Result<(Value, &'de [u8])> {
    let mut decoder = Decoder::new(input, 0, config)?;
    let value = decoder.decode(schema)?;
    Ok((value, decoder.remaining()))
}

/// A read cursor over a byte slice.
pub struct Decoder<'de> {
    input: &'de [u8],
    start: usize,
    pos: usize,
    config: Config,
}

macro_rules! impl_read {
    ($($name:ident: $t:ty),* $(,)?) => {
        $(
            fn $name(&mut self) -> Result<$t> {
                let bytes = self.take_array()?;
                Ok(match self.config.endian {
                    Endian::Little => <$t>::from_le_bytes(bytes),
                    Endian::Big => <$t>::from_be_bytes(bytes),
                })
            }
        )*
    };
}

impl<'de> Decoder<'de> {
    /// Create a decoder that reads `input` from `offset` onwards.
    pub fn new(input: &'de [u8], offset: usize, config: Config) -> Result<Self> {
        config.check_supported()?;
        if offset > input.len() {
            return Err(Error::BufferUnderrun {
                needed: offset,
                available: input.len(),
            });
        }
        Ok(Decoder {
            input,
            start: offset,
            pos: offset,
            config,
        })
    }

    /// Offset of the next byte to be read.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes read since the decoder was created.
    pub fn consumed(&self) -> usize {
        self.pos - self.start
    }

    /// Returns the unconsumed portion of the input buffer.
    pub fn remaining(&self) -> &'de [u8] {
        &self.input[self.pos..]
    }

    /// Consume exactly `n` bytes, returning a slice.
    fn take(&mut self, n: usize) -> Result<&'de [u8]> {
        self.config.check_limit(self.consumed().saturating_add(n))?;
        let available = self.input.len() - self.pos;
        if n > available {
            return Err(Error::BufferUnderrun {
                needed: n,
                available,
            });
        }
        let slice = &self.input[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    impl_read! {
        read_u8: u8,
        read_u16: u16,
        read_u32: u32,
        read_u64: u64,
        read_i8: i8,
        read_i16: i16,
        read_i32: i32,
        read_i64: i64,
        read_f32: f32,
        read_f64: f64,
    }

    /// Read an 8-byte length prefix.
    fn read_len(&mut self) -> Result<usize> {
        let len = self.read_u64()?;
        usize::try_from(len).map_err(|_| Error::BufferUnderrun {
            needed: usize::MAX,
            available: self.input.len() - self.pos,
        })
    }

    // ── Dispatch ───────────────────────────────────────────────────────────

    /// Decode one value at the current position.
    pub fn decode(&mut self, schema: &Schema) -> Result<Value> {
        match schema {
            Schema::Unit => Ok(Value::Unit),
            Schema::Primitive(p) => self.decode_primitive(*p),
            Schema::Struct(s) => {
                let mut fields = BTreeMap::new();
                for (name, field) in s.fields() {
                    fields.insert(name.clone(), self.decode(field)?);
                }
                Ok(Value::Struct(fields))
            }
            Schema::Tuple(elements) => elements
                .iter()
                .map(|element| self.decode(element))
                .collect::<Result<Vec<_>>>()
                .map(Value::Seq),
            Schema::Array { element, size } => self.decode_seq(element, *size),
            Schema::Collection(element) => {
                let count = self.read_len()?;
                self.decode_seq(element, count)
            }
            Schema::Enum(e) => {
                let discriminant = self.read_u32()?;
                let (name, variant) = e.by_discriminant(discriminant).ok_or_else(|| {
                    tracing::debug!(discriminant, offset = self.pos, "unknown enum discriminant");
                    Error::UnknownDiscriminant(discriminant)
                })?;
                let payload = self.decode(&variant.payload)?;
                Ok(Value::variant(name, payload))
            }
        }
    }

    /// Decode `count` elements after checking the input can hold them.
    ///
    /// Elements that encode to zero bytes are not bounded by the input, so
    /// each one is charged a byte against the configured limit and their
    /// count is capped at [`MAX_ZERO_SIZED_ELEMENTS`].
    fn decode_seq(&mut self, element: &Schema, count: usize) -> Result<Value> {
        let available = self.input.len() - self.pos;
        let min_size = element.min_size();
        if min_size == 0 {
            self.config
                .check_limit(self.consumed().saturating_add(count))?;
            if count > MAX_ZERO_SIZED_ELEMENTS {
                tracing::debug!(count, "zero-sized element count over cap");
                return Err(Error::LengthOverflow {
                    max: MAX_ZERO_SIZED_ELEMENTS,
                    got: count,
                });
            }
        } else {
            let needed = count.saturating_mul(min_size);
            if needed > available {
                return Err(Error::BufferUnderrun { needed, available });
            }
        }
        let mut items = Vec::with_capacity(count.min(available));
        for _ in 0..count {
            items.push(self.decode(element)?);
        }
        Ok(Value::Seq(items))
    }

    fn decode_primitive(&mut self, primitive: Primitive) -> Result<Value> {
        primitive.ensure_supported()?;
        Ok(match primitive {
            Primitive::U8 => Value::U8(self.read_u8()?),
            Primitive::U16 => Value::U16(self.read_u16()?),
            Primitive::U32 => Value::U32(self.read_u32()?),
            Primitive::U64 => Value::U64(self.read_u64()?),
            Primitive::I8 => Value::I8(self.read_i8()?),
            Primitive::I16 => Value::I16(self.read_i16()?),
            Primitive::I32 => Value::I32(self.read_i32()?),
            Primitive::I64 => Value::I64(self.read_i64()?),
            Primitive::F32 => Value::F32(self.read_f32()?),
            Primitive::F64 => Value::F64(self.read_f64()?),
            Primitive::Bool => match self.read_u8()? {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                v => {
                    tracing::debug!(byte = v, offset = self.pos - 1, "invalid bool encoding");
                    return Err(Error::InvalidBool(v));
                }
            },
            Primitive::String => {
                let len = self.read_len()?;
                let bytes = self.take(len)?;
                let s = std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?;
                Value::String(s.to_string())
            }
            Primitive::U128 | Primitive::I128 | Primitive::F16 | Primitive::F128 => {
                return Err(Error::Unsupported(primitive.name()));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_past_end() {
        let err = decode(&Schema::unit(), &[0u8; 2], 3, Config::standard());
        assert!(matches!(err, Err(Error::BufferUnderrun { needed: 3, available: 2 })));
    }

    #[test]
    fn test_unit_consumes_nothing() {
        let (value, end) = decode(&Schema::unit(), &[9u8], 0, Config::standard()).unwrap();
        assert_eq!(value, Value::Unit);
        assert_eq!(end, 0);
    }

    #[test]
    fn test_huge_collection_count_rejected() {
        let mut buf = u64::MAX.to_le_bytes().to_vec();
        buf.extend([0u8; 4]);
        let err = decode(&Schema::collection(Schema::u32()), &buf, 0, Config::standard());
        assert!(matches!(err, Err(Error::BufferUnderrun { .. })));
    }

    #[test]
    fn test_string_invalid_utf8() {
        let mut buf = 2u64.to_le_bytes().to_vec();
        buf.extend([0xC3, 0x28]);
        let err = decode(&Schema::string(), &buf, 0, Config::standard());
        assert_eq!(err, Err(Error::InvalidUtf8));
    }

    #[test]
    fn test_consumed_tracks_from_start_offset() {
        let buf = [0u8, 0, 1, 0];
        let mut de = Decoder::new(&buf, 2, Config::standard()).unwrap();
        assert_eq!(de.decode(&Schema::u16()).unwrap(), Value::U16(1));
        assert_eq!(de.consumed(), 2);
        assert_eq!(de.position(), 4);
        assert!(de.remaining().is_empty());
    }
}
