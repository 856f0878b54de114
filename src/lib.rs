//! # schema-codec
//!
//! Schema-driven binary serialization with a compact, bincode-compatible
//! wire layout.
//!
//! ## Overview
//!
//! A [`Schema`] describes the shape of some data once; [`encode`] and
//! [`decode`] then convert [`Value`]s matching that shape to and from raw
//! bytes. No type information is written to the wire: both sides must agree
//! on the schema. Layout details that are not part of the shape (byte order,
//! an optional byte budget) come from a [`Config`] passed into every call.
//!
//! Schemas are immutable and `Send + Sync`, so one schema can serve any
//! number of concurrent calls. Each call works only on the buffer it is
//! given.
//!
//! ## Wire layout
//!
//! | Schema kind | Encoding |
//! |-------------|----------|
//! | unit        | 0 bytes |
//! | `u8`, `i8`  | 1 byte |
//! | `u16`, `i16` | 2 bytes |
//! | `u32`, `i32`, `f32` | 4 bytes |
//! | `u64`, `i64`, `f64` | 8 bytes |
//! | `bool`      | 1 byte: 0 (false) or 1 (true) |
//! | `String`    | 8-byte length + UTF-8 bytes, no padding |
//! | struct      | fields in schema order, no tags or prefix |
//! | tuple       | elements in order; a one-element tuple is just its element |
//! | array       | exactly `size` elements, no prefix |
//! | collection  | 8-byte element count + elements |
//! | enum        | 4-byte discriminant + payload (nothing for a unit payload) |
//!
//! `u128`, `i128`, `f16` and `f128` are part of the schema model but are
//! rejected with [`Error::Unsupported`] by the codec, as is
//! [`IntEncoding::Variable`].
//!
//! ## Example
//!
//! ```rust
//! use schema_codec::{Config, Schema, Value, from_bytes, to_bytes};
//!
//! let record = Schema::structure([("hello", Schema::string()), ("world", Schema::u8())]).unwrap();
//! let pair = Schema::tuple([record.clone(), record]);
//!
//! let one = Value::structure([("hello", Value::from("some string")), ("world", Value::U8(16))]);
//! let value = Value::seq([one.clone(), one]);
//!
//! let bytes = to_bytes(&pair, &value, Config::standard()).unwrap();
//! assert_eq!(bytes.len(), 2 * (8 + 11 + 1));
//!
//! let decoded = from_bytes(&pair, &bytes, Config::standard()).unwrap();
//! assert_eq!(value, decoded);
//! ```

pub mod config;
pub mod de;
pub mod error;
pub mod schema;
pub mod ser;
pub mod value;

pub use config::{Config, Endian, IntEncoding};
pub use de::{Decoder, MAX_ZERO_SIZED_ELEMENTS, decode, from_bytes, from_bytes_partial};
pub use error::{ConstructionError, Error, Result};
pub use schema::{EnumSchema, Primitive, Schema, StructSchema, Variant};
pub use ser::{Encoder, encode, encoded_size, to_bytes};
pub use value::Value;
