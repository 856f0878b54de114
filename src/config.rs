//! Codec configuration.
//!
//! A [`Config`] is passed by value into every encode/decode call. It carries
//! no state of its own and never lives inside a [`Schema`](crate::Schema):
//! the same schema can be written little-endian on one call and big-endian on
//! the next.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Byte order applied to every multi-byte field, length prefix and
/// discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// How integers are laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntEncoding {
    /// Every integer occupies its declared width.
    #[default]
    Fixed,
    /// Variable-width integer packing. Not implemented: any encode or decode
    /// under this mode fails with [`Error::Unsupported`].
    Variable,
}

/// Encoding options shared by the encoder and decoder.
///
/// ```rust
/// use schema_codec::{Config, Endian};
///
/// let cfg = Config::standard().with_big_endian().with_limit(1024);
/// assert_eq!(cfg.endian, Endian::Big);
/// assert_eq!(cfg.limit, Some(1024));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Config {
    pub endian: Endian,
    pub int_encoding: IntEncoding,
    /// Maximum number of bytes a single call may write or read.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Config {
    /// The standard profile: little-endian, fixed-width integers, no limit.
    pub const fn standard() -> Self {
        Config {
            endian: Endian::Little,
            int_encoding: IntEncoding::Fixed,
            limit: None,
        }
    }

    pub const fn with_big_endian(mut self) -> Self {
        self.endian = Endian::Big;
        self
    }

    pub const fn with_little_endian(mut self) -> Self {
        self.endian = Endian::Little;
        self
    }

    pub const fn with_fixed_int_encoding(mut self) -> Self {
        self.int_encoding = IntEncoding::Fixed;
        self
    }

    pub const fn with_variable_int_encoding(mut self) -> Self {
        self.int_encoding = IntEncoding::Variable;
        self
    }

    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub const fn with_no_limit(mut self) -> Self {
        self.limit = None;
        self
    }

    /// Rejects configurations the codec cannot honour.
    pub(crate) fn check_supported(&self) -> Result<()> {
        match self.int_encoding {
            IntEncoding::Fixed => Ok(()),
            IntEncoding::Variable => Err(Error::Unsupported("variable-width integer encoding")),
        }
    }

    /// Fails with [`Error::LimitExceeded`] if consuming `needed` bytes in
    /// total would go over the configured limit.
    pub(crate) fn check_limit(&self, needed: usize) -> Result<()> {
        match self.limit {
            Some(limit) if needed > limit => {
                tracing::debug!(limit, needed, "byte limit exceeded");
                Err(Error::LimitExceeded { limit, needed })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_is_default() {
        assert_eq!(Config::standard(), Config::default());
        assert_eq!(Config::standard().endian, Endian::Little);
        assert_eq!(Config::standard().int_encoding, IntEncoding::Fixed);
        assert_eq!(Config::standard().limit, None);
    }

    #[test]
    fn test_variable_encoding_rejected() {
        let cfg = Config::standard().with_variable_int_encoding();
        assert!(matches!(cfg.check_supported(), Err(Error::Unsupported(_))));
        assert!(cfg.with_fixed_int_encoding().check_supported().is_ok());
    }

    #[test]
    fn test_limit_boundary() {
        let cfg = Config::standard().with_limit(8);
        assert!(cfg.check_limit(8).is_ok());
        assert_eq!(
            cfg.check_limit(9),
            Err(Error::LimitExceeded { limit: 8, needed: 9 })
        );
        assert!(cfg.with_no_limit().check_limit(usize::MAX).is_ok());
    }

    #[test]
    fn test_config_serde() {
        let cfg = Config::standard().with_big_endian().with_limit(64);
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(
            json,
            r#"{"endian":"big","int_encoding":"fixed","limit":64}"#
        );
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
