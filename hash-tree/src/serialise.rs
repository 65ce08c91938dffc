//! Canonical byte encoding of hashable entries.
//!
//! Every node in the network must turn the same entry into the same bytes
//! before digesting it. The legacy nodes write an entry's hashable encoding
//! as a MessagePack array using the most compact representation of each
//! element; [`MsgPackHashSerialiser`] reproduces that byte for byte.

use rmp::encode;

use crate::HashTreeError;

/// A primitive value inside an entry's hashable encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum HashableValue {
    /// MessagePack `nil`.
    Nil,
    /// A boolean.
    Bool(bool),
    /// A signed integer, written in its most compact form.
    Int(i64),
    /// An unsigned integer, written in its most compact form.
    UInt(u64),
    /// A 64-bit float.
    Float(f64),
    /// A UTF-8 string.
    Str(String),
    /// Raw bytes (MessagePack `bin`).
    Bytes(Vec<u8>),
    /// A nested array.
    List(Vec<HashableValue>),
}

impl From<&str> for HashableValue {
    fn from(value: &str) -> Self {
        HashableValue::Str(value.to_owned())
    }
}

impl From<String> for HashableValue {
    fn from(value: String) -> Self {
        HashableValue::Str(value)
    }
}

impl From<i64> for HashableValue {
    fn from(value: i64) -> Self {
        HashableValue::Int(value)
    }
}

impl From<u64> for HashableValue {
    fn from(value: u64) -> Self {
        HashableValue::UInt(value)
    }
}

impl From<bool> for HashableValue {
    fn from(value: bool) -> Self {
        HashableValue::Bool(value)
    }
}

impl From<Vec<u8>> for HashableValue {
    fn from(value: Vec<u8>) -> Self {
        HashableValue::Bytes(value)
    }
}

impl From<Vec<HashableValue>> for HashableValue {
    fn from(value: Vec<HashableValue>) -> Self {
        HashableValue::List(value)
    }
}

/// Converts a hashable encoding into the bytes that get digested.
pub trait HashSerialiser {
    /// Serialise one entry's hashable encoding.
    fn serialise(&self, encoding: &[HashableValue]) -> Result<Vec<u8>, HashTreeError>;
}

impl<S: HashSerialiser + ?Sized> HashSerialiser for &S {
    fn serialise(&self, encoding: &[HashableValue]) -> Result<Vec<u8>, HashTreeError> {
        (**self).serialise(encoding)
    }
}

/// MessagePack serialiser compatible with the legacy hash serialisation.
#[derive(Debug, Default, Clone, Copy)]
pub struct MsgPackHashSerialiser;

impl MsgPackHashSerialiser {
    fn write_array(buf: &mut Vec<u8>, values: &[HashableValue]) -> Result<(), HashTreeError> {
        let len = u32::try_from(values.len()).map_err(|_| {
            HashTreeError::Serialise(format!("array of {} elements is too long", values.len()))
        })?;
        encode::write_array_len(buf, len).map_err(|e| HashTreeError::Serialise(e.to_string()))?;
        for value in values {
            Self::write_value(buf, value)?;
        }
        Ok(())
    }

    fn write_value(buf: &mut Vec<u8>, value: &HashableValue) -> Result<(), HashTreeError> {
        let result = match value {
            HashableValue::Nil => encode::write_nil(buf).map_err(|e| e.to_string()),
            HashableValue::Bool(b) => encode::write_bool(buf, *b).map_err(|e| e.to_string()),
            HashableValue::Int(i) => encode::write_sint(buf, *i)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            HashableValue::UInt(u) => encode::write_uint(buf, *u)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            HashableValue::Float(f) => encode::write_f64(buf, *f).map_err(|e| e.to_string()),
            HashableValue::Str(s) => encode::write_str(buf, s).map_err(|e| e.to_string()),
            HashableValue::Bytes(b) => encode::write_bin(buf, b).map_err(|e| e.to_string()),
            HashableValue::List(items) => return Self::write_array(buf, items),
        };
        result.map_err(HashTreeError::Serialise)
    }
}

impl HashSerialiser for MsgPackHashSerialiser {
    fn serialise(&self, encoding: &[HashableValue]) -> Result<Vec<u8>, HashTreeError> {
        let mut buf = Vec::new();
        Self::write_array(&mut buf, encoding)?;
        Ok(buf)
    }
}
