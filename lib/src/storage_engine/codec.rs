// lib/src/storage_engine/codec.rs

use bincode::{
    config::{self, BigEndian, Configuration, Fixint},
    serde::{decode_from_slice, encode_to_vec},
};
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::StorageResult;

/// Provides a standard bincode configuration.
fn bincode_config() -> Configuration<BigEndian, Fixint> {
    config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
}

pub fn encode<T: Serialize>(value: &T) -> StorageResult<Vec<u8>> {
    Ok(encode_to_vec(value, bincode_config())?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
    let (value, _): (T, usize) = decode_from_slice(bytes, bincode_config())?;
    Ok(value)
}
