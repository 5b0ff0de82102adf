//! Canonical wire encoding for credentials.
//!
//! Credentials travel as standard base64 of a deterministic CBOR array:
//!
//! ```text
//! registration:       [bytes address, bytes signature]
//! job token:          [text job_id, bytes signature(65)]
//! segment credential: [text job_id, bytes descriptor, bytes signature(65)]
//! ```
//!
//! The CBOR is encoded with definite lengths and smallest-width headers.
//! Decoding re-encodes the parsed value and rejects anything that does not
//! reproduce the input exactly, so each credential has one byte form.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ciborium::value::Value;

use vidtrust_core::{RecoverableSignature, SIGNATURE_LENGTH};

use crate::error::TokenDecodeError;

type DecodeResult<T> = std::result::Result<T, TokenDecodeError>;

/// Encode a job token body.
pub fn encode_job_token(job_id: &str, signature: &RecoverableSignature) -> String {
    let value = Value::Array(vec![
        Value::Text(job_id.to_owned()),
        Value::Bytes(signature.0.to_vec()),
    ]);
    STANDARD.encode(encode_value(&value))
}

/// Decode a job token body into `(job_id, signature)`.
pub fn decode_job_token(encoded: &str) -> DecodeResult<(String, RecoverableSignature)> {
    let items = decode_array(encoded, 2)?;
    let job_id = take_text(&items[0], "job_id")?;
    let signature = take_signature(&items[1])?;
    Ok((job_id, signature))
}

/// Encode a segment credential body.
pub fn encode_segment_credential(
    job_id: &str,
    descriptor: &[u8],
    signature: &RecoverableSignature,
) -> String {
    let value = Value::Array(vec![
        Value::Text(job_id.to_owned()),
        Value::Bytes(descriptor.to_vec()),
        Value::Bytes(signature.0.to_vec()),
    ]);
    STANDARD.encode(encode_value(&value))
}

/// Decode a segment credential body into `(job_id, descriptor, signature)`.
pub fn decode_segment_credential(
    encoded: &str,
) -> DecodeResult<(String, Vec<u8>, RecoverableSignature)> {
    let items = decode_array(encoded, 3)?;
    let job_id = take_text(&items[0], "job_id")?;
    let descriptor = take_bytes(&items[1], "descriptor")?;
    let signature = take_signature(&items[2])?;
    Ok((job_id, descriptor, signature))
}

/// Encode a registration request body.
///
/// The address and signature are carried as given; their lengths are
/// checked at verification time.
pub fn encode_registration(address: &[u8], signature: &[u8]) -> String {
    let value = Value::Array(vec![
        Value::Bytes(address.to_vec()),
        Value::Bytes(signature.to_vec()),
    ]);
    STANDARD.encode(encode_value(&value))
}

/// Decode a registration request body into `(address, signature)`.
pub fn decode_registration(encoded: &str) -> DecodeResult<(Vec<u8>, Vec<u8>)> {
    let items = decode_array(encoded, 2)?;
    Ok((
        take_bytes(&items[0], "address")?,
        take_bytes(&items[1], "signature")?,
    ))
}

fn decode_array(encoded: &str, len: usize) -> DecodeResult<Vec<Value>> {
    let bytes = STANDARD.decode(encoded)?;
    let value: Value = ciborium::from_reader(bytes.as_slice())
        .map_err(|e| TokenDecodeError::Layout(e.to_string()))?;

    if encode_value(&value) != bytes {
        return Err(TokenDecodeError::Layout("non-canonical encoding".into()));
    }

    match value {
        Value::Array(items) if items.len() == len => Ok(items),
        Value::Array(items) => Err(TokenDecodeError::Layout(format!(
            "expected {} fields, got {}",
            len,
            items.len()
        ))),
        _ => Err(TokenDecodeError::Layout("expected array".into())),
    }
}

fn take_text(value: &Value, field: &str) -> DecodeResult<String> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        _ => Err(TokenDecodeError::Layout(format!("{field} must be text"))),
    }
}

fn take_bytes(value: &Value, field: &str) -> DecodeResult<Vec<u8>> {
    match value {
        Value::Bytes(b) => Ok(b.clone()),
        _ => Err(TokenDecodeError::Layout(format!("{field} must be bytes"))),
    }
}

fn take_signature(value: &Value) -> DecodeResult<RecoverableSignature> {
    let bytes = take_bytes(value, "signature")?;
    RecoverableSignature::from_slice(&bytes).map_err(|_| {
        TokenDecodeError::Layout(format!(
            "signature must be {} bytes, got {}",
            SIGNATURE_LENGTH,
            bytes.len()
        ))
    })
}

/// Encode a CBOR value deterministically.
///
/// Only the shapes credentials use are supported; anything else encodes as
/// CBOR null, which never decodes back to a valid credential.
fn encode_value(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value);
    buf
}

fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Bytes(b) => {
            encode_uint(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
        Value::Text(s) => {
            encode_uint(buf, 3, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Array(arr) => {
            encode_uint(buf, 4, arr.len() as u64);
            for item in arr {
                encode_value_to(buf, item);
            }
        }
        _ => buf.push(0xf6),
    }
}

/// Encode an unsigned integer header with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}
