use std::collections::BTreeMap;
use super::error::BencodeError;
use crate::bencode::bvalue::BValue;

/// Maximum number of nested lists/dictionaries accepted in one value.
pub const MAX_DEPTH: usize = 64;

/// Parses exactly one value that must span the whole input.
///
/// Bytes left over after the top-level value are rejected with
/// `InvalidFormat`. Use [`decode_bencode`] for prefix parsing.
pub fn parse(input: &[u8]) -> Result<BValue, BencodeError> {
    let (consumed, value) = decode_bencode(input)?;
    if consumed != input.len() {
        return Err(BencodeError::InvalidFormat(format!(
            "{} trailing bytes after value",
            input.len() - consumed
        )));
    }
    Ok(value)
}

/// Parses one value from the front of `input`, returning how many bytes it
/// used. Anything after that value is left untouched.
pub fn decode_bencode(input: &[u8]) -> Result<(usize, BValue), BencodeError> {
    decode_value(input, 0)
}

fn decode_value(input: &[u8], depth: usize) -> Result<(usize, BValue), BencodeError> {
    if input.is_empty() {
        return Err(BencodeError::UnexpectedEnd);
    }

    match input[0] {
        b'i' => decode_integer(input),
        b'l' => decode_list(input, depth),
        b'd' => decode_dict(input, depth),
        c if c.is_ascii_digit() => decode_string(input),
        c => Err(BencodeError::UnexpectedCharacter(c)),
    }
}

/// Decodes a Bencoded integer of the form `i<digits>e`.
fn decode_integer(input: &[u8]) -> Result<(usize, BValue), BencodeError> {
	let end_pos = input
		.iter()
		.position(|&b| b == b'e')
		.ok_or(BencodeError::UnexpectedEnd)?;

	let body = &input[1..end_pos];
	let digits = body.strip_prefix(b"-").unwrap_or(body);

	if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(BencodeError::InvalidInteger(format!(
            "not a decimal number: {:?}",
            String::from_utf8_lossy(body)
        )));
	}

	// `i0e` is the only spelling of zero; `-0`, `-01` and `01` are rejected.
	if digits[0] == b'0' && (digits.len() > 1 || digits.len() != body.len()) {
        return Err(BencodeError::InvalidInteger(format!(
            "Leading zeros are not allowed: {}",
            String::from_utf8_lossy(body)
        )));
	}

	// body is ASCII at this point
	let num_str = std::str::from_utf8(body)
		.map_err(|_| BencodeError::InvalidInteger("Non-UTF-8 data in integer".to_string()))?;
    let parsed = num_str.parse::<i64>()
		.map_err(|e| {
			BencodeError::InvalidInteger(format!("Failed to parse integer '{}': {}", num_str, e))
	})?;

	// add 1 to account for 'e'
    Ok((end_pos + 1, BValue::Integer(parsed)))
}

/// Decodes a Bencoded string of the form `<length>:<bytes>`.
fn decode_string(encoded: &[u8]) -> Result<(usize, BValue), BencodeError> {
	let colon_index = encoded
		.iter()
		.position(|b| !b.is_ascii_digit())
		.filter(|&i| encoded[i] == b':')
		.ok_or_else(|| BencodeError::InvalidString("Missing ':' after string length".to_string()))?;

	let str_length = std::str::from_utf8(&encoded[..colon_index])
		.map_err(|e| BencodeError::InvalidLength(e.to_string()))?;

	let length = str_length.parse::<usize>()
		.map_err(|e| BencodeError::InvalidLength(
			format!("{} ({})", str_length, e)))?;

	let start_data = colon_index + 1;
	let end_data = start_data
		.checked_add(length)
		.ok_or(BencodeError::UnexpectedEnd)?;

    if end_data > encoded.len() {
        return Err(BencodeError::UnexpectedEnd);
    }

    Ok((end_data, BValue::ByteString(encoded[start_data..end_data].to_vec())))
}

/// Decodes a Bencoded list of the form `l<items>e`.
fn decode_list(encoded: &[u8], depth: usize) -> Result<(usize, BValue), BencodeError> {
    if depth >= MAX_DEPTH {
        return Err(BencodeError::InvalidFormat("nesting too deep".to_string()));
    }

    let mut idx = 1; // skip 'l'
    let mut items = Vec::new();

    while idx < encoded.len() && encoded[idx] != b'e' {
        let (consumed, val) = decode_value(&encoded[idx..], depth + 1)?;
        idx += consumed;
        items.push(val);
    }

    // If we've run out of input, the list is unclosed
    if idx >= encoded.len() {
        return Err(BencodeError::UnexpectedEnd);
    }

	// add 1 to account for 'e'
    Ok((idx + 1, BValue::List(items)))
}

/// Decodes a Bencoded dictionary of the form `d<key><value>...e`.
///
/// Keys must be byte strings in strictly increasing byte order, which rules
/// out duplicates as well as unsorted input.
fn decode_dict(encoded: &[u8], depth: usize) -> Result<(usize, BValue), BencodeError> {
    if depth >= MAX_DEPTH {
        return Err(BencodeError::InvalidFormat("nesting too deep".to_string()));
    }

    let mut idx = 1; // Skip the initial 'd'
    let mut map = BTreeMap::new();
    let mut last_key: Option<Vec<u8>> = None;

    while idx < encoded.len() && encoded[idx] != b'e' {
        if !encoded[idx].is_ascii_digit() {
            return Err(BencodeError::InvalidFormat(
                "Dict key must be a ByteString".to_string(),
            ));
        }

        let (key_length, key_value) = decode_string(&encoded[idx..])?;
        idx += key_length;
        let key = match key_value {
            BValue::ByteString(bytes) => bytes,
            other => {
                return Err(BencodeError::InvalidFormat(format!(
                    "Dict key must be a ByteString, got {}",
                    other.kind()
                )));
            }
        };

        if let Some(prev) = &last_key {
            if key <= *prev {
                return Err(BencodeError::InvalidFormat(format!(
                    "Dict key {:?} is not greater than {:?}",
                    String::from_utf8_lossy(&key),
                    String::from_utf8_lossy(prev)
                )));
            }
        }

        let (consumed_val, value) = decode_value(&encoded[idx..], depth + 1)?;
        idx += consumed_val;

        last_key = Some(key.clone());
        map.insert(key, value);
    }

    // Here, either we ran out of input or we encountered an 'e'
    if idx >= encoded.len() {
        return Err(BencodeError::UnexpectedEnd);
    }

	// add 1 to account for 'e'
    Ok((idx + 1, BValue::Dict(map)))
}
