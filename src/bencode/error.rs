use thiserror::Error;

/// Grammar violations reported by the bencode parser.
///
/// Every variant is terminal for the parse call that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BencodeError {
    #[error("Unexpected end of input")]
	UnexpectedEnd,

	#[error("Invalid Integer {0}")]
	InvalidInteger(String),

	#[error("Invalid String {0}")]
	InvalidString(String),

	#[error("Invalid Length {0}")]
	InvalidLength(String),

	#[error("Invalid Format {0}")]
	InvalidFormat(String),

	#[error("Unexpected character 0x{0:02x}")]
	UnexpectedCharacter(u8),
}
