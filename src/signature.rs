use crate::error::FormatError;

/// The fixed 8-byte PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
pub const SIGNATURE_LEN: usize = PNG_SIGNATURE.len();

/// Validate the leading signature.  Nothing past the first 8 bytes is read.
pub fn check_signature(input: &[u8]) -> Result<(), FormatError> {
    if input.len() < SIGNATURE_LEN {
        return Err(FormatError::TooShort { len: input.len() });
    }
    if input[..SIGNATURE_LEN] != PNG_SIGNATURE {
        return Err(FormatError::BadSignature);
    }
    Ok(())
}
