use std::fmt;
use num_enum::TryFromPrimitive;

/// Render a raw registry id as its enum variant name, or hex if unknown.
pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

/// Validate a construction-time chunk size against `[1, max]`.
pub fn check_chunk_size(what: &str, size: usize, max: usize) -> Result<(), crate::types::StreamError> {
    if size == 0 {
        return Err(crate::types::StreamError::InvalidArgument(format!("{what} must be positive")));
    }
    if size > max {
        return Err(crate::types::StreamError::InvalidArgument(format!(
            "{what} too large: {size} > {max}"
        )));
    }
    Ok(())
}
