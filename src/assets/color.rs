use crate::foundation::core::Rgba8;
use crate::foundation::error::{CompositeError, CompositeResult};

/// Decode a `#RRGGBB` or `#RGB` hex color.
///
/// Short form channels are expanded by nibble replication (`v * 17`). The format carries no
/// alpha channel, so the result is always fully opaque.
pub fn parse_hex_color(s: &str) -> CompositeResult<Rgba8> {
    let invalid = || CompositeError::invalid_color(s);

    let digits = s.strip_prefix('#').ok_or_else(invalid)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let byte = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
    };

    match digits.len() {
        6 => Ok(Rgba8::opaque(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
        3 => Ok(Rgba8::opaque(
            byte(0..1)? * 17,
            byte(1..2)? * 17,
            byte(2..3)? * 17,
        )),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
