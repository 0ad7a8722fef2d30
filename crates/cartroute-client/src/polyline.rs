//! Decoder for the encoded-polyline format used by the directions service.
//!
//! Each coordinate is a zig-zag encoded delta from the previous one, scaled
//! by 1e5 and emitted in 5-bit chunks offset by 63.

use cartroute_core::GeoPosition;

use crate::error::ClientError;

const PRECISION: f64 = 1e5;

/// Decodes an encoded polyline into positions.
///
/// # Errors
///
/// Returns [`ClientError::InvalidPolyline`] if the input contains bytes
/// outside the encoding alphabet or ends in the middle of a value.
pub fn decode_polyline(encoded: &str) -> Result<Vec<GeoPosition>, ClientError> {
    let bytes = encoded.as_bytes();
    let mut index = 0usize;
    let mut lat = 0i64;
    let mut lng = 0i64;
    let mut points = Vec::new();

    while index < bytes.len() {
        lat += next_delta(bytes, &mut index)?;
        lng += next_delta(bytes, &mut index)?;
        #[allow(clippy::cast_precision_loss)]
        let point = GeoPosition::new(lat as f64 / PRECISION, lng as f64 / PRECISION);
        points.push(point);
    }

    Ok(points)
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, ClientError> {
    let mut result = 0i64;
    let mut shift = 0u32;
    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(ClientError::InvalidPolyline(format!(
                "truncated value at offset {index}"
            )));
        };
        *index += 1;
        if !(63..=126).contains(&byte) {
            return Err(ClientError::InvalidPolyline(format!(
                "byte {byte:#x} at offset {} is outside the encoding alphabet",
                *index - 1
            )));
        }
        if shift > 60 {
            return Err(ClientError::InvalidPolyline(
                "value exceeds 64 bits".to_string(),
            ));
        }
        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
