//! Encoded polyline codec (the Google "encoded polyline" format, precision 5).
//!
//! Coordinates are rounded to 5 decimal places (about 1.1 m), so a round trip
//! is only equal at that precision.

use crate::error::{GeoError, Result};
use crate::model::Coordinate;

const PRECISION: f64 = 1e5;

fn encode_value(mut value: i64, out: &mut String) {
    value <<= 1;
    if value < 0 {
        value = !value;
    }
    while value >= 0x20 {
        out.push(char::from((0x20 | (value & 0x1f)) as u8 + 63));
        value >>= 5;
    }
    out.push(char::from(value as u8 + 63));
}

/// Encode a point list. An empty list encodes to an empty string.
pub fn encode_polyline(points: &[Coordinate]) -> Result<String> {
    let mut out = String::with_capacity(points.len() * 8);
    let (mut prev_lat, mut prev_lng) = (0_i64, 0_i64);
    for point in points {
        point.validate()?;
        let lat = (point.lat * PRECISION).round() as i64;
        let lng = (point.lng * PRECISION).round() as i64;
        encode_value(lat - prev_lat, &mut out);
        encode_value(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }
    Ok(out)
}

fn decode_value(bytes: &[u8], pos: &mut usize) -> Result<i64> {
    let mut result: i64 = 0;
    let mut shift = 0;
    loop {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(GeoError::InvalidPolyline {
                position: *pos,
                reason: "truncated value",
            });
        };
        if !(63..=126).contains(&byte) {
            return Err(GeoError::InvalidPolyline {
                position: *pos,
                reason: "character outside the polyline alphabet",
            });
        }
        if shift > 60 {
            return Err(GeoError::InvalidPolyline {
                position: *pos,
                reason: "value too long",
            });
        }
        let chunk = i64::from(byte - 63);
        *pos += 1;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

/// Decode an encoded polyline. An empty string decodes to no points.
pub fn decode_polyline(encoded: &str) -> Result<Vec<Coordinate>> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut pos = 0;
    let (mut lat, mut lng) = (0_i64, 0_i64);
    while pos < bytes.len() {
        lat += decode_value(bytes, &mut pos)?;
        if pos >= bytes.len() {
            return Err(GeoError::InvalidPolyline {
                position: pos,
                reason: "latitude without longitude",
            });
        }
        lng += decode_value(bytes, &mut pos)?;
        points.push(Coordinate::new(lat as f64 / PRECISION, lng as f64 / PRECISION)?);
    }
    Ok(points)
}
