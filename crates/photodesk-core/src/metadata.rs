//! EXIF metadata summary for the photo details panel.
//!
//! Only the handful of fields the UI shows are extracted. Missing or
//! unreadable EXIF is not an error: the summary simply stays empty.

use std::io::Cursor;

use exif::{Exif, In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};

/// Camera and capture details shown next to a photo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExifSummary {
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    /// `WIDTHxHEIGHT` as recorded by the camera.
    pub resolution: Option<String>,
    /// `DateTimeOriginal` in `YYYY-MM-DD HH:MM:SS` form.
    pub taken_at: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ExifSummary {
    /// Read the summary from raw image bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut cursor = Cursor::new(bytes);
        match Reader::new().read_from_container(&mut cursor) {
            Ok(exif) => Self::from_exif(&exif),
            Err(e) => {
                tracing::debug!("no EXIF data: {e}");
                Self::default()
            }
        }
    }

    fn from_exif(exif: &Exif) -> Self {
        let resolution = match (
            uint_field(exif, Tag::PixelXDimension),
            uint_field(exif, Tag::PixelYDimension),
        ) {
            (Some(w), Some(h)) => Some(format!("{w}x{h}")),
            _ => None,
        };

        Self {
            camera_make: string_field(exif, Tag::Make),
            camera_model: string_field(exif, Tag::Model),
            resolution,
            taken_at: string_field(exif, Tag::DateTimeOriginal)
                .or_else(|| string_field(exif, Tag::DateTime))
                .map(|s| normalize_datetime(&s)),
            latitude: gps_coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, 'S'),
            longitude: gps_coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, 'W'),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Coordinates as `lat, lng` with six decimals.
    pub fn coordinates(&self) -> Option<String> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(format!("{lat:.6}, {lng:.6}")),
            _ => None,
        }
    }

    /// A map link for the capture location.
    pub fn maps_link(&self) -> Option<String> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(format!("https://www.google.com/maps?q={lat},{lng}")),
            _ => None,
        }
    }
}

/// ASCII field with NUL padding and surrounding whitespace stripped.
fn string_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Ascii(ref parts) = field.value else {
        return None;
    };
    let raw = parts.first()?;
    clean_exif_string(raw)
}

fn clean_exif_string(raw: &[u8]) -> Option<String> {
    let text: String = String::from_utf8_lossy(raw)
        .chars()
        .filter(|c| *c != '\0' && !c.is_control())
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn uint_field(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)?.value.get_uint(0)
}

/// EXIF dates use `YYYY:MM:DD HH:MM:SS`; swap the date colons for dashes.
fn normalize_datetime(raw: &str) -> String {
    match raw.split_once(' ') {
        Some((date, time)) => format!("{} {}", date.replace(':', "-"), time),
        None => raw.replace(':', "-"),
    }
}

fn gps_coordinate(exif: &Exif, tag: Tag, ref_tag: Tag, negative: char) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Rational(ref dms) = field.value else {
        return None;
    };
    if dms.len() < 3 {
        return None;
    }
    let degrees = dms_to_degrees(dms[0].to_f64(), dms[1].to_f64(), dms[2].to_f64());

    let sign = match string_field(exif, ref_tag) {
        Some(r) if r.starts_with(negative) => -1.0,
        _ => 1.0,
    };
    Some(sign * degrees)
}

fn dms_to_degrees(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}
