//! Encoded step image data
//!
//! Steps keep their screenshot as encoded bytes (PNG, JPEG, ...) so the
//! model stays plain data. In JSON the bytes travel as a base64 data URI.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ImageDataError;

/// Encoded raster bytes. Cloning is cheap.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    bytes: Arc<[u8]>,
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("mime", &self.mime_type())
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageData {
    /// Wrap already-encoded bytes. They are not validated until decoded.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Encode an RGBA buffer as PNG
    pub fn from_rgba(img: &RgbaImage) -> Result<Self, ImageDataError> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png)?;
        Ok(Self::from_bytes(out.into_inner()))
    }

    /// Parse a `data:<mime>;base64,<payload>` URI. A bare base64 payload
    /// without the header is accepted as well.
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageDataError> {
        let payload = match uri.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or(ImageDataError::InvalidDataUri)?;
                if !header.ends_with(";base64") {
                    return Err(ImageDataError::InvalidDataUri);
                }
                payload
            }
            None => uri,
        };
        let bytes = STANDARD.decode(payload.trim())?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type sniffed from the payload, `image/png` when unknown
    pub fn mime_type(&self) -> &'static str {
        image::guess_format(&self.bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("image/png")
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.to_base64())
    }

    /// Decode to an RGBA buffer
    pub fn decode(&self) -> Result<RgbaImage, ImageDataError> {
        Ok(image::load_from_memory(&self.bytes)?.to_rgba8())
    }

    /// Content hash used to detect image replacement
    pub fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.bytes.hash(&mut hasher);
        hasher.finish()
    }
}

impl Serialize for ImageData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_uri())
    }
}

impl<'de> Deserialize<'de> for ImageData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let uri = String::deserialize(deserializer)?;
        ImageData::from_data_uri(&uri).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RgbaImage {
        RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]))
    }

    #[test]
    fn test_png_round_trip() {
        let data = ImageData::from_rgba(&sample()).unwrap();
        assert_eq!(data.mime_type(), "image/png");
        assert_eq!(data.decode().unwrap(), sample());
    }

    #[test]
    fn test_data_uri_round_trip() {
        let data = ImageData::from_rgba(&sample()).unwrap();
        let uri = data.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(ImageData::from_data_uri(&uri).unwrap(), data);
    }

    #[test]
    fn test_bare_base64_accepted() {
        let data = ImageData::from_bytes(vec![1u8, 2, 3]);
        assert_eq!(ImageData::from_data_uri(&data.to_base64()).unwrap(), data);
    }

    #[test]
    fn test_rejects_non_base64_uri() {
        assert!(matches!(
            ImageData::from_data_uri("data:text/plain,hello"),
            Err(ImageDataError::InvalidDataUri)
        ));
    }

    #[test]
    fn test_garbage_does_not_decode() {
        let data = ImageData::from_bytes(vec![0u8; 16]);
        assert!(data.decode().is_err());
    }

    #[test]
    fn test_digest_tracks_content() {
        let a = ImageData::from_bytes(vec![1u8, 2, 3]);
        let b = ImageData::from_bytes(vec![1u8, 2, 3]);
        let c = ImageData::from_bytes(vec![3u8, 2, 1]);
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
    }
}
