// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File type detection from magic bytes.
//!
//! Certificates arrive as raw bytes with no trustworthy name or content
//! type, so the format is read off the leading signature.

use serde::{Deserialize, Serialize};

const PDF_MAGIC: &[u8] = b"%PDF";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];
const GIF_MAGIC: &[u8] = b"GIF8";
/// Little-endian ("II") TIFF header.
const TIFF_LE_MAGIC: &[u8] = &[0x49, 0x49, 0x2A, 0x00];
/// Big-endian ("MM") TIFF header.
const TIFF_BE_MAGIC: &[u8] = &[0x4D, 0x4D, 0x00, 0x2A];

/// ISO base media box type at bytes 4..8 of HEIF files.
const FTYP_BOX: &[u8] = b"ftyp";
/// HEIF major brands recognised at bytes 8..12.
const HEIF_BRANDS: [&[u8]; 4] = [b"heic", b"heix", b"hevc", b"mif1"];

/// Detected file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Jpg,
    Png,
    Gif,
    Tiff,
    Heic,
    Pdf,
    Unknown,
}

impl FileType {
    /// MIME type used when serving the file back.
    pub fn mime_type(self) -> &'static str {
        match self {
            FileType::Jpg => "image/jpeg",
            FileType::Png => "image/png",
            FileType::Gif => "image/gif",
            FileType::Tiff => "image/tiff",
            FileType::Heic => "image/heic",
            FileType::Pdf => "application/pdf",
            FileType::Unknown => "application/octet-stream",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Jpg => "jpg",
            FileType::Png => "png",
            FileType::Gif => "gif",
            FileType::Tiff => "tiff",
            FileType::Heic => "heic",
            FileType::Pdf => "pdf",
            FileType::Unknown => "bin",
        }
    }

    pub fn is_image(self) -> bool {
        !matches!(self, FileType::Pdf | FileType::Unknown)
    }
}

/// Identify `bytes` by signature. Never reads past the end of the buffer.
pub fn sniff(bytes: &[u8]) -> FileType {
    let prefixes = [
        (PDF_MAGIC, FileType::Pdf),
        (JPEG_MAGIC, FileType::Jpg),
        (PNG_MAGIC, FileType::Png),
        (GIF_MAGIC, FileType::Gif),
        (TIFF_LE_MAGIC, FileType::Tiff),
        (TIFF_BE_MAGIC, FileType::Tiff),
    ];

    if let Some((_, file_type)) = prefixes.iter().find(|(magic, _)| bytes.starts_with(magic)) {
        return *file_type;
    }

    if is_heif(bytes) {
        return FileType::Heic;
    }

    FileType::Unknown
}

fn is_heif(bytes: &[u8]) -> bool {
    match (bytes.get(4..8), bytes.get(8..12)) {
        (Some(box_type), Some(brand)) => {
            box_type == FTYP_BOX && HEIF_BRANDS.iter().any(|b| *b == brand)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heif_header(brand: &[u8; 4]) -> Vec<u8> {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x18];
        bytes.extend_from_slice(b"ftyp");
        bytes.extend_from_slice(brand);
        bytes.extend_from_slice(&[0x00; 8]);
        bytes
    }

    #[test]
    fn test_short_signatures() {
        assert_eq!(sniff(&[0x25, 0x50, 0x44, 0x46]), FileType::Pdf);
        assert_eq!(sniff(b"%PDF-1.7\n%\xE2\xE3"), FileType::Pdf);
        assert_eq!(sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), FileType::Jpg);
        assert_eq!(
            sniff(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            FileType::Png
        );
        assert_eq!(sniff(b"GIF89a"), FileType::Gif);
        assert_eq!(sniff(&[0x49, 0x49, 0x2A, 0x00, 0x08]), FileType::Tiff);
        assert_eq!(sniff(&[0x4D, 0x4D, 0x00, 0x2A, 0x00]), FileType::Tiff);
        // Byte order marker without the matching magic number
        assert_eq!(sniff(&[0x4D, 0x4D, 0x2A, 0x00]), FileType::Unknown);
    }

    #[test]
    fn test_heif_brands() {
        for brand in [b"heic", b"heix", b"hevc", b"mif1"] {
            assert_eq!(sniff(&heif_header(brand)), FileType::Heic);
        }
        // Other ISO-BMFF brands (e.g. MP4) are not images we accept
        assert_eq!(sniff(&heif_header(b"isom")), FileType::Unknown);
    }

    #[test]
    fn test_short_or_empty_buffers_are_unknown() {
        assert_eq!(sniff(&[]), FileType::Unknown);
        assert_eq!(sniff(&[0xFF, 0xD8]), FileType::Unknown);
        assert_eq!(sniff(b"%PD"), FileType::Unknown);
        // ftyp present but brand truncated
        assert_eq!(sniff(b"\x00\x00\x00\x18ftyphe"), FileType::Unknown);
        assert_eq!(sniff(b"hello world"), FileType::Unknown);
    }

    #[test]
    fn test_mime_and_extension() {
        assert_eq!(FileType::Pdf.mime_type(), "application/pdf");
        assert_eq!(FileType::Heic.extension(), "heic");
        assert!(FileType::Png.is_image());
        assert!(!FileType::Pdf.is_image());
    }
}
