//! Raster image classification by magic bytes.
//!
//! References:
//! https://www.garykessler.net/library/file_sigs.html

use std::fmt;

/// Recognized raster formats, or [`ImageType::None`] for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageType {
    #[default]
    None,
    Jpeg,
    Jfif,
    Exif,
    Png,
    Bmp,
    Gif,
    Webp,
    Tiff,
    Tga,
    Jpeg2000,
}

const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const GIF87A: &[u8] = b"GIF87a";
const GIF89A: &[u8] = b"GIF89a";
const BMP: &[u8] = b"BM";
const TIFF_LE: &[u8] = &[0x49, 0x49, 0x2A, 0x00];
const TIFF_BE: &[u8] = &[0x4D, 0x4D, 0x00, 0x2A];
const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];
const JP2: &[u8] = &[
    0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
];
const J2K_CODESTREAM: &[u8] = &[0xFF, 0x4F, 0xFF, 0x51];

impl ImageType {
    /// Classifies a file from its leading bytes. Sixteen bytes are enough for
    /// every signature recognized here.
    ///
    /// TGA has no header signature and is never produced by sniffing.
    ///
    /// # Examples
    ///
    /// ```
    /// use explorer_core::ImageType;
    ///
    /// assert_eq!(ImageType::sniff(b"GIF89a\x01\x00"), ImageType::Gif);
    /// assert_eq!(ImageType::sniff(b"plain text"), ImageType::None);
    /// ```
    #[must_use]
    pub fn sniff(header: &[u8]) -> Self {
        if header.starts_with(PNG) {
            Self::Png
        } else if header.starts_with(JPEG) {
            match (header.get(3), header.get(6..10)) {
                (Some(0xE0), Some(b"JFIF")) => Self::Jfif,
                (Some(0xE1), Some(b"Exif")) => Self::Exif,
                _ => Self::Jpeg,
            }
        } else if header.starts_with(GIF87A) || header.starts_with(GIF89A) {
            Self::Gif
        } else if header.starts_with(b"RIFF") && header.get(8..12) == Some(&b"WEBP"[..]) {
            Self::Webp
        } else if header.starts_with(TIFF_LE) || header.starts_with(TIFF_BE) {
            Self::Tiff
        } else if header.starts_with(JP2) || header.starts_with(J2K_CODESTREAM) {
            Self::Jpeg2000
        } else if header.starts_with(BMP) && header.len() >= 14 {
            Self::Bmp
        } else {
            Self::None
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_image(self) -> bool {
        !matches!(self, Self::None)
    }

    #[inline]
    #[must_use]
    pub const fn is_jpeg_family(self) -> bool {
        matches!(self, Self::Jpeg | Self::Jfif | Self::Exif)
    }

    /// Formats the thumbnail pipeline decodes, resizes and re-encodes.
    /// Everything else is passed through untouched.
    #[must_use]
    pub const fn is_resizable(self) -> bool {
        matches!(
            self,
            Self::Jpeg | Self::Jfif | Self::Exif | Self::Png | Self::Bmp | Self::Gif | Self::Tiff
        )
    }

    #[must_use]
    pub const fn mime_type(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Jpeg | Self::Jfif | Self::Exif => Some("image/jpeg"),
            Self::Png => Some("image/png"),
            Self::Bmp => Some("image/bmp"),
            Self::Gif => Some("image/gif"),
            Self::Webp => Some("image/webp"),
            Self::Tiff => Some("image/tiff"),
            Self::Tga => Some("image/x-tga"),
            Self::Jpeg2000 => Some("image/jp2"),
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Jpeg => "jpeg",
            Self::Jfif => "jfif",
            Self::Exif => "exif",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Tiff => "tiff",
            Self::Tga => "tga",
            Self::Jpeg2000 => "jpeg2000",
        };
        f.write_str(name)
    }
}
