//! Blocking image work behind the thumbnail service: proportional resizing and
//! format-specific quality tuning.
//!
//! Everything here is CPU bound and is run through
//! [`tokio::task::spawn_blocking`] by the caller.

use std::io::Cursor;

use image::{
    codecs::{
        jpeg::JpegEncoder,
        png::{self, CompressionType, PngEncoder},
    },
    error::{ImageFormatHint, UnsupportedError, UnsupportedErrorKind},
    imageops::FilterType,
    ColorType, DynamicImage, GenericImageView, ImageEncoder, ImageError, ImageFormat, ImageResult,
};

use crate::image_type::ImageType;

/// The `image` format an [`ImageType`] decodes with, if it has one.
pub(crate) const fn image_format(image_type: ImageType) -> Option<ImageFormat> {
    match image_type {
        ImageType::Jpeg | ImageType::Jfif | ImageType::Exif => Some(ImageFormat::Jpeg),
        ImageType::Png => Some(ImageFormat::Png),
        ImageType::Bmp => Some(ImageFormat::Bmp),
        ImageType::Gif => Some(ImageFormat::Gif),
        ImageType::Webp => Some(ImageFormat::WebP),
        ImageType::Tiff => Some(ImageFormat::Tiff),
        ImageType::Tga => Some(ImageFormat::Tga),
        ImageType::None | ImageType::Jpeg2000 => None,
    }
}

/// Bounding box for a thumbnail at `quality` percent of the source, never
/// collapsing a side to zero. The resized image fits inside it with the
/// source aspect ratio kept, so a side may come out smaller than the box.
///
/// # Examples
///
/// ```
/// use explorer_core::transcode::scaled_dimensions;
///
/// assert_eq!(scaled_dimensions(200, 100, 50), (100, 50));
/// assert_eq!(scaled_dimensions(10, 10, 1), (1, 1));
/// ```
#[must_use]
pub fn scaled_dimensions(width: u32, height: u32, quality: u8) -> (u32, u32) {
    let scale = |side: u32| (u64::from(side) * u64::from(quality) / 100).max(1);
    // quality <= 100, so the scaled side never exceeds the source side
    (
        u32::try_from(scale(width)).unwrap_or(width),
        u32::try_from(scale(height)).unwrap_or(height),
    )
}

/// Linearly maps `value` from one closed integer range onto another.
///
/// ```
/// use explorer_core::transcode::map_range;
///
/// assert_eq!(map_range(1, 1, 100, 1, 9), 1);
/// assert_eq!(map_range(100, 1, 100, 1, 9), 9);
/// ```
#[must_use]
pub const fn map_range(value: i64, from_min: i64, from_max: i64, to_min: i64, to_max: i64) -> i64 {
    if from_max == from_min {
        return to_min;
    }
    (value - from_min) * (to_max - to_min) / (from_max - from_min) + to_min
}

/// Decodes `data`, scales it down to fit `quality` percent of its size and
/// re-encodes it in the source format.
pub(crate) fn resize(data: &[u8], image_type: ImageType, quality: u8) -> ImageResult<Vec<u8>> {
    let Some(format) = image_format(image_type) else {
        return Err(unsupported(image_type));
    };
    let source = decode(data, image_type, format)?;

    let (width, height) = source.dimensions();
    let (box_width, box_height) = scaled_dimensions(width, height, quality);
    let resized = source.resize(box_width, box_height, FilterType::Triangle);

    let mut out = Cursor::new(Vec::new());
    resized.write_to(&mut out, format)?;
    Ok(out.into_inner())
}

fn unsupported(image_type: ImageType) -> ImageError {
    let hint = || ImageFormatHint::Name(image_type.to_string());
    ImageError::Unsupported(UnsupportedError::from_format_and_kind(
        hint(),
        UnsupportedErrorKind::Format(hint()),
    ))
}

fn decode(data: &[u8], image_type: ImageType, format: ImageFormat) -> ImageResult<DynamicImage> {
    let img = image::load_from_memory_with_format(data, format)?;
    if image_type.is_jpeg_family() {
        // JPEG has no alpha channel to write back
        Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
    } else {
        Ok(img)
    }
}

type EncodeFn = fn(&DynamicImage, u8, &mut Vec<u8>) -> ImageResult<()>;

/// One row of the quality dispatch table.
struct QualityEncoder {
    accepts: fn(ImageType) -> bool,
    /// Maps the 1..=100 quality onto the encoder's own parameter.
    level: fn(u8) -> u8,
    encode: EncodeFn,
    /// Output type, when the encoder changes the format.
    output: Option<ImageType>,
}

const QUALITY_ENCODERS: &[QualityEncoder] = &[
    QualityEncoder {
        accepts: ImageType::is_jpeg_family,
        level: identity,
        encode: encode_jpeg,
        output: None,
    },
    QualityEncoder {
        accepts: is_png,
        level: png_level,
        encode: encode_png,
        output: None,
    },
    QualityEncoder {
        accepts: is_bmp,
        level: png_level,
        encode: encode_png,
        output: Some(ImageType::Png),
    },
];

const fn identity(quality: u8) -> u8 {
    quality
}

const fn is_png(image_type: ImageType) -> bool {
    matches!(image_type, ImageType::Png)
}

const fn is_bmp(image_type: ImageType) -> bool {
    matches!(image_type, ImageType::Bmp)
}

fn png_level(quality: u8) -> u8 {
    let level = map_range(i64::from(quality), 1, 100, 1, 9).clamp(1, 9);
    u8::try_from(level).unwrap_or(9)
}

fn encode_jpeg(img: &DynamicImage, quality: u8, out: &mut Vec<u8>) -> ImageResult<()> {
    JpegEncoder::new_with_quality(out, quality).encode_image(&img.to_rgb8())
}

fn encode_png(img: &DynamicImage, level: u8, out: &mut Vec<u8>) -> ImageResult<()> {
    let compression = match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    };
    let rgba = img.to_rgba8();
    PngEncoder::new_with_quality(out, compression, png::FilterType::Adaptive).write_image(
        rgba.as_raw(),
        rgba.width(),
        rgba.height(),
        ColorType::Rgba8,
    )
}

/// Whether [`adjust_quality`] has an encoder for `image_type`.
pub(crate) fn has_quality_encoder(image_type: ImageType) -> bool {
    QUALITY_ENCODERS.iter().any(|e| (e.accepts)(image_type))
}

/// Re-encodes `data` with a format-specific quality or compression setting.
///
/// Returns `None` when no encoder handles `image_type`.
pub(crate) fn adjust_quality(
    data: &[u8],
    image_type: ImageType,
    quality: u8,
) -> ImageResult<Option<(ImageType, Vec<u8>)>> {
    let Some(encoder) = QUALITY_ENCODERS.iter().find(|e| (e.accepts)(image_type)) else {
        return Ok(None);
    };
    let Some(format) = image_format(image_type) else {
        return Ok(None);
    };

    let img = decode(data, image_type, format)?;
    let mut out = Vec::new();
    (encoder.encode)(&img, (encoder.level)(quality), &mut out)?;

    Ok(Some((encoder.output.unwrap_or(image_type), out)))
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 128]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn dimensions_scale_and_floor_at_one() {
        assert_eq!(scaled_dimensions(200, 100, 50), (100, 50));
        assert_eq!(scaled_dimensions(200, 100, 100), (200, 100));
        assert_eq!(scaled_dimensions(199, 3, 50), (99, 1));
        assert_eq!(scaled_dimensions(1, 1, 1), (1, 1));
    }

    #[test]
    fn png_levels_cover_the_whole_range() {
        assert_eq!(png_level(1), 1);
        assert_eq!(png_level(50), 4);
        assert_eq!(png_level(100), 9);
        assert_eq!(map_range(5, 5, 5, 0, 10), 0);
    }

    #[test]
    fn resize_keeps_the_source_format() {
        let png = encoded(200, 100, ImageFormat::Png);
        let out = resize(&png, ImageType::Png, 50).unwrap();

        assert_eq!(ImageType::sniff(&out), ImageType::Png);
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!(img.dimensions(), (100, 50));
    }

    #[test]
    fn resize_keeps_the_aspect_ratio_of_thin_images() {
        let strip = encoded(199, 3, ImageFormat::Png);
        let out = resize(&strip, ImageType::Png, 50).unwrap();

        let (width, height) = image::load_from_memory(&out).unwrap().dimensions();
        assert_eq!(scaled_dimensions(199, 3, 50), (99, 1));
        assert_eq!((width, height), (66, 1));
    }

    #[test]
    fn resize_refuses_formats_without_a_codec() {
        let err = resize(b"\xFF\x4F\xFF\x51", ImageType::Jpeg2000, 50).unwrap_err();
        assert!(matches!(err, ImageError::Unsupported(_)));
    }

    #[test]
    fn resize_jpeg() {
        let jpeg = encoded(40, 20, ImageFormat::Jpeg);
        let out = resize(&jpeg, ImageType::sniff(&jpeg), 25).unwrap();

        let img = image::load_from_memory_with_format(&out, ImageFormat::Jpeg).unwrap();
        assert_eq!(img.dimensions(), (10, 5));
    }

    #[test]
    fn bmp_quality_is_normalized_to_png() {
        let bmp = encoded(8, 8, ImageFormat::Bmp);
        let (image_type, out) = adjust_quality(&bmp, ImageType::Bmp, 80).unwrap().unwrap();

        assert_eq!(image_type, ImageType::Png);
        assert_eq!(ImageType::sniff(&out), ImageType::Png);
    }

    #[test]
    fn quality_encoders_cover_jpeg_png_and_bmp_only() {
        assert!(has_quality_encoder(ImageType::Exif));
        assert!(has_quality_encoder(ImageType::Png));
        assert!(has_quality_encoder(ImageType::Bmp));
        assert!(!has_quality_encoder(ImageType::Gif));
        assert!(adjust_quality(b"GIF89a", ImageType::Gif, 50).unwrap().is_none());
    }
}
