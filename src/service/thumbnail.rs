use tracing::instrument;

use super::{resolve, ItemLocation};
use crate::{
    error::{Error, Result},
    filesystem::FileTypeProvider,
    image_type::ImageType,
    path::PathId,
    scope::RequestScope,
    transcode,
};

/// A preview payload and the format it is encoded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailResult {
    image_type: ImageType,
    data: Vec<u8>,
}

impl ThumbnailResult {
    #[must_use]
    pub const fn new(image_type: ImageType, data: Vec<u8>) -> Self {
        Self { image_type, data }
    }

    #[inline]
    #[must_use]
    pub const fn image_type(&self) -> ImageType {
        self.image_type
    }

    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Builds image previews: classify, fetch, then transcode off the runtime.
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailService<'a> {
    scope: &'a RequestScope,
}

impl<'a> ThumbnailService<'a> {
    #[must_use]
    pub const fn new(scope: &'a RequestScope) -> Self {
        Self { scope }
    }

    fn file_types(&self) -> &'a dyn FileTypeProvider {
        self.scope.environment().current_context().file_types()
    }

    /// A preview of the image at `location`, scaled to `quality` percent of
    /// its size.
    ///
    /// Formats the pipeline cannot resize are returned byte for byte.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidQuality`] unless `quality` is within `1..=100`.
    /// - [`Error::NoThumbnail`] if the file is not a recognized image.
    /// - The backend's error if the file cannot be classified or read.
    /// - [`Error::Image`] if a supported image fails to decode.
    #[instrument(skip_all, fields(path = tracing::field::Empty, quality = quality))]
    pub async fn thumbnail<L: ItemLocation + ?Sized>(
        &self,
        location: &L,
        quality: u8,
    ) -> Result<ThumbnailResult> {
        let (id, image_type, data) = self.load(location, quality).await?;

        if !image_type.is_resizable() {
            tracing::debug!(%image_type, "passing image through unresized");
            return Ok(ThumbnailResult::new(image_type, data));
        }

        let resized = self
            .scope
            .guard(async move {
                tokio::task::spawn_blocking(move || transcode::resize(&data, image_type, quality))
                    .await?
                    .map_err(Error::from)
            })
            .await?;

        tracing::debug!(
            path = id.as_str(),
            %image_type,
            bytes = resized.len(),
            "resized thumbnail"
        );
        Ok(ThumbnailResult::new(image_type, resized))
    }

    /// Re-encodes the image at `location` with a format-specific quality
    /// setting instead of resizing it.
    ///
    /// JPEG uses `quality` as the encoder quality, PNG maps it onto a
    /// compression level and BMP is converted to PNG. Other formats are
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`ThumbnailService::thumbnail`].
    #[instrument(skip_all, fields(path = tracing::field::Empty, quality = quality))]
    pub async fn adjust_quality<L: ItemLocation + ?Sized>(
        &self,
        location: &L,
        quality: u8,
    ) -> Result<ThumbnailResult> {
        let (_, image_type, data) = self.load(location, quality).await?;

        if !transcode::has_quality_encoder(image_type) {
            return Ok(ThumbnailResult::new(image_type, data));
        }

        let (output_type, encoded) = self
            .scope
            .guard(async move {
                tokio::task::spawn_blocking(move || {
                    transcode::adjust_quality(&data, image_type, quality)
                        .map(|adjusted| adjusted.unwrap_or((image_type, data)))
                })
                .await?
                .map_err(Error::from)
            })
            .await?;

        Ok(ThumbnailResult::new(output_type, encoded))
    }

    /// Classifies and fetches an image shared by both preview paths.
    async fn load<L: ItemLocation + ?Sized>(
        &self,
        location: &L,
        quality: u8,
    ) -> Result<(PathId, ImageType, Vec<u8>)> {
        if !(1..=100).contains(&quality) {
            return Err(Error::InvalidQuality(quality));
        }

        let id = resolve(self.scope, location)?;
        tracing::Span::current().record("path", id.as_str());

        let image_type = self
            .scope
            .guard(self.file_types().image_type(id.as_str()))
            .await?;
        if !image_type.is_image() {
            return Err(Error::NoThumbnail {
                path: id.into_inner(),
            });
        }

        let data = self.scope.files().fetch(&id).await?;
        Ok((id, image_type, data))
    }
}
