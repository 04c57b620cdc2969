use std::{io::Cursor, path::Path, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};

use explorer_core::{
    DirectoryProvider, EnvironmentContext, EnvironmentRegistry, EnvironmentType, Error,
    FileProvider, FileStream, FileTypeProvider, ImageType, ItemStatus, RequestScope, Result,
};

/// In-memory backend with five subdirectories and two files under `/data`.
/// `/data/d3` cannot report its modification time and `/data/b.bin` cannot
/// report its size.
#[derive(Debug, Default)]
struct FlakyBackend;

const DIRECTORIES: [&str; 5] = ["/data/d0", "/data/d1", "/data/d2", "/data/d3", "/data/d4"];
const FILES: [&str; 2] = ["/data/a.txt", "/data/b.bin"];

fn denied() -> Error {
    Error::BackendUnavailable { backend: "flaky" }
}

fn leaf(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_owned()
}

#[async_trait]
impl DirectoryProvider for FlakyBackend {
    async fn subdirectory_paths(&self, path: &str) -> Result<Vec<String>> {
        match path {
            "/data" => Ok(DIRECTORIES.iter().map(|d| d.to_string()).collect()),
            "/broken" => Err(denied()),
            _ => Ok(Vec::new()),
        }
    }

    async fn file_paths(&self, path: &str) -> Result<Vec<String>> {
        match path {
            "/data" => Ok(FILES.iter().map(|f| f.to_string()).collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn directory_name(&self, path: &str) -> Result<String> {
        Ok(leaf(path))
    }

    async fn last_write_time(&self, path: &str) -> Result<Option<DateTime<Utc>>> {
        if path == "/data/d3" {
            Err(denied())
        } else {
            Ok(Some(DateTime::<Utc>::UNIX_EPOCH))
        }
    }

    async fn creation_time(&self, _path: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(None)
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(path == "/data" || DIRECTORIES.contains(&path))
    }
}

#[async_trait]
impl FileProvider for FlakyBackend {
    async fn file_name(&self, path: &str) -> Result<String> {
        Ok(leaf(path))
    }

    async fn last_write_time(&self, _path: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(Some(DateTime::<Utc>::UNIX_EPOCH))
    }

    async fn creation_time(&self, _path: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(Some(DateTime::<Utc>::UNIX_EPOCH))
    }

    async fn size(&self, path: &str) -> Result<Option<u64>> {
        if path == "/data/b.bin" {
            Err(denied())
        } else {
            Ok(Some(5))
        }
    }

    async fn open_file(&self, _path: &str) -> Result<FileStream> {
        Ok(Box::new(Cursor::new(b"hello".to_vec())))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(FILES.contains(&path))
    }

    async fn delete(&self, _path: &str) -> Result<()> {
        Err(denied())
    }
}

#[async_trait]
impl FileTypeProvider for FlakyBackend {
    async fn image_type(&self, _path: &str) -> Result<ImageType> {
        Ok(ImageType::None)
    }
}

fn flaky_scope() -> RequestScope {
    let registry = EnvironmentRegistry::default().with_context(EnvironmentContext::from_backend(
        EnvironmentType::Local,
        Arc::new(FlakyBackend),
    ));
    RequestScope::new(Arc::new(registry))
}

fn local_scope() -> RequestScope {
    RequestScope::new(Arc::default())
}

fn write_image(dir: &Path, name: &str, width: u32, height: u32, format: ImageFormat) -> String {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 7]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut out, format).unwrap();

    let path = dir.join(name);
    std::fs::write(&path, out.into_inner()).unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn one_failed_probe_marks_only_that_entry() {
    let scope = flaky_scope();
    let directories = scope.directories().subdirectories("/data").await.unwrap();

    assert_eq!(directories.len(), 5);
    for (directory, expected) in directories.iter().zip(DIRECTORIES) {
        assert_eq!(directory.path(), expected);
    }

    let broken = &directories[3];
    assert_eq!(broken.info().status(), ItemStatus::Inaccessible);
    assert_eq!(broken.info().date_modified(), None);
    assert_eq!(broken.info().name(), Some("d3"));

    for directory in directories.iter().filter(|d| d.path() != "/data/d3") {
        assert!(directory.info().is_accessible(), "{}", directory.path());
        assert_eq!(
            directory.info().date_modified(),
            Some(DateTime::<Utc>::UNIX_EPOCH)
        );
    }
}

#[tokio::test]
async fn unreadable_size_is_zero_and_inaccessible() {
    let scope = flaky_scope();
    let files = scope.files().files("/data").await.unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].size(), 5);
    assert!(files[0].info().is_accessible());
    assert_eq!(files[1].size(), 0);
    assert_eq!(files[1].info().status(), ItemStatus::Inaccessible);
}

#[tokio::test]
async fn load_items_lists_directories_before_files() {
    let scope = flaky_scope();
    let mut directory = explorer_core::Directory::new("/data".parse().unwrap());
    scope.directories().load_items(&mut directory).await.unwrap();

    let kinds = directory
        .items()
        .iter()
        .map(|item| item.is_dir())
        .collect::<Vec<_>>();
    assert_eq!(kinds, [true, true, true, true, true, false, false]);
}

#[tokio::test]
async fn listing_errors_propagate_unchanged() {
    let scope = flaky_scope();
    let err = scope.directories().subdirectories("/broken").await.unwrap_err();
    assert!(matches!(err, Error::BackendUnavailable { backend: "flaky" }));

    let err = scope.files().delete("/data/a.txt").await.unwrap_err();
    assert!(matches!(err, Error::BackendUnavailable { .. }));
}

#[tokio::test]
async fn malformed_paths_never_reach_the_backend() {
    let scope = flaky_scope();
    let err = scope.directories().subdirectories("data//x").await.unwrap_err();
    assert!(matches!(err, Error::InvalidPath { .. }));
}

#[tokio::test]
async fn cancelled_scope_stops_backend_calls() {
    let scope = flaky_scope();
    scope.cancel();

    let err = scope.directories().subdirectories("/data").await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn remote_backends_report_unavailable() {
    let scope = RequestScope::from_tags(Arc::default(), None, Some("ftp"));
    let err = scope.directories().subdirectories("/pub").await.unwrap_err();
    assert!(matches!(err, Error::BackendUnavailable { backend: "ftp" }));
}

#[tokio::test]
async fn png_header_is_classified_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "tiny.png", 16, 16, ImageFormat::Png);

    let thumbnail = local_scope().thumbnails().thumbnail(&path, 50).await.unwrap();
    assert_eq!(thumbnail.image_type(), ImageType::Png);
}

#[tokio::test]
async fn non_images_have_no_thumbnail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "plain text, no magic here").unwrap();

    let err = local_scope()
        .thumbnails()
        .thumbnail(path.to_str().unwrap(), 50)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoThumbnail { .. }));
}

#[tokio::test]
async fn thumbnails_fit_within_the_scaled_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let scope = local_scope();

    let wide = write_image(dir.path(), "wide.png", 200, 100, ImageFormat::Png);
    let thumbnail = scope.thumbnails().thumbnail(&wide, 50).await.unwrap();
    let (width, height) = image::load_from_memory(thumbnail.data()).unwrap().dimensions();
    assert!(width <= 100 && height <= 50, "{width}x{height}");

    let small = write_image(dir.path(), "small.jpg", 10, 10, ImageFormat::Jpeg);
    let thumbnail = scope.thumbnails().thumbnail(&small, 1).await.unwrap();
    assert!(thumbnail.image_type().is_jpeg_family());
    let (width, height) = image::load_from_memory(thumbnail.data()).unwrap().dimensions();
    assert!(width >= 1 && height >= 1);
}

#[tokio::test]
async fn unresizable_formats_pass_through_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.jp2");
    let mut payload = vec![
        0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
    ];
    payload.extend((0..=255u8).cycle().take(1000));
    std::fs::write(&path, &payload).unwrap();

    let thumbnail = local_scope()
        .thumbnails()
        .thumbnail(path.to_str().unwrap(), 10)
        .await
        .unwrap();
    assert_eq!(thumbnail.image_type(), ImageType::Jpeg2000);
    assert_eq!(thumbnail.data(), &payload[..]);
}

#[tokio::test]
async fn quality_outside_the_percent_range_is_rejected() {
    let scope = local_scope();
    for quality in [0, 101, 255] {
        let err = scope.thumbnails().thumbnail("/any.png", quality).await.unwrap_err();
        assert!(matches!(err, Error::InvalidQuality(q) if q == quality));
    }
}

#[tokio::test]
async fn oversized_sources_are_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "big.png", 64, 64, ImageFormat::Png);

    let options = explorer_core::ExplorerOptions::default().with_max_thumbnail_source_bytes(32);
    let scope = RequestScope::new(Arc::new(EnvironmentRegistry::new(&options)));

    let err = scope.thumbnails().thumbnail(&path, 50).await.unwrap_err();
    assert!(matches!(err, Error::TooLarge { limit: 32, .. }));
}

#[tokio::test]
async fn adjust_quality_converts_bmp_to_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "icon.bmp", 12, 12, ImageFormat::Bmp);

    let adjusted = local_scope()
        .thumbnails()
        .adjust_quality(&path, 60)
        .await
        .unwrap();
    assert_eq!(adjusted.image_type(), ImageType::Png);
    assert_eq!(ImageType::sniff(adjusted.data()), ImageType::Png);
}

#[tokio::test]
async fn local_files_round_trip_through_the_services() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_string_lossy().into_owned();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("greeting.txt"), "hi there").unwrap();

    let scope = local_scope();
    let subdirectories = scope.directories().subdirectories(&root).await.unwrap();
    assert_eq!(subdirectories.len(), 1);
    assert_eq!(subdirectories[0].info().name(), Some("sub"));

    let files = scope.files().files(&root).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].size(), 8);
    assert_eq!(scope.files().content(&files[0]).await.unwrap(), b"hi there");

    assert!(scope.files().exists(&files[0]).await.unwrap());
    scope.files().delete(&files[0]).await.unwrap();
    assert!(!scope.files().exists(&files[0]).await.unwrap());
}

#[tokio::test]
async fn thin_images_keep_their_aspect_ratio() {
    let dir = tempfile::tempdir().unwrap();
    let strip = write_image(dir.path(), "strip.png", 199, 3, ImageFormat::Png);

    let thumbnail = local_scope().thumbnails().thumbnail(&strip, 50).await.unwrap();
    let (width, height) = image::load_from_memory(thumbnail.data()).unwrap().dimensions();
    assert_eq!((width, height), (66, 1));
}

#[tokio::test]
async fn downloads_are_not_bound_by_the_thumbnail_limit() {
    use tokio::io::AsyncReadExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("archive.bin");
    let payload = vec![42u8; 4096];
    std::fs::write(&path, &payload).unwrap();
    let path = path.to_string_lossy().into_owned();

    let options = explorer_core::ExplorerOptions::default().with_max_thumbnail_source_bytes(32);
    let scope = RequestScope::new(Arc::new(EnvironmentRegistry::new(&options)));

    assert_eq!(scope.files().content(&path).await.unwrap(), payload);

    let mut streamed = Vec::new();
    scope
        .files()
        .open(&path)
        .await
        .unwrap()
        .read_to_end(&mut streamed)
        .await
        .unwrap();
    assert_eq!(streamed, payload);

    let capped = options.with_max_download_bytes(1024);
    let scope = RequestScope::new(Arc::new(EnvironmentRegistry::new(&capped)));
    let err = scope.files().content(&path).await.unwrap_err();
    assert!(matches!(err, Error::TooLarge { limit: 1024, .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn broken_links_are_listed_as_inaccessible_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("kept.txt"), "ok").unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling")).unwrap();
    let root = dir.path().to_string_lossy().into_owned();

    let files = local_scope().files().files(&root).await.unwrap();
    assert_eq!(files.len(), 2);

    let dangling = files
        .iter()
        .find(|f| f.info().name() == Some("dangling"))
        .unwrap();
    assert_eq!(dangling.info().status(), ItemStatus::Inaccessible);
    assert_eq!(dangling.size(), 0);

    let kept = files.iter().find(|f| f.info().name() == Some("kept.txt")).unwrap();
    assert!(kept.info().is_accessible());
}
