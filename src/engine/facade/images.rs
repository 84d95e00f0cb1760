//! Image transfer, lookup and removal operations.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bollard::models::{CreateImageInfo, ImageDeleteResponseItem, ImageInspect, ImageSummary};
use bollard::query_parameters::{
    CreateImageOptionsBuilder, ListContainersOptionsBuilder, ListImagesOptionsBuilder,
    RemoveImageOptions,
};
use bytes::Bytes;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::debug;

use super::exec::ByteStream;
use super::{GuardedStream, RuntimeFacade, filter};
use crate::engine::client::{ContainerClient, ImageClient};
use crate::error::{ConfigError, DockhandError, EngineError, FilesystemError};

/// Tag pulled when a reference names neither a tag nor a digest.
const DEFAULT_TAG: &str = "latest";

/// Commit message recorded on imported images.
const IMPORT_MESSAGE: &str = "import";

/// Whether a local image matching a reference was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePresence {
    /// At least one local image matches.
    Found,
    /// No local image matches.
    NotFound,
}

impl ImagePresence {
    /// Returns `true` for [`Self::Found`].
    #[must_use]
    pub const fn is_found(self) -> bool {
        matches!(self, Self::Found)
    }
}

/// Tar archive of an exported image.
///
/// The archive owns the engine response; dropping it closes the response
/// exactly once, on every path. Read it either as a stream of chunks or,
/// through [`Self::into_reader`], as an `AsyncRead`.
pub struct ImageArchive<'a> {
    chunks: ByteStream<'a>,
}

impl<'a> ImageArchive<'a> {
    /// Convert the archive into a byte reader.
    ///
    /// Engine errors surface as `io::Error`s wrapping the `EngineError`.
    #[must_use]
    pub fn into_reader(self) -> impl AsyncRead + Send + Unpin + 'a {
        StreamReader::new(self.chunks.map(|chunk| chunk.map_err(io::Error::other)))
    }

    /// Copy the whole archive into `writer`, returning the byte count.
    ///
    /// # Errors
    ///
    /// Returns engine stream errors unchanged and `EngineError::Relay` when
    /// writing fails.
    pub async fn write_to<W>(mut self, writer: &mut W) -> Result<u64, DockhandError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut written = 0_u64;
        while let Some(chunk) = self.chunks.next().await {
            let bytes = chunk?;
            writer
                .write_all(&bytes)
                .await
                .map_err(|source| relay_error("export", source))?;
            written += u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        }
        writer
            .flush()
            .await
            .map_err(|source| relay_error("export", source))?;
        Ok(written)
    }
}

impl Stream for ImageArchive<'_> {
    type Item = Result<Bytes, EngineError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().chunks.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for ImageArchive<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageArchive").finish_non_exhaustive()
    }
}

/// Split a reference into the repository and the tag or digest to pull.
fn split_reference(reference: &str) -> (&str, &str) {
    if let Some((repository, digest)) = reference.split_once('@') {
        return (repository, digest);
    }

    match reference.rsplit_once(':') {
        Some((repository, tag)) if !tag.is_empty() && !tag.contains('/') => (repository, tag),
        Some((repository, "")) => (repository, DEFAULT_TAG),
        _ => (reference, DEFAULT_TAG),
    }
}

/// Does any listed image's first digest or tag contain `reference`?
fn any_image_matches(images: &[ImageSummary], reference: &str, by_digest: bool) -> bool {
    images.iter().any(|image| {
        let candidates = if by_digest {
            &image.repo_digests
        } else {
            &image.repo_tags
        };
        candidates
            .first()
            .is_some_and(|candidate| candidate.contains(reference))
    })
}

fn require_reference(reference: &str) -> Result<&str, DockhandError> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(DockhandError::from(ConfigError::MissingRequired {
            field: String::from("image"),
        }));
    }
    Ok(trimmed)
}

/// Read the archive on the blocking pool; the file is closed before the
/// contents are returned, on success and on every error.
async fn read_archive(path: &Utf8Path) -> Result<Vec<u8>, DockhandError> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_archive_blocking(&owned))
        .await
        .map_err(|error| {
            DockhandError::from(FilesystemError::IoError {
                path: path.as_std_path().to_path_buf(),
                message: error.to_string(),
            })
        })?
}

fn read_archive_blocking(path: &Utf8Path) -> Result<Vec<u8>, DockhandError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|error| FilesystemError::from_io(parent.as_std_path(), &error))?;
    let archive = dir
        .read(file_name)
        .map_err(|error| FilesystemError::from_io(path.as_std_path(), &error))?;
    Ok(archive)
}

fn relay_error(stream: &'static str, source: io::Error) -> DockhandError {
    DockhandError::from(EngineError::Relay { stream, source })
}

async fn write_json_lines<W>(
    stream: &'static str,
    mut events: GuardedStream<'_, CreateImageInfo>,
    sink: &mut W,
) -> Result<(), DockhandError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    while let Some(event) = events.next().await {
        let mut line = serde_json::to_vec(&event?)
            .map_err(|error| relay_error(stream, io::Error::other(error)))?;
        line.push(b'\n');
        sink.write_all(&line)
            .await
            .map_err(|source| relay_error(stream, source))?;
    }
    sink.flush()
        .await
        .map_err(|source| relay_error(stream, source))
}

impl<C: ImageClient> RuntimeFacade<C> {
    /// Pull `reference`, writing each progress event to `sink` as a JSON
    /// line.
    ///
    /// References without a tag or digest pull `latest`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` for an empty reference,
    /// `EngineError::Api` when the pull fails, and `EngineError::Relay` when
    /// writing fails.
    pub async fn pull_image<W>(&self, reference: &str, sink: &mut W) -> Result<(), DockhandError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let (repository, tag) = split_reference(require_reference(reference)?);
        debug!(repository, tag, "pulling image");
        let options = CreateImageOptionsBuilder::new()
            .from_image(repository)
            .tag(tag)
            .build();
        let events = self.guard(self.client.create_image(Some(options), None));
        write_json_lines("pull", events, sink).await
    }

    /// Export `image` as a tar archive.
    ///
    /// The archive is produced lazily; engine errors, including an unknown
    /// image, surface on the first read.
    #[must_use]
    pub fn export_image(&self, image: &str) -> ImageArchive<'_> {
        debug!(image, "exporting image");
        ImageArchive {
            chunks: self.guard(self.client.export_image(image)),
        }
    }

    /// Import the tar archive at `archive` as `repo:tag`, writing the
    /// engine's responses to `sink` as JSON lines.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError` when the archive cannot be read,
    /// `EngineError::Api` when the engine rejects it, and
    /// `EngineError::Relay` when writing fails.
    pub async fn import_image<W>(
        &self,
        archive: &Utf8Path,
        repo: &str,
        tag: &str,
        sink: &mut W,
    ) -> Result<(), DockhandError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let contents = read_archive(archive).await?;
        debug!(%archive, repo, tag, size = contents.len(), "importing image");
        let options = CreateImageOptionsBuilder::new()
            .from_src("-")
            .repo(repo)
            .tag(tag)
            .message(IMPORT_MESSAGE)
            .build();
        let events = self.guard(
            self.client
                .create_image(Some(options), Some(Bytes::from(contents))),
        );
        write_json_lines("import", events, sink).await
    }

    /// Check whether a local image matches `reference`.
    ///
    /// Digest references (containing `@`) are compared against every local
    /// image's first repo digest; others are filtered by the engine and
    /// compared against the first repo tag. Both comparisons are substring
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the listing fails.
    pub async fn ensure_image_exists(&self, reference: &str) -> Result<ImagePresence, DockhandError> {
        let by_digest = reference.contains('@');
        let options = (!by_digest).then(|| {
            ListImagesOptionsBuilder::new()
                .filters(&filter("reference", reference))
                .build()
        });
        let images = self.call(self.client.list_images(options)).await?;

        let presence = if any_image_matches(&images, reference, by_digest) {
            ImagePresence::Found
        } else {
            ImagePresence::NotFound
        };
        debug!(reference, by_digest, ?presence, "image lookup");
        Ok(presence)
    }

    /// Remove an image.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the engine rejects the request.
    pub async fn remove_image(
        &self,
        image: &str,
        options: Option<RemoveImageOptions>,
    ) -> Result<Vec<ImageDeleteResponseItem>, DockhandError> {
        debug!(image, "removing image");
        self.call(self.client.remove_image(image, options)).await
    }

    /// Fetch the full image descriptor.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api`; an unknown image satisfies
    /// [`DockhandError::is_not_found`].
    pub async fn image_info(&self, image: &str) -> Result<ImageInspect, DockhandError> {
        self.call(self.client.inspect_image(image)).await
    }
}

impl<C: ContainerClient> RuntimeFacade<C> {
    /// Returns whether any container, running or stopped, was created from
    /// the image with ID `image_id`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Api` when the listing fails.
    pub async fn is_image_used(&self, image_id: &str) -> Result<bool, DockhandError> {
        let options = ListContainersOptionsBuilder::new().all(true).build();
        let containers = self
            .call(self.client.list_containers(Some(options)))
            .await?;
        Ok(containers
            .iter()
            .any(|container| container.image_id.as_deref() == Some(image_id)))
    }
}
