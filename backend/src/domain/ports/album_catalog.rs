//! Port for the external music catalog collaborator.

use async_trait::async_trait;

use crate::domain::AlbumId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalog adapters.
    pub enum AlbumCatalogError {
        /// The catalog service could not be reached.
        Unavailable { message: String } =>
            "album catalog unavailable: {message}",
    }
}

/// Port for album reference validation.
///
/// Existence is the only question the core ever asks the catalog; metadata
/// fetching and caching live entirely outside this crate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlbumCatalog: Send + Sync {
    /// Whether the album id resolves in the catalog.
    async fn album_exists(&self, album: &AlbumId) -> Result<bool, AlbumCatalogError>;
}

/// Fixture catalog that resolves every album; for tests not about catalog
/// misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAlbumCatalog;

#[async_trait]
impl AlbumCatalog for FixtureAlbumCatalog {
    async fn album_exists(&self, _album: &AlbumId) -> Result<bool, AlbumCatalogError> {
        Ok(true)
    }
}
