//! Copying node contents out of the share.

use std::io::Seek;
use std::sync::Arc;

use tempfile::NamedTempFile;
use tokio::fs::File;

use sharemirror_core::error::{AppError, ErrorKind};
use sharemirror_core::result::AppResult;
use sharemirror_entity::location::Location;
use sharemirror_entity::path_node::PathNode;

use crate::remote::RemoteGateway;

/// A retrieved file, rewound and ready to read.
///
/// The temporary file is removed when this value is dropped.
#[derive(Debug)]
pub struct RetrievedContents {
    /// Temporary file holding the contents.
    pub file: NamedTempFile,
    /// Number of bytes copied.
    pub size: u64,
}

/// Streams remote files into local temporary files.
#[derive(Debug, Clone)]
pub struct ContentRetriever {
    gateway: Arc<RemoteGateway>,
}

impl ContentRetriever {
    /// Creates a new retriever.
    pub fn new(gateway: Arc<RemoteGateway>) -> Self {
        Self { gateway }
    }

    /// Copy the node's remote file into a temporary file.
    ///
    /// `Ok(None)` when the share or the file cannot be read.
    pub async fn retrieve(
        &self,
        location: &Location,
        node: &PathNode,
    ) -> AppResult<Option<RetrievedContents>> {
        let mut temp = NamedTempFile::new().map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to create temporary file", e)
        })?;
        let handle = temp.as_file().try_clone().map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to open temporary file", e)
        })?;
        let mut writer = File::from_std(handle);

        let Some(size) = self
            .gateway
            .copy_file(location, node.full_path(), &mut writer)
            .await?
        else {
            return Ok(None);
        };
        drop(writer);

        temp.as_file_mut().rewind().map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to rewind temporary file", e)
        })?;
        Ok(Some(RetrievedContents { file: temp, size }))
    }
}
