//! File-extension classification of path nodes.

use serde::{Deserialize, Serialize};

/// Known leaf file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    /// DICOM image (`.dcm`).
    Dicom,
    /// NIfTI volume (`.nii`).
    Nifti,
    /// Gzipped NIfTI volume (`.nii.gz`).
    CompressedNifti,
    /// FreeSurfer volume (`.mgh`, `.mgz`).
    Mgh,
    /// JSON sidecar (`.json`).
    Json,
    /// Tabular data (`.csv`, `.tsv`).
    Table,
    /// Plain text (`.txt`).
    Text,
    /// PDF document (`.pdf`).
    Pdf,
    /// Raster image (`.png`, `.jpg`, `.jpeg`).
    Image,
    /// Archive (`.zip`, `.gz`, `.tar`).
    Archive,
}

/// Suffix table, checked in order so that `.nii.gz` wins over `.gz`.
const SUFFIXES: &[(&str, LeafKind)] = &[
    (".nii.gz", LeafKind::CompressedNifti),
    (".dcm", LeafKind::Dicom),
    (".nii", LeafKind::Nifti),
    (".mgh", LeafKind::Mgh),
    (".mgz", LeafKind::Mgh),
    (".json", LeafKind::Json),
    (".csv", LeafKind::Table),
    (".tsv", LeafKind::Table),
    (".txt", LeafKind::Text),
    (".pdf", LeafKind::Pdf),
    (".png", LeafKind::Image),
    (".jpg", LeafKind::Image),
    (".jpeg", LeafKind::Image),
    (".zip", LeafKind::Archive),
    (".tar", LeafKind::Archive),
    (".gz", LeafKind::Archive),
];

impl LeafKind {
    /// Icon category used by browsing clients.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Dicom => "dicom",
            Self::Nifti | Self::CompressedNifti => "nifti",
            Self::Mgh => "mgh",
            Self::Json => "json",
            Self::Table => "table",
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Archive => "archive",
        }
    }
}

/// Closed classification of a node.
///
/// Anything without a known, case-sensitive suffix is a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    /// Directory, or a name without a known suffix.
    Folder,
    /// A file of a known type; never expanded in views.
    Leaf(LeafKind),
}

impl NodeClass {
    /// Classify a base name by its suffix.
    pub fn classify(name: &str) -> Self {
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.len() > suffix.len() && name.ends_with(suffix))
            .map(|(_, kind)| Self::Leaf(*kind))
            .unwrap_or(Self::Folder)
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Icon category used by browsing clients.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Leaf(kind) => kind.icon(),
        }
    }
}
