//! Resource kinds and their canonical MIME strings.
//!
//! Every kind is listed once in [`KIND_TABLE`]; all lookups go through it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A MIME type not present in the table.
    Unknown,
    /// A folder.
    Folder,
    /// A shortcut pointing at another resource.
    Shortcut,
    /// A Google Docs document.
    Document,
    /// A Google Sheets spreadsheet.
    Spreadsheet,
    /// A Google Slides presentation.
    Presentation,
    /// A Google Drawings drawing.
    Drawing,
    /// PDF document.
    Pdf,
    /// Plain text.
    PlainText,
    /// Comma-separated values.
    Csv,
    /// JSON document.
    Json,
    /// ZIP archive.
    Zip,
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// MPEG-4 video.
    Mp4,
    /// Matroska video.
    Mkv,
    /// Flash video.
    Flv,
    /// QuickTime video.
    Mov,
    /// AVI video.
    Avi,
    /// Windows Media video.
    Wmv,
    /// Word document.
    Docx,
    /// Excel workbook.
    Xlsx,
    /// PowerPoint presentation.
    Pptx,
}

/// One row of the kind table.
#[derive(Debug, Clone, Copy)]
pub struct KindEntry {
    /// The kind this row describes.
    pub kind: ResourceKind,
    /// Canonical MIME string used by the remote API.
    pub mime_type: &'static str,
    /// Kind a native document exports to by default.
    pub default_export: Option<ResourceKind>,
    /// Local file extensions (lowercase, without the dot).
    pub extensions: &'static [&'static str],
}

const fn entry(
    kind: ResourceKind,
    mime_type: &'static str,
    default_export: Option<ResourceKind>,
    extensions: &'static [&'static str],
) -> KindEntry {
    KindEntry {
        kind,
        mime_type,
        default_export,
        extensions,
    }
}

/// Static mapping between kinds, MIME strings, export targets and extensions.
pub static KIND_TABLE: &[KindEntry] = &[
    entry(ResourceKind::Unknown, "unknown/unknown", None, &[]),
    entry(ResourceKind::Folder, "application/vnd.google-apps.folder", None, &[]),
    entry(ResourceKind::Shortcut, "application/vnd.google-apps.shortcut", None, &[]),
    entry(
        ResourceKind::Document,
        "application/vnd.google-apps.document",
        Some(ResourceKind::Docx),
        &[],
    ),
    entry(
        ResourceKind::Spreadsheet,
        "application/vnd.google-apps.spreadsheet",
        Some(ResourceKind::Xlsx),
        &[],
    ),
    entry(
        ResourceKind::Presentation,
        "application/vnd.google-apps.presentation",
        Some(ResourceKind::Pptx),
        &[],
    ),
    entry(
        ResourceKind::Drawing,
        "application/vnd.google-apps.drawing",
        Some(ResourceKind::Png),
        &[],
    ),
    entry(ResourceKind::Pdf, "application/pdf", None, &["pdf"]),
    entry(ResourceKind::PlainText, "text/plain", None, &["txt", "log", "md"]),
    entry(ResourceKind::Csv, "text/csv", None, &["csv"]),
    entry(ResourceKind::Json, "application/json", None, &["json"]),
    entry(ResourceKind::Zip, "application/zip", None, &["zip"]),
    entry(ResourceKind::Png, "image/png", None, &["png"]),
    entry(ResourceKind::Jpeg, "image/jpeg", None, &["jpg", "jpeg"]),
    entry(ResourceKind::Mp4, "video/mp4", None, &["mp4"]),
    entry(ResourceKind::Mkv, "video/x-matroska", None, &["mkv"]),
    entry(ResourceKind::Flv, "video/x-flv", None, &["flv"]),
    entry(ResourceKind::Mov, "video/quicktime", None, &["mov"]),
    entry(ResourceKind::Avi, "video/x-msvideo", None, &["avi"]),
    entry(ResourceKind::Wmv, "video/x-ms-wmv", None, &["wmv"]),
    entry(
        ResourceKind::Docx,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        None,
        &["docx"],
    ),
    entry(
        ResourceKind::Xlsx,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        None,
        &["xlsx"],
    ),
    entry(
        ResourceKind::Pptx,
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        None,
        &["pptx"],
    ),
];

impl ResourceKind {
    fn entry(self) -> &'static KindEntry {
        KIND_TABLE
            .iter()
            .find(|e| e.kind == self)
            .unwrap_or(&KIND_TABLE[0])
    }

    /// Canonical MIME string for this kind.
    pub fn mime_type(self) -> &'static str {
        self.entry().mime_type
    }

    /// Resolve a MIME string (case-insensitive); unknown strings map to `Unknown`.
    pub fn from_mime_type(mime_type: &str) -> Self {
        KIND_TABLE
            .iter()
            .find(|e| e.mime_type.eq_ignore_ascii_case(mime_type))
            .map(|e| e.kind)
            .unwrap_or(Self::Unknown)
    }

    /// Resolve a local file extension; unknown extensions map to `Unknown`.
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        KIND_TABLE
            .iter()
            .find(|e| e.extensions.contains(&ext.as_str()))
            .map(|e| e.kind)
            .unwrap_or(Self::Unknown)
    }

    /// Resolve the kind of a local file name by its extension.
    pub fn from_file_name(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Unknown,
        }
    }

    /// Kind this resource exports to when no target is given.
    pub fn default_export(self) -> Option<ResourceKind> {
        self.entry().default_export
    }

    /// Whether this is a remote-native document that can only be exported.
    pub fn is_exportable(self) -> bool {
        self.default_export().is_some()
    }

    /// Whether this is a folder.
    pub fn is_folder(self) -> bool {
        self == Self::Folder
    }

    /// Whether this kind is a plain file format, usable as an export target.
    pub fn is_file_format(self) -> bool {
        !matches!(self, Self::Unknown | Self::Folder | Self::Shortcut) && !self.is_exportable()
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_one_row() {
        for row in KIND_TABLE {
            let count = KIND_TABLE.iter().filter(|e| e.kind == row.kind).count();
            assert_eq!(count, 1, "{:?} listed {count} times", row.kind);
        }
    }

    #[test]
    fn test_mime_lookup_is_case_insensitive() {
        assert_eq!(
            ResourceKind::from_mime_type("Application/VND.google-apps.FOLDER"),
            ResourceKind::Folder
        );
        assert_eq!(
            ResourceKind::from_mime_type("application/x-never-heard-of-it"),
            ResourceKind::Unknown
        );
    }

    #[test]
    fn test_export_targets() {
        assert_eq!(
            ResourceKind::Document.default_export(),
            Some(ResourceKind::Docx)
        );
        assert!(ResourceKind::Spreadsheet.is_exportable());
        assert!(!ResourceKind::Pdf.is_exportable());
        assert!(!ResourceKind::Folder.is_exportable());
    }

    #[test]
    fn test_file_formats() {
        assert!(ResourceKind::Pdf.is_file_format());
        assert!(ResourceKind::Xlsx.is_file_format());
        assert!(!ResourceKind::Folder.is_file_format());
        assert!(!ResourceKind::Shortcut.is_file_format());
        assert!(!ResourceKind::Document.is_file_format());
        assert!(!ResourceKind::Unknown.is_file_format());
    }

    #[test]
    fn test_extension_lookup() {
        assert_eq!(ResourceKind::from_file_name("clip.MKV"), ResourceKind::Mkv);
        assert_eq!(ResourceKind::from_extension(".jpeg"), ResourceKind::Jpeg);
        assert_eq!(ResourceKind::from_file_name("README"), ResourceKind::Unknown);
    }
}
