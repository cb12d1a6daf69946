//! File payload descriptions.
//!
//! A [`ContentReference`] names the bytes of one uploaded file, taken either
//! from a local path or from an inline string. [`ContentReference::open_content`]
//! is the single place that decides which source applies; validation and
//! hashing both go through it so they can never disagree.

use std::fs::{File, Metadata};
use std::io::{self, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ContentError;
use crate::error_list::ErrorList;
use crate::field::TextField;

/// A file payload backed by exactly one of a local path or inline contents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentReference {
    /// Local file to upload. Counts as set only when non-blank.
    #[serde(default, skip_serializing_if = "TextField::is_unset")]
    pub local_path: TextField,
    /// Inline file contents. Counts as set whenever present, even empty.
    #[serde(default, skip_serializing_if = "TextField::is_unset")]
    pub contents: TextField,
    /// Destination filename; doubles as the payload merge key.
    #[serde(default, skip_serializing_if = "TextField::is_unset")]
    pub filename: TextField,
    /// Permission bits, e.g. `0o755`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
}

/// A rule broken by a [`ContentReference`].
#[derive(Debug, Error)]
pub enum Violation {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("'filename' must be set")]
    MissingFilename,

    #[error("'mode' must be set")]
    MissingMode,
}

/// Readable stream over a payload's bytes. Dropping it releases any file handle.
#[derive(Debug)]
pub enum ContentReader<'a> {
    File(File),
    Inline(&'a [u8]),
}

impl Read for ContentReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.read(buf),
            Self::Inline(bytes) => bytes.read(buf),
        }
    }
}

enum Source<'a> {
    Local(&'a str),
    Inline(&'a str),
}

impl ContentReference {
    /// A string-backed file.
    pub fn inline(filename: impl Into<String>, contents: impl Into<String>, mode: u32) -> Self {
        Self {
            local_path: TextField::Unset,
            contents: TextField::new(Some(contents.into())),
            filename: TextField::new(Some(filename.into())),
            mode: Some(mode),
        }
    }

    /// A path-backed file with explicit metadata.
    pub fn local(path: impl Into<String>, filename: impl Into<String>, mode: u32) -> Self {
        Self {
            local_path: TextField::new(Some(path.into())),
            contents: TextField::Unset,
            filename: TextField::new(Some(filename.into())),
            mode: Some(mode),
        }
    }

    /// A path-backed file whose missing metadata is filled from the filesystem.
    ///
    /// The filename defaults to the path itself and the mode defaults to the
    /// file's permission bits.
    pub fn local_file(
        path: &str,
        filename: Option<&str>,
        mode: Option<u32>,
    ) -> Result<Self, ContentError> {
        if path.trim().is_empty() {
            return Err(ContentError::MissingSource);
        }

        let filename = match filename {
            Some(name) if !name.trim().is_empty() => name,
            _ => path,
        };

        let mode = match mode {
            Some(mode) => mode,
            None => {
                let meta = std::fs::metadata(path).map_err(|e| ContentError::io(path, e))?;
                permission_bits(&meta)
            }
        };

        Ok(Self::local(path, filename, mode))
    }

    /// The merge key, if one was supplied (blank counts as supplied).
    pub fn identifier(&self) -> Option<&str> {
        self.filename.raw()
    }

    fn source(&self) -> Result<Source<'_>, ContentError> {
        match (self.local_path.value(), self.contents.raw()) {
            (Some(_), Some(_)) => Err(ContentError::Conflict),
            (Some(path), None) => Ok(Source::Local(path)),
            (None, Some(contents)) => Ok(Source::Inline(contents)),
            (None, None) => Err(ContentError::MissingSource),
        }
    }

    /// Resolve the payload to a readable stream.
    pub fn open_content(&self) -> Result<ContentReader<'_>, ContentError> {
        match self.source()? {
            Source::Local(path) => File::open(Path::new(path))
                .map(ContentReader::File)
                .map_err(|e| ContentError::io(path, e)),
            Source::Inline(contents) => Ok(ContentReader::Inline(contents.as_bytes())),
        }
    }

    /// Check every rule required of an uploadable payload entry.
    ///
    /// All broken rules are reported together.
    pub fn validate(&self) -> Result<(), ErrorList<Violation>> {
        let mut violations = ErrorList::new();

        if let Err(e) = self.open_content() {
            violations.push(Violation::Content(e));
        }
        if self.filename.is_blank() {
            violations.push(Violation::MissingFilename);
        }
        if self.mode.is_none() {
            violations.push(Violation::MissingMode);
        }

        violations.into_result()
    }
}

#[cfg(unix)]
fn permission_bits(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(meta: &Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read_all(reference: &ContentReference) -> Vec<u8> {
        let mut buf = Vec::new();
        reference.open_content().unwrap().read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn inline_contents_are_streamed() {
        let r = ContentReference::inline("a.txt", "hello", 0o644);
        assert_eq!(read_all(&r), b"hello");
    }

    #[test]
    fn empty_inline_contents_count_as_a_source() {
        let r = ContentReference::inline("empty", "", 0o644);
        assert!(r.validate().is_ok());
        assert!(read_all(&r).is_empty());
    }

    #[test]
    fn both_sources_conflict() {
        let r = ContentReference {
            local_path: "/etc/hosts".into(),
            contents: "x".into(),
            ..ContentReference::default()
        };
        assert!(matches!(r.open_content(), Err(ContentError::Conflict)));
    }

    #[test]
    fn neither_source_is_missing() {
        let r = ContentReference::default();
        assert!(matches!(r.open_content(), Err(ContentError::MissingSource)));
    }

    #[test]
    fn blank_local_path_is_not_a_source() {
        let r = ContentReference {
            local_path: "   ".into(),
            contents: "data".into(),
            filename: "f".into(),
            mode: Some(0o600),
        };
        assert_eq!(read_all(&r), b"data");
    }

    #[test]
    fn missing_local_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.sh");
        let r = ContentReference::local(missing.to_string_lossy(), "nope.sh", 0o755);
        match r.open_content() {
            Err(ContentError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Io error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn local_file_is_streamed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"#!/bin/sh\necho hi\n").unwrap();
        let r = ContentReference::local(file.path().to_string_lossy(), "run.sh", 0o755);
        assert_eq!(read_all(&r), b"#!/bin/sh\necho hi\n");
    }

    #[test]
    fn validate_reports_every_violation() {
        let r = ContentReference {
            contents: "x".into(),
            ..ContentReference::default()
        };
        let errs = r.validate().unwrap_err();
        assert_eq!(errs.len(), 2);
        let rendered = errs.to_string();
        assert!(rendered.contains("'filename' must be set"));
        assert!(rendered.contains("'mode' must be set"));
    }

    #[test]
    fn validate_reports_source_and_metadata_together() {
        let r = ContentReference {
            filename: "  ".into(),
            ..ContentReference::default()
        };
        let errs: Vec<_> = r.validate().unwrap_err().into_vec();
        assert_eq!(errs.len(), 3);
        assert!(matches!(errs[0], Violation::Content(ContentError::MissingSource)));
        assert!(matches!(errs[1], Violation::MissingFilename));
        assert!(matches!(errs[2], Violation::MissingMode));
    }

    #[test]
    fn local_file_defaults_filename_and_mode() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let r = ContentReference::local_file(&path, None, None).unwrap();
        assert_eq!(r.identifier(), Some(path.as_str()));
        assert!(r.mode.is_some());
        assert!(r.validate().is_ok());
    }

    #[test]
    fn local_file_keeps_explicit_metadata() {
        let r = ContentReference::local_file("/does/not/matter", Some("app.sh"), Some(0o700)).unwrap();
        assert_eq!(r.identifier(), Some("app.sh"));
        assert_eq!(r.mode, Some(0o700));
    }

    #[test]
    fn local_file_requires_a_path() {
        assert!(matches!(
            ContentReference::local_file(" ", None, Some(0o644)),
            Err(ContentError::MissingSource)
        ));
    }

    #[test]
    fn serde_uses_camel_case_and_omits_unset_fields() {
        let r = ContentReference::local("/tmp/x", "x", 0o644);
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"localPath": "/tmp/x", "filename": "x", "mode": 420})
        );
        let back: ContentReference = serde_json::from_value(value).unwrap();
        assert_eq!(back, r);
    }
}
