use std::io::{self, Read};

use runner_types::{ContentDigest, ContentError, ContentReference};

/// Domain-separated, streaming BLAKE3 content hasher.
///
/// Each hasher carries a domain tag that is fed to the digest before the
/// content, so digests from different domains never collide. Content is read
/// through [`std::io::copy`] and never buffered whole.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for file payload contents.
    pub const PAYLOAD: Self = Self {
        domain: "runner-payload-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    fn start(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }

    /// Hash in-memory bytes.
    pub fn hash_bytes(&self, data: &[u8]) -> ContentDigest {
        let mut hasher = self.start();
        hasher.update(data);
        ContentDigest::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash everything `reader` yields in one streaming pass.
    pub fn hash_reader<R: Read + ?Sized>(&self, reader: &mut R) -> io::Result<ContentDigest> {
        let mut hasher = self.start();
        io::copy(reader, &mut hasher)?;
        Ok(ContentDigest::from_hash(*hasher.finalize().as_bytes()))
    }

    /// Hash the payload a [`ContentReference`] resolves to.
    ///
    /// The content stream is dropped before returning on every path.
    pub fn hash_reference(&self, reference: &ContentReference) -> Result<ContentDigest, HashError> {
        let mut reader = reference
            .open_content()
            .map_err(|source| HashError::new(reference, source))?;

        self.hash_reader(&mut reader).map_err(|e| {
            let origin = reference.local_path.value().unwrap_or("<inline>");
            HashError::new(reference, ContentError::io(origin, e))
        })
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Hashing of payload descriptions with the payload domain.
pub trait ContentHash {
    fn content_hash(&self) -> Result<ContentDigest, HashError>;
}

impl ContentHash for ContentReference {
    fn content_hash(&self) -> Result<ContentDigest, HashError> {
        ContentHasher::PAYLOAD.hash_reference(self)
    }
}

/// A payload entry whose digest could not be computed.
#[derive(Debug, thiserror::Error)]
#[error(
    "failed to calculate hash for {}: {source}",
    .filename.as_deref().unwrap_or("<unnamed>")
)]
pub struct HashError {
    pub filename: Option<String>,
    #[source]
    pub source: ContentError,
}

impl HashError {
    fn new(reference: &ContentReference, source: ContentError) -> Self {
        Self {
            filename: reference.identifier().map(str::to_string),
            source,
        }
    }
}
