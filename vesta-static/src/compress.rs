//! Response compression
//!
//! Content negotiation on Accept-Encoding, pre-compressed sidecar lookup,
//! and on-the-fly encoding through async-compression.

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use vesta_core::Result;

/// Supported content codings, in preference order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encoding {
    Brotli,
    Zstd,
    Gzip,
}

impl Encoding {
    /// All codings in negotiation preference order (ratio, then speed)
    pub const PREFERENCE: [Encoding; 3] = [Encoding::Brotli, Encoding::Zstd, Encoding::Gzip];

    /// The Content-Encoding header value
    pub fn token(&self) -> &'static str {
        match self {
            Encoding::Brotli => "br",
            Encoding::Zstd => "zstd",
            Encoding::Gzip => "gzip",
        }
    }

    /// The pre-compressed sidecar extension
    pub fn sidecar_ext(&self) -> &'static str {
        match self {
            Encoding::Brotli => ".br",
            Encoding::Zstd => ".zst",
            Encoding::Gzip => ".gz",
        }
    }
}

/// Pick the preferred coding the client accepts (token containment)
pub fn negotiate(accept_encoding: Option<&str>) -> Option<Encoding> {
    let accept = accept_encoding?;
    Encoding::PREFERENCE
        .into_iter()
        .find(|enc| accept.contains(enc.token()))
}

/// Whether a MIME type is worth compressing. Formats that are already
/// entropy-coded only waste CPU.
pub fn is_compressible(mime_type: &str) -> bool {
    let essence = mime_type.split(';').next().unwrap_or(mime_type).trim();
    if essence.starts_with("text/") {
        return true;
    }
    matches!(
        essence,
        "application/json"
            | "application/javascript"
            | "application/xml"
            | "application/xhtml+xml"
            | "application/rss+xml"
            | "application/atom+xml"
            | "application/wasm"
            | "image/svg+xml"
    )
}

/// Try to load a pre-compressed sidecar (`file.ext.br` etc.) for the
/// client's accepted codings, best coding first.
pub async fn try_precompressed(
    original: &Path,
    accept_encoding: Option<&str>,
) -> Option<(Vec<u8>, Encoding)> {
    let accept = accept_encoding?;

    for enc in Encoding::PREFERENCE {
        if !accept.contains(enc.token()) {
            continue;
        }

        let mut sidecar = original.as_os_str().to_owned();
        sidecar.push(enc.sidecar_ext());
        let sidecar = PathBuf::from(sidecar);

        if let Ok(content) = tokio::fs::read(&sidecar).await {
            tracing::debug!("✅ Using pre-compressed sidecar: {}", sidecar.display());
            return Some((content, enc));
        }
    }

    None
}

/// Encode a body with the given coding
pub async fn encode(input: &[u8], encoding: Encoding) -> Result<Vec<u8>> {
    use async_compression::tokio::write::{BrotliEncoder, GzipEncoder, ZstdEncoder};

    match encoding {
        Encoding::Brotli => {
            let mut encoder = BrotliEncoder::new(Vec::new());
            encoder.write_all(input).await?;
            encoder.shutdown().await?;
            Ok(encoder.into_inner())
        }
        Encoding::Zstd => {
            let mut encoder = ZstdEncoder::new(Vec::new());
            encoder.write_all(input).await?;
            encoder.shutdown().await?;
            Ok(encoder.into_inner())
        }
        Encoding::Gzip => {
            let mut encoder = GzipEncoder::new(Vec::new());
            encoder.write_all(input).await?;
            encoder.shutdown().await?;
            Ok(encoder.into_inner())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiation_preference() {
        assert_eq!(negotiate(Some("gzip, br, zstd")), Some(Encoding::Brotli));
        assert_eq!(negotiate(Some("gzip, zstd")), Some(Encoding::Zstd));
        assert_eq!(negotiate(Some("gzip, deflate")), Some(Encoding::Gzip));
        assert_eq!(negotiate(Some("identity")), None);
        assert_eq!(negotiate(None), None);
    }

    #[test]
    fn test_compressible_types() {
        assert!(is_compressible("text/html"));
        assert!(is_compressible("text/html; charset=utf-8"));
        assert!(is_compressible("application/json"));
        assert!(is_compressible("image/svg+xml"));
        assert!(!is_compressible("image/png"));
        assert!(!is_compressible("video/mp4"));
        assert!(!is_compressible("application/zip"));
    }

    #[tokio::test]
    async fn test_gzip_roundtrip_magic() {
        let body = b"hello hello hello hello hello";
        let encoded = encode(body, Encoding::Gzip).await.unwrap();
        // Gzip magic bytes
        assert_eq!(&encoded[..2], &[0x1f, 0x8b]);
    }

    #[tokio::test]
    async fn test_precompressed_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.js");
        std::fs::write(&path, "console.log(1)").unwrap();
        std::fs::write(dir.path().join("app.js.gz"), b"gzipped-bytes").unwrap();

        let hit = try_precompressed(&path, Some("gzip")).await;
        assert_eq!(hit, Some((b"gzipped-bytes".to_vec(), Encoding::Gzip)));

        // Accepted coding without a sidecar on disk
        assert_eq!(try_precompressed(&path, Some("br")).await, None);
        assert_eq!(try_precompressed(&path, None).await, None);
    }
}
