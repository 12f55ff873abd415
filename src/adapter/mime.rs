//! MIME type detection
//!
//! The adapter treats detection as a pluggable service. The default sniffs the
//! content with `infer` and falls back to the file extension.

use std::path::Path;

/// Fallback when neither content nor extension say anything useful.
pub const DEFAULT_MIMETYPE: &str = "text/plain";

/// Guesses a MIME type from a location and (a prefix of) its content.
pub trait MimeTypeDetector: Send + Sync {
    fn detect(&self, location: &Path, content: &[u8]) -> String;
}

/// Content sniffing with an extension table fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSniffer;

impl MimeTypeDetector for ContentSniffer {
    fn detect(&self, location: &Path, content: &[u8]) -> String {
        infer::get(content)
            .map(|kind| kind.mime_type().to_string())
            .or_else(|| by_extension(location).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_MIMETYPE.to_string())
    }
}

fn by_extension(location: &Path) -> Option<&'static str> {
    let extension = location.extension()?.to_str()?.to_ascii_lowercase();
    let mimetype = match extension.as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/yaml",
        "toml" => "application/toml",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mimetype)
}
