// Content-type detection for uploads.
//
// Two strategies sit behind `MimeClassifier`: a content sniffer (cargo
// feature `sniff`) and a fixed extension table. `detect` picks the best one
// compiled into this binary. Both are best effort; `None` leaves the choice
// of content type to the HTTP layer.

use std::path::Path;

pub trait MimeClassifier {
    /// Short name used in debug logs.
    fn name(&self) -> &'static str;

    fn classify(&self, path: &Path) -> Option<String>;
}

/// Maps a handful of media extensions to the types the relay expects.
/// Matching is case-sensitive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtensionClassifier;

impl ExtensionClassifier {
    fn lookup(path: &Path) -> Option<&'static str> {
        let ext = path.extension()?.to_str()?;
        let mime = match ext {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "mp4" | "mpeg4" => "video/mp4",
            "mp3" => "audio/mpeg",
            "m4a" => "audio/m4a",
            "ogg" => "audio/ogg",
            _ => return None,
        };
        Some(mime)
    }
}

impl MimeClassifier for ExtensionClassifier {
    fn name(&self) -> &'static str {
        "extension"
    }

    fn classify(&self, path: &Path) -> Option<String> {
        Self::lookup(path).map(str::to_string)
    }
}

/// Reads the file's magic signature. Unrecognised content (plain text, for
/// one) falls through to the extension table.
#[cfg(feature = "sniff")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SniffingClassifier;

#[cfg(feature = "sniff")]
impl MimeClassifier for SniffingClassifier {
    fn name(&self) -> &'static str {
        "sniffing"
    }

    fn classify(&self, path: &Path) -> Option<String> {
        match infer::get_from_path(path) {
            Ok(Some(kind)) => Some(kind.mime_type().to_string()),
            Ok(None) => ExtensionClassifier.classify(path),
            Err(e) => {
                log::debug!("could not sniff {}: {}", path.display(), e);
                ExtensionClassifier.classify(path)
            }
        }
    }
}

/// Best classifier available in this build.
pub fn detect() -> Box<dyn MimeClassifier> {
    #[cfg(feature = "sniff")]
    {
        Box::new(SniffingClassifier)
    }
    #[cfg(not(feature = "sniff"))]
    {
        Box::new(ExtensionClassifier)
    }
}
