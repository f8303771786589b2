//! MIME types guessed from file extensions.
//!
//! The table is a starting point built from the common types list on MDN, not
//! a complete registry. Some entries are ambiguous: `.mid` may also be
//! `audio/x-midi`, `.3gp`/`.3g2` are `audio/*` when the file has no video, and
//! `.xml` is `text/xml` in some older software.

use std::path::Path;

/// Fallback for unrecognized text files.
pub const MIME_DEFAULT_TEXT: &str = "text/plain";

/// Fallback for unrecognized binary files.
pub const MIME_DEFAULT_BINARY: &str = "application/octet-stream";

/// Lowercase extension (with leading dot) to MIME type, sorted by extension.
static MIME_TYPES: &[(&str, &str)] = &[
    (".3g2", "video/3gpp2"),
    (".3gp", "video/3gpp"),
    (".7z", "application/x-7z-compressed"),
    (".aac", "audio/aac"),
    (".abw", "application/x-abiword"),
    (".arc", "application/x-freearc"),
    (".avi", "video/x-msvideo"),
    (".azw", "application/vnd.amazon.ebook"),
    (".bin", "application/octet-stream"),
    (".bmp", "image/bmp"),
    (".bz", "application/x-bzip"),
    (".bz2", "application/x-bzip2"),
    (".cda", "application/x-cdf"),
    (".csh", "application/x-csh"),
    (".css", "text/css"),
    (".csv", "text/csv"),
    (".doc", "application/msword"),
    (".docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    (".eot", "application/vnd.ms-fontobject"),
    (".epub", "application/epub+zip"),
    (".gif", "image/gif"),
    (".gz", "application/gzip"),
    (".htm", "text/html"),
    (".html", "text/html"),
    (".ico", "image/vnd.microsoft.icon"),
    (".ics", "text/calendar"),
    (".jar", "application/java-archive"),
    (".jpeg", "image/jpeg"),
    (".jpg", "image/jpeg"),
    (".js", "text/javascript"),
    (".json", "application/json"),
    (".jsonld", "application/ld+json"),
    (".mid", "audio/midi"),
    (".midi", "audio/midi"),
    (".mjs", "text/javascript"),
    (".mp3", "audio/mpeg"),
    (".mp4", "video/mp4"),
    (".mpeg", "video/mpeg"),
    (".mpkg", "application/vnd.apple.installer+xml"),
    (".odp", "application/vnd.oasis.opendocument.presentation"),
    (".ods", "application/vnd.oasis.opendocument.spreadsheet"),
    (".odt", "application/vnd.oasis.opendocument.text"),
    (".oga", "audio/ogg"),
    (".ogv", "video/ogg"),
    (".ogx", "application/ogg"),
    (".opus", "audio/opus"),
    (".otf", "font/otf"),
    (".pdf", "application/pdf"),
    (".php", "application/x-httpd-php"),
    (".png", "image/png"),
    (".ppt", "application/vnd.ms-powerpoint"),
    (".pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    (".rar", "application/vnd.rar"),
    (".rtf", "application/rtf"),
    (".sh", "application/x-sh"),
    (".svg", "image/svg+xml"),
    (".swf", "application/x-shockwave-flash"),
    (".tar", "application/x-tar"),
    (".tif", "image/tiff"),
    (".tiff", "image/tiff"),
    (".ts", "video/mp2t"),
    (".ttf", "font/ttf"),
    (".txt", "text/plain"),
    (".vsd", "application/vnd.visio"),
    (".wav", "audio/wav"),
    (".weba", "audio/webm"),
    (".webm", "video/webm"),
    (".webp", "image/webp"),
    (".woff", "font/woff"),
    (".woff2", "font/woff2"),
    (".xhtml", "application/xhtml+xml"),
    (".xls", "application/vnd.ms-excel"),
    (".xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    (".xml", "application/xml"),
    (".xul", "application/vnd.mozilla.xul+xml"),
    (".zip", "application/zip"),
];

/// Look up an extension such as `".json"`. Case-insensitive; the leading dot
/// is required.
pub fn mime_type(extension: &str) -> Option<&'static str> {
    let key = extension.to_lowercase();
    MIME_TYPES
        .binary_search_by(|(ext, _)| (*ext).cmp(key.as_str()))
        .ok()
        .map(|index| MIME_TYPES[index].1)
}

/// Guess the MIME type of `filename` from its final extension.
///
/// Returns `None` when the extension is missing or unknown; callers usually
/// fall back to [`MIME_DEFAULT_TEXT`] or [`MIME_DEFAULT_BINARY`].
pub fn guess_mime(filename: &str) -> Option<&'static str> {
    let extension = Path::new(filename).extension()?.to_str()?;
    mime_type(&format!(".{extension}"))
}
