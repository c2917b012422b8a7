use crate::codec::CharsetDecoder;
use crate::CsvResult;
use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, BufReader};
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;

const READ_BUFFER: usize = 1 << 20;

/// How the raw bytes of a source are compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

/// What we know about a source before reading it.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// e.g. "application/gzip" or "text/csv"
    pub content_type: String,
    /// e.g. "gzip", "zstd" or empty
    pub content_encoding: String,
    /// file name, used as the last resort for compression detection
    pub name_hint: String,
    /// charset of the decompressed bytes
    pub charset: &'static encoding_rs::Encoding,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            content_type: String::new(),
            content_encoding: String::new(),
            name_hint: String::new(),
            charset: encoding_rs::UTF_8,
        }
    }
}

impl SourceMeta {
    /// Fill in type/encoding from a file name's extension.
    pub fn from_name(name: &str) -> Self {
        let mut meta = Self {
            name_hint: name.to_string(),
            ..Default::default()
        };
        match Path::new(name).extension().and_then(|s| s.to_str()) {
            Some("gz") => {
                meta.content_type = "application/gzip".into();
                meta.content_encoding = "gzip".into();
            }
            Some("zst") => {
                meta.content_type = "application/zstd".into();
                meta.content_encoding = "zstd".into();
            }
            _ => meta.content_type = "text/csv".into(),
        }
        meta
    }

    /// Decide compression: content encoding, then content type, then file name.
    pub fn compression(&self) -> Compression {
        let ce = self.content_encoding.to_ascii_lowercase();
        let ct = self.content_type.to_ascii_lowercase();
        let encoded = |name: &str| ce.split(',').any(|s| s.trim() == name);

        if encoded("gzip")
            || matches!(ct.as_str(), "application/gzip" | "application/x-gzip")
            || self.name_hint.ends_with(".gz")
        {
            Compression::Gzip
        } else if encoded("zstd") || ct == "application/zstd" || self.name_hint.ends_with(".zst") {
            Compression::Zstd
        } else {
            Compression::None
        }
    }
}

/// Wrap a raw reader with decompression and UTF-8 transcoding as `meta`
/// demands. The result feeds [`crate::CsvParser::parse_reader`].
pub fn build_line_reader<R>(raw: R, meta: &SourceMeta) -> Box<dyn AsyncRead + Unpin + Send>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buf = BufReader::with_capacity(READ_BUFFER, raw);
    let decompressed: Box<dyn AsyncRead + Unpin + Send> = match meta.compression() {
        Compression::Gzip => Box::new(GzipDecoder::new(buf)),
        Compression::Zstd => Box::new(ZstdDecoder::new(buf)),
        Compression::None => Box::new(buf),
    };

    if meta.charset == encoding_rs::UTF_8 {
        decompressed
    } else {
        let framed = FramedRead::new(decompressed, CharsetDecoder::new(meta.charset));
        Box::new(StreamReader::new(framed))
    }
}

/// Open a local file as a line source, guessing compression from its extension.
pub async fn source_from_path(
    path: &Path,
    charset: &'static encoding_rs::Encoding,
) -> CsvResult<(Box<dyn AsyncRead + Unpin + Send>, SourceMeta)> {
    let file = File::open(path).await?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let meta = SourceMeta {
        charset,
        ..SourceMeta::from_name(name)
    };
    Ok((build_line_reader(file, &meta), meta))
}
