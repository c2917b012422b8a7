use bytes::{Buf, BytesMut};
use std::io;
use tokio_util::codec::Decoder;

/// Transcodes a byte stream in some charset to UTF-8. Malformed sequences
/// become U+FFFD rather than failing the read.
pub struct CharsetDecoder {
    inner: encoding_rs::Decoder,
}

impl CharsetDecoder {
    pub fn new(encoding: &'static encoding_rs::Encoding) -> Self {
        Self {
            inner: encoding.new_decoder(),
        }
    }

    fn transcode(&mut self, src: &mut BytesMut, last: bool) -> Option<BytesMut> {
        let capacity = self
            .inner
            .max_utf8_buffer_length(src.len())
            .unwrap_or_else(|| src.len() * 3 + 16);
        let mut out = vec![0u8; capacity];
        let (_result, read, written, _replaced) = self.inner.decode_to_utf8(src, &mut out, last);
        src.advance(read);
        (written > 0).then(|| BytesMut::from(&out[..written]))
    }
}

impl Decoder for CharsetDecoder {
    type Item = BytesMut;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        Ok(self.transcode(src, false))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if buf.is_empty() {
            return Ok(None);
        }
        let out = self.transcode(buf, true);
        buf.clear();
        Ok(out)
    }
}
