//! `multipart/related` bodies for metadata-plus-content uploads.

use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::{self, Stream};

use drivepath_core::types::TransferCallbacks;

/// Bytes per chunk when streaming an upload body.
pub const UPLOAD_CHUNK: usize = 256 * 1024;

/// A fully assembled multipart body.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    /// Value for the `Content-Type` header.
    pub content_type: String,
    /// Encoded body.
    pub body: Bytes,
}

/// Assemble a metadata part (JSON) and a content part.
pub fn related(metadata_json: &[u8], content: &[u8], content_type: &str) -> MultipartBody {
    let boundary = format!("drivepath-{}", uuid::Uuid::new_v4().simple());
    let mut body = BytesMut::with_capacity(metadata_json.len() + content.len() + 256);

    body.put_slice(format!("--{boundary}\r\n").as_bytes());
    body.put_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.put_slice(metadata_json);
    body.put_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.put_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.put_slice(content);
    body.put_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    MultipartBody {
        content_type: format!("multipart/related; boundary={boundary}"),
        body: body.freeze(),
    }
}

/// Chunk a body into a stream that reports progress as each chunk is read.
pub fn progress_stream(
    body: Bytes,
    callbacks: TransferCallbacks,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let total = body.len() as u64;
    let chunks: Vec<Bytes> = (0..body.len())
        .step_by(UPLOAD_CHUNK)
        .map(|start| body.slice(start..(start + UPLOAD_CHUNK).min(body.len())))
        .collect();

    let mut sent = 0u64;
    stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        callbacks.progress(sent, Some(total));
        Ok(chunk)
    })
}
