//! Document file downloads

use super::Client;
use crate::error::{Error, Result};
use crate::http::RequestConfig;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, Response};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Details of a completed download
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    /// MIME type such as `application/pdf`
    pub content_type: String,
    /// Content type parameters such as `charset`
    pub content_type_params: BTreeMap<String, String>,
    /// File name suggested by the server, without directories
    pub filename: Option<String>,
    /// Bytes written
    pub length: u64,
}

impl Client {
    /// The file as originally consumed.
    ///
    /// The body is written to `out`. A connection dropped early shows up as a
    /// short `length`; compare against [`Client::get_document_metadata`].
    pub async fn download_original<W>(
        &self,
        id: i64,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<DownloadResult>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let config = RequestConfig::new().query("original", "true");
        self.download(&format!("api/documents/{id}/download/"), config, true, out, cancel)
            .await
    }

    /// The archived PDF/A rendition; servers without one send the original
    pub async fn download_archived<W>(
        &self,
        id: i64,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<DownloadResult>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.download(
            &format!("api/documents/{id}/download/"),
            RequestConfig::new(),
            true,
            out,
            cancel,
        )
        .await
    }

    /// Preview image
    pub async fn download_thumbnail<W>(
        &self,
        id: i64,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<DownloadResult>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.download(
            &format!("api/documents/{id}/thumb/"),
            RequestConfig::new(),
            false,
            out,
            cancel,
        )
        .await
    }

    async fn download<W>(
        &self,
        path: &str,
        config: RequestConfig,
        expect_disposition: bool,
        out: &mut W,
        cancel: &CancellationToken,
    ) -> Result<DownloadResult>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut response = self.http.request(Method::GET, path, config, cancel).await?;

        let mut result = describe(&response, path, expect_disposition)?;
        result.length = copy_body(&mut response, out, cancel).await?;

        Ok(result)
    }
}

fn describe(response: &Response, path: &str, expect_disposition: bool) -> Result<DownloadResult> {
    let headers = response.headers();

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let (content_type, content_type_params) = parse_media_type(content_type)
        .ok_or_else(|| Error::decode(format!("invalid content-type header {content_type:?}")))?;

    let mut filename = None;

    match headers.get(CONTENT_DISPOSITION).and_then(|value| value.to_str().ok()) {
        None => {
            if expect_disposition {
                warn!(path, "Missing Content-Disposition header");
            }
        }
        Some(disposition) => match parse_media_type(disposition) {
            None => warn!(path, disposition, "Unparseable Content-Disposition header"),
            Some((_, params)) => {
                filename = params
                    .get("filename")
                    .and_then(|name| Path::new(name).file_name())
                    .map(|name| name.to_string_lossy().into_owned());
            }
        },
    }

    Ok(DownloadResult {
        content_type,
        content_type_params,
        filename,
        length: 0,
    })
}

async fn copy_body<W>(response: &mut Response, out: &mut W, cancel: &CancellationToken) -> Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut length = 0u64;

    loop {
        let chunk = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            chunk = response.chunk() => chunk?,
        };

        let Some(chunk) = chunk else { break };
        out.write_all(&chunk).await?;
        length += chunk.len() as u64;
    }

    out.flush().await?;
    Ok(length)
}

/// Split a header such as `text/plain; charset=utf-8` or
/// `attachment; filename="a b.pdf"` into its lower-cased leading token and
/// parameters. Parameter names are lower-cased; quoted values are unescaped.
pub fn parse_media_type(value: &str) -> Option<(String, BTreeMap<String, String>)> {
    let (kind, mut rest) = match value.split_once(';') {
        Some((kind, rest)) => (kind, rest),
        None => (value, ""),
    };

    let kind = kind.trim();
    if kind.is_empty() || kind.contains(char::is_whitespace) {
        return None;
    }

    let mut params = BTreeMap::new();

    loop {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }

        let (name, after) = rest.split_once('=')?;
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            return None;
        }

        let after = after.trim_start();
        let (param, remainder) = if let Some(quoted) = after.strip_prefix('"') {
            unquote(quoted)?
        } else {
            let end = after.find(';').unwrap_or(after.len());
            (after[..end].trim().to_string(), &after[end..])
        };

        params.insert(name, param);
        rest = remainder;
    }

    Some((kind.to_ascii_lowercase(), params))
}

/// Read a quoted string up to its closing quote, returning the value and
/// the text after it
fn unquote(text: &str) -> Option<(String, &str)> {
    let mut value = String::new();
    let mut chars = text.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => value.push(chars.next()?.1),
            '"' => return Some((value, &text[i + 1..])),
            _ => value.push(c),
        }
    }

    None
}
