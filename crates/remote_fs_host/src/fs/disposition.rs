//! `Content-Disposition` filename extraction for downloads.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

use super::types::DEFAULT_DOWNLOAD_FILENAME;

/// Extracts a download filename from a `Content-Disposition` header value.
///
/// `filename*=` (RFC 5987, percent-encoded) wins over `filename=`. Quoted and bare values are
/// accepted. Directory components are stripped; an absent or empty result yields `None`.
pub fn parse_content_disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in split_params(header).into_iter().skip(1) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => extended = decode_extended_value(value),
            "filename" => plain = Some(unquote(value)),
            _ => {}
        }
    }

    extended
        .or(plain)
        .map(|name| strip_directories(&name).to_string())
        .filter(|name| !name.is_empty())
}

/// Returns the filename from an optional header, falling back to [`DEFAULT_DOWNLOAD_FILENAME`].
pub fn download_filename(header: Option<&str>) -> String {
    header
        .and_then(parse_content_disposition_filename)
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_FILENAME.to_string())
}

// Splits on `;` outside quoted strings so quoted values may contain separators.
fn split_params(header: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (idx, ch) in header.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                params.push(&header[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    params.push(&header[start..]);
    params
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

// charset'language'percent-encoded-value
fn decode_extended_value(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;
    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }
    percent_decode(encoded)
}

fn percent_decode(encoded: &str) -> Option<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .ok()
        .map(Cow::into_owned)
}

fn strip_directories(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}
