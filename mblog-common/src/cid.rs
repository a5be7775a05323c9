//! Content identifier helpers
//!
//! Gateways expose pinned objects as `https://{gateway}/ipfs/{cid}`. The CID of
//! an upload is recovered from the URL path: the segment after `ipfs`, or the
//! last path segment for gateways that use another layout. The host is never
//! treated as a CID.

use url::Url;

const IPFS_SEGMENT: &str = "ipfs";

/// Extract the content identifier from a gateway URL
///
/// Returns `None` when the path carries no usable identifier, including
/// subdomain gateways (`https://{cid}.ipfs.dweb.link/`) whose path is empty.
pub fn extract_content_id(gateway_url: &str) -> Option<String> {
    let raw = gateway_url.trim();
    let url = match Url::parse(raw) {
        Ok(url) => url,
        // A bare CID is accepted as-is
        Err(url::ParseError::RelativeUrlWithoutBase) if is_bare_cid(raw) => {
            return Some(raw.to_string());
        }
        Err(_) => return None,
    };

    let segments: Vec<&str> = url
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .collect();

    let candidate = match segments.iter().rposition(|s| *s == IPFS_SEGMENT) {
        // Path inside a pinned directory is not part of the CID
        Some(pos) => segments.get(pos + 1).copied(),
        None => segments.last().copied(),
    }?;

    if candidate.contains(':') {
        None
    } else {
        Some(candidate.to_string())
    }
}

fn is_bare_cid(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Build the gateway URL for a CID
///
/// `gateway` may be a bare domain (`example.mypinata.cloud`) or a full base URL.
pub fn gateway_url(gateway: &str, cid: &str) -> String {
    let base = gateway.trim().trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        format!("{}/{}/{}", base, IPFS_SEGMENT, cid)
    } else {
        format!("https://{}/{}/{}", base, IPFS_SEGMENT, cid)
    }
}
