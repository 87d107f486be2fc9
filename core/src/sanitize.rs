// ABOUTME: Percent-encoding helpers for values embedded in daemon requests
// ABOUTME: Also the single normalization applied to both sides of the device URL comparison

fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~')
}

/// Escapes a caller-supplied path component so it cannot smuggle extra
/// path segments or query text into the forwarded daemon request.
pub fn path_component(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Normalizes a device URL: every byte outside the unreserved set and
/// the URL separators `/:?&%` is percent-encoded. Keeping `%` verbatim
/// makes the function idempotent, so a value that arrives pre-encoded
/// compares equal to its raw configured counterpart once both sides go
/// through this normalization.
pub fn device_url(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if is_unreserved(c) || matches!(c, '/' | ':' | '?' | '&' | '%') {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).as_bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    out
}
