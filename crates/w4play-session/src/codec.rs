//! Text compression for storage records and share links.
//!
//! Both encodings are LZ-String compatible, so records and links written
//! by the browser playground decode here and vice versa.

/// Compress for a storage record.
pub fn compress_to_base64(text: &str) -> String {
    lz_str::compress_to_base64(text)
}

/// Decompress a storage record. `None` if the record is not valid.
pub fn decompress_from_base64(encoded: &str) -> Option<String> {
    if encoded.is_empty() {
        return None;
    }
    let wide = lz_str::decompress_from_base64(encoded)?;
    String::from_utf16(&wide).ok()
}

/// Compress for use as a URL query or fragment value.
pub fn compress_to_uri_component(text: &str) -> String {
    lz_str::compress_to_encoded_uri_component(text)
}

/// Decompress a share-link value. `None` if the value is not valid.
pub fn decompress_from_uri_component(encoded: &str) -> Option<String> {
    if encoded.is_empty() {
        return None;
    }
    // Query decoding turns the alphabet's `+` into a space.
    let restored = encoded.replace(' ', "+");
    let wide = lz_str::decompress_from_encoded_uri_component(restored.as_str())?;
    String::from_utf16(&wide).ok()
}
