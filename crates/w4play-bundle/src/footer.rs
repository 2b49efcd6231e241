//! The metadata trailer read by the native loader.
//!
//! Layout, all integers little-endian:
//!
//! | offset | size | field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 4    | magic, `b"CART"`                        |
//! | 4      | 128  | title, NUL padded, at most 123 bytes   |
//! | 132    | 4    | module length in bytes                 |

/// Total footer size.
pub const FOOTER_LEN: usize = 136;

/// `b"CART"` read as a little-endian `u32`.
pub const MAGIC: u32 = 1414676803;

/// Title stamped into bundles from this playground.
pub const DEFAULT_TITLE: &str = "Made with wasm4-playground";

const TITLE_OFFSET: usize = 4;
const TITLE_CAPACITY: usize = 123;
const LENGTH_OFFSET: usize = 132;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub title: String,
    pub module_len: u32,
}

impl Footer {
    pub fn new(title: impl Into<String>, module_len: u32) -> Self {
        Self {
            title: title.into(),
            module_len,
        }
    }

    /// Encode to exactly [`FOOTER_LEN`] bytes. Titles longer than the field
    /// are cut at the last character boundary that fits.
    pub fn to_bytes(&self) -> [u8; FOOTER_LEN] {
        let mut bytes = [0u8; FOOTER_LEN];
        bytes[..TITLE_OFFSET].copy_from_slice(&MAGIC.to_le_bytes());

        let title = truncate(&self.title, TITLE_CAPACITY);
        bytes[TITLE_OFFSET..TITLE_OFFSET + title.len()].copy_from_slice(title.as_bytes());

        bytes[LENGTH_OFFSET..].copy_from_slice(&self.module_len.to_le_bytes());
        bytes
    }

    /// Read the footer from the tail of a bundle.
    pub fn parse(bundle: &[u8]) -> Option<Footer> {
        let start = bundle.len().checked_sub(FOOTER_LEN)?;
        let raw = &bundle[start..];

        let magic = u32::from_le_bytes(raw[..TITLE_OFFSET].try_into().ok()?);
        if magic != MAGIC {
            return None;
        }

        let field = &raw[TITLE_OFFSET..LENGTH_OFFSET];
        let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
        let title = String::from_utf8_lossy(&field[..end]).into_owned();
        let module_len = u32::from_le_bytes(raw[LENGTH_OFFSET..].try_into().ok()?);

        Some(Footer { title, module_len })
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
