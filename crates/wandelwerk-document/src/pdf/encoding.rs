// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// WinAnsiEncoding for the standard 14 faces.
//
// The code table is lopdf's own, so bytes written here decode to the same
// characters when a page is read back. Characters the encoding cannot hold
// are written as '?'.

use std::collections::HashMap;
use std::sync::LazyLock;

use lopdf::{Document, dictionary};

/// Byte written for a character WinAnsi has no code for.
pub const SUBSTITUTE: u8 = b'?';

/// lopdf also maps the unassigned codes 0x7F, 0x81, 0x8D, 0x8F, 0x90 and
/// 0x9D to the bullet; only 0x95 is its real slot.
const BULLET: (char, u8) = ('\u{2022}', 0x95);

struct WinAnsi {
    chars: [Option<char>; 256],
    codes: HashMap<char, u8>,
}

static WIN_ANSI: LazyLock<WinAnsi> = LazyLock::new(|| {
    let font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "Encoding" => "WinAnsiEncoding",
    };
    let mut chars = [None; 256];
    let mut codes = HashMap::new();
    if let Ok(encoding) = font.get_font_encoding(&Document::new()) {
        for code in 0..=u8::MAX {
            let decoded = Document::decode_text(&encoding, &[code]).ok();
            let Some(ch) = decoded.and_then(|s| s.chars().next()) else {
                continue;
            };
            chars[usize::from(code)] = Some(ch);
            codes.entry(ch).or_insert(code);
        }
        codes.insert(BULLET.0, BULLET.1);
    }
    WinAnsi { chars, codes }
});

/// WinAnsi bytes for `text`.
///
/// Whitespace becomes a plain space, so every char yields exactly one byte.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| {
            if ch.is_whitespace() {
                b' '
            } else {
                WIN_ANSI.codes.get(&ch).copied().unwrap_or(SUBSTITUTE)
            }
        })
        .collect()
}

/// Text for WinAnsi `bytes`; codes without a character are skipped.
pub fn decode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter_map(|&byte| WIN_ANSI.chars[usize::from(byte)])
        .collect()
}

/// Whether `ch` survives [`encode`] unchanged.
pub fn is_encodable(ch: char) -> bool {
    WIN_ANSI.codes.contains_key(&ch)
}
