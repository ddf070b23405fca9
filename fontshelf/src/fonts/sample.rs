//! In-memory construction of minimal TrueType files.
//!
//! The generated font has one glyph and no outlines, but carries the `head`,
//! `hhea`, `maxp` and `name` tables, which is enough for a parser to accept
//! it and report its family name. Used to exercise the preview path without
//! depending on fonts installed on the host.

const TABLE_RECORD_LEN: usize = 16;
const HEADER_LEN: usize = 12;

/// Build a minimal TrueType font whose family name is `family`.
pub fn minimal_ttf(family: &str) -> Vec<u8> {
    minimal_ttf_with_names(&[(ttf_parser::name_id::FAMILY, family)])
}

/// Build a minimal TrueType font carrying the given `(name id, value)`
/// records, all tagged Windows / Unicode BMP / en-US.
///
/// # Panics
///
/// Panics if the encoded names do not fit a 16-bit `name` table.
pub fn minimal_ttf_with_names(names: &[(u16, &str)]) -> Vec<u8> {
    // Table records must be sorted by tag
    let tables: [(&[u8; 4], Vec<u8>); 4] = [
        (b"head", head_table()),
        (b"hhea", hhea_table()),
        (b"maxp", maxp_table()),
        (b"name", name_table(names)),
    ];

    let mut out = Vec::new();
    out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    // searchRange, entrySelector, rangeShift for four tables
    out.extend_from_slice(&64u16.to_be_bytes());
    out.extend_from_slice(&2u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());

    let mut offset = HEADER_LEN + tables.len() * TABLE_RECORD_LEN;
    let mut body = Vec::new();
    for (tag, data) in &tables {
        out.extend_from_slice(*tag);
        out.extend_from_slice(&0u32.to_be_bytes()); // checksum, unchecked by parsers
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());

        body.extend_from_slice(data);
        let padded = data.len().div_ceil(4) * 4;
        body.resize(body.len() + (padded - data.len()), 0);
        offset += padded;
    }

    out.extend_from_slice(&body);
    out
}

fn head_table() -> Vec<u8> {
    let mut t = Vec::with_capacity(54);
    t.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // version
    t.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // font revision
    t.extend_from_slice(&0u32.to_be_bytes()); // checksum adjustment
    t.extend_from_slice(&0x5F0F_3CF5u32.to_be_bytes()); // magic
    t.extend_from_slice(&0u16.to_be_bytes()); // flags
    t.extend_from_slice(&1000u16.to_be_bytes()); // units per em
    t.extend_from_slice(&0u64.to_be_bytes()); // created
    t.extend_from_slice(&0u64.to_be_bytes()); // modified
    for v in [0i16, 0, 1000, 1000] {
        t.extend_from_slice(&v.to_be_bytes()); // bounding box
    }
    t.extend_from_slice(&0u16.to_be_bytes()); // mac style
    t.extend_from_slice(&8u16.to_be_bytes()); // lowest rec ppem
    t.extend_from_slice(&2i16.to_be_bytes()); // font direction hint
    t.extend_from_slice(&0i16.to_be_bytes()); // index to loc format
    t.extend_from_slice(&0i16.to_be_bytes()); // glyph data format
    t
}

fn hhea_table() -> Vec<u8> {
    let mut t = Vec::with_capacity(36);
    t.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    t.extend_from_slice(&800i16.to_be_bytes()); // ascender
    t.extend_from_slice(&(-200i16).to_be_bytes()); // descender
    t.extend_from_slice(&0i16.to_be_bytes()); // line gap
    t.extend_from_slice(&1000u16.to_be_bytes()); // advance width max
    t.extend_from_slice(&0i16.to_be_bytes()); // min left side bearing
    t.extend_from_slice(&0i16.to_be_bytes()); // min right side bearing
    t.extend_from_slice(&1000i16.to_be_bytes()); // x max extent
    t.extend_from_slice(&1i16.to_be_bytes()); // caret slope rise
    t.extend_from_slice(&0i16.to_be_bytes()); // caret slope run
    t.extend_from_slice(&0i16.to_be_bytes()); // caret offset
    t.extend_from_slice(&[0u8; 8]); // reserved
    t.extend_from_slice(&0i16.to_be_bytes()); // metric data format
    t.extend_from_slice(&1u16.to_be_bytes()); // number of h metrics
    t
}

fn maxp_table() -> Vec<u8> {
    let mut t = Vec::with_capacity(6);
    t.extend_from_slice(&0x0000_5000u32.to_be_bytes());
    t.extend_from_slice(&1u16.to_be_bytes()); // number of glyphs
    t
}

fn name_table(names: &[(u16, &str)]) -> Vec<u8> {
    let encoded: Vec<Vec<u8>> = names
        .iter()
        .map(|(_, value)| value.encode_utf16().flat_map(|u| u.to_be_bytes()).collect())
        .collect();
    let storage_offset = 6 + 12 * names.len();

    let mut t = Vec::new();
    t.extend_from_slice(&0u16.to_be_bytes()); // format
    t.extend_from_slice(&fits_u16(names.len()).to_be_bytes());
    t.extend_from_slice(&fits_u16(storage_offset).to_be_bytes());

    let mut offset = 0usize;
    for ((id, _), bytes) in names.iter().zip(&encoded) {
        t.extend_from_slice(&3u16.to_be_bytes()); // platform: Windows
        t.extend_from_slice(&1u16.to_be_bytes()); // encoding: Unicode BMP
        t.extend_from_slice(&0x0409u16.to_be_bytes()); // language: en-US
        t.extend_from_slice(&id.to_be_bytes());
        t.extend_from_slice(&fits_u16(bytes.len()).to_be_bytes());
        t.extend_from_slice(&fits_u16(offset).to_be_bytes());
        offset += bytes.len();
    }
    for bytes in &encoded {
        t.extend_from_slice(bytes);
    }
    t
}

fn fits_u16(n: usize) -> u16 {
    u16::try_from(n).expect("name table field exceeds 16 bits")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_ttf_parses() {
        let data = minimal_ttf("Sample Sans");
        let face = ttf_parser::Face::parse(&data, 0).expect("font should parse");

        assert_eq!(face.number_of_glyphs(), 1);
        assert_eq!(face.units_per_em(), 1000);

        let family = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::FAMILY)
            .and_then(|n| n.to_string());
        assert_eq!(family.as_deref(), Some("Sample Sans"));
    }

    #[test]
    fn test_multiple_name_records() {
        let data = minimal_ttf_with_names(&[
            (ttf_parser::name_id::FAMILY, "Inter"),
            (ttf_parser::name_id::POST_SCRIPT_NAME, "Inter-Bold"),
        ]);
        let face = ttf_parser::Face::parse(&data, 0).unwrap();

        let ps = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .and_then(|n| n.to_string());
        assert_eq!(ps.as_deref(), Some("Inter-Bold"));
    }

    #[test]
    #[should_panic(expected = "exceeds 16 bits")]
    fn test_oversized_name_is_rejected() {
        let long = "x".repeat(40_000);
        minimal_ttf(&long);
    }

    #[test]
    fn test_tables_are_four_byte_aligned() {
        let data = minimal_ttf("A");
        // Header, four records, then padded tables
        assert_eq!(data.len() % 4, 0);
    }
}
