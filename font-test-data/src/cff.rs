//! small CFF and CFF2 tables with hand assembled charstrings

use crate::variations::two_region_store;

/// Charstring for glyph 1 of [`simple_cff`]: a 300 unit square at
/// (100, 100) with an advance width of 600.
pub const CFF_SQUARE: &[u8] = &[
    248, 236, 239, 239, 21, // 600 100 100 rmoveto
    247, 192, 6, // 300 hlineto
    247, 192, 7, // 300 vlineto
    251, 192, 6, // -300 hlineto
    14,  // endchar
];

/// Charstring for glyph 2 of [`simple_cff`]: a single curve drawn by local
/// subroutine 0.
pub const CFF_SUBR_CURVE: &[u8] = &[139, 139, 21, 32, 10, 14];

/// Local subroutine 0: `10 20 30 40 50 60 rrcurveto return`.
pub const CFF_LOCAL_SUBR: &[u8] = &[149, 159, 169, 179, 189, 199, 8, 11];

/// Charstring for glyph 1 of [`simple_cff2`]: a blended move followed by
/// two lines. At the coordinate -0.75 the move lands at x = 60, at the
/// default location at x = 50.
pub const CFF2_BLENDED: &[u8] = &[
    189, 179, 119, 140, 16, 139, 21, // 50 40 -20 1 blend 0 rmoveto
    248, 136, 6, // 500 hlineto
    248, 136, 7, // 500 vlineto
];

/// Builds a CFF INDEX with a one byte offset size.
pub fn index(objects: &[&[u8]], is_cff2: bool) -> Vec<u8> {
    let mut out = Vec::new();
    if is_cff2 {
        out.extend((objects.len() as u32).to_be_bytes());
    } else {
        out.extend((objects.len() as u16).to_be_bytes());
    }
    if objects.is_empty() {
        return out;
    }
    out.push(1);
    let mut offset = 1usize;
    out.push(offset as u8);
    for object in objects {
        offset += object.len();
        out.push(offset as u8);
    }
    for object in objects {
        out.extend_from_slice(object);
    }
    out
}

fn int16(value: usize) -> [u8; 3] {
    let [hi, lo] = (value as i16).to_be_bytes();
    [28, hi, lo]
}

/// A CFF table with three glyphs: an empty `.notdef`, [`CFF_SQUARE`] and
/// [`CFF_SUBR_CURVE`].
///
/// The private DICT sets `defaultWidthX` to 500 and `nominalWidthX` to 0
/// and carries a local subroutine index holding [`CFF_LOCAL_SUBR`].
pub fn simple_cff() -> Vec<u8> {
    let header = [1u8, 0, 4, 1];
    let names = index(&[b"Test"], false);
    let strings = index(&[], false);
    let global_subrs = index(&[], false);
    // three fixed size operands and two operators
    let top_dict_len = 11;
    let top_dict_index_len = 2 + 1 + 2 + top_dict_len;
    let charstrings_offset =
        header.len() + names.len() + top_dict_index_len + strings.len() + global_subrs.len();
    let charstrings = index(&[&[14], CFF_SQUARE, CFF_SUBR_CURVE], false);
    let private_offset = charstrings_offset + charstrings.len();
    let mut private_dict = Vec::new();
    private_dict.extend(int16(500));
    private_dict.push(20);
    private_dict.extend([139, 21]);
    // subrs follow the private dict directly
    private_dict.extend(int16(10));
    private_dict.push(19);
    let mut top_dict = Vec::new();
    top_dict.extend(int16(charstrings_offset));
    top_dict.push(17);
    top_dict.extend(int16(private_dict.len()));
    top_dict.extend(int16(private_offset));
    top_dict.push(18);
    assert_eq!(top_dict.len(), top_dict_len);
    let mut out = header.to_vec();
    out.extend(names);
    out.extend(index(&[&top_dict], false));
    out.extend(strings);
    out.extend(global_subrs);
    out.extend(charstrings);
    out.extend(private_dict);
    out.extend(index(&[CFF_LOCAL_SUBR], false));
    out
}

/// A CFF2 table with two glyphs: an empty `.notdef` and [`CFF2_BLENDED`].
///
/// The variation store is [`two_region_store`], so the table expects a
/// single variation axis.
pub fn simple_cff2() -> Vec<u8> {
    let header_len = 5;
    let top_dict_len = 13;
    let global_subrs = index(&[], true);
    let charstrings_offset = header_len + top_dict_len + global_subrs.len();
    let charstrings = index(&[&[], CFF2_BLENDED], true);
    let fd_array_offset = charstrings_offset + charstrings.len();
    let private_dict = [139u8, 139, 6];
    let fd_array_len = 4 + 1 + 2 + 7;
    let private_offset = fd_array_offset + fd_array_len;
    let mut font_dict = Vec::new();
    font_dict.extend(int16(private_dict.len()));
    font_dict.extend(int16(private_offset));
    font_dict.push(18);
    let fd_array = index(&[&font_dict], true);
    assert_eq!(fd_array.len(), fd_array_len);
    let store_offset = private_offset + private_dict.len();
    let store = two_region_store();
    let mut top_dict = Vec::new();
    top_dict.extend(int16(charstrings_offset));
    top_dict.push(17);
    top_dict.extend(int16(fd_array_offset));
    top_dict.extend([12, 36]);
    top_dict.extend(int16(store_offset));
    top_dict.push(24);
    assert_eq!(top_dict.len(), top_dict_len);
    let mut out = vec![2u8, 0, header_len as u8];
    out.extend((top_dict_len as u16).to_be_bytes());
    out.extend(top_dict);
    out.extend(global_subrs);
    out.extend(charstrings);
    out.extend(fd_array);
    out.extend(private_dict);
    out.extend((store.len() as u16).to_be_bytes());
    out.extend_from_slice(&store);
    out
}
