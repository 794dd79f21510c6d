use std::ops::Range;

/// Calculate the number of pieces for a given total size and piece length
pub fn calculate_num_pieces(total_size: u64, piece_length: u64) -> u64 {
    if piece_length == 0 {
        return 0;
    }
    total_size.div_ceil(piece_length)
}

/// Pieces overlapping the byte range `[offset, offset + len)`.
pub fn piece_range(offset: u64, len: u64, piece_length: u64) -> Range<usize> {
    if len == 0 || piece_length == 0 {
        let at = (offset / piece_length.max(1)) as usize;
        return at..at;
    }
    let first = offset / piece_length;
    let last = (offset + len - 1) / piece_length;
    first as usize..last as usize + 1
}

/// Bytes of the range `[offset, offset + len)` covered by verified pieces.
pub fn verified_bytes(offset: u64, len: u64, piece_length: u64, have: &[bool]) -> u64 {
    let end = offset + len;
    piece_range(offset, len, piece_length)
        .filter(|&piece| have.get(piece).copied().unwrap_or(false))
        .map(|piece| {
            let start = piece as u64 * piece_length;
            end.min(start + piece_length) - offset.max(start)
        })
        .sum()
}
