use indicatif::ProgressBar;
use rayon::prelude::*;
use sha1::{Digest, Sha1};

use super::io::read_piece_data;
use crate::models::FileInfo;
use crate::piece::calculate_num_pieces;

/// Check every piece against its SHA1 hash (piece-parallel).
///
/// `expected` holds the concatenated 20 byte hashes from the metainfo.
/// Pieces that cannot be read, or have no expected hash, fail.
pub fn verify_v1_pieces(
    files: &[FileInfo],
    piece_length: u64,
    expected: &[u8],
    pb: Option<&ProgressBar>,
) -> Vec<bool> {
    let total_len: u64 = files.iter().map(|f| f.len).sum();
    let num_pieces = calculate_num_pieces(total_len, piece_length);

    (0..num_pieces as usize)
        .into_par_iter()
        .map(|piece_idx| {
            let ok = match read_piece_data(files, piece_idx, piece_length, total_len) {
                Ok(data) => expected
                    .get(piece_idx * 20..piece_idx * 20 + 20)
                    .is_some_and(|want| Sha1::digest(&data).as_slice() == want),
                Err(e) => {
                    tracing::trace!(piece = piece_idx, error = %e, "piece unreadable");
                    false
                }
            };
            if let Some(pb) = pb {
                pb.inc(1);
            }
            ok
        })
        .collect()
}

/// Hash all pieces, concatenated.
pub fn hash_v1_pieces(files: &[FileInfo], piece_length: u64) -> std::io::Result<Vec<u8>> {
    let total_len: u64 = files.iter().map(|f| f.len).sum();
    let num_pieces = calculate_num_pieces(total_len, piece_length);

    let results: Vec<[u8; 20]> = (0..num_pieces as usize)
        .into_par_iter()
        .map(|piece_idx| -> std::io::Result<[u8; 20]> {
            let data = read_piece_data(files, piece_idx, piece_length, total_len)?;
            Ok(Sha1::digest(&data).into())
        })
        .collect::<std::io::Result<_>>()?;

    Ok(results.concat())
}
