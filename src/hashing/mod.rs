pub(crate) mod io;
mod v1;

pub use v1::{hash_v1_pieces, verify_v1_pieces};
