/// Platform-specific path handling — normalisation, `MAX_PATH` extension
/// and reparse-point detection.
pub mod paths;

pub use paths::{display_name, extended_length, is_reparse_point, normalize, MAX_PATH};
