//! Validation and credential policy constants.

/// Minimum display-name length accepted at signup and update.
pub const MIN_NAME_LEN: usize = 3;

/// Maximum display-name length; keeps profile rendering sane.
pub const MAX_NAME_LEN: usize = 50;

/// Minimum password length accepted before hashing.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum micropost body length.
pub const MAX_POST_LEN: usize = 280;

/// Entropy of a bearer token in bytes (hex-encoded to twice this length).
pub const TOKEN_BYTES: usize = 32;
