//! Opaque public identifier generation.
//!
//! Every record carries an externally-exposed id alongside its internal
//! UUID; only the public id ever leaves the system.

use rand::Rng;

const ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_SUFFIX_LEN: usize = 10;

fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..ID_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ID_CHARSET.len());
            ID_CHARSET[idx] as char
        })
        .collect()
}

/// Generate a public user id (`usr_…`).
pub fn new_user_public_id() -> String {
    format!("usr_{}", random_suffix())
}

/// Generate a public recipient id (`rcp_…`).
pub fn new_recipient_public_id() -> String {
    format!("rcp_{}", random_suffix())
}

/// Generate a public address id (`adr_…`).
pub fn new_address_public_id() -> String {
    format!("adr_{}", random_suffix())
}
