//! Session id generation.

use base64::{Engine, engine::general_purpose::URL_SAFE};
use rand::RngCore;

/// Number of random bytes in a session id.
pub const SESSION_ID_BYTES: usize = 32;

/// Generate a new session id: 32 random bytes, base64url-encoded.
///
/// Collisions are not checked for.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE.encode(bytes)
}
