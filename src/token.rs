//! Webhook shared-secret generation
//!
//! A stateless utility: each call draws a fresh secret from the thread-local
//! RNG. The secret is set on webhook creation; verifying it against inbound
//! deliveries is the caller's job.

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

const TOKEN_LENGTH: usize = 32;

/// Generate a random alphanumeric webhook secret
pub fn generate_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
