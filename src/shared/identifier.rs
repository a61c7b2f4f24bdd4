use rand::Rng;
use std::future::Future;

use crate::shared::error::{AppError, AppResult};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const IDENTIFIER_LEN: usize = 5;

/// Short random identifier used for contract IDs and request IDs.
///
/// Collisions are expected at this length; callers retry on
/// `AppError::DuplicateIdentifier`.
pub fn generate_identifier() -> String {
    let mut rng = rand::thread_rng();
    (0..IDENTIFIER_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Runs `attempt` with a fresh identifier, retrying exactly once if it
/// reports `DuplicateIdentifier`. A second collision is returned to the caller.
pub async fn with_identifier_retry<T, F, Fut>(
    mut next_id: impl FnMut() -> String,
    mut attempt: F,
) -> AppResult<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    match attempt(next_id()).await {
        Err(AppError::DuplicateIdentifier) => {
            tracing::warn!("Identifier collision, retrying with a new identifier");
            attempt(next_id()).await
        }
        other => other,
    }
}
