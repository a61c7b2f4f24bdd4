use crate::shared::error::{AppError, AppResult};

const BCRYPT_COST: u32 = 10;

/// bcrypt runs on the blocking pool so a slow hash never stalls a worker.
pub async fn hash_password(plain: &str) -> AppResult<String> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, BCRYPT_COST))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::InternalServerError(format!("Password hashing failed: {}", e)))
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(plain: &str, hash: &str) -> bool {
    let (plain, hash) = (plain.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("s3cret").await.unwrap();
        assert_ne!(hash, "s3cret");
        assert!(verify_password("s3cret", &hash).await);
        assert!(!verify_password("wrong", &hash).await);
    }

    #[tokio::test]
    async fn test_garbage_hash_never_verifies() {
        assert!(!verify_password("s3cret", "not-a-bcrypt-hash").await);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_leaves_the_runtime_thread_free() {
        let hashing = tokio::spawn(async { hash_password("s3cret").await });
        // The single runtime thread still gets to run this while bcrypt works.
        let ticked = tokio::spawn(async { 1 }).await.unwrap();
        assert_eq!(ticked, 1);
        assert!(hashing.await.unwrap().is_ok());
    }
}
