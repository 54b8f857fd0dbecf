use bcrypt::{hash, verify, BcryptError};
use log::{debug, error};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("密码加密失败: {0}")]
    Hash(#[source] BcryptError),

    #[error("密码哈希格式无效: {0}")]
    Verify(#[source] BcryptError),
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    debug!("加密密码 (cost = {})", cost);
    hash(password.as_bytes(), cost).map_err(|e| {
        error!("密码加密失败: {}", e);
        PasswordError::Hash(e)
    })
}

/// 单向比对：密码不匹配返回 `Ok(false)`，只有哈希本身损坏时才返回错误
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PasswordError> {
    debug!("验证密码");
    verify(password, password_hash).map_err(|e| {
        error!("密码验证过程出错: {}", e);
        PasswordError::Verify(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_then_verify() {
        let hashed = hash_password("john123", TEST_COST).unwrap();
        assert_ne!(hashed, "john123");
        assert!(verify_password("john123", &hashed).unwrap());
        assert!(!verify_password("john124", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("john123", TEST_COST).unwrap();
        let b = hash_password("john123", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_plaintext_hash_is_rejected() {
        assert!(matches!(
            verify_password("john123", "john123"),
            Err(PasswordError::Verify(_))
        ));
    }
}
