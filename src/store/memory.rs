use async_trait::async_trait;
use log::{debug, info};
use std::collections::HashSet;

use super::{StoreError, UserRecord, UserStore};
use crate::auth::hash_password;

// 演示账号：用户名、邮箱、明文密码（启动时立即哈希，明文不会保存）
const SEED_USERS: &[(&str, &str, &str)] = &[
    ("john_doe", "john@example.com", "john123"),
    ("jane_smith", "jane@example.com", "abcde123"),
    ("admin", "admin@example.com", "admin123"),
];

/// 进程启动时写入、之后只读的内存用户表
pub struct InMemoryUserStore {
    users: Vec<UserRecord>,
}

impl InMemoryUserStore {
    pub fn new(users: Vec<UserRecord>) -> Result<Self, StoreError> {
        {
            let mut seen = HashSet::new();
            for user in &users {
                for key in [&user.username, &user.email] {
                    if !seen.insert(key.as_str()) {
                        return Err(StoreError::Duplicate(key.clone()));
                    }
                }
            }
        }
        Ok(Self { users })
    }

    /// 用内置演示账号初始化
    pub fn seeded(cost: u32) -> Result<Self, StoreError> {
        let users = SEED_USERS
            .iter()
            .zip(1..)
            .map(|(&(username, email, password), id)| {
                let password_hash =
                    hash_password(password, cost).map_err(|e| StoreError::Seed(e.to_string()))?;
                Ok(UserRecord {
                    id,
                    username: username.to_string(),
                    email: email.to_string(),
                    password_hash,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        info!("已初始化 {} 个演示用户", users.len());
        Self::new(users)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRecord>, StoreError> {
        debug!("查找用户: {}", identifier);
        Ok(self
            .users
            .iter()
            .find(|user| user.username == identifier || user.email == identifier)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use tokio_test::block_on;

    fn record(id: i64, username: &str, email: &str) -> UserRecord {
        UserRecord {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$placeholder".to_string(),
        }
    }

    #[test]
    fn test_find_by_username_or_email() {
        let store = InMemoryUserStore::new(vec![
            record(1, "john_doe", "john@example.com"),
            record(2, "jane_smith", "jane@example.com"),
        ])
        .unwrap();

        let by_name = block_on(store.find_by_identifier("john_doe")).unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(1));

        let by_email = block_on(store.find_by_identifier("jane@example.com")).unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(2));
    }

    #[test]
    fn test_lookup_is_exact() {
        let store = InMemoryUserStore::new(vec![record(1, "john_doe", "john@example.com")]).unwrap();
        assert!(block_on(store.find_by_identifier("John_Doe")).unwrap().is_none());
        assert!(block_on(store.find_by_identifier("john")).unwrap().is_none());
        assert!(block_on(store.find_by_identifier("nobody")).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_identifiers_rejected() {
        let err = InMemoryUserStore::new(vec![
            record(1, "john_doe", "john@example.com"),
            record(2, "john_doe", "other@example.com"),
        ])
        .err();
        assert!(matches!(err, Some(StoreError::Duplicate(ref key)) if key == "john_doe"));
    }

    #[test]
    fn test_seeded_accounts_are_hashed() {
        let store = InMemoryUserStore::seeded(4).unwrap();
        for (id, name) in [(2, "jane_smith"), (3, "admin@example.com")] {
            let user = block_on(store.find_by_identifier(name)).unwrap().unwrap();
            assert_eq!(user.id, id);
        }

        let john = block_on(store.find_by_identifier("john_doe")).unwrap().unwrap();
        assert_eq!(john.id, 1);
        assert_eq!(john.email, "john@example.com");
        assert_ne!(john.password_hash, "john123");
        assert!(verify_password("john123", &john.password_hash).unwrap());
    }

    #[test]
    fn test_debug_hides_hash() {
        let rendered = format!("{:?}", record(1, "john_doe", "john@example.com"));
        assert!(!rendered.contains("placeholder"));
    }
}
