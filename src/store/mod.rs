use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

mod memory;

pub use memory::InMemoryUserStore;

#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

// 哈希值不进入日志
impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("用户存储不可用: {0}")]
    Unavailable(String),

    #[error("重复的用户标识: {0}")]
    Duplicate(String),

    #[error("初始化用户数据失败: {0}")]
    Seed(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 按用户名或邮箱精确查找用户
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<UserRecord>, StoreError>;
}
