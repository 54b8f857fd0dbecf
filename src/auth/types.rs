use serde::{Deserialize, Serialize};

use crate::store::UserRecord;

/// token 中携带的身份声明
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub iat: i64, // issued at
    pub exp: i64, // expiration time
}

/// 可以返回给客户端的用户信息，不含密码哈希
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&UserRecord> for PublicUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<&Claims> for PublicUser {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username.clone(),
            email: claims.email.clone(),
        }
    }
}
