use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use validator::ValidateLength;

const IDENTIFIER_MIN_LEN: u64 = 3;
const IDENTIFIER_MAX_LEN: u64 = 50;
const PASSWORD_MIN_LEN: u64 = 4;
const PASSWORD_MAX_LEN: u64 = 128;

static IDENTIFIER_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._@-]+$").expect("identifier pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Identifier is required")]
    IdentifierRequired,

    #[error("Identifier must be between 3 and 50 characters")]
    IdentifierLength,

    #[error("Identifier may only contain letters, numbers, dots, underscores, hyphens and @")]
    IdentifierCharset,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Password must be between 4 and 128 characters")]
    PasswordLength,
}

/// 校验用户名或邮箱，返回去掉首尾空白后的值
pub fn validate_identifier(raw: &str) -> Result<&str, ValidationError> {
    let identifier = raw.trim();
    if identifier.is_empty() {
        return Err(ValidationError::IdentifierRequired);
    }
    if !identifier.validate_length(Some(IDENTIFIER_MIN_LEN), Some(IDENTIFIER_MAX_LEN), None) {
        return Err(ValidationError::IdentifierLength);
    }
    if !IDENTIFIER_CHARSET.is_match(identifier) {
        return Err(ValidationError::IdentifierCharset);
    }
    Ok(identifier)
}

/// 校验密码长度；不做复杂度要求，返回原值用于哈希比对
pub fn validate_password(raw: &str) -> Result<&str, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if !raw.validate_length(Some(PASSWORD_MIN_LEN), Some(PASSWORD_MAX_LEN), None) {
        return Err(ValidationError::PasswordLength);
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_trimmed() {
        assert_eq!(validate_identifier("  john_doe  "), Ok("john_doe"));
        assert_eq!(
            validate_identifier("john@example.com"),
            Ok("john@example.com")
        );
        assert_eq!(validate_identifier("a.b-c"), Ok("a.b-c"));
    }

    #[test]
    fn test_identifier_required() {
        assert_eq!(
            validate_identifier(""),
            Err(ValidationError::IdentifierRequired)
        );
        assert_eq!(
            validate_identifier("   \t"),
            Err(ValidationError::IdentifierRequired)
        );
    }

    #[test]
    fn test_identifier_length_bounds() {
        assert_eq!(
            validate_identifier("ab"),
            Err(ValidationError::IdentifierLength)
        );
        assert!(validate_identifier("abc").is_ok());
        assert!(validate_identifier(&"a".repeat(50)).is_ok());
        assert_eq!(
            validate_identifier(&"a".repeat(51)),
            Err(ValidationError::IdentifierLength)
        );
        // 首尾空白不计入长度
        assert_eq!(
            validate_identifier("  ab  "),
            Err(ValidationError::IdentifierLength)
        );
    }

    #[test]
    fn test_identifier_charset() {
        for bad in ["john doe", "john!", "jöhn", "<script>", "a/b/c"] {
            assert_eq!(
                validate_identifier(bad),
                Err(ValidationError::IdentifierCharset),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn test_length_message_mentions_bounds() {
        let message = ValidationError::IdentifierLength.to_string();
        assert!(message.contains("between 3 and 50"));
    }

    #[test]
    fn test_password_bounds() {
        assert_eq!(
            validate_password(""),
            Err(ValidationError::PasswordRequired)
        );
        assert_eq!(
            validate_password("    "),
            Err(ValidationError::PasswordRequired)
        );
        assert_eq!(
            validate_password("abc"),
            Err(ValidationError::PasswordLength)
        );
        assert_eq!(validate_password("abcd"), Ok("abcd"));
        assert!(validate_password(&"x".repeat(128)).is_ok());
        assert_eq!(
            validate_password(&"x".repeat(129)),
            Err(ValidationError::PasswordLength)
        );
    }

    #[test]
    fn test_password_kept_verbatim() {
        assert_eq!(validate_password(" pass word "), Ok(" pass word "));
    }
}
