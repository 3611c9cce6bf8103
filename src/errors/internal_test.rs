#[cfg(test)]
mod tests {
    use crate::errors::internal::{AuditError, CodecError, InternalError};
    use sea_orm::DbErr;

    #[test]
    fn test_database_error_includes_operation() {
        let db_err = DbErr::RecordNotFound("test record".to_string());
        let error = InternalError::database("create_user", db_err);

        let error_string = error.to_string();
        assert!(error_string.contains("create_user"));
        assert!(error_string.contains("Database error"));
    }

    #[test]
    fn test_transaction_commit_error_message() {
        let error = InternalError::transaction_commit(DbErr::Custom("disk full".to_string()));
        assert!(error.to_string().contains("Committing transaction failed"));
    }

    #[test]
    fn test_concurrent_modification_names_operation() {
        let error = InternalError::concurrent_modification("record_login_failure");
        assert!(error.to_string().contains("record_login_failure"));
    }

    #[test]
    fn test_parse_error_includes_value_type() {
        let error = InternalError::parse("Role", "unknown role 'root'");

        let error_string = error.to_string();
        assert!(error_string.contains("Role"));
        assert!(error_string.contains("unknown role 'root'"));
        assert!(error_string.contains("Parse error"));
    }

    #[test]
    fn test_crypto_error_includes_operation() {
        let error = InternalError::crypto("argon2_init", "invalid secret length");

        let error_string = error.to_string();
        assert!(error_string.contains("argon2_init"));
        assert!(error_string.contains("Crypto error"));
    }

    #[test]
    fn test_domain_errors_are_transparent() {
        let error: InternalError = AuditError::Encode {
            field: "action",
            source: CodecError::EncodeFailed("aead".to_string()),
        }
        .into();
        assert_eq!(
            error.to_string(),
            "Failed to encode audit action: Encoding audit payload failed: aead"
        );

        let error: InternalError = CodecError::InvalidKey("short".to_string()).into();
        assert_eq!(error.to_string(), "Invalid encryption key: short");
    }
}
