//! Store error types
//!
//! Defines all errors that can occur while reading or mutating the
//! in-memory registry. Display strings are the user-facing (Russian)
//! messages returned by the API.

use thiserror::Error;

/// Kinds of records held by the store, used to phrase lookup failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Account,
    AntiblatEntry,
    Leader,
    Supervisor,
    PointEntry,
    Warning,
    Service,
    PriceRequest,
    Task,
    Submission,
}

impl Entity {
    /// Message returned when a record of this kind is missing
    pub fn not_found_message(&self) -> &'static str {
        match self {
            Entity::Account => "Пользователь не найден",
            Entity::AntiblatEntry | Entity::PointEntry => "Запись не найдена",
            Entity::Leader => "Лидер не найден",
            Entity::Supervisor => "Следящий не найден",
            Entity::Warning => "Выговор не найден",
            Entity::Service => "Услуга не найдена",
            Entity::PriceRequest => "Запрос не найден",
            Entity::Task => "Задание не найдено",
            Entity::Submission => "Отправленное задание не найдено",
        }
    }
}

/// Errors that can occur in the store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Requested record does not exist
    #[error("{}", .0.not_found_message())]
    NotFound(Entity),

    /// A login is already taken by another record
    #[error("Пользователь с таким логином уже существует")]
    DuplicateLogin(String),

    /// Input failed validation
    #[error("{0}")]
    Invalid(String),

    /// Review attempted on a request that already left the pending state
    #[error("Запрос уже обработан")]
    AlreadyReviewed(Entity),

    /// The password could not be hashed
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

impl StoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        StoreError::Invalid(message.into())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound(Entity::Warning);
        assert_eq!(err.to_string(), "Выговор не найден");

        let err = StoreError::DuplicateLogin("leader_ls".to_string());
        assert_eq!(
            err.to_string(),
            "Пользователь с таким логином уже существует"
        );

        let err = StoreError::invalid("Неверная больница");
        assert_eq!(err.to_string(), "Неверная больница");
    }
}
