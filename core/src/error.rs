//! Error types for room-sharing operations.

use thiserror::Error;

/// Result type alias for room-sharing operations.
pub type Result<T> = std::result::Result<T, RoomError>;

/// Error taxonomy for the room-sharing engine.
///
/// Validation variants carry a stable machine `code` and, where applicable,
/// the form field they belong to, so the web layer and host forms can
/// re-display them next to the offending input instead of failing hard.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    // ═══════════════════════════════════════════════════════════
    // Validation Errors (re-displayable, field-scoped)
    // ═══════════════════════════════════════════════════════════

    /// A room with this name already exists for the event.
    #[error("A room with this name already exists for this event")]
    DuplicateName,

    /// A required form field was empty.
    #[error("This field is required: {field}")]
    MissingField {
        /// Name of the empty field
        field: &'static str,
    },

    /// The room password is shorter than the minimum length.
    #[error("The room password must be at least {min} characters long")]
    PasswordTooShort {
        /// Minimum accepted length
        min: usize,
    },

    /// No room with the submitted name exists in this event.
    #[error("No room with this name was found")]
    RoomNotFound,

    /// The submitted password does not match the room password.
    #[error("The room password is incorrect")]
    PasswordMismatch,

    // ═══════════════════════════════════════════════════════════
    // State Conflicts
    // ═══════════════════════════════════════════════════════════

    /// The order already belongs to a room.
    #[error("This order already belongs to a room")]
    AlreadyInRoom,

    // ═══════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════

    /// The acting identity lacks the staff permission for this operation.
    #[error("Permission denied")]
    PermissionDenied,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Hashing or verifying a room password failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// The room store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RoomError {
    /// Stable machine-readable code, safe for frontends to match on.
    ///
    /// # Examples
    ///
    /// ```
    /// # use roomshare_core::error::RoomError;
    /// assert_eq!(RoomError::DuplicateName.code(), "duplicate_name");
    /// assert_eq!(RoomError::PasswordMismatch.code(), "pw_mismatch");
    /// ```
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DuplicateName => "duplicate_name",
            Self::MissingField { .. } => "required",
            Self::PasswordTooShort { .. } => "min_length",
            Self::RoomNotFound => "room_not_found",
            Self::PasswordMismatch => "pw_mismatch",
            Self::AlreadyInRoom => "conflict",
            Self::PermissionDenied => "permission_denied",
            Self::PasswordHash(_) => "password_hash",
            Self::Storage(_) => "storage",
        }
    }

    /// Form field the error should be displayed next to, if field-scoped.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateName | Self::RoomNotFound => Some("name"),
            Self::MissingField { field } => Some(field),
            Self::PasswordTooShort { .. } | Self::PasswordMismatch => Some("password"),
            _ => None,
        }
    }

    /// Returns `true` for errors that should be re-displayed on the
    /// submitting form rather than treated as hard failures.
    ///
    /// # Examples
    ///
    /// ```
    /// # use roomshare_core::error::RoomError;
    /// assert!(RoomError::DuplicateName.is_validation());
    /// assert!(!RoomError::PermissionDenied.is_validation());
    /// ```
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateName
                | Self::MissingField { .. }
                | Self::PasswordTooShort { .. }
                | Self::RoomNotFound
                | Self::PasswordMismatch
        )
    }
}
