//! Mapping from database errors to store errors.

use domain::StoreError;
use tracing::error;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Translate a sqlx error into the store error the services understand.
///
/// Unique violations become conflicts with a message chosen by constraint
/// name, missing references become not-found, and everything else is
/// reported as the store being unavailable.
pub fn map_db_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                StoreError::Conflict(conflict_message(db_err.constraint()).to_string())
            }
            Some(FOREIGN_KEY_VIOLATION) => StoreError::NotFound,
            _ => unavailable(err),
        },
        _ => unavailable(err),
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    error!(error = %err, "Database operation failed");
    StoreError::Unavailable(err.to_string())
}

fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("team_members_one_team_per_user") | Some("team_members_pkey") => {
            "User already belongs to a team"
        }
        Some("invitations_team_email_unique") => "An invitation is already pending for this email",
        Some("users_email_key") => "Email already in use",
        _ => "Duplicate record",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert_eq!(map_db_error(sqlx::Error::RowNotFound), StoreError::NotFound);
    }

    #[test]
    fn test_pool_errors_map_to_unavailable() {
        let mapped = map_db_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(mapped, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_conflict_messages_by_constraint() {
        assert_eq!(
            conflict_message(Some("team_members_one_team_per_user")),
            "User already belongs to a team"
        );
        assert_eq!(
            conflict_message(Some("invitations_team_email_unique")),
            "An invitation is already pending for this email"
        );
        assert_eq!(conflict_message(Some("users_email_key")), "Email already in use");
        assert_eq!(conflict_message(None), "Duplicate record");
    }
}
