//! Team deletion cascade (saga) models.

use serde::Serialize;
use uuid::Uuid;

/// Ordered steps of the team deletion cascade.
///
/// `DeletePrimaryRecord` always happens before `ClearPresentationTeamRefs`.
/// Only the second step is retried on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStep {
    DeletePrimaryRecord,
    ClearPresentationTeamRefs,
}

impl CascadeStep {
    pub const ALL: [CascadeStep; 2] = [
        CascadeStep::DeletePrimaryRecord,
        CascadeStep::ClearPresentationTeamRefs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CascadeStep::DeletePrimaryRecord => "delete_primary_record",
            CascadeStep::ClearPresentationTeamRefs => "clear_presentation_team_refs",
        }
    }
}

impl std::fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a fully completed cascade (or retry).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CascadeReport {
    pub team_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub completed_steps: Vec<CascadeStep>,
    pub presentations_cleared: u64,
}

/// A cascade that stopped after some steps had already taken effect.
///
/// No compensation is attempted. The pending steps are safe to retry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PartialFailure {
    pub message: String,
    pub team_id: Uuid,
    pub completed: Vec<CascadeStep>,
    pub pending: Vec<CascadeStep>,
}

impl PartialFailure {
    /// Path an operator calls to re-run the pending cleanup.
    pub fn retry_path(&self) -> String {
        format!("/api/v1/teams/{}/cascade/retry", self.team_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_serialization() {
        assert_eq!(
            serde_json::to_string(&CascadeStep::ClearPresentationTeamRefs).unwrap(),
            "\"clear_presentation_team_refs\""
        );
        assert_eq!(CascadeStep::ALL[0], CascadeStep::DeletePrimaryRecord);
    }

    #[test]
    fn test_partial_failure_retry_path() {
        let team_id = Uuid::nil();
        let failure = PartialFailure {
            message: "secondary store unavailable".into(),
            team_id,
            completed: vec![CascadeStep::DeletePrimaryRecord],
            pending: vec![CascadeStep::ClearPresentationTeamRefs],
        };
        assert_eq!(
            failure.retry_path(),
            format!("/api/v1/teams/{}/cascade/retry", team_id)
        );
    }
}
