//! Route handlers, grouped by resource.

pub mod admin;
pub mod health;
pub mod invitations;
pub mod presentations;
pub mod teams;
pub mod users;

use axum::Json;
use serde::Serialize;

/// Success envelope: `{ "success": true, "message": ..., ...data }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub data: T,
}

/// Wrap `data` (which must serialize as an object) in the success envelope.
pub fn respond<T: Serialize>(message: impl Into<String>, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: message.into(),
        data,
    })
}

/// Empty payload for envelopes that only carry a message.
#[derive(Debug, Serialize)]
pub struct Empty {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_flattens_data() {
        let Json(body) = respond("Team created", json!({ "team_id": "t1" }));
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Team created");
        assert_eq!(value["team_id"], "t1");
    }

    #[test]
    fn test_envelope_with_empty_payload() {
        let Json(body) = respond("Invitation revoked", Empty {});
        let value = serde_json::to_value(body).unwrap();
        assert_eq!(value, json!({ "success": true, "message": "Invitation revoked" }));
    }
}
