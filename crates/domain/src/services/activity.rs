//! Activity logger.
//!
//! Appends are best-effort: a failed append is logged and counted, and the
//! operation it describes still succeeds.

use std::sync::Arc;

use metrics::counter;
use shared::pagination::PageRequest;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::DomainResult;
use crate::models::{NewActivity, TeamActivity};
use crate::store::{ActivityStore, Stores};

#[derive(Clone)]
pub struct ActivityLogger {
    store: Arc<dyn ActivityStore>,
}

impl ActivityLogger {
    pub fn new(stores: &Stores) -> Self {
        Self {
            store: stores.activities.clone(),
        }
    }

    /// Append an entry. Never fails.
    pub async fn record(&self, entry: NewActivity) {
        let team_id = entry.team_id;
        let action = entry.action_type;

        match self.store.append(entry).await {
            Ok(activity) => {
                debug!(
                    activity_id = %activity.id,
                    team_id = %team_id,
                    action = %action,
                    "Team activity recorded"
                );
            }
            Err(e) => {
                counter!("activity_log_failures_total").increment(1);
                warn!(
                    team_id = %team_id,
                    action = %action,
                    error = %e,
                    "Failed to record team activity"
                );
            }
        }
    }

    /// Newest first, with the total count.
    pub async fn list(
        &self,
        team_id: Uuid,
        page: &PageRequest,
    ) -> DomainResult<(Vec<TeamActivity>, i64)> {
        Ok(self.store.list_for_team(team_id, page).await?)
    }
}
