//! Activity log shapes.

use async_graphql::ID;
use serde::Serialize;
use serde_json::Value;

use super::pagination::{saturating_i32, Pagination};
use crate::backend::{ActivityEntry, ActivityLogPage, SuccessPayload};
use crate::model::{ActivityLog, ActivityPage, ActivityResponse, DateTime};

/// Activity type used when the backend entry has no action.
pub const UNKNOWN_ACTIVITY: &str = "UNKNOWN";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata<'a> {
    successful: bool,
    failure_reason: Option<&'a str>,
}

/// Map one backend entry for the given user.
pub fn activity_log(user_id: &str, entry: &ActivityEntry) -> ActivityLog {
    let action = entry.action.as_deref().unwrap_or_default();
    let outcome = if entry.successful { "Success" } else { "Failed" };
    let failure_reason = entry.failure_reason.as_deref().filter(|r| !r.is_empty());

    let description = match failure_reason {
        Some(reason) => format!("{action} - {outcome}: {reason}"),
        None => format!("{action} - {outcome}"),
    };

    let metadata = serde_json::to_string(&Metadata {
        successful: entry.successful,
        failure_reason: entry.failure_reason.as_deref(),
    })
    .ok();

    ActivityLog {
        id: ID(format!("{user_id}-{}", timestamp_key(&entry.timestamp))),
        user_id: user_id.to_string(),
        activity_type: entry
            .action
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| UNKNOWN_ACTIVITY.to_string()),
        description,
        ip_address: entry.ip_address.clone(),
        user_agent: entry.user_agent.clone(),
        timestamp: DateTime::from_json(&entry.timestamp),
        metadata,
    }
}

/// Map a backend page. `currentPage`/`pageSize` echo the request.
pub fn activity_page(user_id: &str, page: &ActivityLogPage, pagination: Pagination) -> ActivityPage {
    ActivityPage {
        activities: page
            .data
            .iter()
            .map(|entry| activity_log(user_id, entry))
            .collect(),
        total_elements: saturating_i32(page.total.max(0)),
        total_pages: pagination.total_pages(page.total),
        current_page: pagination.page(),
        page_size: pagination.size(),
    }
}

/// Envelope of `getMyActivityLogs`.
///
/// The page is only mapped for a successful payload that carries data.
pub fn activity_response(
    user_id: &str,
    payload: SuccessPayload<ActivityLogPage>,
    pagination: Pagination,
) -> ActivityResponse {
    let data = payload
        .data
        .as_ref()
        .filter(|_| payload.success)
        .map(|page| activity_page(user_id, page, pagination));

    ActivityResponse {
        success: payload.success,
        message: payload.message,
        data,
    }
}

/// Timestamp as it appears in the composite id: strings verbatim,
/// whole numbers without a fraction, everything else as compact JSON.
fn timestamp_key(timestamp: &Value) -> String {
    match timestamp {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map_or_else(|| n.to_string(), |f| f.to_string()),
        other => other.to_string(),
    }
}
