//! Dashboard statistics and the recent-activity feed.

use chrono::Duration;
use serde::Serialize;

use crate::assignment::Assignment;
use crate::error::CoreError;
use crate::form::RegistrationForm;
use crate::locker::{self, Locker};
use crate::signature::record::SignatureRecord;
use crate::store::Store;
use crate::student::Response;
use crate::types::{DocId, Timestamp};

/// Window for the "recent registrations" counter.
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Items taken from each source before merging the activity feed.
const ACTIVITY_PER_SOURCE: usize = 5;
/// Length of the merged activity feed.
const ACTIVITY_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_forms: usize,
    pub total_responses: usize,
    pub recent_responses: usize,
    pub total_lockers: usize,
    pub occupied_lockers: usize,
    pub broken_lockers: usize,
    pub available_lockers: usize,
    pub signatures: usize,
}

/// Compute statistics from full collection snapshots.
///
/// A locker counts as available only when it is neither occupied nor broken.
pub fn compute(
    forms: &[RegistrationForm],
    responses: &[Response],
    lockers: &[Locker],
    assignments: &[Assignment],
    now: Timestamp,
) -> DashboardStats {
    let since = now - Duration::days(RECENT_WINDOW_DAYS);
    DashboardStats {
        total_forms: forms.len(),
        total_responses: responses.len(),
        recent_responses: responses.iter().filter(|r| r.submitted_at >= since).count(),
        total_lockers: lockers.len(),
        occupied_lockers: lockers.iter().filter(|l| l.is_occupied).count(),
        broken_lockers: lockers.iter().filter(|l| l.is_broken).count(),
        available_lockers: lockers
            .iter()
            .filter(|l| !l.is_occupied && !l.is_broken)
            .count(),
        signatures: assignments.iter().filter(|a| a.is_signed()).count(),
    }
}

pub async fn load(store: &dyn Store, now: Timestamp) -> Result<DashboardStats, CoreError> {
    let forms = store.list_forms().await?;
    let responses = store.list_responses().await?;
    let lockers = store.list_lockers().await?;
    let assignments = store.list_assignments().await?;
    Ok(compute(&forms, &responses, &lockers, &assignments, now))
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Registration,
    Assignment,
    Signature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityItem {
    pub kind: ActivityKind,
    pub id: DocId,
    pub description: String,
    pub at: Timestamp,
}

fn newest<T, F>(items: &[T], at: F) -> Vec<&T>
where
    F: Fn(&T) -> Timestamp,
{
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by_key(|item| std::cmp::Reverse(at(item)));
    sorted.truncate(ACTIVITY_PER_SOURCE);
    sorted
}

/// Merge the newest registrations, assignments, and signatures into one
/// feed, newest first.
pub fn recent_activity(
    responses: &[Response],
    assignments: &[Assignment],
    signatures: &[SignatureRecord],
) -> Vec<ActivityItem> {
    let student_name = |student_id: &str| {
        responses
            .iter()
            .find(|r| r.id == student_id)
            .map(|r| r.student_data.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Unknown student".to_string())
    };

    let mut items: Vec<ActivityItem> = newest(responses, |r| r.submitted_at)
        .into_iter()
        .map(|r| ActivityItem {
            kind: ActivityKind::Registration,
            id: r.id.clone(),
            description: format!("{} registered", student_name(&r.id)),
            at: r.submitted_at,
        })
        .collect();

    items.extend(newest(assignments, |a| a.assigned_at).into_iter().map(|a| {
        ActivityItem {
            kind: ActivityKind::Assignment,
            id: a.id.clone(),
            description: format!(
                "{} assigned to locker {}",
                student_name(&a.student_id),
                locker::number_from_id(&a.locker_id)
            ),
            at: a.assigned_at,
        }
    }));

    items.extend(newest(signatures, |s| s.created_at).into_iter().map(|s| {
        ActivityItem {
            kind: ActivityKind::Signature,
            id: s.id.clone(),
            description: format!("{} signed", s.student_name),
            at: s.created_at,
        }
    }));

    items.sort_by_key(|item| std::cmp::Reverse(item.at));
    items.truncate(ACTIVITY_LIMIT);
    items
}

pub async fn load_activity(store: &dyn Store) -> Result<Vec<ActivityItem>, CoreError> {
    let responses = store.list_responses().await?;
    let assignments = store.list_assignments().await?;
    let signatures = store.list_signatures().await?;
    Ok(recent_activity(&responses, &assignments, &signatures))
}
