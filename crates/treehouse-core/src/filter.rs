//! Filtering and ordering of scan results

use crate::types::{WorktreeRecord, WorktreeStatus};

/// Keep records matching `query` and, if given, `status`.
///
/// The query is a case-insensitive substring match against branch name, id
/// and path. A blank query matches everything.
pub fn filter_records(
    records: Vec<WorktreeRecord>,
    query: &str,
    status: Option<WorktreeStatus>,
) -> Vec<WorktreeRecord> {
    let needle = query.trim().to_lowercase();

    records
        .into_iter()
        .filter(|r| status.is_none_or(|s| r.status == s))
        .filter(|r| {
            needle.is_empty()
                || r.branch_name.to_lowercase().contains(&needle)
                || r.id.to_lowercase().contains(&needle)
                || r.path.to_string_lossy().to_lowercase().contains(&needle)
        })
        .collect()
}

/// Reorder `records` so ids listed in `order` come first, in that order.
///
/// Unknown ids in `order` are ignored; records not named keep their scan
/// order after the ordered ones.
pub fn apply_order(records: Vec<WorktreeRecord>, order: &[String]) -> Vec<WorktreeRecord> {
    if order.is_empty() {
        return records;
    }

    let mut remaining: Vec<Option<WorktreeRecord>> = records.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(remaining.len());

    for id in order {
        if let Some(slot) = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|r| &r.id == id))
        {
            ordered.extend(slot.take());
        }
    }
    ordered.extend(remaining.into_iter().flatten());
    ordered
}
