//! Deterministic ordering of route records
//!
//! The first record in this order whose pattern matches a path wins, so the
//! comparator encodes specificity: static before dynamic, named parameters
//! before catch-alls, ordinary catch-alls before `*not-found`.
//!
//! The comparator is not a strict total order for every configuration, so
//! records are ordered with a stable insertion sort that tolerates it.

use std::cmp::Ordering;

use super::compiler::{RouteKind, RouteRecord};
use super::segment::{is_group_segment, RouteSegment};

/// Compares two records; `Less` means `a` is tried first
pub fn compare_routes(a: &RouteRecord, b: &RouteRecord, previous_segments: &[String]) -> Ordering {
    // Same pattern: nested screens share the pattern of their parent
    if a.pattern == b.pattern {
        return b.screens.join(">").cmp(&a.screens.join(">"));
    }

    if a.pattern.starts_with(&b.pattern) && !b.is_index {
        return Ordering::Less;
    }
    if b.pattern.starts_with(&a.pattern) && !a.is_index {
        return Ordering::Greater;
    }

    match (a.kind == RouteKind::Static, b.kind == RouteKind::Static) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    if !previous_segments.is_empty() {
        let a_shared = shared_groups(a, previous_segments);
        let b_shared = shared_groups(b, previous_segments);
        if (a_shared > 0 || b_shared > 0) && a_shared != b_shared {
            return b_shared.cmp(&a_shared);
        }
    }

    let longest = a.parts.len().max(b.parts.len());
    for i in 0..longest {
        let (a_part, b_part) = match (a.parts.get(i), b.parts.get(i)) {
            (None, _) => return Ordering::Greater,
            (_, None) => return Ordering::Less,
            (Some(a_part), Some(b_part)) => (a_part, b_part),
        };

        match (catch_all_rank(a_part), catch_all_rank(b_part)) {
            (Some(a_rank), Some(b_rank)) => {
                if a_rank != b_rank {
                    return a_rank.cmp(&b_rank);
                }
                continue;
            }
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => {}
        }

        let a_param = matches!(a_part, RouteSegment::Param { .. });
        let b_param = matches!(b_part, RouteSegment::Param { .. });
        match (a_param, b_param) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
    }

    match (a.is_initial, b.is_initial) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => b.parts.len().cmp(&a.parts.len()),
    }
}

/// `Some(0)` for an ordinary catch-all, `Some(1)` for `*not-found`
fn catch_all_rank(part: &RouteSegment) -> Option<u8> {
    match part {
        RouteSegment::CatchAll { name, .. } if name == "not-found" => Some(1),
        RouteSegment::CatchAll { .. } => Some(0),
        _ => None,
    }
}

/// Groups in the leading run of names shared with the displayed segments
fn shared_groups(record: &RouteRecord, previous_segments: &[String]) -> usize {
    record
        .expanded_route_names
        .iter()
        .zip(previous_segments)
        .take_while(|(name, previous)| name == previous)
        .filter(|(name, _)| is_group_segment(name))
        .count()
}

/// Sorts records in place into match order
pub fn sort_routes(records: &mut [RouteRecord], previous_segments: &[String]) {
    for i in 1..records.len() {
        let mut j = i;
        while j > 0 && compare_routes(&records[j], &records[j - 1], previous_segments) == Ordering::Less {
            records.swap(j, j - 1);
            j -= 1;
        }
    }
}
