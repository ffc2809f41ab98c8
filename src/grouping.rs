//! Near-duplicate grouping.
//!
//! Groups are star-shaped: every member was judged similar to the group's
//! seed, and members are never compared with each other. With A~B, B~C and
//! A≁C the result is {A, B} and {C}. Seeds are taken in scan order, so the
//! caller's ordering (best score first) decides which photo anchors a group.

use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::oracle::OracleError;
use crate::ranking::partition_valid;
use crate::record::PhotoRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLimits {
    /// Total oracle comparisons allowed per valid photo.
    pub comparisons_per_photo: usize,
    /// A group stops growing once it holds this many photos.
    pub max_group_size: usize,
    /// Groups larger than this are reported as suspicious.
    pub warn_group_size: usize,
}

impl Default for GroupLimits {
    fn default() -> Self {
        Self {
            comparisons_per_photo: 5,
            max_group_size: 10,
            warn_group_size: 5,
        }
    }
}

/// Indices into the grouped slice, one `Vec` per group, seed first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub groups: Vec<Vec<usize>>,
    pub comparisons: usize,
    pub budget_exhausted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    pub unique_shots: usize,
    pub duplicates_removed: usize,
    pub remaining: usize,
    pub comparisons: usize,
}

/// Partition `records` into groups of photos the oracle judged similar to a seed.
///
/// `similar` is called at most `comparisons_per_photo * records.len()` times.
/// An `Err` from it counts as "not similar".
pub fn partition_similar<F>(records: &[PhotoRecord], limits: &GroupLimits, mut similar: F) -> Partition
where
    F: FnMut(&PhotoRecord, &PhotoRecord) -> Result<bool, OracleError>,
{
    let budget = records.len() * limits.comparisons_per_photo;
    let mut processed: HashSet<&Path> = HashSet::with_capacity(records.len());
    let mut groups = Vec::new();
    let mut comparisons = 0;
    let mut budget_exhausted = false;

    for (i, seed) in records.iter().enumerate() {
        if processed.contains(seed.path.as_path()) {
            continue;
        }
        processed.insert(seed.path.as_path());
        let mut group = vec![i];

        for (j, candidate) in records.iter().enumerate().skip(i + 1) {
            if budget_exhausted {
                break;
            }
            if processed.contains(candidate.path.as_path()) {
                continue;
            }
            if group.len() >= limits.max_group_size {
                warn!(
                    "Group too large ({} photos), stopping growth at {}",
                    group.len(),
                    seed.file
                );
                break;
            }
            if comparisons >= budget {
                warn!("Stopping duplicate detection after {comparisons} comparisons (safety limit)");
                budget_exhausted = true;
                break;
            }

            comparisons += 1;
            let is_similar = similar(seed, candidate).unwrap_or_else(|err| {
                warn!("Error comparing {} & {}: {err}", seed.file, candidate.file);
                false
            });
            if is_similar {
                info!("Found similar: {} & {}", seed.file, candidate.file);
                processed.insert(candidate.path.as_path());
                group.push(j);
            }
        }

        if group.len() > limits.warn_group_size {
            warn!(
                "Large group detected ({} photos), may indicate comparison issues",
                group.len()
            );
        }
        groups.push(group);
    }

    Partition {
        groups,
        comparisons,
        budget_exhausted,
    }
}

/// Keep the best-scoring member of each group and record what it replaced.
///
/// Singletons get `similar_shots = 1`. Larger groups are stably sorted by score,
/// so ties go to the earlier photo; the rest become `alternatives`.
pub fn reduce_groups(records: Vec<PhotoRecord>, groups: &[Vec<usize>]) -> Vec<PhotoRecord> {
    let mut slots: Vec<Option<PhotoRecord>> = records.into_iter().map(Some).collect();
    let mut kept = Vec::with_capacity(groups.len());

    for group in groups {
        let mut members: Vec<PhotoRecord> = group.iter().filter_map(|&i| slots[i].take()).collect();
        members.sort_by(|a, b| b.score.cmp(&a.score));

        let size = members.len();
        let mut members = members.into_iter();
        let Some(mut best) = members.next() else {
            continue;
        };
        best.similar_shots = Some(size);
        if size > 1 {
            info!(
                "Keeping best: {} (score: {}) from {} similar shots",
                best.file, best.score, size
            );
            best.alternatives = Some(members.map(|r| r.file).collect());
        }
        kept.push(best);
    }

    kept
}

/// Collapse near-duplicates among the valid records of `records`.
///
/// Failed records (score 0) take no part and are appended after the
/// representatives in their original order. With fewer than two valid
/// records nothing is compared and `records` comes back untouched.
pub fn group_similar<F>(
    records: Vec<PhotoRecord>,
    limits: &GroupLimits,
    similar: F,
) -> (Vec<PhotoRecord>, Option<GroupingStats>)
where
    F: FnMut(&PhotoRecord, &PhotoRecord) -> Result<bool, OracleError>,
{
    let valid_count = records.iter().filter(|r| r.is_valid()).count();
    if valid_count < 2 {
        warn!("Too few valid photos for duplicate detection");
        return (records, None);
    }

    info!("Checking for duplicate/similar shots among {} photos...", records.len());
    let (valid, failed) = partition_valid(records);
    let partition = partition_similar(&valid, limits, similar);
    let mut kept = reduce_groups(valid, &partition.groups);

    let stats = GroupingStats {
        unique_shots: partition.groups.len(),
        duplicates_removed: valid_count - partition.groups.len(),
        remaining: kept.len() + failed.len(),
        comparisons: partition.comparisons,
    };
    kept.extend(failed);

    info!(
        "Duplicate detection summary: {} unique shots, {} duplicates removed, {} photos remain, {} comparisons",
        stats.unique_shots, stats.duplicates_removed, stats.remaining, stats.comparisons
    );
    (kept, Some(stats))
}
