use crate::record::PhotoRecord;

/// Stable sort, best score first. Equal scores keep their current order.
pub fn rank_by_score(records: &mut [PhotoRecord]) {
    records.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Split into (valid, failed), preserving relative order within each side.
pub fn partition_valid(records: Vec<PhotoRecord>) -> (Vec<PhotoRecord>, Vec<PhotoRecord>) {
    records.into_iter().partition(PhotoRecord::is_valid)
}
