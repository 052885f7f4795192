/// Rebuilds scores for ordered-set members copied without their original scores.
///
/// Only the member order survives a transfer. For `count` members in source
/// order and the job timestamp `timestamp`, scores are consecutive integers
/// ending exactly on `timestamp`: member `i` gets `timestamp - (count - 1) + i`.
pub fn reconstruct_scores(timestamp: i64, count: usize) -> Vec<f64> {
    let count = count as i64;
    let first = timestamp.saturating_sub(count - 1);
    (0..count).map(|i| (first + i) as f64).collect()
}
