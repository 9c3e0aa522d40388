use testsync_core::types::Test;

/// Combine kept and newly created tests, sorted ascending by `path`.
///
/// Paths compare byte-wise. The sort is stable, so equal paths keep their
/// insertion order with kept tests ahead of created ones.
pub fn merge_sorted(kept: Vec<Test>, created: Vec<Test>) -> Vec<Test> {
    let mut combined = kept;
    combined.extend(created);
    combined.sort_by(|a, b| a.path.cmp(&b.path));
    combined
}
