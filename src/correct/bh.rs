//! Benjamini-Hochberg false discovery rate correction.

/// Apply Benjamini-Hochberg FDR correction to a batch of p-values.
///
/// For each p-value, the adjusted p-value (q-value) is calculated as:
/// q[i] = min(p[i] * m / rank[i], q[i+1]), capped at 1, where m is the
/// number of finite p-values in the batch. NaN p-values are left out of m
/// and get a NaN q-value. Ties in p get equal q.
///
/// The correction needs the whole batch; calling it per row is not
/// equivalent.
///
/// # Arguments
/// * `p_values` - Raw p-values, in any order
///
/// # Returns
/// q-values in the same order as the input.
pub fn correct(p_values: &[f64]) -> Vec<f64> {
    let mut q_values = vec![f64::NAN; p_values.len()];

    // Sorted index over testable entries only
    let mut indices: Vec<usize> = (0..p_values.len())
        .filter(|&i| p_values[i].is_finite())
        .collect();
    let m = indices.len();
    if m == 0 {
        return q_values;
    }
    indices.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let m_f64 = m as f64;
    let mut running = 1.0_f64;

    // Work backwards from the largest p-value
    for rank in (1..=m).rev() {
        let idx = indices[rank - 1];
        let adjusted = p_values[idx] * m_f64 / rank as f64;
        running = running.min(adjusted).min(1.0);
        q_values[idx] = running;
    }

    q_values
}

/// Count q-values below a threshold.
pub fn n_significant(q_values: &[f64], alpha: f64) -> usize {
    q_values.iter().filter(|&&q| q < alpha).count()
}
