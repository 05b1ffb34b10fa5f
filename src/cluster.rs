// Risk-profile clustering.
//
// Standardizes the 7-feature matrix over the batch, then partitions it with
// k-means (Lloyd iteration, multiple seeded restarts, best inertia wins).
// Labels carry no intrinsic ranking; only the per-cluster feature means
// reported alongside give them meaning.
use crate::features::FeatureVector;
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const DEFAULT_CLUSTERS: usize = 5;
/// Fixed seed so reruns on the same batch reproduce the same labels.
pub const KMEANS_SEED: u64 = 42;
const RESTARTS: usize = 10;
const MAX_ITERATIONS: usize = 300;

/// Aggregate view of one cluster: member count and the mean of each
/// standardized feature over its members.
#[derive(Debug, Clone)]
pub struct ClusterProfile {
    pub cluster: usize,
    pub count: usize,
    pub means: [f64; 7],
}

/// Zero-mean unit-variance scaling per feature, computed over the batch.
/// A zero-variance column keeps divisor 1 and so maps to all zeros.
pub fn standardize(features: &[FeatureVector]) -> Vec<[f64; 7]> {
    let n = features.len();
    if n == 0 {
        return Vec::new();
    }
    let rows: Vec<[f64; 7]> = features.iter().map(|f| f.as_array()).collect();

    let mut means = [0.0f64; 7];
    for row in &rows {
        for (m, v) in means.iter_mut().zip(row) {
            *m += v;
        }
    }
    for m in &mut means {
        *m /= n as f64;
    }

    let mut stds = [0.0f64; 7];
    for row in &rows {
        for ((s, v), m) in stds.iter_mut().zip(row).zip(&means) {
            *s += (v - m) * (v - m);
        }
    }
    for s in &mut stds {
        *s = (*s / n as f64).sqrt();
        if *s < f64::EPSILON {
            *s = 1.0;
        }
    }

    rows.iter()
        .map(|row| {
            let mut z = [0.0f64; 7];
            for i in 0..7 {
                z[i] = (row[i] - means[i]) / stds[i];
            }
            z
        })
        .collect()
}

fn squared_distance(a: &[f64; 7], b: &[f64; 7]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest_centroid(point: &[f64; 7], centroids: &[[f64; 7]]) -> (usize, f64) {
    let mut best = (0usize, f64::MAX);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// One Lloyd run from a given initialization. Returns (labels, inertia).
fn lloyd(rows: &[[f64; 7]], mut centroids: Vec<[f64; 7]>) -> (Vec<usize>, f64) {
    let k = centroids.len();
    let mut labels = vec![0usize; rows.len()];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (i, row) in rows.iter().enumerate() {
            let (label, _) = nearest_centroid(row, &centroids);
            if labels[i] != label {
                labels[i] = label;
                changed = true;
            }
        }

        let mut sums = vec![[0.0f64; 7]; k];
        let mut counts = vec![0usize; k];
        for (row, label) in rows.iter().zip(&labels) {
            counts[*label] += 1;
            for (s, v) in sums[*label].iter_mut().zip(row) {
                *s += v;
            }
        }
        for c in 0..k {
            if counts[c] == 0 {
                // Reseed an emptied cluster from the point farthest from its
                // current centroid.
                let far = rows
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| {
                        let da = nearest_centroid(a, &centroids).1;
                        let db = nearest_centroid(b, &centroids).1;
                        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                centroids[c] = rows[far];
                continue;
            }
            for i in 0..7 {
                centroids[c][i] = sums[c][i] / counts[c] as f64;
            }
        }

        if !changed {
            break;
        }
    }

    let inertia = rows
        .iter()
        .zip(&labels)
        .map(|(row, label)| squared_distance(row, &centroids[*label]))
        .sum();
    (labels, inertia)
}

/// Standardize and cluster a feature batch into `k` groups. `k` is clamped
/// to the batch size; an empty batch yields no labels.
pub fn cluster_buildings(
    features: &[FeatureVector],
    k: usize,
) -> (Vec<usize>, Vec<ClusterProfile>) {
    let rows = standardize(features);
    if rows.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let k = k.clamp(1, rows.len());

    let mut rng = ChaCha8Rng::seed_from_u64(KMEANS_SEED);
    let mut best: Option<(Vec<usize>, f64)> = None;
    for _ in 0..RESTARTS {
        let init: Vec<[f64; 7]> = sample(&mut rng, rows.len(), k)
            .iter()
            .map(|i| rows[i])
            .collect();
        let (labels, inertia) = lloyd(&rows, init);
        if best.as_ref().map(|(_, b)| inertia < *b).unwrap_or(true) {
            best = Some((labels, inertia));
        }
    }
    let (labels, _) = best.unwrap_or((vec![0; rows.len()], 0.0));

    let mut profiles: Vec<ClusterProfile> = (0..k)
        .map(|cluster| ClusterProfile {
            cluster,
            count: 0,
            means: [0.0; 7],
        })
        .collect();
    for (row, label) in rows.iter().zip(&labels) {
        profiles[*label].count += 1;
        for (m, v) in profiles[*label].means.iter_mut().zip(row) {
            *m += v;
        }
    }
    for p in &mut profiles {
        if p.count > 0 {
            for m in &mut p.means {
                *m /= p.count as f64;
            }
        }
    }

    (labels, profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(v: f64) -> FeatureVector {
        FeatureVector {
            age_risk: v,
            size_impact: v,
            energy_risk: v,
            climate_risk: v,
            social_vulnerability: v,
            floor_count_norm: v,
            has_basement: 0.0,
        }
    }

    #[test]
    fn standardize_maps_constant_column_to_zeros() {
        let batch = vec![fv(0.5), fv(0.5), fv(0.5)];
        for row in standardize(&batch) {
            assert_eq!(row, [0.0; 7]);
        }
    }

    #[test]
    fn standardize_centers_and_scales() {
        let batch = vec![fv(0.0), fv(1.0)];
        let z = standardize(&batch);
        // Mean 0.5, population std 0.5: values land on -1 and +1.
        assert!((z[0][0] + 1.0).abs() < 1e-12);
        assert!((z[1][0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn labels_are_in_range_and_deterministic() {
        let batch: Vec<FeatureVector> =
            (0..20).map(|i| fv(i as f64 / 19.0)).collect();
        let (labels_a, profiles) = cluster_buildings(&batch, 5);
        let (labels_b, _) = cluster_buildings(&batch, 5);
        assert_eq!(labels_a, labels_b);
        assert!(labels_a.iter().all(|l| *l < 5));
        assert_eq!(profiles.iter().map(|p| p.count).sum::<usize>(), 20);
    }

    #[test]
    fn well_separated_groups_end_up_in_different_clusters() {
        let mut batch: Vec<FeatureVector> = (0..10).map(|_| fv(0.05)).collect();
        batch.extend((0..10).map(|_| fv(0.95)));
        let (labels, _) = cluster_buildings(&batch, 2);
        let low = labels[0];
        assert!(labels[..10].iter().all(|l| *l == low));
        assert!(labels[10..].iter().all(|l| *l != low));
    }

    #[test]
    fn k_is_clamped_to_batch_size() {
        let batch = vec![fv(0.1), fv(0.9)];
        let (labels, profiles) = cluster_buildings(&batch, 5);
        assert_eq!(labels.len(), 2);
        assert_eq!(profiles.len(), 2);
    }
}
