use gotrim_engine::{ClippedGossip, GoTrim, RankEstimator, RankKind, Retention};
use proptest::collection::vec;
use proptest::prelude::*;

/// A dataset of 2..12 values and a sequence of contacted pairs `i != j`.
fn dataset_and_contacts() -> impl Strategy<Value = (Vec<f64>, Vec<(usize, usize)>)> {
    (2usize..12).prop_flat_map(|n| {
        (
            vec(-100.0f64..100.0, n),
            vec((0..n, 1..n).prop_map(move |(i, d)| (i, (i + d) % n)), 1..150),
        )
    })
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut values = values.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

proptest! {
    #[test]
    fn go_rank_stays_in_unit_interval((data, contacts) in dataset_and_contacts()) {
        let horizon = contacts.len() + 1;
        let mut estimator = RankEstimator::new(RankKind::GoRank, horizon, &data, Retention::Full);
        for (t, &(i, j)) in (1..).zip(&contacts) {
            estimator.update(t, i, j);
            for &r in estimator.ranking().row(t) {
                prop_assert!((0.0..=1.0).contains(&r), "rank {} at step {}", r, t);
            }
        }
    }

    #[test]
    fn baselines_preserve_value_multiset((data, contacts) in dataset_and_contacts()) {
        let horizon = contacts.len() + 1;
        for kind in [RankKind::Baseline, RankKind::ImprovedBaseline] {
            let mut estimator = RankEstimator::new(kind, horizon, &data, Retention::Streaming);
            for (t, &(i, j)) in (1..).zip(&contacts) {
                estimator.update(t, i, j);
            }
            let (aux_values, aux_ranks) = match &estimator {
                RankEstimator::Baseline(b) => (b.aux_values(), b.aux_ranks()),
                RankEstimator::ImprovedBaseline(b) => (b.aux_values(), b.aux_ranks()),
                RankEstimator::GoRank(_) => unreachable!(),
            };
            prop_assert_eq!(sorted(aux_values), sorted(&data));
            let identity: Vec<f64> = (0..data.len()).map(|k| k as f64).collect();
            prop_assert_eq!(sorted(aux_ranks), identity);
        }
    }

    #[test]
    fn clipped_gossip_preserves_pair_sums(
        (data, contacts) in dataset_and_contacts(),
        tau in 0.01f64..50.0,
    ) {
        let horizon = contacts.len() + 1;
        let mut gossip = ClippedGossip::new(horizon, &data, tau, Retention::Full).unwrap();
        let total: f64 = data.iter().sum();
        for (t, &(i, j)) in (1..).zip(&contacts) {
            gossip.update_mean(t, i, j);
            let z = gossip.estimates();
            let before = z.row(t - 1)[i] + z.row(t - 1)[j];
            let after = z.row(t)[i] + z.row(t)[j];
            prop_assert!((before - after).abs() < 1e-9);
            prop_assert!((z.row(t)[i] - z.row(t - 1)[i]).abs() <= tau / 2.0 + 1e-9);
        }
        let final_total: f64 = gossip.estimates().latest().iter().sum();
        prop_assert!((final_total - total).abs() < 1e-6);
    }

    #[test]
    fn go_trim_mass_tracks_weights(
        (data, contacts) in dataset_and_contacts(),
        alpha in 0.0f64..0.3,
    ) {
        let horizon = contacts.len() + 1;
        for rank in RankKind::ALL {
            let mut trim = GoTrim::new(rank, horizon, &data, alpha, Retention::Full).unwrap();
            for (t, &(i, j)) in (1..).zip(&contacts) {
                trim.update(t, i, j);
                let z = trim.estimates();
                let before = z.row(t - 1)[i] + z.row(t - 1)[j];
                let after = z.row(t)[i] + z.row(t)[j];
                prop_assert!((before - after).abs() < 1e-6);

                // Total mass equals the weighted data sum of the current weights.
                let mass: f64 = z.row(t).iter().sum();
                let weighted: f64 = trim.weights().row(t).iter().zip(&data).map(|(w, x)| w * x).sum();
                prop_assert!((mass - weighted).abs() < 1e-6, "{} vs {}", mass, weighted);
            }
        }
    }
}
