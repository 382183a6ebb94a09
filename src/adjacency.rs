//! Pairwise legislator similarity.
//!
//! Every metric is expressed through Gram products of indicator matrices:
//! for a recoded matrix `X` (votes x legislators) and a value `v`, `I_v` marks
//! the cells equal to `v`, and `I_v' I_w` counts, for each pair of
//! legislators, the events where the first cast `v` and the second cast `w`.

use ndarray::Array2;
use tracing::{debug, info};

use crate::error::{AdjacencyError, PolicyError};
use crate::incidence::{IncidenceMatrix, RecodedMatrix};
use crate::policy::{Metric, PolicySet};

/// Symmetric legislator x legislator similarity scores.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyMatrix {
    legislators: Vec<i64>,
    values: Array2<f64>,
}

impl AdjacencyMatrix {
    pub fn new(legislators: Vec<i64>, values: Array2<f64>) -> Result<Self, AdjacencyError> {
        let (rows, cols) = values.dim();
        if rows != legislators.len() || cols != legislators.len() {
            return Err(AdjacencyError::NotSquare {
                legislators: legislators.len(),
                rows,
                cols,
            });
        }
        Ok(Self {
            legislators,
            values,
        })
    }

    pub fn legislators(&self) -> &[i64] {
        &self.legislators
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.legislators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legislators.is_empty()
    }

    pub fn position(&self, legislator: i64) -> Option<usize> {
        self.legislators.iter().position(|&id| id == legislator)
    }

    /// Score between two legislators, if both are present.
    pub fn get(&self, a: i64, b: i64) -> Option<f64> {
        Some(self.values[[self.position(a)?, self.position(b)?]])
    }

    pub fn is_symmetric(&self) -> bool {
        self.values == self.values.t()
    }
}

/// Builds the adjacency matrix of `incidence` under `policies`.
///
/// Scores are divided by the number of vote events; the diagonal holds each
/// legislator's score against themself.
pub fn build_adjacency(incidence: &IncidenceMatrix, policies: &PolicySet) -> AdjacencyMatrix {
    let recoded = incidence.recode(policies.obstruction, policies.abstention);
    let metric = policies.metric();
    debug!(?metric, %policies, "scoring legislator pairs");

    let mut values = score(metric, &recoded);
    let n = recoded.vote_count();
    if n > 0 {
        values /= n as f64;
    }
    mirror_upper(&mut values);

    info!(
        legislators = incidence.legislators().len(),
        votes = n,
        %policies,
        "built adjacency matrix"
    );

    AdjacencyMatrix {
        legislators: incidence.legislators().to_vec(),
        values,
    }
}

/// Same as [`build_adjacency`], taking policy names. Unsupported names are
/// rejected before the matrix is read.
pub fn build_adjacency_named(
    incidence: &IncidenceMatrix,
    abstention: &str,
    obstruction: &str,
    agreement: bool,
) -> Result<AdjacencyMatrix, PolicyError> {
    let policies = PolicySet::parse(abstention, obstruction, agreement)?;
    Ok(build_adjacency(incidence, &policies))
}

/// Un-normalized pairwise scores.
pub fn score(metric: Metric, recoded: &RecodedMatrix) -> Array2<f64> {
    match metric {
        Metric::DotProduct => dot_product(recoded),
        Metric::PartialDot => partial_dot(recoded),
        Metric::EqualityBalance => equality_balance(recoded),
        Metric::CoParticipation => co_participation(recoded),
        Metric::Agreement => agreement(recoded),
    }
}

fn dot_product(recoded: &RecodedMatrix) -> Array2<f64> {
    let x = recoded.values();
    x.t().dot(x)
}

fn partial_dot(recoded: &RecodedMatrix) -> Array2<f64> {
    let both_abstained = {
        let abstained = indicator(recoded.values(), |v| v == 0.5);
        abstained.t().dot(&abstained)
    };
    let against_abstained = pair_counts(recoded, |v, w| v + w == -0.5);

    dot_product(recoded) + both_abstained * 0.25 + against_abstained
}

fn equality_balance(recoded: &RecodedMatrix) -> Array2<f64> {
    // Both-zero events count once as equal and once as opposite, so zero is skipped.
    let equal = pair_counts(recoded, |v, w| v != 0.0 && v == w);
    let opposite = pair_counts(recoded, |v, w| v != 0.0 && v + w == 0.0);
    equal - opposite
}

fn co_participation(recoded: &RecodedMatrix) -> Array2<f64> {
    let both = participation(recoded);
    let equal = pair_counts(recoded, |v, w| v != 0.0 && v == w);
    equal * 2.0 - both
}

fn agreement(recoded: &RecodedMatrix) -> Array2<f64> {
    let n = recoded.vote_count() as f64;
    let both = participation(recoded);
    let mut equal = pair_counts(recoded, |v, w| v != 0.0 && v == w);

    ndarray::Zip::from(&mut equal).and(&both).for_each(|e, &b| {
        *e = if b == 0.0 { 0.0 } else { n * *e / b };
    });
    equal
}

/// Events where both legislators have a non-zero value.
fn participation(recoded: &RecodedMatrix) -> Array2<f64> {
    let present = indicator(recoded.values(), |v| v != 0.0);
    present.t().dot(&present)
}

/// Sum of `I_v' I_w` over the value pairs accepted by `accept`.
fn pair_counts(recoded: &RecodedMatrix, accept: impl Fn(f64, f64) -> bool) -> Array2<f64> {
    let x = recoded.values();
    let distinct = recoded.distinct_values();
    let indicators = distinct
        .iter()
        .map(|&v| indicator(x, |cell| cell == v))
        .collect::<Vec<_>>();

    let mut counts = Array2::zeros((x.ncols(), x.ncols()));
    for (i, &v) in distinct.iter().enumerate() {
        for (j, &w) in distinct.iter().enumerate() {
            if accept(v, w) {
                counts += &indicators[i].t().dot(&indicators[j]);
            }
        }
    }
    counts
}

fn indicator(x: &Array2<f64>, pred: impl Fn(f64) -> bool) -> Array2<f64> {
    x.mapv(|v| if pred(v) { 1.0 } else { 0.0 })
}

/// Copies the upper triangle over the lower one.
fn mirror_upper(values: &mut Array2<f64>) {
    let n = values.nrows();
    for i in 0..n {
        for j in 0..i {
            values[[i, j]] = values[[j, i]];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{AbstentionPolicy, ObstructionPolicy};
    use ndarray::array;

    fn incidence(legislators: Vec<i64>, rows: &[Vec<Option<f64>>]) -> IncidenceMatrix {
        IncidenceMatrix::from_rows(legislators, rows).unwrap()
    }

    fn policies(abstention: AbstentionPolicy, obstruction: ObstructionPolicy) -> PolicySet {
        PolicySet::new(abstention, obstruction, false)
    }

    #[test]
    fn plain_dot_product_on_a_small_case() {
        let m = incidence(
            vec![101, 102, 103],
            &[
                vec![Some(1.0), Some(-1.0), Some(0.0)],
                vec![Some(1.0), Some(1.0), Some(-1.0)],
            ],
        );
        let adj = build_adjacency(
            &m,
            &policies(AbstentionPolicy::Unknown, ObstructionPolicy::Same),
        );

        assert_eq!(adj.legislators(), &[101, 102, 103]);
        assert_eq!(
            adj.values(),
            &array![[1.0, 0.0, -0.5], [0.0, 1.0, -0.5], [-0.5, -0.5, 0.5]]
        );
        assert_eq!(adj.get(101, 103), Some(-0.5));
        assert_eq!(adj.get(101, 999), None);
    }

    #[test]
    fn partial_rewards_shared_and_against_abstentions() {
        // Events: both abstain, one abstains and the other is against,
        // one abstains and the other is in favor.
        let m = incidence(
            vec![1, 2],
            &[
                vec![Some(0.0), Some(0.0)],
                vec![Some(0.0), Some(-1.0)],
                vec![Some(1.0), Some(0.0)],
            ],
        );
        let adj = build_adjacency(
            &m,
            &policies(AbstentionPolicy::Partial, ObstructionPolicy::Against),
        );

        // (0.25 + 0.25) + (-0.5 + 1) + 0.5 = 1.5
        assert_eq!(adj.get(1, 2), Some(0.5));
        // 1: 0.25 + 0.25 + 0.25 + 0.25 + 1 = 2
        assert_eq!(adj.get(1, 1), Some(2.0 / 3.0));
    }

    #[test]
    fn equality_balance_ignores_position() {
        let m = incidence(
            vec![1, 2],
            &[
                vec![Some(1.0), Some(1.0)],
                vec![Some(-1.0), Some(1.0)],
                vec![Some(0.0), Some(0.0)],
                vec![None, None],
            ],
        );
        let adj = build_adjacency(
            &m,
            &policies(AbstentionPolicy::PartialUnknown, ObstructionPolicy::Against),
        );

        // equal: events 1 and 3 (both 0.5); opposite: event 2
        assert_eq!(adj.get(1, 2), Some(0.25));
        assert_eq!(adj.get(1, 1), Some(0.75));
    }

    #[test]
    fn co_participation_counts_only_shared_events() {
        let m = incidence(
            vec![1, 2],
            &[
                vec![Some(1.0), Some(1.0)],
                vec![Some(0.0), Some(-1.0)],
                vec![Some(1.0), None],
                vec![Some(0.0), Some(0.0)],
            ],
        );
        let adj = build_adjacency(&m, &policies(AbstentionPolicy::Same, ObstructionPolicy::Same));

        // +1 (equal) -1 (0.5 vs -1) +1 (both abstained); event 3 not shared
        assert_eq!(adj.get(1, 2), Some(0.25));
        assert_eq!(adj.get(1, 1), Some(1.0));
    }

    #[test]
    fn agreement_is_share_of_identical_shared_votes() {
        let m = incidence(
            vec![1, 2, 3],
            &[
                vec![Some(1.0), Some(1.0), None],
                vec![Some(-1.0), Some(1.0), None],
                vec![None, Some(0.0), None],
                vec![Some(1.0), Some(1.0), None],
            ],
        );
        let set = PolicySet::new(AbstentionPolicy::Same, ObstructionPolicy::Same, true);
        let adj = build_adjacency(&m, &set);

        // 2 identical out of 3 shared events, scaled by n then divided by n
        assert_eq!(adj.get(1, 2), Some(2.0 / 3.0));
        assert_eq!(adj.get(1, 1), Some(1.0));
        // never voted: degenerate pairs score zero
        assert_eq!(adj.get(1, 3), Some(0.0));
        assert_eq!(adj.get(3, 3), Some(0.0));
    }

    #[test]
    fn strong_majority_feeds_the_dot_product() {
        let m = incidence(vec![1, 2, 3, 4], &[vec![Some(1.0), Some(1.0), Some(-1.0), Some(0.0)]]);
        let adj = build_adjacency(
            &m,
            &policies(AbstentionPolicy::Strong, ObstructionPolicy::Against),
        );
        assert_eq!(adj.get(4, 1), Some(1.0));
        assert_eq!(adj.get(4, 3), Some(-1.0));
    }

    #[test]
    fn obstruction_policy_changes_scores() {
        let m = incidence(vec![1, 2], &[vec![Some(0.1), Some(-1.0)]]);
        let against = build_adjacency(
            &m,
            &policies(AbstentionPolicy::Unknown, ObstructionPolicy::Against),
        );
        let unknown = build_adjacency(
            &m,
            &policies(AbstentionPolicy::Unknown, ObstructionPolicy::Unknown),
        );
        assert_eq!(against.get(1, 2), Some(1.0));
        assert_eq!(unknown.get(1, 2), Some(0.0));
    }

    #[test]
    fn bogus_policy_fails_without_touching_input() {
        let m = incidence(vec![1, 2], &[vec![Some(0.0), Some(0.1)]]);
        let before = m.clone();

        let err = build_adjacency_named(&m, "bogus", "same", false).unwrap_err();
        assert!(err.to_string().contains("bogus"));
        assert!(build_adjacency_named(&m, "same", "bogus", false).is_err());
        assert_eq!(m, before);
    }

    #[test]
    fn no_votes_gives_zero_matrix() {
        let m = incidence(vec![1, 2], &[]);
        let adj = build_adjacency(&m, &policies(AbstentionPolicy::Same, ObstructionPolicy::Same));
        assert_eq!(adj.values(), &Array2::<f64>::zeros((2, 2)));
    }

    #[test]
    fn new_rejects_non_square() {
        let err = AdjacencyMatrix::new(vec![1, 2], Array2::zeros((2, 3))).unwrap_err();
        assert_eq!(
            err,
            AdjacencyError::NotSquare {
                legislators: 2,
                rows: 2,
                cols: 3
            }
        );
        assert_eq!(
            err.to_string(),
            "adjacency matrix over 2 legislators must be square, got 2x3"
        );
        assert!(AdjacencyMatrix::new(vec![1, 2], Array2::zeros((2, 2))).is_ok());
    }

    // Obstruction kept as its own category: a column pair over
    // (0.1, 0.1), (0.1, 1), (abstain, 0.1), (-1, 0.1), (0.1, missing).
    fn obstruction_kept() -> IncidenceMatrix {
        incidence(
            vec![1, 2],
            &[
                vec![Some(0.1), Some(0.1)],
                vec![Some(0.1), Some(1.0)],
                vec![Some(0.0), Some(0.1)],
                vec![Some(-1.0), Some(0.1)],
                vec![Some(0.1), None],
            ],
        )
    }

    #[test]
    fn partial_scores_obstruction_by_value() {
        let adj = build_adjacency(
            &obstruction_kept(),
            &policies(AbstentionPolicy::Partial, ObstructionPolicy::Same),
        );

        // 0.01 + 0.1 + 0.05 - 0.1 + 0 = 0.06; no shared or against abstentions
        assert!((adj.get(1, 2).unwrap() - 0.012).abs() < 1e-12);
        // 3 * 0.01 + 0.25 + 1 + 0.25 (own abstention) = 1.53
        assert!((adj.get(1, 1).unwrap() - 0.306).abs() < 1e-12);
    }

    #[test]
    fn partial_unknown_counts_shared_obstruction_as_equal() {
        let adj = build_adjacency(
            &obstruction_kept(),
            &policies(AbstentionPolicy::PartialUnknown, ObstructionPolicy::Same),
        );

        // only event 1 is equal, nothing is opposite
        assert_eq!(adj.get(1, 2), Some(0.2));
        assert_eq!(adj.get(1, 1), Some(1.0));
        assert_eq!(adj.get(2, 2), Some(0.8));
    }

    #[test]
    fn co_participation_treats_obstruction_as_taking_part() {
        let adj = build_adjacency(
            &obstruction_kept(),
            &policies(AbstentionPolicy::Same, ObstructionPolicy::Same),
        );

        // 4 shared events, 1 equal: 2 * 1 - 4
        assert_eq!(adj.get(1, 2), Some(-0.4));
        assert_eq!(adj.get(1, 1), Some(1.0));
    }

    #[test]
    fn agreement_over_shared_obstruction() {
        let set = PolicySet::new(AbstentionPolicy::Same, ObstructionPolicy::Same, true);
        let adj = build_adjacency(&obstruction_kept(), &set);

        // 1 identical out of 4 shared events
        assert_eq!(adj.get(1, 2), Some(0.25));
        assert_eq!(adj.get(1, 1), Some(1.0));
        assert_eq!(adj.get(2, 2), Some(1.0));
    }
}
