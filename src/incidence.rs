//! Vote-event by legislator incidence matrices and their policy recoding.

use std::collections::HashSet;

use ndarray::{Array1, Array2, Axis, Zip};
use tracing::debug;

use crate::error::IncidenceError;
use crate::policy::{AbstentionPolicy, ObstructionPolicy};

/// Numeric vote outcome codes found in incidence matrices.
pub mod code {
    pub const FAVOR: f64 = 1.0;
    pub const AGAINST: f64 = -1.0;
    pub const ABSTENTION: f64 = 0.0;
    pub const OBSTRUCTION: f64 = 0.1;
    /// "Favorable with restrictions".
    pub const CONDITIONAL_FAVOR: f64 = 0.5;
    /// Presiding officer, barred from voting by article 17.
    pub const ARTICLE_17: f64 = 17.0;
    pub const SECRET: f64 = 255.0;
    pub const BLANK: f64 = 278.0;

    /// Codes that never carry a usable position.
    pub const NEUTRALIZED: [f64; 4] = [CONDITIONAL_FAVOR, ARTICLE_17, SECRET, BLANK];

    pub const ALL: [f64; 8] = [
        FAVOR,
        AGAINST,
        ABSTENTION,
        OBSTRUCTION,
        CONDITIONAL_FAVOR,
        ARTICLE_17,
        SECRET,
        BLANK,
    ];

    pub fn is_recognized(value: f64) -> bool {
        value.is_nan() || ALL.contains(&value)
    }
}

/// Raw vote outcomes: one row per vote event, one column per legislator.
/// Missing participation is `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidenceMatrix {
    votes: Vec<String>,
    legislators: Vec<i64>,
    values: Array2<f64>,
}

impl IncidenceMatrix {
    pub fn new(
        votes: Vec<String>,
        legislators: Vec<i64>,
        values: Array2<f64>,
    ) -> Result<Self, IncidenceError> {
        let (rows, cols) = values.dim();
        if rows != votes.len() || cols != legislators.len() {
            return Err(IncidenceError::ShapeMismatch {
                expected_rows: votes.len(),
                expected_cols: legislators.len(),
                rows,
                cols,
            });
        }

        let mut seen = HashSet::with_capacity(legislators.len());
        for &id in &legislators {
            if !seen.insert(id) {
                return Err(IncidenceError::DuplicateLegislator(id));
            }
        }

        if let Some(((row, col), &value)) = values
            .indexed_iter()
            .find(|(_, &value)| !code::is_recognized(value))
        {
            return Err(IncidenceError::UnrecognizedVoteCode {
                vote: votes[row].clone(),
                legislator: legislators[col],
                value,
            });
        }

        Ok(Self {
            votes,
            legislators,
            values,
        })
    }

    /// Builds a matrix from rows of cells, `None` meaning the legislator did
    /// not take part. Vote events are named by their row position.
    pub fn from_rows(
        legislators: Vec<i64>,
        rows: &[Vec<Option<f64>>],
    ) -> Result<Self, IncidenceError> {
        let cols = legislators.len();
        if let Some(bad) = rows.iter().find(|row| row.len() != cols) {
            return Err(IncidenceError::ShapeMismatch {
                expected_rows: rows.len(),
                expected_cols: cols,
                rows: rows.len(),
                cols: bad.len(),
            });
        }

        let flat = rows
            .iter()
            .flatten()
            .map(|cell| cell.unwrap_or(f64::NAN))
            .collect::<Vec<_>>();
        let values = Array2::from_shape_vec((rows.len(), cols), flat).map_err(|_| {
            IncidenceError::ShapeMismatch {
                expected_rows: rows.len(),
                expected_cols: cols,
                rows: rows.len(),
                cols,
            }
        })?;
        let votes = (0..rows.len()).map(|i| i.to_string()).collect();

        Self::new(votes, legislators, values)
    }

    pub fn votes(&self) -> &[String] {
        &self.votes
    }

    pub fn legislators(&self) -> &[i64] {
        &self.legislators
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of vote events.
    pub fn vote_count(&self) -> usize {
        self.values.nrows()
    }

    /// Applies the obstruction and abstention policies to a copy of the
    /// matrix and fills the remaining gaps with `0`.
    pub fn recode(
        &self,
        obstruction: ObstructionPolicy,
        abstention: AbstentionPolicy,
    ) -> RecodedMatrix {
        let mut values = self.values.mapv(neutralize);

        match obstruction {
            ObstructionPolicy::Against => replace(&mut values, code::OBSTRUCTION, code::AGAINST),
            ObstructionPolicy::Unknown => replace(&mut values, code::OBSTRUCTION, f64::NAN),
            ObstructionPolicy::Same => {}
        }

        match abstention {
            AbstentionPolicy::Unknown => {}
            AbstentionPolicy::Partial
            | AbstentionPolicy::PartialUnknown
            | AbstentionPolicy::Same => replace(&mut values, code::ABSTENTION, 0.5),
            AbstentionPolicy::Strong => follow_majority(&mut values),
        }

        values.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v });
        debug!(
            votes = values.nrows(),
            legislators = values.ncols(),
            %obstruction,
            %abstention,
            "recoded incidence matrix"
        );

        RecodedMatrix { values }
    }
}

/// Incidence matrix after policy recoding. Only used to compute scores.
#[derive(Debug, Clone, PartialEq)]
pub struct RecodedMatrix {
    values: Array2<f64>,
}

impl RecodedMatrix {
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn vote_count(&self) -> usize {
        self.values.nrows()
    }

    /// Distinct values present, in ascending order.
    pub fn distinct_values(&self) -> Vec<f64> {
        let mut distinct: Vec<f64> = Vec::new();
        for &v in &self.values {
            if !distinct.contains(&v) {
                distinct.push(v);
            }
        }
        distinct.sort_by(f64::total_cmp);
        distinct
    }
}

fn neutralize(value: f64) -> f64 {
    if code::NEUTRALIZED.contains(&value) {
        f64::NAN
    } else {
        value
    }
}

fn replace(values: &mut Array2<f64>, from: f64, to: f64) {
    values.mapv_inplace(|v| if v == from { to } else { v });
}

/// Replaces each abstention with the sign of its vote event's total.
///
/// Totals are kept in whole tenths so that obstructions (`0.1`) cancel out
/// exactly; a float sum of ten `0.1`s is not `1.0`.
fn follow_majority(values: &mut Array2<f64>) {
    let majority: Array1<f64> = values.map_axis(Axis(1), |row| {
        let tenths = row
            .iter()
            .filter(|v| !v.is_nan())
            .map(|v| (v * 10.0).round() as i64)
            .sum::<i64>();
        tenths.signum() as f64
    });

    Zip::from(values.rows_mut())
        .and(&majority)
        .for_each(|mut row, &outcome| {
            row.mapv_inplace(|v| if v == code::ABSTENTION { outcome } else { v });
        });
}
