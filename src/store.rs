//! On-disk layout for incidence matrices, adjacency artifacts and the
//! legislator table.
//!
//! ```text
//! <root>/tables/incidence_matrix_{legislature}.csv
//! <root>/tables/incidence_matrix_{legislature}_year_{year}.csv
//! <root>/tables/deputies.csv
//! <root>/graphs/adjacency_matrix_legislature_{legislature}_{abstention}_{obstruction}.csv
//! ```
//!
//! Artifacts built from a single year insert `_year_{year}` after the
//! legislature, mirroring the incidence file they came from.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use ndarray::Array2;
use polars::prelude::*;
use tracing::{debug, info};

use crate::adjacency::AdjacencyMatrix;
use crate::error::{Error, IncidenceError, Result};
use crate::incidence::IncidenceMatrix;
use crate::metadata::LegislatorDirectory;
use crate::policy::{AbstentionPolicy, ObstructionPolicy, PolicySet};

/// Stable identity of an adjacency artifact.
///
/// `year` is set when the artifact was built from a single year of the
/// legislature rather than the whole term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub legislature: u32,
    pub year: Option<u32>,
    pub abstention: AbstentionPolicy,
    pub obstruction: ObstructionPolicy,
}

impl ArtifactKey {
    pub fn new(
        legislature: u32,
        abstention: AbstentionPolicy,
        obstruction: ObstructionPolicy,
    ) -> Self {
        Self {
            legislature,
            year: None,
            abstention,
            obstruction,
        }
    }

    pub fn for_policies(legislature: u32, policies: &PolicySet) -> Self {
        Self::new(legislature, policies.abstention, policies.obstruction)
    }

    pub fn with_year(self, year: Option<u32>) -> Self {
        Self { year, ..self }
    }

    pub fn name(&self) -> String {
        let scope = match self.year {
            Some(year) => format!("{}_year_{year}", self.legislature),
            None => self.legislature.to_string(),
        };
        format!(
            "adjacency_matrix_legislature_{scope}_{}_{}",
            self.abstention, self.obstruction
        )
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.root.join("tables")
    }

    pub fn graphs_dir(&self) -> PathBuf {
        self.root.join("graphs")
    }

    pub fn incidence_path(&self, legislature: u32, year: Option<u32>) -> PathBuf {
        let name = match year {
            Some(year) => format!("incidence_matrix_{legislature}_year_{year}.csv"),
            None => format!("incidence_matrix_{legislature}.csv"),
        };
        self.tables_dir().join(name)
    }

    pub fn deputies_path(&self) -> PathBuf {
        self.tables_dir().join("deputies.csv")
    }

    pub fn adjacency_path(&self, key: &ArtifactKey) -> PathBuf {
        self.graphs_dir().join(format!("{}.csv", key.name()))
    }

    pub fn ensure_layout(&self) -> Result<()> {
        fs::create_dir_all(self.tables_dir())?;
        fs::create_dir_all(self.graphs_dir())?;
        Ok(())
    }

    pub fn has_adjacency(&self, key: &ArtifactKey) -> bool {
        self.adjacency_path(key).is_file()
    }

    pub fn load_incidence(&self, legislature: u32, year: Option<u32>) -> Result<IncidenceMatrix> {
        read_incidence_csv(&self.incidence_path(legislature, year))
    }

    pub fn load_adjacency(&self, key: &ArtifactKey) -> Result<AdjacencyMatrix> {
        read_adjacency_csv(&self.adjacency_path(key))
    }

    /// Writes the artifact, replacing any previous one with the same key.
    pub fn save_adjacency(&self, key: &ArtifactKey, matrix: &AdjacencyMatrix) -> Result<PathBuf> {
        fs::create_dir_all(self.graphs_dir())?;
        let path = self.adjacency_path(key);
        write_adjacency_csv(&path, matrix)?;
        info!(artifact = %key, path = %path.display(), "saved adjacency matrix");
        Ok(path)
    }

    pub fn load_directory(&self) -> Result<LegislatorDirectory> {
        LegislatorDirectory::from_path(&self.deputies_path())
    }
}

/// First column holds row labels, the header holds column labels.
struct LabeledTable {
    rows: Vec<String>,
    columns: Vec<String>,
    values: Array2<f64>,
}

fn read_labeled_table(path: &Path) -> Result<LabeledTable> {
    let df = CsvReader::from_path(path)?
        .has_header(true)
        .infer_schema(None)
        .finish()?;
    debug!(path = %path.display(), shape = ?df.shape(), "read table");

    let Some((index, rest)) = df.get_columns().split_first() else {
        return Ok(LabeledTable {
            rows: Vec::new(),
            columns: Vec::new(),
            values: Array2::zeros((0, 0)),
        });
    };

    let rows = index
        .cast(&DataType::Utf8)?
        .utf8()?
        .into_iter()
        .map(|label| label.unwrap_or_default().to_string())
        .collect::<Vec<_>>();

    let mut values = Array2::from_elem((rows.len(), rest.len()), f64::NAN);
    let mut columns = Vec::with_capacity(rest.len());
    for (j, series) in rest.iter().enumerate() {
        let cells = series.strict_cast(&DataType::Float64)?;
        for (i, cell) in cells.f64()?.into_iter().enumerate() {
            values[[i, j]] = cell.unwrap_or(f64::NAN);
        }
        columns.push(series.name().to_string());
    }

    Ok(LabeledTable {
        rows,
        columns,
        values,
    })
}

/// Accepts `123` as well as `123.0`, which spreadsheet round trips produce.
pub fn parse_legislator_id(label: &str) -> std::result::Result<i64, IncidenceError> {
    let label = label.trim();
    if let Ok(id) = label.parse::<i64>() {
        return Ok(id);
    }
    match label.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => Ok(value as i64),
        _ => Err(IncidenceError::InvalidLegislatorId(label.to_string())),
    }
}

pub fn read_incidence_csv(path: &Path) -> Result<IncidenceMatrix> {
    let table = read_labeled_table(path)?;
    let legislators = table
        .columns
        .iter()
        .map(|label| parse_legislator_id(label))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(IncidenceMatrix::new(table.rows, legislators, table.values)?)
}

pub fn read_adjacency_csv(path: &Path) -> Result<AdjacencyMatrix> {
    let malformed = |reason: String| Error::MalformedAdjacency(path.display().to_string(), reason);

    let table = read_labeled_table(path)?;
    let legislators = table
        .columns
        .iter()
        .map(|label| parse_legislator_id(label))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let row_ids = table
        .rows
        .iter()
        .map(|label| parse_legislator_id(label))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if row_ids != legislators {
        return Err(malformed(
            "row and column legislators differ".to_string(),
        ));
    }

    AdjacencyMatrix::new(legislators, table.values).map_err(|e| malformed(e.to_string()))
}

pub fn write_adjacency_csv(path: &Path, matrix: &AdjacencyMatrix) -> Result<()> {
    let mut columns = Vec::with_capacity(matrix.len() + 1);
    columns.push(Series::new("legislator", matrix.legislators()));
    for (j, id) in matrix.legislators().iter().enumerate() {
        let column = matrix.values().column(j).to_vec();
        columns.push(Series::new(&id.to_string(), column));
    }

    let mut df = DataFrame::new(columns)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}
