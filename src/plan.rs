//! Batch generation of adjacency artifacts over legislatures and policy sets.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::adjacency::build_adjacency;
use crate::error::Result;
use crate::policy::{AbstentionPolicy, ObstructionPolicy, PolicySet};
use crate::store::{ArtifactKey, ArtifactStore};

/// Which artifacts to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunPlan {
    pub legislatures: Vec<u32>,
    /// Restrict every legislature to the incidence matrix of this year.
    pub year: Option<u32>,
    pub parameters: Vec<PolicySet>,
    /// Leave artifacts that already exist on disk alone.
    pub skip_existing: bool,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            legislatures: (52..=56).collect(),
            year: None,
            parameters: vec![
                PolicySet::new(AbstentionPolicy::PartialUnknown, ObstructionPolicy::Against, false),
                PolicySet::new(AbstentionPolicy::Same, ObstructionPolicy::Same, true),
            ],
            skip_existing: false,
        }
    }
}

impl RunPlan {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub built: Vec<ArtifactKey>,
    pub skipped: Vec<ArtifactKey>,
}

/// Builds and saves every artifact in `plan`. Each legislature's incidence
/// matrix is loaded once, and only when something needs building.
pub fn run_plan(store: &ArtifactStore, plan: &RunPlan) -> Result<RunReport> {
    store.ensure_layout()?;

    let names = plan
        .parameters
        .iter()
        .map(|p| (p.abstention, p.obstruction))
        .collect::<HashSet<_>>();
    if names.len() < plan.parameters.len() {
        warn!("several parameter sets share an artifact name; the last one wins");
    }

    let mut report = RunReport::default();

    for &legislature in &plan.legislatures {
        let mut incidence = None;

        for policies in &plan.parameters {
            let key = ArtifactKey::for_policies(legislature, policies).with_year(plan.year);
            if plan.skip_existing && store.has_adjacency(&key) {
                info!(artifact = %key, "artifact exists, skipping");
                report.skipped.push(key);
                continue;
            }

            let matrix = match incidence.take() {
                Some(matrix) => matrix,
                None => store.load_incidence(legislature, plan.year)?,
            };
            let adjacency = build_adjacency(&matrix, policies);
            store.save_adjacency(&key, &adjacency)?;
            report.built.push(key);
            incidence = Some(matrix);
        }
    }

    Ok(report)
}
