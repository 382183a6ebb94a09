//! Legislator metadata (party, state, region, name) per legislature.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Macro-regions of Brazil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    North,
    Northeast,
    CenterWest,
    Southeast,
    South,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "Norte",
            Region::Northeast => "Nordeste",
            Region::CenterWest => "Centro-oeste",
            Region::Southeast => "Sudeste",
            Region::South => "Sul",
        }
    }

    /// Region of a federative unit, from its two-letter code.
    pub fn for_uf(uf: &str) -> Option<Region> {
        let region = match uf.trim().to_ascii_uppercase().as_str() {
            "RR" | "AP" | "AM" | "PA" | "AC" | "RO" | "TO" => Region::North,
            "MA" | "PI" | "CE" | "RN" | "PB" | "PE" | "AL" | "SE" | "BA" => Region::Northeast,
            "MT" | "DF" | "GO" | "MS" => Region::CenterWest,
            "MG" | "ES" | "RJ" | "SP" => Region::Southeast,
            "PR" | "SC" | "RS" => Region::South,
            _ => return None,
        };
        Some(region)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the deputies table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegislatorRecord {
    pub id: i64,
    #[serde(rename = "idLegislatura")]
    pub legislature: u32,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "siglaPartido", default)]
    pub party: Option<String>,
    #[serde(rename = "siglaUf", default)]
    pub uf: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// Attributes attached to a graph node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegislatorInfo {
    pub party: Option<String>,
    pub uf: Option<String>,
    pub region: Option<String>,
    pub name: Option<String>,
}

impl From<&LegislatorRecord> for LegislatorInfo {
    fn from(record: &LegislatorRecord) -> Self {
        let region = non_empty(&record.region).or_else(|| {
            non_empty(&record.uf)
                .and_then(|uf| Region::for_uf(&uf))
                .map(|r| r.as_str().to_string())
        });
        LegislatorInfo {
            party: non_empty(&record.party),
            uf: non_empty(&record.uf),
            region,
            name: non_empty(&record.name),
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// All metadata rows, across legislatures.
#[derive(Debug, Clone, Default)]
pub struct LegislatorDirectory {
    records: Vec<LegislatorRecord>,
}

impl LegislatorDirectory {
    pub fn new(records: Vec<LegislatorRecord>) -> Self {
        Self { records }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<LegislatorRecord>, _>>()?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[LegislatorRecord] {
        &self.records
    }

    /// Attributes keyed by legislator id, restricted to one legislature.
    pub fn for_legislature(&self, legislature: u32) -> HashMap<i64, LegislatorInfo> {
        self.records
            .iter()
            .filter(|r| r.legislature == legislature)
            .map(|r| (r.id, LegislatorInfo::from(r)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPUTIES: &str = "\
,id,uri,nome,siglaPartido,siglaUf,idLegislatura,region
0,74646,https://x/74646,Ana,PT,SP,55,Sudeste
1,74646,https://x/74646,Ana,PSB,SP,56,
2,160510,https://x/160510,Bruno,,AM,56,
3,204554,https://x/204554,Clara,MDB,XX,56,
";

    #[test]
    fn filters_by_legislature() {
        let directory = LegislatorDirectory::from_reader(DEPUTIES.as_bytes()).unwrap();
        assert_eq!(directory.records().len(), 4);

        let l55 = directory.for_legislature(55);
        assert_eq!(l55.len(), 1);
        assert_eq!(l55[&74646].party.as_deref(), Some("PT"));

        let l56 = directory.for_legislature(56);
        assert_eq!(l56[&74646].party.as_deref(), Some("PSB"));
        assert!(directory.for_legislature(52).is_empty());
    }

    #[test]
    fn region_is_derived_from_the_state_when_missing() {
        let directory = LegislatorDirectory::from_reader(DEPUTIES.as_bytes()).unwrap();
        let l56 = directory.for_legislature(56);

        assert_eq!(l56[&74646].region.as_deref(), Some("Sudeste"));
        assert_eq!(l56[&160510].region.as_deref(), Some("Norte"));
        assert_eq!(l56[&160510].party, None);
        assert_eq!(l56[&204554].region, None);
        assert_eq!(l56[&204554].name.as_deref(), Some("Clara"));
    }

    #[test]
    fn every_state_has_a_region() {
        let states = [
            "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA",
            "PB", "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
        ];
        for uf in states {
            assert!(Region::for_uf(uf).is_some(), "{uf}");
        }
        assert_eq!(Region::for_uf("df"), Some(Region::CenterWest));
    }
}
