//! Catalog data model: records, the group relation, and CSV I/O.

pub mod normalize;

use crate::error::{Result, ShopmatchError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub use normalize::{normalize_title, tokenize};

/// One catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier of the record.
    pub posting_id: String,
    /// Raw item title.
    pub title: String,
    /// Normalized title; empty until the preprocess step has run.
    #[serde(default)]
    pub std_title: String,
    /// Ground-truth cluster identifier; records sharing it are true matches.
    pub label_group: String,
}

/// Secondary relation from label group to its member posting IDs.
///
/// Groups are kept in first-appearance order, members in catalog row order.
/// This replaces carrying a per-row list-valued `target` column in memory;
/// the CSV column is rendered from this index only at write time.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    order: Vec<String>,
    members: HashMap<String, Vec<String>>,
}

impl GroupIndex {
    /// Build the relation from a record slice.
    pub fn from_records(records: &[Record]) -> Self {
        use std::collections::hash_map::Entry;

        let mut index = GroupIndex::default();
        for record in records {
            match index.members.entry(record.label_group.clone()) {
                Entry::Occupied(mut slot) => slot.get_mut().push(record.posting_id.clone()),
                Entry::Vacant(slot) => {
                    index.order.push(record.label_group.clone());
                    slot.insert(vec![record.posting_id.clone()]);
                }
            }
        }
        index
    }

    /// Member posting IDs of a group, in catalog row order.
    pub fn members(&self, label_group: &str) -> Option<&[String]> {
        self.members.get(label_group).map(Vec::as_slice)
    }

    /// Groups with their members, in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.order
            .iter()
            .map(move |g| (g.as_str(), self.members[g].as_slice()))
    }

    /// Number of distinct groups.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// An ordered set of catalog records with a unique posting_id per row.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<Record>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate posting IDs.
    pub fn new(records: Vec<Record>) -> Result<Self> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.posting_id.as_str()) {
                return Err(ShopmatchError::InvalidInput(format!(
                    "duplicate posting_id in catalog: {}",
                    record.posting_id
                )));
            }
        }
        Ok(Self { records })
    }

    /// Load a catalog from a CSV file.
    ///
    /// Expects `posting_id`, `title`, `label_group` columns; `std_title` is
    /// optional and defaults to empty. A `target` column, if present from an
    /// earlier split run, is ignored on read.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: Record = row?;
            records.push(record);
        }
        Self::new(records)
    }

    /// Write the catalog to a CSV file.
    ///
    /// The `target` column is recomputed from this catalog's own group
    /// relation, so a split output only ever references posting IDs present
    /// in that split.
    pub fn save(&self, path: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct CsvRow<'a> {
            posting_id: &'a str,
            title: &'a str,
            std_title: &'a str,
            label_group: &'a str,
            target: String,
        }

        let index = self.group_index();
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.records {
            // Group always resolves: the index was built from these records.
            let members = index.members(&record.label_group).unwrap_or(&[]);
            writer.serialize(CsvRow {
                posting_id: &record.posting_id,
                title: &record.title,
                std_title: &record.std_title,
                label_group: &record.label_group,
                target: serde_json::to_string(members)?,
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Group relation over this catalog's records.
    pub fn group_index(&self) -> GroupIndex {
        GroupIndex::from_records(&self.records)
    }

    /// Precomputed posting_id -> row position map for O(1) lookups.
    pub fn position_map(&self) -> HashMap<&str, usize> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.posting_id.as_str(), i))
            .collect()
    }

    /// New catalog holding the given rows, in the given order.
    pub fn select(&self, rows: &[usize]) -> Catalog {
        Catalog {
            records: rows.iter().map(|&i| self.records[i].clone()).collect(),
        }
    }

    /// Tokenized corpus over the normalized titles, in row order.
    ///
    /// Fails when any record has an empty `std_title` (the preprocess step
    /// has not run over this file).
    pub fn tokenized_corpus(&self) -> Result<Vec<Vec<String>>> {
        self.records
            .iter()
            .map(|record| {
                if record.std_title.trim().is_empty() {
                    return Err(ShopmatchError::InvalidInput(format!(
                        "record {} has no std_title. Run `preprocess` first.",
                        record.posting_id
                    )));
                }
                Ok(tokenize(&record.std_title))
            })
            .collect()
    }
}
