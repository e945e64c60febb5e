//! Folding parsed dump records into per-hive VLAN views.

use crate::config::ConfigError;
use crate::dump::VlanRecord;
use crate::hives::HiveId;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    VlanName,
    VlanId,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::VlanName => "vlan_name",
            SortMode::VlanId => "vlan_id",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vlan_name" => Ok(SortMode::VlanName),
            "vlan_id" => Ok(SortMode::VlanId),
            other => Err(ConfigError::UnsupportedSortMode(other.to_string())),
        }
    }
}

/// String keys mapped to string lists, iterated in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VlanIndex {
    entries: Vec<(String, Vec<String>)>,
    positions: HashMap<String, usize>,
}

impl VlanIndex {
    fn slot(&mut self, key: &str) -> &mut Vec<String> {
        let idx = match self.positions.get(key) {
            Some(&idx) => idx,
            None => {
                self.entries.push((key.to_string(), Vec::new()));
                let idx = self.entries.len() - 1;
                self.positions.insert(key.to_string(), idx);
                idx
            }
        };
        &mut self.entries[idx].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for VlanIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// The VLANs of one hive, indexed the way the sort mode asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VlanView {
    /// `vlan_name` -> `vlan_id`s
    ByName(VlanIndex),
    /// `vlan_id` -> distinct `vlan_name`s
    ById(VlanIndex),
}

impl VlanView {
    pub fn new(mode: SortMode) -> Self {
        match mode {
            SortMode::VlanName => VlanView::ByName(VlanIndex::default()),
            SortMode::VlanId => VlanView::ById(VlanIndex::default()),
        }
    }

    pub fn mode(&self) -> SortMode {
        match self {
            VlanView::ByName(_) => SortMode::VlanName,
            VlanView::ById(_) => SortMode::VlanId,
        }
    }

    pub fn index(&self) -> &VlanIndex {
        match self {
            VlanView::ByName(index) | VlanView::ById(index) => index,
        }
    }

    pub fn insert(&mut self, record: &VlanRecord) {
        match self {
            VlanView::ByName(index) => merge_by_name(index, record),
            VlanView::ById(index) => merge_by_id(index, record),
        }
    }
}

/// Replaces whatever was stored for the name, so a name seen twice keeps
/// only the id of its last record. The name keeps its first position.
/// The id is stored as the dump's text, so `'0100'` stays `0100`.
fn merge_by_name(index: &mut VlanIndex, record: &VlanRecord) {
    let ids = index.slot(&record.vlan_name);
    ids.clear();
    ids.push(record.vlan_id.clone());
}

fn merge_by_id(index: &mut VlanIndex, record: &VlanRecord) {
    let names = index.slot(&record.vlan_id);
    if !names.contains(&record.vlan_name) {
        names.push(record.vlan_name.clone());
    }
}

pub fn aggregate<'a, I>(records: I, mode: SortMode) -> VlanView
where
    I: IntoIterator<Item = &'a VlanRecord>,
{
    let mut view = VlanView::new(mode);
    for record in records {
        view.insert(record);
    }
    view
}

/// Views of every queried hive, in query order, all built with one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetResult {
    mode: SortMode,
    hives: Vec<(HiveId, VlanView)>,
}

impl FleetResult {
    pub fn new(mode: SortMode) -> Self {
        Self {
            mode,
            hives: Vec::new(),
        }
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    /// Aggregates `records` for `hive`. A hive added again replaces its
    /// earlier view but keeps its position.
    pub fn add_hive(&mut self, hive: HiveId, records: &[VlanRecord]) -> &VlanView {
        let view = aggregate(records, self.mode);
        let idx = match self.hives.iter().position(|(existing, _)| *existing == hive) {
            Some(idx) => {
                self.hives[idx].1 = view;
                idx
            }
            None => {
                self.hives.push((hive, view));
                self.hives.len() - 1
            }
        };
        &self.hives[idx].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HiveId, &VlanView)> {
        self.hives.iter().map(|(hive, view)| (hive, view))
    }

    pub fn len(&self) -> usize {
        self.hives.len()
    }
}

impl Serialize for FleetResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
