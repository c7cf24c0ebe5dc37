//! Tracks every (property name -> observed value) pair seen across nodes
//! during one refresh, to detect divergent broker configuration and to derive
//! tri-state cluster-wide flags.

use std::collections::BTreeSet;

use dashmap::DashMap;

use crate::cluster::types::TriState;

pub const AUTO_CREATE_TOPICS_PROP: &str = "auto.create.topics.enable";
pub const DELETE_TOPIC_ENABLE_PROP: &str = "delete.topic.enable";

#[derive(Debug, Default)]
pub struct NodePropertyConsistency {
    // property name -> distinct values observed across nodes
    observed: DashMap<String, BTreeSet<String>>,
}

impl NodePropertyConsistency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str, value: &str) {
        self.observed
            .entry(name.to_string())
            .or_default()
            .insert(value.to_string());
    }

    pub fn clear(&self) {
        self.observed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Names of every property whose observed-value set has more than one
    /// element, sorted for stable reporting.
    pub fn properties_that_differ(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .observed
            .iter()
            .filter(|entry| entry.value().len() > 1)
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    pub fn topic_auto_creation_enabled(&self) -> TriState {
        self.flag(AUTO_CREATE_TOPICS_PROP)
    }

    pub fn topic_deletion_enabled(&self) -> TriState {
        self.flag(DELETE_TOPIC_ENABLE_PROP)
    }

    fn flag(&self, property: &str) -> TriState {
        match self.observed.get(property) {
            None => TriState::Unknown,
            Some(values) if values.len() == 1 => {
                let value = values.iter().next().map(|v| v.eq_ignore_ascii_case("true"));
                value.map(TriState::from).unwrap_or(TriState::Unknown)
            }
            // nodes disagree, no single answer exists
            Some(_) => TriState::Unknown,
        }
    }
}
