//! Character State
//!
//! The mutable progression record and passive allocation rules. The
//! serialized form doubles as the persisted roster record:
//! `{id, name, classId, level, xp, xpToNext, points, allocated, selectedMap}`.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CharacterClass, PassiveNode};
use crate::constants::{INITIAL_XP_TO_NEXT, STARTING_POINTS};
use crate::progression;
use crate::stats::{self, StatSheet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    pub class_id: String,
    pub level: u32,
    pub xp: u64,
    pub xp_to_next: u64,
    pub points: u32,
    /// Allocated node ids in allocation order, no duplicates
    #[serde(default)]
    pub allocated: Vec<String>,
    #[serde(default)]
    pub selected_map: Option<String>,
}

/// Display state of a passive node for a given character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Allocated,
    Available,
    Locked,
}

impl NodeState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Allocated => "allocated",
            Self::Available => "available",
            Self::Locked => "locked",
        }
    }
}

/// Why an allocation did not happen
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationRejection {
    #[error("no unspent points")]
    NoPoints,
    #[error("unknown node {0}")]
    UnknownNode(String),
    #[error("node {0} is already allocated")]
    AlreadyAllocated(String),
    #[error("node {node} requires {missing:?}")]
    Locked { node: String, missing: Vec<String> },
}

impl Character {
    /// Fresh level-1 character with the class start node allocated
    pub fn new(id: impl Into<String>, name: impl Into<String>, class: &CharacterClass) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            class_id: class.id.clone(),
            level: 1,
            xp: 0,
            xp_to_next: INITIAL_XP_TO_NEXT,
            points: STARTING_POINTS,
            allocated: vec![class.start_node.clone()],
            selected_map: None,
        }
    }

    pub fn has_node(&self, node_id: &str) -> bool {
        self.allocated.iter().any(|n| n == node_id)
    }

    /// Every prerequisite of the node is allocated
    pub fn is_unlocked(&self, node: &PassiveNode) -> bool {
        node.requires.iter().all(|req| self.has_node(req))
    }

    pub fn node_state(&self, node: &PassiveNode) -> NodeState {
        if self.has_node(&node.id) {
            NodeState::Allocated
        } else if self.is_unlocked(node) {
            NodeState::Available
        } else {
            NodeState::Locked
        }
    }

    /// Node can be bought right now
    pub fn can_allocate(&self, node: &PassiveNode) -> bool {
        self.points >= 1 && !self.has_node(&node.id) && self.is_unlocked(node)
    }

    /// Spend one point on a node. State is untouched on rejection.
    pub fn allocate<'c>(
        &mut self,
        catalog: &'c Catalog,
        node_id: &str,
    ) -> Result<&'c PassiveNode, AllocationRejection> {
        if self.points < 1 {
            return Err(AllocationRejection::NoPoints);
        }
        let node = catalog
            .node(node_id)
            .ok_or_else(|| AllocationRejection::UnknownNode(node_id.to_string()))?;
        if self.has_node(node_id) {
            return Err(AllocationRejection::AlreadyAllocated(node_id.to_string()));
        }
        let missing: Vec<String> = node
            .requires
            .iter()
            .filter(|req| !self.has_node(req))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(AllocationRejection::Locked {
                node: node_id.to_string(),
                missing,
            });
        }

        self.points -= 1;
        self.allocated.push(node.id.clone());
        Ok(node)
    }

    pub fn stats(&self, catalog: &Catalog) -> StatSheet {
        stats::compute(catalog, &self.allocated)
    }

    pub fn power(&self, catalog: &Catalog) -> i64 {
        stats::power(catalog, &self.allocated)
    }

    /// Repair a loaded record: drop duplicate and unknown node ids, lift
    /// the level and threshold to their starting floors, then settle any
    /// xp already past the threshold into level-ups.
    pub fn sanitize(&mut self, catalog: &Catalog) {
        let mut seen: Vec<String> = Vec::with_capacity(self.allocated.len());
        for id in self.allocated.drain(..) {
            if catalog.node(&id).is_some() && !seen.contains(&id) {
                seen.push(id);
            }
        }
        self.allocated = seen;
        self.level = self.level.max(1);
        // below 4 the 1.15x curve rounds back to the same threshold
        self.xp_to_next = self.xp_to_next.max(INITIAL_XP_TO_NEXT);
        progression::gain_xp(self, 0);
    }
}
