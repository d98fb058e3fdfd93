//! Catalog Data
//!
//! Static reference data: character classes, the passive node graph, maps and
//! encounter tiers. Nodes are kept in an ordered `Vec` and cross-referenced by
//! id through a lookup table; prerequisites are resolved at query time.
//!
//! A catalog can come from the built-in definitions (`Catalog::standard`) or
//! from a RON document. Loaded catalogs are validated: unique ids, known
//! prerequisite references, an acyclic graph rooted at class start nodes, and
//! exactly one encounter per tier.

pub mod data;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// A purchasable upgrade in the passive graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassiveNode {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Prerequisite node ids; all must be allocated first
    #[serde(default)]
    pub requires: Vec<String>,
    /// Effect key -> magnitude. Keys ending in "Percent" multiply a base stat.
    pub effects: BTreeMap<String, f64>,
    /// Class id this node is the starting node for
    #[serde(default)]
    pub start_for: Option<String>,
}

impl PassiveNode {
    pub fn is_root(&self) -> bool {
        self.requires.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterClass {
    pub id: String,
    pub name: String,
    pub label: String,
    pub flavor: String,
    /// Passive node allocated automatically at creation
    pub start_node: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDef {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Class color affinity (red/blue/green)
    pub color: String,
    pub base_difficulty: f64,
}

/// Encounter tier, in resolution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EncounterTier {
    Normal,
    Magic,
    Rare,
    Boss,
}

impl EncounterTier {
    pub const ALL: [EncounterTier; 4] = [
        EncounterTier::Normal,
        EncounterTier::Magic,
        EncounterTier::Rare,
        EncounterTier::Boss,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Magic => "magic",
            Self::Rare => "rare",
            Self::Boss => "boss",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterType {
    pub tier: EncounterTier,
    pub label: String,
    pub multiplier: f64,
    pub xp: u64,
}

/// Serializable catalog document (RON / JSON)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDef {
    pub classes: Vec<CharacterClass>,
    pub nodes: Vec<PassiveNode>,
    pub maps: Vec<MapDef>,
    pub encounters: Vec<EncounterType>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid catalog document: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Could not write catalog document: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("Node {node} requires unknown node {requires}")]
    UnknownPrerequisite { node: String, requires: String },
    #[error("Passive graph has a cycle through {0}")]
    Cycle(String),
    #[error("Root node {0} is not a class starting node")]
    OrphanRoot(String),
    #[error("Class {class} starts at {node}, which is missing or has prerequisites")]
    InvalidStartNode { class: String, node: String },
    #[error("Node {node} is marked as start for unknown class {class}")]
    UnknownClass { node: String, class: String },
    #[error("Encounter tier {0} must appear exactly once")]
    EncounterTier(&'static str),
}

/// Indexed, read-only catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    classes: Vec<CharacterClass>,
    nodes: Vec<PassiveNode>,
    maps: Vec<MapDef>,
    encounters: Vec<EncounterType>,
    node_index: HashMap<String, usize>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// Built-in catalog (three classes, nine nodes, three maps)
    pub fn standard() -> Self {
        Self::indexed(data::standard_def())
    }

    /// Validate a catalog document and index it
    pub fn from_def(def: CatalogDef) -> Result<Self, CatalogError> {
        validate(&def)?;
        Ok(Self::indexed(def))
    }

    pub fn from_ron_str(source: &str) -> Result<Self, CatalogError> {
        let def: CatalogDef = ron::from_str(source)?;
        Self::from_def(def)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    fn indexed(mut def: CatalogDef) -> Self {
        def.encounters.sort_by_key(|e| e.tier);
        let node_index = def
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        Self {
            classes: def.classes,
            nodes: def.nodes,
            maps: def.maps,
            encounters: def.encounters,
            node_index,
        }
    }

    pub fn to_def(&self) -> CatalogDef {
        CatalogDef {
            classes: self.classes.clone(),
            nodes: self.nodes.clone(),
            maps: self.maps.clone(),
            encounters: self.encounters.clone(),
        }
    }

    /// Pretty RON document that `from_ron_str` reads back
    pub fn to_ron_string(&self) -> Result<String, CatalogError> {
        let pretty = ron::ser::PrettyConfig::new().struct_names(false);
        Ok(ron::ser::to_string_pretty(&self.to_def(), pretty)?)
    }

    pub fn classes(&self) -> &[CharacterClass] {
        &self.classes
    }

    /// Passive nodes in catalog order
    pub fn nodes(&self) -> &[PassiveNode] {
        &self.nodes
    }

    pub fn maps(&self) -> &[MapDef] {
        &self.maps
    }

    /// Encounter types in tier order (normal, magic, rare, boss)
    pub fn encounters(&self) -> &[EncounterType] {
        &self.encounters
    }

    pub fn node(&self, id: &str) -> Option<&PassiveNode> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn class(&self, id: &str) -> Option<&CharacterClass> {
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn map(&self, id: &str) -> Option<&MapDef> {
        self.maps.iter().find(|m| m.id == id)
    }

    pub fn encounter(&self, tier: EncounterTier) -> Option<&EncounterType> {
        self.encounters.iter().find(|e| e.tier == tier)
    }
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn validate(def: &CatalogDef) -> Result<(), CatalogError> {
    check_unique("node", def.nodes.iter().map(|n| n.id.as_str()))?;
    check_unique("class", def.classes.iter().map(|c| c.id.as_str()))?;
    check_unique("map", def.maps.iter().map(|m| m.id.as_str()))?;

    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for node in &def.nodes {
        graph.add_node(node.id.as_str());
    }
    for node in &def.nodes {
        for req in &node.requires {
            if !graph.contains_node(req.as_str()) {
                return Err(CatalogError::UnknownPrerequisite {
                    node: node.id.clone(),
                    requires: req.clone(),
                });
            }
            graph.add_edge(req.as_str(), node.id.as_str(), ());
        }
    }
    toposort(&graph, None).map_err(|cycle| CatalogError::Cycle(cycle.node_id().to_string()))?;

    for class in &def.classes {
        let valid = def
            .nodes
            .iter()
            .any(|n| n.id == class.start_node && n.is_root());
        if !valid {
            return Err(CatalogError::InvalidStartNode {
                class: class.id.clone(),
                node: class.start_node.clone(),
            });
        }
    }

    for node in &def.nodes {
        if let Some(class) = &node.start_for {
            if !def.classes.iter().any(|c| &c.id == class) {
                return Err(CatalogError::UnknownClass {
                    node: node.id.clone(),
                    class: class.clone(),
                });
            }
        }
        let is_start = def.classes.iter().any(|c| c.start_node == node.id);
        if node.is_root() && !is_start {
            return Err(CatalogError::OrphanRoot(node.id.clone()));
        }
    }

    for tier in EncounterTier::ALL {
        if def.encounters.iter().filter(|e| e.tier == tier).count() != 1 {
            return Err(CatalogError::EncounterTier(tier.as_str()));
        }
    }

    Ok(())
}
