use std::collections::HashMap;

use crate::errors::Result;

use super::osm::{OsmId, Version};

/// A multipolygon building relation reduced to one representative outer way.
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Clone, Copy, PartialEq)]
#[archive(check_bytes)]
pub struct BuildingRelation {
    pub id: OsmId,
    pub version: Version,
    pub outer_way_id: OsmId,
}

/// Building relations keyed by their representative outer way. Built once, read-only afterwards.
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct RelationIndex {
    pub by_way: HashMap<OsmId, BuildingRelation>,
}

impl RelationIndex {
    pub fn insert(&mut self, relation: BuildingRelation) {
        self.by_way.insert(relation.outer_way_id, relation);
    }

    pub fn get(&self, way_id: OsmId) -> Option<&BuildingRelation> {
        self.by_way.get(&way_id)
    }

    pub fn len(&self) -> usize {
        self.by_way.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_way.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Way,
    Relation,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Way => "way",
            ObjectKind::Relation => "relation",
        }
    }
}

/// Identity of an emitted building. Way and relation ids live in separate id spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub id: OsmId,
}

/// A selected building. For `ObjectKind::Relation` the id and version are the relation's
/// while `nodes` come from its representative outer way.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingWay {
    pub kind: ObjectKind,
    pub id: OsmId,
    pub version: Version,
    pub first_node_id: OsmId,
    pub nodes: Vec<OsmId>,
}

impl BuildingWay {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            kind: self.kind,
            id: self.id,
        }
    }
}

/// One bucket of the `id mod count` partition of the way id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bin {
    pub index: u32,
    pub count: u32,
}

impl Bin {
    pub fn new(index: u32, count: u32) -> Result<Bin> {
        if count == 0 {
            return Err("bin count must be at least 1".into());
        }
        if index >= count {
            return Err(format!("bin index {} out of range for {} bins", index, count).into());
        }
        Ok(Bin { index, count })
    }

    pub fn single() -> Bin {
        Bin { index: 0, count: 1 }
    }

    /// Every bin of a partition into `count` bins, in order. Empty when `count` is 0.
    pub fn all(count: u32) -> impl Iterator<Item = Bin> {
        (0..count).map(move |index| Bin { index, count })
    }

    /// Euclidean remainder, so negative ids are partitioned as well.
    pub fn contains(&self, id: OsmId) -> bool {
        id.rem_euclid(i64::from(self.count)) == i64::from(self.index)
    }
}

/// Buildings selected in one bin, keyed by their first node.
///
/// Two buildings starting at the same node collide on that key; the one seen last wins
/// and the collision is counted.
#[derive(Debug, Default)]
pub struct SelectedWays {
    by_first_node: HashMap<OsmId, BuildingWay>,
    node_owners: HashMap<OsmId, ObjectRef>,
    collisions: usize,
}

impl SelectedWays {
    pub fn insert(&mut self, way: BuildingWay) {
        let owner = way.object_ref();
        for node_id in &way.nodes {
            self.node_owners.insert(*node_id, owner);
        }
        if self.by_first_node.insert(way.first_node_id, way).is_some() {
            self.collisions += 1;
        }
    }

    pub fn get(&self, first_node_id: OsmId) -> Option<&BuildingWay> {
        self.by_first_node.get(&first_node_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildingWay> {
        self.by_first_node.values()
    }

    /// Whether the node belongs to the geometry of any selected building.
    pub fn references_node(&self, node_id: OsmId) -> bool {
        self.node_owners.contains_key(&node_id)
    }

    pub fn node_owner(&self, node_id: OsmId) -> Option<ObjectRef> {
        self.node_owners.get(&node_id).copied()
    }

    pub fn referenced_node_count(&self) -> usize {
        self.node_owners.len()
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn len(&self) -> usize {
        self.by_first_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_first_node.is_empty()
    }
}
