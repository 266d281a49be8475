use std::cell::Cell;

use crate::data::osm::{Node, Relation, Way};
use crate::errors::Result;

use super::{DatasetSource, ElementHandler};

/// Elements held in memory, replayed in file order: nodes, then ways, then relations.
#[derive(Debug, Default)]
pub struct MemorySource {
    pub nodes: Vec<Node>,
    pub ways: Vec<Way>,
    pub relations: Vec<Relation>,
    traversals: Cell<usize>,
}

impl MemorySource {
    pub fn new(nodes: Vec<Node>, ways: Vec<Way>, relations: Vec<Relation>) -> MemorySource {
        MemorySource {
            nodes,
            ways,
            relations,
            traversals: Cell::new(0),
        }
    }

    /// How many times the source has been traversed.
    pub fn traversals(&self) -> usize {
        self.traversals.get()
    }
}

impl DatasetSource for MemorySource {
    fn traverse(&self, handler: &mut dyn ElementHandler) -> Result<()> {
        self.traversals.set(self.traversals.get() + 1);
        for node in &self.nodes {
            handler.on_node(node)?;
        }
        for way in &self.ways {
            handler.on_way(way)?;
        }
        for relation in &self.relations {
            handler.on_relation(relation)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
