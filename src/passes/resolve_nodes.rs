use std::collections::HashMap;

use crate::data::building::SelectedWays;
use crate::data::osm::{Coordinate, Node, OsmId};
use crate::errors::Result;
use crate::source::ElementHandler;

use super::Pass;

pub const PASS_NAME: &str = "resolve_nodes";

pub type NodeLocations = HashMap<OsmId, Coordinate>;

/// Captures the coordinates of the nodes referenced by the selected buildings, and no others.
pub struct ResolveNodesPass<'a> {
    selected: &'a SelectedWays,
    locations: NodeLocations,
}

impl<'a> ResolveNodesPass<'a> {
    pub fn new(selected: &'a SelectedWays) -> ResolveNodesPass<'a> {
        ResolveNodesPass {
            selected,
            locations: NodeLocations::with_capacity(selected.referenced_node_count()),
        }
    }
}

impl ElementHandler for ResolveNodesPass<'_> {
    fn on_node(&mut self, node: &Node) -> Result<()> {
        if let Some(location) = node.location {
            if self.selected.references_node(node.id) {
                self.locations.insert(node.id, location);
            }
        }
        Ok(())
    }
}

impl Pass for ResolveNodesPass<'_> {
    type Output = NodeLocations;

    fn pass_name(&self) -> &'static str {
        PASS_NAME
    }

    fn finish(self) -> Result<Self::Output> {
        Ok(self.locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::building::{BuildingWay, ObjectKind};
    use crate::source::MemorySource;

    fn node(id: OsmId, location: Option<Coordinate>) -> Node {
        Node { id, version: 1, location }
    }

    #[test]
    fn resolves_only_referenced_nodes() {
        let mut selected = SelectedWays::default();
        selected.insert(BuildingWay {
            kind: ObjectKind::Way,
            id: 1,
            version: 1,
            first_node_id: 10,
            nodes: vec![10, 11, 12],
        });
        let here = Coordinate { lon: 13.4, lat: 52.5 };
        let source = MemorySource::new(
            vec![
                node(10, Some(here)),
                node(11, Some(here)),
                node(12, None),
                node(13, Some(here)),
            ],
            vec![],
            vec![],
        );

        let locations = ResolveNodesPass::new(&selected).process(&source).unwrap();

        assert_eq!(locations.len(), 2);
        assert_eq!(locations.get(&10), Some(&here));
        assert!(!locations.contains_key(&12));
        assert!(!locations.contains_key(&13));
    }
}
