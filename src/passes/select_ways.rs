use crate::data::building::{Bin, BuildingWay, ObjectKind, RelationIndex, SelectedWays};
use crate::data::osm::Way;
use crate::errors::Result;
use crate::source::ElementHandler;

use super::{is_building, Pass};

pub const PASS_NAME: &str = "select_ways";

/// Selects the building ways of one bin, either tagged directly or standing in for a
/// building relation.
pub struct SelectWaysPass<'a> {
    bin: Bin,
    relations: &'a RelationIndex,
    keep_geometry: bool,
    selected: SelectedWays,
}

impl<'a> SelectWaysPass<'a> {
    /// Without `keep_geometry` node lists are dropped and only the first node is kept.
    pub fn new(bin: Bin, relations: &'a RelationIndex, keep_geometry: bool) -> SelectWaysPass<'a> {
        SelectWaysPass {
            bin,
            relations,
            keep_geometry,
            selected: SelectedWays::default(),
        }
    }

    fn classify(&self, way: &Way, first_node_id: i64) -> Option<BuildingWay> {
        let nodes = if self.keep_geometry {
            way.nodes.clone()
        } else {
            Vec::new()
        };

        if is_building(&way.tags) {
            Some(BuildingWay {
                kind: ObjectKind::Way,
                id: way.id,
                version: way.version,
                first_node_id,
                nodes,
            })
        } else {
            self.relations.get(way.id).map(|relation| BuildingWay {
                kind: ObjectKind::Relation,
                id: relation.id,
                version: relation.version,
                first_node_id,
                nodes,
            })
        }
    }
}

impl ElementHandler for SelectWaysPass<'_> {
    fn on_way(&mut self, way: &Way) -> Result<()> {
        let Some(&first_node_id) = way.nodes.first() else {
            return Ok(());
        };
        if !self.bin.contains(way.id) {
            return Ok(());
        }

        if let Some(building) = self.classify(way, first_node_id) {
            self.selected.insert(building);
        }
        Ok(())
    }
}

impl Pass for SelectWaysPass<'_> {
    type Output = SelectedWays;

    fn pass_name(&self) -> &'static str {
        PASS_NAME
    }

    fn finish(self) -> Result<Self::Output> {
        Ok(self.selected)
    }
}
