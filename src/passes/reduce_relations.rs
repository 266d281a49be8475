use crate::data::building::{BuildingRelation, RelationIndex};
use crate::data::osm::{MemberType, Relation};
use crate::errors::Result;
use crate::source::ElementHandler;

use super::{is_building, Pass};

pub const PASS_NAME: &str = "reduce_relations";

/// Reduces every multipolygon building relation to its first way member.
///
/// Only that one way stands in for the relation; further outer rings are ignored.
pub struct ReduceRelationsPass {
    require_outer_role: bool,
    index: RelationIndex,
}

impl ReduceRelationsPass {
    pub fn new(require_outer_role: bool) -> ReduceRelationsPass {
        ReduceRelationsPass {
            require_outer_role,
            index: RelationIndex::default(),
        }
    }

    fn is_multipolygon(relation: &Relation) -> bool {
        relation.tags.get_value_by_key("type") == Some("multipolygon")
    }
}

impl ElementHandler for ReduceRelationsPass {
    fn on_relation(&mut self, relation: &Relation) -> Result<()> {
        if !Self::is_multipolygon(relation)
            || !is_building(&relation.tags)
            || relation.members.is_empty()
        {
            return Ok(());
        }

        let outer = relation.members.iter().find(|member| {
            member.member_type == MemberType::Way
                && (!self.require_outer_role || member.role == "outer")
        });

        if let Some(member) = outer {
            self.index.insert(BuildingRelation {
                id: relation.id,
                version: relation.version,
                outer_way_id: member.id,
            });
        }
        Ok(())
    }
}

impl Pass for ReduceRelationsPass {
    type Output = RelationIndex;

    fn pass_name(&self) -> &'static str {
        PASS_NAME
    }

    fn finish(self) -> Result<Self::Output> {
        Ok(self.index)
    }
}
