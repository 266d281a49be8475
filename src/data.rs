pub mod building;
pub mod osm;

pub use building::{Bin, BuildingRelation, BuildingWay, ObjectKind, ObjectRef, RelationIndex, SelectedWays};
pub use osm::{Coordinate, Member, MemberType, Node, OsmId, Relation, Tags, Version, Way};
