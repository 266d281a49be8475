use std::path::{Path, PathBuf};

use osmpbf::{Element, ElementReader, RelMemberType};

use crate::data::osm::{Coordinate, Member, MemberType, Node, Relation, Way};
use crate::errors::{Error, Result};

use super::{DatasetSource, ElementHandler};

pub struct PbfSource {
    path: PathBuf,
    name: String,
}

impl PbfSource {
    pub fn new(path: &Path) -> PbfSource {
        PbfSource {
            path: path.to_path_buf(),
            name: path.display().to_string(),
        }
    }
}

fn dispatch(element: Element, handler: &mut dyn ElementHandler) -> Result<()> {
    match element {
        Element::Node(node) => handler.on_node(&Node {
            id: node.id(),
            version: node.info().version().unwrap_or(0),
            location: Some(Coordinate { lon: node.lon(), lat: node.lat() }),
        }),
        Element::DenseNode(node) => handler.on_node(&Node {
            id: node.id(),
            version: node.info().map(|info| info.version()).unwrap_or(0),
            location: Some(Coordinate { lon: node.lon(), lat: node.lat() }),
        }),
        Element::Way(way) => handler.on_way(&Way {
            id: way.id(),
            version: way.info().version().unwrap_or(0),
            tags: way.tags().collect(),
            nodes: way.refs().collect(),
        }),
        Element::Relation(relation) => {
            let members = relation
                .members()
                .map(|member| {
                    Ok(Member {
                        member_type: match member.member_type {
                            RelMemberType::Node => MemberType::Node,
                            RelMemberType::Way => MemberType::Way,
                            RelMemberType::Relation => MemberType::Relation,
                        },
                        id: member.member_id,
                        role: member.role()?.to_string(),
                    })
                })
                .collect::<Result<Vec<Member>>>()?;

            handler.on_relation(&Relation {
                id: relation.id(),
                version: relation.info().version().unwrap_or(0),
                tags: relation.tags().collect(),
                members,
            })
        },
    }
}

impl DatasetSource for PbfSource {
    fn traverse(&self, handler: &mut dyn ElementHandler) -> Result<()> {
        let reader = ElementReader::from_path(&self.path)?;
        // `for_each` cannot stop early; after the first failure the remaining elements are skipped.
        let mut failure: Option<Error> = None;

        reader.for_each(|element| {
            if failure.is_some() {
                return;
            }
            if let Err(err) = dispatch(element, &mut *handler) {
                failure = Some(err);
            }
        })?;

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
