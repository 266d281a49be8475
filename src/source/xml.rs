use std::fs;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::{Path, PathBuf};
use std::str::{self, FromStr};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use xz::bufread::XzDecoder;

use crate::data::osm::{Coordinate, Member, MemberType, Node, OsmId, Relation, Tags, Version, Way};
use crate::errors::{Error, Result};

use super::{DatasetSource, ElementHandler};

/// Reads `.osm` XML, optionally xz compressed.
pub struct XmlSource {
    path: PathBuf,
    name: String,
    compressed: bool,
}

enum ParserState {
    Top,
    Node(Node),
    Way(Way),
    Relation(Relation),
}

fn parse_value<T>(value: &[u8]) -> Result<T>
where
    T: FromStr,
    Error: From<T::Err>,
{
    Ok(str::from_utf8(value)?.parse()?)
}

fn parse_header(el: &BytesStart) -> Result<(OsmId, Version)> {
    let mut id: Option<OsmId> = None;
    let mut version: Version = 0;

    for attribute in el.attributes() {
        let attribute = attribute?;
        match attribute.key.as_ref() {
            b"id" => id = Some(parse_value(&attribute.value)?),
            b"version" => version = parse_value(&attribute.value)?,
            _ => (),
        }
    }

    Ok((id.ok_or("element without id")?, version))
}

fn parse_node(el: &BytesStart) -> Result<Node> {
    let (id, version) = parse_header(el)?;
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attribute in el.attributes() {
        let attribute = attribute?;
        match attribute.key.as_ref() {
            b"lat" => lat = Some(parse_value(&attribute.value)?),
            b"lon" => lon = Some(parse_value(&attribute.value)?),
            _ => (),
        }
    }

    let location = match (lon, lat) {
        (Some(lon), Some(lat)) => Some(Coordinate { lon, lat }),
        _ => None,
    };
    Ok(Node { id, version, location })
}

fn parse_tag(el: &BytesStart, tags: &mut Tags) -> Result<()> {
    let mut key: Option<String> = None;
    let mut value: Option<String> = None;

    for attribute in el.attributes() {
        let attribute = attribute?;
        match attribute.key.as_ref() {
            b"k" => key = Some(attribute.unescape_value()?.into_owned()),
            b"v" => value = Some(attribute.unescape_value()?.into_owned()),
            _ => (),
        }
    }

    tags.insert(key.ok_or("tag without key")?, value.unwrap_or_default());
    Ok(())
}

fn parse_node_ref(el: &BytesStart) -> Result<OsmId> {
    for attribute in el.attributes() {
        let attribute = attribute?;
        if attribute.key.as_ref() == b"ref" {
            return parse_value(&attribute.value);
        }
    }
    Err("nd without ref".into())
}

fn parse_member(el: &BytesStart) -> Result<Member> {
    let mut member_type: Option<MemberType> = None;
    let mut id: Option<OsmId> = None;
    let mut role = String::new();

    for attribute in el.attributes() {
        let attribute = attribute?;
        match attribute.key.as_ref() {
            b"type" => {
                member_type = Some(match &*attribute.value {
                    b"node" => MemberType::Node,
                    b"way" => MemberType::Way,
                    b"relation" => MemberType::Relation,
                    other => {
                        return Err(format!("unknown member type {}", String::from_utf8_lossy(other)).into())
                    },
                })
            },
            b"ref" => id = Some(parse_value(&attribute.value)?),
            b"role" => role = attribute.unescape_value()?.into_owned(),
            _ => (),
        }
    }

    Ok(Member {
        member_type: member_type.ok_or("member without type")?,
        id: id.ok_or("member without ref")?,
        role,
    })
}

fn dispatch(state: ParserState, handler: &mut dyn ElementHandler) -> Result<()> {
    match state {
        ParserState::Top => Ok(()),
        ParserState::Node(node) => handler.on_node(&node),
        ParserState::Way(way) => handler.on_way(&way),
        ParserState::Relation(relation) => handler.on_relation(&relation),
    }
}

impl XmlSource {
    pub fn new(path: &Path, compressed: bool) -> XmlSource {
        XmlSource {
            path: path.to_path_buf(),
            name: path.display().to_string(),
            compressed,
        }
    }

    fn create_osm_reader(&self) -> Result<Reader<Box<dyn BufRead>>> {
        let file = fs::File::open(&self.path)?;
        let file_reader = BufReader::new(file);
        let input: Box<dyn BufRead> = if self.compressed {
            Box::new(BufReader::new(XzDecoder::new(file_reader)))
        } else {
            Box::new(file_reader)
        };
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);

        Ok(reader)
    }

    /// Opens an element or attaches a child to the one currently open. Returns the new state;
    /// self-closing top-level elements are dispatched right away.
    fn on_start(
        mut state: ParserState,
        el: &BytesStart,
        is_empty: bool,
        handler: &mut dyn ElementHandler,
    ) -> Result<ParserState> {
        let opened = match el.name().as_ref() {
            b"node" => ParserState::Node(parse_node(el)?),
            b"way" => {
                let (id, version) = parse_header(el)?;
                ParserState::Way(Way { id, version, ..Way::default() })
            },
            b"relation" => {
                let (id, version) = parse_header(el)?;
                ParserState::Relation(Relation { id, version, ..Relation::default() })
            },
            b"tag" => {
                match &mut state {
                    ParserState::Way(way) => parse_tag(el, &mut way.tags)?,
                    ParserState::Relation(relation) => parse_tag(el, &mut relation.tags)?,
                    _ => (),
                }
                return Ok(state);
            },
            b"nd" => {
                if let ParserState::Way(way) = &mut state {
                    way.nodes.push(parse_node_ref(el)?);
                }
                return Ok(state);
            },
            b"member" => {
                if let ParserState::Relation(relation) = &mut state {
                    relation.members.push(parse_member(el)?);
                }
                return Ok(state);
            },
            _ => return Ok(state),
        };

        if is_empty {
            dispatch(opened, handler)?;
            Ok(ParserState::Top)
        } else {
            Ok(opened)
        }
    }
}

impl DatasetSource for XmlSource {
    fn traverse(&self, handler: &mut dyn ElementHandler) -> Result<()> {
        let mut reader = self.create_osm_reader()?;
        let mut buf = Vec::new();
        let mut state = ParserState::Top;

        loop {
            match reader.read_event_into(&mut buf) {
                Err(e) => return Err(e.into()),
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => {
                    state = Self::on_start(mem::replace(&mut state, ParserState::Top), &e, false, handler)?;
                },
                Ok(Event::Empty(e)) => {
                    state = Self::on_start(mem::replace(&mut state, ParserState::Top), &e, true, handler)?;
                },
                Ok(Event::End(e)) => {
                    if matches!(e.name().as_ref(), b"node" | b"way" | b"relation") {
                        dispatch(mem::replace(&mut state, ParserState::Top), handler)?;
                    }
                },
                Ok(_) => (),
            }
            buf.clear();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
