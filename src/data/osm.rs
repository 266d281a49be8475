//! Elements as handed out by a dataset source. Only what the extraction needs is kept:
//! node tags are never read, so nodes carry none.

pub type OsmId = i64;
pub type Version = i32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tags(Vec<(String, String)>);

impl Tags {
    pub fn new() -> Self {
        Tags(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn get_value_by_key(&self, key: &str) -> Option<&str> {
        self.0.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tags(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: OsmId,
    pub version: Version,
    /// `None` when the source has no coordinate for the node (e.g. deleted nodes in XML).
    pub location: Option<Coordinate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Way {
    pub id: OsmId,
    pub version: Version,
    pub tags: Tags,
    pub nodes: Vec<OsmId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberType {
    Node,
    Way,
    Relation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub member_type: MemberType,
    pub id: OsmId,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relation {
    pub id: OsmId,
    pub version: Version,
    pub tags: Tags,
    pub members: Vec<Member>,
}
