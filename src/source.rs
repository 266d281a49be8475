pub mod memory;
pub mod pbf;
pub mod xml;

use std::path::Path;

use crate::data::osm::{Node, Relation, Way};
use crate::errors::Result;

pub use memory::MemorySource;
pub use pbf::PbfSource;
pub use xml::XmlSource;

/// Receives the elements of one traversal. Each pass implements only what it needs.
pub trait ElementHandler {
    fn on_relation(&mut self, _relation: &Relation) -> Result<()> {
        Ok(())
    }

    fn on_way(&mut self, _way: &Way) -> Result<()> {
        Ok(())
    }

    fn on_node(&mut self, _node: &Node) -> Result<()> {
        Ok(())
    }
}

/// A dataset that can be read from start to end any number of times.
pub trait DatasetSource {
    /// Feeds every element to `handler`, in file order. Each call starts from the beginning.
    fn traverse(&self, handler: &mut dyn ElementHandler) -> Result<()>;

    fn name(&self) -> &str;
}

/// Picks a reader from the file extension: `.pbf`, `.osm`/`.xml`, optionally `.xz` compressed.
pub fn open_source(path: &Path) -> Result<Box<dyn DatasetSource>> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or("Could not get input file name")?;

    if !path.try_exists()? {
        return Err(format!("input file {} does not exist", path.display()).into());
    }

    if file_name.ends_with(".pbf") {
        Ok(Box::new(PbfSource::new(path)))
    } else if file_name.ends_with(".osm") || file_name.ends_with(".xml") {
        Ok(Box::new(XmlSource::new(path, false)))
    } else if file_name.ends_with(".osm.xz") || file_name.ends_with(".xml.xz") {
        Ok(Box::new(XmlSource::new(path, true)))
    } else {
        Err(format!("unsupported input format: {}", file_name).into())
    }
}
