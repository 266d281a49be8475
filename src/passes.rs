pub mod emit_positions;
pub mod reduce_relations;
pub mod resolve_nodes;
pub mod select_ways;

use log::{error, info};

use crate::data::osm::Tags;
use crate::errors::Result;
use crate::source::{DatasetSource, ElementHandler};

/// One complete traversal of the dataset. The pass sees elements through its
/// `ElementHandler` impl and turns what it gathered into `Output` once the traversal ends.
pub trait Pass: ElementHandler + Sized {
    type Output;

    fn pass_name(&self) -> &'static str;

    fn finish(self) -> Result<Self::Output>;

    fn process(mut self, source: &dyn DatasetSource) -> Result<Self::Output> {
        let pass_name = self.pass_name();
        info!(pass = pass_name, source = source.name(); "Starting pass");

        match source.traverse(&mut self) {
            Ok(()) => Ok(()),
            Err(err) => {
                error!(pass = pass_name, err = err.message.as_str(); "Traversal failed with error");
                Err(err)
            },
        }?;

        let output = match self.finish() {
            Ok(output) => Ok(output),
            Err(err) => {
                error!(pass = pass_name, err = err.message.as_str(); "Finishing failed with error");
                Err(err)
            },
        }?;

        info!(pass = pass_name; "Pass finished");
        Ok(output)
    }
}

/// Tagged `building` and not a roof part (`roof:material`).
pub fn is_building(tags: &Tags) -> bool {
    tags.has_key("building") && !tags.has_key("roof:material")
}
