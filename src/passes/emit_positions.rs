use std::io::Write;

use log::warn;
use serde::{Serialize, Serializer};

use crate::counters::Counters;
use crate::data::building::SelectedWays;
use crate::data::osm::{Node, OsmId, Version};
use crate::errors::Result;
use crate::geometry::WayAreas;
use crate::source::ElementHandler;

use super::Pass;

pub const PASS_NAME: &str = "emit_positions";
pub const HEADER: [&str; 5] = ["object_type", "id", "version", "longitude", "latitude"];

/// Drops buildings smaller than `min_area` square metres.
pub struct AreaFilter<'a> {
    pub areas: &'a WayAreas,
    pub min_area: f64,
}

#[derive(Serialize)]
struct PositionRecord {
    object_type: &'static str,
    id: OsmId,
    version: Version,
    #[serde(serialize_with = "fixed_7")]
    longitude: f64,
    #[serde(serialize_with = "fixed_7")]
    latitude: f64,
}

fn fixed_7<S: Serializer>(value: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{:.7}", value))
}

/// Writes one CSV row per selected building, located at its first node.
pub struct EmitPositionsPass<'a, W: Write> {
    selected: &'a SelectedWays,
    filter: Option<AreaFilter<'a>>,
    writer: csv::Writer<W>,
    flush_every: u64,
    counters: Counters,
}

impl<'a, W: Write> EmitPositionsPass<'a, W> {
    /// Writes the header right away, so a bin without buildings still gets a valid file.
    /// `flush_every` of 0 leaves flushing to the writer.
    pub fn new(
        selected: &'a SelectedWays,
        filter: Option<AreaFilter<'a>>,
        output: W,
        flush_every: u64,
    ) -> Result<EmitPositionsPass<'a, W>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(output);
        writer.write_record(HEADER)?;

        Ok(EmitPositionsPass {
            selected,
            filter,
            writer,
            flush_every,
            counters: Counters::default(),
        })
    }
}

impl<W: Write> ElementHandler for EmitPositionsPass<'_, W> {
    fn on_node(&mut self, node: &Node) -> Result<()> {
        let Some(building) = self.selected.get(node.id) else {
            return Ok(());
        };

        if let Some(filter) = &self.filter {
            let area = filter.areas.get(&building.object_ref()).copied().ok_or_else(|| {
                format!("no area computed for {} {}", building.kind.as_str(), building.id)
            })?;
            if area < filter.min_area {
                self.counters.record_skipped();
                return Ok(());
            }
        }

        let Some(location) = node.location else {
            warn!(node = node.id, id = building.id; "Representative node has no location");
            return Ok(());
        };

        self.counters.record(building.kind);
        self.writer.serialize(PositionRecord {
            object_type: building.kind.as_str(),
            id: building.id,
            version: building.version,
            longitude: location.lon,
            latitude: location.lat,
        })?;

        if self.flush_every > 0 && self.counters.buildings % self.flush_every == 0 {
            self.writer.flush()?;
        }
        Ok(())
    }
}

impl<W: Write> Pass for EmitPositionsPass<'_, W> {
    /// The bin's counters and the output, flushed.
    type Output = (Counters, W);

    fn pass_name(&self) -> &'static str {
        PASS_NAME
    }

    fn finish(self) -> Result<Self::Output> {
        let output = self.writer.into_inner().map_err(|err| err.into_error())?;
        Ok((self.counters, output))
    }
}
