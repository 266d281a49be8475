//! Drives the passes. Relations are reduced once; then every bin goes through
//! select ways -> resolve nodes -> compute areas -> emit positions, with the two middle
//! steps only when an area threshold is set. A bin's working set is dropped before the
//! next bin starts.

use std::fs::{create_dir_all, File};
use std::io::{self, BufWriter, Write};

use log::{info, warn};

use crate::cache::RelationIndexCache;
use crate::config::{Invocation, Mode, UserConfig};
use crate::counters::Counters;
use crate::data::building::{Bin, RelationIndex};
use crate::errors::Result;
use crate::geometry::compute_areas;
use crate::passes::emit_positions::{AreaFilter, EmitPositionsPass};
use crate::passes::reduce_relations::ReduceRelationsPass;
use crate::passes::resolve_nodes::ResolveNodesPass;
use crate::passes::select_ways::SelectWaysPass;
use crate::passes::Pass;
use crate::source::DatasetSource;

/// Pass 0, or the cached result of an earlier run when `cache` holds one.
pub fn reduce_relations(
    source: &dyn DatasetSource,
    config: &UserConfig,
    cache: Option<&RelationIndexCache>,
) -> Result<RelationIndex> {
    if let Some(cache) = cache {
        if cache.is_cached()? {
            return cache.load();
        }
    }

    let relations = ReduceRelationsPass::new(config.require_outer_role).process(source)?;
    info!(relations = relations.len(); "Building relations selected");

    if let Some(cache) = cache {
        cache.store(&relations)?;
    }
    Ok(relations)
}

/// Runs one bin and writes its CSV to `output`. Returns the bin's counters and the output.
pub fn extract_bin<W: Write>(
    source: &dyn DatasetSource,
    relations: &RelationIndex,
    bin: Bin,
    min_area: Option<f64>,
    output: W,
    config: &UserConfig,
) -> Result<(Counters, W)> {
    let filtering = min_area.is_some();

    let selected = SelectWaysPass::new(bin, relations, filtering).process(source)?;
    info!(bin = bin.index, buildings = selected.len(); "Building ways selected");
    if selected.collisions() > 0 {
        warn!(
            bin = bin.index,
            collisions = selected.collisions();
            "Buildings sharing a first node were dropped"
        );
    }

    let areas = match min_area {
        Some(_) => {
            let locations = ResolveNodesPass::new(&selected).process(source)?;
            info!(bin = bin.index, nodes = locations.len(); "Node locations resolved");
            Some(compute_areas(&selected, &locations)?)
        },
        None => None,
    };

    let filter = match (&areas, min_area) {
        (Some(areas), Some(min_area)) => Some(AreaFilter { areas, min_area }),
        _ => None,
    };
    EmitPositionsPass::new(&selected, filter, output, config.flush_every)?.process(source)
}

fn bins(bin_count: u32, progress_bar: bool) -> Box<dyn Iterator<Item = Bin>> {
    if progress_bar && bin_count > 1 {
        Box::new(tqdm::tqdm(Bin::all(bin_count)))
    } else {
        Box::new(Bin::all(bin_count))
    }
}

/// Runs a whole extraction and returns the totals over all bins.
pub fn run(source: &dyn DatasetSource, invocation: &Invocation, config: &UserConfig) -> Result<Counters> {
    create_dir_all(&invocation.output_dir)?;

    let cache = if config.cache_relation_index {
        Some(RelationIndexCache::for_source(&invocation.output_dir, &invocation.source)?)
    } else {
        None
    };
    let relations = reduce_relations(source, config, cache.as_ref())?;

    let min_area = invocation.mode.min_area();
    let mut totals = Counters::default();

    match invocation.mode {
        Mode::Single => {
            let (counters, _) = extract_bin(source, &relations, Bin::single(), None, io::stdout().lock(), config)?;
            totals += counters;
        },
        Mode::Binned { bin_count } | Mode::BinnedWithArea { bin_count, .. } => {
            for bin in bins(bin_count, config.progress_bar) {
                info!(bin = bin.index + 1, bin_count = bin.count; "Starting bin");
                let file_path = invocation.output_dir.join(format!("{}.csv", bin.index));
                let output_file = BufWriter::new(File::create(&file_path)?);

                let (counters, output_file) = extract_bin(source, &relations, bin, min_area, output_file, config)?;
                output_file.into_inner().map_err(|err| err.into_error())?;
                totals += counters;
            }
        },
    }

    totals.log_summary(min_area.is_some());
    Ok(totals)
}
