use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::data::building::RelationIndex;
use crate::errors::{Error, Result};

pub const CACHE_FILE_SUFFIX: &str = "relations.rkyv";

/// Relation index of one source file, stored next to the extracted CSV files.
pub struct RelationIndexCache {
    path: PathBuf,
}

impl RelationIndexCache {
    pub fn for_source(output_dir: &Path, source: &Path) -> Result<RelationIndexCache> {
        let source_name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or("Could not get input file name")?;
        Ok(RelationIndexCache {
            path: output_dir.join(format!("{}.{}", source_name, CACHE_FILE_SUFFIX)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_cached(&self) -> Result<bool> {
        Ok(self.path.try_exists()?)
    }

    pub fn clean(&self) -> Result<()> {
        if self.is_cached()? {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn load(&self) -> Result<RelationIndex> {
        let mut buf_vec: Vec<u8> = Vec::new();
        File::open(&self.path)?.read_to_end(&mut buf_vec)?;

        let mut bytes = rkyv::AlignedVec::with_capacity(buf_vec.len());
        bytes.extend_from_slice(&buf_vec);
        let index = rkyv::from_bytes::<RelationIndex>(bytes.as_slice())
            .map_err(|_| Error::from(format!("Could not decode relation cache {}", self.path.display())))?;

        info!(relations = index.len(), path = self.path.display().to_string().as_str(); "Loaded cached relation index");
        Ok(index)
    }

    pub fn store(&self, index: &RelationIndex) -> Result<()> {
        let bytes = rkyv::to_bytes::<_, 256>(index)
            .map_err(|_| Error::from("Could not serialize relation index"))?;
        let mut output_file = File::create(&self.path)?;
        output_file.write_all(&bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::building::BuildingRelation;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("building-positions-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn round_trip_and_clean() {
        let dir = scratch_dir("cache");
        let cache = RelationIndexCache::for_source(&dir, Path::new("/data/berlin.osm.pbf")).unwrap();
        assert_eq!(cache.path(), dir.join("berlin.osm.pbf.relations.rkyv"));
        cache.clean().unwrap();
        assert!(!cache.is_cached().unwrap());

        let mut index = RelationIndex::default();
        index.insert(BuildingRelation { id: 1, version: 2, outer_way_id: 30 });
        index.insert(BuildingRelation { id: -4, version: 1, outer_way_id: 31 });
        cache.store(&index).unwrap();

        assert!(cache.is_cached().unwrap());
        assert_eq!(cache.load().unwrap(), index);

        cache.clean().unwrap();
        assert!(!cache.is_cached().unwrap());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = scratch_dir("cache-garbage");
        let cache = RelationIndexCache::for_source(&dir, Path::new("x.osm")).unwrap();
        fs::write(cache.path(), b"definitely not an archive").unwrap();

        assert!(cache.load().is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
