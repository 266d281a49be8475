use std::fs;
use std::io::Write;
use std::path::PathBuf;

use building_positions::config::{Invocation, Mode, UserConfig};
use building_positions::counters::Counters;
use building_positions::data::osm::{MemberType, Node, Relation, Way};
use building_positions::errors::Result;
use building_positions::pipeline;
use building_positions::source::{open_source, DatasetSource, ElementHandler};

// Coordinates: 0.0000899 degrees is roughly 10 m.
const OSM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="hand">
  <bounds minlat="0" minlon="0" maxlat="1" maxlon="1"/>
  <node id="1" version="2" lat="0.0000000" lon="0.0000000"/>
  <node id="2" version="1" lat="0.0000000" lon="0.0000899"/>
  <node id="3" version="1" lat="0.0000899" lon="0.0000899"/>
  <node id="4" version="1" lat="0.0000899" lon="0.0000000">
    <tag k="entrance" v="main"/>
  </node>
  <node id="5" version="1" lat="0.0010000" lon="0.0010000"/>
  <node id="6" version="1" lat="0.0010000" lon="0.0010450"/>
  <node id="7" version="1" lat="0.0010450" lon="0.0010000"/>
  <node id="8" version="4" visible="false"/>
  <way id="10" version="3">
    <nd ref="1"/>
    <nd ref="2"/>
    <nd ref="3"/>
    <nd ref="4"/>
    <tag k="building" v="yes"/>
    <tag k="name" v="Fish &amp; Chips"/>
  </way>
  <way id="20" version="9">
    <nd ref="5"/>
    <nd ref="6"/>
    <nd ref="7"/>
  </way>
  <way id="21" version="1">
    <tag k="building" v="garage"/>
  </way>
  <relation id="30" version="2">
    <member type="node" ref="5" role=""/>
    <member type="way" ref="20" role="outer"/>
    <tag k="type" v="multipolygon"/>
    <tag k="building" v="yes"/>
  </relation>
</osm>
"#;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("building-positions-it-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[derive(Default)]
struct Collect {
    nodes: Vec<Node>,
    ways: Vec<Way>,
    relations: Vec<Relation>,
}

impl ElementHandler for Collect {
    fn on_relation(&mut self, relation: &Relation) -> Result<()> {
        self.relations.push(relation.clone());
        Ok(())
    }

    fn on_way(&mut self, way: &Way) -> Result<()> {
        self.ways.push(way.clone());
        Ok(())
    }

    fn on_node(&mut self, node: &Node) -> Result<()> {
        self.nodes.push(node.clone());
        Ok(())
    }
}

#[test]
fn xml_elements_are_parsed() {
    let dir = scratch_dir("parse");
    let path = dir.join("small.osm");
    fs::write(&path, OSM).unwrap();

    let source = open_source(&path).unwrap();
    let mut collect = Collect::default();
    source.traverse(&mut collect).unwrap();

    assert_eq!(collect.nodes.len(), 8);
    assert_eq!(collect.nodes[0].version, 2);
    assert!(collect.nodes[3].location.is_some());
    assert!(collect.nodes[7].location.is_none());

    assert_eq!(collect.ways.len(), 3);
    assert_eq!(collect.ways[0].nodes, vec![1, 2, 3, 4]);
    assert_eq!(collect.ways[0].tags.get_value_by_key("name"), Some("Fish & Chips"));
    assert!(collect.ways[2].nodes.is_empty());

    let relation = &collect.relations[0];
    assert_eq!((relation.id, relation.version), (30, 2));
    assert_eq!(relation.members.len(), 2);
    assert_eq!(relation.members[1].member_type, MemberType::Way);
    assert_eq!(relation.members[1].role, "outer");

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn xz_compressed_extraction_with_area_threshold() {
    let dir = scratch_dir("xz");
    let path = dir.join("small.osm.xz");
    let mut encoder = xz::write::XzEncoder::new(fs::File::create(&path).unwrap(), 6);
    encoder.write_all(OSM.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let output_dir = dir.join("out");
    let invocation = Invocation::from_args(
        path.clone(),
        &["1".to_string(), "50".to_string(), output_dir.display().to_string()],
    )
    .unwrap();
    assert_eq!(invocation.mode, Mode::BinnedWithArea { bin_count: 1, min_area: 50.0 });
    let config = UserConfig {
        progress_bar: false,
        ..UserConfig::default()
    };

    let source = open_source(&path).unwrap();
    let totals = pipeline::run(source.as_ref(), &invocation, &config).unwrap();

    // the 10 m square is kept, the 5 m triangle of relation 30 is not
    assert_eq!(totals, Counters { buildings: 1, ways: 1, relations: 0, skipped: 1 });
    assert_eq!(
        fs::read_to_string(output_dir.join("0.csv")).unwrap(),
        "object_type,id,version,longitude,latitude\nway,10,3,0.0000000,0.0000000\n"
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn relation_index_is_cached_between_runs() {
    let dir = scratch_dir("cached");
    let path = dir.join("small.osm");
    fs::write(&path, OSM).unwrap();
    let output_dir = dir.join("out");
    let invocation = Invocation {
        source: path.clone(),
        mode: Mode::Binned { bin_count: 2 },
        output_dir: output_dir.clone(),
    };
    let config = UserConfig {
        cache_relation_index: true,
        progress_bar: false,
        ..UserConfig::default()
    };

    let source = open_source(&path).unwrap();
    let first = pipeline::run(source.as_ref(), &invocation, &config).unwrap();
    assert!(output_dir.join("small.osm.relations.rkyv").exists());
    let second = pipeline::run(source.as_ref(), &invocation, &config).unwrap();

    assert_eq!(first, Counters { buildings: 2, ways: 1, relations: 1, skipped: 0 });
    assert_eq!(first, second);
    assert!(fs::read_to_string(output_dir.join("0.csv")).unwrap().contains("\nway,10,3,"));
    assert!(fs::read_to_string(output_dir.join("0.csv")).unwrap().contains("\nrelation,30,2,"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = scratch_dir("ext");
    let path = dir.join("small.geojson");
    fs::write(&path, "{}").unwrap();

    assert!(open_source(&path).is_err());
    assert!(open_source(&dir.join("missing.osm")).is_err());

    fs::remove_dir_all(&dir).unwrap();
}
