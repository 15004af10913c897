//! Unit tests for layers file parsing and validation.

use super::helpers::{FailingArea, FixedArea, LAYERS_TOML, Workspace};
use super::*;
use crate::layers::{Extent, LayersFile};
use assetgrid_core::BoundingBox;
use camino::Utf8Path;
use rstest::rstest;

fn parse(text: &str) -> LayersFile {
    LayersFile::parse(Utf8Path::new("general.toml"), text).expect("layers should parse")
}

#[rstest]
fn parses_sources_mapit_and_layers() {
    let file = parse(LAYERS_TOML);

    let source = file.sources.get("confirm").expect("source should exist");
    assert_eq!(source.tenant, "LIVE");
    assert_eq!(file.mapit.api_key.as_deref(), Some("key123"));
    assert_eq!(file.layers.len(), 2);
    assert_eq!(file.layers[0].box_size.map(|size| size.get()), Some(20));
    assert_eq!(file.layers[1].box_size, None);
    assert_eq!(file.layers[1].feature_types, vec!["SG", "SP"]);
    let all = file.selected(None).expect("all layers");
    file.validate(&all).expect("layers should validate");
}

#[rstest]
fn mapit_url_defaults_to_public_instance() {
    let file = parse(LAYERS_TOML);
    assert_eq!(file.mapit.url(), assetgrid_data::DEFAULT_MAPIT_URL);
}

#[rstest]
fn mapit_area_takes_precedence_over_bbox() {
    let file = parse(
        r#"
        [[layers]]
        output = "a.geojson"
        source = "confirm"
        bbox = "0,0,1,1"
        mapit_id = 7
        "#,
    );
    assert_eq!(file.layers[0].extent().expect("extent"), Extent::Area(7));
}

#[rstest]
fn area_lookup_receives_configured_key() {
    let file = parse(LAYERS_TOML);
    let areas = FixedArea::new(BoundingBox::new(1, 2, 3, 4));

    let bbox = file.bbox_for(&file.layers[1], &areas).expect("area resolves");

    assert_eq!(bbox, BoundingBox::new(1, 2, 3, 4));
    assert_eq!(areas.requests(), vec![(2514, Some("key123".to_owned()))]);
}

#[rstest]
fn area_lookup_failure_names_layer() {
    let file = parse(LAYERS_TOML);
    match file.bbox_for(&file.layers[1], &FailingArea) {
        Err(CliError::AreaLookup { output, .. }) => assert_eq!(output, "ward/signs.geojson"),
        other => panic!("expected AreaLookup, found {other:?}"),
    }
}

#[rstest]
#[case::unknown_source(
    "[[layers]]\noutput = \"a.geojson\"\nsource = \"missing\"\nbbox = \"0,0,1,1\"\n"
)]
#[case::no_extent("[sources.s]\nurl = \"u\"\nuser = \"u\"\npassword = \"p\"\ntenant = \"t\"\n[[layers]]\noutput = \"a.geojson\"\nsource = \"s\"\n")]
#[case::bad_bbox("[sources.s]\nurl = \"u\"\nuser = \"u\"\npassword = \"p\"\ntenant = \"t\"\n[[layers]]\noutput = \"a.geojson\"\nsource = \"s\"\nbbox = \"0,0,1\"\n")]
fn validation_rejects_broken_layers(#[case] text: &str) {
    let file = parse(text);
    let all = file.selected(None).expect("all layers");
    let err = file.validate(&all).expect_err("layer should be rejected");
    match err {
        CliError::UnknownSource { output, .. }
        | CliError::MissingExtent { output }
        | CliError::InvalidBbox { output, .. } => assert_eq!(output, "a.geojson"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn selecting_unknown_layer_fails() {
    let file = parse(LAYERS_TOML);
    assert_eq!(file.selected(None).expect("all layers").len(), 2);
    assert_eq!(
        file.selected(Some("lights.geojson"))
            .expect("one layer")
            .len(),
        1
    );
    assert!(matches!(
        file.selected(Some("nope.geojson")),
        Err(CliError::UnknownLayer { .. })
    ));
}

#[rstest]
fn load_reports_missing_and_malformed_files() {
    let workspace = Workspace::new();
    let missing = workspace.root().join("absent.toml");
    assert!(matches!(
        LayersFile::load(&missing),
        Err(CliError::ReadLayers { .. })
    ));

    let malformed = workspace.write("broken.toml", "[[layers]\n");
    assert!(matches!(
        LayersFile::load(&malformed),
        Err(CliError::ParseLayers { .. })
    ));

    let valid = workspace.write("general.toml", LAYERS_TOML);
    let file = LayersFile::load(&valid).expect("layers should load");
    assert_eq!(file.layers.len(), 2);
}
