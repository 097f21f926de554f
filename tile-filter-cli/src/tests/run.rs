//! End-to-end coverage of loading a region and filtering a tile stream.

use super::helpers::{SQUARE, Workspace};
use super::*;
use rstest::{fixture, rstest};
use std::io;
use tile_filter_core::{FilterError, RegionError};

struct Staged {
    _workspace: Workspace,
    config: FilterConfig,
}

#[fixture]
fn square() -> Staged {
    let workspace = Workspace::new();
    let geometry = workspace.write("square.geojson", SQUARE);
    Staged {
        _workspace: workspace,
        config: FilterConfig { geometry },
    }
}

fn filter_to_string(config: &FilterConfig, input: &str) -> Result<String, CliError> {
    let mut output = Vec::new();
    run_filter_with(config, input.as_bytes(), &mut output)?;
    Ok(String::from_utf8(output).expect("utf-8 output"))
}

#[rstest]
fn filters_the_documented_example(square: Staged) {
    let output = filter_to_string(&square.config, "[0,0,1]\n[1,1,1]\n[1,0,5]\n")
        .expect("filter succeeds");
    assert_eq!(output, "[0, 0, 1]\n[1, 1, 1]\n");
}

#[rstest]
fn feature_collection_files_are_accepted() {
    let workspace = Workspace::new();
    let geometry = workspace.write(
        "collection.geojson",
        r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [-100, 40]}}
            ]
        }"#,
    );
    let config = FilterConfig { geometry };
    let output = filter_to_string(&config, "[0, 0, 1]\n[1, 0, 1]\n[0, 1, 1]\n")
        .expect("filter succeeds");
    assert_eq!(output, "[0, 0, 1]\n");
}

#[rstest]
fn invalid_geojson_fails_to_load() {
    let workspace = Workspace::new();
    let geometry = workspace.write("broken.geojson", "{\"type\": \"Polygon\"");
    let config = FilterConfig {
        geometry: geometry.clone(),
    };
    let err = filter_to_string(&config, "[0, 0, 0]\n").expect_err("broken geometry");
    match err {
        CliError::LoadGeometry {
            path,
            source: RegionError::Parse(_),
        } => assert_eq!(path, geometry),
        other => panic!("expected LoadGeometry, found {other:?}"),
    }
}

#[rstest]
fn missing_geometry_file_fails_before_reading_input() {
    let workspace = Workspace::new();
    let config = FilterConfig {
        geometry: workspace.path("absent.geojson"),
    };
    let err = filter_to_string(&config, "not even a tile\n").expect_err("missing file");
    assert!(
        matches!(err, CliError::MissingSourceFile { .. }),
        "unexpected error {err:?}"
    );
}

#[rstest]
fn malformed_tile_line_is_fatal(square: Staged) {
    let mut output = Vec::new();
    let err = run_filter_with(&square.config, "[0, 0, 0]\n[0, 0]\n".as_bytes(), &mut output)
        .expect_err("malformed line");
    match err {
        CliError::Filter(FilterError::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected Filter(Parse), found {other:?}"),
    }
    assert_eq!(output, b"[0, 0, 0]\n");
}

#[rstest]
fn closed_output_ends_the_run_quietly(square: Staged) {
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    run_filter_with(&square.config, "[0, 0, 0]\n".as_bytes(), &mut ClosedPipe)
        .expect("broken pipe is not an error");
}

#[rstest]
fn other_write_failures_are_reported(square: Staged) {
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let err = run_filter_with(&square.config, "[0, 0, 0]\n".as_bytes(), &mut FullDisk)
        .expect_err("write failure");
    assert!(
        matches!(err, CliError::Filter(FilterError::Write(_))),
        "unexpected error {err:?}"
    );
}
