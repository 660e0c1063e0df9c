//! Integration tests for humstruct library usage.
//!
//! These tests verify that the library can be used as a dependency
//! from external projects.

use humstruct::{
    parse_humdrum, recip_to_duration, AnalysisConfig, HumError, HumNum, HumdrumFile, Line,
    LineKind, TokenId,
};
use std::io::Cursor;

/// Test that all major types are accessible from the library.
#[test]
fn test_types_accessible() {
    // If any re-export is missing, this test will fail to compile.
    fn _assert_types() {
        let _: fn(&str) -> Result<HumdrumFile, HumError> = parse_humdrum;
        let _: fn(&str) -> HumNum = recip_to_duration;
        let _: TokenId = 0;
    }
}

/// Test reading a fixture from disk.
#[test]
fn test_read_path() {
    let mut file = HumdrumFile::new();
    assert!(file.read_path("test-files/chorale.krn"), "{:?}", file.errors());
    assert!(file.is_valid());
    assert_eq!(file.spine_count(), 4);
    assert_eq!(file.score_duration(), HumNum::from_integer(7));
    let kinds: Vec<LineKind> = file.lines().iter().take(3).map(Line::kind).collect();
    assert_eq!(
        kinds,
        vec![
            LineKind::GlobalReference,
            LineKind::GlobalReference,
            LineKind::Exclusive
        ]
    );
}

/// Test reading from any `Read` source.
#[test]
fn test_read_reader() {
    let mut file = HumdrumFile::new();
    assert!(file.read_reader(Cursor::new("**kern\n2c\n2d\n*-\n")));
    assert_eq!(file.score_duration(), HumNum::from_integer(4));
}

/// Test building a file line by line, as a converter would.
#[test]
fn test_build_then_analyze() {
    let mut file = HumdrumFile::new();
    file.append_fields(&["**kern", "**text"]);
    file.append_fields(&["4.c", "Ky-"]);
    file.append_fields(&["8d", "-ri-"]);
    file.append_fields(&["2e", "e"]);
    file.append_fields(&["*-", "*-"]);
    assert!(file.analyze());
    assert_eq!(file.tpq(), 2);
    let syllable = file.token_at(2, 1).unwrap();
    assert_eq!(
        file.token(syllable).unwrap().duration(),
        Some(HumNum::new(1, 2))
    );
    assert_eq!(file.to_string().lines().count(), 5);
}

/// Test a custom set of rhythmic spine types.
#[test]
fn test_custom_config() {
    let mut config = AnalysisConfig::default();
    config.set_rhythmic_types(vec!["**kern".to_string(), "**mens".to_string()]);
    let mut file = HumdrumFile::with_config(config);
    assert!(file.read_str("**mens\t**kern\n2c\t4d\n.\t4e\n*-\t*-\n"));
    let mens = file.token_at(1, 0).unwrap();
    assert!(file.token(mens).unwrap().has_rhythm());
    assert_eq!(file.score_duration(), HumNum::from_integer(2));
}

/// Test that analysis errors are reported, not raised.
#[test]
fn test_invalid_input() {
    let error = "**kern\n4c\n".parse::<HumdrumFile>().unwrap_err();
    assert!(matches!(error, HumError::Structural { .. }));
    let mut file = HumdrumFile::new();
    assert!(!file.read_str("**kern\t**kern\n4c\t4d\n4e\t.\n*-\t*-\n"));
    assert!(!file.is_valid());
    assert!(file.errors()[0].to_string().contains("line 4"));
}

/// Test that lookups through the public lattice never panic.
#[test]
fn test_lattice_lookups_out_of_range() {
    let file = parse_humdrum("**kern\n4c\n*-\n").unwrap();
    let lattice = file.lattice();
    assert_eq!(lattice.line_count(), 3);
    assert!(lattice.lines().get(3).is_none());
    assert!(lattice.tokens().get(99).is_none());
    assert_eq!(lattice.token_at(1, 5), None);
    assert_eq!(lattice.token_at(7, 0), None);
    assert!(file.line(3).is_none());
    assert!(file.token(99).is_none());
}
