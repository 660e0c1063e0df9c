//! Humstruct - structural and rhythmic analysis of Humdrum data
//!
//! This library provides:
//! - Tokenizing of Humdrum text (tab-separated or CSV) into a line/token lattice
//! - Spine topology: splits, merges, exchanges, added and terminated spines
//! - Strand segmentation, null-token resolution and layout parameter linking
//! - Exact rational timing of every line and token
//!
//! # Example
//!
//! ```
//! use humstruct::{parse_humdrum, HumNum};
//!
//! let file = parse_humdrum("**kern\n4c\n4d\n2e\n*-\n").unwrap();
//! assert_eq!(file.score_duration(), HumNum::from_integer(4));
//! assert_eq!(file.line(2).unwrap().duration_from_start(), HumNum::from_integer(1));
//! ```

pub mod config;
pub mod error;
pub mod file;
pub mod parser;
pub mod structure;

// Re-export main types for convenience
pub use config::AnalysisConfig;
pub use error::HumError;
pub use file::{parse_humdrum, AnalysisState, HumdrumFile};
pub use parser::{
    lattice::Lattice,
    line::{Line, LineKind},
    primitive_parser::{recip_to_duration, HumNum, ParameterSet, ReferenceRecord, Signifier},
    token::{Token, TokenId, TokenKind},
};
pub use structure::{records::Signifiers, strands::Strand};
