use crate::config::AnalysisConfig;
use crate::parser::lattice::Lattice;
use crate::parser::line::Line;
use crate::parser::primitive_parser::{decode_text, HumNum, ReferenceRecord};
use crate::parser::token::{Token, TokenId};
use crate::structure::parameters::{analyze_parameters, linked_parameter};
use crate::structure::records::{
    has_global_filters, has_universal_filters, reference_records, Signifiers,
};
use crate::structure::rhythm::{analyze_rhythm, analyze_token_durations};
use crate::structure::strands::{analyze_strands, resolve_nulls, StrandTable};
use crate::structure::topology::{analyze_topology, Topology};
use crate::HumError;
use num_traits::CheckedSub;
use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;

/// Passes that already ran on the current lattice.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct AnalysisState {
    pub structure: bool,
    pub strands: bool,
    pub nulls: bool,
    pub parameters: bool,
    pub durations: bool,
    pub rhythm: bool,
}

/// A parsed Humdrum file together with its structural and rhythmic analysis.
///
/// Analysis failures never panic: they are collected in [`HumdrumFile::errors`]
/// and flip [`HumdrumFile::is_valid`]. Passes that succeeded before the
/// failure stay queryable.
#[derive(Debug, Default, Clone)]
pub struct HumdrumFile {
    lattice: Lattice,
    config: AnalysisConfig,
    topology: Option<Topology>,
    strands: Option<StrandTable>,
    barlines: Vec<usize>,
    signifiers: Signifiers,
    state: AnalysisState,
    errors: Vec<HumError>,
    tpq: OnceCell<i64>,
    linked: bool, // lattice carries links from an earlier topology pass
}

/// Parse and fully analyze `text`, failing with the first analysis error.
pub fn parse_humdrum(text: &str) -> Result<HumdrumFile, HumError> {
    let mut file = HumdrumFile::new();
    file.read_str(text);
    match file.errors.first() {
        Some(error) => Err(error.clone()),
        None => Ok(file),
    }
}

impl std::str::FromStr for HumdrumFile {
    type Err = HumError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_humdrum(text)
    }
}

impl HumdrumFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        HumdrumFile {
            config,
            ..Self::default()
        }
    }

    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn read_str(&mut self, text: &str) -> bool {
        self.load(Lattice::from_text(text));
        self.analyze_structure()
    }

    /// Lattice, topology, strands and parameters only.
    pub fn read_str_no_rhythm(&mut self, text: &str) -> bool {
        self.load(Lattice::from_text(text));
        self.analyze_structure_no_rhythm()
    }

    /// UTF-8 input, with a Windows-1252 fallback.
    pub fn read_bytes(&mut self, bytes: &[u8]) -> bool {
        self.read_str(&decode_text(bytes))
    }

    pub fn read_reader<R: Read>(&mut self, mut reader: R) -> bool {
        let mut bytes = Vec::new();
        match reader.read_to_end(&mut bytes) {
            Ok(_) => self.read_bytes(&bytes),
            Err(err) => self.fail_read(err.into()),
        }
    }

    pub fn read_path<P: AsRef<Path>>(&mut self, path: P) -> bool {
        match std::fs::read(path.as_ref()) {
            Ok(bytes) => self.read_bytes(&bytes),
            Err(err) => self.fail_read(err.into()),
        }
    }

    pub fn read_path_no_rhythm<P: AsRef<Path>>(&mut self, path: P) -> bool {
        match std::fs::read(path.as_ref()) {
            Ok(bytes) => self.read_str_no_rhythm(&decode_text(&bytes)),
            Err(err) => self.fail_read(err.into()),
        }
    }

    /// Separator-delimited rows, using the configured separator.
    pub fn read_csv_str(&mut self, text: &str) -> bool {
        let lattice = Lattice::from_csv(text, self.config.csv_separator());
        self.load(lattice);
        self.analyze_structure()
    }

    pub fn read_csv_path<P: AsRef<Path>>(&mut self, path: P) -> bool {
        match std::fs::read(path.as_ref()) {
            Ok(bytes) => self.read_csv_str(&decode_text(&bytes)),
            Err(err) => self.fail_read(err.into()),
        }
    }

    fn fail_read(&mut self, error: HumError) -> bool {
        self.load(Lattice::default());
        self.record(error);
        false
    }

    fn load(&mut self, lattice: Lattice) {
        self.lattice = lattice;
        self.linked = false;
        self.invalidate();
    }

    /// Drop every derived result. Stale token links are cleared by the next
    /// topology pass.
    fn invalidate(&mut self) {
        self.topology = None;
        self.strands = None;
        self.barlines.clear();
        self.signifiers = Signifiers::default();
        self.state = AnalysisState::default();
        self.errors.clear();
        self.tpq = OnceCell::new();
    }

    fn record(&mut self, error: HumError) {
        log::warn!("{error}");
        self.errors.push(error);
    }

    pub const fn analysis_state(&self) -> AnalysisState {
        self.state
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[HumError] {
        &self.errors
    }

    /// Re-derive everything from the current text, after programmatic edits.
    pub fn analyze(&mut self) -> bool {
        self.invalidate();
        self.analyze_structure()
    }

    pub fn analyze_structure(&mut self) -> bool {
        self.analyze_rhythm_structure()
    }

    pub fn analyze_structure_no_rhythm(&mut self) -> bool {
        if !(self.resolve_null_tokens()
            && self.analyze_parameters()
            && self.analyze_token_durations())
        {
            return false;
        }
        self.signifiers = Signifiers::analyze(&self.lattice);
        true
    }

    fn analyze_topology(&mut self) -> bool {
        if !self.state.structure {
            self.state.structure = true;
            if self.linked {
                self.lattice = self.lattice.rebuilt();
            }
            self.linked = true;
            match analyze_topology(&mut self.lattice, &self.config) {
                Ok(topology) => self.topology = Some(topology),
                Err(error) => self.record(error),
            }
        }
        self.topology.is_some()
    }

    pub fn analyze_strands(&mut self) -> bool {
        if !self.analyze_topology() {
            return false;
        }
        if !self.state.strands {
            self.state.strands = true;
            if let Some(topology) = &self.topology {
                self.strands = Some(analyze_strands(&mut self.lattice, topology.spine_starts()));
            }
        }
        self.is_valid()
    }

    pub fn resolve_null_tokens(&mut self) -> bool {
        if !self.analyze_strands() {
            return false;
        }
        if !self.state.nulls {
            self.state.nulls = true;
            if let Some(strands) = &self.strands {
                resolve_nulls(&mut self.lattice, strands);
            }
        }
        self.is_valid()
    }

    fn analyze_parameters(&mut self) -> bool {
        if !self.analyze_strands() {
            return false;
        }
        if !self.state.parameters {
            self.state.parameters = true;
            if let Some(strands) = &self.strands {
                analyze_parameters(&mut self.lattice, strands, &self.config);
            }
        }
        self.is_valid()
    }

    fn analyze_token_durations(&mut self) -> bool {
        if !self.analyze_topology() {
            return false;
        }
        if !self.state.durations {
            self.state.durations = true;
            if let Err(error) = analyze_token_durations(&mut self.lattice) {
                self.record(error);
            }
        }
        self.is_valid()
    }

    /// Rhythm pass, running any earlier stage that has not run yet.
    pub fn analyze_rhythm_structure(&mut self) -> bool {
        if !self.analyze_structure_no_rhythm() {
            return false;
        }
        if !self.state.rhythm {
            self.state.rhythm = true;
            self.tpq = OnceCell::new();
            if let Some(topology) = &self.topology {
                match analyze_rhythm(&mut self.lattice, topology, &self.config) {
                    Ok(barlines) => self.barlines = barlines,
                    Err(error) => self.record(error),
                }
            }
        }
        self.is_valid()
    }

    /// Append a tab-separated line. Call [`HumdrumFile::analyze`] afterwards.
    pub fn append(&mut self, text: &str) {
        self.lattice.push_line(text);
        self.invalidate();
    }

    pub fn append_fields<S: AsRef<str>>(&mut self, fields: &[S]) {
        let text = fields
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\t");
        self.append(&text);
    }

    /// Insert a line before line `index`, or at the end when out of range.
    pub fn insert_line(&mut self, index: usize, text: &str) {
        let lattice = self.lattice.with_inserted_line(index, text);
        self.load(lattice);
    }

    /// Replace the text of a token, ignoring unknown ids.
    pub fn set_token_text(&mut self, id: TokenId, text: &str) {
        if id < self.lattice.token_count() {
            self.lattice.set_token_text(id, text);
            self.invalidate();
        }
    }

    pub const fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn lines(&self) -> &[Line] {
        self.lattice.lines()
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lattice.lines().get(index)
    }

    pub fn line_count(&self) -> usize {
        self.lattice.line_count()
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.lattice.tokens().get(id)
    }

    pub fn token_count(&self) -> usize {
        self.lattice.token_count()
    }

    pub fn token_at(&self, line: usize, field: usize) -> Option<TokenId> {
        self.lattice.token_at(line, field)
    }

    /// Duration-from-start of the last line, zero for an empty file.
    pub fn score_duration(&self) -> HumNum {
        self.lattice
            .lines()
            .last()
            .map(Line::duration_from_start)
            .unwrap_or_default()
    }

    /// Distinct positive line durations.
    pub fn positive_line_durations(&self) -> BTreeSet<HumNum> {
        self.lattice
            .lines()
            .iter()
            .map(Line::duration)
            .filter(|d| *d > HumNum::default())
            .collect()
    }

    /// Ticks per quarter note: the smallest subdivision that expresses every
    /// positive line duration as an integer. Zero if it does not fit in `i64`.
    pub fn tpq(&self) -> i64 {
        *self.tpq.get_or_init(|| {
            self.positive_line_durations()
                .iter()
                .map(|d| *d.denom())
                .try_fold(1_i64, |lcm, denom| {
                    lcm.checked_mul(*HumNum::new(lcm, denom).denom())
                })
                .unwrap_or(0)
        })
    }

    /// Print duration-from-start, line duration and text of every line.
    pub fn write_duration_info<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for line in self.lattice.lines() {
            let start = line.duration_from_start();
            writeln!(
                out,
                "{start}\t{:.4}\t{}\t::\t{}",
                *start.numer() as f64 / *start.denom() as f64,
                line.duration(),
                self.lattice.line_text(line.index())
            )?;
        }
        Ok(())
    }

    pub fn barline_count(&self) -> usize {
        self.barlines.len()
    }

    fn barline_index(&self, index: isize) -> Option<usize> {
        let resolved = if index < 0 {
            self.barlines.len().checked_sub(index.unsigned_abs())?
        } else {
            index.unsigned_abs()
        };
        (resolved < self.barlines.len()).then_some(resolved)
    }

    /// Line starting measure `index`; negative indices count from the end.
    pub fn barline(&self, index: isize) -> Option<&Line> {
        let resolved = self.barline_index(index)?;
        self.line(self.barlines[resolved])
    }

    /// Time to the next barline, or to the end of the score for the last one.
    pub fn barline_duration(&self, index: isize) -> HumNum {
        let Some(resolved) = self.barline_index(index) else {
            return HumNum::default();
        };
        let start = self.lattice.line(self.barlines[resolved]).duration_from_start();
        let end = match self.barlines.get(resolved + 1) {
            Some(&next) => self.lattice.line(next).duration_from_start(),
            None => self.score_duration(),
        };
        end.checked_sub(&start).unwrap_or_default()
    }

    pub fn barline_duration_from_start(&self, index: isize) -> HumNum {
        match self.barline_index(index) {
            Some(resolved) => self.lattice.line(self.barlines[resolved]).duration_from_start(),
            None if index >= 0 => self.score_duration(),
            None => HumNum::default(),
        }
    }

    pub fn barline_duration_to_end(&self, index: isize) -> HumNum {
        self.barline_index(index)
            .map(|resolved| self.lattice.line(self.barlines[resolved]).duration_to_end())
            .unwrap_or_default()
    }

    pub fn max_track(&self) -> usize {
        self.topology.as_ref().map_or(0, Topology::max_track)
    }

    /// Primary spines; equal to the number of tracks.
    pub fn spine_count(&self) -> usize {
        self.max_track()
    }

    pub fn spine_start(&self, spine: usize) -> Option<TokenId> {
        self.topology.as_ref()?.spine_starts().get(spine).copied()
    }

    pub fn track_start(&self, track: usize) -> Option<TokenId> {
        self.topology.as_ref()?.track_start(track)
    }

    pub fn track_end_count(&self, track: usize) -> usize {
        self.topology
            .as_ref()
            .map_or(0, |topology| topology.track_end_count(track))
    }

    pub fn track_end(&self, track: usize, index: usize) -> Option<TokenId> {
        self.topology.as_ref()?.track_end(track, index)
    }

    pub fn strand_count(&mut self) -> usize {
        self.analyze_strands();
        self.strands.as_ref().map_or(0, StrandTable::strand_count)
    }

    pub fn strand_start(&mut self, index: usize) -> Option<TokenId> {
        self.analyze_strands();
        Some(self.strands.as_ref()?.strand(index)?.first)
    }

    pub fn strand_end(&mut self, index: usize) -> Option<TokenId> {
        self.analyze_strands();
        Some(self.strands.as_ref()?.strand(index)?.last)
    }

    pub fn spine_strand_count(&mut self, spine: usize) -> usize {
        self.analyze_strands();
        self.strands
            .as_ref()
            .map_or(0, |strands| strands.spine_strand_count(spine))
    }

    pub fn spine_strand_start(&mut self, spine: usize, index: usize) -> Option<TokenId> {
        self.analyze_strands();
        Some(self.strands.as_ref()?.spine_strand(spine, index)?.first)
    }

    pub fn spine_strand_end(&mut self, spine: usize, index: usize) -> Option<TokenId> {
        self.analyze_strands();
        Some(self.strands.as_ref()?.spine_strand(spine, index)?.last)
    }

    /// Value of `key` among the layout parameters of namespace `namespace2`
    /// linked to `token`.
    pub fn linked_parameter(&self, token: TokenId, namespace2: &str, key: &str) -> Option<&str> {
        if token >= self.lattice.token_count() {
            return None;
        }
        linked_parameter(
            &self.lattice,
            token,
            self.config.layout_namespace(),
            namespace2,
            key,
        )
    }

    pub fn reference_records(&self) -> Vec<ReferenceRecord> {
        reference_records(&self.lattice)
    }

    pub fn has_reference_record(&self, key: &str) -> bool {
        self.reference_value(key).is_some()
    }

    /// Value of the first reference record named `key`.
    pub fn reference_value(&self, key: &str) -> Option<String> {
        reference_records(&self.lattice)
            .into_iter()
            .find(|record| record.key == key)
            .map(|record| record.value)
    }

    pub fn has_filters(&self) -> bool {
        self.has_global_filters() || self.has_universal_filters()
    }

    pub fn has_global_filters(&self) -> bool {
        has_global_filters(&self.lattice)
    }

    pub fn has_universal_filters(&self) -> bool {
        has_universal_filters(&self.lattice)
    }

    pub const fn signifiers(&self) -> &Signifiers {
        &self.signifiers
    }

    pub fn kern_link_signifier(&self) -> Option<&str> {
        self.signifiers.kern_link()
    }

    pub fn kern_above_signifier(&self) -> Option<&str> {
        self.signifiers.kern_above()
    }

    pub fn kern_below_signifier(&self) -> Option<&str> {
        self.signifiers.kern_below()
    }
}

impl std::fmt::Display for HumdrumFile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.lattice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> HumNum {
        HumNum::new(n, d)
    }

    const MEASURES: &str = "**kern\n*M3/4\n4c\n=1\n8d\n8e\n2f\n=2\n4.g\n8a\n4b\n=3\n*-\n";

    #[test]
    fn test_read_and_query() {
        let file = parse_humdrum(MEASURES).unwrap();
        assert_eq!(file.line_count(), 13);
        assert_eq!(file.score_duration(), q(7, 1));
        assert_eq!(file.tpq(), 2);
        assert_eq!(file.max_track(), 1);
        assert_eq!(file.spine_count(), 1);
        assert_eq!(file.track_end_count(1), 1);
        assert!(file.analysis_state().rhythm);
        assert_eq!(file.to_string(), MEASURES);
    }

    #[test]
    fn test_barline_queries() {
        let file = parse_humdrum(MEASURES).unwrap();
        // pickup at line 0, then =1 =2 =3
        assert_eq!(file.barline_count(), 4);
        assert_eq!(file.barline(0).map(Line::index), Some(0));
        assert_eq!(file.barline(-1).map(Line::index), Some(11));
        assert_eq!(file.barline(4), None);
        assert_eq!(file.barline(-5), None);
        assert_eq!(file.barline_duration(0), q(1, 1));
        assert_eq!(file.barline_duration(1), q(3, 1));
        assert_eq!(file.barline_duration(-1), q(0, 1));
        assert_eq!(file.barline_duration_from_start(2), q(4, 1));
        assert_eq!(file.barline_duration_from_start(9), q(7, 1));
        assert_eq!(file.barline_duration_to_end(1), q(6, 1));
        assert_eq!(file.barline_duration_to_end(9), q(0, 1));
    }

    #[test]
    fn test_positive_line_durations() {
        let file = parse_humdrum(MEASURES).unwrap();
        let durations: Vec<HumNum> = file.positive_line_durations().into_iter().collect();
        assert_eq!(durations, vec![q(1, 2), q(1, 1), q(3, 2), q(2, 1)]);
    }

    #[test]
    fn test_tpq_of_triplets() {
        let file = parse_humdrum("**kern\n12c\n12d\n12e\n8f\n8g\n*-\n").unwrap();
        assert_eq!(file.tpq(), 6);
        let file = parse_humdrum("**kern\n1c\n*-\n").unwrap();
        assert_eq!(file.tpq(), 1);
    }

    #[test]
    fn test_invalid_file_keeps_errors() {
        let mut file = HumdrumFile::new();
        assert!(!file.read_str("**kern\t**kern\n4c\n*-\t*-\n"));
        assert!(!file.is_valid());
        assert_eq!(file.errors().len(), 1);
        assert!(file.analysis_state().structure);
        assert!(!file.analysis_state().rhythm);
        assert_eq!(file.max_track(), 0);
        let error = parse_humdrum("**kern\n4c\n").unwrap_err();
        assert!(matches!(error, HumError::Structural { .. }));
    }

    #[test]
    fn test_no_rhythm_read() {
        let mut file = HumdrumFile::new();
        assert!(file.read_str_no_rhythm("**kern\t**kern\n4c\t4d\n4e\t.\n*-\t*-\n"));
        let state = file.analysis_state();
        assert!(state.structure && state.strands && state.nulls && state.parameters);
        assert!(!state.rhythm);
        assert_eq!(file.barline_count(), 0);
        // the inconsistent rhythm shows up only once asked for
        assert!(!file.analyze_rhythm_structure());
        assert!(matches!(
            file.errors()[0],
            HumError::RhythmInconsistency { .. }
        ));
    }

    #[test]
    fn test_tpq_follows_late_rhythm_pass() {
        let mut file = HumdrumFile::new();
        assert!(file.read_str_no_rhythm("**kern\n8c\n8d\n4e\n*-\n"));
        assert_eq!(file.tpq(), 1);
        assert!(file.analyze_rhythm_structure());
        assert_eq!(file.tpq(), 2);
    }

    #[test]
    fn test_rhythm_pass_runs_earlier_stages() {
        let mut file = HumdrumFile::new();
        file.append("**kern");
        file.append("!LO:TX:t=hi");
        file.append("4c");
        file.append(".");
        file.append("*-");
        assert!(file.analyze_rhythm_structure());
        let state = file.analysis_state();
        assert!(state.strands && state.nulls && state.parameters && state.rhythm);
        let c = file.token_at(2, 0).unwrap();
        let null = file.token_at(3, 0).unwrap();
        assert_eq!(file.linked_parameter(c, "TX", "t"), Some("hi"));
        assert_eq!(file.token(null).unwrap().null_resolution(), Some(c));
    }

    #[test]
    fn test_out_of_range_durations() {
        let file = parse_humdrum("**kern\n1%3000000000000000000c\n*-\n").unwrap();
        assert_eq!(file.score_duration(), q(0, 1));
        let error = parse_humdrum("**kern\n5000000001c\n5000000003d\n*-\n").unwrap_err();
        assert!(matches!(error, HumError::RhythmInconsistency { line: 3, .. }));
    }

    #[test]
    fn test_lazy_strands() {
        let mut file = HumdrumFile::new();
        file.append("**kern");
        file.append("*^");
        file.append_fields(&["4c", "4e"]);
        file.append_fields(&["*v", "*v"]);
        file.append("*-");
        assert!(!file.analysis_state().strands);
        assert_eq!(file.strand_count(), 2);
        assert_eq!(file.strand_start(0), file.token_at(0, 0));
        assert_eq!(file.strand_end(1), file.token_at(3, 1));
        assert_eq!(file.spine_strand_count(0), 2);
        assert_eq!(file.spine_strand_start(0, 1), file.token_at(2, 1));
        assert_eq!(file.spine_strand_end(0, 0), file.token_at(4, 0));
        assert_eq!(file.strand_start(5), None);
    }

    #[test]
    fn test_programmatic_construction() {
        let mut file = HumdrumFile::new();
        file.append_fields(&["**kern", "**kern"]);
        file.append_fields(&["4c", "2e"]);
        file.append_fields(&["4d", "."]);
        file.append_fields(&["*-", "*-"]);
        assert!(file.analyze());
        assert_eq!(file.score_duration(), q(2, 1));
        file.insert_line(1, "*M2/4\t*M2/4");
        assert_eq!(file.analysis_state(), AnalysisState::default());
        assert!(file.analyze());
        assert_eq!(file.line(2).map(Line::duration), Some(q(1, 1)));
        let d = file.token_at(3, 0).unwrap();
        file.set_token_text(d, "8d");
        assert!(!file.analyze());
        assert!(matches!(
            file.errors()[0],
            HumError::RhythmInconsistency { .. }
        ));
    }

    #[test]
    fn test_linked_parameter() {
        let file = parse_humdrum("**kern\n!LO:TX:a:t=dolce\n4c\n*-\n").unwrap();
        let c = file.token_at(2, 0).unwrap();
        assert_eq!(file.linked_parameter(c, "TX", "t"), Some("dolce"));
        assert_eq!(file.linked_parameter(c, "TX", "a"), Some("true"));
        assert_eq!(file.linked_parameter(c, "N", "t"), None);
        assert_eq!(file.linked_parameter(999, "TX", "t"), None);
    }

    #[test]
    fn test_records_and_signifiers() {
        let text = "!!!COM: Josquin\n**kern\n4c\n*-\n!!!RDF**kern: i = above\n!!!filter: autobeam\n";
        let file = parse_humdrum(text).unwrap();
        assert!(file.has_reference_record("COM"));
        assert!(!file.has_reference_record("OTL"));
        assert_eq!(file.reference_value("COM").as_deref(), Some("Josquin"));
        assert!(file.has_filters());
        assert!(file.has_global_filters());
        assert!(!file.has_universal_filters());
        assert_eq!(file.kern_above_signifier(), Some("i"));
        assert_eq!(file.kern_below_signifier(), None);
    }

    #[test]
    fn test_read_bytes_windows_1252() {
        let mut bytes = b"!!!OTL: Caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"\n**kern\n4c\n*-\n");
        let mut file = HumdrumFile::new();
        assert!(file.read_bytes(&bytes));
        assert_eq!(file.reference_value("OTL").as_deref(), Some("Café"));
    }

    #[test]
    fn test_read_missing_path() {
        let mut file = HumdrumFile::new();
        assert!(!file.read_path("test-files/does-not-exist.krn"));
        assert!(matches!(file.errors()[0], HumError::IoError(_)));
        assert_eq!(file.line_count(), 0);
    }

    #[test]
    fn test_duration_info() {
        let file = parse_humdrum("**kern\n8c\n*-\n").unwrap();
        let mut out = Vec::new();
        file.write_duration_info(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "0\t0.0000\t1/2\t::\t8c");
        assert_eq!(lines[2], "1/2\t0.5000\t0\t::\t*-");
    }
}
