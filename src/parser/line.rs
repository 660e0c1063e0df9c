use crate::parser::primitive_parser::HumNum;
use crate::parser::token::TokenId;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LineKind {
    Empty,
    GlobalComment,
    GlobalReference,
    UniversalReference,
    LocalComment,
    Exclusive,
    Interpretation,
    Barline,
    Data,
}

impl LineKind {
    pub fn classify(text: &str) -> LineKind {
        if text.is_empty() {
            LineKind::Empty
        } else if text.starts_with("!!") {
            match crate::parser::primitive_parser::parse_reference_record(text) {
                Some(record) if record.universal => LineKind::UniversalReference,
                Some(_) => LineKind::GlobalReference,
                None => LineKind::GlobalComment,
            }
        } else if text.starts_with('!') {
            LineKind::LocalComment
        } else if text.starts_with("**") {
            LineKind::Exclusive
        } else if text.starts_with('*') {
            LineKind::Interpretation
        } else if text.starts_with('=') {
            LineKind::Barline
        } else {
            LineKind::Data
        }
    }

    pub const fn has_spines(self) -> bool {
        matches!(
            self,
            LineKind::LocalComment
                | LineKind::Exclusive
                | LineKind::Interpretation
                | LineKind::Barline
                | LineKind::Data
        )
    }
}

/// One record of the input, owning the ids of its tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub(crate) index: usize,
    pub(crate) kind: LineKind,
    pub(crate) tokens: Vec<TokenId>,
    pub(crate) duration: Option<HumNum>,
    pub(crate) duration_from_start: Option<HumNum>,
    pub(crate) duration_from_barline: HumNum,
    pub(crate) duration_to_barline: HumNum,
    pub(crate) duration_to_end: HumNum,
    pub(crate) rhythm_analyzed: bool,
}

impl Line {
    pub fn new(index: usize, kind: LineKind) -> Self {
        Line {
            index,
            kind,
            tokens: Vec::new(),
            duration: None,
            duration_from_start: None,
            duration_from_barline: HumNum::default(),
            duration_to_barline: HumNum::default(),
            duration_to_end: HumNum::default(),
            rhythm_analyzed: false,
        }
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub const fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    pub fn token(&self, field: usize) -> Option<TokenId> {
        self.tokens.get(field).copied()
    }

    pub fn field_count(&self) -> usize {
        self.tokens.len()
    }

    pub const fn has_spines(&self) -> bool {
        self.kind.has_spines()
    }

    pub fn is_data(&self) -> bool {
        self.kind == LineKind::Data
    }

    pub fn is_barline(&self) -> bool {
        self.kind == LineKind::Barline
    }

    pub fn is_exclusive(&self) -> bool {
        self.kind == LineKind::Exclusive
    }

    pub fn is_interpretation(&self) -> bool {
        matches!(self.kind, LineKind::Interpretation | LineKind::Exclusive)
    }

    pub fn is_comment_local(&self) -> bool {
        self.kind == LineKind::LocalComment
    }

    /// Global comments, reference records included.
    pub fn is_comment_global(&self) -> bool {
        matches!(
            self.kind,
            LineKind::GlobalComment | LineKind::GlobalReference | LineKind::UniversalReference
        )
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self.kind,
            LineKind::GlobalReference | LineKind::UniversalReference
        )
    }

    pub fn is_empty(&self) -> bool {
        self.kind == LineKind::Empty
    }

    /// Time span occupied by the line, zero before rhythm analysis.
    pub fn duration(&self) -> HumNum {
        self.duration.unwrap_or_default()
    }

    /// Absolute offset from the start of the score, zero when unresolved.
    pub fn duration_from_start(&self) -> HumNum {
        self.duration_from_start.unwrap_or_default()
    }

    /// Absolute offset from the start of the score, `None` when unresolved.
    pub const fn resolved_duration_from_start(&self) -> Option<HumNum> {
        self.duration_from_start
    }

    pub const fn duration_from_barline(&self) -> HumNum {
        self.duration_from_barline
    }

    pub const fn duration_to_barline(&self) -> HumNum {
        self.duration_to_barline
    }

    pub const fn duration_to_end(&self) -> HumNum {
        self.duration_to_end
    }

    pub const fn is_rhythm_analyzed(&self) -> bool {
        self.rhythm_analyzed
    }
}
