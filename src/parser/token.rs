use crate::parser::primitive_parser::{HumNum, ParameterSet};

/// Stable index of a token in the lattice arena.
pub type TokenId = usize;

pub const NULL_DATA: &str = ".";
pub const NULL_INTERPRETATION: &str = "*";
pub const NULL_COMMENT_LOCAL: &str = "!";
pub const SPLIT: &str = "*^";
pub const MERGE: &str = "*v";
pub const EXCHANGE: &str = "*x";
pub const ADD: &str = "*+";
pub const TERMINATE: &str = "*-";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Exclusive,
    Interpretation,
    LocalComment,
    GlobalComment,
    Barline,
    Data,
}

impl TokenKind {
    pub fn classify(text: &str, spined: bool) -> TokenKind {
        if !spined {
            TokenKind::GlobalComment
        } else if text.starts_with("**") {
            TokenKind::Exclusive
        } else if text.starts_with('*') {
            TokenKind::Interpretation
        } else if text.starts_with('!') {
            TokenKind::LocalComment
        } else if text.starts_with('=') {
            TokenKind::Barline
        } else {
            TokenKind::Data
        }
    }
}

/// Atomic unit of the lattice, one field of one line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub(crate) text: String,
    pub(crate) kind: TokenKind,
    pub(crate) line: usize,
    pub(crate) field: usize,
    pub(crate) data_type: String,
    pub(crate) spine_info: String,
    pub(crate) track: usize, // 0 for global tokens
    pub(crate) subtrack: usize,
    pub(crate) rhythmic: bool,
    pub(crate) next: Vec<TokenId>,
    pub(crate) previous: Vec<TokenId>,
    pub(crate) strand: Option<usize>,
    pub(crate) duration: Option<HumNum>, // None when undefined
    pub(crate) null_resolution: Option<TokenId>,
    pub(crate) parameters: Option<ParameterSet>,
    pub(crate) linked_parameters: Vec<TokenId>,
    pub(crate) previous_non_null: Vec<TokenId>,
    pub(crate) next_non_null: Vec<TokenId>,
}

impl Token {
    pub fn new(text: &str, kind: TokenKind, line: usize, field: usize) -> Self {
        Token {
            text: text.to_string(),
            kind,
            line,
            field,
            data_type: String::new(),
            spine_info: String::new(),
            track: 0,
            subtrack: 0,
            rhythmic: false,
            next: Vec::new(),
            previous: Vec::new(),
            strand: None,
            duration: None,
            null_resolution: None,
            parameters: None,
            linked_parameters: Vec::new(),
            previous_non_null: Vec::new(),
            next_non_null: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    pub const fn line_index(&self) -> usize {
        self.line
    }

    pub const fn field_index(&self) -> usize {
        self.field
    }

    pub fn is_data(&self) -> bool {
        self.kind == TokenKind::Data
    }

    pub fn is_exclusive(&self) -> bool {
        self.kind == TokenKind::Exclusive
    }

    /// True for exclusive interpretations as well.
    pub fn is_interpretation(&self) -> bool {
        matches!(self.kind, TokenKind::Interpretation | TokenKind::Exclusive)
    }

    pub fn is_local_comment(&self) -> bool {
        self.kind == TokenKind::LocalComment
    }

    pub fn is_global_comment(&self) -> bool {
        self.kind == TokenKind::GlobalComment
    }

    pub fn is_barline(&self) -> bool {
        self.kind == TokenKind::Barline
    }

    pub fn is_null(&self) -> bool {
        match self.kind {
            TokenKind::Data => self.text == NULL_DATA,
            TokenKind::Interpretation => self.text == NULL_INTERPRETATION,
            TokenKind::LocalComment => self.text == NULL_COMMENT_LOCAL,
            _ => false,
        }
    }

    pub fn is_non_null_data(&self) -> bool {
        self.is_data() && !self.is_null()
    }

    pub fn is_split(&self) -> bool {
        self.text == SPLIT
    }

    pub fn is_merge(&self) -> bool {
        self.text == MERGE
    }

    pub fn is_exchange(&self) -> bool {
        self.text == EXCHANGE
    }

    pub fn is_add(&self) -> bool {
        self.text == ADD
    }

    pub fn is_terminator(&self) -> bool {
        self.text == TERMINATE
    }

    /// Spine manipulators, exclusive interpretations included.
    pub fn is_manipulator(&self) -> bool {
        self.is_exclusive()
            || self.is_split()
            || self.is_merge()
            || self.is_exchange()
            || self.is_add()
            || self.is_terminator()
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn is_data_type(&self, data_type: &str) -> bool {
        self.data_type == data_type
    }

    pub fn spine_info(&self) -> &str {
        &self.spine_info
    }

    pub const fn track(&self) -> usize {
        self.track
    }

    /// 1-based position among the tokens of the same track on the line,
    /// 0 if the track has a single token on the line.
    pub const fn subtrack(&self) -> usize {
        self.subtrack
    }

    pub const fn has_rhythm(&self) -> bool {
        self.rhythmic
    }

    pub fn next_tokens(&self) -> &[TokenId] {
        &self.next
    }

    pub fn previous_tokens(&self) -> &[TokenId] {
        &self.previous
    }

    pub fn next_token(&self) -> Option<TokenId> {
        self.next.first().copied()
    }

    pub fn previous_token(&self) -> Option<TokenId> {
        self.previous.first().copied()
    }

    /// Index in the global strand list, `None` for global tokens.
    pub const fn strand_index(&self) -> Option<usize> {
        self.strand
    }

    /// Duration of the token, `None` when undefined (non-data or null).
    pub const fn duration(&self) -> Option<HumNum> {
        self.duration
    }

    /// The non-null data token that governs this one.
    pub const fn null_resolution(&self) -> Option<TokenId> {
        self.null_resolution
    }

    /// Parameters parsed from this token when it is a parameter comment.
    pub const fn parameters(&self) -> Option<&ParameterSet> {
        self.parameters.as_ref()
    }

    /// Parameter comment tokens that modify this token.
    pub fn linked_parameters(&self) -> &[TokenId] {
        &self.linked_parameters
    }

    pub fn previous_non_null_data(&self) -> &[TokenId] {
        &self.previous_non_null
    }

    pub fn next_non_null_data(&self) -> &[TokenId] {
        &self.next_non_null
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
