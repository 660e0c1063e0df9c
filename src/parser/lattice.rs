use crate::parser::line::{Line, LineKind};
use crate::parser::primitive_parser::csv_to_tsv;
use crate::parser::token::{Token, TokenId, TokenKind};

/// Arena of lines and tokens. Token ids increase with line index.
///
/// Index-based lookups are crate internal; outside callers go through
/// [`Lattice::lines`], [`Lattice::tokens`] and [`Lattice::token_at`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Lattice {
    lines: Vec<Line>,
    tokens: Vec<Token>,
}

impl Lattice {
    pub fn from_text(text: &str) -> Self {
        let mut lattice = Lattice::default();
        for line in text.lines() {
            lattice.push_line(line);
        }
        log::debug!(
            "Tokenized {} lines into {} tokens",
            lattice.lines.len(),
            lattice.tokens.len()
        );
        lattice
    }

    pub fn from_csv(text: &str, separator: &str) -> Self {
        let mut lattice = Lattice::default();
        for line in text.lines() {
            lattice.push_line(&csv_to_tsv(line, separator));
        }
        lattice
    }

    /// Tokenize one record and append it.
    pub fn push_line(&mut self, text: &str) {
        let text = text.strip_suffix('\r').unwrap_or(text);
        let index = self.lines.len();
        let kind = LineKind::classify(text);
        let mut line = Line::new(index, kind);
        if kind.has_spines() {
            for (field, field_text) in text.split('\t').enumerate() {
                line.tokens.push(self.push_token(field_text, true, index, field));
            }
        } else if kind != LineKind::Empty {
            line.tokens.push(self.push_token(text, false, index, 0));
        }
        self.lines.push(line);
    }

    fn push_token(&mut self, text: &str, spined: bool, line: usize, field: usize) -> TokenId {
        let kind = TokenKind::classify(text, spined);
        self.tokens.push(Token::new(text, kind, line, field));
        self.tokens.len() - 1
    }

    /// Fresh lattice holding the same text, with every derived field reset.
    pub fn rebuilt(&self) -> Self {
        let mut lattice = Lattice::default();
        for index in 0..self.lines.len() {
            lattice.push_line(&self.line_text(index));
        }
        lattice
    }

    /// Fresh lattice with `text` inserted before line `index`.
    pub fn with_inserted_line(&self, index: usize, text: &str) -> Self {
        let mut lattice = Lattice::default();
        for i in 0..self.lines.len() {
            if i == index {
                lattice.push_line(text);
            }
            lattice.push_line(&self.line_text(i));
        }
        if index >= self.lines.len() {
            lattice.push_line(text);
        }
        lattice
    }

    pub(crate) fn set_token_text(&mut self, id: TokenId, text: &str) {
        let token = &mut self.tokens[id];
        token.kind = TokenKind::classify(text, token.kind != TokenKind::GlobalComment);
        text.clone_into(&mut token.text);
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub(crate) fn line(&self, index: usize) -> &Line {
        &self.lines[index]
    }

    pub(crate) fn line_mut(&mut self, index: usize) -> &mut Line {
        &mut self.lines[index]
    }

    pub(crate) fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id]
    }

    pub(crate) fn token_mut(&mut self, id: TokenId) -> &mut Token {
        &mut self.tokens[id]
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub(crate) fn line_tokens(&self, index: usize) -> impl Iterator<Item = &Token> {
        self.lines[index].tokens.iter().map(|&id| &self.tokens[id])
    }

    /// Token at (line, field), if any.
    pub fn token_at(&self, line: usize, field: usize) -> Option<TokenId> {
        self.lines.get(line).and_then(|l| l.token(field))
    }

    /// Token in the previous field of the same line.
    pub(crate) fn previous_field_token(&self, id: TokenId) -> Option<TokenId> {
        let token = &self.tokens[id];
        let field = token.field.checked_sub(1)?;
        self.token_at(token.line, field)
    }

    pub(crate) fn line_text(&self, index: usize) -> String {
        self.line_tokens(index)
            .map(Token::text)
            .collect::<Vec<_>>()
            .join("\t")
    }

    /// Duration-from-start of the line owning the token.
    pub(crate) fn token_duration_from_start(&self, id: TokenId) -> Option<crate::HumNum> {
        self.lines[self.tokens[id].line].duration_from_start
    }

    /// Spined line made only of null tokens.
    pub(crate) fn is_all_null(&self, index: usize) -> bool {
        self.lines[index].has_spines() && self.line_tokens(index).all(Token::is_null)
    }

    /// Spined line on which every rhythmic token is null.
    pub(crate) fn is_all_rhythmic_null(&self, index: usize) -> bool {
        self.lines[index].has_spines()
            && self
                .line_tokens(index)
                .filter(|t| t.has_rhythm())
                .all(Token::is_null)
    }
}

impl std::fmt::Display for Lattice {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for index in 0..self.lines.len() {
            writeln!(f, "{}", self.line_text(index))?;
        }
        Ok(())
    }
}
