use crate::config::AnalysisConfig;
use crate::parser::lattice::Lattice;
use crate::parser::primitive_parser::parse_parameters;
use crate::parser::token::TokenId;
use crate::structure::strands::{strand_tokens, StrandTable};

/// Parse parameter comments and link each one to the tokens it modifies.
pub fn analyze_parameters(lattice: &mut Lattice, strands: &StrandTable, config: &AnalysisConfig) {
    link_global_parameters(lattice, config);
    link_local_parameters(lattice, strands, config);
}

/// Global parameter lines apply to every field of the next spined line that
/// is neither all-null nor a local comment line.
fn link_global_parameters(lattice: &mut Lattice, config: &AnalysisConfig) {
    let prefix = config.global_layout_prefix();
    let mut pending: Vec<TokenId> = Vec::new();
    for index in 0..lattice.line_count() {
        let line = lattice.line(index);
        if line.is_comment_global() {
            let Some(&id) = line.tokens().first() else {
                continue;
            };
            let text = lattice.token(id).text();
            if text.starts_with(&prefix) {
                if let Some(params) = parse_parameters(text) {
                    lattice.token_mut(id).parameters = Some(params);
                    pending.push(id);
                }
            }
            continue;
        }
        if pending.is_empty()
            || !line.has_spines()
            || line.is_comment_local()
            || lattice.is_all_null(index)
        {
            continue;
        }
        for id in line.tokens().to_vec() {
            lattice
                .token_mut(id)
                .linked_parameters
                .extend(pending.iter().copied());
        }
        pending.clear();
    }
}

/// Local parameter comments modify the next data, barline or non-null
/// interpretation token below them in the same strand.
fn link_local_parameters(lattice: &mut Lattice, strands: &StrandTable, config: &AnalysisConfig) {
    let prefix = config.local_layout_prefix();
    for strand in strands.strands() {
        let mut target: Option<TokenId> = None;
        for id in strand_tokens(lattice, *strand).into_iter().rev() {
            let token = lattice.token(id);
            if token.is_data()
                || token.is_barline()
                || (token.is_interpretation() && !token.is_null())
            {
                target = Some(id);
                continue;
            }
            if !token.is_local_comment() || !token.text().starts_with(&prefix) {
                continue;
            }
            let Some(params) = parse_parameters(token.text()) else {
                continue;
            };
            lattice.token_mut(id).parameters = Some(params);
            if let Some(target) = target {
                let linked = &mut lattice.token_mut(target).linked_parameters;
                if !linked.contains(&id) {
                    linked.push(id);
                }
            }
        }
    }
}

/// Value of `key` in the first parameter comment linked to `token` whose
/// namespaces match.
pub fn linked_parameter<'a>(
    lattice: &'a Lattice,
    token: TokenId,
    namespace1: &str,
    namespace2: &str,
    key: &str,
) -> Option<&'a str> {
    lattice
        .token(token)
        .linked_parameters()
        .iter()
        .filter_map(|&id| lattice.token(id).parameters())
        .filter(|p| p.namespace1 == namespace1 && p.namespace2 == namespace2)
        .find_map(|p| p.get(key))
}
