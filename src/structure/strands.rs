use crate::parser::lattice::Lattice;
use crate::parser::token::TokenId;

/// Maximal non-branching run of tokens inside one spine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Strand {
    pub first: TokenId,
    pub last: TokenId,
}

/// Strands grouped per primary spine, plus their flattened order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StrandTable {
    by_spine: Vec<Vec<Strand>>,
    flat: Vec<Strand>,
}

impl StrandTable {
    pub fn strand_count(&self) -> usize {
        self.flat.len()
    }

    pub fn strand(&self, index: usize) -> Option<Strand> {
        self.flat.get(index).copied()
    }

    pub fn strands(&self) -> &[Strand] {
        &self.flat
    }

    pub fn spine_strand_count(&self, spine: usize) -> usize {
        self.by_spine.get(spine).map_or(0, Vec::len)
    }

    pub fn spine_strand(&self, spine: usize, index: usize) -> Option<Strand> {
        self.by_spine.get(spine)?.get(index).copied()
    }
}

/// Partition every spine into strands and tag each token with the index
/// of its strand in the flattened list.
pub fn analyze_strands(lattice: &mut Lattice, spine_starts: &[TokenId]) -> StrandTable {
    let mut by_spine = Vec::with_capacity(spine_starts.len());
    for &start in spine_starts {
        let mut strands = Vec::new();
        let mut pending = vec![start];
        while let Some(first) = pending.pop() {
            let last = walk_strand(lattice, first, &mut pending);
            strands.push(Strand { first, last });
        }
        strands.sort_by_key(|s| {
            let token = lattice.token(s.first);
            (token.line_index(), token.field_index())
        });
        by_spine.push(strands);
    }
    let flat: Vec<Strand> = by_spine.iter().flatten().copied().collect();
    for (index, strand) in flat.iter().enumerate() {
        for id in strand_tokens(lattice, *strand) {
            lattice.token_mut(id).strand = Some(index);
        }
    }
    log::debug!("Found {} strands", flat.len());
    StrandTable { by_spine, flat }
}

/// Follow the primary successor chain from `first` to the end of its strand,
/// queuing every branch met along the way.
fn walk_strand(lattice: &Lattice, first: TokenId, pending: &mut Vec<TokenId>) -> TokenId {
    let mut current = first;
    loop {
        let token = lattice.token(current);
        if token.subtrack() > 1 && token.is_merge() {
            let previous_is_merge = lattice
                .previous_field_token(current)
                .is_some_and(|p| lattice.token(p).is_merge());
            if previous_is_merge {
                return current;
            }
        }
        if token.is_terminator() {
            return current;
        }
        pending.extend(token.next_tokens().iter().skip(1).rev());
        match token.next_token() {
            Some(next) => current = next,
            None => return current,
        }
    }
}

/// Tokens of a strand in order, following primary successors.
pub fn strand_tokens(lattice: &Lattice, strand: Strand) -> Vec<TokenId> {
    let mut tokens = vec![strand.first];
    let mut current = strand.first;
    while current != strand.last {
        match lattice.token(current).next_token() {
            Some(next) => {
                tokens.push(next);
                current = next;
            }
            None => break,
        }
    }
    tokens
}

/// Point every spined token at the non-null data token governing it.
/// Nulls at the head of a strand inherit from the nearest data token
/// reached through primary predecessors.
pub fn resolve_nulls(lattice: &mut Lattice, strands: &StrandTable) {
    for strand in strands.strands() {
        let mut governing = seed_resolution(lattice, strand.first);
        for id in strand_tokens(lattice, *strand) {
            let token = lattice.token(id);
            if !token.is_data() {
                continue;
            }
            if token.is_null() {
                lattice.token_mut(id).null_resolution = Some(governing.unwrap_or(id));
            } else {
                lattice.token_mut(id).null_resolution = Some(id);
                governing = Some(id);
            }
        }
    }
}

fn seed_resolution(lattice: &Lattice, first: TokenId) -> Option<TokenId> {
    let mut current = lattice.token(first).previous_token();
    while let Some(id) = current {
        let token = lattice.token(id);
        if token.is_data() {
            return token.null_resolution.or(Some(id).filter(|_| !token.is_null()));
        }
        current = token.previous_token();
    }
    None
}
