use crate::parser::lattice::Lattice;
use crate::parser::primitive_parser::{
    parse_reference_record, parse_signifier, ReferenceRecord, Signifier,
};

const FILTER_KEY: &str = "filter";
const KERN: &str = "**kern";

/// All `!!!KEY: value` and `!!!!KEY: value` records, in file order.
pub fn reference_records(lattice: &Lattice) -> Vec<ReferenceRecord> {
    lattice
        .lines()
        .iter()
        .filter(|line| line.is_reference())
        .filter_map(|line| line.token(0))
        .filter_map(|id| parse_reference_record(lattice.token(id).text()))
        .collect()
}

pub fn has_global_filters(lattice: &Lattice) -> bool {
    reference_records(lattice)
        .iter()
        .any(|r| !r.universal && r.key == FILTER_KEY)
}

pub fn has_universal_filters(lattice: &Lattice) -> bool {
    reference_records(lattice)
        .iter()
        .any(|r| r.universal && r.key == FILTER_KEY)
}

/// Signifier declarations found in reference records.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Signifiers {
    entries: Vec<Signifier>,
}

impl Signifiers {
    pub fn analyze(lattice: &Lattice) -> Self {
        let entries: Vec<Signifier> = lattice
            .lines()
            .iter()
            .filter(|line| line.is_reference())
            .filter_map(|line| line.token(0))
            .filter_map(|id| parse_signifier(lattice.token(id).text()))
            .collect();
        if !entries.is_empty() {
            log::debug!("Found {} signifiers", entries.len());
        }
        Signifiers { entries }
    }

    pub fn entries(&self) -> &[Signifier] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Signifier of `exclusive` whose definition contains `word`.
    pub fn find(&self, exclusive: &str, word: &str) -> Option<&str> {
        self.entries
            .iter()
            .filter(|s| s.exclusive == exclusive)
            .find(|s| {
                s.definition
                    .split(|c: char| !c.is_alphanumeric())
                    .any(|w| w.eq_ignore_ascii_case(word))
            })
            .map(|s| s.signifier.as_str())
    }

    pub fn kern_link(&self) -> Option<&str> {
        self.find(KERN, "link")
    }

    pub fn kern_above(&self) -> Option<&str> {
        self.find(KERN, "above")
    }

    pub fn kern_below(&self) -> Option<&str> {
        self.find(KERN, "below")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "!!!COM: Bach\n!!!!filter: autobeam\n**kern\n4c>\n*-\n\
                        !!!RDF**kern: > = above\n!!!RDF**kern: < = below\n\
                        !!!RDF**kern: @ = linked\n!!!RDF**kern: H = link\n";

    #[test]
    fn test_reference_records() {
        let lattice = Lattice::from_text(TEXT);
        let records = reference_records(&lattice);
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].key, "COM");
        assert_eq!(records[0].value, "Bach");
        assert!(has_universal_filters(&lattice));
        assert!(!has_global_filters(&lattice));
    }

    #[test]
    fn test_signifiers() {
        let signifiers = Signifiers::analyze(&Lattice::from_text(TEXT));
        assert_eq!(signifiers.entries().len(), 4);
        assert_eq!(signifiers.kern_above(), Some(">"));
        assert_eq!(signifiers.kern_below(), Some("<"));
        // whole words only
        assert_eq!(signifiers.kern_link(), Some("H"));
        assert_eq!(signifiers.find("**mens", "above"), None);
    }

    #[test]
    fn test_no_signifiers() {
        let signifiers = Signifiers::analyze(&Lattice::from_text("**kern\n4c\n*-\n"));
        assert!(signifiers.is_empty());
        assert_eq!(signifiers.kern_link(), None);
    }
}
