use crate::config::AnalysisConfig;
use crate::parser::lattice::Lattice;
use crate::parser::token::TokenId;
use crate::HumError;
use std::collections::HashMap;

/// Track identities of a file: where each primary spine starts and where
/// its branches end.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Topology {
    track_starts: Vec<TokenId>,
    track_ends: Vec<Vec<TokenId>>,
}

impl Topology {
    pub fn max_track(&self) -> usize {
        self.track_starts.len()
    }

    /// Exclusive interpretation opening `track` (1-based).
    pub fn track_start(&self, track: usize) -> Option<TokenId> {
        self.track_starts.get(track.checked_sub(1)?).copied()
    }

    pub fn track_end_count(&self, track: usize) -> usize {
        track
            .checked_sub(1)
            .and_then(|t| self.track_ends.get(t))
            .map_or(0, Vec::len)
    }

    pub fn track_end(&self, track: usize, index: usize) -> Option<TokenId> {
        self.track_ends.get(track.checked_sub(1)?)?.get(index).copied()
    }

    pub fn track_ends(&self, track: usize) -> &[TokenId] {
        track
            .checked_sub(1)
            .and_then(|t| self.track_ends.get(t))
            .map_or(&[], Vec::as_slice)
    }

    /// Primary spines in order of appearance, one per track.
    pub fn spine_starts(&self) -> &[TokenId] {
        &self.track_starts
    }
}

/// One live spine while walking down the file.
#[derive(Debug, Clone)]
struct OpenPath {
    data_type: String,
    spine_info: String,
    track: usize,
    sources: Vec<TokenId>, // tokens feeding the next line, empty for a `*+` spine
}

#[derive(Debug, Default)]
struct TopologyBuilder {
    paths: Vec<OpenPath>,
    track_starts: Vec<Option<TokenId>>,
    track_ends: Vec<Vec<TokenId>>,
}

/// Link every spined token to its neighbours on adjacent spined lines, assign
/// spine info, tracks and subtracks.
pub fn analyze_topology(
    lattice: &mut Lattice,
    config: &AnalysisConfig,
) -> Result<Topology, HumError> {
    let mut builder = TopologyBuilder::default();
    for index in 0..lattice.line_count() {
        if lattice.line(index).has_spines() {
            builder.process_line(lattice, config, index)?;
        }
    }
    if !builder.paths.is_empty() {
        return Err(HumError::Structural {
            line: lattice.line_count(),
            message: format!(
                "{} spine(s) not terminated at end of data",
                builder.paths.len()
            ),
        });
    }
    assign_subtracks(lattice);
    let track_starts = builder
        .track_starts
        .iter()
        .copied()
        .enumerate()
        .map(|(i, start)| {
            start.ok_or_else(|| HumError::Structural {
                line: lattice.line_count(),
                message: format!("track {} never received an exclusive interpretation", i + 1),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("Found {} tracks", track_starts.len());
    Ok(Topology {
        track_starts,
        track_ends: builder.track_ends,
    })
}

impl TopologyBuilder {
    fn open_track(&mut self) -> usize {
        self.track_starts.push(None);
        self.track_ends.push(Vec::new());
        self.track_starts.len()
    }

    fn process_line(
        &mut self,
        lattice: &mut Lattice,
        config: &AnalysisConfig,
        index: usize,
    ) -> Result<(), HumError> {
        let ids = lattice.line(index).tokens().to_vec();
        if self.paths.is_empty() {
            return self.open_spines(lattice, config, index, &ids);
        }
        if ids.len() != self.paths.len() {
            return Err(HumError::Structural {
                line: index + 1,
                message: format!(
                    "line has {} fields but {} spines are active",
                    ids.len(),
                    self.paths.len()
                ),
            });
        }
        for (path, &id) in self.paths.iter().zip(&ids) {
            let token = lattice.token(id);
            let exclusive = token.is_exclusive();
            if path.sources.is_empty() {
                if !exclusive {
                    return Err(HumError::Structural {
                        line: index + 1,
                        message: format!(
                            "added spine must start with an exclusive interpretation, found {:?}",
                            token.text()
                        ),
                    });
                }
                self.track_starts[path.track - 1] = Some(id);
            }
            let data_type = if exclusive {
                token.text().to_string()
            } else {
                path.data_type.clone()
            };
            let token = lattice.token_mut(id);
            token.rhythmic = config.is_rhythmic(&data_type);
            token.data_type = data_type;
            token.spine_info.clone_from(&path.spine_info);
            token.track = path.track;
            for &source in &path.sources {
                lattice.token_mut(source).next.push(id);
                lattice.token_mut(id).previous.push(source);
            }
        }
        self.paths = if lattice.line(index).is_interpretation() {
            self.manipulate(lattice, index, &ids)?
        } else {
            ids.iter().map(|&id| path_from(lattice, id)).collect()
        };
        Ok(())
    }

    fn open_spines(
        &mut self,
        lattice: &mut Lattice,
        config: &AnalysisConfig,
        index: usize,
        ids: &[TokenId],
    ) -> Result<(), HumError> {
        if let Some(&id) = ids.iter().find(|&&id| !lattice.token(id).is_exclusive()) {
            return Err(HumError::Structural {
                line: index + 1,
                message: format!(
                    "expected exclusive interpretation to start spines, found {:?}",
                    lattice.token(id).text()
                ),
            });
        }
        for &id in ids {
            let track = self.open_track();
            self.track_starts[track - 1] = Some(id);
            let token = lattice.token_mut(id);
            token.data_type = token.text.clone();
            token.rhythmic = config.is_rhythmic(&token.data_type);
            token.spine_info = track.to_string();
            token.track = track;
            self.paths.push(path_from(lattice, id));
        }
        log::debug!("Opened {} spines on line {}", ids.len(), index + 1);
        Ok(())
    }

    /// Paths feeding the next spined line after the manipulators of this one.
    fn manipulate(
        &mut self,
        lattice: &Lattice,
        index: usize,
        ids: &[TokenId],
    ) -> Result<Vec<OpenPath>, HumError> {
        let mut paths = Vec::with_capacity(ids.len());
        let mut i = 0;
        while i < ids.len() {
            let id = ids[i];
            let token = lattice.token(id);
            if token.is_split() {
                let path = path_from(lattice, id);
                for branch in ['a', 'b'] {
                    paths.push(OpenPath {
                        spine_info: format!("({}){branch}", path.spine_info),
                        ..path.clone()
                    });
                }
                i += 1;
            } else if token.is_merge() {
                let end = ids[i..]
                    .iter()
                    .position(|&t| !lattice.token(t).is_merge())
                    .map_or(ids.len(), |p| i + p);
                if end - i < 2 {
                    return Err(HumError::Structural {
                        line: index + 1,
                        message: format!("merge in field {} has no adjacent merge", i + 1),
                    });
                }
                let infos: Vec<&str> = ids[i..end]
                    .iter()
                    .map(|&t| lattice.token(t).spine_info())
                    .collect();
                let track = token.track;
                for &other in &ids[i + 1..end] {
                    let other_track = lattice.token(other).track;
                    if other_track != track && !self.track_ends[other_track - 1].contains(&other)
                    {
                        self.track_ends[other_track - 1].push(other);
                    }
                }
                paths.push(OpenPath {
                    data_type: token.data_type.clone(),
                    spine_info: merged_spine_info(&infos),
                    track,
                    sources: ids[i..end].to_vec(),
                });
                i = end;
            } else if token.is_exchange() {
                let partner = ids.get(i + 1).copied();
                match partner {
                    Some(partner) if lattice.token(partner).is_exchange() => {
                        paths.push(path_from(lattice, partner));
                        paths.push(path_from(lattice, id));
                        i += 2;
                    }
                    _ => {
                        return Err(HumError::Structural {
                            line: index + 1,
                            message: format!("exchange in field {} has no partner", i + 1),
                        });
                    }
                }
            } else if token.is_add() {
                paths.push(path_from(lattice, id));
                let track = self.open_track();
                paths.push(OpenPath {
                    data_type: String::new(),
                    spine_info: track.to_string(),
                    track,
                    sources: Vec::new(),
                });
                i += 1;
            } else if token.is_terminator() {
                self.track_ends[token.track - 1].push(id);
                i += 1;
            } else {
                paths.push(path_from(lattice, id));
                i += 1;
            }
        }
        Ok(paths)
    }
}

fn path_from(lattice: &Lattice, id: TokenId) -> OpenPath {
    let token = lattice.token(id);
    OpenPath {
        data_type: token.data_type.clone(),
        spine_info: token.spine_info.clone(),
        track: token.track,
        sources: vec![id],
    }
}

/// Spine info after merging: the two halves of one split collapse back,
/// anything else is joined with spaces.
fn merged_spine_info(infos: &[&str]) -> String {
    if let [first, second] = infos {
        if let (Some(a), Some(b)) = (first.strip_suffix('a'), second.strip_suffix('b')) {
            if a == b && a.starts_with('(') && a.ends_with(')') && a.len() > 2 {
                return a[1..a.len() - 1].to_string();
            }
        }
    }
    infos.join(" ")
}

fn assign_subtracks(lattice: &mut Lattice) {
    for index in 0..lattice.line_count() {
        if !lattice.line(index).has_spines() {
            continue;
        }
        let ids = lattice.line(index).tokens().to_vec();
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for &id in &ids {
            *counts.entry(lattice.token(id).track).or_default() += 1;
        }
        let mut cursor: HashMap<usize, usize> = HashMap::new();
        for &id in &ids {
            let track = lattice.token(id).track;
            let subtrack = if counts[&track] > 1 {
                let position = cursor.entry(track).or_default();
                *position += 1;
                *position
            } else {
                0
            };
            lattice.token_mut(id).subtrack = subtrack;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> (Lattice, Result<Topology, HumError>) {
        let mut lattice = Lattice::from_text(text);
        let topology = analyze_topology(&mut lattice, &AnalysisConfig::default());
        (lattice, topology)
    }

    fn token_at(lattice: &Lattice, line: usize, field: usize) -> &crate::parser::token::Token {
        lattice.token(lattice.token_at(line, field).unwrap())
    }

    #[test]
    fn test_two_spines() {
        let (lattice, topology) = analyze("**kern\t**text\n4c\tla\n*-\t*-\n");
        let topology = topology.unwrap();
        assert_eq!(topology.max_track(), 2);
        assert_eq!(topology.track_start(1), lattice.token_at(0, 0));
        assert_eq!(topology.track_start(2), lattice.token_at(0, 1));
        assert_eq!(topology.track_end(2, 0), lattice.token_at(2, 1));
        assert_eq!(topology.track_start(3), None);
        let text = token_at(&lattice, 1, 1);
        assert_eq!(text.track(), 2);
        assert_eq!(text.data_type(), "**text");
        assert!(!text.has_rhythm());
        assert!(token_at(&lattice, 1, 0).has_rhythm());
        assert_eq!(text.previous_tokens(), &[lattice.token_at(0, 1).unwrap()]);
    }

    #[test]
    fn test_split_and_merge() {
        let (lattice, topology) =
            analyze("**kern\n*^\n4c\t2e\n4d\t.\n*v\t*v\n4f\n*-\n");
        let topology = topology.unwrap();
        assert_eq!(topology.max_track(), 1);
        let split = token_at(&lattice, 1, 0);
        assert_eq!(split.next_tokens().len(), 2);
        assert_eq!(token_at(&lattice, 2, 0).spine_info(), "(1)a");
        assert_eq!(token_at(&lattice, 2, 1).spine_info(), "(1)b");
        assert_eq!(token_at(&lattice, 2, 0).subtrack(), 1);
        assert_eq!(token_at(&lattice, 2, 1).subtrack(), 2);
        let merged = token_at(&lattice, 5, 0);
        assert_eq!(merged.spine_info(), "1");
        assert_eq!(merged.subtrack(), 0);
        assert_eq!(merged.previous_tokens().len(), 2);
        assert_eq!(topology.track_end_count(1), 1);
    }

    #[test]
    fn test_exchange() {
        let (lattice, topology) = analyze("**kern\t**dynam\n*x\t*x\n4c\tp\n*-\t*-\n");
        topology.unwrap();
        let swapped = token_at(&lattice, 2, 0);
        assert_eq!(swapped.data_type(), "**dynam");
        assert_eq!(swapped.track(), 2);
        assert_eq!(swapped.previous_tokens(), &[lattice.token_at(1, 1).unwrap()]);
    }

    #[test]
    fn test_add_spine() {
        let (lattice, topology) = analyze("**kern\n*+\n*\t**kern\n4c\t4d\n*-\t*-\n");
        let topology = topology.unwrap();
        assert_eq!(topology.max_track(), 2);
        assert_eq!(topology.track_start(2), lattice.token_at(2, 1));
        assert!(token_at(&lattice, 2, 1).previous_tokens().is_empty());
        assert_eq!(token_at(&lattice, 3, 1).track(), 2);
    }

    #[test]
    fn test_unterminated_split_has_two_ends() {
        let (_lattice, topology) = analyze("**kern\n*^\n4c\t4d\n*-\t*-\n");
        assert_eq!(topology.unwrap().track_end_count(1), 2);
    }

    #[test]
    fn test_field_count_mismatch() {
        let (_lattice, topology) = analyze("**kern\t**kern\n4c\n*-\t*-\n");
        assert!(matches!(topology, Err(HumError::Structural { line: 2, .. })));
    }

    #[test]
    fn test_lone_merge() {
        let (_lattice, topology) = analyze("**kern\t**kern\n*v\t*\n4c\t4d\n*-\t*-\n");
        assert!(matches!(topology, Err(HumError::Structural { line: 2, .. })));
    }

    #[test]
    fn test_data_before_exclusive() {
        let (_lattice, topology) = analyze("4c\n*-\n");
        assert!(matches!(topology, Err(HumError::Structural { line: 1, .. })));
    }

    #[test]
    fn test_unterminated_spines() {
        let (_lattice, topology) = analyze("**kern\n4c\n");
        assert!(matches!(topology, Err(HumError::Structural { .. })));
    }

    #[test]
    fn test_added_spine_needs_exclusive() {
        let (_lattice, topology) = analyze("**kern\n*+\n4c\t4d\n*-\t*-\n");
        assert!(matches!(topology, Err(HumError::Structural { line: 3, .. })));
    }

    #[test]
    fn test_merged_spine_info() {
        assert_eq!(merged_spine_info(&["(1)a", "(1)b"]), "1");
        assert_eq!(merged_spine_info(&["((1)a)a", "((1)a)b"]), "(1)a");
        assert_eq!(merged_spine_info(&["1", "2"]), "1 2");
        assert_eq!(merged_spine_info(&["(1)b", "2", "3"]), "(1)b 2 3");
    }

    #[test]
    fn test_cross_track_merge_ends_merged_track() {
        let (lattice, topology) = analyze("**kern\t**kern\n*v\t*v\n4c\n*-\n");
        let topology = topology.unwrap();
        assert_eq!(topology.track_ends(2), &[lattice.token_at(1, 1).unwrap()]);
        assert_eq!(token_at(&lattice, 2, 0).spine_info(), "1 2");
    }
}
