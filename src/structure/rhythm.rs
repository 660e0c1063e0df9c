use crate::config::AnalysisConfig;
use crate::parser::lattice::Lattice;
use crate::parser::line::Line;
use crate::parser::primitive_parser::{recip_to_duration, HumNum};
use crate::parser::token::TokenId;
use crate::structure::topology::Topology;
use crate::HumError;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub};

fn zero() -> HumNum {
    HumNum::from_integer(0)
}

fn overflow(line: usize) -> HumError {
    HumError::RhythmInconsistency {
        line: line + 1,
        message: "duration arithmetic overflows".to_string(),
    }
}

fn checked_sum(a: HumNum, b: HumNum, line: usize) -> Result<HumNum, HumError> {
    a.checked_add(&b).ok_or_else(|| overflow(line))
}

fn checked_difference(a: HumNum, b: HumNum, line: usize) -> Result<HumNum, HumError> {
    a.checked_sub(&b).ok_or_else(|| overflow(line))
}

fn positive(duration: Option<HumNum>) -> Option<HumNum> {
    duration.filter(|d| *d > zero())
}

/// Assign durations to non-null data tokens of rhythmic spines. A line may
/// not mix grace notes with notes of positive duration.
pub fn analyze_token_durations(lattice: &mut Lattice) -> Result<(), HumError> {
    for index in 0..lattice.line_count() {
        let mut has_zero = false;
        let mut has_positive = false;
        for id in lattice.line(index).tokens().to_vec() {
            let token = lattice.token(id);
            if !token.has_rhythm() || !token.is_non_null_data() {
                continue;
            }
            let duration = recip_to_duration(token.text());
            if duration > zero() {
                has_positive = true;
            } else {
                has_zero = true;
            }
            lattice.token_mut(id).duration = Some(duration);
        }
        if has_zero && has_positive {
            return Err(HumError::MixedGraceAndRegular {
                line: index + 1,
                text: lattice.line_text(index),
            });
        }
    }
    Ok(())
}

/// Place every line on the score timeline. Returns the line indices acting
/// as measure starts.
pub fn analyze_rhythm(
    lattice: &mut Lattice,
    topology: &Topology,
    config: &AnalysisConfig,
) -> Result<Vec<usize>, HumError> {
    for index in 0..lattice.line_count() {
        lattice.line_mut(index).rhythm_analyzed = true;
    }
    let recip_spine = topology
        .track_start(1)
        .filter(|&id| lattice.token(id).is_data_type(config.recip_type()));
    if let Some(start) = recip_spine {
        log::debug!("Timing taken from leading {} spine", config.recip_type());
        assign_rhythm_from_recip(lattice, start)?;
        let barlines = analyze_meter(lattice)?;
        link_non_null_data(lattice);
        return Ok(barlines);
    }
    assign_durations_from_start(lattice, topology)?;
    resolve_null_lines(lattice)?;
    fill_unresolved_lines(lattice);
    assign_line_durations(lattice)?;
    let barlines = analyze_meter(lattice)?;
    link_non_null_data(lattice);
    assign_non_rhythmic_durations(lattice, topology);
    Ok(barlines)
}

/// Line durations come straight from the data of a timing spine.
fn assign_rhythm_from_recip(lattice: &mut Lattice, start: TokenId) -> Result<(), HumError> {
    let mut current = Some(start);
    while let Some(id) = current {
        let token = lattice.token(id);
        if token.is_non_null_data() {
            let duration = recip_to_duration(token.text());
            let line = token.line_index();
            lattice.line_mut(line).duration = Some(duration);
        }
        current = lattice.token(id).next_token();
    }
    let mut sum = zero();
    for index in 0..lattice.line_count() {
        let line = lattice.line_mut(index);
        line.duration_from_start = Some(sum);
        let duration = line.duration.filter(|d| *d >= zero()).unwrap_or_default();
        line.duration = Some(duration);
        sum = checked_sum(sum, duration, index)?;
    }
    Ok(())
}

fn assign_durations_from_start(lattice: &mut Lattice, topology: &Topology) -> Result<(), HumError> {
    let rhythmic_starts: Vec<TokenId> = topology
        .spine_starts()
        .iter()
        .copied()
        .filter(|&id| lattice.token(id).has_rhythm())
        .collect();
    let Some(first_line) = rhythmic_starts
        .iter()
        .map(|&id| lattice.token(id).line_index())
        .min()
    else {
        log::debug!("No rhythmic spines");
        return Ok(());
    };
    let mut visited = vec![false; lattice.token_count()];
    for &start in &rhythmic_starts {
        if lattice.token(start).line_index() == first_line {
            propagate_durations(lattice, start, zero(), &mut visited)?;
        }
    }
    for &start in &rhythmic_starts {
        if lattice.token(start).line_index() > first_line {
            anchor_floating_spine(lattice, start, &mut visited)?;
        }
    }
    Ok(())
}

/// Walk the primary chain from `start` accumulating durations, then each
/// branch met on the way, latest first.
fn propagate_durations(
    lattice: &mut Lattice,
    start: TokenId,
    offset: HumNum,
    visited: &mut [bool],
) -> Result<(), HumError> {
    let mut pending = vec![(start, offset)];
    while let Some((first, mut cumulative)) = pending.pop() {
        let mut current = first;
        loop {
            if visited[current] {
                break;
            }
            visited[current] = true;
            set_line_duration_from_start(lattice, current, cumulative)?;
            let token = lattice.token(current);
            if let Some(duration) = positive(token.duration) {
                cumulative = checked_sum(cumulative, duration, token.line_index())?;
            }
            for &branch in token.next_tokens().iter().skip(1) {
                pending.push((branch, cumulative));
            }
            match token.next_token() {
                Some(next) => current = next,
                None => break,
            }
        }
    }
    Ok(())
}

fn set_line_duration_from_start(
    lattice: &mut Lattice,
    id: TokenId,
    value: HumNum,
) -> Result<(), HumError> {
    let token = lattice.token(id);
    if !token.is_terminator() && token.duration.is_none() {
        return Ok(());
    }
    let index = token.line_index();
    match lattice.line(index).duration_from_start {
        None => lattice.line_mut(index).duration_from_start = Some(value),
        Some(existing) if existing != value => {
            return Err(HumError::RhythmInconsistency {
                line: index + 1,
                message: format!(
                    "expected duration from start {value} but found {existing}: {}",
                    lattice.line_text(index)
                ),
            });
        }
        Some(_) => {}
    }
    Ok(())
}

/// A spine opened after the first rhythmic line is placed from the first
/// of its lines whose position is already known.
fn anchor_floating_spine(
    lattice: &mut Lattice,
    start: TokenId,
    visited: &mut [bool],
) -> Result<(), HumError> {
    let mut before = zero();
    let mut anchor = None;
    let mut current = Some(start);
    while let Some(id) = current {
        if let Some(position) = lattice.token_duration_from_start(id) {
            anchor = Some(position);
            break;
        }
        let token = lattice.token(id);
        if let Some(duration) = positive(token.duration) {
            before = checked_sum(before, duration, token.line_index())?;
        }
        current = token.next_token();
    }
    let token = lattice.token(start);
    let Some(anchor) = anchor else {
        return Err(HumError::AnchorNotFound {
            track: token.track(),
            line: token.line_index() + 1,
        });
    };
    let offset = checked_difference(anchor, before, token.line_index())?;
    if offset < zero() {
        return Err(HumError::RhythmInconsistency {
            line: token.line_index() + 1,
            message: format!("floating spine would start at negative time {offset}"),
        });
    }
    log::debug!(
        "Floating spine of track {} starts at {offset}",
        token.track()
    );
    propagate_durations(lattice, start, offset, visited)
}

/// Data lines where every rhythmic token is null split the gap between the
/// surrounding positioned lines evenly.
fn resolve_null_lines(lattice: &mut Lattice) -> Result<(), HumError> {
    let mut null_lines = Vec::new();
    let mut previous: Option<HumNum> = None;
    for index in 0..lattice.line_count() {
        let line = lattice.line(index);
        if !line.has_spines() {
            continue;
        }
        if lattice.is_all_rhythmic_null(index) {
            if line.is_data() {
                null_lines.push(index);
            }
            continue;
        }
        let Some(end) = line.duration_from_start else {
            if line.is_data() {
                return Err(HumError::RhythmInconsistency {
                    line: index + 1,
                    message: format!("data line was never placed: {}", lattice.line_text(index)),
                });
            }
            continue;
        };
        if let Some(start) = previous {
            let step = checked_difference(end, start, index)?
                .checked_div(&HumNum::from_integer(null_lines.len() as i64 + 1))
                .ok_or_else(|| overflow(index))?;
            for (i, &null_line) in null_lines.iter().enumerate() {
                let position = step
                    .checked_mul(&HumNum::from_integer(i as i64 + 1))
                    .and_then(|offset| start.checked_add(&offset))
                    .ok_or_else(|| overflow(null_line))?;
                lattice.line_mut(null_line).duration_from_start = Some(position);
            }
        }
        previous = Some(end);
        null_lines.clear();
    }
    Ok(())
}

/// Unplaced lines take the position of the next placed line, trailing lines
/// that of the last one. Without any placed line everything sits at zero.
fn fill_unresolved_lines(lattice: &mut Lattice) {
    let mut last = None;
    for index in (0..lattice.line_count()).rev() {
        let line = lattice.line_mut(index);
        match line.duration_from_start {
            Some(position) => last = Some(position),
            None => line.duration_from_start = last,
        }
    }
    for index in 0..lattice.line_count() {
        let line = lattice.line_mut(index);
        match line.duration_from_start {
            Some(position) => last = Some(position),
            None => line.duration_from_start = Some(last.unwrap_or_default()),
        }
    }
}

fn assign_line_durations(lattice: &mut Lattice) -> Result<(), HumError> {
    let count = lattice.line_count();
    for index in 0..count {
        let start = lattice.line(index).duration_from_start();
        let end = if index + 1 < count {
            lattice.line(index + 1).duration_from_start()
        } else {
            start
        };
        lattice.line_mut(index).duration = Some(checked_difference(end, start, index)?);
    }
    Ok(())
}

/// Positions relative to the enclosing measure. Data before the first
/// barline counts as a pickup measure starting on line 0.
pub fn analyze_meter(lattice: &mut Lattice) -> Result<Vec<usize>, HumError> {
    let mut barlines = Vec::new();
    let mut sum = zero();
    let mut found_barline = false;
    for index in 0..lattice.line_count() {
        let line = lattice.line_mut(index);
        line.duration_from_barline = sum;
        sum = checked_sum(sum, line.duration(), index)?;
        if line.is_barline() {
            found_barline = true;
            barlines.push(index);
            sum = zero();
        }
        if line.is_data() && !found_barline {
            barlines.push(0);
            found_barline = true;
        }
    }
    sum = zero();
    for index in (0..lattice.line_count()).rev() {
        let line = lattice.line_mut(index);
        sum = checked_sum(sum, line.duration(), index)?;
        line.duration_to_barline = sum;
        if line.is_barline() {
            sum = zero();
        }
    }
    let total = lattice
        .lines()
        .last()
        .map(Line::duration_from_start)
        .unwrap_or_default();
    for index in 0..lattice.line_count() {
        let line = lattice.line_mut(index);
        line.duration_to_end = checked_difference(total, line.duration_from_start(), index)?;
    }
    Ok(barlines)
}

/// Nearest non-null data tokens before and after each token along the spine
/// graph.
pub fn link_non_null_data(lattice: &mut Lattice) {
    for id in 0..lattice.token_count() {
        let mut linked = Vec::new();
        for &p in lattice.token(id).previous_tokens() {
            let previous = lattice.token(p);
            if previous.is_non_null_data() {
                push_unique(&mut linked, p);
            } else {
                for &q in previous.previous_non_null_data() {
                    push_unique(&mut linked, q);
                }
            }
        }
        lattice.token_mut(id).previous_non_null = linked;
    }
    for id in (0..lattice.token_count()).rev() {
        let mut linked = Vec::new();
        for &n in lattice.token(id).next_tokens() {
            let next = lattice.token(n);
            if next.is_non_null_data() {
                push_unique(&mut linked, n);
            } else {
                for &q in next.next_non_null_data() {
                    push_unique(&mut linked, q);
                }
            }
        }
        lattice.token_mut(id).next_non_null = linked;
    }
}

fn push_unique(list: &mut Vec<TokenId>, id: TokenId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

/// Tokens of non-rhythmic spines last until the next non-null token of
/// their spine.
fn assign_non_rhythmic_durations(lattice: &mut Lattice, topology: &Topology) {
    let mut visited = vec![false; lattice.token_count()];
    for track in 1..=topology.max_track() {
        for &end in topology.track_ends(track) {
            if !lattice.token(end).has_rhythm() {
                walk_non_rhythmic(lattice, end, end, &mut visited);
            }
        }
    }
}

fn walk_non_rhythmic(lattice: &mut Lattice, end: TokenId, mut current: TokenId, visited: &mut [bool]) {
    let spine_info = lattice.token(end).spine_info().to_string();
    let mut cursor = Some(end);
    while let Some(id) = cursor {
        if visited[id] {
            break;
        }
        let token = lattice.token(id);
        if token.spine_info() != spine_info
            && (token.spine_info().contains('b') || spine_info.contains('b'))
        {
            break;
        }
        visited[id] = true;
        let previous = token.previous_tokens().to_vec();
        if token.is_non_null_data() {
            let end_time = lattice.token_duration_from_start(current).unwrap_or_default();
            let start_time = lattice.token_duration_from_start(id).unwrap_or_default();
            lattice.token_mut(id).duration = end_time.checked_sub(&start_time);
            current = id;
        }
        // merged branches end where the merged token starts
        let Some((&primary, branches)) = previous.split_first() else {
            break;
        };
        for &branch in branches {
            walk_non_rhythmic(lattice, branch, current, visited);
        }
        cursor = Some(primary);
    }
}
