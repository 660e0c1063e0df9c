use encoding_rs::WINDOWS_1252;
use nom::bytes::complete::{tag, take_till, take_till1, take_while_m_n};
use nom::character::complete::{char, digit1};
use nom::combinator::{opt, rest};
use nom::sequence::preceded;
use nom::{IResult, Parser};
use num_rational::Rational64;
use num_traits::CheckedMul;

/// Exact rational time value, in quarter-note units.
pub type HumNum = Rational64;

/// Whole note expressed in quarter notes.
pub const WHOLE_NOTE: i64 = 4;

/// Grace-note marker in reciprocal duration codes.
pub const GRACE_MARKER: char = 'q';

/// Encoded form of `:` inside parameter values.
const ENCODED_COLON: &str = "&colon;";

/// Materialize properly encoded String, UTF-8 first then Windows-1252.
pub fn decode_text(i: &[u8]) -> String {
    match std::str::from_utf8(i) {
        Ok(s) => s.to_string(),
        Err(e) => {
            log::debug!("Error UTF-8 string parsing:{e}");
            let (cow, encoding_used, had_errors) = WINDOWS_1252.decode(i);
            if had_errors {
                log::debug!("Error parsing string with {encoding_used:?}");
            }
            cow.into_owned()
        }
    }
}

/// Parse the numeric part of a reciprocal code: `digits` and an optional `%digits`.
fn parse_recip_number(i: &str) -> IResult<&str, (&str, Option<&str>)> {
    (
        preceded(take_till(|c: char| c.is_ascii_digit()), digit1),
        opt(preceded(char('%'), digit1)),
    )
        .parse(i)
}

/// Duration in quarter notes of a reciprocal duration code such as `4`, `8.`,
/// `3%2` or `00`. Only the first space-separated subtoken is considered.
/// Grace notes and codes without digits have zero duration.
pub fn recip_to_duration(text: &str) -> HumNum {
    let zero = HumNum::from_integer(0);
    if text.contains(GRACE_MARKER) {
        return zero;
    }
    let subtoken = text.split(' ').next().unwrap_or_default();
    let Ok((_, (digits, ratio))) = parse_recip_number(subtoken) else {
        return zero;
    };
    let (Ok(denominator), Ok(numerator)) = (
        digits.parse::<i64>(),
        ratio.map_or(Ok(1), str::parse::<i64>),
    ) else {
        log::debug!("Reciprocal value out of range in {text:?}");
        return zero;
    };
    let base = if denominator == 0 {
        if ratio.is_some() || digits.len() > 3 {
            return zero;
        }
        // 0 = breve, 00 = long, 000 = maxima
        HumNum::from_integer(1 << digits.len())
    } else {
        HumNum::new(numerator, denominator)
    };
    let dots = subtoken.matches('.').count().min(30) as u32;
    let duration = base
        .checked_mul(&HumNum::new((1 << (dots + 1)) - 1, 1 << dots))
        .and_then(|dotted| dotted.checked_mul(&HumNum::from_integer(WHOLE_NOTE)));
    duration.unwrap_or_else(|| {
        log::debug!("Reciprocal value out of range in {text:?}");
        zero
    })
}

/// Key/value parameters parsed from a comment such as `!LO:TX:a:t=hello`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterSet {
    pub namespace1: String,
    pub namespace2: String,
    pub entries: Vec<(String, String)>,
}

impl ParameterSet {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse the `!!NS1:` or `!NS1:` head of a parameter comment.
fn parse_parameter_head(i: &str) -> IResult<&str, &str> {
    let (i, _) = take_while_m_n(1, 2, |c: char| c == '!')(i)?;
    let (i, namespace1) = take_till1(|c: char| c == ':' || c == '!' || c.is_whitespace())(i)?;
    let (i, _) = char(':')(i)?;
    Ok((i, namespace1))
}

/// Parse a parameter comment, returns `None` if the text does not look like one.
pub fn parse_parameters(text: &str) -> Option<ParameterSet> {
    let (body, namespace1) = parse_parameter_head(text).ok()?;
    let mut segments = body.split(':');
    let namespace2 = segments.next()?;
    if namespace2.is_empty() || namespace2.contains(char::is_whitespace) {
        return None;
    }
    let entries = segments
        .filter(|s| !s.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (key.to_string(), value.replace(ENCODED_COLON, ":")),
            None => (segment.to_string(), "true".to_string()),
        })
        .collect();
    Some(ParameterSet {
        namespace1: namespace1.to_string(),
        namespace2: namespace2.to_string(),
        entries,
    })
}

/// A `!!!KEY: value` (or universal `!!!!KEY: value`) record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub universal: bool,
    pub key: String,
    pub value: String,
}

fn parse_reference_parts(i: &str) -> IResult<&str, (Option<char>, &str, &str)> {
    let (i, _) = tag("!!!")(i)?;
    let (i, bang) = opt(char('!')).parse(i)?;
    let (i, key) = take_till1(|c: char| c == ':' || c.is_whitespace())(i)?;
    let (i, _) = char(':')(i)?;
    let (i, value) = rest(i)?;
    Ok((i, (bang, key, value)))
}

pub fn parse_reference_record(text: &str) -> Option<ReferenceRecord> {
    let (_, (bang, key, value)) = parse_reference_parts(text).ok()?;
    Some(ReferenceRecord {
        universal: bang.is_some(),
        key: key.to_string(),
        value: value.trim().to_string(),
    })
}

/// A `!!!RDF**kern: > = above` record declaring a signifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signifier {
    pub exclusive: String,
    pub signifier: String,
    pub definition: String,
}

pub fn parse_signifier(text: &str) -> Option<Signifier> {
    let record = parse_reference_record(text)?;
    let exclusive = record.key.strip_prefix("RDF")?;
    let (signifier, definition) = record.value.split_once('=')?;
    let signifier = signifier.trim();
    if signifier.is_empty() {
        return None;
    }
    Some(Signifier {
        exclusive: exclusive.to_string(),
        signifier: signifier.to_string(),
        definition: definition.trim().to_string(),
    })
}

/// Split one CSV row into fields. Fields may be double-quoted, with `""`
/// standing for a literal quote.
pub fn csv_fields(line: &str, separator: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut remaining = line;
    while let Some(c) = remaining.chars().next() {
        if in_quotes {
            if let Some(after) = remaining.strip_prefix("\"\"") {
                field.push('"');
                remaining = after;
                continue;
            }
            if c == '"' {
                in_quotes = false;
            } else {
                field.push(c);
            }
        } else if let Some(after) = remaining.strip_prefix(separator) {
            fields.push(std::mem::take(&mut field));
            remaining = after;
            continue;
        } else if c == '"' && field.is_empty() {
            in_quotes = true;
        } else {
            field.push(c);
        }
        remaining = &remaining[c.len_utf8()..];
    }
    fields.push(field);
    fields
}

/// Convert a CSV row into a tab-separated line. Global comments keep their
/// first field only.
pub fn csv_to_tsv(line: &str, separator: &str) -> String {
    let fields = csv_fields(line, separator);
    match fields.first() {
        Some(first) if first.starts_with("!!") => first.clone(),
        _ => fields.join("\t"),
    }
}
