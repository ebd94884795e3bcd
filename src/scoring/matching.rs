use super::domain::{Bin, BinKind, Variable, VariableKind};

/// Outcome of coercing a raw string into the numeric lookup domain. Absent,
/// blank, and unparseable inputs all collapse to `Missing` so the distinction
/// never leaks past this boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedValue {
    Parsed(f64),
    Missing,
}

impl ParsedValue {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(text) = raw else {
            return ParsedValue::Missing;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return ParsedValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => ParsedValue::Parsed(value),
            _ => ParsedValue::Missing,
        }
    }
}

pub(crate) fn normalize_category(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Result of a bin lookup. `active` is set only by a real range/category
/// match; a fallback to the variable's missing bin leaves it false, which
/// zeroes the contribution downstream.
#[derive(Debug, Clone, Copy)]
pub struct BinMatch<'a> {
    pub bin: Option<&'a Bin>,
    pub active: bool,
}

/// Select the bin for one variable given its raw input, if any.
///
/// Numeric variables use half-open ranges: the lower bound is inclusive, the
/// upper exclusive, and the first bin in configured order wins. Categorical
/// variables compare trimmed, upper-cased labels exactly.
pub fn match_variable<'a>(variable: &'a Variable, raw: Option<&str>) -> BinMatch<'a> {
    let matched = match variable.kind {
        VariableKind::Numeric => match ParsedValue::parse(raw) {
            ParsedValue::Parsed(value) => variable.bins.iter().find(|bin| {
                matches!(bin.kind, BinKind::Range { min, max } if min <= value && value < max)
            }),
            ParsedValue::Missing => None,
        },
        VariableKind::Categorical => match raw.map(str::trim).filter(|text| !text.is_empty()) {
            Some(text) => {
                let needle = normalize_category(text);
                variable.bins.iter().find(|bin| {
                    matches!(&bin.kind, BinKind::Category { label }
                        if normalize_category(label) == needle)
                })
            }
            None => None,
        },
    };

    match matched {
        Some(bin) => BinMatch {
            bin: Some(bin),
            active: true,
        },
        None => BinMatch {
            bin: variable.missing_bin(),
            active: false,
        },
    }
}
