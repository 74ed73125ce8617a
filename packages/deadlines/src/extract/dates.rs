//! Date token recognition and parsing.
//!
//! Tokens are found within a single line. Accepted forms:
//! - ISO: `2027-03-20`, `2027/03/20`, `2027-03-20T23:59:59Z` (time ignored)
//! - month name with year: `20 March 2027`, `March 20, 2027`, `2027 Mar 20`
//! - numeric: `03/20/2027`, `20.03.2027`
//! - month name without year: `March 20`, `20th March`

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::DateParseError;

const MONTH: &str = r"(?P<mon>jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b\.?";
const ORDINAL: &str = r"(?:st|nd|rd|th)?";

lazy_static! {
    static ref ISO_REGEX: Regex =
        Regex::new(r"\b(?P<y>\d{4})[-/](?P<m>\d{1,2})[-/](?P<d>\d{1,2})(?:T[\d:.]+(?:Z|[+-]\d{2}:?\d{2})?)?\b")
            .unwrap();

    static ref DAY_MONTH_YEAR_REGEX: Regex = Regex::new(&format!(
        r"(?i)\b(?P<d>\d{{1,2}}){ORDINAL}\s+{MONTH},?\s+(?P<y>\d{{4}})\b"
    ))
    .unwrap();

    static ref MONTH_DAY_YEAR_REGEX: Regex = Regex::new(&format!(
        r"(?i)\b{MONTH}\s*(?P<d>\d{{1,2}}){ORDINAL},?\s+(?P<y>\d{{4}})\b"
    ))
    .unwrap();

    static ref YEAR_MONTH_DAY_REGEX: Regex = Regex::new(&format!(
        r"(?i)\b(?P<y>\d{{4}})\s+{MONTH}\s*(?P<d>\d{{1,2}})\b"
    ))
    .unwrap();

    static ref NUMERIC_REGEX: Regex =
        Regex::new(r"\b(?P<a>\d{1,2})[/.](?P<b>\d{1,2})[/.](?P<y>\d{4})\b").unwrap();

    static ref MONTH_DAY_REGEX: Regex = Regex::new(&format!(
        r"(?i)\b{MONTH}\s*(?P<d>\d{{1,2}}){ORDINAL}\b"
    ))
    .unwrap();

    static ref DAY_MONTH_REGEX: Regex = Regex::new(&format!(
        r"(?i)\b(?P<d>\d{{1,2}}){ORDINAL}\s+{MONTH}"
    ))
    .unwrap();
}

/// How a token spelled its date, before calendar validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateForm {
    Iso { year: i32, month: u32, day: u32 },
    Textual { year: Option<i32>, month: u32, day: u32 },
    Numeric { first: u32, second: u32, year: i32 },
}

/// A date-like substring of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateToken {
    pub start: usize,
    pub end: usize,
    pub raw: String,
    pub form: DateForm,
}

impl DateToken {
    /// Turn the token into a calendar date.
    ///
    /// `default_year` completes textual dates written without a year.
    pub fn resolve(&self, default_year: Option<i32>) -> Result<NaiveDate, DateParseError> {
        let (year, month, day) = match self.form {
            DateForm::Iso { year, month, day } => (year, month, day),
            DateForm::Textual { year, month, day } => {
                let year = year.or(default_year).ok_or_else(|| DateParseError::MissingYear {
                    raw: self.raw.clone(),
                })?;
                (year, month, day)
            }
            DateForm::Numeric { first, second, year } => {
                let (month, day) = self.numeric_order(first, second)?;
                (year, month, day)
            }
        };

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DateParseError::Impossible {
            raw: self.raw.clone(),
        })
    }

    /// Month-first unless only day-first makes sense. Two valid readings
    /// that disagree are ambiguous.
    fn numeric_order(&self, first: u32, second: u32) -> Result<(u32, u32), DateParseError> {
        match (first <= 12, second <= 12) {
            (true, true) if first == second => Ok((first, second)),
            (true, true) => Err(DateParseError::Ambiguous {
                raw: self.raw.clone(),
            }),
            (true, false) => Ok((first, second)),
            (false, true) => Ok((second, first)),
            (false, false) => Err(DateParseError::Impossible {
                raw: self.raw.clone(),
            }),
        }
    }
}

/// Find every date-like token in a line.
///
/// Fuller forms win: once a span is claimed by a pattern earlier in the
/// list, overlapping matches of later patterns are ignored. Tokens are
/// returned in line order.
pub fn find_date_tokens(line: &str) -> Vec<DateToken> {
    let patterns: [(&Regex, fn(&Captures) -> Option<DateForm>); 7] = [
        (&*ISO_REGEX, iso_form),
        (&*DAY_MONTH_YEAR_REGEX, textual_form),
        (&*MONTH_DAY_YEAR_REGEX, textual_form),
        (&*YEAR_MONTH_DAY_REGEX, textual_form),
        (&*NUMERIC_REGEX, numeric_form),
        (&*MONTH_DAY_REGEX, textual_form),
        (&*DAY_MONTH_REGEX, textual_form),
    ];

    let mut tokens: Vec<DateToken> = Vec::new();

    for (regex, build) in patterns {
        for caps in regex.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            let overlaps = tokens
                .iter()
                .any(|t| whole.start() < t.end && t.start < whole.end());
            if overlaps {
                continue;
            }
            if let Some(form) = build(&caps) {
                tokens.push(DateToken {
                    start: whole.start(),
                    end: whole.end(),
                    raw: whole.as_str().trim().to_string(),
                    form,
                });
            }
        }
    }

    tokens.sort_by_key(|t| t.start);
    tokens
}

fn number<T: std::str::FromStr>(caps: &Captures, name: &str) -> Option<T> {
    caps.name(name)?.as_str().parse().ok()
}

fn iso_form(caps: &Captures) -> Option<DateForm> {
    Some(DateForm::Iso {
        year: number(caps, "y")?,
        month: number(caps, "m")?,
        day: number(caps, "d")?,
    })
}

fn textual_form(caps: &Captures) -> Option<DateForm> {
    Some(DateForm::Textual {
        year: match caps.name("y") {
            Some(y) => Some(y.as_str().parse().ok()?),
            None => None,
        },
        month: month_number(caps.name("mon")?.as_str())?,
        day: number(caps, "d")?,
    })
}

fn numeric_form(caps: &Captures) -> Option<DateForm> {
    Some(DateForm::Numeric {
        first: number(caps, "a")?,
        second: number(caps, "b")?,
        year: number(caps, "y")?,
    })
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
