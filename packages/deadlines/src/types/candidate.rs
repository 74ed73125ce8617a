use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A date parsed from page text near an include keyword.
///
/// Produced and consumed within one crawl pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDate {
    pub date: NaiveDate,

    /// Include keyword that justified the window
    pub keyword: String,

    /// Page the date was found on
    pub url: String,

    /// Token as written on the page
    pub raw: String,

    /// Line the token was found on, truncated
    pub context: String,

    /// Line carries a firm-deadline keyword
    pub is_firm: bool,

    /// Line carries an extension keyword
    pub is_extension: bool,
}
