//! The screening universe: an injected, ordered list of symbols.

use crate::domain::error::MomfolioError;
use crate::ports::data_port::DataPort;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub codes: Vec<String>,
}

impl Universe {
    pub fn new(codes: Vec<String>) -> Self {
        Self { codes }
    }

    pub fn count(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

/// Uses the configured list when present, otherwise everything the data source lists.
pub fn resolve_universe(
    configured: Option<&[String]>,
    data_port: &dyn DataPort,
) -> Result<Universe, MomfolioError> {
    match configured {
        Some(codes) => Ok(Universe::new(codes.to_vec())),
        None => Ok(Universe::new(data_port.list_symbols()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::PriceSeries;
    use chrono::NaiveDate;

    struct ListingPort;

    impl DataPort for ListingPort {
        fn fetch_ohlcv(
            &self,
            code: &str,
            _start_date: Option<NaiveDate>,
            _end_date: NaiveDate,
        ) -> Result<PriceSeries, MomfolioError> {
            Err(MomfolioError::NoData {
                code: code.to_string(),
            })
        }

        fn list_symbols(&self) -> Result<Vec<String>, MomfolioError> {
            Ok(vec!["INFY.NS".to_string(), "TCS.NS".to_string()])
        }
    }

    #[test]
    fn test_parse_codes_basic() {
        let result = parse_codes("RELIANCE.NS,TCS.NS,HDFCBANK.NS").unwrap();
        assert_eq!(result, vec!["RELIANCE.NS", "TCS.NS", "HDFCBANK.NS"]);
    }

    #[test]
    fn test_parse_codes_with_whitespace_and_case() {
        let result = parse_codes("  tcs , Infy ,WIPRO").unwrap();
        assert_eq!(result, vec!["TCS", "INFY", "WIPRO"]);
    }

    #[test]
    fn test_parse_codes_empty_token() {
        let result = parse_codes("TCS,,INFY");
        assert!(matches!(result, Err(UniverseError::EmptyToken)));
    }

    #[test]
    fn test_parse_codes_duplicate() {
        let result = parse_codes("TCS,INFY,tcs");
        assert!(matches!(result, Err(UniverseError::DuplicateCode(s)) if s == "TCS"));
    }

    #[test]
    fn resolve_prefers_configured_list() {
        let configured = vec!["WIPRO.NS".to_string()];
        let universe = resolve_universe(Some(&configured), &ListingPort).unwrap();
        assert_eq!(universe.codes, configured);
    }

    #[test]
    fn resolve_falls_back_to_listing() {
        let universe = resolve_universe(None, &ListingPort).unwrap();
        assert_eq!(universe.count(), 2);
        assert_eq!(universe.codes[0], "INFY.NS");
    }
}
