//! CSV-backed quote table.
//!
//! Stand-in for the external quote service: a `symbol,name,price` file
//! loaded once at startup. Lookups are case-insensitive on symbol.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::domain::error::PapertradeError;
use crate::domain::records::Quote;
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::QuotePort;

pub struct CsvQuoteAdapter {
    quotes: HashMap<String, Quote>,
}

impl CsvQuoteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PapertradeError> {
        let path =
            config
                .get_string("quotes", "path")
                .ok_or_else(|| PapertradeError::ConfigMissing {
                    section: "quotes".into(),
                    key: "path".into(),
                })?;
        Self::from_file(path)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PapertradeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PapertradeError::Database {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_csv(&content)
    }

    pub fn from_csv(content: &str) -> Result<Self, PapertradeError> {
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut quotes = HashMap::new();

        for result in rdr.records() {
            let record = result.map_err(|e| PapertradeError::Database {
                reason: format!("CSV parse error: {e}"),
            })?;

            let symbol = record
                .get(0)
                .ok_or_else(|| PapertradeError::Database {
                    reason: "missing symbol column".into(),
                })?
                .trim()
                .to_uppercase();

            let name = record
                .get(1)
                .ok_or_else(|| PapertradeError::Database {
                    reason: "missing name column".into(),
                })?
                .trim()
                .to_string();

            let price: f64 = record
                .get(2)
                .ok_or_else(|| PapertradeError::Database {
                    reason: "missing price column".into(),
                })?
                .trim()
                .parse()
                .map_err(|e| PapertradeError::Database {
                    reason: format!("invalid price for {symbol}: {e}"),
                })?;

            quotes.insert(
                symbol.clone(),
                Quote {
                    symbol,
                    name,
                    price,
                },
            );
        }

        Ok(Self { quotes })
    }

    pub fn from_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        Self {
            quotes: quotes
                .into_iter()
                .map(|q| (q.symbol.to_uppercase(), q))
                .collect(),
        }
    }
}

impl QuotePort for CsvQuoteAdapter {
    fn lookup(&self, symbol: &str) -> Result<Option<Quote>, PapertradeError> {
        Ok(self.quotes.get(&symbol.trim().to_uppercase()).cloned())
    }
}
