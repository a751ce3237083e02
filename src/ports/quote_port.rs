//! Quote lookup port trait.

use crate::domain::error::PapertradeError;
use crate::domain::records::Quote;

/// Source of current name and price for a symbol. `Ok(None)` means the
/// symbol does not resolve; errors are reserved for provider failures.
pub trait QuotePort {
    fn lookup(&self, symbol: &str) -> Result<Option<Quote>, PapertradeError>;
}
