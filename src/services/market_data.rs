//! Quote provider interface

use crate::error::FetchError;
use crate::models::Quote;

#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Latest daily closing price for `ticker`
    ///
    /// `Ok(None)` means the source has no data for the symbol, which is a
    /// normal outcome (delisted, typo, market holiday), not an error.
    async fn latest_close(&self, ticker: &str) -> Result<Option<Quote>, FetchError>;
}
