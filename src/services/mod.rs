//! External collaborators: record source, quote feed, notification sink

pub mod market_data;
pub mod notifier;
pub mod notion;
pub mod record_source;
pub mod telegram;
pub mod yahoo;

pub use market_data::QuoteProvider;
pub use notifier::Notifier;
pub use notion::NotionRecordSource;
pub use record_source::{RecordSource, SourceOverview};
pub use telegram::TelegramNotifier;
pub use yahoo::YahooQuoteProvider;

use std::time::Duration;
use url::Url;

/// Shared reqwest client, bounded by `timeout` only when one is configured
pub fn build_http_client(timeout: Option<Duration>) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder =
        reqwest::Client::builder().user_agent(concat!("pricewatch/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Append path segments to a base URL, percent-encoding each one
pub(crate) fn join_segments(base: &str, segments: &[&str]) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
