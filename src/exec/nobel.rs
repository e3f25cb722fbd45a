//! External aggregation executor: Nobel Prize records over a year range
//!
//! The Data Source is an external HTTP/JSON endpoint. Its records are
//! boundary data only; they carry no behavior and tolerate missing fields.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::constants;
use crate::error::RequestError;
use crate::formatting::format_amount;
use crate::types::{ContentKind, Outcome};

/// Public endpoint of the prize Data Source
pub const DEFAULT_API_URL: &str = "https://api.nobelprize.org/2.1/nobelPrizes";

/// Placeholder rendered when a laureate record carries no name
const UNKNOWN_LAUREATE: &str = "Unknown";

/// Top-level Data Source response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeBatch {
    #[serde(default)]
    pub nobel_prizes: Vec<Prize>,
}

/// One prize record as delivered by the Data Source
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    #[serde(default)]
    pub award_year: String,
    #[serde(default)]
    pub category: Label,
    #[serde(default)]
    pub prize_amount_adjusted: f64,
    #[serde(default)]
    pub laureates: Option<Vec<Laureate>>,
}

/// Localized label; only the English form is used
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub en: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Laureate {
    #[serde(default)]
    pub known_name: Option<Label>,
}

impl Laureate {
    fn display_name(&self) -> &str {
        self.known_name
            .as_ref()
            .and_then(|name| name.en.as_deref())
            .unwrap_or(UNKNOWN_LAUREATE)
    }
}

/// The external prize Data Source.
///
/// A trait seam so the aggregation pipeline can run against a stub in tests
/// and against [`NobelApi`] in production.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch all prize records for the inclusive year range.
    async fn prizes(&self, from: &str, to: &str) -> Result<Vec<Prize>>;
}

/// Production Data Source backed by the Nobel Prize HTTP API.
#[derive(Debug, Clone)]
pub struct NobelApi {
    client: reqwest::Client,
    base_url: String,
}

impl NobelApi {
    /// Build a client for `base_url` with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(constants::DATA_SOURCE_TIMEOUT)
            .build()
            .context("building data source HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Endpoint this client queries
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DataSource for NobelApi {
    async fn prizes(&self, from: &str, to: &str) -> Result<Vec<Prize>> {
        let url = format!(
            "{}?nobelPrizeYear={}&yearTo={}",
            self.base_url, from, to
        );
        debug!(%url, "querying data source");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("contacting data source at {}", self.base_url))?
            .error_for_status()
            .context("data source returned an error status")?;

        let batch: PrizeBatch = response
            .json()
            .await
            .context("decoding data source response")?;
        Ok(batch.nobel_prizes)
    }
}

/// Aggregate a year range into the HTML report.
///
/// The Data Source is called exactly once; a failure surfaces with its cause
/// and is never retried here. An empty record set is a valid answer, not an
/// error: the route exists, there is just nothing in the range.
pub async fn aggregate(
    source: &dyn DataSource,
    from: &str,
    to: &str,
) -> Result<Outcome, RequestError> {
    let prizes = source.prizes(from, to).await.map_err(RequestError::Upstream)?;

    if prizes.is_empty() {
        debug!(from, to, "data source returned no records");
        return Ok(Outcome::ok(
            format!("<html><body><p>No prize data for the years {from} to {to}.</p></body></html>\n"),
            ContentKind::Html,
        ));
    }

    let total: f64 = prizes.iter().map(|p| p.prize_amount_adjusted).sum();
    let average = total / prizes.len() as f64;
    Ok(Outcome::ok(render_report(&prizes, average), ContentKind::Html))
}

/// Render the report: the mean adjusted amount, then one list item per
/// (prize, laureate) pair.
fn render_report(prizes: &[Prize], average: f64) -> String {
    let mut html = String::with_capacity(256 + prizes.len() * 128);
    html.push_str("<html><body><h1>Nobel Prizes</h1>\n");
    html.push_str(&format!(
        "<h2>Average adjusted prize amount: ${}</h2>\n<hr/>\n<ul>\n",
        format_amount(average)
    ));

    for prize in prizes {
        let category = prize.category.en.as_deref().unwrap_or("Unknown");
        for laureate in prize.laureates.iter().flatten() {
            html.push_str(&format!(
                "<li><b>Laureate:</b> {}, <b>Category:</b> {}, <b>Year:</b> {}</li>\n",
                laureate.display_name(),
                category,
                prize.award_year
            ));
        }
    }

    html.push_str("</ul></body></html>\n");
    html
}
