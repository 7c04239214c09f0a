//! Typed helpers for the ranking and book endpoints.
//!
//! Every helper builds a [`RequestDescriptor`] and delegates to
//! [`QiibraryClient::get_json`], so all of them inherit the retry policy.

use crate::{
    decode::{decode_book_detail, decode_json},
    wire::{BookDetailResponse, YearsResponse},
    BookDetail, BookSearchResponse, QiibraryClient, QiibraryError, RankingResponse,
    RequestDescriptor, Result, SiteStats,
};

const RANKINGS_PATH: &str = "/api/rankings/";
const YEARS_PATH: &str = "/api/rankings/years";
const STATS_PATH: &str = "/api/rankings/stats";
const BOOKS_PATH: &str = "/api/books/";

/// Which ranking to fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RankingQuery {
    /// All-time ranking, optionally restricted to articles with these tags.
    AllTime { tags: Vec<String> },
    /// Ranking over the trailing `n` days of mentions.
    LastDays(u32),
    Year(i32),
    Month { year: i32, month: u32 },
}

impl RankingQuery {
    pub fn daily() -> Self {
        Self::LastDays(1)
    }

    pub fn monthly() -> Self {
        Self::LastDays(30)
    }

    pub fn yearly() -> Self {
        Self::LastDays(365)
    }

    pub(crate) fn to_descriptor(&self) -> Result<RequestDescriptor> {
        let descriptor = RequestDescriptor::get(RANKINGS_PATH);
        Ok(match self {
            Self::AllTime { tags } => {
                let tags = (!tags.is_empty()).then(|| tags.join(","));
                descriptor.query_opt("tags", tags)
            }
            Self::LastDays(days) => descriptor.query("days", days),
            Self::Year(year) => descriptor.query("year", year),
            Self::Month { year, month } => {
                if !(1..=12).contains(month) {
                    return Err(QiibraryError::InvalidRequest(format!(
                        "month must be between 1 and 12, got {month}"
                    )));
                }
                descriptor.query("year", year).query("month", month)
            }
        })
    }
}

impl QiibraryClient {
    pub async fn rankings(&self, query: &RankingQuery) -> Result<RankingResponse> {
        let descriptor = query.to_descriptor()?;
        self.get_json(&descriptor).await
    }

    /// All-time ranking; an empty `tags` slice means no tag filter.
    pub async fn rankings_all(&self, tags: &[&str]) -> Result<RankingResponse> {
        let tags = tags.iter().map(|tag| (*tag).to_owned()).collect();
        self.rankings(&RankingQuery::AllTime { tags }).await
    }

    /// Ranking of the last 24 hours.
    pub async fn rankings_daily(&self) -> Result<RankingResponse> {
        self.rankings(&RankingQuery::daily()).await
    }

    /// Ranking of the last 30 days.
    pub async fn rankings_monthly(&self) -> Result<RankingResponse> {
        self.rankings(&RankingQuery::monthly()).await
    }

    /// Ranking of the last 365 days.
    pub async fn rankings_yearly(&self) -> Result<RankingResponse> {
        self.rankings(&RankingQuery::yearly()).await
    }

    pub async fn rankings_by_year(&self, year: i32) -> Result<RankingResponse> {
        self.rankings(&RankingQuery::Year(year)).await
    }

    pub async fn rankings_by_month(&self, year: i32, month: u32) -> Result<RankingResponse> {
        self.rankings(&RankingQuery::Month { year, month }).await
    }

    /// Years that have ranking data, newest first as served.
    pub async fn available_years(&self) -> Result<Vec<i32>> {
        let response: YearsResponse = self.get_json(&RequestDescriptor::get(YEARS_PATH)).await?;
        Ok(response.years.unwrap_or_default())
    }

    /// Book detail by ISBN/ASIN, with mentioning articles and videos.
    pub async fn book_detail(&self, asin: &str) -> Result<BookDetail> {
        let asin = asin.trim();
        if !is_book_identifier(asin) {
            return Err(QiibraryError::InvalidRequest(format!(
                "invalid book identifier '{asin}'"
            )));
        }
        let descriptor = RequestDescriptor::get(BOOKS_PATH).segment(asin);
        let response = self.send(&descriptor).await?;
        let detail: BookDetailResponse = decode_json(&response, "book detail")?;
        Ok(decode_book_detail(detail))
    }

    /// Searches books by title or author.
    pub async fn search_books(
        &self,
        query: Option<&str>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<BookSearchResponse> {
        let descriptor = RequestDescriptor::get(BOOKS_PATH)
            .query_opt("q", query.filter(|q| !q.is_empty()))
            .query_opt("limit", limit)
            .query_opt("offset", offset);
        self.get_json(&descriptor).await
    }

    pub async fn site_stats(&self) -> Result<SiteStats> {
        self.get_json(&RequestDescriptor::get(STATS_PATH)).await
    }
}

/// ISBN-10/13 or ASIN: ASCII alphanumerics, ISBNs may carry hyphens.
fn is_book_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}
