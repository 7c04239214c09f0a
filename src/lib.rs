//! `qiibrary-http` is an async HTTP client for the Qiibrary book ranking API.
//!
//! Every call goes through [`QiibraryClient::send`], which wraps a single
//! attempt ([`QiibraryClient::request`]) in a bounded exponential-backoff
//! [`RetryPolicy`]. Typed helpers sit on top:
//! - [`QiibraryClient::rankings`] and the `rankings_*` shortcuts
//! - [`QiibraryClient::available_years`]
//! - [`QiibraryClient::book_detail`]
//! - [`QiibraryClient::search_books`]
//! - [`QiibraryClient::site_stats`]
//!
//! Admin link mutations ([`QiibraryClient::add_youtube_link`] and friends) are
//! sent exactly once.

mod admin;
mod api;
mod client;
mod decode;
mod error;
mod options;
mod request;
mod types;
mod wire;

pub mod retry;
pub mod sleeper;

pub use api::RankingQuery;
pub use client::QiibraryClient;
pub use decode::{youtube_thumbnail_url, youtube_video_url};
pub use error::{ErrorCode, QiibraryError};
pub use options::{ClientOptions, DEFAULT_BASE_URL};
pub use request::RequestDescriptor;
pub use retry::{Classify, FailureClass, RetryPolicy, Retrying};
pub use sleeper::{Sleeper, TokioSleeper, TrackingSleeper};
pub use types::{
    ApiResponse, Book, BookDetail, BookSearchResponse, BookStats, DailyTweet, QiitaArticle,
    RankingItem, RankingPeriod, RankingResponse, SiteStats, YouTubeLink, YouTubeVideo,
};

pub use reqwest::Method;
pub use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, QiibraryError>;
