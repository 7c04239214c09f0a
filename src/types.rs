use serde::Deserialize;

/// Raw outcome of one successful HTTP attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub amazon_url: Option<String>,
    #[serde(default)]
    pub amazon_affiliate_url: Option<String>,
    #[serde(default)]
    pub total_mentions: u64,
    #[serde(default)]
    pub latest_mention_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BookStats {
    #[serde(default)]
    pub mention_count: u64,
    #[serde(default)]
    pub article_count: u64,
    #[serde(default)]
    pub total_likes: u64,
    #[serde(default)]
    pub avg_likes: f64,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub latest_mention_at: Option<String>,
    /// Only reported for video-based rankings.
    #[serde(default)]
    pub total_views: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RankingItem {
    pub rank: u32,
    pub book: Book,
    pub stats: BookStats,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RankingPeriod {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RankingResponse {
    pub rankings: Vec<RankingItem>,
    #[serde(default)]
    pub period: Option<RankingPeriod>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct QiitaArticle {
    pub id: i64,
    pub qiita_id: String,
    pub title: String,
    pub url: String,
    pub author_id: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub stocks_count: u64,
    #[serde(default)]
    pub comments_count: u64,
    pub published_at: String,
}

/// A video attached to a book, as stored by the admin API.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct YouTubeLink {
    /// Link id used by the update and delete endpoints.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub youtube_video_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub display_order: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YouTubeVideo {
    pub video_id: String,
    pub title: String,
    pub channel_name: String,
    pub thumbnail_url: String,
    pub video_url: String,
    pub view_count: u64,
    pub like_count: u64,
    /// Not reported by the book detail endpoint.
    pub published_at: Option<String>,
    pub link_id: Option<i64>,
    pub display_order: Option<u32>,
}

/// Book detail with the articles and videos that mention it.
#[derive(Clone, Debug, PartialEq)]
pub struct BookDetail {
    pub book: Book,
    pub qiita_articles: Vec<QiitaArticle>,
    pub youtube_videos: Vec<YouTubeVideo>,
}

/// Site-wide aggregate counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SiteStats {
    #[serde(default)]
    pub total_books: u64,
    #[serde(default)]
    pub total_articles: u64,
    #[serde(default)]
    pub total_likes: u64,
}

/// Generated post text for the day's top book.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DailyTweet {
    pub tweet: String,
    #[serde(default)]
    pub generated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BookSearchResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub books: Vec<Book>,
}
