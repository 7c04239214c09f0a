use serde::Deserialize;

use crate::{Book, QiitaArticle, YouTubeLink};

#[derive(Debug, Deserialize)]
pub struct YearsResponse {
    #[serde(default)]
    pub years: Option<Vec<i32>>,
}

#[derive(Debug, Deserialize)]
pub struct BookDetailResponse {
    pub book: Book,
    #[serde(default)]
    pub qiita_articles: Option<Vec<QiitaArticle>>,
    #[serde(default)]
    pub youtube_links: Option<Vec<YouTubeLink>>,
}
