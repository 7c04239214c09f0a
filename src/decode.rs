use serde::de::DeserializeOwned;

use crate::{
    wire::BookDetailResponse,
    ApiResponse, BookDetail, QiibraryError, YouTubeLink, YouTubeVideo,
};

const FALLBACK_VIDEO_TITLE: &str = "動画タイトル";
const FALLBACK_CHANNEL_NAME: &str = "YouTube";

pub(crate) fn decode_json<T: DeserializeOwned>(
    response: &ApiResponse,
    what: &str,
) -> Result<T, QiibraryError> {
    serde_json::from_str::<T>(&response.body).map_err(|err| {
        QiibraryError::Decode(format!(
            "invalid {what} response JSON: {err}; body: {}",
            response.body
        ))
    })
}

pub(crate) fn decode_book_detail(response: BookDetailResponse) -> BookDetail {
    let youtube_videos = response
        .youtube_links
        .unwrap_or_default()
        .into_iter()
        .map(decode_youtube_link)
        .collect();

    BookDetail {
        book: response.book,
        qiita_articles: response.qiita_articles.unwrap_or_default(),
        youtube_videos,
    }
}

fn decode_youtube_link(link: YouTubeLink) -> YouTubeVideo {
    let video_id = link.youtube_video_id.unwrap_or_default();
    YouTubeVideo {
        title: non_empty(link.title).unwrap_or_else(|| FALLBACK_VIDEO_TITLE.to_owned()),
        channel_name: non_empty(link.channel_name)
            .unwrap_or_else(|| FALLBACK_CHANNEL_NAME.to_owned()),
        thumbnail_url: non_empty(link.thumbnail_url)
            .unwrap_or_else(|| youtube_thumbnail_url(&video_id)),
        video_url: non_empty(link.youtube_url).unwrap_or_else(|| youtube_video_url(&video_id)),
        view_count: link.view_count.unwrap_or(0),
        like_count: link.like_count.unwrap_or(0),
        published_at: None,
        link_id: link.id,
        display_order: link.display_order,
        video_id,
    }
}

/// Medium-quality thumbnail URL for a YouTube video.
pub fn youtube_thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/mqdefault.jpg")
}

pub fn youtube_video_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
