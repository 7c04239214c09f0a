//! Admin endpoints for curating a book's YouTube links.
//!
//! Link mutations are not idempotent (a repeated add inserts a duplicate), so
//! they go through the single-attempt [`QiibraryClient::request`]. Only the
//! daily-tweet read is retried.

use serde_json::json;

use crate::{
    decode::decode_json, DailyTweet, QiibraryClient, RequestDescriptor, Result, YouTubeLink,
};

const ADMIN_BOOKS_PATH: &str = "/api/admin/books";
const ADMIN_YOUTUBE_PATH: &str = "/api/admin/youtube";
const DAILY_TWEET_PATH: &str = "/api/admin/daily-tweet";

impl QiibraryClient {
    /// Attaches a video to book `book_id` at position `display_order`.
    pub async fn add_youtube_link(
        &self,
        book_id: i64,
        youtube_url: &str,
        display_order: u32,
    ) -> Result<YouTubeLink> {
        let descriptor = RequestDescriptor::post(
            ADMIN_BOOKS_PATH,
            json!({
                "youtube_url": youtube_url.trim(),
                "display_order": display_order,
            }),
        )
        .segment(book_id)
        .segment("youtube");
        let response = self.request(&descriptor).await?;
        decode_json(&response, "youtube link")
    }

    /// Moves link `link_id` to position `display_order`.
    pub async fn update_youtube_link_order(
        &self,
        link_id: i64,
        display_order: u32,
    ) -> Result<YouTubeLink> {
        let descriptor = RequestDescriptor::put(
            ADMIN_YOUTUBE_PATH,
            json!({ "display_order": display_order }),
        )
        .segment(link_id);
        let response = self.request(&descriptor).await?;
        decode_json(&response, "youtube link")
    }

    pub async fn delete_youtube_link(&self, link_id: i64) -> Result<()> {
        let descriptor = RequestDescriptor::delete(ADMIN_YOUTUBE_PATH).segment(link_id);
        self.request(&descriptor).await?;
        Ok(())
    }

    /// Post text for the current 24-hour top book.
    pub async fn daily_tweet(&self) -> Result<DailyTweet> {
        self.get_json(&RequestDescriptor::get(DAILY_TWEET_PATH)).await
    }
}
