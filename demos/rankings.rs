use qiibrary_http::QiibraryClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let api = QiibraryClient::from_env()?;

    let ranking = api.rankings_daily().await?;
    for item in ranking.rankings.iter().take(10) {
        println!(
            "#{:<3} {} ({} mentions, {} likes)",
            item.rank, item.book.title, item.stats.mention_count, item.stats.total_likes
        );
    }

    let stats = api.site_stats().await?;
    println!(
        "{} books, {} articles, {} likes",
        stats.total_books, stats.total_articles, stats.total_likes
    );

    Ok(())
}
