use anyhow::{bail, Context, Result};
use clap::Parser;
use scrollfeed::{Post, RecordId};
use serde::Deserialize;

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of a running server
    #[arg(long, default_value = "http://localhost:3001")]
    base_url: String,

    /// Posts per page
    #[arg(long, default_value_t = 10)]
    limit: u32,

    /// Give up after this many pages
    #[arg(long, default_value_t = 1000)]
    max_pages: usize,
}

#[derive(Deserialize)]
struct PageResponse {
    data: Vec<Post>,
    next_id: String,
    has_more: bool,
}

/// Scrolls through the whole feed the way a client would and checks that
/// every post shows up once, newest first.
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();
    let url = format!("{}/v1/posts", args.base_url.trim_end_matches('/'));

    let mut cursor = String::new();
    let mut previous: Option<RecordId> = None;
    let mut total = 0;

    for page_number in 1..=args.max_pages {
        let mut request = client.get(&url).query(&[("limit", args.limit.to_string())]);
        if !cursor.is_empty() {
            request = request.query(&[("last_id", &cursor)]);
        }
        let response = request.send().await.context("request failed")?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            bail!("page {page_number}: status {status}: {body}");
        }
        let page: PageResponse =
            serde_json::from_str(&body).with_context(|| format!("page {page_number}: bad body"))?;

        for post in &page.data {
            if previous.is_some_and(|previous| post.id >= previous) {
                bail!("page {page_number}: post {} is out of order", post.id);
            }
            previous = Some(post.id);
        }
        total += page.data.len();
        println!(
            "Page {page_number}: {} posts, next_id {:?}, has_more {}",
            page.data.len(),
            page.next_id,
            page.has_more
        );

        if !page.has_more {
            println!("Visited {total} posts in {page_number} pages");
            return Ok(());
        }
        if page.data.len() != args.limit as usize {
            bail!("page {page_number}: has_more with a short page");
        }
        cursor = page.next_id;
    }

    bail!("no last page after {} pages", args.max_pages)
}
