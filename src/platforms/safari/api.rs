use anyhow::Context;
use url::Url;

use crate::models::course::Course;

use super::parser;

/// Path segments joined with `_`, used when the page carries no title.
pub fn title_from_url(url: &Url) -> String {
    url.path().trim_matches('/').replace('/', "_")
}

pub async fn fetch_toc(client: &reqwest::Client, url: &Url) -> anyhow::Result<String> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("failed to fetch {}", url))?
        .error_for_status()?;

    Ok(resp.text().await?)
}

pub async fn load_course(client: &reqwest::Client, url: &Url) -> anyhow::Result<Course> {
    let html = fetch_toc(client, url).await?;
    tracing::debug!("fetched {} bytes of TOC from {}", html.len(), url);
    Ok(parser::parse_course(&html, &title_from_url(url), Some(url)))
}
