use std::time::Duration;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub fn apply_proxy(builder: reqwest::ClientBuilder, proxy_url: Option<&str>) -> reqwest::ClientBuilder {
    let Some(proxy_url) = proxy_url else {
        return builder;
    };
    match reqwest::Proxy::all(proxy_url) {
        Ok(p) => builder.proxy(p),
        Err(e) => {
            tracing::warn!("Invalid proxy URL: {}", e);
            builder
        }
    }
}

pub fn build_client(proxy_url: Option<&str>) -> anyhow::Result<reqwest::Client> {
    let builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(15))
        .timeout(Duration::from_secs(60))
        .cookie_store(true);
    Ok(apply_proxy(builder, proxy_url).build()?)
}
