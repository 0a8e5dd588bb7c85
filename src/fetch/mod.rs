use reqwest::{Client, Error as RequestError};
use tracing::{instrument, Level};
use url::Url;

use crate::{
    error::Error,
    menu::{DateKey, Location},
};

pub fn make_client() -> reqwest::Client {
    Client::builder()
        .gzip(true)
        .build()
        .expect("client creation should succeed")
}

/// Fetches `url` and returns the body. Only transport failures are errors,
/// an error page is returned like any other markup.
#[instrument(skip_all, fields(url = %url), level = Level::TRACE)]
pub async fn fetch_page(client: &reqwest::Client, url: Url) -> Result<String, RequestError> {
    let res = client.get(url).send().await?;
    let start = std::time::Instant::now();
    let text = res.text().await?;
    log::trace!("Got text of page in \t {:?}", start.elapsed());
    Ok(text)
}

/// `{host}/?locationNum={id}&dtdate={m/d/yyyy}`
pub fn location_url(host: &Url, location: Location, date: DateKey) -> Url {
    let mut url = host.clone();
    url.set_path("/");
    url.query_pairs_mut()
        .clear()
        .append_pair("locationNum", &location.id().to_string())
        .append_pair("dtdate", &date.to_string());
    url
}

/// `{host}/{href}` for a label link scraped from a menu page. The link is
/// appended to the host root as text, never resolved, so it cannot name
/// another host. Links carrying their own scheme are rejected.
pub fn detail_url(host: &Url, href: &str) -> crate::Result<Url> {
    if Url::parse(href).is_ok() {
        return Err(Error::Link(href.to_owned()));
    }
    let mut root = host.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    Ok(Url::parse(&format!("{root}{}", href.trim_start_matches('/')))?)
}
