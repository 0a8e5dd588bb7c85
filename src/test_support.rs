//! A stand-in for the menu site, serving the html fixtures over loopback.
use std::{collections::HashMap, fs, io};

use axum::{
    body::{Body, Bytes},
    extract::Query,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use futures::stream;
use tokio::net::TcpListener;
use url::Url;

/// Menu pages for this date link to a label page whose body is cut off mid-response.
pub const BROKEN_DATE: &str = "1/1/2000";
/// Menu pages for this date link one dish to another host.
pub const FOREIGN_LINK_DATE: &str = "1/2/2000";
/// Menu pages for this date only have the brunch and dinner panes.
pub const BRUNCH_DATE: &str = "4/6/2024";

fn fixture(path: &str) -> String {
    fs::read_to_string(format!("./src/parse/html_examples/{path}")).unwrap()
}

async fn menu_page(Query(params): Query<HashMap<String, String>>) -> Html<String> {
    match params.get("dtdate").map(String::as_str) {
        Some(BROKEN_DATE) => Html(
            r#"<div id="pane-1"><div class="card"><div class="card-text">
                <div class="row menu-item-row">
                    <a class="menu-item-name" href="label.aspx?RecNumAndPort=broken">Ghost</a>
                </div>
            </div></div></div>"#
                .to_string(),
        ),
        Some(FOREIGN_LINK_DATE) => Html(
            r#"<div id="pane-1"><div class="card"><div class="card-text">
                <div class="row menu-item-row">
                    <a class="menu-item-name" href="http://127.0.0.1:1/label.aspx?RecNumAndPort=100">Stray Dish</a>
                </div>
                <div class="row menu-item-row">
                    <a class="menu-item-name" href="label.aspx?RecNumAndPort=100">Scrambled Eggs</a>
                </div>
            </div></div></div>"#
                .to_string(),
        ),
        Some(BRUNCH_DATE) => Html(fixture("menu_page/brunch.html")),
        _ => Html(fixture("menu_page/three_meals.html")),
    }
}

async fn label_page(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("RecNumAndPort").map(String::as_str) {
        Some("100") => Html(fixture("nutrition_page/scrambled_eggs.html")).into_response(),
        Some("104") => Html(fixture("nutrition_page/steamed_rice.html")).into_response(),
        // the body errors after the head is sent, so the client sees a dropped connection
        Some("broken") => Body::from_stream(stream::iter([
            Ok(Bytes::from_static(b"<html><body>")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "label page cut off")),
        ]))
        .into_response(),
        _ => Html("<html></html>".to_string()).into_response(),
    }
}

/// Binds the fake menu site to an ephemeral port and returns its base url.
pub async fn spawn_menu_site() -> Url {
    let app = Router::new()
        .route("/", get(menu_page))
        .route("/label.aspx", get(label_page));
    spawn(app).await
}

pub async fn spawn(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}").parse().unwrap()
}
