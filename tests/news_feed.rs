use httptest::matchers::{all_of, contains, request, url_decoded};
use httptest::responders::{json_encoded, status_code};
use httptest::{Expectation, Server};
use serde_json::json;

use tudocarro_rust::fipe_api::build_client;
use tudocarro_rust::news::{NewsClient, NEWS_ERROR_MESSAGE};

fn gnews_expectation(body: serde_json::Value) -> Expectation {
    Expectation::matching(all_of![
        request::path("/api/news/gnews"),
        request::query(url_decoded(contains(("q", "carros leilão")))),
    ])
    .respond_with(json_encoded(body))
}

#[tokio::test]
async fn merges_both_sources() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::path("/api/news/g1")).respond_with(json_encoded(json!({
            "data": [
                { "url": "https://g1/1", "title": "Alta nos usados", "source": "g1", "publishedAt": "2024-04-02T09:00:00Z" },
                { "url": "https://shared", "title": "Leilão de frota", "source": "g1", "publishedAt": "2024-04-01T09:00:00Z" }
            ]
        }))),
    );
    server.expect(gnews_expectation(json!({
        "data": [
            { "url": "https://shared", "title": "Leilão de frota (cópia)", "source": { "name": "Autoesporte" }, "publishedAt": "2024-04-03T09:00:00Z" },
            { "url": "https://gnews/9", "title": "Novo SUV", "source": { "name": "Quatro Rodas" }, "publishedAt": "2024-04-05T09:00:00Z" }
        ]
    })));

    let client = NewsClient::new(build_client(5).unwrap(), &server.url_str("/"));
    let feed = client.fetch_feed("carros leilão").await;

    assert_eq!(feed.error, None);
    let titles: Vec<&str> = feed.items.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["Novo SUV", "Alta nos usados", "Leilão de frota"]);
    assert_eq!(feed.items[0].source, "Quatro Rodas");
}

#[tokio::test]
async fn failing_source_keeps_the_other_items() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::path("/api/news/g1")).respond_with(status_code(502)),
    );
    server.expect(gnews_expectation(json!({
        "data": [{ "url": "https://gnews/1", "title": "Recall anunciado", "source": "gnews" }]
    })));

    let client = NewsClient::new(build_client(5).unwrap(), &server.url_str("/"));
    let feed = client.fetch_feed("carros leilão").await;

    assert_eq!(feed.error.as_deref(), Some(NEWS_ERROR_MESSAGE));
    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.items[0].title, "Recall anunciado");
}
