use httptest::matchers::request;
use httptest::responders::{json_encoded, status_code};
use httptest::{Expectation, Server};
use reqwest::{redirect, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use tudocarro_rust::config::Settings;
use tudocarro_rust::fipe_api::build_client;
use tudocarro_rust::{routes, AppState};

// Serves the router on an ephemeral port, backed by the mock server
async fn spawn_app(backend: &Server) -> String {
    let settings = Settings {
        api_base_url: backend.url_str("/api/cars"),
        ..Settings::default()
    };
    let state = AppState::from_settings(settings, build_client(5).unwrap());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, routes::create_router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

fn http() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn brands_are_proxied() {
    let backend = Server::run();
    backend.expect(
        Expectation::matching(request::path("/api/cars/brands"))
            .respond_with(json_encoded(json!([{ "codigo": 21, "nome": "Fiat" }]))),
    );
    let app = spawn_app(&backend).await;

    let response = http().get(format!("{app}/api/brands")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!([{ "codigo": "21", "nome": "Fiat" }]));
}

#[tokio::test]
async fn backend_failure_maps_to_bad_gateway() {
    let backend = Server::run();
    backend.expect(
        Expectation::matching(request::path("/api/cars/models/21")).respond_with(status_code(500)),
    );
    let app = spawn_app(&backend).await;

    let response = http().get(format!("{app}/api/models/21")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn search_url_builds_marketplace_link() {
    let backend = Server::run();
    let app = spawn_app(&backend).await;

    let response = http()
        .post(format!("{app}/api/search-url"))
        .json(&json!({
            "marca": "Audi",
            "modelo": "A5 2.0 TFSI",
            "uf": "sp",
            "cidade": "São Paulo",
            "tipo": "carros-usados"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(true));
    assert_eq!(
        body["url"],
        json!(
            "https://www.webmotors.com.br/carros-usados/sp-sao-paulo/audi/a5\
             ?tipoveiculo=carros-usados&page=1&marca1=audi&modelo1=a5\
             &estado1=SP&cidade1=S%C3%A3o+Paulo"
        )
    );
}

#[tokio::test]
async fn search_url_rejects_inverted_years() {
    let backend = Server::run();
    let app = spawn_app(&backend).await;

    let response = http()
        .post(format!("{app}/api/search-url"))
        .json(&json!({ "anoMin": 2025, "anoMax": 2020 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["url"], Value::Null);
    assert_eq!(body["error"], json!("Ano mínimo não pode ser maior que o ano máximo."));
}

#[tokio::test]
async fn search_url_for_non_object_is_plain_listing() {
    let backend = Server::run();
    let app = spawn_app(&backend).await;

    let response = http()
        .post(format!("{app}/api/search-url"))
        .json(&json!("audi"))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["url"],
        json!("https://www.webmotors.com.br/carros/estoque?tipoveiculo=carros&page=1")
    );
}

#[tokio::test]
async fn go_redirects_within_loaded_year_range() {
    let backend = Server::run();
    backend.expect(
        Expectation::matching(request::path("/api/cars/years/6/10")).respond_with(json_encoded(
            json!([
                { "codigo": "2021-1", "nome": "2021 Gasolina" },
                { "codigo": "2018-1", "nome": "2018 Gasolina" }
            ]),
        )),
    );
    let app = spawn_app(&backend).await;

    let response = http()
        .get(format!(
            "{app}/go?marca=Audi&modelo=A5&anoMin=2019&anoMax=2021&brandCode=6&modelCode=10"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()["location"].to_str().unwrap();
    assert_eq!(
        location,
        "https://www.webmotors.com.br/carros/estoque/audi/a5/de.2019/ate.2021\
         ?tipoveiculo=carros&page=1&marca1=audi&modelo1=a5&anode=2019&anoate=2021"
    );
}

#[tokio::test]
async fn go_rejects_year_outside_loaded_range() {
    let backend = Server::run();
    backend.expect(
        Expectation::matching(request::path("/api/cars/years/6/10")).respond_with(json_encoded(
            json!([{ "codigo": "2018-1", "nome": "2018 Gasolina" }, { "codigo": "2021-1", "nome": "2021 Gasolina" }]),
        )),
    );
    let app = spawn_app(&backend).await;

    let response = http()
        .get(format!("{app}/go?anoMin=2015&brandCode=6&modelCode=10"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "Ano mínimo deve estar entre 2018 e 2021.");
}
