use harvester_core::Testament;
use harvester_engine::{fetch_catalog, FetchSettings, ReqwestFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn catalog_is_fetched_in_api_order() {
    let server = MockServer::start().await;
    let body = r#"[
        {"name":"Gênesis","abbrev":{"pt":"gn","en":"gn"},"author":"Moisés","chapters":50,"group":"Pentateuco","testament":"VT"},
        {"name":"Jó","abbrev":{"pt":"jó","en":"job"},"chapters":42,"testament":"VT"},
        {"name":"1º Coríntios","abbrev":{"pt":"1co","en":"1co"},"chapters":16,"testament":"NT"}
    ]"#;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let catalog = fetch_catalog(&fetcher, &format!("{}/api/books", server.uri()))
        .await
        .unwrap();

    let slugs: Vec<_> = catalog.entries().iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["gn", "jó", "1co"]);
    assert_eq!(catalog.entries()[2].title, "1 Coríntios");
    assert_eq!(catalog.entries()[2].sections, 16);
    assert_eq!(catalog.filtered(Some(Testament::New)).count(), 1);
}
