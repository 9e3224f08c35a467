//! Integration tests for the cached Wikidata client
//!
//! These tests run against an in-memory fake of the action API and verify:
//! - At-most-one request per argument tuple
//! - Language fallback and missing entities
//! - Redirect resolution for relation lookups
//! - Nationality/country fallback
//! - Title search
//! - Persistence of lookups across client instances

mod common;

use common::{client_for, client_with_store, init_tracing, FakeWikiApi};
use std::sync::Arc;
use tempfile::TempDir;
use wikikg::cache::tags;
use wikikg::properties::{COUNTRY, COUNTRY_OF_CITIZENSHIP, INSTANCE_OF};
use wikikg::{CacheConfig, ClientConfig, FileBackedCacheStore, WikiClient, WikiError};

fn obama_api() -> FakeWikiApi {
    FakeWikiApi::new()
        .with_label("Q76", "en", "Barack Obama")
        .with_description("Q76", "en", "president of the United States from 2009 to 2017")
        .with_label("Q5", "en", "human")
        .with_label("Q30", "en", "United States of America")
        .with_claim("Q76", INSTANCE_OF, &["Q5"])
        .with_claim("Q76", COUNTRY_OF_CITIZENSHIP, &["Q30"])
}

#[tokio::test]
async fn test_entity_info_is_memoized() {
    init_tracing();
    let api = Arc::new(obama_api());
    let client = client_for(api.clone());

    let info = client.get_entity_info("Q76", "en").await.unwrap();
    assert_eq!(info.labels, "Barack Obama");
    assert!(info.descriptions.starts_with("president"));

    for _ in 0..3 {
        assert_eq!(
            client.get_entity_name("Q76", "en").await.unwrap(),
            "Barack Obama"
        );
    }

    assert_eq!(api.entity_calls(), 1);

    let stats = client.cache_stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 3);

    let keys = client.cache_keys(Some(&[tags::ENTITY_INFO])).await;
    assert_eq!(keys[tags::ENTITY_INFO], vec!["('Q76', 'en')".to_string()]);
}

#[tokio::test]
async fn test_missing_language_degrades_to_empty() {
    let api = Arc::new(obama_api());
    let client = client_for(api);

    let info = client.get_entity_info("Q76", "de").await.unwrap();
    assert_eq!(info.labels, "");
    assert_eq!(info.descriptions, "");
}

#[tokio::test]
async fn test_missing_entity_is_not_found() {
    let api = Arc::new(obama_api());
    let client = client_for(api.clone());

    let err = client.get_entity_info("Q999999999", "en").await.unwrap_err();
    assert!(matches!(err, WikiError::NotFoundError(_)));

    // Errors are not cached: the next call asks again
    let _ = client.get_entity_info("Q999999999", "en").await;
    assert_eq!(api.entity_calls(), 2);
}

#[tokio::test]
async fn test_entity_property_and_absent_relation() {
    let api = Arc::new(obama_api());
    let client = client_for(api.clone());

    let types = client.get_entity_property("Q76", INSTANCE_OF).await.unwrap();
    assert_eq!(types, vec!["Q5".to_string()]);

    let none = client.get_entity_property("Q76", COUNTRY).await.unwrap();
    assert!(none.is_empty());

    // Empty results are cached too
    client.get_entity_property("Q76", COUNTRY).await.unwrap();
    assert_eq!(api.claim_calls(), 2);
}

#[tokio::test]
async fn test_redirected_entity_is_resolved_once() {
    let api = Arc::new(
        FakeWikiApi::new()
            .with_redirect("Q100", "Q200")
            .with_claim("Q200", INSTANCE_OF, &["Q5"]),
    );
    let client = client_for(api.clone());

    let types = client.get_entity_property("Q100", INSTANCE_OF).await.unwrap();
    assert_eq!(types, vec!["Q5".to_string()]);

    // claims(Q100) -> redirect error, entities(Q100), claims(Q200)
    assert_eq!(api.claim_calls(), 2);
    assert_eq!(api.entity_calls(), 1);

    client.get_entity_property("Q100", INSTANCE_OF).await.unwrap();
    assert_eq!(api.claim_calls(), 2);
}

#[tokio::test]
async fn test_failed_lookup_is_not_cached() {
    let api = Arc::new(obama_api());
    let client = client_for(api.clone());

    api.fail_next_claims(1);
    let err = client.get_entity_property("Q76", INSTANCE_OF).await.unwrap_err();
    assert!(matches!(err, WikiError::UpstreamError(_)));
    assert!(client.cache_summary().await.get(tags::ENTITY_PROP).is_none());

    let types = client.get_entity_property("Q76", INSTANCE_OF).await.unwrap();
    assert_eq!(types, vec!["Q5".to_string()]);
    assert_eq!(api.claim_calls(), 2);
}

#[tokio::test]
async fn test_entity_type_labeled_and_ids_only() {
    let api = Arc::new(obama_api());
    let client = client_for(api.clone());

    let labeled = client.get_entity_type("Q76").await.unwrap();
    assert_eq!(labeled, vec![("Q5".to_string(), "human".to_string())]);

    let ids = client.get_entity_type_ids("Q76").await.unwrap();
    assert_eq!(ids, vec!["Q5".to_string()]);

    // The relation lookup is shared between both forms
    assert_eq!(api.claim_calls(), 1);

    let keys = client.cache_keys(Some(&[tags::ENTITY_TYPE])).await;
    assert_eq!(
        keys[tags::ENTITY_TYPE],
        vec![
            "('Q76', ('lang', 'en'))".to_string(),
            "('Q76', True)".to_string()
        ]
    );
}

#[tokio::test]
async fn test_associated_country_prefers_nationality() {
    let api = Arc::new(obama_api());
    let client = client_for(api.clone());

    let countries = client.get_associated_country("Q76").await.unwrap();
    assert_eq!(
        countries,
        vec![("Q30".to_string(), "United States of America".to_string())]
    );

    // Country relation never queried when nationality is non-empty
    assert_eq!(api.claims_requested_for(COUNTRY), 0);
}

#[tokio::test]
async fn test_associated_country_falls_back_to_country() {
    let api = Arc::new(
        FakeWikiApi::new()
            .with_label("Q34221", "en", "Mackenzie River")
            .with_label("Q16", "en", "Canada")
            .with_claim("Q34221", COUNTRY, &["Q16"]),
    );
    let client = client_for(api.clone());

    let countries = client.get_associated_country("Q34221").await.unwrap();
    assert_eq!(countries, vec![("Q16".to_string(), "Canada".to_string())]);
    assert_eq!(api.claims_requested_for(COUNTRY_OF_CITIZENSHIP), 1);
    assert_eq!(api.claims_requested_for(COUNTRY), 1);

    let summary = client.cache_summary().await;
    assert_eq!(summary[tags::ASSOCIATED_COUNTRY], 1);
    assert_eq!(summary[tags::ENTITY_NATIONALITY], 1);
    assert_eq!(summary[tags::ENTITY_COUNTRY], 1);
}

#[tokio::test]
async fn test_search_entity_id_by_title_skips_missing_pages() {
    let api = Arc::new(
        FakeWikiApi::new()
            .with_page("en", "Douglas Adams", "8091", Some("Q42"))
            .with_page("en", "Sandbox", "77", None),
    );
    let client = client_for(api.clone());

    let found = client
        .search_entity_id_by_title("Douglas Adams", "en")
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found["8091"].qid, "Q42");
    assert_eq!(found["8091"].title, "Douglas Adams");

    let missing = client
        .search_entity_id_by_title("No Such Page Anywhere", "en")
        .await
        .unwrap();
    assert!(missing.is_empty());

    let no_item = client.search_entity_id_by_title("Sandbox", "en").await.unwrap();
    assert!(no_item.is_empty());

    client
        .search_entity_id_by_title("Douglas Adams", "en")
        .await
        .unwrap();
    assert_eq!(api.query_calls(), 3);
}

#[tokio::test]
async fn test_cached_lookups_survive_restart() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("wiki_cache.json");

    let first_api = Arc::new(obama_api());
    {
        let store =
            FileBackedCacheStore::open(CacheConfig::builder().path(&path).build(), None).unwrap();
        let client = client_with_store(first_api.clone(), store);
        client.get_associated_country("Q76").await.unwrap();
        client.sync_cache(None).await.unwrap();
    }
    assert!(first_api.total_calls() > 0);

    let second_api = Arc::new(FakeWikiApi::new());
    let store =
        FileBackedCacheStore::open(CacheConfig::builder().path(&path).build(), None).unwrap();
    let client = client_with_store(second_api.clone(), store);

    let countries = client.get_associated_country("Q76").await.unwrap();
    assert_eq!(
        countries,
        vec![("Q30".to_string(), "United States of America".to_string())]
    );
    assert_eq!(second_api.total_calls(), 0);
}

#[tokio::test]
async fn test_labeled_lookups_are_keyed_by_language() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("wiki_cache.json");
    let api = Arc::new(obama_api().with_label("Q30", "de", "Vereinigte Staaten"));

    let english = client_with_store(
        api.clone(),
        FileBackedCacheStore::open(CacheConfig::builder().path(&path).build(), None).unwrap(),
    );
    let en = english.get_nationality("Q76").await.unwrap();
    assert_eq!(en, vec![("Q30".to_string(), "United States of America".to_string())]);
    english.sync_cache(None).await.unwrap();

    let german = WikiClient::with_api(
        api.clone(),
        FileBackedCacheStore::open(CacheConfig::builder().path(&path).build(), None).unwrap(),
        ClientConfig::builder().default_lang("de").build(),
    );
    let de = german.get_nationality("Q76").await.unwrap();
    assert_eq!(de, vec![("Q30".to_string(), "Vereinigte Staaten".to_string())]);

    // The relation itself is language independent and came from the file
    assert_eq!(api.claims_requested_for(COUNTRY_OF_CITIZENSHIP), 1);

    let keys = german.cache_keys(Some(&[tags::ENTITY_NATIONALITY])).await;
    assert_eq!(
        keys[tags::ENTITY_NATIONALITY],
        vec![
            "('Q76', ('lang', 'de'))".to_string(),
            "('Q76', ('lang', 'en'))".to_string()
        ]
    );
}

#[tokio::test]
async fn test_save_cache_without_path_is_config_error() {
    let client = client_for(Arc::new(FakeWikiApi::new()));
    let err = client.save_cache(None).await.unwrap_err();
    assert!(matches!(err, WikiError::ConfigError(_)));

    let err = client.sync_cache(None).await.unwrap_err();
    assert!(matches!(err, WikiError::ConfigError(_)));
}

#[tokio::test]
async fn test_save_cache_to_explicit_path() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("out").join("cache.json");

    let client = client_for(Arc::new(obama_api()));
    client.get_entity_name("Q76", "en").await.unwrap();

    let written = client.save_cache(Some(&path)).await.unwrap();
    assert_eq!(written, path);

    let on_disk = FileBackedCacheStore::read_cache_file(&path).unwrap();
    assert_eq!(
        on_disk[tags::ENTITY_INFO]["('Q76', 'en')"]["labels"],
        "Barack Obama"
    );
}

#[tokio::test]
#[ignore] // Requires network access: cargo test -- --ignored
async fn test_live_lookup() {
    let client = WikiClient::new(ClientConfig::default(), CacheConfig::default()).unwrap();

    let name = client.get_entity_name("Q42", "en").await.unwrap();
    assert_eq!(name, "Douglas Adams");

    let types = client.get_entity_type_ids("Q42").await.unwrap();
    assert!(types.contains(&"Q5".to_string()));
}
