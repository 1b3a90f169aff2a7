//! Catalog ingest: turn a catalog response into event and image rows.
//!
//! Fetching is a thin adapter over `reqwest`; everything after the response
//! body is plain parsing so it can be driven from a file as well.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use lanecast_core::config::CatalogConfig;
use lanecast_core::{Error, Result};
use lanecast_db::models::EventRecord;
use lanecast_db::queries::{events, images};
use lanecast_schedule::normalize::{channel_name, derive_times, genres, parse_runtime, text};

/// One `{id, attributes}` node from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub id: String,
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogResponse {
    relationships: Option<Relationships>,
}

#[derive(Debug, Default, Deserialize)]
struct Relationships {
    items: Option<ItemList>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemList {
    data: Option<Vec<Value>>,
}

/// Counts from one ingest pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub items: usize,
    pub upserted: usize,
    pub skipped: usize,
    pub images: usize,
}

/// Parse a catalog response body into its item nodes.
///
/// Nodes without an id are dropped with a warning; a node whose
/// `attributes` is missing or not an object gets an empty map.
pub fn parse_catalog(body: &str) -> Result<Vec<CatalogItem>> {
    let response: CatalogResponse =
        serde_json::from_str(body).map_err(|e| Error::catalog(format!("invalid catalog JSON: {e}")))?;

    let nodes = response
        .relationships
        .and_then(|r| r.items)
        .and_then(|i| i.data)
        .unwrap_or_default();

    let mut items = Vec::with_capacity(nodes.len());
    for node in nodes {
        let id = match node.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                tracing::warn!("Skipping catalog node without an id");
                continue;
            }
        };
        let attributes = node
            .get("attributes")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        items.push(CatalogItem { id, attributes });
    }
    Ok(items)
}

pub fn load_catalog_file(path: &Path) -> Result<Vec<CatalogItem>> {
    let body = std::fs::read_to_string(path)?;
    parse_catalog(&body)
}

fn catalog_headers(config: &CatalogConfig, slug: &str) -> Vec<(&'static str, String)> {
    vec![
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
        ),
        ("Accept", "application/json".into()),
        ("Accept-Language", "en-US,en;q=0.9".into()),
        ("Origin", "https://www.peacocktv.com".into()),
        ("Referer", format!("https://www.peacocktv.com{slug}")),
        ("X-SkyOTT-Proposition", "NBCUOTT".into()),
        ("X-SkyOTT-Platform", "PC".into()),
        ("X-SkyOTT-Device", "005".into()),
        ("X-SkyOTT-Territory", config.territory.clone()),
        ("X-SkyOTT-Language", "en".into()),
        ("X-SkyOTT-Provider", "NBCU".into()),
    ]
}

/// Fetch the catalog node for `slug`.
pub async fn fetch_catalog(config: &CatalogConfig, slug: &str) -> Result<Vec<CatalogItem>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(Error::catalog)?;

    let mut request = client
        .get(&config.base_url)
        .query(&[("slug", slug), ("represent", "(items(items))")]);
    for (name, value) in catalog_headers(config, slug) {
        request = request.header(name, value);
    }

    tracing::info!("Fetching catalog {}", slug);
    let response = request
        .send()
        .await
        .map_err(|e| Error::catalog(format!("request failed: {e}")))?
        .error_for_status()
        .map_err(|e| Error::catalog(format!("bad status: {e}")))?;
    let body = response
        .text()
        .await
        .map_err(|e| Error::catalog(format!("failed to read body: {e}")))?;

    parse_catalog(&body)
}

fn flag(attrs: &Map<String, Value>, key: &str) -> bool {
    attrs.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Map a catalog item onto its `events` row.
pub fn event_record(item: &CatalogItem, seen_at: DateTime<Utc>) -> EventRecord {
    let attrs = &item.attributes;
    let times = derive_times(attrs);
    let title = text(attrs, "title").unwrap_or_default();
    let channel = attrs.get("channel").and_then(Value::as_object);

    EventRecord {
        id: item.id.clone(),
        pvid: text(attrs, "providerVariantId"),
        slug: text(attrs, "slug"),
        title_brief: text(attrs, "titleBrief").or_else(|| Some(title.clone()).filter(|t| !t.is_empty())),
        title,
        synopsis: text(attrs, "synopsis"),
        synopsis_brief: text(attrs, "synopsisBrief"),
        channel_name: channel_name(attrs),
        channel_provider_id: channel.and_then(|c| text(c, "providerId")),
        airing_type: text(attrs, "airingType"),
        genres: genres(attrs),
        is_free: flag(attrs, "isFree"),
        is_premium: flag(attrs, "isPremium"),
        runtime_secs: attrs
            .get("runtime")
            .and_then(parse_runtime)
            .map(|r| r.num_seconds()),
        start: times.start,
        end: times.end,
        last_seen: seen_at,
        raw_attributes: attrs.clone(),
    }
}

/// `(type, url)` pairs from the item's `images`, `template` standing in
/// for a missing `url`.
pub fn item_images(item: &CatalogItem) -> Vec<(String, String)> {
    let Some(list) = item.attributes.get("images").and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .filter_map(Value::as_object)
        .filter_map(|img| {
            let kind = text(img, "type")?;
            let url = text(img, "url").or_else(|| text(img, "template"))?;
            Some((kind, url))
        })
        .collect()
}

/// Upsert every item and its images. A failing item is logged and skipped.
pub fn ingest_items(
    conn: &Connection,
    items: &[CatalogItem],
    seen_at: DateTime<Utc>,
) -> Result<IngestReport> {
    let mut report = IngestReport {
        items: items.len(),
        ..Default::default()
    };

    for item in items {
        let stored = events::upsert_event(conn, &event_record(item, seen_at)).and_then(|()| {
            let mut added = 0;
            for (kind, url) in item_images(item) {
                if images::insert_image(conn, &item.id, &kind, &url)? {
                    added += 1;
                }
            }
            Ok(added)
        });

        match stored {
            Ok(added) => {
                report.upserted += 1;
                report.images += added;
            }
            Err(e) => {
                tracing::warn!(item = %item.id, "Skipping catalog item: {}", e);
                report.skipped += 1;
            }
        }
    }

    tracing::info!(
        items = report.items,
        upserted = report.upserted,
        skipped = report.skipped,
        images = report.images,
        "Ingested catalog"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lanecast_db::pool::init_memory_pool;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn body() -> String {
        json!({
            "id": "root",
            "relationships": {"items": {"data": [
                {
                    "id": "evt-1",
                    "attributes": {
                        "title": "Derby",
                        "providerVariantId": "pv-1",
                        "displayStartTime": 1_792_400_400_000_i64,
                        "runtime": "01:30:00",
                        "channel": {"name": "Peacock", "providerId": "peacock-1"},
                        "genres": [{"title": "Soccer"}],
                        "isPremium": true,
                        "images": [
                            {"type": "landscape", "url": "https://img/l"},
                            {"type": "scene34", "template": "https://img/t/{width}"},
                            {"type": "broken"}
                        ]
                    }
                },
                {"attributes": {"title": "No id"}},
                {"id": "evt-2"}
            ]}}
        })
        .to_string()
    }

    #[test]
    fn parses_nodes_and_skips_missing_ids() {
        let items = parse_catalog(&body()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "evt-1");
        assert!(items[1].attributes.is_empty());
    }

    #[test]
    fn empty_or_partial_envelopes_yield_nothing() {
        assert!(parse_catalog("{}").unwrap().is_empty());
        assert!(parse_catalog(r#"{"relationships": null}"#).unwrap().is_empty());
        assert!(matches!(parse_catalog("not json"), Err(Error::Catalog(_))));
    }

    #[test]
    fn maps_attributes_onto_the_row() {
        let items = parse_catalog(&body()).unwrap();
        let record = event_record(&items[0], now());
        assert_eq!(record.pvid.as_deref(), Some("pv-1"));
        assert_eq!(record.title_brief.as_deref(), Some("Derby"));
        assert_eq!(record.channel_provider_id.as_deref(), Some("peacock-1"));
        assert_eq!(record.genres, vec!["Soccer"]);
        assert_eq!(record.runtime_secs, Some(5400));
        assert_eq!(record.start, Some(now()));
        assert_eq!(record.end, Some(now() + chrono::TimeDelta::minutes(90)));
        assert!(record.is_premium);
        assert!(!record.is_free);

        let imgs = item_images(&items[0]);
        assert_eq!(
            imgs,
            vec![
                ("landscape".to_string(), "https://img/l".to_string()),
                ("scene34".to_string(), "https://img/t/{width}".to_string()),
            ]
        );
    }

    #[test]
    fn ingest_is_idempotent() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let items = parse_catalog(&body()).unwrap();

        let first = ingest_items(&conn, &items, now()).unwrap();
        assert_eq!(first.upserted, 2);
        assert_eq!(first.images, 2);

        let second = ingest_items(&conn, &items, now()).unwrap();
        assert_eq!(second.upserted, 2);
        assert_eq!(second.images, 0);
        assert_eq!(events::count_events(&conn).unwrap(), 2);
    }

    #[test]
    fn headers_carry_slug_and_territory() {
        let config = CatalogConfig::default();
        let headers = catalog_headers(&config, "/sports/live-and-upcoming");
        assert!(headers.contains(&(
            "Referer",
            "https://www.peacocktv.com/sports/live-and-upcoming".to_string()
        )));
        assert!(headers.contains(&("X-SkyOTT-Territory", "US".to_string())));
    }
}
