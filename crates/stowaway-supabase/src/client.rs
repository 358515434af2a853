//! PostgREST implementation of the inventory backend.
//!
//! Row queries use PostgREST's embedded-resource selects, so the full
//! hierarchy and the location list each come back in one request. Counts use
//! head-only requests with `Prefer: count=exact`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use stowaway_core::{
    InventoryBackend, Item, ItemId, ItemPatch, NewItem, RecentItem, Result, Room, RoomId,
    RoomNode, SearchHit, Session, StorageUnit, StorageUnitId, UnitNode, UnitWithRoom,
};

use crate::config::SupabaseConfig;
use crate::error::SupabaseError;
use crate::runtime::block_on;

const HIERARCHY_SELECT: &str =
    "id,name,created_at,storage_units(id,name,room_id,created_at,items(*))";
const LOCATION_SELECT: &str = "id,name,room_id,created_at,rooms(name)";
const RECENT_SELECT: &str = "name,storage_units(rooms(name))";
const SEARCH_SELECT: &str = "id,name,quantity,category,image_url,storage_units(name,rooms(name))";

/// Blocking PostgREST client for the inventory tables.
pub struct SupabaseClient {
    http: Client,
    config: SupabaseConfig,
    access_token: Option<String>,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> std::result::Result<Self, SupabaseError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(SupabaseError::from)?;
        Ok(Self {
            http,
            config,
            access_token: None,
        })
    }

    /// Attach an authenticated session; row-level security policies see its
    /// user. Without one, requests run with the anon key alone.
    pub fn with_session(mut self, session: &Session) -> Self {
        self.access_token = session.access_token.clone();
        self
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.config.anon_key)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", self.bearer()))
    }

    fn table_url(
        &self,
        table: &str,
        params: &[(&str, &str)],
    ) -> std::result::Result<Url, SupabaseError> {
        Url::parse_with_params(&self.config.rest_url(table), params).map_err(|e| {
            SupabaseError::Request {
                message: e.to_string(),
            }
        })
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, &str)],
    ) -> std::result::Result<T, SupabaseError> {
        let url = self.table_url(table, params)?;
        let response = self.request(Method::GET, url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SupabaseError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(SupabaseError::from)
    }

    /// Insert rows and return the stored representation.
    async fn insert_returning<T: DeserializeOwned>(
        &self,
        table: &str,
        body: Value,
    ) -> std::result::Result<Vec<T>, SupabaseError> {
        let url = self.table_url(table, &[])?;
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SupabaseError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(SupabaseError::from)
    }

    /// Fire a PATCH or DELETE and discard the body.
    async fn write(
        &self,
        method: Method,
        table: &str,
        params: &[(&str, &str)],
        body: Option<Value>,
    ) -> std::result::Result<(), SupabaseError> {
        let url = self.table_url(table, params)?;
        let mut request = self.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Exact head-only count via the `content-range` header.
    async fn count(
        &self,
        table: &str,
        params: &[(&str, &str)],
    ) -> std::result::Result<usize, SupabaseError> {
        let url = self.table_url(table, params)?;
        let response = self
            .request(Method::HEAD, url)
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() && status != StatusCode::PARTIAL_CONTENT {
            return Err(SupabaseError::Status {
                status: status.as_u16(),
                body: String::new(),
            });
        }
        parse_content_range(response.headers())
    }

    async fn unit_ids_of_room(
        &self,
        room_id: RoomId,
    ) -> std::result::Result<Vec<StorageUnitId>, SupabaseError> {
        let rows: Vec<IdRow> = self
            .select(
                "storage_units",
                &[("select", "id"), ("room_id", &eq(room_id))],
            )
            .await?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }
}

fn eq(id: Uuid) -> String {
    format!("eq.{id}")
}

fn id_in(ids: &[Uuid]) -> String {
    let joined: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    format!("in.({})", joined.join(","))
}

fn parse_content_range(headers: &HeaderMap) -> std::result::Result<usize, SupabaseError> {
    let raw = headers
        .get("content-range")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| SupabaseError::Parse {
            message: "missing content-range header".into(),
        })?;
    raw.rsplit('/')
        .next()
        .and_then(|total| total.parse::<usize>().ok())
        .ok_or_else(|| SupabaseError::Parse {
            message: format!("unparsable content-range: {raw}"),
        })
}

fn patch_body(patch: &ItemPatch) -> Value {
    let mut body = serde_json::Map::new();
    if let Some(name) = &patch.name {
        body.insert("name".into(), json!(name));
    }
    if let Some(url) = &patch.image_url {
        body.insert("image_url".into(), json!(url));
    }
    if let Some(storage) = patch.storage_id {
        // Some(None) serializes to an explicit null, moving items to unsorted.
        body.insert("storage_id".into(), json!(storage));
    }
    Value::Object(body)
}

#[derive(Deserialize)]
struct IdRow {
    id: Uuid,
}

#[derive(Deserialize)]
struct NameRow {
    name: String,
}

#[derive(Deserialize)]
struct RoomRow {
    id: RoomId,
    name: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    storage_units: Vec<UnitRow>,
}

#[derive(Deserialize)]
struct UnitRow {
    id: StorageUnitId,
    name: String,
    room_id: RoomId,
    created_at: DateTime<Utc>,
    #[serde(default)]
    items: Vec<Item>,
}

impl UnitRow {
    fn into_unit(self) -> (StorageUnit, Vec<Item>) {
        (
            StorageUnit {
                id: self.id,
                name: self.name,
                room_id: self.room_id,
                created_at: self.created_at,
            },
            self.items,
        )
    }
}

impl RoomRow {
    fn into_node(self) -> RoomNode {
        RoomNode {
            room: Room {
                id: self.id,
                name: self.name,
                created_at: self.created_at,
            },
            units: self
                .storage_units
                .into_iter()
                .map(|row| {
                    let (unit, items) = row.into_unit();
                    UnitNode { unit, items }
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct LocationRow {
    id: StorageUnitId,
    name: String,
    room_id: RoomId,
    created_at: DateTime<Utc>,
    rooms: Option<NameRow>,
}

#[derive(Deserialize)]
struct RecentRow {
    name: String,
    storage_units: Option<RecentUnitRow>,
}

#[derive(Deserialize)]
struct SearchRow {
    id: ItemId,
    name: String,
    quantity: u32,
    category: String,
    image_url: Option<String>,
    storage_units: Option<SearchUnitRow>,
}

#[derive(Deserialize)]
struct SearchUnitRow {
    name: String,
    rooms: Option<NameRow>,
}

impl SearchRow {
    fn into_hit(self) -> SearchHit {
        let (unit_name, room_name) = match self.storage_units {
            Some(unit) => (Some(unit.name), unit.rooms.map(|r| r.name)),
            None => (None, None),
        };
        SearchHit {
            id: self.id,
            name: self.name,
            quantity: self.quantity,
            category: self.category,
            image_url: self.image_url,
            unit_name,
            room_name,
        }
    }
}

#[derive(Deserialize)]
struct RecentUnitRow {
    rooms: Option<NameRow>,
}

impl InventoryBackend for SupabaseClient {
    fn fetch_hierarchy(&self) -> Result<Vec<RoomNode>> {
        let rows: Vec<RoomRow> = block_on(self.select(
            "rooms",
            &[("select", HIERARCHY_SELECT), ("order", "created_at.desc")],
        ))?;
        Ok(rows.into_iter().map(RoomRow::into_node).collect())
    }

    fn fetch_unsorted(&self) -> Result<Vec<Item>> {
        Ok(block_on(self.select(
            "items",
            &[
                ("select", "*"),
                ("storage_id", "is.null"),
                ("order", "created_at.desc"),
            ],
        ))?)
    }

    fn fetch_storage_units(&self) -> Result<Vec<UnitWithRoom>> {
        let rows: Vec<LocationRow> = block_on(self.select(
            "storage_units",
            &[("select", LOCATION_SELECT), ("order", "created_at.desc")],
        ))?;
        Ok(rows
            .into_iter()
            .map(|row| UnitWithRoom {
                unit: StorageUnit {
                    id: row.id,
                    name: row.name,
                    room_id: row.room_id,
                    created_at: row.created_at,
                },
                room_name: row.rooms.map(|r| r.name),
            })
            .collect())
    }

    fn insert_room(&self, name: &str) -> Result<Room> {
        let mut rows: Vec<Room> =
            block_on(self.insert_returning("rooms", json!([{ "name": name }])))?;
        rows.pop().ok_or_else(|| SupabaseError::MissingRow.into())
    }

    fn insert_storage_unit(&self, name: &str, room_id: RoomId) -> Result<StorageUnit> {
        let mut rows: Vec<StorageUnit> = block_on(self.insert_returning(
            "storage_units",
            json!([{ "name": name, "room_id": room_id }]),
        ))?;
        rows.pop().ok_or_else(|| SupabaseError::MissingRow.into())
    }

    fn insert_items(&self, items: &[NewItem]) -> Result<Vec<Item>> {
        let body = serde_json::to_value(items).map_err(SupabaseError::from)?;
        Ok(block_on(self.insert_returning("items", body))?)
    }

    fn update_room_name(&self, id: RoomId, name: &str) -> Result<()> {
        Ok(block_on(self.write(
            Method::PATCH,
            "rooms",
            &[("id", &eq(id))],
            Some(json!({ "name": name })),
        ))?)
    }

    fn update_unit_name(&self, id: StorageUnitId, name: &str) -> Result<()> {
        Ok(block_on(self.write(
            Method::PATCH,
            "storage_units",
            &[("id", &eq(id))],
            Some(json!({ "name": name })),
        ))?)
    }

    fn update_items(&self, ids: &[ItemId], patch: &ItemPatch) -> Result<()> {
        if ids.is_empty() || patch.is_empty() {
            return Ok(());
        }
        Ok(block_on(self.write(
            Method::PATCH,
            "items",
            &[("id", &id_in(ids))],
            Some(patch_body(patch)),
        ))?)
    }

    fn delete_room(&self, id: RoomId) -> Result<()> {
        // Child units must go first; the rooms FK is not cascading.
        block_on(async {
            self.write(
                Method::DELETE,
                "storage_units",
                &[("room_id", &eq(id))],
                None,
            )
            .await?;
            self.write(Method::DELETE, "rooms", &[("id", &eq(id))], None)
                .await
        })?;
        Ok(())
    }

    fn delete_storage_unit(&self, id: StorageUnitId) -> Result<()> {
        Ok(block_on(self.write(
            Method::DELETE,
            "storage_units",
            &[("id", &eq(id))],
            None,
        ))?)
    }

    fn delete_items(&self, ids: &[ItemId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        Ok(block_on(self.write(
            Method::DELETE,
            "items",
            &[("id", &id_in(ids))],
            None,
        ))?)
    }

    fn count_items_in_room(&self, id: RoomId) -> Result<usize> {
        Ok(block_on(async {
            let units = self.unit_ids_of_room(id).await?;
            if units.is_empty() {
                return Ok(0);
            }
            self.count(
                "items",
                &[("select", "id"), ("storage_id", &id_in(&units))],
            )
            .await
        })?)
    }

    fn count_items_in_unit(&self, id: StorageUnitId) -> Result<usize> {
        Ok(block_on(self.count(
            "items",
            &[("select", "id"), ("storage_id", &eq(id))],
        ))?)
    }

    fn count_all_items(&self) -> Result<usize> {
        Ok(block_on(self.count("items", &[("select", "id")]))?)
    }

    fn item_ids_in_room(&self, id: RoomId) -> Result<Vec<ItemId>> {
        Ok(block_on(async {
            let units = self.unit_ids_of_room(id).await?;
            if units.is_empty() {
                return Ok::<_, SupabaseError>(Vec::new());
            }
            let rows: Vec<IdRow> = self
                .select(
                    "items",
                    &[("select", "id"), ("storage_id", &id_in(&units))],
                )
                .await?;
            Ok(rows.into_iter().map(|r| r.id).collect())
        })?)
    }

    fn item_ids_in_unit(&self, id: StorageUnitId) -> Result<Vec<ItemId>> {
        let rows: Vec<IdRow> = block_on(self.select(
            "items",
            &[("select", "id"), ("storage_id", &eq(id))],
        ))?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    fn recent_items(&self, limit: usize) -> Result<Vec<RecentItem>> {
        let limit = limit.to_string();
        let rows: Vec<RecentRow> = block_on(self.select(
            "items",
            &[
                ("select", RECENT_SELECT),
                ("order", "created_at.desc"),
                ("limit", &limit),
            ],
        ))?;
        Ok(rows
            .into_iter()
            .map(|row| RecentItem {
                name: row.name,
                room_name: row
                    .storage_units
                    .and_then(|unit| unit.rooms)
                    .map(|room| room.name),
            })
            .collect())
    }

    fn search_items(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let limit = limit.to_string();
        // PostgREST translates `*` to the SQL `%` wildcard.
        let pattern = format!("ilike.*{query}*");
        let rows: Vec<SearchRow> = block_on(self.select(
            "items",
            &[
                ("select", SEARCH_SELECT),
                ("name", &pattern),
                ("limit", &limit),
            ],
        ))?;
        Ok(rows.into_iter().map(SearchRow::into_hit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_in_joins_comma_separated() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(id_in(&[a, b]), format!("in.({a},{b})"));
    }

    #[test]
    fn patch_body_emits_explicit_null_for_unsorted() {
        let body = patch_body(&ItemPatch::move_to(None));
        assert!(body["storage_id"].is_null());
        assert!(body.get("name").is_none());

        let dest = Uuid::new_v4();
        let body = patch_body(&ItemPatch::move_to(Some(dest)));
        assert_eq!(body["storage_id"], json!(dest));
    }

    #[test]
    fn content_range_total_is_after_the_slash() {
        let mut headers = HeaderMap::new();
        headers.insert("content-range", "0-24/3573".parse().unwrap());
        assert_eq!(parse_content_range(&headers).unwrap(), 3573);

        headers.insert("content-range", "*/0".parse().unwrap());
        assert_eq!(parse_content_range(&headers).unwrap(), 0);
    }

    #[test]
    fn hierarchy_rows_deserialize_from_nested_select() {
        let body = serde_json::json!([{
            "id": Uuid::new_v4(),
            "name": "Office",
            "created_at": "2026-01-10T12:00:00Z",
            "storage_units": [{
                "id": Uuid::new_v4(),
                "name": "Shelf A",
                "room_id": Uuid::new_v4(),
                "created_at": "2026-01-10T12:01:00Z",
                "items": []
            }]
        }]);
        let rows: Vec<RoomRow> = serde_json::from_value(body).unwrap();
        let node = rows.into_iter().next().unwrap().into_node();
        assert_eq!(node.room.name, "Office");
        assert_eq!(node.units.len(), 1);
        assert_eq!(node.item_count(), 0);
    }

    #[test]
    fn search_rows_resolve_location_names() {
        let body = serde_json::json!([
            {
                "id": Uuid::new_v4(),
                "name": "Fountain Pen",
                "quantity": 1,
                "category": "Stationery",
                "image_url": null,
                "storage_units": { "name": "Desk Drawer", "rooms": { "name": "Office" } }
            },
            {
                "id": Uuid::new_v4(),
                "name": "Loose pencil",
                "quantity": 2,
                "category": "Stationery",
                "image_url": null,
                "storage_units": null
            }
        ]);
        let rows: Vec<SearchRow> = serde_json::from_value(body).unwrap();
        let hits: Vec<SearchHit> = rows.into_iter().map(SearchRow::into_hit).collect();
        assert_eq!(hits[0].unit_name.as_deref(), Some("Desk Drawer"));
        assert_eq!(hits[0].room_name.as_deref(), Some("Office"));
        assert!(hits[1].unit_name.is_none());
        assert!(hits[1].room_name.is_none());
    }

    #[test]
    fn recent_rows_tolerate_missing_joins() {
        let body = serde_json::json!([
            { "name": "Loose whisk", "storage_units": null },
            { "name": "Mixer", "storage_units": { "rooms": { "name": "Kitchen" } } }
        ]);
        let rows: Vec<RecentRow> = serde_json::from_value(body).unwrap();
        assert!(rows[0].storage_units.is_none());
        assert_eq!(
            rows[1]
                .storage_units
                .as_ref()
                .and_then(|u| u.rooms.as_ref())
                .map(|r| r.name.as_str()),
            Some("Kitchen")
        );
    }
}
