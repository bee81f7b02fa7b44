//! REST backend: object storage buckets plus row tables.
//!
//! Objects live at `/storage/v1/object/{bucket}/{name}` and are served
//! publicly from `/storage/v1/object/public/{bucket}/{name}`. Rows live at
//! `/rest/v1/{table}` with filter query parameters (`id=eq.…`). Every request
//! carries the API key both as `apikey` and as a bearer token.

use std::time::Duration;

use booth_common::config::BackendConfig;
use booth_common::{BoothError, BoothResult};
use booth_model::recipient::RecipientNumber;
use booth_model::records::{page_range, CustomSticker, GalleryPage, SavedPhoto};
use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gallery::GalleryStore;
use crate::stickers::{validate_sticker_file, StickerFile, StickerStore, UploadReport};

const CONNECT_TIMEOUT_SECS: u64 = 10;
/// Never matches a real row; used to delete every row.
const NIL_ID: &str = "00000000-0000-0000-0000-000000000000";

type WireResult<T> = Result<T, String>;

#[derive(Debug, Deserialize)]
struct PhotoRow {
    id: String,
    created_at: DateTime<Utc>,
    storage_path: Option<String>,
    #[serde(default)]
    full_size_path: Option<String>,
    #[serde(default)]
    recipient_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoPaths {
    storage_path: Option<String>,
    #[serde(default)]
    full_size_path: Option<String>,
}

#[derive(Serialize)]
struct NewPhotoRow<'a> {
    id: &'a str,
    storage_path: String,
    full_size_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient_number: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct StickerRow {
    id: String,
    name: String,
    image_url: String,
    file_type: String,
    created_at: DateTime<Utc>,
}

impl From<StickerRow> for CustomSticker {
    fn from(row: StickerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            url: row.image_url,
            mime_type: row.file_type,
            created_at: row.created_at,
        }
    }
}

#[derive(Serialize)]
struct NewStickerRow<'a> {
    name: &'a str,
    image_url: &'a str,
    file_type: &'a str,
}

/// Gallery and sticker store backed by a storage/row REST API.
pub struct RestBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    photos_bucket: String,
    stickers_bucket: String,
    stickers_table: String,
}

impl RestBackend {
    pub fn from_config(config: &BackendConfig) -> BoothResult<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| BoothError::config("backend base URL is not configured"))?
            .trim_end_matches('/')
            .to_string();
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| BoothError::config("backend API key is not configured"))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| BoothError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            api_key,
            photos_bucket: config.photos_bucket.clone(),
            stickers_bucket: config.stickers_bucket.clone(),
            stickers_table: config.stickers_table.clone(),
        })
    }

    pub fn public_url(&self, bucket: &str, name: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{name}", self.base_url)
    }

    fn object_url(&self, bucket: &str, name: &str) -> String {
        format!("{}/storage/v1/object/{bucket}/{name}", self.base_url)
    }

    fn rows_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn upload_object(
        &self,
        bucket: &str,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> WireResult<()> {
        let request = self
            .http
            .post(self.object_url(bucket, name))
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(bytes);
        send(self.authed(request)).await.map(drop)
    }

    async fn remove_objects(&self, bucket: &str, names: &[String]) -> WireResult<()> {
        if names.is_empty() {
            return Ok(());
        }
        let request = self
            .http
            .delete(format!("{}/storage/v1/object/{bucket}", self.base_url))
            .json(&serde_json::json!({ "prefixes": names }));
        send(self.authed(request)).await.map(drop)
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, &str)]) -> WireResult<Vec<T>> {
        let request = self.http.get(self.rows_url(table)).query(query);
        let response = send(self.authed(request)).await?;
        response.json().await.map_err(|e| e.to_string())
    }

    async fn insert<T: DeserializeOwned>(&self, table: &str, row: &impl Serialize) -> WireResult<T> {
        let request = self
            .http
            .post(self.rows_url(table))
            .header("Prefer", "return=representation")
            .json(row);
        let response = send(self.authed(request)).await?;
        let mut rows: Vec<T> = response.json().await.map_err(|e| e.to_string())?;
        if rows.is_empty() {
            return Err("insert returned no row".to_string());
        }
        Ok(rows.swap_remove(0))
    }

    async fn delete_rows(&self, table: &str, filter: (&str, &str)) -> WireResult<()> {
        let request = self.http.delete(self.rows_url(table)).query(&[filter]);
        send(self.authed(request)).await.map(drop)
    }

    fn saved_photo(&self, row: PhotoRow) -> SavedPhoto {
        let preview = row
            .storage_path
            .as_deref()
            .map(|p| self.public_url(&self.photos_bucket, object_name(&self.photos_bucket, p)))
            .unwrap_or_default();
        SavedPhoto {
            id: row.id,
            created_at: row.created_at,
            preview_url: preview,
            full_size_url: row
                .full_size_path
                .as_deref()
                .map(|p| self.public_url(&self.photos_bucket, object_name(&self.photos_bucket, p))),
            recipient: row
                .recipient_number
                .as_deref()
                .and_then(|n| RecipientNumber::parse(n).ok()),
        }
    }

    fn object_names(&self, paths: &[PhotoPaths]) -> Vec<String> {
        paths
            .iter()
            .flat_map(|p| [p.storage_path.as_deref(), p.full_size_path.as_deref()])
            .flatten()
            .map(|p| object_name(&self.photos_bucket, p).to_string())
            .collect()
    }
}

#[async_trait::async_trait]
impl GalleryStore for RestBackend {
    async fn save(
        &self,
        png: Vec<u8>,
        preview: Vec<u8>,
        recipient: Option<RecipientNumber>,
    ) -> BoothResult<SavedPhoto> {
        let id = Uuid::new_v4().to_string();
        let bucket = &self.photos_bucket;
        let preview_name = format!("{id}.jpg");
        let full_name = format!("{id}.png");
        let fail = |step: &str, e: String| {
            tracing::error!(operation = "gallery.save", id = %id, step, error = %e, "Failed to save photo");
            BoothError::gallery(format!("{step} failed: {e}"))
        };

        self.upload_object(bucket, &preview_name, "image/jpeg", preview)
            .await
            .map_err(|e| fail("preview upload", e))?;
        if let Err(e) = self.upload_object(bucket, &full_name, "image/png", png).await {
            if let Err(cleanup) = self.remove_objects(bucket, &[preview_name]).await {
                tracing::warn!(operation = "gallery.save", id = %id, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(fail("full-size upload", e));
        }

        let row = NewPhotoRow {
            id: &id,
            storage_path: format!("{bucket}/{preview_name}"),
            full_size_path: format!("{bucket}/{full_name}"),
            recipient_number: recipient.as_ref().map(RecipientNumber::digits),
        };
        match self.insert::<PhotoRow>(bucket, &row).await {
            Ok(row) => {
                tracing::info!(operation = "gallery.save", id = %row.id, "Photo saved");
                Ok(self.saved_photo(row))
            }
            Err(e) => {
                if let Err(cleanup) = self.remove_objects(bucket, &[preview_name, full_name]).await {
                    tracing::warn!(operation = "gallery.save", id = %id, error = %cleanup, "Failed to remove orphaned upload");
                }
                Err(fail("metadata insert", e))
            }
        }
    }

    async fn list(&self, page: u32, page_size: u32) -> BoothResult<GalleryPage> {
        let (start, end) = page_range(page, page_size);
        let request = self
            .http
            .get(self.rows_url(&self.photos_bucket))
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .header("Range-Unit", "items")
            .header("Range", format!("{start}-{end}"))
            .header("Prefer", "count=exact");
        let fail = |e: String| {
            tracing::error!(operation = "gallery.list", page, error = %e, "Failed to fetch gallery");
            BoothError::gallery(e)
        };

        let response = self
            .authed(request)
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;
        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        // Past the last page the range is unsatisfiable; that is an empty page.
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(GalleryPage::new(Vec::new(), total.unwrap_or(0), page, page_size));
        }
        let response = check(response).await.map_err(fail)?;
        let rows: Vec<PhotoRow> = response.json().await.map_err(|e| fail(e.to_string()))?;
        let total = total.unwrap_or(start + rows.len() as u64);
        let items = rows.into_iter().map(|row| self.saved_photo(row)).collect();
        Ok(GalleryPage::new(items, total, page, page_size))
    }

    async fn delete(&self, id: &str) -> BoothResult<()> {
        let filter = format!("eq.{id}");
        let fail = |e: String| {
            tracing::error!(operation = "gallery.delete", id, error = %e, "Failed to delete photo");
            BoothError::gallery(e)
        };

        let paths: Vec<PhotoPaths> = self
            .select(
                &self.photos_bucket,
                &[("select", "storage_path,full_size_path"), ("id", filter.as_str())],
            )
            .await
            .map_err(fail)?;
        if paths.is_empty() {
            return Err(BoothError::not_found(format!("photo {id}")));
        }
        if let Err(e) = self.remove_objects(&self.photos_bucket, &self.object_names(&paths)).await {
            tracing::warn!(operation = "gallery.delete", id, error = %e, "Failed to remove stored images");
        }
        self.delete_rows(&self.photos_bucket, ("id", filter.as_str()))
            .await
            .map_err(fail)?;
        tracing::info!(operation = "gallery.delete", id, "Photo deleted");
        Ok(())
    }

    async fn delete_all(&self) -> BoothResult<()> {
        let fail = |e: String| {
            tracing::error!(operation = "gallery.delete_all", error = %e, "Failed to clear gallery");
            BoothError::gallery(e)
        };
        let paths: Vec<PhotoPaths> = self
            .select(&self.photos_bucket, &[("select", "storage_path,full_size_path")])
            .await
            .map_err(fail)?;
        if let Err(e) = self.remove_objects(&self.photos_bucket, &self.object_names(&paths)).await {
            tracing::warn!(operation = "gallery.delete_all", error = %e, "Failed to remove stored images");
        }
        let filter = format!("neq.{NIL_ID}");
        self.delete_rows(&self.photos_bucket, ("id", filter.as_str()))
            .await
            .map_err(fail)?;
        tracing::info!(operation = "gallery.delete_all", removed = paths.len(), "Gallery cleared");
        Ok(())
    }
}

#[async_trait::async_trait]
impl StickerStore for RestBackend {
    async fn list_custom(&self) -> BoothResult<Vec<CustomSticker>> {
        let rows: Vec<StickerRow> = self
            .select(
                &self.stickers_table,
                &[("select", "*"), ("order", "created_at.desc")],
            )
            .await
            .map_err(|e| {
                tracing::error!(operation = "stickers.list", error = %e, "Failed to fetch custom stickers");
                BoothError::stickers(e)
            })?;
        Ok(rows.into_iter().map(CustomSticker::from).collect())
    }

    async fn upload(&self, files: Vec<StickerFile>) -> UploadReport {
        let mut report = UploadReport::default();
        for file in files {
            if let Err(e) = validate_sticker_file(&file) {
                report.reject(&file, &e);
                continue;
            }

            let object = sticker_object_name(&file, Utc::now());
            if let Err(e) = self
                .upload_object(&self.stickers_bucket, &object, &file.mime_type, file.bytes.clone())
                .await
            {
                tracing::error!(operation = "stickers.upload", file = %file.name, error = %e, "Failed to upload sticker");
                report.reject(&file, &BoothError::stickers(e));
                continue;
            }

            let url = self.public_url(&self.stickers_bucket, &object);
            let row = NewStickerRow {
                name: &file.name,
                image_url: &url,
                file_type: &file.mime_type,
            };
            match self.insert::<StickerRow>(&self.stickers_table, &row).await {
                Ok(row) => {
                    tracing::info!(operation = "stickers.upload", id = %row.id, file = %file.name, "Sticker uploaded");
                    report.succeeded.push(row.into());
                }
                Err(e) => {
                    if let Err(cleanup) = self.remove_objects(&self.stickers_bucket, &[object]).await {
                        tracing::warn!(operation = "stickers.upload", file = %file.name, error = %cleanup, "Failed to remove orphaned upload");
                    }
                    tracing::error!(operation = "stickers.upload", file = %file.name, error = %e, "Failed to record sticker");
                    report.reject(&file, &BoothError::stickers(e));
                }
            }
        }
        report
    }

    async fn delete(&self, sticker: &CustomSticker) -> bool {
        let object = url_file_name(&sticker.url).to_string();
        if let Err(e) = self.remove_objects(&self.stickers_bucket, &[object]).await {
            tracing::warn!(operation = "stickers.delete", id = %sticker.id, error = %e, "Failed to remove sticker file");
        }
        let filter = format!("eq.{}", sticker.id);
        match self.delete_rows(&self.stickers_table, ("id", filter.as_str())).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(operation = "stickers.delete", id = %sticker.id, error = %e, "Failed to delete sticker");
                false
            }
        }
    }
}

async fn send(request: RequestBuilder) -> WireResult<Response> {
    let response = request.send().await.map_err(|e| e.to_string())?;
    check(response).await
}

async fn check(response: Response) -> WireResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(format!("HTTP {}: {}", status.as_u16(), body.trim()))
}

/// Total row count from a `Content-Range` header (`0-19/57`, `*/0`).
pub fn parse_content_range(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}

/// Object name inside `bucket` for a stored path that may carry the bucket prefix.
fn object_name<'a>(bucket: &str, path: &'a str) -> &'a str {
    path.strip_prefix(bucket)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path)
}

/// Last path segment of a public URL.
fn url_file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

fn sticker_object_name(file: &StickerFile, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}.{}", now.timestamp_millis(), &suffix[..8], file.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn backend() -> RestBackend {
        let config = BackendConfig {
            base_url: Some("https://store.example.co/".to_string()),
            api_key: Some("anon".to_string()),
            ..BackendConfig::default()
        };
        RestBackend::from_config(&config).unwrap()
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-19/57"), Some(57));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-19/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_from_config_requires_url_and_key() {
        assert!(matches!(
            RestBackend::from_config(&BackendConfig::default()),
            Err(BoothError::Config { .. })
        ));
        let b = backend();
        assert_eq!(b.base_url, "https://store.example.co");
        assert_eq!(
            b.public_url("photos", "a.jpg"),
            "https://store.example.co/storage/v1/object/public/photos/a.jpg"
        );
        assert_eq!(b.rows_url("custom_stickers"), "https://store.example.co/rest/v1/custom_stickers");
    }

    #[test]
    fn test_photo_row_maps_to_public_urls() {
        let b = backend();
        let row: PhotoRow = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "created_at": "2026-01-02T03:04:05Z",
            "storage_path": "photos/abc.jpg",
            "full_size_path": "photos/abc.png",
            "recipient_number": "5551234567"
        }))
        .unwrap();
        let photo = b.saved_photo(row);
        assert!(photo.preview_url.ends_with("/public/photos/abc.jpg"));
        assert!(photo.full_size_url.unwrap().ends_with("/public/photos/abc.png"));
        assert_eq!(photo.recipient.unwrap().digits(), "5551234567");
    }

    #[test]
    fn test_object_names_strip_bucket_prefix() {
        let b = backend();
        let names = b.object_names(&[
            PhotoPaths {
                storage_path: Some("photos/a.jpg".into()),
                full_size_path: Some("photos/a.png".into()),
            },
            PhotoPaths {
                storage_path: Some("legacy.jpg".into()),
                full_size_path: None,
            },
        ]);
        assert_eq!(names, vec!["a.jpg", "a.png", "legacy.jpg"]);
    }

    #[test]
    fn test_sticker_object_name() {
        let file = StickerFile::new("Big Crab.PNG", "image/png", vec![]);
        let now = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let name = sticker_object_name(&file, now);
        assert!(name.starts_with(&format!("{}-", now.timestamp_millis())));
        assert!(name.ends_with(".png"));
        assert_eq!(url_file_name("https://x/storage/v1/object/public/stickers/1-ab.png"), "1-ab.png");
    }

    /// Serve one request per status, in order, recording each request line.
    async fn scripted_server(statuses: Vec<u16>) -> (RestBackend, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = BackendConfig {
            base_url: Some(format!("http://{}", listener.local_addr().unwrap())),
            api_key: Some("anon".to_string()),
            ..BackendConfig::default()
        };
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        tokio::spawn(async move {
            for status in statuses {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let line = read_request_line(&mut stream).await;
                log.lock().unwrap().push(line);
                let reply = format!(
                    "HTTP/1.1 {status} Scripted\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{{}}"
                );
                stream.write_all(reply.as_bytes()).await.unwrap();
                let _ = stream.shutdown().await;
            }
        });
        (RestBackend::from_config(&config).unwrap(), seen)
    }

    /// Drain one request and return its `METHOD path` prefix.
    async fn read_request_line(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                if n == 0 {
                    break;
                }
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_string();
            let length = head
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < end + 4 + length {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let line = head.lines().next().unwrap_or_default();
            return line.rsplit_once(' ').map(|(l, _)| l).unwrap_or(line).to_string();
        }
        String::new()
    }

    #[tokio::test]
    async fn test_failed_full_size_upload_removes_preview() {
        let (b, seen) = scripted_server(vec![200, 500, 500]).await;
        let err = b
            .save(vec![1, 2, 3], vec![4, 5], None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("full-size upload failed"), "{err}");

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].starts_with("POST /storage/v1/object/photos/") && seen[0].ends_with(".jpg"));
        assert!(seen[1].ends_with(".png"));
        assert_eq!(seen[2], "DELETE /storage/v1/object/photos");
    }

    #[tokio::test]
    async fn test_failed_sticker_insert_removes_object() {
        let (b, seen) = scripted_server(vec![200, 500, 500]).await;
        let report = b
            .upload(vec![StickerFile::new("crab.png", "image/png", vec![1, 2, 3])])
            .await;
        assert!(report.succeeded.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].file, "crab.png");

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].starts_with("POST /storage/v1/object/stickers/"));
        assert_eq!(seen[1], "POST /rest/v1/custom_stickers");
        assert_eq!(seen[2], "DELETE /storage/v1/object/stickers");
    }
}
