//! HTTP implementation of [`BlobApi`] on top of reqwest.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::{BlobApi, ClientError, ClientResult};
use crate::blob::{encode_path, join_path, Blob, TreeNode};
use crate::settings::Settings;

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Total timeout in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 30;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("filesys/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Blob API client talking to the filesys HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HttpBlobApi {
    client: Client,
    files_url: String,
    folders_url: String,
    tree_url: String,
}

impl HttpBlobApi {
    /// Create a client for the endpoints named in `settings`.
    ///
    /// The endpoint URLs must be absolute.
    pub fn new(settings: &Settings) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Self::with_client(client, settings)
    }

    /// Create a client reusing an existing reqwest [`Client`].
    pub fn with_client(client: Client, settings: &Settings) -> ClientResult<Self> {
        Ok(Self {
            client,
            files_url: endpoint(&settings.files_url)?,
            folders_url: endpoint(&settings.folders_url)?,
            tree_url: endpoint(&settings.tree_url)?,
        })
    }

    /// Rename address: `{files_url}/{full_name}`.
    ///
    /// `full_name` is `/`-rooted, so the address carries a double slash
    /// (`/files//docs/a.txt`).
    pub fn update_url(&self, blob: &Blob) -> String {
        format!("{}/{}", self.files_url, encode_path(&blob.full_name))
    }

    /// Delete address: `{files_url}/{dir}/{name}`.
    pub fn delete_url(&self, blob: &Blob) -> String {
        format!(
            "{}/{}",
            self.files_url,
            encode_path(&join_path(&blob.dir, &blob.name))
        )
    }

    /// Listing address for `dir`; the root lists at `{folders_url}` itself.
    pub fn list_url(&self, dir: &str) -> String {
        let dir = dir.trim_matches('/');
        if dir.is_empty() {
            self.folders_url.clone()
        } else {
            format!("{}{}", self.folders_url, encode_path(&format!("/{dir}")))
        }
    }
}

impl BlobApi for HttpBlobApi {
    async fn update(&self, blob: &Blob, new_name: &str) -> ClientResult<Blob> {
        let url = self.update_url(blob);
        debug!(%url, new_name, "PATCH blob");

        let response = self
            .client
            .patch(&url)
            .json(&json!({ "name": new_name }))
            .send()
            .await?;

        Ok(check(response).await?.json::<Blob>().await?)
    }

    async fn delete(&self, blob: &Blob) -> ClientResult<bool> {
        let url = self.delete_url(blob);
        debug!(%url, "DELETE blob");

        let response = self.client.delete(&url).send().await?;
        let body = check(response).await?.text().await?;

        Ok(payload_truthy(&body))
    }

    async fn list(&self, dir: &str) -> ClientResult<Vec<Blob>> {
        let url = self.list_url(dir);
        debug!(%url, "GET folder");

        let response = self.client.get(&url).send().await?;
        Ok(check(response).await?.json::<Vec<Blob>>().await?)
    }

    async fn create_dir(&self, dir: &str, name: &str) -> ClientResult<Blob> {
        debug!(url = %self.folders_url, dir, name, "POST folder");

        let response = self
            .client
            .post(&self.folders_url)
            .json(&json!({ "dir": dir, "name": name }))
            .send()
            .await?;

        Ok(check(response).await?.json::<Blob>().await?)
    }

    async fn tree(&self) -> ClientResult<Vec<TreeNode>> {
        let response = self.client.get(&self.tree_url).send().await?;
        Ok(check(response).await?.json::<Vec<TreeNode>>().await?)
    }
}

/// Coerce a JSON value to a boolean the way a browser would.
///
/// `false`, `null`, `0` and `""` are false; everything else, including empty
/// arrays and objects, is true.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn payload_truthy(body: &str) -> bool {
    if body.is_empty() {
        return false;
    }
    // Bodies that are not JSON are taken as plain, non-empty strings.
    serde_json::from_str::<Value>(body)
        .map(|v| truthy(&v))
        .unwrap_or(true)
}

fn endpoint(raw: &str) -> ClientResult<String> {
    Url::parse(raw).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))?;
    Ok(raw.trim_end_matches('/').to_string())
}

async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::BlobKind;
    use crate::settings::Params;

    fn api() -> HttpBlobApi {
        let settings = Settings {
            files_url: "http://localhost:8080/files".to_string(),
            folders_url: "http://localhost:8080/folders/".to_string(),
            tree_url: "http://localhost:8080/tree".to_string(),
            dir_icon: String::new(),
            icon_dir: String::new(),
            params: Params::new(),
        };
        HttpBlobApi::new(&settings).unwrap()
    }

    fn file(dir: &str, name: &str) -> Blob {
        let mut blob = Blob::draft_dir(dir, name, "");
        blob.kind = BlobKind::File;
        blob
    }

    #[test]
    fn test_update_url_keeps_double_slash() {
        let blob = file("/docs", "a.txt");
        assert_eq!(api().update_url(&blob), "http://localhost:8080/files//docs/a.txt");
    }

    #[test]
    fn test_delete_url_addresses_same_resource() {
        let api = api();
        let blob = file("/docs", "a.txt");
        assert_eq!(api.delete_url(&blob), api.update_url(&blob));

        let root = file("/", "a.txt");
        assert_eq!(api.delete_url(&root), "http://localhost:8080/files//a.txt");
    }

    #[test]
    fn test_urls_encode_segments() {
        let blob = file("/my docs", "a b.txt");
        assert_eq!(
            api().update_url(&blob),
            "http://localhost:8080/files//my%20docs/a%20b.txt"
        );
    }

    #[test]
    fn test_list_url() {
        let api = api();
        assert_eq!(api.list_url("/"), "http://localhost:8080/folders");
        assert_eq!(api.list_url(""), "http://localhost:8080/folders");
        assert_eq!(api.list_url("/docs/2024"), "http://localhost:8080/folders/docs/2024");
        assert_eq!(api.list_url("docs"), "http://localhost:8080/folders/docs");
    }

    #[test]
    fn test_relative_endpoint_is_rejected() {
        let mut settings = Settings::from_config(&crate::Config::default(), "", Params::new());
        settings.files_url = "/files".to_string();
        assert!(matches!(
            HttpBlobApi::new(&settings),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_truthy() {
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!(0.0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!("0")));
        assert!(truthy(&json!([])));
        assert!(truthy(&json!({})));
    }

    #[test]
    fn test_payload_truthy() {
        assert!(payload_truthy("true"));
        assert!(!payload_truthy("false"));
        assert!(!payload_truthy(""));
        assert!(payload_truthy("deleted"));
    }
}
