//! HTTP client for the collection service

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::api::ApiError;
use crate::config::Config;
use crate::models::Submission;

/// Outbound calls made by the submission pipeline
#[async_trait]
pub trait CollectionApi: Send + Sync {
    /// Send the non-file fields plus every attached file as multipart
    async fn upload_files(&self, submission: &Submission) -> Result<Value, ApiError>;

    /// Send the full submission, file metadata included, as JSON
    async fn submit_form_data(&self, submission: &Submission) -> Result<Value, ApiError>;
}

/// reqwest-backed client for `{base}/upload` and `{base}/submit`
#[derive(Debug, Clone)]
pub struct HttpCollectionClient {
    client: Client,
    upload_url: String,
    submit_url: String,
}

impl HttpCollectionClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent(&config.http.user_agent);
        if let Some(timeout) = config.http_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            upload_url: config.endpoint("upload"),
            submit_url: config.endpoint("submit"),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    pub fn submit_url(&self) -> &str {
        &self.submit_url
    }

    /// Multipart body: one `data` text part, then a `files` part per attached file
    async fn build_upload_form(submission: &Submission) -> Result<Form, ApiError> {
        let data = serde_json::to_string(&submission.personal_details())?;
        let mut form = Form::new().text("data", data);

        for file in submission.documents.iter().filter_map(|d| d.file.as_ref()) {
            let bytes = tokio::fs::read(&file.path)
                .await
                .map_err(|source| ApiError::Attachment {
                    path: file.path.clone(),
                    source,
                })?;
            debug!("Attaching {} ({} bytes, {})", file.name, bytes.len(), file.content_type);

            let part = Part::bytes(bytes)
                .file_name(file.name.clone())
                .mime_str(&file.content_type)?;
            form = form.part("files", part);
        }

        Ok(form)
    }
}

#[async_trait]
impl CollectionApi for HttpCollectionClient {
    async fn upload_files(&self, submission: &Submission) -> Result<Value, ApiError> {
        let form = Self::build_upload_form(submission).await?;
        info!("Uploading documents to {}", self.upload_url);

        let response = self.client.post(&self.upload_url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::UploadFailed {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Value>().await?)
    }

    async fn submit_form_data(&self, submission: &Submission) -> Result<Value, ApiError> {
        info!("Submitting form data to {}", self.submit_url);

        let response = self.client.post(&self.submit_url).json(submission).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::SubmitFailed {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Document, FileRef, FileType};
    use axum::{
        extract::{Multipart, State},
        http::StatusCode,
        routing::post,
        Json, Router,
    };
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Debug, Clone)]
    struct RecordedPart {
        name: String,
        file_name: Option<String>,
        content_type: Option<String>,
        body: Vec<u8>,
    }

    #[derive(Clone)]
    struct Service {
        upload_status: StatusCode,
        submit_status: StatusCode,
        parts: Arc<Mutex<Vec<RecordedPart>>>,
        submitted: Arc<Mutex<Vec<Value>>>,
    }

    impl Service {
        fn new(upload_status: StatusCode, submit_status: StatusCode) -> Self {
            Self {
                upload_status,
                submit_status,
                parts: Arc::new(Mutex::new(Vec::new())),
                submitted: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    async fn upload(State(service): State<Service>, mut multipart: Multipart) -> (StatusCode, Json<Value>) {
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let body = field.bytes().await.unwrap().to_vec();
            service.parts.lock().unwrap().push(RecordedPart {
                name,
                file_name,
                content_type,
                body,
            });
        }
        (service.upload_status, Json(serde_json::json!({ "uploaded": true })))
    }

    async fn submit(State(service): State<Service>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        service.submitted.lock().unwrap().push(body);
        (service.submit_status, Json(serde_json::json!({ "id": 1 })))
    }

    async fn serve(service: Service) -> Config {
        let app = Router::new()
            .route("/api/upload", post(upload))
            .route("/api/submit", post(submit))
            .with_state(service);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Config::default().with_base_url(Some(format!("http://{}/api", addr)))
    }

    fn submission_with_files(dir: &TempDir) -> Submission {
        let png = dir.path().join("passport.png");
        let pdf = dir.path().join("bill.pdf");
        std::fs::write(&png, b"png-bytes").unwrap();
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        Submission {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            residential_street1: "123 Main St".to_string(),
            same_as_residential: true,
            documents: vec![
                Document {
                    file_name: "Passport".to_string(),
                    file_type: FileType::Image,
                    file: Some(FileRef::from_path(&png).unwrap()),
                },
                Document {
                    file_name: "Utility bill".to_string(),
                    file_type: FileType::Pdf,
                    file: Some(FileRef::from_path(&pdf).unwrap()),
                },
                Document {
                    file_name: "Not attached yet".to_string(),
                    file_type: FileType::Image,
                    file: None,
                },
            ],
            ..Submission::new(today)
        }
    }

    #[tokio::test]
    async fn test_upload_sends_data_and_files_parts() {
        let service = Service::new(StatusCode::OK, StatusCode::OK);
        let config = serve(service.clone()).await;
        let client = HttpCollectionClient::new(&config).unwrap();
        let dir = TempDir::new().unwrap();

        let response = client.upload_files(&submission_with_files(&dir)).await.unwrap();
        assert_eq!(response["uploaded"], true);

        let parts = service.parts.lock().unwrap().clone();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].name, "data");
        let data: Value = serde_json::from_slice(&parts[0].body).unwrap();
        assert_eq!(data["firstName"], "Jane");
        assert_eq!(data["dateOfBirth"], "2000-01-01");
        assert!(data.get("documents").is_none());

        assert_eq!(parts[1].name, "files");
        assert_eq!(parts[1].file_name.as_deref(), Some("passport.png"));
        assert_eq!(parts[1].content_type.as_deref(), Some("image/png"));
        assert_eq!(parts[1].body, b"png-bytes");
        assert_eq!(parts[2].file_name.as_deref(), Some("bill.pdf"));
        assert_eq!(parts[2].content_type.as_deref(), Some("application/pdf"));
    }

    #[tokio::test]
    async fn test_submit_sends_metadata_not_bytes() {
        let service = Service::new(StatusCode::OK, StatusCode::CREATED);
        let config = serve(service.clone()).await;
        let client = HttpCollectionClient::new(&config).unwrap();
        let dir = TempDir::new().unwrap();

        let response = client.submit_form_data(&submission_with_files(&dir)).await.unwrap();
        assert_eq!(response["id"], 1);

        let submitted = service.submitted.lock().unwrap().clone();
        assert_eq!(submitted.len(), 1);
        let body = &submitted[0];
        assert_eq!(body["documents"].as_array().unwrap().len(), 3);
        assert_eq!(body["documents"][1]["fileType"], "pdf");
        assert_eq!(body["documents"][1]["file"]["name"], "bill.pdf");
        assert_eq!(body["documents"][1]["file"]["size"], 8);
        assert!(body["documents"][2].get("file").is_none());
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_errors() {
        let service = Service::new(StatusCode::INTERNAL_SERVER_ERROR, StatusCode::BAD_REQUEST);
        let config = serve(service).await;
        let client = HttpCollectionClient::new(&config).unwrap();
        let dir = TempDir::new().unwrap();
        let submission = submission_with_files(&dir);

        let err = client.upload_files(&submission).await.unwrap_err();
        assert!(matches!(err, ApiError::UploadFailed { status: 500 }));
        assert_eq!(err.status(), Some(500));

        let err = client.submit_form_data(&submission).await.unwrap_err();
        assert!(matches!(err, ApiError::SubmitFailed { status: 400 }));
    }

    #[tokio::test]
    async fn test_missing_attachment_fails_before_request() {
        let service = Service::new(StatusCode::OK, StatusCode::OK);
        let config = serve(service.clone()).await;
        let client = HttpCollectionClient::new(&config).unwrap();
        let dir = TempDir::new().unwrap();
        let submission = submission_with_files(&dir);
        std::fs::remove_file(dir.path().join("bill.pdf")).unwrap();

        let err = client.upload_files(&submission).await.unwrap_err();
        assert!(matches!(err, ApiError::Attachment { .. }));
        assert!(service.parts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_endpoints_from_config() {
        let config = Config::default();
        let client = HttpCollectionClient::new(&config).unwrap();
        assert_eq!(client.upload_url(), "http://localhost:3001/api/upload");
        assert_eq!(client.submit_url(), "http://localhost:3001/api/submit");
    }
}
