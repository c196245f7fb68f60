pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::state::AppState;
use crate::upload::handlers as upload;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Auth API
        .route("/api/v1/signup", post(auth::handle_signup))
        .route("/api/v1/login", post(auth::handle_login))
        // Upload API
        .route("/api/v1/upload", post(upload::handle_upload))
        .route("/api/v1/resumes", get(upload::handle_get_resume))
        .route("/api/v1/jobs", get(upload::handle_list_jobs))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::jobs::JobCatalog;
    use crate::auth::credentials::CredentialStore;
    use crate::config::Config;
    use crate::db::test_pool;
    use crate::upload::extract::single_page_pdf;
    use crate::upload::storage::LocalUploadStore;

    const BOUNDARY: &str = "skillmatch-test-boundary";

    struct TestApp {
        router: Router,
        _dir: TempDir,
    }

    async fn test_app_with_limit(max_upload_bytes: Option<&str>) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let limit = max_upload_bytes.map(str::to_string);
        let config = Config::from_lookup(move |key| match key {
            "MAX_UPLOAD_BYTES" => limit.clone(),
            _ => None,
        })
        .unwrap();

        let uploads = LocalUploadStore::open(dir.path().join("uploads"))
            .await
            .unwrap();
        let state = AppState {
            db: test_pool().await,
            credentials: Arc::new(CredentialStore::new(dir.path().join("users.txt"))),
            uploads: Arc::new(uploads),
            catalog: Arc::new(JobCatalog::builtin()),
            config,
        };

        TestApp {
            router: build_router(state),
            _dir: dir,
        }
    }

    async fn test_app() -> TestApp {
        test_app_with_limit(None).await
    }

    async fn send(app: &TestApp, request: Request<Body>) -> Response {
        app.router.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn multipart_request(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, contents)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(contents);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    const RESUME_TXT: &[u8] = b"Ada Lovelace\n\
        Software engineer with Python, SQL and Git experience.\n\
        Wrote testing tools for Linux servers.";

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let response = send(&app, get_request("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let app = test_app().await;
        let signup = json!({"name": "Ada", "email": "Ada@Example.com", "password": "pw"});

        let response = send(&app, json_request("POST", "/api/v1/signup", signup.clone())).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["next"], "/api/v1/upload");

        let response = send(&app, json_request("POST", "/api/v1/signup", signup)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let login = json!({"email": "ada@example.com", "password": "pw"});
        let response = send(&app, json_request("POST", "/api/v1/login", login)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bad = json!({"email": "ada@example.com", "password": "nope"});
        let response = send(&app, json_request("POST", "/api/v1/login", bad)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(
            body["error"]["message"],
            "Invalid credentials. Please try again."
        );
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_unauthorized() {
        let app = test_app().await;
        let login = json!({"email": "ghost@example.com", "password": "pw"});
        let response = send(&app, json_request("POST", "/api/v1/login", login)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_malformed_email_is_unauthorized() {
        let app = test_app().await;
        for email in ["nobody", "a,b@example.com", "two words@example.com", ""] {
            let login = json!({"email": email, "password": "pw"});
            let response = send(&app, json_request("POST", "/api/v1/login", login)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "email {email:?}");
            assert_eq!(
                body_json(response).await["error"]["message"],
                "Invalid credentials. Please try again."
            );
        }
    }

    #[tokio::test]
    async fn test_upload_text_resume_recommends_jobs_and_persists() {
        let app = test_app().await;
        let request = multipart_request(
            &[("name", "Ada"), ("email", "ada@example.com")],
            Some(("my resume.txt", RESUME_TXT)),
        );

        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["filename"], "my_resume.txt");
        assert_eq!(body["document_kind"], "plain_text");
        let stored_as = body["stored_as"].as_str().unwrap();
        assert!(stored_as.ends_with("_my_resume.txt"));
        assert!(!stored_as.contains('/'));
        assert_eq!(body["jobs"][0]["title"], "Software Developer");
        assert!(body["highlighted"]
            .as_str()
            .unwrap()
            .contains("<mark>Python</mark>"));
        assert!(body["skills"]
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s == "SQL"));

        let response = send(&app, get_request("/api/v1/resumes?email=ada@example.com")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let record = body_json(response).await;
        assert_eq!(record["name"], "Ada");
        assert!(record["resume"].as_str().unwrap().contains("Python"));
    }

    #[tokio::test]
    async fn test_reupload_updates_existing_record() {
        let app = test_app().await;
        let first = multipart_request(
            &[("name", "Ada"), ("email", "ada@example.com")],
            Some(("cv.txt", b"Marketing and SEO".as_slice())),
        );
        assert_eq!(send(&app, first).await.status(), StatusCode::OK);

        let second = multipart_request(
            &[("name", "Ada L"), ("email", "ada@example.com")],
            Some(("cv.txt", RESUME_TXT)),
        );
        assert_eq!(send(&app, second).await.status(), StatusCode::OK);

        let response = send(&app, get_request("/api/v1/resumes?email=ada@example.com")).await;
        let record = body_json(response).await;
        assert_eq!(record["name"], "Ada L");
        assert!(!record["resume"].as_str().unwrap().contains("SEO"));
    }

    #[tokio::test]
    async fn test_get_resume_not_found() {
        let app = test_app().await;
        let response = send(&app, get_request("/api/v1/resumes?email=none@example.com")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_without_file_part() {
        let app = test_app().await;
        let request = multipart_request(&[("name", "Ada"), ("email", "ada@example.com")], None);
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["message"], "No file part");
    }

    #[tokio::test]
    async fn test_upload_with_empty_filename() {
        let app = test_app().await;
        let request = multipart_request(
            &[("name", "Ada"), ("email", "ada@example.com")],
            Some(("", b"text".as_slice())),
        );
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "No selected file"
        );
    }

    #[tokio::test]
    async fn test_upload_disallowed_type() {
        let app = test_app().await;
        let request = multipart_request(
            &[("name", "Ada"), ("email", "ada@example.com")],
            Some(("resume.docx", b"PK".as_slice())),
        );
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "File type not allowed"
        );
    }

    #[tokio::test]
    async fn test_upload_requires_name_and_email() {
        let app = test_app().await;
        let request = multipart_request(
            &[("email", "ada@example.com")],
            Some(("cv.txt", b"Rust".as_slice())),
        );
        assert_eq!(send(&app, request).await.status(), StatusCode::BAD_REQUEST);

        let request =
            multipart_request(&[("name", "Ada")], Some(("cv.txt", b"Rust".as_slice())));
        assert_eq!(send(&app, request).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_blank_text_is_unprocessable() {
        let app = test_app().await;
        let request = multipart_request(
            &[("name", "Ada"), ("email", "ada@example.com")],
            Some(("cv.txt", b"   \n\t ".as_slice())),
        );
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_upload_pdf_resume_is_analyzed() {
        let app = test_app().await;
        let pdf = single_page_pdf(
            "Grace Hopper\nData work in Python with pandas and numpy.\nBuilt statistics reports",
        );
        let request = multipart_request(
            &[("name", "Grace"), ("email", "grace@example.com")],
            Some(("cv.pdf", pdf.as_slice())),
        );

        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["document_kind"], "pdf");
        assert_eq!(body["jobs"][0]["title"], "Data Scientist");
        assert!(body["highlighted"]
            .as_str()
            .unwrap()
            .contains("<mark>pandas</mark>"));

        let response = send(&app, get_request("/api/v1/resumes?email=grace@example.com")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["resume"]
            .as_str()
            .unwrap()
            .contains("numpy"));
    }

    #[tokio::test]
    async fn test_upload_broken_pdf_is_unprocessable() {
        let app = test_app().await;
        let request = multipart_request(
            &[("name", "Ada"), ("email", "ada@example.com")],
            Some(("cv.pdf", b"%PDF-1.4 truncated".as_slice())),
        );
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let message = body_json(response).await["error"]["message"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(message.starts_with("Error reading PDF file"));
    }

    #[tokio::test]
    async fn test_upload_over_body_limit() {
        let app = test_app_with_limit(Some("256")).await;
        let big = vec![b'a'; 4096];
        let request = multipart_request(
            &[("name", "Ada"), ("email", "ada@example.com")],
            Some(("cv.txt", big.as_slice())),
        );
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_list_jobs() {
        let app = test_app().await;
        let response = send(&app, get_request("/api/v1/jobs")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["jobs"].as_array().unwrap().len(), 4);
        assert_eq!(body["jobs"][0]["title"], "Software Developer");
    }
}
