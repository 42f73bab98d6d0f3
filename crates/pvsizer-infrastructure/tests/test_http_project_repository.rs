use pvsizer_core::dimensioning::{
    DimensioningSession, PROJECT_TYPE_DIMENSIONING, ProjectRecord, ProjectRepository, Step,
};
use pvsizer_core::error::{NetworkError, SizerError, StatusBand};
use pvsizer_infrastructure::HttpProjectRepository;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Accepts one connection, answers with the canned response and returns the
/// raw request it received.
async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{}/api", addr), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn record() -> ProjectRecord {
    let mut session = DimensioningSession::new();
    session.name = "Fazenda Boa Vista".to_string();
    session.current_step = Step::Location;
    ProjectRecord::from_session(&session)
}

#[tokio::test]
async fn test_create_posts_project_with_bearer_token() {
    let (base, server) = serve_once(
        "201 Created",
        r#"{"success":true,"data":{"id":"p-100","createdAt":"2026-05-01T12:00:00Z","updatedAt":"2026-05-01T12:00:00Z"}}"#.to_string(),
    )
    .await;
    let repo = HttpProjectRepository::new(base, Some("tok-123".to_string()));

    let receipt = repo.create(&record()).await.unwrap();
    assert_eq!(receipt.id, "p-100");
    assert_eq!(receipt.created_at.as_deref(), Some("2026-05-01T12:00:00Z"));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/projects HTTP/1.1"));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer tok-123"));
    assert!(request.contains(PROJECT_TYPE_DIMENSIONING));
    assert!(request.contains("Fazenda Boa Vista"));
}

#[tokio::test]
async fn test_update_puts_by_id() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"id":"p-7","updatedAt":"2026-05-02T08:00:00Z"}"#.to_string(),
    )
    .await;
    let repo = HttpProjectRepository::new(base, None);

    let receipt = repo.update("p-7", &record()).await.unwrap();
    assert_eq!(receipt.updated_at.as_deref(), Some("2026-05-02T08:00:00Z"));

    let request = server.await.unwrap();
    assert!(request.starts_with("PUT /api/projects/p-7 HTTP/1.1"));
    assert!(!request.to_ascii_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn test_update_reply_without_id_keeps_requested_id() {
    let (base, _server) = serve_once(
        "200 OK",
        r#"{"success":true,"data":{"updatedAt":"2026-05-02T08:00:00Z"}}"#.to_string(),
    )
    .await;
    let repo = HttpProjectRepository::new(base, None);

    let receipt = repo.update("p-7", &record()).await.unwrap();
    assert_eq!(receipt.id, "p-7");
    assert_eq!(receipt.updated_at.as_deref(), Some("2026-05-02T08:00:00Z"));
}

#[tokio::test]
async fn test_create_reply_without_id_is_structural() {
    let (base, _server) = serve_once(
        "201 Created",
        r#"{"success":true,"data":{"createdAt":"2026-05-01T12:00:00Z"}}"#.to_string(),
    )
    .await;
    let repo = HttpProjectRepository::new(base, None);

    let err = repo.create(&record()).await.unwrap_err();
    assert!(err.is_structural());
}

#[tokio::test]
async fn test_find_by_id_returns_payload_session() {
    let mut session = DimensioningSession::new();
    session.name = "Loja Centro".to_string();
    session.current_step = Step::Budget;
    let body = serde_json::json!({
        "success": true,
        "data": {
            "id": "p-3",
            "name": "Loja Centro",
            "projectType": "dimensioning",
            "payload": session
        }
    })
    .to_string();
    let (base, _server) = serve_once("200 OK", body).await;
    let repo = HttpProjectRepository::new(base, None);

    let loaded = repo.find_by_id("p-3").await.unwrap().unwrap();
    assert_eq!(loaded.id.as_deref(), Some("p-3"));
    assert_eq!(loaded.current_step, Step::Budget);
    assert_eq!(loaded.name, "Loja Centro");
}

#[tokio::test]
async fn test_find_missing_project_is_none() {
    let (base, _server) = serve_once("404 Not Found", r#"{"error":"not found"}"#.to_string()).await;
    let repo = HttpProjectRepository::new(base, None);

    assert!(repo.find_by_id("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_server_error_is_retryable_network_error() {
    let (base, _server) =
        serve_once("503 Service Unavailable", r#"{"error":"down"}"#.to_string()).await;
    let repo = HttpProjectRepository::new(base, None);

    let err = repo.create(&record()).await.unwrap_err();
    assert!(err.is_retryable());
    match err {
        SizerError::Network(NetworkError::HttpStatus { status, band, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(band, StatusBand::ServerError);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_client_error_is_not_retryable() {
    let (base, _server) = serve_once("422 Unprocessable Entity", "{}".to_string()).await;
    let repo = HttpProjectRepository::new(base, None);

    let err = repo.update("p-1", &record()).await.unwrap_err();
    assert!(err.is_network());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_nothing_listening_is_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let repo = HttpProjectRepository::new(format!("http://{}/api", addr), None);
    let err = repo.create(&record()).await.unwrap_err();
    assert!(matches!(
        err,
        SizerError::Network(NetworkError::ConnectionRefused { .. })
    ));
}
