//! Tests for the transfer server client.
//!
//! These run against mock servers so no real transfer server is needed.

use std::sync::Arc;
use tunebridge_client::{ClientError, HttpPlatformClient, ServerConfig, TransferServerClient};
use tunebridge_core::{
    AuthedRequest, FetchError, JobId, Platform, PlatformClient, Playlist, PlaylistId,
    TransferApi, TransferBatchRequest, TransportError,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signed_in(server: &MockServer) -> Arc<TransferServerClient> {
    Arc::new(
        TransferServerClient::new(ServerConfig::with_token(server.uri(), "jwt-123"))
            .expect("valid url"),
    )
}

fn spotify(client: &Arc<TransferServerClient>) -> HttpPlatformClient {
    TransferServerClient::platform_client(client, Platform::Spotify)
}

// =============================================================================
// Server Config Tests
// =============================================================================

mod server_config {
    use super::*;

    #[test]
    fn test_new_with_url() {
        let config = ServerConfig::new("https://example.com/api");
        assert_eq!(config.url, "https://example.com/api");
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_with_token() {
        let config = ServerConfig::with_token("https://example.com/api", "jwt");
        assert_eq!(config.access_token.as_deref(), Some("jwt"));
    }

    #[test]
    fn test_url_without_scheme_rejected() {
        match TransferServerClient::new(ServerConfig::new("example.com")) {
            Err(ClientError::InvalidUrl(msg)) => assert!(msg.contains("http://")),
            Err(other) => panic!("Expected InvalidUrl, got {other:?}"),
            Ok(_) => panic!("Expected InvalidUrl"),
        }
    }

    #[tokio::test]
    async fn test_token_lifecycle() {
        let client = TransferServerClient::new(ServerConfig::new("http://localhost:5000")).unwrap();
        assert!(!client.is_authenticated().await);

        client.set_token("jwt").await;
        assert!(client.is_authenticated().await);

        client.clear_token().await;
        assert!(!client.is_authenticated().await);
    }
}

// =============================================================================
// Transfer Tests
// =============================================================================

mod transfer {
    use super::*;

    fn batch() -> TransferBatchRequest {
        let playlists = vec![
            Playlist::new("p1", "loud noises", Platform::AppleMusic, 181),
            Playlist::new("p2", "melatones", Platform::AppleMusic, 41),
        ];
        TransferBatchRequest::new(&playlists, Platform::Spotify)
    }

    #[tokio::test]
    async fn test_submit_sends_batch_with_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transfer"))
            .and(header("authorization", "Bearer jwt-123"))
            .and(body_json(serde_json::json!({
                "items": [
                    {"srcPlaylistId": "p1", "srcPlatform": "apple", "destPlatform": "spotify"},
                    {"srcPlaylistId": "p2", "srcPlatform": "apple", "destPlatform": "spotify"}
                ],
                "destination": "spotify"
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "ids": ["j1"],
                "failed_ids": ["p2"],
                "status": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = signed_in(&server);
        let response = client.submit_batch(&batch()).await.unwrap();

        assert_eq!(response.ids, vec![JobId::new("j1")]);
        assert_eq!(response.failed_ids, vec![PlaylistId::new("p2")]);
    }

    #[tokio::test]
    async fn test_submit_parses_correlated_results() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transfer"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "results": [
                    {"srcPlaylistId": "p1", "jobId": "j1"},
                    {"srcPlaylistId": "p2", "failed": true}
                ]
            })))
            .mount(&server)
            .await;

        let response = signed_in(&server).submit_batch(&batch()).await.unwrap();
        let results = response.results.expect("results");

        assert_eq!(results[0].job_id, Some(JobId::new("j1")));
        assert!(results[1].failed);
        assert!(results[1].job_id.is_none());
    }

    #[tokio::test]
    async fn test_submit_server_error_fails_whole_batch() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transfer"))
            .respond_with(ResponseTemplate::new(500).set_body_string("queue offline"))
            .mount(&server)
            .await;

        let err = signed_in(&server).submit_batch(&batch()).await.unwrap_err();
        assert_eq!(
            err,
            TransportError::Http {
                status: 500,
                message: "queue offline".into()
            }
        );
    }

    #[tokio::test]
    async fn test_submit_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transfer"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = signed_in(&server).submit_batch(&batch()).await.unwrap_err();
        assert_eq!(err, TransportError::Unauthorized { status: 401 });
    }

    #[tokio::test]
    async fn test_submit_without_token_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .expect(0)
            .mount(&server)
            .await;

        let client = TransferServerClient::new(ServerConfig::new(server.uri())).unwrap();
        let err = client.submit_batch(&batch()).await.unwrap_err();
        assert_eq!(err, TransportError::MissingToken);
    }

    #[tokio::test]
    async fn test_submit_malformed_body_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transfer"))
            .respond_with(ResponseTemplate::new(202).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = signed_in(&server).submit_batch(&batch()).await.unwrap_err();
        assert!(matches!(err, TransportError::Parse(_)));
    }

    #[tokio::test]
    async fn test_status_reads_raw_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/transfer/j1"))
            .and(header("authorization", "Bearer jwt-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "j1",
                "status": "SUCCESS",
                "destPlaylistId": "sp-new"
            })))
            .mount(&server)
            .await;

        let report = signed_in(&server)
            .transfer_status(&JobId::new("j1"))
            .await
            .unwrap();

        assert_eq!(report.status, "SUCCESS");
        assert_eq!(report.dest_playlist_id, Some(PlaylistId::new("sp-new")));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Nothing listens on port 1
        let client = Arc::new(
            TransferServerClient::new(ServerConfig::with_token("http://127.0.0.1:1", "jwt"))
                .unwrap(),
        );

        let err = client.transfer_status(&JobId::new("j1")).await.unwrap_err();
        assert!(matches!(err, TransportError::Unreachable(_)));
    }
}

// =============================================================================
// Catalog Tests
// =============================================================================

mod catalog {
    use super::*;

    #[tokio::test]
    async fn test_forced_fetch_sets_query_flag() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/playlists/spotify"))
            .and(query_param("fetch", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "playlists": [
                    {"id": "sp1", "name": "new start", "trackCount": 338, "platform": "spotify"}
                ],
                "updatedAt": "2024-05-01T10:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = signed_in(&server);
        let page = spotify(&client).get_user_playlists(true).await.unwrap();

        assert_eq!(page.playlists.len(), 1);
        assert_eq!(page.playlists[0].name, "new start");
        assert!(page.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_cached_fetch_accepts_items_shape() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/playlists/apple"))
            .and(query_param("fetch", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"id": "a1", "name": "cupid arrows", "trackLength": 119, "platform": "spotify"}
                ]
            })))
            .mount(&server)
            .await;

        let client = signed_in(&server);
        let apple = TransferServerClient::platform_client(&client, Platform::AppleMusic);
        let page = apple.get_user_playlists(false).await.unwrap();

        // Keyed by the platform that was asked for
        assert_eq!(page.playlists[0].platform, Platform::AppleMusic);
        assert_eq!(page.playlists[0].track_count, 119);
    }

    #[tokio::test]
    async fn test_forbidden_is_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/playlists/spotify"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = spotify(&signed_in(&server))
            .get_user_playlists(false)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FetchError::Unauthorized {
                platform: Platform::Spotify,
                status: 403
            }
        );
    }

    #[tokio::test]
    async fn test_server_error_is_not_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/playlists/spotify"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = spotify(&signed_in(&server))
            .get_user_playlists(false)
            .await
            .unwrap_err();

        assert!(!err.is_auth());
        match err {
            FetchError::Server { status, .. } => assert_eq!(status, Some(502)),
            other => panic!("Expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_with_auth_passes_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/spotify/playlists"))
            .and(header("authorization", "Bearer jwt-123"))
            .and(body_json(serde_json::json!({"name": "copy"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "x"})))
            .mount(&server)
            .await;

        let value = spotify(&signed_in(&server))
            .request_with_auth(AuthedRequest::post(
                "/spotify/playlists",
                serde_json::json!({"name": "copy"}),
            ))
            .await
            .unwrap();

        assert_eq!(value["id"], "x");
    }

    #[tokio::test]
    async fn test_request_with_auth_empty_body_is_null() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let value = spotify(&signed_in(&server))
            .request_with_auth(AuthedRequest::get("/ping"))
            .await
            .unwrap();

        assert!(value.is_null());
    }
}

// =============================================================================
// Session Tests
// =============================================================================

mod session {
    use super::*;

    fn auth_info_body() -> serde_json::Value {
        serde_json::json!({
            "jwt": {"expiresAt": 1_900_000_000, "expiresIn": 3600},
            "userId": "u-1",
            "oauth": [{"provider": "spotify", "providerId": "sp-user"}]
        })
    }

    #[tokio::test]
    async fn test_logged_in_follows_linked_providers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_info_body()))
            .mount(&server)
            .await;

        let client = signed_in(&server);
        assert!(spotify(&client).is_logged_in().await.unwrap());

        let soundcloud = TransferServerClient::platform_client(&client, Platform::SoundCloud);
        assert!(!soundcloud.is_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_signed_out_is_not_logged_in_without_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_info_body()))
            .expect(0)
            .mount(&server)
            .await;

        let client = Arc::new(TransferServerClient::new(ServerConfig::new(server.uri())).unwrap());
        assert!(!spotify(&client).is_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_rejected_session_is_not_logged_in() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/info"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert!(!spotify(&signed_in(&server)).is_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_auth_info_fields() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_info_body()))
            .mount(&server)
            .await;

        let info = signed_in(&server).auth_info().await.unwrap();
        assert_eq!(info.user_id, "u-1");
        assert_eq!(info.linked_platforms(), vec![Platform::Spotify]);
    }
}
