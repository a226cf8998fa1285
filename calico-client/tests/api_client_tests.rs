//! RadioApiClient against a mock Radio Calico server

use calico_client::{ClientConfig, ClientError, RadioApiClient, SongApi};
use calico_common::CoverSource;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn song_json(id: i64, votes: i64, play_count: i64) -> Value {
    json!({
        "id": id,
        "title": "Windowlicker",
        "artist": "Aphex Twin",
        "audio_file": "/audio/windowlicker.mp3",
        "image_url": null,
        "description": null,
        "spotify_url": null,
        "youtube_url": null,
        "genre": "Electronic",
        "duration": "6:07",
        "votes": votes,
        "play_count": play_count,
        "created_at": "2024-03-01T12:00:00.000Z"
    })
}

fn client(server: &MockServer) -> RadioApiClient {
    RadioApiClient::new(&ClientConfig {
        base_url: server.uri(),
        timeout_secs: 2,
    })
    .unwrap()
}

#[tokio::test]
async fn test_list_songs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/songs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "count": 2,
            "data": [song_json(1, 0, 4), song_json(2, 3, 0)],
        })))
        .mount(&server)
        .await;

    let songs = client(&server).list_songs().await.unwrap();

    assert_eq!(songs.len(), 2);
    assert_eq!(songs[0].play_count, 4);
    assert_eq!(songs[1].votes, 3);
    assert_eq!(songs[0].duration.as_deref(), Some("6:07"));
    assert!(songs[0].needs_cover_art());
}

#[tokio::test]
async fn test_vote_returns_updated_song() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/songs/5/vote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Vote registered",
            "data": song_json(5, 4, 0),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let song = client(&server).vote(5).await.unwrap();
    assert_eq!(song.id, 5);
    assert_eq!(song.votes, 4);
}

#[tokio::test]
async fn test_register_play() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/songs/2/play"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Play registered",
            "data": song_json(2, 0, 1),
        })))
        .mount(&server)
        .await;

    let song = client(&server).register_play(2).await.unwrap();
    assert_eq!(song.play_count, 1);
}

#[tokio::test]
async fn test_not_found_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/songs/999/vote"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"success": false, "message": "Song not found"})),
        )
        .mount(&server)
        .await;

    match client(&server).vote(999).await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Song not found");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_without_envelope_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/songs"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    match client(&server).list_songs().await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unsuccessful_envelope_with_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/songs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Maintenance"})),
        )
        .mount(&server)
        .await;

    let error = client(&server).list_songs().await.unwrap_err();
    assert!(matches!(error, ClientError::Api { status: 200, ref message } if message == "Maintenance"));
}

#[tokio::test]
async fn test_fetch_cover_hit_and_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/songs/1/cover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "coverUrl": "https://coverartarchive.org/release/abc/front-500",
            "source": "coverartarchive",
            "release": "Windowlicker",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/songs/2/cover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "coverUrl": null,
            "source": "none",
            "release": null,
        })))
        .mount(&server)
        .await;

    let api = client(&server);

    let hit = api.fetch_cover(1).await.unwrap();
    assert_eq!(hit.source, CoverSource::CoverArtArchive);
    assert_eq!(
        hit.cover_url.as_deref(),
        Some("https://coverartarchive.org/release/abc/front-500")
    );
    assert_eq!(hit.release.as_deref(), Some("Windowlicker"));

    let miss = api.fetch_cover(2).await.unwrap();
    assert_eq!(miss.source, CoverSource::None);
    assert!(!miss.is_hit());
}

#[tokio::test]
async fn test_cover_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/songs/1/cover"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "message": "Failed to search cover art",
            "error": "MusicBrainz API error: 503",
        })))
        .mount(&server)
        .await;

    let error = client(&server).fetch_cover(1).await.unwrap_err();
    assert!(matches!(error, ClientError::Api { status: 500, .. }));
}

#[tokio::test]
async fn test_connection_refused_is_request_error() {
    let api = RadioApiClient::new(&ClientConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 1,
    })
    .unwrap();

    assert!(matches!(api.list_songs().await, Err(ClientError::Request(_))));
}
