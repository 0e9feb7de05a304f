//! HTTP-level tests for the remote challenge provider.
//!
//! Mocked responses verify the full chain: request, validation, bounded
//! retry, and the guarantee that the caller always receives a valid item
//! no matter what the endpoint does.

use wakeguard_core::content::{
    ChallengeContentSource, ChallengeKind, RemoteContentClient,
};

fn source_for(server: &mockito::ServerGuard) -> ChallengeContentSource {
    let client = RemoteContentClient::new(&format!("{}/generate", server.url()))
        .expect("client builds against mock server");
    ChallengeContentSource::with_provider(Box::new(client))
}

#[test]
fn valid_response_becomes_a_remote_item() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/generate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text":"keyboard"}"#)
        .create();

    let mut source = source_for(&server);
    let item = source.request_challenge(ChallengeKind::ReverseWord);
    assert_eq!(item.prompt, "Type \"keyboard\" backwards");
    assert_eq!(item.expected_answer, "draobyek");
    assert_eq!(source.used_count(ChallengeKind::ReverseWord), 1);
    mock.assert();
}

#[test]
fn server_error_is_retried_once_then_recovered_locally() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/generate")
        .with_status(500)
        .expect(2)
        .create();

    let mut source = source_for(&server);
    let item = source.request_challenge(ChallengeKind::Arithmetic);
    // Exactly two attempts, then the curated pool answers.
    mock.assert();
    assert_eq!(item.kind, ChallengeKind::Arithmetic);
    assert!(item.prompt.ends_with("= ?"));
}

#[test]
fn garbage_body_falls_back_locally() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/generate")
        .with_status(200)
        .with_body("definitely not json")
        .create();

    let mut source = source_for(&server);
    let item = source.request_challenge(ChallengeKind::Phrase);
    assert!(item.prompt.starts_with("Type exactly: "));
    assert!(item.expected_answer.split_whitespace().count() >= 3);
}

#[test]
fn schema_valid_but_rejected_content_falls_back_locally() {
    let mut server = mockito::Server::new();
    // Parses fine, fails the phrase validator (two tokens).
    let _mock = server
        .mock("POST", "/generate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"text":"too short"}"#)
        .create();

    let mut source = source_for(&server);
    let item = source.request_challenge(ChallengeKind::Phrase);
    assert!(item.expected_answer.split_whitespace().count() >= 3);
}

#[test]
fn unreachable_endpoint_never_surfaces_an_error() {
    // Nothing listens here; the request fails at the transport level.
    let client = RemoteContentClient::new("http://127.0.0.1:1/generate").unwrap();
    let mut source = ChallengeContentSource::with_provider(Box::new(client));
    for kind in ChallengeKind::ALL {
        let item = source.request_challenge(kind);
        assert_eq!(item.kind, kind);
        assert!(!item.prompt.is_empty());
    }
}
