use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use docs_edit_core::auth::SCOPES;
use docs_edit_core::{Credentials, EditError, ServiceAccountKey, TokenSource};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use pretty_assertions::assert_eq;
use reqwest::blocking::Client;
use serde_json::Value;

const PRIVATE_KEY: &str = include_str!("fixtures/service_account_key.pem");
const PUBLIC_KEY: &str = include_str!("fixtures/service_account_pub.pem");
const GRANT_PREFIX: &str =
    "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer&assertion=";

/// Token endpoint that answers one connection per entry in `replies` and
/// hands back the request bodies it saw.
struct TokenEndpoint {
    url: String,
    handle: JoinHandle<Vec<String>>,
}

impl TokenEndpoint {
    fn start(replies: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let url = format!("http://{}/token", listener.local_addr().expect("addr"));
        let handle = thread::spawn(move || {
            let mut bodies = Vec::new();
            for (status, reply) in replies {
                let (stream, _) = listener.accept().expect("accept");
                let mut reader = BufReader::new(stream);
                let mut content_length = 0;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).expect("header line");
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().expect("length");
                        }
                    }
                }
                let mut body = vec![0; content_length];
                reader.read_exact(&mut body).expect("body");
                bodies.push(String::from_utf8(body).expect("utf8 body"));

                let mut stream = reader.into_inner();
                write!(
                    stream,
                    "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                    reply.len()
                )
                .expect("reply");
            }
            bodies
        });
        Self { url, handle }
    }

    fn requests(self) -> Vec<String> {
        self.handle.join().expect("endpoint thread")
    }
}

fn token_reply(token: &str, expires_in: u64) -> (u16, String) {
    (
        200,
        format!(r#"{{"access_token": "{token}", "expires_in": {expires_in}, "token_type": "Bearer"}}"#),
    )
}

fn service_account(token_uri: &str) -> Credentials {
    let json = serde_json::json!({
        "type": "service_account",
        "client_email": "docs-bot@example.iam.gserviceaccount.com",
        "private_key": PRIVATE_KEY,
        "token_uri": token_uri,
    });
    Credentials::ServiceAccount(
        ServiceAccountKey::from_json(&json.to_string()).expect("key json"),
    )
}

fn client() -> Client {
    Client::builder().no_proxy().build().expect("client")
}

#[test]
fn exchanges_signed_assertion_for_token() {
    let endpoint = TokenEndpoint::start(vec![token_reply("tok-1", 3600)]);
    let token_uri = endpoint.url.clone();
    let source = TokenSource::new(service_account(&token_uri));

    assert_eq!(source.token(&client()).expect("token"), "tok-1");

    let bodies = endpoint.requests();
    assert_eq!(bodies.len(), 1);
    let assertion = bodies[0]
        .strip_prefix(GRANT_PREFIX)
        .expect("jwt-bearer grant");

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[&token_uri]);
    let decoded = jsonwebtoken::decode::<Value>(
        assertion,
        &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).expect("public key"),
        &validation,
    )
    .expect("assertion verifies");

    let claims = decoded.claims;
    assert_eq!(claims["iss"], "docs-bot@example.iam.gserviceaccount.com");
    assert_eq!(claims["scope"], SCOPES.join(" "));
    assert_eq!(
        claims["exp"].as_u64().expect("exp") - claims["iat"].as_u64().expect("iat"),
        3600
    );
}

#[test]
fn fresh_token_is_reused() {
    let endpoint = TokenEndpoint::start(vec![token_reply("tok-1", 3600)]);
    let source = TokenSource::new(service_account(&endpoint.url));
    let client = client();

    assert_eq!(source.token(&client).expect("first"), "tok-1");
    assert_eq!(source.token(&client).expect("second"), "tok-1");

    assert_eq!(endpoint.requests().len(), 1);
}

#[test]
fn token_near_expiry_is_refreshed() {
    let endpoint = TokenEndpoint::start(vec![
        token_reply("tok-1", 30),
        token_reply("tok-2", 3600),
    ]);
    let source = TokenSource::new(service_account(&endpoint.url));
    let client = client();

    assert_eq!(source.token(&client).expect("first"), "tok-1");
    assert_eq!(source.token(&client).expect("refreshed"), "tok-2");
    assert_eq!(source.token(&client).expect("cached"), "tok-2");

    assert_eq!(endpoint.requests().len(), 2);
}

#[test]
fn rejected_exchange_is_a_remote_error() {
    let endpoint = TokenEndpoint::start(vec![(
        400,
        r#"{"error": "invalid_grant", "error_description": "Invalid JWT Signature."}"#.to_string(),
    )]);
    let source = TokenSource::new(service_account(&endpoint.url));

    let err = source.token(&client()).expect_err("rejected");

    match err {
        EditError::Remote { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid JWT Signature.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(endpoint.requests().len(), 1);
}
