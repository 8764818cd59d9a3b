use super::*;

#[test]
fn handshake_carries_credentials() {
    let cfg = InferenceConfig {
        url: "ws://127.0.0.1:9/a2f".to_string(),
        api_key: Some("nvapi-secret".to_string()),
        function_id: Some("fn-123".to_string()),
        ..InferenceConfig::default()
    };
    let req = WsConnector::new(&cfg).request().unwrap();
    assert_eq!(
        req.headers().get("authorization").unwrap(),
        "Bearer nvapi-secret"
    );
    assert_eq!(req.headers().get("function-id").unwrap(), "fn-123");
}

#[test]
fn handshake_omits_absent_credentials() {
    let req = WsConnector::new(&InferenceConfig::default()).request().unwrap();
    assert!(req.headers().get("authorization").is_none());
    assert!(req.headers().get("function-id").is_none());
}

#[test]
fn invalid_url_is_a_connection_error() {
    let cfg = InferenceConfig {
        url: "not a url".to_string(),
        ..InferenceConfig::default()
    };
    assert!(matches!(
        WsConnector::new(&cfg).request(),
        Err(FacecastError::Connection(_))
    ));
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let cfg = InferenceConfig {
        url: format!("ws://{addr}/a2f"),
        connect_timeout_secs: 2,
        ..InferenceConfig::default()
    };
    let err = WsConnector::new(&cfg).open().await.err().unwrap();
    assert!(matches!(err, FacecastError::Connection(_)));
}
