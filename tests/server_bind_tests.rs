use intake_relay_lib::{
    core::{config::DeployTarget, errors::AppError},
    server,
};

#[tokio::test]
async fn server_target_steps_to_next_port_when_taken() {
    let occupied = tokio::net::TcpListener::bind("0.0.0.0:0")
        .await
        .expect("bind ephemeral port");
    let port = occupied.local_addr().expect("local addr").port();

    let listener = server::bind(port, DeployTarget::Server)
        .await
        .expect("fallback bind");

    assert_eq!(listener.local_addr().expect("local addr").port(), port + 1);
}

#[tokio::test]
async fn serverless_target_binds_strictly() {
    let occupied = tokio::net::TcpListener::bind("0.0.0.0:0")
        .await
        .expect("bind ephemeral port");
    let port = occupied.local_addr().expect("local addr").port();

    let err = server::bind(port, DeployTarget::Serverless)
        .await
        .err()
        .expect("port is taken");

    assert!(matches!(err, AppError::Io(_)));
}

#[test]
fn invalid_cors_origin_is_a_config_error() {
    let err = server::cors_layer(&["http://ok.example".to_string(), "bad\norigin".to_string()])
        .err()
        .expect("invalid origin");
    assert_eq!(err.code(), "CONFIG_ERROR");
}
