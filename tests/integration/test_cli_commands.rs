// CLIコマンドの統合テスト
// 引数の解析からコマンド実行までをモックHTTPサーバーで確認する

use crate::fixtures::*;
use clap::Parser;
use mockito::Matcher;
use playlist_convert::cli::{
    execute_convert, execute_expand, execute_status, execute_subscribe, Cli, Commands,
    FailureReport, ReportedError, EXIT_FAILURE,
};
use playlist_convert::domain::ConvertError;
use playlist_convert::ConvertOptions;
use serde_json::json;
use tokio_util::sync::CancellationToken;

#[test]
fn test_cli_builds_client_config() {
    let cli = Cli::try_parse_from([
        "playlist-convert",
        "--base-url",
        "http://127.0.0.1:9000/",
        "--timeout-secs",
        "30",
        "status",
        "abc",
    ])
    .unwrap();

    let config = cli.global.client_config().unwrap();
    assert_eq!(config.base_url, "http://127.0.0.1:9000/");
    assert_eq!(config.poll_timeout, Some(std::time::Duration::from_secs(30)));
    assert_eq!(
        config.build_backend().unwrap().base_url(),
        "http://127.0.0.1:9000"
    );
    assert!(matches!(cli.command, Commands::Status { .. }));
}

#[tokio::test]
async fn test_convert_command_quiet() {
    let mut server = mockito::Server::new_async().await;
    let _submit = server
        .mock("POST", "/playlist")
        .match_body(Matcher::PartialJson(json!({"platform": "apple-music"})))
        .with_status(200)
        .with_body(json!({"task_id": "cli-task"}).to_string())
        .create_async()
        .await;
    let _progress = server
        .mock("GET", "/celery-progress/cli-task/")
        .with_status(200)
        .with_body(success_body("https://music.apple.com/library/playlist/p.cli").to_string())
        .create_async()
        .await;

    let app = test_app(&test_config(&server.url()));

    execute_convert(
        &app,
        ConvertOptions::new(SPOTIFY_PLAYLIST),
        true,
        &CancellationToken::new(),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_convert_command_surfaces_typed_error() {
    let mut server = mockito::Server::new_async().await;
    let _submit = server
        .mock("POST", "/playlist")
        .with_status(500)
        .with_body("")
        .create_async()
        .await;

    let app = test_app(&test_config(&server.url()));

    let error = execute_convert(
        &app,
        ConvertOptions::new(SPOTIFY_PLAYLIST),
        true,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    let convert_error = error.downcast_ref::<ConvertError>().unwrap();
    assert_eq!(convert_error.status(), Some(500));
    assert!(convert_error.is_recoverable());
}

#[tokio::test]
async fn test_convert_command_does_not_repeat_observer_output() {
    let mut server = mockito::Server::new_async().await;
    let _submit = server
        .mock("POST", "/playlist")
        .with_status(404)
        .with_body(json!({"message": "Not Found"}).to_string())
        .create_async()
        .await;

    let app = test_app(&test_config(&server.url()));

    let error = execute_convert(
        &app,
        ConvertOptions::new(SPOTIFY_PLAYLIST),
        false,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    let ReportedError(inner) = error.downcast_ref::<ReportedError>().unwrap();
    assert_eq!(inner.status(), Some(404));
    assert_eq!(FailureReport::from_error(&error).message, None);
}

#[test]
fn test_invalid_config_is_reported_for_convert() {
    let cli = Cli::try_parse_from([
        "playlist-convert",
        "--max-attempts",
        "0",
        "convert",
        SPOTIFY_PLAYLIST,
    ])
    .unwrap();

    let error = anyhow::Error::from(cli.global.client_config().unwrap_err());
    let report = FailureReport::from_error(&error);

    assert_eq!(report.exit_code, EXIT_FAILURE);
    let message = report.message.unwrap();
    assert!(message.contains("Invalid configuration"));
    assert!(message.contains("max_attempts"));
}

#[tokio::test]
async fn test_expand_and_status_commands() {
    let mut server = mockito::Server::new_async().await;
    let expand = server
        .mock("POST", "/expand")
        .with_status(200)
        .with_body(json!({"url": SPOTIFY_PLAYLIST}).to_string())
        .expect(1)
        .create_async()
        .await;
    let status = server
        .mock("GET", "/celery-progress/abc/")
        .with_status(200)
        .with_body(in_progress_body(2, 8).to_string())
        .expect(1)
        .create_async()
        .await;

    let app = test_app(&test_config(&server.url()));

    execute_expand(&app, "https://spotify.link/abc").await.unwrap();
    execute_status(&app, "abc").await.unwrap();
    assert!(execute_status(&app, "  ").await.is_err());

    expand.assert_async().await;
    status.assert_async().await;
}

#[tokio::test]
async fn test_subscribe_command() {
    let mut server = mockito::Server::new_async().await;
    let created = server
        .mock("POST", "/subscribers")
        .match_body(Matcher::Json(json!({"email": "listener@example.com"})))
        .with_status(201)
        .with_body(json!({"email": "listener@example.com"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let app = test_app(&test_config(&server.url()));

    execute_subscribe(&app, "listener@example.com").await.unwrap();
    let error = execute_subscribe(&app, "listener@").await.unwrap_err();
    assert!(matches!(
        error.downcast_ref::<ConvertError>(),
        Some(ConvertError::InvalidEmail { .. })
    ));

    created.assert_async().await;
}
