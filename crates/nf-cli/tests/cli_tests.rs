use clap::error::ErrorKind;
use nf_cli::{Cli, Commands, Parser};
use nf_rest_client::contract::ProcessorState;
use nf_rest_client::{TlsMode, DEFAULT_BASE_URL, GENERATE_FLOW_FILE_TYPE, LOG_ATTRIBUTE_TYPE};
use nf_rest_client_mock::MockNifiServer;
use reqwest::StatusCode;
use std::path::PathBuf;
use std::time::Duration;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["nifi-cli"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

fn cli_for(server: &MockNifiServer, args: &[&str]) -> Cli {
    let url = server.base_url();
    let mut argv = vec![
        "nifi-cli",
        "--url",
        url.as_str(),
        "--password",
        "adminadminadmin",
    ];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    cli.command.run(&cli.connection).await
}

#[test]
fn test_cli_parsing_subcommands() {
    let command = |name: &str| parse(&[name]).command;

    assert!(matches!(command("setup"), Commands::Setup(_)));
    assert!(matches!(command("create-flow"), Commands::CreateFlow(_)));
    assert!(matches!(command("start-flow"), Commands::StartFlow(_)));
    assert!(matches!(command("stop-flow"), Commands::StopFlow(_)));
    assert!(matches!(command("list"), Commands::List(_)));
    assert!(matches!(command("version"), Commands::Version(_)));
}

#[test]
fn test_cli_parsing_global_flags_after_subcommand() {
    let cli = parse(&[
        "list",
        "--url",
        "https://nifi.example:8443",
        "--username",
        "operator",
        "--timeout",
        "5",
        "-vv",
    ]);

    assert_eq!(cli.connection.url, "https://nifi.example:8443");
    assert_eq!(cli.connection.username, "operator");
    assert_eq!(cli.verbose, 2);
    assert_eq!(
        cli.connection.client_config().request_timeout,
        Duration::from_secs(5)
    );
}

#[test]
fn test_cli_parsing_process_group() {
    let cli = parse(&["start-flow", "--process-group", "abc-123"]);
    match cli.command {
        Commands::StartFlow(args) => assert_eq!(args.process_group.as_deref(), Some("abc-123")),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_cli_tls_flags() {
    assert_eq!(parse(&["version"]).connection.tls_mode(), TlsMode::Verify);
    assert_eq!(
        parse(&["--insecure", "version"]).connection.tls_mode(),
        TlsMode::Insecure
    );
    assert_eq!(
        parse(&["--ca-cert", "/etc/nifi/ca.pem", "version"])
            .connection
            .tls_mode(),
        TlsMode::CustomCa(PathBuf::from("/etc/nifi/ca.pem"))
    );
}

#[test]
fn test_cli_insecure_conflicts_with_ca_cert() {
    let err = Cli::try_parse_from([
        "nifi-cli",
        "--insecure",
        "--ca-cert",
        "ca.pem",
        "version",
    ])
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    assert!(err.use_stderr());
}

#[test]
fn test_cli_missing_or_unknown_command_is_usage_error() {
    let missing = Cli::try_parse_from(["nifi-cli"]).unwrap_err();
    assert!(missing.use_stderr());

    let unknown = Cli::try_parse_from(["nifi-cli", "deploy"]).unwrap_err();
    assert_eq!(unknown.kind(), ErrorKind::InvalidSubcommand);
    assert!(unknown.use_stderr());
}

#[test]
fn test_cli_help_is_not_an_error_exit() {
    for argv in [vec!["nifi-cli", "--help"], vec!["nifi-cli", "help"]] {
        let err = Cli::try_parse_from(argv).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());
    }
}

#[test]
fn test_cli_default_url() {
    if std::env::var_os("NIFI_URL").is_none() {
        assert_eq!(parse(&["version"]).connection.url, DEFAULT_BASE_URL);
    }
}

#[tokio::test]
async fn test_version_command() {
    let server = MockNifiServer::start().await.unwrap();
    run(cli_for(&server, &["version"])).await.unwrap();
    assert_eq!(server.token_requests(), 1);
}

#[tokio::test]
async fn test_setup_command() {
    let server = MockNifiServer::start().await.unwrap();
    run(cli_for(&server, &["setup"])).await.unwrap();

    let paths: Vec<String> = server
        .resource_requests()
        .into_iter()
        .map(|r| r.path)
        .collect();
    assert!(paths.iter().any(|p| p == "/nifi-api/flow/about"));
    assert!(paths.iter().any(|p| p == "/nifi-api/flow/process-groups/root"));
}

#[tokio::test]
async fn test_setup_fails_when_not_ready() {
    let server = MockNifiServer::start().await.unwrap();
    server.set_ready(false);

    let err = run(cli_for(&server, &["setup"])).await.unwrap_err();

    assert!(err.to_string().contains("not ready"));
    assert_eq!(server.token_requests(), 0);
}

#[tokio::test]
async fn test_setup_reports_rejected_credentials() {
    let server = MockNifiServer::start().await.unwrap();
    server.reject_credentials(StatusCode::UNAUTHORIZED);

    let err = run(cli_for(&server, &["setup"])).await.unwrap_err();

    assert!(format!("{:#}", err).starts_with("Authentication failed"));
}

#[tokio::test]
async fn test_create_then_start_and_stop_flow() {
    let server = MockNifiServer::start().await.unwrap();

    run(cli_for(&server, &["create-flow"])).await.unwrap();
    let processors = server.processors();
    assert_eq!(processors.len(), 2);
    assert_eq!(server.connections().len(), 1);
    let types: Vec<&str> = processors
        .iter()
        .map(|p| p.component.processor_type.as_str())
        .collect();
    assert_eq!(types, vec![GENERATE_FLOW_FILE_TYPE, LOG_ATTRIBUTE_TYPE]);

    run(cli_for(&server, &["start-flow"])).await.unwrap();
    assert!(server
        .processors()
        .iter()
        .all(|p| p.state() == ProcessorState::Running));

    run(cli_for(&server, &["list"])).await.unwrap();

    run(cli_for(&server, &["stop-flow"])).await.unwrap();
    assert!(server
        .processors()
        .iter()
        .all(|p| p.state() == ProcessorState::Stopped));
}

#[tokio::test]
async fn test_start_flow_without_processors_fails() {
    let server = MockNifiServer::start().await.unwrap();

    let err = run(cli_for(&server, &["start-flow"])).await.unwrap_err();

    assert!(err.to_string().contains("No processors found"));
    assert!(server.mutating_requests().is_empty());
}

#[tokio::test]
async fn test_list_empty_group_succeeds() {
    let server = MockNifiServer::start().await.unwrap();
    run(cli_for(&server, &["list"])).await.unwrap();
}

#[tokio::test]
async fn test_start_flow_tolerates_item_failures() {
    let server = MockNifiServer::start().await.unwrap();
    let ok = server.add_processor("ok", GENERATE_FLOW_FILE_TYPE, ProcessorState::Stopped);
    let broken = server.add_processor("broken", LOG_ATTRIBUTE_TYPE, ProcessorState::Stopped);
    server.fail_processor(&broken);

    run(cli_for(&server, &["start-flow"])).await.unwrap();

    let started = server.processor(&ok).unwrap();
    assert_eq!(started.state(), ProcessorState::Running);
}
