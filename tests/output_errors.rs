use deckhand::error::{RemoteCommandFailedDetails, SshTargetDetails, TransferFailedDetails};
use deckhand::output::{exit_code_for_error, map_cmd_result_to_json, CliResponse};
use deckhand::{Error, ErrorCode};

#[test]
fn remote_command_failed_serializes_stdout_stderr() {
    let err = Error::remote_command_failed(RemoteCommandFailedDetails {
        command: "uname -a".to_string(),
        exit_code: 127,
        stdout: "some stdout".to_string(),
        stderr: "some stderr".to_string(),
        target: SshTargetDetails {
            host: "example.com".to_string(),
            port: Some(22),
            user: Some("deploy".to_string()),
        },
    });

    let json = CliResponse::<()>::from_error(&err).to_json().unwrap();

    assert!(json.contains("\"code\": \"remote.command_failed\""));
    assert!(json.contains("some stdout"));
    assert!(json.contains("some stderr"));
    assert!(json.contains("\"exitCode\": 127"));
}

#[test]
fn transfer_failed_serializes_paths() {
    let err = Error::transfer_failed(TransferFailedDetails {
        local_path: "/tmp/app".to_string(),
        remote_path: "/opt/apps/web1".to_string(),
        error: "connection reset".to_string(),
    });

    let json = CliResponse::<()>::from_error(&err).to_json().unwrap();

    assert!(json.contains("\"code\": \"transfer.failed\""));
    assert!(json.contains("\"localPath\": \"/tmp/app\""));
    assert!(json.contains("connection reset"));
}

#[test]
fn auth_not_configured_carries_a_hint() {
    let err = Error::ssh_auth_not_configured();
    let json = CliResponse::<()>::from_error(&err).to_json().unwrap();

    assert!(json.contains("\"code\": \"ssh.auth_not_configured\""));
    assert!(json.contains("--password or --key"));
}

#[test]
fn ssh_errors_map_to_exit_code_10() {
    assert_eq!(exit_code_for_error(ErrorCode::SshAuthNotConfigured), 10);
    assert_eq!(exit_code_for_error(ErrorCode::SshAuthFailed), 10);
    assert_eq!(exit_code_for_error(ErrorCode::SshConnectFailed), 10);
    assert_eq!(exit_code_for_error(ErrorCode::SshNotConnected), 10);
}

#[test]
fn remote_and_transfer_errors_map_to_exit_code_20() {
    let err = Error::remote_command_timeout("sleep 100", 5);

    let (_value, exit_code) = map_cmd_result_to_json::<serde_json::Value>(Err(err));
    assert_eq!(exit_code, 20);
    assert_eq!(exit_code_for_error(ErrorCode::TransferFailed), 20);
    assert_eq!(exit_code_for_error(ErrorCode::TransferLocalPathMissing), 20);
}

#[test]
fn validation_errors_map_to_exit_code_2() {
    let err = Error::validation_missing_argument(vec!["service_name".to_string()]);

    let (_value, exit_code) = map_cmd_result_to_json::<serde_json::Value>(Err(err));
    assert_eq!(exit_code, 2);
}

#[test]
fn success_envelope_wraps_data() {
    let response = CliResponse::success(serde_json::json!({ "healthy": true }));
    let json = response.to_json().unwrap();

    assert!(json.contains("\"success\": true"));
    assert!(json.contains("\"healthy\": true"));
    assert!(!json.contains("\"error\""));
}
