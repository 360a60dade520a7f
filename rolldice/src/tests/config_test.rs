use super::*;
use ::config::{Config as Source, File, FileFormat};
use crate::{
    config::{NotifyConfig, TelemetryConfig, load_section},
    domain::Config,
    errors::ConfigError,
};

fn source(toml: &str) -> Source {
    Source::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()
        .unwrap()
}

#[test]
fn missing_section_falls_back_to_default() {
    let cfg = NotifyConfig::load(&source("")).unwrap();
    assert_eq!(cfg.endpoint, "https://api.line.me/v2/bot/message/push");
    assert!(cfg.receiver_id.is_empty());
}

#[test]
fn section_values_override_defaults() {
    let cfg = NotifyConfig::load(&source(
        r#"
        [notify]
        receiver_id = "U0001"
        auth_token = "line-token"
        "#,
    ))
    .unwrap();
    assert_eq!(cfg.receiver_id, "U0001");
    assert_eq!(cfg.auth_token, "line-token");
    assert_eq!(cfg.endpoint, NotifyConfig::default().endpoint);
}

#[test]
fn invalid_endpoint_is_rejected() {
    let result = load_section::<NotifyConfig>(&source("[notify]\nendpoint = \"not a url\""), "notify");
    assert!(matches!(
        result,
        Err(ConfigError::ValidationError { ref section, .. }) if section == "notify"
    ));
}

#[test]
fn telemetry_is_named_per_service() {
    let src = source(
        r#"
        [telemetry.rolldice]
        service_name = "rolldice-api"
        otlp_endpoint = "http://collector:4318"
        "#,
    );

    let rolldice = TelemetryConfig::for_service(&src, "rolldice").unwrap();
    assert_eq!(rolldice.service_name, "rolldice-api");
    assert_eq!(rolldice.otlp_endpoint, "http://collector:4318");

    let notification = TelemetryConfig::for_service(&src, "notification").unwrap();
    assert_eq!(notification.service_name, "notification");
    assert!(notification.otlp_endpoint.is_empty());
}

#[test]
fn empty_service_name_is_rejected() {
    let result = TelemetryConfig::for_service(
        &source("[telemetry.rolldice]\nservice_name = \"\""),
        "rolldice",
    );
    assert!(matches!(
        result,
        Err(ConfigError::ValidationError { ref key, .. }) if key == "rolldice"
    ));
}

#[test]
fn notify_timeout_defaults_and_rejects_zero() {
    let cfg = NotifyConfig::load(&source("")).unwrap();
    assert_eq!(cfg.timeout(), std::time::Duration::from_secs(10));

    let result = load_section::<NotifyConfig>(&source("[notify]\ntimeout = 0"), "notify");
    assert!(matches!(
        result,
        Err(ConfigError::ValidationError { ref section, .. }) if section == "notify"
    ));
}
