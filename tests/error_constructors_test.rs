use onair::error::OnAirError;

#[test]
fn error_constructors_group_1() {
    assert!(matches!(OnAirError::config("x"), OnAirError::Config { .. }));
    assert!(matches!(OnAirError::web("x"), OnAirError::Web { .. }));
    assert!(matches!(OnAirError::io("x"), OnAirError::Io { .. }));
    assert!(matches!(OnAirError::network("x"), OnAirError::Network { .. }));
}

#[test]
fn error_constructors_group_2() {
    let ser = OnAirError::Serialization {
        message: "s".into(),
    };
    assert!(matches!(ser, OnAirError::Serialization { .. }));
    assert!(matches!(OnAirError::api("x"), OnAirError::Api { .. }));
    assert!(matches!(
        OnAirError::validation("f", "m"),
        OnAirError::Validation { .. }
    ));
}

#[test]
fn serde_errors_convert() {
    let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
    assert!(matches!(OnAirError::from(yaml_err), OnAirError::Serialization { .. }));

    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(OnAirError::from(json_err), OnAirError::Serialization { .. }));
}
