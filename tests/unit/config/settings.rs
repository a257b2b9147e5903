use super::*;

#[test]
fn empty_object_yields_defaults() {
    let s = Settings::from_json_str("{}").unwrap();
    assert_eq!(s, Settings::default());
    assert_eq!(s.path.precision, 10.0);
    assert_eq!(s.scheduler.render_order, 1.0);
}

#[test]
fn partial_sections_override_only_named_fields() {
    let s = Settings::from_json_str(r#"{"path":{"precision":2.5},"pool":{"max_retained":4}}"#)
        .unwrap();
    assert_eq!(s.path.precision, 2.5);
    assert_eq!(s.path.endpoint_epsilon, PathSettings::default().endpoint_epsilon);
    assert_eq!(s.pool.max_retained, 4);
}

#[test]
fn unknown_fields_and_bad_values_are_rejected() {
    let err = Settings::from_json_str(r#"{"paths":{}}"#).unwrap_err();
    assert!(err.to_string().contains("serialization error:"));

    let err = Settings::from_json_str(r#"{"path":{"precision":0}}"#).unwrap_err();
    assert!(err.to_string().contains("validation error:"));
}

#[test]
fn settings_roundtrip_through_json() {
    let s = Settings {
        path: PathSettings {
            precision: 1.0,
            ..PathSettings::default()
        },
        ..Settings::default()
    };
    let json = s.to_json_pretty().unwrap();
    assert_eq!(Settings::from_json_str(&json).unwrap(), s);
}
