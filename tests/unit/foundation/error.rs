use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SceneError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SceneError::recompute("x")
            .to_string()
            .contains("recompute error:")
    );
    assert!(SceneError::task("x").to_string().contains("task error:"));
    assert!(
        SceneError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SceneError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
