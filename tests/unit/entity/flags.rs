use super::*;

#[test]
fn stages_only_raise_later_stages() {
    for (i, stage) in Stage::ORDER.iter().enumerate() {
        let earlier_or_self = Stage::ORDER[..=i]
            .iter()
            .fold(Dirty::empty(), |acc, s| acc | s.flag());
        assert!(
            !stage.downstream().intersects(earlier_or_self),
            "{} may re-dirty an earlier stage",
            stage.label()
        );
    }
}

#[test]
fn stage_flags_are_distinct_and_cover_all_stages() {
    let mut seen = Dirty::empty();
    for stage in Stage::ORDER {
        assert!(!seen.intersects(stage.flag()));
        seen |= stage.flag();
    }
    assert_eq!(seen, Dirty::STAGES);
    assert!(!Dirty::STAGES.contains(Dirty::POSITION_SUBSCRIBERS));
}

#[test]
fn order_matches_derived_ordering() {
    let mut sorted = Stage::ORDER;
    sorted.sort();
    assert_eq!(sorted, Stage::ORDER);
}
