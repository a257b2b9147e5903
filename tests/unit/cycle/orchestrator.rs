use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::cycle::surface::{Clearable, Compilable, RootSurface, Showable};
use crate::foundation::error::SceneResult;

type Log = Rc<RefCell<Vec<String>>>;

struct Probe {
    name: &'static str,
    order: f64,
    log: Log,
    phases: Vec<Phase>,
    fail: Option<Phase>,
}

impl Probe {
    fn new(name: &'static str, order: f64, log: &Log) -> Self {
        Self {
            name,
            order,
            log: Rc::clone(log),
            phases: Phase::ALL.to_vec(),
            fail: None,
        }
    }

    fn only(mut self, phases: &[Phase]) -> Self {
        self.phases = phases.to_vec();
        self
    }

    fn failing(mut self, phase: Phase) -> Self {
        self.fail = Some(phase);
        self
    }

    fn record(&self, phase: Phase) -> SceneResult<()> {
        self.log
            .borrow_mut()
            .push(format!("{}.{}", self.name, phase.label()));
        if self.fail == Some(phase) {
            return Err(SceneError::validation("probe failure"));
        }
        Ok(())
    }
}

impl Clearable for Probe {
    fn clear(&mut self) -> SceneResult<()> {
        self.record(Phase::Clear)
    }
}

impl Compilable for Probe {
    fn compile(&mut self, _entities: &mut EntityStore) -> SceneResult<()> {
        self.record(Phase::Compile)
    }
}

impl Showable for Probe {
    fn show(&mut self) -> SceneResult<()> {
        self.record(Phase::Show)
    }
}

impl RootSurface for Probe {
    fn name(&self) -> &str {
        self.name
    }

    fn order(&self) -> f64 {
        self.order
    }

    fn as_clearable(&mut self) -> Option<&mut dyn Clearable> {
        if self.phases.contains(&Phase::Clear) {
            Some(self)
        } else {
            None
        }
    }

    fn as_compilable(&mut self) -> Option<&mut dyn Compilable> {
        if self.phases.contains(&Phase::Compile) {
            Some(self)
        } else {
            None
        }
    }

    fn as_showable(&mut self) -> Option<&mut dyn Showable> {
        if self.phases.contains(&Phase::Show) {
            Some(self)
        } else {
            None
        }
    }
}

fn taken(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

#[test]
fn render_completes_each_phase_across_all_surfaces_before_the_next() {
    let log = Log::default();
    let mut surfaces = SurfaceStore::new();
    let mut entities = EntityStore::new();
    surfaces.register(Probe::new("s2", 1.0, &log)).unwrap();
    surfaces.register(Probe::new("s1", 0.0, &log)).unwrap();

    let report = render(&mut surfaces, &mut entities, &[]);
    assert!(report.is_clean());
    assert_eq!(
        taken(&log),
        [
            "s1.clear",
            "s2.clear",
            "s1.compile",
            "s2.compile",
            "s1.show",
            "s2.show"
        ]
    );
    assert_eq!(report.calls.len(), 6);
}

#[test]
fn explicit_targets_are_used_verbatim() {
    let log = Log::default();
    let mut surfaces = SurfaceStore::new();
    let mut entities = EntityStore::new();
    surfaces.register(Probe::new("s1", 0.0, &log)).unwrap();
    surfaces.register(Probe::new("s2", 1.0, &log)).unwrap();

    clear(&mut surfaces, &mut entities, &["s2", "s1"]);
    assert_eq!(taken(&log), ["s2.clear", "s1.clear"]);

    show(&mut surfaces, &mut entities, &["s1"]);
    assert_eq!(taken(&log), ["s1.show"]);
}

#[test]
fn missing_capabilities_skip_silently() {
    let log = Log::default();
    let mut surfaces = SurfaceStore::new();
    let mut entities = EntityStore::new();
    surfaces
        .register(Probe::new("viewer", 0.0, &log).only(&[Phase::Show]))
        .unwrap();

    let report = render(&mut surfaces, &mut entities, &[]);
    assert!(report.is_clean());
    assert_eq!(taken(&log), ["viewer.show"]);
    assert_eq!(report.calls, vec![(Phase::Show, "viewer".to_string())]);

    let report = compile(&mut surfaces, &mut entities, &[]);
    assert!(report.calls.is_empty() && report.is_clean());
}

#[test]
fn unknown_targets_are_reported_once_and_skipped() {
    let log = Log::default();
    let mut surfaces = SurfaceStore::new();
    let mut entities = EntityStore::new();
    surfaces.register(Probe::new("s1", 0.0, &log)).unwrap();

    let report = render(&mut surfaces, &mut entities, &["ghost", "s1"]);
    assert_eq!(report.missing, vec!["ghost".to_string()]);
    assert!(!report.is_clean());
    assert_eq!(taken(&log), ["s1.clear", "s1.compile", "s1.show"]);
}

#[test]
fn a_failing_surface_does_not_stop_the_cycle() {
    let log = Log::default();
    let mut surfaces = SurfaceStore::new();
    let mut entities = EntityStore::new();
    surfaces
        .register(Probe::new("s1", 0.0, &log).failing(Phase::Compile))
        .unwrap();
    surfaces.register(Probe::new("s2", 1.0, &log)).unwrap();

    let report = render(&mut surfaces, &mut entities, &[]);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failed(Phase::Compile, "s1"));
    assert!(!report.failed(Phase::Compile, "s2"));
    assert_eq!(
        taken(&log),
        [
            "s1.clear",
            "s2.clear",
            "s1.compile",
            "s2.compile",
            "s1.show",
            "s2.show"
        ]
    );
}

#[test]
fn reordering_a_surface_changes_the_next_cycle() {
    let log = Log::default();
    let mut surfaces = SurfaceStore::new();
    let mut entities = EntityStore::new();
    surfaces.register(Probe::new("s1", 0.0, &log)).unwrap();
    surfaces.register(Probe::new("s2", 1.0, &log)).unwrap();
    assert!(surfaces.set_order("s1", 5.0));

    clear(&mut surfaces, &mut entities, &[]);
    assert_eq!(taken(&log), ["s2.clear", "s1.clear"]);
}
