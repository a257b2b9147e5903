use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::cycle::stamp::StampSurface;
use crate::geometry::species::ShapeSpecies;
use crate::schedule::scheduler::Scheduler;

type Log = Rc<RefCell<Vec<&'static str>>>;

fn push(log: &Log, entry: &'static str) -> impl FnMut(&mut Scene) + 'static {
    let log = Rc::clone(log);
    move |_| log.borrow_mut().push(entry)
}

fn scene_with_surface() -> Scene {
    let mut scene = Scene::new();
    let id = scene
        .entities
        .shape("dot", ShapeSpecies::path("M0,0 L1,0"))
        .unwrap();
    let mut surface = StampSurface::new("main");
    surface.add(&scene.entities, id).unwrap();
    scene.surfaces.register(surface).unwrap();
    scene
}

#[test]
fn hooks_wrap_each_phase_and_created_runs_once() {
    let log = Log::default();
    let task = RenderTask::new("display")
        .commence(push(&log, "commence"))
        .after_clear(push(&log, "after_clear"))
        .after_compile(push(&log, "after_compile"))
        .after_show(push(&log, "after_show"))
        .after_created(push(&log, "after_created"))
        .into_task();
    assert_eq!(task.order(), 1.0);

    let mut scene = scene_with_surface();
    let mut scheduler = Scheduler::new();
    scheduler.add_task(task).unwrap();
    assert!(scheduler.tick(&mut scene).is_clean());
    assert!(scheduler.tick(&mut scene).is_clean());

    assert_eq!(
        *log.borrow(),
        [
            "commence",
            "after_clear",
            "after_compile",
            "after_show",
            "after_created",
            "commence",
            "after_clear",
            "after_compile",
            "after_show",
        ]
    );
    let surface = scene.surfaces.get_as::<StampSurface>("main").unwrap();
    assert_eq!(surface.frames_shown(), 2);
    assert_eq!(surface.accessibility_checks(), 1);
    assert_eq!(surface.presented().len(), 1);
}

#[test]
fn hook_only_task_leaves_surfaces_alone() {
    let log = Log::default();
    let task = RenderTask::new("hooks")
        .no_target()
        .after_show(push(&log, "after_show"))
        .into_task();
    let mut scene = scene_with_surface();
    let mut scheduler = Scheduler::new();
    scheduler.add_task(task).unwrap();
    scheduler.tick(&mut scene);

    assert_eq!(*log.borrow(), ["after_show"]);
    let surface = scene.surfaces.get_as::<StampSurface>("main").unwrap();
    assert_eq!(surface.frames_shown(), 0);
    assert_eq!(surface.accessibility_checks(), 0);
}

#[test]
fn cycle_failures_go_to_the_error_hook_or_fail_the_tick() {
    let mut scene = scene_with_surface();
    let dot = scene.entities.id_by_name("dot").unwrap();
    scene.entities.update(dot, |e| e.set_scale(f64::NAN)).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut scheduler = Scheduler::new();
    scheduler
        .add_task(
            RenderTask::new("handled")
                .on_error(move |_, report| {
                    sink.borrow_mut().extend(
                        report
                            .failures
                            .iter()
                            .map(|f| (f.phase, f.surface.clone())),
                    )
                })
                .into_task(),
        )
        .unwrap();
    scheduler
        .add_task(RenderTask::new("unhandled").with_order(2.0).into_task())
        .unwrap();

    let report = scheduler.tick(&mut scene);
    assert_eq!(*seen.borrow(), vec![(Phase::Compile, "main".to_string())]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "unhandled");
    assert!(matches!(report.failures[0].1, SceneError::Task(_)));
}

#[test]
fn named_targets_limit_the_cycle() {
    let mut scene = scene_with_surface();
    scene.surfaces.register(StampSurface::new("other")).unwrap();
    let mut scheduler = Scheduler::new();
    scheduler
        .add_task(RenderTask::new("main-only").target("main").into_task())
        .unwrap();
    scheduler.tick(&mut scene);

    let main = scene.surfaces.get_as::<StampSurface>("main").unwrap();
    let other = scene.surfaces.get_as::<StampSurface>("other").unwrap();
    assert_eq!(main.frames_shown(), 1);
    assert_eq!(other.frames_shown(), 0);
}

#[test]
fn render_order_comes_from_settings() {
    let mut settings = Settings::default();
    settings.scheduler.render_order = 7.5;
    let task = RenderTask::with_settings("display", &settings).into_task();
    assert_eq!(task.order(), 7.5);
    assert_eq!(task.name(), "display");
}
