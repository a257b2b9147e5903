use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use scene_cycle::{
    FixedFrames, Frame, FrameDriver, IntervalDriver, LockTo, RenderTask, Scene, Scheduler, Settings,
    ShapeSpecies, StampSurface, Task, Vec2,
};

#[derive(Parser, Debug)]
#[command(name = "scene-cycle", version)]
struct Cli {
    /// Settings JSON; defaults apply to anything it leaves out.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample positions along an SVG path and print them as JSON.
    Path(PathArgs),
    /// Drive a small demo scene through the scheduler and print one line per frame.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct PathArgs {
    /// SVG path data, e.g. "M0,0 C50,0 50,100 100,100".
    d: String,

    /// Number of evenly spaced samples from 0 to 1 inclusive.
    #[arg(long, default_value_t = 11)]
    samples: u32,

    /// Correct for uneven curve parametrization.
    #[arg(long)]
    constant_speed: bool,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Frames to run.
    #[arg(long, default_value_t = 10)]
    frames: u64,

    /// Pace frames at this rate instead of running them back to back.
    #[arg(long)]
    fps: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => read_settings(path)?,
        None => Settings::default(),
    };
    match cli.cmd {
        Command::Path(args) => cmd_path(args, &settings),
        Command::Run(args) => cmd_run(args, &settings),
    }
}

fn read_settings(path: &Path) -> anyhow::Result<Settings> {
    let f = File::open(path).with_context(|| format!("open settings '{}'", path.display()))?;
    Settings::from_reader(BufReader::new(f))
        .with_context(|| format!("load settings '{}'", path.display()))
}

fn cmd_path(args: PathArgs, settings: &Settings) -> anyhow::Result<()> {
    if args.samples < 2 {
        anyhow::bail!("--samples must be at least 2");
    }
    // Parse up front so bad input is an error here rather than an empty path.
    ShapeSpecies::path(args.d.clone())
        .build_path(settings.path.curve_tolerance)
        .context("parse path data")?;

    let mut scene = Scene::with_settings(settings);
    let id = scene.entities.shape("path", ShapeSpecies::path(args.d))?;
    scene.entities.update(id, |e| e.set_use_as_path(true))?;

    let length = scene.entities.path_length(id)?;
    let local_box = scene.entities.local_box(id)?;
    let last = f64::from(args.samples - 1);
    let mut points = Vec::with_capacity(args.samples as usize);
    for i in 0..args.samples {
        let p = f64::from(i) / last;
        if let Some(hit) = scene
            .entities
            .path_position_data(id, p, args.constant_speed)?
        {
            points.push(serde_json::json!({ "p": p, "x": hit.x, "y": hit.y, "angle": hit.angle }));
        }
    }

    let out = serde_json::json!({
        "length": length,
        "local_box": local_box,
        "constant_speed": args.constant_speed,
        "points": points,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_run(args: RunArgs, settings: &Settings) -> anyhow::Result<()> {
    let mut scene = Scene::with_settings(settings);
    let entities = &mut scene.entities;

    let track = entities.shape(
        "track",
        ShapeSpecies::Bezier {
            start_control: Vec2::new(120.0, 0.0),
            end_control: Vec2::new(0.0, 200.0),
            end: Vec2::new(300.0, 200.0),
        },
    )?;
    entities.update(track, |e| {
        e.set_start((50.0, 50.0));
        e.set_use_as_path(true);
        e.set_constant_path_speed(true);
    })?;

    let rider = entities.shape(
        "rider",
        ShapeSpecies::Star {
            points: 5,
            outer_radius: 12.0,
            inner_radius: 5.0,
            twist: 0.0,
        },
    )?;
    entities.update(rider, |e| {
        e.set_lock_to(LockTo::Path);
        e.set_add_path_rotation(true);
        e.set_order(1.0);
    })?;
    entities.set_path(rider, Some(track))?;

    let shadow = entities.block("shadow", 8.0, 8.0)?;
    entities.update(shadow, |e| {
        e.set_lock_to(LockTo::Pivot);
        e.set_start((0.0, 20.0));
    })?;
    entities.set_pivot(shadow, Some(rider))?;

    let mut surface = StampSurface::new("main");
    for id in [track, rider, shadow] {
        surface.add(&scene.entities, id)?;
    }
    scene.surfaces.register(surface)?;

    let frames = args.frames.max(1);
    let mut scheduler = Scheduler::with_settings(settings);
    scheduler.add_task(
        Task::<Scene>::new("mover", move |frame: &mut Frame<'_, Scene>| {
            let p = frame.tick() as f64 / (frames - 1).max(1) as f64;
            frame
                .ctx
                .entities
                .update(rider, |e| e.set_path_position(p))
        })
        .with_order(settings.scheduler.task_order),
    )?;
    scheduler.add_task(
        RenderTask::with_settings("display", settings)
            .after_show(move |scene: &mut Scene| {
                let shown = scene
                    .surfaces
                    .get_as::<StampSurface>("main")
                    .map(|s| (s.frames_shown(), s.presented().len()))
                    .unwrap_or_default();
                match (
                    scene.entities.stamp_position(rider),
                    scene.entities.rotation(rider),
                ) {
                    (Ok(at), Ok(rotation)) => println!(
                        "{}",
                        serde_json::json!({
                            "frame": shown.0,
                            "stamped": shown.1,
                            "rider": [at.x, at.y],
                            "rotation": rotation,
                        })
                    ),
                    (Err(err), _) | (_, Err(err)) => tracing::warn!(%err, "rider unavailable"),
                }
            })
            .on_error(|_, report| {
                for f in &report.failures {
                    tracing::warn!(
                        surface = %f.surface,
                        phase = f.phase.label(),
                        error = %f.error,
                        "render failure"
                    );
                }
            })
            .into_task(),
    )?;

    let mut driver: Box<dyn FrameDriver> = match args.fps {
        Some(fps) if fps.is_finite() && fps > 0.0 => Box::new(
            IntervalDriver::new(Duration::from_secs_f64(1.0 / fps)).with_max_frames(frames),
        ),
        Some(fps) => anyhow::bail!("--fps must be a positive number, got {fps}"),
        None => Box::new(FixedFrames::new(frames)),
    };

    if !scheduler.start_loop() {
        anyhow::bail!("frame loop already running");
    }
    let ticks = scheduler.drive(driver.as_mut(), &mut scene);
    scheduler.stop_loop();
    tracing::info!(ticks, "done");
    Ok(())
}
