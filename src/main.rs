use anyhow::Context;
use clap::Parser;
use glam::Vec3;

use stride_core::config::MovementConfig;
use stride_core::ecs::init::{create_crate_entity, create_wall_entity};
use stride_core::ecs::physics::ObstacleField;
use stride_core::ecs::EcsWorld;
use stride_core::init_logging;
use stride_core::movement::{ActionKind, ActionSession, FrameInput, GroundPlane, LogSink, PointerRay};

/// Headless walkthrough of a few planned turns
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Movement config file (created with defaults if missing)
    #[arg(short, long, default_value = "config/movement.json")]
    config: String,

    /// Frame step in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Print the action log as JSON when done
    #[arg(long)]
    dump_events: bool,
}

/// One scripted turn: action, speed and where the pointer lands
struct Turn {
    kind: ActionKind,
    speed: f32,
    target: Vec3,
}

fn build_scene() -> EcsWorld {
    let mut ecs = EcsWorld::new();
    create_wall_entity(
        &mut ecs.world,
        "North Wall",
        Vec3::new(-6.0, 0.0, 14.0),
        Vec3::new(6.0, 0.0, 14.0),
        3.0,
        0.4,
    );
    create_crate_entity(&mut ecs.world, "Supply Crate", Vec3::new(0.0, 0.0, 7.5), 1.0);
    ecs
}

/// Tick until the session is back in Planning, bounded by `max_frames`
fn run_until_planning(session: &mut ActionSession, dt: f32, max_frames: usize) -> usize {
    for frame in 0..max_frames {
        session.tick(&FrameInput::idle(), dt);
        if session.phase() == Some(stride_core::GamePhase::Planning) {
            return frame + 1;
        }
    }
    max_frames
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    log::info!("=== Stride Demo Starting ===");
    let config = MovementConfig::load_or_default(&args.config);
    config.validate().context("movement config is not usable")?;

    let ecs = build_scene();
    log::info!("Scene has {} obstacles", ecs.entity_count());
    let obstacles = ObstacleField::from_world(&ecs);

    let mut session = ActionSession::builder(config)
        .actor(Vec3::ZERO, Vec3::Z)
        .new_phase()
        .picker(GroundPlane::new(0.0))
        .obstacles(obstacles)
        .sink(LogSink)
        .try_build()?;

    let script = [
        Turn {
            kind: ActionKind::Run,
            speed: 5.0,
            target: Vec3::new(0.0, 0.0, 5.0),
        },
        Turn {
            kind: ActionKind::Jump,
            speed: 3.0,
            target: Vec3::new(0.0, 0.0, 10.0),
        },
        Turn {
            kind: ActionKind::Run,
            speed: 1.0,
            target: Vec3::new(4.0, 0.0, 11.0),
        },
    ];

    for (index, turn) in script.iter().enumerate() {
        session.tick(&FrameInput::speed(turn.speed), args.dt);
        session.tick(&FrameInput::select(turn.kind), args.dt);

        let ray = PointerRay::looking_down_at(turn.target);
        session.tick(&FrameInput::point_at(ray), args.dt);

        match session.assessment() {
            Some(assessment) if assessment.is_fully_valid() => {
                log::info!(
                    "Turn {}: {:?} to {} (angle {:.1}°)",
                    index + 1,
                    turn.kind,
                    assessment.target.point,
                    assessment.target.angle
                );
                session.tick(&FrameInput::confirm_at(ray), args.dt);
                let frames = run_until_planning(&mut session, args.dt, 10_000);
                log::info!("Move took {frames} frames");
            }
            Some(assessment) => {
                log::warn!(
                    "Turn {}: target {} rejected (on_arc={}, point_blocked={}, path_blocked={})",
                    index + 1,
                    assessment.target.point,
                    assessment.target.on_arc,
                    assessment.point_blocked,
                    assessment.path_blocked
                );
                session.tick(&FrameInput::cancel(), args.dt);
            }
            None => {
                log::warn!("Turn {}: nothing under the pointer", index + 1);
                session.tick(&FrameInput::cancel(), args.dt);
            }
        }
    }

    log::info!(
        "Finished at {} facing {} after {} committed moves",
        session.actor().position(),
        session.actor().facing(),
        session.action_log().committed_moves()
    );

    if args.dump_events {
        println!("{}", session.action_log().to_json()?);
    }

    Ok(())
}
