//! Stepscope terminal replay
//!
//! Trace a reference problem and play it back step by step.
//!
//! ```text
//! stepscope-vis <problem> <input> [target] [speed]
//! stepscope-vis path-sum "[5,4,8,11,null,13,4]" 20 2
//! stepscope-vis brackets "([]{})"
//! ```

use std::env;

use stepscope_replay::{Player, PlayerConfig};
use stepscope_vis::input::parse_speed;
use stepscope_vis::{resolve_visual_state, Problem, Scene};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stepscope=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line args
    let args: Vec<String> = env::args().collect();

    let (Some(name), Some(input)) = (args.get(1), args.get(2)) else {
        eprintln!("usage: stepscope-vis <problem> <input> [target] [speed]");
        eprintln!("problems: {}", Problem::NAMES.join(", "));
        std::process::exit(2);
    };

    let arg = args.get(3).map(String::as_str);

    let speed = args
        .get(4)
        .map(|s| parse_speed(s))
        .transpose()?
        .unwrap_or_default();

    let problem = Problem::parse(name, input, arg)?;
    let scene = Scene::build(&problem)?;

    println!("Stepscope: {}", problem.name());
    println!("==========={}", "=".repeat(problem.name().len()));
    println!();
    println!("  Steps: {}", scene.trace().len());
    println!("  Speed: {}x", speed.multiplier());
    if let Some(layout) = scene.layout() {
        tracing::info!(
            nodes = layout.nodes.len(),
            height = layout.height,
            "tree laid out"
        );
        for node in &layout.nodes {
            println!("  node {} ({}) at ({}, {})", node.id, node.value, node.x, node.y);
        }
    }
    println!();

    let player = Player::spawn(PlayerConfig::default());
    let mut status = player.subscribe();

    player.load_trace(scene.trace().clone()).await?;
    player.set_speed(speed.multiplier()).await?;
    status.mark_changed();

    let mut last_shown = None;
    player.play().await?;
    loop {
        if status.changed().await.is_err() {
            break;
        }
        let current = status.borrow_and_update().clone();

        if last_shown != Some(current.current_index) {
            if let Some(frame) = scene.frame(&resolve_visual_state, current.current_index) {
                println!("{}", frame.caption());
            }
            last_shown = Some(current.current_index);
        }

        if !current.is_playing() && current.current_index == scene.trace().last_index() {
            break;
        }
    }

    player.shutdown().await;
    Ok(())
}
