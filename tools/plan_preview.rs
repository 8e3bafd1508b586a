/// Plan Preview: runs the shot planner over an episode file and prints the plan.
///
/// Usage: plan_preview <episode.ron> [--profiles <file>] [--config <file>] [--ron]

use shot_planner::core::pipeline::{load_episode, BeatStateProcessor, EpisodePlan};
use shot_planner::schema::annotated::AnnotatedBeat;
use std::path::Path;
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let episode_path = args[1].clone();
    let mut profiles_path = None;
    let mut config_path = None;
    let mut as_ron = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--profiles" if i + 1 < args.len() => {
                i += 1;
                profiles_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--ron" => as_ron = true,
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut builder = BeatStateProcessor::builder();
    if let Some(ref path) = profiles_path {
        builder = builder.profiles_path(path);
    }
    if let Some(ref path) = config_path {
        builder = builder.config_path(path);
    }
    let processor = match builder.build() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let plan = match load_episode(Path::new(&episode_path))
        .and_then(|episode| processor.process_episode(&episode))
    {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    if as_ron {
        match ron::ser::to_string_pretty(&plan, ron::ser::PrettyConfig::default()) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_plan(&plan);
    }
}

fn print_usage() {
    println!("Usage: plan_preview <episode.ron> [--profiles <file>] [--config <file>] [--ron]");
    println!();
    println!("  --profiles <file>  character roster (default: built-in)");
    println!("  --config <file>    planner tuning in RON");
    println!("  --ron              dump the full annotated plan as RON");
}

fn print_plan(plan: &EpisodePlan) {
    println!("=== {} ===", plan.title);
    for scene in &plan.scenes {
        match scene.location {
            Some(ref location) => println!("\nScene {} ({})", scene.scene_number, location),
            None => println!("\nScene {}", scene.scene_number),
        }
        for beat in &scene.beats {
            print_beat(beat);
        }
    }

    let totals = &plan.summary.totals;
    println!("\n--- Summary ---");
    println!("  beats:               {}", totals.total_beats);
    println!("  carryover applied:   {}", totals.carryover_applied);
    println!("  variety adjustments: {}", totals.variety_adjustments);
    println!("  validated fields:    {}", totals.validated_fields);
    for (scene, templates) in &plan.summary.scene_templates {
        let tags: Vec<&str> = templates.iter().map(|t| t.tag()).collect();
        println!("  scene {}: {}", scene, tags.join(", "));
    }
}

fn print_beat(beat: &AnnotatedBeat) {
    println!(
        "  [{}] {} / {}  <{}: {}>",
        beat.beat.id,
        beat.shot_type,
        beat.camera_angle,
        beat.template.tag(),
        beat.template_reason
    );
    for character in &beat.characters {
        let mut line = format!(
            "      {}: {}; {}",
            character.name,
            character.expression,
            character.pose.as_deref().unwrap_or("(no pose)")
        );
        if let Some(ref from) = character.pose_carried_from {
            line.push_str(&format!("  (pose from {})", from));
        }
        if let Some(ref from) = character.expression_carried_from {
            line.push_str(&format!("  (expression from {})", from));
        }
        println!("{}", line);
    }
    if beat.variety.adjusted {
        if let Some(ref reason) = beat.variety.reason {
            println!("      variety: {}", reason);
        }
    }
    for change in &beat.state_changes {
        println!("      state: {:?}", change);
    }
}
