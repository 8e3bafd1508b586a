/// Profile Linter: validates a character expression roster.
///
/// Usage: profile_linter <profiles.ron | profiles_dir>

use shot_planner::core::profiles::{CharacterExpressionProfile, ProfileRegistry};
use std::collections::HashSet;
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
        println!("Usage: profile_linter <profiles.ron | profiles_dir>");
        process::exit(0);
    }

    let roster_path = Path::new(&args[1]);
    let mut registry = ProfileRegistry::new();
    let mut errors = Vec::new();

    if roster_path.is_file() {
        if let Err(e) = registry.load_from_ron(roster_path) {
            errors.push(format!("{}: {}", roster_path.display(), e));
        }
    } else if roster_path.is_dir() {
        load_profiles_from_dir(roster_path, &mut registry, &mut errors);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", roster_path.display());
        process::exit(1);
    }

    println!("Loaded {} profiles", registry.len());

    let warnings: Vec<String> = registry.profiles().iter().flat_map(lint_profile).collect();

    println!("\n=== Profile Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_profiles_from_dir(dir: &Path, registry: &mut ProfileRegistry, errors: &mut Vec<String>) {
    let mut paths: Vec<_> = match std::fs::read_dir(dir) {
        Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
        Err(e) => {
            errors.push(format!("{}: {}", dir.display(), e));
            return;
        }
    };
    paths.sort();

    for path in paths {
        if path.extension().and_then(|s| s.to_str()) != Some("ron") {
            continue;
        }
        match registry.load_from_ron(&path) {
            Ok(()) => println!("  Loaded: {}", path.display()),
            Err(e) => errors.push(format!("{}: {}", path.display(), e)),
        }
    }
}

fn lint_profile(profile: &CharacterExpressionProfile) -> Vec<String> {
    let mut warnings = Vec::new();

    if profile.deception_tells.is_empty() {
        warnings.push(format!(
            "'{}' has no deception tells; concealing tones will not show on camera",
            profile.key
        ));
    }

    for blank in [
        ("stressed_expression", &profile.stressed_expression),
        ("vulnerable_expression", &profile.vulnerable_expression),
    ]
    .iter()
    .filter(|(_, value)| value.trim().is_empty())
    {
        warnings.push(format!("'{}' has an empty {}", profile.key, blank.0));
    }

    let mut seen = HashSet::new();
    for (keyword, _) in &profile.emotions {
        if keyword.chars().any(char::is_uppercase) {
            warnings.push(format!(
                "'{}' emotion key '{}' has upper-case letters and can never match a tone",
                profile.key, keyword
            ));
        }
        if !seen.insert(keyword.to_lowercase()) {
            warnings.push(format!(
                "'{}' emotion key '{}' is listed more than once; only the first is used",
                profile.key, keyword
            ));
        }
    }

    warnings
}
