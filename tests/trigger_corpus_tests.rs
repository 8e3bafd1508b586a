/// Trigger corpus tests: fixed phrases against the scene-state triggers and
/// the template classifier. Cue matching is heuristic, so it is pinned down
/// by example rather than by proof.

use shot_planner::core::classifier::SceneTemplateClassifier;
use shot_planner::core::persistent::{ScenePersistentStateTracker, StateChange};
use shot_planner::schema::beat::Beat;
use shot_planner::schema::scene_state::{CastName, GearState, MotionState, ScenePersistentState};
use shot_planner::schema::template::SceneTemplate;

fn cast(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn listed(names: &[&str]) -> Vec<CastName> {
    names.iter().map(|s| CastName::new(*s)).collect()
}

fn vehicle_state(motion: MotionState) -> ScenePersistentState {
    ScenePersistentState {
        vehicle: Some("motorcycle".to_string()),
        motion,
        present: cast(&["Cat", "Daniel"]),
        ..Default::default()
    }
}

#[test]
fn motion_corpus() {
    let tracker = ScenePersistentStateTracker::default();
    let corpus: &[(&str, MotionState, MotionState)] = &[
        ("Cat pulls over by the pier.", MotionState::InMotion, MotionState::Parked),
        ("She kills the engine.", MotionState::InMotion, MotionState::Parked),
        ("The bike rolls to a stop.", MotionState::InMotion, MotionState::Parked),
        ("Daniel dismounts, legs shaking.", MotionState::InMotion, MotionState::Parked),
        ("They park under the bridge.", MotionState::InMotion, MotionState::Parked),
        ("Cat brakes hard.", MotionState::InMotion, MotionState::Parked),
        ("Cat twists the throttle.", MotionState::Parked, MotionState::InMotion),
        ("They speed off into the rain.", MotionState::Parked, MotionState::InMotion),
        ("The bike is accelerating again.", MotionState::Parked, MotionState::InMotion),
        ("She mounts up without a word.", MotionState::Parked, MotionState::InMotion),
        ("They pull away from the curb.", MotionState::Parked, MotionState::InMotion),
        // Latest cue in the beat wins.
        ("They ride to the gate and pull over.", MotionState::InMotion, MotionState::Parked),
        ("She brakes, then accelerates through the gap.", MotionState::InMotion, MotionState::InMotion),
        // No cue: untouched.
        ("Daniel checks the map.", MotionState::InMotion, MotionState::InMotion),
        ("Daniel checks the map.", MotionState::Parked, MotionState::Parked),
    ];

    for (text, before, after) in corpus {
        let update = tracker.update(vehicle_state(*before), text, &listed(&["Cat", "Daniel"]));
        assert_eq!(update.state.motion, *after, "motion after {:?}", text);
    }
}

#[test]
fn motion_ignored_without_vehicle() {
    let tracker = ScenePersistentStateTracker::default();
    let state = ScenePersistentState {
        present: cast(&["Cat"]),
        ..Default::default()
    };
    let update = tracker.update(state.clone(), "Cat rides the elevator and brakes nothing.", &listed(&["Cat"]));
    assert_eq!(update.state, state);
}

#[test]
fn gear_corpus() {
    let tracker = ScenePersistentStateTracker::default();
    let corpus: &[(&str, GearState)] = &[
        ("She flips up her visor.", GearState::HelmetVisorUp),
        ("Visor up, he squints.", GearState::HelmetVisorUp),
        ("Cat pulls off her helmet.", GearState::HelmetOff),
        ("Daniel removes the helmet.", GearState::HelmetOff),
        ("He snaps down his visor.", GearState::HelmetDown),
        ("She puts on her helmet.", GearState::HelmetDown),
        ("The visor fogs over.", GearState::Unknown),
    ];

    for (text, expected) in corpus {
        let update = tracker.update(ScenePersistentState::default(), text, &[]);
        assert_eq!(update.state.gear, *expected, "gear after {:?}", text);
    }
}

#[test]
fn departure_corpus() {
    let tracker = ScenePersistentStateTracker::default();
    let both = cast(&["Cat", "Daniel"]);
    let beat = listed(&["Cat", "Daniel"]);
    let corpus: &[(&str, &[&str])] = &[
        ("Daniel leaves.", &["Cat"]),
        ("Cat storms out.", &["Daniel"]),
        ("Daniel walks away without looking back.", &["Cat"]),
        ("Cat slips out through the kitchen.", &["Daniel"]),
        ("Cat watches Daniel disappear into the crowd.", &["Cat"]),
        // Departure verb without a beat-scoped subject: no change.
        ("The ferry leaves the harbor.", &["Cat", "Daniel"]),
        ("Everyone exits.", &["Cat", "Daniel"]),
        ("Rook leaves.", &["Cat", "Daniel"]),
    ];

    for (text, remaining) in corpus {
        let state = ScenePersistentState {
            present: both.clone(),
            ..Default::default()
        };
        let update = tracker.update(state, text, &beat);
        assert_eq!(update.state.present, cast(remaining), "present after {:?}", text);
    }
}

#[test]
fn departure_corpus_with_awkward_names() {
    let tracker = ScenePersistentStateTracker::default();
    let rook = CastName::new("Rook").with_spelling("Sgt. Rook").with_spelling("Sergeant Rook");
    let corpus: &[(&str, Vec<CastName>, &[&str], &[&str])] = &[
        ("Sgt. Rook leaves the room.", vec![rook.clone()], &["Rook", "Cat"], &["Cat"]),
        ("Cat nods to Sgt. Rook. He leaves.", vec![rook.clone()], &["Rook", "Cat"], &["Rook", "Cat"]),
        ("Cat salutes. Sergeant Rook walks away.", vec![rook.clone()], &["Rook", "Cat"], &["Cat"]),
        ("Zoë leaves.", listed(&["Zoë"]), &["Zoë"], &[]),
        ("Zoë storms out, Renée close behind.", listed(&["Zoë", "Renée"]), &["Zoë", "Renée"], &["Renée"]),
        ("Renée exits.", listed(&["Zoë", "Renée"]), &["Zoë", "Renée"], &["Zoë"]),
        (
            "Catherine leaves.",
            vec![CastName::new("Cat").with_spelling("Catherine")],
            &["Cat", "Daniel"],
            &["Daniel"],
        ),
    ];

    for (text, beat, present, remaining) in corpus {
        let state = ScenePersistentState {
            present: cast(present),
            ..Default::default()
        };
        let update = tracker.update(state, text, beat);
        assert_eq!(update.state.present, cast(remaining), "present after {:?}", text);
    }
}

#[test]
fn departure_is_scoped_to_beat_characters() {
    let tracker = ScenePersistentStateTracker::default();
    let state = ScenePersistentState {
        present: cast(&["Cat", "Daniel"]),
        ..Default::default()
    };
    // Daniel is not listed on the beat, so his exit line is not a cue.
    let update = tracker.update(state.clone(), "Daniel leaves.", &listed(&["Cat"]));
    assert_eq!(update.state, state);
}

#[test]
fn arrival_and_return() {
    let tracker = ScenePersistentStateTracker::default();
    let state = ScenePersistentState {
        present: cast(&["Cat"]),
        ..Default::default()
    };
    let update = tracker.update(state, "Daniel walks in, dripping.", &listed(&["Cat", "Daniel"]));
    assert_eq!(update.state.present, cast(&["Cat", "Daniel"]));
    assert_eq!(
        update.changes,
        vec![StateChange::Arrived {
            character: "Daniel".to_string()
        }]
    );
}

#[test]
fn appearance_corpus() {
    let tracker = ScenePersistentStateTracker::default();
    let corpus: &[(&str, &str)] = &[
        ("Daniel suits up in silence.", "suited"),
        ("Daniel changes into a courier uniform.", "changed"),
        ("Daniel strips off the armor.", "civilian"),
    ];
    for (text, phase) in corpus {
        let update = tracker.update(ScenePersistentState::default(), text, &listed(&["Daniel"]));
        assert_eq!(
            update.state.appearance.get("Daniel").map(String::as_str),
            Some(*phase),
            "appearance after {:?}",
            text
        );
    }
}

#[test]
fn template_corpus() {
    let classifier = SceneTemplateClassifier;
    let idle = ScenePersistentState::default();
    let corpus: &[(&str, &[&str], SceneTemplate)] = &[
        ("Rook breaches the door with a shotgun.", &["Rook"], SceneTemplate::Combat),
        ("Cat throws a punch.", &["Cat"], SceneTemplate::Combat),
        ("Gunfire rakes the hallway.", &["Cat"], SceneTemplate::Combat),
        ("Cat creeps along the catwalk.", &["Cat"], SceneTemplate::Stealth),
        ("They hide behind the crates.", &["Cat", "Daniel"], SceneTemplate::Stealth),
        ("Daniel calibrates the suit's sensors.", &["Daniel"], SceneTemplate::SuitUp),
        ("Rook gears up in the armory.", &["Rook"], SceneTemplate::SuitUp),
        ("An apparition drifts through the wall.", &["Cat"], SceneTemplate::Ghost),
        ("The lights flicker and die.", &["Daniel"], SceneTemplate::Ghost),
        ("Harbor skyline at dusk.", &["Cat"], SceneTemplate::Establishing),
        ("Empty corridor.", &[], SceneTemplate::Establishing),
        ("\"We move at midnight,\" Rook says.", &["Rook"], SceneTemplate::IndoorDialogue),
        ("Daniel explains the plan.", &["Daniel", "Cat"], SceneTemplate::IndoorDialogue),
        ("Cat stirs her coffee.", &["Cat"], SceneTemplate::Generic),
    ];

    for (text, characters, expected) in corpus {
        let beat = Beat::new("c-1", 1, *text).with_characters(characters);
        let result = classifier.classify(&beat, &idle);
        assert_eq!(result.template, *expected, "template for {:?}: {}", text, result.reason);
    }
}

#[test]
fn vehicle_rule_needs_motion_or_riding() {
    let classifier = SceneTemplateClassifier;
    let moving = vehicle_state(MotionState::InMotion);
    let parked = vehicle_state(MotionState::Parked);

    let talk = Beat::new("v-1", 1, "\"Left here,\" Daniel says.").with_characters(&["Daniel"]);
    assert_eq!(classifier.classify(&talk, &moving).template, SceneTemplate::Vehicle);
    assert_eq!(classifier.classify(&talk, &parked).template, SceneTemplate::IndoorDialogue);

    let ride = Beat::new("v-2", 1, "Cat is riding again.").with_characters(&["Cat"]);
    assert_eq!(classifier.classify(&ride, &parked).template, SceneTemplate::Vehicle);
}

#[test]
fn combat_outranks_dialogue_and_stealth() {
    let classifier = SceneTemplateClassifier;
    let beat = Beat::new("p-1", 1, "\"Down!\" Rook shouts, and fires at the shadows.")
        .with_characters(&["Rook"]);
    let result = classifier.classify(&beat, &ScenePersistentState::default());
    assert_eq!(result.template, SceneTemplate::Combat);
    assert!(result.reason.starts_with("combat cue"));
}
