use std::io::Write;

use ascii_tween::script::{Action, CueRunner, CueSheet};
use ascii_tween::{Point, RecordingPresenter, Scene, SlotPolicy, StageConfig, TweenError};

const DEAL: &str = r#"{
    "title": "deal",
    "actors": [
        { "name": "card", "text": "A", "x": 0.5, "y": 0.5, "fg": "white" },
        { "name": "chip", "text": "o", "x": 9.5, "y": 0.5, "disposable": true }
    ],
    "cues": [
        { "frame": 0, "actor": "card", "verb": "move", "x": 5.5, "y": 0.5, "duration": 0.5, "steady": true },
        { "frame": 2, "actor": "card", "verb": "flash", "color": "red", "intensity": 50 },
        { "frame": 3, "actor": "chip", "verb": "hide" }
    ]
}"#;

fn stage() -> Scene {
    Scene::with_config(StageConfig::headless(10, 1))
        .unwrap()
        .unpaced()
}

#[test]
fn parses_verbs_and_defaults() {
    let sheet = CueSheet::from_json(DEAL).unwrap();
    assert_eq!(sheet.title.as_deref(), Some("deal"));
    assert_eq!(sheet.actors.len(), 2);
    assert!(sheet.actors[1].disposable);
    assert_eq!(sheet.last_cue_frame(), Some(3));

    match &sheet.cues[1].action {
        Action::Flash { duration, intensity, .. } => {
            assert_eq!(*duration, 0.5);
            assert_eq!(*intensity, 50.0);
        }
        other => panic!("expected flash, got {other:?}"),
    }
    assert!(matches!(sheet.cues[2].action, Action::Hide));
}

#[test]
fn policy_is_optional_and_snake_case() {
    let json = r#"{
        "actors": [{ "name": "a", "text": "a", "x": 0, "y": 0 }],
        "cues": [
            { "frame": 0, "actor": "a", "verb": "rotate", "degrees": 90, "policy": "replace" },
            { "frame": 0, "actor": "a", "verb": "scale", "from": 1, "to": 2 }
        ]
    }"#;
    let sheet = CueSheet::from_json(json).unwrap();
    assert!(matches!(
        sheet.cues[0].action,
        Action::Rotate { policy: Some(SlotPolicy::Replace), .. }
    ));
    assert!(matches!(
        sheet.cues[1].action,
        Action::Scale { policy: None, pulse: false, .. }
    ));
}

#[test]
fn unknown_actor_is_rejected() {
    let json = r#"{
        "actors": [{ "name": "a", "text": "a", "x": 0, "y": 0 }],
        "cues": [{ "frame": 0, "actor": "ghost", "verb": "show" }]
    }"#;
    let err = CueSheet::from_json(json).unwrap_err();
    assert!(matches!(err, TweenError::Script(msg) if msg.contains("ghost")));
}

#[test]
fn duplicate_actor_is_rejected() {
    let json = r#"{
        "actors": [
            { "name": "a", "text": "a", "x": 0, "y": 0 },
            { "name": "a", "text": "b", "x": 1, "y": 0 }
        ]
    }"#;
    assert!(matches!(CueSheet::from_json(json), Err(TweenError::Script(_))));
}

#[test]
fn unknown_verb_is_a_parse_error() {
    let json = r#"{
        "actors": [{ "name": "a", "text": "a", "x": 0, "y": 0 }],
        "cues": [{ "frame": 0, "actor": "a", "verb": "teleport" }]
    }"#;
    assert!(matches!(CueSheet::from_json(json), Err(TweenError::Json(_))));
}

#[test]
fn loads_from_disk() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(DEAL.as_bytes())?;
    let sheet = CueSheet::load(file.path())?;
    assert_eq!(sheet.cues.len(), 3);
    Ok(())
}

#[test]
fn runner_plays_the_sheet_headless() {
    let mut scene = stage();
    let mut runner = CueRunner::new(CueSheet::from_json(DEAL).unwrap(), &mut scene).unwrap();
    let card = runner.actor("card").unwrap();
    let chip = runner.actor("chip").unwrap();
    assert!(scene.is_tracked(card));
    assert!(!scene.is_tracked(chip));
    assert!(scene.contains(chip));

    let mut presenter = RecordingPresenter::new();
    while !runner.is_done(&scene) && runner.frame() < 200 {
        runner.fire(&mut scene).unwrap();
        scene.advance_frame(&mut presenter).unwrap();
    }

    assert!(runner.is_done(&scene));
    assert_eq!(scene.get(card).unwrap().center(), Point::new(5.5, 0.5));
    assert!(scene.get(chip).unwrap().is_hidden());

    let last = presenter.last().unwrap();
    assert_eq!(last.get(5, 0).unwrap().ch, 'A');
    assert_eq!(last.get(9, 0).unwrap().ch, ' ');
}

#[test]
fn frame_count_caps_the_run() {
    let json = r#"{
        "actors": [{ "name": "a", "text": "a", "x": 0, "y": 0 }],
        "cues": [{ "frame": 0, "actor": "a", "verb": "move", "x": 9, "y": 0, "duration": 5 }],
        "frame_count": 3
    }"#;
    let mut scene = stage();
    let mut runner = CueRunner::new(CueSheet::from_json(json).unwrap(), &mut scene).unwrap();
    let mut frames = 0;
    while !runner.is_done(&scene) {
        runner.fire(&mut scene).unwrap();
        scene.compose_frame();
        frames += 1;
    }
    assert_eq!(frames, 3);
    assert!(!scene.is_idle());
}
