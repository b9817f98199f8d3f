use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use ascii_tween::timer::countdown_face;
use ascii_tween::{
    Animatable, AnimatableId, CellSurface, RecordingPresenter, Rgb, Scene, StageConfig,
    TweenError,
};

fn stage(width: u16, height: u16) -> Scene {
    Scene::with_config(StageConfig::headless(width, height))
        .unwrap()
        .unpaced()
}

fn glyph(ch: char) -> CellSurface {
    CellSurface::from_text(&ch.to_string(), Some(Rgb::WHITE), None)
}

/// Character drawn at `(x, y)` in the last composed frame.
fn char_at(scene: &mut Scene, x: u32, y: u32) -> char {
    scene.compose_frame().get(x, y).map(|c| c.ch).unwrap_or('?')
}

#[test]
fn later_tracked_draws_on_top() {
    let mut scene = stage(6, 2);
    let x = scene.spawn(glyph('X'), 2.5, 0.5, false, false);
    let x = scene.track(x);
    let y = scene.spawn(glyph('Y'), 2.5, 0.5, false, false);
    scene.track(y);
    assert_eq!(char_at(&mut scene, 2, 0), 'Y');

    scene.bring_to_front(x).unwrap();
    assert_eq!(char_at(&mut scene, 2, 0), 'X');
}

#[test]
fn disposables_draw_above_tracked() {
    let mut scene = stage(6, 2);
    let z = scene.spawn(glyph('Z'), 2.5, 0.5, false, false);
    scene.dispose(z);
    let x = scene.spawn(glyph('X'), 2.5, 0.5, false, false);
    let x = scene.track(x);

    assert_eq!(char_at(&mut scene, 2, 0), 'Z');
    scene.bring_to_front(x).unwrap();
    assert_eq!(char_at(&mut scene, 2, 0), 'Z');
}

#[test]
fn background_shows_through_when_nothing_covers_it() {
    let mut scene = stage(4, 1);
    let frame = scene.compose_frame();
    let cell = frame.get(0, 0).unwrap();
    assert_eq!(cell.bg, Some(Rgb::BLACK));
    assert_eq!(scene.frame_number(), 1);
}

#[test]
fn hidden_animatables_are_not_drawn() {
    let mut scene = stage(6, 2);
    let a = scene.spawn(glyph('H'), 2.5, 0.5, true, false);
    let id = scene.track(a);
    assert_eq!(char_at(&mut scene, 2, 0), ' ');

    scene.animatable(id).unwrap().show();
    assert_eq!(char_at(&mut scene, 2, 0), 'H');
}

#[test]
fn frames_advance_motion_and_reach_the_presenter() {
    let mut scene = stage(20, 3);
    let a = scene.spawn(glyph('M'), 0.5, 1.5, false, false);
    let id = scene.track(a);
    scene.animatable(id).unwrap().move_to(10.5, 1.5, 0.5, true).unwrap();

    let mut presenter = RecordingPresenter::new();
    for _ in 0..16 {
        scene.advance_frame(&mut presenter).unwrap();
    }
    assert_eq!(presenter.frames().len(), 16);
    assert_eq!(presenter.last().unwrap().get(10, 1).unwrap().ch, 'M');
    assert!(scene.is_idle());
}

#[test]
fn adopted_animatables_sample_at_the_scene_rate() {
    let config = StageConfig {
        fps: 60,
        ..StageConfig::headless(20, 3)
    };
    let mut scene = Scene::with_config(config).unwrap().unpaced();

    let tracked = scene.track(Animatable::visible(glyph('t'), 0.0, 0.0));
    let disposed = scene.dispose(Animatable::visible(glyph('d'), 0.0, 2.0));
    for id in [tracked, disposed] {
        let a = scene.animatable(id).unwrap();
        assert_eq!(a.fps(), 60);
        a.move_to(10.0, 0.0, 1.0, true).unwrap();
    }

    scene.compose_frame();
    assert_eq!(scene.get(tracked).unwrap().pending_waypoints().count(), 60);
    assert_eq!(scene.get(disposed).unwrap().pending_waypoints().count(), 60);
}

#[test]
fn sixty_first_disposable_evicts_the_first() {
    let mut scene = stage(4, 1);
    let evicted = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&evicted);
    scene.on_disposable_evicted(move |a: Animatable| sink.borrow_mut().push(a.id()));

    let ids: Vec<AnimatableId> = (0..61)
        .map(|_| {
            let a = scene.spawn(glyph('d'), 0.5, 0.5, false, false);
            scene.dispose(a)
        })
        .collect();

    assert_eq!(scene.disposables().len(), 60);
    assert_eq!(*evicted.borrow(), vec![ids[0]]);
    assert!(!scene.contains(ids[0]));
    assert!(scene.contains(ids[1]));
    assert!(scene.contains(ids[60]));
}

#[test]
fn removing_a_disposable_hands_it_back() {
    let mut scene = stage(4, 1);
    let a = scene.spawn(glyph('d'), 0.5, 0.5, false, false);
    let id = scene.dispose(a);

    let removed = scene.remove_disposable(id).unwrap();
    assert_eq!(removed.id(), id);
    assert!(scene.remove_disposable(id).is_none());
    assert!(scene.disposables().is_empty());
}

#[test]
fn unknown_ids_are_reported() {
    let mut scene = stage(4, 1);
    let a = scene.spawn(glyph('u'), 0.5, 0.5, false, false);
    let id = scene.track(a);
    let back = scene.untrack(id).unwrap();
    assert_eq!(back.id(), id);

    assert!(matches!(scene.untrack(id), Err(TweenError::NotFound(missing)) if missing == id));
    assert!(matches!(scene.bring_to_front(id), Err(TweenError::NotFound(_))));
    assert!(scene.animatable(id).is_err());
}

#[test]
fn clear_empties_both_collections() {
    let mut scene = stage(4, 1);
    let a = scene.spawn(glyph('a'), 0.5, 0.5, false, false);
    scene.track(a);
    let b = scene.spawn(glyph('b'), 0.5, 0.5, false, false);
    scene.dispose(b);

    scene.clear();
    assert_eq!(scene.tracked().count(), 0);
    assert!(scene.disposables().is_empty());
}

#[test]
fn zero_fps_config_is_rejected() {
    let config = StageConfig {
        fps: 0,
        ..StageConfig::headless(4, 1)
    };
    assert!(matches!(
        Scene::with_config(config),
        Err(TweenError::InvalidConfig(_))
    ));
}

fn run_until(scene: &mut Scene, mut done: impl FnMut(&Scene) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(scene) && Instant::now() < deadline {
        scene.compose_frame();
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn finished_countdown_is_untracked_and_calls_back() {
    let mut scene = stage(10, 3).with_countdown_tick(Duration::from_millis(5));
    let finished = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&finished);

    let id = scene
        .start_countdown(
            3,
            5.0,
            1.5,
            countdown_face,
            Some(Box::new(move || *flag.borrow_mut() = true)),
        )
        .unwrap();
    assert!(scene.is_tracked(id));
    assert_eq!(scene.get(id).unwrap().original_surface().row_text(0), " 3 ");

    run_until(&mut scene, |s| !s.is_tracked(id));
    assert!(!scene.is_tracked(id));
    assert!(*finished.borrow());
}

#[test]
fn countdown_ticks_replace_the_face() {
    let mut scene = stage(10, 3).with_countdown_tick(Duration::from_millis(50));
    let id = scene
        .start_countdown(5, 5.0, 1.5, countdown_face, None)
        .unwrap();

    let face = |s: &Scene| s.get(id).map(|a| a.original_surface().row_text(0));
    run_until(&mut scene, |s| face(s).is_none_or(|text| text != " 5 "));

    assert!(scene.is_tracked(id));
    let shown = face(&scene).unwrap();
    assert!(
        [" 4 ", " 3 ", " 2 ", " 1 "].contains(&shown.as_str()),
        "unexpected face {shown:?}"
    );
    scene.cancel_countdown();
}

#[test]
fn only_one_countdown_runs_at_a_time() {
    let mut scene = stage(10, 3).with_countdown_tick(Duration::from_millis(200));
    assert!(scene.start_countdown(5, 5.0, 1.5, countdown_face, None).is_some());
    assert!(scene.countdown_running());
    assert!(scene.start_countdown(5, 5.0, 1.5, countdown_face, None).is_none());
    assert_eq!(scene.tracked().count(), 1);
    scene.cancel_countdown();
}

#[test]
fn cancelled_countdown_skips_its_callback() {
    let mut scene = stage(10, 3).with_countdown_tick(Duration::from_millis(200));
    let finished = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&finished);
    let id = scene
        .start_countdown(
            30,
            5.0,
            1.5,
            countdown_face,
            Some(Box::new(move || *flag.borrow_mut() = true)),
        )
        .unwrap();

    scene.cancel_countdown();
    assert!(!scene.countdown_running());
    assert!(!scene.is_tracked(id));
    scene.compose_frame();
    assert!(!*finished.borrow());
}
