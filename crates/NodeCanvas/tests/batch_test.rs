use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use node_canvas::batch::FrameScheduler;
use node_canvas::{BoxOptions, ManualFrames, RecordingSurface, Scene, SceneConfig};

type Log = Rc<RefCell<Vec<u32>>>;

fn setup() -> (Scene<RecordingSurface>, ManualFrames, Log) {
    let frames = ManualFrames::new();
    let scene = Scene::new(
        RecordingSurface::default(),
        frames.clone(),
        SceneConfig::default(),
    );
    (scene, frames, Rc::new(RefCell::new(Vec::new())))
}

fn push(log: &Log, value: u32) -> impl FnOnce(&mut Scene<RecordingSurface>) + 'static {
    let log = log.clone();
    move |_scene: &mut Scene<RecordingSurface>| log.borrow_mut().push(value)
}

#[test]
fn test_five_unkeyed_requests_run_once_in_order() {
    let (mut scene, frames, log) = setup();

    for i in 0..5 {
        scene.defer(push(&log, i), None);
    }

    // Each request replaced the pending tick, leaving only the last one.
    assert_eq!(frames.requested(), 5);
    assert_eq!(frames.cancelled(), 4);
    assert_eq!(scene.pending_frame(), frames.pending());
    assert!(log.borrow().is_empty());

    let handle = frames.fire().unwrap();
    assert_eq!(scene.run_frame(handle), 5);
    assert_eq!(*log.borrow(), vec![0, 1, 2, 3, 4]);

    // The tick is spent.
    assert_eq!(scene.run_frame(handle), 0);
    assert_eq!(log.borrow().len(), 5);
    assert_eq!(scene.pending_frame(), None);
}

#[test]
fn test_same_key_keeps_the_latest_callback() {
    let (mut scene, frames, log) = setup();
    let a = scene.create_box(BoxOptions::rect("a", Vec2::ZERO, Vec2::splat(10.0)));
    let b = scene.create_box(BoxOptions::rect("b", Vec2::ZERO, Vec2::splat(10.0)));

    scene.defer(push(&log, 1), Some(a));
    scene.defer(push(&log, 2), Some(b));
    scene.defer(push(&log, 3), Some(a));
    assert_eq!(scene.pending_callbacks(), 2);

    scene.run_frame(frames.fire().unwrap());

    // The replacement keeps the position of the first request.
    assert_eq!(*log.borrow(), vec![3, 2]);
}

#[test]
fn test_stale_frame_is_ignored() {
    let (mut scene, frames, log) = setup();

    scene.defer(push(&log, 1), None);
    let first = scene.pending_frame().unwrap();
    scene.defer(push(&log, 2), None);

    assert_eq!(scene.run_frame(first), 0);
    assert!(log.borrow().is_empty());

    assert_eq!(scene.run_frame(frames.fire().unwrap()), 2);
    assert_eq!(*log.borrow(), vec![1, 2]);
}

#[test]
fn test_callbacks_added_during_a_frame_wait_for_the_next() {
    let (mut scene, frames, log) = setup();

    let inner = log.clone();
    scene.defer(
        move |scene: &mut Scene<RecordingSurface>| {
            inner.borrow_mut().push(1);
            scene.defer(push(&inner, 2), None);
        },
        None,
    );

    assert_eq!(scene.run_frame(frames.fire().unwrap()), 1);
    assert_eq!(*log.borrow(), vec![1]);
    assert_eq!(scene.pending_callbacks(), 1);

    assert_eq!(scene.run_frame(frames.fire().unwrap()), 1);
    assert_eq!(*log.borrow(), vec![1, 2]);
}

#[test]
fn test_manual_frames_cancel() {
    let mut frames = ManualFrames::new();
    let handle = frames.request_frame();
    assert_eq!(frames.pending(), Some(handle));

    frames.cancel_frame(handle);
    assert_eq!(frames.pending(), None);
    assert_eq!(frames.fire(), None);
}
