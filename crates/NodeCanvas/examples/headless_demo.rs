use glam::{Vec2, Vec4};
use node_canvas::{
    BoxOptions, DrawCommand, EventKind, ManualFrames, PointerInput, RecordingSurface, Scene,
    SceneConfig, StylePatch,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== NodeCanvas Headless Demo ===");

    // 1. Bind a scene to a recording surface (simulating a 1280x720 canvas)
    let frames = ManualFrames::new();
    let mut scene = Scene::new(
        RecordingSurface::new(Vec2::new(1280.0, 720.0)),
        frames.clone(),
        SceneConfig::default(),
    );

    // 2. Populate the scene
    let source = scene.create_box(
        BoxOptions::rect("source", Vec2::new(100.0, 100.0), Vec2::new(150.0, 100.0))
            .with_text("Source"),
    );
    let sink = scene.create_box(
        BoxOptions::rect("sink", Vec2::new(500.0, 300.0), Vec2::new(150.0, 100.0))
            .with_text("Sink"),
    );
    let wire = scene.create_line(Vec2::ZERO, None);
    if let Err(err) = scene.connect(wire, source, sink) {
        eprintln!("connect failed: {err}");
        return;
    }

    scene.on(EventKind::Hover, |scene, event| {
        let name = scene.entity(event.entity).map(|e| e.name.clone());
        println!("  hover -> {name:?}");
    });
    scene.on(EventKind::Click, |scene, event| {
        let highlight = StylePatch {
            fill: Some(Vec4::new(1.0, 0.9, 0.2, 1.0)),
            ..Default::default()
        };
        if let Ok(true) = scene.set_style(event.entity, &highlight) {
            println!("  highlighted {:?}", event.entity);
        }
    });

    // 3. Simulate a short pointer session
    let session = [
        PointerInput::moved(Vec2::new(150.0, 150.0)),
        PointerInput::click(Vec2::new(150.0, 150.0)),
        PointerInput::down(Vec2::new(150.0, 150.0)),
        PointerInput::moved(Vec2::new(250.0, 450.0)),
        PointerInput::up(Vec2::new(250.0, 450.0)),
        PointerInput::moved(Vec2::new(1000.0, 700.0)),
    ];

    for (frame, input) in session.into_iter().enumerate() {
        println!("\n--- Frame {} ---", frame);
        let events = scene.handle_pointer(input);
        println!("Input: {:?} -> {} event(s)", input.kind, events.len());

        // The host's animation tick
        if let Some(handle) = frames.fire() {
            let ran = scene.run_frame(handle);
            println!("Flushed {} batched callback(s)", ran);
        }

        let painted = scene.surface_mut().take();
        let strokes = painted
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Stroke { .. }))
            .count();
        println!("Generated {} draw commands ({} strokes)", painted.len(), strokes);
    }

    if let Some(line) = scene.entity(wire) {
        let end = line.arrow().map(|a| a.end_position);
        println!("\nWire now runs from {} to {:?}", line.position, end);
    }
}
