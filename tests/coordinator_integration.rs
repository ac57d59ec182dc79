use std::io::Cursor;
use std::time::Duration;

use filter_workflow::events::{SelectedFile, UiEvent};
use filter_workflow::export::EXPORT_PREFIX;
use filter_workflow::render::raster::RasterSurface;
use filter_workflow::state::{ControlPanel, FilterParameters, Template};
use filter_workflow::surface::{DrawCommand, FilterOp, RecordingSurface};
use filter_workflow::tasks::coordinator::Coordinator;
use image::{ImageFormat, Rgba, RgbaImage};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn png_file(name: &str, w: u32, h: u32) -> SelectedFile {
    let img = RgbaImage::from_pixel(w, h, Rgba([200, 40, 40, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    SelectedFile::from_bytes(name, "image/png", bytes)
}

fn recording() -> Coordinator<RecordingSurface> {
    Coordinator::new(RecordingSurface::default(), std::env::temp_dir())
}

#[tokio::test]
async fn uploads_are_listed_and_drawn() {
    let mut c = recording();
    let accepted = c.upload(vec![
        png_file("a.png", 400, 200),
        SelectedFile::from_bytes("notes.txt", "text/plain", b"hello".to_vec()),
    ]);
    assert_eq!(accepted, 1);
    c.settle().await;

    assert_eq!(c.state().uploaded_images.len(), 1);
    assert_eq!(c.panel().uploaded, vec!["✓ a.png".to_string()]);
    assert_eq!(c.decoded().decoded_count(), 1);

    let (name, rect) = c.surface().images().last().unwrap();
    assert_eq!(name, "a.png");
    assert_eq!((rect.x, rect.y, rect.w, rect.h), (0.0, 200.0, 800.0, 400.0));
}

#[tokio::test]
async fn grid_shows_placeholders_for_missing_and_failed_images() {
    let mut c = recording();
    c.upload(vec![
        png_file("a.png", 10, 10),
        SelectedFile::from_bytes("broken.png", "image/png", b"not a png".to_vec()),
        png_file("c.png", 20, 10),
    ]);
    c.settle().await;
    assert_eq!(c.decoded().len(), 3);
    assert_eq!(c.decoded().decoded_count(), 2);

    c.surface_mut().take_commands();
    assert!(c.select_template("grid"));
    c.settle().await;

    assert_eq!(c.state().current_template, Template::Grid);
    assert_eq!(c.panel().active_template, Template::Grid);
    assert_eq!(c.surface().images().count(), 2);
    let labels: Vec<_> = c.surface().texts().collect();
    assert_eq!(labels.len(), 2);
    assert!(labels.contains(&"Image 4"));
}

#[tokio::test]
async fn unknown_template_leaves_canvas_alone() {
    let mut c = recording();
    c.upload(vec![png_file("a.png", 8, 8)]);
    c.settle().await;
    let generation = c.generation();
    c.surface_mut().take_commands();

    assert!(!c.select_template("slideshow"));
    c.settle().await;
    assert_eq!(c.state().current_template, Template::Single);
    assert_eq!(c.generation(), generation);
    assert!(c.surface().commands().is_empty());
}

#[tokio::test]
async fn applying_twice_does_not_stack() {
    let mut c = recording();
    c.upload(vec![png_file("a.png", 8, 8)]);
    c.settle().await;
    c.toggle_filter("invert", true);
    c.toggle_filter("blur", true);
    c.set_blur(5);

    for _ in 0..2 {
        c.surface_mut().take_commands();
        assert_eq!(c.apply_all_filters(), 2);
        let commands = c.surface().commands();
        assert!(matches!(commands.first(), Some(DrawCommand::Background(_))));
        assert_eq!(
            c.surface().filters().collect::<Vec<_>>(),
            vec![FilterOp::Invert, FilterOp::Blur { radius: 5 }]
        );
    }
}

#[tokio::test]
async fn apply_with_nothing_checked_only_redraws() {
    let mut c = recording();
    c.surface_mut().take_commands();
    assert_eq!(c.apply_all_filters(), 0);
    assert_eq!(c.surface().filters().count(), 0);
    assert_eq!(
        c.surface().texts().collect::<Vec<_>>(),
        vec!["Upload an image to get started"]
    );
}

#[tokio::test]
async fn toggling_back_and_forth_restores_state() {
    let mut c = recording();
    c.toggle_filter("grayscale", true);
    let before = c.state().active_filters.clone();
    c.toggle_filter("posterize", true);
    c.toggle_filter("posterize", false);
    assert_eq!(c.state().active_filters, before);
    assert!(c.panel().checked("grayscale"));
    assert!(!c.panel().checked("posterize"));
}

#[tokio::test]
async fn reset_restores_defaults_and_redraws() {
    let mut c = recording();
    c.upload(vec![png_file("a.png", 8, 8)]);
    c.settle().await;
    c.toggle_filter("threshold", true);
    c.set_blur(9);
    c.set_posterize(2);
    c.set_threshold(0.8);
    assert_eq!(c.panel().readouts.threshold, "0.8");
    c.apply_all_filters();

    let generation = c.generation();
    c.reset_all_filters();
    c.surface_mut().take_commands();
    c.settle().await;

    assert!(c.state().active_filters.is_empty());
    assert_eq!(c.state().parameters, FilterParameters::default());
    let expected = ControlPanel {
        uploaded: vec!["✓ a.png".to_string()],
        ..ControlPanel::default()
    };
    assert_eq!(c.panel(), &expected);
    assert_eq!(c.generation(), generation + 1);
    assert_eq!(c.surface().images().count(), 1);
    assert_eq!(c.surface().filters().count(), 0);
}

#[tokio::test]
async fn export_writes_filtered_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = Coordinator::new(RasterSurface::default(), dir.path());
    c.toggle_filter("invert", true);
    c.set_blur(5);
    c.apply_all_filters();

    let path = c.export().unwrap().unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(EXPORT_PREFIX));
    assert!(name.ends_with("Z.png"));
    let pixels = image::open(&path).unwrap().to_rgba8();
    assert_eq!(pixels.dimensions(), (800, 800));
    // background 240 inverted
    assert_eq!(pixels.get_pixel(5, 5).0, [15, 15, 15, 255]);
}

#[tokio::test]
async fn recording_surface_exports_nothing() {
    let c = recording();
    assert!(c.export().unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_drains_events_then_settles() {
    let mut c = recording();
    let (tx, rx) = mpsc::channel(8);
    tx.send(UiEvent::Upload(vec![png_file("clip.png", 32, 18)]))
        .await
        .unwrap();
    tx.send(UiEvent::SelectTemplate("video".into())).await.unwrap();
    tx.send(UiEvent::ToggleFilter {
        name: "grayscale".into(),
        checked: true,
    })
    .await
    .unwrap();
    drop(tx);

    tokio::time::timeout(
        Duration::from_secs(5),
        c.run(rx, CancellationToken::new(), Duration::from_millis(5)),
    )
    .await
    .expect("run should finish once the channel closes");

    assert_eq!(c.state().current_template, Template::Video);
    assert_eq!(c.state().uploaded_images.len(), 1);
    assert_eq!(c.decoded().decoded_count(), 1);
    assert!(c.state().active_filters.contains("grayscale"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancel_stops_run() {
    let mut c = recording();
    let (_tx, rx) = mpsc::channel::<UiEvent>(1);
    let cancel = CancellationToken::new();
    cancel.cancel();
    tokio::time::timeout(
        Duration::from_secs(2),
        c.run(rx, cancel, Duration::from_millis(16)),
    )
    .await
    .expect("cancelled run should return");
}
