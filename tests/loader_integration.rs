use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use filter_workflow::events::UploadedImage;
use filter_workflow::tasks::loader::load_images;
use image::{ImageFormat, Rgba, RgbaImage};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Counts ERROR events seen while installed.
#[derive(Clone, Default)]
struct ErrorCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn encoded(name: &str, w: u32, h: u32, format: ImageFormat) -> UploadedImage {
    let img = RgbaImage::from_pixel(w, h, Rgba([12, 34, 56, 255]));
    let mut bytes = Vec::new();
    match format {
        ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .write_to(&mut Cursor::new(&mut bytes), format)
            .unwrap(),
        _ => img.write_to(&mut Cursor::new(&mut bytes), format).unwrap(),
    }
    UploadedImage {
        name: name.to_string(),
        data: Arc::from(bytes),
    }
}

#[tokio::test]
async fn empty_input_resolves_to_empty_set() {
    let set = load_images(&[]).await;
    assert!(set.is_empty());
    assert_eq!(set.decoded_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_decode_leaves_a_hole_without_blocking_the_rest() {
    let uploads = vec![
        encoded("first.png", 30, 20, ImageFormat::Png),
        UploadedImage {
            name: "corrupt.jpg".into(),
            data: Arc::from(&b"\xff\xd8\xff garbage"[..]),
        },
        encoded("third.jpg", 7, 9, ImageFormat::Jpeg),
    ];

    let set = tokio::time::timeout(Duration::from_secs(5), load_images(&uploads))
        .await
        .expect("loader must settle even when a decode fails");

    assert_eq!(set.len(), 3);
    assert_eq!(set.decoded_count(), 2);
    assert_eq!(set.get(0).map(|i| (i.width(), i.height())), Some((30, 20)));
    assert!(set.get(1).is_none());
    let third = set.get(2).unwrap();
    assert_eq!(third.name, "third.jpg");
    assert_eq!((third.width(), third.height()), (7, 9));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn format_is_sniffed_from_content_not_name() {
    let upload = encoded("actually-a-png.gif", 3, 3, ImageFormat::Png);
    let set = load_images(&[upload]).await;
    assert_eq!(set.decoded_count(), 1);
    assert_eq!(set.get(0).unwrap().pixels.get_pixel(1, 1).0, [12, 34, 56, 255]);
}

#[test]
fn one_corrupt_upload_logs_exactly_one_error() {
    let counter = ErrorCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let uploads = vec![
        encoded("a.png", 4, 4, ImageFormat::Png),
        UploadedImage {
            name: "b.png".into(),
            data: Arc::from(&b"\x89PNG truncated"[..]),
        },
        encoded("c.png", 5, 3, ImageFormat::Png),
    ];

    let set = tracing::subscriber::with_default(subscriber, || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(load_images(&uploads))
    });

    assert_eq!(set.decoded_count(), 2);
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);
}
