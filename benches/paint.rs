use addgrid::{
    DecodedImage, GridCompositor, LabelPosition, PreviewSurface, RenderSettings, WorkingSurface,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgba, RgbaImage};
use std::hint::black_box;

// Helper function to create a test photo with some texture
fn create_test_image(width: u32, height: u32) -> DecodedImage {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    });
    DecodedImage::try_from(img).unwrap()
}

fn settings(columns: u32, rows: u32, label_position: LabelPosition) -> RenderSettings {
    let mut settings = RenderSettings::default();
    settings.set_columns(columns);
    settings.set_rows(rows);
    settings.set_show_grid(true);
    settings.set_label_position(label_position);
    settings.set_add_watermark(true);
    settings
}

// Benchmark different image sizes
fn bench_image_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("image_sizes");
    let sizes = [(400, 300), (1200, 900), (2400, 1800), (4000, 3000)];
    let compositor = GridCompositor::default();
    let settings = settings(6, 6, LabelPosition::All);

    for size in sizes.iter() {
        let (width, height) = *size;
        let img = create_test_image(width, height);
        let mut working = WorkingSurface::for_image(&img);

        group.bench_with_input(
            BenchmarkId::new("paint", format!("{}x{}", width, height)),
            &img,
            |b, img| {
                b.iter(|| {
                    compositor.paint(img, &settings, &mut working);
                    black_box(&working);
                });
            },
        );
    }
    group.finish();
}

// Benchmark grid density, the label count dominates
fn bench_grid_density(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_density");
    let img = create_test_image(2000, 2000);
    let compositor = GridCompositor::default();
    let mut working = WorkingSurface::for_image(&img);

    let configs = [
        ("sparse_top_left", settings(2, 2, LabelPosition::TopLeft)),
        ("default_all", settings(6, 6, LabelPosition::All)),
        ("dense_all", settings(26, 99, LabelPosition::All)),
    ];

    for (name, settings) in configs {
        group.bench_with_input(BenchmarkId::new("density", name), &img, |b, img| {
            b.iter(|| {
                compositor.paint(img, &settings, &mut working);
                black_box(&working);
            });
        });
    }
    group.finish();
}

// Benchmark the preview projection
fn bench_preview(c: &mut Criterion) {
    let mut group = c.benchmark_group("preview");
    let compositor = GridCompositor::default();

    for size in [(1200, 900), (4000, 3000)] {
        let (width, height) = size;
        let working = WorkingSurface::for_image(&create_test_image(width, height));
        let mut preview = PreviewSurface::default();

        group.bench_with_input(
            BenchmarkId::new("to_preview", format!("{}x{}", width, height)),
            &working,
            |b, working| {
                b.iter(|| {
                    compositor.to_preview(working, &mut preview);
                    black_box(&preview);
                });
            },
        );
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20); // Reduced sample size for faster runs
    targets = bench_image_sizes, bench_grid_density, bench_preview
}
criterion_main!(benches);
