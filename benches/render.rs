//! Render backend benchmarks: raster fills, canvas command emission and a
//! full window paint.

#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use paneforge::element::Container;
use paneforge::platform::headless::HeadlessPlatform;
use paneforge::render::{CanvasContext, CanvasSink, CanvasCommand, RasterContext, RenderContext};
use paneforge::text_input::{InputType, TextInput};
use paneforge::{Color, Element, PointF, Rect, RectF, Size, Window, WindowConfig};
use std::hint::black_box;

/// Sink that only counts commands, so the benchmark measures emission.
#[derive(Default)]
struct CountingSink(usize);

impl CanvasSink for CountingSink {
    fn submit(&mut self, _canvas_id: &str, command: &CanvasCommand) {
        self.0 += 1;
        black_box(command);
    }
}

fn scene(ctx: &mut dyn RenderContext) {
    ctx.clear(Color::WHITE);
    for i in 0..20 {
        let f = f64::from(i);
        ctx.push_state();
        ctx.translate(f * 4.0, f * 3.0);
        ctx.clip_rect(RectF::new(0.0, 0.0, 120.0, 80.0));
        ctx.set_fill_color(Color::rgb(10 * i as u8, 100, 200));
        ctx.fill_rounded_rectangle(RectF::new(2.0, 2.0, 60.0, 30.0), 6.0);
        ctx.set_stroke_color(Color::BLACK);
        ctx.draw_line(PointF::new(0.0, 0.0), PointF::new(60.0, 30.0));
        ctx.draw_text("benchmark", PointF::new(4.0, 20.0));
        ctx.pop_state();
    }
}

/// Benchmark the same scene on both backends at several sizes.
fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene");

    for (w, h) in [(160u32, 120u32), (640, 480)] {
        let label = format!("{w}x{h}");
        group.bench_with_input(BenchmarkId::new("raster", &label), &(w, h), |b, &(w, h)| {
            let mut ctx = RasterContext::new(w, h).unwrap();
            b.iter(|| {
                ctx.begin_frame();
                scene(&mut ctx);
            });
        });
        group.bench_with_input(BenchmarkId::new("canvas", &label), &(w, h), |b, &(w, h)| {
            let mut ctx = CanvasContext::new("bench", Size::new(w, h), Box::new(CountingSink::default()));
            b.iter(|| {
                ctx.begin_frame();
                scene(&mut ctx);
            });
        });
    }

    group.finish();
}

/// Benchmark a full window paint with a small form.
fn bench_window_paint(c: &mut Criterion) {
    let mut platform = HeadlessPlatform::new();
    let mut window = Window::create(&mut platform, WindowConfig::new("bench").with_size(320, 240)).unwrap();
    window.show();
    for row in 0..6 {
        let panel = Container::new(format!("panel{row}"))
            .with_bounds(Rect::new(8, 8 + row * 36, 300, 32))
            .with_background(Color::LIGHT_GRAY)
            .into_ref();
        window.add_element(panel);
        let input = TextInput::new(format!("input{row}"), InputType::Text)
            .with_bounds(Rect::new(12, 10 + row * 36, 200, 28))
            .with_text("some text to draw")
            .into_ref();
        window.add_element(input);
    }

    c.bench_function("window_paint_320x240", |b| {
        b.iter(|| {
            window.request_redraw();
            black_box(window.paint().unwrap())
        });
    });
}

criterion_group!(benches, bench_backends, bench_window_paint);
criterion_main!(benches);
