//! Backend conformance: the raster and canvas contexts agree on state-stack
//! semantics, and the canvas command stream stays stable.

mod common;

use paneforge::render::{CanvasContext, RasterContext, RecordingSink, RenderContext};
use paneforge::style::{FontStyle, TextStyle};
use paneforge::{Color, PointF, RectF, Size};

fn backends() -> Vec<(&'static str, Box<dyn RenderContext>)> {
    vec![
        ("raster", Box::new(RasterContext::new(64, 48).unwrap())),
        (
            "canvas",
            Box::new(CanvasContext::new("c", Size::new(64, 48), Box::new(RecordingSink::new()))),
        ),
    ]
}

fn scramble(ctx: &mut dyn RenderContext) {
    ctx.translate(7.0, 3.0);
    ctx.scale(2.0, 2.0);
    ctx.clip_rect(RectF::new(1.0, 1.0, 10.0, 10.0));
    ctx.set_fill_color(Color::RED);
    ctx.set_stroke_color(Color::BLUE);
    ctx.set_stroke_width(3.0);
    ctx.set_alpha(0.25);
    ctx.set_shadow(PointF::new(1.0, 1.0), 2.0, Color::BLACK);
    ctx.set_text_style(TextStyle {
        font: FontStyle::new("Mono", 20.0),
        ..TextStyle::default()
    });
}

#[test]
fn push_pop_restores_every_field() {
    common::init_logging();
    for (name, mut ctx) in backends() {
        let base = ctx.state().clone();
        ctx.push_state();
        scramble(ctx.as_mut());
        assert_ne!(ctx.state(), &base, "{name}: scramble had no effect");
        ctx.push_state();
        ctx.reset_transform();
        ctx.pop_state();
        ctx.pop_state();
        assert_eq!(ctx.state(), &base, "{name}");
        assert_eq!(ctx.state_depth(), 0, "{name}");
    }
}

#[test]
fn pop_underflow_resets_to_base() {
    common::init_logging();
    for (name, mut ctx) in backends() {
        let base = ctx.state().clone();
        scramble(ctx.as_mut());
        ctx.pop_state();
        assert_eq!(ctx.state(), &base, "{name}");
        assert_eq!(ctx.state_depth(), 0, "{name}");
    }
}

#[test]
fn clip_is_device_space_and_only_shrinks() {
    common::init_logging();
    for (name, mut ctx) in backends() {
        ctx.translate(10.0, 10.0);
        ctx.clip_rect(RectF::new(0.0, 0.0, 20.0, 20.0));
        ctx.clip_rect(RectF::new(-50.0, -50.0, 500.0, 500.0));
        let clip = ctx.clip_bounds();
        assert_eq!((clip.x, clip.y, clip.width, clip.height), (10, 10, 20, 20), "{name}");
    }
}

#[test]
fn raster_fill_respects_clip() {
    let mut ctx = RasterContext::new(20, 20).unwrap();
    ctx.clear(Color::WHITE);
    ctx.clip_rect(RectF::new(0.0, 0.0, 10.0, 20.0));
    ctx.set_fill_color(Color::RED);
    ctx.fill_rectangle(RectF::new(0.0, 0.0, 20.0, 20.0));
    let surface = ctx.surface();
    assert_eq!(surface.get(5, 5), Some(Color::RED));
    assert_eq!(surface.get(15, 5), Some(Color::WHITE));
}

#[test]
fn canvas_transcript_is_stable() {
    let sink = RecordingSink::new();
    let mut ctx = CanvasContext::new("main", Size::new(32, 32), Box::new(sink.clone()));
    sink.clear();

    ctx.translate(5.0, 5.0);
    ctx.set_fill_color(Color::RED);
    ctx.fill_rectangle(RectF::new(0.0, 0.0, 10.0, 10.0));
    ctx.draw_text("hi", PointF::new(1.0, 12.0));

    insta::assert_snapshot!(sink.transcript(), @r"
    setTransform 1 0 0 1 5 5
    fillStyle rgba(255,0,0,1.000)
    beginPath
    moveTo 0 0
    lineTo 10 0
    lineTo 10 10
    lineTo 0 10
    closePath
    fill
    fillStyle rgba(0,0,0,1.000)
    fillText 1 12 hi
    fillStyle rgba(255,0,0,1.000)
    ");
    assert!(sink.canvas_ids().iter().all(|id| id == "main"));
}
