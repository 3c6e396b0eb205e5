use anyhow::Result;
use stagehand_engine::coords::Vec2;
use stagehand_engine::device::GpuInit;
use stagehand_engine::drawable::DrawableProperties;
use stagehand_engine::effects::Effect;
use stagehand_engine::logging::{init_logging, LoggingConfig};
use stagehand_engine::paint::Rgb8;
use stagehand_engine::stage::{QueryBackend, UseGpuMode};
use stagehand_engine::{Bitmap, Stage, StageConfig};

/// Ring of `size` x `size` pixels: opaque `rgba` between radius `size/4` and `size/2`.
fn ring(size: u32, rgba: [u8; 4]) -> Bitmap {
    let c = (size as f32 - 1.0) / 2.0;
    let outer = size as f32 / 2.0;
    let inner = size as f32 / 4.0;
    let mut px = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let r = ((x as f32 - c).powi(2) + (y as f32 - c).powi(2)).sqrt();
            px.extend_from_slice(if r >= inner && r <= outer { &rgba } else { &[0, 0, 0, 0] });
        }
    }
    Bitmap::new(size, size, px)
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    // `STAGEHAND_GPU=1` answers offscreen queries with the wgpu compute pass.
    let backend = match std::env::var("STAGEHAND_GPU").as_deref() {
        Ok("1") => QueryBackend::Gpu(GpuInit::default()),
        _ => QueryBackend::Software,
    };
    let mut config = StageConfig::with_layer_groups(&["background", "sprite", "pen"]);
    config.backend = backend;
    config.client_size = Some(Vec2::new(960.0, 720.0));
    let mut stage = Stage::new(config)?;
    log::info!(
        "stage {:?} on {} backend",
        stage.native_size(),
        stage.offscreen_backend()
    );

    let cat_skin = stage.create_bitmap_skin(Bitmap::filled(48, 48, [255, 140, 0, 255]), 1.0, None)?;
    let ring_skin = stage.create_bitmap_skin(ring(64, [30, 90, 220, 255]), 2.0, None)?;

    let cat = stage.create_drawable("sprite")?;
    stage.update_drawable_skin(cat, Some(cat_skin))?;
    stage.update_drawable_properties(cat, &DrawableProperties::new().position(-60.0, 0.0).direction(75.0));

    let donut = stage.create_drawable("sprite")?;
    stage.update_drawable_skin(donut, Some(ring_skin))?;
    stage.update_drawable_effect(donut, Effect::Fisheye, 40.0);

    let orange = Rgb8::new(255, 140, 0);
    let blue = Rgb8::new(30, 90, 220);

    // Walk the cat across the ring and report what it sees.
    for step in 0..=12 {
        let x = -60.0 + step as f32 * 10.0;
        stage.update_drawable_position(cat, Vec2::new(x, 0.0));
        let touching = stage.is_touching_drawables(cat, None);
        let sees_blue = stage.is_touching_color(cat, blue, None);
        let sees_stage = stage.is_touching_color(cat, stage.background_color(), None);
        log::info!("cat x={x:>5}: touching={touching} blue={sees_blue} background={sees_stage}");
    }

    // Same answer either way, different path.
    for mode in [UseGpuMode::ForceCpu, UseGpuMode::ForceGpu] {
        stage.set_use_gpu_mode(mode);
        log::info!("{mode:?}: ring sees orange = {}", stage.is_touching_color(donut, orange, None));
    }
    stage.set_use_gpu_mode(UseGpuMode::Automatic);

    // Client pixels, y down, 2x the native stage.
    let picked = stage.pick(480.0, 360.0, Some(4.0), Some(4.0), None);
    log::info!("pick at client center: {picked}");

    let fenced = stage.get_fenced_position(cat, Vec2::new(400.0, 0.0));
    log::info!("cat fenced to ({:.1}, {:.1})", fenced.x, fenced.y);
    if let Some(b) = stage.get_bounds(donut) {
        log::info!(
            "ring bounds: left={:.1} right={:.1} bottom={:.1} top={:.1}",
            b.left, b.right, b.bottom, b.top
        );
    }
    Ok(())
}
