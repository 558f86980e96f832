//! Headless demo: two windmills, one clock-driven and one self-scheduled,
//! with an overlay "lamp" bound between the tower and the blades.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use marrow_engine::compose::DrawMode;
use marrow_engine::coords::{Affine2, Vec2};
use marrow_engine::device::{Gpu, GpuInit};
use marrow_engine::entity::{AnimatedEntity, EntityRef};
use marrow_engine::logging::{init_logging, LoggingConfig};
use marrow_engine::paint::{BlendMode, Color, Color8, Rgb8};
use marrow_engine::render::{RenderCtx, RenderTarget, SkeletonRenderer};
use marrow_engine::scene::{
    DebugCmd, DrawCmd, DrawList, GroupNode, NodeRef, OverlayNode, OwnerId, RenderQueue, ZIndex,
};
use marrow_engine::skeleton::{
    Attachment, Bone, PoseSource, RegionAttachment, Skeleton, Slot, TextureId,
};
use marrow_engine::time::{Clock, FrameScheduler};

const FRAME_DT: f64 = 1.0 / 60.0;
const TARGET_SIZE: u32 = 256;
const BLADES: usize = 4;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let options = Options::from_args()?;

    println!();
    println!("  marrow studio · headless");
    println!("  frames: {}   gpu: {}", options.frames, if options.gpu { "on" } else { "off" });
    println!();

    let clock = Clock::new();
    let scheduler = FrameScheduler::new();

    let fast = AnimatedEntity::new(windmill(), Spin::new(90.0), &clock, &scheduler);
    let slow = AnimatedEntity::new(windmill(), Spin::new(30.0), &clock, &scheduler);
    {
        let mut fast = fast.borrow_mut();
        fast.set_advance_time_by_clock(true);
        fast.set_debug_bones(options.debug);
    }
    clock.set_time_scale(1.5);

    let lamp: NodeRef = Rc::new(RefCell::new(Lamp::default()));
    let group = GroupNode::new_ref();
    slow.borrow_mut()
        .bind_slot_node("tower", Some(lamp.clone()))
        .context("binding the lamp overlay")?;
    fast.borrow_mut()
        .bind_slot_node("tower", Some(group))
        .context("binding an empty group")?;

    let mut gpu_frame = if options.gpu { GpuFrame::try_new() } else { None };

    let mut list = DrawList::new();
    for frame in 0..options.frames {
        clock.advance_time(FRAME_DT);
        scheduler.update(FRAME_DT);

        list.clear();
        let modes = [
            draw_entity(&fast, &mut list, Vec2::new(64.0, 128.0)),
            draw_entity(&slow, &mut list, Vec2::new(192.0, 128.0)),
        ];

        if frame % 30 == 0 || frame + 1 == options.frames {
            let blade = fast.borrow().bone_world_position("blade0");
            log::info!(
                "frame {frame:>4}: clock {:.3}s, {} draw items, modes {modes:?}, fast blade0 at ({:.1}, {:.1})",
                clock.time(),
                list.len(),
                blade.x,
                blade.y
            );
        }

        if let Some(gpu_frame) = gpu_frame.as_mut() {
            gpu_frame.render(&mut list);
        }
    }

    let slow = slow.borrow();
    println!();
    println!("  lamp bound to slot: {:?}", slow.slot_for_node(&lamp));
    println!("  split ranges (slow): {:?}", slow.split_commands());
    println!("  bounds (slow): {:?}", slow.inner_bounding_box());
    println!();
    Ok(())
}

fn draw_entity(entity: &EntityRef, list: &mut DrawList, at: Vec2) -> DrawMode {
    let transform = Affine2::translation(at.x, at.y).then(&Affine2::scale(1.0, -1.0));
    entity.borrow_mut().draw(list, &transform)
}

// ── options ───────────────────────────────────────────────────────────────

struct Options {
    frames: u32,
    gpu: bool,
    debug: bool,
}

impl Options {
    fn from_args() -> Result<Self> {
        let mut options = Options {
            frames: 120,
            gpu: true,
            debug: false,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--frames" => {
                    let value = args.next().context("--frames needs a value")?;
                    options.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count '{value}'"))?;
                }
                "--no-gpu" => options.gpu = false,
                "--debug" => options.debug = true,
                other => anyhow::bail!("unknown argument '{other}'"),
            }
        }
        Ok(options)
    }
}

// ── skeleton ──────────────────────────────────────────────────────────────

fn quad(name: &str, w: f32, h: f32, color: Color) -> Attachment {
    Attachment::Region(RegionAttachment {
        name: name.to_string(),
        offset: [-w * 0.5, 0.0, w * 0.5, 0.0, w * 0.5, h, -w * 0.5, h],
        uvs: [0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
        color,
        texture: Some(TextureId(0)),
    })
}

/// Tower on the root bone, a hub at the top and four blades around it.
fn windmill() -> Skeleton {
    let mut bones = vec![Bone::new("root", None, 60.0), Bone::new("hub", Some(0), 0.0)];
    for i in 0..BLADES {
        bones.push(Bone::new(format!("blade{i}"), Some(1), 40.0));
    }

    let mut slots = vec![
        Slot::new("tower", 0).with_attachment(quad("tower", 12.0, 60.0, Color::new(0.6, 0.4, 0.2, 1.0))),
    ];
    for i in 0..BLADES {
        let blade = Slot::new(format!("blade{i}"), 2 + i)
            .with_attachment(quad("blade", 8.0, 40.0, Color::WHITE))
            .with_blend_mode(if i % 2 == 0 { BlendMode::Normal } else { BlendMode::Additive });
        slots.push(blade);
    }

    let mut skeleton = Skeleton::new(bones, slots);
    Spin::new(0.0).update(0.0, &mut skeleton);
    skeleton
}

/// Rotates every blade bone around the hub at a fixed angular speed.
struct Spin {
    degrees_per_second: f32,
    angle: f32,
}

impl Spin {
    fn new(degrees_per_second: f32) -> Self {
        Self {
            degrees_per_second,
            angle: 0.0,
        }
    }
}

impl PoseSource for Spin {
    fn update(&mut self, dt: f32, skeleton: &mut Skeleton) {
        self.angle = (self.angle + dt * self.degrees_per_second) % 360.0;

        let hub = Vec2::new(0.0, 60.0);
        if let Some(bone) = skeleton.bones.get_mut(1) {
            bone.set_world_transform(hub, 0.0, Vec2::new(1.0, 1.0));
        }
        for i in 0..BLADES {
            let rotation = self.angle + 360.0 / BLADES as f32 * i as f32;
            if let Some(bone) = skeleton.bones.get_mut(2 + i) {
                bone.set_world_transform(hub, rotation - 90.0, Vec2::new(1.0, 1.0));
            }
        }
    }

    fn has_animation(&self, name: &str) -> bool {
        name == "spin"
    }
}

// ── overlay ───────────────────────────────────────────────────────────────

/// Overlay that marks where it was placed with a small cross.
struct Lamp {
    position: Vec2,
    color: Rgb8,
    opacity: u8,
    visible: bool,
    parent: Option<OwnerId>,
}

impl Default for Lamp {
    fn default() -> Self {
        Self {
            position: Vec2::zero(),
            color: Rgb8::WHITE,
            opacity: 255,
            visible: true,
            parent: None,
        }
    }
}

impl OverlayNode for Lamp {
    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
    fn set_rotation(&mut self, _degrees: f32) {}
    fn set_scale(&mut self, _scale_x: f32, _scale_y: f32) {}
    fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity;
    }
    fn set_color(&mut self, color: Rgb8) {
        self.color = color;
    }
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
    fn is_visible(&self) -> bool {
        self.visible
    }
    fn parent(&self) -> Option<OwnerId> {
        self.parent
    }
    fn set_parent(&mut self, parent: Option<OwnerId>) {
        self.parent = parent;
    }

    fn visit(&mut self, queue: &mut dyn RenderQueue, parent_transform: &Affine2, z: ZIndex) {
        if !self.visible {
            return;
        }
        let mut cmd = DebugCmd::new(*parent_transform);
        let color = Color8::new(self.color.r, self.color.g, 64, self.opacity);
        cmd.push_point(self.position + Vec2::new(0.0, 30.0), color, 10.0);
        queue.push(z, DrawCmd::Debug(cmd));
    }
}

// ── gpu ───────────────────────────────────────────────────────────────────

/// Offscreen GPU state; absent when no adapter is available.
struct GpuFrame {
    gpu: Gpu,
    target: marrow_engine::device::OffscreenTarget,
    renderer: SkeletonRenderer,
}

impl GpuFrame {
    fn try_new() -> Option<Self> {
        match Self::new() {
            Ok(frame) => Some(frame),
            Err(err) => {
                log::warn!("gpu unavailable, continuing without rendering: {err:#}");
                None
            }
        }
    }

    fn new() -> Result<Self> {
        let gpu = Gpu::headless_blocking(GpuInit::default())?;
        let target = gpu.create_target(TARGET_SIZE, TARGET_SIZE)?;
        let mut renderer = SkeletonRenderer::new();

        let ctx = RenderCtx::new(gpu.device(), gpu.queue(), target.format(), target.viewport());
        renderer
            .register_texture(&ctx, TextureId(0), 1, 1, &[255, 255, 255, 255])
            .context("registering the white texture")?;
        log::info!("rendering on '{}'", gpu.adapter_info().name);

        Ok(Self { gpu, target, renderer })
    }

    fn render(&mut self, list: &mut DrawList) {
        let ctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.target.format(),
            self.target.viewport(),
        );
        let mut encoder = self.gpu.create_encoder();
        {
            let mut target = RenderTarget::new(&mut encoder, self.target.view())
                .with_clear(wgpu::Color { r: 0.1, g: 0.12, b: 0.16, a: 1.0 });
            self.renderer.render(&ctx, &mut target, list);
        }
        self.gpu.submit(encoder);
    }
}
