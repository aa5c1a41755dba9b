use anyhow::Context;
use std::{sync::Arc, time::Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowAttributes},
};

use crate::{
    config::AppConfig,
    demo::build_demo_scene,
    gfx::{
        rendering::WgpuContext,
        scene::{FrameControl, Scene},
    },
    input::InputState,
    ui::{inspector_panel, AppDetails, InspectorState},
};

pub struct KilnApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: AppConfig,
    window: Option<Arc<Window>>,
    context: Option<WgpuContext>,
    scene: Option<Scene>,
    input: InputState,
    inspector: InspectorState,
    details: AppDetails,
    start: Instant,
    last_frame: Instant,
    error: Option<anyhow::Error>,
}

impl KilnApp {
    /// Creates the event loop. The window, GPU context and scene are created
    /// once the loop resumes.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let now = Instant::now();
        let details = AppDetails {
            frame_time: 0.0,
            resolution: (config.width, config.height),
            vsync: config.vsync,
        };

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                context: None,
                scene: None,
                input: InputState::new(),
                inspector: InspectorState::default(),
                details,
                start: now,
                last_frame: now,
                error: None,
            },
        })
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("event loop terminated with an error")?;

        match self.app_state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title(self.config.title.clone())
                    .with_inner_size(PhysicalSize::new(self.config.width, self.config.height)),
            )
            .context("failed to create window")?;
        let window = Arc::new(window);

        let mut context = pollster::block_on(WgpuContext::new(window.clone(), self.config.vsync))
            .context("failed to initialise the graphics context")?;
        context.attach_overlay(&window);

        let mut scene =
            build_demo_scene(&mut context, &self.config).context("failed to build the scene")?;
        let (width, height) = window.inner_size().into();
        scene.on_resize(width, height);
        context.resize(width, height);

        self.window = Some(window);
        self.context = Some(context);
        self.scene = Some(scene);
        self.start = Instant::now();
        self.last_frame = self.start;
        Ok(())
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(context), Some(scene), Some(window)) = (
            self.context.as_mut(),
            self.scene.as_mut(),
            self.window.as_ref(),
        ) else {
            return;
        };

        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        let total_time = (now - self.start).as_secs_f32();
        self.last_frame = now;

        if let Some(overlay) = context.overlay_mut() {
            let (keyboard, mouse) = overlay.capture();
            self.input.set_capture(keyboard, mouse);
        }
        if scene.update(dt, total_time, &self.input) == FrameControl::Quit {
            event_loop.exit();
            return;
        }
        self.input.end_frame();

        self.details.frame_time = dt;
        self.details.resolution = context.surface_size();
        let vsync = self.details.vsync;
        if let Some(overlay) = context.overlay_mut() {
            let inspector = &mut self.inspector;
            let details = &mut self.details;
            if let Err(e) = overlay.update_logic(window, |ui| {
                inspector_panel(ui, scene, inspector, details)
            }) {
                log::error!("{}", e);
            }
        }
        if self.details.vsync != vsync {
            context.set_vsync(self.details.vsync);
        }

        if let Err(e) = scene.draw(context, total_time) {
            log::error!("Frame failed: {}", e);
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("{:#}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let (Some(context), Some(window)) = (self.context.as_mut(), self.window.as_ref()) else {
            return;
        };

        // Handle UI input first; capture flags mask the input state afterwards
        if let Some(overlay) = context.overlay_mut() {
            let ui_event: Event<()> = Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            overlay.handle_input(window, &ui_event);
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state,
                        ..
                    },
                ..
            } => {
                self.input.set_key(key_code, state == ElementState::Pressed);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input
                    .set_mouse_button(button, state == ElementState::Pressed);
            }
            WindowEvent::Focused(false) => {
                self.input.release_all();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                context.resize(width, height);
                if let Some(scene) = self.scene.as_mut() {
                    scene.on_resize(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.add_mouse_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
