pub mod egui_host;
mod input;
mod timing;

use crate::assets::{self, ModelAsset};
use crate::config::{self, ViewerConfig};
use crate::render::{pick, OrbitCamera, RenderContext};
use crate::scene::{SceneModel, Selection, SELECTED_COLOR, UNSELECTED_COLOR};
use crate::ui::{self, UiActions, UiState};
use egui_host::EguiHost;
use input::{InputState, PointerAction};
use timing::FrameTiming;

use glam::Vec3;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

/// Angular acceleration applied while an arrow key orbits the camera.
const KEY_ORBIT_ACCEL: f32 = 10.0;

pub struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    render: Option<RenderContext>,
    egui: Option<EguiHost>,
    scene: Option<SceneModel>,
    selection: Selection,
    ui: UiState,
    input: InputState,
    camera: OrbitCamera,
    timing: FrameTiming,
    target_frame_duration: Duration,
    next_frame_time: Instant,
    close_requested: bool,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        let timing = FrameTiming::new(config.window_title.clone());
        Self {
            config,
            window: None,
            render: None,
            egui: None,
            scene: None,
            selection: Selection::new(),
            ui: UiState::new(),
            input: InputState::default(),
            camera: OrbitCamera::new(Vec3::ZERO, 5.0),
            timing,
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: Instant::now(),
            close_requested: false,
        }
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(monitor) = window.current_monitor() {
            if let Some(millihz) = monitor.refresh_rate_millihertz() {
                let hz = millihz as f32 / 1000.0;
                if hz > 1.0 {
                    target = Duration::from_secs_f32(1.0 / hz);
                }
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    /// Swap in a freshly loaded model: GPU upload, pick data, camera
    /// framing, and a clean selection/drawer slate.
    fn install_model(&mut self, asset: ModelAsset) {
        if let Some(render) = &mut self.render {
            render.set_model(&asset);
        }
        let scene = SceneModel::from_asset(&asset);
        self.camera.frame_bounds(scene.center, scene.extent);
        self.ui.set_model_name(&asset.name);
        self.ui.set_status(String::new());
        self.ui.close_all();
        self.selection.clear();
        self.scene = Some(scene);
    }

    fn load_initial_model(&mut self) {
        let path = self.config.model_path.clone();
        match assets::load_model(Path::new(&path)) {
            Ok(asset) => self.install_model(asset),
            Err(err) => {
                // The one expected failure path: keep running with an
                // empty scene.
                log::error!("Failed to load model {}: {}", path, err);
                self.ui.set_status(format!("Failed to load {}", path));
            }
        }
    }

    fn open_model_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("glTF", &["gltf", "glb"])
            .pick_file()
        else {
            return;
        };
        log::info!("Loading model: {}", path.display());
        match assets::load_model(&path) {
            Ok(asset) => self.install_model(asset),
            Err(err) => {
                log::warn!("Failed to load model {}: {}", path.display(), err);
                self.ui.set_status(format!("Failed to load {}", path.display()));
            }
        }
    }

    fn handle_click(&mut self, x: f32, y: f32) {
        let Some(render) = &mut self.render else {
            return;
        };
        let Some(scene) = &self.scene else {
            return;
        };
        let (width, height) = render.size();
        let ray = pick::screen_to_ray(
            self.camera.view_projection(),
            width as f32,
            height as f32,
            x,
            y,
        );
        // A click on empty space changes nothing.
        let Some(hit) = scene.pick(&ray) else {
            return;
        };
        let name = scene
            .node_name(hit.node_index)
            .unwrap_or_default()
            .to_string();
        let recolor = apply_pick(&mut self.selection, &mut self.ui, hit.node_index, &name);
        if let Some(previous) = recolor.previous {
            render.set_node_color(previous, UNSELECTED_COLOR);
        }
        if let Some(selected) = recolor.selected {
            render.set_node_color(selected, SELECTED_COLOR);
        }
    }

    fn update_camera(&mut self) {
        let dt = self.timing.frame_dt;
        if self.input.orbit_left {
            self.camera.nudge(-KEY_ORBIT_ACCEL * dt, 0.0);
        }
        if self.input.orbit_right {
            self.camera.nudge(KEY_ORBIT_ACCEL * dt, 0.0);
        }
        if self.input.orbit_up {
            self.camera.nudge(0.0, KEY_ORBIT_ACCEL * dt);
        }
        if self.input.orbit_down {
            self.camera.nudge(0.0, -KEY_ORBIT_ACCEL * dt);
        }
        self.camera.update(dt);
    }

    fn redraw(&mut self) {
        let Some(window) = self.window.clone() else {
            return;
        };
        self.timing.update(&window, Instant::now());
        self.update_camera();

        let Some(egui) = &mut self.egui else {
            return;
        };
        let ui_state = &mut self.ui;
        let mut actions = UiActions::default();
        let egui_frame = egui.run_ui(&window, |ctx| {
            actions = ui_state.draw(ctx);
        });
        if egui_frame.wants_pointer_input {
            self.input.cancel_pointer();
        }
        if actions.open_model {
            self.open_model_dialog();
        }

        if let Some(render) = &mut self.render {
            match render.render(&self.camera, &egui_frame) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of GPU memory, shutting down");
                    self.close_requested = true;
                }
                Err(err) => {
                    log::warn!("Dropped a frame: {}", err);
                }
            }
        }
    }
}

/// Recolor instructions produced by one pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PickRecolor {
    /// Node to restore to the unselected color.
    previous: Option<usize>,
    /// Node to paint with the selected color; None when the picked mesh
    /// has no drawer mapping and keeps its plain color.
    selected: Option<usize>,
}

/// Selection and drawer policy for a pick that hit `node_index` named
/// `name`: restore the old highlight, color and open the matched area, or
/// log and close everything for an unknown one.
fn apply_pick(
    selection: &mut Selection,
    ui: &mut UiState,
    node_index: usize,
    name: &str,
) -> PickRecolor {
    let change = selection.select(node_index);
    match ui::panel_for_area(name) {
        Some(panel) => {
            log::info!("{} clicked", name);
            ui.show_drawer(panel);
            PickRecolor {
                previous: change.previous,
                selected: Some(node_index),
            }
        }
        None => {
            log::info!("Unknown area clicked: {}", name);
            ui.close_all();
            PickRecolor {
                previous: change.previous,
                selected: None,
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(self.config.window_title.as_str())
            .with_inner_size(PhysicalSize::new(
                self.config.window_width.max(1),
                self.config.window_height.max(1),
            ))
            .with_resizable(true);
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        match RenderContext::new(window.clone(), self.config.exposure) {
            Ok(render) => self.render = Some(render),
            Err(err) => {
                log::error!("Failed to initialize rendering: {}", err);
                event_loop.exit();
                return;
            }
        }
        self.egui = Some(EguiHost::new(&window));
        let size = window.inner_size();
        self.camera.set_aspect(size.width, size.height);

        self.load_initial_model();
        self.update_target_frame_duration(&window);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = match (&mut self.egui, &self.window) {
            (Some(egui), Some(window)) => egui.on_window_event(window, &event),
            _ => false,
        };

        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    self.close_requested = true;
                    event_loop.exit();
                    return;
                }
                if !consumed {
                    let pressed = event.state == winit::event::ElementState::Pressed;
                    self.input.handle_key(event.physical_key, pressed);
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(render) = &mut self.render {
                    render.resize(new_size);
                }
                self.camera.set_aspect(new_size.width, new_size.height);
                log::debug!(
                    "Resized to {}x{} (aspect {:.3})",
                    new_size.width,
                    new_size.height,
                    self.camera.aspect()
                );
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = self.window.clone() {
                    let size = window.inner_size();
                    if let Some(render) = &mut self.render {
                        render.resize(size);
                    }
                    self.camera.set_aspect(size.width, size.height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self
                    .input
                    .cursor_moved(position.x as f32, position.y as f32);
                if !consumed {
                    if let PointerAction::Drag { dx, dy } = action {
                        self.camera.apply_drag(dx, dy);
                    }
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.input.cursor_left();
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                if consumed {
                    self.input.cancel_pointer();
                } else {
                    let pressed = state == winit::event::ElementState::Pressed;
                    if let PointerAction::Click { x, y } = self.input.handle_left_button(pressed) {
                        self.handle_click(x, y);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !consumed {
                    let scroll = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                    };
                    self.camera.apply_scroll(scroll);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                if self.close_requested {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }
}

pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = config::load_or_default(Path::new(config::CONFIG_FILE));
    log::info!("🚀 Showroom");
    log::info!("   Model: {}", config.model_path);
    log::info!("   Press ESC or close window to exit");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).expect("Event loop error");

    log::info!("👋 Goodbye!");
}

#[cfg(test)]
mod tests {
    use super::{apply_pick, PickRecolor};
    use crate::scene::Selection;
    use crate::ui::{PanelId, UiState};

    #[test]
    fn picking_two_areas_restores_the_first_and_switches_the_drawer() {
        let mut selection = Selection::new();
        let mut ui = UiState::new();

        let first = apply_pick(&mut selection, &mut ui, 0, "area01");
        assert_eq!(
            first,
            PickRecolor {
                previous: None,
                selected: Some(0)
            }
        );
        assert_eq!(ui.open_panel(), Some(PanelId::Area01));

        let second = apply_pick(&mut selection, &mut ui, 3, "area02");
        assert_eq!(
            second,
            PickRecolor {
                previous: Some(0),
                selected: Some(3)
            }
        );
        assert_eq!(ui.open_panel(), Some(PanelId::Area02));
    }

    #[test]
    fn unknown_area_closes_the_drawer_and_highlights_nothing() {
        let mut selection = Selection::new();
        let mut ui = UiState::new();
        apply_pick(&mut selection, &mut ui, 0, "area03");
        assert_eq!(ui.open_panel(), Some(PanelId::Area03));

        let recolor = apply_pick(&mut selection, &mut ui, 5, "stairwell");
        assert_eq!(recolor.previous, Some(0));
        assert_eq!(recolor.selected, None);
        assert_eq!(ui.open_panel(), None);
        // The unmapped mesh still becomes the last-picked node.
        assert_eq!(selection.current(), Some(5));
    }

    #[test]
    fn repicking_the_same_area_does_not_reset_its_color() {
        let mut selection = Selection::new();
        let mut ui = UiState::new();
        apply_pick(&mut selection, &mut ui, 2, "createdArea");
        let again = apply_pick(&mut selection, &mut ui, 2, "createdArea");
        assert_eq!(again.previous, None);
        assert_eq!(again.selected, Some(2));
        assert_eq!(ui.open_panel(), Some(PanelId::CreatedArea));
    }
}
