//! Terminal-based ASCII viewer for procedural meshes
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use sculptr_core::{CameraMode, ShadingMode, Viewer};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub mod controls;
pub mod renderer;
pub mod settings;

pub use controls::{Command, Controls};
pub use renderer::AsciiRenderer;
pub use settings::Settings;

/// Main application struct for terminal mesh viewing
pub struct TerminalApp {
    viewer: Viewer,
    renderer: AsciiRenderer,
    controls: Controls,
    running: bool,
    last_tick: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(viewer: Viewer) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let mut app = Self {
            viewer,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            controls: Controls::new(false),
            running: true,
            last_tick: Instant::now(),
            last_fps_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        app.resize(width, height);
        Ok(app)
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        // Without release reports, held keys only last one frame.
        let release_events = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if release_events {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        self.controls = Controls::new(release_events);
        info!(release_events, "terminal viewer started");

        let result = self.main_loop();

        // Cleanup
        if release_events {
            execute!(stdout(), PopKeyboardEnhancementFlags)?;
        }
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target
        self.last_tick = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(&event);
            }

            // Update
            let dt = frame_start.duration_since(self.last_tick).as_secs_f32();
            self.last_tick = frame_start;
            self.viewer.advance(self.controls.state(), dt);
            self.controls.end_frame();

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: &event::Event) {
        if let event::Event::Resize(width, height) = event {
            self.resize(*width, *height);
            return;
        }

        match self.controls.handle_event(event) {
            Some(Command::Quit) => self.running = false,
            Some(Command::ResetView) => self.viewer.reset_view(),
            Some(Command::ToggleCameraMode) => {
                self.viewer.toggle_camera_mode();
            }
            Some(Command::ToggleShading) => {
                let shading = self.viewer.toggle_shading();
                debug!(?shading, "shading changed");
            }
            Some(Command::ToggleGrid) => {
                let grid = self.renderer.toggle_grid();
                debug!(grid, "grid toggled");
            }
            None => {}
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        let (width, height) = (width as usize, height as usize);
        self.renderer.resize(width, height);
        self.viewer
            .camera_mut()
            .set_aspect(renderer::viewport_aspect(width, height));
    }

    fn render(&mut self) -> io::Result<()> {
        // Clear renderer
        self.renderer.clear();

        // Render mesh
        self.renderer.render(&self.viewer);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let mesh = self.viewer.mesh();
        let mode = match self.viewer.camera().mode {
            CameraMode::FreeFly => "free-fly",
            CameraMode::Orbit => "orbit",
        };
        let shading = match self.viewer.shading() {
            ShadingMode::Flat => "flat",
            ShadingMode::Smooth => "smooth",
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Sculptr | FPS: {:.1} | {} verts {} tris | {} {} | WASD/EQ=Move Arrows/RMB=Look R=Reset M=Mode N=Shading G=Grid Esc=Quit",
                self.fps,
                mesh.vertex_count(),
                mesh.face_count(),
                mode,
                shading,
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
