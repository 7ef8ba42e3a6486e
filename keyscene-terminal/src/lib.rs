//! Terminal front end: drives a [`Studio`] and rasterizes its frames as ASCII

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use keyscene_core::{Easing, Studio};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 2.0;

/// Orbit step per key press, in degrees
const ORBIT_STEP: f64 = 5.0;
/// Pan step per key press, in world units
const PAN_STEP: f64 = 20.0;
const ZOOM_STEP: f64 = 0.1;

/// Main application struct for terminal playback
pub struct TerminalApp {
    studio: Studio,
    renderer: AsciiRenderer,
    running: bool,
    last_tick: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(studio: Studio) -> Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(studio, width as usize, height as usize)
    }

    /// App rendering into a `width` x `height` cell grid
    pub fn with_size(studio: Studio, width: usize, height: usize) -> Result<Self> {
        let mut app = Self {
            studio,
            renderer: AsciiRenderer::new(width, height),
            running: true,
            last_tick: Instant::now(),
            last_fps_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        };
        app.fit_viewport(width, height)?;
        Ok(app)
    }

    pub fn studio(&self) -> &Studio {
        &self.studio
    }

    pub fn studio_mut(&mut self) -> &mut Studio {
        &mut self.studio
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Keep the configured viewport height and widen it to the grid's aspect
    fn fit_viewport(&mut self, width: usize, height: usize) -> Result<()> {
        let view_height = self.studio.config().viewport.height;
        let aspect = width as f64 / (height.max(1) as f64 * CELL_ASPECT);
        self.studio
            .rig_mut()
            .resize(view_height * aspect, view_height)?;
        Ok(())
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30);
        self.last_tick = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key)?,
                    Event::Resize(width, height) => self.resize(width as usize, height as usize)?,
                    _ => {}
                }
            }

            let now = Instant::now();
            let delta = (now - self.last_tick).as_secs_f64();
            self.last_tick = now;
            self.studio.update(delta);

            self.render()?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        self.renderer = AsciiRenderer::new(width, height);
        self.fit_viewport(width, height)
    }

    /// Apply one key press to the studio
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }

        let studio = &mut self.studio;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,

            // Camera
            KeyCode::Char('w') | KeyCode::Up => studio.rig_mut().orbit(0.0, ORBIT_STEP)?,
            KeyCode::Char('s') | KeyCode::Down => studio.rig_mut().orbit(0.0, -ORBIT_STEP)?,
            KeyCode::Char('a') | KeyCode::Left => studio.rig_mut().orbit(ORBIT_STEP, 0.0)?,
            KeyCode::Char('d') | KeyCode::Right => studio.rig_mut().orbit(-ORBIT_STEP, 0.0)?,
            KeyCode::Char('i') => studio.rig_mut().pan(0.0, PAN_STEP)?,
            KeyCode::Char('k') => studio.rig_mut().pan(0.0, -PAN_STEP)?,
            KeyCode::Char('j') => studio.rig_mut().pan(-PAN_STEP, 0.0)?,
            KeyCode::Char('l') => studio.rig_mut().pan(PAN_STEP, 0.0)?,
            KeyCode::Char('+') | KeyCode::Char('=') => {
                studio.rig_mut().zoom_by(ZOOM_STEP)?;
            }
            KeyCode::Char('-') => {
                studio.rig_mut().zoom_by(-ZOOM_STEP)?;
            }
            KeyCode::Char('p') => {
                let next = studio.rig().active_kind().next();
                studio.set_projection(next);
            }
            KeyCode::Char('0') => studio.rig_mut().reset()?,

            // Model and playback
            KeyCode::Char('m') => {
                let names: Vec<String> = studio.model_names().iter().map(|s| s.to_string()).collect();
                let current = names.iter().position(|n| n == studio.model_name()).unwrap_or(0);
                let next = &names[(current + 1) % names.len()];
                studio.change_model(next)?;
            }
            KeyCode::Char(' ') => {
                if studio.engine().is_playing() {
                    studio.pause();
                } else {
                    studio.play();
                }
            }
            KeyCode::Char('n') => studio.next(),
            KeyCode::Char('b') => studio.prev(),
            KeyCode::Home => studio.first(),
            KeyCode::End => studio.last(),
            KeyCode::Char('r') => {
                studio.toggle_reverse();
            }
            KeyCode::Char('o') => {
                let replay = !studio.engine().is_replay();
                studio.set_replay(replay);
            }
            KeyCode::Char('e') => {
                let ease = studio.engine().ease();
                let index = Easing::ALL.iter().position(|e| *e == ease).unwrap_or(0);
                studio.set_ease(Easing::ALL[(index + 1) % Easing::ALL.len()]);
            }

            // Frame editing
            KeyCode::Char('f') => studio.add_last(),
            KeyCode::Char('F') => studio.add_first(),
            KeyCode::Char('v') => log_rejected(studio.save_frame()),
            KeyCode::Char('x') => log_rejected(studio.delete_frame()),
            KeyCode::Char('[') => log_rejected(studio.swap_frame_before()),
            KeyCode::Char(']') => log_rejected(studio.swap_frame_after()),
            _ => {}
        }
        Ok(())
    }

    /// Render the current frame into the cell buffers
    pub fn rasterize(&mut self) -> Result<()> {
        let frame = self.studio.frame()?;
        self.renderer.clear();
        self.renderer.render_frame(&frame);
        Ok(())
    }

    /// One status line describing model, camera and playback
    pub fn status_line(&self) -> String {
        let engine = self.studio.engine();
        let zoom = self
            .studio
            .rig()
            .active_camera()
            .map(|c| c.zoom())
            .unwrap_or(1.0);
        format!(
            "keyscene | {} | {} x{:.2} | {} {}{}{} | {} | FPS: {:.1}",
            self.studio.model_name(),
            self.studio.rig().active_kind(),
            zoom,
            engine.status(),
            if engine.is_playing() { "playing" } else { "stopped" },
            if engine.is_reverse() { " rev" } else { "" },
            if engine.is_replay() { " loop" } else { "" },
            engine.ease(),
            self.fps
        )
    }

    fn render(&mut self) -> Result<()> {
        self.rasterize()?;

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;
        self.renderer.draw(&mut stdout)?;

        // UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(self.status_line()),
            cursor::MoveTo(0, 1),
            SetForegroundColor(Color::DarkGrey),
            Print("WASD orbit IJKL pan +/- zoom P projection M model SPACE play N/B step R reverse O loop E ease F/x/[/]/V edit Q quit"),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

fn log_rejected<E: std::fmt::Display>(result: Result<(), E>) {
    if let Err(err) = result {
        log::warn!("edit rejected: {err}");
    }
}
