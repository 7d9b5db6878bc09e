use std::io::{stdout, BufWriter, IsTerminal};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute, queue, terminal,
};
use glam::Vec3;
use log::{debug, info};

use terraintty::camera::Camera;
use terraintty::cli::{Args, View};
use terraintty::geometry::TerrainMesh;
use terraintty::input::{apply, InputAction, InputState};
use terraintty::renderer::{Renderer, CLEAR_COLOR};
use terraintty::terminal::{pixel_size, present, terminal_size};
use terraintty::world_gen::{HeightMap, TerrainLayer};
use terraintty::NoiseEngine;

const FRAME_TIME: Duration = Duration::from_millis(33); // ~30 FPS

struct TerrainTTY {
    renderer: Renderer,
    height_map: HeightMap,
    mesh: TerrainMesh,
    camera: Camera,
    input: InputState,
    view: View,
    fixed_width: Option<u32>,
    fixed_height: Option<u32>,
}

impl TerrainTTY {
    fn new(args: &Args) -> Result<Self> {
        let config = args.terrain_config();
        config.validate()?;

        let engine = match config.seed {
            Some(seed) => NoiseEngine::with_seed(seed),
            None => NoiseEngine::new(),
        };

        let height_map = HeightMap::generate(&engine, &config)?;

        // Centre the terrain on the origin
        let half = config.grid_size as f32 / 2.0;
        let origin = Vec3::new(-half, 0.0, -half);
        let mesh = TerrainMesh::build(&height_map, config.sections, origin)?;
        info!(
            "Triangulated {} vertices ({} bytes)",
            mesh.vertex_count(),
            mesh.as_bytes().len()
        );

        let camera = Camera::overlooking(&height_map, origin);
        debug!(
            "Camera at {:?}, yaw {:.1}, pitch {:.1}",
            camera.position,
            camera.yaw(),
            camera.pitch()
        );

        let (term_cols, term_rows) = terminal_size();
        let renderer = Self::create_renderer(args.width, args.height, term_cols, term_rows)?;

        Ok(Self {
            renderer,
            height_map,
            mesh,
            camera,
            input: InputState::default(),
            view: args.view,
            fixed_width: args.width,
            fixed_height: args.height,
        })
    }

    fn create_renderer(
        width: Option<u32>,
        height: Option<u32>,
        term_cols: u32,
        term_rows: u32,
    ) -> Result<Renderer> {
        let cols = width.unwrap_or(term_cols);
        // Leave a row for the cursor
        let rows = height.unwrap_or(term_rows.saturating_sub(1));
        let (width, height) = pixel_size(cols, rows);
        Ok(Renderer::new(width, height)?)
    }

    fn handle_input(&mut self) -> Result<bool> {
        // Drain everything queued since the last frame without blocking
        while event::poll(Duration::from_millis(0))? {
            let event = event::read()?;
            match self.input.action(&event) {
                Some(InputAction::Quit) => return Ok(false),
                Some(InputAction::Resize { cols, rows }) => {
                    self.renderer = Self::create_renderer(
                        self.fixed_width,
                        self.fixed_height,
                        cols as u32,
                        rows as u32,
                    )?;
                    execute!(stdout(), terminal::Clear(terminal::ClearType::All))?;
                }
                Some(action) => apply(&mut self.camera, action),
                None => {}
            }
        }
        Ok(true)
    }

    fn render(&mut self) {
        self.renderer.clear(CLEAR_COLOR);
        match self.view {
            View::Top => self.renderer.draw_top_down(&self.height_map),
            View::Perspective => {
                let aspect = self.renderer.aspect();
                self.renderer
                    .draw_sky(self.camera.skybox_view_proj_matrix(aspect).inverse());
                let drawn = self.renderer.draw_mesh(
                    &self.mesh,
                    self.camera.view_proj_matrix(aspect),
                    |vertex| TerrainLayer::classify(vertex.position[1]).color(),
                );
                debug!("Rasterized {} triangles", drawn);
            }
        }
    }

    fn draw_once(&mut self) -> Result<()> {
        self.render();
        let mut out = BufWriter::new(stdout());
        present(&mut out, &self.renderer)
    }

    fn frame_loop(&mut self) -> Result<()> {
        let mut out = BufWriter::new(stdout());
        loop {
            // Handle input first for better responsiveness
            if !self.handle_input()? {
                return Ok(());
            }

            self.render();
            queue!(out, cursor::MoveTo(0, 0))?;
            present(&mut out, &self.renderer)?;

            std::thread::sleep(FRAME_TIME);
        }
    }

    fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.frame_loop();

        execute!(
            stdout(),
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;

        result
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut app = TerrainTTY::new(&args)?;

    if args.once || !stdout().is_terminal() {
        app.draw_once()
    } else {
        app.run()
    }
}
