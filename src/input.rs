//! Terminal events to camera actions.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::camera::{Camera, CameraMovement, MouseLook};

/// Simulated frame time per key press; with the default camera speed a press
/// moves half a unit.
pub const KEY_STEP_SECONDS: f32 = 0.2;

/// Mouse offset per look key, 10 degrees at the default sensitivity.
pub const LOOK_STEP: f32 = 100.0;

/// Mouse offset per terminal cell the pointer travels.
pub const CELL_LOOK_SCALE: f32 = 20.0;

pub const ZOOM_STEP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Quit,
    Move(CameraMovement),
    Look { x_offset: f32, y_offset: f32 },
    Zoom(f32),
    Resize { cols: u16, rows: u16 },
}

pub fn key_action(key: &KeyEvent) -> Option<InputAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(InputAction::Quit);
    }

    let look = |x_offset, y_offset| Some(InputAction::Look { x_offset, y_offset });
    match key.code {
        KeyCode::Char('x') | KeyCode::Esc => Some(InputAction::Quit),
        KeyCode::Char('w') | KeyCode::Up => Some(InputAction::Move(CameraMovement::Forward)),
        KeyCode::Char('s') | KeyCode::Down => Some(InputAction::Move(CameraMovement::Backward)),
        KeyCode::Char('a') | KeyCode::Left => Some(InputAction::Move(CameraMovement::Left)),
        KeyCode::Char('d') | KeyCode::Right => Some(InputAction::Move(CameraMovement::Right)),
        KeyCode::Char('e') => Some(InputAction::Move(CameraMovement::Up)),
        KeyCode::Char('q') => Some(InputAction::Move(CameraMovement::Down)),
        KeyCode::Char('h') => look(-LOOK_STEP, 0.0),
        KeyCode::Char('l') => look(LOOK_STEP, 0.0),
        KeyCode::Char('j') => look(0.0, LOOK_STEP),
        KeyCode::Char('k') => look(0.0, -LOOK_STEP),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(InputAction::Zoom(ZOOM_STEP)),
        KeyCode::Char('-') => Some(InputAction::Zoom(-ZOOM_STEP)),
        _ => None,
    }
}

/// Tracks pointer position across events so mouse motion becomes look
/// offsets.
#[derive(Debug, Default)]
pub struct InputState {
    mouse: MouseLook,
}

impl InputState {
    pub fn action(&mut self, event: &Event) -> Option<InputAction> {
        match event {
            Event::Key(key) => key_action(key),
            Event::Mouse(mouse) => self.mouse_action(mouse),
            Event::Resize(cols, rows) => Some(InputAction::Resize {
                cols: *cols,
                rows: *rows,
            }),
            _ => None,
        }
    }

    fn mouse_action(&mut self, mouse: &MouseEvent) -> Option<InputAction> {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                // Cells are about twice as tall as they are wide
                let (dx, dy) = self
                    .mouse
                    .offset(mouse.column as f32, mouse.row as f32 * 2.0)?;
                Some(InputAction::Look {
                    x_offset: dx * CELL_LOOK_SCALE,
                    y_offset: dy * CELL_LOOK_SCALE,
                })
            }
            MouseEventKind::ScrollUp => Some(InputAction::Zoom(ZOOM_STEP)),
            MouseEventKind::ScrollDown => Some(InputAction::Zoom(-ZOOM_STEP)),
            _ => None,
        }
    }
}

/// Applies a camera action. `Quit` and `Resize` belong to the caller and are
/// ignored here.
pub fn apply(camera: &mut Camera, action: InputAction) {
    match action {
        InputAction::Move(direction) => camera.process_keyboard(direction, KEY_STEP_SECONDS),
        InputAction::Look { x_offset, y_offset } => {
            camera.process_mouse_movement(x_offset, y_offset, true)
        }
        InputAction::Zoom(amount) => camera.process_mouse_scroll(amount),
        InputAction::Quit | InputAction::Resize { .. } => {}
    }
}
