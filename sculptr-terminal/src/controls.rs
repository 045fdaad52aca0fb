//! Maps crossterm events onto the viewer's input state
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use sculptr_core::{InputState, Movement};

/// Look delta per arrow key press, in pixels
const ARROW_LOOK_PIXELS: f32 = 10.0;
/// Approximate pixel size of one terminal cell, for mouse-look
const CELL_WIDTH_PIXELS: f32 = 8.0;
const CELL_HEIGHT_PIXELS: f32 = 16.0;

/// One-shot actions triggered by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ResetView,
    ToggleCameraMode,
    ToggleShading,
    ToggleGrid,
}

/// Turns terminal events into an [`InputState`] plus discrete commands.
///
/// When the terminal reports key releases, movement keys stay held until
/// released. Otherwise every press counts for a single frame and key repeat
/// keeps the movement going.
#[derive(Debug, Clone)]
pub struct Controls {
    state: InputState,
    release_events: bool,
    drag_origin: Option<(u16, u16)>,
}

impl Controls {
    pub fn new(release_events: bool) -> Self {
        Self {
            state: InputState::new(),
            release_events,
            drag_origin: None,
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<Command> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                None
            }
            _ => None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Option<Command> {
        if key.kind == KeyEventKind::Release {
            if let Some(movement) = movement_for(key.code) {
                self.state.release(movement);
            }
            if self.state.held.is_empty() {
                self.state.fast = false;
            }
            return None;
        }

        if let Some(movement) = movement_for(key.code) {
            self.state.press(movement);
            self.state.fast = is_fast(key);
            return None;
        }

        match key.code {
            KeyCode::Left => self.state.add_look(-ARROW_LOOK_PIXELS, 0.0),
            KeyCode::Right => self.state.add_look(ARROW_LOOK_PIXELS, 0.0),
            KeyCode::Up => self.state.add_look(0.0, -ARROW_LOOK_PIXELS),
            KeyCode::Down => self.state.add_look(0.0, ARROW_LOOK_PIXELS),
            _ => {}
        }

        if key.kind == KeyEventKind::Repeat {
            return None;
        }
        match key.code {
            KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }
            KeyCode::Char('r' | 'R') => Some(Command::ResetView),
            KeyCode::Char('m' | 'M') => Some(Command::ToggleCameraMode),
            KeyCode::Char('n' | 'N') => Some(Command::ToggleShading),
            KeyCode::Char('g' | 'G') => Some(Command::ToggleGrid),
            _ => None,
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Right) => {
                self.drag_origin = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Drag(MouseButton::Right) => {
                if let Some((column, row)) = self.drag_origin {
                    let dx = (mouse.column as f32 - column as f32) * CELL_WIDTH_PIXELS;
                    let dy = (mouse.row as f32 - row as f32) * CELL_HEIGHT_PIXELS;
                    self.state.add_look(dx, dy);
                }
                self.drag_origin = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Up(MouseButton::Right) => self.drag_origin = None,
            MouseEventKind::ScrollUp => self.state.add_scroll(1.0),
            MouseEventKind::ScrollDown => self.state.add_scroll(-1.0),
            _ => {}
        }
    }

    /// Call once the viewer has consumed this frame's input
    pub fn end_frame(&mut self) {
        self.state.end_frame();
        if !self.release_events {
            self.state.held.clear();
            self.state.fast = false;
        }
    }
}

fn movement_for(code: KeyCode) -> Option<Movement> {
    let KeyCode::Char(c) = code else {
        return None;
    };
    match c.to_ascii_lowercase() {
        'w' => Some(Movement::Forward),
        's' => Some(Movement::Back),
        'a' => Some(Movement::Left),
        'd' => Some(Movement::Right),
        'e' => Some(Movement::Up),
        'q' => Some(Movement::Down),
        _ => None,
    }
}

/// Shift arrives either as a modifier or as an uppercase letter
fn is_fast(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::SHIFT)
        || matches!(key.code, KeyCode::Char(c) if c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use nalgebra::Vector2;

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    fn press(c: char) -> Event {
        key(KeyCode::Char(c), KeyEventKind::Press)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_movement_keys() {
        let mut controls = Controls::new(true);
        for (c, movement) in [
            ('w', Movement::Forward),
            ('s', Movement::Back),
            ('a', Movement::Left),
            ('d', Movement::Right),
            ('e', Movement::Up),
            ('q', Movement::Down),
        ] {
            assert_eq!(controls.handle_event(&press(c)), None);
            assert!(controls.state().is_held(movement));
        }
        assert!(!controls.state().fast);
    }

    #[test]
    fn test_uppercase_is_fast() {
        let mut controls = Controls::new(true);
        controls.handle_event(&press('W'));
        assert!(controls.state().is_held(Movement::Forward));
        assert!(controls.state().fast);

        controls.handle_event(&key(KeyCode::Char('W'), KeyEventKind::Release));
        assert!(!controls.state().is_held(Movement::Forward));
        assert!(!controls.state().fast);
    }

    #[test]
    fn test_held_keys_survive_frames_with_release_events() {
        let mut controls = Controls::new(true);
        controls.handle_event(&press('a'));
        controls.end_frame();
        assert!(controls.state().is_held(Movement::Left));
    }

    #[test]
    fn test_held_keys_last_one_frame_without_release_events() {
        let mut controls = Controls::new(false);
        controls.handle_event(&press('A'));
        controls.end_frame();
        assert!(controls.state().held.is_empty());
        assert!(!controls.state().fast);
    }

    #[test]
    fn test_commands() {
        let mut controls = Controls::new(false);
        assert_eq!(controls.handle_event(&press('r')), Some(Command::ResetView));
        assert_eq!(controls.handle_event(&press('m')), Some(Command::ToggleCameraMode));
        assert_eq!(controls.handle_event(&press('N')), Some(Command::ToggleShading));
        assert_eq!(controls.handle_event(&press('g')), Some(Command::ToggleGrid));
        assert_eq!(
            controls.handle_event(&key(KeyCode::Esc, KeyEventKind::Press)),
            Some(Command::Quit)
        );
        assert_eq!(controls.handle_event(&key(KeyCode::Esc, KeyEventKind::Release)), None);
    }

    #[test]
    fn test_arrow_keys_look() {
        let mut controls = Controls::new(false);
        controls.handle_event(&key(KeyCode::Left, KeyEventKind::Press));
        controls.handle_event(&key(KeyCode::Down, KeyEventKind::Repeat));
        assert_eq!(
            controls.state().look_delta,
            Vector2::new(-ARROW_LOOK_PIXELS, ARROW_LOOK_PIXELS)
        );
        controls.end_frame();
        assert_eq!(controls.state().look_delta, Vector2::zeros());
    }

    #[test]
    fn test_right_drag_looks() {
        let mut controls = Controls::new(false);
        controls.handle_event(&mouse(MouseEventKind::Down(MouseButton::Right), 10, 10));
        controls.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Right), 12, 9));
        assert_eq!(
            controls.state().look_delta,
            Vector2::new(2.0 * CELL_WIDTH_PIXELS, -CELL_HEIGHT_PIXELS)
        );

        controls.handle_event(&mouse(MouseEventKind::Up(MouseButton::Right), 12, 9));
        controls.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 20, 20));
        assert_eq!(
            controls.state().look_delta,
            Vector2::new(2.0 * CELL_WIDTH_PIXELS, -CELL_HEIGHT_PIXELS)
        );
    }

    #[test]
    fn test_scroll() {
        let mut controls = Controls::new(false);
        controls.handle_event(&mouse(MouseEventKind::ScrollUp, 0, 0));
        controls.handle_event(&mouse(MouseEventKind::ScrollUp, 0, 0));
        controls.handle_event(&mouse(MouseEventKind::ScrollDown, 0, 0));
        assert_eq!(controls.state().scroll_delta, 1.0);
    }
}
