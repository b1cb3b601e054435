use std::sync::Arc;
use winit::window::Window;

/**
 * Lets the emulation thread wake the window after each finished frame. Frames that finish
 * before the window exists are simply not announced.
 */
#[derive(Default)]
pub struct RenderRequester {
    window: Option<Arc<Window>>,
}

impl RenderRequester {
    pub fn new() -> RenderRequester {
        RenderRequester::default()
    }

    pub fn set_window(&mut self, window: Arc<Window>) {
        self.window = Some(window);
    }

    pub fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
