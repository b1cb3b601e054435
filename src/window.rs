use std::ops::Deref;
use std::sync::{Arc, Mutex};
use log::error;
use pixels::{Pixels, SurfaceTexture};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};
use crate::config::{WINDOW_SCALE, WINDOW_TITLE};
use crate::key_event_handler::KeyEventHandler;
use crate::ppu::{WriteBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::simulator::RenderRequester;

struct WindowApp<'a> {
	write_buffer : Arc<Mutex<WriteBuffer>>,
	key_event_handler: KeyEventHandler,
	render_requester: Arc<Mutex<RenderRequester>>,
	pixels: Option<Pixels<'a>>,
	window: Option<Arc<Window>>,
}

impl WindowApp<'_> {
	fn new(write_buffer : Arc<Mutex<WriteBuffer>>, key_event_handler: KeyEventHandler,
		   render_requester: Arc<Mutex<RenderRequester>>) -> Self {
		Self {
			write_buffer,
			key_event_handler,
			render_requester,
			pixels: None,
			window: None,
		}
	}

	fn draw(&mut self) {
		let Some(pixels) = self.pixels.as_mut() else {
			return;
		};
		if let Ok(write_buffer) = self.write_buffer.lock() {
			pixels.frame_mut().copy_from_slice(write_buffer.deref());
		}
		if let Err(err) = pixels.render() {
			error!("could not draw frame: {err}");
		}
	}
}

impl ApplicationHandler for WindowApp<'_> {
	fn resumed(&mut self, event_loop: &ActiveEventLoop) {
		if self.window.is_some() {
			return;
		}

		let size = LogicalSize::new(SCREEN_WIDTH as u32 * WINDOW_SCALE, SCREEN_HEIGHT as u32 * WINDOW_SCALE);
		let window = match event_loop.create_window(Window::default_attributes()
			.with_title(WINDOW_TITLE)
			.with_inner_size(size)
			.with_min_inner_size(LogicalSize::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32))) {
			Ok(window) => Arc::new(window),
			Err(err) => {
				error!("could not open window: {err}");
				event_loop.exit();
				return;
			}
		};

		let window_size = window.inner_size();
		let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, window.clone());
		match Pixels::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32, surface_texture) {
			Ok(pixels) => self.pixels = Some(pixels),
			Err(err) => {
				error!("could not create drawing surface: {err}");
				event_loop.exit();
				return;
			}
		}

		/* from here on the emulation thread asks for a redraw after each frame */
		if let Ok(mut render_requester) = self.render_requester.lock() {
			render_requester.set_window(window.clone());
		}
		window.request_redraw();
		self.window = Some(window);
	}

	fn window_event(&mut self, event_loop: &ActiveEventLoop, _ : WindowId, event: WindowEvent) {
		match event {
			WindowEvent::RedrawRequested => {
				self.draw();
			}
			WindowEvent::CloseRequested => {
				event_loop.exit();
			}
			WindowEvent::Resized(size) => {
				if let Some(pixels) = self.pixels.as_mut() {
					if let Err(err) = pixels.resize_surface(size.width, size.height) {
						error!("could not resize drawing surface: {err}");
					}
				}
			}
			WindowEvent::KeyboardInput { device_id: _, event: input, is_synthetic: _ } => {
				self.key_event_handler.handle_key_event(&input);
			}
			_ => ()
		}
	}
}

pub fn initialize_ui(write_buffer : Arc<Mutex<WriteBuffer>>, key_event_handler: KeyEventHandler,
					 render_requester: Arc<Mutex<RenderRequester>>) -> Result<(), EventLoopError> {
	let event_loop = EventLoop::new()?;
	event_loop.run_app(&mut WindowApp::new(write_buffer, key_event_handler, render_requester))
}
