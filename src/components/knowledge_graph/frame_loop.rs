//! A redraw loop that can be stopped, and a slot that never holds two.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

/// Something that calls back once, on the next frame.
pub trait FrameScheduler {
	/// Schedule `frame`; `None` if the host refused.
	fn request_frame(&self, frame: Rc<dyn Fn()>) -> Option<i32>;
	fn cancel_frame(&self, id: i32);
}

/// `window.requestAnimationFrame` through one long-lived closure.
pub struct AnimationFrames {
	next: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
	trampoline: Closure<dyn FnMut()>,
}

impl AnimationFrames {
	pub fn new() -> Self {
		let next: Rc<RefCell<Option<Rc<dyn Fn()>>>> = Rc::new(RefCell::new(None));
		let pending = next.clone();
		let trampoline = Closure::new(move || {
			let frame = pending.borrow_mut().take();
			if let Some(frame) = frame {
				frame();
			}
		});
		Self { next, trampoline }
	}
}

impl Default for AnimationFrames {
	fn default() -> Self {
		Self::new()
	}
}

impl FrameScheduler for AnimationFrames {
	fn request_frame(&self, frame: Rc<dyn Fn()>) -> Option<i32> {
		let window = web_sys::window()?;
		*self.next.borrow_mut() = Some(frame);
		match window.request_animation_frame(self.trampoline.as_ref().unchecked_ref()) {
			Ok(id) => Some(id),
			Err(err) => {
				warn!("requestAnimationFrame failed: {:?}", err);
				self.next.borrow_mut().take();
				None
			}
		}
	}

	fn cancel_frame(&self, id: i32) {
		if let Some(window) = web_sys::window() {
			let _ = window.cancel_animation_frame(id);
		}
		self.next.borrow_mut().take();
	}
}

struct LoopShared {
	scheduler: Box<dyn FrameScheduler>,
	running: Cell<bool>,
	pending: Cell<Option<i32>>,
	frame: RefCell<Option<Box<dyn FnMut()>>>,
}

/// Runs `frame` once per scheduled frame until cancelled or dropped.
pub struct FrameLoop {
	shared: Rc<LoopShared>,
}

impl FrameLoop {
	pub fn start(scheduler: impl FrameScheduler + 'static, frame: impl FnMut() + 'static) -> Self {
		let shared = Rc::new(LoopShared {
			scheduler: Box::new(scheduler),
			running: Cell::new(true),
			pending: Cell::new(None),
			frame: RefCell::new(Some(Box::new(frame))),
		});
		schedule(&shared);
		Self { shared }
	}

	pub fn is_running(&self) -> bool {
		self.shared.running.get()
	}

	/// Stop the loop. Safe to call more than once, and from inside a frame.
	pub fn cancel(&self) {
		let shared = &self.shared;
		if !shared.running.replace(false) {
			return;
		}
		if let Some(id) = shared.pending.take() {
			shared.scheduler.cancel_frame(id);
		}
		// Busy when cancelled from within the frame itself; dropped with `self` then.
		if let Ok(mut frame) = shared.frame.try_borrow_mut() {
			frame.take();
		}
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		self.cancel();
	}
}

fn schedule(shared: &Rc<LoopShared>) {
	let weak: Weak<LoopShared> = Rc::downgrade(shared);
	let id = shared.scheduler.request_frame(Rc::new(move || {
		if let Some(shared) = weak.upgrade() {
			run_frame(&shared);
		}
	}));
	if id.is_none() {
		warn!("frame loop could not schedule, stopping");
		shared.running.set(false);
	}
	shared.pending.set(id);
}

fn run_frame(shared: &Rc<LoopShared>) {
	shared.pending.set(None);
	if !shared.running.get() {
		return;
	}
	if let Some(frame) = shared.frame.borrow_mut().as_mut() {
		frame();
	}
	if shared.running.get() {
		schedule(shared);
	}
}

/// Holds at most one [`FrameLoop`]. Starting a new loop always cancels the
/// old one first, so two loops never drive the same state.
#[derive(Default)]
pub struct LoopSlot {
	current: RefCell<Option<FrameLoop>>,
	generation: Cell<u64>,
}

impl LoopSlot {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn restart(&self, scheduler: impl FrameScheduler + 'static, frame: impl FnMut() + 'static) {
		self.stop();
		let generation = self.generation.get() + 1;
		self.generation.set(generation);
		debug!("starting redraw loop #{generation}");
		*self.current.borrow_mut() = Some(FrameLoop::start(scheduler, frame));
	}

	pub fn stop(&self) {
		let previous = self.current.borrow_mut().take();
		if let Some(previous) = previous {
			previous.cancel();
			debug!("stopped redraw loop #{}", self.generation.get());
		}
	}

	pub fn is_running(&self) -> bool {
		self.current
			.borrow()
			.as_ref()
			.is_some_and(FrameLoop::is_running)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Hand-cranked frames for tests; clones share one queue.
	#[derive(Clone, Default)]
	struct ManualFrames {
		queue: Rc<RefCell<Vec<(i32, Rc<dyn Fn()>)>>>,
		next_id: Rc<Cell<i32>>,
	}

	impl ManualFrames {
		fn pending(&self) -> usize {
			self.queue.borrow().len()
		}

		/// Fire every frame requested so far.
		fn advance(&self) {
			let due = std::mem::take(&mut *self.queue.borrow_mut());
			for (_, frame) in due {
				frame();
			}
		}
	}

	impl FrameScheduler for ManualFrames {
		fn request_frame(&self, frame: Rc<dyn Fn()>) -> Option<i32> {
			let id = self.next_id.get() + 1;
			self.next_id.set(id);
			self.queue.borrow_mut().push((id, frame));
			Some(id)
		}

		fn cancel_frame(&self, id: i32) {
			self.queue.borrow_mut().retain(|(queued, _)| *queued != id);
		}
	}

	struct Refusing;

	impl FrameScheduler for Refusing {
		fn request_frame(&self, _: Rc<dyn Fn()>) -> Option<i32> {
			None
		}

		fn cancel_frame(&self, _: i32) {}
	}

	fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
		let count = Rc::new(Cell::new(0));
		let inner = count.clone();
		(count, move || inner.set(inner.get() + 1))
	}

	#[test]
	fn one_callback_per_frame() {
		let frames = ManualFrames::default();
		let (count, frame) = counter();
		let running = FrameLoop::start(frames.clone(), frame);

		assert_eq!(count.get(), 0, "nothing runs until the first frame");
		for expected in 1..=5 {
			frames.advance();
			assert_eq!(count.get(), expected);
			assert_eq!(frames.pending(), 1);
		}
		assert!(running.is_running());
	}

	#[test]
	fn cancel_is_idempotent_and_final() {
		let frames = ManualFrames::default();
		let (count, frame) = counter();
		let running = FrameLoop::start(frames.clone(), frame);
		frames.advance();

		running.cancel();
		running.cancel();
		assert!(!running.is_running());
		assert_eq!(frames.pending(), 0);

		frames.advance();
		assert_eq!(count.get(), 1);
	}

	#[test]
	fn dropping_the_loop_stops_it() {
		let frames = ManualFrames::default();
		let (count, frame) = counter();
		drop(FrameLoop::start(frames.clone(), frame));

		frames.advance();
		assert_eq!(count.get(), 0);
		assert_eq!(frames.pending(), 0);
	}

	#[test]
	fn stale_callback_after_cancel_is_inert() {
		let frames = ManualFrames::default();
		let (count, frame) = counter();
		let running = FrameLoop::start(frames.clone(), frame);

		// Grab the queued frame before cancelling, as a host might still fire it.
		let stale = frames.queue.borrow()[0].1.clone();
		running.cancel();
		stale();

		assert_eq!(count.get(), 0);
		assert_eq!(frames.pending(), 0);
	}

	#[test]
	fn cancelling_from_inside_a_frame() {
		let frames = ManualFrames::default();
		let count = Rc::new(Cell::new(0));
		let handle: Rc<RefCell<Option<FrameLoop>>> = Rc::new(RefCell::new(None));

		let (inner_count, inner_handle) = (count.clone(), handle.clone());
		let running = FrameLoop::start(frames.clone(), move || {
			inner_count.set(inner_count.get() + 1);
			if inner_count.get() == 2 {
				if let Some(running) = inner_handle.borrow().as_ref() {
					running.cancel();
				}
			}
		});
		*handle.borrow_mut() = Some(running);

		for _ in 0..4 {
			frames.advance();
		}
		assert_eq!(count.get(), 2);
		assert_eq!(frames.pending(), 0);
		// Break the cycle through the frame closure.
		handle.borrow_mut().take();
	}

	#[test]
	fn refused_schedule_stops_the_loop() {
		let (count, frame) = counter();
		let running = FrameLoop::start(Refusing, frame);
		assert!(!running.is_running());
		assert_eq!(count.get(), 0);
	}

	#[test]
	fn slot_never_runs_two_loops() {
		let frames = ManualFrames::default();
		let slot = LoopSlot::new();
		let (first, frame) = counter();
		slot.restart(frames.clone(), frame);
		frames.advance();

		let (second, frame) = counter();
		slot.restart(frames.clone(), frame);
		assert_eq!(frames.pending(), 1, "old pending frame was cancelled");

		for _ in 0..3 {
			frames.advance();
		}
		assert_eq!(first.get(), 1);
		assert_eq!(second.get(), 3);
		assert!(slot.is_running());

		slot.stop();
		slot.stop();
		frames.advance();
		assert_eq!(second.get(), 3);
		assert!(!slot.is_running());
		assert_eq!(frames.pending(), 0);
	}
}
