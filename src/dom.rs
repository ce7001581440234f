// DOM listener and animation-frame handles that unregister themselves on drop.
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Event, EventTarget, Window};

struct Registered {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// Event listeners owned by a component; all of them are removed when the set is dropped.
#[derive(Default)]
pub struct ListenerSet {
    entries: Vec<Registered>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen<F>(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        passive: bool,
        handler: F,
    ) -> Result<(), JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        let opts = AddEventListenerOptions::new();
        opts.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &opts,
        )?;
        self.entries.push(Registered {
            target: target.clone(),
            event,
            callback,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Drop for ListenerSet {
    fn drop(&mut self) {
        for r in self.entries.drain(..) {
            let _ = r
                .target
                .remove_event_listener_with_callback(r.event, r.callback.as_ref().unchecked_ref());
        }
    }
}

/// A `requestAnimationFrame` loop that runs until dropped.
pub struct AnimationLoop {
    window: Window,
    frame_id: Rc<Cell<Option<i32>>>,
    callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl AnimationLoop {
    pub fn start<F>(window: &Window, mut frame: F) -> Result<Self, JsValue>
    where
        F: FnMut() + 'static,
    {
        let frame_id = Rc::new(Cell::new(None));
        let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        {
            let frame_id = frame_id.clone();
            let callback_loop = callback.clone();
            let window_loop = window.clone();
            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                frame();
                if let Some(cb) = callback_loop.borrow().as_ref() {
                    match window_loop.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        Ok(id) => frame_id.set(Some(id)),
                        Err(e) => log::warn!("animation frame request failed: {e:?}"),
                    }
                }
            }) as Box<dyn FnMut()>));
        }
        let first = callback
            .borrow()
            .as_ref()
            .map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()))
            .transpose()?;
        frame_id.set(first);
        Ok(Self {
            window: window.clone(),
            frame_id,
            callback,
        })
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        if let Some(id) = self.frame_id.get() {
            let _ = self.window.cancel_animation_frame(id);
        }
        // the closure holds a clone of `callback`; taking it breaks the cycle
        self.callback.borrow_mut().take();
    }
}
