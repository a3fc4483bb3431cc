use dominator::traits::StaticEvent;

pub use dominator::events::*;

/// `error` fired by an element that failed to load, e.g. an `<img>`. Resource
/// load failures dispatch a plain `Event`, not an `ErrorEvent`.
pub struct LoadError {
    #[allow(dead_code)]
    event: web_sys::Event,
}

impl StaticEvent for LoadError {
    const EVENT_TYPE: &'static str = "error";

    #[inline]
    fn unchecked_from_event(event: web_sys::Event) -> Self {
        Self { event }
    }
}
