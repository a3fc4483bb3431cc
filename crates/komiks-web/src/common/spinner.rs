use dominator::{html, Dom};
use futures_signals::signal::Signal;

pub struct Spinner;

impl Spinner {
    pub fn render<S>(active: S, fullscreen: bool) -> Dom
    where
        S: Signal<Item = bool> + 'static,
    {
        html!("div", {
            .class("spinner")
            .apply_if(fullscreen, |dom| dom.class("fullscreen"))
            .visible_signal(active)
            .children(&mut [
                html!("div", {
                    .class("loader")
                })
            ])
        })
    }
}
