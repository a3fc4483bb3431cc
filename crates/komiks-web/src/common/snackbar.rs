use std::rc::Rc;

use dominator::{clone, html, Dom};
use futures_signals::signal::{Mutable, SignalExt};

use crate::common::events;

thread_local! {
    static SNACKBAR: Rc<Snackbar> = Snackbar::new();
}

pub fn show(message: String) {
    SNACKBAR.with(|s| s.show(message));
}

pub fn render() -> Dom {
    SNACKBAR.with(|s| Snackbar::render(s.clone()))
}

pub struct Snackbar {
    message: Mutable<Option<String>>,
}

impl Snackbar {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            message: Mutable::new(None),
        })
    }

    pub fn show(&self, message: String) {
        self.message.set(Some(message));
    }

    pub fn render(snackbar: Rc<Self>) -> Dom {
        html!("div", {
            .class("snackbar")
            .visible_signal(snackbar.message.signal_ref(|message| message.is_some()))
            .child_signal(snackbar.message.signal_cloned().map(|message| message.map(|msg| html!("span", {
                .text(&msg)
            }))))
            .children(&mut [
                html!("button", {
                    .text("×")
                    .event(clone!(snackbar => move |_: events::Click| snackbar.message.set(None)))
                })
            ])
        })
    }
}
