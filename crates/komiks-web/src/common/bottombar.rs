use std::rc::Rc;

use dominator::{html, link, Dom};
use futures_signals::signal::SignalExt;

use super::Route;
use crate::stores::AuthStore;

pub struct Bottombar;

impl Bottombar {
    fn render_link(route: Route, label: &str) -> Dom {
        let url = route.url();
        link!(url, {
            .class_signal("active", Route::signal().map(move |current| current == route))
            .children(&mut [
                html!("span", {
                    .text(label)
                })
            ])
        })
    }

    pub fn render(auth: Rc<AuthStore>) -> Dom {
        html!("div", {
            .class("bottombar")
            .children(&mut [
                Self::render_link(Route::Home, "Главная"),
                Self::render_link(Route::Catalogue, "Каталог"),
                Self::render_link(Route::Favourite, "Избранное"),
            ])
            .child_signal(auth.session_signal().map(|session| {
                let route = if session.is_logged_in {
                    Route::Profile
                } else {
                    Route::Auth
                };
                Some(Self::render_link(route, &session.nickname))
            }))
        })
    }
}
