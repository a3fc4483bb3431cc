use std::rc::Rc;

use dominator::{clone, html, routing, Dom};
use futures_signals::signal::SignalExt;

use crate::common::{events, Route};
use crate::stores::AuthStore;

pub struct Profile {
    auth: Rc<AuthStore>,
}

impl Profile {
    pub fn new(auth: Rc<AuthStore>) -> Rc<Self> {
        Rc::new(Self { auth })
    }

    fn logout(profile: Rc<Self>) {
        profile.auth.logout();
        routing::go_to_url(&Route::Auth.url());
    }

    pub fn render(profile: Rc<Self>) -> Dom {
        html!("div", {
            .class("content")
            .child_signal(profile.auth.session_signal().map(|session| {
                if session.is_logged_in {
                    Some(html!("div", {
                        .class("profile")
                        .children(&mut [
                            html!("h1", {
                                .text(&session.nickname)
                            }),
                            html!("span", {
                                .text(&session.email)
                            }),
                            html!("span", {
                                .text(&session.user_id.as_ref().map(|id| format!("ID: {}", id)).unwrap_or_default())
                            }),
                        ])
                    }))
                } else {
                    Some(html!("a", {
                        .attr("href", &Route::Auth.url())
                        .text("Войдите, чтобы открыть профиль")
                    }))
                }
            }))
            .children(&mut [
                html!("button", {
                    .visible_signal(profile.auth.session_signal().map(|session| session.is_logged_in))
                    .text("Выйти")
                    .event(clone!(profile => move |_: events::Click| {
                        Self::logout(profile.clone());
                    }))
                })
            ])
        })
    }
}
