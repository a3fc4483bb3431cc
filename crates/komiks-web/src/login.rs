use std::rc::Rc;

use dominator::{clone, html, routing, with_node, Dom, EventOptions};
use futures_signals::signal::{Mutable, SignalExt};
use web_sys::HtmlInputElement;

use crate::common::{events, snackbar, Route, Spinner};
use crate::query::RestClient;
use crate::stores::AuthStore;
use crate::utils::AsyncLoader;

pub struct Login {
    username: Mutable<String>,
    password: Mutable<String>,
    auth: Rc<AuthStore>,
    api: Rc<RestClient>,
    loader: AsyncLoader,
}

impl Login {
    pub fn new(auth: Rc<AuthStore>, api: Rc<RestClient>) -> Rc<Self> {
        Rc::new(Self {
            username: Mutable::new("".to_string()),
            password: Mutable::new("".to_string()),
            auth,
            api,
            loader: AsyncLoader::new(),
        })
    }

    pub fn login(login: Rc<Self>) {
        let username = login.username.get_cloned();
        let password = login.password.get_cloned();
        login.loader.load(clone!(login => async move {
            let token = match login.api.user_login(username, password).await {
                Ok(token) => token,
                Err(e) => {
                    snackbar::show(format!("Не удалось войти: {}", e));
                    return;
                }
            };

            match login.auth.login(&token) {
                Ok(()) => {
                    login.password.set("".to_string());
                    routing::go_to_url(&Route::Home.url());
                }
                Err(e) => {
                    snackbar::show(format!("Не удалось войти: {}", e));
                }
            }
        }));
    }

    fn render_input(value: &Mutable<String>, kind: &str, placeholder: &str) -> Dom {
        html!("input" => HtmlInputElement, {
            .attr("type", kind)
            .attr("placeholder", placeholder)
            .prop_signal("value", value.signal_cloned())
            .with_node!(input => {
                .event(clone!(value => move |_: events::Input| {
                    value.set(input.value());
                }))
            })
        })
    }

    pub fn render(login: Rc<Self>) -> Dom {
        html!("div", {
            .class("content")
            .after_removed(clone!(login => move |_| login.loader.cancel()))
            .children(&mut [
                html!("form", {
                    .style("display", "flex")
                    .style("flex-direction", "column")
                    .event_with_options(&EventOptions::preventable(), clone!(login => move |e: events::KeyDown| {
                        if is_submit_key(&e.key()) {
                            e.prevent_default();
                            Self::login(login.clone());
                        }
                    }))
                    .children(&mut [
                        Self::render_input(&login.username, "email", "Email"),
                        Self::render_input(&login.password, "password", "Пароль"),
                        html!("button", {
                            .attr_signal("disabled", login.loader.is_loading().map(|loading| loading.then_some("true")))
                            .text("Войти")
                            .event_with_options(&EventOptions::preventable(), clone!(login => move |e: events::Click| {
                                e.prevent_default();
                                Self::login(login.clone());
                            }))
                        }),
                    ])
                }),
                Spinner::render(login.loader.is_loading(), false),
            ])
        })
    }
}

fn is_submit_key(key: &str) -> bool {
    key == "Enter"
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_enter_submits() {
        assert!(is_submit_key("Enter"));
        assert!(!is_submit_key("enter"));
        assert!(!is_submit_key("Tab"));
    }
}
