use std::rc::Rc;

use dominator::routing;
use dominator::{clone, html, Dom};
use futures_signals::signal::SignalExt;

use crate::catalogue;
use crate::comic::Comic;
use crate::common::{snackbar, Bottombar, Navigation, Profile, Route};
use crate::login::Login;
use crate::pages;
use crate::query::RestClient;
use crate::reader::Reader;
use crate::storage::TokenStorage;
use crate::stores::{AuthStore, ReaderStore};
use crate::utils::api_host;

/// Owns the stores for the lifetime of the page and hands them to views.
pub struct App {
    pub auth: Rc<AuthStore>,
    pub reader: Rc<ReaderStore>,
    pub api: Rc<RestClient>,
}

impl App {
    pub fn new(storage: Rc<dyn TokenStorage>) -> Rc<Self> {
        let api = Rc::new(RestClient::new(api_host(), storage.clone()));

        let auth = AuthStore::new(storage);
        auth.init_auth_state();

        Rc::new(App {
            auth,
            reader: ReaderStore::new(api.clone()),
            api,
        })
    }

    fn render_route(app: Rc<Self>, route: Route) -> Option<Dom> {
        if let Navigation::Redirect(to) = route.guard(app.auth.role()) {
            info!("{:?} requires creator role, redirect to {}", route, to.url());
            routing::go_to_url(&to.url());
            return None;
        }

        let dom = match route {
            Route::Home => catalogue::render_home(app.api.clone()),
            Route::About => pages::render_about(),
            Route::Catalogue => catalogue::render_catalogue(app.api.clone()),
            Route::Comic(comic_id) => Comic::render(Comic::new(app.reader.clone(), comic_id)),
            Route::Auth => Login::render(Login::new(app.auth.clone(), app.api.clone())),
            Route::Favourite => pages::render_favourite(),
            Route::ReadPage {
                comic_id,
                chapter_id,
                page_number,
            } => Reader::render(Reader::new(
                app.reader.clone(),
                comic_id,
                chapter_id,
                page_number,
            )),
            Route::Profile => Profile::render(Profile::new(app.auth.clone())),
            Route::CreateComic => pages::render_create_comic(),
            Route::NotFound => pages::render_not_found(),
        };

        Some(dom)
    }

    pub fn render(app: Rc<Self>) -> Dom {
        html!("div", {
            .child_signal(Route::signal().map(clone!(app => move |route| {
                Self::render_route(app.clone(), route)
            })))
            .child_signal(Route::signal().map(clone!(app => move |route| {
                match route {
                    Route::ReadPage { .. } => None,
                    _ => Some(Bottombar::render(app.auth.clone())),
                }
            })))
            .children(&mut [
                snackbar::render(),
            ])
        })
    }
}
