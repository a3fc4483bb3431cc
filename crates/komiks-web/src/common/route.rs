use dominator::routing;
use futures_signals::signal::{Signal, SignalExt};
use wasm_bindgen::prelude::*;
use web_sys::Url;

/// Roles allowed to open the comic creation form: admin and author.
pub const CREATOR_ROLES: [i64; 2] = [1, 3];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    Catalogue,
    Comic(i64),
    Auth,
    Favourite,
    ReadPage {
        comic_id: i64,
        chapter_id: i64,
        page_number: i64,
    },
    Profile,
    CreateComic,
    NotFound,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(Route),
}

impl Route {
    pub fn signal() -> impl Signal<Item = Self> {
        routing::url()
            .signal_ref(|url| Url::new(url).unwrap_throw())
            .map(|url| Route::from_path(&url.pathname()))
    }

    pub fn from_path(pathname: &str) -> Self {
        let mut paths = pathname.split('/').collect::<Vec<_>>();
        paths.retain(|path| !path.is_empty());

        match paths.as_slice() {
            [] => Route::About,
            ["home"] => Route::Home,
            ["catalogue"] => Route::Catalogue,
            ["comics", id] => {
                if let Ok(id) = id.parse() {
                    Route::Comic(id)
                } else {
                    Route::NotFound
                }
            }
            ["auth"] => Route::Auth,
            ["favourite"] => Route::Favourite,
            ["comic", comic_id, "chapter", chapter_id, "page", page_number] => {
                match (comic_id.parse(), chapter_id.parse(), page_number.parse()) {
                    (Ok(comic_id), Ok(chapter_id), Ok(page_number)) => Route::ReadPage {
                        comic_id,
                        chapter_id,
                        page_number,
                    },
                    _ => Route::NotFound,
                }
            }
            ["your_profile"] => Route::Profile,
            ["create-comic"] => Route::CreateComic,
            _ => Route::NotFound,
        }
    }

    pub fn url(&self) -> String {
        match self {
            Route::Home => "/home".to_string(),
            Route::About => "/".to_string(),
            Route::Catalogue => "/catalogue".to_string(),
            Route::Comic(id) => ["/comics".to_string(), id.to_string()].join("/"),
            Route::Auth => "/auth".to_string(),
            Route::Favourite => "/favourite".to_string(),
            Route::ReadPage {
                comic_id,
                chapter_id,
                page_number,
            } => format!(
                "/comic/{}/chapter/{}/page/{}",
                comic_id, chapter_id, page_number
            ),
            Route::Profile => "/your_profile".to_string(),
            Route::CreateComic => "/create-comic".to_string(),
            Route::NotFound => "/notfound".to_string(),
        }
    }

    pub fn requires_creator(&self) -> bool {
        matches!(self, Route::CreateComic)
    }

    /// Decides whether the route may be mounted for a session with `role`.
    /// Only a convenience for the UI; the backend checks permissions again.
    pub fn guard(&self, role: Option<i64>) -> Navigation {
        if !self.requires_creator() {
            return Navigation::Proceed;
        }

        match role {
            Some(role) if CREATOR_ROLES.contains(&role) => Navigation::Proceed,
            _ => Navigation::Redirect(Route::About),
        }
    }
}
