use std::rc::Rc;

use dominator::{clone, html, Dom};
use futures_signals::signal_vec::{MutableVec, SignalVecExt};

use crate::common::{snackbar, ComicBase, Cover, Spinner};
use crate::query::{ComicList, RestClient};
use crate::utils::AsyncLoader;

/// A titled grid of comics loaded from one backend listing.
pub struct Shelf {
    title: &'static str,
    list: ComicList,
    api: Rc<RestClient>,
    comics: MutableVec<ComicBase>,
    loader: AsyncLoader,
}

impl Shelf {
    pub fn new(api: Rc<RestClient>, title: &'static str, list: ComicList) -> Rc<Self> {
        Rc::new(Self {
            title,
            list,
            api,
            comics: MutableVec::new(),
            loader: AsyncLoader::new(),
        })
    }

    fn fetch_comics(shelf: Rc<Self>) {
        shelf.loader.load(clone!(shelf => async move {
            match shelf.api.fetch_comics(shelf.list).await {
                Ok(comics) => {
                    shelf.comics.lock_mut().replace_cloned(comics);
                }
                Err(e) => {
                    error!("error fetch {:?}: {:#}", shelf.list, e);
                    snackbar::show(format!("Не удалось загрузить комиксы: {}", e));
                }
            }
        }));
    }

    pub fn render(shelf: Rc<Self>) -> Dom {
        Self::fetch_comics(shelf.clone());

        html!("section", {
            .class("shelf")
            .after_removed(clone!(shelf => move |_| shelf.loader.cancel()))
            .children(&mut [
                html!("h2", {
                    .text(shelf.title)
                }),
                html!("div", {
                    .class("comic-grid")
                    .children_signal_vec(shelf.comics.signal_vec_cloned().map(|comic| Cover::render(&comic)))
                }),
                Spinner::render(shelf.loader.is_loading(), false),
            ])
        })
    }
}

pub fn render_catalogue(api: Rc<RestClient>) -> Dom {
    html!("div", {
        .class("content")
        .children(&mut [
            html!("h1", {
                .text("Каталог")
            }),
            Shelf::render(Shelf::new(api, "Все комиксы", ComicList::All)),
        ])
    })
}

pub fn render_home(api: Rc<RestClient>) -> Dom {
    html!("div", {
        .class("content")
        .children(&mut [
            html!("h1", {
                .text("Комиксы")
            }),
            Shelf::render(Shelf::new(api.clone(), "Рекомендуем", ComicList::Recommended)),
            Shelf::render(Shelf::new(api, "Новинки", ComicList::Newest)),
        ])
    })
}
