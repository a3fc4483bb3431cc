use std::rc::Rc;

use dominator::{clone, html, link, Dom};
use futures_signals::signal::SignalExt;
use futures_signals::signal_vec::SignalVecExt;

use crate::common::{Chapter, Route, Spinner};
use crate::stores::ReaderStore;
use crate::utils::AsyncLoader;

pub struct Comic {
    comic_id: i64,
    store: Rc<ReaderStore>,
    loader: AsyncLoader,
}

impl Comic {
    pub fn new(store: Rc<ReaderStore>, comic_id: i64) -> Rc<Self> {
        Rc::new(Self {
            comic_id,
            store,
            loader: AsyncLoader::new(),
        })
    }

    /// Loads the chapter list, then fills in page counts one chapter at a
    /// time.
    fn fetch_detail(comic: Rc<Self>) {
        comic.store.comic_id.set_neq(Some(comic.comic_id));
        comic.loader.load(clone!(comic => async move {
            comic.store.fetch_comic_data().await;

            let pending = comic
                .store
                .all_chapters()
                .into_iter()
                .filter(|chapter| chapter.page_count.is_none())
                .map(|chapter| chapter.id)
                .collect::<Vec<_>>();

            for chapter_id in pending {
                comic.store.fetch_chapter_page_count(chapter_id).await;
            }
        }));
    }

    fn render_chapter(comic_id: i64, chapter: &Chapter) -> Dom {
        let title = match &chapter.title {
            Some(title) if !title.is_empty() => format!("Глава {}: {}", chapter.number, title),
            _ => format!("Глава {}", chapter.number),
        };
        let pages = chapter
            .page_count
            .map(|count| format!("{} стр.", count))
            .unwrap_or_default();

        link!(Route::ReadPage { comic_id, chapter_id: chapter.id, page_number: 1 }.url(), {
            .class("chapter")
            .children(&mut [
                html!("span", {
                    .class("chapter-volume")
                    .text(&format!("Том {}", chapter.volume_number))
                }),
                html!("span", {
                    .class("chapter-title")
                    .text(&title)
                }),
                html!("span", {
                    .class("chapter-pages")
                    .text(&pages)
                }),
            ])
        })
    }

    pub fn render(comic: Rc<Self>) -> Dom {
        Self::fetch_detail(comic.clone());

        let comic_id = comic.comic_id;
        html!("div", {
            .class("comic")
            .after_removed(clone!(comic => move |_| comic.loader.cancel()))
            .children(&mut [
                html!("h1", {
                    .text_signal(comic.store.comic_title.signal_cloned().map(|title| title.unwrap_or_default()))
                }),
                Spinner::render(comic.loader.is_loading(), false),
                html!("div", {
                    .class("chapter-list")
                    .children_signal_vec(comic.store.all_chapters_signal()
                        .to_signal_vec()
                        .map(move |chapter| Self::render_chapter(comic_id, &chapter)))
                }),
            ])
        })
    }
}
