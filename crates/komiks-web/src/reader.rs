use std::rc::Rc;

use dominator::{clone, html, routing, Dom};
use futures_signals::map_ref;
use futures_signals::signal::SignalExt;

use crate::common::{events, Route, Spinner};
use crate::stores::ReaderStore;
use crate::utils::{image_url, window, AsyncLoader};

pub struct Reader {
    store: Rc<ReaderStore>,
    comic_id: i64,
    chapter_id: i64,
    page_number: i64,
    comic_loader: AsyncLoader,
    chapter_loader: AsyncLoader,
}

impl Reader {
    pub fn new(store: Rc<ReaderStore>, comic_id: i64, chapter_id: i64, page_number: i64) -> Rc<Self> {
        Rc::new(Self {
            store,
            comic_id,
            chapter_id,
            page_number,
            comic_loader: AsyncLoader::new(),
            chapter_loader: AsyncLoader::new(),
        })
    }

    /// Only refetches what changed since the store was last positioned, so
    /// paging inside a chapter never hits the network.
    fn sync_store(reader: Rc<Self>) {
        let store = &reader.store;
        let comic_changed =
            store.comic_id.get() != Some(reader.comic_id) || store.all_chapters().is_empty();
        let chapter_changed =
            store.chapter_id.get() != Some(reader.chapter_id) || store.pages().is_empty();

        store.set_position(reader.comic_id, reader.chapter_id, reader.page_number);

        if comic_changed {
            reader.comic_loader.load(clone!(reader => async move {
                reader.store.fetch_comic_data().await;
            }));
        }

        if chapter_changed {
            let chapter_id = reader.chapter_id;
            reader.chapter_loader.load(clone!(reader => async move {
                reader.store.fetch_chapter_data(chapter_id).await;
            }));
        }
    }

    fn go_to(&self, chapter_id: i64, page_number: i64) {
        routing::go_to_url(
            &Route::ReadPage {
                comic_id: self.comic_id,
                chapter_id,
                page_number,
            }
            .url(),
        );
    }

    fn go_to_next_page(&self) {
        if let Some(page_number) = self.store.next_page_number() {
            self.go_to(self.chapter_id, page_number);
        } else if let Some(chapter) = self.store.next_chapter() {
            self.go_to(chapter.id, 1);
            window().scroll_to_with_x_and_y(0.0_f64, 0.0_f64);
        } else {
            info!("no next page or next chapter");
        }
    }

    fn go_to_prev_page(&self) {
        if let Some(page_number) = self.store.prev_page_number() {
            self.go_to(self.chapter_id, page_number);
        } else if let Some(chapter) = self.store.prev_chapter() {
            let last_page = chapter.page_count.map(|count| count as i64).unwrap_or(1);
            self.go_to(chapter.id, last_page.max(1));
        } else {
            info!("no prev page or prev chapter");
        }
    }

    fn render_topbar(reader: Rc<Self>) -> Dom {
        let store = &reader.store;
        html!("div", {
            .class("topbar")
            .children(&mut [
                html!("a", {
                    .attr("href", &Route::Comic(reader.comic_id).url())
                    .text("←")
                }),
                html!("div", {
                    .style("display", "flex")
                    .style("flex-direction", "column")
                    .children(&mut [
                        html!("span", {
                            .text_signal(store.comic_title.signal_cloned().map(|title| title.unwrap_or_default()))
                        }),
                        html!("span", {
                            .style("font-size", "smaller")
                            .text_signal(store.current_chapter_signal().map(|chapter| match chapter {
                                Some(chapter) => format!("Том {} Глава {}", chapter.volume_number, chapter.number),
                                None => "".to_string(),
                            }))
                        }),
                    ])
                }),
            ])
        })
    }

    fn render_page(reader: Rc<Self>) -> Dom {
        let store = &reader.store;
        html!("div", {
            .class("reader-page")
            .child_signal(clone!(reader => map_ref! {
                let page = store.current_page_signal(),
                let image_error = store.image_error.signal() => {
                    match (page, image_error) {
                        (_, true) => Some(html!("div", {
                            .class("reader-error")
                            .text("Не удалось загрузить страницу")
                        })),
                        (Some(page), false) => Some(html!("img", {
                            .attr("src", &image_url(&page.image_url))
                            .attr("id", &format!("page-{}", page.id))
                            .attr("alt", &page.number.to_string())
                            .event(clone!(reader => move |_: events::LoadError| {
                                reader.store.mark_image_error();
                            }))
                        })),
                        (None, false) => None,
                    }
                }
            }))
            .child(Spinner::render(store.loading.signal(), true))
        })
    }

    fn render_bottombar(reader: Rc<Self>) -> Dom {
        let store = &reader.store;
        html!("div", {
            .class("reader-bottombar")
            .children(&mut [
                html!("button", {
                    .text("« Глава")
                    .attr_signal("disabled", store.prev_chapter_signal().map(|chapter| chapter.is_none().then_some("true")))
                    .event(clone!(reader => move |_: events::Click| {
                        if let Some(chapter) = reader.store.prev_chapter() {
                            reader.go_to(chapter.id, 1);
                        }
                    }))
                }),
                html!("button", {
                    .text("‹")
                    .attr_signal("disabled", map_ref! {
                        let first = store.is_first_page_signal(),
                        let prev = store.prev_chapter_signal() =>
                        (*first && prev.is_none()).then_some("true")
                    })
                    .event(clone!(reader => move |_: events::Click| reader.go_to_prev_page()))
                }),
                html!("span", {
                    .text_signal(map_ref! {
                        let page_number = store.page_number.signal(),
                        let count = store.page_count_signal() =>
                        format!("{} / {}", page_number, count)
                    })
                }),
                html!("button", {
                    .text("›")
                    .attr_signal("disabled", map_ref! {
                        let last = store.is_last_page_signal(),
                        let next = store.next_chapter_signal() =>
                        (*last && next.is_none()).then_some("true")
                    })
                    .event(clone!(reader => move |_: events::Click| reader.go_to_next_page()))
                }),
                html!("button", {
                    .text("Глава »")
                    .attr_signal("disabled", store.next_chapter_signal().map(|chapter| chapter.is_none().then_some("true")))
                    .event(clone!(reader => move |_: events::Click| {
                        if let Some(chapter) = reader.store.next_chapter() {
                            reader.go_to(chapter.id, 1);
                        }
                    }))
                }),
            ])
        })
    }

    pub fn render(reader: Rc<Self>) -> Dom {
        Self::sync_store(reader.clone());

        html!("div", {
            .class("reader")
            .after_removed(clone!(reader => move |_| {
                reader.comic_loader.cancel();
                reader.chapter_loader.cancel();
            }))
            .global_event(clone!(reader => move |e: events::KeyDown| {
                match e.key().as_str() {
                    "ArrowLeft" => reader.go_to_prev_page(),
                    "ArrowRight" => reader.go_to_next_page(),
                    _ => {}
                }
            }))
            .children(&mut [
                Self::render_topbar(reader.clone()),
                Self::render_page(reader.clone()),
                Self::render_bottombar(reader),
            ])
        })
    }
}
