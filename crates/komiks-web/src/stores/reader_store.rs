use std::cell::Cell;
use std::rc::Rc;

use futures_signals::map_ref;
use futures_signals::signal::{Mutable, Signal};

use crate::common::{Chapter, Page};
use crate::query::ComicApi;

pub fn sorted_pages(pages: &[Page]) -> Vec<Page> {
    let mut pages = pages.to_vec();
    pages.sort_by_key(|page| page.number);
    pages
}

pub fn current_page(sorted_pages: &[Page], page_number: i64) -> Option<&Page> {
    sorted_pages.iter().find(|page| page.number == page_number)
}

pub fn current_chapter(chapters: &[Chapter], chapter_id: Option<i64>) -> Option<&Chapter> {
    chapters.iter().find(|chapter| Some(chapter.id) == chapter_id)
}

pub fn is_first_page(sorted_pages: &[Page], page_number: i64) -> bool {
    sorted_pages
        .first()
        .map(|page| page.number == page_number)
        .unwrap_or(true)
}

pub fn is_last_page(sorted_pages: &[Page], page_number: i64) -> bool {
    sorted_pages
        .last()
        .map(|page| page.number == page_number)
        .unwrap_or(true)
}

fn chapter_index(chapters: &[Chapter], chapter_id: Option<i64>) -> Option<usize> {
    chapters
        .iter()
        .position(|chapter| Some(chapter.id) == chapter_id)
}

pub fn prev_chapter(chapters: &[Chapter], chapter_id: Option<i64>) -> Option<&Chapter> {
    chapter_index(chapters, chapter_id)
        .and_then(|index| index.checked_sub(1))
        .map(|index| &chapters[index])
}

pub fn next_chapter(chapters: &[Chapter], chapter_id: Option<i64>) -> Option<&Chapter> {
    chapter_index(chapters, chapter_id).and_then(|index| chapters.get(index + 1))
}

pub fn prev_page_number(sorted_pages: &[Page], page_number: i64) -> Option<i64> {
    sorted_pages
        .iter()
        .rev()
        .find(|page| page.number < page_number)
        .map(|page| page.number)
}

pub fn next_page_number(sorted_pages: &[Page], page_number: i64) -> Option<i64> {
    sorted_pages
        .iter()
        .find(|page| page.number > page_number)
        .map(|page| page.number)
}

/// Clears `loading` when the request that set it ends, including when its
/// future is dropped mid-flight. Superseded requests leave it alone.
struct LoadingGuard<'a> {
    store: &'a ReaderStore,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.store.chapter_generation.get() == self.generation {
            self.store.loading.set_neq(false);
        }
    }
}

fn next_generation(counter: &Cell<u64>) -> u64 {
    let generation = counter.get().wrapping_add(1);
    counter.set(generation);
    generation
}

pub struct ReaderStore {
    pub comic_id: Mutable<Option<i64>>,
    pub chapter_id: Mutable<Option<i64>>,
    pub page_number: Mutable<i64>,
    pub comic_title: Mutable<Option<String>>,
    pub loading: Mutable<bool>,
    pub image_error: Mutable<bool>,
    all_chapters: Mutable<Vec<Chapter>>,
    pages: Mutable<Vec<Page>>,
    comic_generation: Cell<u64>,
    chapter_generation: Cell<u64>,
    api: Rc<dyn ComicApi>,
}

impl ReaderStore {
    pub fn new(api: Rc<dyn ComicApi>) -> Rc<Self> {
        Rc::new(Self {
            comic_id: Mutable::new(None),
            chapter_id: Mutable::new(None),
            page_number: Mutable::new(1),
            comic_title: Mutable::new(None),
            loading: Mutable::new(false),
            image_error: Mutable::new(false),
            all_chapters: Mutable::new(vec![]),
            pages: Mutable::new(vec![]),
            comic_generation: Cell::new(0),
            chapter_generation: Cell::new(0),
            api,
        })
    }

    /// Moving to another page forgets the image error of the previous one.
    pub fn set_position(&self, comic_id: i64, chapter_id: i64, page_number: i64) {
        let moved = self.comic_id.get() != Some(comic_id)
            || self.chapter_id.get() != Some(chapter_id)
            || self.page_number.get() != page_number;
        if moved {
            self.image_error.set_neq(false);
        }

        self.comic_id.set_neq(Some(comic_id));
        self.chapter_id.set_neq(Some(chapter_id));
        self.page_number.set_neq(page_number);
    }

    pub fn mark_image_error(&self) {
        self.image_error.set_neq(true);
    }

    pub fn all_chapters(&self) -> Vec<Chapter> {
        self.all_chapters.get_cloned()
    }

    pub fn pages(&self) -> Vec<Page> {
        self.pages.get_cloned()
    }

    pub fn sorted_pages(&self) -> Vec<Page> {
        sorted_pages(&self.pages.lock_ref())
    }

    pub fn current_page(&self) -> Option<Page> {
        current_page(&self.sorted_pages(), self.page_number.get()).cloned()
    }

    pub fn current_chapter(&self) -> Option<Chapter> {
        current_chapter(&self.all_chapters.lock_ref(), self.chapter_id.get()).cloned()
    }

    pub fn current_volume_number(&self) -> String {
        self.current_chapter()
            .map(|chapter| chapter.volume_number.to_string())
            .unwrap_or_default()
    }

    pub fn current_chapter_number(&self) -> String {
        self.current_chapter()
            .map(|chapter| chapter.number.to_string())
            .unwrap_or_default()
    }

    pub fn is_first_page(&self) -> bool {
        is_first_page(&self.sorted_pages(), self.page_number.get())
    }

    pub fn is_last_page(&self) -> bool {
        is_last_page(&self.sorted_pages(), self.page_number.get())
    }

    pub fn prev_chapter(&self) -> Option<Chapter> {
        prev_chapter(&self.all_chapters.lock_ref(), self.chapter_id.get()).cloned()
    }

    pub fn next_chapter(&self) -> Option<Chapter> {
        next_chapter(&self.all_chapters.lock_ref(), self.chapter_id.get()).cloned()
    }

    pub fn prev_page_number(&self) -> Option<i64> {
        prev_page_number(&self.sorted_pages(), self.page_number.get())
    }

    pub fn next_page_number(&self) -> Option<i64> {
        next_page_number(&self.sorted_pages(), self.page_number.get())
    }

    pub fn all_chapters_signal(&self) -> impl Signal<Item = Vec<Chapter>> + use<> {
        self.all_chapters.signal_cloned()
    }

    pub fn sorted_pages_signal(&self) -> impl Signal<Item = Vec<Page>> + use<> {
        self.pages.signal_ref(|pages| sorted_pages(pages))
    }

    pub fn current_page_signal(&self) -> impl Signal<Item = Option<Page>> + use<> {
        map_ref! {
            let pages = self.sorted_pages_signal(),
            let page_number = self.page_number.signal() =>
            current_page(pages, *page_number).cloned()
        }
    }

    pub fn page_count_signal(&self) -> impl Signal<Item = usize> + use<> {
        self.pages.signal_ref(|pages| pages.len())
    }

    pub fn is_first_page_signal(&self) -> impl Signal<Item = bool> + use<> {
        map_ref! {
            let pages = self.sorted_pages_signal(),
            let page_number = self.page_number.signal() =>
            is_first_page(pages, *page_number)
        }
    }

    pub fn is_last_page_signal(&self) -> impl Signal<Item = bool> + use<> {
        map_ref! {
            let pages = self.sorted_pages_signal(),
            let page_number = self.page_number.signal() =>
            is_last_page(pages, *page_number)
        }
    }

    pub fn current_chapter_signal(&self) -> impl Signal<Item = Option<Chapter>> + use<> {
        map_ref! {
            let chapters = self.all_chapters.signal_cloned(),
            let chapter_id = self.chapter_id.signal() =>
            current_chapter(chapters, *chapter_id).cloned()
        }
    }

    pub fn prev_chapter_signal(&self) -> impl Signal<Item = Option<Chapter>> + use<> {
        map_ref! {
            let chapters = self.all_chapters.signal_cloned(),
            let chapter_id = self.chapter_id.signal() =>
            prev_chapter(chapters, *chapter_id).cloned()
        }
    }

    pub fn next_chapter_signal(&self) -> impl Signal<Item = Option<Chapter>> + use<> {
        map_ref! {
            let chapters = self.all_chapters.signal_cloned(),
            let chapter_id = self.chapter_id.signal() =>
            next_chapter(chapters, *chapter_id).cloned()
        }
    }

    /// Rebuilds the chapter list of `comic_id`. On failure the previous list
    /// is kept.
    pub async fn fetch_comic_data(&self) {
        let Some(comic_id) = self.comic_id.get() else {
            warn!("fetch_comic_data called without comic id");
            return;
        };

        let generation = next_generation(&self.comic_generation);
        match self.api.fetch_comic(comic_id).await {
            Ok(detail) => {
                if self.comic_generation.get() != generation {
                    debug!("discard stale comic {} response", comic_id);
                    return;
                }

                let chapters = detail.chapters();
                info!("comic {} has {} chapters", comic_id, chapters.len());
                self.comic_title.set(detail.title);
                self.all_chapters.set(chapters);
            }
            Err(e) => {
                error!("error load comic {}: {:#}", comic_id, e);
            }
        }
    }

    /// Returns the number of pages of `chapter_id`, or 0 when it can't be
    /// loaded.
    pub async fn fetch_chapter_page_count(&self, chapter_id: i64) -> usize {
        match self.api.fetch_chapter_pages(chapter_id).await {
            Ok(pages) => {
                let count = pages.len();
                self.set_page_count(chapter_id, count);
                count
            }
            Err(e) => {
                error!("error load page count of chapter {}: {:#}", chapter_id, e);
                0
            }
        }
    }

    pub async fn fetch_chapter_data(&self, chapter_id: i64) {
        let generation = next_generation(&self.chapter_generation);
        let _guard = LoadingGuard {
            store: self,
            generation,
        };

        self.loading.set_neq(true);
        self.image_error.set_neq(false);

        let result = self.api.fetch_chapter_pages(chapter_id).await;
        if self.chapter_generation.get() != generation {
            debug!("discard stale chapter {} response", chapter_id);
            return;
        }

        match result {
            Ok(pages) => {
                let count = pages.len();
                self.pages.set(pages);
                self.set_page_count(chapter_id, count);
            }
            Err(e) => {
                error!("error load chapter {}: {:#}", chapter_id, e);
                self.pages.set(vec![]);
            }
        }
    }

    fn set_page_count(&self, chapter_id: i64, count: usize) {
        let mut chapters = self.all_chapters.lock_mut();
        if let Some(chapter) = chapters.iter_mut().find(|chapter| chapter.id == chapter_id) {
            chapter.page_count = Some(count);
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::FutureExt;

    use super::*;
    use crate::common::ComicDetail;

    #[derive(Default)]
    struct FakeApi {
        comics: RefCell<HashMap<i64, ComicDetail>>,
        chapters: RefCell<HashMap<i64, Vec<Page>>>,
        gates: RefCell<HashMap<i64, oneshot::Receiver<()>>>,
    }

    #[async_trait(?Send)]
    impl ComicApi for FakeApi {
        async fn fetch_comic(&self, comic_id: i64) -> Result<ComicDetail, anyhow::Error> {
            self.comics
                .borrow()
                .get(&comic_id)
                .cloned()
                .ok_or_else(|| anyhow!("request failed: 404 Not Found"))
        }

        async fn fetch_chapter_pages(&self, chapter_id: i64) -> Result<Vec<Page>, anyhow::Error> {
            let gate = self.gates.borrow_mut().remove(&chapter_id);
            if let Some(gate) = gate {
                let _ = gate.await;
            }

            self.chapters
                .borrow()
                .get(&chapter_id)
                .cloned()
                .ok_or_else(|| anyhow!("request failed: 500 Internal Server Error"))
        }
    }

    fn page(number: i64) -> Page {
        Page {
            id: number * 100,
            number,
            image_url: format!("{}.jpg", number),
        }
    }

    fn chapter(id: i64) -> Chapter {
        Chapter {
            id,
            number: id,
            title: None,
            volume_number: 1,
            page_count: None,
        }
    }

    fn comic_with_two_volumes() -> ComicDetail {
        serde_json::from_str(
            r#"{"title": "Shrek", "volumes": [
                {"number": 1, "chapters": [{"id": 1, "number": 1, "title": "a"}, {"id": 2, "number": 2, "title": "b"}]},
                {"number": 2, "chapters": [{"id": 3, "number": 3, "title": "c"}, {"id": 4, "number": 4, "title": "d"}]}
            ]}"#,
        )
        .unwrap()
    }

    fn store(api: FakeApi) -> (Rc<ReaderStore>, Rc<FakeApi>) {
        let api = Rc::new(api);
        (ReaderStore::new(api.clone()), api)
    }

    #[test]
    fn test_sorted_pages() {
        let sorted = sorted_pages(&[page(3), page(1), page(2)]);
        let numbers: Vec<i64> = sorted.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_sorted_pages_is_stable() {
        let mut first = page(2);
        first.id = 1;
        let mut second = page(2);
        second.id = 2;

        let sorted = sorted_pages(&[first, page(1), second]);
        assert_eq!(sorted[1].id, 1);
        assert_eq!(sorted[2].id, 2);
    }

    #[test]
    fn test_first_and_last_page_when_empty() {
        for page_number in [-1, 0, 1, 42] {
            assert!(is_first_page(&[], page_number));
            assert!(is_last_page(&[], page_number));
        }
    }

    #[test]
    fn test_first_and_last_page() {
        let pages = sorted_pages(&[page(3), page(1), page(2)]);
        assert!(is_first_page(&pages, 1));
        assert!(!is_last_page(&pages, 1));
        assert!(!is_first_page(&pages, 2));
        assert!(!is_last_page(&pages, 2));
        assert!(is_last_page(&pages, 3));
    }

    #[test]
    fn test_current_page() {
        let pages = sorted_pages(&[page(2), page(1)]);
        assert_eq!(current_page(&pages, 2).map(|p| p.id), Some(200));
        assert!(current_page(&pages, 5).is_none());
    }

    #[test]
    fn test_prev_and_next_chapter() {
        let chapters = vec![chapter(1), chapter(2), chapter(3)];

        assert_eq!(prev_chapter(&chapters, Some(2)).map(|c| c.id), Some(1));
        assert_eq!(next_chapter(&chapters, Some(2)).map(|c| c.id), Some(3));
        assert!(prev_chapter(&chapters, Some(1)).is_none());
        assert_eq!(next_chapter(&chapters, Some(1)).map(|c| c.id), Some(2));
        assert!(next_chapter(&chapters, Some(3)).is_none());
        assert!(prev_chapter(&chapters, Some(9)).is_none());
        assert!(next_chapter(&chapters, None).is_none());
    }

    #[test]
    fn test_prev_and_next_page_number() {
        let pages = sorted_pages(&[page(1), page(2), page(4)]);
        assert_eq!(prev_page_number(&pages, 1), None);
        assert_eq!(next_page_number(&pages, 2), Some(4));
        assert_eq!(prev_page_number(&pages, 4), Some(2));
        assert_eq!(next_page_number(&pages, 4), None);
    }

    #[test]
    fn test_current_volume_and_chapter_number() {
        let api = FakeApi::default();
        api.comics.borrow_mut().insert(7, comic_with_two_volumes());
        let (reader, _) = store(api);

        assert_eq!(reader.current_volume_number(), "");
        assert_eq!(reader.current_chapter_number(), "");

        reader.set_position(7, 3, 1);
        block_on(reader.fetch_comic_data());

        assert_eq!(reader.current_volume_number(), "2");
        assert_eq!(reader.current_chapter_number(), "3");
        assert_eq!(reader.comic_title.get_cloned().as_deref(), Some("Shrek"));
    }

    #[test]
    fn test_fetch_comic_data_flattens_volumes() {
        let api = FakeApi::default();
        api.comics.borrow_mut().insert(7, comic_with_two_volumes());
        let (reader, _) = store(api);
        reader.comic_id.set(Some(7));

        block_on(reader.fetch_comic_data());

        let chapters = reader.all_chapters();
        assert_eq!(chapters.len(), 4);
        assert!(chapters.iter().all(|c| c.page_count.is_none()));
        assert_eq!(
            chapters.iter().map(|c| c.volume_number).collect::<Vec<_>>(),
            vec![1, 1, 2, 2]
        );
    }

    #[test]
    fn test_fetch_comic_data_discards_page_counts() {
        let api = FakeApi::default();
        api.comics.borrow_mut().insert(7, comic_with_two_volumes());
        api.chapters.borrow_mut().insert(1, vec![page(1), page(2)]);
        let (reader, _) = store(api);
        reader.comic_id.set(Some(7));

        block_on(reader.fetch_comic_data());
        assert_eq!(block_on(reader.fetch_chapter_page_count(1)), 2);
        assert_eq!(reader.all_chapters()[0].page_count, Some(2));

        block_on(reader.fetch_comic_data());
        assert_eq!(reader.all_chapters()[0].page_count, None);
    }

    #[test]
    fn test_fetch_comic_data_failure_keeps_chapters() {
        let api = FakeApi::default();
        api.comics.borrow_mut().insert(7, comic_with_two_volumes());
        let (reader, _) = store(api);

        reader.comic_id.set(Some(7));
        block_on(reader.fetch_comic_data());
        reader.comic_id.set(Some(8));
        block_on(reader.fetch_comic_data());

        assert_eq!(reader.all_chapters().len(), 4);
    }

    #[test]
    fn test_fetch_comic_data_without_comic_id() {
        let (reader, _) = store(FakeApi::default());
        block_on(reader.fetch_comic_data());
        assert!(reader.all_chapters().is_empty());
    }

    #[test]
    fn test_fetch_chapter_page_count() {
        let api = FakeApi::default();
        api.comics.borrow_mut().insert(7, comic_with_two_volumes());
        api.chapters.borrow_mut().insert(2, vec![page(1), page(2), page(3)]);
        let (reader, _) = store(api);
        reader.comic_id.set(Some(7));
        block_on(reader.fetch_comic_data());

        assert_eq!(block_on(reader.fetch_chapter_page_count(2)), 3);
        assert_eq!(block_on(reader.fetch_chapter_page_count(4)), 0);

        let chapters = reader.all_chapters();
        assert_eq!(chapters[1].page_count, Some(3));
        assert_eq!(chapters[3].page_count, None);
        assert!(reader.pages().is_empty());
        assert!(!reader.loading.get());
    }

    #[test]
    fn test_fetch_chapter_page_count_unknown_chapter() {
        let api = FakeApi::default();
        api.chapters.borrow_mut().insert(99, vec![page(1)]);
        let (reader, _) = store(api);

        assert_eq!(block_on(reader.fetch_chapter_page_count(99)), 1);
        assert!(reader.all_chapters().is_empty());
    }

    #[test]
    fn test_fetch_chapter_data() {
        let api = FakeApi::default();
        api.comics.borrow_mut().insert(7, comic_with_two_volumes());
        api.chapters.borrow_mut().insert(1, vec![page(3), page(1), page(2)]);
        let (reader, _) = store(api);
        reader.set_position(7, 1, 1);
        block_on(reader.fetch_comic_data());
        reader.mark_image_error();

        block_on(reader.fetch_chapter_data(1));

        assert_eq!(reader.pages().len(), 3);
        assert!(!reader.loading.get());
        assert!(!reader.image_error.get());
        assert_eq!(reader.all_chapters()[0].page_count, Some(3));
        assert!(reader.is_first_page());
        assert_eq!(reader.next_page_number(), Some(2));
        assert_eq!(reader.current_page().map(|p| p.number), Some(1));
        assert_eq!(reader.next_chapter().map(|c| c.id), Some(2));
        assert!(reader.prev_chapter().is_none());
    }

    #[test]
    fn test_image_error_cleared_on_page_change() {
        let api = FakeApi::default();
        api.chapters.borrow_mut().insert(1, vec![page(1), page(2), page(3)]);
        let (reader, _) = store(api);
        reader.set_position(1, 1, 1);
        block_on(reader.fetch_chapter_data(1));

        reader.mark_image_error();
        reader.set_position(1, 1, 1);
        assert!(reader.image_error.get());

        reader.set_position(1, 1, 2);
        assert!(!reader.image_error.get());
        assert_eq!(reader.current_page().map(|p| p.number), Some(2));
    }

    #[test]
    fn test_fetch_chapter_data_server_error_clears_pages() {
        let api = FakeApi::default();
        api.chapters.borrow_mut().insert(1, vec![page(1)]);
        let (reader, _) = store(api);

        block_on(reader.fetch_chapter_data(1));
        assert_eq!(reader.pages().len(), 1);

        block_on(reader.fetch_chapter_data(2));
        assert!(reader.pages().is_empty());
        assert!(!reader.loading.get());
        assert!(reader.is_first_page());
        assert!(reader.is_last_page());
    }

    #[test]
    fn test_stale_chapter_response_is_discarded() {
        let api = FakeApi::default();
        api.chapters.borrow_mut().insert(1, vec![page(1)]);
        api.chapters.borrow_mut().insert(2, vec![page(1), page(2)]);
        let (tx, rx) = oneshot::channel();
        api.gates.borrow_mut().insert(1, rx);
        let (reader, _) = store(api);

        block_on(async {
            let first = reader.fetch_chapter_data(1);
            let second = {
                let reader = reader.clone();
                async move {
                    reader.fetch_chapter_data(2).await;
                    tx.send(()).unwrap();
                }
            };
            futures::join!(first, second);
        });

        assert_eq!(reader.pages().len(), 2);
        assert!(!reader.loading.get());
    }

    #[test]
    fn test_dropped_chapter_request_clears_loading() {
        let api = FakeApi::default();
        let (_tx, rx) = oneshot::channel();
        api.gates.borrow_mut().insert(1, rx);
        let (reader, _) = store(api);

        {
            let mut fut = reader.fetch_chapter_data(1).boxed_local();
            let waker = futures::task::noop_waker();
            let mut cx = std::task::Context::from_waker(&waker);
            assert!(fut.poll_unpin(&mut cx).is_pending());
            assert!(reader.loading.get());
        }

        assert!(!reader.loading.get());
    }
}
