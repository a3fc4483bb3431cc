#[macro_use]
extern crate log;

mod app;
mod catalogue;
mod comic;
pub mod common;
mod login;
mod pages;
pub mod query;
mod reader;
pub mod storage;
pub mod stores;
mod utils;

use std::rc::Rc;

use wasm_bindgen::prelude::*;

use app::App;
use storage::LocalStorage;
use utils::local_storage;

#[wasm_bindgen(start)]
pub async fn main_js() -> Result<(), JsValue> {
    #[cfg(debug_assertions)]
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    utils::initialize_urls();

    let app = App::new(Rc::new(LocalStorage::new(local_storage())));
    dominator::append_dom(&dominator::body(), App::render(app));

    Ok(())
}
