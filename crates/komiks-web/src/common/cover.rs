use dominator::{html, link, Dom};

use crate::common::route::Route;
use crate::common::ComicBase;
use crate::utils::image_url;

pub struct Cover;

impl Cover {
    pub fn render(comic: &ComicBase) -> Dom {
        link!(Route::Comic(comic.id).url(), {
            .class("comic-cover")
            .apply_if(!comic.img.is_empty(), |dom| {
                dom.child(html!("img", {
                    .attr("src", &image_url(&comic.img))
                    .attr("alt", &comic.title)
                    .attr("loading", "lazy")
                }))
            })
            .children(&mut [
                html!("div", {
                    .class("title")
                    .children(&mut [
                        html!("span", {
                            .text(&comic.title)
                        })
                    ])
                })
            ])
        })
    }
}
