//! Views that only show static content.

use dominator::{html, link, Dom};

use crate::common::Route;

fn render_page(title: &str, children: &mut [Dom]) -> Dom {
    html!("div", {
        .class("content")
        .children(&mut [
            html!("h1", {
                .text(title)
            })
        ])
        .children(children)
    })
}

pub fn render_about() -> Dom {
    render_page("О проекте", &mut [
        html!("p", {
            .text("Читайте комиксы и мангу онлайн.")
        })
    ])
}

pub fn render_favourite() -> Dom {
    render_page("Избранное", &mut [
        link!(Route::Catalogue.url(), {
            .text("Перейти в каталог")
        })
    ])
}

pub fn render_create_comic() -> Dom {
    render_page("Новый комикс", &mut [])
}

pub fn render_not_found() -> Dom {
    render_page("Страница не найдена", &mut [
        link!(Route::About.url(), {
            .text("На главную")
        })
    ])
}
