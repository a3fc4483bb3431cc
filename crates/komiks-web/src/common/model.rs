use serde::{Deserialize, Serialize};

/// Identifier claims arrive either as numbers or as strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserId::Number(id) => write!(f, "{}", id),
            UserId::Text(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub nickname: String,
    pub email: String,
    pub user_id: Option<UserId>,
    pub role: Option<i64>,
    pub is_logged_in: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            nickname: "Вход".to_string(),
            email: "".to_string(),
            user_id: None,
            role: None,
            is_logged_in: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: i64,
    pub number: i64,
    pub title: Option<String>,
    pub volume_number: i64,
    pub page_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Page {
    #[serde(default)]
    pub id: i64,
    pub number: i64,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComicDetail {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Volume {
    pub number: i64,
    #[serde(default)]
    pub chapters: Vec<ChapterEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterEntry {
    pub id: i64,
    pub number: i64,
    #[serde(default)]
    pub title: Option<String>,
}

impl ComicDetail {
    /// Flattens `volumes[].chapters[]` in response order.
    pub fn chapters(&self) -> Vec<Chapter> {
        self.volumes
            .iter()
            .flat_map(|volume| {
                volume.chapters.iter().map(move |chapter| Chapter {
                    id: chapter.id,
                    number: chapter.number,
                    title: chapter.title.clone(),
                    volume_number: volume.number,
                    page_count: None,
                })
            })
            .collect()
    }
}

/// Comic summary as listed by the catalogue endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ComicBase {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub img: String,
    #[serde(default)]
    pub date_of_out: String,
    #[serde(default)]
    pub website_recommendation: bool,
    #[serde(default)]
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_comic_detail_missing_volumes() {
        let detail: ComicDetail = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert!(detail.chapters().is_empty());
    }

    #[test]
    fn test_chapters_carry_volume_number() {
        let detail: ComicDetail = serde_json::from_str(
            r#"{"volumes": [
                {"number": 1, "chapters": [{"id": 10, "number": 1, "title": "Начало"}]},
                {"number": 2, "chapters": [{"id": 20, "number": 2, "title": null}]},
                {"number": 3}
            ]}"#,
        )
        .unwrap();

        let chapters = detail.chapters();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].volume_number, 1);
        assert_eq!(chapters[0].title.as_deref(), Some("Начало"));
        assert_eq!(chapters[1].volume_number, 2);
        assert_eq!(chapters[1].page_count, None);
    }

    #[test]
    fn test_page_defaults() {
        let page: Page = serde_json::from_str(r#"{"number": 3}"#).unwrap();
        assert_eq!(page.number, 3);
        assert_eq!(page.id, 0);
        assert!(page.image_url.is_empty());
    }

    #[test]
    fn test_user_id_untagged() {
        let id: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(id, UserId::Number(42));
        let id: UserId = serde_json::from_str(r#""u-42""#).unwrap();
        assert_eq!(id, UserId::Text("u-42".to_string()));
    }

    #[test]
    fn test_comic_base_list() {
        let comics: Vec<ComicBase> = serde_json::from_str(
            r#"[
                {"id": 1, "title": "Shrek", "desc": "Awesome Comic", "date_of_out": "2023-01-15",
                 "website_recommendation": true, "img": "comics/shrek/cover.jpg", "average_rating": 8.5},
                {"id": 2, "title": "Без обложки", "desc": null, "date_of_out": "2024-02-01",
                 "website_recommendation": false, "img": "", "average_rating": null}
            ]"#,
        )
        .unwrap();

        assert_eq!(comics.len(), 2);
        assert_eq!(comics[0].img, "comics/shrek/cover.jpg");
        assert!(comics[0].website_recommendation);
        assert_eq!(comics[0].average_rating, Some(8.5));
        assert_eq!(comics[1].desc, None);
        assert_eq!(comics[1].average_rating, None);
    }
}
