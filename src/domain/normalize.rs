//! Converts raw upstream chart items into flat records.

use serde_json::Value as Json;

use super::{
    category::{ChartCategory, columns::*},
    record::{ChartTable, Record, Value},
};

const NOT_AVAILABLE: &str = "N/A";

/// Normalizes every item of `items`, keeping input order. Never drops rows.
pub fn normalize(category: ChartCategory, items: &[Json]) -> Vec<Record> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let position = (POSITION, Value::Integer(i as i64 + 1));
            let cells = match category {
                ChartCategory::Track => vec![
                    position,
                    (TITLE, text_or_na(item.get("title"))),
                    (ARTIST, text_or_na(nested(item, "artist", "name"))),
                    (ALBUM, text_or_na(nested(item, "album", "title"))),
                    (DURATION_SECONDS, Value::Integer(seconds(item.get("duration")))),
                    (PREVIEW_URL, text_or_missing(item.get("preview"))),
                ],
                ChartCategory::Album | ChartCategory::Playlist | ChartCategory::Podcast => vec![
                    position,
                    (TITLE, text_or_na(item.get("title"))),
                    (LINK, text_or_na(item.get("link"))),
                ],
                ChartCategory::Artist => vec![
                    position,
                    (NAME, text_or_na(item.get("name"))),
                    (LINK, text_or_na(item.get("link"))),
                ],
            };
            Record::new(cells)
        })
        .collect()
}

pub fn normalize_table(category: ChartCategory, items: &[Json]) -> ChartTable {
    ChartTable::new(category, normalize(category, items))
}

/// `item.outer.inner`, absent when `outer` is missing or not an object
fn nested<'a>(item: &'a Json, outer: &str, inner: &str) -> Option<&'a Json> {
    item.get(outer).and_then(|o| o.get(inner))
}

fn scalar_text(value: Option<&Json>) -> Option<String> {
    match value? {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        Json::Null | Json::Array(_) | Json::Object(_) => None,
    }
}

fn text_or_na(value: Option<&Json>) -> Value {
    Value::Text(scalar_text(value).unwrap_or_else(|| NOT_AVAILABLE.to_string()))
}

fn text_or_missing(value: Option<&Json>) -> Value {
    scalar_text(value).map(Value::Text).unwrap_or(Value::Missing)
}

fn seconds(value: Option<&Json>) -> i64 {
    match value {
        Some(Json::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Json::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_track_fields_are_extracted() {
        let items = vec![json!({
            "title": "Song A",
            "artist": {"name": "Artist X"},
            "album": {"title": "Album Y"},
            "duration": 180,
            "preview": "http://x"
        })];

        let records = normalize(ChartCategory::Track, &items);

        assert_eq!(
            records,
            vec![Record::new(vec![
                (POSITION, Value::Integer(1)),
                (TITLE, text("Song A")),
                (ARTIST, text("Artist X")),
                (ALBUM, text("Album Y")),
                (DURATION_SECONDS, Value::Integer(180)),
                (PREVIEW_URL, text("http://x")),
            ])]
        );
    }

    #[test]
    fn test_track_missing_nested_objects_default_to_na() {
        let items = vec![json!({"title": "Lonely", "artist": null, "album": "flat string"})];

        let records = normalize(ChartCategory::Track, &items);
        let record = &records[0];

        assert_eq!(record.get(ARTIST), Some(&text(NOT_AVAILABLE)));
        assert_eq!(record.get(ALBUM), Some(&text(NOT_AVAILABLE)));
        assert_eq!(record.get(DURATION_SECONDS), Some(&Value::Integer(0)));
        assert_eq!(record.get(PREVIEW_URL), Some(&Value::Missing));
    }

    #[test]
    fn test_empty_item_yields_full_record_of_defaults() {
        for category in ChartCategory::ALL {
            let records = normalize(category, &[json!({})]);

            assert_eq!(records.len(), 1);
            let columns: Vec<_> = records[0].columns().collect();
            assert_eq!(columns, category.columns(), "{category}");
        }
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        for category in ChartCategory::ALL {
            assert!(normalize(category, &[]).is_empty(), "{category}");
        }
    }

    #[test]
    fn test_positions_are_dense_and_follow_input_order() {
        let items: Vec<_> = (0..7)
            .map(|i| json!({"name": format!("artist {i}"), "link": "l"}))
            .collect();

        let records = normalize(ChartCategory::Artist, &items);

        assert_eq!(records.len(), items.len());
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.position(), Some(i as i64 + 1));
            assert_eq!(record.get(NAME), Some(&text(&format!("artist {i}"))));
        }
    }

    #[test]
    fn test_titled_categories_share_shape() {
        let items = vec![json!({"title": "Top Brasil", "link": "https://deezer.com/playlist/1"})];

        for category in [
            ChartCategory::Album,
            ChartCategory::Playlist,
            ChartCategory::Podcast,
        ] {
            let records = normalize(category, &items);
            assert_eq!(records[0].get(TITLE), Some(&text("Top Brasil")));
            assert_eq!(
                records[0].get(LINK),
                Some(&text("https://deezer.com/playlist/1"))
            );
        }
    }

    #[test]
    fn test_duration_accepts_float_and_numeric_string() {
        let items = vec![json!({"duration": 201.9}), json!({"duration": " 95 "}), json!({"duration": "long"})];

        let durations: Vec<_> = normalize(ChartCategory::Track, &items)
            .iter()
            .map(|r| r.get(DURATION_SECONDS).and_then(Value::as_integer))
            .collect();

        assert_eq!(durations, vec![Some(201), Some(95), Some(0)]);
    }

    #[test]
    fn test_numeric_title_is_stringified() {
        let records = normalize(ChartCategory::Album, &[json!({"title": 1989})]);

        assert_eq!(records[0].get(TITLE), Some(&text("1989")));
    }
}
