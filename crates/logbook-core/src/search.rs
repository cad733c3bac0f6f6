use logbook_types::ContentMeta;

/// Case-insensitive substring filter over a caller-supplied slice of
/// visible records, matching on title and transcription. A linear scan
/// is fine at prototype scale; an inverted index is the upgrade path if
/// volume ever demands one.
///
/// An empty query matches everything.
pub fn search(visible: &[ContentMeta], query: &str) -> Vec<ContentMeta> {
    let needle = query.to_lowercase();
    visible
        .iter()
        .filter(|m| {
            m.title.to_lowercase().contains(&needle)
                || m.transcription.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use logbook_types::ContentMeta;
    use uuid::Uuid;

    fn meta(title: &str, transcription: &str) -> ContentMeta {
        ContentMeta {
            id: Uuid::new_v4(),
            owner: "kirk".into(),
            title: title.into(),
            transcription: transcription.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn matches_title_and_transcription_case_insensitively() {
        let visible = vec![
            meta("Nebula Report", "dense gas clouds ahead"),
            meta("Warp Notes", "dilithium levels nominal"),
        ];

        let by_title = search(&visible, "NEBULA");
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Nebula Report");

        let by_text = search(&visible, "Dilithium");
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].title, "Warp Notes");

        assert!(search(&visible, "romulan").is_empty());
    }

    #[test]
    fn empty_query_matches_everything() {
        let visible = vec![meta("a", ""), meta("b", "")];
        assert_eq!(search(&visible, "").len(), 2);
    }

    #[test]
    fn preserves_input_order() {
        let visible = vec![meta("log alpha", ""), meta("log beta", "")];
        let hits = search(&visible, "log");
        assert_eq!(hits[0].title, "log alpha");
        assert_eq!(hits[1].title, "log beta");
    }
}
