use tabfeed_model::{Bundle, TabItem};
use uuid::Uuid;

/// Allocate a fresh bundle. Derived fields (summary, tips) arrive
/// asynchronously after creation.
#[must_use]
pub fn new_bundle(title: &str, tab_ids: Vec<i64>, now: u64) -> Bundle {
    Bundle {
        id: Uuid::new_v4().to_string(),
        title: title.trim().to_string(),
        tab_ids,
        created_at: now,
        summary: None,
        tips: Vec::new(),
        chat: Vec::new(),
        items: None,
        archived: false,
    }
}

/// Remove a member by tab id, or by matching snapshot URL for archived
/// bundles whose ids no longer resolve. Returns whether anything
/// changed.
pub fn remove_member(bundle: &mut Bundle, tab_id: Option<i64>, url: Option<&str>) -> bool {
    let mut changed = false;
    if let Some(tab_id) = tab_id {
        let before = bundle.tab_ids.len();
        bundle.tab_ids.retain(|id| *id != tab_id);
        changed |= bundle.tab_ids.len() != before;
        if let Some(items) = bundle.items.as_mut() {
            let before = items.len();
            items.retain(|item| item.tab_id != tab_id);
            changed |= items.len() != before;
        }
    }
    if let Some(url) = url {
        if let Some(items) = bundle.items.as_mut() {
            let before = items.len();
            items.retain(|item| item.url != url);
            changed |= items.len() != before;
        }
    }
    changed
}

/// Snapshot the bundle's member items so the bundle stays displayable
/// after the underlying tabs are closed.
pub fn archive_members(bundle: &mut Bundle, members: Vec<TabItem>) {
    bundle.items = Some(members);
    bundle.archived = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn member(tab_id: i64, url: &str) -> TabItem {
        TabItem::new(tab_id, 1, 0, url, 10)
    }

    #[test]
    fn new_bundles_get_unique_ids() {
        let a = new_bundle("  Japan trip ", vec![1, 2, 3], 10);
        let b = new_bundle("Japan trip", vec![1, 2, 3], 10);
        assert_eq!(a.title, "Japan trip");
        assert_ne!(a.id, b.id);
        assert!(!a.archived);
    }

    #[test]
    fn remove_by_id_touches_ids_and_snapshot() {
        let mut bundle = new_bundle("t", vec![1, 2], 10);
        bundle.items = Some(vec![member(1, "https://a.example/"), member(2, "https://b.example/")]);
        assert!(remove_member(&mut bundle, Some(1), None));
        assert_eq!(bundle.tab_ids, vec![2]);
        assert_eq!(bundle.items.as_ref().unwrap().len(), 1);
        assert!(!remove_member(&mut bundle, Some(99), None));
    }

    #[test]
    fn remove_by_url_serves_archived_bundles() {
        let mut bundle = new_bundle("t", Vec::new(), 10);
        archive_members(
            &mut bundle,
            vec![member(1, "https://a.example/"), member(2, "https://b.example/")],
        );
        assert!(bundle.archived);
        assert!(remove_member(&mut bundle, None, Some("https://a.example/")));
        let items = bundle.items.as_ref().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://b.example/");
    }
}
