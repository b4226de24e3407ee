//! Command Integration Tests
//!
//! Full stack: in-memory SQLite, images under a temp dir.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::commands::*;
    use crate::config::AppConfig;
    use crate::dnd::{DragOutcome, DragPhase};
    use crate::domain::{DomainError, DomainResult, Item, TierId, UserIdentity};
    use crate::repository::init_db;
    use crate::storage::{asset_path, LocalObjectStore, ObjectStore};
    use crate::AppState;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    async fn setup() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::rooted_at(dir.path());
        let db = init_db(&PathBuf::from(":memory:")).await.expect("Failed to init test DB");
        let objects = Arc::new(LocalObjectStore::new(&config.assets_dir));
        let state = AppState::new(config, &db, objects);
        (dir, state)
    }

    async fn signed_in(state: &AppState, user: &str) {
        state.session.sign_in(UserIdentity::new(user).with_name(user));
        load_my_board(state).await.unwrap();
    }

    fn png(name: &str) -> Option<ImageUpload> {
        Some(ImageUpload {
            bytes: b"\x89PNG fake".to_vec(),
            file_name: name.to_string(),
        })
    }

    async fn add(state: &AppState, tier: &str, title: &str) -> Item {
        add_item(state, tier, title, png("cover.png")).await.unwrap()
    }

    fn stored_images(state: &AppState) -> usize {
        let dir = state.config.assets_dir.join("anime-images");
        std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
    }

    // ========================
    // Board editing
    // ========================

    #[tokio::test]
    async fn test_load_requires_sign_in() {
        let (_dir, state) = setup().await;
        let err = load_my_board(&state).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_add_item_uploads_then_places() {
        let (_dir, state) = setup().await;
        signed_in(&state, "u1").await;

        let item = add(&state, "S", "Frieren").await;
        assert_eq!(item.title, "Frieren");
        let path = asset_path(&item.image_url).unwrap();
        assert!(path.exists());

        let board = get_board(&state).await;
        assert_eq!(board.items(TierId::S), &[item]);
    }

    #[tokio::test]
    async fn test_add_item_validates_before_upload() {
        let (_dir, state) = setup().await;

        let err = add_item(&state, "S", "Frieren", None).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let err = add_item(&state, "S", "   ", png("a.png")).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let err = add_item(&state, "Z", "Frieren", png("a.png")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        assert_eq!(stored_images(&state), 0);
        assert!(get_board(&state).await.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_checked_before_upload() {
        let (_dir, state) = setup().await;

        add(&state, "national", "Clannad").await;
        assert_eq!(stored_images(&state), 1);

        let err = add_item(&state, "national", "Steins;Gate", png("b.png")).await.unwrap_err();
        assert!(matches!(err, DomainError::CapacityExceeded(_)));
        assert_eq!(err.notice(), "National Power can only hold one title!");
        assert_eq!(stored_images(&state), 1);
        assert_eq!(get_board(&state).await.items(TierId::National).len(), 1);
    }

    #[tokio::test]
    async fn test_add_from_clipboard() {
        let (_dir, state) = setup().await;
        let item = add_item_from_clipboard(&state, "B", "Pasted", "data:image/png;base64,aGVsbG8=")
            .await
            .unwrap();

        let path = asset_path(&item.image_url).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_remove_needs_confirmation() {
        let (_dir, state) = setup().await;
        let item = add(&state, "C", "Filler").await;

        assert!(!remove_item(&state, item.id.as_str(), false).await.unwrap());
        assert_eq!(get_board(&state).await.len(), 1);

        assert!(remove_item(&state, item.id.as_str(), true).await.unwrap());
        assert!(get_board(&state).await.is_empty());

        let err = remove_item(&state, item.id.as_str(), true).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_direct_moves() {
        let (_dir, state) = setup().await;
        let a = add(&state, "A", "a").await;
        let b = add(&state, "A", "b").await;

        let board = move_item_within_tier(&state, "A", 1, 0).await.unwrap();
        assert_eq!(board.items(TierId::A), &[b.clone(), a.clone()]);

        let board = move_item_to_tier(&state, a.id.as_str(), "D", None).await.unwrap();
        assert_eq!(board.items(TierId::A), &[b]);
        assert_eq!(board.items(TierId::D), &[a]);

        let err = move_item_within_tier(&state, "A", 0, 5).await.unwrap_err();
        assert!(matches!(err, DomainError::IndexOutOfRange { .. }));
    }

    #[tokio::test]
    async fn test_list_tiers() {
        let (_dir, state) = setup().await;
        add(&state, "national", "Clannad").await;

        let tiers = list_tiers(&state).await;
        assert_eq!(tiers.len(), 7);
        assert_eq!(tiers[0].tier, TierId::National);
        assert!(!tiers[0].can_add);
        assert!(tiers[0].description.ends_with("(max 1)"));
        assert!(tiers[1].can_add);
    }

    /// Local store that parks each upload until released
    struct GatedStore {
        inner: LocalObjectStore,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl ObjectStore for GatedStore {
        async fn upload(&self, bytes: Vec<u8>, name_hint: &str) -> DomainResult<String> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.upload(bytes, name_hint).await
        }

        async fn delete(&self, url: &str) -> DomainResult<()> {
            self.inner.delete(url).await
        }
    }

    #[tokio::test]
    async fn test_tier_filled_during_upload_leaves_no_image() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::rooted_at(dir.path());
        let db = init_db(&PathBuf::from(":memory:")).await.unwrap();
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let objects = Arc::new(GatedStore {
            inner: LocalObjectStore::new(&config.assets_dir),
            entered: entered.clone(),
            release: release.clone(),
        });
        let state = Arc::new(AppState::new(config, &db, objects));

        let pending = {
            let state = state.clone();
            tokio::spawn(
                async move { add_item(&state, "national", "Clannad", png("a.png")).await },
            )
        };

        // Another title takes the single slot while the cover is uploading
        entered.notified().await;
        {
            let mut ws = state.workspace.lock().await;
            ws.board = ws
                .board
                .add_item(TierId::National, "Steins;Gate", "asset://localhost/x.png")
                .unwrap();
        }
        release.notify_one();

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, DomainError::CapacityExceeded(_)));
        assert_eq!(stored_images(&state), 0);
        assert_eq!(get_board(&state).await.items(TierId::National)[0].title, "Steins;Gate");
    }

    // ========================
    // Drag events
    // ========================

    #[tokio::test]
    async fn test_drag_round_trip_between_tiers() {
        let (_dir, state) = setup().await;
        let x1 = add(&state, "S", "x1").await;
        let x2 = add(&state, "A", "x2").await;

        drag_start(&state, x1.id.as_str()).await;
        drag_over(&state, Some("A")).await;
        let outcome = drag_end(&state, Some("A")).await.unwrap();
        assert!(outcome.is_move());
        let board = get_board(&state).await;
        assert!(board.items(TierId::S).is_empty());
        assert_eq!(board.items(TierId::A), &[x2.clone(), x1.clone()]);

        drag_start(&state, x1.id.as_str()).await;
        drag_end(&state, Some("S")).await.unwrap();
        let board = get_board(&state).await;
        assert_eq!(board.items(TierId::S), &[x1]);
        assert_eq!(board.items(TierId::A), &[x2]);
    }

    #[tokio::test]
    async fn test_drag_into_full_tier_is_error() {
        let (_dir, state) = setup().await;
        add(&state, "national", "g1").await;
        let x2 = add(&state, "B", "x2").await;
        let before = get_board(&state).await;

        drag_start(&state, x2.id.as_str()).await;
        let err = drag_end(&state, Some("national")).await.unwrap_err();
        assert!(matches!(err, DomainError::CapacityExceeded(_)));
        assert_eq!(get_board(&state).await, before);
        assert_eq!(drag_feedback(&state).await.phase, DragPhase::Idle);
    }

    #[tokio::test]
    async fn test_drag_feedback_and_cancel() {
        let (_dir, state) = setup().await;
        let x = add(&state, "S", "x").await;
        let before = get_board(&state).await;

        drag_start(&state, x.id.as_str()).await;
        drag_over(&state, Some("F")).await;

        let feedback = drag_feedback(&state).await;
        assert_eq!(feedback.phase, DragPhase::Hovering);
        assert_eq!(feedback.active, Some(x));
        assert_eq!(feedback.hovered.as_deref(), Some("F"));

        let tiers = list_tiers(&state).await;
        let f = tiers.iter().find(|t| t.tier == TierId::F).unwrap();
        assert_eq!(f.hint, Some("Drop here"));

        assert_eq!(drag_cancel(&state).await, DragOutcome::Cancelled);
        assert_eq!(get_board(&state).await, before);
        assert_eq!(drag_feedback(&state).await.phase, DragPhase::Idle);
    }

    // ========================
    // Save and reload
    // ========================

    #[tokio::test]
    async fn test_save_and_reload() {
        let (_dir, state) = setup().await;
        signed_in(&state, "u1").await;
        add(&state, "national", "Clannad").await;
        add(&state, "S", "Frieren").await;
        let board = get_board(&state).await;

        let notice = save_board(&state).await.unwrap();
        assert_eq!(notice.message, "Saved!");
        assert!(notice.updated_at > 0);

        // Unsaved edits are dropped by a reload
        add(&state, "F", "Unsaved").await;
        let reloaded = load_my_board(&state).await.unwrap();
        assert_eq!(reloaded, board);
    }

    #[tokio::test]
    async fn test_save_requires_owner_session() {
        let (_dir, state) = setup().await;
        let err = save_board(&state).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        signed_in(&state, "u1").await;
        state.session.sign_in(UserIdentity::new("u2"));
        let err = save_board(&state).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_sign_in_loads_board() {
        let (_dir, state) = setup().await;
        let state = Arc::new(state);
        let watcher = watch_session(state.clone());

        state.session.sign_in(UserIdentity::new("u1"));
        let loaded = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if state.workspace.lock().await.owner.is_some() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(loaded.is_ok());
        assert_eq!(list_profiles(&state).await.unwrap().len(), 1);

        watcher.abort();
    }

    // ========================
    // Profiles and comments
    // ========================

    #[tokio::test]
    async fn test_view_profile() {
        let (_dir, state) = setup().await;
        signed_in(&state, "u1").await;
        add(&state, "A", "Mushishi").await;
        save_board(&state).await.unwrap();

        let view = view_profile(&state, "u1").await.unwrap();
        assert!(view.is_own);
        assert_eq!(view.board.items(TierId::A).len(), 1);

        state.session.sign_in(UserIdentity::new("u2"));
        assert!(!view_profile(&state, "u1").await.unwrap().is_own);

        let err = view_profile(&state, "ghost").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_comment_requires_sign_in() {
        let (_dir, state) = setup().await;
        let err = add_comment(&state, "u1", "hi").await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_no_reply_to_deleted_comment() {
        let (_dir, state) = setup().await;
        state.session.sign_in(UserIdentity::new("alice"));

        let comment = add_comment(&state, "owner", "Soon gone").await.unwrap();
        delete_comment(&state, comment.id.as_str()).await.unwrap();

        let err = add_reply(&state, comment.id.as_str(), "late reply").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let threads = list_threads(&state, "owner").await.unwrap();
        assert!(threads[0].replies.is_empty());
    }

    #[tokio::test]
    async fn test_comment_thread_lifecycle() {
        let (_dir, state) = setup().await;
        state.session.sign_in(UserIdentity::new("alice").with_name("Alice"));

        let comment = add_comment(&state, "owner", "Great list").await.unwrap();
        assert_eq!(comment.post.author.name, "Alice");
        let reply = add_reply(&state, comment.id.as_str(), "Agreed").await.unwrap();

        let edited = edit_comment(&state, comment.id.as_str(), "Great list!").await.unwrap();
        assert!(edited.post.is_edited);

        // Someone else may reply but not edit or delete
        state.session.sign_in(UserIdentity::new("bob"));
        let err = edit_comment(&state, comment.id.as_str(), "hijack").await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        let err = delete_reply(&state, reply.id.as_str()).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        add_reply(&state, comment.id.as_str(), "Me too").await.unwrap();

        state.session.sign_in(UserIdentity::new("alice"));
        let deleted = delete_reply(&state, reply.id.as_str()).await.unwrap();
        assert!(deleted.post.is_deleted);
        let err = edit_reply(&state, reply.id.as_str(), "undo").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let threads = list_threads(&state, "owner").await.unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].comment.post.text, "Great list!");
        assert_eq!(threads[0].replies.len(), 2);
        assert!(threads[0].replies[0].post.text.is_empty());

        let err = add_reply(&state, "missing", "hello").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        let err = delete_comment(&state, "missing").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
