use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::ServiceError;
use crate::notes::model::{Note, NoteDraft, NotePatch};
use crate::notes::repository::NoteRepository;
use crate::storage::json_list_store::JsonListStore;

/// Notes persisted as one pretty-printed JSON array.
pub struct FileNoteRepository {
    store: Arc<JsonListStore<Note>>,
}

impl FileNoteRepository {
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonListStore::<Note>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }
}

#[async_trait]
impl NoteRepository for FileNoteRepository {
    async fn list(&self) -> Result<Vec<Note>, ServiceError> {
        self.store.load_all().await
    }

    async fn get(&self, id: &str) -> Result<Note, ServiceError> {
        self.store
            .load_all()
            .await?
            .into_iter()
            .find(|n| n.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Note with ID {id} not found")))
    }

    async fn create(&self, draft: NoteDraft) -> Result<Note, ServiceError> {
        self.store
            .update(move |notes| {
                let note = draft.into_note()?;
                notes.push(note.clone());
                Ok(note)
            })
            .await
    }

    async fn update(&self, id: &str, patch: NotePatch) -> Result<Note, ServiceError> {
        self.store
            .update(move |notes| {
                let note = notes
                    .iter_mut()
                    .find(|n| n.id == id)
                    .ok_or_else(|| ServiceError::NotFound(format!("Note with ID {id} not found for update.")))?;
                patch.apply(note);
                Ok(note.clone())
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.store
            .update(move |notes| {
                let before = notes.len();
                notes.retain(|n| n.id != id);
                debug!(id, removed = before - notes.len(), "delete scan");
                if notes.len() < before {
                    Ok(())
                } else {
                    Err(ServiceError::NotFound(format!("Note with ID {id} not found for deletion.")))
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_repo() -> (Arc<FileNoteRepository>, PathBuf) {
        let tmp = std::env::temp_dir().join(format!("notes_repo_{}.json", uuid::Uuid::new_v4()));
        let repo = FileNoteRepository::new(&tmp).await.expect("repo init");
        (repo, tmp)
    }

    fn draft(title: &str, content: &str) -> NoteDraft {
        NoteDraft { title: Some(title.into()), content: Some(content.into()) }
    }

    #[tokio::test]
    async fn note_repo_crud_round_trip() -> Result<(), anyhow::Error> {
        let (repo, tmp) = setup_repo().await;

        let a = repo.create(draft("A", "first")).await?;
        let b = repo.create(draft("B", "second")).await?;
        let ids: Vec<String> = repo.list().await?.into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a.id.clone(), b.id.clone()]);

        assert_eq!(repo.get(&a.id).await?, a);

        let patched = repo
            .update(&a.id, NotePatch { title: Some("A2".into()), content: None })
            .await?;
        assert_eq!(patched.title, "A2");
        assert_eq!(patched.content, "first");
        assert_eq!(patched.created_at, a.created_at);
        assert_eq!(repo.get(&a.id).await?, patched);

        repo.delete(&a.id).await?;
        match repo.delete(&a.id).await {
            Err(ServiceError::NotFound(msg)) => {
                assert_eq!(msg, format!("Note with ID {} not found for deletion.", a.id))
            }
            other => panic!("expected not found, got {other:?}"),
        }
        let remaining = repo.list().await?;
        assert_eq!(remaining, vec![b]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn not_found_messages_name_the_id() -> Result<(), anyhow::Error> {
        let (repo, tmp) = setup_repo().await;

        match repo.get("unknown-id").await {
            Err(ServiceError::NotFound(msg)) => assert_eq!(msg, "Note with ID unknown-id not found"),
            other => panic!("unexpected {other:?}"),
        }
        match repo.update("unknown-id", NotePatch::default()).await {
            Err(ServiceError::NotFound(msg)) => {
                assert_eq!(msg, "Note with ID unknown-id not found for update.")
            }
            other => panic!("unexpected {other:?}"),
        }

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() -> Result<(), anyhow::Error> {
        let (repo, tmp) = setup_repo().await;

        let res = repo.create(NoteDraft { title: Some("T".into()), content: None }).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert!(repo.list().await?.is_empty());
        // the load still initialized the backing file
        assert_eq!(tokio::fs::read_to_string(&tmp).await?, "[]");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn data_survives_a_new_repository_instance() -> Result<(), anyhow::Error> {
        let (repo, tmp) = setup_repo().await;
        let created = repo.create(draft("Нотатка", "зміст")).await?;

        let reopened = FileNoteRepository::new(&tmp).await?;
        assert_eq!(reopened.get(&created.id).await?, created);
        let raw = tokio::fs::read_to_string(reopened.path()).await?;
        assert!(raw.contains("Нотатка"));
        assert!(raw.contains("    \"title\""));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn a_malformed_record_does_not_hide_the_others() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("notes_repo_{}.json", uuid::Uuid::new_v4()));
        let seeded = r#"[
    {"id": "good", "title": "keep me", "content": "c", "created_at": "2024-05-01T10:00:00+02:00"},
    {"id": "bad", "title": "no timestamp", "content": "c"}
]"#;
        tokio::fs::write(&tmp, seeded).await?;
        let repo = FileNoteRepository::new(&tmp).await?;

        let listed = repo.list().await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "keep me");

        repo.create(draft("new", "note")).await?;
        let raw = tokio::fs::read_to_string(&tmp).await?;
        assert!(raw.contains("keep me"));
        assert_eq!(repo.list().await?.len(), 2);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_are_all_kept() -> Result<(), anyhow::Error> {
        let (repo, tmp) = setup_repo().await;

        let mut handles = Vec::new();
        for i in 0..20 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.create(draft(&format!("t{i}"), "c")).await
            }));
        }
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await??.id);
        }

        let listed = repo.list().await?;
        assert_eq!(listed.len(), 20);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
