//! Annotation records and repository.

use crate::db::DbPool;
use crate::{Result, StashError};

/// Kind of annotation, as stored in the `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    FolderComment,
    FileComment,
    FolderMessage,
}

impl AnnotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::FolderComment => "folder_comment",
            AnnotationKind::FileComment => "file_comment",
            AnnotationKind::FolderMessage => "folder_message",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "folder_comment" => Some(AnnotationKind::FolderComment),
            "file_comment" => Some(AnnotationKind::FileComment),
            "folder_message" => Some(AnnotationKind::FolderMessage),
            _ => None,
        }
    }

    /// Comments read newest first, folder messages read like a chat.
    fn newest_first(&self) -> bool {
        !matches!(self, AnnotationKind::FolderMessage)
    }
}

/// What an annotation is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationTarget {
    FolderComment(i64),
    FileComment(i64),
    FolderMessage(i64),
}

impl AnnotationTarget {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            AnnotationTarget::FolderComment(_) => AnnotationKind::FolderComment,
            AnnotationTarget::FileComment(_) => AnnotationKind::FileComment,
            AnnotationTarget::FolderMessage(_) => AnnotationKind::FolderMessage,
        }
    }

    /// Id of the folder or file the annotation hangs off.
    pub fn target_id(&self) -> i64 {
        match *self {
            AnnotationTarget::FolderComment(id)
            | AnnotationTarget::FileComment(id)
            | AnnotationTarget::FolderMessage(id) => id,
        }
    }

    fn folder_id(&self) -> Option<i64> {
        match *self {
            AnnotationTarget::FileComment(_) => None,
            AnnotationTarget::FolderComment(id) | AnnotationTarget::FolderMessage(id) => Some(id),
        }
    }

    fn file_id(&self) -> Option<i64> {
        match *self {
            AnnotationTarget::FileComment(id) => Some(id),
            _ => None,
        }
    }

    /// Column holding the target id.
    fn column(&self) -> &'static str {
        match self {
            AnnotationTarget::FileComment(_) => "file_id",
            _ => "folder_id",
        }
    }
}

/// A stored annotation with its author's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Annotation {
    pub id: i64,
    pub kind: String,
    pub folder_id: Option<i64>,
    pub file_id: Option<i64>,
    pub owner_id: i64,
    pub owner_username: String,
    pub text: String,
    pub created_at: String,
}

impl Annotation {
    pub fn target(&self) -> Option<AnnotationTarget> {
        match AnnotationKind::parse(&self.kind)? {
            AnnotationKind::FolderComment => self.folder_id.map(AnnotationTarget::FolderComment),
            AnnotationKind::FileComment => self.file_id.map(AnnotationTarget::FileComment),
            AnnotationKind::FolderMessage => self.folder_id.map(AnnotationTarget::FolderMessage),
        }
    }
}

/// Data for a new annotation.
#[derive(Debug, Clone)]
pub struct NewAnnotation {
    pub target: AnnotationTarget,
    pub owner_id: i64,
    pub text: String,
}

impl NewAnnotation {
    pub fn new(target: AnnotationTarget, owner_id: i64, text: impl Into<String>) -> Self {
        Self {
            target,
            owner_id,
            text: text.into(),
        }
    }
}

const SELECT_ANNOTATION: &str = "SELECT a.id, a.kind, a.folder_id, a.file_id, a.owner_id, \
     u.username AS owner_username, a.text, a.created_at \
     FROM annotations a JOIN users u ON u.id = a.owner_id";

/// Repository for annotations. Records are append-only.
pub struct AnnotationRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> AnnotationRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, annotation: &NewAnnotation) -> Result<Annotation> {
        let result = sqlx::query(
            "INSERT INTO annotations (kind, folder_id, file_id, owner_id, text)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(annotation.target.kind().as_str())
        .bind(annotation.target.folder_id())
        .bind(annotation.target.file_id())
        .bind(annotation.owner_id)
        .bind(&annotation.text)
        .execute(self.pool)
        .await
        .map_err(|e| StashError::Database(e.to_string()))?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| StashError::NotFound("Annotation".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Annotation>> {
        let sql = format!("{SELECT_ANNOTATION} WHERE a.id = ?");
        let annotation = sqlx::query_as::<_, Annotation>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(annotation)
    }

    /// Annotations of one target. Comments come newest first, folder
    /// messages oldest first.
    pub async fn list(&self, target: AnnotationTarget) -> Result<Vec<Annotation>> {
        let order = if target.kind().newest_first() {
            "DESC"
        } else {
            "ASC"
        };
        let sql = format!(
            "{SELECT_ANNOTATION} WHERE a.kind = ? AND a.{} = ?
             ORDER BY a.created_at {order}, a.id {order}",
            target.column()
        );
        let annotations = sqlx::query_as::<_, Annotation>(&sql)
            .bind(target.kind().as_str())
            .bind(target.target_id())
            .fetch_all(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(annotations)
    }

    pub async fn count(&self, target: AnnotationTarget) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM annotations WHERE kind = ? AND {} = ?",
            target.column()
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(target.kind().as_str())
            .bind(target.target_id())
            .fetch_one(self.pool)
            .await
            .map_err(|e| StashError::Database(e.to_string()))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::file::{FileRepository, NewFile};
    use crate::folder::{FolderRepository, NewFolder};
    use crate::Database;

    async fn setup() -> (Database, i64, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();
        let folder = FolderRepository::new(db.pool())
            .create(&NewFolder::new(user.id, "Docs"))
            .await
            .unwrap();
        let file = FileRepository::new(db.pool())
            .create(&NewFile::new(folder.id, user.id, "a.txt", 1, "text/plain"))
            .await
            .unwrap();
        (db, user.id, folder.id, file.id)
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            AnnotationKind::FolderComment,
            AnnotationKind::FileComment,
            AnnotationKind::FolderMessage,
        ] {
            assert_eq!(AnnotationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(AnnotationKind::parse("reply"), None);
    }

    #[tokio::test]
    async fn test_create_folder_and_file_annotations() {
        let (db, owner, folder, file) = setup().await;
        let repo = AnnotationRepository::new(db.pool());

        let comment = repo
            .create(&NewAnnotation::new(AnnotationTarget::FolderComment(folder), owner, "hi"))
            .await
            .unwrap();
        assert_eq!(comment.target(), Some(AnnotationTarget::FolderComment(folder)));
        assert_eq!(comment.owner_username, "alice");
        assert_eq!(comment.file_id, None);

        let file_comment = repo
            .create(&NewAnnotation::new(AnnotationTarget::FileComment(file), owner, "nice file"))
            .await
            .unwrap();
        assert_eq!(file_comment.target(), Some(AnnotationTarget::FileComment(file)));
        assert_eq!(file_comment.folder_id, None);
    }

    #[tokio::test]
    async fn test_list_orders_and_separates_kinds() {
        let (db, owner, folder, _file) = setup().await;
        let repo = AnnotationRepository::new(db.pool());

        for text in ["one", "two"] {
            repo.create(&NewAnnotation::new(AnnotationTarget::FolderComment(folder), owner, text))
                .await
                .unwrap();
            repo.create(&NewAnnotation::new(AnnotationTarget::FolderMessage(folder), owner, text))
                .await
                .unwrap();
        }

        let comments: Vec<_> = repo
            .list(AnnotationTarget::FolderComment(folder))
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.text)
            .collect();
        assert_eq!(comments, vec!["two", "one"]);

        let messages: Vec<_> = repo
            .list(AnnotationTarget::FolderMessage(folder))
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.text)
            .collect();
        assert_eq!(messages, vec!["one", "two"]);

        assert_eq!(repo.count(AnnotationTarget::FolderComment(folder)).await.unwrap(), 2);
        assert_eq!(repo.count(AnnotationTarget::FolderMessage(folder)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_annotations_cascade_with_folder() {
        let (db, owner, folder, file) = setup().await;
        let repo = AnnotationRepository::new(db.pool());
        repo.create(&NewAnnotation::new(AnnotationTarget::FolderComment(folder), owner, "x"))
            .await
            .unwrap();
        repo.create(&NewAnnotation::new(AnnotationTarget::FileComment(file), owner, "y"))
            .await
            .unwrap();

        FolderRepository::new(db.pool()).delete(folder).await.unwrap();

        assert_eq!(repo.count(AnnotationTarget::FolderComment(folder)).await.unwrap(), 0);
        assert_eq!(repo.count(AnnotationTarget::FileComment(file)).await.unwrap(), 0);
    }
}
