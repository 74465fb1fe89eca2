//! PostgreSQL implementations of the metadata store traits.

pub mod file;
pub mod folder;

pub use file::FileRepository;
pub use folder::FolderRepository;

use stowage_core::error::{AppError, ErrorKind};

/// Unique constraint on sibling folder names.
pub(crate) const FOLDER_SIBLING_NAME_KEY: &str = "folders_owner_id_parent_id_name_key";
/// Partial unique index allowing one root per owner.
pub(crate) const FOLDER_OWNER_ROOT_KEY: &str = "folders_owner_root_key";
/// Folder to parent foreign key.
pub(crate) const FOLDER_PARENT_FKEY: &str = "folders_parent_id_fkey";
/// File to folder foreign key.
pub(crate) const FILE_FOLDER_FKEY: &str = "files_folder_id_fkey";

/// Classify a constraint violation by the constraint's name.
///
/// Returns `None` for constraints the store does not translate.
pub(crate) fn classify_constraint(constraint: &str) -> Option<ErrorKind> {
    match constraint {
        FOLDER_SIBLING_NAME_KEY => Some(ErrorKind::DuplicateName),
        FOLDER_OWNER_ROOT_KEY => Some(ErrorKind::Conflict),
        FOLDER_PARENT_FKEY | FILE_FOLDER_FKEY => Some(ErrorKind::NotFound),
        _ => None,
    }
}

/// Map a failed write to an [`AppError`], translating known constraints and
/// wrapping everything else as a store failure.
pub(crate) fn map_write_error(err: sqlx::Error, context: &str, subject: &str) -> AppError {
    let kind = match &err {
        sqlx::Error::Database(db_err) => db_err.constraint().and_then(classify_constraint),
        _ => None,
    };

    match kind {
        Some(ErrorKind::DuplicateName) => {
            AppError::duplicate_name(format!("A folder named '{subject}' already exists here"))
        }
        Some(ErrorKind::Conflict) => {
            AppError::conflict(format!("Owner already has a root folder ('{subject}')"))
        }
        Some(ErrorKind::NotFound) => AppError::not_found("Parent folder not found"),
        _ => AppError::with_source(ErrorKind::Store, context.to_string(), err),
    }
}

/// Wrap a read failure as a store error.
pub(crate) fn store_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Store, context, e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_constraints() {
        assert_eq!(
            classify_constraint("folders_owner_id_parent_id_name_key"),
            Some(ErrorKind::DuplicateName)
        );
        assert_eq!(
            classify_constraint("folders_owner_root_key"),
            Some(ErrorKind::Conflict)
        );
        assert_eq!(
            classify_constraint("folders_parent_id_fkey"),
            Some(ErrorKind::NotFound)
        );
        assert_eq!(
            classify_constraint("files_folder_id_fkey"),
            Some(ErrorKind::NotFound)
        );
        assert_eq!(classify_constraint("files_size_bytes_check"), None);
    }

    #[test]
    fn test_non_database_error_becomes_store_error() {
        let err = map_write_error(sqlx::Error::RowNotFound, "Failed to create folder", "A");
        assert!(err.is(ErrorKind::Store));
        assert_eq!(err.message, "Failed to create folder");
    }
}
