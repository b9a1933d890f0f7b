//! Storage for uploaded post images.

mod local;
mod memory;

use std::path::{Component, Path, PathBuf};

use yatube_core::ports::MediaError;

pub use local::LocalMediaStorage;
pub use memory::InMemoryMediaStorage;

/// Check that `name` stays below the media root and normalise it to
/// forward slashes.
pub(crate) fn relative_path(name: &str) -> Result<PathBuf, MediaError> {
    let path = Path::new(name);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return Err(MediaError::InvalidPath(name.to_string())),
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(MediaError::InvalidPath(name.to_string()));
    }
    Ok(clean)
}

pub(crate) fn to_key(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `posts/cat.gif` -> `posts/cat_1a2b3c4.gif`.
pub(crate) fn with_suffix(path: &Path) -> PathBuf {
    let token = uuid::Uuid::new_v4().simple().to_string();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{}.{ext}", &token[..7]),
        None => format!("{stem}_{}", &token[..7]),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_rejects_escapes() {
        assert!(relative_path("posts/cat.gif").is_ok());
        assert_eq!(to_key(&relative_path("./posts/cat.gif").unwrap()), "posts/cat.gif");
        assert!(relative_path("../etc/passwd").is_err());
        assert!(relative_path("posts/../../x").is_err());
        assert!(relative_path("/etc/passwd").is_err());
        assert!(relative_path("").is_err());
    }

    #[test]
    fn test_with_suffix_keeps_directory_and_extension() {
        let renamed = to_key(&with_suffix(Path::new("posts/cat.gif")));
        assert!(renamed.starts_with("posts/cat_"), "{renamed}");
        assert!(renamed.ends_with(".gif"), "{renamed}");
        assert_ne!(renamed, "posts/cat.gif");
    }
}
