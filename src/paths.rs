use std::path::{Path, PathBuf};

const BASE_DIR_ENV: &str = "CODESCRIBE_DIR";

pub(crate) fn data_dir() -> PathBuf {
    if let Some(dir) = base_dir_override() {
        return dir;
    }
    home_join(".codescribe").unwrap_or_else(|| PathBuf::from(".codescribe"))
}

pub(crate) fn files_path() -> PathBuf {
    data_dir().join("saved_files.json")
}

fn base_dir_override() -> Option<PathBuf> {
    std::env::var(BASE_DIR_ENV).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(expand_tilde(trimmed)))
        }
    })
}

fn home_join(suffix: &str) -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(suffix))
        }
    })
}

fn expand_tilde(value: &str) -> String {
    if value == "~" || value.starts_with("~/") {
        if let Ok(home) = std::env::var("HOME") {
            let home = home.trim();
            if home.is_empty() {
                return value.to_string();
            }
            if value == "~" {
                return home.to_string();
            }
            return format!("{}{}", home, &value[1..]);
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::with_temp_home;

    #[test]
    fn files_path_lives_under_the_home_data_dir() {
        with_temp_home(|home| {
            let path = files_path();
            assert!(path.starts_with(home));
            assert!(path.ends_with(".codescribe/saved_files.json"));
        });
    }

    #[test]
    fn expand_tilde_substitutes_home() {
        with_temp_home(|home| {
            let expanded = expand_tilde("~/drawings");
            assert_eq!(expanded, format!("{}/drawings", home.display()));
            assert_eq!(expand_tilde("/abs/path"), "/abs/path");
        });
    }
}
