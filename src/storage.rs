use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::Result;
use crate::paths;

/// A persisted code file. The identifier is assigned once and never
/// changes; everything else is mutable. On disk the record keeps the
/// external wire names (`canvasDrawing` as a base64 string).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeFile {
    pub id: Uuid,
    pub name: String,
    pub script: String,
    #[serde(
        rename = "canvasDrawing",
        default,
        with = "drawing_bytes",
        skip_serializing_if = "Option::is_none"
    )]
    pub canvas_drawing: Option<Vec<u8>>,
}

/// Creates a fresh, empty file record with a new unique identifier.
pub fn create_file(name: impl Into<String>) -> CodeFile {
    CodeFile {
        id: Uuid::new_v4(),
        name: name.into(),
        script: String::new(),
        canvas_drawing: None,
    }
}

/// Keyed access to persisted code files. Serialization is the store's
/// concern; callers only see records.
pub trait FileStore {
    fn get(&self, id: Uuid) -> Result<Option<CodeFile>>;
    fn put(&mut self, file: CodeFile) -> Result<()>;
    fn delete(&mut self, id: Uuid) -> Result<bool>;
    fn list(&self) -> Result<Vec<CodeFile>>;
}

pub fn find_by_name<S: FileStore>(store: &S, name: &str) -> Result<Option<CodeFile>> {
    Ok(store.list()?.into_iter().find(|file| file.name == name))
}

/// Store backed by a single JSON array file under the data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn open_default() -> Self {
        Self {
            path: paths::files_path(),
        }
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Vec<CodeFile>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, files: &[CodeFile]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(files)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl FileStore for JsonFileStore {
    fn get(&self, id: Uuid) -> Result<Option<CodeFile>> {
        Ok(self.load()?.into_iter().find(|file| file.id == id))
    }

    fn put(&mut self, file: CodeFile) -> Result<()> {
        let mut files = self.load()?;
        match files.iter_mut().find(|existing| existing.id == file.id) {
            Some(existing) => *existing = file,
            None => files.push(file),
        }
        self.save(&files)
    }

    fn delete(&mut self, id: Uuid) -> Result<bool> {
        let mut files = self.load()?;
        let before = files.len();
        files.retain(|file| file.id != id);
        if files.len() == before {
            return Ok(false);
        }
        self.save(&files)?;
        Ok(true)
    }

    fn list(&self) -> Result<Vec<CodeFile>> {
        self.load()
    }
}

mod drawing_bytes {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(bytes) => serializer.serialize_str(&BASE64.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(encoded) => BASE64
                .decode(encoded.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::with_temp_home;

    #[test]
    fn put_get_delete_round_trip() {
        with_temp_home(|_| {
            let mut store = JsonFileStore::open_default();
            let file = create_file("scratch");
            let id = file.id;

            store.put(file.clone()).unwrap();
            assert_eq!(store.get(id).unwrap(), Some(file));

            assert!(store.delete(id).unwrap());
            assert_eq!(store.get(id).unwrap(), None);
            assert!(!store.delete(id).unwrap());
        });
    }

    #[test]
    fn put_with_same_id_replaces_the_record() {
        with_temp_home(|_| {
            let mut store = JsonFileStore::open_default();
            let mut file = create_file("scratch");
            store.put(file.clone()).unwrap();

            file.script = "print(1)".to_string();
            store.put(file.clone()).unwrap();

            let files = store.list().unwrap();
            assert_eq!(files.len(), 1);
            assert_eq!(files[0].script, "print(1)");
        });
    }

    #[test]
    fn missing_store_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::at_path(dir.path().join("saved_files.json"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn record_uses_the_external_wire_names() {
        let mut file = create_file("sketch");
        file.script = "x = 1".to_string();
        file.canvas_drawing = Some(vec![1, 2, 3]);

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["name"], "sketch");
        assert_eq!(json["script"], "x = 1");
        assert_eq!(json["canvasDrawing"], "AQID");
        assert!(json["id"].is_string());

        let parsed: CodeFile = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, file);
    }

    #[test]
    fn drawing_field_is_omitted_when_absent() {
        let file = create_file("empty");
        let json = serde_json::to_string(&file).unwrap();
        assert!(!json.contains("canvasDrawing"));

        let parsed: CodeFile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.canvas_drawing, None);
    }

    #[test]
    fn new_files_start_empty_with_unique_ids() {
        let first = create_file("a");
        let second = create_file("b");
        assert!(first.script.is_empty());
        assert!(first.canvas_drawing.is_none());
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn find_by_name_scans_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::at_path(dir.path().join("saved_files.json"));
        let file = create_file("target");
        store.put(file.clone()).unwrap();
        store.put(create_file("other")).unwrap();

        assert_eq!(find_by_name(&store, "target").unwrap(), Some(file));
        assert_eq!(find_by_name(&store, "absent").unwrap(), None);
    }
}
