use super::memory::NodeTables;
use super::{DatabaseError, LinkRow, NodeDatabase, NodeRow, PathPointRow, WriteStatement};
use std::fs;
use std::path::{Path, PathBuf};

/// Travel node tables persisted as one pretty-printed JSON document.
///
/// Every write is applied to a copy of the tables and flushed to disk before
/// the copy replaces the live tables, so a failed flush changes nothing.
#[derive(Debug)]
pub struct JsonFileDatabase {
    path: PathBuf,
    tables: NodeTables,
}

impl JsonFileDatabase {
    /// Open the document at `path`. A missing file starts as empty tables and
    /// is created on the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref().to_path_buf();

        let tables = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                NodeTables::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            NodeTables::default()
        };

        Ok(Self { path, tables })
    }

    fn flush(&self, tables: &NodeTables) -> Result<(), DatabaseError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(tables)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl NodeDatabase for JsonFileDatabase {
    fn query_nodes(&self, map_id: u32) -> Result<Vec<NodeRow>, DatabaseError> {
        Ok(self.tables.nodes_on_map(map_id))
    }

    fn query_links(&self) -> Result<Vec<LinkRow>, DatabaseError> {
        Ok(self.tables.links.clone())
    }

    fn query_path_points(&self) -> Result<Vec<PathPointRow>, DatabaseError> {
        Ok(self.tables.ordered_path_points())
    }

    fn execute(&mut self, statement: &WriteStatement) -> Result<(), DatabaseError> {
        let mut staged = self.tables.clone();
        staged.apply(statement)?;
        self.flush(&staged)?;
        self.tables = staged;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn temp_file(tag: &str) -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "travel-node-editor-{}-{}-{}.json",
            tag,
            std::process::id(),
            n
        ))
    }

    fn insert(name: &str) -> WriteStatement {
        WriteStatement::InsertNode {
            name: name.to_string(),
            map_id: 0,
            x: 100.0,
            y: 200.0,
            z: 5.0,
            linked: 0,
        }
    }

    #[test]
    fn missing_file_opens_as_empty_tables() {
        let path = temp_file("missing");
        let db = JsonFileDatabase::open(&path).unwrap();

        assert!(db.query_nodes(0).unwrap().is_empty());
        assert!(db.query_links().unwrap().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn writes_survive_reopening() {
        let path = temp_file("reopen");
        {
            let mut db = JsonFileDatabase::open(&path).unwrap();
            db.execute(&insert("Crossroads")).unwrap();
            db.execute(&WriteStatement::RenameNode {
                id: 1,
                name: "Inn".into(),
            })
            .unwrap();
        }

        let reopened = JsonFileDatabase::open(&path).unwrap();
        let nodes = reopened.query_nodes(0).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "Inn");
        assert_eq!(nodes[0].x, 100.0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn failed_write_leaves_tables_and_file_unchanged() {
        let path = temp_file("failed");
        let mut db = JsonFileDatabase::open(&path).unwrap();
        db.execute(&insert("Crossroads")).unwrap();
        let on_disk = fs::read_to_string(&path).unwrap();

        let result = db.execute(&WriteStatement::DeleteNode { id: 99 });

        assert!(matches!(result, Err(DatabaseError::RowNotFound(_))));
        assert_eq!(db.query_nodes(0).unwrap().len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), on_disk);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn link_type_is_stored_under_type_key() {
        let path = temp_file("links");
        fs::write(
            &path,
            r#"{
                "nodes": [],
                "links": [{ "from_node_id": 1, "to_node_id": 2, "type": 4 }],
                "path_points": []
            }"#,
        )
        .unwrap();

        let db = JsonFileDatabase::open(&path).unwrap();
        let links = db.query_links().unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].link_type, 4);
        assert!(!links[0].calculated);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn malformed_document_is_a_json_error() {
        let path = temp_file("malformed");
        fs::write(&path, "{ not json").unwrap();

        let result = JsonFileDatabase::open(&path);
        assert!(matches!(result, Err(DatabaseError::JsonError(_))));

        let _ = fs::remove_file(&path);
    }
}
