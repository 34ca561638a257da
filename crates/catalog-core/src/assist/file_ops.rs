//! File operations offered to the model, confined to one directory

use crate::error::{CatalogError, Result};
use crate::llm::ToolDefinition;
use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};

/// Largest slice of a file returned by `read_file`
pub const MAX_READ_BYTES: usize = 64 * 1024;

pub const LIST_FILES_TOOL: &str = "list_files";
pub const READ_FILE_TOOL: &str = "read_file";
pub const WRITE_FILE_TOOL: &str = "write_file";

/// Sandboxed file access rooted at a directory
#[derive(Debug, Clone)]
pub struct FileOps {
    root: PathBuf,
}

impl FileOps {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CatalogError::InvalidInput(format!(
                "Not a directory: {}",
                root.display()
            )));
        }
        let root = fs::canonicalize(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a model-supplied relative path inside the root
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let mut resolved = self.root.clone();
        for component in Path::new(relative.trim()).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(CatalogError::InvalidInput(format!(
                        "Path escapes the working directory: {}",
                        relative
                    )))
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(CatalogError::InvalidInput(format!(
                        "Absolute paths are not allowed: {}",
                        relative
                    )))
                }
            }
        }
        self.ensure_inside_root(&resolved, relative)?;
        Ok(resolved)
    }

    /// Follow symlinks on the part of `path` that exists and require it to
    /// stay under the root.
    fn ensure_inside_root(&self, path: &Path, relative: &str) -> Result<()> {
        let existing = path
            .ancestors()
            .find(|p| fs::symlink_metadata(p).is_ok())
            .unwrap_or(self.root.as_path());

        let inside = fs::canonicalize(existing)
            .map(|real| real.starts_with(&self.root))
            .unwrap_or(false);
        if inside {
            Ok(())
        } else {
            Err(CatalogError::InvalidInput(format!(
                "Path escapes the working directory: {}",
                relative
            )))
        }
    }

    /// Directory entries sorted by name; subdirectories end with `/`
    pub fn list_files(&self, relative: Option<&str>) -> Result<Vec<String>> {
        let dir = self.resolve(relative.unwrap_or("."))?;
        if !dir.is_dir() {
            return Err(CatalogError::FileNotFound(dir.display().to_string()));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() {
                name.push('/');
            }
            entries.push(name);
        }
        entries.sort();
        Ok(entries)
    }

    pub fn read_file(&self, relative: &str) -> Result<String> {
        let path = self.resolve(relative)?;
        if !path.is_file() {
            return Err(CatalogError::FileNotFound(relative.to_string()));
        }

        let file = File::open(&path)?;
        let size = file.metadata()?.len();
        let mut bytes = Vec::new();
        file.take(MAX_READ_BYTES as u64 + 1).read_to_end(&mut bytes)?;
        if bytes.len() <= MAX_READ_BYTES {
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }

        let mut text = String::from_utf8_lossy(&bytes[..MAX_READ_BYTES]).into_owned();
        // a multi-byte char cut at the boundary decodes to U+FFFD
        if text.ends_with('\u{FFFD}') {
            text.pop();
        }
        text.push_str(&format!(
            "\n[truncated: {} of {} bytes shown]",
            MAX_READ_BYTES, size
        ));
        Ok(text)
    }

    /// Write `content`, creating parent directories. Returns bytes written.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<usize> {
        let path = self.resolve(relative)?;
        if path == self.root {
            return Err(CatalogError::InvalidInput("write_file needs a file path".to_string()));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        tracing::info!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(content.len())
    }

    /// Run a tool call by name, returning the text sent back to the model
    pub fn execute(&self, tool: &str, args: &Value) -> Result<String> {
        match tool {
            LIST_FILES_TOOL => {
                let entries = self.list_files(optional_str(args, "path"))?;
                if entries.is_empty() {
                    Ok("(empty directory)".to_string())
                } else {
                    Ok(entries.join("\n"))
                }
            }
            READ_FILE_TOOL => self.read_file(required_str(args, "path")?),
            WRITE_FILE_TOOL => {
                let path = required_str(args, "path")?;
                let content = required_str(args, "content")?;
                let written = self.write_file(path, content)?;
                Ok(format!("Wrote {} bytes to {}", written, path))
            }
            other => Err(CatalogError::InvalidInput(format!("Unknown tool: {}", other))),
        }
    }
}

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| CatalogError::InvalidInput(format!("Missing {}", key)))
}

pub fn list_files_tool() -> ToolDefinition {
    ToolDefinition::new(
        LIST_FILES_TOOL,
        "List the files in a directory of the working directory",
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Relative directory path (default: the working directory)"
                }
            }
        }),
    )
}

pub fn read_file_tool() -> ToolDefinition {
    ToolDefinition::new(
        READ_FILE_TOOL,
        "Read a text file from the working directory",
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Relative file path"
                }
            },
            "required": ["path"]
        }),
    )
}

pub fn write_file_tool() -> ToolDefinition {
    ToolDefinition::new(
        WRITE_FILE_TOOL,
        "Create or overwrite a text file in the working directory",
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Relative file path"
                },
                "content": {
                    "type": "string",
                    "description": "Full file content"
                }
            },
            "required": ["path", "content"]
        }),
    )
}

/// All file tools, in the order they are offered
pub fn file_tools() -> Vec<ToolDefinition> {
    vec![list_files_tool(), read_file_tool(), write_file_tool()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox() -> (tempfile::TempDir, FileOps) {
        let dir = tempfile::tempdir().unwrap();
        let ops = FileOps::new(dir.path()).unwrap();
        (dir, ops)
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let (_dir, ops) = sandbox();
        assert!(matches!(
            ops.resolve("../secret"),
            Err(CatalogError::InvalidInput(_))
        ));
        assert!(matches!(
            ops.resolve("notes/../../x"),
            Err(CatalogError::InvalidInput(_))
        ));
        assert!(matches!(
            ops.resolve("/etc/passwd"),
            Err(CatalogError::InvalidInput(_))
        ));
        assert_eq!(ops.resolve("./a/b.txt").unwrap(), ops.root().join("a/b.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_cannot_leave_root() {
        use std::os::unix::fs::symlink;

        let (dir, ops) = sandbox();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), "key").unwrap();
        symlink(outside.path(), dir.path().join("link")).unwrap();
        symlink(outside.path().join("new.txt"), dir.path().join("dangling.txt")).unwrap();
        symlink(dir.path().join("notes"), dir.path().join("inner")).unwrap();
        fs::create_dir(dir.path().join("notes")).unwrap();

        assert!(matches!(
            ops.read_file("link/secret.txt"),
            Err(CatalogError::InvalidInput(_))
        ));
        assert!(ops.write_file("link/new.txt", "x").is_err());
        assert!(ops.write_file("dangling.txt", "x").is_err());
        assert!(!outside.path().join("new.txt").exists());

        // links that stay inside are fine
        ops.write_file("inner/a.txt", "ok").unwrap();
        assert_eq!(ops.read_file("notes/a.txt").unwrap(), "ok");
    }

    #[test]
    fn test_write_then_list_and_read() {
        let (_dir, ops) = sandbox();
        ops.write_file("notes/todo.md", "buy cables").unwrap();
        ops.write_file("readme.txt", "hi").unwrap();

        assert_eq!(ops.list_files(None).unwrap(), vec!["notes/", "readme.txt"]);
        assert_eq!(ops.list_files(Some("notes")).unwrap(), vec!["todo.md"]);
        assert_eq!(ops.read_file("notes/todo.md").unwrap(), "buy cables");
    }

    #[test]
    fn test_read_truncates_large_files() {
        let (_dir, ops) = sandbox();
        let big = "a".repeat(MAX_READ_BYTES + 10);
        ops.write_file("big.txt", &big).unwrap();

        let text = ops.read_file("big.txt").unwrap();
        assert!(text.starts_with(&"a".repeat(100)));
        assert!(text.ends_with(&format!(
            "[truncated: {} of {} bytes shown]",
            MAX_READ_BYTES,
            MAX_READ_BYTES + 10
        )));
    }

    #[test]
    fn test_read_missing_file() {
        let (_dir, ops) = sandbox();
        assert!(matches!(
            ops.read_file("nope.txt"),
            Err(CatalogError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_execute_dispatch() {
        let (_dir, ops) = sandbox();
        let reply = ops
            .execute(WRITE_FILE_TOOL, &json!({"path": "out.txt", "content": "abc"}))
            .unwrap();
        assert_eq!(reply, "Wrote 3 bytes to out.txt");
        assert_eq!(ops.execute(READ_FILE_TOOL, &json!({"path": "out.txt"})).unwrap(), "abc");
        assert_eq!(ops.execute(LIST_FILES_TOOL, &json!({})).unwrap(), "out.txt");

        let err = ops.execute("delete_file", &json!({})).unwrap_err();
        assert!(err.to_string().contains("Unknown tool: delete_file"));
        assert!(ops.execute(READ_FILE_TOOL, &json!({})).is_err());
    }

    #[test]
    fn test_tool_names() {
        let names: Vec<String> = file_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["list_files", "read_file", "write_file"]);
    }
}
