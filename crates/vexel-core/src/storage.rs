//! Storage capability for shape persistence.
//!
//! Shapes and containers persist themselves as sequences of named scalar and
//! point fields; the concrete encoding (file, stream, database) lives behind
//! this trait in the surrounding application. Sections scope field names so
//! nested members do not collide.

use kurbo::Point;
use std::collections::HashMap;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("field not found: {0}")]
    Missing(String),
    #[error("field type mismatch: {0}")]
    TypeMismatch(String),
    #[error("unknown shape kind tag: {0}")]
    UnknownKind(u32),
    #[error("unbalanced section nesting")]
    Unbalanced,
    #[error("storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for field-level persistence backends.
///
/// Any single failed read or write aborts the whole save/load it belongs to;
/// loaders stage every field into locals before mutating the target, so a
/// failed load leaves prior state untouched.
pub trait Storage {
    /// Open a named scope; field names inside it are prefixed by it.
    fn begin_section(&mut self, name: &str) -> StorageResult<()>;

    /// Close the innermost scope.
    fn end_section(&mut self) -> StorageResult<()>;

    fn write_f64(&mut self, name: &str, value: f64) -> StorageResult<()>;
    fn write_u32(&mut self, name: &str, value: u32) -> StorageResult<()>;
    fn write_i32(&mut self, name: &str, value: i32) -> StorageResult<()>;
    fn write_point(&mut self, name: &str, value: Point) -> StorageResult<()>;

    fn read_f64(&mut self, name: &str) -> StorageResult<f64>;
    fn read_u32(&mut self, name: &str) -> StorageResult<u32>;
    fn read_i32(&mut self, name: &str) -> StorageResult<i32>;
    fn read_point(&mut self, name: &str) -> StorageResult<Point>;
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    F64(f64),
    U32(u32),
    I32(i32),
    Point(Point),
}

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, Value>,
    prefix: Vec<String>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix.join("/"), name)
        }
    }

    fn get(&self, name: &str) -> StorageResult<&Value> {
        let key = self.key(name);
        self.values
            .get(&key)
            .ok_or(StorageError::Missing(key))
    }
}

impl Storage for MemoryStorage {
    fn begin_section(&mut self, name: &str) -> StorageResult<()> {
        self.prefix.push(name.to_string());
        Ok(())
    }

    fn end_section(&mut self) -> StorageResult<()> {
        self.prefix.pop().map(|_| ()).ok_or(StorageError::Unbalanced)
    }

    fn write_f64(&mut self, name: &str, value: f64) -> StorageResult<()> {
        let key = self.key(name);
        self.values.insert(key, Value::F64(value));
        Ok(())
    }

    fn write_u32(&mut self, name: &str, value: u32) -> StorageResult<()> {
        let key = self.key(name);
        self.values.insert(key, Value::U32(value));
        Ok(())
    }

    fn write_i32(&mut self, name: &str, value: i32) -> StorageResult<()> {
        let key = self.key(name);
        self.values.insert(key, Value::I32(value));
        Ok(())
    }

    fn write_point(&mut self, name: &str, value: Point) -> StorageResult<()> {
        let key = self.key(name);
        self.values.insert(key, Value::Point(value));
        Ok(())
    }

    fn read_f64(&mut self, name: &str) -> StorageResult<f64> {
        match self.get(name)? {
            Value::F64(v) => Ok(*v),
            _ => Err(StorageError::TypeMismatch(self.key(name))),
        }
    }

    fn read_u32(&mut self, name: &str) -> StorageResult<u32> {
        match self.get(name)? {
            Value::U32(v) => Ok(*v),
            _ => Err(StorageError::TypeMismatch(self.key(name))),
        }
    }

    fn read_i32(&mut self, name: &str) -> StorageResult<i32> {
        match self.get(name)? {
            Value::I32(v) => Ok(*v),
            _ => Err(StorageError::TypeMismatch(self.key(name))),
        }
    }

    fn read_point(&mut self, name: &str) -> StorageResult<Point> {
        match self.get(name)? {
            Value::Point(v) => Ok(*v),
            _ => Err(StorageError::TypeMismatch(self.key(name))),
        }
    }
}
