//! Field-keyed validation error tree.
//!
//! Validators report problems as a tree keyed by field path; array indices
//! become string keys ("lines" -> "0" -> "debit"). Each node carries an
//! `_errors` list of human-readable messages, so the JSON shape is:
//!
//! ```json
//! { "_errors": [], "lines": { "_errors": ["..."], "0": { "debit": { "_errors": ["..."] } } } }
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Tree of validation messages keyed by field path.
///
/// Children keep insertion order so serialization and flattening walk the
/// tree in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    errors: Vec<String>,
    children: Vec<(String, FieldErrors)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when neither this node nor any descendant holds a message.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.children.iter().all(|(_, child)| child.is_empty())
    }

    /// Attach a message to this node.
    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Child node for `key`, created on first use.
    pub fn child(&mut self, key: impl Into<String>) -> &mut FieldErrors {
        let key = key.into();
        let idx = match self.children.iter().position(|(k, _)| *k == key) {
            Some(idx) => idx,
            None => {
                self.children.push((key, FieldErrors::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[idx].1
    }

    /// Messages attached directly to this node.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Child node for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&FieldErrors> {
        self.children
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, child)| child)
    }

    /// Flatten the tree into a flat ordered list of messages.
    ///
    /// Depth-first: a node's own messages come before its children's, and
    /// children are visited in insertion order. The presentation layer shows
    /// each message as an individual notification.
    pub fn flatten_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        self.collect_into(&mut messages);
        messages
    }

    fn collect_into(&self, out: &mut Vec<String>) {
        out.extend(self.errors.iter().cloned());
        for (_, child) in &self.children {
            child.collect_into(out);
        }
    }
}

impl Serialize for FieldErrors {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Every node serializes its `_errors` list, even when empty.
        let mut map = serializer.serialize_map(Some(self.children.len() + 1))?;
        map.serialize_entry("_errors", &self.errors)?;
        for (key, child) in &self.children {
            map.serialize_entry(key, child)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_has_no_messages() {
        let errors = FieldErrors::new();
        assert!(errors.is_empty());
        assert!(errors.flatten_messages().is_empty());
    }

    #[test]
    fn tree_with_only_empty_children_is_empty() {
        let mut errors = FieldErrors::new();
        errors.child("lines").child("0");
        assert!(errors.is_empty());
    }

    #[test]
    fn flatten_walks_depth_first_in_document_order() {
        let mut errors = FieldErrors::new();
        let lines = errors.child("lines");
        lines.push("Total debit must equal total credit");
        lines
            .child("0")
            .child("accountId")
            .push("Account is required");

        assert_eq!(
            errors.flatten_messages(),
            vec![
                "Total debit must equal total credit".to_string(),
                "Account is required".to_string(),
            ]
        );
    }

    #[test]
    fn flatten_collects_messages_at_any_depth() {
        let mut errors = FieldErrors::new();
        errors.child("date").push("Invalid date");
        errors
            .child("lines")
            .child("1")
            .child("debit")
            .push("Debit must be a positive number");
        errors.child("lines").push("At least two lines are required");

        // "date" subtree first (inserted first), then the whole "lines"
        // subtree: its child "1" was inserted before the entry-level message
        // was pushed, but own messages still come before children.
        assert_eq!(
            errors.flatten_messages(),
            vec![
                "Invalid date".to_string(),
                "At least two lines are required".to_string(),
                "Debit must be a positive number".to_string(),
            ]
        );
    }

    #[test]
    fn serializes_with_errors_key_at_every_node() {
        let mut errors = FieldErrors::new();
        errors.child("name").push("Account name is required");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["_errors"], serde_json::json!([]));
        assert_eq!(
            json["name"]["_errors"],
            serde_json::json!(["Account name is required"])
        );
    }
}
