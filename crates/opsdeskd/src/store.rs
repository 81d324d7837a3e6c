//! Ticket persistence.
//!
//! One pretty-printed JSON document per ticket under the data directory,
//! written to a `.tmp` sibling then renamed into place so concurrent readers
//! never observe a half-written record. I/O failures are logged and reported
//! as `false`/`None`/empty, never as errors: the agents above translate
//! those into displayable messages.

use opsdesk_shared::ticket::Ticket;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

/// Ticket store collaborator interface
pub trait TicketStore: Send + Sync {
    fn save(&self, ticket: &Ticket) -> bool;
    fn load(&self, ticket_id: &str) -> Option<Ticket>;
    /// Newest first by creation time, ticket ID as tiebreak
    fn list(&self, limit: usize, offset: usize) -> Vec<Ticket>;
    fn delete(&self, ticket_id: &str) -> bool;
    /// Case-insensitive substring match over each ticket's serialized form
    fn search(&self, query: &str) -> Vec<Ticket>;
}

/// File-backed ticket store
pub struct FsTicketStore {
    dir: PathBuf,
}

impl FsTicketStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            error!("Failed to create ticket directory {}: {}", dir.display(), e);
        }
        Self { dir }
    }

    fn ticket_path(&self, ticket_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", ticket_id))
    }

    fn read_ticket(&self, path: &Path) -> Option<Ticket> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read ticket file {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                // Skip malformed records rather than failing the whole listing
                warn!("Skipping malformed ticket file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// All readable tickets, newest first
    fn all_tickets(&self) -> Vec<Ticket> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to list ticket directory {}: {}", self.dir.display(), e);
                return Vec::new();
            }
        };

        let mut tickets: Vec<Ticket> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| self.read_ticket(&path))
            .collect();

        tickets.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.ticket_id.cmp(&a.ticket_id))
        });
        tickets
    }
}

impl TicketStore for FsTicketStore {
    fn save(&self, ticket: &Ticket) -> bool {
        let json = match serde_json::to_string_pretty(ticket) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize ticket {}: {}", ticket.ticket_id, e);
                return false;
            }
        };

        let path = self.ticket_path(&ticket.ticket_id);
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, json) {
            error!("Failed to write ticket {}: {}", ticket.ticket_id, e);
            return false;
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            error!("Failed to commit ticket {}: {}", ticket.ticket_id, e);
            let _ = fs::remove_file(&tmp);
            return false;
        }
        true
    }

    fn load(&self, ticket_id: &str) -> Option<Ticket> {
        let path = self.ticket_path(ticket_id);
        if !path.exists() {
            return None;
        }
        self.read_ticket(&path)
    }

    fn list(&self, limit: usize, offset: usize) -> Vec<Ticket> {
        self.all_tickets().into_iter().skip(offset).take(limit).collect()
    }

    fn delete(&self, ticket_id: &str) -> bool {
        let path = self.ticket_path(ticket_id);
        if !path.exists() {
            return false;
        }
        match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to delete ticket {}: {}", ticket_id, e);
                false
            }
        }
    }

    fn search(&self, query: &str) -> Vec<Ticket> {
        let needle = query.to_lowercase();
        self.all_tickets()
            .into_iter()
            .filter(|ticket| {
                serde_json::to_string(ticket)
                    .map(|json| json.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdesk_shared::ticket::Importance;
    use tempfile::tempdir;

    fn ticket(issue: &str) -> Ticket {
        Ticket::new(issue.to_string(), Importance::Medium, "unknown".to_string(), false)
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FsTicketStore::new(dir.path());

        let t = ticket("keyboard not working");
        assert!(store.save(&t));

        let loaded = store.load(&t.ticket_id).unwrap();
        assert_eq!(loaded, t);
    }

    #[test]
    fn test_save_leaves_no_tmp_residue() {
        let dir = tempdir().unwrap();
        let store = FsTicketStore::new(dir.path());
        assert!(store.save(&ticket("vpn down")));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = FsTicketStore::new(dir.path());
        assert!(store.load("ticket_nope").is_none());
    }

    #[test]
    fn test_list_newest_first_with_pagination() {
        let dir = tempdir().unwrap();
        let store = FsTicketStore::new(dir.path());

        let mut ids = Vec::new();
        for i in 0..5 {
            let t = ticket(&format!("issue {}", i));
            ids.push(t.ticket_id.clone());
            assert!(store.save(&t));
        }

        let all = store.list(100, 0);
        assert_eq!(all.len(), 5);
        // Newest first: creation order reversed (ID tiebreak for equal stamps)
        for pair in all.windows(2) {
            assert!(
                pair[0].created_at > pair[1].created_at
                    || (pair[0].created_at == pair[1].created_at
                        && pair[0].ticket_id > pair[1].ticket_id)
            );
        }

        let page = store.list(2, 1);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0], all[1]);
        assert_eq!(page[1], all[2]);
    }

    #[test]
    fn test_list_skips_malformed_files() {
        let dir = tempdir().unwrap();
        let store = FsTicketStore::new(dir.path());
        assert!(store.save(&ticket("real one")));
        fs::write(dir.path().join("ticket_garbage.json"), "{not json").unwrap();

        assert_eq!(store.list(100, 0).len(), 1);
    }

    #[test]
    fn test_delete() {
        let dir = tempdir().unwrap();
        let store = FsTicketStore::new(dir.path());
        let t = ticket("flaky wifi");
        assert!(store.save(&t));

        assert!(store.delete(&t.ticket_id));
        assert!(store.load(&t.ticket_id).is_none());
        assert!(!store.delete(&t.ticket_id));
    }

    #[test]
    fn test_search_case_insensitive() {
        let dir = tempdir().unwrap();
        let store = FsTicketStore::new(dir.path());
        assert!(store.save(&ticket("Payment API timeout")));
        assert!(store.save(&ticket("monitor flickers")));

        let hits = store.search("PAYMENT");
        assert_eq!(hits.len(), 1);
        assert!(hits[0].issue.contains("Payment"));

        assert!(store.search("nonexistent-string-xyz").is_empty());
    }

    #[test]
    fn test_list_idempotent() {
        let dir = tempdir().unwrap();
        let store = FsTicketStore::new(dir.path());
        assert!(store.save(&ticket("one")));
        assert!(store.save(&ticket("two")));

        let first = store.list(10, 0);
        let second = store.list(10, 0);
        assert_eq!(first, second);
    }
}
