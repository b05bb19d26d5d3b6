//! In-memory copy of the remote client collection.
//!
//! Keeps insertion order and at most one record per jid as long as it is only
//! mutated through these methods (a `replace_all` with duplicate jids from the
//! server is stored as-is). `Session` hands it out only as `&[Client]` or a
//! cloned snapshot.

use crate::types::Client;

#[derive(Debug, Clone, Default)]
pub struct LocalMirror {
    clients: Vec<Client>,
}

impl LocalMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Client] {
        &self.clients
    }

    pub fn snapshot(&self) -> Vec<Client> {
        self.clients.clone()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// First record whose jid matches.
    pub fn get(&self, jid: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.jid == jid)
    }

    pub fn replace_all(&mut self, clients: Vec<Client>) {
        self.clients = clients;
    }

    /// Replace the record with the same jid in place, or append it.
    ///
    /// Returns true when an existing record was replaced.
    pub fn upsert(&mut self, client: Client) -> bool {
        let jid = client.jid.clone();
        self.replace_or_insert(&jid, client)
    }

    /// Put `client` in the slot of the first record keyed by `jid`, or append
    /// it. The stored record keeps whatever jid `client` carries.
    pub fn replace_or_insert(&mut self, jid: &str, client: Client) -> bool {
        match self.clients.iter_mut().find(|c| c.jid == jid) {
            Some(slot) => {
                *slot = client;
                true
            }
            None => {
                self.clients.push(client);
                false
            }
        }
    }

    /// Drop every record with this jid. Returns how many were removed.
    pub fn remove(&mut self, jid: &str) -> usize {
        let before = self.clients.len();
        self.clients.retain(|c| c.jid != jid);
        before - self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn record(id: i64, jid: &str) -> Client {
        Client {
            id,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            name: format!("client-{id}"),
            jid: jid.to_string(),
            is_premium: false,
            is_owner: false,
            is_banned: false,
            level: None,
            xp: None,
            money: None,
        }
    }

    #[test]
    fn replace_all_discards_previous_content() {
        let mut mirror = LocalMirror::new();
        mirror.upsert(record(1, "old"));
        mirror.replace_all(vec![record(2, "a"), record(3, "b")]);
        let jids: Vec<&str> = mirror.as_slice().iter().map(|c| c.jid.as_str()).collect();
        assert_eq!(jids, ["a", "b"]);
        assert!(mirror.get("old").is_none());
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut mirror = LocalMirror::new();
        assert!(!mirror.upsert(record(1, "a")));
        assert!(!mirror.upsert(record(2, "b")));
        let mut changed = record(1, "a");
        changed.money = Some(100.0);
        assert!(mirror.upsert(changed));
        assert_eq!(mirror.len(), 2);
        assert_eq!(mirror.as_slice()[0].money, Some(100.0));
        assert_eq!(mirror.as_slice()[1].jid, "b");
    }

    #[test]
    fn replace_or_insert_uses_given_key() {
        let mut mirror = LocalMirror::new();
        mirror.replace_all(vec![record(1, "a"), record(2, "b")]);
        assert!(mirror.replace_or_insert("a", record(1, "A")));
        assert_eq!(mirror.len(), 2);
        assert_eq!(mirror.as_slice()[0].jid, "A");
        assert!(mirror.get("a").is_none());

        assert!(!mirror.replace_or_insert("z", record(9, "z")));
        assert_eq!(mirror.len(), 3);
    }

    #[test]
    fn remove_drops_every_match() {
        let mut mirror = LocalMirror::new();
        mirror.replace_all(vec![record(1, "a"), record(2, "b"), record(3, "a")]);
        assert_eq!(mirror.remove("a"), 2);
        assert_eq!(mirror.len(), 1);
        assert_eq!(mirror.remove("missing"), 0);
    }

    #[test]
    fn get_returns_first_match() {
        let mut mirror = LocalMirror::new();
        mirror.replace_all(vec![record(1, "a"), record(2, "a")]);
        assert_eq!(mirror.get("a").map(|c| c.id), Some(1));
        assert!(mirror.get("z").is_none());
    }
}
