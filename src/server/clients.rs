//! Bookkeeping for the sockets the server is watching.
//!
//! The table is an ordered arena: every entry gets a [`ClientId`] that stays
//! valid until the entry is removed, and iteration follows insertion order.
//! The listening socket is inserted first, never removed one by one, and so
//! always sits at index 0.

use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;

/// Stable handle to a table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    /// Handle of the listening socket.
    pub const LISTENER: ClientId = ClientId(0);
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientTableError {
    #[error("client table is full ({max} entries)")]
    Full { max: usize },
}

/// A tracked socket.
#[derive(Debug)]
pub struct Client<S> {
    pub id: ClientId,
    pub socket: S,
    /// Peer address, `None` for the listening socket.
    pub peer: Option<SocketAddr>,
}

#[derive(Debug)]
pub struct ClientTable<S> {
    entries: BTreeMap<ClientId, Client<S>>,
    next_id: u64,
    max: usize,
}

impl<S> ClientTable<S> {
    /// Creates a table holding only the listening socket.
    ///
    /// `max` bounds the total number of entries, the listener included, and
    /// is raised to 1 if smaller.
    pub fn new(listener: S, max: usize) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            ClientId::LISTENER,
            Client {
                id: ClientId::LISTENER,
                socket: listener,
                peer: None,
            },
        );

        Self {
            entries,
            next_id: 1,
            max: max.max(1),
        }
    }

    /// Tracks a newly accepted socket.
    pub fn add_client(&mut self, socket: S, peer: SocketAddr) -> Result<ClientId, ClientTableError> {
        if self.entries.len() >= self.max {
            return Err(ClientTableError::Full { max: self.max });
        }

        let id = ClientId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            Client {
                id,
                socket,
                peer: Some(peer),
            },
        );
        Ok(id)
    }

    /// Stops tracking a client and hands it back, dropping it closes the
    /// socket. The listening socket cannot be removed this way.
    pub fn delete_client(&mut self, id: ClientId) -> Option<Client<S>> {
        if id == ClientId::LISTENER {
            return None;
        }
        self.entries.remove(&id)
    }

    /// Removes every entry, the listening socket included.
    pub fn delete_all_clients(&mut self) -> Vec<Client<S>> {
        std::mem::take(&mut self.entries).into_values().collect()
    }

    pub fn get(&self, id: ClientId) -> Option<&Client<S>> {
        self.entries.get(&id)
    }

    pub fn listener(&self) -> Option<&Client<S>> {
        self.get(ClientId::LISTENER)
    }

    /// Entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Client<S>> {
        self.entries.values()
    }

    /// Handles in table order.
    pub fn ids(&self) -> Vec<ClientId> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[test]
    fn listener_is_first() {
        let mut table = ClientTable::new("listener", 4);
        let a = table.add_client("a", peer()).unwrap();
        table.add_client("b", peer()).unwrap();
        table.delete_client(a);

        let sockets: Vec<_> = table.iter().map(|c| c.socket).collect();
        assert_eq!(sockets, vec!["listener", "b"]);
    }

    #[test]
    fn listener_cannot_be_deleted() {
        let mut table = ClientTable::new((), 2);
        assert!(table.delete_client(ClientId::LISTENER).is_none());
        assert_eq!(table.len(), 1);
    }
}
