//! Category resolution by walking "subclass of" edges upward
//!
//! Starting from an entity's "instance of" targets, the walk proceeds breadth
//! first, so the terminal category closest to the entity wins when several
//! ancestors qualify. Each node is expanded at most once; a cycle therefore
//! exhausts the frontier instead of looping.

use crate::client::{Qid, WikiClient};
use crate::error::Result;
use crate::properties::default_terminal_categories;
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use tracing::debug;

/// Classifies entities into one of a fixed set of terminal categories
pub struct CategoryResolver<'a> {
    client: &'a WikiClient,
    terminals: HashSet<Qid>,
}

impl<'a> CategoryResolver<'a> {
    /// Resolver stopping at `terminals`
    pub fn new(client: &'a WikiClient, terminals: HashSet<Qid>) -> Self {
        Self { client, terminals }
    }

    /// Resolver stopping at the default terminal categories
    pub fn with_default_terminals(client: &'a WikiClient) -> Self {
        Self::new(client, default_terminal_categories())
    }

    pub fn terminals(&self) -> &HashSet<Qid> {
        &self.terminals
    }

    /// First terminal category reachable from `qid`, or `None`
    pub async fn resolve(&self, qid: &str) -> Result<Option<Qid>> {
        let start = self.client.get_entity_type_ids(qid).await?;
        debug!("Resolving category of {} from {:?}", qid, start);

        let category = walk_to_terminal(start, &self.terminals, |node| async move {
            self.client.get_superclasses(&node).await
        })
        .await?;

        match &category {
            Some(category) => debug!("{} resolved to {}", qid, category),
            None => debug!("{} reached no terminal category", qid),
        }
        Ok(category)
    }
}

/// Breadth-first search from `start` for the first node in `terminals`
///
/// `parents` yields the upward neighbours of a node. Nodes already seen are
/// not enqueued again.
pub async fn walk_to_terminal<F, Fut>(
    start: Vec<Qid>,
    terminals: &HashSet<Qid>,
    mut parents: F,
) -> Result<Option<Qid>>
where
    F: FnMut(Qid) -> Fut,
    Fut: Future<Output = Result<Vec<Qid>>>,
{
    let mut visited: HashSet<Qid> = HashSet::new();
    let mut frontier: VecDeque<Qid> = VecDeque::new();

    for qid in start {
        if visited.insert(qid.clone()) {
            frontier.push_back(qid);
        }
    }

    while let Some(node) = frontier.pop_front() {
        if terminals.contains(&node) {
            return Ok(Some(node));
        }

        for parent in parents(node).await? {
            if visited.insert(parent.clone()) {
                frontier.push_back(parent);
            }
        }
    }

    Ok(None)
}
