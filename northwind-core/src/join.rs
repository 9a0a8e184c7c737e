//! Client-side join strategies for parent/child result sets.
//!
//! Two ways of turning database rows into `Product` graphs:
//!
//! - **Split-key join** ([`attach_children`]): parents and children arrive as
//!   two separate result sets and are correlated by a key column.
//! - **Row-group mapping** ([`RowGrouper`]): one joined result stream is
//!   folded back into parents, keeping the first-seen parent per key and
//!   appending children in row order.
//!
//! Both produce the same graphs for the same data when the rows are
//! ordered consistently.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{OrderDetail, Product};

/// Which join strategy a query path uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinStrategy {
    /// Two result sets from one batch, joined by key
    QueryMultiple,
    /// One joined query, grouped while iterating rows
    MultiMapping,
}

impl JoinStrategy {
    pub const ALL: [JoinStrategy; 2] = [JoinStrategy::QueryMultiple, JoinStrategy::MultiMapping];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QueryMultiple => "query-multiple",
            Self::MultiMapping => "multi-mapping",
        }
    }
}

impl fmt::Display for JoinStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query-multiple" => Ok(Self::QueryMultiple),
            "multi-mapping" => Ok(Self::MultiMapping),
            other => Err(format!("unknown join strategy: '{}'", other)),
        }
    }
}

/// Split-key join: attach each parent's children, grouped by key.
///
/// Children keep their relative order inside a group. Every parent gets a
/// group (empty when nothing matched), and children whose key matches no
/// parent are dropped.
pub fn attach_children<P, C, K, PK, CK, S>(
    parents: &mut [P],
    children: impl IntoIterator<Item = C>,
    parent_key: PK,
    child_key: CK,
    mut set: S,
) where
    C: Clone,
    K: Eq + Hash,
    PK: Fn(&P) -> K,
    CK: Fn(&C) -> K,
    S: FnMut(&mut P, Vec<C>),
{
    let mut groups: HashMap<K, Vec<C>> = HashMap::new();
    for child in children {
        groups.entry(child_key(&child)).or_default().push(child);
    }

    for parent in parents.iter_mut() {
        let group = groups.get(&parent_key(parent)).cloned().unwrap_or_default();
        set(parent, group);
    }
}

/// Attach order details to products by `product_id`.
pub fn attach_order_details(products: &mut [Product], details: Vec<OrderDetail>) {
    attach_children(
        products,
        details,
        |p| p.product_id,
        |d| d.product_id,
        |p, ds| p.order_details = Some(ds),
    );
}

/// Row-group mapping over a joined row stream.
///
/// Rows may repeat the same parent; only the first instance is kept and
/// later copies are discarded. Parents come out in first-seen order.
#[derive(Debug)]
pub struct RowGrouper<K, P, C> {
    index: HashMap<K, usize>,
    entries: Vec<(P, Vec<C>)>,
}

impl<K, P, C> Default for RowGrouper<K, P, C>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P, C> RowGrouper<K, P, C>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Feed one joined row. `child` is `None` for an outer-join row with no
    /// matching child; the parent is still registered.
    pub fn push(&mut self, key: K, parent: P, child: Option<C>) {
        let _ = self.try_push_with::<std::convert::Infallible>(key, || Ok(parent), child);
    }

    /// Like [`push`](Self::push), but only builds the parent when its key
    /// has not been seen yet.
    pub fn try_push_with<E>(
        &mut self,
        key: K,
        make_parent: impl FnOnce() -> Result<P, E>,
        child: Option<C>,
    ) -> Result<(), E> {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let parent = make_parent()?;
                self.entries.push((parent, Vec::new()));
                let slot = self.entries.len() - 1;
                self.index.insert(key, slot);
                slot
            }
        };

        if let Some(child) = child {
            self.entries[slot].1.push(child);
        }
        Ok(())
    }

    /// Number of distinct parents seen so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand each parent its children and return parents in first-seen order.
    pub fn finish<S>(self, mut set: S) -> Vec<P>
    where
        S: FnMut(&mut P, Vec<C>),
    {
        self.entries
            .into_iter()
            .map(|(mut parent, children)| {
                set(&mut parent, children);
                parent
            })
            .collect()
    }
}

/// Group `(parent, child)` rows of an outer join into parents.
pub fn group_rows<P, C, K, PK, S>(
    rows: impl IntoIterator<Item = (P, Option<C>)>,
    parent_key: PK,
    set: S,
) -> Vec<P>
where
    K: Eq + Hash,
    PK: Fn(&P) -> K,
    S: FnMut(&mut P, Vec<C>),
{
    let mut grouper = RowGrouper::new();
    for (parent, child) in rows {
        grouper.push(parent_key(&parent), parent, child);
    }
    grouper.finish(set)
}

/// Group joined product/order-detail rows into products.
pub fn group_product_rows(
    rows: impl IntoIterator<Item = (Product, Option<OrderDetail>)>,
) -> Vec<Product> {
    group_rows(rows, |p| p.product_id, |p, ds| p.order_details = Some(ds))
}
