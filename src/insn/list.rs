//! Arena-backed instruction sequence.
//!
//! `InsnList` stores instruction nodes in a growable arena and links them
//! into a doubly-linked order with stable `InsnId` handles. Structural
//! edits during the transformation pass (insert before/after, remove) never
//! invalidate handles to surviving nodes; `remove` returns the next live
//! node so the caller's cursor can be repositioned explicitly instead of
//! relying on iterator-rewind semantics.
//!
//! Removed nodes become tombstones. The arena only lives for one method's
//! transformation pass, so tombstones are never compacted.

use std::fmt;

use super::Insn;

/// Stable handle to an instruction node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InsnId(u32);

#[derive(Clone, Debug)]
struct Node {
    insn: Insn,
    prev: Option<InsnId>,
    next: Option<InsnId>,
    live: bool,
}

/// Doubly-linked instruction sequence for one method body.
#[derive(Clone, Debug, Default)]
pub struct InsnList {
    nodes: Vec<Node>,
    head: Option<InsnId>,
    tail: Option<InsnId>,
    live: usize,
}

impl InsnList {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, insn: Insn, prev: Option<InsnId>, next: Option<InsnId>) -> InsnId {
        let id = InsnId(self.nodes.len() as u32);
        self.nodes.push(Node {
            insn,
            prev,
            next,
            live: true,
        });
        self.live += 1;
        id
    }

    fn node(&self, id: InsnId) -> &Node {
        let node = &self.nodes[id.0 as usize];
        assert!(node.live, "use of removed instruction {:?}", id);
        node
    }

    fn node_mut(&mut self, id: InsnId) -> &mut Node {
        let node = &mut self.nodes[id.0 as usize];
        assert!(node.live, "use of removed instruction {:?}", id);
        node
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn head(&self) -> Option<InsnId> {
        self.head
    }

    pub fn tail(&self) -> Option<InsnId> {
        self.tail
    }

    pub fn get(&self, id: InsnId) -> &Insn {
        &self.node(id).insn
    }

    pub fn next(&self, id: InsnId) -> Option<InsnId> {
        self.node(id).next
    }

    pub fn prev(&self, id: InsnId) -> Option<InsnId> {
        self.node(id).prev
    }

    /// Append an instruction at the end of the sequence.
    pub fn push_back(&mut self, insn: Insn) -> InsnId {
        let id = self.alloc(insn, self.tail, None);
        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    /// Insert an instruction immediately before `at`.
    pub fn insert_before(&mut self, at: InsnId, insn: Insn) -> InsnId {
        let prev = self.node(at).prev;
        let id = self.alloc(insn, prev, Some(at));
        match prev {
            Some(prev) => self.node_mut(prev).next = Some(id),
            None => self.head = Some(id),
        }
        self.node_mut(at).prev = Some(id);
        id
    }

    /// Insert an instruction immediately after `at`.
    pub fn insert_after(&mut self, at: InsnId, insn: Insn) -> InsnId {
        let next = self.node(at).next;
        let id = self.alloc(insn, Some(at), next);
        match next {
            Some(next) => self.node_mut(next).prev = Some(id),
            None => self.tail = Some(id),
        }
        self.node_mut(at).next = Some(id);
        id
    }

    /// Unlink an instruction. Returns the next live node, the natural
    /// resume point for a forward cursor.
    pub fn remove(&mut self, id: InsnId) -> Option<InsnId> {
        let (prev, next) = {
            let node = self.node(id);
            (node.prev, node.next)
        };
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
        let node = &mut self.nodes[id.0 as usize];
        node.live = false;
        node.prev = None;
        node.next = None;
        self.live -= 1;
        next
    }

    /// Iterate live instructions in order.
    pub fn iter(&self) -> impl Iterator<Item = (InsnId, &Insn)> + '_ {
        let mut cur = self.head;
        std::iter::from_fn(move || {
            let id = cur?;
            cur = self.next(id);
            Some((id, self.get(id)))
        })
    }

    /// Render the sequence as assembly-style listing lines: labels at
    /// column 0, everything else indented.
    pub fn render(&self) -> Vec<String> {
        self.iter()
            .map(|(_, insn)| match insn {
                Insn::Label(_) => insn.to_string(),
                _ => format!("    {}", insn),
            })
            .collect()
    }
}

impl FromIterator<Insn> for InsnList {
    fn from_iter<T: IntoIterator<Item = Insn>>(iter: T) -> Self {
        let mut list = InsnList::new();
        for insn in iter {
            list.push_back(insn);
        }
        list
    }
}

impl fmt::Display for InsnList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.render() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
