//! Domain suffix trie.
//!
//! Suffix rules are stored as a tree of labels, rightmost label first:
//! `api.github.com` is the path `com -> github -> api`. A node marked
//! `included` matches every domain ending in the suffix spelled by its path,
//! so its children are redundant and are pruned on insert. Two invariants
//! follow, whatever the insertion order:
//!
//! - an `included` node has no children;
//! - every node that is not `included` leads to at least one `included` node.
//!
//! Lookup is therefore bounded by the depth of the domain, and stops at the
//! first `included` node on the path.
//!
//! [`DomainSuffixTrie`] is the mutable form filled at build time.
//! [`DomainSuffixTrie::finalize`] compacts it into a [`FrozenSuffixTrie`]:
//! one flat node vector plus one flat edge vector, sorted by label within
//! each node, searched with a binary search.

use std::collections::{HashMap, VecDeque};

use super::DomainMatcher;
use crate::error::{DomainSetError, Result};
use crate::options::Traversal;
use crate::text::RuleText;

#[derive(Debug, Clone)]
struct TrieNode<S> {
    included: bool,
    children: HashMap<S, TrieNode<S>>,
}

impl<S> Default for TrieNode<S> {
    fn default() -> Self {
        Self {
            included: false,
            children: HashMap::new(),
        }
    }
}

// Drops without recursion; a chain is as deep as the longest suffix.
impl<S> Drop for TrieNode<S> {
    fn drop(&mut self) {
        let mut pending: Vec<TrieNode<S>> = self.children.drain().map(|(_, c)| c).collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.children.drain().map(|(_, c)| c));
        }
    }
}

impl<S: RuleText> TrieNode<S> {
    /// Mark this node as matching and drop the subtree it now covers.
    fn include(&mut self) {
        if !self.included {
            self.included = true;
            self.children = HashMap::new();
        }
    }
}

/// Mutable suffix trie.
#[derive(Debug, Clone)]
pub struct DomainSuffixTrie<S> {
    root: TrieNode<S>,
    traversal: Traversal,
    inserted: usize,
}

impl<S: RuleText> DomainSuffixTrie<S> {
    /// Create an empty trie using `traversal` for insertion and lookup.
    ///
    /// `capacity` pre-sizes the map of top-level labels.
    pub fn new(traversal: Traversal, capacity: usize) -> Self {
        Self {
            root: TrieNode {
                included: false,
                children: HashMap::with_capacity(capacity),
            },
            traversal,
            inserted: 0,
        }
    }

    /// Number of suffixes inserted, including redundant ones.
    pub fn len(&self) -> usize {
        self.inserted
    }

    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    pub fn traversal(&self) -> Traversal {
        self.traversal
    }

    /// Insert a suffix with the configured traversal.
    pub fn insert(&mut self, suffix: S) {
        match self.traversal {
            Traversal::Iterative => self.insert_iterative(suffix),
            Traversal::Recursive => self.insert_recursive(suffix),
        }
    }

    /// Insert walking the labels right to left in a loop.
    pub fn insert_iterative(&mut self, suffix: S) {
        self.inserted += 1;

        let text = suffix.as_ref();
        let mut node = &mut self.root;
        let mut end = text.len();
        loop {
            match text[..end].rfind('.') {
                Some(dot) => {
                    let child = node.children.entry(suffix.slice(dot + 1..end)).or_default();
                    if child.included {
                        return;
                    }
                    node = child;
                    end = dot;
                }
                None => {
                    node.children.entry(suffix.slice(0..end)).or_default().include();
                    return;
                }
            }
        }
    }

    /// Insert descending one label per call.
    pub fn insert_recursive(&mut self, suffix: S) {
        self.inserted += 1;

        let end = suffix.as_ref().len();
        Self::insert_at(&mut self.root, &suffix, end);
    }

    fn insert_at(node: &mut TrieNode<S>, suffix: &S, end: usize) {
        match suffix.as_ref()[..end].rfind('.') {
            Some(dot) => {
                let child = node.children.entry(suffix.slice(dot + 1..end)).or_default();
                if !child.included {
                    Self::insert_at(child, suffix, dot);
                }
            }
            None => node.children.entry(suffix.slice(0..end)).or_default().include(),
        }
    }

    /// Check a domain with the configured traversal.
    pub fn contains(&self, domain: &str) -> bool {
        match self.traversal {
            Traversal::Iterative => self.contains_iterative(domain),
            Traversal::Recursive => self.contains_recursive(domain),
        }
    }

    pub fn contains_iterative(&self, domain: &str) -> bool {
        let mut node = &self.root;
        for label in domain.rsplit('.') {
            match node.children.get(label) {
                None => return false,
                Some(child) if child.included => return true,
                Some(child) => node = child,
            }
        }
        false
    }

    pub fn contains_recursive(&self, domain: &str) -> bool {
        Self::contains_at(&self.root, domain)
    }

    fn contains_at(node: &TrieNode<S>, domain: &str) -> bool {
        let (label, rest) = match domain.rfind('.') {
            Some(dot) => (&domain[dot + 1..], Some(&domain[..dot])),
            None => (domain, None),
        };
        match (node.children.get(label), rest) {
            (None, _) => false,
            (Some(child), _) if child.included => true,
            (Some(child), Some(rest)) => Self::contains_at(child, rest),
            (Some(_), None) => false,
        }
    }

    /// Compact the trie into its frozen form.
    ///
    /// Fails if the tree breaks an invariant: an `included` node with
    /// children, a dead-end node that is not `included`, or more nodes than
    /// fit a `u32` index.
    pub fn finalize(self) -> Result<FrozenSuffixTrie<S>> {
        if self.root.included {
            return Err(DomainSetError::BuildConversion(
                "suffix trie root is marked included".to_string(),
            ));
        }

        let mut nodes = vec![FrozenNode::default()];
        let mut edges = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back((0usize, self.root));

        while let Some((index, mut node)) = queue.pop_front() {
            if node.included && !node.children.is_empty() {
                return Err(DomainSetError::BuildConversion(format!(
                    "suffix trie node {} is included but has {} children",
                    index,
                    node.children.len()
                )));
            }
            if !node.included && node.children.is_empty() && index != 0 {
                return Err(DomainSetError::BuildConversion(format!(
                    "suffix trie node {} is a dead end",
                    index
                )));
            }

            let mut children: Vec<(S, TrieNode<S>)> =
                std::mem::take(&mut node.children).into_iter().collect();
            children.sort_unstable_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));

            nodes[index].edges_start = to_index(edges.len())?;
            nodes[index].edges_len = to_index(children.len())?;

            for (label, child) in children {
                let child_index = nodes.len();
                nodes.push(FrozenNode {
                    included: child.included,
                    ..FrozenNode::default()
                });
                edges.push((label, to_index(child_index)?));
                queue.push_back((child_index, child));
            }
        }

        Ok(FrozenSuffixTrie {
            nodes,
            edges,
            traversal: self.traversal,
        })
    }
}

impl<S: RuleText> DomainMatcher for DomainSuffixTrie<S> {
    fn matches(&self, domain: &str) -> bool {
        self.contains(domain)
    }
}

fn to_index(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| {
        DomainSetError::BuildConversion(format!("suffix trie index {} exceeds u32", n))
    })
}

#[derive(Debug, Clone, Copy, Default)]
struct FrozenNode {
    included: bool,
    edges_start: u32,
    edges_len: u32,
}

/// Immutable, compacted suffix trie.
#[derive(Debug, Clone)]
pub struct FrozenSuffixTrie<S> {
    /// Node 0 is the root
    nodes: Vec<FrozenNode>,
    /// (label, child node index), sorted by label within each node's range
    edges: Vec<(S, u32)>,
    traversal: Traversal,
}

impl<S: RuleText> FrozenSuffixTrie<S> {
    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of suffixes left after pruning.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.included).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn traversal(&self) -> Traversal {
        self.traversal
    }

    #[inline]
    fn child(&self, node: FrozenNode, label: &str) -> Option<(u32, FrozenNode)> {
        let start = node.edges_start as usize;
        let edges = &self.edges[start..start + node.edges_len as usize];
        let pos = edges
            .binary_search_by(|(l, _)| l.as_ref().cmp(label))
            .ok()?;
        let index = edges[pos].1;
        Some((index, self.nodes[index as usize]))
    }

    /// Check a domain with the traversal the trie was built with.
    pub fn contains(&self, domain: &str) -> bool {
        match self.traversal {
            Traversal::Iterative => self.contains_iterative(domain),
            Traversal::Recursive => self.contains_recursive(domain),
        }
    }

    pub fn contains_iterative(&self, domain: &str) -> bool {
        let mut node = self.nodes[0];
        for label in domain.rsplit('.') {
            match self.child(node, label) {
                None => return false,
                Some((_, child)) if child.included => return true,
                Some((_, child)) => node = child,
            }
        }
        false
    }

    pub fn contains_recursive(&self, domain: &str) -> bool {
        self.contains_at(self.nodes[0], domain)
    }

    fn contains_at(&self, node: FrozenNode, domain: &str) -> bool {
        let (label, rest) = match domain.rfind('.') {
            Some(dot) => (&domain[dot + 1..], Some(&domain[..dot])),
            None => (domain, None),
        };
        match (self.child(node, label), rest) {
            (None, _) => false,
            (Some((_, child)), _) if child.included => true,
            (Some((_, child)), Some(rest)) => self.contains_at(child, rest),
            (Some(_), None) => false,
        }
    }

    /// Reconstruct the minimal set of suffixes this trie matches.
    ///
    /// Depth-first over an explicit stack, in label order.
    pub fn rules(&self) -> Vec<String> {
        let mut rules = Vec::new();
        // Labels from the root down to the node being visited
        let mut path: Vec<&str> = Vec::new();
        // (edge index, depth of its label in `path`)
        let mut stack: Vec<(usize, usize)> = Vec::new();
        self.push_edges(0, 0, &mut stack);

        while let Some((edge, depth)) = stack.pop() {
            let (label, child) = &self.edges[edge];
            path.truncate(depth);
            path.push(label.as_ref());
            if self.nodes[*child as usize].included {
                let labels: Vec<&str> = path.iter().rev().copied().collect();
                rules.push(labels.join("."));
            } else {
                self.push_edges(*child, depth + 1, &mut stack);
            }
        }
        rules
    }

    fn push_edges(&self, index: u32, depth: usize, stack: &mut Vec<(usize, usize)>) {
        let node = self.nodes[index as usize];
        let start = node.edges_start as usize;
        let end = start + node.edges_len as usize;
        stack.extend((start..end).rev().map(|edge| (edge, depth)));
    }
}

impl<S: RuleText> DomainMatcher for FrozenSuffixTrie<S> {
    #[inline]
    fn matches(&self, domain: &str) -> bool {
        self.contains(domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(traversal: Traversal, suffixes: &[&'static str]) -> DomainSuffixTrie<&'static str> {
        let mut trie = DomainSuffixTrie::new(traversal, 0);
        for s in suffixes {
            trie.insert(*s);
        }
        trie
    }

    fn assert_all_agree(trie: &DomainSuffixTrie<&str>, domain: &str, expected: bool) {
        assert_eq!(trie.contains_iterative(domain), expected, "iterative: {}", domain);
        assert_eq!(trie.contains_recursive(domain), expected, "recursive: {}", domain);
        let frozen = trie.clone().finalize().unwrap();
        assert_eq!(frozen.contains_iterative(domain), expected, "frozen iterative: {}", domain);
        assert_eq!(frozen.contains_recursive(domain), expected, "frozen recursive: {}", domain);
    }

    #[test]
    fn test_basic_lookup() {
        for traversal in [Traversal::Iterative, Traversal::Recursive] {
            let trie = build(traversal, &["example.com", "github.com", "api.ipify.org"]);
            assert_all_agree(&trie, "example.com", true);
            assert_all_agree(&trie, "www.example.com", true);
            assert_all_agree(&trie, "a.b.c.example.com", true);
            assert_all_agree(&trie, "gobyexample.com", false);
            assert_all_agree(&trie, "com", false);
            assert_all_agree(&trie, "api.ipify.org", true);
            assert_all_agree(&trie, "ipify.org", false);
            assert_all_agree(&trie, "www.ipify.org", false);
            assert_all_agree(&trie, "api64.ipify.org", false);
            assert_all_agree(&trie, "github.blog", false);
            assert_all_agree(&trie, "", false);
        }
    }

    #[test]
    fn test_longer_after_shorter_is_noop() {
        for traversal in [Traversal::Iterative, Traversal::Recursive] {
            let trie = build(traversal, &["b.c", "a.b.c"]);
            assert_all_agree(&trie, "a.b.c", true);
            assert_all_agree(&trie, "x.b.c", true);
            assert_all_agree(&trie, "b.c", true);
            assert_all_agree(&trie, "c", false);

            let frozen = trie.finalize().unwrap();
            // root, c, b
            assert_eq!(frozen.node_count(), 3);
            assert_eq!(frozen.rules(), vec!["b.c".to_string()]);
        }
    }

    #[test]
    fn test_shorter_after_longer_prunes() {
        for traversal in [Traversal::Iterative, Traversal::Recursive] {
            let trie = build(traversal, &["a.b.c", "x.y.b.c", "b.c"]);
            assert_all_agree(&trie, "a.b.c", true);
            assert_all_agree(&trie, "q.b.c", true);
            assert_all_agree(&trie, "b.c", true);
            assert_all_agree(&trie, "c", false);

            let frozen = trie.finalize().unwrap();
            assert_eq!(frozen.node_count(), 3);
            assert_eq!(frozen.len(), 1);
        }
    }

    #[test]
    fn test_insert_twice_is_idempotent() {
        let once = build(Traversal::Iterative, &["example.com"]).finalize().unwrap();
        let twice = build(Traversal::Iterative, &["example.com", "example.com"])
            .finalize()
            .unwrap();
        assert_eq!(once.node_count(), twice.node_count());
        for domain in ["example.com", "www.example.com", "com", "example.org"] {
            assert_eq!(once.contains(domain), twice.contains(domain), "{}", domain);
        }
    }

    #[test]
    fn test_single_label_suffix() {
        let trie = build(Traversal::Iterative, &["dev"]);
        assert_all_agree(&trie, "dev", true);
        assert_all_agree(&trie, "go.dev", true);
        assert_all_agree(&trie, "godev", false);
        assert_all_agree(&trie, "dev.com", false);
    }

    #[test]
    fn test_empty_labels() {
        // A trailing dot produces an empty rightmost label.
        let trie = build(Traversal::Iterative, &["example.com."]);
        assert_all_agree(&trie, "example.com.", true);
        assert_all_agree(&trie, "www.example.com.", true);
        assert_all_agree(&trie, "example.com", false);

        let trie = build(Traversal::Recursive, &[""]);
        assert_all_agree(&trie, "", true);
        assert_all_agree(&trie, "x.", true);
        assert_all_agree(&trie, "x", false);
    }

    #[test]
    fn test_sibling_branches_kept() {
        let trie = build(Traversal::Iterative, &["a.example.com", "b.example.com"]);
        assert_all_agree(&trie, "a.example.com", true);
        assert_all_agree(&trie, "x.b.example.com", true);
        assert_all_agree(&trie, "c.example.com", false);
        assert_all_agree(&trie, "example.com", false);

        let frozen = trie.finalize().unwrap();
        let mut rules = frozen.rules();
        rules.sort();
        assert_eq!(rules, vec!["a.example.com", "b.example.com"]);
    }

    #[test]
    fn test_len_counts_inserts() {
        let trie = build(Traversal::Iterative, &["b.c", "a.b.c", "b.c"]);
        assert_eq!(trie.len(), 3);
        assert_eq!(trie.finalize().unwrap().len(), 1);
    }

    #[test]
    fn test_finalize_empty() {
        let trie: DomainSuffixTrie<&str> = DomainSuffixTrie::new(Traversal::Iterative, 0);
        assert!(trie.is_empty());
        let frozen = trie.finalize().unwrap();
        assert_eq!(frozen.node_count(), 1);
        assert!(!frozen.contains("example.com"));
    }

    #[test]
    fn test_finalize_rejects_included_node_with_children() {
        let mut trie = build(Traversal::Iterative, &["a.b.c"]);
        if let Some(c) = trie.root.children.get_mut("c") {
            c.included = true;
        }
        let err = trie.finalize().unwrap_err();
        assert!(matches!(err, DomainSetError::BuildConversion(_)), "got: {}", err);
    }

    #[test]
    fn test_finalize_rejects_dead_end() {
        let mut trie = build(Traversal::Iterative, &["b.c"]);
        trie.root.children.insert("orphan", TrieNode::default());
        let err = trie.finalize().unwrap_err();
        assert!(matches!(err, DomainSetError::BuildConversion(_)), "got: {}", err);
    }

    #[test]
    fn test_frozen_keeps_traversal() {
        let frozen = build(Traversal::Recursive, &["example.com"]).finalize().unwrap();
        assert_eq!(frozen.traversal(), Traversal::Recursive);
        assert!(frozen.matches("www.example.com"));
    }

    fn deep_suffix(labels: usize) -> String {
        let mut suffix = "a.".repeat(labels);
        suffix.push('z');
        suffix
    }

    #[test]
    fn test_deep_trie_uses_little_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| {
                let suffix = deep_suffix(100_000);
                let deep = || {
                    let mut trie: DomainSuffixTrie<&str> =
                        DomainSuffixTrie::new(Traversal::Iterative, 0);
                    trie.insert(&suffix);
                    trie
                };

                // Dropping an unfinalized tree
                let trie = deep();
                assert!(trie.contains(&format!("x.{}", suffix)));
                drop(trie);

                // Pruning drops the deep branch
                let mut pruned = deep();
                pruned.insert("z");
                assert_eq!(pruned.finalize().unwrap().rules(), vec!["z".to_string()]);

                let frozen = deep().finalize().unwrap();
                assert_eq!(frozen.rules(), vec![suffix.clone()]);
                assert!(frozen.contains_iterative(&suffix));
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_rules_in_label_order() {
        let trie = build(
            Traversal::Iterative,
            &["b.example.com", "a.example.com", "example.org", "z.a.example.net"],
        );
        assert_eq!(
            trie.finalize().unwrap().rules(),
            vec!["a.example.com", "b.example.com", "z.a.example.net", "example.org"]
        );
    }

    #[test]
    fn test_owned_labels() {
        let mut trie: DomainSuffixTrie<Box<str>> = DomainSuffixTrie::new(Traversal::Iterative, 0);
        trie.insert("example.com".into());
        trie.insert("www.example.com".into());
        let frozen = trie.finalize().unwrap();
        assert!(frozen.contains("a.example.com"));
        assert_eq!(frozen.rules(), vec!["example.com".to_string()]);
    }
}
