//! Singly linked cell owning its successor.

/// Owned link to the next node.
pub(crate) type Link<T> = Option<Box<Node<T>>>;

/// One element plus exclusive ownership of the rest of the chain.
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) next: Link<T>,
}

impl<T> Node<T> {
    pub(crate) fn boxed(value: T) -> Box<Self> {
        Box::new(Self { value, next: None })
    }
}

/// Release a chain one node at a time.
///
/// Dropping the head `Box` directly would recurse once per node and
/// overflow the thread stack on long chains.
pub(crate) fn drop_chain<T>(mut link: Link<T>) {
    while let Some(mut node) = link {
        link = node.next.take();
    }
}
