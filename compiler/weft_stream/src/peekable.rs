//! Generic transactional cursor.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::iter::Fuse;
use std::rc::Rc;

/// Items pulled from the upstream iterator but not yet dropped.
///
/// Shared by a root stream and all of its views. Each element is pulled
/// from upstream exactly once.
struct Buffer<I: Iterator> {
    source: Fuse<I>,
    items: VecDeque<I::Item>,
    /// Absolute position of `items[0]`.
    start: usize,
    /// Optional bound; the oldest items are evicted beyond it.
    capacity: Option<usize>,
}

impl<I: Iterator> Buffer<I>
where
    I::Item: Clone,
{
    fn end(&self) -> usize {
        self.start + self.items.len()
    }

    /// The item at `pos` (clamped to the oldest buffered item), pulling from
    /// upstream as needed. Returns the effective position alongside it.
    fn get(&mut self, pos: usize) -> Option<(usize, I::Item)> {
        let mut pos = pos.max(self.start);
        while self.end() <= pos {
            let item = self.source.next()?;
            self.push(item);
            pos = pos.max(self.start);
        }
        self.items
            .get(pos - self.start)
            .map(|item| (pos, item.clone()))
    }

    fn push(&mut self, item: I::Item) {
        if let Some(capacity) = self.capacity {
            if capacity > 0 && self.items.len() == capacity {
                self.items.pop_front();
                self.start += 1;
            }
        }
        self.items.push_back(item);
    }

    /// Drop everything before `pos`.
    fn trim(&mut self, pos: usize) {
        while self.start < pos && !self.items.is_empty() {
            self.items.pop_front();
            self.start += 1;
        }
    }

    fn slice(&self, from: usize, to: usize) -> Vec<I::Item> {
        let from = from.max(self.start);
        let to = to.min(self.end());
        (from..to)
            .filter_map(|pos| self.items.get(pos - self.start).cloned())
            .collect()
    }
}

/// Positions of one stream or view.
#[derive(Debug)]
struct Cursor {
    committed: Cell<usize>,
    lookahead: Cell<usize>,
    /// Only the root may drop buffered items.
    root: bool,
}

impl Cursor {
    fn at(pos: usize, root: bool) -> Rc<Self> {
        Rc::new(Cursor {
            committed: Cell::new(pos),
            lookahead: Cell::new(pos),
            root,
        })
    }
}

/// A lazily-pulled stream with transactional lookahead.
///
/// Past the end of input every read yields `default` instead of failing.
/// Views created by [`rollback`](Self::rollback) alias the same buffer with
/// independent positions; see the crate docs for the cursor model.
pub struct PeekableStream<I: Iterator> {
    buffer: Rc<RefCell<Buffer<I>>>,
    cursor: Rc<Cursor>,
    parent: Option<Rc<Cursor>>,
    default: I::Item,
}

impl<I: Iterator> PeekableStream<I>
where
    I::Item: Clone,
{
    pub fn new(items: impl IntoIterator<IntoIter = I>, default: I::Item) -> Self {
        PeekableStream::with_capacity(items, None, default)
    }

    /// A stream whose buffer keeps at most `capacity` items.
    pub fn with_capacity(
        items: impl IntoIterator<IntoIter = I>,
        capacity: Option<usize>,
        default: I::Item,
    ) -> Self {
        PeekableStream {
            buffer: Rc::new(RefCell::new(Buffer {
                source: items.into_iter().fuse(),
                items: VecDeque::new(),
                start: 0,
                capacity,
            })),
            cursor: Cursor::at(0, true),
            parent: None,
            default,
        }
    }

    /// The sentinel returned past the end of input.
    pub fn default_item(&self) -> &I::Item {
        &self.default
    }

    /// Consume and return the next item, discarding any lookahead.
    pub fn advance(&mut self) -> I::Item {
        self.next().unwrap_or_else(|| self.default.clone())
    }

    pub fn advance_n(&mut self, n: usize) -> Vec<I::Item> {
        (0..n).map(|_| self.advance()).collect()
    }

    /// Look at the next item without consuming it and move the lookahead
    /// cursor past it.
    pub fn peek(&mut self) -> I::Item {
        let found = self.buffer.borrow_mut().get(self.cursor.lookahead.get());
        match found {
            Some((pos, item)) => {
                self.cursor.lookahead.set(pos + 1);
                item
            }
            None => self.default.clone(),
        }
    }

    /// Peek `n` items, padding with the default past the end.
    pub fn peek_n(&mut self, n: usize) -> Vec<I::Item> {
        (0..n).map(|_| self.peek()).collect()
    }

    /// Step the lookahead cursor back by one, never below `committed`.
    pub fn unpeek(&mut self) {
        let lookahead = self.cursor.lookahead.get();
        if lookahead > self.cursor.committed.get() {
            self.cursor.lookahead.set(lookahead - 1);
        }
    }

    /// Items between the committed and the lookahead position.
    pub fn peeked(&self) -> Vec<I::Item> {
        self.buffer
            .borrow()
            .slice(self.cursor.committed.get(), self.cursor.lookahead.get())
    }

    /// Make everything peeked so far consumed.
    pub fn commit(&mut self) {
        let lookahead = self.cursor.lookahead.get();
        self.cursor.committed.set(lookahead);
        if self.cursor.root {
            self.buffer.borrow_mut().trim(lookahead);
        }
    }

    /// Forget the lookahead; peeked items will be seen again.
    pub fn revert(&mut self) {
        self.cursor.lookahead.set(self.cursor.committed.get());
    }

    /// A view over the same buffer, starting at this stream's committed
    /// position. Nothing the view does is visible here until it calls
    /// [`commit_upstream`](Self::commit_upstream).
    pub fn rollback(&self) -> PeekableStream<I> {
        PeekableStream {
            buffer: Rc::clone(&self.buffer),
            cursor: Cursor::at(self.cursor.committed.get(), false),
            parent: Some(Rc::clone(&self.cursor)),
            default: self.default.clone(),
        }
    }

    /// Commit, then move the parent (if any) to this view's position.
    pub fn commit_upstream(&mut self) {
        self.commit();
        if let Some(parent) = &self.parent {
            let pos = self.cursor.committed.get();
            parent.committed.set(pos);
            parent.lookahead.set(pos);
            if parent.root {
                self.buffer.borrow_mut().trim(pos);
            }
        }
    }

    /// Run a speculative scan on a fresh view.
    ///
    /// - `Ok(Some(value))`: the view's consumed items (not its pending
    ///   lookahead) are committed into this stream.
    /// - `Ok(None)`: the guess was wrong; this stream is left untouched.
    /// - `Err(e)`: propagated, nothing is committed.
    pub fn speculate<T, E>(
        &mut self,
        scan: impl FnOnce(&mut PeekableStream<I>) -> Result<Option<T>, E>,
    ) -> Result<Option<T>, E> {
        let mut view = self.rollback();
        let Some(value) = scan(&mut view)? else {
            return Ok(None);
        };
        view.revert();
        view.commit_upstream();
        Ok(Some(value))
    }

    /// Absolute committed position (number of items consumed so far).
    pub fn position(&self) -> usize {
        self.cursor.committed.get()
    }

    /// Number of items peeked past the committed position.
    pub fn lookahead_len(&self) -> usize {
        self.cursor
            .lookahead
            .get()
            .saturating_sub(self.cursor.committed.get())
    }

    /// Whether no item is left at the committed position.
    pub fn is_exhausted(&mut self) -> bool {
        let committed = self.cursor.committed.get();
        self.buffer.borrow_mut().get(committed).is_none()
    }
}

impl<I: Iterator> Iterator for PeekableStream<I>
where
    I::Item: Clone,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        let committed = self.cursor.committed.get();
        let found = self.buffer.borrow_mut().get(committed);
        let Some((pos, item)) = found else {
            self.revert();
            return None;
        };
        self.cursor.committed.set(pos + 1);
        self.revert();
        if self.cursor.root {
            self.buffer.borrow_mut().trim(pos + 1);
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests;
