use std::convert::Infallible;

use pretty_assertions::assert_eq;

use super::*;

const DONE: i32 = -1;

fn digits() -> PeekableStream<std::ops::Range<i32>> {
    PeekableStream::new(0..10, DONE)
}

#[test]
fn iterates_all_items_then_yields_default() {
    let mut stream = digits();
    let items: Vec<i32> = stream.by_ref().collect();
    assert_eq!(items, (0..10).collect::<Vec<_>>());
    assert_eq!(stream.peek(), DONE);
    assert_eq!(stream.advance(), DONE);
    assert!(stream.is_exhausted());
}

#[test]
fn manual_iteration() {
    let mut stream = digits();
    assert_eq!(stream.advance(), 0);
    assert_eq!(stream.peek(), 1);
    assert_eq!(stream.advance(), 1);
    assert_eq!(stream.advance_n(2), vec![2, 3]);
    assert_eq!(stream.peek_n(2), vec![4, 5]);
    assert_eq!(stream.peek(), 6);
    stream.commit();
    assert_eq!(stream.advance_n(4), vec![7, 8, 9, DONE]);
    assert_eq!(stream.peek(), DONE);
}

#[test]
fn advance_discards_lookahead() {
    let mut stream = digits();
    assert_eq!(stream.peek_n(3), vec![0, 1, 2]);
    assert_eq!(stream.advance(), 0);
    assert_eq!(stream.peek(), 1);
}

#[test]
fn commit_while_iterating_skips_peeked() {
    let mut stream = digits();
    let mut seen = Vec::new();
    while let Some(item) = stream.next() {
        stream.peek();
        stream.commit();
        seen.push(item);
    }
    assert_eq!(seen, vec![0, 2, 4, 6, 8]);
}

#[test]
fn unpeek_and_revert() {
    let mut stream = digits();
    assert_eq!(stream.peek_n(3), vec![0, 1, 2]);
    stream.unpeek();
    assert_eq!(stream.peeked(), vec![0, 1]);
    assert_eq!(stream.peek(), 2);
    stream.revert();
    assert_eq!(stream.lookahead_len(), 0);
    assert_eq!(stream.peek(), 0);

    // never below the committed position
    stream.revert();
    stream.unpeek();
    assert_eq!(stream.peek(), 0);
}

#[test]
fn rollback_views_are_independent_until_committed_upstream() {
    let mut stream = digits();
    assert_eq!(stream.advance(), 0);

    let mut lookahead = stream.rollback();
    assert_eq!(lookahead.peek(), 1);
    assert_eq!(lookahead.next(), Some(1));
    assert_eq!(lookahead.peek(), 2);

    assert_eq!(stream.next(), Some(1));
    assert_eq!(lookahead.peek(), 3);
    assert_eq!(stream.peek(), 2);

    let mut view = stream.rollback();
    assert_eq!(view.next(), Some(2));
    view.commit_upstream();
    assert_eq!(stream.position(), 3);

    let mut nested = lookahead.rollback();
    assert_eq!(nested.peek(), 3);
    assert_eq!(nested.peek(), 4);
    nested.commit();
    assert_eq!(nested.next(), Some(5));
    nested.commit_upstream();
    assert_eq!(lookahead.next(), Some(6));

    // the root only moved through its own view
    assert_eq!(stream.next(), Some(3));
}

#[test]
fn nested_commit_upstream_moves_one_level() {
    let mut stream = digits();
    let mut outer = stream.rollback();
    assert_eq!(outer.advance_n(2), [0, 1]);
    let mut inner = outer.rollback();
    assert_eq!(inner.advance(), 2);
    inner.advance_n(2);
    inner.commit_upstream();
    assert_eq!(outer.position(), 5);
    assert_eq!(stream.position(), 0);
    outer.commit_upstream();
    assert_eq!(stream.position(), 5);
    assert_eq!(stream.advance(), 5);
}

#[test]
fn speculate_commits_consumed_items_on_success() {
    let mut stream = digits();
    let result: Result<Option<()>, Infallible> = stream.speculate(|view| {
        assert_eq!(view.advance(), 0);
        assert_eq!(view.peek(), 1);
        Ok(Some(()))
    });
    assert_eq!(result, Ok(Some(())));
    // the view's pending peek is not carried over
    assert_eq!(stream.advance(), 1);
}

#[test]
fn speculate_leaves_stream_untouched_on_miss() {
    let mut stream = digits();
    let result: Result<Option<()>, Infallible> = stream.speculate(|view| {
        view.advance_n(5);
        Ok(None)
    });
    assert_eq!(result, Ok(None));
    assert_eq!(stream.advance(), 0);
}

#[test]
fn speculate_propagates_errors_without_committing() {
    let mut stream = digits();
    let result: Result<Option<()>, &str> = stream.speculate(|view| {
        view.advance_n(2);
        Err("boom")
    });
    assert_eq!(result, Err("boom"));
    assert_eq!(stream.advance(), 0);
}

#[test]
fn speculation_nests() {
    let mut stream = digits();
    let result: Result<Option<i32>, Infallible> = stream.speculate(|outer| {
        outer.advance();
        let inner: Result<Option<i32>, Infallible> = outer.speculate(|inner| {
            inner.advance();
            Ok(Some(inner.advance()))
        });
        Ok(inner?)
    });
    assert_eq!(result, Ok(Some(2)));
    assert_eq!(stream.advance(), 3);
}

#[test]
fn pulls_each_item_from_upstream_once() {
    use std::cell::Cell;

    let pulls = Cell::new(0);
    let source = (0..5).inspect(|_| pulls.set(pulls.get() + 1));
    let mut stream = PeekableStream::new(source, DONE);
    stream.peek_n(3);
    stream.revert();
    let view = stream.rollback();
    drop(view);
    stream.advance_n(3);
    assert_eq!(pulls.get(), 3);
}

#[test]
fn bounded_buffer_evicts_oldest_items() {
    let mut stream = PeekableStream::with_capacity(0..10, Some(2), DONE);
    assert_eq!(stream.peek_n(4), vec![0, 1, 2, 3]);
    stream.revert();
    // 0 and 1 were evicted; reads clamp to the oldest buffered item
    assert_eq!(stream.advance(), 2);
    assert_eq!(stream.advance(), 3);
    assert_eq!(stream.advance(), 4);
}

mod proptest_views {
    use proptest::prelude::*;

    use super::super::PeekableStream;

    proptest! {
        #[test]
        fn abandoned_views_do_not_move_the_root(
            consumed in 0usize..20,
            wander in 0usize..20,
        ) {
            let mut stream = PeekableStream::new(0..20i32, -1);
            stream.advance_n(consumed);
            let mut view = stream.rollback();
            view.advance_n(wander);
            view.peek_n(wander);
            drop(view);
            let expected = if consumed < 20 { consumed as i32 } else { -1 };
            prop_assert_eq!(stream.advance(), expected);
        }

        #[test]
        fn committed_views_move_the_root_exactly(
            consumed in 0usize..10,
            taken in 0usize..10,
        ) {
            let mut stream = PeekableStream::new(0..20i32, -1);
            stream.advance_n(consumed);
            let mut view = stream.rollback();
            let seen = view.advance_n(taken);
            view.commit_upstream();
            let expected: Vec<i32> = (consumed as i32..(consumed + taken) as i32).collect();
            prop_assert_eq!(seen, expected);
            prop_assert_eq!(stream.position(), consumed + taken);
        }
    }
}
