use super::*;

#[test]
fn deep_native_recursion_does_not_overflow() {
    fn nest(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { nest(n - 1) + 1 })
    }

    assert_eq!(nest(100_000), 100_000);
}

#[test]
fn passes_results_through() {
    let result: Result<i32, &str> = ensure_sufficient_stack(|| Err("boom"));
    assert_eq!(result, Err("boom"));
}

#[test]
fn counter_refuses_past_limit() {
    let counter = RecursionCounter::new(2);
    let first = counter.enter();
    assert!(first.is_some());
    let second = counter.enter();
    assert!(second.is_some());
    assert!(counter.enter().is_none());
    assert_eq!(counter.depth(), 2);

    drop(second);
    assert_eq!(counter.depth(), 1);
    assert!(counter.enter().is_some());
    assert_eq!(counter.depth(), 1);
}

#[test]
fn counter_unwinds_with_recursion() {
    fn descend(counter: &RecursionCounter, n: usize) -> Result<usize, usize> {
        let Some(_frame) = counter.enter() else {
            return Err(counter.depth());
        };
        if n == 0 {
            Ok(counter.depth())
        } else {
            descend(counter, n - 1)
        }
    }

    let counter = RecursionCounter::new(50);
    assert_eq!(descend(&counter, 9), Ok(10));
    assert_eq!(counter.depth(), 0);
    assert_eq!(descend(&counter, 100), Err(50));
    assert_eq!(counter.depth(), 0);
    assert_eq!(counter.limit(), 50);
}
