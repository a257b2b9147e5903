use super::*;

#[test]
fn released_buffers_are_cleared_and_reused() {
    let mut pool = ScratchPool::<u32>::default();

    let mut a = pool.acquire();
    a.extend([1, 2, 3]);
    let cap = a.capacity();
    pool.release(a);

    let b = pool.acquire();
    assert!(b.is_empty());
    assert_eq!(b.capacity(), cap);
    pool.release(b);

    let st = pool.stats();
    assert_eq!(st.allocated, 1);
    assert_eq!(st.acquired, 2);
    assert_eq!(st.outstanding, 0);
    assert_eq!(st.retained, 1);
}

#[test]
fn pool_honors_retention_cap() {
    let mut pool = ScratchPool::<u8>::new(ScratchPoolOpts { max_retained: 1 });
    let a = pool.acquire();
    let b = pool.acquire();
    assert_eq!(pool.stats().outstanding, 2);
    pool.release(a);
    pool.release(b);

    let st = pool.stats();
    assert_eq!(st.retained, 1);
    assert_eq!(st.dropped_on_release, 1);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "did not hand it out")]
fn foreign_handle_is_caught_in_debug_builds() {
    let mut a = ScratchPool::<u8>::default();
    let mut b = ScratchPool::<u8>::default();
    let s = a.acquire();
    b.release(s);
}
