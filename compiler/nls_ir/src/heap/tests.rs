#![allow(
    clippy::expect_used,
    reason = "test code uses expect for concise setup"
)]

use pretty_assertions::assert_eq;

use super::{AllocError, Heap, LeakedBlock};
use crate::{Builtin, Ident, NodeKind, NodeTag};

fn int_pair(heap: &mut Heap) -> crate::NodeId {
    let one = heap.alloc_int(1).expect("alloc");
    let two = heap.alloc_int(2).expect("alloc");
    let args = heap.list(two).expect("alloc");
    heap.alloc_application(one, args).expect("alloc")
}

// reference counts

#[test]
fn fresh_node_has_no_references() {
    let mut heap = Heap::new();
    let id = heap.alloc_int(5).expect("alloc");
    assert_eq!(heap.ref_count(id), 0);
    assert_eq!(heap.live(), 1);
    heap.discard(id);
    assert_eq!(heap.live(), 0);
}

#[test]
fn grab_and_release_balance() {
    let mut heap = Heap::new();
    let id = heap.alloc_int(5).expect("alloc");
    heap.grab(id);
    heap.grab(id);
    assert_eq!(heap.ref_count(id), 2);
    assert!(!heap.is_last_ref(id));

    heap.release(id);
    assert!(heap.is_last_ref(id));
    assert_eq!(heap.live(), 1);

    heap.release(id);
    assert_eq!(heap.live(), 0);
    assert_eq!(heap.allocations(), 1);
    assert_eq!(heap.frees(), 1);
}

#[test]
fn constructors_grab_children() {
    let mut heap = Heap::new();
    let func = heap.alloc_int(1).expect("alloc");
    let arg = heap.alloc_int(2).expect("alloc");
    let args = heap.list(arg).expect("alloc");
    assert_eq!(heap.ref_count(arg), 1);

    let app = heap.alloc_application(func, args).expect("alloc");
    assert_eq!(heap.ref_count(func), 1);
    assert_eq!(heap.ref_count(args), 1);
    assert_eq!(heap.ref_count(app), 0);
    heap.discard(app);
    assert_eq!(heap.live(), 0);
}

#[test]
fn last_release_tears_down_subtree_once() {
    let mut heap = Heap::new();
    let app = int_pair(&mut heap);
    heap.grab(app);
    assert_eq!(heap.live(), 4);

    heap.release(app);
    assert_eq!(heap.live(), 0);
    assert_eq!(heap.frees(), 4);
}

#[test]
fn shared_child_survives_parent() {
    let mut heap = Heap::new();
    let shared = heap.alloc_int(9).expect("alloc");
    heap.grab(shared);
    let list = heap.list(shared).expect("alloc");
    heap.discard(list);

    assert_eq!(heap.ref_count(shared), 1);
    assert_eq!(heap.kind(shared).tag(), NodeTag::Int);
    heap.release(shared);
}

#[test]
fn long_list_teardown_is_iterative() {
    let mut heap = Heap::new();
    let items: Vec<_> = (0..100_000)
        .map(|i| heap.alloc_int(i).expect("alloc"))
        .collect();
    let list = heap
        .list_from(&items)
        .expect("alloc")
        .expect("non-empty");
    heap.grab(list);
    assert_eq!(heap.live(), 200_000);
    heap.release(list);
    assert_eq!(heap.live(), 0);
}

#[test]
fn function_takes_builtin_arity() {
    let mut heap = Heap::new();
    let id = heap
        .alloc_function(Ident::new("+"), Builtin::Add)
        .expect("alloc");
    match heap.kind(id) {
        NodeKind::Function(func) => {
            assert_eq!(func.arity, 2);
            assert_eq!(func.name.as_str(), "+");
            assert_eq!(func.builtin, Builtin::Add);
        }
        other => panic!("expected function, got {other:?}"),
    }
    heap.discard(id);
}

// corruption detection

#[test]
#[should_panic(expected = "release of unreferenced")]
fn release_at_zero_panics() {
    let mut heap = Heap::new();
    let id = heap.alloc_int(1).expect("alloc");
    heap.release(id);
}

#[test]
#[should_panic(expected = "use of freed node")]
fn double_free_panics() {
    let mut heap = Heap::new();
    let id = heap.alloc_int(1).expect("alloc");
    heap.grab(id);
    heap.release(id);
    heap.release(id);
}

#[test]
#[should_panic(expected = "stale handle")]
fn stale_handle_into_reused_slot_panics() {
    let mut heap = Heap::new();
    let old = heap.alloc_int(1).expect("alloc");
    heap.discard(old);
    let new = heap.alloc_int(2).expect("alloc");
    assert_eq!(old.index(), new.index());
    heap.grab(old);
}

#[test]
#[should_panic(expected = "still holding")]
fn discard_of_referenced_node_panics() {
    let mut heap = Heap::new();
    let id = heap.alloc_int(1).expect("alloc");
    heap.grab(id);
    heap.discard(id);
}

// capacity

#[test]
fn node_limit_yields_alloc_error() {
    let mut heap = Heap::with_limit(Some(2));
    let a = heap.alloc_int(1).expect("alloc");
    let b = heap.alloc_int(2).expect("alloc");
    assert_eq!(
        heap.alloc_int(3),
        Err(AllocError::LimitReached { limit: 2 })
    );

    heap.discard(a);
    let c = heap.alloc_int(3).expect("slot freed");
    heap.discard(b);
    heap.discard(c);
    assert!(heap.shutdown().is_clean());
}

#[test]
fn alloc_error_display() {
    assert_eq!(
        AllocError::LimitReached { limit: 8 }.to_string(),
        "node limit of 8 reached"
    );
    assert_eq!(AllocError::Exhausted.to_string(), "node storage exhausted");
}

// shutdown audit

#[test]
fn balanced_run_reports_no_leaks() {
    let mut heap = Heap::new();
    for _ in 0..10 {
        let app = int_pair(&mut heap);
        heap.grab(app);
        heap.release(app);
    }
    let report = heap.shutdown();
    assert!(report.is_clean());
    assert_eq!(report.allocations, 40);
    assert_eq!(report.frees, 40);
}

#[test]
fn outstanding_blocks_are_reported() {
    let mut heap = Heap::new();
    let kept = heap.alloc_int(7).expect("alloc");
    heap.grab(kept);
    let freed = heap.alloc_int(8).expect("alloc");
    heap.discard(freed);

    let report = heap.shutdown();
    assert_eq!(report.allocations, 2);
    assert_eq!(report.frees, 1);
    assert_eq!(
        report.leaks,
        vec![LeakedBlock {
            id: kept,
            label: "int",
            refs: 1,
        }]
    );
}
