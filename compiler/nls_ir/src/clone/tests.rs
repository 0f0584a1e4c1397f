#![allow(
    clippy::expect_used,
    reason = "test code uses expect for concise setup"
)]

use pretty_assertions::assert_eq;

use crate::{AllocError, Edge, Heap, Ident, Location, NodeId};

fn var(heap: &mut Heap, name: &str) -> NodeId {
    heap.alloc_var(Ident::new(name)).expect("alloc")
}

fn list(heap: &mut Heap, items: &[NodeId]) -> NodeId {
    heap.list_from(items).expect("alloc").expect("non-empty")
}

/// `lambda x.(mul x x)` with zero references.
fn square(heap: &mut Heap) -> NodeId {
    let x = var(heap, "x");
    let vars = list(heap, &[x]);
    let mul = var(heap, "mul");
    let x1 = var(heap, "x");
    let x2 = var(heap, "x");
    let args = list(heap, &[x1, x2]);
    let body = heap.alloc_application(mul, args).expect("alloc");
    heap.alloc_abstraction(vars, body).expect("alloc")
}

/// `lambda x.x` with zero references.
fn identity(heap: &mut Heap) -> NodeId {
    let x = var(heap, "x");
    let vars = list(heap, &[x]);
    let body = var(heap, "x");
    heap.alloc_abstraction(vars, body).expect("alloc")
}

fn first_param(heap: &Heap, abs: NodeId) -> NodeId {
    heap.list_items(heap.abstraction_parts(abs).vars)
        .next()
        .expect("one parameter")
}

// deep_clone

#[test]
fn clone_copies_every_node() {
    let mut heap = Heap::new();
    let original = square(&mut heap);
    heap.grab(original);
    let before = heap.live();

    let copy = heap.deep_clone(original).expect("alloc");
    heap.grab(copy);
    assert_eq!(heap.live(), before * 2);
    assert_eq!(heap.display(copy).to_string(), "lambda x.(mul x x)");

    heap.release(copy);
    heap.release(original);
    assert_eq!(heap.live(), 0);
}

#[test]
fn clone_chains_do_not_alias_original() {
    let mut heap = Heap::new();
    let original = square(&mut heap);
    heap.grab(original);
    let copy = heap.deep_clone(original).expect("alloc");
    heap.grab(copy);

    let copy_x = first_param(&heap, copy);
    let link = heap.var_next(copy_x).expect("linked");
    let copy_body = heap.abstraction_parts(copy).body;
    let copy_args = heap.kind(copy_body).children()[1];
    assert_eq!(link, Location::new(copy_args, Edge::Head));

    let three = heap.alloc_int(3).expect("alloc");
    heap.grab(three);
    heap.substitute(copy_x, three);
    heap.release(three);

    assert_eq!(heap.display(copy_body).to_string(), "(mul 3 3)");
    assert_eq!(heap.display(original).to_string(), "lambda x.(mul x x)");

    let original_x = first_param(&heap, original);
    let four = heap.alloc_int(4).expect("alloc");
    heap.grab(four);
    heap.substitute(original_x, four);
    heap.release(four);
    assert_eq!(
        heap.display(heap.abstraction_parts(original).body).to_string(),
        "(mul 4 4)"
    );

    heap.release(copy);
    heap.release(original);
    assert_eq!(heap.live(), 0);
}

#[test]
fn clone_preserves_internal_sharing() {
    let mut heap = Heap::new();
    let shared = heap.alloc_int(5).expect("alloc");
    let pair = list(&mut heap, &[shared, shared]);
    heap.grab(pair);
    assert_eq!(heap.ref_count(shared), 2);

    let copy = heap.deep_clone(pair).expect("alloc");
    heap.grab(copy);
    let items: Vec<_> = heap.list_items(copy).collect();
    assert_eq!(items[0], items[1]);
    assert_ne!(items[0], shared);
    assert_eq!(heap.ref_count(items[0]), 2);

    heap.release(copy);
    heap.release(pair);
    assert_eq!(heap.live(), 0);
}

#[test]
fn clone_splits_shared_variables() {
    let mut heap = Heap::new();
    let x = var(&mut heap, "x");
    let body = list(&mut heap, &[x, x]);
    heap.grab(body);

    let copy = heap.deep_clone(body).expect("alloc");
    let items: Vec<_> = heap.list_items(copy).collect();
    assert_ne!(items[0], items[1]);

    // Both copies join the new abstraction's chain.
    let param = var(&mut heap, "x");
    let vars = list(&mut heap, &[param]);
    let abs = heap.alloc_abstraction(vars, copy).expect("alloc");
    heap.grab(abs);
    let seven = heap.alloc_int(7).expect("alloc");
    heap.substitute(param, seven);
    assert_eq!(heap.display(abs).to_string(), "lambda x.[7 7]");

    heap.release(abs);
    heap.release(body);
    assert_eq!(heap.live(), 0);
}

#[test]
fn clone_failure_leaves_nothing_behind() {
    let mut heap = Heap::with_limit(Some(10));
    let original = square(&mut heap);
    heap.grab(original);
    assert_eq!(heap.live(), 9);

    assert_eq!(
        heap.deep_clone(original),
        Err(AllocError::LimitReached { limit: 10 })
    );
    assert_eq!(heap.live(), 9);

    heap.release(original);
    assert!(heap.shutdown().is_clean());
}

// clone_into

#[test]
fn clone_into_rewrites_in_place() {
    let mut heap = Heap::new();
    let value = square(&mut heap);
    heap.grab(value);
    let slot = var(&mut heap, "sq");
    heap.grab(slot);

    heap.clone_into(slot, value).expect("alloc");
    assert_eq!(heap.display(slot).to_string(), "lambda x.(mul x x)");

    let x = first_param(&heap, slot);
    assert_eq!(
        heap.var_next(x).map(|loc| loc.edge),
        Some(Edge::Head)
    );

    heap.release(value);
    heap.release(slot);
    assert_eq!(heap.live(), 0);
}

// overwrite

#[test]
fn overwrite_moves_unique_value_and_retargets_chain() {
    let mut heap = Heap::new();
    let slot = heap.alloc_int(0).expect("alloc");
    heap.grab(slot);
    let id = identity(&mut heap);
    heap.grab(id);
    let live = heap.live();

    heap.overwrite(slot, id).expect("alloc");
    assert_eq!(heap.live(), live - 1);
    assert_eq!(heap.display(slot).to_string(), "lambda x.x");

    let x = first_param(&heap, slot);
    assert_eq!(heap.var_next(x), Some(Location::new(slot, Edge::Body)));

    let nine = heap.alloc_int(9).expect("alloc");
    heap.grab(nine);
    heap.substitute(x, nine);
    heap.release(nine);
    assert_eq!(heap.display(slot).to_string(), "lambda x.9");

    heap.release(slot);
    assert_eq!(heap.live(), 0);
}

#[test]
fn overwrite_copies_shared_value() {
    let mut heap = Heap::new();
    let slot = heap.alloc_int(0).expect("alloc");
    heap.grab(slot);
    let value = identity(&mut heap);
    heap.grab(value);
    heap.grab(value);

    heap.overwrite(slot, value).expect("alloc");
    assert_eq!(heap.ref_count(value), 1);
    assert_eq!(heap.display(slot).to_string(), "lambda x.x");

    let x = first_param(&heap, slot);
    assert_eq!(heap.var_next(x), Some(Location::new(slot, Edge::Body)));

    heap.release(value);
    heap.release(slot);
    assert_eq!(heap.live(), 0);
}

#[test]
fn overwrite_with_descendant_releases_rest_of_slot() {
    // [1 [2 3]] overwritten by its own second element
    let mut heap = Heap::new();
    let two = heap.alloc_int(2).expect("alloc");
    let three = heap.alloc_int(3).expect("alloc");
    let inner = list(&mut heap, &[two, three]);
    let one = heap.alloc_int(1).expect("alloc");
    let outer = list(&mut heap, &[one, inner]);
    heap.grab(outer);

    heap.grab(inner);
    heap.overwrite(outer, inner).expect("alloc");
    assert_eq!(heap.display(outer).to_string(), "[2 3]");
    assert_eq!(heap.live(), 4);

    heap.release(outer);
    assert_eq!(heap.live(), 0);
}
