#![allow(
    clippy::expect_used,
    reason = "test code uses expect for concise setup"
)]

use pretty_assertions::assert_eq;

use crate::{Edge, Heap, Ident, Location, NodeId, NodeKind};

fn var(heap: &mut Heap, name: &str) -> NodeId {
    heap.alloc_var(Ident::new(name)).expect("alloc")
}

fn list(heap: &mut Heap, items: &[NodeId]) -> NodeId {
    heap.list_from(items).expect("alloc").expect("non-empty")
}

fn app(heap: &mut Heap, func: NodeId, args: &[NodeId]) -> NodeId {
    let args = list(heap, args);
    heap.alloc_application(func, args).expect("alloc")
}

/// `lambda x y.(add x y)`, grabbed.
fn add_xy(heap: &mut Heap) -> NodeId {
    let params = [var(heap, "x"), var(heap, "y")];
    let vars = list(heap, &params);
    let add = var(heap, "add");
    let x = var(heap, "x");
    let y = var(heap, "y");
    let body = app(heap, add, &[x, y]);
    let abs = heap.alloc_abstraction(vars, body).expect("alloc");
    heap.grab(abs)
}

fn chain_len(heap: &Heap, param: NodeId) -> usize {
    let mut len = 0;
    let mut link = heap.var_next(param);
    while let Some(loc) = link {
        len += 1;
        link = heap.var_next(heap.child_at(loc));
    }
    len
}

fn params(heap: &Heap, abs: NodeId) -> Vec<NodeId> {
    heap.list_items(heap.abstraction_parts(abs).vars).collect()
}

// chain linking

#[test]
fn each_parameter_links_its_occurrences() {
    let mut heap = Heap::new();
    let abs = add_xy(&mut heap);
    let parts = heap.abstraction_parts(abs);
    assert_eq!(parts.arity, 2);

    let [x, y] = params(&heap, abs)[..] else {
        panic!("two parameters")
    };
    assert_eq!(chain_len(&heap, x), 1);
    assert_eq!(chain_len(&heap, y), 1);

    let x_slot = heap.var_next(x).expect("linked");
    assert_eq!(x_slot.edge, Edge::Head);
    assert_eq!(heap.display(heap.child_at(x_slot)).to_string(), "x");

    heap.release(abs);
    assert_eq!(heap.live(), 0);
}

#[test]
fn repeated_occurrences_form_one_chain() {
    let mut heap = Heap::new();
    let x = var(&mut heap, "x");
    let vars = list(&mut heap, &[x]);
    let mul = var(&mut heap, "mul");
    let x1 = var(&mut heap, "x");
    let x2 = var(&mut heap, "x");
    let body = app(&mut heap, mul, &[x1, x2]);
    let abs = heap.alloc_abstraction(vars, body).expect("alloc");
    heap.grab(abs);

    assert_eq!(chain_len(&heap, x), 2);
    heap.release(abs);
}

#[test]
fn body_that_is_the_variable_links_body_slot() {
    let mut heap = Heap::new();
    let x = var(&mut heap, "x");
    let vars = list(&mut heap, &[x]);
    let body = var(&mut heap, "x");
    let abs = heap.alloc_abstraction(vars, body).expect("alloc");
    heap.grab(abs);

    assert_eq!(heap.var_next(x), Some(Location::new(abs, Edge::Body)));
    heap.release(abs);
}

#[test]
fn operator_position_is_linked() {
    let mut heap = Heap::new();
    let f = var(&mut heap, "f");
    let vars = list(&mut heap, &[f]);
    let f_use = var(&mut heap, "f");
    let one = heap.alloc_int(1).expect("alloc");
    let body = app(&mut heap, f_use, &[one]);
    let abs = heap.alloc_abstraction(vars, body).expect("alloc");
    heap.grab(abs);

    assert_eq!(heap.var_next(f), Some(Location::new(body, Edge::Func)));
    heap.release(abs);
}

#[test]
fn nested_rebinding_hides_inner_body() {
    // lambda x.(f x lambda x.x)
    let mut heap = Heap::new();
    let x_outer = var(&mut heap, "x");
    let outer_vars = list(&mut heap, &[x_outer]);

    let x_inner = var(&mut heap, "x");
    let inner_vars = list(&mut heap, &[x_inner]);
    let inner_body = var(&mut heap, "x");
    let inner = heap.alloc_abstraction(inner_vars, inner_body).expect("alloc");

    let f = var(&mut heap, "f");
    let x_use = var(&mut heap, "x");
    let body = app(&mut heap, f, &[x_use, inner]);
    let outer = heap.alloc_abstraction(outer_vars, body).expect("alloc");
    heap.grab(outer);

    assert_eq!(chain_len(&heap, x_outer), 1);
    assert_eq!(chain_len(&heap, x_inner), 1);
    assert_eq!(
        heap.var_next(x_inner),
        Some(Location::new(inner, Edge::Body))
    );
    heap.release(outer);
    assert_eq!(heap.live(), 0);
}

#[test]
fn nested_abstraction_sees_outer_parameter() {
    // lambda x.lambda y.(x y)
    let mut heap = Heap::new();
    let x = var(&mut heap, "x");
    let outer_vars = list(&mut heap, &[x]);
    let y = var(&mut heap, "y");
    let inner_vars = list(&mut heap, &[y]);
    let x_use = var(&mut heap, "x");
    let y_use = var(&mut heap, "y");
    let inner_body = app(&mut heap, x_use, &[y_use]);
    let inner = heap.alloc_abstraction(inner_vars, inner_body).expect("alloc");
    let outer = heap.alloc_abstraction(outer_vars, inner).expect("alloc");
    heap.grab(outer);

    assert_eq!(
        heap.var_next(x),
        Some(Location::new(inner_body, Edge::Func))
    );
    heap.release(outer);
}

#[test]
fn repeated_parameter_name_binds_last() {
    let mut heap = Heap::new();
    let first = var(&mut heap, "x");
    let second = var(&mut heap, "x");
    let vars = list(&mut heap, &[first, second]);
    let body = var(&mut heap, "x");
    let abs = heap.alloc_abstraction(vars, body).expect("alloc");
    heap.grab(abs);

    assert_eq!(heap.var_next(first), None);
    assert_eq!(chain_len(&heap, second), 1);
    heap.release(abs);
}

#[test]
#[should_panic(expected = "abstraction parameter")]
fn non_variable_parameter_panics() {
    let mut heap = Heap::new();
    let one = heap.alloc_int(1).expect("alloc");
    let vars = list(&mut heap, &[one]);
    let body = heap.alloc_int(2).expect("alloc");
    let _ = heap.alloc_abstraction(vars, body);
}

// substitution

#[test]
fn substitute_rewrites_every_occurrence() {
    let mut heap = Heap::new();
    let x = var(&mut heap, "x");
    let vars = list(&mut heap, &[x]);
    let mul = var(&mut heap, "mul");
    let x1 = var(&mut heap, "x");
    let x2 = var(&mut heap, "x");
    let body = app(&mut heap, mul, &[x1, x2]);
    let abs = heap.alloc_abstraction(vars, body).expect("alloc");
    heap.grab(abs);

    let six = heap.alloc_int(6).expect("alloc");
    heap.grab(six);
    heap.substitute(x, six);

    assert_eq!(heap.display(body).to_string(), "(mul 6 6)");
    assert_eq!(heap.ref_count(six), 3);
    assert_eq!(heap.var_next(x), None);

    heap.release(six);
    heap.release(abs);
    assert_eq!(heap.live(), 0);
}

#[test]
fn partial_application_leaves_remaining_parameter() {
    let mut heap = Heap::new();
    let abs = add_xy(&mut heap);
    let [x, _] = params(&heap, abs)[..] else {
        panic!("two parameters")
    };

    let one = heap.alloc_int(1).expect("alloc");
    heap.grab(one);
    heap.substitute(x, one);
    heap.release(one);
    heap.abstraction_drop_params(abs, 1);

    let parts = heap.abstraction_parts(abs);
    assert_eq!(parts.arity, 1);
    assert_eq!(heap.list_len(parts.vars), 1);
    assert_eq!(heap.display(abs).to_string(), "lambda y.(add 1 y)");

    let [y] = params(&heap, abs)[..] else {
        panic!("one parameter")
    };
    assert_eq!(chain_len(&heap, y), 1);

    heap.release(abs);
    assert_eq!(heap.live(), 0);
}

#[test]
fn substituted_variable_is_not_captured() {
    // (lambda x y.(add x y)) y  leaves the argument y unbound
    let mut heap = Heap::new();
    let abs = add_xy(&mut heap);
    let [x, y] = params(&heap, abs)[..] else {
        panic!("two parameters")
    };

    let free_y = var(&mut heap, "y");
    heap.grab(free_y);
    heap.substitute(x, free_y);
    heap.abstraction_drop_params(abs, 1);

    assert_eq!(chain_len(&heap, y), 1);
    let seven = heap.alloc_int(7).expect("alloc");
    heap.grab(seven);
    heap.substitute(y, seven);
    assert_eq!(
        heap.display(heap.abstraction_parts(abs).body).to_string(),
        "(add y 7)"
    );

    heap.release(seven);
    heap.release(free_y);
    heap.release(abs);
    assert_eq!(heap.live(), 0);
}

#[test]
fn substitute_into_empty_chain_is_noop() {
    let mut heap = Heap::new();
    let x = var(&mut heap, "x");
    let vars = list(&mut heap, &[x]);
    let body = heap.alloc_int(3).expect("alloc");
    let abs = heap.alloc_abstraction(vars, body).expect("alloc");
    heap.grab(abs);

    let arg = heap.alloc_int(4).expect("alloc");
    heap.grab(arg);
    heap.substitute(x, arg);
    assert_eq!(heap.ref_count(arg), 1);
    assert!(matches!(heap.kind(body), NodeKind::Int(3)));

    heap.release(arg);
    heap.release(abs);
}

#[test]
#[should_panic(expected = "dropping 2 of 2")]
fn dropping_every_parameter_panics() {
    let mut heap = Heap::new();
    let abs = add_xy(&mut heap);
    heap.abstraction_drop_params(abs, 2);
}
