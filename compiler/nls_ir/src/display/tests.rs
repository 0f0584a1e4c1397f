#![allow(
    clippy::expect_used,
    reason = "test code uses expect for concise setup"
)]

use pretty_assertions::assert_eq;

use crate::{Builtin, Heap, Ident, NodeId};

fn list(heap: &mut Heap, items: &[NodeId]) -> NodeId {
    heap.list_from(items).expect("alloc").expect("non-empty")
}

#[test]
fn leaves_print_bare() {
    let mut heap = Heap::new();
    let int = heap.alloc_int(-42).expect("alloc");
    let var = heap.alloc_var(Ident::new("x")).expect("alloc");
    let func = heap
        .alloc_function(Ident::new("add"), Builtin::Add)
        .expect("alloc");

    assert_eq!(heap.display(int).to_string(), "-42");
    assert_eq!(heap.display(var).to_string(), "x");
    assert_eq!(heap.display(func).to_string(), "add");
}

#[test]
fn application_is_parenthesized() {
    let mut heap = Heap::new();
    let func = heap
        .alloc_function(Ident::new("+"), Builtin::Add)
        .expect("alloc");
    let a = heap.alloc_int(3).expect("alloc");
    let b = heap.alloc_int(4).expect("alloc");
    let args = list(&mut heap, &[a, b]);
    let app = heap.alloc_application(func, args).expect("alloc");

    assert_eq!(heap.display(app).to_string(), "(+ 3 4)");
}

#[test]
fn abstraction_lists_parameters() {
    let mut heap = Heap::new();
    let x = heap.alloc_var(Ident::new("x")).expect("alloc");
    let y = heap.alloc_var(Ident::new("y")).expect("alloc");
    let vars = list(&mut heap, &[x, y]);
    let body = heap.alloc_var(Ident::new("y")).expect("alloc");
    let abs = heap.alloc_abstraction(vars, body).expect("alloc");

    assert_eq!(heap.display(abs).to_string(), "lambda x y.y");
}

#[test]
fn list_uses_brackets() {
    let mut heap = Heap::new();
    let one = heap.alloc_int(1).expect("alloc");
    let two = heap.alloc_int(2).expect("alloc");
    let inner = list(&mut heap, &[two]);
    let outer = list(&mut heap, &[one, inner]);

    assert_eq!(heap.display(outer).to_string(), "[1 [2]]");
}

#[test]
fn debug_prefixes_handle() {
    let mut heap = Heap::new();
    let int = heap.alloc_int(8).expect("alloc");
    assert_eq!(format!("{:?}", heap.display(int)), "NodeId(0v0) = 8");
}

#[test]
fn deep_nesting_prints() {
    let mut heap = Heap::new();
    let mut node = heap.alloc_int(0).expect("alloc");
    for _ in 0..20_000 {
        node = heap.list(node).expect("alloc");
    }
    let text = heap.display(node).to_string();
    assert_eq!(text.len(), 1 + 2 * 20_000);
    assert!(text.starts_with("[[[") && text.ends_with("0]]]"));
}
