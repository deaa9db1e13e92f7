use super::*;

#[test]
fn lookup_walks_parents() {
    let globals = LocalScope::new(Scope::new());
    globals.borrow_mut().define("x", Value::Int(1));
    let locals = LocalScope::new(Scope::with_parent(globals.clone()));
    locals.borrow_mut().define("y", Value::Int(2));

    let scope = locals.borrow();
    assert!(scope.lookup("x").is_some_and(|v| v.equals(&Value::Int(1))));
    assert!(scope.lookup("y").is_some_and(|v| v.equals(&Value::Int(2))));
    assert!(scope.lookup("z").is_none());
    assert!(scope.get("x").is_none());
    assert!(scope.contains("y"));
}

#[test]
fn inner_binding_shadows_outer() {
    let outer = LocalScope::new(Scope::new());
    outer.borrow_mut().define("x", Value::Int(1));
    let inner = LocalScope::new(Scope::with_parent(outer.clone()));
    inner.borrow_mut().define("x", Value::Int(2));

    assert!(inner.borrow().lookup("x").is_some_and(|v| v.equals(&Value::Int(2))));
    assert!(outer.borrow().lookup("x").is_some_and(|v| v.equals(&Value::Int(1))));
}

#[test]
fn later_bindings_are_visible_through_shared_handles() {
    let globals = LocalScope::new(Scope::new());
    let frame = LocalScope::new(Scope::with_parent(globals.clone()));
    globals.borrow_mut().define("late", Value::Bool(true));
    assert!(frame.borrow().lookup("late").is_some());
}

#[test]
fn closures_skip_class_bodies() {
    let module = LocalScope::new(Scope::new());
    let class = LocalScope::new(Scope::class_body(module.clone()));
    let captured = closure_scope(&class);
    module.borrow_mut().define("marker", Value::None);
    assert!(captured.borrow().contains("marker"));
    assert!(!captured.borrow().is_class_body());
}

#[test]
fn names_are_sorted() {
    let mut scope = Scope::new();
    scope.define("b", Value::None);
    scope.define("a", Value::None);
    assert_eq!(scope.names(), ["a", "b"]);
    assert!(scope.remove("a").is_some());
    assert_eq!(scope.bindings().count(), 1);
}
