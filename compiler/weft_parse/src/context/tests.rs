use super::*;

#[test]
fn function_body_hides_enclosing_loop() {
    let ctx = ParseContext::default().enter_loop().enter_function();
    assert!(ctx.in_function());
    assert!(!ctx.in_loop());
}

#[test]
fn class_body_resets_everything() {
    let ctx = ParseContext::class_body();
    assert!(!ctx.in_function());
    assert!(!ctx.in_loop());
    assert!(ctx.contains(ParseContext::IN_CLASS));
}

#[test]
fn loop_inside_function_keeps_both() {
    let ctx = ParseContext::default().enter_function().enter_loop();
    assert!(ctx.in_function() && ctx.in_loop());
}
