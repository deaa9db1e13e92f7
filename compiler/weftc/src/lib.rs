//! Driver for the weft macro expander.
//!
//! The `weft` binary is a thin argument parser over [`commands`]; everything
//! it does is reachable from here so the commands can be tested in-process.

pub mod commands;
mod diagnostic;

use std::sync::Once;

pub use diagnostic::{render_error, ColorMode};

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber.
///
/// Does nothing unless `WEFT_LOG` (or `RUST_LOG`) is set, e.g.
/// `WEFT_LOG=weft_expand=debug`. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};
        use tracing_tree::HierarchicalLayer;

        let Some(directives) = log_directives(|var| std::env::var(var).ok()) else {
            return;
        };
        tracing_subscriber::registry()
            .with(
                HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_writer(std::io::stderr),
            )
            .with(EnvFilter::new(directives))
            .init();
    });
}

/// Filter directives from the first logging variable that is set.
fn log_directives(var: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["WEFT_LOG", "RUST_LOG"].into_iter().find_map(var)
}
