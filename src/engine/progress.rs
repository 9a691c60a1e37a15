//! Progress counter for archive runs (verbose only).

use kdam::{Animation, Bar, BarExt};

/// Counter for unknown total (shows count without percentage).
pub fn create_counter(desc: &'static str) -> Bar {
    kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " channels"
    )
}

/// Move the counter to `n` processed channels. Display errors are ignored.
pub fn set_counter(bar: &mut Bar, n: usize) {
    let _ = bar.update_to(n);
}
