/// View rendering
///
/// `view` projects the store into a serializable `BoardView`; `text` draws
/// that board for a terminal.

pub mod text;
pub mod view;

pub use text::render_text;
pub use view::*;

/// Pick the singular or plural word for `count`
pub fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
