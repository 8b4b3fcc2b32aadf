//! The document an annotation pass reads from and writes to.

mod html;
pub mod style;

pub use html::HtmlPage;
pub use style::StyleOverride;

use scraper::Selector;

/// An element selected for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<H> {
    /// Handle the page uses to find the element again.
    pub handle: H,
    /// Position among the selector's matches, in document order.
    pub index: usize,
    /// Rendered text of the element (may be empty).
    pub text: String,
}

/// A mutable document the annotator can query and restyle.
pub trait Page {
    type Handle;

    /// All elements matching `selector`, in document order.
    fn candidates(&self, selector: &Selector) -> Vec<Candidate<Self::Handle>>;

    /// Force `style` onto the element. Returns `false` if the element is gone.
    fn apply_style(&mut self, handle: &Self::Handle, style: &StyleOverride) -> bool;
}
