//! Auxiliary status line under the grid.

use super::TableSession;

impl TableSession {
    /// Replaces the footer content with `html`, creating the footer on first use.
    pub fn write_footer(&self, html: &str) {
        if let Ok(mut footer) = self.inner.footer.write() {
            *footer = Some(html.to_string());
        }
        match self.grid() {
            Ok(grid) => grid.set_extra_footer(html),
            Err(e) => log::warn!("{}: footer not rendered: {}", self.mount(), e),
        }
    }

    /// Last footer content written, if any.
    pub fn footer(&self) -> Option<String> {
        self.inner
            .footer
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}
