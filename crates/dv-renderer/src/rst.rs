//! reStructuredText converter.

use crate::{Converter, RenderError};

/// reStructuredText to HTML converter, producing a body fragment.
pub struct RstConverter;

impl Converter for RstConverter {
    fn convert(&self, text: &str) -> Result<String, RenderError> {
        let document = rst_parser::parse(text).map_err(|e| RenderError::Rst(e.to_string()))?;

        let mut output = Vec::with_capacity(text.len() * 2);
        rst_renderer::render_html(&document, &mut output, false)
            .map_err(|e| RenderError::Rst(e.to_string()))?;

        String::from_utf8(output).map_err(|e| RenderError::Rst(e.to_string()))
    }
}
