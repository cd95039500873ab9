use validation::Diagnostic;

/// Text-editing surface bound to the document.
pub trait EditorSurface {
    /// Replaces the displayed text. Called only for changes that did not
    /// originate in the editor itself.
    fn set_text(&mut self, text: &str);

    /// Replaces the line annotations; an empty slice clears them.
    fn set_diagnostics(&mut self, diagnostics: &[Diagnostic]);
}
