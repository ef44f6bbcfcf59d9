use crate::{Flow, Result, Scanner};

/// The user code of a scanner.
///
/// [`RuleActions::on_match`] is called once per accepted match. It is the only place where the
/// editing operations of the [`Scanner`] (`input`, `unput`, `less`, `more`, `echo`, `begin`) are
/// meaningful.
///
/// Closures of the form `FnMut(usize, &mut Scanner) -> Result<Flow>` implement this trait with
/// the default wrap hook.
pub trait RuleActions<'t, R, W> {
    /// Runs the action of `rule`. The matched text is available through [`Scanner::text`].
    fn on_match(&mut self, rule: usize, scanner: &mut Scanner<'t, R, W>) -> Result<Flow>;

    /// Called when the input is exhausted. Returning `true` ends scanning. Returning `false`
    /// continues scanning, which is only useful after switching the scanner to a new source with
    /// [`Scanner::restart`].
    fn wrap(&mut self, scanner: &mut Scanner<'t, R, W>) -> Result<bool> {
        let _ = scanner;
        Ok(true)
    }
}

impl<'t, R, W, F> RuleActions<'t, R, W> for F
where
    F: FnMut(usize, &mut Scanner<'t, R, W>) -> Result<Flow>,
{
    fn on_match(&mut self, rule: usize, scanner: &mut Scanner<'t, R, W>) -> Result<Flow> {
        self(rule, scanner)
    }
}
