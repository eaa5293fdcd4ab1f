//! Cyclic module interface
//!
//! Modules which are initialised once from a parameter file and then called
//! repeatedly with new inputs (such as `arm_ctrl`) implement [`State`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A module with internal state, initialised once and processed per cycle.
pub trait State {
    /// What `init` needs, usually the name of the module's parameter file.
    type InitData;
    type InitError;

    type InputData;
    type OutputData;

    /// Diagnostics from the last call to `proc`, such as which limits were hit.
    type StatusReport;
    type ProcError;

    /// Initialise the module, loading its parameters. The session is given so
    /// that the module can create any archives it needs.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Process one input, returning the output and a status report.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
