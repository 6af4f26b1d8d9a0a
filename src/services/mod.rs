//! Service layer: pure pipeline logic on top of the domain ports.

pub mod decision;
pub mod eval;
pub mod prompts;
pub mod repair_loop;
pub mod snippets;
pub mod workspace;

pub use decision::{DecisionContext, DecisionPolicy};
pub use eval::{BugCase, CaseResult, EvalHarness};
pub use repair_loop::RepairLoop;
pub use workspace::{WorkspaceInfo, WorkspaceService};
