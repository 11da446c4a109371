//! Hook system: typed keys, registry, action dispatcher and filter pipeline.

pub mod bus;
pub mod dispatcher;
pub mod handler;
pub mod key;
pub mod pipeline;
pub mod registry;

pub use bus::HookBus;
pub use dispatcher::{DispatchOutcome, HookDispatcher};
pub use handler::{ActionHandler, FilterHandler, HookKind, Signature};
pub use key::{ActionKey, FilterKey};
pub use pipeline::FilterPipeline;
pub use registry::{HandlerId, HandlerInfo, HookRegistry};
