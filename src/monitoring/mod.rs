/*!
 * Monitoring
 * Tracing subscriber setup for lock diagnostics
 */

mod tracer;

pub use tracer::{init_tracing, try_init_tracing};
