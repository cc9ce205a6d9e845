/*!
 * Monitoring
 * Structured tracing for native calls and bridge operations
 */

mod tracer;

pub use tracer::{
    generate_trace_id, init_tracing, span_native, span_operation, NativeSpan, OperationSpan,
};
