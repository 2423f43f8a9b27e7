//! tksc-drv - The batch token resolver and public API.
//!
//! Entry points:
//! - [`interpret`] evaluates a single script against a reference map.
//! - [`resolve`] takes a flat `name → expression` map, builds the
//!   dependency graph from the parser's reference sets, and drains it in
//!   topological order with one long-lived interpreter. Failures are
//!   captured per token; the batch always completes.
//! - [`dtcg`] flattens nested DTCG documents (and their `$themes`) into
//!   the flat maps `resolve` consumes.

pub mod dtcg;
pub mod resolver;

pub use resolver::{
    render_value, resolve, ResolveOutput, ResolvedToken, Resolver, TokenError, TokenErrorKind,
};
pub use tksc_interp::{interpret, EvalError, RefEntry, References};
pub use tksc_spec::Config;
