//! End-to-end tests over the in-memory store: the full write path and the
//! read-side aggregation pipeline.


mod lifecycle;
mod submit;
mod watch;
