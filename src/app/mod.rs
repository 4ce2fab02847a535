// Dispatch entry points: the timed demo script and the HTTP endpoint.

pub mod http;
pub mod script;
