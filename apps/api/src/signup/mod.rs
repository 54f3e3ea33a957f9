// Signup capture for /email: validation, the in-memory append-only log,
// and the route handler. Durable storage is out of scope; the log lives
// as long as the process.

pub mod handlers;
pub mod store;
