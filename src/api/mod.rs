// Typed backend operations
// Each submodule adds an `impl ApiClient` block for one backend area

mod analytics;
mod auth;
mod bookings;
mod chc;
mod machines;
mod usage;
