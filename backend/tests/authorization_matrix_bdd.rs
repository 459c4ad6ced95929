//! Behaviour tests for the route-table authorization gate.
//!
//! Each scenario drives the full middleware stack with in-memory adapters
//! and checks the status an actor receives for a handful of routes.

#[path = "support/stack.rs"]
#[allow(dead_code, reason = "Shared stack helpers are used by other suites.")]
mod stack;
#[path = "support/world.rs"]
#[allow(dead_code, reason = "Shared world helpers are used by other suites.")]
mod api_world;
#[path = "support/http_steps.rs"]
mod http_steps;

use rstest::fixture;
use rstest_bdd_macros::{scenario, then};
use api_world::ApiWorld;

#[fixture]
fn world() -> ApiWorld {
    ApiWorld::new()
}

#[then("the error body is absent")]
fn the_error_body_is_absent(world: &ApiWorld) {
    assert!(world.last_json().get("error").is_none());
}

#[scenario(
    path = "tests/features/authorization_matrix.feature",
    name = "Anonymous visitors read published content only"
)]
fn anonymous_visitors_read_published_content_only(world: ApiWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/authorization_matrix.feature",
    name = "Students are kept out of the back office"
)]
fn students_are_kept_out_of_the_back_office(world: ApiWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/authorization_matrix.feature",
    name = "Staff manage content and users"
)]
fn staff_manage_content_and_users(world: ApiWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/authorization_matrix.feature",
    name = "Denials carry the error envelope"
)]
fn denials_carry_the_error_envelope(world: ApiWorld) {
    drop(world);
}
