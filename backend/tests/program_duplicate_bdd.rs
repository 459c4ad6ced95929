//! Behaviour tests for the program duplicate check.

#[path = "support/stack.rs"]
#[allow(dead_code, reason = "Shared stack helpers are used by other suites.")]
mod stack;
#[path = "support/world.rs"]
#[allow(dead_code, reason = "Shared world helpers are used by other suites.")]
mod api_world;
#[path = "support/http_steps.rs"]
mod http_steps;

use actix_web::test::TestRequest;
use rstest::fixture;
use rstest_bdd_macros::{scenario, then, when};
use serde_json::{Value, json};
use api_world::ApiWorld;

#[fixture]
fn world() -> ApiWorld {
    ApiWorld::new()
}

#[when("they create the program \"{name}\" at level \"{level}\"")]
fn they_create_the_program(world: &ApiWorld, name: String, level: String) {
    let university_id = world.recall("university");
    world.send(TestRequest::post().uri("/api/programs").set_json(json!({
        "university_id": university_id,
        "name": name,
        "level": level,
        "duration": "1 year",
    })));
}

#[then("exactly one \"{name}\" program is listed with its university")]
fn exactly_one_program_is_listed(world: &ApiWorld, name: String) {
    assert_eq!(world.send_method("GET", "/api/programs"), 200);
    let listed = world.last_json();
    let matching: Vec<&Value> = listed
        .as_array()
        .expect("program list")
        .iter()
        .filter(|program| program["name"] == name.as_str())
        .collect();
    assert_eq!(matching.len(), 1, "programs: {listed}");
    let university = &matching[0]["university"];
    assert_eq!(university["id"], world.recall("university").as_str());
    assert_eq!(university["name"], "University of Edinburgh");
}

#[scenario(
    path = "tests/features/program_duplicate.feature",
    name = "A second program with the same identity is rejected"
)]
fn a_second_program_with_the_same_identity_is_rejected(world: ApiWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/program_duplicate.feature",
    name = "The same name at another level is a different program"
)]
fn the_same_name_at_another_level_is_a_different_program(world: ApiWorld) {
    drop(world);
}
