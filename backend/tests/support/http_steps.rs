//! Step definitions shared by the HTTP behaviour suites.

use abroad::domain::Role;
use actix_web::test::TestRequest;
use rstest_bdd_macros::{given, then, when};
use serde_json::json;

use crate::api_world::ApiWorld;

fn create_university(world: &ApiWorld, name: &str) -> u16 {
    let status = world.send(
        TestRequest::post()
            .uri("/api/universities")
            .set_json(json!({ "name": name, "country": "United Kingdom" })),
    );
    if status == 201 {
        let id = world.last_json()["id"]
            .as_str()
            .expect("university id")
            .to_owned();
        world.remember("university", id);
    }
    status
}

#[given("an anonymous visitor")]
fn an_anonymous_visitor(world: &ApiWorld) {
    world.act_as(None);
}

#[given("a signed-in {actor}")]
fn a_signed_in_actor(world: &ApiWorld, actor: String) {
    let role = actor.parse().unwrap_or(Role::User);
    world.sign_in_as(&actor, role);
}

#[given("a university named \"{name}\"")]
fn a_university_named(world: &ApiWorld, name: String) {
    assert_eq!(create_university(world, &name), 201);
}

#[when("they send {method} to {path}")]
fn they_send(world: &ApiWorld, method: String, path: String) {
    world.send_method(&method, &path);
}

#[when("they create a university named \"{name}\"")]
fn they_create_a_university(world: &ApiWorld, name: String) {
    create_university(world, &name);
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &ApiWorld, status: u16) {
    let body = world.with_last(|captured| String::from_utf8_lossy(&captured.body).into_owned());
    assert_eq!(world.last_status(), status, "unexpected status, body: {body}");
}

#[then("the error code is \"{code}\"")]
fn the_error_code_is(world: &ApiWorld, code: String) {
    assert_eq!(world.last_json()["code"], code.as_str());
}
