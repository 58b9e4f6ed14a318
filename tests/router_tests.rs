use std::sync::Arc;

use http::Method;
use serde_json::{json, Value};

use restwire::{handler_fn, Handler, PathArgs, RegistrationError, Request, Router};

fn tagged_handler(tag: &'static str) -> Arc<dyn Handler> {
    handler_fn(move |_req, _args| Ok(json!({ "tag": tag })))
}

fn dispatch_tag(router: &Router, url: &str) -> String {
    let matched = router.resolve(url).expect("expected a route match");
    let content = matched
        .route
        .handler()
        .dispatch(&Request::new(url), &matched.path_args)
        .expect("handler failed");
    content["tag"].as_str().expect("tag missing").to_string()
}

#[test]
fn test_resolve_captures_args_in_declaration_order() {
    let mut router = Router::new();
    router
        .register(
            "user/profile/{user_name}",
            tagged_handler("profile"),
            "GET",
            None,
        )
        .unwrap();

    let matched = router.resolve("user/profile/alice/").unwrap();
    assert_eq!(matched.route.pattern(), "user/profile/{user_name}/");
    assert_eq!(matched.path_args.as_slice(), ["alice".to_string()]);
    assert_eq!(matched.route.param_names(), ["user_name".to_string()]);
}

#[test]
fn test_resolve_multiple_params() {
    let mut router = Router::new();
    router
        .register(
            "org/{org_id}/team/{team_id}",
            tagged_handler("team"),
            "GET",
            None,
        )
        .unwrap();

    let matched = router.resolve("org/acme/team/dev/").unwrap();
    assert_eq!(
        matched.path_args.as_slice(),
        ["acme".to_string(), "dev".to_string()]
    );
}

#[test]
fn test_first_registered_route_wins() {
    let mut router = Router::new();
    router
        .register("user/{id}", tagged_handler("first"), "GET", None)
        .unwrap();
    router
        .register("user/{name}", tagged_handler("second"), "GET", None)
        .unwrap();

    assert_eq!(dispatch_tag(&router, "user/42/"), "first");
}

#[test]
fn test_literal_route_does_not_shadow_later_param_route() {
    let mut router = Router::new();
    router
        .register("user/info", tagged_handler("info"), "GET", None)
        .unwrap();
    router
        .register("user/{id}", tagged_handler("by-id"), "GET", None)
        .unwrap();

    assert_eq!(dispatch_tag(&router, "user/info/"), "info");
    assert_eq!(dispatch_tag(&router, "user/7/"), "by-id");
}

#[test]
fn test_resolve_unknown_url_returns_none() {
    let mut router = Router::new();
    router
        .register("user/info", tagged_handler("info"), "GET", None)
        .unwrap();

    assert!(router.resolve("does/not/exist/").is_none());
    // Segment counts must line up exactly.
    assert!(router.resolve("user/info/extra/").is_none());
}

#[test]
fn test_duplicate_name_rejected_without_partial_insert() {
    let mut router = Router::new();
    router
        .register("user/info", tagged_handler("info"), "GET", Some("user"))
        .unwrap();

    let err = router
        .register("user/detail", tagged_handler("detail"), "GET", Some("user"))
        .unwrap_err();
    assert_eq!(
        err,
        RegistrationError::DuplicateName {
            name: "user".to_string(),
            pattern: "user/info/".to_string(),
        }
    );

    // Route table and name index are untouched by the failed call.
    assert_eq!(router.len(), 1);
    assert_eq!(
        router.route_named("user").unwrap().pattern(),
        "user/info/"
    );
    assert!(router.resolve("user/detail/").is_none());
}

#[test]
fn test_same_path_second_registration_under_same_name_fails() {
    let mut router = Router::new();
    router
        .register("user/info", tagged_handler("get"), "GET", Some("user-info"))
        .unwrap();

    let err = router.register(
        "user/info",
        tagged_handler("post"),
        "POST",
        Some("user-info"),
    );
    assert!(matches!(err, Err(RegistrationError::DuplicateName { .. })));

    // The first registration still answers.
    assert_eq!(dispatch_tag(&router, "user/info/"), "get");
}

#[test]
fn test_method_set_forms() {
    let mut router = Router::new();
    router
        .register("a", tagged_handler("a"), "get", None)
        .unwrap();
    router
        .register("b", tagged_handler("b"), ["GET", "PUT"], None)
        .unwrap();
    router
        .register("c", tagged_handler("c"), Method::POST, None)
        .unwrap();

    let a = router.resolve("a/").unwrap();
    assert_eq!(a.route.methods(), [Method::GET]);
    let b = router.resolve("b/").unwrap();
    assert_eq!(b.route.methods(), [Method::GET, Method::PUT]);
}

#[test]
fn test_invalid_method_sets_are_registration_errors() {
    let mut router = Router::new();

    let err = router.register("a", tagged_handler("a"), Vec::<Method>::new(), None);
    assert_eq!(err, Err(RegistrationError::EmptyMethods));

    let err = router.register("a", tagged_handler("a"), "NOT A METHOD", None);
    assert!(matches!(err, Err(RegistrationError::InvalidMethod { .. })));

    // Failed registrations leave the table empty.
    assert!(router.is_empty());
}

#[test]
fn test_include_appends_behind_existing_routes() {
    let mut a = Router::new();
    a.register("shared/{x}", tagged_handler("from-a"), "GET", None)
        .unwrap();

    let mut b = Router::new();
    b.register("shared/{y}", tagged_handler("from-b"), "GET", None)
        .unwrap();
    b.register("only/in/b", tagged_handler("b-only"), "GET", None)
        .unwrap();

    a.include(b);

    // Everything b matched is now reachable through a...
    assert_eq!(dispatch_tag(&a, "only/in/b/"), "b-only");
    // ...but b's routes are evaluated only after a's pre-existing ones.
    assert_eq!(dispatch_tag(&a, "shared/1/"), "from-a");
    assert_eq!(a.len(), 3);
}

#[test]
fn test_include_name_collision_is_last_write_wins() {
    let mut a = Router::new();
    a.register("a/path", tagged_handler("a"), "GET", Some("dup"))
        .unwrap();

    let mut b = Router::new();
    b.register("b/path", tagged_handler("b"), "GET", Some("dup"))
        .unwrap();

    a.include(b);
    assert_eq!(a.route_named("dup").unwrap().pattern(), "b/path/");
}

#[test]
fn test_extract_url_normalizes_and_rejects_missing() {
    let router = Router::new();

    let url = router
        .extract_url(&Request::new("user/profile/alice"))
        .unwrap();
    assert_eq!(url, "user/profile/alice/");

    assert!(router.extract_url(&Request::default()).is_err());
    assert!(router.extract_url(&Request::new("   ")).is_err());
}

#[test]
fn test_register_endpoint_descriptor() {
    use restwire::{Endpoint, EndpointSpec};

    struct UserInfo;

    impl Endpoint for UserInfo {
        fn endpoint(&self) -> EndpointSpec {
            EndpointSpec {
                path: "user/info".to_string(),
                handler: tagged_handler("descriptor"),
                methods: vec![Method::GET],
                name: Some("user-info".to_string()),
            }
        }
    }

    let mut router = Router::new();
    router.register_endpoint(&UserInfo).unwrap();
    assert_eq!(dispatch_tag(&router, "user/info/"), "descriptor");
    assert!(router.route_named("user-info").is_some());
}

#[test]
fn test_handler_receives_values_not_names() {
    let mut router = Router::new();
    router
        .register(
            "user/profile/{user_name}",
            handler_fn(|_req, args: &PathArgs| Ok(Value::from(args.to_vec()))),
            "GET",
            None,
        )
        .unwrap();

    let matched = router.resolve("user/profile/alice/").unwrap();
    let content = matched
        .route
        .handler()
        .dispatch(&Request::new("user/profile/alice"), &matched.path_args)
        .unwrap();
    assert_eq!(content, json!(["alice"]));
}
