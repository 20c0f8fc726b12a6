//! Integration tests for the public mapping API
//!
//! These go through the free functions and the process-wide registry, the way a
//! downstream crate uses the library.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tagmap::{Error, Mappable, Mapper, MapperConfig, Record, Registry, Value};

tagmap::record! {
    /// Incoming request payload
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct CreateUserRequest {
        #[field(name = "username", validators = "required,minLength:3,maxLength:16", transformers = "trim,lowercase")]
        pub user_name: String,
        #[field(validators = "required,email")]
        pub email: String,
        #[field(validators = "strongPassword")]
        pub password: String,
        #[field(validators = "range:13-130")]
        pub age: u32,
        #[field(name = "roles")]
        pub role_list: String,
        pub address: Option<AddressInput>,
        #[field(skip)]
        pub request_id: String,
    }
}

tagmap::record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct AddressInput {
        #[field(validators = "required", transformers = "trim")]
        pub city: String,
        #[field(name = "zip", validators = "minLength:5")]
        pub postal_code: String,
    }
}

tagmap::record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct User {
        pub username: String,
        pub email: String,
        pub age: u64,
        pub roles: Vec<String>,
        pub address: Option<Address>,
        pub request_id: String,
    }
}

tagmap::record! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Address {
        pub city: String,
        pub zip: String,
    }
}

fn request() -> CreateUserRequest {
    CreateUserRequest {
        user_name: "  Ada_L ".to_string(),
        email: "ada@example.com".to_string(),
        password: "Str0ng!Pass".to_string(),
        age: 36,
        role_list: r#"["admin", "editor"]"#.to_string(),
        address: Some(AddressInput {
            city: " London ".to_string(),
            postal_code: "NW1 6XE".to_string(),
        }),
        request_id: "req-1".to_string(),
    }
}

#[test]
fn test_request_maps_into_domain_record() {
    let mut user = User::default();
    tagmap::map(&request(), &mut user).unwrap();

    assert_eq!(
        user,
        User {
            username: "ada_l".to_string(),
            email: "ada@example.com".to_string(),
            age: 36,
            roles: vec!["admin".to_string(), "editor".to_string()],
            address: Some(Address {
                city: "London".to_string(),
                zip: "NW1 6XE".to_string(),
            }),
            request_id: String::new(),
        }
    );
}

#[test]
fn test_first_validation_failure_is_reported() {
    let mut bad = request();
    bad.age = 7;
    bad.password = "weak".to_string();

    let err = tagmap::map(&bad, &mut User::default()).unwrap_err();
    assert_eq!(err.field(), Some("password"));
    assert_eq!(
        err.to_string(),
        "validation failed for field 'password': password must be at least 8 characters long"
    );

    let mut bad = request();
    if let Some(address) = bad.address.as_mut() {
        address.city = "   ".to_string();
    }
    let err = tagmap::map(&bad, &mut User::default()).unwrap_err();
    assert_eq!(err.field(), Some("address.city"));
}

#[test]
fn test_custom_registration_is_visible_to_mapping() {
    tagmap::register_validator("integration_noDigits", |value: &Value, _: &str| {
        let text = value.as_str().unwrap_or_default();
        anyhow::ensure!(!text.chars().any(|c| c.is_ascii_digit()), "digits are not allowed");
        Ok(())
    });
    tagmap::register_transformer("integration_reverse", |value| match value {
        Value::Text(text) => Value::Text(text.chars().rev().collect()),
        other => other,
    });

    tagmap::record! {
        #[derive(Debug, Default)]
        struct Word {
            #[field(validators = "integration_noDigits", transformers = "integration_reverse,uppercase")]
            word: String,
        }
    }

    let mut out = Word::default();
    tagmap::map(&Word { word: "stressed".to_string() }, &mut out).unwrap();
    assert_eq!(out.word, "DESSERTS");

    let err = tagmap::map(&Word { word: "r2d2".to_string() }, &mut out).unwrap_err();
    assert_eq!(err.to_string(), "validation failed for field 'word': digits are not allowed");
}

#[test]
fn test_private_registry_is_isolated() {
    let mapper = Mapper::with_registry(Registry::new());
    tagmap::record! {
        #[derive(Debug, Default)]
        struct Shout {
            #[field(transformers = "uppercase")]
            text: String,
        }
    }

    let err = mapper.map(&Shout::default(), &mut Shout::default()).unwrap_err();
    assert!(matches!(err, Error::TransformerNotFound { ref name, .. } if name == "uppercase"));

    mapper.register_transformer("uppercase", |value| value);
    assert!(mapper.map(&Shout::default(), &mut Shout::default()).is_ok());
}

#[test]
fn test_map_json_into_request() {
    let mut parsed = CreateUserRequest::default();
    let json = r#"{
        "username": " Grace ",
        "email": "grace@example.com",
        "password": "C0bol!Rules",
        "age": 85,
        "roles": "admin",
        "address": {"city": "Arlington", "zip": "22201"},
        "unknown": [1, 2, 3]
    }"#;
    tagmap::map_json(json, &mut parsed).unwrap();

    assert_eq!(parsed.user_name, "grace");
    assert_eq!(parsed.age, 85);
    assert_eq!(parsed.address.as_ref().map(|a| a.postal_code.as_str()), Some("22201"));

    let err = tagmap::map_json(r#"{"age": 300}"#, &mut parsed).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.field(), Some("age"));
}

#[test]
fn test_validate_in_place_normalises_record() {
    let mut req = request();
    tagmap::validate_in_place(&mut req).unwrap();
    assert_eq!(req.user_name, "ada_l");
    assert_eq!(req.address.as_ref().map(|a| a.city.as_str()), Some("London"));
    assert_eq!(req.request_id, "req-1");
}

#[test]
fn test_single_value_helpers() {
    let email = tagmap::validate_single(
        "  Ada@Example.COM ".to_string(),
        "validators:'required' transformers:'trim,lowercase'",
    )
    .unwrap();
    assert_eq!(email, "ada@example.com");

    let err = tagmap::validate_value(Value::from("12"), "validators:'minLength:3'").unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.field(), Some("value"));

    let err = tagmap::validate_value(Value::from("x"), "validators:'required").unwrap_err();
    assert!(matches!(err, Error::InlineSpec { position: 11, .. }));
}

#[test]
fn test_slices_map_element_wise() {
    let requests = vec![request(), request()];
    let users: Vec<User> = tagmap::map_slice(&requests).unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.username == "ada_l"));

    let dynamic = tagmap::map_sequence(&requests.to_value(), User::descriptor()).unwrap();
    assert_eq!(Vec::<User>::from_value(dynamic).unwrap(), users);

    let err = tagmap::map_sequence(&Value::from("nope"), User::descriptor()).unwrap_err();
    assert!(matches!(err, Error::Precondition { .. }));
}

#[test]
fn test_delimited_roles_are_rejected() {
    let mut req = request();
    req.role_list = "admin, editor".to_string();

    let mut user = User::default();
    let err = tagmap::map(&req, &mut user).unwrap_err();
    assert!(matches!(err, Error::Decode { ref field, .. } if field == "roles"));
    assert_eq!(user.username, "ada_l");
    assert!(user.roles.is_empty());

    req.role_list = tagmap::codec::encode(&tagmap::split_text_sequence("admin, editor", ',').to_value());
    tagmap::map(&req, &mut user).unwrap();
    assert_eq!(user.roles, ["admin", "editor"]);
}

#[test]
fn test_config_is_honoured() {
    let mapper = Mapper::new().with_config(MapperConfig::default().with_max_depth(0));
    let mut user = User::default();
    let err = mapper.map(&request(), &mut user).unwrap_err();
    assert!(matches!(err, Error::DepthExceeded { ref field, limit: 0 } if field == "address"));
    assert_eq!(user.roles, ["admin", "editor"]);
    assert_eq!(user.address, None);
}

#[test]
fn test_concurrent_mapping_and_registration() {
    let mapped = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let mapped = Arc::clone(&mapped);
            thread::spawn(move || {
                tagmap::register_transformer(format!("integration_thread_{}", i), |value| value);
                for _ in 0..50 {
                    let mut user = User::default();
                    tagmap::map(&request(), &mut user).unwrap();
                    mapped.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(mapped.load(Ordering::SeqCst), 400);
}
